// Topic inspection: summaries of fitted topics, similarity measures and
// coherence scores.

pub mod coherence;
pub mod similarity;
pub mod summary;
