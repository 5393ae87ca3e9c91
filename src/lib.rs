// lda: Latent Dirichlet Allocation topic modeling.
//
// This is the library root. Each module corresponds to a stage of the
// modeling workflow, from raw text to stored, inspectable models.

pub mod config;
pub mod corpus;
pub mod db;
pub mod manifest;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod status;
pub mod topics;
