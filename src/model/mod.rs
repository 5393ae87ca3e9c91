// Latent Dirichlet Allocation: estimation, inference and evaluation.

pub mod gibbs;
pub mod inference;
pub mod likelihood;
pub mod params;
pub mod trained;
pub mod traits;

pub use gibbs::GibbsSampler;
pub use inference::Inferencer;
pub use params::LdaParams;
pub use trained::TrainedModel;
pub use traits::TopicModel;
