pub mod criterion;
pub mod cross_entropy;
pub mod mse;
pub mod loss_type;

pub use criterion::Criterion;
pub use cross_entropy::{log_softmax, softmax_cross_entropy, SoftmaxCrossEntropy, SoftmaxCrossEntropyOutput};
pub use mse::MseLoss;
pub use loss_type::{CriterionConfig, LossType};
