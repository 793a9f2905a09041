pub mod error;
pub mod math;
pub mod loss;

// Convenience re-exports
pub use error::{LossError, Result};
pub use math::matrix::Matrix;
pub use loss::criterion::Criterion;
pub use loss::cross_entropy::{softmax_cross_entropy, SoftmaxCrossEntropy};
pub use loss::mse::MseLoss;
pub use loss::loss_type::{CriterionConfig, LossType};
