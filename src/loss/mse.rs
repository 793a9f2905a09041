use crate::error::{LossError, Result};
use crate::loss::criterion::{check_inputs, Criterion};
use crate::math::matrix::Matrix;

/// Mean-squared error per example, pair with an Identity or Sigmoid output.
#[derive(Debug, Clone, Default)]
pub struct MseLoss {
    // (predicted, expected) from the last forward
    state: Option<(Matrix, Matrix)>,
    label_tolerance: Option<f64>,
}

impl MseLoss {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_label_validation(mut self, tolerance: f64) -> Self {
        self.label_tolerance = Some(tolerance);
        self
    }
}

impl Criterion for MseLoss {
    /// loss_i = mean_j (predicted[i,j] - expected[i,j])²
    fn forward(&mut self, predicted: &Matrix, expected: &Matrix) -> Result<Vec<f64>> {
        check_inputs(predicted, expected, self.label_tolerance)?;
        let n = predicted.cols as f64;
        let loss: Vec<f64> = predicted.data.iter().zip(expected.data.iter())
            .map(|(p, y)| {
                p.iter().zip(y.iter())
                    .map(|(a, b)| (a - b).powi(2))
                    .sum::<f64>() / n
            })
            .collect();
        let mean_loss = if loss.is_empty() { 0.0 } else { loss.iter().sum::<f64>() / loss.len() as f64 };
        log::debug!(
            "{}: forward batch={} outputs={} mean_loss={:.6}",
            self.name(),
            predicted.rows,
            predicted.cols,
            mean_loss,
        );
        self.state = Some((predicted.clone(), expected.clone()));
        Ok(loss)
    }

    /// Per-output gradient: 2·(predicted - expected) / n_outputs
    fn derivative(&self) -> Result<Matrix> {
        match &self.state {
            Some((predicted, expected)) => {
                log::trace!("{}: derivative batch={}", self.name(), predicted.rows);
                let scale = 2.0 / predicted.cols as f64;
                Ok((predicted - expected).map(|d| d * scale))
            }
            None => {
                log::warn!("{}: derivative requested before forward", self.name());
                Err(LossError::IllegalState("derivative called before forward"))
            }
        }
    }

    fn name(&self) -> &'static str {
        "mse"
    }
}
