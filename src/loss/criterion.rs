use crate::error::{LossError, Result};
use crate::math::matrix::Matrix;

/// A loss function with a forward pass and a gradient w.r.t. its inputs.
///
/// Implementers keep the inputs and intermediates of the most recent
/// `forward` call; `derivative` reads them back. Each `forward` replaces the
/// stored state. Calling `derivative` before any `forward` returns
/// `LossError::IllegalState`.
pub trait Criterion {
    /// Per-example loss, one entry per row of `scores`. Not reduced.
    fn forward(&mut self, scores: &Matrix, labels: &Matrix) -> Result<Vec<f64>>;

    /// ∂loss/∂scores for the last `forward` call, same shape as `scores`.
    fn derivative(&self) -> Result<Matrix>;

    /// Short identifier used in log output.
    fn name(&self) -> &'static str;

    /// Same as `forward`; lets a criterion be "called" like
    /// `criterion.call(&scores, &labels)`.
    fn call(&mut self, scores: &Matrix, labels: &Matrix) -> Result<Vec<f64>> {
        self.forward(scores, labels)
    }
}

/// Shared input checks for criteria taking a (batch, classes) pair.
///
/// Shapes must match and there must be at least one class unless the batch
/// is empty. When `label_tolerance` is `Some`, every label row must also be
/// non-negative and sum to 1 within that tolerance.
pub(crate) fn check_inputs(
    scores: &Matrix,
    labels: &Matrix,
    label_tolerance: Option<f64>,
) -> Result<()> {
    if scores.shape() != labels.shape() {
        return Err(LossError::InvalidInputShape {
            scores: scores.shape(),
            labels: labels.shape(),
        });
    }
    check_row_lengths(scores)?;
    check_row_lengths(labels)?;
    if scores.rows > 0 && scores.cols == 0 {
        return Err(LossError::NoClasses);
    }

    if let Some(tol) = label_tolerance {
        for (row, values) in labels.data.iter().enumerate() {
            let sum: f64 = values.iter().sum();
            if (sum - 1.0).abs() > tol || values.iter().any(|&v| v < 0.0) {
                return Err(LossError::LabelsNotDistribution { row, sum });
            }
        }
    }
    Ok(())
}

// `Matrix` fields are public, so a hand-built value can lie about `rows` or `cols`.
fn check_row_lengths(m: &Matrix) -> Result<()> {
    if m.data.len() != m.rows {
        return Err(LossError::RowCountMismatch { declared: m.rows, actual: m.data.len() });
    }
    match m.data.iter().enumerate().find(|(_, r)| r.len() != m.cols) {
        Some((row, r)) => Err(LossError::RaggedRows { row, expected: m.cols, got: r.len() }),
        None => Ok(()),
    }
}
