use crate::error::{LossError, Result};
use crate::loss::criterion::{check_inputs, Criterion};
use crate::math::matrix::Matrix;

/// Row-wise log-softmax using the log-sum-exp trick:
///   c_i          = max_j x[i,j]
///   logsumexp_i  = ln(sum_j exp(x[i,j] - c_i)) + c_i
///   out[i,j]     = x[i,j] - logsumexp_i
///
/// Subtracting the row max keeps `exp` from overflowing for large logits.
/// Rows must be non-empty.
pub fn log_softmax(scores: &Matrix) -> Matrix {
    let data = scores.data.iter()
        .map(|row| {
            let c = row.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            let logsumexp = row.iter().map(|&x| (x - c).exp()).sum::<f64>().ln() + c;
            row.iter().map(|&x| x - logsumexp).collect()
        })
        .collect();
    Matrix { rows: scores.rows, cols: scores.cols, data }
}

/// Everything one softmax cross-entropy forward pass produces.
///
/// Returned by [`softmax_cross_entropy`] so callers can hold the context
/// explicitly instead of relying on criterion state.
#[derive(Debug, Clone, PartialEq)]
pub struct SoftmaxCrossEntropyOutput {
    pub scores: Matrix,
    pub labels: Matrix,
    pub log_softmax: Matrix,
    pub softmax: Matrix,
    /// Per-example cross-entropy, length = batch size.
    pub loss: Vec<f64>,
}

impl SoftmaxCrossEntropyOutput {
    /// Gradient w.r.t. the scores: softmax - labels.
    pub fn derivative(&self) -> Matrix {
        &self.softmax - &self.labels
    }

    /// Batch mean of the per-example loss; 0.0 for an empty batch.
    pub fn mean_loss(&self) -> f64 {
        if self.loss.is_empty() {
            return 0.0;
        }
        self.loss.iter().sum::<f64>() / self.loss.len() as f64
    }
}

/// Stateless softmax cross-entropy.
///
/// `scores` are raw logits of shape (batch, classes); `labels` have the same
/// shape and each row is a one-hot or soft target distribution. Labels are not
/// checked for normalization here; see
/// [`SoftmaxCrossEntropy::with_label_validation`].
pub fn softmax_cross_entropy(scores: &Matrix, labels: &Matrix) -> Result<SoftmaxCrossEntropyOutput> {
    check_inputs(scores, labels, None)?;
    Ok(compute(scores, labels))
}

fn compute(scores: &Matrix, labels: &Matrix) -> SoftmaxCrossEntropyOutput {
    let log_sm = log_softmax(scores);
    let softmax = log_sm.map(f64::exp);

    // loss_i = -sum_j y[i,j] * log_softmax[i,j]
    let loss = log_sm.data.iter().zip(labels.data.iter())
        .map(|(ls, y)| -ls.iter().zip(y.iter()).map(|(l, t)| t * l).sum::<f64>())
        .collect();

    SoftmaxCrossEntropyOutput {
        scores: scores.clone(),
        labels: labels.clone(),
        log_softmax: log_sm,
        softmax,
        loss,
    }
}

/// Softmax followed by categorical cross-entropy, as a stateful criterion.
///
/// `forward` takes raw logits (no Softmax layer in front) and keeps the
/// resulting [`SoftmaxCrossEntropyOutput`]; `derivative` then returns the
/// combined Softmax+CE gradient `softmax - labels`.
#[derive(Debug, Clone, Default)]
pub struct SoftmaxCrossEntropy {
    state: Option<SoftmaxCrossEntropyOutput>,
    label_tolerance: Option<f64>,
}

impl SoftmaxCrossEntropy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects label rows that are not distributions (sum ≠ 1 within
    /// `tolerance`, or a negative entry).
    pub fn with_label_validation(mut self, tolerance: f64) -> Self {
        self.label_tolerance = Some(tolerance);
        self
    }

    /// Context of the last successful `forward`, if any.
    pub fn state(&self) -> Option<&SoftmaxCrossEntropyOutput> {
        self.state.as_ref()
    }

    pub fn scores(&self) -> Option<&Matrix> {
        self.state.as_ref().map(|s| &s.scores)
    }

    pub fn labels(&self) -> Option<&Matrix> {
        self.state.as_ref().map(|s| &s.labels)
    }

    pub fn softmax(&self) -> Option<&Matrix> {
        self.state.as_ref().map(|s| &s.softmax)
    }

    pub fn loss(&self) -> Option<&[f64]> {
        self.state.as_ref().map(|s| s.loss.as_slice())
    }

    /// Drops the stored state; the next `derivative` fails until `forward` runs.
    pub fn reset(&mut self) {
        self.state = None;
    }
}

impl Criterion for SoftmaxCrossEntropy {
    fn forward(&mut self, scores: &Matrix, labels: &Matrix) -> Result<Vec<f64>> {
        check_inputs(scores, labels, self.label_tolerance)?;
        let out = compute(scores, labels);
        log::debug!(
            "{}: forward batch={} classes={} mean_loss={:.6}",
            self.name(),
            scores.rows,
            scores.cols,
            out.mean_loss(),
        );
        let loss = out.loss.clone();
        self.state = Some(out);
        Ok(loss)
    }

    fn derivative(&self) -> Result<Matrix> {
        match &self.state {
            Some(state) => {
                log::trace!("{}: derivative batch={}", self.name(), state.softmax.rows);
                Ok(state.derivative())
            }
            None => {
                log::warn!("{}: derivative requested before forward", self.name());
                Err(LossError::IllegalState("derivative called before forward"))
            }
        }
    }

    fn name(&self) -> &'static str {
        "softmax_cross_entropy"
    }
}
