use serde::{Serialize, Deserialize};

use crate::error::Result;
use crate::loss::criterion::Criterion;
use crate::loss::cross_entropy::SoftmaxCrossEntropy;
use crate::loss::mse::MseLoss;

/// Selects which criterion `CriterionConfig::build` produces.
///
/// - `SoftmaxCrossEntropy` — takes raw logits; the gradient is the combined
///   Softmax+CE gradient (softmax - labels).
/// - `Mse`                 — mean-squared error on already-activated outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossType {
    SoftmaxCrossEntropy,
    Mse,
}

fn default_label_tolerance() -> f64 {
    1e-6
}

/// Serializable criterion settings.
///
/// JSON form:
/// ```json
/// { "loss": "softmax_cross_entropy", "validate_labels": true, "label_tolerance": 1e-6 }
/// ```
/// Only `loss` is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionConfig {
    pub loss: LossType,
    /// Reject label rows that are not probability distributions.
    #[serde(default)]
    pub validate_labels: bool,
    #[serde(default = "default_label_tolerance")]
    pub label_tolerance: f64,
}

impl Default for CriterionConfig {
    fn default() -> Self {
        CriterionConfig {
            loss: LossType::SoftmaxCrossEntropy,
            validate_labels: false,
            label_tolerance: default_label_tolerance(),
        }
    }
}

impl CriterionConfig {
    pub fn new(loss: LossType) -> Self {
        CriterionConfig { loss, ..Self::default() }
    }

    /// Builds a fresh (uninitialized) criterion from these settings.
    pub fn build(&self) -> Box<dyn Criterion> {
        log::debug!("building criterion {:?} (validate_labels={})", self.loss, self.validate_labels);
        match self.loss {
            LossType::SoftmaxCrossEntropy => {
                let ce = SoftmaxCrossEntropy::new();
                Box::new(if self.validate_labels {
                    ce.with_label_validation(self.label_tolerance)
                } else {
                    ce
                })
            }
            LossType::Mse => {
                let mse = MseLoss::new();
                Box::new(if self.validate_labels {
                    mse.with_label_validation(self.label_tolerance)
                } else {
                    mse
                })
            }
        }
    }

    pub fn from_json_str(s: &str) -> Result<CriterionConfig> {
        Ok(serde_json::from_str(s)?)
    }

    /// Serializes the config to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a `CriterionConfig` from a JSON file.
    pub fn load_json(path: &str) -> Result<CriterionConfig> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}
