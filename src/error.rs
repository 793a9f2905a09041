use thiserror::Error;

pub type Result<T> = std::result::Result<T, LossError>;

#[derive(Debug, Error)]
pub enum LossError {
    #[error("Shape mismatch: scores are {scores:?} but labels are {labels:?}")]
    InvalidInputShape {
        scores: (usize, usize),
        labels: (usize, usize),
    },

    #[error("Scores have zero classes")]
    NoClasses,

    #[error("Row {row} has {got} columns, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("Matrix declares {declared} rows but holds {actual}")]
    RowCountMismatch { declared: usize, actual: usize },

    #[error("Class index {index} out of range for {num_classes} classes")]
    ClassOutOfRange { index: usize, num_classes: usize },

    #[error("Label row {row} is not a probability distribution (sum = {sum})")]
    LabelsNotDistribution { row: usize, sum: f64 },

    #[error("Illegal state: {0}")]
    IllegalState(&'static str),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
