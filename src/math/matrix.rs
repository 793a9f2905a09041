use rand::prelude::*;
use std::ops::Sub;

use crate::error::{LossError, Result};

/// Dense row-major matrix of `f64`.
///
/// Scores, labels, softmax probabilities and gradients are all stored as
/// `(batch_size, num_classes)` matrices: one row per example.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix{
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f64>>
}

impl Matrix{
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix{
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows]
        }
    }

    /// Uniform samples in [-1, 1).
    pub fn random(rows: usize, cols: usize) -> Matrix {
        let mut rng = rand::thread_rng();
        let mut res = Matrix::zeros(rows, cols);

        for i in 0..rows {
            for j in 0..cols {
                res.data[i][j] = rng.gen::<f64>() * 2.0 - 1.0;
            }
        }

        res
    }

    /// Builds a one-hot label matrix: row `i` has a 1.0 at `indices[i]`.
    pub fn one_hot(indices: &[usize], num_classes: usize) -> Result<Matrix> {
        let mut res = Matrix::zeros(indices.len(), num_classes);
        for (i, &index) in indices.iter().enumerate() {
            if index >= num_classes {
                return Err(LossError::ClassOutOfRange { index, num_classes });
            }
            res.data[i][index] = 1.0;
        }
        Ok(res)
    }

    /// Convenience constructor for literal data. Panics on an empty outer vec;
    /// use `try_from_rows` for untrusted input.
    pub fn from_data(data: Vec<Vec<f64>>) -> Matrix {
        Matrix {
            rows: data.len(),
            cols: data[0].len(),
            data
        }
    }

    /// Checked constructor: every row must have the same length as the first.
    /// An empty vec yields a 0×0 matrix.
    pub fn try_from_rows(data: Vec<Vec<f64>>) -> Result<Matrix> {
        let cols = data.first().map_or(0, Vec::len);
        if let Some((row, r)) = data.iter().enumerate().find(|(_, r)| r.len() != cols) {
            return Err(LossError::RaggedRows { row, expected: cols, got: r.len() });
        }
        Ok(Matrix { rows: data.len(), cols, data })
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter()
                .map(|row| row.iter().map(|&x| functor(x)).collect())
                .collect(),
        }
    }

    /// Sum of each row.
    pub fn row_sums(&self) -> Vec<f64> {
        self.data.iter().map(|row| row.iter().sum()).collect()
    }
}

impl Sub for &Matrix {
    type Output = Matrix;

    fn sub(self, rhs: Self) -> Self::Output {
        if self.rows != rhs.rows || self.cols != rhs.cols {
            panic!("Matrices are of incorrect sizes")
        }

        let mut res = Matrix::zeros(self.rows, self.cols);

        for i in 0..self.rows {
            for j in 0..self.cols {
                res.data[i][j] = self.data[i][j] - rhs.data[i][j];
            }
        }

        res
    }
}
