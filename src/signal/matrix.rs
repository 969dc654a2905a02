// Matrix - dense row-major 2-D array of samples
//
// Spectrograms (frequency × time) and track feature tables (time × features)
// are both stored as a Matrix; the owning Signal variant records which axis
// is time.

use serde::{Deserialize, Serialize};

use crate::error::DataError;

/// Dense row-major `f32` matrix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl Matrix {
    /// Build a matrix from a flat row-major buffer
    ///
    /// Fails when `data.len() != rows * cols`.
    pub fn new(rows: usize, cols: usize, data: Vec<f32>) -> Result<Self, DataError> {
        if rows.checked_mul(cols) != Some(data.len()) {
            return Err(DataError::InvalidShape {
                reason: format!(
                    "{} values cannot fill a {}x{} matrix",
                    data.len(),
                    rows,
                    cols
                ),
            });
        }
        Ok(Self { rows, cols, data })
    }

    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Build a matrix from nested rows, rejecting ragged input
    pub fn from_rows(rows: &[Vec<f32>]) -> Result<Self, DataError> {
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (index, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(DataError::InvalidShape {
                    reason: format!(
                        "row {} has {} columns, expected {}",
                        index,
                        row.len(),
                        cols
                    ),
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            data,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row < self.rows && col < self.cols {
            Some(self.data[row * self.cols + col])
        } else {
            None
        }
    }

    pub fn set(&mut self, row: usize, col: usize, value: f32) {
        if row < self.rows && col < self.cols {
            self.data[row * self.cols + col] = value;
        }
    }

    pub fn row(&self, row: usize) -> Option<&[f32]> {
        if row < self.rows {
            Some(&self.data[row * self.cols..(row + 1) * self.cols])
        } else {
            None
        }
    }

    pub fn to_rows(&self) -> Vec<Vec<f32>> {
        (0..self.rows)
            .map(|r| self.data[r * self.cols..(r + 1) * self.cols].to_vec())
            .collect()
    }

    pub fn transpose(&self) -> Matrix {
        let mut data = Vec::with_capacity(self.data.len());
        for c in 0..self.cols {
            for r in 0..self.rows {
                data.push(self.data[r * self.cols + c]);
            }
        }
        Matrix {
            rows: self.cols,
            cols: self.rows,
            data,
        }
    }

    /// Copy out rows `[start, end)`; `None` when the range leaves the matrix
    pub fn row_range(&self, start: usize, end: usize) -> Option<Matrix> {
        if start > end || end > self.rows {
            return None;
        }
        Some(Matrix {
            rows: end - start,
            cols: self.cols,
            data: self.data[start * self.cols..end * self.cols].to_vec(),
        })
    }

    /// Copy out columns `[start, end)` of every row; `None` when the range
    /// leaves the matrix
    pub fn col_range(&self, start: usize, end: usize) -> Option<Matrix> {
        if start > end || end > self.cols {
            return None;
        }
        let width = end - start;
        let mut data = Vec::with_capacity(self.rows * width);
        for r in 0..self.rows {
            let base = r * self.cols;
            data.extend_from_slice(&self.data[base + start..base + end]);
        }
        Some(Matrix {
            rows: self.rows,
            cols: width,
            data,
        })
    }
}
