//! Time-indexed signals consumed by the windowing transform.
//!
//! A signal is loaded once and never mutated. The variant records which axis
//! carries time so windows can be cut without guessing.

mod matrix;
mod tensor;

pub use matrix::Matrix;
pub use tensor::Tensor;

use serde::{Deserialize, Serialize};

/// Axis layout of a [`Signal`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignalLayout {
    /// 1-D, indexed by time
    Series,
    /// (frequency, time), e.g. a spectrogram
    FrequencyMajor,
    /// (time, features), e.g. cyclone track observations
    TimeMajor,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    Series(Vec<f32>),
    FrequencyMajor(Matrix),
    TimeMajor(Matrix),
}

impl Signal {
    pub fn layout(&self) -> SignalLayout {
        match self {
            Signal::Series(_) => SignalLayout::Series,
            Signal::FrequencyMajor(_) => SignalLayout::FrequencyMajor,
            Signal::TimeMajor(_) => SignalLayout::TimeMajor,
        }
    }

    /// Length of the time axis (T)
    pub fn time_len(&self) -> usize {
        match self {
            Signal::Series(values) => values.len(),
            Signal::FrequencyMajor(m) => m.cols(),
            Signal::TimeMajor(m) => m.rows(),
        }
    }

    /// Length of the non-time axis; 1 for a series
    pub fn feature_len(&self) -> usize {
        match self {
            Signal::Series(_) => 1,
            Signal::FrequencyMajor(m) => m.rows(),
            Signal::TimeMajor(m) => m.cols(),
        }
    }

    /// Reinterpret a matrix under the given layout
    ///
    /// A `Series` layout flattens the matrix in row-major order.
    pub fn from_matrix(matrix: Matrix, layout: SignalLayout) -> Self {
        match layout {
            SignalLayout::Series => Signal::Series(matrix.data().to_vec()),
            SignalLayout::FrequencyMajor => Signal::FrequencyMajor(matrix),
            SignalLayout::TimeMajor => Signal::TimeMajor(matrix),
        }
    }
}
