// Arrays - JSON cache files for derived signals
//
// Preprocessing steps write their output (normalized waveforms, spectrograms,
// track features) as `{ "shape": [...], "data": [...] }` so later steps can
// reload them without recomputing.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{log_data_error, DataError};
use crate::signal::{Matrix, Signal, SignalLayout};

/// On-disk array: row-major data plus its shape (rank 1 or 2)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayFile {
    pub shape: Vec<usize>,
    pub data: Vec<f32>,
}

impl ArrayFile {
    pub fn from_series(values: &[f32]) -> Self {
        Self {
            shape: vec![values.len()],
            data: values.to_vec(),
        }
    }

    pub fn from_matrix(matrix: &Matrix) -> Self {
        Self {
            shape: vec![matrix.rows(), matrix.cols()],
            data: matrix.data().to_vec(),
        }
    }

    pub fn from_signal(signal: &Signal) -> Self {
        match signal {
            Signal::Series(values) => Self::from_series(values),
            Signal::FrequencyMajor(m) | Signal::TimeMajor(m) => Self::from_matrix(m),
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DataError> {
        let contents = fs::read_to_string(&path).map_err(|err| DataError::io(&path, err))?;
        let array: ArrayFile = serde_json::from_str(&contents)?;
        let expected: usize = array.shape.iter().product();
        if array.shape.is_empty() || array.shape.len() > 2 || expected != array.data.len() {
            return Err(DataError::InvalidShape {
                reason: format!(
                    "array file shape {:?} does not describe {} values",
                    array.shape,
                    array.data.len()
                ),
            });
        }
        Ok(array)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), DataError> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|err| DataError::io(parent, err))?;
            }
        }
        let json = serde_json::to_string(self)?;
        fs::write(&path, json).map_err(|err| DataError::io(&path, err))
    }

    /// Interpret the array as a signal with the given layout
    ///
    /// Rank-1 arrays are only valid as `Series`; rank-2 arrays only as one of
    /// the matrix layouts.
    pub fn into_signal(self, layout: SignalLayout) -> Result<Signal, DataError> {
        match (self.shape.as_slice(), layout) {
            ([_], SignalLayout::Series) => Ok(Signal::Series(self.data)),
            (&[rows, cols], SignalLayout::FrequencyMajor | SignalLayout::TimeMajor) => Ok(
                Signal::from_matrix(Matrix::new(rows, cols, self.data)?, layout),
            ),
            (shape, layout) => Err(DataError::InvalidShape {
                reason: format!("a rank-{} array cannot be read as {:?}", shape.len(), layout),
            }),
        }
    }
}

/// Load a cached signal
pub fn load_signal<P: AsRef<Path>>(path: P, layout: SignalLayout) -> Result<Signal, DataError> {
    ArrayFile::load(&path)
        .and_then(|array| array.into_signal(layout))
        .map_err(|err| {
            log_data_error(&err, &format!("load_signal({})", path.as_ref().display()));
            err
        })
}

/// Persist a signal
pub fn save_signal<P: AsRef<Path>>(path: P, signal: &Signal) -> Result<(), DataError> {
    ArrayFile::from_signal(signal).save(path)
}
