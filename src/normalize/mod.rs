//! Shape normalization at the inference boundary.
//!
//! A client sample arrives as a nested array of rank 1, 2 or 3. [`Sample`]
//! tags the rank explicitly and [`normalize`] maps each rank to the batched
//! tensor a model family expects:
//!
//! | input            | output (recurrent) | output (convolutional) |
//! |------------------|--------------------|------------------------|
//! | `Vector(N)`      | `(1, 1, N)`        | `(1, 1, N, 1)`         |
//! | `Matrix(T×N)`    | `(1, T, N)`        | `(1, T, N, 1)`         |
//! | `Batched(B×T×N)` | unchanged          | `(B, T, N, 1)`         |
//!
//! With [`AxisOrder::FrequencyMajor`] the two innermost axes are swapped
//! after batching. Normalization has no error outcomes; malformed feature
//! counts are rejected by the gate before this runs.

use serde::{Deserialize, Serialize};

use crate::signal::Tensor;

/// Model families, addressed by the input layout they consume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelFamily {
    /// Time-ordered sequences: `(batch, time, features)`
    Recurrent,
    /// 2-D map plus channel: `(batch, rows, cols, channel)`
    Convolutional,
}

/// Axis order of the caller's data relative to what the model was trained on
///
/// This is configured per model and never inferred from the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AxisOrder {
    /// Rows are time steps; passed through as is
    #[default]
    TimeMajor,
    /// Rows are frequency bins; the innermost axes are swapped
    FrequencyMajor,
}

/// Client sample tagged by rank
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Sample {
    Vector(Vec<f32>),
    Matrix(Vec<Vec<f32>>),
    Batched(Vec<Vec<Vec<f32>>>),
}

impl Sample {
    pub fn rank(&self) -> usize {
        match self {
            Sample::Vector(_) => 1,
            Sample::Matrix(_) => 2,
            Sample::Batched(_) => 3,
        }
    }
}

/// Map a sample to the canonical batched tensor for `family`
pub fn normalize(sample: &Sample, family: ModelFamily, axis_order: AxisOrder) -> Tensor {
    let batched = match sample {
        Sample::Vector(values) => Tensor::from_parts(vec![1, 1, values.len()], values.clone()),
        Sample::Matrix(rows) => {
            let (steps, width, data) = flatten_rows(rows);
            Tensor::from_parts(vec![1, steps, width], data)
        }
        Sample::Batched(batches) => {
            let steps = batches.first().map(Vec::len).unwrap_or(0);
            let width = batches
                .first()
                .and_then(|rows| rows.first())
                .map(Vec::len)
                .unwrap_or(0);
            let mut data = Vec::with_capacity(batches.len() * steps * width);
            for rows in batches {
                for step in 0..steps {
                    push_row(&mut data, rows.get(step).map(Vec::as_slice), width);
                }
            }
            Tensor::from_parts(vec![batches.len(), steps, width], data)
        }
    };

    let oriented = match axis_order {
        AxisOrder::TimeMajor => batched,
        AxisOrder::FrequencyMajor => batched.swap_last_axes(),
    };

    match family {
        ModelFamily::Recurrent => oriented,
        ModelFamily::Convolutional => oriented.with_trailing_axis(),
    }
}

// Rows are assumed rectangular; any ragged row is zero-padded or truncated to
// the first row's width so the output stays well-formed.
fn flatten_rows(rows: &[Vec<f32>]) -> (usize, usize, Vec<f32>) {
    let width = rows.first().map(Vec::len).unwrap_or(0);
    let mut data = Vec::with_capacity(rows.len() * width);
    for row in rows {
        push_row(&mut data, Some(row), width);
    }
    (rows.len(), width, data)
}

fn push_row(data: &mut Vec<f32>, row: Option<&[f32]>, width: usize) {
    let row = row.unwrap_or(&[]);
    data.extend(row.iter().copied().take(width));
    data.extend(std::iter::repeat(0.0).take(width.saturating_sub(row.len())));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_expands_to_single_step() {
        let t = normalize(
            &Sample::Vector(vec![0.1; 6]),
            ModelFamily::Recurrent,
            AxisOrder::TimeMajor,
        );
        assert_eq!(t.shape(), &[1, 1, 6]);
    }

    #[test]
    fn test_matrix_gains_batch_axis() {
        let t = normalize(
            &Sample::Matrix(vec![vec![0.1; 129]; 64]),
            ModelFamily::Recurrent,
            AxisOrder::TimeMajor,
        );
        assert_eq!(t.shape(), &[1, 64, 129]);
    }

    #[test]
    fn test_batched_recurrent_passes_through_unchanged() {
        let sample = Sample::Batched(vec![
            vec![vec![1.0, 2.0], vec![3.0, 4.0]],
            vec![vec![5.0, 6.0], vec![7.0, 8.0]],
        ]);
        let once = normalize(&sample, ModelFamily::Recurrent, AxisOrder::TimeMajor);
        assert_eq!(once.shape(), &[2, 2, 2]);
        assert_eq!(once.data(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);

        // feeding the result back in yields the same tensor
        let (_, data) = once.clone().into_parts();
        let again = Sample::Batched(vec![
            vec![data[0..2].to_vec(), data[2..4].to_vec()],
            vec![data[4..6].to_vec(), data[6..8].to_vec()],
        ]);
        assert_eq!(
            normalize(&again, ModelFamily::Recurrent, AxisOrder::TimeMajor),
            once
        );
    }

    #[test]
    fn test_convolutional_appends_channel() {
        let t = normalize(
            &Sample::Matrix(vec![vec![0.0; 3]; 2]),
            ModelFamily::Convolutional,
            AxisOrder::TimeMajor,
        );
        assert_eq!(t.shape(), &[1, 2, 3, 1]);

        let t = normalize(
            &Sample::Vector(vec![0.0; 3]),
            ModelFamily::Convolutional,
            AxisOrder::TimeMajor,
        );
        assert_eq!(t.shape(), &[1, 1, 3, 1]);
    }

    #[test]
    fn test_frequency_major_swaps_inner_axes() {
        let t = normalize(
            &Sample::Matrix(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]),
            ModelFamily::Recurrent,
            AxisOrder::FrequencyMajor,
        );
        assert_eq!(t.shape(), &[1, 3, 2]);
        assert_eq!(t.data(), &[1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    }

    #[test]
    fn test_ragged_rows_stay_well_formed() {
        let t = normalize(
            &Sample::Matrix(vec![vec![1.0, 2.0], vec![3.0], vec![4.0, 5.0, 6.0]]),
            ModelFamily::Recurrent,
            AxisOrder::TimeMajor,
        );
        assert_eq!(t.shape(), &[1, 3, 2]);
        assert_eq!(t.data(), &[1.0, 2.0, 3.0, 0.0, 4.0, 5.0]);
    }

    #[test]
    fn test_untagged_deserialization_picks_rank() {
        let v: Sample = serde_json::from_str("[0.5, 1.0]").unwrap();
        assert_eq!(v.rank(), 1);
        let m: Sample = serde_json::from_str("[[0.5], [1.0]]").unwrap();
        assert_eq!(m.rank(), 2);
        let b: Sample = serde_json::from_str("[[[0.5]]]").unwrap();
        assert_eq!(b.rank(), 3);
    }
}
