// Tensor - shaped flat buffer handed to models
//
// Models never see nested vectors; the normalizer and the window renderers
// produce a Tensor with an explicit shape.

use serde::Serialize;

use crate::error::DataError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tensor {
    shape: Vec<usize>,
    data: Vec<f32>,
}

impl Tensor {
    pub fn new(shape: Vec<usize>, data: Vec<f32>) -> Result<Self, DataError> {
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(DataError::InvalidShape {
                reason: format!(
                    "shape {:?} needs {} values, got {}",
                    shape,
                    expected,
                    data.len()
                ),
            });
        }
        Ok(Self { shape, data })
    }

    /// Construct without checking; callers guarantee `product(shape) == data.len()`
    pub(crate) fn from_parts(shape: Vec<usize>, data: Vec<f32>) -> Self {
        debug_assert_eq!(shape.iter().product::<usize>(), data.len());
        Self { shape, data }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn into_parts(self) -> (Vec<usize>, Vec<f32>) {
        (self.shape, self.data)
    }

    /// Append a trailing axis of length 1; the buffer is unchanged
    pub fn with_trailing_axis(mut self) -> Self {
        self.shape.push(1);
        self
    }

    /// Swap the two innermost axes, moving data accordingly
    ///
    /// Tensors of rank < 2 are returned unchanged.
    pub fn swap_last_axes(self) -> Self {
        let rank = self.shape.len();
        if rank < 2 {
            return self;
        }
        let rows = self.shape[rank - 2];
        let cols = self.shape[rank - 1];
        let plane = rows * cols;
        let mut data = Vec::with_capacity(self.data.len());
        if plane > 0 {
            for block in self.data.chunks(plane) {
                for c in 0..cols {
                    for r in 0..rows {
                        data.push(block[r * cols + c]);
                    }
                }
            }
        }
        let mut shape = self.shape;
        shape.swap(rank - 2, rank - 1);
        Self { shape, data }
    }
}
