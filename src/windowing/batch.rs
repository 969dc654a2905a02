// Batch - materialised windows and the seeded train/test split

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::{Orientation, Window};
use crate::error::DataError;
use crate::signal::Tensor;

/// All emitted windows, in emission order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SampleBatch {
    windows: Vec<Window>,
}

/// Disjoint train/test partitions of a [`SampleBatch`]
#[derive(Debug, Clone, PartialEq)]
pub struct SplitBatch {
    pub train: SampleBatch,
    pub test: SampleBatch,
}

impl SampleBatch {
    pub fn new(windows: Vec<Window>) -> Self {
        Self { windows }
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn windows(&self) -> &[Window] {
        &self.windows
    }

    pub fn labels(&self) -> Vec<bool> {
        self.windows.iter().map(Window::label).collect()
    }

    pub fn positives(&self) -> usize {
        self.windows.iter().filter(|w| w.label()).count()
    }

    /// Stack every window into one batched tensor `(N, ...)`
    ///
    /// Fails on an empty batch, since the per-window shape is unknown.
    pub fn stack(&self, orientation: Orientation) -> Result<Tensor, DataError> {
        let first = self.windows.first().ok_or_else(|| DataError::EmptyInput {
            what: "sample batch".to_string(),
        })?;
        let item_shape = first.render(orientation).shape().to_vec();
        let item_len: usize = item_shape.iter().product();

        let mut data = Vec::with_capacity(item_len * self.windows.len());
        for window in &self.windows {
            data.extend_from_slice(window.render(orientation).data());
        }

        let mut shape = Vec::with_capacity(item_shape.len() + 1);
        shape.push(self.windows.len());
        shape.extend(item_shape);
        Tensor::new(shape, data)
    }

    /// Randomised split with a fixed seed
    ///
    /// The test partition holds `ceil(test_ratio * n)` windows and the train
    /// partition the rest. `test_ratio` is clamped to `[0, 1]`. The same batch,
    /// ratio and seed always give the same partitions.
    pub fn split(&self, test_ratio: f64, seed: u64) -> SplitBatch {
        let n = self.windows.len();
        let ratio = if test_ratio.is_finite() {
            test_ratio.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let n_test = (ratio * n as f64).ceil() as usize;
        let n_test = n_test.min(n);

        let mut order: Vec<usize> = (0..n).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        order.shuffle(&mut rng);

        let (test_idx, train_idx) = order.split_at(n_test);
        let pick = |indices: &[usize]| {
            SampleBatch::new(indices.iter().map(|&i| self.windows[i].clone()).collect())
        };

        SplitBatch {
            train: pick(train_idx),
            test: pick(test_idx),
        }
    }
}
