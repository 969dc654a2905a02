//! Sliding-window sample construction.
//!
//! Turns a [`Signal`] and a [`LabelTimeline`] into (window, label) pairs, one
//! per start offset in `[0, T - window_size)`. Each window is labelled with the
//! timeline value at its midpoint `start + window_size / 2`. The transform is
//! lazy, deterministic and never fails: a window whose slice cannot be cut at
//! the expected shape is skipped.

mod batch;
mod labels;

pub use batch::{SampleBatch, SplitBatch};
pub use labels::{AboveThreshold, Alternating, FirstHalfPositive, LabelPolicy, LabelTimeline};

use serde::{Deserialize, Serialize};

use crate::signal::{Matrix, Signal, Tensor};

/// How a window is laid out for the consuming model family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Orientation {
    /// Signal's own axis order: `(W,)`, `(F, W)` or `(W, F)`
    #[default]
    Native,
    /// Time axis first: `(W, F)`; a series becomes `(W, 1)`
    Recurrent,
    /// Native order plus a trailing channel axis
    Convolutional,
}

/// One labelled window cut from a signal
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    start: usize,
    label: bool,
    data: Signal,
}

impl Window {
    pub fn start(&self) -> usize {
        self.start
    }

    pub fn label(&self) -> bool {
        self.label
    }

    /// The raw slice, in the source signal's layout
    pub fn data(&self) -> &Signal {
        &self.data
    }

    /// Width along the time axis
    pub fn width(&self) -> usize {
        self.data.time_len()
    }

    pub fn render(&self, orientation: Orientation) -> Tensor {
        match orientation {
            Orientation::Native => self.to_native(),
            Orientation::Recurrent => self.to_recurrent(),
            Orientation::Convolutional => self.to_convolutional(),
        }
    }

    pub fn to_native(&self) -> Tensor {
        match &self.data {
            Signal::Series(values) => Tensor::from_parts(vec![values.len()], values.clone()),
            Signal::FrequencyMajor(m) | Signal::TimeMajor(m) => {
                Tensor::from_parts(vec![m.rows(), m.cols()], m.data().to_vec())
            }
        }
    }

    pub fn to_recurrent(&self) -> Tensor {
        match &self.data {
            Signal::Series(values) => Tensor::from_parts(vec![values.len(), 1], values.clone()),
            Signal::FrequencyMajor(m) => {
                let t = m.transpose();
                Tensor::from_parts(vec![t.rows(), t.cols()], t.data().to_vec())
            }
            Signal::TimeMajor(m) => {
                Tensor::from_parts(vec![m.rows(), m.cols()], m.data().to_vec())
            }
        }
    }

    pub fn to_convolutional(&self) -> Tensor {
        self.to_native().with_trailing_axis()
    }
}

/// Lazy iterator over the windows of a signal
///
/// Yields windows in increasing `start` order.
pub struct SlidingWindows<'a> {
    signal: &'a Signal,
    labels: &'a LabelTimeline,
    window_size: usize,
    next_start: usize,
    end: usize,
}

impl<'a> SlidingWindows<'a> {
    pub fn new(signal: &'a Signal, labels: &'a LabelTimeline, window_size: usize) -> Self {
        Self {
            signal,
            labels,
            window_size,
            next_start: 0,
            end: signal.time_len().saturating_sub(window_size),
        }
    }

    /// Drain into a [`SampleBatch`]
    pub fn collect_batch(self) -> SampleBatch {
        SampleBatch::new(self.collect())
    }

    fn cut(&self, start: usize) -> Option<Signal> {
        let end = start + self.window_size;
        let features = self.signal.feature_len();
        match self.signal {
            Signal::Series(values) => values
                .get(start..end)
                .filter(|slice| slice.len() == self.window_size)
                .map(|slice| Signal::Series(slice.to_vec())),
            Signal::FrequencyMajor(m) => m
                .col_range(start, end)
                .filter(|slice| slice.shape() == (features, self.window_size))
                .map(Signal::FrequencyMajor),
            Signal::TimeMajor(m) => m
                .row_range(start, end)
                .filter(|slice| slice.shape() == (self.window_size, features))
                .map(Signal::TimeMajor),
        }
    }
}

impl Iterator for SlidingWindows<'_> {
    type Item = Window;

    fn next(&mut self) -> Option<Window> {
        while self.next_start < self.end {
            let start = self.next_start;
            self.next_start += 1;

            let Some(data) = self.cut(start) else {
                continue;
            };
            let Some(label) = self.labels.get(start + self.window_size / 2) else {
                continue;
            };
            return Some(Window { start, label, data });
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.end.saturating_sub(self.next_start)))
    }
}

/// Build the lazy window sequence for `signal`
pub fn sliding_windows<'a>(
    signal: &'a Signal,
    labels: &'a LabelTimeline,
    window_size: usize,
) -> SlidingWindows<'a> {
    SlidingWindows::new(signal, labels, window_size)
}

/// Split a series into consecutive non-overlapping segments
///
/// The trailing remainder shorter than `segment_length` is dropped.
pub fn chunk_segments(series: &[f32], segment_length: usize) -> Matrix {
    if segment_length == 0 {
        return Matrix::zeros(0, 0);
    }
    let count = series.len() / segment_length;
    let data = series[..count * segment_length].to_vec();
    Matrix::new(count, segment_length, data).unwrap_or_else(|_| Matrix::zeros(0, segment_length))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_spectrogram(freq_bins: usize, time: usize) -> Signal {
        let data = (0..freq_bins * time).map(|v| v as f32).collect();
        Signal::FrequencyMajor(Matrix::new(freq_bins, time, data).unwrap())
    }

    #[test]
    fn test_window_count_and_midpoint_labels() {
        let signal = ramp_spectrogram(4, 20);
        let labels = LabelTimeline::from_policy(&FirstHalfPositive, 20);
        let windows: Vec<Window> = sliding_windows(&signal, &labels, 5).collect();

        assert_eq!(windows.len(), 15);
        for (i, window) in windows.iter().enumerate() {
            assert_eq!(window.start(), i);
            assert_eq!(window.label(), labels.get(i + 5 / 2).unwrap());
            assert_eq!(window.to_native().shape(), &[4, 5]);
        }
        // midpoint of start 8 is 10 -> negative, start 7 -> 9 -> positive
        assert!(windows[7].label());
        assert!(!windows[8].label());
    }

    #[test]
    fn test_even_window_midpoint_uses_integer_division() {
        let signal = Signal::Series((0..10).map(|v| v as f32).collect());
        let labels = LabelTimeline::new((0..10).map(|i| i == 3).collect());
        let windows: Vec<Window> = sliding_windows(&signal, &labels, 4).collect();
        // only start 1 has midpoint 1 + 4 / 2 == 3
        let positives: Vec<usize> = windows
            .iter()
            .filter(|w| w.label())
            .map(Window::start)
            .collect();
        assert_eq!(positives, vec![1]);
    }

    #[test]
    fn test_window_larger_than_signal_yields_nothing() {
        let signal = Signal::Series(vec![1.0; 3]);
        let labels = LabelTimeline::from_policy(&FirstHalfPositive, 3);
        assert_eq!(sliding_windows(&signal, &labels, 4).count(), 0);
        assert_eq!(sliding_windows(&signal, &labels, 3).count(), 0);
    }

    #[test]
    fn test_short_label_timeline_skips_windows() {
        let signal = Signal::Series(vec![0.0; 10]);
        let labels = LabelTimeline::new(vec![true; 5]);
        // midpoints start + 2 must be < 5
        let starts: Vec<usize> = sliding_windows(&signal, &labels, 4)
            .map(|w| w.start())
            .collect();
        assert_eq!(starts, vec![0, 1, 2]);
    }

    #[test]
    fn test_recurrent_orientation_transposes_spectrogram() {
        let signal = ramp_spectrogram(3, 8);
        let labels = LabelTimeline::from_policy(&FirstHalfPositive, 8);
        let window = sliding_windows(&signal, &labels, 4).nth(2).unwrap();

        let native = window.to_native();
        let recurrent = window.to_recurrent();
        let conv = window.to_convolutional();

        assert_eq!(native.shape(), &[3, 4]);
        assert_eq!(recurrent.shape(), &[4, 3]);
        assert_eq!(conv.shape(), &[3, 4, 1]);
        // recurrent[t][f] == native[f][t]
        assert_eq!(recurrent.data()[3 + 1], native.data()[4 + 1]);
        assert_eq!(window.render(Orientation::Convolutional), conv);
    }

    #[test]
    fn test_time_major_windows_slice_rows() {
        let data = (0..30).map(|v| v as f32).collect();
        let signal = Signal::TimeMajor(Matrix::new(10, 3, data).unwrap());
        let labels = LabelTimeline::from_policy(&FirstHalfPositive, 10);
        let first = sliding_windows(&signal, &labels, 4).next().unwrap();
        assert_eq!(first.to_recurrent().shape(), &[4, 3]);
        assert_eq!(&first.to_recurrent().data()[..3], &[0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_rerun_is_identical() {
        let signal = ramp_spectrogram(5, 40);
        let labels = LabelTimeline::from_policy(&Alternating, 40);
        let a: Vec<Window> = sliding_windows(&signal, &labels, 6).collect();
        let b: Vec<Window> = sliding_windows(&signal, &labels, 6).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_chunk_segments_drops_remainder() {
        let series: Vec<f32> = (0..25).map(|v| v as f32).collect();
        let segments = chunk_segments(&series, 10);
        assert_eq!(segments.shape(), (2, 10));
        assert_eq!(segments.row(1).unwrap()[0], 10.0);
        assert_eq!(chunk_segments(&series, 0).shape(), (0, 0));
    }
}
