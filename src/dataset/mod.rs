//! Dataset loading and preprocessing.
//!
//! Raw inputs (WAV traces, CSV track tables) are turned into [`Signal`]s and
//! cached as JSON arrays for the windowing and evaluation steps.
//!
//! [`Signal`]: crate::signal::Signal

mod arrays;
mod cyclone;
mod spectrogram;
mod waveform;

pub use arrays::{load_signal, save_signal, ArrayFile};
pub use cyclone::{read_tracks, read_tracks_from, Observation, TrackSet};
pub use spectrogram::SpectrogramExtractor;
pub use waveform::{normalize_peak, read_waveform};
