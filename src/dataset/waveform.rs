// Waveform - raw seismic trace loading and peak normalization

use std::path::Path;

use hound::{SampleFormat, WavReader};

use crate::error::DataError;

/// Read the first channel of a WAV file as raw `f32` amplitudes
///
/// Integer samples keep their integer magnitude; scale is removed later by
/// [`normalize_peak`].
pub fn read_waveform<P: AsRef<Path>>(path: P) -> Result<Vec<f32>, DataError> {
    let mut reader = WavReader::open(&path)?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .step_by(channels)
            .collect::<Result<_, _>>()?,
        SampleFormat::Int => reader
            .samples::<i32>()
            .step_by(channels)
            .map(|s| s.map(|v| v as f32))
            .collect::<Result<_, _>>()?,
    };

    if samples.is_empty() {
        return Err(DataError::EmptyInput {
            what: format!("waveform {}", path.as_ref().display()),
        });
    }

    log::info!(
        "[Waveform] Read {} samples at {} Hz from {}",
        samples.len(),
        spec.sample_rate,
        path.as_ref().display()
    );
    Ok(samples)
}

/// Scale a trace into `[-1, 1]` by its largest absolute amplitude
///
/// A silent (all-zero) trace is returned unchanged.
pub fn normalize_peak(samples: &[f32]) -> Vec<f32> {
    let peak = samples
        .iter()
        .filter(|s| s.is_finite())
        .fold(0.0f32, |acc, s| acc.max(s.abs()));
    if peak <= 0.0 {
        return samples.to_vec();
    }
    samples.iter().map(|s| s / peak).collect()
}
