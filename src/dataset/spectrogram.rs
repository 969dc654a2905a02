// Spectrogram - log power spectral density over overlapping segments
//
// Each segment of `nperseg` samples (advancing by `nperseg - noverlap`) has
// its mean removed, is shaped by a periodic Tukey window (alpha = 0.25) and
// transformed; the one-sided density |X|^2 / sum(w^2) is doubled for every
// bin except DC and Nyquist. The result is ln(P + log_floor), laid out as
// (frequency, time) with nperseg / 2 + 1 frequency rows.

use rustfft::{num_complex::Complex, FftPlanner};
use std::sync::{Arc, Mutex};

use crate::config::SpectrogramConfig;
use crate::error::DataError;
use crate::signal::{Matrix, Signal};

const TUKEY_ALPHA: f32 = 0.25;

pub struct SpectrogramExtractor {
    fft_planner: Arc<Mutex<FftPlanner<f32>>>,
    nperseg: usize,
    step: usize,
    log_floor: f32,
    window: Vec<f32>,
    /// sum(w^2), the density normalisation
    window_power: f32,
}

impl SpectrogramExtractor {
    pub fn new(config: &SpectrogramConfig) -> Result<Self, DataError> {
        if config.nperseg == 0 || config.noverlap >= config.nperseg {
            return Err(DataError::InvalidShape {
                reason: format!(
                    "noverlap ({}) must be smaller than nperseg ({})",
                    config.noverlap, config.nperseg
                ),
            });
        }

        let window = periodic_tukey(config.nperseg, TUKEY_ALPHA);
        let window_power = window.iter().map(|w| w * w).sum();

        Ok(Self {
            fft_planner: Arc::new(Mutex::new(FftPlanner::new())),
            nperseg: config.nperseg,
            step: config.nperseg - config.noverlap,
            log_floor: config.log_floor,
            window,
            window_power,
        })
    }

    pub fn freq_bins(&self) -> usize {
        self.nperseg / 2 + 1
    }

    /// Number of full segments a signal of `len` samples yields
    pub fn segment_count(&self, len: usize) -> usize {
        if len < self.nperseg {
            0
        } else {
            (len - self.nperseg) / self.step + 1
        }
    }

    pub fn compute(&self, samples: &[f32]) -> Result<Signal, DataError> {
        let segments = self.segment_count(samples.len());
        if segments == 0 {
            return Err(DataError::EmptyInput {
                what: format!(
                    "waveform of {} samples is shorter than one {}-sample segment",
                    samples.len(),
                    self.nperseg
                ),
            });
        }

        let bins = self.freq_bins();
        let fft = {
            let mut planner = self.fft_planner.lock().map_err(|_| DataError::InvalidShape {
                reason: "FFT planner lock poisoned".to_string(),
            })?;
            planner.plan_fft_forward(self.nperseg)
        };

        let mut output = Matrix::zeros(bins, segments);
        let mut buffer = vec![Complex::new(0.0f32, 0.0); self.nperseg];
        for t in 0..segments {
            let segment = &samples[t * self.step..t * self.step + self.nperseg];
            let mean = segment.iter().sum::<f32>() / self.nperseg as f32;
            for ((slot, &x), &w) in buffer.iter_mut().zip(segment).zip(&self.window) {
                *slot = Complex::new((x - mean) * w, 0.0);
            }
            fft.process(&mut buffer);

            for (f, value) in buffer[..bins].iter().enumerate() {
                let mut power = value.norm_sqr() / self.window_power;
                let is_nyquist = self.nperseg % 2 == 0 && f == bins - 1;
                if f != 0 && !is_nyquist {
                    power *= 2.0;
                }
                output.set(f, t, (power + self.log_floor).ln());
            }
        }

        Ok(Signal::FrequencyMajor(output))
    }
}

/// Periodic Tukey window: the symmetric window of length `len + 1` without
/// its last point
fn periodic_tukey(len: usize, alpha: f32) -> Vec<f32> {
    let span = len as f32; // (len + 1) - 1
    (0..len)
        .map(|n| {
            let x = n as f32 / span;
            if x < alpha / 2.0 {
                0.5 * (1.0 + (std::f32::consts::PI * (2.0 * x / alpha - 1.0)).cos())
            } else if x > 1.0 - alpha / 2.0 {
                0.5 * (1.0 + (std::f32::consts::PI * (2.0 * x / alpha - 2.0 / alpha + 1.0)).cos())
            } else {
                1.0
            }
        })
        .collect()
}
