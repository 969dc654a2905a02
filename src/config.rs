//! Configuration management for preprocessing, windowing and serving
//!
//! Configuration is loaded from a JSON file so window sizes, split seeds,
//! spectrogram parameters and per-domain model contracts can be changed
//! without recompiling. A missing or unreadable file falls back to the
//! defaults below, which reproduce the seismic/cyclone deployment.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::gate::DEFAULT_INPUT_FIELD;
use crate::normalize::{AxisOrder, ModelFamily};

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub windowing: WindowingConfig,
    #[serde(default)]
    pub spectrogram: SpectrogramConfig,
    #[serde(default = "default_models")]
    pub models: Vec<ModelConfig>,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Domain answering the bare `/predict` route
    pub default_domain: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            default_domain: None,
        }
    }
}

/// Sliding-window sample construction parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowingConfig {
    /// Window width along the time axis
    pub window_size: usize,
    /// Fraction of windows held out for testing
    pub test_ratio: f64,
    /// Seed for the train/test shuffle
    pub seed: u64,
    /// Wind speed (knots) above which a cyclone observation is positive
    pub label_threshold: f32,
}

impl Default for WindowingConfig {
    fn default() -> Self {
        Self {
            window_size: 64,
            test_ratio: 0.2,
            seed: 42,
            label_threshold: 50.0,
        }
    }
}

/// Short-time power spectrum parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpectrogramConfig {
    /// Samples per segment
    pub nperseg: usize,
    /// Samples shared by consecutive segments
    pub noverlap: usize,
    /// Added before taking the logarithm
    pub log_floor: f32,
}

impl Default for SpectrogramConfig {
    fn default() -> Self {
        Self {
            nperseg: 256,
            noverlap: 128,
            log_floor: 1e-10,
        }
    }
}

/// One served model and its input contract
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub domain: String,
    /// Extra path segments routed to the same model
    #[serde(default)]
    pub aliases: Vec<String>,
    pub artifact: PathBuf,
    pub family: ModelFamily,
    #[serde(default)]
    pub axis_order: AxisOrder,
    #[serde(default = "default_input_field")]
    pub input_field: String,
    pub expected_rows: usize,
    pub expected_cols: usize,
}

fn default_input_field() -> String {
    DEFAULT_INPUT_FIELD.to_string()
}

fn default_models() -> Vec<ModelConfig> {
    vec![
        ModelConfig {
            domain: "earthquake".to_string(),
            aliases: vec!["seismic".to_string()],
            artifact: PathBuf::from("models/seismic_best_gru.json"),
            family: ModelFamily::Recurrent,
            axis_order: AxisOrder::TimeMajor,
            input_field: default_input_field(),
            expected_rows: 64,
            expected_cols: 129,
        },
        ModelConfig {
            domain: "cyclone".to_string(),
            aliases: Vec::new(),
            artifact: PathBuf::from("models/cyclone_best_gru.json"),
            family: ModelFamily::Recurrent,
            axis_order: AxisOrder::TimeMajor,
            input_field: default_input_field(),
            expected_rows: 64,
            expected_cols: 6,
        },
    ]
}

impl Default for AppConfig {
    /// Default configuration values (fallback if config file not found)
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            windowing: WindowingConfig::default(),
            spectrogram: SpectrogramConfig::default(),
            models: default_models(),
        }
    }
}

impl AppConfig {
    /// Load configuration from JSON file
    ///
    /// # Returns
    /// The parsed configuration, or the defaults if the file doesn't exist
    /// or its JSON is invalid
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Load from `config/hazard.json` relative to the working directory
    pub fn load() -> Self {
        Self::load_from_file("config/hazard.json")
    }

    pub fn model(&self, domain: &str) -> Option<&ModelConfig> {
        self.models
            .iter()
            .find(|m| m.domain == domain || m.aliases.iter().any(|a| a == domain))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.windowing.window_size, 64);
        assert_eq!(config.windowing.test_ratio, 0.2);
        assert_eq!(config.windowing.seed, 42);
        assert_eq!(config.spectrogram.nperseg, 256);
        assert_eq!(config.spectrogram.noverlap, 128);
        assert_eq!(config.server.port, 5000);

        let seismic = config.model("seismic").unwrap();
        assert_eq!(seismic.domain, "earthquake");
        assert_eq!((seismic.expected_rows, seismic.expected_cols), (64, 129));
        let cyclone = config.model("cyclone").unwrap();
        assert_eq!((cyclone.expected_rows, cyclone.expected_cols), (64, 6));
        assert!(config.model("volcano").is_none());
    }

    #[test]
    fn test_json_roundtrip() {
        let config = AppConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.windowing.seed, config.windowing.seed);
        assert_eq!(parsed.models.len(), config.models.len());
        assert_eq!(parsed.models[1].family, ModelFamily::Recurrent);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "windowing": {{ "window_size": 32, "test_ratio": 0.25, "seed": 1, "label_threshold": 64.0 }} }}"#).unwrap();

        let config = AppConfig::load_from_file(file.path());
        assert_eq!(config.windowing.window_size, 32);
        assert_eq!(config.spectrogram.nperseg, 256);
        assert_eq!(config.models.len(), 2);
    }

    #[test]
    fn test_model_entry_defaults() {
        let entry: ModelConfig = serde_json::from_str(
            r#"{ "domain": "cyclone", "artifact": "m.json", "family": "convolutional",
                 "expected_rows": 64, "expected_cols": 6 }"#,
        )
        .unwrap();
        assert_eq!(entry.input_field, "spectrogram");
        assert_eq!(entry.axis_order, AxisOrder::TimeMajor);
        assert!(entry.aliases.is_empty());
    }

    #[test]
    fn test_invalid_file_falls_back() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let config = AppConfig::load_from_file(file.path());
        assert_eq!(config.windowing.window_size, 64);

        let config = AppConfig::load_from_file("/no/such/config.json");
        assert_eq!(config.models.len(), 2);
    }
}
