//! Per-request inference gate.
//!
//! For one decoded request body the gate checks model availability, extracts
//! the configured input field, validates it against the [`ShapeContract`],
//! normalizes it for the model family, invokes the model and thresholds the
//! result. Every failure comes back as an [`InferenceError`]; nothing is
//! retried and no state survives between requests.

mod contract;

pub use contract::{ObservedShape, ShapeContract};

use std::panic::{self, AssertUnwindSafe};

use serde::Serialize;
use serde_json::Value;

use crate::config::ModelConfig;
use crate::error::{log_inference_error, ErrorCode, InferenceError};
use crate::model::{decide, Model, ModelSlot};
use crate::normalize::{normalize, AxisOrder, ModelFamily, Sample};

/// Default request field carrying the input array
pub const DEFAULT_INPUT_FIELD: &str = "spectrogram";

/// Successful gate outcome
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    /// Raw model output in `[0, 1]`
    pub probability: f32,
    /// `probability > 0.5`
    pub positive: bool,
}

/// Immutable per-domain gate; shared by reference across requests
#[derive(Debug, Clone)]
pub struct InferenceGate {
    domain: String,
    field: String,
    contract: ShapeContract,
    family: ModelFamily,
    axis_order: AxisOrder,
    model: ModelSlot,
}

impl InferenceGate {
    pub fn new(
        domain: impl Into<String>,
        contract: ShapeContract,
        family: ModelFamily,
        model: ModelSlot,
    ) -> Self {
        let domain = domain.into();
        if let Some(loaded) = model.model() {
            if loaded.family() != family {
                log::warn!(
                    "[Gate] {} configured as {:?} but model reports {:?}; normalizing for {:?}",
                    domain,
                    family,
                    loaded.family(),
                    family
                );
            }
        }
        Self {
            domain,
            field: DEFAULT_INPUT_FIELD.to_string(),
            contract,
            family,
            axis_order: AxisOrder::TimeMajor,
            model,
        }
    }

    /// Build a gate from configuration, loading the model artifact now
    pub fn from_config(config: &ModelConfig) -> Self {
        let slot = ModelSlot::load(&config.artifact);
        Self::new(
            config.domain.clone(),
            ShapeContract::new(config.expected_rows, config.expected_cols),
            config.family,
            slot,
        )
        .with_field(config.input_field.clone())
        .with_axis_order(config.axis_order)
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }

    pub fn with_axis_order(mut self, axis_order: AxisOrder) -> Self {
        self.axis_order = axis_order;
        self
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn contract(&self) -> ShapeContract {
        self.contract
    }

    pub fn family(&self) -> ModelFamily {
        self.family
    }

    pub fn is_loaded(&self) -> bool {
        self.model.is_ready()
    }

    /// Fail with `ModelUnavailable` when no model is loaded
    ///
    /// Callers holding raw request bytes run this before decoding them, so an
    /// unloaded domain rejects every request the same way.
    pub fn ensure_loaded(&self) -> Result<(), InferenceError> {
        self.loaded_model().map(|_| ()).map_err(|err| {
            log_inference_error(&err, &self.domain);
            err
        })
    }

    fn loaded_model(&self) -> Result<&dyn Model, InferenceError> {
        match &self.model {
            ModelSlot::Ready(model) => Ok(model.as_ref()),
            ModelSlot::Unavailable { reason, .. } => Err(InferenceError::ModelUnavailable {
                domain: self.domain.clone(),
                reason: reason.clone(),
            }),
        }
    }

    /// Run the full gate on a request body, logging any failure
    pub fn predict(&self, body: &Value) -> Result<Prediction, InferenceError> {
        let result = self.run(body);
        match &result {
            Ok(prediction) => log::debug!(
                "[Gate] {} probability={:.4} positive={}",
                self.domain,
                prediction.probability,
                prediction.positive
            ),
            Err(err) => log_inference_error(err, &self.domain),
        }
        result
    }

    fn run(&self, body: &Value) -> Result<Prediction, InferenceError> {
        let model = self.loaded_model()?;

        let sample = self.validate(body)?;
        let tensor = normalize(&sample, self.family, self.axis_order);
        log::debug!("[Gate] {} prepared input shape {:?}", self.domain, tensor.shape());

        let outputs = panic::catch_unwind(AssertUnwindSafe(|| model.predict(&tensor)))
            .map_err(|_| InferenceError::Internal {
                message: "model invocation panicked".to_string(),
            })?
            .map_err(|err| InferenceError::Internal {
                message: err.message(),
            })?;

        let probability = outputs
            .first()
            .copied()
            .ok_or_else(|| InferenceError::Internal {
                message: "model returned no output".to_string(),
            })?;
        if !(0.0..=1.0).contains(&probability) {
            return Err(InferenceError::Internal {
                message: format!("model returned out-of-range probability {}", probability),
            });
        }

        Ok(Prediction {
            probability,
            positive: decide(probability),
        })
    }

    /// Extract and validate the input field without touching the model
    pub fn validate(&self, body: &Value) -> Result<Sample, InferenceError> {
        let value = body
            .as_object()
            .and_then(|object| object.get(&self.field))
            .filter(|value| !value.is_null())
            .ok_or_else(|| InferenceError::MissingField {
                field: self.field.clone(),
            })?;

        let mismatch = |actual| InferenceError::ShapeMismatch {
            expected: self.contract,
            actual,
        };

        let rows = value
            .as_array()
            .ok_or_else(|| mismatch(ObservedShape::NotAnArray))?;
        if !self.contract.accepts_rows(rows.len()) {
            return Err(mismatch(ObservedShape::Rows { rows: rows.len() }));
        }

        let mut parsed = Vec::with_capacity(rows.len());
        for (row_index, row) in rows.iter().enumerate() {
            let cells = row
                .as_array()
                .ok_or_else(|| mismatch(ObservedShape::RowNotArray { row: row_index }))?;
            if cells.len() != self.contract.expected_cols {
                return Err(mismatch(ObservedShape::RowWidth {
                    row: row_index,
                    cols: cells.len(),
                }));
            }
            let mut values = Vec::with_capacity(cells.len());
            for (col_index, cell) in cells.iter().enumerate() {
                let wide = cell
                    .as_f64()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| {
                        mismatch(ObservedShape::NonNumeric {
                            row: row_index,
                            col: col_index,
                        })
                    })?;
                let number = wide as f32;
                if !number.is_finite() {
                    return Err(mismatch(ObservedShape::OutOfRange {
                        row: row_index,
                        col: col_index,
                    }));
                }
                values.push(number);
            }
            parsed.push(values);
        }

        Ok(Sample::Matrix(parsed))
    }
}
