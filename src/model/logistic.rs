// Pooled logistic model - mean-pool every axis except batch and features,
// then apply a logistic unit.
//
// Artifact format (JSON):
//   { "family": "recurrent", "feature_axis": 2, "weights": [...], "bias": 0.0 }
//
// Pooling makes the model accept any number of time steps, so a single-row
// request and a full 64-row request are both valid inputs.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::Model;
use crate::error::ModelError;
use crate::normalize::ModelFamily;
use crate::signal::Tensor;

fn default_feature_axis() -> usize {
    2
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PooledLogisticModel {
    family: ModelFamily,
    #[serde(default = "default_feature_axis")]
    feature_axis: usize,
    weights: Vec<f32>,
    bias: f32,
}

impl PooledLogisticModel {
    pub fn new(family: ModelFamily, weights: Vec<f32>, bias: f32) -> Self {
        Self {
            family,
            feature_axis: default_feature_axis(),
            weights,
            bias,
        }
    }

    pub fn with_feature_axis(mut self, axis: usize) -> Result<Self, ModelError> {
        self.feature_axis = axis;
        self.validate()?;
        Ok(self)
    }

    pub fn feature_count(&self) -> usize {
        self.weights.len()
    }

    /// Read and validate a JSON artifact
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let contents =
            fs::read_to_string(&path).map_err(|err| ModelError::ArtifactUnreadable {
                path: path.as_ref().display().to_string(),
                details: err.to_string(),
            })?;
        Self::from_json(&contents)
    }

    pub fn from_json(data: &str) -> Result<Self, ModelError> {
        let model: PooledLogisticModel =
            serde_json::from_str(data).map_err(|err| ModelError::ArtifactInvalid {
                reason: err.to_string(),
            })?;
        model.validate()?;
        Ok(model)
    }

    pub fn to_json(&self) -> Result<String, ModelError> {
        serde_json::to_string_pretty(self).map_err(|err| ModelError::ArtifactInvalid {
            reason: err.to_string(),
        })
    }

    fn validate(&self) -> Result<(), ModelError> {
        if self.weights.is_empty() {
            return Err(ModelError::ArtifactInvalid {
                reason: "weights must not be empty".to_string(),
            });
        }
        if self.feature_axis == 0 {
            return Err(ModelError::ArtifactInvalid {
                reason: "feature_axis 0 is the batch axis".to_string(),
            });
        }
        if !self.bias.is_finite() || self.weights.iter().any(|w| !w.is_finite()) {
            return Err(ModelError::ArtifactInvalid {
                reason: "weights and bias must be finite".to_string(),
            });
        }
        Ok(())
    }
}

impl Model for PooledLogisticModel {
    fn family(&self) -> ModelFamily {
        self.family
    }

    fn predict(&self, input: &Tensor) -> Result<Vec<f32>, ModelError> {
        let shape = input.shape();
        if self.feature_axis >= shape.len() {
            return Err(ModelError::InputRejected {
                reason: format!(
                    "feature axis {} out of range for rank {} input",
                    self.feature_axis,
                    shape.len()
                ),
            });
        }
        let features = shape[self.feature_axis];
        if features != self.weights.len() {
            return Err(ModelError::InputRejected {
                reason: format!(
                    "expected {} features, got {}",
                    self.weights.len(),
                    features
                ),
            });
        }

        let batch = shape[0];
        let item_len: usize = shape[1..].iter().product();
        let stride: usize = shape[self.feature_axis + 1..].iter().product();
        let per_feature = if features > 0 { item_len / features } else { 0 };

        let mut probabilities = Vec::with_capacity(batch);
        let mut sums = vec![0.0f32; features];
        for item in input.data().chunks(item_len.max(1)).take(batch) {
            sums.iter_mut().for_each(|s| *s = 0.0);
            for (offset, &value) in item.iter().enumerate() {
                sums[(offset / stride) % features] += value;
            }
            let logit = self.bias
                + sums
                    .iter()
                    .zip(&self.weights)
                    .map(|(sum, weight)| {
                        if per_feature > 0 {
                            weight * sum / per_feature as f32
                        } else {
                            0.0
                        }
                    })
                    .sum::<f32>();
            probabilities.push(sigmoid(logit));
        }
        // zero-sized items produce no chunks; score them as bias only
        while probabilities.len() < batch {
            probabilities.push(sigmoid(self.bias));
        }
        Ok(probabilities)
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_model_predicts_one_half() {
        let model = PooledLogisticModel::new(ModelFamily::Recurrent, vec![0.0; 6], 0.0);
        let input = Tensor::new(vec![1, 64, 6], vec![0.1; 64 * 6]).unwrap();
        let out = model.predict(&input).unwrap();
        assert_eq!(out.len(), 1);
        assert!((out[0] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_pooling_ignores_step_count() {
        let model = PooledLogisticModel::new(ModelFamily::Recurrent, vec![1.0, -2.0], 0.3);
        let one = Tensor::new(vec![1, 1, 2], vec![0.5, 0.25]).unwrap();
        let many = Tensor::new(vec![1, 3, 2], vec![0.5, 0.25, 0.5, 0.25, 0.5, 0.25]).unwrap();
        let a = model.predict(&one).unwrap()[0];
        let b = model.predict(&many).unwrap()[0];
        assert!((a - b).abs() < 1e-6);
        assert!((a - sigmoid(0.3 + 0.5 - 0.5)).abs() < 1e-6);
    }

    #[test]
    fn test_convolutional_channel_axis_is_pooled() {
        let model = PooledLogisticModel::new(ModelFamily::Convolutional, vec![4.0, 0.0], 0.0);
        let input = Tensor::new(vec![2, 2, 2, 1], vec![1.0, 0.0, 1.0, 0.0, 0.0, 9.0, 0.0, 9.0])
            .unwrap();
        let out = model.predict(&input).unwrap();
        assert_eq!(out.len(), 2);
        assert!(out[0] > 0.9);
        assert!((out[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_feature_mismatch_rejected() {
        let model = PooledLogisticModel::new(ModelFamily::Recurrent, vec![0.0; 6], 0.0);
        let input = Tensor::new(vec![1, 2, 5], vec![0.0; 10]).unwrap();
        assert!(matches!(
            model.predict(&input),
            Err(ModelError::InputRejected { .. })
        ));
    }

    #[test]
    fn test_artifact_validation() {
        assert!(PooledLogisticModel::from_json(
            r#"{"family":"recurrent","weights":[],"bias":0.0}"#
        )
        .is_err());
        assert!(PooledLogisticModel::from_json(
            r#"{"family":"recurrent","feature_axis":0,"weights":[1.0],"bias":0.0}"#
        )
        .is_err());
        let model = PooledLogisticModel::from_json(
            r#"{"family":"convolutional","weights":[1.0,2.0],"bias":-1.0}"#,
        )
        .unwrap();
        assert_eq!(model.family(), ModelFamily::Convolutional);
        assert_eq!(model.feature_count(), 2);
    }

    #[test]
    fn test_feature_axis_setter_validates() {
        let model = PooledLogisticModel::new(ModelFamily::Recurrent, vec![4.0, 0.0], 0.0);
        assert!(matches!(
            model.clone().with_feature_axis(0),
            Err(ModelError::ArtifactInvalid { .. })
        ));

        // features along the time axis of a (1, 2, 3) input
        let model = model.with_feature_axis(1).unwrap();
        let input = Tensor::new(vec![1, 2, 3], vec![1.0, 1.0, 1.0, 9.0, 9.0, 9.0]).unwrap();
        assert!(model.predict(&input).unwrap()[0] > 0.9);
    }

    #[test]
    fn test_json_roundtrip() {
        let model = PooledLogisticModel::new(ModelFamily::Recurrent, vec![0.1, 0.2], 0.5);
        let json = model.to_json().unwrap();
        assert_eq!(PooledLogisticModel::from_json(&json).unwrap(), model);
    }
}
