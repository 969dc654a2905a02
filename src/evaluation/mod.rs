//! Offline evaluation of models on a held-out window batch.
//!
//! Predictions are thresholded with [`decide`] and tallied into a
//! [`ConfusionMatrix`]; ratios whose denominator is zero are reported as 0.

use std::fmt::Write as _;

use serde::Serialize;

use crate::error::ModelError;
use crate::model::{decide, Model};
use crate::normalize::ModelFamily;
use crate::windowing::{Orientation, SampleBatch};

/// Binary confusion counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ConfusionMatrix {
    pub true_positive: usize,
    pub false_positive: usize,
    pub true_negative: usize,
    pub false_negative: usize,
}

impl ConfusionMatrix {
    pub fn from_pairs(actual: &[bool], predicted: &[bool]) -> Self {
        let mut matrix = Self::default();
        for (&truth, &guess) in actual.iter().zip(predicted) {
            matrix.record(truth, guess);
        }
        matrix
    }

    pub fn record(&mut self, actual: bool, predicted: bool) {
        match (actual, predicted) {
            (true, true) => self.true_positive += 1,
            (false, true) => self.false_positive += 1,
            (false, false) => self.true_negative += 1,
            (true, false) => self.false_negative += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.true_positive + self.false_positive + self.true_negative + self.false_negative
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.true_positive + self.true_negative, self.total())
    }

    pub fn precision(&self) -> f64 {
        ratio(self.true_positive, self.true_positive + self.false_positive)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.true_positive, self.true_positive + self.false_negative)
    }

    pub fn f1(&self) -> f64 {
        let (p, r) = (self.precision(), self.recall());
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Metrics for one model on one batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub name: String,
    pub confusion: ConfusionMatrix,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl EvaluationReport {
    pub fn new(name: impl Into<String>, confusion: ConfusionMatrix) -> Self {
        Self {
            name: name.into(),
            accuracy: confusion.accuracy(),
            precision: confusion.precision(),
            recall: confusion.recall(),
            f1: confusion.f1(),
            confusion,
        }
    }
}

/// Window layout a model family consumes
pub fn orientation_for(family: ModelFamily) -> Orientation {
    match family {
        ModelFamily::Recurrent => Orientation::Recurrent,
        ModelFamily::Convolutional => Orientation::Convolutional,
    }
}

/// Score `model` on every window of `batch`
///
/// The batch is stacked in the layout of the model's family and predicted in
/// one call. An empty batch yields an all-zero report.
pub fn evaluate(
    name: &str,
    model: &dyn Model,
    batch: &SampleBatch,
) -> Result<EvaluationReport, ModelError> {
    if batch.is_empty() {
        log::warn!("[Eval] {}: empty batch, nothing to score", name);
        return Ok(EvaluationReport::new(name, ConfusionMatrix::default()));
    }

    let input = batch.stack(orientation_for(model.family()))?;
    let probabilities = model.predict(&input)?;
    if probabilities.len() != batch.len() {
        return Err(ModelError::InputRejected {
            reason: format!(
                "model returned {} predictions for {} windows",
                probabilities.len(),
                batch.len()
            ),
        });
    }

    let predicted: Vec<bool> = probabilities.iter().map(|&p| decide(p)).collect();
    let confusion = ConfusionMatrix::from_pairs(&batch.labels(), &predicted);
    log::info!(
        "[Eval] {}: {} windows, accuracy={:.4} f1={:.4}",
        name,
        confusion.total(),
        confusion.accuracy(),
        confusion.f1()
    );
    Ok(EvaluationReport::new(name, confusion))
}

/// Evaluate several named models on the same batch, in the given order
pub fn compare<'a, I>(models: I, batch: &SampleBatch) -> Result<Vec<EvaluationReport>, ModelError>
where
    I: IntoIterator<Item = (&'a str, &'a dyn Model)>,
{
    models
        .into_iter()
        .map(|(name, model)| evaluate(name, model, batch))
        .collect()
}

/// Fixed-width comparison table, one row per report
pub fn render_table(reports: &[EvaluationReport]) -> String {
    let width = reports
        .iter()
        .map(|r| r.name.len())
        .max()
        .unwrap_or(0)
        .max("model".len());

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<width$}  {:>8}  {:>9}  {:>6}  {:>6}",
        "model", "accuracy", "precision", "recall", "f1"
    );
    for report in reports {
        let _ = writeln!(
            out,
            "{:<width$}  {:>8.4}  {:>9.4}  {:>6.4}  {:>6.4}",
            report.name, report.accuracy, report.precision, report.recall, report.f1
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PooledLogisticModel;
    use crate::signal::{Matrix, Signal, Tensor};
    use crate::windowing::{sliding_windows, LabelTimeline};

    /// Positive when the first feature of the input is large
    struct FirstValueModel;

    impl Model for FirstValueModel {
        fn family(&self) -> ModelFamily {
            ModelFamily::Recurrent
        }

        fn predict(&self, input: &Tensor) -> Result<Vec<f32>, ModelError> {
            let item = input.data().len() / input.shape()[0];
            Ok(input
                .data()
                .chunks(item)
                .map(|c| if c[0] > 5.0 { 0.9 } else { 0.1 })
                .collect())
        }
    }

    #[test]
    fn test_metrics() {
        let m = ConfusionMatrix {
            true_positive: 3,
            false_positive: 1,
            true_negative: 4,
            false_negative: 2,
        };
        assert_eq!(m.total(), 10);
        assert!((m.accuracy() - 0.7).abs() < 1e-12);
        assert!((m.precision() - 0.75).abs() < 1e-12);
        assert!((m.recall() - 0.6).abs() < 1e-12);
        assert!((m.f1() - 2.0 * 0.75 * 0.6 / 1.35).abs() < 1e-12);
    }

    #[test]
    fn test_zero_division_is_zero() {
        let m = ConfusionMatrix::from_pairs(&[false, false], &[false, false]);
        assert_eq!(m.accuracy(), 1.0);
        assert_eq!(m.precision(), 0.0);
        assert_eq!(m.recall(), 0.0);
        assert_eq!(m.f1(), 0.0);
        assert_eq!(ConfusionMatrix::default().accuracy(), 0.0);
    }

    #[test]
    fn test_evaluate_on_windows() {
        // time-major ramp; windows starting past 5 have a large first value
        let data: Vec<f32> = (0..20).flat_map(|t| [t as f32, 0.0]).collect();
        let signal = Signal::TimeMajor(Matrix::new(20, 2, data).unwrap());
        let labels = LabelTimeline::new((0..20).map(|t| t >= 8).collect());
        let batch = sliding_windows(&signal, &labels, 4).collect_batch();
        assert_eq!(batch.len(), 16);

        let report = evaluate("ramp", &FirstValueModel, &batch).unwrap();
        assert_eq!(report.confusion.total(), 16);
        assert_eq!(report.accuracy, 1.0);
        assert_eq!(report.f1, 1.0);
    }

    #[test]
    fn test_compare_and_table() {
        let signal = Signal::TimeMajor(Matrix::new(10, 2, vec![0.5; 20]).unwrap());
        let labels = LabelTimeline::new(vec![true; 10]);
        let batch = sliding_windows(&signal, &labels, 4).collect_batch();

        let always = PooledLogisticModel::new(ModelFamily::Recurrent, vec![0.0, 0.0], 5.0);
        let never = PooledLogisticModel::new(ModelFamily::Recurrent, vec![0.0, 0.0], -5.0);
        let reports = compare(
            [("always", &always as &dyn Model), ("never", &never as &dyn Model)],
            &batch,
        )
        .unwrap();

        assert_eq!(reports[0].recall, 1.0);
        assert_eq!(reports[1].recall, 0.0);

        let table = render_table(&reports);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("model"));
        assert!(lines[1].starts_with("always"));
        assert_eq!(lines[1].len(), lines[2].len());
    }

    #[test]
    fn test_feature_mismatch_propagates() {
        let signal = Signal::TimeMajor(Matrix::new(10, 3, vec![0.5; 30]).unwrap());
        let labels = LabelTimeline::new(vec![true; 10]);
        let batch = sliding_windows(&signal, &labels, 4).collect_batch();
        let model = PooledLogisticModel::new(ModelFamily::Recurrent, vec![0.0, 0.0], 0.0);
        assert!(matches!(
            evaluate("mismatch", &model, &batch),
            Err(ModelError::InputRejected { .. })
        ));
    }

    #[test]
    fn test_empty_batch() {
        let model = PooledLogisticModel::new(ModelFamily::Recurrent, vec![0.0], 0.0);
        let report = evaluate("empty", &model, &SampleBatch::default()).unwrap();
        assert_eq!(report.confusion.total(), 0);
    }
}
