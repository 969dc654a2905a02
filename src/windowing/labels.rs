// Labels - pluggable labelling policies for the label timeline
//
// The timeline is external ground truth injected for supervised training.
// None of these policies is learned; they are placeholders that callers pick
// per task.

/// Binary labels aligned 1:1 with a signal's time axis
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LabelTimeline(Vec<bool>);

impl LabelTimeline {
    pub fn new(labels: Vec<bool>) -> Self {
        Self(labels)
    }

    /// Materialise `len` labels from a policy
    pub fn from_policy(policy: &dyn LabelPolicy, len: usize) -> Self {
        Self((0..len).map(|index| policy.label(index, len)).collect())
    }

    pub fn get(&self, index: usize) -> Option<bool> {
        self.0.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn positives(&self) -> usize {
        self.0.iter().filter(|&&label| label).count()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.0
    }
}

/// Rule deriving the label at `index` of a timeline of length `len`
pub trait LabelPolicy: Send + Sync {
    fn label(&self, index: usize, len: usize) -> bool;
}

/// First half of the timeline positive, second half negative
///
/// Positive iff `index < len / 2` (integer division).
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstHalfPositive;

impl LabelPolicy for FirstHalfPositive {
    fn label(&self, index: usize, len: usize) -> bool {
        index < len / 2
    }
}

/// Even indices positive, odd indices negative
#[derive(Debug, Clone, Copy, Default)]
pub struct Alternating;

impl LabelPolicy for Alternating {
    fn label(&self, index: usize, _len: usize) -> bool {
        index % 2 == 0
    }
}

/// Positive where a reference series strictly exceeds a threshold
///
/// Indices past the end of the reference series and NaN values are negative.
#[derive(Debug, Clone)]
pub struct AboveThreshold {
    values: Vec<f32>,
    threshold: f32,
}

impl AboveThreshold {
    pub fn new(values: Vec<f32>, threshold: f32) -> Self {
        Self { values, threshold }
    }
}

impl LabelPolicy for AboveThreshold {
    fn label(&self, index: usize, _len: usize) -> bool {
        self.values
            .get(index)
            .map(|&value| value > self.threshold)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_half_positive_odd_length() {
        let timeline = LabelTimeline::from_policy(&FirstHalfPositive, 7);
        assert_eq!(
            timeline.as_slice(),
            &[true, true, true, false, false, false, false]
        );
        assert_eq!(timeline.positives(), 3);
    }

    #[test]
    fn test_alternating() {
        let timeline = LabelTimeline::from_policy(&Alternating, 4);
        assert_eq!(timeline.as_slice(), &[true, false, true, false]);
    }

    #[test]
    fn test_above_threshold_is_strict() {
        let policy = AboveThreshold::new(vec![10.0, 50.0, 50.5, f32::NAN], 50.0);
        let timeline = LabelTimeline::from_policy(&policy, 5);
        assert_eq!(timeline.as_slice(), &[false, false, true, false, false]);
    }
}
