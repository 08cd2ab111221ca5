use serde::{Deserialize, Serialize};

use crate::classifier::Label;

/// Held-out evaluation of a training run. Spam is the positive class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl EvaluationReport {
    /// Computes the report from parallel slices of true and predicted labels.
    ///
    /// A ratio whose denominator is zero is reported as 0.
    pub fn compute(truth: &[Label], predicted: &[Label]) -> Self {
        debug_assert_eq!(truth.len(), predicted.len());
        let mut tp = 0usize;
        let mut fp = 0usize;
        let mut fn_ = 0usize;
        let mut correct = 0usize;
        for (&t, &p) in truth.iter().zip(predicted) {
            if t == p {
                correct += 1;
            }
            match (t, p) {
                (Label::Spam, Label::Spam) => tp += 1,
                (Label::Ham, Label::Spam) => fp += 1,
                (Label::Spam, Label::Ham) => fn_ += 1,
                (Label::Ham, Label::Ham) => {}
            }
        }

        let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };
        let precision = ratio(tp, tp + fp);
        let recall = ratio(tp, tp + fn_);
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };

        Self {
            accuracy: ratio(correct, truth.len()),
            precision,
            recall,
            f1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Label::{Ham, Spam};

    #[test]
    fn test_mixed_predictions() {
        let report = EvaluationReport::compute(&[Spam, Spam, Ham, Ham], &[Spam, Ham, Spam, Ham]);
        assert_eq!(report.accuracy, 0.5);
        assert_eq!(report.precision, 0.5);
        assert_eq!(report.recall, 0.5);
        assert_eq!(report.f1, 0.5);
    }

    #[test]
    fn test_zero_division_is_zero() {
        let report = EvaluationReport::compute(&[Ham], &[Ham]);
        assert_eq!(report.accuracy, 1.0);
        assert_eq!(report.precision, 0.0);
        assert_eq!(report.recall, 0.0);
        assert_eq!(report.f1, 0.0);

        let empty = EvaluationReport::compute(&[], &[]);
        assert_eq!(empty.accuracy, 0.0);
    }

    #[test]
    fn test_json_has_exactly_four_keys() {
        let value = serde_json::to_value(EvaluationReport::compute(&[Spam], &[Spam])).unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys.len(), 4);
        for key in ["accuracy", "precision", "recall", "f1"] {
            assert!(keys.iter().any(|k| k == key));
        }
    }
}
