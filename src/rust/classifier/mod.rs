use std::fmt;

use serde::{Deserialize, Serialize};

mod error;
mod tokenizer;
mod utils;
pub mod vectorizer;
pub mod logistic;
pub mod builder;
pub mod classifier;

pub use error::ClassifierError;
pub use utils::SparseVector;
pub use vectorizer::{FeatureExtractor, TfidfVectorizer};
pub use logistic::{FitSummary, LogisticRegression};
pub use builder::ClassifierBuilder;
pub use classifier::SpamClassifier;

/// Scores at or above this value are labelled spam.
pub const SPAM_THRESHOLD: f64 = 0.5;

/// Binary message category; ham is the negative class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Ham,
    Spam,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ham => "ham",
            Self::Spam => "spam",
        }
    }

    /// Regression target: 0 for ham, 1 for spam.
    pub fn target(&self) -> f64 {
        match self {
            Self::Ham => 0.0,
            Self::Spam => 1.0,
        }
    }

    /// Applies the fixed decision threshold. NaN maps to ham.
    pub fn from_score(score: f64) -> Self {
        if score >= SPAM_THRESHOLD {
            Self::Spam
        } else {
            Self::Ham
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of scoring one text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: Label,
    /// Estimated probability that the text is spam
    pub score: f64,
}

impl Prediction {
    pub fn from_score(score: f64) -> Self {
        Self {
            label: Label::from_score(score),
            score,
        }
    }
}

/// Shape of a loaded bundle, for display
#[derive(Debug, Clone, PartialEq)]
pub struct BundleInfo {
    pub vocabulary_size: usize,
    pub max_features: usize,
    pub training_documents: usize,
    pub intercept: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_is_closed() {
        assert_eq!(Label::from_score(0.5), Label::Spam);
        assert_eq!(Label::from_score(0.5000001), Label::Spam);
        assert_eq!(Label::from_score(0.4999999), Label::Ham);
        assert_eq!(Label::from_score(0.0), Label::Ham);
        assert_eq!(Label::from_score(1.0), Label::Spam);
        assert_eq!(Label::from_score(f64::NAN), Label::Ham);
    }

    #[test]
    fn test_prediction_serializes_lowercase_label() {
        let json = serde_json::to_string(&Prediction::from_score(0.75)).unwrap();
        assert_eq!(json, r#"{"label":"spam","score":0.75}"#);
    }
}
