use serde::{Deserialize, Serialize};

use super::error::ClassifierError;
use super::logistic::LogisticRegression;
use super::vectorizer::{FeatureExtractor, TfidfVectorizer};
use super::{BundleInfo, Prediction};

/// A fitted vectorizer and logistic model, paired.
///
/// The bundle is immutable once built and validated, so scoring only reads
/// it and any number of threads may call [`SpamClassifier::predict`] on a
/// shared reference.
///
/// ```rust
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use spamclf::{Label, SpamClassifier};
///
/// let classifier = SpamClassifier::builder().fit(
///     &["win a free prize now", "lunch at noon?"],
///     &[Label::Spam, Label::Ham],
/// )?;
///
/// let prediction = classifier.predict("free prize inside");
/// assert_eq!(prediction.label, Label::Spam);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BundleParts")]
pub struct SpamClassifier {
    vectorizer: TfidfVectorizer,
    model: LogisticRegression,
}

/// Wire shape of a bundle, validated on the way in
#[derive(Deserialize)]
struct BundleParts {
    vectorizer: TfidfVectorizer,
    model: LogisticRegression,
}

impl TryFrom<BundleParts> for SpamClassifier {
    type Error = ClassifierError;

    fn try_from(parts: BundleParts) -> Result<Self, Self::Error> {
        Self::new(parts.vectorizer, parts.model)
    }
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<SpamClassifier>();
    }
};

impl SpamClassifier {
    /// Creates a new ClassifierBuilder for fluent construction
    pub fn builder() -> super::builder::ClassifierBuilder {
        super::builder::ClassifierBuilder::new()
    }

    /// Pairs a vectorizer with a model after checking they agree on dimensionality.
    pub fn new(vectorizer: TfidfVectorizer, model: LogisticRegression) -> Result<Self, ClassifierError> {
        vectorizer
            .check_consistency()
            .map_err(ClassifierError::InvalidParameter)?;
        if vectorizer.n_features() != model.n_features() {
            return Err(ClassifierError::DimensionMismatch {
                vectorizer: vectorizer.n_features(),
                model: model.n_features(),
            });
        }
        Ok(Self { vectorizer, model })
    }

    /// Scores one text.
    ///
    /// The score is the model's spam probability for the vectorized text and the
    /// label applies the fixed 0.5 threshold. Empty text or text made only of
    /// unknown terms scores the zero vector.
    pub fn predict(&self, text: &str) -> Prediction {
        let features = self.vectorizer.transform(text);
        Prediction::from_score(self.model.predict_proba(&features))
    }

    /// Scores texts independently, preserving order.
    pub fn predict_batch(&self, texts: &[impl AsRef<str>]) -> Vec<Prediction> {
        texts.iter().map(|t| self.predict(t.as_ref())).collect()
    }

    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    pub fn model(&self) -> &LogisticRegression {
        &self.model
    }

    /// Returns information about the bundle's shape
    pub fn info(&self) -> BundleInfo {
        BundleInfo {
            vocabulary_size: self.vectorizer.vocabulary_size(),
            max_features: self.vectorizer.config().max_features,
            training_documents: self.vectorizer.n_documents(),
            intercept: self.model.intercept(),
        }
    }
}
