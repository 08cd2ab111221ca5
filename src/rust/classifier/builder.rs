use log::info;

use super::classifier::SpamClassifier;
use super::error::ClassifierError;
use super::logistic::{FitSummary, LogisticRegression};
use super::vectorizer::{FeatureExtractor, TfidfVectorizer};
use super::Label;
use crate::config::{LogisticConfig, VectorizerConfig};

/// A builder for fitting a SpamClassifier with a fluent interface.
#[derive(Debug, Clone, Default)]
pub struct ClassifierBuilder {
    vectorizer_config: VectorizerConfig,
    logistic_config: LogisticConfig,
}

impl ClassifierBuilder {
    /// Creates a builder with the default vectorizer and optimiser settings
    ///
    /// # Example
    /// ```
    /// use spamclf::ClassifierBuilder;
    ///
    /// let builder = ClassifierBuilder::new();
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vectorizer_config(mut self, config: VectorizerConfig) -> Self {
        self.vectorizer_config = config;
        self
    }

    pub fn with_logistic_config(mut self, config: LogisticConfig) -> Self {
        self.logistic_config = config;
        self
    }

    /// Caps the vocabulary size
    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.vectorizer_config.max_features = max_features;
        self
    }

    /// Sets the inverse regularisation strength
    pub fn with_regularization(mut self, c: f64) -> Self {
        self.logistic_config.c = c;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.logistic_config.max_iter = max_iter;
        self
    }

    /// Fits the vectorizer on `texts`, then the model on the vectorized texts.
    ///
    /// # Errors
    /// - `EmptyTrainingSet` if no texts are given
    /// - `LengthMismatch` if `texts` and `labels` differ in length
    /// - `EmptyVocabulary` if the texts contain no usable tokens
    /// - optimiser errors from [`LogisticRegression::fit`]
    pub fn fit(self, texts: &[impl AsRef<str>], labels: &[Label]) -> Result<SpamClassifier, ClassifierError> {
        self.fit_with_summary(texts, labels).map(|(classifier, _)| classifier)
    }

    /// Like [`ClassifierBuilder::fit`], also returning optimiser diagnostics
    pub fn fit_with_summary(
        self,
        texts: &[impl AsRef<str>],
        labels: &[Label],
    ) -> Result<(SpamClassifier, FitSummary), ClassifierError> {
        if texts.is_empty() {
            return Err(ClassifierError::EmptyTrainingSet);
        }
        if texts.len() != labels.len() {
            return Err(ClassifierError::LengthMismatch {
                texts: texts.len(),
                labels: labels.len(),
            });
        }

        let spam = labels.iter().filter(|&&l| l == Label::Spam).count();
        info!("Fitting classifier on {} texts ({} spam, {} ham)", texts.len(), spam, texts.len() - spam);

        let vectorizer = TfidfVectorizer::fit(self.vectorizer_config, texts)?;
        let features = vectorizer.transform_batch(texts);
        let (model, summary) =
            LogisticRegression::fit(&features, labels, vectorizer.n_features(), &self.logistic_config)?;

        let classifier = SpamClassifier::new(vectorizer, model)?;
        Ok((classifier, summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_mismatch() {
        let result = ClassifierBuilder::new().fit(&["one text"], &[Label::Spam, Label::Ham]);
        assert!(matches!(result, Err(ClassifierError::LengthMismatch { texts: 1, labels: 2 })));
    }

    #[test]
    fn test_empty_input() {
        let texts: Vec<&str> = Vec::new();
        assert_eq!(
            ClassifierBuilder::new().fit(&texts, &[]).unwrap_err(),
            ClassifierError::EmptyTrainingSet
        );
    }

    #[test]
    fn test_stop_word_only_corpus() {
        let result = ClassifierBuilder::new().fit(&["the of and", "is it"], &[Label::Spam, Label::Ham]);
        assert_eq!(result.unwrap_err(), ClassifierError::EmptyVocabulary);
    }

    #[test]
    fn test_max_features_is_applied() {
        let classifier = ClassifierBuilder::new()
            .with_max_features(3)
            .fit(
                &["alpha beta gamma delta", "epsilon zeta eta theta"],
                &[Label::Spam, Label::Ham],
            )
            .unwrap();
        assert_eq!(classifier.info().vocabulary_size, 3);
    }
}
