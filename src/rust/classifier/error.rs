/// Errors raised while fitting the vectorizer or the logistic model.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClassifierError {
    /// No training documents were supplied
    #[error("Training set is empty")]
    EmptyTrainingSet,
    /// Every training token was a stop word or too short
    #[error("Empty vocabulary; documents contain only stop words or no tokens")]
    EmptyVocabulary,
    /// Texts and labels disagree in length
    #[error("Got {texts} texts but {labels} labels")]
    LengthMismatch { texts: usize, labels: usize },
    /// Vectorizer output does not match the model input
    #[error("Dimension mismatch: vectorizer produces {vectorizer} features, model expects {model}")]
    DimensionMismatch { vectorizer: usize, model: usize },
    /// A hyperparameter is out of range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    /// The optimiser produced non-finite weights
    #[error("Optimisation diverged after {0} iterations")]
    Diverged(usize),
}
