use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpamError};

/// Environment variable overriding the demo's default bundle location.
pub const MODEL_PATH_ENV: &str = "SPAMCLF_MODEL";

/// Feature extraction settings; stored inside the bundle since transform depends on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorizerConfig {
    /// Maximum vocabulary size, keeping the most frequent terms
    pub max_features: usize,
    pub lowercase: bool,
    pub remove_stop_words: bool,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            max_features: 5000,
            lowercase: true,
            remove_stop_words: true,
        }
    }
}

/// Optimiser settings for the logistic regression.
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticConfig {
    /// Inverse regularisation strength
    pub c: f64,
    pub max_iter: usize,
    /// Convergence threshold on the gradient's max-norm
    pub tolerance: f64,
}

impl Default for LogisticConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            max_iter: 1000,
            tolerance: 1e-4,
        }
    }
}

/// Everything a training run needs besides the dataset location.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainConfig {
    pub test_fraction: f64,
    pub seed: u64,
    pub vectorizer: VectorizerConfig,
    pub logistic: LogisticConfig,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
            vectorizer: VectorizerConfig::default(),
            logistic: LogisticConfig::default(),
        }
    }
}

impl TrainConfig {
    pub fn with_test_fraction(mut self, fraction: f64) -> Self {
        self.test_fraction = fraction;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.vectorizer.max_features = max_features;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(SpamError::InvalidArgument(format!(
                "test fraction must be in (0, 1), got {}",
                self.test_fraction
            )));
        }
        if self.vectorizer.max_features == 0 {
            return Err(SpamError::InvalidArgument("max features must be positive".into()));
        }
        Ok(())
    }
}

/// Returns the default bundle path used by the demo.
pub fn default_model_path() -> PathBuf {
    // 1. Check environment variable
    if let Ok(path) = env::var(MODEL_PATH_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    // 2. Working-directory models folder
    PathBuf::from("models").join("baseline.json")
}
