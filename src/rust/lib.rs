//! A small spam/ham text classifier: TF-IDF features and logistic regression.
//!
//! # Basic Usage
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use spamclf::{Label, SpamClassifier};
//!
//! let classifier = SpamClassifier::builder()
//!     .with_max_features(5000)
//!     .fit(
//!         &["Free money now!", "Claim your free prize", "Hello friend", "Lunch tomorrow?"],
//!         &[Label::Spam, Label::Spam, Label::Ham, Label::Ham],
//!     )?;
//!
//! let prediction = classifier.predict("free prize money");
//! println!("{} ({:.3})", prediction.label, prediction.score);
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! A fitted [`SpamClassifier`] is immutable and can be shared across threads using `Arc`:
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use spamclf::{Label, SpamClassifier};
//! use std::sync::Arc;
//! use std::thread;
//!
//! let classifier = Arc::new(SpamClassifier::builder()
//!     .fit(&["win cash", "see you soon"], &[Label::Spam, Label::Ham])?);
//!
//! let mut handles = vec![];
//! for _ in 0..3 {
//!     let classifier = Arc::clone(&classifier);
//!     handles.push(thread::spawn(move || classifier.predict("cash prize")));
//! }
//!
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//! # Ok(())
//! # }
//! ```

pub mod classifier;
pub mod config;
pub mod error;
pub mod dataset;
pub mod metrics;
pub mod artifact;
pub mod training;
pub mod inference;
pub mod demo;

pub use classifier::{
    BundleInfo, ClassifierBuilder, ClassifierError, FeatureExtractor, Label, LogisticRegression, Prediction,
    SpamClassifier, TfidfVectorizer, SPAM_THRESHOLD,
};
pub use config::{default_model_path, LogisticConfig, TrainConfig, VectorizerConfig};
pub use error::SpamError;
pub use dataset::{load_dataset, Dataset, DatasetError, LabeledExample};
pub use metrics::EvaluationReport;
pub use artifact::{load_bundle, save_bundle, BundleLoader, LoaderFailure};
pub use training::{train, train_on, TrainOutcome};
pub use demo::{BundleCache, DemoSession};

/// Initialises `env_logger`, defaulting to `info` when `RUST_LOG` is unset.
pub fn init_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).try_init();
}
