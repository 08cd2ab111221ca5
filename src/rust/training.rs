use std::path::{Path, PathBuf};
use std::time::Instant;

use log::info;

use crate::artifact;
use crate::classifier::{ClassifierBuilder, FitSummary, Label, SpamClassifier};
use crate::config::TrainConfig;
use crate::dataset::{self, Dataset};
use crate::error::{Result, SpamError};
use crate::metrics::EvaluationReport;

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct TrainOutcome {
    pub classifier: SpamClassifier,
    pub report: EvaluationReport,
    pub summary: FitSummary,
    pub model_path: PathBuf,
    pub evaluation_path: PathBuf,
    pub train_size: usize,
    pub test_size: usize,
}

/// Loads the dataset at `source`, then trains, evaluates and persists.
pub async fn train(source: &str, out: &Path, config: &TrainConfig) -> Result<TrainOutcome> {
    config.validate()?;
    let data = dataset::load_dataset(source)
        .await
        .map_err(|error| SpamError::DatasetLoad {
            source_name: source.to_string(),
            error,
        })?;
    train_on(&data, out, config)
}

/// Trains on an in-memory dataset.
///
/// The bundle is written only after fitting succeeds, and the evaluation
/// report only after the bundle is on disk.
pub fn train_on(data: &Dataset, out: &Path, config: &TrainConfig) -> Result<TrainOutcome> {
    config.validate()?;
    let start = Instant::now();

    let split = dataset::stratified_split(data, config.test_fraction, config.seed)
        .map_err(SpamError::InvalidArgument)?;
    info!("Split {} examples into {} train / {} test", data.len(), split.train.len(), split.test.len());

    let (classifier, summary) = ClassifierBuilder::new()
        .with_vectorizer_config(config.vectorizer.clone())
        .with_logistic_config(config.logistic.clone())
        .fit_with_summary(&split.train.texts(), &split.train.labels())?;

    let predicted: Vec<Label> = classifier
        .predict_batch(&split.test.texts())
        .into_iter()
        .map(|p| p.label)
        .collect();
    let report = EvaluationReport::compute(&split.test.labels(), &predicted);

    artifact::save_bundle(&classifier, out)?;
    let evaluation_path = artifact::write_evaluation(&report, out)?;

    info!("Training complete in {:.2?}. Model saved to {:?}", start.elapsed(), out);
    info!(
        "Evaluation: accuracy {:.4}, precision {:.4}, recall {:.4}, f1 {:.4}",
        report.accuracy, report.precision, report.recall, report.f1
    );

    Ok(TrainOutcome {
        classifier,
        report,
        summary,
        model_path: out.to_path_buf(),
        evaluation_path,
        train_size: split.train.len(),
        test_size: split.test.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::LabeledExample;

    #[test]
    fn test_fit_failure_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("model.json");
        let data = Dataset {
            examples: vec![
                LabeledExample::new(Label::Spam, "the of and"),
                LabeledExample::new(Label::Ham, "is it"),
            ],
        };
        let config = TrainConfig::default().with_test_fraction(0.5);

        let result = train_on(&data, &out, &config);
        assert!(matches!(result, Err(SpamError::FitFailure(_))));
        assert!(!out.exists());
        assert!(!artifact::evaluation_path(&out).exists());
    }

    #[test]
    fn test_invalid_fraction_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let data = Dataset {
            examples: vec![
                LabeledExample::new(Label::Spam, "free money"),
                LabeledExample::new(Label::Ham, "hello friend"),
            ],
        };
        let config = TrainConfig::default().with_test_fraction(0.0);
        assert!(matches!(
            train_on(&data, &dir.path().join("m.json"), &config),
            Err(SpamError::InvalidArgument(_))
        ));
    }
}
