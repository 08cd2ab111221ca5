use std::fs;

use spamclf::{artifact, load_bundle, train, Label, SpamError, TrainConfig};

const NUMERIC_ROWS: &str = "\
1,Free money now! Claim your cash prize
0,Hello friend, are we still on for lunch?
1,Win a free cruise, text WIN to claim
0,Following up on yesterday's meeting notes
1,Urgent cash reward waiting, claim now
0,See you at the game tonight
1,Free entry in our weekly prize draw
0,Can you send me the report by Friday
1,You have been selected for a cash prize
0,Thanks for dinner, it was lovely
";

fn as_text_labels(numeric: &str) -> String {
    numeric
        .lines()
        .map(|line| match line.split_once(',') {
            Some(("1", text)) => format!("spam,{}", text),
            Some(("0", text)) => format!("ham,{}", text),
            _ => line.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[tokio::test]
async fn test_train_on_small_sample() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let sample = dir.path().join("sample.csv");
    fs::write(&sample, "spam,Free money now!\nham,Hello friend\n")?;
    let out = dir.path().join("model.json");

    let config = TrainConfig::default().with_test_fraction(0.5);
    let outcome = train(sample.to_str().unwrap(), &out, &config).await?;

    assert!(out.exists());
    let eval_path = artifact::evaluation_path(&out);
    assert_eq!(outcome.evaluation_path, eval_path);
    assert!(eval_path.exists());

    let report: serde_json::Value = serde_json::from_str(&fs::read_to_string(&eval_path)?)?;
    let report = report.as_object().unwrap();
    assert_eq!(report.len(), 4);
    for key in ["accuracy", "precision", "recall", "f1"] {
        let value = report[key].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&value), "{} out of range: {}", key, value);
    }
    assert_eq!(outcome.train_size, 1);
    assert_eq!(outcome.test_size, 1);
    Ok(())
}

#[tokio::test]
async fn test_numeric_and_text_labels_train_identically() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let numeric = dir.path().join("numeric.csv");
    let text = dir.path().join("text.csv");
    fs::write(&numeric, NUMERIC_ROWS)?;
    fs::write(&text, as_text_labels(NUMERIC_ROWS))?;

    let config = TrainConfig::default();
    let a = train(numeric.to_str().unwrap(), &dir.path().join("a.json"), &config).await?;
    let b = train(text.to_str().unwrap(), &dir.path().join("b.json"), &config).await?;

    assert_eq!(a.report, b.report);
    assert_eq!(a.classifier, b.classifier);
    Ok(())
}

#[tokio::test]
async fn test_persisted_bundle_matches_in_memory() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let data = dir.path().join("data.csv");
    fs::write(&data, as_text_labels(NUMERIC_ROWS))?;
    let out = dir.path().join("models").join("baseline.json");

    let outcome = train(data.to_str().unwrap(), &out, &TrainConfig::default()).await?;
    let loaded = load_bundle(&out)?;

    for text in ["Claim your free cash prize", "lunch on Friday?", "", "zzzz"] {
        let before = outcome.classifier.predict(text);
        let after = loaded.predict(text);
        assert_eq!(before.label, after.label);
        assert_eq!(before.score.to_bits(), after.score.to_bits());
    }
    assert_eq!(loaded.predict("Free cash prize, claim now").label, Label::Spam);
    Ok(())
}

#[tokio::test]
async fn test_training_is_reproducible() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let data = dir.path().join("data.csv");
    fs::write(&data, NUMERIC_ROWS)?;

    let config = TrainConfig::default().with_seed(7);
    let a = train(data.to_str().unwrap(), &dir.path().join("a.json"), &config).await?;
    let b = train(data.to_str().unwrap(), &dir.path().join("b.json"), &config).await?;
    assert_eq!(a.classifier, b.classifier);
    assert_eq!(fs::read(&a.model_path)?, fs::read(&b.model_path)?);
    Ok(())
}

#[tokio::test]
async fn test_missing_dataset_is_load_failure() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("model.json");
    let result = train("/nonexistent/spamclf/data.csv", &out, &TrainConfig::default()).await;
    assert!(matches!(result, Err(SpamError::DatasetLoad { .. })));
    assert!(!out.exists());
}

#[tokio::test]
async fn test_stop_word_corpus_is_fit_failure() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("data.csv");
    fs::write(&data, "spam,the and of\nham,is it\nspam,a an\nham,to be\n").unwrap();
    let out = dir.path().join("model.json");

    let result = train(data.to_str().unwrap(), &out, &TrainConfig::default()).await;
    assert!(matches!(result, Err(SpamError::FitFailure(_))));
    assert!(!out.exists());
    assert!(!artifact::evaluation_path(&out).exists());
}
