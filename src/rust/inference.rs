use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::classifier::{Label, Prediction, SpamClassifier};
use crate::error::{Result, SpamError};

/// One scored row of a batch run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchRecord {
    pub text: String,
    pub label: Label,
    pub score: f64,
}

impl BatchRecord {
    pub fn new(text: impl Into<String>, prediction: Prediction) -> Self {
        Self {
            text: text.into(),
            label: prediction.label,
            score: prediction.score,
        }
    }
}

/// Reads batch input: the first field of each CSV row, no header.
///
/// Rows with no fields are skipped.
pub fn read_texts(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path).map_err(|e| SpamError::io(path, e))?;
    read_texts_from(file).map_err(|e| match e.into_kind() {
        csv::ErrorKind::Io(io) => SpamError::io(path, io),
        other => SpamError::InvalidArgument(format!("failed to parse {:?}: {:?}", path, other)),
    })
}

pub fn read_texts_from<R: std::io::Read>(reader: R) -> std::result::Result<Vec<String>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let mut texts = Vec::new();
    for record in reader.records() {
        let record = record?;
        if let Some(text) = record.get(0) {
            texts.push(text.to_string());
        }
    }
    Ok(texts)
}

/// Scores each text independently, in input order.
pub fn classify_batch(classifier: &SpamClassifier, texts: Vec<String>) -> Vec<BatchRecord> {
    texts
        .into_iter()
        .map(|text| {
            let prediction = classifier.predict(&text);
            BatchRecord::new(text, prediction)
        })
        .collect()
}

/// Prints one JSON object `{"label", "score"}` followed by a newline.
pub fn write_prediction<W: Write>(prediction: &Prediction, mut out: W) -> Result<()> {
    let line = serde_json::to_string(prediction)
        .map_err(|e| SpamError::InvalidArgument(format!("failed to encode prediction: {}", e)))?;
    writeln!(out, "{}", line).map_err(|e| SpamError::io("<stdout>", e))
}

/// Writes one JSON object per record, one per line.
pub fn write_json_lines<W: Write>(records: &[BatchRecord], mut out: W) -> Result<()> {
    for record in records {
        let line = serde_json::to_string(record)
            .map_err(|e| SpamError::InvalidArgument(format!("failed to encode prediction: {}", e)))?;
        writeln!(out, "{}", line).map_err(|e| SpamError::io("<stdout>", e))?;
    }
    Ok(())
}

/// Writes a CSV with header `text,label,score`.
pub fn write_csv(records: &[BatchRecord], path: &Path) -> Result<()> {
    crate::artifact::ensure_parent(path)?;
    let file = File::create(path).map_err(|e| SpamError::io(path, e))?;
    let mut writer = csv::Writer::from_writer(file);
    let to_io = |e: csv::Error| match e.into_kind() {
        csv::ErrorKind::Io(io) => SpamError::io(path, io),
        other => SpamError::InvalidArgument(format!("failed to write {:?}: {:?}", path, other)),
    };
    writer.write_record(["text", "label", "score"]).map_err(to_io)?;
    for record in records {
        let score = record.score.to_string();
        writer
            .write_record([record.text.as_str(), record.label.as_str(), score.as_str()])
            .map_err(to_io)?;
    }
    writer.flush().map_err(|e| SpamError::io(path, e))?;
    Ok(())
}
