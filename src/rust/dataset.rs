//! Labeled dataset loading and the stratified train/test split.
//!
//! Input is a headerless two-column CSV of `label,text`, read from a local path or
//! fetched over HTTP(S).

use std::fs;
use std::io;

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::classifier::Label;

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Download error: {0}")]
    DownloadError(#[from] reqwest::Error),
    #[error("HTTP status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("Unrecognised label '{label}' on row {row}; expected ham/spam or 0/1")]
    UnrecognizedLabel { row: usize, label: String },
    #[error("Dataset contains no usable rows")]
    Empty,
}

/// One message and its normalised category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledExample {
    pub text: String,
    pub label: Label,
}

impl LabeledExample {
    pub fn new(label: Label, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            label,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub examples: Vec<LabeledExample>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn count(&self, label: Label) -> usize {
        self.examples.iter().filter(|e| e.label == label).count()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.examples.iter().map(|e| e.text.as_str()).collect()
    }

    pub fn labels(&self) -> Vec<Label> {
        self.examples.iter().map(|e| e.label).collect()
    }
}

pub fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Loads a dataset from a local path or an HTTP(S) URL.
pub async fn load_dataset(source: &str) -> Result<Dataset, DatasetError> {
    let bytes = if is_url(source) {
        info!("Downloading dataset from {}", source);
        let response = reqwest::get(source).await?;
        debug!("Download response status: {}", response.status());
        if !response.status().is_success() {
            return Err(DatasetError::HttpStatus(response.status()));
        }
        response.bytes().await?.to_vec()
    } else {
        info!("Reading dataset from {}", source);
        fs::read(source)?
    };
    let dataset = parse_dataset(&bytes)?;
    info!(
        "Loaded {} examples ({} spam, {} ham)",
        dataset.len(),
        dataset.count(Label::Spam),
        dataset.count(Label::Ham)
    );
    Ok(dataset)
}

/// Parses headerless `label,text` CSV bytes.
///
/// Labels are trimmed and lower-cased. Rows with an empty label or empty text,
/// or with fewer than two fields, are dropped. When every remaining label is
/// `0` or `1` the set is read as ham/spam respectively.
pub fn parse_dataset(bytes: &[u8]) -> Result<Dataset, DatasetError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut rows: Vec<(usize, String, String)> = Vec::new();
    let mut dropped = 0usize;
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        let row = i + 1;
        let (Some(label), Some(text)) = (record.get(0), record.get(1)) else {
            dropped += 1;
            continue;
        };
        let label = label.trim().to_lowercase();
        if label.is_empty() || text.is_empty() {
            dropped += 1;
            continue;
        }
        if record.len() > 2 {
            warn!("Row {} has {} fields; ignoring all but the first two", row, record.len());
        }
        rows.push((row, label, text.to_string()));
    }
    if dropped > 0 {
        debug!("Dropped {} incomplete rows", dropped);
    }
    if rows.is_empty() {
        return Err(DatasetError::Empty);
    }

    let numeric = rows.iter().all(|(_, label, _)| label == "0" || label == "1");
    let examples = rows
        .into_iter()
        .map(|(row, label, text)| {
            let label = normalize_label(&label, numeric)
                .ok_or_else(|| DatasetError::UnrecognizedLabel { row, label: label.clone() })?;
            Ok(LabeledExample { text, label })
        })
        .collect::<Result<Vec<_>, DatasetError>>()?;

    Ok(Dataset { examples })
}

fn normalize_label(label: &str, numeric: bool) -> Option<Label> {
    match (label, numeric) {
        ("0", true) => Some(Label::Ham),
        ("1", true) => Some(Label::Spam),
        ("ham", _) => Some(Label::Ham),
        ("spam", _) => Some(Label::Spam),
        _ => None,
    }
}

/// Result of a stratified split
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub train: Dataset,
    pub test: Dataset,
}

/// Splits `dataset` into train and test partitions, stratified by label.
///
/// The test partition holds `ceil(n × test_fraction)` examples, clamped so each
/// side has at least one. That quota is shared between classes in proportion
/// to their size (largest remainder, ties to ham). The same seed always yields
/// the same partition.
pub fn stratified_split(dataset: &Dataset, test_fraction: f64, seed: u64) -> Result<Split, String> {
    let n = dataset.len();
    if n < 2 {
        return Err(format!("need at least 2 examples to split, got {}", n));
    }
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(format!("test fraction must be in (0, 1), got {}", test_fraction));
    }

    let n_test = ((n as f64 * test_fraction).ceil() as usize).clamp(1, n - 1);

    let classes = [Label::Ham, Label::Spam];
    let by_class: Vec<Vec<usize>> = classes
        .iter()
        .map(|&label| {
            dataset
                .examples
                .iter()
                .enumerate()
                .filter(|(_, e)| e.label == label)
                .map(|(i, _)| i)
                .collect()
        })
        .collect();

    let ideal: Vec<f64> = by_class
        .iter()
        .map(|idx| idx.len() as f64 * n_test as f64 / n as f64)
        .collect();
    let mut quota: Vec<usize> = ideal.iter().map(|q| q.floor() as usize).collect();
    let mut leftover = n_test - quota.iter().sum::<usize>();
    let mut order: Vec<usize> = (0..classes.len()).collect();
    order.sort_by(|&a, &b| {
        let ra = ideal[a] - ideal[a].floor();
        let rb = ideal[b] - ideal[b].floor();
        rb.partial_cmp(&ra).unwrap_or(std::cmp::Ordering::Equal).then(a.cmp(&b))
    });
    for &c in order.iter().cycle().take(order.len() * 2) {
        if leftover == 0 {
            break;
        }
        if quota[c] < by_class[c].len() {
            quota[c] += 1;
            leftover -= 1;
        }
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train_idx = Vec::with_capacity(n - n_test);
    let mut test_idx = Vec::with_capacity(n_test);
    for (mut indices, k) in by_class.into_iter().zip(quota) {
        indices.shuffle(&mut rng);
        test_idx.extend_from_slice(&indices[..k]);
        train_idx.extend_from_slice(&indices[k..]);
    }
    train_idx.shuffle(&mut rng);
    test_idx.shuffle(&mut rng);

    let pick = |idx: &[usize]| Dataset {
        examples: idx.iter().map(|&i| dataset.examples[i].clone()).collect(),
    };
    Ok(Split {
        train: pick(&train_idx),
        test: pick(&test_idx),
    })
}
