use std::collections::{BTreeMap, HashMap, HashSet};

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use log::{debug, info};

use super::error::ClassifierError;
use super::tokenizer::tokenize;
use super::utils::SparseVector;
use crate::config::VectorizerConfig;

/// Maps raw text to a fixed-size numeric vector.
///
/// Implementors must be pure: the same text always yields the same vector, and
/// every index is below `n_features()`.
pub trait FeatureExtractor {
    fn n_features(&self) -> usize;

    fn transform(&self, text: &str) -> SparseVector;

    fn transform_batch(&self, texts: &[impl AsRef<str>]) -> Vec<SparseVector> {
        texts.iter().map(|t| self.transform(t.as_ref())).collect()
    }
}

/// Bag-of-words TF-IDF vectorizer with a capped vocabulary.
///
/// Weights are raw term counts times smoothed inverse document frequency,
/// `ln((1 + n) / (1 + df)) + 1`, followed by L2 normalisation of each row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    config: VectorizerConfig,
    /// Term to column index, columns in alphabetical term order
    vocabulary: BTreeMap<String, usize>,
    idf: Array1<f64>,
    n_documents: usize,
}

impl TfidfVectorizer {
    /// Fits the vocabulary and idf weights on `documents`.
    ///
    /// When more than `max_features` distinct terms survive tokenisation, the
    /// terms with the highest corpus frequency are kept, ties broken alphabetically.
    ///
    /// # Errors
    /// - `EmptyTrainingSet` if `documents` is empty
    /// - `EmptyVocabulary` if no document yields a single token
    /// - `InvalidParameter` if `max_features` is zero
    pub fn fit(config: VectorizerConfig, documents: &[impl AsRef<str>]) -> Result<Self, ClassifierError> {
        if documents.is_empty() {
            return Err(ClassifierError::EmptyTrainingSet);
        }
        if config.max_features == 0 {
            return Err(ClassifierError::InvalidParameter("max_features must be positive".into()));
        }

        let mut term_frequency: HashMap<String, usize> = HashMap::new();
        let mut document_frequency: HashMap<String, usize> = HashMap::new();

        for doc in documents {
            let tokens = tokenize(doc.as_ref(), config.lowercase, config.remove_stop_words);
            let mut seen = HashSet::new();
            for token in tokens {
                if seen.insert(token.clone()) {
                    *document_frequency.entry(token.clone()).or_insert(0) += 1;
                }
                *term_frequency.entry(token).or_insert(0) += 1;
            }
        }

        if term_frequency.is_empty() {
            return Err(ClassifierError::EmptyVocabulary);
        }

        let mut ranked: Vec<(String, usize)> = term_frequency.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        if ranked.len() > config.max_features {
            debug!("Capping vocabulary from {} to {} terms", ranked.len(), config.max_features);
            ranked.truncate(config.max_features);
        }

        let mut terms: Vec<String> = ranked.into_iter().map(|(term, _)| term).collect();
        terms.sort();

        let n = documents.len() as f64;
        let idf = Array1::from_iter(terms.iter().map(|term| {
            let df = document_frequency.get(term).copied().unwrap_or(0) as f64;
            ((1.0 + n) / (1.0 + df)).ln() + 1.0
        }));

        let vocabulary: BTreeMap<String, usize> = terms
            .into_iter()
            .enumerate()
            .map(|(idx, term)| (term, idx))
            .collect();

        info!("Fitted vectorizer on {} documents, vocabulary size {}", documents.len(), vocabulary.len());

        Ok(Self {
            config,
            vocabulary,
            idf,
            n_documents: documents.len(),
        })
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn vocabulary(&self) -> &BTreeMap<String, usize> {
        &self.vocabulary
    }

    pub fn config(&self) -> &VectorizerConfig {
        &self.config
    }

    pub fn n_documents(&self) -> usize {
        self.n_documents
    }

    /// Checks internal consistency of a deserialized vectorizer.
    pub(crate) fn check_consistency(&self) -> Result<(), String> {
        if self.idf.len() != self.vocabulary.len() {
            return Err(format!(
                "vectorizer has {} terms but {} idf weights",
                self.vocabulary.len(),
                self.idf.len()
            ));
        }
        if let Some((term, idx)) = self.vocabulary.iter().find(|(_, &idx)| idx >= self.idf.len()) {
            return Err(format!("term '{}' maps to out-of-range column {}", term, idx));
        }
        let distinct: HashSet<usize> = self.vocabulary.values().copied().collect();
        if distinct.len() != self.vocabulary.len() {
            return Err("vectorizer vocabulary maps two terms to the same column".to_string());
        }
        Ok(())
    }
}

impl FeatureExtractor for TfidfVectorizer {
    fn n_features(&self) -> usize {
        self.vocabulary.len()
    }

    /// Unknown terms are ignored; text with no known terms maps to the zero vector.
    fn transform(&self, text: &str) -> SparseVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for token in tokenize(text, self.config.lowercase, self.config.remove_stop_words) {
            if let Some(&idx) = self.vocabulary.get(&token) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        let pairs = counts
            .into_iter()
            .map(|(idx, count)| (idx, count * self.idf[idx]))
            .collect();
        let mut vector = SparseVector::from_sorted(pairs);
        vector.l2_normalize();
        vector
    }
}
