//! Interactive terminal demo.
//!
//! Reads commands line by line. Only the commands listed in `:help` are
//! treated as commands; every other line, `:)` smileys included, is
//! classified as a message.

use std::collections::HashMap;
use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use log::{debug, warn};

use crate::artifact;
use crate::classifier::SpamClassifier;
use crate::error::{Result, SpamError};
use crate::inference;

pub const HAM_EXAMPLE: &str = "Hi, I'm just following up on our meeting from yesterday.";
pub const SPAM_EXAMPLE: &str =
    "Congratulations! You've won a free cruise to the Bahamas. Click here to claim your prize.";

const HELP: &str = "\
Commands:
  <text>          classify a message
  :ham            classify a canned ham example
  :spam           classify a canned spam example
  :load <path>    switch to another model bundle
  :batch <csv>    classify the first column of a CSV file
  :info           describe the loaded bundle
  :help           show this message
  :quit           exit";

/// Loads each bundle path at most once per cache.
#[derive(Debug, Default)]
pub struct BundleCache {
    entries: Mutex<HashMap<PathBuf, Arc<SpamClassifier>>>,
}

impl BundleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the bundle at `path`, loading it on first use.
    ///
    /// Entries are keyed by the canonical path, so `models/x.json` and
    /// `./models/x.json` share one load. Failed loads are not cached, so a
    /// corrected file can be retried.
    pub fn get_or_load(&self, path: &Path) -> Result<Arc<SpamClassifier>> {
        let key = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| SpamError::InvalidArgument("bundle cache lock poisoned".into()))?;
        if let Some(bundle) = entries.get(&key) {
            debug!("Bundle cache hit for {:?}", key);
            return Ok(Arc::clone(bundle));
        }
        let bundle = Arc::new(artifact::load_bundle(path)?);
        entries.insert(key, Arc::clone(&bundle));
        Ok(bundle)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// State of one demo run
pub struct DemoSession {
    cache: BundleCache,
    current: Option<(PathBuf, Arc<SpamClassifier>)>,
}

impl DemoSession {
    /// Starts a session, trying `model_path` first.
    ///
    /// A missing or broken default bundle is reported but not fatal; the user
    /// can `:load` another one.
    pub fn new<W: Write>(model_path: &Path, out: &mut W) -> std::io::Result<Self> {
        let mut session = Self {
            cache: BundleCache::new(),
            current: None,
        };
        if model_path.exists() {
            session.load(model_path, out)?;
        } else {
            warn!("Default model not found at {:?}", model_path);
            writeln!(out, "Default model not found at {:?}. Use :load <path> to choose one.", model_path)?;
        }
        Ok(session)
    }

    pub fn cache(&self) -> &BundleCache {
        &self.cache
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.current.as_ref().map(|(p, _)| p.as_path())
    }

    fn load<W: Write>(&mut self, path: &Path, out: &mut W) -> std::io::Result<()> {
        match self.cache.get_or_load(path) {
            Ok(bundle) => {
                writeln!(out, "Loaded model from {:?}", path)?;
                self.current = Some((path.to_path_buf(), bundle));
            }
            Err(e) => writeln!(out, "Failed to load model: {}", e)?,
        }
        Ok(())
    }

    /// Runs until `:quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> std::io::Result<()> {
        writeln!(out, "Spam Classification Demo. Type :help for commands.")?;
        for line in input.lines() {
            let line = line?;
            if !self.handle(line.trim_end_matches(['\r', '\n']), out)? {
                break;
            }
        }
        Ok(())
    }

    /// Handles one input line; returns false when the session should end.
    pub fn handle<W: Write>(&mut self, line: &str, out: &mut W) -> std::io::Result<bool> {
        let trimmed = line.trim();
        let (command, arg) = match trimmed.split_once(char::is_whitespace) {
            Some((c, a)) => (c, a.trim()),
            None => (trimmed, ""),
        };

        match command {
            ":quit" | ":q" | ":exit" => return Ok(false),
            ":help" => writeln!(out, "{}", HELP)?,
            ":ham" => self.classify(HAM_EXAMPLE, out)?,
            ":spam" => self.classify(SPAM_EXAMPLE, out)?,
            ":load" if arg.is_empty() => writeln!(out, "Usage: :load <path>")?,
            ":load" => self.load(Path::new(arg), out)?,
            ":batch" if arg.is_empty() => writeln!(out, "Usage: :batch <csv>")?,
            ":batch" => self.batch(Path::new(arg), out)?,
            ":info" => match &self.current {
                Some((path, bundle)) => {
                    let info = bundle.info();
                    writeln!(
                        out,
                        "{:?}: {} terms (cap {}), trained on {} documents, intercept {:.4}",
                        path, info.vocabulary_size, info.max_features, info.training_documents, info.intercept
                    )?;
                }
                None => writeln!(out, "No model loaded.")?,
            },
            _ => self.classify(line, out)?,
        }
        out.flush()?;
        Ok(true)
    }

    fn classify<W: Write>(&self, text: &str, out: &mut W) -> std::io::Result<()> {
        let Some((_, bundle)) = &self.current else {
            return writeln!(out, "No model loaded. Use :load <path> first.");
        };
        let prediction = bundle.predict(text);
        writeln!(out, "Prediction: {} (score {:.4})", prediction.label, prediction.score)?;
        let json = serde_json::to_string(&prediction).map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        writeln!(out, "{}", json)
    }

    fn batch<W: Write>(&self, path: &Path, out: &mut W) -> std::io::Result<()> {
        let Some((_, bundle)) = &self.current else {
            return writeln!(out, "No model loaded. Use :load <path> first.");
        };
        let texts = match inference::read_texts(path) {
            Ok(texts) => texts,
            Err(e) => return writeln!(out, "Failed to read {:?}: {}", path, e),
        };
        let records = inference::classify_batch(bundle, texts);
        writeln!(out, "Predicted {} rows", records.len())?;
        writeln!(out, "{:<6} {:>8}  text", "label", "score")?;
        for record in &records {
            writeln!(out, "{:<6} {:>8.4}  {}", record.label.as_str(), record.score, record.text)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Label;

    fn write_bundle(dir: &Path, name: &str) -> PathBuf {
        let bundle = SpamClassifier::builder()
            .fit(
                &["Free money now!", "Win a free cruise prize", "Hello friend", "Meeting yesterday follow up"],
                &[Label::Spam, Label::Spam, Label::Ham, Label::Ham],
            )
            .unwrap();
        let path = dir.join(name);
        artifact::save_bundle(&bundle, &path).unwrap();
        path
    }

    #[test]
    fn test_cache_loads_each_path_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_bundle(dir.path(), "model.json");
        let cache = BundleCache::new();

        let a = cache.get_or_load(&path).unwrap();
        // a second read would fail on this
        std::fs::write(&path, "not a bundle").unwrap();
        let b = cache.get_or_load(&path).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_shares_equivalent_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_bundle(dir.path(), "model.json");
        let dotted = dir.path().join(".").join("model.json");
        let cache = BundleCache::new();

        let a = cache.get_or_load(&path).unwrap();
        let b = cache.get_or_load(&dotted).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_does_not_keep_failures() {
        let dir = tempfile::tempdir().unwrap();
        let cache = BundleCache::new();
        assert!(cache.get_or_load(&dir.path().join("missing.json")).is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_session_transcript() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_bundle(dir.path(), "model.json");
        let csv = dir.path().join("batch.csv");
        std::fs::write(&csv, "Free money now!\nHello friend\n").unwrap();

        let mut out = Vec::new();
        let mut session = DemoSession::new(&path, &mut out).unwrap();
        let input = format!(":spam\n:ham\nfree money\n:batch {}\n:info\n:quit\nignored\n", csv.display());
        session.run(input.as_bytes(), &mut out).unwrap();

        let transcript = String::from_utf8(out).unwrap();
        assert!(transcript.contains("Loaded model from"));
        assert_eq!(transcript.matches("Prediction: ").count(), 3);
        assert!(transcript.contains("Predicted 2 rows"));
        assert!(transcript.contains("trained on 4 documents"));
        assert!(!transcript.contains("ignored"));
    }

    #[test]
    fn test_colon_prefixed_text_is_classified() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_bundle(dir.path(), "model.json");

        let mut out = Vec::new();
        let mut session = DemoSession::new(&path, &mut out).unwrap();
        assert!(session.handle(":) free money for you", &mut out).unwrap());
        assert!(session.handle(":nope", &mut out).unwrap());

        let transcript = String::from_utf8(out).unwrap();
        assert_eq!(transcript.matches("Prediction: ").count(), 2);
        assert!(!transcript.contains("Unknown command"));
    }

    #[test]
    fn test_session_without_model() {
        let dir = tempfile::tempdir().unwrap();
        let mut out = Vec::new();
        let mut session = DemoSession::new(&dir.path().join("none.json"), &mut out).unwrap();
        session.handle("hello", &mut out).unwrap();

        let transcript = String::from_utf8(out).unwrap();
        assert!(transcript.contains("Default model not found"));
        assert!(transcript.contains("No model loaded"));
        assert!(session.current_path().is_none());
    }

    #[test]
    fn test_load_switches_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let first = write_bundle(dir.path(), "first.json");
        let second = write_bundle(dir.path(), "second.json");

        let mut out = Vec::new();
        let mut session = DemoSession::new(&first, &mut out).unwrap();
        session.handle(&format!(":load {}", second.display()), &mut out).unwrap();
        assert_eq!(session.current_path(), Some(second.as_path()));
        assert_eq!(session.cache().len(), 2);
    }
}
