use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::classifier::SpamClassifier;
use crate::error::{Result, SpamError};
use crate::metrics::EvaluationReport;

const ENVELOPE_FORMAT: &str = "spamclf-bundle";
const ENVELOPE_VERSION: u32 = 1;
const REQUIRED_FIELDS: [&str; 2] = ["vectorizer", "model"];

/// Why a single loader strategy could not decode an artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderFailure {
    pub strategy: &'static str,
    pub reason: String,
}

impl fmt::Display for LoaderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.strategy, self.reason)
    }
}

/// One way of decoding artifact bytes into the bundle's field map.
///
/// A strategy only answers "can I read this format"; checking that the fields
/// form a usable bundle happens once, after a strategy succeeds.
pub trait BundleLoader: Send + Sync {
    fn name(&self) -> &'static str;

    fn decode(&self, bytes: &[u8]) -> std::result::Result<Map<String, Value>, String>;
}

#[derive(Serialize)]
struct EnvelopeOut<'a> {
    format: &'a str,
    version: u32,
    sha256: String,
    payload: &'a RawValue,
}

#[derive(Deserialize)]
struct EnvelopeIn {
    format: String,
    version: u32,
    sha256: String,
    payload: Box<RawValue>,
}

/// Primary format: payload wrapped with a SHA-256 of its exact bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChecksummedLoader;

impl BundleLoader for ChecksummedLoader {
    fn name(&self) -> &'static str {
        "checksummed"
    }

    fn decode(&self, bytes: &[u8]) -> std::result::Result<Map<String, Value>, String> {
        let envelope: EnvelopeIn =
            serde_json::from_slice(bytes).map_err(|e| format!("not a bundle envelope: {}", e))?;
        if envelope.format != ENVELOPE_FORMAT {
            return Err(format!("unknown envelope format '{}'", envelope.format));
        }
        if envelope.version != ENVELOPE_VERSION {
            return Err(format!("unsupported envelope version {}", envelope.version));
        }

        let actual = sha256_hex(envelope.payload.get().as_bytes());
        if actual != envelope.sha256 {
            log::error!("Bundle hash mismatch: expected {}, got {}", envelope.sha256, actual);
            return Err(format!("checksum mismatch: expected {}, got {}", envelope.sha256, actual));
        }

        serde_json::from_str(envelope.payload.get()).map_err(|e| format!("payload is not a JSON object: {}", e))
    }
}

/// Fallback format: the bare `{"vectorizer": ..., "model": ...}` object.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainJsonLoader;

impl BundleLoader for PlainJsonLoader {
    fn name(&self) -> &'static str {
        "plain-json"
    }

    fn decode(&self, bytes: &[u8]) -> std::result::Result<Map<String, Value>, String> {
        let map: Map<String, Value> =
            serde_json::from_slice(bytes).map_err(|e| format!("not a JSON object: {}", e))?;
        if map.contains_key("payload") && map.contains_key("sha256") {
            return Err("artifact is a checksummed envelope; refusing to bypass its checksum".to_string());
        }
        Ok(map)
    }
}

/// The strategies tried by [`load_bundle`], in order.
pub fn default_loaders() -> Vec<Box<dyn BundleLoader>> {
    vec![Box::new(ChecksummedLoader), Box::new(PlainJsonLoader)]
}

pub(crate) fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Writes `classifier` to `path` in the checksummed format.
///
/// Parent directories are created. The bundle is written to a sibling
/// temporary file and renamed into place, so a failed write leaves no
/// partial artifact at `path`.
pub fn save_bundle(classifier: &SpamClassifier, path: &Path) -> Result<()> {
    let payload = serde_json::to_string(classifier)
        .map_err(|e| SpamError::IncompatibleBundle(format!("failed to encode bundle: {}", e)))?;
    let sha256 = sha256_hex(payload.as_bytes());
    let raw = RawValue::from_string(payload)
        .map_err(|e| SpamError::IncompatibleBundle(format!("failed to encode bundle: {}", e)))?;
    let envelope = EnvelopeOut {
        format: ENVELOPE_FORMAT,
        version: ENVELOPE_VERSION,
        sha256,
        payload: &raw,
    };
    let bytes = serde_json::to_vec(&envelope)
        .map_err(|e| SpamError::IncompatibleBundle(format!("failed to encode bundle: {}", e)))?;

    ensure_parent(path)?;
    let tmp = temporary_path(path);
    log::info!("Writing {} bytes to {:?}", bytes.len(), path);
    fs::write(&tmp, &bytes).map_err(|e| SpamError::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        SpamError::io(path, e)
    })?;
    Ok(())
}

/// Loads a bundle with the default strategies.
pub fn load_bundle(path: &Path) -> Result<SpamClassifier> {
    load_bundle_with(path, &default_loaders())
}

/// Loads a bundle by trying `loaders` in order.
///
/// The first strategy that decodes the bytes wins; if its result is not a
/// usable bundle the load fails with `IncompatibleBundle` without trying further
/// strategies. If no strategy decodes, `LoadFailure` lists every attempt.
pub fn load_bundle_with(path: &Path, loaders: &[Box<dyn BundleLoader>]) -> Result<SpamClassifier> {
    log::info!("Loading model bundle from {:?}", path);
    let bytes = fs::read(path).map_err(|e| SpamError::LoadFailure {
        path: path.to_path_buf(),
        attempts: vec![LoaderFailure {
            strategy: "read",
            reason: e.to_string(),
        }],
    })?;

    let mut attempts = Vec::new();
    for loader in loaders {
        match loader.decode(&bytes) {
            Ok(fields) => {
                log::debug!("Decoded {:?} with the {} loader", path, loader.name());
                return bundle_from_fields(fields);
            }
            Err(reason) => {
                log::debug!("{} loader rejected {:?}: {}", loader.name(), path, reason);
                attempts.push(LoaderFailure {
                    strategy: loader.name(),
                    reason,
                });
            }
        }
    }

    Err(SpamError::LoadFailure {
        path: path.to_path_buf(),
        attempts,
    })
}

/// Builds a bundle from its decoded field map.
pub fn bundle_from_fields(mut fields: Map<String, Value>) -> Result<SpamClassifier> {
    if let Some(missing) = REQUIRED_FIELDS.iter().find(|f| !fields.contains_key(**f)) {
        return Err(SpamError::IncompatibleBundle(format!("missing required field '{}'", missing)));
    }
    let mut parts = Map::new();
    for field in REQUIRED_FIELDS {
        if let Some(value) = fields.remove(field) {
            parts.insert(field.to_string(), value);
        }
    }
    serde_json::from_value(Value::Object(parts)).map_err(|e| SpamError::IncompatibleBundle(e.to_string()))
}

/// `models/baseline.json` → `models/baseline_evaluation.json`
pub fn evaluation_path(model_path: &Path) -> PathBuf {
    let stem = model_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".to_string());
    model_path.with_file_name(format!("{}_evaluation.json", stem))
}

/// Writes the report next to the model and returns its path.
pub fn write_evaluation(report: &EvaluationReport, model_path: &Path) -> Result<PathBuf> {
    let path = evaluation_path(model_path);
    let json = serde_json::to_string_pretty(report)
        .map_err(|e| SpamError::InvalidArgument(format!("failed to encode evaluation: {}", e)))?;
    ensure_parent(&path)?;
    fs::write(&path, json).map_err(|e| SpamError::io(&path, e))?;
    Ok(path)
}

pub(crate) fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| SpamError::io(parent, e))?;
        }
    }
    Ok(())
}

fn temporary_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|s| s.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
