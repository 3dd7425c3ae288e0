use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::embedding::Embedding;

/// Errors that can occur while reading or writing the sentence file.
#[derive(Debug)]
pub enum StoreError {
    /// The file could not be read, written or renamed.
    Io(String),
    /// The file exists but is not a valid sentence document.
    Corrupt(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "storage error: {msg}"),
            Self::Corrupt(msg) => write!(f, "corrupt sentence store: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// A saved sentence together with its embedding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SentenceRecord {
    pub text: String,
    pub embedding: Embedding,
    /// Records written before timestamps existed read back as `""`.
    #[serde(default)]
    pub timestamp: String,
}

/// The embedding-free view of a record returned by listings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SentenceListing {
    pub text: String,
    pub timestamp: String,
}

impl From<&SentenceRecord> for SentenceListing {
    fn from(record: &SentenceRecord) -> Self {
        Self {
            text: record.text.clone(),
            timestamp: record.timestamp.clone(),
        }
    }
}

/// On-disk document layout.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SentenceDocument {
    #[serde(default)]
    sentences: Vec<SentenceRecord>,
}

/// JSON-file-backed sentence store.
///
/// Every mutation rewrites the whole file. The `Mutex` serializes
/// load-modify-store cycles within this process; other processes writing
/// the same file can still lose updates.
pub struct SentenceStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl SentenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every stored record. A missing file is an empty store.
    pub fn load(&self) -> Result<Vec<SentenceRecord>, StoreError> {
        let _guard = self.guard();
        Ok(self.read_document()?.sentences)
    }

    /// Append one record and rewrite the file.
    pub fn append(&self, record: SentenceRecord) -> Result<(), StoreError> {
        let _guard = self.guard();
        let mut document = self.read_document()?;
        document.sentences.push(record);
        self.write_document(&document)?;
        log::info!(
            "saved sentence #{} to {}",
            document.sentences.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Replace the stored collection with an empty one.
    pub fn reset_all(&self) -> Result<(), StoreError> {
        let _guard = self.guard();
        self.write_document(&SentenceDocument::default())?;
        log::info!("reset sentence store at {}", self.path.display());
        Ok(())
    }

    /// List texts and timestamps in insertion order, without embeddings.
    pub fn list_all(&self) -> Result<Vec<SentenceListing>, StoreError> {
        Ok(self.load()?.iter().map(SentenceListing::from).collect())
    }

    pub fn count(&self) -> Result<usize, StoreError> {
        Ok(self.load()?.len())
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        // The guarded unit carries no state, so a poisoned lock is still usable.
        self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn read_document(&self) -> Result<SentenceDocument, StoreError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(SentenceDocument::default());
            }
            Err(e) => {
                return Err(StoreError::Io(format!(
                    "failed to read '{}': {e}",
                    self.path.display()
                )));
            }
        };
        serde_json::from_str(&contents)
            .map_err(|e| StoreError::Corrupt(format!("'{}': {e}", self.path.display())))
    }

    /// Write to a sibling temp file, then rename it over the target.
    fn write_document(&self, document: &SentenceDocument) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(document)
            .map_err(|e| StoreError::Io(format!("failed to serialize sentences: {e}")))?;

        let tmp_path = self.tmp_path();
        std::fs::write(&tmp_path, json).map_err(|e| {
            StoreError::Io(format!("failed to write '{}': {e}", tmp_path.display()))
        })?;
        std::fs::rename(&tmp_path, &self.path).map_err(|e| {
            std::fs::remove_file(&tmp_path).ok();
            StoreError::Io(format!(
                "failed to replace '{}': {e}",
                self.path.display()
            ))
        })
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
