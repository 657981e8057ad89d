//! Document sources: where config content comes from.
//!
//! The host file system is an external collaborator; the model only asks a
//! [`DocumentSource`] for content and a modification stamp.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::UNIX_EPOCH;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use thiserror::Error;

/// Errors raised while loading a document.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// No document under this name.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// IO error during read.
    #[error("IO error reading '{name}': {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// Markup could not be read at all.
    #[error("Malformed document '{name}': {message}")]
    Malformed { name: String, message: String },
}

impl DocumentError {
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    pub fn malformed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Malformed {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Loaded document content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    pub name: Arc<str>,
    pub content: Arc<str>,
    /// Modification stamp at load time.
    pub stamp: u64,
}

/// Provides document content by resource name.
pub trait DocumentSource: Send + Sync {
    fn read(&self, name: &str) -> Result<Document, DocumentError>;

    /// Current modification stamp, `None` if the document does not exist.
    fn modification_stamp(&self, name: &str) -> Option<u64>;

    fn exists(&self, name: &str) -> bool {
        self.modification_stamp(name).is_some()
    }
}

// ============================================================================
// IN-MEMORY
// ============================================================================

/// Documents held in memory, e.g. editor buffers or test fixtures.
///
/// Every `insert` bumps a global stamp so changed content is detectable.
#[derive(Debug, Default)]
pub struct InMemoryDocuments {
    documents: RwLock<FxHashMap<Arc<str>, Document>>,
    clock: AtomicU64,
}

impl InMemoryDocuments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(self, name: &str, content: &str) -> Self {
        self.insert(name, content);
        self
    }

    pub fn insert(&self, name: &str, content: &str) {
        let stamp = self.clock.fetch_add(1, Ordering::Relaxed) + 1;
        let name: Arc<str> = Arc::from(name);
        self.documents.write().insert(
            name.clone(),
            Document {
                name,
                content: Arc::from(content),
                stamp,
            },
        );
    }

    pub fn remove(&self, name: &str) -> bool {
        self.documents.write().remove(name).is_some()
    }

    pub fn names(&self) -> Vec<Arc<str>> {
        let mut names: Vec<_> = self.documents.read().keys().cloned().collect();
        names.sort();
        names
    }
}

impl DocumentSource for InMemoryDocuments {
    fn read(&self, name: &str) -> Result<Document, DocumentError> {
        self.documents
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| DocumentError::not_found(name))
    }

    fn modification_stamp(&self, name: &str) -> Option<u64> {
        self.documents.read().get(name).map(|d| d.stamp)
    }
}

// ============================================================================
// FILE SYSTEM
// ============================================================================

/// Documents read from disk, names relative to a root directory.
#[derive(Clone, Debug)]
pub struct FileSystemDocuments {
    root: PathBuf,
}

impl FileSystemDocuments {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(name.trim_start_matches('/'))
    }
}

impl DocumentSource for FileSystemDocuments {
    fn read(&self, name: &str) -> Result<Document, DocumentError> {
        let path = self.path_of(name);
        if !path.is_file() {
            return Err(DocumentError::not_found(name));
        }
        let content = std::fs::read_to_string(&path).map_err(|source| DocumentError::Io {
            name: name.to_string(),
            source,
        })?;
        Ok(Document {
            name: Arc::from(name),
            content: Arc::from(content),
            stamp: self.modification_stamp(name).unwrap_or_default(),
        })
    }

    fn modification_stamp(&self, name: &str) -> Option<u64> {
        let metadata = std::fs::metadata(self.path_of(name)).ok()?;
        let modified = metadata.modified().ok()?;
        let nanos = modified
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        // Mix in the length so rewrites within the timer resolution still register
        Some((nanos as u64) ^ metadata.len().rotate_left(48))
    }
}
