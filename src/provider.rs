//! Storage-provider abstraction for documents that are not plain paths.
//!
//! A provider exposes opaque document URIs grouped under tree URIs. The
//! engine never assumes filesystem semantics for them: it finds, deletes,
//! creates and writes documents only through [`StorageProvider`].
//!
//! [`MemoryProvider`] keeps documents in memory and records operations, for
//! embedding and for tests.
//!
//! ```rust,ignore
//! let provider = Arc::new(MemoryProvider::new());
//! let dest = ExportDestination::provider(provider.clone(), "mem://exports");
//! exporter.export(&record, &dest)?;
//! assert!(provider.get("mem://exports/Paper.zip").is_some());
//! ```

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, trace};

use crate::error::{BundleError, Result};

/// Document storage reached through URIs.
pub trait StorageProvider: Send + Sync {
    /// Read a whole document.
    fn read(&self, uri: &str) -> Result<Vec<u8>>;

    /// Find a direct child of `tree` by display name.
    fn find_child(&self, tree: &str, name: &str) -> Result<Option<String>>;

    /// Delete a document.
    fn delete(&self, uri: &str) -> Result<()>;

    /// Create an empty child document under `tree` and return its URI.
    fn create_child(&self, tree: &str, name: &str) -> Result<String>;

    /// Replace a document's contents.
    fn write(&self, uri: &str, bytes: &[u8]) -> Result<()>;
}

/// Recorded provider call, for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderOp {
    Read { uri: String },
    FindChild { tree: String, name: String },
    Delete { uri: String },
    CreateChild { tree: String, name: String },
    Write { uri: String, len: usize },
}

/// In-memory provider.
#[derive(Debug, Default)]
pub struct MemoryProvider {
    documents: Mutex<BTreeMap<String, Vec<u8>>>,
    operation_log: Mutex<Vec<ProviderOp>>,
    fail_writes: AtomicBool,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn child_uri(tree: &str, name: &str) -> String {
        format!("{}/{name}", tree.trim_end_matches('/'))
    }

    fn log(&self, op: ProviderOp) {
        trace!(?op, "Provider operation");
        self.operation_log.lock().expect("provider log poisoned").push(op);
    }

    /// Store a document directly.
    pub fn insert(&self, uri: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.documents
            .lock()
            .expect("provider documents poisoned")
            .insert(uri.into(), bytes.into());
    }

    /// Copy of a document's contents.
    pub fn get(&self, uri: &str) -> Option<Vec<u8>> {
        self.documents
            .lock()
            .expect("provider documents poisoned")
            .get(uri)
            .cloned()
    }

    /// URIs of all stored documents, sorted.
    pub fn uris(&self) -> Vec<String> {
        self.documents
            .lock()
            .expect("provider documents poisoned")
            .keys()
            .cloned()
            .collect()
    }

    /// Make every subsequent write fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Operations performed so far.
    pub fn operations(&self) -> Vec<ProviderOp> {
        self.operation_log.lock().expect("provider log poisoned").clone()
    }
}

impl StorageProvider for MemoryProvider {
    fn read(&self, uri: &str) -> Result<Vec<u8>> {
        self.log(ProviderOp::Read { uri: uri.to_string() });
        self.get(uri)
            .ok_or_else(|| BundleError::Other(format!("No such document: {uri}")))
    }

    fn find_child(&self, tree: &str, name: &str) -> Result<Option<String>> {
        self.log(ProviderOp::FindChild {
            tree: tree.to_string(),
            name: name.to_string(),
        });
        let uri = Self::child_uri(tree, name);
        let exists = self
            .documents
            .lock()
            .expect("provider documents poisoned")
            .contains_key(&uri);
        Ok(exists.then_some(uri))
    }

    fn delete(&self, uri: &str) -> Result<()> {
        self.log(ProviderOp::Delete { uri: uri.to_string() });
        self.documents
            .lock()
            .expect("provider documents poisoned")
            .remove(uri);
        Ok(())
    }

    fn create_child(&self, tree: &str, name: &str) -> Result<String> {
        self.log(ProviderOp::CreateChild {
            tree: tree.to_string(),
            name: name.to_string(),
        });
        let uri = Self::child_uri(tree, name);
        self.insert(uri.clone(), Vec::new());
        debug!(uri = %uri, "Document created");
        Ok(uri)
    }

    fn write(&self, uri: &str, bytes: &[u8]) -> Result<()> {
        self.log(ProviderOp::Write {
            uri: uri.to_string(),
            len: bytes.len(),
        });
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(BundleError::Other(format!("Write rejected for {uri}")));
        }
        self.insert(uri, bytes);
        Ok(())
    }
}
