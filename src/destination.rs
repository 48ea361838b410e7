//! Export destinations: a filesystem directory or a provider tree.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::error::{BundleError, Result};
use crate::provider::StorageProvider;

/// Where an exported bundle is written.
#[derive(Clone)]
pub enum ExportDestination {
    /// A directory on the local filesystem.
    Filesystem(PathBuf),
    /// A document tree of a storage provider.
    Provider {
        provider: Arc<dyn StorageProvider>,
        tree: String,
    },
}

impl fmt::Debug for ExportDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Filesystem(dir) => f.debug_tuple("Filesystem").field(dir).finish(),
            Self::Provider { tree, .. } => f.debug_struct("Provider").field("tree", tree).finish_non_exhaustive(),
        }
    }
}

impl fmt::Display for ExportDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Filesystem(dir) => write!(f, "{}", dir.display()),
            Self::Provider { tree, .. } => f.write_str(tree),
        }
    }
}

impl ExportDestination {
    pub fn directory(dir: impl Into<PathBuf>) -> Self {
        Self::Filesystem(dir.into())
    }

    pub fn provider(provider: Arc<dyn StorageProvider>, tree: impl Into<String>) -> Self {
        Self::Provider {
            provider,
            tree: tree.into(),
        }
    }

    /// Write `bytes` as `name`, replacing any existing entry of that name.
    ///
    /// The old entry is deleted before the new one is created. Returns a
    /// display string for the written location.
    #[instrument(skip(self, bytes), fields(dest = %self, bytes = bytes.len()))]
    pub fn write_file(&self, name: &str, bytes: &[u8]) -> Result<String> {
        let fail = |reason: String| BundleError::DestinationWriteFailure {
            name: name.to_string(),
            reason,
        };

        match self {
            Self::Filesystem(dir) => {
                std::fs::create_dir_all(dir).map_err(|e| fail(e.to_string()))?;
                let path = dir.join(name);
                if path.exists() {
                    std::fs::remove_file(&path).map_err(|e| fail(e.to_string()))?;
                }
                std::fs::write(&path, bytes).map_err(|e| fail(e.to_string()))?;
                debug!(path = %path.display(), "Wrote bundle to directory");
                Ok(path.display().to_string())
            }
            Self::Provider { provider, tree } => {
                if let Some(existing) = provider.find_child(tree, name).map_err(|e| fail(e.to_string()))? {
                    provider.delete(&existing).map_err(|e| fail(e.to_string()))?;
                }
                let uri = provider.create_child(tree, name).map_err(|e| fail(e.to_string()))?;
                provider.write(&uri, bytes).map_err(|e| fail(e.to_string()))?;
                debug!(uri = %uri, "Wrote bundle to provider");
                Ok(uri)
            }
        }
    }
}
