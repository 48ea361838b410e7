//! Byte sources for import: raw bytes, local files, provider documents, and
//! remote URLs.

use std::fmt;
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument};

use crate::error::{BundleError, Result};
use crate::provider::StorageProvider;

/// Selector value that asks for a URL to be entered instead of a document.
pub const NETWORK_IMPORT: &str = "network-import";

/// Where import bytes come from.
#[derive(Clone)]
pub enum ByteSource {
    Bytes(Vec<u8>),
    File(PathBuf),
    Provider {
        provider: Arc<dyn StorageProvider>,
        uri: String,
    },
    Remote(String),
}

impl fmt::Debug for ByteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            Self::File(path) => f.debug_tuple("File").field(path).finish(),
            Self::Provider { uri, .. } => f.debug_struct("Provider").field("uri", uri).finish_non_exhaustive(),
            Self::Remote(url) => f.debug_tuple("Remote").field(url).finish(),
        }
    }
}

impl fmt::Display for ByteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes(bytes) => write!(f, "<{} bytes>", bytes.len()),
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Provider { uri, .. } => f.write_str(uri),
            Self::Remote(url) => f.write_str(url),
        }
    }
}

fn is_remote(s: &str) -> bool {
    let lower = s.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

impl ByteSource {
    /// Interpret a command-line source: `http(s)://` URLs are remote,
    /// `file://` URLs and everything else are local paths.
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();
        if is_remote(trimmed) {
            Self::Remote(trimmed.to_string())
        } else if let Some(path) = trimmed.strip_prefix("file://") {
            Self::File(PathBuf::from(path))
        } else {
            Self::File(PathBuf::from(trimmed))
        }
    }

    /// Read the whole source into memory.
    #[instrument(skip(self), fields(source = %self))]
    pub async fn read_all(self, timeout: Option<Duration>) -> Result<Vec<u8>> {
        match self {
            Self::Bytes(bytes) => Ok(bytes),
            Self::File(path) => tokio::fs::read(&path).await.map_err(|e| {
                BundleError::Other(format!("Cannot read {}: {e}", path.display()))
            }),
            Self::Provider { provider, uri } => tokio::task::spawn_blocking(move || provider.read(&uri))
                .await
                .map_err(|e| BundleError::Other(format!("Provider read task failed: {e}")))?,
            Self::Remote(url) => fetch_remote(&url, timeout).await,
        }
    }
}

/// GET `url` and return the body. Transport errors, timeouts and non-success
/// statuses are all `NetworkFailure`.
#[instrument(skip(timeout))]
pub async fn fetch_remote(url: &str, timeout: Option<Duration>) -> Result<Vec<u8>> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    let client = builder
        .build()
        .map_err(|e| BundleError::NetworkFailure(format!("Cannot build HTTP client: {e}")))?;

    debug!(?timeout, "Fetching bundle");
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| BundleError::NetworkFailure(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(BundleError::NetworkFailure(format!(
            "GET {url} returned status {status}"
        )));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| BundleError::NetworkFailure(e.to_string()))?;
    info!(bytes = body.len(), "Fetched bundle");
    Ok(body.to_vec())
}

/// What the user picked as an import source.
#[derive(Debug, Clone)]
pub enum ImportSelection {
    Source(ByteSource),
    /// Ask for a URL, then import from it.
    NetworkPrompt,
}

impl ImportSelection {
    pub fn parse(s: &str) -> Self {
        if s.trim() == NETWORK_IMPORT {
            Self::NetworkPrompt
        } else {
            Self::Source(ByteSource::parse(s))
        }
    }
}

/// Read one URL line from a prompt input.
pub fn read_url<R: BufRead>(mut input: R) -> Result<String> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    let url = line.trim();
    if url.is_empty() {
        return Err(BundleError::NetworkFailure("No URL entered".to_string()));
    }
    Ok(url.to_string())
}
