//! Background dispatch of export and import runs.
//!
//! Each run executes off the caller's thread and resolves to exactly one
//! `Result`. There is no progress reporting and no mid-run cancellation;
//! dropping the handle before the run starts is the only way to skip it.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info_span};

use crate::bundle::{BundleEngine, ExportReport, ImportReport};
use crate::destination::ExportDestination;
use crate::error::{BundleError, Result};
use crate::source::ByteSource;

fn join_error(e: &tokio::task::JoinError) -> BundleError {
    BundleError::Other(format!("Background task failed: {e}"))
}

/// Export the current record on the blocking pool.
pub fn spawn_export(engine: Arc<BundleEngine>, dest: ExportDestination) -> JoinHandle<Result<ExportReport>> {
    let span = info_span!("export", dest = %dest);
    tokio::spawn(
        async move {
            tokio::task::spawn_blocking(move || engine.export_current(&dest))
                .await
                .map_err(|e| join_error(&e))?
        }
        .instrument(span),
    )
}

/// Read `source` (fetching it when remote), then import on the blocking pool.
pub fn spawn_import(
    engine: Arc<BundleEngine>,
    source: ByteSource,
    timeout: Option<Duration>,
) -> JoinHandle<Result<ImportReport>> {
    let span = info_span!("import", source = %source);
    tokio::spawn(
        async move {
            let bytes = source.read_all(timeout).await?;
            debug!(bytes = bytes.len(), "Source read");
            tokio::task::spawn_blocking(move || engine.import_bytes(&bytes))
                .await
                .map_err(|e| join_error(&e))?
        }
        .instrument(span),
    )
}
