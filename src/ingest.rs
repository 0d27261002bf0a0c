//! Bulk ingest: a batch of gazette PDFs → persisted canonical records.
//!
//! Documents in a batch are independent, so each runs as its own unit of
//! work on a bounded pool (`buffer_unordered`); extraction itself is
//! CPU/IO-bound pdfium + tesseract work and is hosted in `spawn_blocking`
//! with a per-document timeout so one corrupt file cannot stall the batch.
//!
//! The only cross-document coupling is sequence numbering, which the store
//! serialises internally; records are created one at a time and a store
//! write failure aborts the request rather than skipping silently.

use crate::config::EngineConfig;
use crate::error::{FileFailure, GazetteError};
use crate::model::{CanonicalRecord, FilePayload, IngestReport};
use crate::pipeline::extract::extract_records;
use crate::pipeline::text_source::ResolverChain;
use crate::store::RecordStore;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, warn};

/// Ingest a batch of gazette PDFs, persisting every extracted record.
///
/// # Errors
///
/// Fatal errors abort the whole request: an empty batch
/// ([`GazetteError::NoFiles`]) or a store write failure
/// ([`GazetteError::Store`]). Per-document problems — no usable text,
/// corrupt bytes, timeout, zero valid blocks — never abort; the document
/// is skipped and reported in [`IngestReport::failures`].
pub async fn bulk_ingest(
    files: Vec<FilePayload>,
    config: &EngineConfig,
    store: &dyn RecordStore,
) -> Result<IngestReport, GazetteError> {
    if files.is_empty() {
        return Err(GazetteError::NoFiles);
    }
    let batch_size = files.len();
    info!(files = batch_size, "bulk ingest started");

    let chain = Arc::new(ResolverChain::standard(config));

    let results: Vec<Result<Vec<CanonicalRecord>, FileFailure>> =
        stream::iter(files.into_iter().map(|file| {
            let chain = Arc::clone(&chain);
            let timeout_secs = config.document_timeout_secs;
            async move { extract_document(file, chain, timeout_secs).await }
        }))
        .buffer_unordered(config.concurrency)
        .collect()
        .await;

    let mut report = IngestReport::default();
    for result in results {
        match result {
            Ok(records) => {
                for record in records {
                    // A refused write surfaces immediately; continuing
                    // would hide a gap in the published record set.
                    report.records.push(store.create(record)?);
                }
            }
            Err(failure) => {
                warn!(file = failure.file(), %failure, "document skipped");
                report.failures.push(failure);
            }
        }
    }
    report.count = report.records.len();

    info!(
        created = report.count,
        failed_files = report.failures.len(),
        "bulk ingest complete"
    );
    Ok(report)
}

/// Extract all records from one document, bounded by the per-document
/// timeout. The blocking pdfium/tesseract work runs on the blocking pool;
/// on timeout the document is abandoned (the worker finishes in the
/// background, its output discarded).
async fn extract_document(
    file: FilePayload,
    chain: Arc<ResolverChain>,
    timeout_secs: u64,
) -> Result<Vec<CanonicalRecord>, FileFailure> {
    let name = file.name.clone();

    if !file.bytes.starts_with(b"%PDF") {
        return Err(FileFailure::Corrupt {
            file: name,
            detail: format!(
                "declared '{}' but payload is not a PDF",
                file.content_type
            ),
        });
    }

    let work = tokio::task::spawn_blocking(move || {
        let text = chain.resolve(&file.bytes, &file.name)?;
        let records = extract_records(&text, &file.name, chrono::Utc::now().date_naive());
        if records.is_empty() {
            return Err(FileFailure::NoValidBlocks { file: file.name });
        }
        Ok(records)
    });

    match timeout(Duration::from_secs(timeout_secs), work).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => Err(FileFailure::Corrupt {
            file: name,
            detail: format!("extraction task failed: {join_error}"),
        }),
        Err(_elapsed) => Err(FileFailure::Timeout {
            file: name,
            secs: timeout_secs,
        }),
    }
}
