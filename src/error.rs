//! Error types for the gazette-reconcile library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`GazetteError`] — **Fatal**: the request cannot proceed at all
//!   (no files supplied, spreadsheet has no data rows, store write failed).
//!   Returned as `Err(GazetteError)` from the top-level `bulk_ingest` /
//!   `verify` functions.
//!
//! * [`FileFailure`] — **Non-fatal**: a single document in a batch failed
//!   (no usable text even after OCR, corrupt bytes, timeout) but the other
//!   documents are fine. Collected into
//!   [`crate::model::IngestReport::failures`] so callers can inspect partial
//!   success rather than losing the whole batch to one bad file.
//!
//! The separation lets callers decide their own tolerance: abort on the
//! first failed file, log and continue, or collect all failures for a
//! post-run report.

use crate::store::StoreError;
use thiserror::Error;

/// All fatal errors returned by the gazette-reconcile library.
///
/// Per-document failures use [`FileFailure`] and are stored in
/// [`crate::model::IngestReport`] rather than propagated here.
#[derive(Debug, Error)]
pub enum GazetteError {
    // ── Input-shape errors ────────────────────────────────────────────────
    /// The bulk-ingest request carried no files at all.
    #[error("No PDF files supplied")]
    NoFiles,

    /// The verify request is missing one of its two required payloads.
    #[error("Both a spreadsheet and a gazette PDF are required; missing {which}")]
    MissingPayload { which: &'static str },

    /// Declared as a PDF but the payload does not start with `%PDF`.
    #[error("'{name}' is not a PDF: declared '{content_type}', first bytes {magic:?}")]
    NotAPdf {
        name: String,
        content_type: String,
        magic: [u8; 4],
    },

    /// The spreadsheet could not be opened by any supported reader.
    #[error("Failed to read spreadsheet '{name}': {detail}")]
    SpreadsheetUnreadable { name: String, detail: String },

    /// The spreadsheet has a header row but no data rows (or is empty).
    #[error("Spreadsheet '{name}' has no data rows")]
    EmptySpreadsheet { name: String },

    // ── Verify-specific ───────────────────────────────────────────────────
    /// The single gazette document of a verify request failed; with no
    /// document text there is nothing to reconcile against.
    #[error("Gazette document unusable: {0}")]
    GazetteUnusable(#[source] FileFailure),

    // ── Persistence ───────────────────────────────────────────────────────
    /// The canonical-record store refused a write. Surfaced instead of
    /// silently skipping, so sequence numbering never papers over a failed
    /// insert.
    #[error("Record store failure")]
    Store(#[from] StoreError),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal failure for a single document in a batch.
///
/// Bulk ingest skips the document and continues; the failure is reported in
/// [`crate::model::IngestReport::failures`] for operator visibility.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum FileFailure {
    /// Embedded-text extraction and OCR both produced nothing but
    /// whitespace. The document contributes zero records.
    #[error("'{file}': no usable text (embedded extraction and OCR both empty)")]
    NoText { file: String },

    /// Byte-level parsing of the document failed.
    #[error("'{file}': unreadable PDF: {detail}")]
    Corrupt { file: String, detail: String },

    /// Text was obtained but no block yielded both required fields.
    #[error("'{file}': no valid case blocks found")]
    NoValidBlocks { file: String },

    /// The per-document timeout elapsed before extraction finished.
    #[error("'{file}': extraction timed out after {secs}s")]
    Timeout { file: String, secs: u64 },
}

impl FileFailure {
    /// The source file this failure refers to.
    pub fn file(&self) -> &str {
        match self {
            FileFailure::NoText { file }
            | FileFailure::Corrupt { file, .. }
            | FileFailure::NoValidBlocks { file }
            | FileFailure::Timeout { file, .. } => file,
        }
    }
}
