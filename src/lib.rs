//! # gazette-reconcile
//!
//! Extract probate cause lists from gazette PDFs and reconcile them against
//! independently-kept estate-case spreadsheets.
//!
//! ## Why this crate?
//!
//! A case can be gazetted without ever being recorded administratively, or
//! recorded and never gazetted — and nobody notices either way until an
//! estate dispute surfaces years later. Reconciling the two sources by hand
//! means reading hundreds of near-identical notices per volume. This crate
//! turns both sources into one canonical record shape and answers the only
//! question that matters: which cases appear in both, which only in the
//! spreadsheet, which only in the document.
//!
//! Extraction is deterministic best-effort under a fixed regex grammar:
//! a block missing its cause number or deceased name is dropped, never
//! guessed at, and a document with no usable text (even after OCR) is
//! reported as a failed file rather than aborting the batch.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF bytes
//!  │
//!  ├─ 1. Resolve   embedded text layer, OCR fallback (pdfium + tesseract)
//!  ├─ 2. Normalize line breaks and whitespace runs → single spaces
//!  ├─ 3. Segment   split on "CAUSE NO." case-header markers
//!  ├─ 4. Extract   ordered field rules per block (cause, name, court, date)
//!  └─ 5a. Persist  sequence numbers from the store's atomic allocator
//!      └─ or ─
//!     5b. Reconcile fuzzy name match against spreadsheet rows
//!
//! spreadsheet bytes ─▶ header canonicalisation ─▶ rows (feeds 5b)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gazette_reconcile::{bulk_ingest, EngineConfig, FilePayload, InMemoryStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EngineConfig::default();
//!     let store = InMemoryStore::new();
//!     let bytes = std::fs::read("Gazette Vol. 37.pdf")?;
//!     let report = bulk_ingest(
//!         vec![FilePayload::new("Gazette Vol. 37.pdf", "application/pdf", bytes)],
//!         &config,
//!         &store,
//!     )
//!     .await?;
//!     println!("created {} records, {} failed files", report.count, report.failures.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `gazrec` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! gazette-reconcile = { version = "0.1", default-features = false }
//! ```
//!
//! ## Tuning the match threshold
//!
//! Name matching decides the whole reconciliation, and its 0.85 default is
//! a deliberate operating point, not a constant: lower it and different
//! cases start merging (false positives), raise it and OCR noise starts
//! hiding real matches (false negatives). Set it per run via
//! [`EngineConfig::builder`].

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod ingest;
pub mod matcher;
pub mod model;
pub mod pipeline;
pub mod reconcile;
pub mod store;
pub mod verify;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{EngineConfig, EngineConfigBuilder};
pub use error::{FileFailure, GazetteError};
pub use ingest::bulk_ingest;
pub use matcher::NameMatcher;
pub use model::{
    CanonicalRecord, FilePayload, GazetteStatus, IngestReport, MatchPartition, VerifyReport,
    VerifyStats,
};
pub use reconcile::reconcile;
pub use store::{InMemoryStore, RecordFilter, RecordStore, RecordUpdate, StoreError};
pub use verify::verify;
