//! Pipeline stages for gazette ingestion.
//!
//! Each submodule implements exactly one transformation step. Keeping
//! stages separate makes each independently testable and lets us swap
//! implementations (an alternate OCR engine, another spreadsheet reader)
//! without touching other stages.
//!
//! ## Data Flow
//!
//! ```text
//! PDF bytes ──▶ text_source ──▶ extract ──▶ candidate records
//!               (pdfium / ocr)  (regex grammar)
//!
//! sheet bytes ─▶ spreadsheet ─────────────▶ candidate records
//!                (calamine)
//! ```
//!
//! 1. [`text_source`] — resolve one normalized text string per document:
//!    embedded text layer first, OCR fallback second, as an explicit
//!    resolver chain
//! 2. [`ocr`] — the fallback resolver: pdfium rasterisation + tesseract
//! 3. [`extract`] — segment normalized text into case blocks and apply the
//!    ordered field-rule grammar
//! 4. [`spreadsheet`] — canonicalise ledger headers and shape rows

pub mod extract;
pub mod ocr;
pub mod spreadsheet;
pub mod text_source;
