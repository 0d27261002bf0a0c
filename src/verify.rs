//! Verification: one spreadsheet + one gazette PDF → a match partition.
//!
//! Both payloads are required; a missing side is a whole-request error,
//! unlike the per-file tolerance of bulk ingest — there is nothing to
//! reconcile with half the inputs. Reconciliation is read-only: it never
//! touches the record store, it only produces a response-scoped partition.

use crate::config::EngineConfig;
use crate::error::GazetteError;
use crate::matcher::NameMatcher;
use crate::model::{FilePayload, VerifyReport};
use crate::pipeline::extract::{derive_publication_date, extract_records};
use crate::pipeline::spreadsheet::parse_spreadsheet;
use crate::pipeline::text_source::ResolverChain;
use crate::reconcile::reconcile;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::info;

/// Reconcile a ledger spreadsheet against a gazette document.
///
/// # Errors
///
/// Everything here is whole-request: a missing payload, a payload that is
/// not what it claims to be, a spreadsheet without data rows, or a gazette
/// from which no text can be resolved (including OCR fallback).
pub async fn verify(
    spreadsheet: Option<FilePayload>,
    gazette: Option<FilePayload>,
    config: &EngineConfig,
) -> Result<VerifyReport, GazetteError> {
    let spreadsheet = spreadsheet.ok_or(GazetteError::MissingPayload {
        which: "spreadsheet",
    })?;
    let gazette = gazette.ok_or(GazetteError::MissingPayload {
        which: "gazette PDF",
    })?;

    if !gazette.bytes.starts_with(b"%PDF") {
        let mut magic = [0u8; 4];
        let len = gazette.bytes.len().min(4);
        magic[..len].copy_from_slice(&gazette.bytes[..len]);
        return Err(GazetteError::NotAPdf {
            name: gazette.name,
            content_type: gazette.content_type,
            magic,
        });
    }

    let today = chrono::Utc::now().date_naive();
    let sheet_rows = parse_spreadsheet(&spreadsheet.bytes, &spreadsheet.name, today)?;

    // Resolve and extract the single gazette document. Per-document
    // failures have no batch to hide in here; they fail the request.
    let chain = ResolverChain::standard(config);
    let chain = Arc::new(chain);
    let timeout_secs = config.document_timeout_secs;
    let gazette_name = gazette.name.clone();

    let work = tokio::task::spawn_blocking(move || {
        let text = chain.resolve(&gazette.bytes, &gazette.name)?;
        let records = extract_records(&text, &gazette.name, today);
        let date_published = derive_publication_date(&text);
        Ok::<_, crate::error::FileFailure>((records, date_published))
    });

    let (doc_rows, date_published) = match timeout(Duration::from_secs(timeout_secs), work).await {
        Ok(Ok(result)) => result.map_err(GazetteError::GazetteUnusable)?,
        Ok(Err(join_error)) => {
            return Err(GazetteError::Internal(format!(
                "extraction task failed: {join_error}"
            )))
        }
        Err(_elapsed) => {
            return Err(GazetteError::GazetteUnusable(
                crate::error::FileFailure::Timeout {
                    file: gazette_name,
                    secs: timeout_secs,
                },
            ))
        }
    };

    let matcher = NameMatcher::new(config.match_threshold);
    let partition = reconcile(&sheet_rows, &doc_rows, &matcher, date_published);

    info!(
        matched = partition.matched.len(),
        only_excel = partition.only_spreadsheet.len(),
        only_pdf = partition.only_document.len(),
        "verification complete"
    );
    Ok(VerifyReport::from(partition))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_spreadsheet_rejected() {
        let gazette = FilePayload::new("g.pdf", "application/pdf", b"%PDF-1.7".to_vec());
        let err = verify(None, Some(gazette), &EngineConfig::default()).await;
        assert!(matches!(
            err,
            Err(GazetteError::MissingPayload {
                which: "spreadsheet"
            })
        ));
    }

    #[tokio::test]
    async fn missing_gazette_rejected() {
        let sheet = FilePayload::new("s.xlsx", "application/vnd.ms-excel", vec![1, 2, 3]);
        let err = verify(Some(sheet), None, &EngineConfig::default()).await;
        assert!(matches!(err, Err(GazetteError::MissingPayload { .. })));
    }

    #[tokio::test]
    async fn gazette_magic_checked_before_parsing() {
        let sheet = FilePayload::new("s.xlsx", "application/vnd.ms-excel", vec![1, 2, 3]);
        let gazette = FilePayload::new("g.pdf", "application/pdf", b"PK\x03\x04junk".to_vec());
        let err = verify(Some(sheet), Some(gazette), &EngineConfig::default()).await;
        assert!(matches!(err, Err(GazetteError::NotAPdf { .. })));
    }
}
