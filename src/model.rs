//! Canonical record and response types.
//!
//! [`CanonicalRecord`] is the unit moved through the whole pipeline: the
//! field extractor and the spreadsheet normalizer both emit it, the
//! reconciliation engine partitions it, and the store persists it. The wire
//! form is camelCase (`causeNo`, `nameOfDeceased`, …) to match the JSON
//! contract consumers already speak.

use crate::error::FileFailure;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Processing status of a case at the Government Printer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GazetteStatus {
    /// Recorded administratively, not yet gazetted. (default)
    #[default]
    Pending,
    /// Approved for publication.
    Approved,
    /// Rejected; [`CanonicalRecord::rejection_reason`] must say why.
    Rejected,
    /// Found in a gazette document.
    Published,
}

impl fmt::Display for GazetteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GazetteStatus::Pending => "Pending",
            GazetteStatus::Approved => "Approved",
            GazetteStatus::Rejected => "Rejected",
            GazetteStatus::Published => "Published",
        };
        f.write_str(s)
    }
}

/// The unified structured representation of an estate case, regardless of
/// whether it came from a gazette PDF or a spreadsheet.
///
/// Invariants:
/// * `cause_no` and `name_of_deceased` are non-empty for any record that
///   exists past extraction — blocks lacking either are dropped.
/// * `sequence_no` is `None` while the record is in flight and is assigned
///   exactly once, at persistence time, by the store's sequence allocator.
/// * `rejection_reason` is non-empty if and only if the status is
///   [`GazetteStatus::Rejected`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalRecord {
    /// Globally unique serial number, assigned at persistence time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_no: Option<u64>,
    /// Issuing court, e.g. "Nairobi High Court"; "Unknown" when no court
    /// pattern matched.
    pub court_station: String,
    /// Case identifier as printed, e.g. "E123 OF 2024".
    pub cause_no: String,
    /// Name of the deceased as printed.
    pub name_of_deceased: String,
    /// Date the record entered the system.
    pub date_received: NaiveDate,
    /// Status at the Government Printer.
    #[serde(rename = "statusAtGP")]
    pub status_at_gp: GazetteStatus,
    /// Why the record was rejected; empty unless status is `Rejected`.
    #[serde(default)]
    pub rejection_reason: String,
    /// Publication date derived from the gazette, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_published: Option<NaiveDate>,
    /// Gazette volume, derived from the source file name; "Unknown" when
    /// absent, empty for spreadsheet-sourced rows.
    #[serde(default)]
    pub volume_no: String,
    /// Original file name, document-sourced records only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
}

impl CanonicalRecord {
    /// True when both required fields survived extraction.
    pub fn is_complete(&self) -> bool {
        !self.cause_no.is_empty() && !self.name_of_deceased.is_empty()
    }
}

/// Result of reconciling a spreadsheet against a gazette document: three
/// disjoint partitions plus the document's own publication date, which is
/// applied to every `matched` and `only_spreadsheet` entry (the spreadsheet
/// itself carries no publication date).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchPartition {
    /// Spreadsheet rows with a fuzzy name match in the document. One entry
    /// per matched spreadsheet row, not per document row.
    pub matched: Vec<CanonicalRecord>,
    /// Spreadsheet rows with no counterpart in the document.
    #[serde(rename = "onlyExcel")]
    pub only_spreadsheet: Vec<CanonicalRecord>,
    /// Document rows with no counterpart in the spreadsheet.
    #[serde(rename = "onlyPdf")]
    pub only_document: Vec<CanonicalRecord>,
    /// The gazette's header date, if one could be derived.
    #[serde(rename = "datePublished")]
    pub date_published: Option<NaiveDate>,
}

impl MatchPartition {
    /// Summary counts for the response body.
    pub fn stats(&self) -> VerifyStats {
        VerifyStats {
            matched: self.matched.len(),
            only_excel: self.only_spreadsheet.len(),
            only_pdf: self.only_document.len(),
        }
    }
}

/// Summary counts of a verification run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyStats {
    pub matched: usize,
    pub only_excel: usize,
    pub only_pdf: usize,
}

/// Full response of the verify operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyReport {
    #[serde(rename = "datePublished")]
    pub date_published: Option<NaiveDate>,
    pub stats: VerifyStats,
    pub matched: Vec<CanonicalRecord>,
    #[serde(rename = "onlyExcel")]
    pub only_excel: Vec<CanonicalRecord>,
    #[serde(rename = "onlyPdf")]
    pub only_pdf: Vec<CanonicalRecord>,
}

impl From<MatchPartition> for VerifyReport {
    fn from(p: MatchPartition) -> Self {
        let stats = p.stats();
        VerifyReport {
            date_published: p.date_published,
            stats,
            matched: p.matched,
            only_excel: p.only_spreadsheet,
            only_pdf: p.only_document,
        }
    }
}

/// Response of the bulk-ingest operation: everything persisted this run,
/// plus a failure note for each file that contributed nothing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestReport {
    /// Number of records created (equals `records.len()`).
    pub count: usize,
    /// The created records, each with its assigned sequence number.
    pub records: Vec<CanonicalRecord>,
    /// Per-file failures; an empty list means every file yielded records.
    pub failures: Vec<FileFailure>,
}

/// An already-materialised file payload plus its declared content type.
///
/// Upload transport is an external collaborator; the engine only ever sees
/// bytes and a MIME string.
#[derive(Debug, Clone)]
pub struct FilePayload {
    /// Original file name, e.g. "Gazette Vol. 37.pdf". Also the source of
    /// the per-document volume number.
    pub name: String,
    /// Declared MIME type, e.g. "application/pdf".
    pub content_type: String,
    /// Raw file bytes.
    pub bytes: Vec<u8>,
}

impl FilePayload {
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str) -> CanonicalRecord {
        CanonicalRecord {
            sequence_no: None,
            court_station: "Unknown".into(),
            cause_no: "E1 OF 2024".into(),
            name_of_deceased: name.into(),
            date_received: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            status_at_gp: GazetteStatus::Pending,
            rejection_reason: String::new(),
            date_published: None,
            volume_no: String::new(),
            source_file: None,
        }
    }

    #[test]
    fn camel_case_wire_form() {
        let json = serde_json::to_value(record("John Kamau")).unwrap();
        assert!(json.get("causeNo").is_some());
        assert!(json.get("nameOfDeceased").is_some());
        assert_eq!(json["statusAtGP"], "Pending");
        // In-flight records serialise without a sequence number.
        assert!(json.get("sequenceNo").is_none());
    }

    #[test]
    fn partition_stats_count_each_list() {
        let p = MatchPartition {
            matched: vec![record("a")],
            only_spreadsheet: vec![record("b"), record("c")],
            only_document: vec![],
            date_published: None,
        };
        let s = p.stats();
        assert_eq!((s.matched, s.only_excel, s.only_pdf), (1, 2, 0));
    }

    #[test]
    fn verify_report_renames_partitions() {
        let p = MatchPartition {
            matched: vec![],
            only_spreadsheet: vec![record("b")],
            only_document: vec![record("c")],
            date_published: NaiveDate::from_ymd_opt(2024, 3, 14),
        };
        let json = serde_json::to_value(VerifyReport::from(p)).unwrap();
        assert_eq!(json["onlyExcel"].as_array().unwrap().len(), 1);
        assert_eq!(json["onlyPdf"].as_array().unwrap().len(), 1);
        assert_eq!(json["datePublished"], "2024-03-14");
    }

    #[test]
    fn status_display() {
        assert_eq!(GazetteStatus::Published.to_string(), "Published");
        assert_eq!(GazetteStatus::default(), GazetteStatus::Pending);
    }
}
