//! Canonical-record store and the sequential numbering allocator.
//!
//! Persistence is an external collaborator from the engine's point of view:
//! bulk ingest only needs create/find/update/delete over single records.
//! [`RecordStore`] is that seam; [`InMemoryStore`] is the bundled
//! implementation used by the CLI and tests. A deployment backed by a real
//! database implements the same trait and supplies its own atomic sequence
//! (for example an auto-incrementing store-level counter).
//!
//! ## Sequence allocation
//!
//! `sequence_no` is the one shared mutable resource in the whole system:
//! it must be strictly increasing in assignment order and never reused,
//! even across concurrent ingestion batches. The allocator is therefore a
//! single `AtomicU64` fetch-and-increment inside `create`, not a
//! read-current-maximum-then-write pattern — two concurrent batches
//! interleaving a read-max would mint the same number twice.

use crate::model::{CanonicalRecord, GazetteStatus};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use thiserror::Error;
use tracing::debug;

/// Errors surfaced by a [`RecordStore`] implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record with the given sequence number.
    #[error("record {sequence_no} not found")]
    NotFound { sequence_no: u64 },

    /// A record is missing a required field.
    #[error("record is missing required field '{field}'")]
    MissingField { field: &'static str },

    /// Status set to Rejected without a reason.
    #[error("rejection reason is required when status is Rejected")]
    RejectionReasonRequired,

    /// The underlying storage failed a write.
    #[error("store write failed: {detail}")]
    Write { detail: String },
}

/// Filter for [`RecordStore::find`]. All populated fields must hold.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    /// Case-insensitive substring over cause number, deceased name, and
    /// court station.
    pub search: Option<String>,
    /// Exact court station.
    pub court: Option<String>,
    /// Exact status.
    pub status: Option<GazetteStatus>,
}

impl RecordFilter {
    fn accepts(&self, r: &CanonicalRecord) -> bool {
        if let Some(ref needle) = self.search {
            let needle = needle.to_lowercase();
            let hit = r.cause_no.to_lowercase().contains(&needle)
                || r.name_of_deceased.to_lowercase().contains(&needle)
                || r.court_station.to_lowercase().contains(&needle);
            if !hit {
                return false;
            }
        }
        if let Some(ref court) = self.court {
            if &r.court_station != court {
                return false;
            }
        }
        if let Some(status) = self.status {
            if r.status_at_gp != status {
                return false;
            }
        }
        true
    }
}

/// A status change applied through [`RecordStore::update`].
///
/// Only status transitions are expressible; extraction output is otherwise
/// immutable once persisted.
#[derive(Debug, Clone, Default)]
pub struct RecordUpdate {
    pub status_at_gp: Option<GazetteStatus>,
    pub rejection_reason: Option<String>,
    pub date_published: Option<chrono::NaiveDate>,
}

/// The persistence seam the ingest path writes through.
///
/// Implementations must make each single-record operation individually
/// atomic; no multi-record transaction is required, since reconciliation
/// never mutates persisted state.
pub trait RecordStore: Send + Sync {
    /// Persist a new record, assigning the next sequence number.
    ///
    /// The input's `sequence_no` is ignored; the store is the sole
    /// authority on numbering.
    fn create(&self, record: CanonicalRecord) -> Result<CanonicalRecord, StoreError>;

    /// All records accepted by the filter, ordered by sequence number.
    fn find(&self, filter: &RecordFilter) -> Result<Vec<CanonicalRecord>, StoreError>;

    /// Single record by sequence number.
    fn get(&self, sequence_no: u64) -> Result<CanonicalRecord, StoreError>;

    /// Apply a status change. Enforces the rejection-reason invariant: a
    /// `Rejected` status requires a non-empty reason, and any other status
    /// forces the reason back to empty.
    fn update(&self, sequence_no: u64, update: RecordUpdate) -> Result<CanonicalRecord, StoreError>;

    /// Remove a record. The sequence number is never reused.
    fn delete(&self, sequence_no: u64) -> Result<(), StoreError>;
}

/// Validate a record about to be persisted and normalise its rejection
/// reason against the status invariant.
fn validate_for_write(record: &mut CanonicalRecord) -> Result<(), StoreError> {
    if record.cause_no.trim().is_empty() {
        return Err(StoreError::MissingField { field: "causeNo" });
    }
    if record.name_of_deceased.trim().is_empty() {
        return Err(StoreError::MissingField {
            field: "nameOfDeceased",
        });
    }
    if record.status_at_gp == GazetteStatus::Rejected {
        if record.rejection_reason.trim().is_empty() {
            return Err(StoreError::RejectionReasonRequired);
        }
    } else {
        record.rejection_reason.clear();
    }
    Ok(())
}

/// In-memory [`RecordStore`] with an atomic sequence allocator.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: Mutex<BTreeMap<u64, CanonicalRecord>>,
    next_seq: AtomicU64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held.
    pub fn len(&self) -> usize {
        self.records.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<u64, CanonicalRecord>> {
        // A poisoned mutex only means another thread panicked mid-access;
        // the map itself is still structurally sound.
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl RecordStore for InMemoryStore {
    fn create(&self, mut record: CanonicalRecord) -> Result<CanonicalRecord, StoreError> {
        validate_for_write(&mut record)?;
        // fetch_add is the allocation: unique and strictly increasing even
        // when concurrent batches race on it.
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
        record.sequence_no = Some(seq);
        self.lock().insert(seq, record.clone());
        debug!(sequence_no = seq, cause_no = %record.cause_no, "record created");
        Ok(record)
    }

    fn find(&self, filter: &RecordFilter) -> Result<Vec<CanonicalRecord>, StoreError> {
        Ok(self
            .lock()
            .values()
            .filter(|r| filter.accepts(r))
            .cloned()
            .collect())
    }

    fn get(&self, sequence_no: u64) -> Result<CanonicalRecord, StoreError> {
        self.lock()
            .get(&sequence_no)
            .cloned()
            .ok_or(StoreError::NotFound { sequence_no })
    }

    fn update(&self, sequence_no: u64, update: RecordUpdate) -> Result<CanonicalRecord, StoreError> {
        let mut records = self.lock();
        let record = records
            .get_mut(&sequence_no)
            .ok_or(StoreError::NotFound { sequence_no })?;

        let mut candidate = record.clone();
        if let Some(status) = update.status_at_gp {
            candidate.status_at_gp = status;
        }
        if let Some(reason) = update.rejection_reason {
            candidate.rejection_reason = reason;
        }
        if let Some(date) = update.date_published {
            candidate.date_published = Some(date);
        }
        validate_for_write(&mut candidate)?;

        *record = candidate.clone();
        Ok(candidate)
    }

    fn delete(&self, sequence_no: u64) -> Result<(), StoreError> {
        self.lock()
            .remove(&sequence_no)
            .map(|_| ())
            .ok_or(StoreError::NotFound { sequence_no })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(name: &str) -> CanonicalRecord {
        CanonicalRecord {
            sequence_no: None,
            court_station: "Nairobi High Court".into(),
            cause_no: "E123 OF 2024".into(),
            name_of_deceased: name.into(),
            date_received: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            status_at_gp: GazetteStatus::Published,
            rejection_reason: String::new(),
            date_published: None,
            volume_no: "37".into(),
            source_file: Some("Vol. 37.pdf".into()),
        }
    }

    #[test]
    fn create_assigns_contiguous_sequence() {
        let store = InMemoryStore::new();
        let a = store.create(record("A")).unwrap();
        let b = store.create(record("B")).unwrap();
        assert_eq!(a.sequence_no, Some(1));
        assert_eq!(b.sequence_no, Some(2));
    }

    #[test]
    fn sequence_not_reused_after_delete() {
        let store = InMemoryStore::new();
        let a = store.create(record("A")).unwrap();
        store.delete(a.sequence_no.unwrap()).unwrap();
        let b = store.create(record("B")).unwrap();
        assert_eq!(b.sequence_no, Some(2));
    }

    #[test]
    fn create_rejects_missing_required_fields() {
        let store = InMemoryStore::new();
        let mut r = record("A");
        r.cause_no = "  ".into();
        assert!(matches!(
            store.create(r),
            Err(StoreError::MissingField { field: "causeNo" })
        ));
    }

    #[test]
    fn rejected_status_requires_reason() {
        let store = InMemoryStore::new();
        let seq = store.create(record("A")).unwrap().sequence_no.unwrap();

        let err = store.update(
            seq,
            RecordUpdate {
                status_at_gp: Some(GazetteStatus::Rejected),
                ..RecordUpdate::default()
            },
        );
        assert!(matches!(err, Err(StoreError::RejectionReasonRequired)));

        let ok = store
            .update(
                seq,
                RecordUpdate {
                    status_at_gp: Some(GazetteStatus::Rejected),
                    rejection_reason: Some("duplicate filing".into()),
                    ..RecordUpdate::default()
                },
            )
            .unwrap();
        assert_eq!(ok.rejection_reason, "duplicate filing");
    }

    #[test]
    fn non_rejected_status_clears_reason() {
        let store = InMemoryStore::new();
        let seq = store.create(record("A")).unwrap().sequence_no.unwrap();
        store
            .update(
                seq,
                RecordUpdate {
                    status_at_gp: Some(GazetteStatus::Rejected),
                    rejection_reason: Some("bad scan".into()),
                    ..RecordUpdate::default()
                },
            )
            .unwrap();
        let approved = store
            .update(
                seq,
                RecordUpdate {
                    status_at_gp: Some(GazetteStatus::Approved),
                    ..RecordUpdate::default()
                },
            )
            .unwrap();
        assert!(approved.rejection_reason.is_empty());
    }

    #[test]
    fn find_filters_by_search_court_and_status() {
        let store = InMemoryStore::new();
        store.create(record("John Kamau")).unwrap();
        let mut other = record("Mary Wanjiku");
        other.court_station = "Eldoret Magistrate Court".into();
        other.status_at_gp = GazetteStatus::Pending;
        store.create(other).unwrap();

        let by_search = store
            .find(&RecordFilter {
                search: Some("kamau".into()),
                ..RecordFilter::default()
            })
            .unwrap();
        assert_eq!(by_search.len(), 1);

        let by_court = store
            .find(&RecordFilter {
                court: Some("Eldoret Magistrate Court".into()),
                ..RecordFilter::default()
            })
            .unwrap();
        assert_eq!(by_court.len(), 1);
        assert_eq!(by_court[0].name_of_deceased, "Mary Wanjiku");

        let by_status = store
            .find(&RecordFilter {
                status: Some(GazetteStatus::Published),
                ..RecordFilter::default()
            })
            .unwrap();
        assert_eq!(by_status.len(), 1);
    }

    #[test]
    fn get_and_delete_round_trip() {
        let store = InMemoryStore::new();
        let seq = store.create(record("A")).unwrap().sequence_no.unwrap();
        assert!(store.get(seq).is_ok());
        store.delete(seq).unwrap();
        assert!(matches!(
            store.get(seq),
            Err(StoreError::NotFound { .. })
        ));
    }
}
