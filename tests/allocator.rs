//! Sequence-allocation behaviour of the record store under concurrency.

use chrono::NaiveDate;
use gazette_reconcile::{
    CanonicalRecord, GazetteStatus, InMemoryStore, RecordFilter, RecordStore,
};
use std::sync::Arc;

fn record(name: &str) -> CanonicalRecord {
    CanonicalRecord {
        sequence_no: None,
        court_station: "Unknown".into(),
        cause_no: format!("E{} OF 2024", name.len()),
        name_of_deceased: name.into(),
        date_received: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        status_at_gp: GazetteStatus::Published,
        rejection_reason: String::new(),
        date_published: None,
        volume_no: "12".into(),
        source_file: Some("Vol. 12.pdf".into()),
    }
}

#[tokio::test]
async fn concurrent_batches_get_unique_contiguous_sequences() {
    // Two concurrent ingestion batches of 5 and 3 records: 8 unique,
    // contiguous sequence numbers, no collisions, no gaps.
    let store = Arc::new(InMemoryStore::new());

    let batch_a = {
        let store = Arc::clone(&store);
        tokio::task::spawn_blocking(move || {
            (0..5)
                .map(|i| {
                    store
                        .create(record(&format!("Batch A Person {i}")))
                        .unwrap()
                        .sequence_no
                        .unwrap()
                })
                .collect::<Vec<u64>>()
        })
    };
    let batch_b = {
        let store = Arc::clone(&store);
        tokio::task::spawn_blocking(move || {
            (0..3)
                .map(|i| {
                    store
                        .create(record(&format!("Batch B Person {i}")))
                        .unwrap()
                        .sequence_no
                        .unwrap()
                })
                .collect::<Vec<u64>>()
        })
    };

    let (a, b) = (batch_a.await.unwrap(), batch_b.await.unwrap());

    let mut all: Vec<u64> = a.into_iter().chain(b).collect();
    all.sort_unstable();
    assert_eq!(all, (1..=8).collect::<Vec<u64>>());

    // Each batch saw its own numbers strictly increase.
    let records = store.find(&RecordFilter::default()).unwrap();
    assert_eq!(records.len(), 8);
}

#[tokio::test]
async fn sequences_survive_interleaved_deletes() {
    let store = InMemoryStore::new();
    for i in 0..4 {
        store.create(record(&format!("Person {i}"))).unwrap();
    }
    store.delete(2).unwrap();
    store.delete(4).unwrap();

    // New records continue past the highest ever allocated — deleted
    // numbers are never reissued.
    let next = store.create(record("Late Arrival")).unwrap();
    assert_eq!(next.sequence_no, Some(5));
}
