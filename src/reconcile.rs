//! Reconciliation: partition two record sets by fuzzy name match.
//!
//! Spreadsheet rows (the administrative ledger) are compared against
//! document rows (what the gazette actually published). Every input row
//! lands in exactly one of three partitions: `matched`,
//! `only_spreadsheet`, or `only_document`.
//!
//! ## First-match semantics
//!
//! Matching is first-match in list order, not best-match or bipartite-
//! optimal: the first opposite-side row clearing the similarity threshold
//! wins. With duplicate or near-duplicate names in one document a
//! spreadsheet row can therefore pair with the "wrong" document row. This
//! is intentional — cause lists rarely repeat a name within one gazette,
//! and the greedy scan keeps the partition deterministic and cheap. Do not
//! change this to an optimal assignment without flagging the behaviour
//! difference to consumers.
//!
//! Cost is O(|A|×|B|); list sizes are bounded by per-document case counts,
//! so the quadratic scan is fine.

use crate::matcher::NameMatcher;
use crate::model::{CanonicalRecord, GazetteStatus, MatchPartition};
use chrono::NaiveDate;
use tracing::debug;

/// Partition spreadsheet rows against document rows.
///
/// * a spreadsheet row with a name match in the document is emitted into
///   `matched`, forced to `Published`, and stamped with the document's
///   publication date;
/// * a spreadsheet row with no match is emitted into `only_spreadsheet`,
///   forced to `Pending`;
/// * a document row no spreadsheet row matches is emitted into
///   `only_document` unchanged.
///
/// `date_published` is the gazette's own header date and applies uniformly
/// to this reconciliation run; the spreadsheet carries no publication date
/// of its own.
pub fn reconcile(
    spreadsheet: &[CanonicalRecord],
    document: &[CanonicalRecord],
    matcher: &NameMatcher,
    date_published: Option<NaiveDate>,
) -> MatchPartition {
    let mut partition = MatchPartition {
        date_published,
        ..MatchPartition::default()
    };

    for row in spreadsheet {
        let found = document
            .iter()
            .any(|doc| matcher.is_match(&row.name_of_deceased, &doc.name_of_deceased));
        let mut row = row.clone();
        if found {
            row.status_at_gp = GazetteStatus::Published;
            row.date_published = date_published;
            partition.matched.push(row);
        } else {
            row.status_at_gp = GazetteStatus::Pending;
            partition.only_spreadsheet.push(row);
        }
    }

    for doc in document {
        let found = spreadsheet
            .iter()
            .any(|row| matcher.is_match(&doc.name_of_deceased, &row.name_of_deceased));
        if !found {
            partition.only_document.push(doc.clone());
        }
    }

    debug!(
        matched = partition.matched.len(),
        only_spreadsheet = partition.only_spreadsheet.len(),
        only_document = partition.only_document.len(),
        "reconciliation complete"
    );

    partition
}
