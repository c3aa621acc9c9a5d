//! Id-keyed merge of an ingested batch into the existing store.

use std::collections::HashSet;

use trendvision_core::PostRecord;

/// Counts from a merge, for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Records carried over from the existing store.
    pub kept: usize,
    /// Incoming records with a previously unseen id.
    pub added: usize,
    /// Incoming records dropped because their id was already present.
    pub duplicates: usize,
}

/// Merge `incoming` into `existing`, deduplicating by `id`.
///
/// The first occurrence of an id wins and keeps its position: existing
/// records come first in their original order, then new incoming records in
/// arrival order. An incoming record never replaces an existing one, so
/// enrichment already computed for a post survives re-ingestion.
#[must_use]
pub fn merge(existing: Vec<PostRecord>, incoming: Vec<PostRecord>) -> (Vec<PostRecord>, MergeReport) {
    let mut seen: HashSet<String> = HashSet::with_capacity(existing.len() + incoming.len());
    let mut merged = Vec::with_capacity(existing.len() + incoming.len());
    let mut report = MergeReport::default();

    for record in existing {
        if seen.insert(record.id.clone()) {
            merged.push(record);
            report.kept += 1;
        }
    }

    for record in incoming {
        if seen.insert(record.id.clone()) {
            merged.push(record);
            report.added += 1;
        } else {
            report.duplicates += 1;
        }
    }

    (merged, report)
}
