//! Joins the fetched sources into one composite record per job
//!
//! The join is a plain linear scan per linked source. Collections are small,
//! fully in memory and joined once per fetch cycle.

use indexmap::IndexMap;
use tracing::{debug, info};

use jobtrack_common::NOT_AVAILABLE;

use crate::record::{display_value, CompositeOrderRecord, OrderSummary, RawSourceRecord, IMAGE_FIELD};
use crate::source::{FetchedSources, JoinKey, SourceBatch};

/// Aggregate one fetch cycle
pub fn aggregate_sources(fetched: &FetchedSources) -> Vec<CompositeOrderRecord> {
    aggregate(&fetched.primary, &fetched.linked)
}

/// Build one composite record per primary record.
///
/// For each linked source the first record whose join key equals the job
/// identifier is attached; later duplicates are ignored. Primary records
/// without an identifier are dropped.
pub fn aggregate(primary: &SourceBatch, linked: &[SourceBatch]) -> Vec<CompositeOrderRecord> {
    let mut dropped = 0usize;

    let records: Vec<CompositeOrderRecord> = primary
        .records
        .iter()
        .filter_map(|raw| {
            let job_id = match primary.join_key.extract(raw) {
                JoinKey::Known(id) if id != NOT_AVAILABLE => id,
                _ => {
                    dropped += 1;
                    return None;
                }
            };
            Some(compose(job_id, raw, linked))
        })
        .collect();

    if dropped > 0 {
        debug!(
            source = %primary.name,
            dropped,
            "Dropped primary records without a job identifier"
        );
    }
    info!(
        primary = primary.records.len(),
        linked_sources = linked.len(),
        composite = records.len(),
        "Aggregation complete"
    );

    records
}

fn compose(job_id: String, raw: &RawSourceRecord, linked: &[SourceBatch]) -> CompositeOrderRecord {
    let primary_fields: IndexMap<String, String> = raw
        .iter()
        .map(|(key, value)| (key.clone(), display_value(Some(value))))
        .collect();

    let linked_reports = linked
        .iter()
        .map(|batch| (batch.name.clone(), find_first(batch, &job_id).cloned()))
        .collect();

    let image = raw
        .get(IMAGE_FIELD)
        .and_then(|value| value.as_str())
        .filter(|path| !path.trim().is_empty())
        .map(str::to_string);

    let summary = OrderSummary::from_fields(&primary_fields);

    CompositeOrderRecord {
        job_id,
        primary_fields,
        linked_reports,
        image,
        summary,
    }
}

fn find_first<'a>(batch: &'a SourceBatch, job_id: &str) -> Option<&'a RawSourceRecord> {
    batch
        .records
        .iter()
        .find(|record| batch.join_key.extract(record).matches(job_id))
}
