//! Two-level ordering: job series priority, then delivery date

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use jobtrack_common::dates::{normalize_date, NormalizedDate};
use jobtrack_common::Error;

use crate::record::CompositeOrderRecord;

/// Series letters with their priority bucket; everything else is last
const SERIES_PRIORITY: &[(char, u8)] = &[('H', 1), ('J', 2)];

/// Bucket for identifiers of any other series
pub const FALLBACK_BUCKET: u8 = 3;

/// Direction of the delivery-date comparison
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Earliest delivery first
    #[default]
    Ascending,
    /// Latest delivery first
    Descending,
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" | "date_asc" => Ok(SortOrder::Ascending),
            "desc" | "descending" | "date_desc" => Ok(SortOrder::Descending),
            other => Err(Error::InvalidInput(format!("Unknown sort order '{}'", other))),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Ascending => f.write_str("asc"),
            SortOrder::Descending => f.write_str("desc"),
        }
    }
}

/// Priority bucket from the first letter of the trimmed, uppercased identifier
pub fn priority_bucket(job_id: &str) -> u8 {
    job_id
        .trim()
        .chars()
        .next()
        .and_then(|first| {
            let first = first.to_ascii_uppercase();
            SERIES_PRIORITY
                .iter()
                .find(|(letter, _)| *letter == first)
                .map(|(_, bucket)| *bucket)
        })
        .unwrap_or(FALLBACK_BUCKET)
}

/// Compare two delivery dates under `order`.
///
/// Invalid dates sort after valid ones in both directions and tie with
/// each other.
pub fn compare_dates(a: NormalizedDate, b: NormalizedDate, order: SortOrder) -> Ordering {
    match (a, b) {
        (NormalizedDate::Invalid, NormalizedDate::Invalid) => Ordering::Equal,
        (NormalizedDate::Invalid, NormalizedDate::Valid(_)) => Ordering::Greater,
        (NormalizedDate::Valid(_), NormalizedDate::Invalid) => Ordering::Less,
        (NormalizedDate::Valid(x), NormalizedDate::Valid(y)) => match order {
            SortOrder::Ascending => x.cmp(&y),
            SortOrder::Descending => y.cmp(&x),
        },
    }
}

/// Return a newly ordered sequence; the input is untouched.
///
/// Stable: records equal on bucket and date keep their input order.
pub fn sort_records<'a>(
    records: &[&'a CompositeOrderRecord],
    order: SortOrder,
) -> Vec<&'a CompositeOrderRecord> {
    let mut keyed: Vec<(u8, NormalizedDate, &'a CompositeOrderRecord)> = records
        .iter()
        .map(|record| {
            (
                priority_bucket(&record.job_id),
                normalize_date(&record.summary.final_delivery_date),
                *record,
            )
        })
        .collect();

    keyed.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| compare_dates(a.1, b.1, order)));

    keyed.into_iter().map(|(_, _, record)| record).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::OrderSummary;
    use indexmap::IndexMap;

    fn record(job_id: &str, delivery: &str) -> CompositeOrderRecord {
        let mut primary_fields = IndexMap::new();
        primary_fields.insert("jobno_oms".to_string(), job_id.to_string());
        primary_fields.insert("finaldelvdate".to_string(), delivery.to_string());
        CompositeOrderRecord {
            job_id: job_id.to_string(),
            summary: OrderSummary::from_fields(&primary_fields),
            primary_fields,
            linked_reports: IndexMap::new(),
            image: None,
        }
    }

    fn sorted_ids(records: &[CompositeOrderRecord], order: SortOrder) -> Vec<String> {
        let refs: Vec<_> = records.iter().collect();
        sort_records(&refs, order)
            .into_iter()
            .map(|r| r.job_id.clone())
            .collect()
    }

    #[test]
    fn test_priority_buckets() {
        assert_eq!(priority_bucket("H100"), 1);
        assert_eq!(priority_bucket("  h100"), 1);
        assert_eq!(priority_bucket("J050"), 2);
        assert_eq!(priority_bucket("X999"), 3);
        assert_eq!(priority_bucket("4512"), 3);
        assert_eq!(priority_bucket("   "), 3);
    }

    #[test]
    fn test_bucket_dominates_date() {
        let data = vec![
            record("X999", "N/A"),
            record("J050", "2024-01-15"),
            record("H100", "2024-03-01"),
        ];
        assert_eq!(sorted_ids(&data, SortOrder::Ascending), vec!["H100", "J050", "X999"]);
        assert_eq!(sorted_ids(&data, SortOrder::Descending), vec!["H100", "J050", "X999"]);
    }

    #[test]
    fn test_date_direction_within_bucket() {
        let data = vec![
            record("H1", "2024-03-01"),
            record("H2", "15-01-2024"),
            record("H3", "2024-02-10"),
        ];
        assert_eq!(sorted_ids(&data, SortOrder::Ascending), vec!["H2", "H3", "H1"]);
        assert_eq!(sorted_ids(&data, SortOrder::Descending), vec!["H1", "H3", "H2"]);
    }

    #[test]
    fn test_invalid_dates_last_in_both_directions() {
        let data = vec![
            record("J1", "not a date"),
            record("J2", "2024-05-01"),
            record("J3", "N/A"),
            record("J4", "2023-05-01"),
        ];
        assert_eq!(sorted_ids(&data, SortOrder::Ascending), vec!["J4", "J2", "J1", "J3"]);
        assert_eq!(sorted_ids(&data, SortOrder::Descending), vec!["J2", "J4", "J1", "J3"]);
    }

    #[test]
    fn test_stable_for_equal_keys() {
        let data = vec![
            record("H-b", "N/A"),
            record("H-a", ""),
            record("H-c", "garbage"),
        ];
        assert_eq!(sorted_ids(&data, SortOrder::Descending), vec!["H-b", "H-a", "H-c"]);
    }

    #[test]
    fn test_input_left_unmodified() {
        let data = vec![record("X1", "2024-01-01"), record("H1", "2024-01-01")];
        let refs: Vec<_> = data.iter().collect();
        let _ = sort_records(&refs, SortOrder::Ascending);
        assert_eq!(refs[0].job_id, "X1");
    }

    #[test]
    fn test_sort_order_parsing() {
        assert_eq!("date_desc".parse::<SortOrder>().unwrap(), SortOrder::Descending);
        assert_eq!("ASC".parse::<SortOrder>().unwrap(), SortOrder::Ascending);
        assert!("sideways".parse::<SortOrder>().is_err());
    }
}
