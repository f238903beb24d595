//! Case-insensitive substring matching over records
//!
//! Shared by the filter pipeline and the highlight utility so that what is
//! highlighted is exactly what matched.

use std::str::FromStr;

use jobtrack_common::Error;

use crate::record::{display_value, CompositeOrderRecord};

/// Which parts of a record the global search looks at
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchScope {
    /// Primary-source fields only
    Primary,
    /// Primary fields and every linked report
    #[default]
    Linked,
}

impl FromStr for SearchScope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "primary" => Ok(SearchScope::Primary),
            "linked" | "all" => Ok(SearchScope::Linked),
            other => Err(Error::InvalidInput(format!("Unknown search scope '{}'", other))),
        }
    }
}

/// A prepared, case-folded query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchMatcher {
    folded: String,
}

impl SearchMatcher {
    /// `None` for an empty query, which places no restriction
    pub fn new(query: &str) -> Option<Self> {
        if query.is_empty() {
            None
        } else {
            Some(Self {
                folded: fold_case(query),
            })
        }
    }

    pub fn matches_text(&self, text: &str) -> bool {
        fold_case(text).contains(&self.folded)
    }

    /// Test the space-joined field values of a record
    ///
    /// Primary fields and linked reports are joined and tested separately,
    /// so a match never spans the boundary between the two.
    pub fn matches_record(&self, record: &CompositeOrderRecord, scope: SearchScope) -> bool {
        if self.matches_text(&primary_haystack(record)) {
            return true;
        }
        scope == SearchScope::Linked && self.matches_text(&linked_haystack(record))
    }
}

/// Lowercase one char at a time, with no context-dependent mappings
/// (a word-final `Σ` folds to `σ`, not `ς`)
pub fn fold_case(text: &str) -> String {
    text.chars().flat_map(char::to_lowercase).collect()
}

/// One-shot case-insensitive containment test
pub fn contains_ignore_case(text: &str, query: &str) -> bool {
    SearchMatcher::new(query).map_or(true, |m| m.matches_text(text))
}

fn primary_haystack(record: &CompositeOrderRecord) -> String {
    record
        .primary_fields
        .values()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}

fn linked_haystack(record: &CompositeOrderRecord) -> String {
    record
        .present_reports()
        .flat_map(|(_, report)| report.values())
        .map(|value| display_value(Some(value)))
        .collect::<Vec<_>>()
        .join(" ")
}
