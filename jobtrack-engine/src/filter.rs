//! Filter pipeline over the aggregated collection
//!
//! A [`FilterState`] is a plain value supplied by the render collaborator.
//! Every active filter is an independent predicate; a record is kept only
//! when all of them pass, so evaluation order never changes the result.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use jobtrack_common::Error;

use crate::record::{is_present, CompositeOrderRecord};
use crate::search::{SearchMatcher, SearchScope};

/// Value meaning "no restriction" for choice filters
pub const ALL: &str = "ALL";

/// Job series restriction by identifier prefix
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SeriesFilter {
    #[default]
    All,
    /// Keep identifiers starting with this prefix (case-folded)
    Prefix(String),
}

impl FromStr for SeriesFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidInput("Series must not be empty".to_string()));
        }
        if trimmed.eq_ignore_ascii_case(ALL) {
            Ok(SeriesFilter::All)
        } else {
            Ok(SeriesFilter::Prefix(trimmed.to_uppercase()))
        }
    }
}

/// Category restriction: `ALL` or one exact value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryChoice {
    #[default]
    All,
    Only(String),
}

impl FromStr for CategoryChoice {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case(ALL) {
            Ok(CategoryChoice::All)
        } else {
            Ok(CategoryChoice::Only(s.to_string()))
        }
    }
}

/// Tri-state presence filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PresenceFilter {
    #[default]
    All,
    /// Keep records where the value is present
    With,
    /// Keep records where the value is missing
    Without,
}

impl PresenceFilter {
    fn admits(self, present: bool) -> bool {
        match self {
            PresenceFilter::All => true,
            PresenceFilter::With => present,
            PresenceFilter::Without => !present,
        }
    }
}

impl FromStr for PresenceFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(PresenceFilter::All),
            "with" => Ok(PresenceFilter::With),
            "without" => Ok(PresenceFilter::Without),
            other => Err(Error::InvalidInput(format!(
                "Expected all, with or without, got '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for PresenceFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PresenceFilter::All => "all",
            PresenceFilter::With => "with",
            PresenceFilter::Without => "without",
        };
        f.write_str(label)
    }
}

/// Complete filter configuration; carries no derived state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    /// Free-text search over all display values
    pub search: String,
    /// Substring search on the job identifier
    pub job_search: String,
    pub series: SeriesFilter,
    /// Exact-match filters keyed by field name (summary or primary field)
    pub categories: BTreeMap<String, CategoryChoice>,
    /// Case-insensitive substring filters keyed by field name; an empty
    /// query places no restriction
    pub field_searches: BTreeMap<String, String>,
    /// Auxiliary U46 code presence
    pub u46: PresenceFilter,
    /// Image presence; `Without` is the "only missing image" toggle
    pub image: PresenceFilter,
    pub search_scope: SearchScope,
}

impl FilterState {
    /// Set one category filter, returning the updated state
    pub fn with_category(mut self, field: impl Into<String>, choice: CategoryChoice) -> Self {
        self.categories.insert(field.into(), choice);
        self
    }

    /// Set one per-field substring search, returning the updated state
    pub fn with_field_search(mut self, field: impl Into<String>, query: impl Into<String>) -> Self {
        self.field_searches.insert(field.into(), query.into());
        self
    }

    /// Query to highlight: job search wins over global search
    pub fn highlight_query(&self) -> Option<&str> {
        [self.job_search.as_str(), self.search.as_str()]
            .into_iter()
            .find(|q| !q.is_empty())
    }

    /// The active predicates; inactive filters contribute nothing
    pub fn predicates(&self) -> Vec<Predicate> {
        let mut predicates = Vec::new();

        if let SeriesFilter::Prefix(prefix) = &self.series {
            predicates.push(Predicate::SeriesPrefix(prefix.to_uppercase()));
        }
        if let Some(matcher) = SearchMatcher::new(&self.job_search) {
            predicates.push(Predicate::JobContains(matcher));
        }
        for (field, query) in &self.field_searches {
            if let Some(matcher) = SearchMatcher::new(query) {
                predicates.push(Predicate::FieldContains {
                    field: field.clone(),
                    matcher,
                });
            }
        }
        for (field, choice) in &self.categories {
            if let CategoryChoice::Only(value) = choice {
                predicates.push(Predicate::CategoryEquals {
                    field: field.clone(),
                    value: value.clone(),
                });
            }
        }
        if self.u46 != PresenceFilter::All {
            predicates.push(Predicate::U46(self.u46));
        }
        if self.image != PresenceFilter::All {
            predicates.push(Predicate::Image(self.image));
        }
        if let Some(matcher) = SearchMatcher::new(&self.search) {
            predicates.push(Predicate::GlobalSearch {
                matcher,
                scope: self.search_scope,
            });
        }

        predicates
    }

    pub fn is_unrestricted(&self) -> bool {
        self.predicates().is_empty()
    }
}

/// One independent filter predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    SeriesPrefix(String),
    JobContains(SearchMatcher),
    FieldContains {
        field: String,
        matcher: SearchMatcher,
    },
    CategoryEquals { field: String, value: String },
    U46(PresenceFilter),
    Image(PresenceFilter),
    GlobalSearch {
        matcher: SearchMatcher,
        scope: SearchScope,
    },
}

impl Predicate {
    pub fn test(&self, record: &CompositeOrderRecord) -> bool {
        match self {
            Predicate::SeriesPrefix(prefix) => record.job_id.to_uppercase().starts_with(prefix),
            Predicate::JobContains(matcher) => matcher.matches_text(&record.job_id),
            Predicate::FieldContains { field, matcher } => {
                matcher.matches_text(record.field(field))
            }
            Predicate::CategoryEquals { field, value } => record.field(field) == value.as_str(),
            Predicate::U46(filter) => filter.admits(is_present(&record.summary.u46)),
            Predicate::Image(filter) => filter.admits(record.has_image()),
            Predicate::GlobalSearch { matcher, scope } => matcher.matches_record(record, *scope),
        }
    }
}

/// Keep the records satisfying every active filter, preserving input order.
///
/// Pure: identical inputs always give identical output.
pub fn filter_records<'a, I>(records: I, state: &FilterState) -> Vec<&'a CompositeOrderRecord>
where
    I: IntoIterator<Item = &'a CompositeOrderRecord>,
{
    let predicates = state.predicates();
    records
        .into_iter()
        .filter(|record| predicates.iter().all(|p| p.test(record)))
        .collect()
}
