//! jobtrack-engine library - order tracking reconciliation engine
//!
//! Fetches one primary order source and any number of linked production
//! report sources, joins them into one composite record per job, and serves
//! filtered, sorted, windowed views of the result.

pub mod aggregate;
pub mod console;
pub mod filter;
pub mod highlight;
pub mod record;
pub mod render;
pub mod search;
pub mod session;
pub mod sort;
pub mod source;
pub mod window;

pub use aggregate::{aggregate, aggregate_sources};
pub use filter::{filter_records, CategoryChoice, FilterState, PresenceFilter, SeriesFilter};
pub use highlight::{highlight_spans, Span};
pub use record::{CompositeOrderRecord, OrderSummary, RawSourceRecord};
pub use search::{SearchMatcher, SearchScope};
pub use session::{load_catalog, Catalog, LoadState, ResultView, Session, SessionView, ViewCommand};
pub use sort::{sort_records, SortOrder};
pub use source::{
    fetch_all, HttpSourceFetcher, JoinKey, JoinKeySpec, SourceFetcher, SourceRegistry, SourceSpec,
};
pub use window::VisibleWindow;
