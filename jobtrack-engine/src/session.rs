//! Session state: load status, current query and the visible window
//!
//! The catalog is built once per fetch cycle and shared read-only. Every
//! view is re-derived from scratch: filter, then sort, then window.

use std::sync::Arc;

use tracing::{info, warn};

use jobtrack_common::config::WindowConfig;
use jobtrack_common::Result;

use crate::aggregate::aggregate_sources;
use crate::filter::{filter_records, FilterState};
use crate::record::CompositeOrderRecord;
use crate::sort::{sort_records, SortOrder};
use crate::source::{fetch_all, SourceFetcher, SourceRegistry};
use crate::window::VisibleWindow;

/// Immutable aggregated collection for one fetch cycle
#[derive(Debug, Clone)]
pub struct Catalog {
    records: Arc<[CompositeOrderRecord]>,
}

impl Catalog {
    pub fn new(records: Vec<CompositeOrderRecord>) -> Self {
        Self {
            records: records.into(),
        }
    }

    pub fn records(&self) -> &[CompositeOrderRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Run one fetch cycle and aggregate the result
///
/// This is the only suspension point; everything after it is synchronous.
pub async fn load_catalog<F>(fetcher: &F, registry: &SourceRegistry) -> Result<Catalog>
where
    F: SourceFetcher + ?Sized,
{
    let fetched = fetch_all(fetcher, registry).await?;
    Ok(Catalog::new(aggregate_sources(&fetched)))
}

/// The three mutually exclusive states shown to the user
#[derive(Debug, Clone)]
pub enum LoadState {
    Loading,
    Failed(String),
    Ready(Catalog),
}

impl LoadState {
    pub fn from_result(result: Result<Catalog>) -> Self {
        match result {
            Ok(catalog) => LoadState::Ready(catalog),
            Err(e) => LoadState::Failed(e.to_string()),
        }
    }
}

/// Value updates sent by the render collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewCommand {
    /// The consumer is near the end of the visible items
    Grow,
    ReplaceFilter(FilterState),
    ReplaceSort(SortOrder),
}

/// One derived view of the ready catalog
#[derive(Debug, Clone)]
pub struct ResultView<'a> {
    /// Visible prefix, in display order
    pub visible: Vec<&'a CompositeOrderRecord>,
    /// Records passing the filters
    pub matched: usize,
    /// Records in the catalog
    pub total: usize,
    /// Whether a grow signal would reveal more
    pub has_more: bool,
    /// Query to highlight in rendered text
    pub highlight: Option<&'a str>,
}

/// What the renderer should show right now
#[derive(Debug, Clone)]
pub enum SessionView<'a> {
    Loading,
    Failed(&'a str),
    Ready(ResultView<'a>),
}

/// Query state plus load state for one operator session
#[derive(Debug, Clone)]
pub struct Session {
    state: LoadState,
    filter: FilterState,
    sort: SortOrder,
    window: VisibleWindow,
}

impl Session {
    pub fn new(window: WindowConfig) -> Self {
        Self {
            state: LoadState::Loading,
            filter: FilterState::default(),
            sort: SortOrder::default(),
            window: VisibleWindow::from(window),
        }
    }

    /// Record the outcome of the fetch cycle
    pub fn finish_load(&mut self, result: Result<Catalog>) {
        self.state = LoadState::from_result(result);
        match &self.state {
            LoadState::Ready(catalog) => info!(records = catalog.len(), "Catalog ready"),
            LoadState::Failed(message) => warn!(error = %message, "Fetch cycle failed"),
            LoadState::Loading => {}
        }
        self.window.reset();
    }

    /// Apply one consumer update. Commands are applied one at a time.
    pub fn apply(&mut self, command: ViewCommand) {
        match command {
            ViewCommand::Grow => self.window.grow(),
            ViewCommand::ReplaceFilter(filter) => {
                self.filter = filter;
                self.window.reset();
            }
            ViewCommand::ReplaceSort(sort) => {
                self.sort = sort;
                self.window.reset();
            }
        }
    }

    pub fn load_state(&self) -> &LoadState {
        &self.state
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort
    }

    pub fn visible_count(&self) -> usize {
        self.window.visible()
    }

    /// Derive the current view from scratch
    pub fn view(&self) -> SessionView<'_> {
        match &self.state {
            LoadState::Loading => SessionView::Loading,
            LoadState::Failed(message) => SessionView::Failed(message),
            LoadState::Ready(catalog) => {
                let filtered = filter_records(catalog.records(), &self.filter);
                let sorted = sort_records(&filtered, self.sort);
                let matched = sorted.len();

                SessionView::Ready(ResultView {
                    visible: self.window.slice(&sorted).to_vec(),
                    matched,
                    total: catalog.len(),
                    has_more: self.window.has_more(matched),
                    highlight: self.filter.highlight_query(),
                })
            }
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(WindowConfig::default())
    }
}
