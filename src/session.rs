//! Per-user analysis context.
//!
//! Holds the filter selection and table position that a dashboard keeps
//! between events. Nothing is cached: every read recomputes from the store.

use tracing::debug;

use crate::aggregate::aggregate_with_limit;
use crate::config::DashboardConfig;
use crate::filter::{filter, search};
use crate::models::{AggregateResult, CustomerRecord, FilterState, PageView};
use crate::pager::paginate;
use crate::store::RecordStore;

#[derive(Debug, Clone)]
pub struct DashboardSession<'a> {
    store: &'a RecordStore,
    config: DashboardConfig,
    filters: FilterState,
    page: usize,
}

impl<'a> DashboardSession<'a> {
    pub fn new(store: &'a RecordStore, config: DashboardConfig) -> Self {
        Self {
            store,
            config,
            filters: FilterState::all(),
            page: 1,
        }
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn page(&self) -> usize {
        self.page
    }

    /// Replaces the categorical selectors, keeping the current query.
    pub fn apply_filters(&mut self, filters: FilterState) {
        let query = std::mem::take(&mut self.filters.query);
        self.filters = FilterState { query, ..filters };
        self.page = 1;
        debug!(filters = ?self.filters, "filters changed, page reset");
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.filters.query = query.into();
        self.page = 1;
        debug!(query = %self.filters.query, "search changed, page reset");
    }

    /// Metrics and chart series for the categorically filtered subset.
    pub fn dashboard(&self) -> AggregateResult {
        let subset = filter(self.store.records(), &self.filters);
        aggregate_with_limit(subset, self.config.top_states)
    }

    /// Current page of the customer table. Search runs over the full
    /// dataset; the categorical selectors do not apply here.
    pub fn customers(&self) -> PageView<&'a CustomerRecord> {
        let matches = search(self.store.records(), &self.filters.query);
        paginate(&matches, self.config.page_size, self.page)
    }

    /// Advances when a next page exists; returns whether it moved.
    pub fn next_page(&mut self) -> bool {
        if self.customers().has_next {
            self.page += 1;
            debug!(page = self.page, "moved to next page");
            true
        } else {
            false
        }
    }

    pub fn prev_page(&mut self) -> bool {
        if self.page > 1 {
            self.page -= 1;
            debug!(page = self.page, "moved to previous page");
            true
        } else {
            false
        }
    }

    /// Jumps to any page; pages past the end render empty.
    pub fn go_to_page(&mut self, page: usize) {
        self.page = page.max(1);
    }
}
