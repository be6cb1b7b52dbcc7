use std::collections::BTreeSet;
use std::sync::Arc;

use crate::data::aggregate::AggregateBundle;
use crate::data::filter::{FilterSpec, FilteredView};
use crate::data::model::{FilterDimension, Table};
use crate::engine::Engine;

// ---------------------------------------------------------------------------
// Dashboard state
// ---------------------------------------------------------------------------

/// Current selection and its computed result, independent of rendering.
///
/// Every mutation is a filter-changed event: the engine re-runs before the
/// method returns, so `view()` and `bundle()` always match `filters()`.
pub struct DashboardState {
    engine: Engine,

    /// Per-dimension selections.
    filters: FilterSpec,

    /// Indices of records passing the current filters.
    visible_indices: Vec<usize>,

    /// Aggregates for the current filters.
    bundle: AggregateBundle,
}

/// Counts shown next to the filter controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSummary {
    pub months: usize,
    pub categories: usize,
    pub locations: usize,
    pub filtered_rows: usize,
}

impl DashboardState {
    /// Start with every option selected.
    pub fn new(table: Arc<Table>) -> Self {
        let filters = FilterSpec::all(&table);
        let mut state = Self {
            engine: Engine::new(table),
            filters,
            visible_indices: Vec::new(),
            bundle: AggregateBundle::NoData,
        };
        state.refilter();
        state
    }

    pub fn table(&self) -> &Table {
        self.engine.table()
    }

    pub fn filters(&self) -> &FilterSpec {
        &self.filters
    }

    pub fn view(&self) -> FilteredView<'_> {
        FilteredView::from_indices(self.engine.table(), self.visible_indices.clone())
    }

    pub fn bundle(&self) -> &AggregateBundle {
        &self.bundle
    }

    pub fn summary(&self) -> FilterSummary {
        FilterSummary {
            months: self.filters.months.len(),
            categories: self.filters.categories.len(),
            locations: self.filters.locations.len(),
            filtered_rows: self.visible_indices.len(),
        }
    }

    /// Message for the user when a dimension has nothing selected.
    pub fn validation_warning(&self) -> Option<String> {
        self.filters
            .empty_dimension()
            .map(|_| "Please select at least one option for each filter!".to_string())
    }

    /// Recompute the view and aggregates after a filter change.
    fn refilter(&mut self) {
        let (view, bundle) = self.engine.apply(&self.filters);
        self.visible_indices = view.indices().to_vec();
        self.bundle = bundle;
    }

    /// Toggle a single value in a dimension's selection.
    pub fn toggle(&mut self, dimension: FilterDimension, value: &str) {
        let selected = self.filters.selected_mut(dimension);
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
        self.refilter();
    }

    /// Replace a dimension's selection.
    pub fn set_selection(&mut self, dimension: FilterDimension, values: BTreeSet<String>) {
        *self.filters.selected_mut(dimension) = values;
        self.refilter();
    }

    /// Select all options of a dimension.
    pub fn select_all(&mut self, dimension: FilterDimension) {
        let all = self.engine.table().options(dimension).clone();
        self.set_selection(dimension, all);
    }

    /// Deselect all options of a dimension.
    pub fn select_none(&mut self, dimension: FilterDimension) {
        self.set_selection(dimension, BTreeSet::new());
    }

    /// Select every option of every dimension.
    pub fn reset(&mut self) {
        self.filters = FilterSpec::all(self.engine.table());
        self.refilter();
    }
}
