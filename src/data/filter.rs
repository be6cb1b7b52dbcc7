use std::collections::BTreeSet;

use super::model::{FilterDimension, Record, Table};

// ---------------------------------------------------------------------------
// FilterSpec: which values are selected per dimension
// ---------------------------------------------------------------------------

/// Selected values for the three filter dimensions.
///
/// A record passes when its month, category and location are all selected.
/// An empty set selects nothing, so the whole view is empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterSpec {
    pub months: BTreeSet<String>,
    pub categories: BTreeSet<String>,
    pub locations: BTreeSet<String>,
}

impl FilterSpec {
    /// Every option of every dimension selected (the reset state).
    pub fn all(table: &Table) -> Self {
        FilterSpec {
            months: table.options(FilterDimension::Month).clone(),
            categories: table.options(FilterDimension::Category).clone(),
            locations: table.options(FilterDimension::Location).clone(),
        }
    }

    pub fn selected(&self, dimension: FilterDimension) -> &BTreeSet<String> {
        match dimension {
            FilterDimension::Month => &self.months,
            FilterDimension::Category => &self.categories,
            FilterDimension::Location => &self.locations,
        }
    }

    pub fn selected_mut(&mut self, dimension: FilterDimension) -> &mut BTreeSet<String> {
        match dimension {
            FilterDimension::Month => &mut self.months,
            FilterDimension::Category => &mut self.categories,
            FilterDimension::Location => &mut self.locations,
        }
    }

    /// First dimension with nothing selected, if any.
    pub fn empty_dimension(&self) -> Option<FilterDimension> {
        FilterDimension::ALL
            .into_iter()
            .find(|dim| self.selected(*dim).is_empty())
    }

    /// Conjunction of the three membership tests.
    pub fn matches(&self, record: &Record) -> bool {
        self.months.contains(&record.month)
            && self.categories.contains(&record.product_category)
            && self.locations.contains(&record.store_location)
    }
}

// ---------------------------------------------------------------------------
// FilteredView: the ordered subsequence of a table
// ---------------------------------------------------------------------------

/// Records of a [`Table`] that passed a [`FilterSpec`], in table order.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredView<'t> {
    table: &'t Table,
    indices: Vec<usize>,
}

impl<'t> FilteredView<'t> {
    /// Rebuild a view from indices produced by an earlier [`filter`] call.
    pub(crate) fn from_indices(table: &'t Table, indices: Vec<usize>) -> Self {
        FilteredView { table, indices }
    }

    /// Positions of the included records within the table.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn records(&self) -> impl Iterator<Item = &'t Record> + '_ {
        let table = self.table;
        self.indices.iter().map(move |&i| &table.records()[i])
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Return the view of `table` selected by `spec`.
///
/// Any empty dimension short-circuits to an empty view instead of being
/// read as "no constraint", so clearing a filter never shows the full table.
pub fn filter<'t>(table: &'t Table, spec: &FilterSpec) -> FilteredView<'t> {
    if let Some(dim) = spec.empty_dimension() {
        log::warn!("No {dim} selected; filtered view is empty");
        return FilteredView::from_indices(table, Vec::new());
    }

    let indices = table
        .records()
        .iter()
        .enumerate()
        .filter(|(_, rec)| spec.matches(rec))
        .map(|(i, _)| i)
        .collect();

    FilteredView::from_indices(table, indices)
}
