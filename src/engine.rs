use std::sync::Arc;

use crate::data::aggregate::{AggregateBundle, Aggregates, Comparison};
use crate::data::filter::{filter, FilterSpec, FilteredView};
use crate::data::model::Table;

// ---------------------------------------------------------------------------
// Engine: filter + aggregate over a shared table
// ---------------------------------------------------------------------------

/// Filter-and-aggregate engine bound to one loaded table.
///
/// The unfiltered baseline depends only on the table, so it is computed once
/// here; everything filter-dependent is recomputed on every [`Engine::apply`].
#[derive(Debug, Clone)]
pub struct Engine {
    table: Arc<Table>,
    baseline: Option<Arc<Aggregates>>,
}

impl Engine {
    pub fn new(table: Arc<Table>) -> Self {
        let baseline = Aggregates::compute(table.records()).map(Arc::new);
        if baseline.is_none() {
            log::warn!("Loaded table is empty; every filter will report no data");
        }
        Engine { table, baseline }
    }

    pub fn table(&self) -> &Arc<Table> {
        &self.table
    }

    /// Aggregates over the whole table, `None` when the table is empty.
    pub fn baseline(&self) -> Option<&Aggregates> {
        self.baseline.as_deref()
    }

    /// Filter the table and aggregate the result.
    ///
    /// Pure: the same spec always yields the same view and bundle.
    pub fn apply(&self, spec: &FilterSpec) -> (FilteredView<'_>, AggregateBundle) {
        let view = filter(&self.table, spec);
        let bundle = self.aggregate(&view);
        log::debug!(
            "Filter selected {} of {} records (no data: {})",
            view.len(),
            self.table.len(),
            bundle.is_no_data()
        );
        (view, bundle)
    }

    /// Aggregate an already filtered view of this engine's table.
    pub fn aggregate(&self, view: &FilteredView<'_>) -> AggregateBundle {
        let (Some(baseline), Some(filtered)) = (&self.baseline, Aggregates::compute(view.records()))
        else {
            return AggregateBundle::NoData;
        };

        let comparison = Comparison::new(&filtered, baseline);
        AggregateBundle::Computed {
            filtered: Box::new(filtered),
            baseline: Arc::clone(baseline),
            comparison,
        }
    }
}

/// One-shot `(table, spec) -> (view, bundle)`, computing the baseline in place.
///
/// Prefer holding an [`Engine`] when applying more than one filter.
pub fn apply<'t>(table: &'t Table, spec: &FilterSpec) -> (FilteredView<'t>, AggregateBundle) {
    let view = filter(table, spec);
    let bundle = match (
        Aggregates::compute(table.records()),
        Aggregates::compute(view.records()),
    ) {
        (Some(baseline), Some(filtered)) => AggregateBundle::Computed {
            comparison: Comparison::new(&filtered, &baseline),
            filtered: Box::new(filtered),
            baseline: Arc::new(baseline),
        },
        _ => AggregateBundle::NoData,
    };
    (view, bundle)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::data::aggregate::Delta;
    use crate::data::model::Record;

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn two_row_table() -> Arc<Table> {
        Arc::new(Table::from_records(vec![
            Record::new(1, 2, 3.00, "Coffee", "A", "January", "Monday", 8),
            Record::new(2, 1, 5.00, "Tea", "B", "February", "Tuesday", 9),
        ]))
    }

    #[test]
    fn january_only_scenario() {
        let engine = Engine::new(two_row_table());
        let spec = FilterSpec {
            months: set(&["January"]),
            categories: set(&["Coffee", "Tea"]),
            locations: set(&["A", "B"]),
        };

        let (view, bundle) = engine.apply(&spec);
        assert_eq!(view.indices(), &[0]);

        let agg = bundle.filtered().expect("computed");
        assert_eq!(agg.total_sales, 6.00);
        assert_eq!(agg.top_category, "Coffee");
        assert_eq!(agg.transactions, 1);
        assert_eq!(bundle.top_category_changed(), Some(false));
        assert_eq!(bundle.peak_hour_changed(), Some(false));

        let cmp = bundle.comparison().expect("computed");
        assert_eq!(cmp.total_sales_change, Delta::Percent((6.0 / 11.0 - 1.0) * 100.0));
        assert_eq!(cmp.transactions_change, Delta::Percent(-50.0));
    }

    #[test]
    fn empty_month_set_is_no_data() {
        let engine = Engine::new(two_row_table());
        let spec = FilterSpec {
            months: BTreeSet::new(),
            categories: set(&["Coffee"]),
            locations: set(&["A"]),
        };

        let (view, bundle) = engine.apply(&spec);
        assert!(view.is_empty());
        assert_eq!(bundle, AggregateBundle::NoData);
    }

    #[test]
    fn apply_is_pure() {
        let table = two_row_table();
        let before = (*table).clone();
        let engine = Engine::new(Arc::clone(&table));
        let spec = FilterSpec::all(&table);

        let first = engine.apply(&spec);
        let second = engine.apply(&spec);
        assert_eq!(first, second);
        assert_eq!(*table, before);
    }

    #[test]
    fn free_apply_matches_engine() {
        let table = two_row_table();
        let engine = Engine::new(Arc::clone(&table));
        let spec = FilterSpec {
            categories: set(&["Tea"]),
            ..FilterSpec::all(&table)
        };
        assert_eq!(apply(&table, &spec), engine.apply(&spec));
    }

    #[test]
    fn zero_baseline_sales_leave_other_fields_valid() {
        let table = Arc::new(Table::from_records(vec![
            Record::new(1, 1, 0.0, "Promo", "A", "January", "Monday", 8),
            Record::new(2, 1, 0.0, "Promo", "B", "January", "Monday", 9),
        ]));
        let engine = Engine::new(Arc::clone(&table));
        let spec = FilterSpec {
            locations: set(&["B"]),
            ..FilterSpec::all(&table)
        };

        let (_, bundle) = engine.apply(&spec);
        let cmp = bundle.comparison().expect("computed");
        assert_eq!(cmp.total_sales_change, Delta::Undefined);
        assert_eq!(cmp.transactions_change, Delta::Percent(-50.0));
        assert_eq!(bundle.filtered().map(|a| a.total_sales), Some(0.0));
    }

    #[test]
    fn empty_table_reports_no_data() {
        let table = Arc::new(Table::default());
        let engine = Engine::new(Arc::clone(&table));
        assert!(engine.baseline().is_none());
        let (view, bundle) = engine.apply(&FilterSpec::all(&table));
        assert!(view.is_empty());
        assert!(bundle.is_no_data());
    }
}
