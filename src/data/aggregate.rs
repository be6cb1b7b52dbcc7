use std::borrow::Borrow;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;

use super::model::{Record, DAY_ORDER, MONTH_ORDER};

// ---------------------------------------------------------------------------
// GroupStats / Breakdown – total_sales grouped by one dimension
// ---------------------------------------------------------------------------

/// Running sum and count of `total_sales` for one group.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GroupStats {
    pub sum: f64,
    pub count: usize,
}

impl GroupStats {
    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    /// Arithmetic mean over the group's records. Groups are never empty.
    pub fn mean(&self) -> f64 {
        self.sum / self.count as f64
    }
}

/// `total_sales` grouped by the distinct values of one dimension.
///
/// Groups iterate in ascending key order, which is also the tie-break order
/// for [`Breakdown::argmax`].
#[derive(Debug, Clone, PartialEq)]
pub struct Breakdown<K: Ord> {
    groups: BTreeMap<K, GroupStats>,
}

impl<K: Ord> Default for Breakdown<K> {
    fn default() -> Self {
        Breakdown {
            groups: BTreeMap::new(),
        }
    }
}

impl<K: Ord> Breakdown<K> {
    fn add(&mut self, key: K, value: f64) {
        self.groups.entry(key).or_default().add(value);
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&GroupStats>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.groups.get(key)
    }

    pub fn sum<Q>(&self, key: &Q) -> Option<f64>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get(key).map(|g| g.sum)
    }

    pub fn mean<Q>(&self, key: &Q) -> Option<f64>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get(key).map(GroupStats::mean)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &GroupStats)> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Sum of all group sums.
    pub fn total(&self) -> f64 {
        self.groups.values().map(|g| g.sum).sum()
    }

    /// Key with the largest summed sales; the smallest such key on ties.
    pub fn argmax(&self) -> Option<&K> {
        let mut best: Option<(&K, f64)> = None;
        for (key, stats) in &self.groups {
            match best {
                Some((_, max)) if stats.sum <= max => {}
                _ => best = Some((key, stats.sum)),
            }
        }
        best.map(|(key, _)| key)
    }

    /// Group sums in ascending key order.
    pub fn sums(&self) -> Vec<(&K, f64)> {
        self.groups.iter().map(|(k, g)| (k, g.sum)).collect()
    }

    /// Group means in ascending key order.
    pub fn means(&self) -> Vec<(&K, f64)> {
        self.groups.iter().map(|(k, g)| (k, g.mean())).collect()
    }

    /// Group sums ordered by value ascending (stable on key order).
    pub fn sums_by_value(&self) -> Vec<(&K, f64)> {
        let mut series = self.sums();
        series.sort_by(|a, b| a.1.total_cmp(&b.1));
        series
    }

    /// Group means ordered by value ascending (stable on key order).
    pub fn means_by_value(&self) -> Vec<(&K, f64)> {
        let mut series = self.means();
        series.sort_by(|a, b| a.1.total_cmp(&b.1));
        series
    }

    /// The `n` largest group sums, descending; ties keep key order.
    pub fn top_n(&self, n: usize) -> Vec<(&K, f64)> {
        let mut series = self.sums();
        series.sort_by(|a, b| b.1.total_cmp(&a.1));
        series.truncate(n);
        series
    }

    /// Stats for each slot of a fixed ordering; `None` where the view had no records.
    pub fn reindex<'o, Q>(&self, order: &[&'o Q]) -> Vec<(&'o Q, Option<GroupStats>)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        order
            .iter()
            .map(|slot| (*slot, self.groups.get(*slot).copied()))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Aggregates – the fixed catalogue over one non-empty set of records
// ---------------------------------------------------------------------------

/// Sums, distinct counts and argmaxes over a non-empty set of records.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregates {
    pub total_sales: f64,
    /// Count of distinct `transaction_id`s.
    pub transactions: usize,
    pub top_category: String,
    pub peak_hour: u8,
    pub by_hour: Breakdown<u8>,
    pub by_day: Breakdown<String>,
    pub by_month: Breakdown<String>,
    pub by_category: Breakdown<String>,
    pub by_location: Breakdown<String>,
}

impl Aggregates {
    /// Aggregate `records`, or `None` when there are none.
    pub fn compute<'a, I>(records: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Record>,
    {
        let mut total_sales = 0.0;
        let mut ids = HashSet::new();
        let mut by_hour = Breakdown::default();
        let mut by_day = Breakdown::default();
        let mut by_month = Breakdown::default();
        let mut by_category = Breakdown::default();
        let mut by_location = Breakdown::default();

        for rec in records {
            let sales = rec.total_sales();
            total_sales += sales;
            ids.insert(rec.transaction_id);
            by_hour.add(rec.hour, sales);
            by_day.add(rec.day.clone(), sales);
            by_month.add(rec.month.clone(), sales);
            by_category.add(rec.product_category.clone(), sales);
            by_location.add(rec.store_location.clone(), sales);
        }

        let top_category = by_category.argmax()?.clone();
        let peak_hour = *by_hour.argmax()?;

        Some(Aggregates {
            total_sales,
            transactions: ids.len(),
            top_category,
            peak_hour,
            by_hour,
            by_day,
            by_month,
            by_category,
            by_location,
        })
    }

    /// Daily sums in `DAY_ORDER`, `None` for days absent from the view.
    pub fn daily_sales(&self) -> Vec<(&'static str, Option<f64>)> {
        reindexed(&self.by_day, &DAY_ORDER, |g| g.sum)
    }

    /// Daily means in `DAY_ORDER`.
    pub fn daily_average(&self) -> Vec<(&'static str, Option<f64>)> {
        reindexed(&self.by_day, &DAY_ORDER, GroupStats::mean)
    }

    /// Monthly sums in `MONTH_ORDER`, `None` for months absent from the view.
    pub fn monthly_sales(&self) -> Vec<(&'static str, Option<f64>)> {
        reindexed(&self.by_month, &MONTH_ORDER, |g| g.sum)
    }
}

fn reindexed(
    breakdown: &Breakdown<String>,
    order: &[&'static str],
    value: impl Fn(&GroupStats) -> f64,
) -> Vec<(&'static str, Option<f64>)> {
    breakdown
        .reindex(order)
        .into_iter()
        .map(|(slot, stats)| (slot, stats.as_ref().map(&value)))
        .collect()
}

// ---------------------------------------------------------------------------
// Comparison against the unfiltered table
// ---------------------------------------------------------------------------

/// Relative difference of a filtered aggregate from its unfiltered baseline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Delta {
    /// `(filtered / baseline - 1) * 100`
    Percent(f64),
    /// The baseline was zero.
    Undefined,
}

impl Delta {
    pub fn between(filtered: f64, baseline: f64) -> Self {
        if baseline == 0.0 {
            Delta::Undefined
        } else {
            Delta::Percent((filtered / baseline - 1.0) * 100.0)
        }
    }

    pub fn percent(&self) -> Option<f64> {
        match self {
            Delta::Percent(p) => Some(*p),
            Delta::Undefined => None,
        }
    }
}

impl fmt::Display for Delta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Delta::Percent(p) => write!(f, "{p:+.1}%"),
            Delta::Undefined => write!(f, "n/a"),
        }
    }
}

/// Filtered KPIs compared with the same KPIs over the whole table.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub total_sales_change: Delta,
    pub transactions_change: Delta,
    pub overall_top_category: String,
    pub overall_peak_hour: u8,
}

impl Comparison {
    pub fn new(filtered: &Aggregates, baseline: &Aggregates) -> Self {
        Comparison {
            total_sales_change: Delta::between(filtered.total_sales, baseline.total_sales),
            transactions_change: Delta::between(
                filtered.transactions as f64,
                baseline.transactions as f64,
            ),
            overall_top_category: baseline.top_category.clone(),
            overall_peak_hour: baseline.peak_hour,
        }
    }
}

// ---------------------------------------------------------------------------
// AggregateBundle – what the engine hands to the presentation layer
// ---------------------------------------------------------------------------

/// Result of one engine run. `NoData` is distinct from a zero-sales result.
#[derive(Debug, Clone, PartialEq)]
pub enum AggregateBundle {
    NoData,
    Computed {
        filtered: Box<Aggregates>,
        baseline: Arc<Aggregates>,
        comparison: Comparison,
    },
}

impl AggregateBundle {
    pub fn is_no_data(&self) -> bool {
        matches!(self, AggregateBundle::NoData)
    }

    pub fn filtered(&self) -> Option<&Aggregates> {
        match self {
            AggregateBundle::Computed { filtered, .. } => Some(filtered.as_ref()),
            AggregateBundle::NoData => None,
        }
    }

    pub fn comparison(&self) -> Option<&Comparison> {
        match self {
            AggregateBundle::Computed { comparison, .. } => Some(comparison),
            AggregateBundle::NoData => None,
        }
    }

    /// Whether the filtered top category differs from the overall one.
    pub fn top_category_changed(&self) -> Option<bool> {
        match self {
            AggregateBundle::Computed {
                filtered,
                comparison,
                ..
            } => Some(filtered.top_category != comparison.overall_top_category),
            AggregateBundle::NoData => None,
        }
    }

    /// Whether the filtered peak hour differs from the overall one.
    pub fn peak_hour_changed(&self) -> Option<bool> {
        match self {
            AggregateBundle::Computed {
                filtered,
                comparison,
                ..
            } => Some(filtered.peak_hour != comparison.overall_peak_hour),
            AggregateBundle::NoData => None,
        }
    }
}
