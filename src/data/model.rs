use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Canonical orderings for the calendar dimensions
// ---------------------------------------------------------------------------

/// Weekday order used when rendering day series.
pub const DAY_ORDER: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Month order used when rendering month series (the observed range of the data).
pub const MONTH_ORDER: [&str; 6] = ["January", "February", "March", "April", "May", "June"];

// ---------------------------------------------------------------------------
// Record – one row of the sales table
// ---------------------------------------------------------------------------

/// A single sales transaction.
///
/// `total_sales` is derived once in [`Record::new`] and never recomputed, so
/// the field is private and only readable through [`Record::total_sales`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub transaction_id: i64,
    pub transaction_qty: u32,
    pub unit_price: f64,
    pub product_category: String,
    pub store_location: String,
    #[serde(rename = "Month")]
    pub month: String,
    #[serde(rename = "Day")]
    pub day: String,
    #[serde(rename = "Hour")]
    pub hour: u8,
    total_sales: f64,
}

impl Record {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        transaction_id: i64,
        transaction_qty: u32,
        unit_price: f64,
        product_category: impl Into<String>,
        store_location: impl Into<String>,
        month: impl Into<String>,
        day: impl Into<String>,
        hour: u8,
    ) -> Self {
        Record {
            transaction_id,
            transaction_qty,
            unit_price,
            product_category: product_category.into(),
            store_location: store_location.into(),
            month: month.into(),
            day: day.into(),
            hour,
            total_sales: f64::from(transaction_qty) * unit_price,
        }
    }

    /// `transaction_qty * unit_price`, computed at construction.
    pub fn total_sales(&self) -> f64 {
        self.total_sales
    }

    /// The record's value along a filter dimension.
    pub fn value_of(&self, dimension: FilterDimension) -> &str {
        match dimension {
            FilterDimension::Month => &self.month,
            FilterDimension::Category => &self.product_category,
            FilterDimension::Location => &self.store_location,
        }
    }
}

// ---------------------------------------------------------------------------
// FilterDimension – the three user-selectable columns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FilterDimension {
    Month,
    Category,
    Location,
}

impl FilterDimension {
    pub const ALL: [FilterDimension; 3] = [
        FilterDimension::Month,
        FilterDimension::Category,
        FilterDimension::Location,
    ];
}

impl fmt::Display for FilterDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterDimension::Month => write!(f, "months"),
            FilterDimension::Category => write!(f, "categories"),
            FilterDimension::Location => write!(f, "locations"),
        }
    }
}

// ---------------------------------------------------------------------------
// Table – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full loaded table with the distinct values of each filter dimension.
///
/// Immutable once built; share it behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    records: Vec<Record>,
    months: BTreeSet<String>,
    categories: BTreeSet<String>,
    locations: BTreeSet<String>,
}

impl Table {
    /// Build the option indices from the loaded records.
    pub fn from_records(records: Vec<Record>) -> Self {
        let unique_values = |dimension: FilterDimension| -> BTreeSet<String> {
            records
                .iter()
                .map(|rec| rec.value_of(dimension).to_string())
                .collect()
        };

        let months = unique_values(FilterDimension::Month);
        let categories = unique_values(FilterDimension::Category);
        let locations = unique_values(FilterDimension::Location);

        Table {
            records,
            months,
            categories,
            locations,
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Sorted distinct values of a dimension, i.e. the selectable options.
    pub fn options(&self, dimension: FilterDimension) -> &BTreeSet<String> {
        match dimension {
            FilterDimension::Month => &self.months,
            FilterDimension::Category => &self.categories,
            FilterDimension::Location => &self.locations,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
