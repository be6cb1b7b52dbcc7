/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse + validate file → Table (total_sales derived)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Table    │  Vec<Record>, sorted options per dimension
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  FilterSpec (month ∧ category ∧ location) → FilteredView
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  FilteredView → AggregateBundle (or NoData)
///   └───────────┘
///
///   FilteredView ──► export ──► .csv / .json / .parquet
/// ```

pub mod aggregate;
pub mod error;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;

pub use aggregate::{AggregateBundle, Aggregates, Breakdown, Comparison, Delta, GroupStats};
pub use error::{DataLoadError, ExportError};
pub use export::write_view;
pub use filter::{filter, FilterSpec, FilteredView};
pub use loader::load_file;
pub use model::{FilterDimension, Record, Table, DAY_ORDER, MONTH_ORDER};
