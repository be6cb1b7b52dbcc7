//! Filter-and-aggregate analytics over coffee-shop sales transactions.
//!
//! Load a [`Table`] once, share it behind an `Arc`, and run
//! [`Engine::apply`] for every filter change.

pub mod data;
pub mod engine;
pub mod report;
pub mod state;

pub use data::{
    load_file, write_view, AggregateBundle, Aggregates, DataLoadError, ExportError, FilterDimension,
    FilterSpec, FilteredView, Record, Table,
};
pub use engine::Engine;
pub use state::{DashboardState, FilterSummary};
