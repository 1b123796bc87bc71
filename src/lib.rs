//! Customer churn analytics over an in-memory dataset.
//!
//! The dataset is loaded once into a [`RecordStore`]. Each request filters it,
//! then aggregates the subset for the dashboard or pages it for the customer
//! table. Export payloads are plain row sequences ready for CSV.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod filter;
pub mod models;
pub mod pager;
pub mod report;
pub mod session;
pub mod store;

pub use aggregate::{aggregate, aggregate_with_limit};
pub use config::DashboardConfig;
pub use error::{Error, Result};
pub use filter::{filter, search};
pub use models::{
    AggregateResult, Bucket, ChurnStatus, CustomerRecord, FilterOptions, FilterState, Metrics,
    PageView, Selector,
};
pub use pager::paginate;
pub use report::{build_report, export_rows, write_csv, ReportKind};
pub use session::DashboardSession;
pub use store::RecordStore;
