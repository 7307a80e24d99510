//! # warden-core
//!
//! Domain types and contracts for the warden policy-report store:
//! the report aggregate and its ingestion trait, filter/pagination value
//! objects, typed read models, the storage error taxonomy, and the
//! database configuration section.

pub mod config;
pub mod errors;
pub mod filter;
pub mod report;
pub mod traits;
pub mod views;

pub use config::DatabaseConfig;
pub use errors::{StorageError, StorageResult};
pub use filter::{Direction, Filter, Pagination};
pub use report::{Finding, IReport, PolicyReport, ReportType, ResourceRef, Summary};
pub use traits::IReportStore;
