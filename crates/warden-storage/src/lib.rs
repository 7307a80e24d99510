//! # warden-storage
//!
//! SQLite persistence for policy reports. The external watcher delivers
//! report aggregates; this crate projects them into query-shaped tables and
//! serves the read API on top.
//!
//! ## Modules
//! - `pool` — writer + read-pool connection handling, interrupts
//! - `pragmas` — per-connection SQLite tuning
//! - `dialect` — engine-specific SQL fragments (placeholders, label match)
//! - `schema` — table set, version marker, rebuild decision
//! - `model` — row types and the aggregate-to-row folds
//! - `builder` — structural predicates rendered to SQL at execution
//! - `writer` — chunked ingestion, replace-on-update, cleanup
//! - `queries` — read operations grouped by projection
//! - `store` — the `IReportStore` façade wiring it all together

pub mod builder;
pub mod dialect;
pub mod model;
pub mod pool;
pub mod pragmas;
pub mod queries;
pub mod schema;
pub mod store;
pub mod writer;

pub use dialect::{Dialect, LabelMatcher};
pub use pool::ConnectionPool;
pub use store::PolicyReportStore;
