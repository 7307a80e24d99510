//! Read queries over the four projections, one module per family.
//!
//! Every function builds its statement through [`crate::builder::QueryBuilder`]
//! and maps rows into the typed views of `warden_core::views`.

pub mod counts;
pub mod options;
pub mod reports;
pub mod resources;
pub mod results;
