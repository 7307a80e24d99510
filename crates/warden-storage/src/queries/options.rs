//! Distinct filter-option listings backing autocomplete style endpoints.

use rusqlite::Connection;
use warden_core::{Filter, StorageResult};

use crate::builder::QueryBuilder;
use crate::dialect::{Dialect, LabelMatcher};

/// Distinct non-empty values of one filter-table column, scoped and filtered.
///
/// `namespaced` narrows to namespaced rows (`Some(true)`), cluster rows
/// (`Some(false)`), or leaves the scope open (`None`).
pub fn fetch_filter_options(
    conn: &Connection,
    dialect: Dialect,
    matcher: LabelMatcher,
    column: &'static str,
    filter: &Filter,
    namespaced: Option<bool>,
) -> StorageResult<Vec<String>> {
    let mut qb = QueryBuilder::filters(dialect, matcher);
    qb.option(column);
    if let Some(namespaced) = namespaced {
        qb.scoped(namespaced);
    }
    qb.apply_filter(filter);

    qb.fetch(conn, |row| row.get(0))
}

/// Distinct non-empty values of one result-table column, scoped and filtered.
pub fn fetch_result_options(
    conn: &Connection,
    dialect: Dialect,
    matcher: LabelMatcher,
    column: &'static str,
    filter: &Filter,
    namespaced: bool,
) -> StorageResult<Vec<String>> {
    let mut qb = QueryBuilder::results(dialect, matcher);
    qb.option(column).scoped(namespaced).apply_filter(filter);

    qb.fetch(conn, |row| row.get(0))
}
