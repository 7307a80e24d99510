//! Flattened result listings over the result table.

use rusqlite::{Connection, Row};
use warden_core::views::ListResult;
use warden_core::{Filter, Pagination, StorageResult};

use crate::builder::QueryBuilder;
use crate::dialect::{Dialect, LabelMatcher};
use crate::model::json_to_map;

const RESULT_COLUMNS: &str = "r.id, r.resource_namespace, r.resource_kind, \
                              r.resource_api_version, r.resource_name, r.message, r.policy, \
                              r.rule, r.result, r.severity, r.category, r.properties, r.created";

fn scoped(
    dialect: Dialect,
    matcher: LabelMatcher,
    namespaced: bool,
    filter: &Filter,
) -> QueryBuilder {
    let mut qb = QueryBuilder::results(dialect, matcher);
    qb.scoped(namespaced).apply_filter(filter);
    qb
}

fn for_resource(
    dialect: Dialect,
    matcher: LabelMatcher,
    resource_id: &str,
    filter: &Filter,
) -> QueryBuilder {
    let mut qb = QueryBuilder::results(dialect, matcher);
    qb.filter_value("r.resource_id", resource_id)
        .apply_filter(filter);
    qb
}

/// Results of one scope, filtered and paginated.
pub fn fetch_scoped_results(
    conn: &Connection,
    dialect: Dialect,
    matcher: LabelMatcher,
    namespaced: bool,
    filter: &Filter,
    pagination: &Pagination,
) -> StorageResult<Vec<ListResult>> {
    let mut qb = scoped(dialect, matcher, namespaced, filter);
    qb.columns(RESULT_COLUMNS).pagination(pagination);

    qb.fetch(conn, map_list_result)
}

pub fn count_scoped_results(
    conn: &Connection,
    dialect: Dialect,
    matcher: LabelMatcher,
    namespaced: bool,
    filter: &Filter,
) -> StorageResult<i64> {
    let mut qb = scoped(dialect, matcher, namespaced, filter);
    qb.columns("r.id");

    qb.count(conn)
}

/// Results attached to one resource id, filtered and paginated.
pub fn fetch_resource_results(
    conn: &Connection,
    dialect: Dialect,
    matcher: LabelMatcher,
    resource_id: &str,
    filter: &Filter,
    pagination: &Pagination,
) -> StorageResult<Vec<ListResult>> {
    let mut qb = for_resource(dialect, matcher, resource_id, filter);
    qb.columns(RESULT_COLUMNS).pagination(pagination);

    qb.fetch(conn, map_list_result)
}

pub fn count_resource_results(
    conn: &Connection,
    dialect: Dialect,
    matcher: LabelMatcher,
    resource_id: &str,
    filter: &Filter,
) -> StorageResult<i64> {
    let mut qb = for_resource(dialect, matcher, resource_id, filter);
    qb.columns("r.id");

    qb.count(conn)
}

fn map_list_result(row: &Row<'_>) -> rusqlite::Result<ListResult> {
    let properties: String = row.get(11)?;

    Ok(ListResult {
        id: row.get(0)?,
        namespace: row.get(1)?,
        kind: row.get(2)?,
        api_version: row.get(3)?,
        name: row.get(4)?,
        message: row.get(5)?,
        policy: row.get(6)?,
        rule: row.get(7)?,
        status: row.get(8)?,
        severity: row.get(9)?,
        category: row.get(10)?,
        properties: json_to_map(&properties),
        timestamp: row.get(12)?,
    })
}
