//! Resource identity listings and per-resource status rollups.

use rusqlite::{Connection, Row};
use warden_core::views::{ResourceResultView, ResourceView};
use warden_core::{Direction, Filter, Pagination, StorageResult};

use crate::builder::QueryBuilder;
use crate::dialect::{Dialect, LabelMatcher};

const IDENTITY_COLUMNS: &str = "res.id, res.resource_uid, res.resource_kind, \
                                res.resource_api_version, res.resource_namespace, \
                                res.resource_name";

const IDENTITY_GROUPS: [&str; 6] = [
    "res.id",
    "res.resource_uid",
    "res.resource_kind",
    "res.resource_api_version",
    "res.resource_namespace",
    "res.resource_name",
];

/// Distinct kind and name pairs seen in results of one scope.
pub fn fetch_resources(
    conn: &Connection,
    dialect: Dialect,
    matcher: LabelMatcher,
    namespaced: bool,
    filter: &Filter,
) -> StorageResult<Vec<ResourceView>> {
    let mut qb = QueryBuilder::results(dialect, matcher);
    qb.distinct()
        .columns("r.resource_name, r.resource_kind")
        .scoped(namespaced)
        .apply_filter(filter)
        .order("r.resource_kind", Direction::Asc)
        .order("r.resource_name", Direction::Asc);

    qb.fetch(conn, |row| {
        Ok(ResourceView {
            name: row.get(0)?,
            kind: row.get(1)?,
            ..ResourceView::default()
        })
    })
}

/// Full identity of one resource id, if it was ever reported.
pub fn fetch_resource(
    conn: &Connection,
    dialect: Dialect,
    matcher: LabelMatcher,
    id: &str,
) -> StorageResult<Option<ResourceView>> {
    let mut qb = QueryBuilder::resources(dialect, matcher);
    qb.columns(IDENTITY_COLUMNS).filter_value("res.id", id);

    qb.fetch_optional(conn, map_identity)
}

fn rollup(
    dialect: Dialect,
    matcher: LabelMatcher,
    namespaced: bool,
    filter: &Filter,
) -> QueryBuilder {
    let mut qb = QueryBuilder::resources(dialect, matcher);
    qb.scoped(namespaced).apply_filter(filter);
    qb
}

/// Per-resource status rollups of one scope, summed across sources.
pub fn fetch_resource_result_views(
    conn: &Connection,
    dialect: Dialect,
    matcher: LabelMatcher,
    namespaced: bool,
    filter: &Filter,
    pagination: &Pagination,
) -> StorageResult<Vec<ResourceResultView>> {
    let mut qb = rollup(dialect, matcher, namespaced, filter);
    qb.columns(IDENTITY_COLUMNS)
        .status_summaries()
        .group(&IDENTITY_GROUPS)
        .pagination(pagination);

    qb.fetch(conn, |row| map_rollup(row, 6))
}

/// Distinct resources matching the rollup listing.
pub fn count_resource_result_views(
    conn: &Connection,
    dialect: Dialect,
    matcher: LabelMatcher,
    namespaced: bool,
    filter: &Filter,
) -> StorageResult<i64> {
    let mut qb = rollup(dialect, matcher, namespaced, filter);
    qb.columns("res.id").group(&["res.id"]);

    qb.count(conn)
}

/// Status rollups of one resource id, split per source.
pub fn fetch_per_source_resource_results(
    conn: &Connection,
    dialect: Dialect,
    matcher: LabelMatcher,
    resource_id: &str,
    filter: &Filter,
) -> StorageResult<Vec<ResourceResultView>> {
    let mut qb = QueryBuilder::resources(dialect, matcher);
    qb.columns(IDENTITY_COLUMNS)
        .columns("res.source")
        .status_summaries()
        .filter_value("res.id", resource_id)
        .apply_filter(filter)
        .group(&IDENTITY_GROUPS)
        .group(&["res.source"])
        .order("res.source", Direction::Asc);

    qb.fetch(conn, |row| {
        let mut view = map_rollup(row, 7)?;
        view.source = row.get(6)?;
        Ok(view)
    })
}

fn map_identity(row: &Row<'_>) -> rusqlite::Result<ResourceView> {
    Ok(ResourceView {
        id: row.get(0)?,
        uid: row.get(1)?,
        kind: row.get(2)?,
        api_version: row.get(3)?,
        namespace: row.get(4)?,
        name: row.get(5)?,
    })
}

/// Identity columns followed by the five status sums at `counts_from`.
fn map_rollup(row: &Row<'_>, counts_from: usize) -> rusqlite::Result<ResourceResultView> {
    let identity = map_identity(row)?;

    Ok(ResourceResultView {
        id: identity.id,
        uid: identity.uid,
        api_version: identity.api_version,
        kind: identity.kind,
        name: identity.name,
        namespace: identity.namespace,
        source: String::new(),
        pass: row.get(counts_from)?,
        warn: row.get(counts_from + 1)?,
        fail: row.get(counts_from + 2)?,
        error: row.get(counts_from + 3)?,
        skip: row.get(counts_from + 4)?,
    })
}
