//! Status, severity, and finding count aggregations.
//!
//! Status counts are seeded with zeroes before the overlay query runs, so a
//! status without matching rows still appears in the response. All folded
//! maps are ordered, which keeps response ordering stable across runs.

use std::collections::BTreeMap;

use rusqlite::Connection;
use warden_core::report::{ALL_STATUSES, STATUS_ERROR, STATUS_FAIL, STATUS_PASS, STATUS_WARN};
use warden_core::views::{
    CategoryView, FindingCounts, Findings, NamespaceCount, NamespacedStatusCount,
    ResourceSeverityCount, ResourceStatusCount, SourceView, StatusCount,
};
use warden_core::{Direction, Filter, StorageResult};

use crate::builder::QueryBuilder;
use crate::dialect::{Dialect, LabelMatcher};

fn status_seed(filter: &Filter) -> Vec<String> {
    if filter.status.is_empty() {
        ALL_STATUSES.iter().map(|s| s.to_string()).collect()
    } else {
        filter.status.clone()
    }
}

/// Cluster-scope status counts, zero-seeded for the requested statuses.
pub fn fetch_status_counts(
    conn: &Connection,
    dialect: Dialect,
    matcher: LabelMatcher,
    filter: &Filter,
) -> StorageResult<Vec<StatusCount>> {
    let mut counts: BTreeMap<String, i64> =
        status_seed(filter).into_iter().map(|s| (s, 0)).collect();

    let mut qb = QueryBuilder::filters(dialect, matcher);
    qb.columns("SUM(f.count) as count, f.result as status")
        .cluster_scope()
        .apply_filter(filter)
        .group(&["status"]);

    let rows: Vec<(i64, String)> = qb.fetch(conn, |row| Ok((row.get(0)?, row.get(1)?)))?;
    for (count, status) in rows {
        counts.insert(status, count);
    }

    Ok(counts
        .into_iter()
        .map(|(status, count)| StatusCount { status, count })
        .collect())
}

/// Per-namespace status counts. Every requested status appears, with an
/// empty namespace list when nothing matched.
pub fn fetch_namespaced_status_counts(
    conn: &Connection,
    dialect: Dialect,
    matcher: LabelMatcher,
    filter: &Filter,
) -> StorageResult<Vec<NamespacedStatusCount>> {
    let mut counts: BTreeMap<String, Vec<NamespaceCount>> = status_seed(filter)
        .into_iter()
        .map(|s| (s, Vec::new()))
        .collect();

    let mut qb = QueryBuilder::filters(dialect, matcher);
    qb.columns("SUM(f.count) as count, f.namespace, f.result as status")
        .namespace_scope()
        .apply_filter(filter)
        .group(&["f.namespace", "status"])
        .order("f.namespace", Direction::Asc);

    let rows: Vec<(i64, String, String)> =
        qb.fetch(conn, |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?;
    for (count, namespace, status) in rows {
        counts
            .entry(status)
            .or_default()
            .push(NamespaceCount { namespace, count });
    }

    Ok(counts
        .into_iter()
        .map(|(status, items)| NamespacedStatusCount { status, items })
        .collect())
}

/// Result counts of one policy rule, zero-seeded for every status.
pub fn fetch_rule_status_counts(
    conn: &Connection,
    dialect: Dialect,
    matcher: LabelMatcher,
    policy: &str,
    rule: &str,
) -> StorageResult<Vec<StatusCount>> {
    let mut counts: BTreeMap<String, i64> =
        ALL_STATUSES.iter().map(|s| (s.to_string(), 0)).collect();

    let mut qb = QueryBuilder::results(dialect, matcher);
    qb.columns("COUNT(r.id) as count, r.result as status")
        .filter_value("r.policy", policy)
        .filter_value("r.rule", rule)
        .group(&["status"]);

    let rows: Vec<(i64, String)> = qb.fetch(conn, |row| Ok((row.get(0)?, row.get(1)?)))?;
    for (count, status) in rows {
        counts.insert(status, count);
    }

    Ok(counts
        .into_iter()
        .map(|(status, count)| StatusCount { status, count })
        .collect())
}

/// Scored finding counts per source, with a grand total. Skipped findings
/// never count.
pub fn fetch_finding_counts(
    conn: &Connection,
    dialect: Dialect,
    matcher: LabelMatcher,
    filter: &Filter,
) -> StorageResult<Findings> {
    let scored = [STATUS_PASS, STATUS_FAIL, STATUS_WARN, STATUS_ERROR]
        .map(String::from)
        .to_vec();

    let mut qb = QueryBuilder::filters(dialect, matcher);
    qb.columns("SUM(f.count) as count, f.result as status, f.source")
        .filter("f.result", &scored)
        .apply_filter(filter)
        .group(&["status", "f.source"]);

    let rows: Vec<(i64, String, String)> =
        qb.fetch(conn, |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?;

    let mut findings: BTreeMap<String, FindingCounts> = BTreeMap::new();
    let mut total = 0;
    for (count, status, source) in rows {
        let entry = findings
            .entry(source.clone())
            .or_insert_with(|| FindingCounts {
                source,
                ..FindingCounts::default()
            });
        entry.counts.insert(status, count);
        entry.total += count;
        total += count;
    }

    Ok(Findings {
        total,
        counts: findings.into_values().collect(),
    })
}

/// Sources with per-category status sums, optionally narrowed to one
/// resource id.
pub fn fetch_sources(
    conn: &Connection,
    dialect: Dialect,
    matcher: LabelMatcher,
    resource_id: Option<&str>,
) -> StorageResult<Vec<SourceView>> {
    let mut qb = QueryBuilder::resources(dialect, matcher);
    qb.columns("res.source, res.category")
        .status_summaries()
        .group(&["res.source", "res.category"])
        .order("res.source", Direction::Asc)
        .order("res.category", Direction::Asc);
    if let Some(id) = resource_id {
        qb.filter_value("res.id", id);
    }

    type SourceRow = (String, CategoryView);
    let rows: Vec<SourceRow> = qb.fetch(conn, |row| {
        Ok((
            row.get(0)?,
            CategoryView {
                name: row.get(1)?,
                pass: row.get(2)?,
                warn: row.get(3)?,
                fail: row.get(4)?,
                error: row.get(5)?,
                skip: row.get(6)?,
            },
        ))
    })?;

    let mut sources: Vec<SourceView> = Vec::new();
    for (name, category) in rows {
        match sources.last_mut() {
            Some(source) if source.name == name => source.categories.push(category),
            _ => sources.push(SourceView {
                name,
                categories: vec![category],
            }),
        }
    }

    Ok(sources)
}

/// Per-source status sums of one resource.
pub fn fetch_resource_status_counts(
    conn: &Connection,
    dialect: Dialect,
    matcher: LabelMatcher,
    resource_id: &str,
    filter: &Filter,
) -> StorageResult<Vec<ResourceStatusCount>> {
    let mut qb = QueryBuilder::resources(dialect, matcher);
    qb.columns("res.source")
        .status_summaries()
        .filter_value("res.id", resource_id)
        .apply_filter(filter)
        .group(&["res.source"])
        .order("res.source", Direction::Asc);

    qb.fetch(conn, |row| {
        Ok(ResourceStatusCount {
            source: row.get(0)?,
            pass: row.get(1)?,
            warn: row.get(2)?,
            fail: row.get(3)?,
            error: row.get(4)?,
            skip: row.get(5)?,
        })
    })
}

/// Per-source severity sums of one resource.
pub fn fetch_resource_severity_counts(
    conn: &Connection,
    dialect: Dialect,
    matcher: LabelMatcher,
    resource_id: &str,
    filter: &Filter,
) -> StorageResult<Vec<ResourceSeverityCount>> {
    let mut qb = QueryBuilder::resources(dialect, matcher);
    qb.columns("res.source")
        .severity_summaries()
        .filter_value("res.id", resource_id)
        .apply_filter(filter)
        .group(&["res.source"])
        .order("res.source", Direction::Asc);

    qb.fetch(conn, |row| {
        Ok(ResourceSeverityCount {
            source: row.get(0)?,
            info: row.get(1)?,
            low: row.get(2)?,
            medium: row.get(3)?,
            high: row.get(4)?,
            critical: row.get(5)?,
            unknown: row.get(6)?,
        })
    })
}
