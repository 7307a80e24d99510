//! Report header listings, label folding, and aggregate reassembly.

use std::collections::BTreeMap;

use rusqlite::{params, Connection, OptionalExtension, Row};
use warden_core::report::{Finding, PolicyReport, ReportType, ResourceRef, Summary};
use warden_core::views::ReportView;
use warden_core::{Filter, Pagination, StorageResult};

use crate::builder::QueryBuilder;
use crate::dialect::{Dialect, LabelMatcher};
use crate::model::json_to_map;

const REPORT_COLUMNS: &str = "pr.id, pr.type, pr.name, pr.namespace, pr.source, pr.labels, \
                              pr.pass, pr.skip, pr.warn, pr.fail, pr.error, pr.created";

fn base(
    dialect: Dialect,
    matcher: LabelMatcher,
    report_type: ReportType,
    filter: &Filter,
) -> QueryBuilder {
    let mut qb = QueryBuilder::reports(dialect, matcher);
    qb.filter_value("pr.type", report_type.as_str())
        .apply_filter(filter);
    qb
}

/// Report headers of one scope, filtered and paginated.
pub fn fetch_reports(
    conn: &Connection,
    dialect: Dialect,
    matcher: LabelMatcher,
    report_type: ReportType,
    filter: &Filter,
    pagination: &Pagination,
) -> StorageResult<Vec<ReportView>> {
    let mut qb = base(dialect, matcher, report_type, filter);
    qb.columns(REPORT_COLUMNS).pagination(pagination);

    qb.fetch(conn, map_report_view)
}

pub fn count_reports(
    conn: &Connection,
    dialect: Dialect,
    matcher: LabelMatcher,
    report_type: ReportType,
    filter: &Filter,
) -> StorageResult<i64> {
    let mut qb = base(dialect, matcher, report_type, filter);
    qb.columns("pr.id");

    qb.count(conn)
}

/// Distinct label maps of one scope, folded into key -> unique values.
pub fn fetch_report_labels(
    conn: &Connection,
    dialect: Dialect,
    matcher: LabelMatcher,
    report_type: ReportType,
    filter: &Filter,
) -> StorageResult<BTreeMap<String, Vec<String>>> {
    let mut qb = QueryBuilder::reports(dialect, matcher);
    qb.distinct()
        .columns("pr.labels")
        .filter_value("pr.type", report_type.as_str())
        .filter("pr.namespace", &filter.namespaces)
        .filter("pr.source", &filter.sources);

    let rows: Vec<String> = qb.fetch(conn, |row| row.get(0))?;

    let mut list: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for raw in rows {
        for (key, value) in json_to_map(&raw) {
            let values = list.entry(key).or_default();
            if !values.iter().any(|v| v.eq_ignore_ascii_case(&value)) {
                values.push(value);
            }
        }
    }

    Ok(list)
}

/// Reassemble one stored report aggregate with all of its findings.
pub fn get_report(conn: &Connection, id: &str) -> StorageResult<Option<PolicyReport>> {
    let header = conn
        .query_row(
            "SELECT name, namespace, labels, skip, pass, warn, fail, error, created \
             FROM policy_report WHERE id = ?",
            params![id],
            |row| {
                let labels: String = row.get(2)?;
                Ok(PolicyReport {
                    name: row.get(0)?,
                    namespace: row.get(1)?,
                    labels: json_to_map(&labels),
                    summary: Summary {
                        skip: row.get(3)?,
                        pass: row.get(4)?,
                        warn: row.get(5)?,
                        fail: row.get(6)?,
                        error: row.get(7)?,
                    },
                    created: row.get(8)?,
                    ..PolicyReport::default()
                })
            },
        )
        .optional()?;

    let Some(mut report) = header else {
        return Ok(None);
    };

    let mut stmt = conn.prepare_cached(
        "SELECT id, policy, rule, message, scored, result, severity, category, source, \
                properties, created, resource_api_version, resource_kind, resource_name, \
                resource_namespace, resource_uid \
         FROM policy_report_result WHERE policy_report_id = ? ORDER BY id",
    )?;
    let rows = stmt.query_map(params![id], map_finding)?;
    for row in rows {
        report.results.push(row?);
    }

    Ok(Some(report))
}

fn map_report_view(row: &Row<'_>) -> rusqlite::Result<ReportView> {
    let report_type: String = row.get(1)?;
    let labels: String = row.get(5)?;

    Ok(ReportView {
        id: row.get(0)?,
        report_type: ReportType::parse(&report_type),
        name: row.get(2)?,
        namespace: row.get(3)?,
        source: row.get(4)?,
        labels: json_to_map(&labels),
        pass: row.get(6)?,
        skip: row.get(7)?,
        warn: row.get(8)?,
        fail: row.get(9)?,
        error: row.get(10)?,
        created: row.get(11)?,
    })
}

fn map_finding(row: &Row<'_>) -> rusqlite::Result<Finding> {
    let properties: String = row.get(9)?;

    Ok(Finding {
        id: row.get(0)?,
        policy: row.get(1)?,
        rule: row.get(2)?,
        message: row.get(3)?,
        scored: row.get(4)?,
        result: row.get(5)?,
        severity: row.get(6)?,
        category: row.get(7)?,
        source: row.get(8)?,
        properties: json_to_map(&properties),
        timestamp: row.get(10)?,
        resource: Some(ResourceRef {
            api_version: row.get(11)?,
            kind: row.get(12)?,
            name: row.get(13)?,
            namespace: row.get(14)?,
            uid: row.get(15)?,
        }),
    })
}
