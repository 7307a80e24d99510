//! Ingestion writer: persists a report aggregate into the four projections.
//!
//! Report, result, and filter inserts ignore duplicate ids so re-delivery of
//! an unchanged report converges instead of failing. Resource rows are plain
//! inserts; replacing a changed report goes through `update`, which removes
//! the old aggregate first. Chunk failures abort the remaining chunks and
//! propagate after logging; partially written chunks are left for the next
//! `update` to supersede.

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};
use tracing::error;
use warden_core::report::IReport;
use warden_core::StorageResult;

use crate::dialect::Dialect;
use crate::model::{map_to_json, FilterRow, ReportRow, ResourceRow, ResultRow, INSERT_CHUNK_SIZE};

/// Persist one report aggregate: header, filter counts, resource rollups,
/// and result rows, in that order.
pub fn add(conn: &Connection, dialect: Dialect, report: &dyn IReport) -> StorageResult<()> {
    if let Err(err) = insert_report(conn, dialect, &ReportRow::map(report)) {
        error!("failed to persist policy report: {err}");
        return Err(err);
    }

    for chunk in FilterRow::map_all(report).chunks(INSERT_CHUNK_SIZE) {
        if let Err(err) = insert_filters(conn, dialect, chunk) {
            error!("failed to bulk insert policy report filters: {err}");
            return Err(err);
        }
    }

    for chunk in ResourceRow::map_all(report).chunks(INSERT_CHUNK_SIZE) {
        if let Err(err) = insert_resources(conn, chunk) {
            error!("failed to bulk insert policy report resources: {err}");
            return Err(err);
        }
    }

    for chunk in ResultRow::map_all(report).chunks(INSERT_CHUNK_SIZE) {
        if let Err(err) = insert_results(conn, dialect, chunk) {
            error!("failed to bulk insert policy report results: {err}");
            return Err(err);
        }
    }

    Ok(())
}

/// Replace a stored report: remove the old aggregate, then re-add.
pub fn update(conn: &Connection, dialect: Dialect, report: &dyn IReport) -> StorageResult<()> {
    remove(conn, &report.id())?;
    add(conn, dialect, report)
}

/// Delete one report; dependent rows cascade.
pub fn remove(conn: &Connection, id: &str) -> StorageResult<()> {
    if let Err(err) = conn.execute("DELETE FROM policy_report WHERE id = ?", params![id]) {
        error!("failed to remove policy report: {err}");
        return Err(err.into());
    }

    Ok(())
}

/// Delete every stored report; dependent rows cascade.
pub fn clean_up(conn: &Connection) -> StorageResult<()> {
    if let Err(err) = conn.execute("DELETE FROM policy_report WHERE id IS NOT NULL", []) {
        error!("failed to remove policy reports: {err}");
        return Err(err.into());
    }

    Ok(())
}

fn insert_report(conn: &Connection, dialect: Dialect, row: &ReportRow) -> StorageResult<()> {
    let sql = format!(
        "{} policy_report (id, type, name, namespace, source, labels, \
         skip, pass, warn, fail, error, created) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?){}",
        dialect.insert_ignore_prefix(),
        dialect.insert_ignore_suffix()
    );

    conn.prepare_cached(&sql)?.execute(params![
        row.id,
        row.report_type,
        row.name,
        row.namespace,
        row.source,
        map_to_json(&row.labels)?,
        row.skip,
        row.pass,
        row.warn,
        row.fail,
        row.error,
        row.created,
    ])?;

    Ok(())
}

fn insert_filters(conn: &Connection, dialect: Dialect, rows: &[FilterRow]) -> StorageResult<()> {
    let sql = batch_insert_sql(
        dialect.insert_ignore_prefix(),
        "policy_report_filter (id, policy_report_id, namespace, kind, policy, \
         result, severity, category, source, count)",
        10,
        rows.len(),
        dialect.insert_ignore_suffix(),
    );

    let mut args = Vec::with_capacity(rows.len() * 10);
    for row in rows {
        args.push(Value::Text(row.id.clone()));
        args.push(Value::Text(row.policy_report_id.clone()));
        args.push(Value::Text(row.namespace.clone()));
        args.push(Value::Text(row.kind.clone()));
        args.push(Value::Text(row.policy.clone()));
        args.push(Value::Text(row.result.clone()));
        args.push(Value::Text(row.severity.clone()));
        args.push(Value::Text(row.category.clone()));
        args.push(Value::Text(row.source.clone()));
        args.push(Value::Integer(row.count));
    }

    conn.prepare_cached(&sql)?.execute(params_from_iter(args))?;
    Ok(())
}

fn insert_resources(conn: &Connection, rows: &[ResourceRow]) -> StorageResult<()> {
    let sql = batch_insert_sql(
        "INSERT INTO",
        "policy_report_resource (id, policy_report_id, resource_api_version, \
         resource_kind, resource_name, resource_namespace, resource_uid, source, category, \
         pass, warn, fail, error, skip, info, low, medium, high, critical, unknown)",
        20,
        rows.len(),
        "",
    );

    let mut args = Vec::with_capacity(rows.len() * 20);
    for row in rows {
        args.push(Value::Text(row.id.clone()));
        args.push(Value::Text(row.policy_report_id.clone()));
        args.push(Value::Text(row.resource.api_version.clone()));
        args.push(Value::Text(row.resource.kind.clone()));
        args.push(Value::Text(row.resource.name.clone()));
        args.push(Value::Text(row.resource.namespace.clone()));
        args.push(Value::Text(row.resource.uid.clone()));
        args.push(Value::Text(row.source.clone()));
        args.push(Value::Text(row.category.clone()));
        args.push(Value::Integer(row.pass));
        args.push(Value::Integer(row.warn));
        args.push(Value::Integer(row.fail));
        args.push(Value::Integer(row.error));
        args.push(Value::Integer(row.skip));
        args.push(Value::Integer(row.info));
        args.push(Value::Integer(row.low));
        args.push(Value::Integer(row.medium));
        args.push(Value::Integer(row.high));
        args.push(Value::Integer(row.critical));
        args.push(Value::Integer(row.unknown));
    }

    conn.prepare_cached(&sql)?.execute(params_from_iter(args))?;
    Ok(())
}

fn insert_results(conn: &Connection, dialect: Dialect, rows: &[ResultRow]) -> StorageResult<()> {
    let sql = batch_insert_sql(
        dialect.insert_ignore_prefix(),
        "policy_report_result (id, policy_report_id, resource_id, resource_api_version, \
         resource_kind, resource_name, resource_namespace, resource_uid, policy, rule, \
         message, scored, result, severity, category, source, properties, created)",
        18,
        rows.len(),
        dialect.insert_ignore_suffix(),
    );

    let mut args = Vec::with_capacity(rows.len() * 18);
    for row in rows {
        args.push(Value::Text(row.id.clone()));
        args.push(Value::Text(row.policy_report_id.clone()));
        args.push(Value::Text(row.resource_id.clone()));
        args.push(Value::Text(row.resource.api_version.clone()));
        args.push(Value::Text(row.resource.kind.clone()));
        args.push(Value::Text(row.resource.name.clone()));
        args.push(Value::Text(row.resource.namespace.clone()));
        args.push(Value::Text(row.resource.uid.clone()));
        args.push(Value::Text(row.policy.clone()));
        args.push(Value::Text(row.rule.clone()));
        args.push(Value::Text(row.message.clone()));
        args.push(Value::Integer(row.scored as i64));
        args.push(Value::Text(row.result.clone()));
        args.push(Value::Text(row.severity.clone()));
        args.push(Value::Text(row.category.clone()));
        args.push(Value::Text(row.source.clone()));
        args.push(Value::Text(map_to_json(&row.properties)?));
        args.push(Value::Integer(row.created));
    }

    conn.prepare_cached(&sql)?.execute(params_from_iter(args))?;
    Ok(())
}

fn batch_insert_sql(
    prefix: &str,
    table_and_columns: &str,
    arity: usize,
    rows: usize,
    suffix: &str,
) -> String {
    let tuple = format!("({})", vec!["?"; arity].join(", "));
    let tuples = vec![tuple; rows].join(", ");

    format!("{prefix} {table_and_columns} VALUES {tuples}{suffix}")
}
