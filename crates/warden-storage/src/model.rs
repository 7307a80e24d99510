//! Row types for the four report projections and the folds that derive them
//! from an ingested report aggregate.
//!
//! Findings carry partial resource references; every fold resolves them the
//! same way: the finding's own resource wins, then the report scope, then an
//! empty reference with the report namespace.

use std::collections::BTreeMap;

use warden_core::report::{
    hash_id, IReport, ResourceRef, SEVERITY_CRITICAL, SEVERITY_HIGH, SEVERITY_INFO, SEVERITY_LOW,
    SEVERITY_MEDIUM, STATUS_ERROR, STATUS_FAIL, STATUS_PASS, STATUS_SKIP, STATUS_WARN,
};
use warden_core::StorageResult;

/// Rows per insert statement. Bounds parameter counts on bulk ingestion.
pub const INSERT_CHUNK_SIZE: usize = 50;

/// Header row of the report table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportRow {
    pub id: String,
    pub report_type: String,
    pub name: String,
    pub namespace: String,
    pub source: String,
    pub labels: BTreeMap<String, String>,
    pub skip: i64,
    pub pass: i64,
    pub warn: i64,
    pub fail: i64,
    pub error: i64,
    pub created: i64,
}

impl ReportRow {
    pub fn map(report: &dyn IReport) -> Self {
        let summary = report.summary();

        ReportRow {
            id: report.id(),
            report_type: report.report_type().as_str().to_string(),
            name: report.name().to_string(),
            namespace: report.namespace().to_string(),
            source: report.source(),
            labels: report.labels().clone(),
            skip: summary.skip,
            pass: summary.pass,
            warn: summary.warn,
            fail: summary.fail,
            error: summary.error,
            created: report.created(),
        }
    }
}

/// One finding, flattened for the result table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultRow {
    pub id: String,
    pub policy_report_id: String,
    pub resource_id: String,
    pub resource: ResourceRef,
    pub policy: String,
    pub rule: String,
    pub message: String,
    pub scored: bool,
    pub result: String,
    pub severity: String,
    pub category: String,
    pub source: String,
    pub properties: BTreeMap<String, String>,
    pub created: i64,
}

impl ResultRow {
    pub fn map_all(report: &dyn IReport) -> Vec<Self> {
        let report_id = report.id();

        report
            .results()
            .iter()
            .map(|finding| {
                let mut resource = finding
                    .resource
                    .clone()
                    .filter(|res| !res.is_empty())
                    .or_else(|| report.scope().cloned())
                    .unwrap_or_default();
                if resource.namespace.is_empty() {
                    resource.namespace = report.namespace().to_string();
                }

                ResultRow {
                    id: finding.resolved_id(),
                    policy_report_id: report_id.clone(),
                    resource_id: resource.id(),
                    resource,
                    policy: finding.policy.clone(),
                    rule: finding.rule.clone(),
                    message: finding.message.clone(),
                    scored: finding.scored,
                    result: finding.result.clone(),
                    severity: finding.severity.clone(),
                    category: finding.category.clone(),
                    source: finding.source.clone(),
                    properties: finding.properties.clone(),
                    created: finding.timestamp,
                }
            })
            .collect()
    }
}

/// Pre-aggregated count row keyed by its identity hash.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterRow {
    pub id: String,
    pub policy_report_id: String,
    pub namespace: String,
    pub kind: String,
    pub policy: String,
    pub result: String,
    pub severity: String,
    pub category: String,
    pub source: String,
    pub count: i64,
}

impl FilterRow {
    /// Identity over every dimension of the row. Equal findings map onto the
    /// same row and bump its count instead.
    pub fn hash(&self) -> String {
        hash_id(&[
            &self.policy_report_id,
            &self.namespace,
            &self.source,
            &self.kind,
            &self.category,
            &self.policy,
            &self.severity,
            &self.result,
        ])
    }

    pub fn map_all(report: &dyn IReport) -> Vec<Self> {
        let report_id = report.id();
        let mut mapping: BTreeMap<String, FilterRow> = BTreeMap::new();

        for finding in report.results() {
            let mut kind = finding.kind().to_string();
            if kind.is_empty() {
                if let Some(scope) = report.scope() {
                    kind = scope.kind.clone();
                }
            }

            let mut row = FilterRow {
                id: String::new(),
                policy_report_id: report_id.clone(),
                namespace: report.namespace().to_string(),
                kind,
                policy: finding.policy.clone(),
                result: finding.result.clone(),
                severity: finding.severity.clone(),
                category: finding.category.clone(),
                source: finding.source.clone(),
                count: 1,
            };
            row.id = row.hash();

            mapping
                .entry(row.id.clone())
                .and_modify(|existing| existing.count += 1)
                .or_insert(row);
        }

        mapping.into_values().collect()
    }
}

/// Per-resource rollup row with status and severity counters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceRow {
    pub id: String,
    pub policy_report_id: String,
    pub resource: ResourceRef,
    pub source: String,
    pub category: String,
    pub pass: i64,
    pub warn: i64,
    pub fail: i64,
    pub error: i64,
    pub skip: i64,
    pub info: i64,
    pub low: i64,
    pub medium: i64,
    pub high: i64,
    pub critical: i64,
    pub unknown: i64,
}

impl ResourceRow {
    pub fn map_all(report: &dyn IReport) -> Vec<Self> {
        let report_id = report.id();
        let mut mapping: BTreeMap<String, ResourceRow> = BTreeMap::new();

        for finding in report.results() {
            let resource = if finding.has_resource() {
                finding.resource.clone()
            } else {
                report.scope().cloned()
            };
            let Some(resource) = resource else {
                continue;
            };

            let resource_id = resource.id();
            let key = format!("{resource_id}{}{report_id}", finding.category);

            let row = mapping.entry(key).or_insert_with(|| ResourceRow {
                id: resource_id,
                policy_report_id: report_id.clone(),
                resource,
                source: finding.source.clone(),
                category: finding.category.clone(),
                ..ResourceRow::default()
            });

            match finding.result.as_str() {
                STATUS_PASS => row.pass += 1,
                STATUS_WARN => row.warn += 1,
                STATUS_FAIL => row.fail += 1,
                STATUS_ERROR => row.error += 1,
                STATUS_SKIP => row.skip += 1,
                _ => {}
            }

            match finding.severity.as_str() {
                SEVERITY_INFO => row.info += 1,
                SEVERITY_LOW => row.low += 1,
                SEVERITY_MEDIUM => row.medium += 1,
                SEVERITY_HIGH => row.high += 1,
                SEVERITY_CRITICAL => row.critical += 1,
                _ => row.unknown += 1,
            }
        }

        mapping.into_values().collect()
    }
}

/// Serialize a label or property map for a JSON text column.
pub fn map_to_json(map: &BTreeMap<String, String>) -> StorageResult<String> {
    Ok(serde_json::to_string(map)?)
}

/// Parse a JSON text column back into a map. Empty or malformed content
/// yields an empty map.
pub fn json_to_map(raw: &str) -> BTreeMap<String, String> {
    if raw.is_empty() {
        return BTreeMap::new();
    }

    serde_json::from_str(raw).unwrap_or_default()
}
