//! Typed read models returned by the store's fetch operations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::report::ReportType;

/// Report header as listed by the report endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportView {
    pub id: String,
    #[serde(rename = "type")]
    pub report_type: ReportType,
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    pub source: String,
    pub labels: BTreeMap<String, String>,
    pub pass: i64,
    pub skip: i64,
    pub warn: i64,
    pub fail: i64,
    pub error: i64,
    pub created: i64,
}

/// Flattened result row for list endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListResult {
    pub id: String,
    pub namespace: String,
    pub kind: String,
    pub api_version: String,
    pub name: String,
    pub message: String,
    pub policy: String,
    pub rule: String,
    pub status: String,
    pub severity: String,
    pub category: String,
    pub properties: BTreeMap<String, String>,
    pub timestamp: i64,
}

/// Distinct resource identity as listed by the resource endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceView {
    pub id: String,
    pub uid: String,
    pub api_version: String,
    pub kind: String,
    pub name: String,
    pub namespace: String,
}

/// Per-resource status rollup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceResultView {
    pub id: String,
    pub uid: String,
    pub api_version: String,
    pub kind: String,
    pub name: String,
    pub namespace: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub source: String,
    pub pass: i64,
    pub warn: i64,
    pub fail: i64,
    pub error: i64,
    pub skip: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceCount {
    pub namespace: String,
    pub count: i64,
}

/// One status with its per-namespace breakdown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespacedStatusCount {
    pub status: String,
    pub items: Vec<NamespaceCount>,
}

/// Category rollup inside a source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryView {
    pub name: String,
    pub pass: i64,
    pub warn: i64,
    pub fail: i64,
    pub error: i64,
    pub skip: i64,
}

/// Source with its category rollups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceView {
    pub name: String,
    pub categories: Vec<CategoryView>,
}

/// Per-source finding totals keyed by status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindingCounts {
    pub source: String,
    pub total: i64,
    pub counts: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Findings {
    pub total: i64,
    pub counts: Vec<FindingCounts>,
}

/// Per-source status sums for a single resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceStatusCount {
    pub source: String,
    pub pass: i64,
    pub warn: i64,
    pub fail: i64,
    pub error: i64,
    pub skip: i64,
}

/// Per-source severity sums for a single resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceSeverityCount {
    pub source: String,
    pub info: i64,
    pub low: i64,
    pub medium: i64,
    pub high: i64,
    pub critical: i64,
    pub unknown: i64,
}
