//! Report aggregate, ingestion contract, and deterministic ids.
//!
//! A `PolicyReport` is the aggregate root delivered by the external watcher;
//! the store only ever sees it through the [`IReport`] contract. Ids are
//! content-derived so that re-delivery of the same report maps onto the same
//! rows.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Property key carrying an externally assigned finding id.
pub const RESULT_ID_PROPERTY: &str = "resultID";

pub const STATUS_PASS: &str = "pass";
pub const STATUS_FAIL: &str = "fail";
pub const STATUS_WARN: &str = "warn";
pub const STATUS_ERROR: &str = "error";
pub const STATUS_SKIP: &str = "skip";

/// Every status a finding can carry, in response-shape order.
pub const ALL_STATUSES: [&str; 5] = [
    STATUS_PASS,
    STATUS_FAIL,
    STATUS_WARN,
    STATUS_ERROR,
    STATUS_SKIP,
];

pub const SEVERITY_INFO: &str = "info";
pub const SEVERITY_LOW: &str = "low";
pub const SEVERITY_MEDIUM: &str = "medium";
pub const SEVERITY_HIGH: &str = "high";
pub const SEVERITY_CRITICAL: &str = "critical";

/// Deterministic 64-bit id over the given parts, rendered as a decimal
/// string. Parts are length-prefixed so ("ab","c") and ("a","bc") differ.
pub fn hash_id(parts: &[&str]) -> String {
    let mut hasher = blake3::Hasher::new();
    for part in parts {
        hasher.update(&(part.len() as u64).to_le_bytes());
        hasher.update(part.as_bytes());
    }
    let digest = hasher.finalize();
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&digest.as_bytes()[..8]);
    u64::from_le_bytes(buf).to_string()
}

/// Scope of a report: namespaced reports carry a namespace, cluster reports
/// do not. The partition is exhaustive and disjoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    Namespaced,
    Cluster,
}

impl ReportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::Namespaced => "namespaced",
            ReportType::Cluster => "cluster",
        }
    }

    pub fn from_namespace(namespace: &str) -> Self {
        if namespace.is_empty() {
            ReportType::Cluster
        } else {
            ReportType::Namespaced
        }
    }

    /// Parse a persisted type column; anything unrecognized is namespaced.
    pub fn parse(value: &str) -> Self {
        if value == "cluster" {
            ReportType::Cluster
        } else {
            ReportType::Namespaced
        }
    }
}

/// Reference to the Kubernetes object a finding was evaluated against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceRef {
    pub api_version: String,
    pub kind: String,
    pub name: String,
    pub namespace: String,
    pub uid: String,
}

impl ResourceRef {
    /// Deterministic resource identity over namespace/name/kind/apiVersion.
    pub fn id(&self) -> String {
        hash_id(&[&self.namespace, &self.name, &self.kind, &self.api_version])
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.kind.is_empty() && self.uid.is_empty()
    }
}

/// Aggregated result counts reported by the source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Summary {
    pub pass: i64,
    pub skip: i64,
    pub warn: i64,
    pub fail: i64,
    pub error: i64,
}

/// One policy-rule evaluation outcome against one resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Finding {
    /// Externally assigned id; empty means derive one.
    pub id: String,
    pub policy: String,
    pub rule: String,
    pub message: String,
    /// One of pass/fail/warn/error/skip.
    pub result: String,
    pub severity: String,
    pub category: String,
    pub source: String,
    pub scored: bool,
    pub resource: Option<ResourceRef>,
    pub properties: BTreeMap<String, String>,
    /// Epoch seconds of the evaluation.
    pub timestamp: i64,
}

impl Finding {
    /// Stable finding id: an explicit `resultID` property wins, then the
    /// assigned id, then a hash over the identifying fields.
    pub fn resolved_id(&self) -> String {
        if let Some(id) = self.properties.get(RESULT_ID_PROPERTY) {
            return id.clone();
        }
        if !self.id.is_empty() {
            return self.id.clone();
        }

        let resource_id = self
            .resource
            .as_ref()
            .map(ResourceRef::id)
            .unwrap_or_default();
        hash_id(&[
            &resource_id,
            &self.policy,
            &self.rule,
            &self.category,
            &self.result,
            &self.message,
        ])
    }

    pub fn has_resource(&self) -> bool {
        matches!(&self.resource, Some(res) if !res.is_empty())
    }

    /// Kind of the finding's own resource; empty when none is attached.
    pub fn kind(&self) -> &str {
        match &self.resource {
            Some(res) => &res.kind,
            None => "",
        }
    }
}

/// Ingestion contract supplied by the upstream watcher.
pub trait IReport: Send + Sync {
    fn id(&self) -> String;
    fn name(&self) -> &str;
    fn namespace(&self) -> &str;
    fn labels(&self) -> &BTreeMap<String, String>;
    fn summary(&self) -> Summary;
    fn results(&self) -> &[Finding];
    fn scope(&self) -> Option<&ResourceRef>;
    /// Creation time in epoch seconds.
    fn created(&self) -> i64;

    fn report_type(&self) -> ReportType {
        ReportType::from_namespace(self.namespace())
    }

    /// Source engine of the report, taken from its first finding.
    fn source(&self) -> String {
        self.results()
            .first()
            .map(|r| r.source.clone())
            .unwrap_or_default()
    }
}

/// Concrete report aggregate; also what `get` reassembles from rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyReport {
    pub name: String,
    pub namespace: String,
    pub labels: BTreeMap<String, String>,
    pub summary: Summary,
    pub results: Vec<Finding>,
    pub scope: Option<ResourceRef>,
    pub created: i64,
}

impl PolicyReport {
    /// New empty aggregate stamped with the current time.
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        PolicyReport {
            name: name.into(),
            namespace: namespace.into(),
            created: chrono::Utc::now().timestamp(),
            ..PolicyReport::default()
        }
    }
}

impl IReport for PolicyReport {
    fn id(&self) -> String {
        let scope_id = self.scope.as_ref().map(ResourceRef::id).unwrap_or_default();
        hash_id(&[&self.namespace, &self.name, &scope_id])
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn labels(&self) -> &BTreeMap<String, String> {
        &self.labels
    }

    fn summary(&self) -> Summary {
        self.summary
    }

    fn results(&self) -> &[Finding] {
        &self.results
    }

    fn scope(&self) -> Option<&ResourceRef> {
        self.scope.as_ref()
    }

    fn created(&self) -> i64 {
        self.created
    }
}
