//! `IReportStore` trait — the store façade surface.
//!
//! Declared here so API layers can depend on the contract without pulling in
//! the persistence crate. Reads never have side effects; absence on point
//! lookups is `None`, not an error.

use std::collections::BTreeMap;

use crate::errors::StorageResult;
use crate::filter::{Filter, Pagination};
use crate::report::{IReport, PolicyReport};
use crate::views::{
    Findings, ListResult, NamespacedStatusCount, ReportView, ResourceResultView,
    ResourceSeverityCount, ResourceStatusCount, ResourceView, SourceView, StatusCount,
};

pub trait IReportStore: Send + Sync {
    // ── lifecycle ──

    /// Rebuild the schema when the persisted version requires it, then run
    /// the cleanup pass.
    fn prepare(&self) -> StorageResult<()>;

    /// Persist a report aggregate into all three projections.
    fn add(&self, report: &dyn IReport) -> StorageResult<()>;

    /// Replace a stored report: remove then re-add.
    fn update(&self, report: &dyn IReport) -> StorageResult<()>;

    /// Delete a report; dependent rows cascade.
    fn remove(&self, id: &str) -> StorageResult<()>;

    /// Delete every stored report.
    fn clean_up(&self) -> StorageResult<()>;

    /// Reassemble a stored report aggregate.
    fn get(&self, id: &str) -> StorageResult<Option<PolicyReport>>;

    // ── reports ──

    fn fetch_policy_reports(
        &self,
        filter: &Filter,
        pagination: &Pagination,
    ) -> StorageResult<Vec<ReportView>>;
    fn count_policy_reports(&self, filter: &Filter) -> StorageResult<i64>;
    fn fetch_cluster_policy_reports(
        &self,
        filter: &Filter,
        pagination: &Pagination,
    ) -> StorageResult<Vec<ReportView>>;
    fn count_cluster_policy_reports(&self, filter: &Filter) -> StorageResult<i64>;

    /// Distinct label maps of namespaced reports, folded key -> values.
    fn fetch_namespaced_report_labels(
        &self,
        filter: &Filter,
    ) -> StorageResult<BTreeMap<String, Vec<String>>>;
    /// Distinct label maps of cluster reports, folded key -> values.
    fn fetch_cluster_report_labels(
        &self,
        filter: &Filter,
    ) -> StorageResult<BTreeMap<String, Vec<String>>>;

    // ── filter options ──

    fn fetch_namespaces(&self, filter: &Filter) -> StorageResult<Vec<String>>;
    fn fetch_namespaced_policies(&self, filter: &Filter) -> StorageResult<Vec<String>>;
    fn fetch_namespaced_rules(&self, filter: &Filter) -> StorageResult<Vec<String>>;
    fn fetch_namespaced_kinds(&self, filter: &Filter) -> StorageResult<Vec<String>>;
    fn fetch_namespaced_categories(&self, filter: &Filter) -> StorageResult<Vec<String>>;
    fn fetch_namespaced_sources(&self) -> StorageResult<Vec<String>>;
    fn fetch_cluster_policies(&self, filter: &Filter) -> StorageResult<Vec<String>>;
    fn fetch_cluster_rules(&self, filter: &Filter) -> StorageResult<Vec<String>>;
    fn fetch_cluster_kinds(&self, filter: &Filter) -> StorageResult<Vec<String>>;
    fn fetch_cluster_categories(&self, filter: &Filter) -> StorageResult<Vec<String>>;
    fn fetch_cluster_sources(&self) -> StorageResult<Vec<String>>;

    // ── results ──

    fn fetch_namespaced_results(
        &self,
        filter: &Filter,
        pagination: &Pagination,
    ) -> StorageResult<Vec<ListResult>>;
    fn count_namespaced_results(&self, filter: &Filter) -> StorageResult<i64>;
    fn fetch_cluster_results(
        &self,
        filter: &Filter,
        pagination: &Pagination,
    ) -> StorageResult<Vec<ListResult>>;
    fn count_cluster_results(&self, filter: &Filter) -> StorageResult<i64>;

    /// Results of one resource, any scope.
    fn fetch_results(
        &self,
        resource_id: &str,
        filter: &Filter,
        pagination: &Pagination,
    ) -> StorageResult<Vec<ListResult>>;
    fn count_results(&self, resource_id: &str, filter: &Filter) -> StorageResult<i64>;

    // ── resources ──

    fn fetch_namespaced_resources(&self, filter: &Filter) -> StorageResult<Vec<ResourceView>>;
    fn fetch_cluster_resources(&self, filter: &Filter) -> StorageResult<Vec<ResourceView>>;
    fn fetch_resource(&self, id: &str) -> StorageResult<Option<ResourceView>>;
    fn fetch_namespaced_resource_results(
        &self,
        filter: &Filter,
        pagination: &Pagination,
    ) -> StorageResult<Vec<ResourceResultView>>;
    fn count_namespaced_resource_results(&self, filter: &Filter) -> StorageResult<i64>;
    fn fetch_cluster_resource_results(
        &self,
        filter: &Filter,
        pagination: &Pagination,
    ) -> StorageResult<Vec<ResourceResultView>>;
    fn count_cluster_resource_results(&self, filter: &Filter) -> StorageResult<i64>;
    /// Per-source rollups of one resource, ordered by source.
    fn fetch_resource_results(
        &self,
        resource_id: &str,
        filter: &Filter,
    ) -> StorageResult<Vec<ResourceResultView>>;

    // ── aggregations ──

    fn fetch_status_counts(&self, filter: &Filter) -> StorageResult<Vec<StatusCount>>;
    fn fetch_namespaced_status_counts(
        &self,
        filter: &Filter,
    ) -> StorageResult<Vec<NamespacedStatusCount>>;
    fn fetch_rule_status_counts(&self, policy: &str, rule: &str)
        -> StorageResult<Vec<StatusCount>>;
    fn fetch_finding_counts(&self, filter: &Filter) -> StorageResult<Findings>;
    /// Per-source category rollups; `resource_id` narrows to one resource
    /// when non-empty.
    fn fetch_sources(&self, resource_id: &str) -> StorageResult<Vec<SourceView>>;
    fn fetch_resource_status_counts(
        &self,
        resource_id: &str,
        filter: &Filter,
    ) -> StorageResult<Vec<ResourceStatusCount>>;
    fn fetch_resource_severity_counts(
        &self,
        resource_id: &str,
        filter: &Filter,
    ) -> StorageResult<Vec<ResourceSeverityCount>>;
}
