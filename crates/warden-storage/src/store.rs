//! PolicyReportStore — concrete `IReportStore` implementation wrapping
//! `ConnectionPool`.
//!
//! Each trait method delegates to free functions in `writer` (writes) or
//! `queries` (reads), routed through the pool. The store itself is
//! stateless; it never opens or closes connections.

use std::collections::BTreeMap;

use tracing::info;

use warden_core::report::{IReport, PolicyReport, ReportType};
use warden_core::views::{
    Findings, ListResult, NamespacedStatusCount, ReportView, ResourceResultView,
    ResourceSeverityCount, ResourceStatusCount, ResourceView, SourceView, StatusCount,
};
use warden_core::{DatabaseConfig, Filter, IReportStore, Pagination, StorageResult};

use crate::dialect::{Dialect, LabelMatcher};
use crate::pool::ConnectionPool;
use crate::queries::{counts, options, reports, resources, results};
use crate::{schema, writer};

pub struct PolicyReportStore {
    pool: ConnectionPool,
    dialect: Dialect,
    matcher: LabelMatcher,
    version: String,
}

impl PolicyReportStore {
    /// Wrap an injected pool. The pool's lifecycle stays with the caller.
    pub fn new(pool: ConnectionPool) -> Self {
        Self {
            pool,
            dialect: Dialect::Sqlite,
            matcher: LabelMatcher::JsonPath,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Open a file-backed store as described by the config.
    pub fn open(config: &DatabaseConfig) -> StorageResult<Self> {
        Ok(Self::new(ConnectionPool::open(config)?))
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> StorageResult<Self> {
        Ok(Self::new(ConnectionPool::open_in_memory()?))
    }

    /// Override the schema version `prepare` compares against.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Abort every in-flight statement on the underlying pool.
    pub fn interrupt(&self) {
        self.pool.interrupt();
    }

    fn filter_options(
        &self,
        column: &'static str,
        filter: &Filter,
        namespaced: Option<bool>,
    ) -> StorageResult<Vec<String>> {
        self.pool.with_reader(|conn| {
            options::fetch_filter_options(
                conn,
                self.dialect,
                self.matcher,
                column,
                filter,
                namespaced,
            )
        })
    }

    fn result_options(
        &self,
        column: &'static str,
        filter: &Filter,
        namespaced: bool,
    ) -> StorageResult<Vec<String>> {
        self.pool.with_reader(|conn| {
            options::fetch_result_options(
                conn,
                self.dialect,
                self.matcher,
                column,
                filter,
                namespaced,
            )
        })
    }
}

impl IReportStore for PolicyReportStore {
    // ── lifecycle ──

    fn prepare(&self) -> StorageResult<()> {
        self.pool.with_writer(|conn| {
            if schema::requires_upgrade(conn, self.dialect, &self.version)? {
                info!(version = %self.version, "rebuilding database schema");
                schema::drop_schema(conn)?;
                schema::create_schema(conn)?;
                schema::persist_version(conn, &self.version)?;
            }

            writer::clean_up(conn)
        })
    }

    fn add(&self, report: &dyn IReport) -> StorageResult<()> {
        self.pool
            .with_writer(|conn| writer::add(conn, self.dialect, report))
    }

    fn update(&self, report: &dyn IReport) -> StorageResult<()> {
        self.pool
            .with_writer(|conn| writer::update(conn, self.dialect, report))
    }

    fn remove(&self, id: &str) -> StorageResult<()> {
        self.pool.with_writer(|conn| writer::remove(conn, id))
    }

    fn clean_up(&self) -> StorageResult<()> {
        self.pool.with_writer(writer::clean_up)
    }

    fn get(&self, id: &str) -> StorageResult<Option<PolicyReport>> {
        self.pool.with_reader(|conn| reports::get_report(conn, id))
    }

    // ── reports ──

    fn fetch_policy_reports(
        &self,
        filter: &Filter,
        pagination: &Pagination,
    ) -> StorageResult<Vec<ReportView>> {
        self.pool.with_reader(|conn| {
            reports::fetch_reports(
                conn,
                self.dialect,
                self.matcher,
                ReportType::Namespaced,
                filter,
                pagination,
            )
        })
    }

    fn count_policy_reports(&self, filter: &Filter) -> StorageResult<i64> {
        self.pool.with_reader(|conn| {
            reports::count_reports(
                conn,
                self.dialect,
                self.matcher,
                ReportType::Namespaced,
                filter,
            )
        })
    }

    fn fetch_cluster_policy_reports(
        &self,
        filter: &Filter,
        pagination: &Pagination,
    ) -> StorageResult<Vec<ReportView>> {
        self.pool.with_reader(|conn| {
            reports::fetch_reports(
                conn,
                self.dialect,
                self.matcher,
                ReportType::Cluster,
                filter,
                pagination,
            )
        })
    }

    fn count_cluster_policy_reports(&self, filter: &Filter) -> StorageResult<i64> {
        self.pool.with_reader(|conn| {
            reports::count_reports(
                conn,
                self.dialect,
                self.matcher,
                ReportType::Cluster,
                filter,
            )
        })
    }

    fn fetch_namespaced_report_labels(
        &self,
        filter: &Filter,
    ) -> StorageResult<BTreeMap<String, Vec<String>>> {
        self.pool.with_reader(|conn| {
            reports::fetch_report_labels(
                conn,
                self.dialect,
                self.matcher,
                ReportType::Namespaced,
                filter,
            )
        })
    }

    fn fetch_cluster_report_labels(
        &self,
        filter: &Filter,
    ) -> StorageResult<BTreeMap<String, Vec<String>>> {
        self.pool.with_reader(|conn| {
            reports::fetch_report_labels(
                conn,
                self.dialect,
                self.matcher,
                ReportType::Cluster,
                filter,
            )
        })
    }

    // ── filter options ──

    fn fetch_namespaces(&self, filter: &Filter) -> StorageResult<Vec<String>> {
        self.filter_options("f.namespace", filter, Some(true))
    }

    fn fetch_namespaced_policies(&self, filter: &Filter) -> StorageResult<Vec<String>> {
        self.filter_options("f.policy", filter, Some(true))
    }

    fn fetch_namespaced_rules(&self, filter: &Filter) -> StorageResult<Vec<String>> {
        self.result_options("r.rule", filter, true)
    }

    fn fetch_namespaced_kinds(&self, filter: &Filter) -> StorageResult<Vec<String>> {
        self.filter_options("f.kind", filter, Some(true))
    }

    fn fetch_namespaced_categories(&self, filter: &Filter) -> StorageResult<Vec<String>> {
        self.filter_options("f.category", filter, Some(true))
    }

    fn fetch_namespaced_sources(&self) -> StorageResult<Vec<String>> {
        self.filter_options("f.source", &Filter::default(), Some(true))
    }

    fn fetch_cluster_policies(&self, filter: &Filter) -> StorageResult<Vec<String>> {
        self.filter_options("f.policy", filter, Some(false))
    }

    fn fetch_cluster_rules(&self, filter: &Filter) -> StorageResult<Vec<String>> {
        self.result_options("r.rule", filter, false)
    }

    fn fetch_cluster_kinds(&self, filter: &Filter) -> StorageResult<Vec<String>> {
        self.filter_options("f.kind", filter, Some(false))
    }

    fn fetch_cluster_categories(&self, filter: &Filter) -> StorageResult<Vec<String>> {
        self.filter_options("f.category", filter, Some(false))
    }

    fn fetch_cluster_sources(&self) -> StorageResult<Vec<String>> {
        self.filter_options("f.source", &Filter::default(), Some(false))
    }

    // ── results ──

    fn fetch_namespaced_results(
        &self,
        filter: &Filter,
        pagination: &Pagination,
    ) -> StorageResult<Vec<ListResult>> {
        self.pool.with_reader(|conn| {
            results::fetch_scoped_results(
                conn,
                self.dialect,
                self.matcher,
                true,
                filter,
                pagination,
            )
        })
    }

    fn count_namespaced_results(&self, filter: &Filter) -> StorageResult<i64> {
        self.pool.with_reader(|conn| {
            results::count_scoped_results(conn, self.dialect, self.matcher, true, filter)
        })
    }

    fn fetch_cluster_results(
        &self,
        filter: &Filter,
        pagination: &Pagination,
    ) -> StorageResult<Vec<ListResult>> {
        self.pool.with_reader(|conn| {
            results::fetch_scoped_results(
                conn,
                self.dialect,
                self.matcher,
                false,
                filter,
                pagination,
            )
        })
    }

    fn count_cluster_results(&self, filter: &Filter) -> StorageResult<i64> {
        self.pool.with_reader(|conn| {
            results::count_scoped_results(conn, self.dialect, self.matcher, false, filter)
        })
    }

    fn fetch_results(
        &self,
        resource_id: &str,
        filter: &Filter,
        pagination: &Pagination,
    ) -> StorageResult<Vec<ListResult>> {
        self.pool.with_reader(|conn| {
            results::fetch_resource_results(
                conn,
                self.dialect,
                self.matcher,
                resource_id,
                filter,
                pagination,
            )
        })
    }

    fn count_results(&self, resource_id: &str, filter: &Filter) -> StorageResult<i64> {
        self.pool.with_reader(|conn| {
            results::count_resource_results(conn, self.dialect, self.matcher, resource_id, filter)
        })
    }

    // ── resources ──

    fn fetch_namespaced_resources(&self, filter: &Filter) -> StorageResult<Vec<ResourceView>> {
        self.pool.with_reader(|conn| {
            resources::fetch_resources(conn, self.dialect, self.matcher, true, filter)
        })
    }

    fn fetch_cluster_resources(&self, filter: &Filter) -> StorageResult<Vec<ResourceView>> {
        self.pool.with_reader(|conn| {
            resources::fetch_resources(conn, self.dialect, self.matcher, false, filter)
        })
    }

    fn fetch_resource(&self, id: &str) -> StorageResult<Option<ResourceView>> {
        self.pool
            .with_reader(|conn| resources::fetch_resource(conn, self.dialect, self.matcher, id))
    }

    fn fetch_namespaced_resource_results(
        &self,
        filter: &Filter,
        pagination: &Pagination,
    ) -> StorageResult<Vec<ResourceResultView>> {
        self.pool.with_reader(|conn| {
            resources::fetch_resource_result_views(
                conn,
                self.dialect,
                self.matcher,
                true,
                filter,
                pagination,
            )
        })
    }

    fn count_namespaced_resource_results(&self, filter: &Filter) -> StorageResult<i64> {
        self.pool.with_reader(|conn| {
            resources::count_resource_result_views(conn, self.dialect, self.matcher, true, filter)
        })
    }

    fn fetch_cluster_resource_results(
        &self,
        filter: &Filter,
        pagination: &Pagination,
    ) -> StorageResult<Vec<ResourceResultView>> {
        self.pool.with_reader(|conn| {
            resources::fetch_resource_result_views(
                conn,
                self.dialect,
                self.matcher,
                false,
                filter,
                pagination,
            )
        })
    }

    fn count_cluster_resource_results(&self, filter: &Filter) -> StorageResult<i64> {
        self.pool.with_reader(|conn| {
            resources::count_resource_result_views(conn, self.dialect, self.matcher, false, filter)
        })
    }

    fn fetch_resource_results(
        &self,
        resource_id: &str,
        filter: &Filter,
    ) -> StorageResult<Vec<ResourceResultView>> {
        self.pool.with_reader(|conn| {
            resources::fetch_per_source_resource_results(
                conn,
                self.dialect,
                self.matcher,
                resource_id,
                filter,
            )
        })
    }

    // ── aggregations ──

    fn fetch_status_counts(&self, filter: &Filter) -> StorageResult<Vec<StatusCount>> {
        self.pool.with_reader(|conn| {
            counts::fetch_status_counts(conn, self.dialect, self.matcher, filter)
        })
    }

    fn fetch_namespaced_status_counts(
        &self,
        filter: &Filter,
    ) -> StorageResult<Vec<NamespacedStatusCount>> {
        self.pool.with_reader(|conn| {
            counts::fetch_namespaced_status_counts(conn, self.dialect, self.matcher, filter)
        })
    }

    fn fetch_rule_status_counts(
        &self,
        policy: &str,
        rule: &str,
    ) -> StorageResult<Vec<StatusCount>> {
        self.pool.with_reader(|conn| {
            counts::fetch_rule_status_counts(conn, self.dialect, self.matcher, policy, rule)
        })
    }

    fn fetch_finding_counts(&self, filter: &Filter) -> StorageResult<Findings> {
        self.pool.with_reader(|conn| {
            counts::fetch_finding_counts(conn, self.dialect, self.matcher, filter)
        })
    }

    fn fetch_sources(&self, resource_id: &str) -> StorageResult<Vec<SourceView>> {
        let narrowed = (!resource_id.is_empty()).then_some(resource_id);
        self.pool.with_reader(|conn| {
            counts::fetch_sources(conn, self.dialect, self.matcher, narrowed)
        })
    }

    fn fetch_resource_status_counts(
        &self,
        resource_id: &str,
        filter: &Filter,
    ) -> StorageResult<Vec<ResourceStatusCount>> {
        self.pool.with_reader(|conn| {
            counts::fetch_resource_status_counts(
                conn,
                self.dialect,
                self.matcher,
                resource_id,
                filter,
            )
        })
    }

    fn fetch_resource_severity_counts(
        &self,
        resource_id: &str,
        filter: &Filter,
    ) -> StorageResult<Vec<ResourceSeverityCount>> {
        self.pool.with_reader(|conn| {
            counts::fetch_resource_severity_counts(
                conn,
                self.dialect,
                self.matcher,
                resource_id,
                filter,
            )
        })
    }
}
