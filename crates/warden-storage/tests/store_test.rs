//! End-to-end tests for `PolicyReportStore` against an in-memory database.
//!
//! The fixture set mirrors a small cluster: one namespaced report that gets
//! updated once, one cluster report, and one report carrying only a scope
//! resource. Every read operation of the store surface is exercised against
//! that state.

use std::collections::BTreeMap;

use warden_core::report::{Finding, PolicyReport, ResourceRef};
use warden_core::{DatabaseConfig, Direction, Filter, IReport, IReportStore, Pagination, Summary};
use warden_storage::PolicyReportStore;

const CREATED: i64 = 1714000000;

fn deployment_ref() -> ResourceRef {
    ResourceRef {
        api_version: "v1".into(),
        kind: "Deployment".into(),
        name: "nginx".into(),
        namespace: "test".into(),
        uid: "536ab69f-1b3c-4bd9-9ba4-274a56188409".into(),
    }
}

fn fail_result() -> Finding {
    Finding {
        id: "123".into(),
        policy: "require-requests-and-limits-required".into(),
        rule: "autogen-check-for-requests-and-limits".into(),
        message: "validation error: requests and limits required".into(),
        result: "fail".into(),
        severity: "high".into(),
        category: "resources".into(),
        source: "Kyverno".into(),
        scored: true,
        resource: Some(deployment_ref()),
        ..Finding::default()
    }
}

fn pass_pod_result() -> Finding {
    Finding {
        id: "124".into(),
        policy: "require-requests-and-limits-required".into(),
        rule: "autogen-check-for-requests-and-limits".into(),
        message: "validation error: requests and limits required".into(),
        result: "pass".into(),
        category: "Best Practices".into(),
        source: "Kyverno".into(),
        scored: true,
        resource: Some(ResourceRef {
            api_version: "v1".into(),
            kind: "Pod".into(),
            name: "nginx".into(),
            namespace: "test".into(),
            uid: "536ab69f-1b3c-4bd9-9ba4-274a56188419".into(),
        }),
        ..Finding::default()
    }
}

fn pass_namespace_result() -> Finding {
    Finding {
        id: "125".into(),
        policy: "require-ns-labels".into(),
        rule: "check-for-labels-on-namespace".into(),
        message: "validation error: the label `test` is required".into(),
        result: "pass".into(),
        severity: "medium".into(),
        category: "namespaces".into(),
        source: "Kyverno".into(),
        scored: true,
        resource: Some(ResourceRef {
            api_version: "v1".into(),
            kind: "Namespace".into(),
            name: "test".into(),
            uid: "536ab69f-1b3c-4bd9-9ba4-274a56188411".into(),
            ..ResourceRef::default()
        }),
        ..Finding::default()
    }
}

fn fail_namespace_result() -> Finding {
    Finding {
        id: "126".into(),
        policy: "require-ns-labels".into(),
        rule: "check-for-labels-on-namespace".into(),
        message: "validation error: the label `test` is required".into(),
        result: "fail".into(),
        severity: "high".into(),
        category: "namespaces".into(),
        source: "Kyverno".into(),
        scored: true,
        resource: Some(ResourceRef {
            api_version: "v1".into(),
            kind: "Namespace".into(),
            name: "dev".into(),
            uid: "536ab69f-1b3c-4bd9-9ba4-274a56188412".into(),
            ..ResourceRef::default()
        }),
        ..Finding::default()
    }
}

fn scope_result() -> Finding {
    Finding {
        policy: "require-requests-and-limits-required".into(),
        rule: "autogen-check-for-requests-and-limits".into(),
        message: "validation error: requests and limits required".into(),
        result: "fail".into(),
        severity: "high".into(),
        category: "resources".into(),
        source: "Kyverno".into(),
        scored: true,
        ..Finding::default()
    }
}

fn preport() -> PolicyReport {
    PolicyReport {
        name: "polr-test".into(),
        namespace: "test".into(),
        labels: BTreeMap::from([
            ("app".to_string(), "policy-reporter".to_string()),
            ("scope".to_string(), "namespaced".to_string()),
        ]),
        results: vec![fail_result()],
        summary: Summary {
            fail: 1,
            ..Summary::default()
        },
        created: CREATED,
        ..PolicyReport::default()
    }
}

fn ureport() -> PolicyReport {
    PolicyReport {
        name: "polr-test".into(),
        namespace: "test".into(),
        labels: BTreeMap::from([
            ("app".to_string(), "policy-reporter".to_string()),
            ("owner".to_string(), "team-a".to_string()),
            ("scope".to_string(), "namespaced".to_string()),
        ]),
        results: vec![fail_result(), pass_pod_result()],
        summary: Summary {
            fail: 1,
            pass: 1,
            ..Summary::default()
        },
        created: CREATED,
        ..PolicyReport::default()
    }
}

fn creport() -> PolicyReport {
    PolicyReport {
        name: "cpolr".into(),
        labels: BTreeMap::from([
            ("app".to_string(), "policy-reporter".to_string()),
            ("scope".to_string(), "cluster".to_string()),
        ]),
        results: vec![pass_namespace_result(), fail_namespace_result()],
        summary: Summary {
            pass: 1,
            fail: 1,
            ..Summary::default()
        },
        created: CREATED,
        ..PolicyReport::default()
    }
}

fn scope_report() -> PolicyReport {
    PolicyReport {
        name: "polr-scope-test".into(),
        namespace: "test".into(),
        results: vec![scope_result()],
        summary: Summary {
            fail: 1,
            ..Summary::default()
        },
        scope: Some(deployment_ref()),
        created: CREATED,
        ..PolicyReport::default()
    }
}

fn empty_store() -> PolicyReportStore {
    let store = PolicyReportStore::open_in_memory().expect("open in-memory store");
    store.prepare().expect("prepare store");
    store
}

/// The canonical state: `preport` added then replaced by `ureport`, plus the
/// cluster report and the scope-only report.
fn seeded_store() -> PolicyReportStore {
    let store = empty_store();
    store.add(&preport()).expect("add namespaced report");
    store.update(&ureport()).expect("update namespaced report");
    store.add(&creport()).expect("add cluster report");
    store.add(&scope_report()).expect("add scope report");
    store
}

fn sorted_by(columns: &[&str]) -> Pagination {
    Pagination::new(
        1,
        20,
        columns.iter().map(|c| c.to_string()).collect(),
        Direction::Asc,
    )
}

// ── lifecycle ──

#[test]
fn get_on_empty_store_returns_none() {
    let store = empty_store();

    let report = store.get(&preport().id()).expect("get");
    assert!(report.is_none());
}

#[test]
fn add_then_get_reassembles_the_report() {
    let store = empty_store();
    store.add(&preport()).expect("add report");

    let report = store
        .get(&preport().id())
        .expect("get")
        .expect("report found");
    assert_eq!(report.name, "polr-test");
    assert_eq!(report.namespace, "test");
    assert_eq!(report.summary.fail, 1);
    assert_eq!(report.labels["app"], "policy-reporter");
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].policy, "require-requests-and-limits-required");
    assert_eq!(
        report.results[0].resource.as_ref().map(|r| r.kind.as_str()),
        Some("Deployment")
    );
}

#[test]
fn update_fully_replaces_previous_results() {
    let store = empty_store();
    store.add(&preport()).expect("add report");
    store.update(&ureport()).expect("update report");

    let report = store
        .get(&ureport().id())
        .expect("get")
        .expect("report found");
    assert_eq!(report.summary.pass, 1);
    assert_eq!(report.results.len(), 2);
    assert_eq!(report.labels["owner"], "team-a");
}

#[test]
fn adding_an_unchanged_report_surfaces_a_constraint_violation() {
    let store = empty_store();
    store.add(&preport()).expect("first add");

    let second = store.add(&preport());
    assert!(matches!(
        second,
        Err(warden_core::StorageError::ConstraintViolation { .. })
    ));

    // The projections stay intact; convergence goes through `update`.
    assert_eq!(store.count_policy_reports(&Filter::default()).unwrap(), 1);
    assert_eq!(store.count_namespaced_results(&Filter::default()).unwrap(), 1);
}

#[test]
fn remove_deletes_the_report_and_its_rows() {
    let store = seeded_store();
    store.remove(&ureport().id()).expect("remove report");

    assert!(store.get(&ureport().id()).expect("get").is_none());
    assert_eq!(store.count_policy_reports(&Filter::default()).unwrap(), 1);
    assert_eq!(store.count_cluster_policy_reports(&Filter::default()).unwrap(), 1);
}

#[test]
fn clean_up_removes_every_report() {
    let store = seeded_store();
    store.clean_up().expect("clean up");

    assert_eq!(store.count_policy_reports(&Filter::default()).unwrap(), 0);
    assert_eq!(store.count_cluster_policy_reports(&Filter::default()).unwrap(), 0);
    assert_eq!(store.count_namespaced_results(&Filter::default()).unwrap(), 0);
}

// ── report listings ──

#[test]
fn report_listings_split_by_scope() {
    let store = seeded_store();

    let namespaced = store
        .fetch_policy_reports(&Filter::default(), &sorted_by(&["name"]))
        .expect("fetch namespaced reports");
    let names: Vec<_> = namespaced.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["polr-scope-test", "polr-test"]);
    assert_eq!(store.count_policy_reports(&Filter::default()).unwrap(), 2);

    let cluster = store
        .fetch_cluster_policy_reports(&Filter::default(), &Pagination::default())
        .expect("fetch cluster reports");
    assert_eq!(cluster.len(), 1);
    assert_eq!(cluster[0].name, "cpolr");
    assert_eq!(cluster[0].pass, 1);
    assert_eq!(cluster[0].fail, 1);
    assert_eq!(cluster[0].labels["scope"], "cluster");
}

#[test]
fn report_label_filter_narrows_listings() {
    let store = seeded_store();
    let filter = Filter {
        report_label: BTreeMap::from([("owner".to_string(), "team-a".to_string())]),
        ..Filter::default()
    };

    let reports = store
        .fetch_policy_reports(&filter, &Pagination::default())
        .expect("fetch reports");
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].name, "polr-test");

    let missing = Filter {
        report_label: BTreeMap::from([("owner".to_string(), "team-b".to_string())]),
        ..Filter::default()
    };
    assert_eq!(store.count_policy_reports(&missing).unwrap(), 0);
}

#[test]
fn report_labels_fold_into_unique_values() {
    let store = seeded_store();

    let labels = store
        .fetch_namespaced_report_labels(&Filter::default())
        .expect("namespaced labels");
    assert_eq!(labels["app"], vec!["policy-reporter".to_string()]);
    assert_eq!(labels["owner"], vec!["team-a".to_string()]);
    assert_eq!(labels["scope"], vec!["namespaced".to_string()]);

    let cluster = store
        .fetch_cluster_report_labels(&Filter::default())
        .expect("cluster labels");
    assert_eq!(cluster["scope"], vec!["cluster".to_string()]);
}

// ── filter options ──

#[test]
fn namespaces_list_only_namespaced_rows() {
    let store = seeded_store();

    let namespaces = store.fetch_namespaces(&Filter::default()).expect("namespaces");
    assert_eq!(namespaces, vec!["test".to_string()]);
}

#[test]
fn kind_options_split_by_scope() {
    let store = seeded_store();

    let namespaced = store
        .fetch_namespaced_kinds(&Filter::default())
        .expect("namespaced kinds");
    assert_eq!(namespaced, vec!["Deployment".to_string(), "Pod".to_string()]);

    let cluster = store
        .fetch_cluster_kinds(&Filter::default())
        .expect("cluster kinds");
    assert_eq!(cluster, vec!["Namespace".to_string()]);
}

#[test]
fn policy_and_category_options_split_by_scope() {
    let store = seeded_store();

    assert_eq!(
        store.fetch_namespaced_policies(&Filter::default()).unwrap(),
        vec!["require-requests-and-limits-required".to_string()]
    );
    assert_eq!(
        store.fetch_cluster_policies(&Filter::default()).unwrap(),
        vec!["require-ns-labels".to_string()]
    );
    assert_eq!(
        store.fetch_namespaced_categories(&Filter::default()).unwrap(),
        vec!["Best Practices".to_string(), "resources".to_string()]
    );
    assert_eq!(
        store.fetch_cluster_categories(&Filter::default()).unwrap(),
        vec!["namespaces".to_string()]
    );
}

#[test]
fn source_and_rule_options_split_by_scope() {
    let store = seeded_store();

    assert_eq!(
        store.fetch_namespaced_sources().unwrap(),
        vec!["Kyverno".to_string()]
    );
    assert_eq!(
        store.fetch_cluster_sources().unwrap(),
        vec!["Kyverno".to_string()]
    );
    assert_eq!(
        store.fetch_namespaced_rules(&Filter::default()).unwrap(),
        vec!["autogen-check-for-requests-and-limits".to_string()]
    );
    assert_eq!(
        store.fetch_cluster_rules(&Filter::default()).unwrap(),
        vec!["check-for-labels-on-namespace".to_string()]
    );
}

// ── result listings ──

#[test]
fn namespaced_results_list_and_count() {
    let store = seeded_store();

    let results = store
        .fetch_namespaced_results(&Filter::default(), &sorted_by(&["resource_name"]))
        .expect("namespaced results");
    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|r| r.namespace == "test"));

    assert_eq!(store.count_namespaced_results(&Filter::default()).unwrap(), 3);
    assert_eq!(store.count_cluster_results(&Filter::default()).unwrap(), 2);
}

#[test]
fn status_and_severity_filters_narrow_results() {
    let store = seeded_store();

    let passing = Filter {
        status: vec!["pass".to_string()],
        ..Filter::default()
    };
    assert_eq!(store.count_namespaced_results(&passing).unwrap(), 1);

    let high = Filter {
        severities: vec!["high".to_string()],
        ..Filter::default()
    };
    assert_eq!(store.count_namespaced_results(&high).unwrap(), 2);
}

#[test]
fn search_matches_names_and_exact_kinds() {
    let store = seeded_store();

    let by_name = Filter {
        search: "nginx".to_string(),
        ..Filter::default()
    };
    assert_eq!(store.count_namespaced_results(&by_name).unwrap(), 3);

    let by_kind = Filter {
        search: "deployment".to_string(),
        ..Filter::default()
    };
    assert_eq!(store.count_namespaced_results(&by_kind).unwrap(), 2);

    let nothing = Filter {
        search: "no-such-resource".to_string(),
        ..Filter::default()
    };
    assert_eq!(store.count_namespaced_results(&nothing).unwrap(), 0);
}

#[test]
fn kind_exclusions_drop_sources_kinds() {
    let store = seeded_store();

    let excluded = Filter {
        exclude: BTreeMap::from([("Kyverno".to_string(), vec!["Pod".to_string()])]),
        ..Filter::default()
    };
    assert_eq!(store.count_namespaced_results(&excluded).unwrap(), 2);
}

#[test]
fn explicit_kind_filter_overrides_exclusions() {
    let store = seeded_store();

    let filter = Filter {
        exclude: BTreeMap::from([("Kyverno".to_string(), vec!["Pod".to_string()])]),
        kinds: vec!["Pod".to_string()],
        ..Filter::default()
    };
    assert_eq!(store.count_namespaced_results(&filter).unwrap(), 1);
}

#[test]
fn results_of_one_resource_span_reports() {
    let store = seeded_store();
    let resource_id = deployment_ref().id();

    // The updated report and the scope report both hit the deployment.
    let results = store
        .fetch_results(&resource_id, &Filter::default(), &Pagination::default())
        .expect("resource results");
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.kind == "Deployment"));

    assert_eq!(
        store.count_results(&resource_id, &Filter::default()).unwrap(),
        2
    );
}

// ── resource listings ──

#[test]
fn resource_listings_split_by_scope() {
    let store = seeded_store();

    let namespaced = store
        .fetch_namespaced_resources(&Filter::default())
        .expect("namespaced resources");
    let pairs: Vec<_> = namespaced
        .iter()
        .map(|r| (r.kind.as_str(), r.name.as_str()))
        .collect();
    assert_eq!(pairs, vec![("Deployment", "nginx"), ("Pod", "nginx")]);

    let cluster = store
        .fetch_cluster_resources(&Filter::default())
        .expect("cluster resources");
    let pairs: Vec<_> = cluster
        .iter()
        .map(|r| (r.kind.as_str(), r.name.as_str()))
        .collect();
    assert_eq!(pairs, vec![("Namespace", "dev"), ("Namespace", "test")]);
}

#[test]
fn fetch_resource_returns_the_full_identity() {
    let store = seeded_store();

    let resource = store
        .fetch_resource(&deployment_ref().id())
        .expect("fetch resource")
        .expect("resource found");
    assert_eq!(resource.kind, "Deployment");
    assert_eq!(resource.name, "nginx");
    assert_eq!(resource.uid, "536ab69f-1b3c-4bd9-9ba4-274a56188409");

    assert!(store.fetch_resource("missing").expect("fetch").is_none());
}

#[test]
fn resource_results_sum_across_reports() {
    let store = seeded_store();

    let views = store
        .fetch_namespaced_resource_results(&Filter::default(), &Pagination::default())
        .expect("resource results");
    assert_eq!(views.len(), 2);

    let deployment = views
        .iter()
        .find(|v| v.kind == "Deployment")
        .expect("deployment view");
    assert_eq!(deployment.fail, 2);
    assert_eq!(deployment.pass, 0);

    let pod = views.iter().find(|v| v.kind == "Pod").expect("pod view");
    assert_eq!(pod.pass, 1);

    assert_eq!(
        store
            .count_namespaced_resource_results(&Filter::default())
            .unwrap(),
        2
    );
    assert_eq!(
        store
            .count_cluster_resource_results(&Filter::default())
            .unwrap(),
        2
    );
}

#[test]
fn per_source_resource_results_carry_the_source() {
    let store = seeded_store();

    let views = store
        .fetch_resource_results(&deployment_ref().id(), &Filter::default())
        .expect("per-source resource results");
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].source, "Kyverno");
    assert_eq!(views[0].fail, 2);
}

// ── aggregations ──

#[test]
fn cluster_status_counts_are_zero_seeded() {
    let store = seeded_store();

    let counts = store
        .fetch_status_counts(&Filter::default())
        .expect("status counts");
    assert_eq!(counts.len(), 5);

    let by_status: BTreeMap<_, _> = counts
        .iter()
        .map(|c| (c.status.as_str(), c.count))
        .collect();
    assert_eq!(by_status["pass"], 1);
    assert_eq!(by_status["fail"], 1);
    assert_eq!(by_status["warn"], 0);
}

#[test]
fn namespaced_status_counts_break_down_by_namespace() {
    let store = seeded_store();

    let counts = store
        .fetch_namespaced_status_counts(&Filter::default())
        .expect("namespaced status counts");
    assert_eq!(counts.len(), 5);

    let fail = counts
        .iter()
        .find(|c| c.status == "fail")
        .expect("fail entry");
    assert_eq!(fail.items.len(), 1);
    assert_eq!(fail.items[0].namespace, "test");
    assert_eq!(fail.items[0].count, 2);

    let warn = counts
        .iter()
        .find(|c| c.status == "warn")
        .expect("warn entry");
    assert!(warn.items.is_empty());
}

#[test]
fn rule_status_counts_cover_every_status() {
    let store = seeded_store();

    let counts = store
        .fetch_rule_status_counts(
            "require-requests-and-limits-required",
            "autogen-check-for-requests-and-limits",
        )
        .expect("rule status counts");
    assert_eq!(counts.len(), 5);

    let by_status: BTreeMap<_, _> = counts
        .iter()
        .map(|c| (c.status.as_str(), c.count))
        .collect();
    assert_eq!(by_status["fail"], 2);
    assert_eq!(by_status["pass"], 1);
    assert_eq!(by_status["skip"], 0);
}

#[test]
fn finding_counts_total_scored_statuses() {
    let store = seeded_store();

    let findings = store
        .fetch_finding_counts(&Filter::default())
        .expect("finding counts");
    assert_eq!(findings.total, 5);
    assert_eq!(findings.counts.len(), 1);
    assert_eq!(findings.counts[0].source, "Kyverno");
    assert_eq!(findings.counts[0].counts["fail"], 3);
    assert_eq!(findings.counts[0].counts["pass"], 2);
}

#[test]
fn sources_group_category_rollups() {
    let store = seeded_store();

    let sources = store.fetch_sources("").expect("sources");
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0].name, "Kyverno");

    let categories: Vec<_> = sources[0]
        .categories
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(categories, vec!["Best Practices", "namespaces", "resources"]);

    let narrowed = store
        .fetch_sources(&deployment_ref().id())
        .expect("narrowed sources");
    assert_eq!(narrowed.len(), 1);
    assert_eq!(narrowed[0].categories.len(), 1);
    assert_eq!(narrowed[0].categories[0].name, "resources");
    assert_eq!(narrowed[0].categories[0].fail, 2);
}

#[test]
fn resource_status_and_severity_counts() {
    let store = seeded_store();
    let resource_id = deployment_ref().id();

    let statuses = store
        .fetch_resource_status_counts(&resource_id, &Filter::default())
        .expect("resource status counts");
    assert_eq!(statuses.len(), 1);
    assert_eq!(statuses[0].source, "Kyverno");
    assert_eq!(statuses[0].fail, 2);
    assert_eq!(statuses[0].pass, 0);

    let severities = store
        .fetch_resource_severity_counts(&resource_id, &Filter::default())
        .expect("resource severity counts");
    assert_eq!(severities.len(), 1);
    assert_eq!(severities[0].high, 2);
    assert_eq!(severities[0].unknown, 0);
}

// ── schema lifecycle ──

#[test]
fn prepare_wipes_stored_reports_on_version_bump() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = DatabaseConfig {
        path: dir.path().join("warden.db"),
        ..DatabaseConfig::default()
    };

    {
        let store = PolicyReportStore::open(&config)
            .expect("open store")
            .with_version("1.0");
        store.prepare().expect("prepare v1");
        store.add(&preport()).expect("add report");
        assert!(store.get(&preport().id()).expect("get").is_some());
    }

    let store = PolicyReportStore::open(&config)
        .expect("reopen store")
        .with_version("2.0");
    store.prepare().expect("prepare v2");
    assert!(store.get(&preport().id()).expect("get").is_none());
    drop(store);

    let conn = rusqlite::Connection::open(dir.path().join("warden.db")).expect("raw open");
    let version: String = conn
        .query_row(
            "SELECT version FROM policy_report_config ORDER BY id DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .expect("stored version");
    assert_eq!(version, "2.0");
}

#[test]
fn prepare_always_runs_the_cleanup_pass() {
    let store = seeded_store();
    store.prepare().expect("second prepare");

    assert_eq!(store.count_policy_reports(&Filter::default()).unwrap(), 0);
    assert!(store.get(&ureport().id()).expect("get").is_none());
}
