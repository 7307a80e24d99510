//! Predicate accumulation and SQL rendering.
//!
//! Queries are composed as data first: a base table profile plus a list of
//! [`Predicate`] values, all combined with AND. Rendering through the
//! [`Dialect`] happens once, at execution. Keeping predicates structural
//! makes filter composition testable without string-diffing SQL.
//!
//! Every filter method is a no-op on empty input, so an omitted filter
//! never constrains the query.

use std::collections::BTreeMap;

use rusqlite::{params_from_iter, Connection, Row};
use warden_core::{Direction, Filter, Pagination, StorageError, StorageResult};

use crate::dialect::{Dialect, LabelMatcher};
use crate::schema::{TABLE_FILTER, TABLE_REPORT, TABLE_RESOURCE, TABLE_RESULT};

/// Column bindings of one base table. Empty strings mark dimensions the
/// table does not carry; filters on them are skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableProfile {
    pub table: &'static str,
    pub alias: &'static str,
    /// Child column joined against `pr.id` for report-label filters; `None`
    /// when the table cannot be narrowed by report labels.
    pub report_join: Option<&'static str>,
    pub namespace: &'static str,
    pub kind: &'static str,
    pub source: &'static str,
    pub category: &'static str,
    pub policy: &'static str,
    pub rule: &'static str,
    pub severity: &'static str,
    pub status: &'static str,
    pub resource_name: &'static str,
    pub resource_id: &'static str,
    pub search_like: &'static [&'static str],
    pub search_exact: &'static [&'static str],
}

pub const REPORT_PROFILE: TableProfile = TableProfile {
    table: TABLE_REPORT,
    alias: "pr",
    report_join: None,
    namespace: "pr.namespace",
    kind: "",
    source: "pr.source",
    category: "",
    policy: "",
    rule: "",
    severity: "",
    status: "",
    resource_name: "",
    resource_id: "",
    search_like: &[],
    search_exact: &[],
};

pub const RESULT_PROFILE: TableProfile = TableProfile {
    table: TABLE_RESULT,
    alias: "r",
    report_join: Some("r.policy_report_id"),
    namespace: "r.resource_namespace",
    kind: "r.resource_kind",
    source: "r.source",
    category: "r.category",
    policy: "r.policy",
    rule: "r.rule",
    severity: "r.severity",
    status: "r.result",
    resource_name: "r.resource_name",
    resource_id: "r.resource_id",
    search_like: &[
        "r.resource_namespace",
        "r.resource_name",
        "r.policy",
        "r.rule",
    ],
    search_exact: &["r.severity", "r.result", "r.resource_kind"],
};

pub const FILTER_PROFILE: TableProfile = TableProfile {
    table: TABLE_FILTER,
    alias: "f",
    report_join: Some("f.policy_report_id"),
    namespace: "f.namespace",
    kind: "f.kind",
    source: "f.source",
    category: "f.category",
    policy: "f.policy",
    rule: "",
    severity: "f.severity",
    status: "f.result",
    resource_name: "",
    resource_id: "",
    search_like: &[],
    search_exact: &[],
};

pub const RESOURCE_PROFILE: TableProfile = TableProfile {
    table: TABLE_RESOURCE,
    alias: "res",
    report_join: None,
    namespace: "res.resource_namespace",
    kind: "res.resource_kind",
    source: "res.source",
    category: "res.category",
    policy: "",
    rule: "",
    severity: "",
    status: "",
    resource_name: "res.resource_name",
    resource_id: "res.id",
    search_like: &["res.resource_namespace", "res.resource_name"],
    search_exact: &["res.resource_kind"],
};

/// One accumulated constraint. All predicates of a query AND together.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    In {
        column: &'static str,
        values: Vec<String>,
    },
    Equals {
        column: &'static str,
        value: String,
    },
    Empty {
        column: &'static str,
    },
    NotEmpty {
        column: &'static str,
    },
    Label {
        column: &'static str,
        key: String,
        value: String,
    },
    Exclude {
        source_column: &'static str,
        kind_column: &'static str,
        source: String,
        kinds: Vec<String>,
    },
    Search {
        like_columns: &'static [&'static str],
        exact_columns: &'static [&'static str],
        term: String,
    },
}

impl Predicate {
    fn render(
        &self,
        dialect: Dialect,
        matcher: LabelMatcher,
        args: &mut Vec<String>,
        index: &mut usize,
    ) -> String {
        let mut bind = |value: &str| -> String {
            args.push(value.to_string());
            *index += 1;
            dialect.placeholder(*index)
        };

        match self {
            Predicate::In { column, values } => match values.as_slice() {
                [] => "1 = 1".to_string(),
                [value] => format!("{column} = {}", bind(value)),
                values => {
                    let placeholders: Vec<String> =
                        values.iter().map(|value| bind(value)).collect();
                    format!("{column} IN ({})", placeholders.join(", "))
                }
            },
            Predicate::Equals { column, value } => {
                format!("{column} = {}", bind(value))
            }
            Predicate::Empty { column } => format!("{column} = ''"),
            Predicate::NotEmpty { column } => format!("{column} != ''"),
            Predicate::Label { column, key, value } => {
                let p_key = bind(key);
                let p_value = bind(value);
                dialect.label_predicate(matcher, column, &p_key, &p_value)
            }
            Predicate::Exclude {
                source_column,
                kind_column,
                source,
                kinds,
            } => {
                let p_first = bind(source);
                let p_second = bind(source);
                let placeholders: Vec<String> = kinds.iter().map(|kind| bind(kind)).collect();
                format!(
                    "({source_column} != {p_first} OR ({source_column} = {p_second} \
                     AND {kind_column} NOT IN ({})))",
                    placeholders.join(", ")
                )
            }
            Predicate::Search {
                like_columns,
                exact_columns,
                term,
            } => {
                let pattern = format!("%{term}%");
                let mut clauses = Vec::with_capacity(like_columns.len() + exact_columns.len());
                for column in *like_columns {
                    clauses.push(format!("{column} LIKE {}", bind(&pattern)));
                }
                for column in *exact_columns {
                    clauses.push(format!("LOWER({column}) = LOWER({})", bind(term)));
                }
                format!("({})", clauses.join(" OR "))
            }
        }
    }
}

/// Accumulates columns, predicates, grouping, ordering, and pagination for
/// one SELECT over a base table.
pub struct QueryBuilder {
    dialect: Dialect,
    matcher: LabelMatcher,
    profile: TableProfile,
    distinct: bool,
    columns: Vec<String>,
    join_report: bool,
    predicates: Vec<Predicate>,
    groups: Vec<String>,
    orders: Vec<String>,
    limit: Option<(i64, i64)>,
    invalid_sort: Option<String>,
}

impl QueryBuilder {
    pub fn new(dialect: Dialect, matcher: LabelMatcher, profile: TableProfile) -> Self {
        QueryBuilder {
            dialect,
            matcher,
            profile,
            distinct: false,
            columns: Vec::new(),
            join_report: false,
            predicates: Vec::new(),
            groups: Vec::new(),
            orders: Vec::new(),
            limit: None,
            invalid_sort: None,
        }
    }

    pub fn reports(dialect: Dialect, matcher: LabelMatcher) -> Self {
        QueryBuilder::new(dialect, matcher, REPORT_PROFILE)
    }

    pub fn results(dialect: Dialect, matcher: LabelMatcher) -> Self {
        QueryBuilder::new(dialect, matcher, RESULT_PROFILE)
    }

    pub fn filters(dialect: Dialect, matcher: LabelMatcher) -> Self {
        QueryBuilder::new(dialect, matcher, FILTER_PROFILE)
    }

    pub fn resources(dialect: Dialect, matcher: LabelMatcher) -> Self {
        QueryBuilder::new(dialect, matcher, RESOURCE_PROFILE)
    }

    /// Distinct non-empty values of one column, ordered ascending. The base
    /// shape of every filter-option listing.
    pub fn option(&mut self, column: &'static str) -> &mut Self {
        self.distinct = true;
        self.columns.push(column.to_string());
        self.predicates.push(Predicate::NotEmpty { column });
        self.orders.push(format!("{column} ASC"));
        self
    }

    pub fn distinct(&mut self) -> &mut Self {
        self.distinct = true;
        self
    }

    pub fn columns(&mut self, expr: &str) -> &mut Self {
        self.columns.push(expr.to_string());
        self
    }

    /// Status rollup columns of the resource projection.
    pub fn status_summaries(&mut self) -> &mut Self {
        self.columns.push(
            "SUM(res.pass) as pass, SUM(res.warn) as warn, SUM(res.fail) as fail, \
             SUM(res.error) as error, SUM(res.skip) as skip"
                .to_string(),
        );
        self
    }

    /// Severity rollup columns of the resource projection.
    pub fn severity_summaries(&mut self) -> &mut Self {
        self.columns.push(
            "SUM(res.info) as info, SUM(res.low) as low, SUM(res.medium) as medium, \
             SUM(res.high) as high, SUM(res.critical) as critical, SUM(res.unknown) as unknown"
                .to_string(),
        );
        self
    }

    pub fn group(&mut self, columns: &[&str]) -> &mut Self {
        self.groups.extend(columns.iter().map(|c| c.to_string()));
        self
    }

    pub fn order(&mut self, column: &str, direction: Direction) -> &mut Self {
        self.orders.push(format!("{column} {}", direction.as_sql()));
        self
    }

    /// Set membership on one column; equality for a single value.
    pub fn filter(&mut self, column: &'static str, values: &[String]) -> &mut Self {
        if column.is_empty() || values.is_empty() {
            return self;
        }

        if let [value] = values {
            self.predicates.push(Predicate::Equals {
                column,
                value: value.clone(),
            });
        } else {
            self.predicates.push(Predicate::In {
                column,
                values: values.to_vec(),
            });
        }
        self
    }

    pub fn filter_value(&mut self, column: &'static str, value: &str) -> &mut Self {
        if column.is_empty() || value.is_empty() {
            return self;
        }

        self.predicates.push(Predicate::Equals {
            column,
            value: value.to_string(),
        });
        self
    }

    pub fn namespace_scope(&mut self) -> &mut Self {
        self.predicates.push(Predicate::NotEmpty {
            column: self.profile.namespace,
        });
        self
    }

    pub fn cluster_scope(&mut self) -> &mut Self {
        self.predicates.push(Predicate::Empty {
            column: self.profile.namespace,
        });
        self
    }

    pub fn scoped(&mut self, namespaced: bool) -> &mut Self {
        if namespaced {
            self.namespace_scope()
        } else {
            self.cluster_scope()
        }
    }

    /// Report-label equality constraints. Child tables join the report table
    /// to reach the label column; tables without a report link skip labels.
    pub fn report_labels(&mut self, labels: &BTreeMap<String, String>) -> &mut Self {
        if labels.is_empty() {
            return self;
        }
        if self.profile.table != TABLE_REPORT {
            match self.profile.report_join {
                Some(_) => self.join_report = true,
                None => return self,
            }
        }

        for (key, value) in labels {
            self.predicates.push(Predicate::Label {
                column: "pr.labels",
                key: key.clone(),
                value: value.clone(),
            });
        }
        self
    }

    /// Source-to-kind exclusions. Skipped entirely when the filter names
    /// kinds or a resource id explicitly; explicit inclusion wins.
    pub fn exclude(&mut self, filter: &Filter) -> &mut Self {
        if !filter.resource_id.is_empty() || !filter.kinds.is_empty() {
            return self;
        }
        if self.profile.kind.is_empty() {
            return self;
        }

        for (source, kinds) in &filter.exclude {
            if kinds.is_empty() {
                continue;
            }
            self.predicates.push(Predicate::Exclude {
                source_column: self.profile.source,
                kind_column: self.profile.kind,
                source: source.clone(),
                kinds: kinds.clone(),
            });
        }
        self
    }

    /// Free-text search over the profile's search columns.
    pub fn search(&mut self, term: &str) -> &mut Self {
        let searchable =
            !self.profile.search_like.is_empty() || !self.profile.search_exact.is_empty();
        if term.is_empty() || !searchable {
            return self;
        }

        self.predicates.push(Predicate::Search {
            like_columns: self.profile.search_like,
            exact_columns: self.profile.search_exact,
            term: term.to_string(),
        });
        self
    }

    /// Apply every dimension of a filter the base table carries.
    pub fn apply_filter(&mut self, filter: &Filter) -> &mut Self {
        let profile = self.profile;

        self.filter(profile.namespace, &filter.namespaces)
            .filter(profile.kind, &filter.kinds)
            .filter(profile.source, &filter.sources)
            .filter(profile.category, &filter.categories)
            .filter(profile.policy, &filter.policies)
            .filter(profile.rule, &filter.rules)
            .filter(profile.severity, &filter.severities)
            .filter(profile.status, &filter.status)
            .filter(profile.resource_name, &filter.resources)
            .filter_value(profile.resource_id, &filter.resource_id)
            .report_labels(&filter.report_label)
            .exclude(filter)
            .search(&filter.search)
    }

    /// Ordering and LIMIT/OFFSET from a pagination value. Page 0 or size 0
    /// orders without limiting.
    pub fn pagination(&mut self, pagination: &Pagination) -> &mut Self {
        for column in &pagination.sort_by {
            if !valid_sort_column(column) {
                self.invalid_sort = Some(column.clone());
                return self;
            }
            self.orders
                .push(format!("{column} {}", pagination.direction.as_sql()));
        }

        if pagination.is_paged() {
            self.limit = Some((pagination.offset, (pagination.page - 1) * pagination.offset));
        }
        self
    }

    /// Accumulated predicates, in application order.
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Render the SELECT and its bound arguments.
    pub fn build(&self) -> StorageResult<(String, Vec<String>)> {
        if let Some(column) = &self.invalid_sort {
            return Err(StorageError::Query {
                message: format!("invalid sort column: {column}"),
            });
        }

        let mut args = Vec::new();
        let mut index = 0usize;

        let mut sql = String::from("SELECT ");
        if self.distinct {
            sql.push_str("DISTINCT ");
        }
        if self.columns.is_empty() {
            sql.push('*');
        } else {
            sql.push_str(&self.columns.join(", "));
        }
        sql.push_str(&format!(
            " FROM {} as {}",
            self.profile.table, self.profile.alias
        ));

        if self.join_report {
            if let Some(fk) = self.profile.report_join {
                sql.push_str(&format!(" JOIN policy_report AS pr ON pr.id = {fk}"));
            }
        }

        if !self.predicates.is_empty() {
            let clauses: Vec<String> = self
                .predicates
                .iter()
                .map(|p| p.render(self.dialect, self.matcher, &mut args, &mut index))
                .collect();
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        if !self.groups.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&self.groups.join(", "));
        }

        if !self.orders.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.orders.join(", "));
        }

        if let Some((limit, offset)) = self.limit {
            sql.push_str(&format!(" LIMIT {limit} OFFSET {offset}"));
        }

        Ok((sql, args))
    }

    /// Execute and map every row.
    pub fn fetch<T, F>(&self, conn: &Connection, map: F) -> StorageResult<Vec<T>>
    where
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let (sql, args) = self.build()?;
        let mut stmt = conn.prepare_cached(&sql)?;
        let rows = stmt.query_map(params_from_iter(args.iter()), map)?;

        let mut list = Vec::new();
        for row in rows {
            list.push(row?);
        }
        Ok(list)
    }

    /// Execute and map the first row, if any.
    pub fn fetch_optional<T, F>(&self, conn: &Connection, map: F) -> StorageResult<Option<T>>
    where
        F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
    {
        let (sql, args) = self.build()?;
        let mut stmt = conn.prepare_cached(&sql)?;
        let mut rows = stmt.query(params_from_iter(args.iter()))?;

        match rows.next()? {
            Some(row) => Ok(Some(map(row)?)),
            None => Ok(None),
        }
    }

    /// Execute as a row count over the rendered query.
    pub fn count(&self, conn: &Connection) -> StorageResult<i64> {
        let (sql, args) = self.build()?;
        let wrapped = format!("SELECT COUNT(*) FROM ({sql})");
        let mut stmt = conn.prepare_cached(&wrapped)?;
        let count = stmt.query_row(params_from_iter(args.iter()), |row| row.get(0))?;
        Ok(count)
    }
}

fn valid_sort_column(column: &str) -> bool {
    !column.is_empty()
        && column
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn builder() -> QueryBuilder {
        QueryBuilder::results(Dialect::Sqlite, LabelMatcher::JsonPath)
    }

    #[test]
    fn empty_filter_adds_no_predicates() {
        let mut qb = builder();
        qb.apply_filter(&Filter::default());
        assert!(qb.predicates().is_empty());
    }

    #[test]
    fn single_value_becomes_equality() {
        let mut qb = builder();
        qb.filter("r.source", &["Kyverno".to_string()]);
        assert_eq!(
            qb.predicates(),
            &[Predicate::Equals {
                column: "r.source",
                value: "Kyverno".to_string(),
            }]
        );
    }

    #[test]
    fn multiple_values_become_membership() {
        let mut qb = builder();
        qb.filter(
            "r.resource_kind",
            &["Pod".to_string(), "Deployment".to_string()],
        );
        assert_eq!(
            qb.predicates(),
            &[Predicate::In {
                column: "r.resource_kind",
                values: vec!["Pod".to_string(), "Deployment".to_string()],
            }]
        );
    }

    #[test]
    fn explicit_kind_filter_disables_exclusions() {
        let mut exclude = BTreeMap::new();
        exclude.insert("Kyverno".to_string(), vec!["Pod".to_string()]);

        let filter = Filter {
            kinds: vec!["Pod".to_string()],
            exclude: exclude.clone(),
            ..Filter::default()
        };
        let mut qb = builder();
        qb.exclude(&filter);
        assert!(qb.predicates().is_empty());

        let filter = Filter {
            resource_id: "12345".to_string(),
            exclude: exclude.clone(),
            ..Filter::default()
        };
        let mut qb = builder();
        qb.exclude(&filter);
        assert!(qb.predicates().is_empty());

        let filter = Filter {
            exclude,
            ..Filter::default()
        };
        let mut qb = builder();
        qb.exclude(&filter);
        assert_eq!(
            qb.predicates(),
            &[Predicate::Exclude {
                source_column: "r.source",
                kind_column: "r.resource_kind",
                source: "Kyverno".to_string(),
                kinds: vec!["Pod".to_string()],
            }]
        );
    }

    #[test]
    fn renders_conjunction_with_positional_args() {
        let mut qb = builder();
        qb.columns("r.id")
            .filter("r.source", &["Kyverno".to_string()])
            .filter(
                "r.result",
                &["fail".to_string(), "error".to_string()],
            );

        let (sql, args) = qb.build().expect("render");
        assert_eq!(
            sql,
            "SELECT r.id FROM policy_report_result as r \
             WHERE r.source = ? AND r.result IN (?, ?)"
        );
        assert_eq!(args, vec!["Kyverno", "fail", "error"]);
    }

    #[test]
    fn renders_numbered_placeholders_for_postgres() {
        let mut qb = QueryBuilder::results(Dialect::Postgres, LabelMatcher::JsonPath);
        qb.columns("r.id")
            .filter("r.source", &["Kyverno".to_string()])
            .filter_value("r.policy", "require-limits");

        let (sql, _) = qb.build().expect("render");
        assert!(sql.contains("r.source = $1"));
        assert!(sql.contains("r.policy = $2"));
    }

    #[test]
    fn label_filter_joins_child_tables_only() {
        let mut labels = BTreeMap::new();
        labels.insert("app".to_string(), "policy-reporter".to_string());

        let mut qb = builder();
        qb.columns("r.id").report_labels(&labels);
        let (sql, args) = qb.build().expect("render");
        assert!(sql.contains("JOIN policy_report AS pr ON pr.id = r.policy_report_id"));
        assert!(sql.contains("json_extract(pr.labels, '$.\"' || ? || '\"') = ?"));
        assert_eq!(args, vec!["app", "policy-reporter"]);

        let mut qb = QueryBuilder::reports(Dialect::Sqlite, LabelMatcher::JsonPath);
        qb.columns("pr.id").report_labels(&labels);
        let (sql, _) = qb.build().expect("render");
        assert!(!sql.contains("JOIN"));
        assert!(sql.contains("json_extract(pr.labels"));
    }

    #[test]
    fn resource_table_ignores_label_filters() {
        let mut labels = BTreeMap::new();
        labels.insert("app".to_string(), "policy-reporter".to_string());

        let mut qb = QueryBuilder::resources(Dialect::Sqlite, LabelMatcher::JsonPath);
        qb.report_labels(&labels);
        assert!(qb.predicates().is_empty());
    }

    #[test]
    fn search_renders_contains_and_exact_clauses() {
        let mut qb = builder();
        qb.columns("r.id").search("nginx");

        let (sql, args) = qb.build().expect("render");
        assert!(sql.contains("r.resource_name LIKE ?"));
        assert!(sql.contains("LOWER(r.resource_kind) = LOWER(?)"));
        assert_eq!(args[0], "%nginx%");
        assert!(args.contains(&"nginx".to_string()));
    }

    #[test]
    fn pagination_translates_page_to_limit_offset() {
        let mut qb = builder();
        qb.columns("r.id").pagination(&Pagination::new(
            2,
            10,
            vec!["resource_name".to_string()],
            Direction::Desc,
        ));

        let (sql, _) = qb.build().expect("render");
        assert!(sql.ends_with("ORDER BY resource_name DESC LIMIT 10 OFFSET 10"));
    }

    #[test]
    fn zero_page_keeps_ordering_only() {
        let mut qb = builder();
        qb.columns("r.id").pagination(&Pagination::new(
            0,
            10,
            vec!["resource_name".to_string()],
            Direction::Asc,
        ));

        let (sql, _) = qb.build().expect("render");
        assert!(sql.contains("ORDER BY resource_name ASC"));
        assert!(!sql.contains("LIMIT"));
    }

    #[test]
    fn hostile_sort_column_fails_the_build() {
        let mut qb = builder();
        qb.columns("r.id").pagination(&Pagination::new(
            1,
            10,
            vec!["resource_name; DROP TABLE policy_report".to_string()],
            Direction::Asc,
        ));

        assert!(matches!(
            qb.build(),
            Err(StorageError::Query { .. })
        ));
    }

    #[test]
    fn option_shape_selects_distinct_non_empty_ordered() {
        let mut qb = QueryBuilder::filters(Dialect::Sqlite, LabelMatcher::JsonPath);
        qb.option("kind");

        let (sql, _) = qb.build().expect("render");
        assert_eq!(
            sql,
            "SELECT DISTINCT kind FROM policy_report_filter as f \
             WHERE kind != '' ORDER BY kind ASC"
        );
    }

    #[test]
    fn count_wraps_the_rendered_query() {
        let conn = Connection::open_in_memory().expect("open in-memory database");
        crate::schema::create_schema(&conn).expect("create schema");

        conn.execute_batch(
            "INSERT INTO policy_report (id, type, name) VALUES ('1', 'namespaced', 'a');
             INSERT INTO policy_report (id, type, name) VALUES ('2', 'cluster', 'b');",
        )
        .expect("seed reports");

        let mut qb = QueryBuilder::reports(Dialect::Sqlite, LabelMatcher::JsonPath);
        qb.columns("pr.id")
            .filter_value("pr.type", "namespaced");
        assert_eq!(qb.count(&conn).expect("count"), 1);
    }

    #[test]
    fn fetch_binds_arguments_in_render_order() {
        let conn = Connection::open_in_memory().expect("open in-memory database");
        crate::schema::create_schema(&conn).expect("create schema");

        conn.execute_batch(
            "INSERT INTO policy_report (id, type, name, namespace, labels)
             VALUES ('1', 'namespaced', 'a', 'test', '{\"app\":\"nginx\"}');",
        )
        .expect("seed report");

        let mut labels = BTreeMap::new();
        labels.insert("app".to_string(), "nginx".to_string());

        let mut qb = QueryBuilder::reports(Dialect::Sqlite, LabelMatcher::JsonPath);
        qb.columns("pr.name")
            .filter("pr.namespace", &["test".to_string()])
            .report_labels(&labels);

        let names = qb
            .fetch(&conn, |row| row.get::<_, String>(0))
            .expect("fetch");
        assert_eq!(names, vec!["a".to_string()]);
    }
}
