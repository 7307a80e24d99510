//! Filter and pagination value objects for the read surface.
//!
//! Every field is optional in effect: empty lists, empty strings, and empty
//! maps never constrain a query.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Read predicate bag. Collected by the API layer, interpreted per base
/// table by the predicate builder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Filter {
    pub kinds: Vec<String>,
    pub categories: Vec<String>,
    pub namespaces: Vec<String>,
    pub sources: Vec<String>,
    pub policies: Vec<String>,
    pub rules: Vec<String>,
    pub severities: Vec<String>,
    pub status: Vec<String>,
    pub resources: Vec<String>,
    pub resource_id: String,
    /// Report-level label equality constraints.
    pub report_label: BTreeMap<String, String>,
    /// source -> kinds removed from listings unless an explicit kind or
    /// resource-id filter is present.
    pub exclude: BTreeMap<String, Vec<String>>,
    pub namespaced: bool,
    /// Free-text search across resource namespace/name, policy and rule,
    /// with exact matches on severity, status and kind.
    pub search: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// Page selection for list reads. `offset` is the page size, kept under its
/// historical name; page 0 or size 0 disables pagination entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pagination {
    pub page: i64,
    pub offset: i64,
    pub sort_by: Vec<String>,
    pub direction: Direction,
}

impl Pagination {
    pub fn new(page: i64, offset: i64, sort_by: Vec<String>, direction: Direction) -> Self {
        Pagination {
            page,
            offset,
            sort_by,
            direction,
        }
    }

    pub fn is_paged(&self) -> bool {
        self.page > 0 && self.offset > 0
    }
}
