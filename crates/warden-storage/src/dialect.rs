//! Engine-specific SQL spellings.
//!
//! Every query in this crate is assembled from neutral predicates and
//! rendered through a [`Dialect`]. The embedded engine is SQLite; the
//! Postgres variant renders the same predicates with server-side
//! spellings so generated SQL stays testable without a live server.

/// Target SQL engine for rendered statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Sqlite,
    Postgres,
}

/// Strategy for matching a single key/value pair inside a JSON label column.
///
/// `JsonPath` uses the engine's native JSON accessor. `Like` falls back to a
/// substring match over the serialized document for engines or columns
/// without JSON support. Both bind the key and the value, in that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelMatcher {
    JsonPath,
    Like,
}

impl Dialect {
    /// Placeholder for the `n`-th bound parameter (1-based).
    pub fn placeholder(&self, n: usize) -> String {
        match self {
            Dialect::Sqlite => "?".to_string(),
            Dialect::Postgres => format!("${n}"),
        }
    }

    /// Equality test of one label key against a value, with the key and the
    /// value both bound. `p_key` and `p_value` are pre-rendered placeholders.
    pub fn label_predicate(
        &self,
        matcher: LabelMatcher,
        column: &str,
        p_key: &str,
        p_value: &str,
    ) -> String {
        match (self, matcher) {
            (Dialect::Sqlite, LabelMatcher::JsonPath) => {
                format!("json_extract({column}, '$.\"' || {p_key} || '\"') = {p_value}")
            }
            (Dialect::Postgres, LabelMatcher::JsonPath) => {
                format!("{column} ->> {p_key} = {p_value}")
            }
            (_, LabelMatcher::Like) => {
                format!("{column} LIKE '%\"' || {p_key} || '\":\"' || {p_value} || '\"%'")
            }
        }
    }

    /// `INSERT` opening clause for statements that must swallow duplicates.
    pub fn insert_ignore_prefix(&self) -> &'static str {
        match self {
            Dialect::Sqlite => "INSERT OR IGNORE INTO",
            Dialect::Postgres => "INSERT INTO",
        }
    }

    /// Trailing clause paired with [`Dialect::insert_ignore_prefix`].
    pub fn insert_ignore_suffix(&self) -> &'static str {
        match self {
            Dialect::Sqlite => "",
            Dialect::Postgres => " ON CONFLICT DO NOTHING",
        }
    }

    /// Statement probing for a table by name, returning a count.
    pub fn table_exists_sql(&self) -> &'static str {
        match self {
            Dialect::Sqlite => {
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?"
            }
            Dialect::Postgres => {
                "SELECT COUNT(*) FROM information_schema.tables WHERE table_name = $1"
            }
        }
    }

    /// Whether the stored schema version participates in upgrade decisions.
    ///
    /// The embedded engine rebuilds its schema on every start, so the stored
    /// version is informational only. Server engines compare it against the
    /// running version to decide on a rebuild.
    pub fn versioned_schema(&self) -> bool {
        matches!(self, Dialect::Postgres)
    }
}
