use serde::Serialize;

/// Placeholder table name used when no table could be identified.
pub const UNKNOWN_TABLE: &str = "table";

/// Statement kind, decided by the leading keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QueryType {
    Select,
    Insert,
    Update,
    Delete,
    Unknown,
}

impl std::fmt::Display for QueryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryType::Select => write!(f, "SELECT"),
            QueryType::Insert => write!(f, "INSERT"),
            QueryType::Update => write!(f, "UPDATE"),
            QueryType::Delete => write!(f, "DELETE"),
            QueryType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// A table referenced by the statement. Only the main table is recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRef {
    pub name: String,
    pub alias: Option<String>,
}

/// A selected column or expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnRef {
    /// Bare column name, `*`, or an expression such as `COUNT(DISTINCT id)`.
    pub name: String,
    pub table: Option<String>,
    pub alias: Option<String>,
}

impl ColumnRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: None,
            alias: None,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        self.name == "*" && self.table.is_none()
    }

    /// `table.name` when qualified, otherwise the name alone.
    pub fn qualified(&self) -> String {
        match &self.table {
            Some(t) => format!("{}.{}", t, self.name),
            None => self.name.clone(),
        }
    }
}

/// Join flavour as written in the statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum JoinKind {
    /// Bare `JOIN`.
    Plain,
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

/// A `JOIN` clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinClause {
    pub kind: JoinKind,
    /// Written with `OUTER`.
    pub outer: bool,
    /// Join keyword as written, whitespace collapsed, e.g. `left outer join`.
    pub keyword: String,
    pub table: String,
    pub alias: Option<String>,
    /// Raw `ON` condition; empty for joins without one.
    pub on: String,
}

impl JoinClause {
    /// Keyword text for SQL fragments, in the statement's own case.
    pub fn join_type(&self) -> &str {
        &self.keyword
    }

    pub fn reference(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.table)
    }

    /// Raw SQL form of the join, as embedded in string fragments.
    pub fn to_sql(&self) -> String {
        let mut sql = format!("{} {}", self.join_type(), self.table);
        if let Some(alias) = &self.alias {
            sql.push(' ');
            sql.push_str(alias);
        }
        if !self.on.is_empty() {
            sql.push_str(" ON ");
            sql.push_str(&self.on);
        }
        sql
    }
}

/// One `GROUP BY` term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupTerm {
    pub name: String,
    pub table: Option<String>,
}

impl GroupTerm {
    pub fn qualified(&self) -> String {
        match &self.table {
            Some(t) => format!("{}.{}", t, self.name),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// One `ORDER BY` term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderTerm {
    pub name: String,
    pub table: Option<String>,
    pub direction: SortDirection,
}

impl OrderTerm {
    pub fn qualified(&self) -> String {
        match &self.table {
            Some(t) => format!("{}.{}", t, self.name),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Limit {
    pub count: u64,
    pub offset: Option<u64>,
}

impl Limit {
    /// Offset worth emitting: zero offsets are dropped.
    pub fn effective_offset(&self) -> Option<u64> {
        self.offset.filter(|n| *n > 0)
    }
}

/// A `SET name = value` pair with the value kept raw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub name: String,
    pub value: String,
}

/// The parsed form of one SQL statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedQuery {
    #[serde(rename = "type")]
    pub query_type: QueryType,
    pub tables: Vec<TableRef>,
    /// Name of the first table, or [`UNKNOWN_TABLE`].
    pub main_table: String,
    pub distinct: bool,
    pub columns: Vec<ColumnRef>,
    pub joins: Vec<JoinClause>,
    /// Raw WHERE text; empty when absent.
    #[serde(rename = "where")]
    pub where_clause: String,
    /// INSERT values, raw.
    pub values: Option<Vec<String>>,
    /// UPDATE assignments, raw.
    pub set: Option<Vec<Assignment>>,
    pub group_by: Vec<GroupTerm>,
    pub having: Option<String>,
    pub order_by: Vec<OrderTerm>,
    pub limit: Option<Limit>,
}

impl ParsedQuery {
    /// An UNKNOWN statement with every clause absent.
    pub fn unknown() -> Self {
        Self {
            query_type: QueryType::Unknown,
            tables: Vec::new(),
            main_table: UNKNOWN_TABLE.to_string(),
            distinct: false,
            columns: Vec::new(),
            joins: Vec::new(),
            where_clause: String::new(),
            values: None,
            set: None,
            group_by: Vec::new(),
            having: None,
            order_by: Vec::new(),
            limit: None,
        }
    }

    pub fn main_table_ref(&self) -> Option<&TableRef> {
        self.tables.first()
    }

    pub fn main_alias(&self) -> Option<&str> {
        self.main_table_ref().and_then(|t| t.alias.as_deref())
    }

    pub fn has_where(&self) -> bool {
        !self.where_clause.trim().is_empty()
    }

    pub fn has_having(&self) -> bool {
        self.having.as_deref().is_some_and(|h| !h.trim().is_empty())
    }

    /// Columns are empty or exactly `*`.
    pub fn selects_all(&self) -> bool {
        self.columns.is_empty() || (self.columns.len() == 1 && self.columns[0].is_wildcard())
    }

    /// True when `name` is the main table or its alias.
    pub fn is_main_reference(&self, name: &str) -> bool {
        name.eq_ignore_ascii_case(&self.main_table)
            || self
                .main_alias()
                .is_some_and(|a| a.eq_ignore_ascii_case(name))
    }

    /// Join whose table or alias is `name`.
    pub fn join_for(&self, name: &str) -> Option<&JoinClause> {
        self.joins.iter().find(|j| {
            j.table.eq_ignore_ascii_case(name)
                || j.alias.as_deref().is_some_and(|a| a.eq_ignore_ascii_case(name))
        })
    }
}
