//! PostgREST query builder.
//!
//! Mirrors the filter-chaining style of the Supabase client libraries:
//!
//! ```
//! use detailcrm_supabase::TableQuery;
//!
//! let query = TableQuery::from("jobs")
//!     .select("*, customer:customers(*)")
//!     .gte("scheduled_at", "2025-01-01T00:00:00Z")
//!     .order("scheduled_at", true)
//!     .limit(10);
//! assert_eq!(query.table(), "jobs");
//! ```

use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableQuery {
    table: String,
    select: Option<String>,
    filters: Vec<(String, String)>,
    order: Vec<String>,
    limit: Option<usize>,
}

impl TableQuery {
    pub fn from(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            select: None,
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
        }
    }

    /// Column list, including embedded resources (`alias:table(cols)`).
    pub fn select(mut self, columns: impl Into<String>) -> Self {
        self.select = Some(columns.into());
        self
    }

    pub fn eq(self, column: &str, value: impl Display) -> Self {
        self.filter(column, "eq", value)
    }

    pub fn gte(self, column: &str, value: impl Display) -> Self {
        self.filter(column, "gte", value)
    }

    /// `is.null`, `is.true` or `is.false`.
    pub fn is(self, column: &str, value: Option<bool>) -> Self {
        let value = match value {
            None => "null",
            Some(true) => "true",
            Some(false) => "false",
        };
        self.filter(column, "is", value)
    }

    fn filter(mut self, column: &str, operator: &str, value: impl Display) -> Self {
        self.filters
            .push((column.to_string(), format!("{operator}.{value}")));
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        let direction = if ascending { "asc" } else { "desc" };
        self.order.push(format!("{column}.{direction}"));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn filters(&self) -> &[(String, String)] {
        &self.filters
    }

    /// The encoded filter for `column` (e.g. `eq.42`), if any.
    pub fn filter_for(&self, column: &str) -> Option<&str> {
        self.filters
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, f)| f.as_str())
    }

    /// Query-string pairs in PostgREST syntax.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.filters.len() + 3);
        if let Some(select) = &self.select {
            pairs.push(("select".to_string(), compact_select(select)));
        }
        pairs.extend(self.filters.iter().cloned());
        if !self.order.is_empty() {
            pairs.push(("order".to_string(), self.order.join(",")));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        pairs
    }
}

/// Strip the whitespace that multi-line select strings carry.
fn compact_select(select: &str) -> String {
    select.split_whitespace().collect::<Vec<_>>().join("")
}
