//! PQL statement builder
//!
//! Listing operations take a filter statement of the form
//! `[WHERE ...] [ORDER BY ...] LIMIT n OFFSET m`. The builder owns the
//! pagination cursor: callers advance `offset` by `limit` between pages.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// Typed value of a bind variable
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Text(String),
    Number(i64),
    Boolean(bool),
}

impl BindValue {
    /// Schema type the API expects in `xsi:type`
    pub fn xsi_type(&self) -> &'static str {
        match self {
            BindValue::Text(_) => "TextValue",
            BindValue::Number(_) => "NumberValue",
            BindValue::Boolean(_) => "BooleanValue",
        }
    }

    fn to_text(&self) -> String {
        match self {
            BindValue::Text(text) => text.clone(),
            BindValue::Number(number) => number.to_string(),
            BindValue::Boolean(flag) => flag.to_string(),
        }
    }
}

// <value xsi:type="TextValue"><value>...</value></value>
impl Serialize for BindValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("BindValue", 2)?;
        state.serialize_field("@xsi:type", self.xsi_type())?;
        state.serialize_field("value", &self.to_text())?;
        state.end()
    }
}

impl From<&str> for BindValue {
    fn from(value: &str) -> Self {
        BindValue::Text(value.to_string())
    }
}

impl From<String> for BindValue {
    fn from(value: String) -> Self {
        BindValue::Text(value)
    }
}

impl From<i64> for BindValue {
    fn from(value: i64) -> Self {
        BindValue::Number(value)
    }
}

impl From<i32> for BindValue {
    fn from(value: i32) -> Self {
        BindValue::Number(value.into())
    }
}

impl From<bool> for BindValue {
    fn from(value: bool) -> Self {
        BindValue::Boolean(value)
    }
}

/// Bind variable referenced from a statement as `:key`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatementValue {
    pub key: String,
    pub value: BindValue,
}

/// A rendered PQL statement ready to send
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    pub query: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<StatementValue>,
}

/// Builder for paginated PQL statements
#[derive(Debug, Clone)]
pub struct StatementBuilder {
    where_clause: Option<String>,
    order_by: Option<String>,
    values: Vec<StatementValue>,
    /// Page size; always greater than zero
    pub limit: usize,
    /// Index of the first row of the next page
    pub offset: usize,
}

impl StatementBuilder {
    /// Page size recommended by the Ad Manager API
    pub const SUGGESTED_PAGE_LIMIT: usize = 500;

    pub fn new() -> Self {
        Self {
            where_clause: None,
            order_by: None,
            values: Vec::new(),
            limit: Self::SUGGESTED_PAGE_LIMIT,
            offset: 0,
        }
    }

    /// Set the WHERE condition (a leading `WHERE` keyword is accepted and dropped)
    pub fn where_clause(mut self, condition: impl Into<String>) -> Self {
        let condition = condition.into();
        let trimmed = condition.trim();
        let stripped = match trimmed.get(..6) {
            Some(head) if head.eq_ignore_ascii_case("where ") => trimmed[6..].trim_start(),
            _ => trimmed,
        };
        self.where_clause = (!stripped.is_empty()).then(|| stripped.to_string());
        self
    }

    /// Set the ORDER BY expression, e.g. `id ASC`
    pub fn order_by(mut self, order: impl Into<String>) -> Self {
        let order = order.into();
        let order = order.trim();
        self.order_by = (!order.is_empty()).then(|| order.to_string());
        self
    }

    /// Set the page size (clamped to at least 1)
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Add a bind variable, replacing an existing one with the same key
    pub fn with_bind_variable(
        mut self,
        key: impl Into<String>,
        value: impl Into<BindValue>,
    ) -> Self {
        let key = key.into();
        let value = value.into();
        match self.values.iter_mut().find(|v| v.key == key) {
            Some(existing) => existing.value = value,
            None => self.values.push(StatementValue { key, value }),
        }
        self
    }

    /// Move the cursor to the next page
    pub fn increase_offset_by_limit(&mut self) {
        self.offset += self.limit;
    }

    /// Render the statement for the current cursor position
    pub fn to_statement(&self) -> Statement {
        let mut clauses = Vec::with_capacity(4);
        if let Some(condition) = &self.where_clause {
            clauses.push(format!("WHERE {}", condition));
        }
        if let Some(order) = &self.order_by {
            clauses.push(format!("ORDER BY {}", order));
        }
        clauses.push(format!("LIMIT {}", self.limit));
        clauses.push(format!("OFFSET {}", self.offset));

        Statement {
            query: clauses.join(" "),
            values: self.values.clone(),
        }
    }
}

impl Default for StatementBuilder {
    fn default() -> Self {
        Self::new()
    }
}
