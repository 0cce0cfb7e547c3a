//! Key-constrained query descriptions handed to the query executor.
//!
//! Models never build SQL themselves. They describe which table and which rows
//! a statement targets and leave rendering to the executor.

use crate::attributes::AttributeItem;
use crate::value::Value;

/// Comparison used by a [`Where`] constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    NotEq,
}

impl Operator {
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "<>",
        }
    }
}

/// A single `column <op> value` constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct Where {
    pub column: String,
    pub operator: Operator,
    pub value: Value,
}

/// Target of a select, update or delete.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub table: String,
    pub wheres: Vec<Where>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            wheres: Vec::new(),
            limit: None,
        }
    }

    pub fn where_eq(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.where_op(column, Operator::Eq, value)
    }

    pub fn where_not(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.where_op(column, Operator::NotEq, value)
    }

    pub fn where_op(
        mut self,
        column: impl Into<String>,
        operator: Operator,
        value: impl Into<Value>,
    ) -> Self {
        self.wheres.push(Where {
            column: column.into(),
            operator,
            value: value.into(),
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Evaluate the constraints against a row, for in-memory executors.
    ///
    /// A missing column compares as `Null`. Columns may be table-qualified.
    pub fn matches(&self, row: &[AttributeItem]) -> bool {
        self.wheres.iter().all(|w| {
            let column = w
                .column
                .strip_prefix(&self.table)
                .and_then(|rest| rest.strip_prefix('.'))
                .unwrap_or(&w.column);
            let value = row
                .iter()
                .find(|item| item.key == column)
                .map_or(&Value::Null, |item| &item.value);
            let equal = value.same_key(&w.value);
            match w.operator {
                Operator::Eq => equal,
                Operator::NotEq => !equal,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> Vec<AttributeItem> {
        vec![
            AttributeItem::new("id", 7_i64),
            AttributeItem::new("name", "test1"),
        ]
    }

    #[test]
    fn test_builder() {
        let query = Query::table("torrents").where_eq("id", 7).limit(1);
        assert_eq!(query.table, "torrents");
        assert_eq!(query.wheres.len(), 1);
        assert_eq!(query.wheres[0].operator.as_sql(), "=");
        assert_eq!(query.limit, Some(1));
    }

    #[test]
    fn test_matches_mixed_integer_widths() {
        assert!(Query::table("torrents").where_eq("id", 7_i32).matches(&row()));
        assert!(Query::table("torrents").where_eq("torrents.id", 7_i64).matches(&row()));
        assert!(!Query::table("torrents").where_eq("id", 8).matches(&row()));
        assert!(!Query::table("torrents").where_eq("id", "7").matches(&row()));
    }

    #[test]
    fn test_matches_not_eq_and_missing_column() {
        assert!(Query::table("t").where_not("name", "x").matches(&row()));
        assert!(Query::table("t").where_eq("size", Value::Null).matches(&row()));
    }
}
