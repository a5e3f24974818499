//! Predicate fragments and their conjunction.
//!
//! An absent fragment (`None`) is the identity of the conjunction: it is
//! dropped before rendering and never evaluates as a blocking condition.

use crate::query::column::{Column, Table};
use rusqlite::types::Value;

/// Binary comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Gt,
    Goe,
    Lt,
    Loe,
}

impl CompareOp {
    fn as_sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Gt => ">",
            Self::Goe => ">=",
            Self::Lt => "<",
            Self::Loe => "<=",
        }
    }
}

/// Boolean filter over typed columns.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Compare {
        column: Column,
        op: CompareOp,
        value: Value,
    },
    In {
        column: Column,
        values: Vec<Value>,
    },
    /// Conjunction. An empty list matches every row.
    And(Vec<Predicate>),
}

impl Predicate {
    pub fn compare(column: Column, op: CompareOp, value: impl Into<Value>) -> Self {
        Self::Compare {
            column,
            op,
            value: value.into(),
        }
    }

    /// Conjoins `self` with `other`, flattening nested conjunctions.
    pub fn and(self, other: Predicate) -> Self {
        let mut parts = match self {
            Self::And(parts) => parts,
            single => vec![single],
        };
        match other {
            Self::And(more) => parts.extend(more),
            single => parts.push(single),
        }
        Self::And(parts)
    }

    /// Conjoins `self` with an optional fragment; `None` leaves `self` as is.
    pub fn and_opt(self, other: Option<Predicate>) -> Self {
        match other {
            Some(other) => self.and(other),
            None => self,
        }
    }

    /// Returns whether any column of this predicate belongs to `table`.
    pub fn references(&self, table: Table) -> bool {
        match self {
            Self::Compare { column, .. } | Self::In { column, .. } => column.table == table,
            Self::And(parts) => parts.iter().any(|part| part.references(table)),
        }
    }

    /// Appends this predicate as SQL to `sql`, pushing bind values in order.
    pub(crate) fn render(&self, sql: &mut String, binds: &mut Vec<Value>) {
        match self {
            Self::Compare { column, op, value } => {
                sql.push_str(&column.qualified());
                sql.push(' ');
                sql.push_str(op.as_sql());
                sql.push_str(" ?");
                binds.push(value.clone());
            }
            Self::In { column, values } => {
                if values.is_empty() {
                    sql.push_str("1 = 0");
                    return;
                }
                sql.push_str(&column.qualified());
                sql.push_str(" IN (");
                sql.push_str(&vec!["?"; values.len()].join(", "));
                sql.push(')');
                binds.extend(values.iter().cloned());
            }
            Self::And(parts) => match parts.as_slice() {
                [] => sql.push_str("1 = 1"),
                [single] => single.render(sql, binds),
                parts => {
                    sql.push('(');
                    for (index, part) in parts.iter().enumerate() {
                        if index > 0 {
                            sql.push_str(" AND ");
                        }
                        part.render(sql, binds);
                    }
                    sql.push(')');
                }
            },
        }
    }
}

/// Conjoins every present fragment.
///
/// Returns `None` when no fragment is present, which callers treat as
/// "match all rows".
pub fn all_of<I>(fragments: I) -> Option<Predicate>
where
    I: IntoIterator<Item = Option<Predicate>>,
{
    let mut present = fragments.into_iter().flatten();
    let first = present.next()?;
    Some(present.fold(first, Predicate::and))
}
