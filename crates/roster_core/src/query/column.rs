//! Typed column references for the roster schema.

use crate::query::predicate::{CompareOp, Predicate};
use rusqlite::types::Value;

/// Table with the alias used in rendered statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Table {
    pub name: &'static str,
    pub alias: &'static str,
}

pub const MEMBERS: Table = Table {
    name: "members",
    alias: "m",
};

pub const TEAMS: Table = Table {
    name: "teams",
    alias: "t",
};

/// One column of [`MEMBERS`] or [`TEAMS`].
///
/// `label` is the result-set name the column is projected as; row parsers
/// read values by label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub table: Table,
    pub name: &'static str,
    pub label: &'static str,
}

impl Column {
    pub const fn new(table: Table, name: &'static str, label: &'static str) -> Self {
        Self { table, name, label }
    }

    /// Renders `alias.column`.
    pub fn qualified(&self) -> String {
        format!("{}.{}", self.table.alias, self.name)
    }

    pub fn eq(self, value: impl Into<Value>) -> Predicate {
        Predicate::compare(self, CompareOp::Eq, value)
    }

    pub fn gt(self, value: impl Into<Value>) -> Predicate {
        Predicate::compare(self, CompareOp::Gt, value)
    }

    pub fn goe(self, value: impl Into<Value>) -> Predicate {
        Predicate::compare(self, CompareOp::Goe, value)
    }

    pub fn lt(self, value: impl Into<Value>) -> Predicate {
        Predicate::compare(self, CompareOp::Lt, value)
    }

    pub fn loe(self, value: impl Into<Value>) -> Predicate {
        Predicate::compare(self, CompareOp::Loe, value)
    }

    /// `column IN (...)`. An empty list matches nothing.
    pub fn is_in<I, V>(self, values: I) -> Predicate
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Predicate::In {
            column: self,
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// Columns of the `members` table.
pub mod member {
    use super::{Column, MEMBERS};

    pub const ID: Column = Column::new(MEMBERS, "id", "member_id");
    pub const USERNAME: Column = Column::new(MEMBERS, "username", "username");
    pub const AGE: Column = Column::new(MEMBERS, "age", "age");
    pub const TEAM_ID: Column = Column::new(MEMBERS, "team_id", "team_id");
    pub const CREATED_AT: Column = Column::new(MEMBERS, "created_at", "created_at");
    pub const UPDATED_AT: Column = Column::new(MEMBERS, "updated_at", "updated_at");
}

/// Columns of the `teams` table.
pub mod team {
    use super::{Column, TEAMS};

    pub const ID: Column = Column::new(TEAMS, "id", "team_id");
    pub const NAME: Column = Column::new(TEAMS, "name", "team_name");
}

/// Resolves a sortable property name (`id`, `username`, `age`, `team_name`)
/// used by external callers.
pub fn sort_property(name: &str) -> Option<Column> {
    match name.trim().to_ascii_lowercase().as_str() {
        "id" | "member_id" => Some(member::ID),
        "username" => Some(member::USERNAME),
        "age" => Some(member::AGE),
        "team_name" | "teamname" => Some(team::NAME),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{member, sort_property, team};

    #[test]
    fn qualified_uses_table_alias() {
        assert_eq!(member::USERNAME.qualified(), "m.username");
        assert_eq!(team::NAME.qualified(), "t.name");
    }

    #[test]
    fn sort_property_accepts_known_names_only() {
        assert_eq!(sort_property(" Username "), Some(member::USERNAME));
        assert_eq!(sort_property("teamName"), Some(team::NAME));
        assert_eq!(sort_property("password"), None);
    }
}
