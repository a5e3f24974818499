//! Select statement builder rooted at `members`.

use crate::query::column::{member, team, Column, MEMBERS, TEAMS};
use crate::query::page::{Direction, PageRequest};
use crate::query::predicate::Predicate;
use rusqlite::types::Value;

/// How `teams` is joined to `members`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamJoin {
    /// No join; only member columns may be referenced.
    None,
    /// `LEFT JOIN`: members without a team stay in the result.
    Left,
    /// `INNER JOIN`: members without a team are dropped.
    Inner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OrderSpec {
    column: Column,
    direction: Direction,
}

/// Read statement over `members` (optionally joined with `teams`).
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    projection: Vec<Column>,
    join: TeamJoin,
    predicate: Option<Predicate>,
    order_by: Vec<OrderSpec>,
    limit: Option<u32>,
    offset: u64,
}

impl SelectQuery {
    /// Starts a query over `members` alone.
    pub fn members() -> Self {
        Self::with_join(TeamJoin::None)
    }

    /// Starts a query over `members LEFT JOIN teams`.
    pub fn members_left_join_team() -> Self {
        Self::with_join(TeamJoin::Left)
    }

    /// Starts a query over `members INNER JOIN teams`.
    pub fn members_join_team() -> Self {
        Self::with_join(TeamJoin::Inner)
    }

    fn with_join(join: TeamJoin) -> Self {
        Self {
            projection: Vec::new(),
            join,
            predicate: None,
            order_by: Vec::new(),
            limit: None,
            offset: 0,
        }
    }

    /// Sets the projected columns. An empty projection selects `m.id`.
    pub fn select(mut self, columns: &[Column]) -> Self {
        self.projection = columns.to_vec();
        self
    }

    /// Adds a filter. `None` leaves the current filter untouched.
    pub fn filter(mut self, predicate: Option<Predicate>) -> Self {
        self.predicate = match (self.predicate.take(), predicate) {
            (Some(current), Some(next)) => Some(current.and(next)),
            (current, next) => current.or(next),
        };
        self
    }

    pub fn order_by(mut self, column: Column, direction: Direction) -> Self {
        self.order_by.push(OrderSpec { column, direction });
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    /// Applies the request's sort, offset and page size.
    pub fn page(mut self, request: &PageRequest) -> Self {
        for order in request.sort().orders() {
            self = self.order_by(order.column, order.direction);
        }
        self.offset(request.offset()).limit(request.page_size())
    }

    /// Join used when rendering. A `None` join is widened to `Left` once the
    /// predicate or the ordering references a team column.
    pub fn join(&self) -> TeamJoin {
        if self.join != TeamJoin::None {
            return self.join;
        }
        let filters_team = self
            .predicate
            .as_ref()
            .is_some_and(|predicate| predicate.references(TEAMS));
        let sorts_team = self
            .order_by
            .iter()
            .any(|order| order.column.table == TEAMS);
        if filters_team || sorts_team {
            TeamJoin::Left
        } else {
            TeamJoin::None
        }
    }

    pub fn limit_value(&self) -> Option<u32> {
        self.limit
    }

    pub fn offset_value(&self) -> u64 {
        self.offset
    }

    /// Renders the row-fetch statement and its bind values.
    pub fn to_sql(&self) -> (String, Vec<Value>) {
        let projection = if self.projection.is_empty() {
            vec![member::ID]
        } else {
            self.projection.clone()
        };
        let columns = projection
            .iter()
            .map(|column| format!("{} AS {}", column.qualified(), column.label))
            .collect::<Vec<_>>()
            .join(", ");

        let mut sql = format!("SELECT {columns}");
        let mut binds = Vec::new();
        self.push_from_where(&mut sql, &mut binds);

        if !self.order_by.is_empty() {
            let orders = self
                .order_by
                .iter()
                .map(|order| format!("{} {}", order.column.qualified(), order.direction.as_sql()))
                .collect::<Vec<_>>()
                .join(", ");
            sql.push_str(" ORDER BY ");
            sql.push_str(&orders);
        }

        match self.limit {
            Some(limit) => {
                sql.push_str(" LIMIT ?");
                binds.push(Value::Integer(i64::from(limit)));
                if self.offset > 0 {
                    sql.push_str(" OFFSET ?");
                    binds.push(Value::Integer(offset_to_sql(self.offset)));
                }
            }
            None if self.offset > 0 => {
                sql.push_str(" LIMIT -1 OFFSET ?");
                binds.push(Value::Integer(offset_to_sql(self.offset)));
            }
            None => {}
        }

        (sql, binds)
    }

    /// Renders `SELECT COUNT(*)` over the same join and predicate, ignoring
    /// projection, ordering, limit and offset.
    pub fn to_count_sql(&self) -> (String, Vec<Value>) {
        let mut sql = String::from("SELECT COUNT(*)");
        let mut binds = Vec::new();
        self.push_from_where(&mut sql, &mut binds);
        (sql, binds)
    }

    fn push_from_where(&self, sql: &mut String, binds: &mut Vec<Value>) {
        sql.push_str(&format!(" FROM {} {}", MEMBERS.name, MEMBERS.alias));
        let join_keyword = match self.join() {
            TeamJoin::None => None,
            TeamJoin::Left => Some("LEFT JOIN"),
            TeamJoin::Inner => Some("INNER JOIN"),
        };
        if let Some(keyword) = join_keyword {
            sql.push_str(&format!(
                " {keyword} {} {} ON {} = {}",
                TEAMS.name,
                TEAMS.alias,
                team::ID.qualified(),
                member::TEAM_ID.qualified()
            ));
        }

        if let Some(predicate) = &self.predicate {
            sql.push_str(" WHERE ");
            predicate.render(sql, binds);
        }
    }
}

fn offset_to_sql(offset: u64) -> i64 {
    i64::try_from(offset).unwrap_or(i64::MAX)
}
