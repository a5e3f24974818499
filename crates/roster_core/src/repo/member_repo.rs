//! Member repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide member CRUD plus one explicit function per named member query.
//! - Execute search statements built by `search::member_search`.
//!
//! # Invariants
//! - Write paths call `Member::validate()` before SQL mutations.
//! - `bulk_age_plus` writes straight to storage; in-memory rosters holding
//!   the affected members are stale afterwards and must be reloaded.

use crate::model::member::{Member, MemberId};
use crate::model::team::TeamId;
use crate::query::column::{member, team, Column};
use crate::query::page::{Direction, Page, PageRequest};
use crate::query::select::SelectQuery;
use crate::repo::error::{EntityRef, RepoError, RepoResult};
use crate::repo::guard::{ensure_connection_ready, MEMBERS_TABLE, TEAMS_TABLE};
use crate::repo::team_repo::count_to_u64;
use crate::search::member_search::{MemberTeamRow, MemberTeamSource};
use log::info;
use rusqlite::{params, params_from_iter, Connection, Row};
use serde::Serialize;

const MEMBER_RECORD_COLUMNS: &[Column] = &[
    member::ID,
    member::USERNAME,
    member::AGE,
    member::TEAM_ID,
    member::CREATED_AT,
    member::UPDATED_AT,
];

/// Persisted member row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberRecord {
    pub id: MemberId,
    pub username: String,
    pub age: i32,
    pub team_id: Option<TeamId>,
    /// Epoch milliseconds.
    pub created_at: i64,
    /// Epoch milliseconds.
    pub updated_at: i64,
}

/// Inner-join projection of member id, username and team name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberTeamName {
    pub member_id: MemberId,
    pub username: String,
    pub team_name: String,
}

/// Repository interface for member persistence and named queries.
pub trait MemberRepository: MemberTeamSource<Error = RepoError> {
    /// Inserts a transient member (assigning its id) or updates a persisted
    /// one, storing `team_id` as its team reference.
    fn save(&self, member: &mut Member, team_id: Option<TeamId>) -> RepoResult<MemberId>;
    fn find_by_id(&self, id: MemberId) -> RepoResult<Option<MemberRecord>>;
    /// All members ordered by id.
    fn find_all(&self) -> RepoResult<Vec<MemberRecord>>;
    fn count(&self) -> RepoResult<u64>;
    fn delete(&self, id: MemberId) -> RepoResult<()>;
    fn find_by_username(&self, username: &str) -> RepoResult<Vec<MemberRecord>>;
    /// First member (by id) with `username`.
    fn find_optional_by_username(&self, username: &str) -> RepoResult<Option<MemberRecord>>;
    fn find_by_username_and_age_greater_than(
        &self,
        username: &str,
        age: i32,
    ) -> RepoResult<Vec<MemberRecord>>;
    /// Every username, ordered by member id.
    fn find_usernames(&self) -> RepoResult<Vec<String>>;
    /// Members whose username is in `names`. An empty slice matches nothing.
    fn find_by_names(&self, names: &[String]) -> RepoResult<Vec<MemberRecord>>;
    /// Members that belong to a team, with the team name.
    fn find_member_team_names(&self) -> RepoResult<Vec<MemberTeamName>>;
    /// One page of members with exactly `age`, plus the total count.
    fn find_by_age(&self, age: i32, page: &PageRequest) -> RepoResult<Page<MemberRecord>>;
    /// Increments the age of every member aged `age` or older. Returns the
    /// number of rows changed.
    fn bulk_age_plus(&self, age: i32) -> RepoResult<usize>;
}

/// SQLite-backed member repository.
pub struct SqliteMemberRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMemberRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[TEAMS_TABLE, MEMBERS_TABLE])?;
        Ok(Self { conn })
    }

    fn query_records(&self, query: &SelectQuery) -> RepoResult<Vec<MemberRecord>> {
        let (sql, binds) = query.clone().select(MEMBER_RECORD_COLUMNS).to_sql();
        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map(params_from_iter(binds), parse_member_record)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    fn query_count(&self, query: &SelectQuery) -> RepoResult<u64> {
        let (sql, binds) = query.to_count_sql();
        let count: i64 = self
            .conn
            .query_row(&sql, params_from_iter(binds), |row| row.get(0))?;
        count_to_u64(count)
    }
}

impl MemberTeamSource for SqliteMemberRepository<'_> {
    type Error = RepoError;

    fn fetch_rows(&self, query: &SelectQuery) -> RepoResult<Vec<MemberTeamRow>> {
        let (sql, binds) = query.to_sql();
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(binds), parse_member_team_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn count_rows(&self, query: &SelectQuery) -> RepoResult<u64> {
        self.query_count(query)
    }
}

impl MemberRepository for SqliteMemberRepository<'_> {
    fn save(&self, member: &mut Member, team_id: Option<TeamId>) -> RepoResult<MemberId> {
        let id = match member.id() {
            Some(id) => {
                update_member(self.conn, id, member, team_id)?;
                id
            }
            None => insert_member(self.conn, member, team_id)?,
        };
        member.assign_id(id);
        Ok(id)
    }

    fn find_by_id(&self, id: MemberId) -> RepoResult<Option<MemberRecord>> {
        let query = SelectQuery::members().filter(Some(member::ID.eq(id)));
        Ok(self.query_records(&query)?.into_iter().next())
    }

    fn find_all(&self) -> RepoResult<Vec<MemberRecord>> {
        self.query_records(&by_id(SelectQuery::members()))
    }

    fn count(&self) -> RepoResult<u64> {
        self.query_count(&SelectQuery::members())
    }

    fn delete(&self, id: MemberId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM members WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityRef::Member(id)));
        }
        Ok(())
    }

    fn find_by_username(&self, username: &str) -> RepoResult<Vec<MemberRecord>> {
        let query = SelectQuery::members().filter(Some(member::USERNAME.eq(username.to_string())));
        self.query_records(&by_id(query))
    }

    fn find_optional_by_username(&self, username: &str) -> RepoResult<Option<MemberRecord>> {
        let query = SelectQuery::members()
            .filter(Some(member::USERNAME.eq(username.to_string())))
            .limit(1);
        Ok(self.query_records(&by_id(query))?.into_iter().next())
    }

    fn find_by_username_and_age_greater_than(
        &self,
        username: &str,
        age: i32,
    ) -> RepoResult<Vec<MemberRecord>> {
        let predicate = member::USERNAME
            .eq(username.to_string())
            .and(member::AGE.gt(age));
        self.query_records(&by_id(SelectQuery::members().filter(Some(predicate))))
    }

    fn find_usernames(&self) -> RepoResult<Vec<String>> {
        let (sql, binds) = by_id(SelectQuery::members())
            .select(&[member::USERNAME])
            .to_sql();
        let mut stmt = self.conn.prepare(&sql)?;
        let names = stmt
            .query_map(params_from_iter(binds), |row| row.get(member::USERNAME.label))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(names)
    }

    fn find_by_names(&self, names: &[String]) -> RepoResult<Vec<MemberRecord>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        let query = SelectQuery::members().filter(Some(member::USERNAME.is_in(names.to_vec())));
        self.query_records(&by_id(query))
    }

    fn find_member_team_names(&self) -> RepoResult<Vec<MemberTeamName>> {
        let (sql, binds) = by_id(SelectQuery::members_join_team())
            .select(&[member::ID, member::USERNAME, team::NAME])
            .to_sql();
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(binds), |row| {
                Ok(MemberTeamName {
                    member_id: row.get(member::ID.label)?,
                    username: row.get(member::USERNAME.label)?,
                    team_name: row.get(team::NAME.label)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn find_by_age(&self, age: i32, page: &PageRequest) -> RepoResult<Page<MemberRecord>> {
        let base = SelectQuery::members().filter(Some(member::AGE.eq(age)));
        let content = self.query_records(&base.clone().page(page))?;
        Page::from_fetch(content, page.clone(), || self.query_count(&base))
    }

    fn bulk_age_plus(&self, age: i32) -> RepoResult<usize> {
        let changed = self.conn.execute(
            "UPDATE members
             SET
                age = age + 1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE age >= ?1;",
            [age],
        )?;
        info!("event=bulk_age_plus module=repo status=ok rows={changed}");
        Ok(changed)
    }
}

/// Inserts `member` with `team_id` and returns the storage-assigned id.
pub(crate) fn insert_member(
    conn: &Connection,
    member: &Member,
    team_id: Option<TeamId>,
) -> RepoResult<MemberId> {
    member.validate()?;
    conn.execute(
        "INSERT INTO members (username, age, team_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, (strftime('%s', 'now') * 1000), (strftime('%s', 'now') * 1000));",
        params![member.username.as_str(), member.age, team_id],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Rewrites username, age and team reference of a persisted member.
pub(crate) fn update_member(
    conn: &Connection,
    id: MemberId,
    member: &Member,
    team_id: Option<TeamId>,
) -> RepoResult<()> {
    member.validate()?;
    let changed = conn.execute(
        "UPDATE members
         SET
            username = ?2,
            age = ?3,
            team_id = ?4,
            updated_at = (strftime('%s', 'now') * 1000)
         WHERE id = ?1;",
        params![id, member.username.as_str(), member.age, team_id],
    )?;
    if changed == 0 {
        return Err(RepoError::NotFound(EntityRef::Member(id)));
    }
    Ok(())
}

fn by_id(query: SelectQuery) -> SelectQuery {
    query.order_by(member::ID, Direction::Asc)
}

fn parse_member_record(row: &Row<'_>) -> rusqlite::Result<MemberRecord> {
    Ok(MemberRecord {
        id: row.get(member::ID.label)?,
        username: row.get(member::USERNAME.label)?,
        age: row.get(member::AGE.label)?,
        team_id: row.get(member::TEAM_ID.label)?,
        created_at: row.get(member::CREATED_AT.label)?,
        updated_at: row.get(member::UPDATED_AT.label)?,
    })
}

fn parse_member_team_row(row: &Row<'_>) -> rusqlite::Result<MemberTeamRow> {
    Ok(MemberTeamRow {
        member_id: row.get(member::ID.label)?,
        username: row.get(member::USERNAME.label)?,
        age: row.get(member::AGE.label)?,
        team_id: row.get(team::ID.label)?,
        team_name: row.get(team::NAME.label)?,
    })
}
