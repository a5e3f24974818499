//! Team repository contract and SQLite implementation.

use crate::model::team::{Team, TeamId};
use crate::repo::error::{EntityRef, RepoError, RepoResult};
use crate::repo::guard::{ensure_connection_ready, TEAMS_TABLE};
use rusqlite::{params, Connection, OptionalExtension, Row};

const TEAM_SELECT_SQL: &str = "SELECT id, name, created_at, updated_at FROM teams";

/// Persisted team row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamRecord {
    pub id: TeamId,
    pub name: String,
    /// Epoch milliseconds.
    pub created_at: i64,
    /// Epoch milliseconds.
    pub updated_at: i64,
}

/// Repository interface for team CRUD operations.
pub trait TeamRepository {
    /// Inserts a transient team (assigning its id) or updates a persisted one.
    fn save(&self, team: &mut Team) -> RepoResult<TeamId>;
    fn find_by_id(&self, id: TeamId) -> RepoResult<Option<TeamRecord>>;
    /// All teams ordered by id.
    fn find_all(&self) -> RepoResult<Vec<TeamRecord>>;
    fn count(&self) -> RepoResult<u64>;
    /// Deletes one team. Members of the team keep existing with no team.
    fn delete(&self, id: TeamId) -> RepoResult<()>;
}

/// SQLite-backed team repository.
pub struct SqliteTeamRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTeamRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[TEAMS_TABLE])?;
        Ok(Self { conn })
    }
}

impl TeamRepository for SqliteTeamRepository<'_> {
    fn save(&self, team: &mut Team) -> RepoResult<TeamId> {
        let id = match team.id() {
            Some(id) => {
                update_team(self.conn, id, team)?;
                id
            }
            None => insert_team(self.conn, team)?,
        };
        team.assign_id(id);
        Ok(id)
    }

    fn find_by_id(&self, id: TeamId) -> RepoResult<Option<TeamRecord>> {
        let record = self
            .conn
            .query_row(
                &format!("{TEAM_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_team_row,
            )
            .optional()?;
        Ok(record)
    }

    fn find_all(&self) -> RepoResult<Vec<TeamRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TEAM_SELECT_SQL} ORDER BY id ASC;"))?;
        let teams = stmt
            .query_map([], parse_team_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(teams)
    }

    fn count(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM teams;", [], |row| row.get(0))?;
        count_to_u64(count)
    }

    fn delete(&self, id: TeamId) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM teams WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityRef::Team(id)));
        }
        Ok(())
    }
}

/// Inserts `team` and returns the storage-assigned id.
pub(crate) fn insert_team(conn: &Connection, team: &Team) -> RepoResult<TeamId> {
    team.validate()?;
    conn.execute(
        "INSERT INTO teams (name, created_at, updated_at)
         VALUES (?1, (strftime('%s', 'now') * 1000), (strftime('%s', 'now') * 1000));",
        [team.name.as_str()],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Rewrites the name of an already persisted team.
pub(crate) fn update_team(conn: &Connection, id: TeamId, team: &Team) -> RepoResult<()> {
    team.validate()?;
    let changed = conn.execute(
        "UPDATE teams
         SET
            name = ?2,
            updated_at = (strftime('%s', 'now') * 1000)
         WHERE id = ?1;",
        params![id, team.name.as_str()],
    )?;
    if changed == 0 {
        return Err(RepoError::NotFound(EntityRef::Team(id)));
    }
    Ok(())
}

pub(crate) fn count_to_u64(count: i64) -> RepoResult<u64> {
    u64::try_from(count).map_err(|_| RepoError::InvalidData(format!("negative row count {count}")))
}

fn parse_team_row(row: &Row<'_>) -> rusqlite::Result<TeamRecord> {
    Ok(TeamRecord {
        id: row.get("id")?,
        name: row.get("name")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
