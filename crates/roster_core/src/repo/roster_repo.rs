//! Whole-graph persistence for [`Roster`].
//!
//! # Responsibility
//! - Write every team and member of a roster in one immediate transaction.
//! - Rebuild a roster, including team back-collections, from storage.
//!
//! # Invariants
//! - Validation runs for the whole graph before the transaction starts; an
//!   invalid entity writes nothing.
//! - Storage ids are written back into the roster only after commit.

use crate::model::member::{Member, MemberId};
use crate::model::roster::{MemberKey, Roster, TeamKey};
use crate::model::team::{Team, TeamId};
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::guard::{ensure_connection_ready, MEMBERS_TABLE, TEAMS_TABLE};
use crate::repo::member_repo::{insert_member, update_member};
use crate::repo::team_repo::{insert_team, update_team};
use log::{error, info};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Instant;

/// Row counts written by one [`SqliteRosterRepository::persist`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistSummary {
    pub teams_inserted: usize,
    pub teams_updated: usize,
    pub members_inserted: usize,
    pub members_updated: usize,
}

/// SQLite-backed roster graph repository.
pub struct SqliteRosterRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRosterRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[TEAMS_TABLE, MEMBERS_TABLE])?;
        Ok(Self { conn })
    }

    /// Inserts transient and updates persisted teams, then members.
    ///
    /// Each member row stores the storage id of the team its roster key
    /// points at.
    ///
    /// # Errors
    /// - [`RepoError::Validation`] before any write when an entity is invalid.
    /// - [`RepoError::NotFound`] when a persisted entity no longer exists; the
    ///   transaction is rolled back.
    pub fn persist(&self, roster: &mut Roster) -> RepoResult<PersistSummary> {
        let started_at = Instant::now();
        match self.write_graph(roster) {
            Ok(summary) => {
                info!(
                    "event=roster_persist module=repo status=ok duration_ms={} teams_inserted={} teams_updated={} members_inserted={} members_updated={}",
                    started_at.elapsed().as_millis(),
                    summary.teams_inserted,
                    summary.teams_updated,
                    summary.members_inserted,
                    summary.members_updated
                );
                Ok(summary)
            }
            Err(err) => {
                error!(
                    "event=roster_persist module=repo status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Loads every team and member into a fresh roster.
    ///
    /// Teams and members are added in id order, so back-collections list
    /// members by ascending id.
    pub fn load(&self) -> RepoResult<Roster> {
        let mut roster = Roster::new();
        let mut team_keys = HashMap::<TeamId, TeamKey>::new();

        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM teams ORDER BY id ASC;")?;
        let teams = stmt
            .query_map([], |row| Ok((row.get::<_, TeamId>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        for (id, name) in teams {
            let key = roster.add_team(Team::persisted(id, name));
            team_keys.insert(id, key);
        }

        let mut stmt = self
            .conn
            .prepare("SELECT id, username, age, team_id FROM members ORDER BY id ASC;")?;
        let members = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, MemberId>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i32>(2)?,
                    row.get::<_, Option<TeamId>>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        for (id, username, age, team_id) in members {
            let key = roster.add_member(Member::persisted(id, username, age));
            if let Some(team_id) = team_id {
                let team = team_keys.get(&team_id).copied().ok_or_else(|| {
                    RepoError::InvalidData(format!("member {id} references missing team {team_id}"))
                })?;
                roster
                    .change_team(key, team)
                    .map_err(|err| RepoError::InvalidData(err.to_string()))?;
            }
        }

        Ok(roster)
    }

    fn write_graph(&self, roster: &mut Roster) -> RepoResult<PersistSummary> {
        for (_, team) in roster.teams() {
            team.validate()?;
        }
        for (_, member) in roster.members() {
            member.validate()?;
        }

        let mut summary = PersistSummary::default();
        let mut team_ids = HashMap::<TeamKey, TeamId>::new();
        let mut member_ids = Vec::<(MemberKey, MemberId)>::new();

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        for (key, team) in roster.teams() {
            let id = match team.id() {
                Some(id) => {
                    update_team(&tx, id, team)?;
                    summary.teams_updated += 1;
                    id
                }
                None => {
                    summary.teams_inserted += 1;
                    insert_team(&tx, team)?
                }
            };
            team_ids.insert(key, id);
        }

        for (key, member) in roster.members() {
            let team_id = member.team().and_then(|team| team_ids.get(&team).copied());
            let id = match member.id() {
                Some(id) => {
                    update_member(&tx, id, member, team_id)?;
                    summary.members_updated += 1;
                    id
                }
                None => {
                    summary.members_inserted += 1;
                    insert_member(&tx, member, team_id)?
                }
            };
            member_ids.push((key, id));
        }
        tx.commit()?;

        for (key, id) in team_ids {
            roster.assign_team_id(key, id);
        }
        for (key, id) in member_ids {
            roster.assign_member_id(key, id);
        }
        Ok(summary)
    }
}
