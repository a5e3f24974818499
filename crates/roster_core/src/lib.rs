//! Core domain logic for the member/team roster.
//! This crate is the single source of truth for roster invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod search;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::member::{Member, MemberId, ValidationError};
pub use model::roster::{MemberKey, Roster, RosterError, RosterResult, TeamKey};
pub use model::team::{Team, TeamId};
pub use query::page::{Direction, Page, PageRequest, Sort};
pub use repo::error::{EntityRef, RepoError, RepoResult};
pub use repo::member_repo::{MemberRecord, MemberRepository, MemberTeamName, SqliteMemberRepository};
pub use repo::roster_repo::{PersistSummary, SqliteRosterRepository};
pub use repo::team_repo::{SqliteTeamRepository, TeamRecord, TeamRepository};
pub use search::member_search::{MemberSearchCondition, MemberTeamRow, MemberTeamSource};
pub use service::member_service::MemberService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
