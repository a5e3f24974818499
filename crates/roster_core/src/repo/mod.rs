//! Repository layer abstractions and SQLite implementations.
//!
//! # Responsibility
//! - Provide one explicit function per named member/team query.
//! - Isolate SQLite statement details from service orchestration.
//!
//! # Invariants
//! - Repositories are only constructed over migrated connections.
//! - Write paths validate entities before SQL mutations.
//! - Lookups by id report absence as `None`; mutations of missing rows report
//!   `RepoError::NotFound`.

pub mod error;
mod guard;
pub mod member_repo;
pub mod roster_repo;
pub mod team_repo;
