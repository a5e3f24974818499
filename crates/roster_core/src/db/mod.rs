//! Roster store bootstrap: connections and the `teams`/`members` schema.
//!
//! # Invariants
//! - The schema version lives in `PRAGMA user_version`.
//! - Repositories refuse connections whose migrations have not been applied.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while opening or migrating a roster store.
#[derive(Debug)]
pub enum DbError {
    /// SQLite rejected a statement outside of a migration step.
    Sqlite(rusqlite::Error),
    /// The file was written by a newer roster build.
    SchemaTooNew { found: u32, supported: u32 },
    /// One migration script failed; nothing from the batch was committed.
    MigrationFailed {
        version: u32,
        name: &'static str,
        source: rusqlite::Error,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "roster store error: {err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "roster store has schema version {found}; this build understands up to {supported}"
            ),
            Self::MigrationFailed {
                version,
                name,
                source,
            } => write!(f, "roster migration {version} ({name}) failed: {source}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) | Self::MigrationFailed { source: err, .. } => Some(err),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
