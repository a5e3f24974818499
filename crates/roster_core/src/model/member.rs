//! Member entity.
//!
//! # Responsibility
//! - Hold member attributes (`username`, `age`) and the storage identity.
//! - Validate write-side invariants before persistence.
//!
//! # Invariants
//! - `id` is `None` until the first persist and never changes afterwards.
//! - The team reference is read-only here; `Roster` owns reassignment.

use crate::model::roster::TeamKey;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-assigned member identifier.
pub type MemberId = i64;

/// Write-side validation failures for members and teams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Member username is empty or whitespace only.
    BlankUsername,
    /// Member age is below zero.
    NegativeAge(i32),
    /// Team name is empty or whitespace only.
    BlankTeamName,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankUsername => write!(f, "member username must not be blank"),
            Self::NegativeAge(age) => write!(f, "member age must not be negative, got {age}"),
            Self::BlankTeamName => write!(f, "team name must not be blank"),
        }
    }
}

impl Error for ValidationError {}

/// Member entity as held by callers and by [`crate::Roster`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Member {
    id: Option<MemberId>,
    /// Login-style display name. Not unique.
    pub username: String,
    /// Age in years.
    pub age: i32,
    #[serde(skip)]
    team: Option<TeamKey>,
}

impl Member {
    /// Creates a transient member with age `0` and no team.
    pub fn new(username: impl Into<String>) -> Self {
        Self::with_age(username, 0)
    }

    /// Creates a transient member with the given age and no team.
    pub fn with_age(username: impl Into<String>, age: i32) -> Self {
        Self {
            id: None,
            username: username.into(),
            age,
            team: None,
        }
    }

    /// Rehydrates a member that already exists in storage.
    pub(crate) fn persisted(id: MemberId, username: String, age: i32) -> Self {
        Self {
            id: Some(id),
            username,
            age,
            team: None,
        }
    }

    /// Returns the storage id, or `None` before the first persist.
    pub fn id(&self) -> Option<MemberId> {
        self.id
    }

    /// Returns the roster key of this member's team, if any.
    pub fn team(&self) -> Option<TeamKey> {
        self.team
    }

    /// Returns whether this member has been written to storage.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Checks write-side invariants.
    ///
    /// # Errors
    /// - [`ValidationError::BlankUsername`] for blank usernames.
    /// - [`ValidationError::NegativeAge`] for ages below zero.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.username.trim().is_empty() {
            return Err(ValidationError::BlankUsername);
        }
        if self.age < 0 {
            return Err(ValidationError::NegativeAge(self.age));
        }
        Ok(())
    }

    pub(crate) fn assign_id(&mut self, id: MemberId) {
        self.id = Some(id);
    }

    pub(crate) fn set_team(&mut self, team: Option<TeamKey>) {
        self.team = team;
    }
}
