//! Team entity.
//!
//! # Invariants
//! - `members` is the back-collection of the member -> team reference and is
//!   only mutated by `Roster`.

use crate::model::member::ValidationError;
use crate::model::roster::MemberKey;
use serde::Serialize;

/// Storage-assigned team identifier.
pub type TeamId = i64;

/// Team entity as held by callers and by [`crate::Roster`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Team {
    id: Option<TeamId>,
    /// Display name used by team-name search filters.
    pub name: String,
    #[serde(skip)]
    members: Vec<MemberKey>,
}

impl Team {
    /// Creates a transient team without members.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            members: Vec::new(),
        }
    }

    pub(crate) fn persisted(id: TeamId, name: String) -> Self {
        Self {
            id: Some(id),
            name,
            members: Vec::new(),
        }
    }

    /// Returns the storage id, or `None` before the first persist.
    pub fn id(&self) -> Option<TeamId> {
        self.id
    }

    /// Returns roster keys of the members referencing this team.
    pub fn members(&self) -> &[MemberKey] {
        &self.members
    }

    /// Checks write-side invariants.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::BlankTeamName);
        }
        Ok(())
    }

    pub(crate) fn assign_id(&mut self, id: TeamId) {
        self.id = Some(id);
    }

    pub(crate) fn push_member(&mut self, member: MemberKey) {
        if !self.members.contains(&member) {
            self.members.push(member);
        }
    }

    pub(crate) fn remove_member(&mut self, member: MemberKey) {
        self.members.retain(|current| *current != member);
    }

    pub(crate) fn clear_members(&mut self) {
        self.members.clear();
    }
}
