//! In-memory member/team association graph.
//!
//! # Responsibility
//! - Own teams and members loaded from, or destined for, storage.
//! - Keep both sides of the member -> team relation consistent.
//!
//! # Invariants
//! - `member.team() == Some(t)` iff the member's key is in `team(t).members()`.
//! - `change_team` is the only way to (re)assign a member's team; it updates
//!   both sides before returning.
//! - Keys are only meaningful for the roster that issued them.

use crate::model::member::Member;
use crate::model::team::Team;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Opaque handle to a team owned by a [`Roster`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TeamKey(usize);

/// Opaque handle to a member owned by a [`Roster`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberKey(usize);

pub type RosterResult<T> = Result<T, RosterError>;

/// Key lookup failure, raised when a key from another roster is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterError {
    UnknownMember(MemberKey),
    UnknownTeam(TeamKey),
}

impl Display for RosterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownMember(key) => write!(f, "member key {} is not in this roster", key.0),
            Self::UnknownTeam(key) => write!(f, "team key {} is not in this roster", key.0),
        }
    }
}

impl Error for RosterError {}

/// Owns teams and members and the association between them.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    teams: Vec<Team>,
    members: Vec<Member>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a team and returns its key.
    ///
    /// Any back-collection the value carried from another roster is dropped.
    pub fn add_team(&mut self, mut team: Team) -> TeamKey {
        team.clear_members();
        self.teams.push(team);
        TeamKey(self.teams.len() - 1)
    }

    /// Adds a member without a team and returns its key.
    pub fn add_member(&mut self, mut member: Member) -> MemberKey {
        member.set_team(None);
        self.members.push(member);
        MemberKey(self.members.len() - 1)
    }

    /// Adds a member and assigns it to `team` in one step.
    ///
    /// # Errors
    /// - [`RosterError::UnknownTeam`] when `team` was not issued by this
    ///   roster. The member is not added in that case.
    pub fn add_member_in_team(&mut self, member: Member, team: TeamKey) -> RosterResult<MemberKey> {
        self.team(team).ok_or(RosterError::UnknownTeam(team))?;
        let key = self.add_member(member);
        self.change_team(key, team)?;
        Ok(key)
    }

    /// Assigns `member` to `team`, updating both sides of the relation.
    ///
    /// The member is removed from its previous team's back-collection.
    /// Reassigning to the current team is a no-op.
    pub fn change_team(&mut self, member: MemberKey, team: TeamKey) -> RosterResult<()> {
        self.team(team).ok_or(RosterError::UnknownTeam(team))?;
        let previous = self
            .member(member)
            .ok_or(RosterError::UnknownMember(member))?
            .team();

        if previous == Some(team) {
            return Ok(());
        }
        if let Some(previous) = previous {
            self.teams[previous.0].remove_member(member);
        }

        self.members[member.0].set_team(Some(team));
        self.teams[team.0].push_member(member);
        Ok(())
    }

    /// Detaches `member` from its team, if any.
    pub fn leave_team(&mut self, member: MemberKey) -> RosterResult<()> {
        let previous = self
            .member(member)
            .ok_or(RosterError::UnknownMember(member))?
            .team();
        if let Some(previous) = previous {
            self.teams[previous.0].remove_member(member);
            self.members[member.0].set_team(None);
        }
        Ok(())
    }

    pub fn team(&self, key: TeamKey) -> Option<&Team> {
        self.teams.get(key.0)
    }

    /// Mutable access for renaming; the back-collection stays roster-owned.
    pub fn team_mut(&mut self, key: TeamKey) -> Option<&mut Team> {
        self.teams.get_mut(key.0)
    }

    pub fn member(&self, key: MemberKey) -> Option<&Member> {
        self.members.get(key.0)
    }

    /// Mutable access for username/age edits; the team reference stays
    /// roster-owned.
    pub fn member_mut(&mut self, key: MemberKey) -> Option<&mut Member> {
        self.members.get_mut(key.0)
    }

    /// Returns the team `member` belongs to.
    pub fn team_of(&self, member: MemberKey) -> Option<&Team> {
        self.member(member)?.team().and_then(|team| self.team(team))
    }

    /// Iterates the members of `team` in assignment order.
    pub fn members_of(&self, team: TeamKey) -> impl Iterator<Item = &Member> + '_ {
        self.team(team)
            .map(Team::members)
            .unwrap_or_default()
            .iter()
            .filter_map(|key| self.member(*key))
    }

    pub fn teams(&self) -> impl Iterator<Item = (TeamKey, &Team)> + '_ {
        self.teams
            .iter()
            .enumerate()
            .map(|(index, team)| (TeamKey(index), team))
    }

    pub fn members(&self) -> impl Iterator<Item = (MemberKey, &Member)> + '_ {
        self.members
            .iter()
            .enumerate()
            .map(|(index, member)| (MemberKey(index), member))
    }

    pub fn team_count(&self) -> usize {
        self.teams.len()
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub(crate) fn assign_team_id(&mut self, key: TeamKey, id: i64) {
        if let Some(team) = self.teams.get_mut(key.0) {
            team.assign_id(id);
        }
    }

    pub(crate) fn assign_member_id(&mut self, key: MemberKey, id: i64) {
        if let Some(member) = self.members.get_mut(key.0) {
            member.assign_id(id);
        }
    }
}
