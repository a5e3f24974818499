//! Member/team domain model.
//!
//! # Responsibility
//! - Define the `Member` and `Team` entities and their validation rules.
//! - Own the in-memory association graph (`Roster`) that keeps the
//!   member -> team reference and the team -> members back-collection in sync.
//!
//! # Invariants
//! - Storage assigns identifiers; callers never pick them.
//! - A member's team can only be (re)assigned through `Roster::change_team`.

pub mod member;
pub mod roster;
pub mod team;
