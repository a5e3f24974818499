//! Typed query primitives over the `members`/`teams` schema.
//!
//! # Responsibility
//! - Provide typed column references so filters never hand-write column SQL.
//! - Compose optional predicate fragments into one conjunction.
//! - Render select/count statements with positional bind values.
//! - Model page requests and page results.
//!
//! # Invariants
//! - User-provided values are always bound, never interpolated.
//! - Count statements share the row statement's join and predicate but carry
//!   no ordering, limit or offset.

pub mod column;
pub mod page;
pub mod predicate;
pub mod select;
