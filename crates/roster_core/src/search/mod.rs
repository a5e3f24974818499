//! Member search entry points.
//!
//! # Responsibility
//! - Turn an optional, partially-filled search condition into one filtered
//!   `members LEFT JOIN teams` read, optionally paged.
//! - Keep condition-to-predicate shaping independent of the storage backend.
//!
//! # Invariants
//! - Absent or blank condition fields never constrain the result.
//! - Storage errors propagate unchanged; search adds no error kinds.

pub mod member_search;
