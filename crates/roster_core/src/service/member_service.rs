//! Member use-case service.
//!
//! # Responsibility
//! - Provide the read entry points behind the `search` surfaces (list and
//!   page), member lookup and the bulk age update.
//! - Delegate persistence and search execution to a [`MemberRepository`].
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Search conditions are passed through unvalidated.

use crate::model::member::MemberId;
use crate::query::page::{Page, PageRequest};
use crate::repo::error::RepoResult;
use crate::repo::member_repo::{MemberRecord, MemberRepository};
use crate::search::member_search::{self, MemberSearchCondition, MemberTeamRow};
use log::{info, warn};
use std::time::Instant;

/// Use-case service wrapper for member reads and bulk updates.
pub struct MemberService<R: MemberRepository> {
    repo: R,
}

impl<R: MemberRepository> MemberService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns the wrapped repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Returns every member/team row matching `condition`.
    pub fn search_members(&self, condition: &MemberSearchCondition) -> RepoResult<Vec<MemberTeamRow>> {
        let started_at = Instant::now();
        let result = member_search::search(&self.repo, condition);
        log_search("list", started_at, result.as_ref().map(Vec::len));
        result
    }

    /// Returns one page of matching rows with the total match count.
    pub fn search_members_page(
        &self,
        condition: &MemberSearchCondition,
        page: &PageRequest,
    ) -> RepoResult<Page<MemberTeamRow>> {
        let started_at = Instant::now();
        let result = member_search::search_page(&self.repo, condition, page);
        log_search(
            "page",
            started_at,
            result.as_ref().map(Page::number_of_elements),
        );
        result
    }

    /// Looks one member up by id. Absence is `Ok(None)`.
    pub fn find_member(&self, id: MemberId) -> RepoResult<Option<MemberRecord>> {
        self.repo.find_by_id(id)
    }

    /// Lists every username in id order.
    pub fn list_usernames(&self) -> RepoResult<Vec<String>> {
        self.repo.find_usernames()
    }

    /// Increments the age of every member aged `age` or older.
    ///
    /// In-memory rosters loaded before this call are stale afterwards.
    pub fn bulk_age_plus(&self, age: i32) -> RepoResult<usize> {
        let started_at = Instant::now();
        let changed = self.repo.bulk_age_plus(age)?;
        info!(
            "event=member_bulk_update module=service status=ok rows={} duration_ms={}",
            changed,
            started_at.elapsed().as_millis()
        );
        Ok(changed)
    }
}

fn log_search<E: std::fmt::Display>(mode: &str, started_at: Instant, rows: Result<usize, &E>) {
    match rows {
        Ok(rows) => info!(
            "event=member_search module=service status=ok mode={mode} rows={rows} duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(err) => warn!(
            "event=member_search module=service status=error mode={mode} duration_ms={} error={err}",
            started_at.elapsed().as_millis()
        ),
    }
}
