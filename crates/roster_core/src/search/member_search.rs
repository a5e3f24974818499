//! Conditional member/team search with optional paging.
//!
//! # Responsibility
//! - Derive one optional predicate fragment per condition field.
//! - Run the row fetch and, when required, the decoupled count through a
//!   [`MemberTeamSource`].
//!
//! # Invariants
//! - The join is always `members LEFT JOIN teams`, so team-less members stay
//!   eligible unless a team-name filter is present.
//! - Paged search never issues the count query when the first page comes back
//!   short; see [`Page::from_fetch`].
//! - Conditions are not validated: contradictory bounds yield no rows.

use crate::model::member::MemberId;
use crate::model::team::TeamId;
use crate::query::column::{member, team, Column};
use crate::query::page::{Page, PageRequest};
use crate::query::predicate::{all_of, Predicate};
use crate::query::select::SelectQuery;
use log::debug;
use serde::{Deserialize, Serialize};

/// Projection columns of [`MemberTeamRow`], in row order.
pub const MEMBER_TEAM_COLUMNS: &[Column] = &[
    member::ID,
    member::USERNAME,
    member::AGE,
    team::ID,
    team::NAME,
];

/// Optional search filters. Every field is independent; `None` (or a blank
/// string) means "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MemberSearchCondition {
    /// Exact username match.
    pub username: Option<String>,
    /// Exact match on the joined team's name.
    pub team_name: Option<String>,
    /// Inclusive lower age bound.
    pub age_goe: Option<i32>,
    /// Inclusive upper age bound.
    pub age_loe: Option<i32>,
}

/// Read-only member/team projection. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberTeamRow {
    pub member_id: MemberId,
    pub username: String,
    pub age: i32,
    pub team_id: Option<TeamId>,
    pub team_name: Option<String>,
}

/// Storage collaborator that executes member/team reads.
///
/// Implementations run the statement exactly as built; they must not add
/// filters or paging of their own.
pub trait MemberTeamSource {
    type Error;

    /// Fetches projection rows for `query` (honoring its limit/offset).
    fn fetch_rows(&self, query: &SelectQuery) -> Result<Vec<MemberTeamRow>, Self::Error>;

    /// Counts rows matching `query`'s join and predicate, ignoring its window.
    fn count_rows(&self, query: &SelectQuery) -> Result<u64, Self::Error>;
}

/// Username equality, only when the value has non-whitespace text.
pub fn username_eq(username: Option<&str>) -> Option<Predicate> {
    has_text(username).map(|value| member::USERNAME.eq(value.to_string()))
}

/// Team-name equality on the joined team, only when the value has text.
pub fn team_name_eq(team_name: Option<&str>) -> Option<Predicate> {
    has_text(team_name).map(|value| team::NAME.eq(value.to_string()))
}

/// `age >= value` when present.
pub fn age_goe(age: Option<i32>) -> Option<Predicate> {
    age.map(|value| member::AGE.goe(value))
}

/// `age <= value` when present.
pub fn age_loe(age: Option<i32>) -> Option<Predicate> {
    age.map(|value| member::AGE.loe(value))
}

/// Inclusive age range; both bounds are required.
pub fn age_between(goe: i32, loe: i32) -> Predicate {
    member::AGE.goe(goe).and(member::AGE.loe(loe))
}

/// Conjunction of every present fragment of `condition`.
///
/// Returns `None` when the condition constrains nothing.
pub fn condition_predicate(condition: &MemberSearchCondition) -> Option<Predicate> {
    all_of([
        username_eq(condition.username.as_deref()),
        team_name_eq(condition.team_name.as_deref()),
        age_goe(condition.age_goe),
        age_loe(condition.age_loe),
    ])
}

/// Builds the unpaged projection query for `condition`.
pub fn member_team_query(condition: &MemberSearchCondition) -> SelectQuery {
    SelectQuery::members_left_join_team()
        .select(MEMBER_TEAM_COLUMNS)
        .filter(condition_predicate(condition))
}

/// Returns every row matching `condition`.
pub fn search<S>(source: &S, condition: &MemberSearchCondition) -> Result<Vec<MemberTeamRow>, S::Error>
where
    S: MemberTeamSource + ?Sized,
{
    let rows = source.fetch_rows(&member_team_query(condition))?;
    debug!(
        "event=member_search module=search status=ok mode=list rows={}",
        rows.len()
    );
    Ok(rows)
}

/// Returns one page window of matching rows without computing a total.
pub fn search_page_simple<S>(
    source: &S,
    condition: &MemberSearchCondition,
    page: &PageRequest,
) -> Result<Vec<MemberTeamRow>, S::Error>
where
    S: MemberTeamSource + ?Sized,
{
    let rows = source.fetch_rows(&member_team_query(condition).page(page))?;
    debug!(
        "event=member_search module=search status=ok mode=page_simple page={} size={} rows={}",
        page.page_number(),
        page.page_size(),
        rows.len()
    );
    Ok(rows)
}

/// Returns one page of matching rows plus the total match count.
///
/// The count runs over the same join and predicate without the page window,
/// and is skipped entirely when the first page is short.
pub fn search_page<S>(
    source: &S,
    condition: &MemberSearchCondition,
    page: &PageRequest,
) -> Result<Page<MemberTeamRow>, S::Error>
where
    S: MemberTeamSource + ?Sized,
{
    let base = member_team_query(condition);
    let rows = source.fetch_rows(&base.clone().page(page))?;

    let mut counted = false;
    let result = Page::from_fetch(rows, page.clone(), || {
        counted = true;
        source.count_rows(&base)
    })?;

    debug!(
        "event=member_search module=search status=ok mode=page page={} size={} rows={} total={} count_query={}",
        page.page_number(),
        page.page_size(),
        result.number_of_elements(),
        result.total_elements(),
        if counted { "run" } else { "skipped" }
    );
    Ok(result)
}

fn has_text(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}
