use std::io::Write;

use anyhow::{bail, Context};
use log::info;
use roster_core::query::page::{normalize_page_size, PageRequest, Sort};
use roster_core::{
    Member, MemberService, Roster, SqliteMemberRepository, SqliteRosterRepository, Team,
};
use rusqlite::Connection;
use serde::Serialize;

use crate::cli::{Commands, SearchArgs};

/// Runs one subcommand against `conn`, writing JSON to `out`.
pub fn dispatch(command: &Commands, conn: &Connection, out: &mut impl Write) -> anyhow::Result<()> {
    match command {
        Commands::Seed { members } => seed(conn, *members, out),
        Commands::Search(args) => search(conn, args, out),
        Commands::Member { id } => member(conn, *id, out),
        Commands::BulkAgePlus { age } => bulk_age_plus(conn, *age, out),
    }
}

fn seed(conn: &Connection, members: u32, out: &mut impl Write) -> anyhow::Result<()> {
    let mut roster = Roster::new();
    let team_a = roster.add_team(Team::new("teamA"));
    let team_b = roster.add_team(Team::new("teamB"));
    for index in 0..members {
        let age = i32::try_from(index).context("member count exceeds age range")?;
        let team = if index % 2 == 0 { team_a } else { team_b };
        roster.add_member_in_team(Member::with_age(format!("member{index}"), age), team)?;
    }

    let summary = SqliteRosterRepository::try_new(conn)?.persist(&mut roster)?;
    info!(
        "event=seed module=cli status=ok members={}",
        summary.members_inserted
    );
    write_json(out, &summary)
}

fn search(conn: &Connection, args: &SearchArgs, out: &mut impl Write) -> anyhow::Result<()> {
    let service = MemberService::new(SqliteMemberRepository::try_new(conn)?);
    let condition = args.condition();

    if !args.is_paged() {
        let rows = service.search_members(&condition)?;
        return write_json(out, &rows);
    }

    let sort = args
        .sort
        .iter()
        .fold(Sort::unsorted(), |sort, order| sort.and(order.column, order.direction));
    let request = PageRequest::of(args.page.unwrap_or(0), normalize_page_size(args.size))
        .with_sort(sort);
    let page = service.search_members_page(&condition, &request)?;
    write_json(out, &page)
}

fn member(conn: &Connection, id: i64, out: &mut impl Write) -> anyhow::Result<()> {
    let service = MemberService::new(SqliteMemberRepository::try_new(conn)?);
    match service.find_member(id)? {
        Some(record) => write_json(out, &record),
        None => bail!("member {id} not found"),
    }
}

fn bulk_age_plus(conn: &Connection, age: i32, out: &mut impl Write) -> anyhow::Result<()> {
    let service = MemberService::new(SqliteMemberRepository::try_new(conn)?);
    let updated = service.bulk_age_plus(age)?;
    write_json(out, &serde_json::json!({ "updated": updated }))
}

fn write_json<T: Serialize + ?Sized>(out: &mut impl Write, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value).context("failed to encode JSON output")?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use roster_core::{open_db, open_db_in_memory};
    use serde_json::Value;

    use super::dispatch;
    use crate::cli::{Commands, SearchArgs};

    fn run(conn: &rusqlite::Connection, command: Commands) -> Value {
        let mut out = Vec::new();
        dispatch(&command, conn, &mut out).expect("command should succeed");
        serde_json::from_slice(&out).expect("output should be JSON")
    }

    fn search_args() -> SearchArgs {
        SearchArgs {
            username: None,
            team_name: None,
            age_goe: None,
            age_loe: None,
            page: None,
            size: None,
            sort: Vec::new(),
        }
    }

    #[test]
    fn seed_then_search_prints_camel_case_rows() {
        let conn = open_db_in_memory().expect("db should open");
        let summary = run(&conn, Commands::Seed { members: 4 });
        assert_eq!(summary["membersInserted"], 4);
        assert_eq!(summary["teamsInserted"], 2);

        let rows = run(
            &conn,
            Commands::Search(SearchArgs {
                team_name: Some("teamB".to_string()),
                ..search_args()
            }),
        );
        let rows = rows.as_array().expect("rows should be an array");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["username"], "member1");
        assert_eq!(rows[0]["teamName"], "teamB");
        assert!(rows[0]["memberId"].is_i64());
    }

    #[test]
    fn paged_search_prints_page_envelope() {
        let conn = open_db_in_memory().expect("db should open");
        run(&conn, Commands::Seed { members: 10 });

        let page = run(
            &conn,
            Commands::Search(SearchArgs {
                page: Some(1),
                size: Some(4),
                ..search_args()
            }),
        );
        assert_eq!(page["totalElements"], 10);
        assert_eq!(page["totalPages"], 3);
        assert_eq!(page["content"].as_array().map(Vec::len), Some(4));
    }

    #[test]
    fn bulk_age_plus_reports_updated_rows() {
        let conn = open_db_in_memory().expect("db should open");
        run(&conn, Commands::Seed { members: 5 });
        let result = run(&conn, Commands::BulkAgePlus { age: 2 });
        assert_eq!(result["updated"], 3);
    }

    #[test]
    fn seeded_file_database_survives_reopen() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = dir.path().join("roster.sqlite3");
        {
            let conn = open_db(&path).expect("db should open");
            run(&conn, Commands::Seed { members: 3 });
        }

        let conn = open_db(&path).expect("db should reopen");
        let record = run(&conn, Commands::Member { id: 3 });
        assert_eq!(record["username"], "member2");
        assert_eq!(record["age"], 2);
    }

    #[test]
    fn missing_member_is_an_error() {
        let conn = open_db_in_memory().expect("db should open");
        let mut out = Vec::new();
        let err = dispatch(&Commands::Member { id: 42 }, &conn, &mut out)
            .expect_err("missing member should fail");
        assert!(err.to_string().contains("42"));
    }
}
