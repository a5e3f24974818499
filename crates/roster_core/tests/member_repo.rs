use roster_core::query::column::{member, team};
use roster_core::query::page::{Direction, PageRequest, Sort};
use roster_core::{
    open_db_in_memory, EntityRef, Member, MemberRepository, MemberService, RepoError,
    SqliteMemberRepository, SqliteTeamRepository, Team, TeamRepository, ValidationError,
};
use rusqlite::Connection;

fn save_all(repo: &SqliteMemberRepository<'_>, members: &[(&str, i32)]) {
    for (name, age) in members {
        repo.save(&mut Member::with_age(*name, *age), None).unwrap();
    }
}

#[test]
fn save_assigns_id_and_find_by_id_roundtrips() {
    let conn = open_db_in_memory().unwrap();
    let teams = SqliteTeamRepository::try_new(&conn).unwrap();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    let mut team = Team::new("teamA");
    let team_id = teams.save(&mut team).unwrap();
    let mut member = Member::with_age("member1", 10);
    assert!(!member.is_persisted());

    let id = repo.save(&mut member, Some(team_id)).unwrap();

    assert_eq!(member.id(), Some(id));
    let record = repo.find_by_id(id).unwrap().unwrap();
    assert_eq!(record.username, "member1");
    assert_eq!(record.age, 10);
    assert_eq!(record.team_id, Some(team_id));
    assert!(record.created_at > 0);
    assert!(repo.find_by_id(id + 100).unwrap().is_none());
}

#[test]
fn save_on_persisted_member_updates_in_place() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    let mut member = Member::with_age("member1", 10);
    let id = repo.save(&mut member, None).unwrap();
    member.username = "renamed".to_string();
    member.age = 11;
    assert_eq!(repo.save(&mut member, None).unwrap(), id);

    assert_eq!(repo.count().unwrap(), 1);
    let record = repo.find_by_id(id).unwrap().unwrap();
    assert_eq!(record.username, "renamed");
    assert_eq!(record.age, 11);
}

#[test]
fn invalid_member_is_rejected_before_write() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    let err = repo.save(&mut Member::with_age("  ", 10), None).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::BlankUsername)
    ));
    let err = repo.save(&mut Member::with_age("member1", -1), None).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::NegativeAge(-1))
    ));
    assert_eq!(repo.count().unwrap(), 0);
}

#[test]
fn delete_removes_row_and_reports_missing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();
    let id = repo.save(&mut Member::new("member1"), None).unwrap();

    repo.delete(id).unwrap();

    assert!(repo.find_all().unwrap().is_empty());
    assert!(matches!(
        repo.delete(id),
        Err(RepoError::NotFound(EntityRef::Member(missing))) if missing == id
    ));
}

#[test]
fn username_queries_match_exactly() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();
    save_all(&repo, &[("AAA", 10), ("AAA", 20), ("BBB", 30)]);

    assert_eq!(repo.find_by_username("AAA").unwrap().len(), 2);
    assert!(repo.find_by_username("aaa").unwrap().is_empty());

    let first = repo.find_optional_by_username("AAA").unwrap().unwrap();
    assert_eq!(first.age, 10);
    assert!(repo.find_optional_by_username("CCC").unwrap().is_none());

    let older = repo.find_by_username_and_age_greater_than("AAA", 15).unwrap();
    assert_eq!(older.len(), 1);
    assert_eq!(older[0].age, 20);
}

#[test]
fn usernames_are_listed_in_id_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();
    save_all(&repo, &[("CCC", 1), ("AAA", 2), ("BBB", 3)]);

    assert_eq!(repo.find_usernames().unwrap(), vec!["CCC", "AAA", "BBB"]);
}

#[test]
fn find_by_names_uses_in_list() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();
    save_all(&repo, &[("AAA", 10), ("BBB", 20), ("CCC", 30)]);

    let found = repo
        .find_by_names(&["AAA".to_string(), "CCC".to_string(), "ZZZ".to_string()])
        .unwrap();
    let names: Vec<_> = found.iter().map(|record| record.username.as_str()).collect();
    assert_eq!(names, vec!["AAA", "CCC"]);
    assert!(repo.find_by_names(&[]).unwrap().is_empty());
}

#[test]
fn member_team_names_skip_team_less_members() {
    let conn = open_db_in_memory().unwrap();
    let teams = SqliteTeamRepository::try_new(&conn).unwrap();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();
    let team_id = teams.save(&mut Team::new("teamA")).unwrap();
    repo.save(&mut Member::with_age("AAA", 10), Some(team_id))
        .unwrap();
    repo.save(&mut Member::with_age("BBB", 20), None).unwrap();

    let rows = repo.find_member_team_names().unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].username, "AAA");
    assert_eq!(rows[0].team_name, "teamA");
}

#[test]
fn find_by_age_pages_with_total() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();
    save_all(
        &repo,
        &[
            ("member1", 10),
            ("member2", 10),
            ("member3", 10),
            ("member4", 10),
            ("member5", 10),
            ("other", 20),
        ],
    );

    let request = PageRequest::of(0, 3).with_sort(Sort::by(member::USERNAME, Direction::Desc));
    let page = repo.find_by_age(10, &request).unwrap();

    let names: Vec<_> = page
        .content()
        .iter()
        .map(|record| record.username.as_str())
        .collect();
    assert_eq!(names, vec!["member5", "member4", "member3"]);
    assert_eq!(page.total_elements(), 5);
    assert_eq!(page.total_pages(), 2);
    assert!(page.is_first());
    assert!(page.has_next());
}

#[test]
fn find_by_age_sorts_by_team_name_and_keeps_team_less_members() {
    let conn = open_db_in_memory().unwrap();
    let teams = SqliteTeamRepository::try_new(&conn).unwrap();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();
    let team_a = teams.save(&mut Team::new("teamA")).unwrap();
    let team_b = teams.save(&mut Team::new("teamB")).unwrap();
    repo.save(&mut Member::with_age("AAA", 10), Some(team_b))
        .unwrap();
    repo.save(&mut Member::with_age("BBB", 10), Some(team_a))
        .unwrap();
    repo.save(&mut Member::with_age("CCC", 10), None).unwrap();
    repo.save(&mut Member::with_age("DDD", 20), Some(team_a))
        .unwrap();

    let request = PageRequest::of(0, 3).with_sort(Sort::by(team::NAME, Direction::Asc));
    let page = repo.find_by_age(10, &request).unwrap();

    let names: Vec<_> = page
        .content()
        .iter()
        .map(|record| record.username.as_str())
        .collect();
    assert_eq!(names, vec!["CCC", "BBB", "AAA"]);
    assert_eq!(page.total_elements(), 3);
}

#[test]
fn bulk_age_plus_updates_members_at_or_above_age() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();
    save_all(
        &repo,
        &[
            ("member1", 10),
            ("member2", 19),
            ("member3", 20),
            ("member4", 30),
            ("member5", 40),
        ],
    );

    let service = MemberService::new(repo);
    assert_eq!(service.bulk_age_plus(20).unwrap(), 3);

    let ages: Vec<i32> = service
        .repo()
        .find_all()
        .unwrap()
        .iter()
        .map(|record| record.age)
        .collect();
    assert_eq!(ages, vec![10, 19, 21, 31, 41]);
}

#[test]
fn service_lookups_delegate_to_repository() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();
    save_all(&repo, &[("AAA", 10), ("BBB", 20)]);
    let service = MemberService::new(repo);

    assert_eq!(service.list_usernames().unwrap(), vec!["AAA", "BBB"]);
    let first_id = service.repo().find_all().unwrap()[0].id;
    assert_eq!(
        service.find_member(first_id).unwrap().map(|record| record.username),
        Some("AAA".to_string())
    );
    assert!(service.find_member(first_id + 50).unwrap().is_none());
}

#[test]
fn team_delete_keeps_members_without_team() {
    let conn = open_db_in_memory().unwrap();
    let teams = SqliteTeamRepository::try_new(&conn).unwrap();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();
    let team_id = teams.save(&mut Team::new("teamA")).unwrap();
    let member_id = repo
        .save(&mut Member::with_age("AAA", 10), Some(team_id))
        .unwrap();

    teams.delete(team_id).unwrap();

    assert_eq!(teams.count().unwrap(), 0);
    assert_eq!(repo.find_by_id(member_id).unwrap().unwrap().team_id, None);
    assert!(matches!(
        teams.delete(team_id),
        Err(RepoError::NotFound(EntityRef::Team(_)))
    ));
}

#[test]
fn repositories_reject_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();

    assert!(matches!(
        SqliteMemberRepository::try_new(&conn),
        Err(RepoError::UninitializedConnection {
            actual_version: 0,
            ..
        })
    ));
    assert!(matches!(
        SqliteTeamRepository::try_new(&conn),
        Err(RepoError::UninitializedConnection { .. })
    ));
}

#[test]
fn repositories_reject_missing_table_at_latest_version() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!(
        "PRAGMA user_version = {};",
        roster_core::db::migrations::latest_version()
    ))
    .unwrap();

    assert!(matches!(
        SqliteTeamRepository::try_new(&conn),
        Err(RepoError::MissingRequiredTable("teams"))
    ));
}
