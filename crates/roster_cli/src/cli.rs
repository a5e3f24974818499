use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use roster_core::query::column::sort_property;
use roster_core::query::page::{Direction, Order};
use roster_core::MemberSearchCondition;

/// Top-level CLI parser for the `roster` binary.
#[derive(Debug, Parser)]
#[command(name = "roster", version, about = "Member/team roster over SQLite")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// SQLite database file
    #[arg(long, global = true, env = "ROSTER_DB", default_value = "roster.sqlite3")]
    pub db: PathBuf,

    /// Log level: trace, debug, info, warn, error (defaults by build mode)
    #[arg(long, global = true, env = "ROSTER_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Directory for rolling log files; logging is off when unset
    #[arg(long, global = true, env = "ROSTER_LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

impl Cli {
    /// Level from `--log-level`/`ROSTER_LOG_LEVEL`, else the build-mode default.
    pub fn log_level(&self) -> &str {
        self.log_level
            .as_deref()
            .unwrap_or_else(|| roster_core::default_log_level())
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Insert teamA/teamB and N members (even index -> teamA)
    Seed {
        #[arg(long, default_value_t = 100)]
        members: u32,
    },
    /// Search members by optional criteria and print JSON
    Search(SearchArgs),
    /// Print one member by id
    Member { id: i64 },
    /// Add one year to every member aged AGE or older
    BulkAgePlus { age: i32 },
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    #[arg(long)]
    pub username: Option<String>,

    #[arg(long)]
    pub team_name: Option<String>,

    /// Inclusive lower age bound
    #[arg(long)]
    pub age_goe: Option<i32>,

    /// Inclusive upper age bound
    #[arg(long)]
    pub age_loe: Option<i32>,

    /// Zero-based page number; enables paged output
    #[arg(long)]
    pub page: Option<u32>,

    /// Page size (1..=100); enables paged output
    #[arg(long)]
    pub size: Option<u32>,

    /// Sort key as FIELD[,asc|desc]; repeatable, enables paged output
    #[arg(long, value_parser = parse_order)]
    pub sort: Vec<Order>,
}

impl SearchArgs {
    pub fn condition(&self) -> MemberSearchCondition {
        MemberSearchCondition {
            username: self.username.clone(),
            team_name: self.team_name.clone(),
            age_goe: self.age_goe,
            age_loe: self.age_loe,
        }
    }

    pub fn is_paged(&self) -> bool {
        self.page.is_some() || self.size.is_some() || !self.sort.is_empty()
    }
}

fn parse_order(value: &str) -> Result<Order, String> {
    let (field, direction) = match value.split_once(',') {
        Some((field, direction)) => (
            field,
            Direction::parse(direction)
                .ok_or_else(|| format!("unknown sort direction `{direction}`"))?,
        ),
        None => (value, Direction::Asc),
    };
    let column = sort_property(field).ok_or_else(|| {
        format!("unknown sort field `{field}`; expected id|username|age|team_name")
    })?;
    Ok(Order { column, direction })
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};
    use roster_core::query::column::{member, team};
    use roster_core::query::page::Direction;

    use super::{Cli, Commands};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn search_flags_build_condition() {
        let cli = Cli::try_parse_from([
            "roster",
            "search",
            "--team-name",
            "teamB",
            "--age-goe",
            "35",
            "--age-loe",
            "40",
        ])
        .expect("cli should parse");

        let Commands::Search(args) = cli.command else {
            panic!("expected search command");
        };
        let condition = args.condition();
        assert_eq!(condition.team_name.as_deref(), Some("teamB"));
        assert_eq!(condition.age_goe, Some(35));
        assert_eq!(condition.age_loe, Some(40));
        assert!(condition.username.is_none());
        assert!(!args.is_paged());
    }

    #[test]
    fn sort_flags_parse_field_and_direction() {
        let cli = Cli::try_parse_from([
            "roster",
            "search",
            "--sort",
            "username,desc",
            "--sort",
            "team_name",
        ])
        .expect("cli should parse");

        let Commands::Search(args) = cli.command else {
            panic!("expected search command");
        };
        assert!(args.is_paged());
        assert_eq!(args.sort[0].column, member::USERNAME);
        assert_eq!(args.sort[0].direction, Direction::Desc);
        assert_eq!(args.sort[1].column, team::NAME);
        assert_eq!(args.sort[1].direction, Direction::Asc);
    }

    #[test]
    fn unknown_sort_field_is_rejected() {
        let parsed = Cli::try_parse_from(["roster", "search", "--sort", "password"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn log_level_flag_overrides_build_default() {
        let cli = Cli::try_parse_from(["roster", "--log-level", "warn", "member", "1"])
            .expect("cli should parse");
        assert_eq!(cli.log_level(), "warn");

        let cli = Cli::try_parse_from(["roster", "member", "1"]).expect("cli should parse");
        if std::env::var_os("ROSTER_LOG_LEVEL").is_none() {
            assert_eq!(cli.log_level(), roster_core::default_log_level());
        }
    }

    #[test]
    fn global_db_flag_parses_after_subcommand() {
        let cli = Cli::try_parse_from(["roster", "member", "7", "--db", "/tmp/x.sqlite3"])
            .expect("cli should parse");
        assert_eq!(cli.db.to_str(), Some("/tmp/x.sqlite3"));
        assert!(matches!(cli.command, Commands::Member { id: 7 }));
    }
}
