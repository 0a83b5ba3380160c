use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{ArgAction, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "dealbook",
    version,
    about = "Dealbook: lead and deal schedule viewer",
    disable_help_subcommand = true
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    pub quiet: u8,

    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// JSON file holding an array of schedule items; `-` reads stdin.
    #[arg(long = "items", global = true)]
    pub items: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Group every item under its date.
    Index {
        #[arg(long)]
        json: bool,
    },
    /// One day's items in time order.
    Agenda {
        /// Date key (YYYY-MM-DD); defaults to today.
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Month calendar with per-day item counts.
    Month {
        /// Month key (YYYY-MM); defaults to the current month.
        #[arg(long)]
        month: Option<String>,
        /// Months to move from that month, e.g. `1` for the next one.
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        offset: i32,
    },
    /// Show the display forms of a date key.
    Format { date: String },
}

impl Command {
    pub fn needs_items(&self) -> bool {
        !matches!(self, Command::Format { .. })
    }
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Command, GlobalCli};

    #[test]
    fn parses_agenda_with_global_flags_after_subcommand() {
        let cli = GlobalCli::try_parse_from([
            "dealbook",
            "agenda",
            "--date",
            "2025-04-09",
            "--items",
            "items.json",
            "-vv",
        ])
        .expect("parse args");

        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.items.as_deref(), Some(std::path::Path::new("items.json")));
        assert_eq!(
            cli.command,
            Command::Agenda {
                date: Some("2025-04-09".to_string()),
                json: false,
            }
        );
    }

    #[test]
    fn format_needs_no_items() {
        let cli = GlobalCli::try_parse_from(["dealbook", "format", "2025-04-11"]).expect("parse args");
        assert!(!cli.command.needs_items());
        assert!(cli.items.is_none());
    }

    #[test]
    fn month_accepts_negative_offset() {
        let cli = GlobalCli::try_parse_from(["dealbook", "month", "--month", "2025-01", "--offset", "-2"])
            .expect("parse args");
        assert_eq!(
            cli.command,
            Command::Month {
                month: Some("2025-01".to_string()),
                offset: -2,
            }
        );
    }

    #[test]
    fn subcommand_is_required() {
        assert!(GlobalCli::try_parse_from(["dealbook"]).is_err());
    }
}
