use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "booking-wizard")]
#[command(about = "Book lash appointments against the booking API")]
pub struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the API base URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List bookable services
    Services,

    /// List add-ons
    AddOns,

    /// Show time slots for a date
    Slots {
        /// Date in YYYY-MM-DD format
        #[arg(long)]
        date: NaiveDate,
    },

    /// Replay a booking plan and submit it
    Book {
        /// Path to the booking plan (TOML)
        plan: PathBuf,

        /// Walk through every step without submitting
        #[arg(long)]
        dry_run: bool,
    },

    /// Look up an appointment by confirmation code
    Lookup { code: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_book_command() {
        let cli = Cli::parse_from([
            "booking-wizard",
            "--api-url",
            "http://localhost:9000/api",
            "book",
            "plan.toml",
            "--dry-run",
        ]);

        assert_eq!(cli.api_url.as_deref(), Some("http://localhost:9000/api"));
        match cli.command {
            Command::Book { plan, dry_run } => {
                assert_eq!(plan, PathBuf::from("plan.toml"));
                assert!(dry_run);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_slots_date() {
        let cli = Cli::parse_from(["booking-wizard", "slots", "--date", "2026-11-03", "-v"]);
        assert!(cli.verbose);
        match cli.command {
            Command::Slots { date } => {
                assert_eq!(date, NaiveDate::from_ymd_opt(2026, 11, 3).unwrap())
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_date_is_rejected() {
        assert!(Cli::try_parse_from(["booking-wizard", "slots", "--date", "03/11/2026"]).is_err());
    }
}
