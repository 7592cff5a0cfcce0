//! Command-line interface for focusledger.

pub mod commands;

use clap::{Parser, Subcommand};

/// focusledger - focus timer and study ledger
#[derive(Parser)]
#[command(name = "focusledger")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (default)
    #[command(alias = "web")]
    Serve,

    /// Create an account with the starter subjects
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        name: Option<String>,
    },

    /// Run a countdown in the terminal and record it when it completes
    #[command(alias = "t")]
    Timer {
        /// Subject id or name
        #[arg(long, short)]
        subject: String,
        /// Length in minutes; unparsable or zero input falls back to 25
        #[arg(long, short, conflicts_with = "preset")]
        minutes: Option<String>,
        /// Pick one of the configured presets (1-based)
        #[arg(long, short)]
        preset: Option<usize>,
        /// Write straight to the local database as this user instead of the server
        #[arg(long)]
        local_user: Option<String>,
        /// Server URL, overrides `timer.server_url`
        #[arg(long)]
        server: Option<String>,
        /// API token, overrides `timer.api_token`
        #[arg(long)]
        token: Option<String>,
    },

    /// Print the month calendar and subject breakdown for a user
    #[command(alias = "r")]
    Report {
        #[arg(long)]
        email: String,
        /// `YYYY-MM`, defaults to the current month
        #[arg(long)]
        month: Option<String>,
    },

    /// Write a default config.toml to the working directory
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["focusledger"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_timer_args() {
        let cli = Cli::try_parse_from([
            "focusledger",
            "timer",
            "--subject",
            "Reading",
            "--minutes",
            "50",
            "--local-user",
            "me@example.com",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Timer {
                subject,
                minutes,
                local_user,
                ..
            }) => {
                assert_eq!(subject, "Reading");
                assert_eq!(minutes.as_deref(), Some("50"));
                assert_eq!(local_user.as_deref(), Some("me@example.com"));
            }
            _ => panic!("expected timer command"),
        }
    }

    #[test]
    fn test_minutes_and_preset_conflict() {
        let result = Cli::try_parse_from([
            "focusledger",
            "timer",
            "-s",
            "1",
            "-m",
            "5",
            "-p",
            "2",
        ]);
        assert!(result.is_err());
    }
}
