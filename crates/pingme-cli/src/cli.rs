//! CLI argument parsing for pingme.

use clap::{Parser, Subcommand};

/// pingme
///
/// Schedule desktop notifications from the command line. Reminders are
/// tracked in a small JSON file and fire through detached timer processes,
/// so they survive the invoking shell.
#[derive(Parser, Debug)]
#[command(name = "pingme")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/pingme/config)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Directory holding reminder state (default ~/.pingme)
    #[arg(short, long, global = true)]
    pub state_dir: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Reminder commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send a notification immediately
    Now {
        /// Notification text
        message: String,
    },

    /// Remind after a delay ("30m", "1h30m", "90m", or plain seconds)
    In {
        /// How long to wait
        duration: String,

        /// Notification text
        message: String,
    },

    /// Remind at a clock time ("17:30", "5:30pm", "5pm"); rolls to
    /// tomorrow if already past
    At {
        /// When to fire
        time: String,

        /// Notification text
        message: String,
    },

    /// Remind repeatedly at a fixed interval ("90m"; minimum one minute)
    Every {
        /// Gap between notifications
        interval: String,

        /// Notification text
        message: String,
    },

    /// Show pending reminders with IDs
    List,

    /// Cancel one reminder by id, id prefix, fire time (HH:MM), or
    /// message substring
    Cancel {
        /// What to cancel
        selector: String,
    },

    /// Remove all reminders
    Clear,

    /// Deliver a scheduled notification (invoked by armed timers)
    #[command(hide = true)]
    Fire {
        /// Reminder id to fire
        id: String,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_now() {
        let cli = Cli::parse_from(["pingme", "now", "drink water"]);
        match cli.command {
            Commands::Now { message } => assert_eq!(message, "drink water"),
            _ => panic!("Expected Now command"),
        }
    }

    #[test]
    fn test_cli_in() {
        let cli = Cli::parse_from(["pingme", "in", "1h30m", "stretch"]);
        match cli.command {
            Commands::In { duration, message } => {
                assert_eq!(duration, "1h30m");
                assert_eq!(message, "stretch");
            }
            _ => panic!("Expected In command"),
        }
    }

    #[test]
    fn test_cli_at() {
        let cli = Cli::parse_from(["pingme", "at", "17:30", "standup"]);
        match cli.command {
            Commands::At { time, message } => {
                assert_eq!(time, "17:30");
                assert_eq!(message, "standup");
            }
            _ => panic!("Expected At command"),
        }
    }

    #[test]
    fn test_cli_every() {
        let cli = Cli::parse_from(["pingme", "every", "90m", "hydrate"]);
        match cli.command {
            Commands::Every { interval, message } => {
                assert_eq!(interval, "90m");
                assert_eq!(message, "hydrate");
            }
            _ => panic!("Expected Every command"),
        }
    }

    #[test]
    fn test_cli_list_and_clear() {
        assert!(matches!(
            Cli::parse_from(["pingme", "list"]).command,
            Commands::List
        ));
        assert!(matches!(
            Cli::parse_from(["pingme", "clear"]).command,
            Commands::Clear
        ));
    }

    #[test]
    fn test_cli_cancel() {
        let cli = Cli::parse_from(["pingme", "cancel", "ab12"]);
        match cli.command {
            Commands::Cancel { selector } => assert_eq!(selector, "ab12"),
            _ => panic!("Expected Cancel command"),
        }
    }

    #[test]
    fn test_cli_hidden_fire() {
        let cli = Cli::parse_from(["pingme", "fire", "ab12cd34"]);
        match cli.command {
            Commands::Fire { id } => assert_eq!(id, "ab12cd34"),
            _ => panic!("Expected Fire command"),
        }
    }

    #[test]
    fn test_cli_global_overrides() {
        let cli = Cli::parse_from([
            "pingme",
            "--config",
            "/tmp/pingme.toml",
            "--state-dir",
            "/tmp/state",
            "--log-level",
            "debug",
            "list",
        ]);
        assert_eq!(cli.config, Some("/tmp/pingme.toml".to_string()));
        assert_eq!(cli.state_dir, Some("/tmp/state".to_string()));
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_rejects_unknown_command() {
        assert!(Cli::try_parse_from(["pingme", "snooze", "5m"]).is_err());
        assert!(Cli::try_parse_from(["pingme"]).is_err());
    }
}
