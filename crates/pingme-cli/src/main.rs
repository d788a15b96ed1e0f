//! pingme
//!
//! Schedule desktop notifications from the command line.
//!
//! # Usage
//!
//! ```bash
//! pingme now "message"           # Immediate notification
//! pingme in 30m "message"        # In 30 minutes
//! pingme at 17:30 "message"      # At a clock time (tomorrow if past)
//! pingme every 90m "message"     # Recurring every 90 minutes
//! pingme list                    # Show pending reminders with IDs
//! pingme cancel <id>             # Cancel by id, fire time, or substring
//! pingme clear                   # Remove all reminders
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/pingme/config.toml)
//! 3. Environment variables (PINGME_*)
//! 4. CLI flags

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;

use pingme_cli::{
    build_scheduler, handle_at, handle_cancel, handle_clear, handle_every, handle_fire,
    handle_in, handle_list, handle_now, Cli, Commands,
};
use pingme_core::Settings;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref()).context("Failed to load configuration")?;

    // CLI flags have the highest precedence.
    if let Some(state_dir) = cli.state_dir.as_deref() {
        settings.state_dir = state_dir.to_string();
    }
    if let Some(log_level) = cli.log_level.as_deref() {
        settings.log_level = log_level.to_string();
    }
    settings.validate()?;

    // Logs go to stderr; stdout is reserved for command output.
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_level)),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    let scheduler = build_scheduler(&settings)?;
    let now = Local::now();

    match cli.command {
        Commands::Now { message } => handle_now(&scheduler, &message)?,
        Commands::In { duration, message } => handle_in(&scheduler, &duration, &message, now)?,
        Commands::At { time, message } => handle_at(&scheduler, &time, &message, now)?,
        Commands::Every { interval, message } => {
            handle_every(&scheduler, &interval, &message, now)?
        }
        Commands::List => handle_list(&scheduler, now)?,
        Commands::Cancel { selector } => handle_cancel(&scheduler, &selector, now)?,
        Commands::Clear => handle_clear(&scheduler)?,
        Commands::Fire { id } => handle_fire(&scheduler, &id, now)?,
    }

    Ok(())
}
