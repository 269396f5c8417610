//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::analysis::MAX_WINDOW_DAYS;
use crate::config::SdkSource;
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Pulsedesk - back office for the feedback widget
///
/// Roll up exported feedback and user records into analytics reports,
/// resolve default websites, validate widget configurations and print
/// embed snippets.
///
/// Examples:
///   pulsedesk stats --from 2026-09-01 --to 2026-09-30
///   pulsedesk --format json user-stats --user u_123 --days 14
///   pulsedesk default-site --user u_123
///   pulsedesk validate-widget ./widget.json
///   pulsedesk embed --user u_123 --sdk local
///   pulsedesk init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file
    ///
    /// If not specified, looks for .pulsedesk.toml in the current directory
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory holding users.json, feedback.json and websites.json
    #[arg(long, global = true, value_name = "DIR", env = "PULSEDESK_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Output file path for reports (stdout when omitted)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, global = true, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Reference time for windowed statistics (RFC 3339, defaults to now)
    #[arg(long, global = true, value_name = "TIMESTAMP")]
    pub as_of: Option<DateTime<Utc>>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Analytics across all users
    Stats {
        /// Only include records created on or after this date (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        from: Option<NaiveDate>,

        /// Only include records created on or before this date (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        to: Option<NaiveDate>,
    },

    /// Analytics for one user's feedback over a trailing window
    UserStats {
        /// User id
        #[arg(short, long)]
        user: String,

        /// Trailing window in days (default from config, 30)
        #[arg(long, value_name = "DAYS")]
        days: Option<i64>,
    },

    /// Show which website is the user's default
    DefaultSite {
        /// User id
        #[arg(short, long)]
        user: String,
    },

    /// Validate a widget configuration JSON file
    ///
    /// Exit code 2 when the configuration is invalid.
    ValidateWidget {
        /// Path to the configuration JSON
        file: PathBuf,
    },

    /// Print the embed snippet for a user's default website
    Embed {
        /// User id
        #[arg(short, long)]
        user: String,

        /// SDK build to load (overrides config)
        #[arg(long, value_name = "SOURCE")]
        sdk: Option<SdkSource>,
    },

    /// Generate a default .pulsedesk.toml configuration file
    InitConfig,
}

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        match &self.command {
            Command::Stats {
                from: Some(from),
                to: Some(to),
            } if from > to => {
                return Err(format!("--from ({}) is after --to ({})", from, to));
            }
            Command::UserStats {
                days: Some(days), ..
            } if !(1..=MAX_WINDOW_DAYS).contains(days) => {
                return Err(format!(
                    "Days must be between 1 and {}, got {}",
                    MAX_WINDOW_DAYS, days
                ));
            }
            Command::UserStats { user, .. }
            | Command::DefaultSite { user }
            | Command::Embed { user, .. }
                if user.trim().is_empty() =>
            {
                return Err("User id must not be empty".to_string());
            }
            Command::ValidateWidget { file } if !file.is_file() => {
                return Err(format!("Widget config file not found: {}", file.display()));
            }
            _ => {}
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Reference time for windowed statistics.
    pub fn now(&self) -> DateTime<Utc> {
        self.as_of.unwrap_or_else(Utc::now)
    }
}
