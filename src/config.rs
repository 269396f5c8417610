//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.pulsedesk.toml` files.

use crate::analysis::MAX_WINDOW_DAYS;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".pulsedesk.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Record export locations.
    #[serde(default)]
    pub data: DataConfig,

    /// Analytics settings.
    #[serde(default)]
    pub analytics: AnalyticsConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,

    /// Widget SDK settings.
    #[serde(default)]
    pub embed: EmbedConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Report output file. Reports go to stdout when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

/// Where the exported records live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory holding the JSON exports.
    #[serde(default = "default_data_dir")]
    pub dir: PathBuf,

    #[serde(default = "default_users_file")]
    pub users_file: String,

    #[serde(default = "default_feedback_file")]
    pub feedback_file: String,

    #[serde(default = "default_websites_file")]
    pub websites_file: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: default_data_dir(),
            users_file: default_users_file(),
            feedback_file: default_feedback_file(),
            websites_file: default_websites_file(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_users_file() -> String {
    "users.json".to_string()
}

fn default_feedback_file() -> String {
    "feedback.json".to_string()
}

fn default_websites_file() -> String {
    "websites.json".to_string()
}

/// Analytics settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Trailing window for the single-user view, in days.
    #[serde(default = "default_user_window_days")]
    pub user_window_days: i64,

    /// Number of AI keywords listed in reports.
    #[serde(default = "default_top_keywords")]
    pub top_keywords: usize,

    /// Days covered by the daily activity table.
    #[serde(default = "default_daily_days")]
    pub daily_days: u32,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            user_window_days: default_user_window_days(),
            top_keywords: default_top_keywords(),
            daily_days: default_daily_days(),
        }
    }
}

fn default_user_window_days() -> i64 {
    crate::analysis::DEFAULT_USER_WINDOW_DAYS
}

fn default_top_keywords() -> usize {
    5
}

fn default_daily_days() -> u32 {
    14
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Include the AI insights section.
    #[serde(default = "default_true")]
    pub include_insights: bool,

    /// Include the daily activity table.
    #[serde(default = "default_true")]
    pub include_daily_activity: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            include_insights: true,
            include_daily_activity: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Which widget SDK build to embed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SdkSource {
    /// Locally served development build
    Local,
    /// Versioned CDN bundle (default)
    #[default]
    Packaged,
}

/// Widget SDK settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedConfig {
    #[serde(default)]
    pub sdk: SdkSource,

    /// Base URL of the local development server.
    #[serde(default = "default_local_url")]
    pub local_url: String,

    /// Base URL of the CDN bundle.
    #[serde(default = "default_cdn_url")]
    pub cdn_url: String,

    /// Published SDK version to load from the CDN.
    #[serde(default = "default_sdk_version")]
    pub version: String,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            sdk: SdkSource::default(),
            local_url: default_local_url(),
            cdn_url: default_cdn_url(),
            version: default_sdk_version(),
        }
    }
}

fn default_local_url() -> String {
    "http://localhost:5173".to_string()
}

fn default_cdn_url() -> String {
    "https://cdn.pulsedesk.io/widget".to_string()
}

fn default_sdk_version() -> String {
    "1.0.0".to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were actually given.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref dir) = args.data_dir {
            self.data.dir = dir.clone();
        }

        if let Some(ref output) = args.output {
            self.general.output = Some(output.clone());
        }
    }

    /// Check settings that the file format alone cannot constrain.
    pub fn validate(&self) -> Result<()> {
        let analytics = &self.analytics;

        if !(1..=MAX_WINDOW_DAYS).contains(&analytics.user_window_days) {
            bail!(
                "analytics.user_window_days must be between 1 and {}, got {}",
                MAX_WINDOW_DAYS,
                analytics.user_window_days
            );
        }

        if i64::from(analytics.daily_days) > MAX_WINDOW_DAYS {
            bail!(
                "analytics.daily_days must be at most {}, got {}",
                MAX_WINDOW_DAYS,
                analytics.daily_days
            );
        }

        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.data.dir, PathBuf::from("data"));
        assert_eq!(config.analytics.user_window_days, 30);
        assert_eq!(config.embed.sdk, SdkSource::Packaged);
        assert!(config.general.output.is_none());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output = "weekly.md"

[data]
dir = "/var/exports"

[analytics]
user_window_days = 14

[embed]
sdk = "local"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output, Some(PathBuf::from("weekly.md")));
        assert_eq!(config.data.dir, PathBuf::from("/var/exports"));
        assert_eq!(config.data.users_file, "users.json");
        assert_eq!(config.analytics.user_window_days, 14);
        assert_eq!(config.analytics.top_keywords, 5);
        assert_eq!(config.embed.sdk, SdkSource::Local);
        assert_eq!(config.embed.version, "1.0.0");
    }

    #[test]
    fn test_validate_window_settings() {
        assert!(Config::default().validate().is_ok());

        let mut config = Config::default();
        config.analytics.user_window_days = 0;
        assert!(config.validate().is_err());

        config.analytics.user_window_days = -14;
        assert!(config.validate().is_err());

        config.analytics.user_window_days = MAX_WINDOW_DAYS + 1;
        assert!(config.validate().is_err());

        config.analytics.user_window_days = MAX_WINDOW_DAYS;
        config.analytics.daily_days = u32::MAX;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("daily_days"));
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[data]"));
        assert!(toml_str.contains("[embed]"));

        let reparsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(reparsed.embed.cdn_url, default_cdn_url());
    }
}
