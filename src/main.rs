//! Pulsedesk - back office for the feedback widget
//!
//! A CLI tool that aggregates exported feedback and user records into
//! analytics reports, resolves each user's default website, validates
//! widget configurations and prints embed snippets.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (missing user, unreadable export, bad config, etc.)
//!   2 - Widget configuration failed validation

mod analysis;
mod cli;
mod config;
mod models;
mod report;
mod store;
mod widget;

use analysis::DefaultSiteCache;
use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use cli::{Args, Command, OutputFormat};
use config::{Config, SdkSource, CONFIG_FILE_NAME};
use models::{FeedbackRecord, WidgetConfig};
use report::{AnalyticsReport, ReportMetadata};
use std::path::Path;
use store::{DateRange, FeedbackFilter, RecordStore};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle init-config early (no logging needed)
    if let Command::InitConfig = args.command {
        return handle_init_config();
    }

    init_logging(&args);

    info!("Pulsedesk v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Command failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle init-config: generate a default .pulsedesk.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to point at your data exports and SDK build.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr so reports on stdout stay clean.
fn init_logging(args: &Args) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level())
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Dispatch the selected command. Returns the process exit code.
async fn run(args: Args) -> Result<i32> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate()?;

    let store = RecordStore::new(&config.data);
    let now = args.now();

    match args.command.clone() {
        Command::Stats { from, to } => {
            let range = DateRange::from_dates(from, to);
            run_stats(&args, &config, &store, now, range, describe_range(from, to)).await
        }
        Command::UserStats { user, days } => {
            let window_days = days.unwrap_or(config.analytics.user_window_days);
            run_user_stats(&args, &config, &store, now, &user, window_days).await
        }
        Command::DefaultSite { user } => run_default_site(&args, &store, &user).await,
        Command::ValidateWidget { file } => run_validate_widget(&args, &file),
        Command::Embed { user, sdk } => run_embed(&config, &store, &user, sdk).await,
        Command::InitConfig => handle_init_config().map(|_| 0),
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}

/// Analytics across all users, optionally restricted to a date range.
async fn run_stats(
    args: &Args,
    config: &Config,
    store: &RecordStore,
    now: DateTime<Utc>,
    range: DateRange,
    range_label: Option<String>,
) -> Result<i32> {
    if !range.is_unbounded() {
        debug!("Restricting records to {:?}", range);
    }
    let filter = FeedbackFilter {
        range,
        ..FeedbackFilter::default()
    };

    let (users, feedback) = tokio::try_join!(store.fetch_users(&range), store.fetch_feedback(&filter))
        .context("Failed to load records")?;
    info!(
        "Aggregating {} users and {} feedback records",
        users.len(),
        feedback.len()
    );

    let summary = analysis::aggregate(&users, &feedback, now);
    let report = build_report(
        config,
        ReportMetadata {
            scope: "All users".to_string(),
            as_of: now,
            range: range_label,
            window_days: None,
            data_dir: config.data.dir.display().to_string(),
        },
        summary,
        &feedback,
    );

    emit_report(args, config, &report)?;
    Ok(0)
}

/// Analytics for one user's feedback over a trailing window.
async fn run_user_stats(
    args: &Args,
    config: &Config,
    store: &RecordStore,
    now: DateTime<Utc>,
    user_id: &str,
    window_days: i64,
) -> Result<i32> {
    let filter = FeedbackFilter::for_user(user_id);
    let (user, feedback) =
        tokio::try_join!(store.find_user(user_id), store.fetch_feedback(&filter))
            .context("Failed to load records")?;
    info!(
        "Aggregating {} feedback records for {} over {} days",
        feedback.len(),
        user.email,
        window_days
    );

    let summary = analysis::aggregate_user_scoped(&feedback, now, window_days);

    let in_window = analysis::restrict_to_window(&feedback, now, window_days);

    let scope = match user.display_name {
        Some(ref name) => format!("User {} ({})", user.id, name),
        None => format!("User {} ({})", user.id, user.email),
    };

    let report = build_report(
        config,
        ReportMetadata {
            scope,
            as_of: now,
            range: None,
            window_days: Some(window_days),
            data_dir: config.data.dir.display().to_string(),
        },
        summary,
        &in_window,
    );

    emit_report(args, config, &report)?;
    Ok(0)
}

/// Show the user's default website.
async fn run_default_site(args: &Args, store: &RecordStore, user_id: &str) -> Result<i32> {
    let mut cache = DefaultSiteCache::new();
    let site = store
        .default_website(user_id, &mut cache)
        .await
        .context("Failed to load websites")?;

    match (args.format, site) {
        (OutputFormat::Json, site) => {
            println!("{}", serde_json::to_string_pretty(&site)?);
        }
        (OutputFormat::Markdown, Some(site)) => {
            let status = if site.is_active { "active" } else { "inactive" };
            println!("🌐 Default website for {}:", user_id);
            println!("   {} ({})", site.name, site.id);
            println!("   Domain: {}", site.domain);
            println!("   Status: {}", status);
        }
        (OutputFormat::Markdown, None) => {
            println!("User {} has no websites.", user_id);
        }
    }

    Ok(0)
}

/// Validate a widget configuration file. Returns 2 when invalid.
fn run_validate_widget(args: &Args, path: &Path) -> Result<i32> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let proposed: WidgetConfig = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse widget config {}", path.display()))?;

    let outcome = widget::validate_widget_config(&proposed);
    for problem in &outcome.errors {
        warn!("{}", problem);
    }

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
        OutputFormat::Markdown if outcome.valid => {
            println!("✅ Widget configuration is valid: {}", path.display());
        }
        OutputFormat::Markdown => {
            println!(
                "❌ Widget configuration has {} problem(s): {}",
                outcome.errors.len(),
                path.display()
            );
            for problem in &outcome.errors {
                println!("   - {}", problem);
            }
        }
    }

    Ok(if outcome.valid { 0 } else { 2 })
}

/// Print the embed snippet for the user's default website.
async fn run_embed(
    config: &Config,
    store: &RecordStore,
    user_id: &str,
    sdk_override: Option<SdkSource>,
) -> Result<i32> {
    let mut embed_config = config.embed.clone();
    if let Some(source) = sdk_override {
        embed_config.sdk = source;
    }
    let sdk = widget::select_sdk(&embed_config);
    info!("Using {} widget SDK: {}", sdk.name(), sdk.script_src());

    let user = store.find_user(user_id).await?;
    let mut cache = DefaultSiteCache::new();
    let Some(site) = store.default_website(user_id, &mut cache).await? else {
        bail!("User {} has no websites to embed the widget on", user_id);
    };

    if !site.is_active {
        warn!("Default website {} is inactive", site.id);
    }

    println!("{}", sdk.snippet(&user.api_key, &site.id));
    Ok(0)
}

fn build_report(
    config: &Config,
    metadata: ReportMetadata,
    summary: models::AnalyticsSummary,
    feedback: &[FeedbackRecord],
) -> AnalyticsReport {
    let insights = config
        .report
        .include_insights
        .then(|| analysis::ai_insights(feedback, config.analytics.top_keywords));

    let daily_activity = if config.report.include_daily_activity {
        analysis::daily_feedback_counts(feedback, metadata.as_of, config.analytics.daily_days)
    } else {
        Vec::new()
    };

    AnalyticsReport {
        metadata,
        summary,
        insights,
        daily_activity,
    }
}

/// Render the report and write it to the configured output, or stdout.
fn emit_report(args: &Args, config: &Config, report: &AnalyticsReport) -> Result<()> {
    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(report)?,
        OutputFormat::Markdown => report::generate_markdown_report(report),
    };

    match config.general.output {
        Some(ref path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;

            let summary = &report.summary;
            println!("📊 Analytics Summary:");
            println!("   Users: {}", summary.total_users);
            println!("   Feedback: {}", summary.total_feedback);
            println!("   Average rating: {:.1}", summary.rounded_average_rating());
            println!("\n✅ Report saved to: {}", path.display());
        }
        None => print!("{}", output),
    }

    Ok(())
}

fn describe_range(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Option<String> {
    match (from, to) {
        (None, None) => None,
        (Some(from), Some(to)) => Some(format!("{} to {}", from, to)),
        (Some(from), None) => Some(format!("from {}", from)),
        (None, Some(to)) => Some(format!("through {}", to)),
    }
}
