//! jira-estimates - Jira original estimate summarizer
//!
//! A CLI tool that runs a JQL search against Jira, sums the original
//! estimates of the matching issues per story and per author, and prints
//! the totals in 8-hour work days.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (config, connection, Jira API failure, etc.)
//!   2 - No issues matched and --fail-on-empty was set

mod analysis;
mod cli;
mod config;
mod jira;
mod models;
mod report;

use analysis::AggregateOptions;
use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::{Config, DEFAULT_CONFIG_FILE};
use indicatif::{ProgressBar, ProgressStyle};
use jira::{JiraClient, JiraClientConfig};
use models::{IssueRecord, Report, ReportMetadata};
use std::path::{Path, PathBuf};
use std::time::Duration;
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

    // Handle --init-config and --convert early (no logging needed)
    if args.init_config {
        return handle_init_config(&config_path(&args));
    }
    if let Some(ref raw) = args.convert {
        handle_convert(raw);
        return Ok(());
    }

    init_logging(&args);

    info!("jira-estimates v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", redacted(&args));

    match run_summary(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Summary failed: {}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default config file.
fn handle_init_config(path: &Path) -> Result<()> {
    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            path.display()
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("✅ Created {} with default settings.", path.display());
    println!("   Fill in email, api_token, project and authors.");
    Ok(())
}

/// Handle --convert: print an estimate in minutes and work-day format.
fn handle_convert(raw: &str) {
    let minutes = analysis::parse_estimate(raw);
    println!(
        "{} minutes ({} | {})",
        minutes,
        analysis::format_hm(minutes),
        analysis::format_dhm(minutes)
    );
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Args with the API token masked, for debug logging.
fn redacted(args: &Args) -> Args {
    let mut args = args.clone();
    if args.api_token.is_some() {
        args.api_token = Some("***".to_string());
    }
    args
}

fn config_path(args: &Args) -> PathBuf {
    args.config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Run the fetch, aggregate and render workflow. Returns the exit code.
async fn run_summary(args: Args) -> Result<i32> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    config.validate_for_query(args.fix_version.as_deref(), args.jql.as_deref())?;

    if args.save_config {
        let path = config_path(&args);
        config.save(&path)?;
        info!("Saved settings to {}", path.display());
        if !args.quiet {
            eprintln!("✅ Settings saved to {}", path.display());
        }
    }

    let jql = match args.jql {
        Some(ref raw) => raw.clone(),
        None => jira::build_jql(
            &config.jira.project,
            args.fix_version.as_deref().unwrap_or_default(),
            &config.query.authors,
            &config.query.author_field,
        ),
    };

    // Step 1: fetch. A failed fetch is reported and summarized as empty.
    let (issues, fetch_failed) = match fetch_issues(&config, &jql, args.quiet).await {
        Ok(issues) => (issues, false),
        Err(e) => {
            error!("Jira fetch failed: {}", e);
            eprintln!("❌ {}", e);
            (Vec::new(), true)
        }
    };

    // Step 2: aggregate
    let status_set = config.query.status_set();
    let options = AggregateOptions {
        sort_groups_by_key: config.report.sort_groups_by_key,
    };
    let aggregation = analysis::aggregate_with(
        &issues,
        &config.query.authors,
        status_set.as_ref(),
        options,
    );

    match aggregation.summary() {
        Some(summary) => info!(
            "Summed {} issues: {} minutes ({})",
            summary.issue_count, summary.total_minutes, summary.total_work_time
        ),
        None => warn!("No issues matched the query"),
    }

    // Step 3: render
    let report = Report {
        metadata: ReportMetadata {
            jira_url: config.jira.url.clone(),
            jql,
            generated_at: Utc::now(),
            status_filter: status_set
                .map(|set| set.into_iter().collect())
                .unwrap_or_default(),
        },
        aggregation,
    };

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report),
    };

    println!("{}", output);

    if let Some(ref path) = args.output {
        std::fs::write(path, &output)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        info!("Report saved to {}", path.display());
    }

    if fetch_failed {
        return Ok(1);
    }
    if args.fail_on_empty && report.aggregation.is_empty() {
        eprintln!("\n⛔ No issues matched the query. Failing (exit code 2).");
        return Ok(2);
    }

    Ok(0)
}

/// Run the Jira search behind a spinner.
async fn fetch_issues(config: &Config, jql: &str, quiet: bool) -> Result<Vec<IssueRecord>> {
    let client = JiraClient::new(JiraClientConfig {
        base_url: config.jira.url.clone(),
        email: config.jira.email.clone(),
        api_token: config.jira.api_token.clone(),
        timeout_seconds: config.jira.timeout_seconds,
        page_size: config.jira.page_size,
        max_issues: config.jira.max_issues,
    })?;

    let spinner = (!quiet).then(|| {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!("Fetching issues from {}", config.jira.url));
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    });

    let result = client.search(jql).await;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    Ok(result?)
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        if config_path.exists() || !args.save_config {
            info!("Loading config from: {}", config_path.display());
            return Config::load(config_path);
        }
        debug!("Config {} does not exist yet", config_path.display());
        return Ok(Config::default());
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", DEFAULT_CONFIG_FILE);
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
