//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `domain_watch` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use tokio_util::sync::CancellationToken;

use domain_watch::config::{
    DB_PATH, DEFAULT_BATCH_SIZE, DEFAULT_CHECK_INTERVAL, DEFAULT_FIRST_CHECK_DELAY,
    DEFAULT_GROUP, DEFAULT_MAX_CONCURRENCY, DEFAULT_USER_AGENT,
};
use domain_watch::initialization::init_logger_with;
use domain_watch::status_server::{start_status_server, StatusState};
use domain_watch::{
    parse_domain_list, CheckResult, Checker, CheckerConfig, Config, CycleReport, DomainTarget,
    LogFormat, LogLevel, LogSink, Monitor, SqliteStore, Status, WebhookSink,
};

#[derive(Parser, Debug)]
#[command(name = "domain_watch", version, about = "Concurrent domain up/down monitor")]
struct Cli {
    /// SQLite database holding the registry and last statuses
    #[arg(long, env = "DOMAIN_WATCH_DB", default_value = DB_PATH, global = true)]
    db_path: PathBuf,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info, global = true)]
    log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Plain, global = true)]
    log_format: LogFormat,

    #[command(flatten)]
    checker: CheckerArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct CheckerArgs {
    /// Maximum probes in flight at once
    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENCY, global = true)]
    max_concurrency: usize,

    /// Targets per scheduling batch
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE, global = true)]
    batch_size: usize,

    /// Connect-phase timeout in seconds
    #[arg(long, default_value_t = 3, global = true)]
    connect_timeout: u64,

    /// Total request timeout in seconds
    #[arg(long, default_value_t = 8, global = true)]
    total_timeout: u64,

    /// DNS cache TTL in seconds
    #[arg(long, default_value_t = 300, global = true)]
    dns_cache_ttl: u64,

    /// User-Agent header sent with every probe
    #[arg(long, default_value = DEFAULT_USER_AGENT, global = true)]
    user_agent: String,

    /// Accept invalid TLS certificates
    #[arg(long, global = true)]
    insecure: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check domains once and print the results
    Check {
        /// Only check domains in this group
        #[arg(long)]
        group: Option<String>,

        /// Print the run as JSON
        #[arg(long)]
        json: bool,

        /// Check these domains instead of the registry (nothing is stored)
        domains: Vec<String>,
    },
    /// Check the registry periodically and alert on status changes
    Watch {
        /// Seconds between check cycles
        #[arg(long, default_value_t = DEFAULT_CHECK_INTERVAL.as_secs())]
        interval: u64,

        /// Seconds before the first cycle
        #[arg(long, default_value_t = DEFAULT_FIRST_CHECK_DELAY.as_secs())]
        first_delay: u64,

        /// Serve /health, /status and /metrics on this port
        #[arg(long, env = "DOMAIN_WATCH_STATUS_PORT")]
        status_port: Option<u16>,

        /// Webhook URLs that receive alerts (comma-separated)
        #[arg(long = "webhook", env = "DOMAIN_WATCH_WEBHOOKS", value_delimiter = ',')]
        webhooks: Vec<String>,
    },
    /// Register domains (separated by whitespace, commas or newlines)
    Add {
        #[arg(long, default_value = DEFAULT_GROUP)]
        group: String,

        #[arg(required = true)]
        domains: Vec<String>,
    },
    /// Stop monitoring a domain
    Remove { domain: String },
    /// Move a domain to another group
    Move { domain: String, group: String },
    /// List registered domains with their last status
    List {
        #[arg(long)]
        group: Option<String>,
    },
    /// Show per-group status counts
    Groups,
}

impl Cli {
    fn config(&self) -> Config {
        let mut config = Config {
            db_path: self.db_path.clone(),
            log_level: self.log_level.clone(),
            log_format: self.log_format.clone(),
            checker: CheckerConfig {
                max_concurrency: self.checker.max_concurrency,
                batch_size: self.checker.batch_size,
                connect_timeout: Duration::from_secs(self.checker.connect_timeout),
                total_timeout: Duration::from_secs(self.checker.total_timeout),
                dns_cache_ttl: Duration::from_secs(self.checker.dns_cache_ttl),
                user_agent: self.checker.user_agent.clone(),
                verify_tls: !self.checker.insecure,
                ..CheckerConfig::default()
            },
            ..Config::default()
        };
        if let Command::Watch {
            interval,
            first_delay,
            status_port,
            webhooks,
        } = &self.command
        {
            config.check_interval = Duration::from_secs(*interval);
            config.first_check_delay = Duration::from_secs(*first_delay);
            config.status_port = *status_port;
            config.webhook_urls = webhooks.iter().filter(|u| !u.is_empty()).cloned().collect();
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file (if it exists)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = cli.config();
    init_logger_with(config.log_level.clone().into(), config.log_format.clone())
        .context("Failed to initialize logger")?;

    if let Err(e) = run(cli.command, config).await {
        eprintln!("domain_watch error: {:#}", e);
        process::exit(1);
    }
    Ok(())
}

async fn run(command: Command, config: Config) -> Result<()> {
    match command {
        Command::Check {
            group,
            json,
            domains,
        } => check(&config, group, json, domains).await,
        Command::Watch { .. } => watch(config).await,
        Command::Add { group, domains } => {
            let store = open_store(&config).await?;
            let names = parse_domain_list(&domains.join("\n"));
            let report = store.add_domains(&group, &names).await?;
            for name in &report.added {
                println!("{} {} ({})", "added".green(), name, group);
            }
            for name in &report.existing_same_group {
                println!("{} {} (already in {})", "exists".yellow(), name, group);
            }
            for (name, other) in &report.existing_other_groups {
                println!("{} {} (in {})", "exists".yellow(), name, other);
            }
            Ok(())
        }
        Command::Remove { domain } => {
            let store = open_store(&config).await?;
            if !store.remove_domain(&domain).await? {
                anyhow::bail!("{domain} is not monitored");
            }
            println!("{} {}", "removed".green(), domain);
            Ok(())
        }
        Command::Move { domain, group } => {
            let store = open_store(&config).await?;
            if !store.move_domain(&domain, &group).await? {
                anyhow::bail!("{domain} is not monitored");
            }
            println!("{} {} -> {}", "moved".green(), domain, group);
            Ok(())
        }
        Command::List { group } => {
            let store = open_store(&config).await?;
            let domains = store.list_domains(group.as_deref()).await?;
            if domains.is_empty() {
                println!("No domains registered");
            }
            for domain in domains {
                let status = match domain.last_status {
                    Some(status) => paint(status),
                    None => "never checked".dimmed(),
                };
                let checked = domain
                    .last_checked
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_default();
                println!("{:<40} {:<16} {:<14} {}", domain.name, domain.group, status, checked);
            }
            Ok(())
        }
        Command::Groups => {
            let store = open_store(&config).await?;
            let summary = store.group_summary().await?;
            if summary.is_empty() {
                println!("No domains registered");
            }
            for (group, counts) in summary {
                println!(
                    "{:<20} {:>5} total  {:>5} up  {:>5} down  {:>5} unchecked",
                    group, counts.total, counts.up, counts.down, counts.unknown
                );
            }
            Ok(())
        }
    }
}

async fn open_store(config: &Config) -> Result<SqliteStore> {
    SqliteStore::open(&config.db_path)
        .await
        .with_context(|| format!("Failed to open database {}", config.db_path.display()))
}

/// Cancels the returned token on Ctrl-C.
fn shutdown_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let cancel = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("Interrupt received, shutting down");
            cancel.cancel();
        }
    });
    token
}

async fn check(config: &Config, group: Option<String>, json: bool, domains: Vec<String>) -> Result<()> {
    let checker = Checker::from_config(config.checker.clone())?;
    let cancel = shutdown_on_ctrl_c();

    if !domains.is_empty() {
        let group = group.unwrap_or_else(|| DEFAULT_GROUP.to_string());
        let targets = parse_domain_list(&domains.join("\n"))
            .into_iter()
            .map(|name| DomainTarget::new(name, group.clone()))
            .collect();
        let run = checker.run_until_cancelled(targets, cancel).await;
        if json {
            println!("{}", serde_json::to_string_pretty(&run)?);
        } else {
            print_results(&run.results);
            for rejected in &run.rejected {
                println!("{} {}", "rejected".red(), rejected);
            }
        }
        return Ok(());
    }

    let store = Arc::new(open_store(config).await?);
    let monitor = Monitor::new(checker, store.clone(), store).with_sink(Arc::new(LogSink));
    let report = monitor.check_once(group.as_deref(), cancel).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report.run)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

async fn watch(config: Config) -> Result<()> {
    let checker = Checker::from_config(config.checker.clone())?;
    let store = Arc::new(open_store(&config).await?);
    let shutdown = shutdown_on_ctrl_c();
    let state = StatusState::new();

    let mut monitor = Monitor::new(checker, store.clone(), store)
        .with_state(state.clone())
        .with_sink(Arc::new(LogSink));
    if !config.webhook_urls.is_empty() {
        let sink = WebhookSink::new(config.webhook_urls.clone(), &config.checker.user_agent)
            .context("Failed to build webhook client")?;
        log::info!("Alerts go to {} webhook(s)", sink.recipients().len());
        monitor = monitor.with_sink(Arc::new(sink));
    }

    let server = config.status_port.map(|port| {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if let Err(e) = start_status_server(port, state, shutdown).await {
                log::error!("{e}");
            }
        })
    });

    monitor
        .run_periodic(config.check_interval, config.first_check_delay, shutdown.clone())
        .await;

    shutdown.cancel();
    if let Some(server) = server {
        let _ = server.await;
    }
    Ok(())
}

fn paint(status: Status) -> ColoredString {
    let text = status.to_string().to_uppercase();
    match status {
        Status::Up => text.green(),
        Status::Down => text.red(),
        Status::Unknown => text.yellow(),
    }
}

fn print_results(results: &[CheckResult]) {
    for result in results {
        let detail = result.describe();
        let detail = detail.split_once(' ').map(|(_, d)| d).unwrap_or("");
        println!("{:<40} {} {}", result.domain, paint(result.status()), detail);
    }
}

fn print_report(report: &CycleReport) {
    print_results(&report.run.results);
    let summary = report.run.summary();
    println!(
        "Checked {} domains in {:.1}s: {} up, {} down, {} unknown",
        summary.total, summary.elapsed_seconds, summary.up, summary.down, summary.unknown
    );
    let down: Vec<&str> = report.run.down().map(|r| r.domain.as_str()).collect();
    if !down.is_empty() {
        println!("{} {}", "down:".red(), down.join(", "));
    }
    for rejected in &report.run.rejected {
        println!("{} {}", "rejected".red(), rejected);
    }
    if let Some(error) = &report.persist_error {
        println!("{} results were not saved: {}", "warning:".yellow(), error);
    }
    if !report.transitions.is_empty() {
        println!("{} status change(s) detected", report.transitions.len());
    }
}
