//! syshealth - host health assessment from the command line
//!
//! `check` runs the selected probes once; `watch` re-runs them on an
//! interval and prints every report as it is published.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tabled::{Table, Tabled};
use tokio::sync::broadcast;
use tracing::warn;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use syshealth_core::application::{Engine, ExecOptions, ProbeRegistry, Selection};
use syshealth_core::domain::{Category, Report, Status};
use syshealth_probes::{
    DatabaseProbe, DiskSpaceProbe, DnsProbe, LoadAverageProbe, MemoryProbe, PingProbe,
    ProcessHotlistProbe, ServiceProbe, TcpConnectProbe,
};

#[derive(Parser)]
#[command(name = "syshealth")]
#[command(about = "Host health assessment: network, storage, resources, services", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Per-probe timeout in milliseconds
    #[arg(long, env = "SYSHEALTH_TIMEOUT_MS", default_value = "5000")]
    timeout_ms: u64,

    /// Max probes in flight (0 = unbounded)
    #[arg(long, env = "SYSHEALTH_MAX_CONCURRENCY", default_value = "0")]
    max_concurrency: usize,

    /// Host for the internet reachability probe
    #[arg(long, default_value = "8.8.8.8")]
    net_host: String,

    /// Port for the internet reachability probe
    #[arg(long, default_value = "53")]
    net_port: u16,

    /// Hostname for the DNS resolution probe
    #[arg(long, default_value = "www.google.com")]
    dns_host: String,

    /// Host for the ICMP echo probe
    #[arg(long, default_value = "google.com")]
    ping_host: String,

    /// Path whose backing disk is checked for free space
    #[arg(long, default_value = "/")]
    disk_path: String,

    /// Warn when free space drops below this many GiB
    #[arg(long, default_value = "10.0")]
    disk_warn_gb: f64,

    /// Fail when free space drops below this many GiB
    #[arg(long, default_value = "2.0")]
    disk_fail_gb: f64,

    /// Service units to check for liveness (repeatable)
    #[arg(long = "service", default_values_t = vec!["sshd".to_string()])]
    services: Vec<String>,

    /// Database host for the dependent-service probe
    #[arg(long, default_value = "127.0.0.1")]
    db_host: String,

    /// Database port for the dependent-service probe
    #[arg(long, default_value = "3306")]
    db_port: u16,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the selected probes once and print a report
    Check {
        /// Restrict to one category (network, filesystem, resources, services, database)
        #[arg(long, conflicts_with = "probe")]
        category: Option<String>,

        /// Restrict to a single probe by name
        #[arg(long)]
        probe: Option<String>,

        /// Stop dispatching once any probe fails
        #[arg(long)]
        fail_fast: bool,

        /// Print the report as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Re-run the probes periodically and print each report
    Watch {
        /// Interval between runs in milliseconds
        #[arg(long, env = "SYSHEALTH_INTERVAL_MS", default_value = "5000")]
        interval_ms: u64,

        /// Stop after this many reports (0 = until Ctrl+C)
        #[arg(long, default_value = "0")]
        count: usize,

        /// Restrict to one category
        #[arg(long)]
        category: Option<String>,
    },
}

#[derive(Tabled)]
struct ResultRow {
    #[tabled(rename = "CATEGORY")]
    category: String,
    #[tabled(rename = "PROBE")]
    probe: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "TIME")]
    duration: String,
    #[tabled(rename = "DETAIL")]
    message: String,
}

fn init_logging() {
    let log_format = std::env::var("SYSHEALTH_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("syshealth=warn"))
        .expect("Failed to create env filter");

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }
}

fn parse_category(s: &str) -> Category {
    match s.to_ascii_lowercase().as_str() {
        "network" => Category::Network,
        "filesystem" => Category::Filesystem,
        "resources" => Category::Resources,
        "services" => Category::Services,
        "database" => Category::Database,
        other => Category::Custom(other.to_string()),
    }
}

fn selection(category: Option<&String>, probe: Option<&String>) -> Selection {
    match (probe, category) {
        (Some(name), _) => Selection::Probe(name.clone()),
        (None, Some(cat)) => Selection::Category(parse_category(cat)),
        (None, None) => Selection::All,
    }
}

/// Default probe set: internet, DNS, ping, disk, load, memory, processes, services, database
fn build_registry(cli: &Cli) -> Result<ProbeRegistry> {
    let mut registry = ProbeRegistry::new();

    registry.register(Arc::new(TcpConnectProbe::new(
        "internet",
        cli.net_host.clone(),
        cli.net_port,
    )))?;
    registry.register(Arc::new(DnsProbe::new("dns", cli.dns_host.clone())))?;
    registry.register(Arc::new(PingProbe::new("ping", cli.ping_host.clone())))?;
    registry.register(Arc::new(DiskSpaceProbe::new(
        "disk-space",
        cli.disk_path.clone(),
        cli.disk_warn_gb,
        cli.disk_fail_gb,
    )))?;
    registry.register(Arc::new(LoadAverageProbe::new("cpu-load", 0.7, 1.5)))?;
    registry.register(Arc::new(MemoryProbe::new("memory", 80.0, 95.0)))?;
    registry.register(Arc::new(ProcessHotlistProbe::new("processes", 50.0, 25.0)))?;
    for unit in &cli.services {
        registry.register(Arc::new(ServiceProbe::new(unit.clone(), unit.clone())))?;
    }
    registry.register(Arc::new(
        DatabaseProbe::new("database", cli.db_host.clone(), cli.db_port).expect_greeting(),
    ))?;

    Ok(registry)
}

fn colorize(status: Status) -> String {
    let text = status.to_string();
    match status {
        Status::Pass => text.green().to_string(),
        Status::Warn => text.yellow().to_string(),
        Status::Fail | Status::Timeout | Status::Error => text.red().to_string(),
    }
}

fn print_report(report: &Report) {
    let rows: Vec<ResultRow> = report
        .results
        .iter()
        .map(|r| ResultRow {
            category: r.category.to_string(),
            probe: r.probe_name.clone(),
            status: colorize(r.status),
            duration: format!("{}ms", r.duration_ms),
            message: r.message.clone(),
        })
        .collect();

    println!("{}", Table::new(rows));
    println!(
        "overall: {}   ({} checks in {}ms, {})",
        colorize(report.overall_status),
        report.results.len(),
        report.total_duration_ms,
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
    );
}

async fn run_check(
    engine: &Engine,
    selection: &Selection,
    options: &ExecOptions,
    json: bool,
) -> Result<Status> {
    let report = engine.check(selection, options).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(report.overall_status)
}

async fn run_watch(
    engine: &Engine,
    selection: Selection,
    options: ExecOptions,
    interval: Duration,
    count: usize,
) -> Result<()> {
    let scheduler = engine.scheduler(selection, options);
    let mut reports = scheduler.subscribe();
    scheduler.start(interval)?;

    let mut seen = 0usize;
    loop {
        tokio::select! {
            received = reports.recv() => {
                match received {
                    Ok(report) => {
                        print_report(&report);
                        println!();
                        seen += 1;
                        if count > 0 && seen >= count {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!(missed, "renderer lagged behind the scheduler");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                break;
            }
        }
    }

    scheduler.stop();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let options = ExecOptions {
        per_probe_timeout: Duration::from_millis(cli.timeout_ms),
        max_concurrency: cli.max_concurrency,
        fail_fast: false,
    };

    let engine = Engine::new(build_registry(&cli)?);

    match &cli.command {
        Commands::Check {
            category,
            probe,
            fail_fast,
            json,
        } => {
            let options = ExecOptions {
                fail_fast: *fail_fast,
                ..options
            };
            let overall = run_check(
                &engine,
                &selection(category.as_ref(), probe.as_ref()),
                &options,
                *json,
            )
            .await?;

            if overall == Status::Fail {
                std::process::exit(1);
            }
        }
        Commands::Watch {
            interval_ms,
            count,
            category,
        } => {
            run_watch(
                &engine,
                selection(category.as_ref(), None),
                options,
                Duration::from_millis(*interval_ms),
                *count,
            )
            .await?;
        }
    }

    Ok(())
}
