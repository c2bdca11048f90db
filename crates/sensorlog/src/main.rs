// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Sensorlog CLI
//!
//! Daily-rotated sensor telemetry log with bounded latest-value readout.
//!
//! # Usage
//!
//! ```bash
//! # Run the service loop, reporting every hour
//! sensorlog --data-dir /mnt/usb --sensors esp/bme1,esp/bme2 \
//!     --publish-topics screen/display --report-interval 3600 run
//!
//! # Append one reading to today's log
//! sensorlog --data-dir /mnt/usb append esp/bme1 "19.21,1002.1,43.38"
//!
//! # Resolve latest values and print the report string
//! sensorlog --data-dir /mnt/usb --sensors esp/bme1,esp/bme2 report
//!
//! # Show the active day file
//! sensorlog --data-dir /mnt/usb stats
//! ```

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use sensorlog::{
    day_path, report_now, Config, DayLogStore, MockTransport, Record, SensorReading,
    TelemetryService,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "sensorlog")]
#[command(author = "naskel.com")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Daily-rotated sensor telemetry log with bounded latest-value readout")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file (TOML); flags below override file values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the YYYY-MM-DD day files
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Tracked sensor identifiers, in output order
    #[arg(short, long, value_delimiter = ',')]
    sensors: Vec<String>,

    /// Tail window byte budget
    #[arg(short, long)]
    window_bytes: Option<u64>,

    /// Topics the report string is published to
    #[arg(short = 't', long, value_delimiter = ',')]
    publish_topics: Vec<String>,

    /// Periodic report interval in seconds (0 = on demand only)
    #[arg(long)]
    report_interval: Option<u64>,

    /// Verbose mode (show internal logs)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the service loop (in-memory transport; reports are logged)
    Run,
    /// Append one reading to the day log
    Append {
        /// Sensor identifier
        sensor: String,
        /// Raw comma-separated payload
        payload: String,
    },
    /// Run one window/resolve/format cycle and print the result
    Report,
    /// Show the day file for today
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("sensorlog=debug")
    } else {
        EnvFilter::new("sensorlog=info")
    };
    fmt().with_env_filter(filter).with_target(false).init();

    let config = build_config(&cli)?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_service(config).await,
        Commands::Append { sensor, payload } => append(config, sensor, payload),
        Commands::Report => report(config),
        Commands::Stats => stats(config),
    }
}

fn build_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(ref dir) = cli.data_dir {
        config.data_dir = dir.clone();
    }
    if !cli.sensors.is_empty() {
        config.tracked_sensors = cli.sensors.clone();
    }
    if let Some(bytes) = cli.window_bytes {
        config.window_bytes = bytes;
    }
    if !cli.publish_topics.is_empty() {
        config.publish_topics = cli.publish_topics.clone();
    }
    if let Some(secs) = cli.report_interval {
        config.report_interval_secs = secs;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

async fn run_service(config: Config) -> Result<()> {
    tracing::info!("Sensorlog service starting...");
    tracing::info!("  Data dir: {}", config.data_dir.display());
    tracing::info!("  Sensors: {}", config.tracked_sensors.join(", "));
    tracing::info!("  Window: {} bytes", config.window_bytes);
    if config.report_interval_secs > 0 {
        tracing::info!("  Report interval: {}s", config.report_interval_secs);
    }

    let transport = Arc::new(MockTransport::new());
    let (service, handle) =
        TelemetryService::new(config, transport).context("Failed to create service")?;

    tokio::select! {
        stats = service.run() => {
            tracing::info!(?stats, "Service stopped");
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received Ctrl-C, shutting down...");
        }
    }

    drop(handle);
    Ok(())
}

fn append(config: Config, sensor: String, payload: String) -> Result<()> {
    let mut store = DayLogStore::new(&config.data_dir).context("Failed to open store")?;

    let record = Record::from(SensorReading {
        sensor_id: sensor,
        payload,
        received_at: Local::now().naive_local(),
    });
    store.append(&record).context("Failed to append record")?;

    let path = store.active_path().context("No active day file")?;
    println!("Appended to {}", path.display());
    Ok(())
}

fn report(config: Config) -> Result<()> {
    let report =
        report_now(&config, Local::now().naive_local()).context("Report cycle failed")?;
    println!("{}", report);
    Ok(())
}

fn stats(config: Config) -> Result<()> {
    let path = day_path(&config.data_dir, Local::now().date_naive());

    match std::fs::metadata(&path) {
        Ok(meta) => println!("{}: {} bytes", path.display(), meta.len()),
        Err(_) => println!("{}: no data yet", path.display()),
    }
    Ok(())
}
