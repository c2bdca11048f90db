// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Telemetry service.
//!
//! Event dispatch tying the core together: inbound readings are appended to
//! the day log, report triggers run one window/resolve/format cycle and
//! publish the result through the transport. Events arrive over channels and
//! are handled one at a time; every operation is short and synchronous once
//! started, so no internal locking is needed.
//!
//! # Operation
//!
//! 1. Receive a [`SensorReading`] -- append it to the active day file
//! 2. Receive a [`ReportTrigger`] (or periodic tick) -- read the tail window
//!    of today's file, resolve tracked sensors, publish the report string
//! 3. Failures are logged and counted; the loop keeps running

use crate::config::Config;
use crate::formatter::format_transmission;
use crate::resolve::resolve;
use crate::store::{day_path, DayLogStore, Record, StoreError};
use crate::tail::{read_window, TailError};
use crate::transport::{ReportTrigger, SensorReading, Transport};
use chrono::{Local, NaiveDateTime};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Service statistics.
#[derive(Debug, Default, Clone)]
pub struct ServiceStats {
    /// Readings received from the transport.
    pub readings_received: u64,
    /// Records successfully appended.
    pub records_appended: u64,
    /// Append failures (record dropped).
    pub append_errors: u64,
    /// Reports published (one per topic per cycle).
    pub reports_published: u64,
    /// Report cycle or publish failures.
    pub report_errors: u64,
}

/// Senders feeding a running [`TelemetryService`].
///
/// Dropping all clones closes the channels and stops the service loop
/// (unless a periodic report interval keeps it alive).
#[derive(Clone)]
pub struct ServiceHandle {
    /// Inbound sensor readings.
    pub readings: mpsc::Sender<SensorReading>,
    /// On-demand report triggers.
    pub triggers: mpsc::Sender<ReportTrigger>,
}

/// One window/resolve/format cycle against the day file for `now`'s date.
///
/// The log is addressed for reading purposes "as of today": the file is
/// derived from the capture timestamp, not from the store's last-append
/// date.
pub fn report_now(config: &Config, now: NaiveDateTime) -> Result<String, TailError> {
    let path = day_path(&config.data_dir, now.date());
    let window = read_window(&path, config.window_bytes)?;
    let resolved = resolve(&window, &config.tracked_sensors, &config.value_fields);
    Ok(format_transmission(&resolved, now))
}

/// Telemetry service.
///
/// # Type Parameters
///
/// - `T` -- Transport implementation (e.g. [`crate::MockTransport`])
pub struct TelemetryService<T: Transport> {
    config: Config,
    store: DayLogStore,
    transport: Arc<T>,
    readings: mpsc::Receiver<SensorReading>,
    triggers: mpsc::Receiver<ReportTrigger>,
    stats: ServiceStats,
}

impl<T: Transport> TelemetryService<T> {
    /// Create a new service and the handle feeding it.
    pub fn new(config: Config, transport: Arc<T>) -> Result<(Self, ServiceHandle), StoreError> {
        let store = DayLogStore::new(&config.data_dir)?;
        let (reading_tx, reading_rx) = mpsc::channel(1024);
        let (trigger_tx, trigger_rx) = mpsc::channel(16);

        let service = Self {
            config,
            store,
            transport,
            readings: reading_rx,
            triggers: trigger_rx,
            stats: ServiceStats::default(),
        };
        let handle = ServiceHandle {
            readings: reading_tx,
            triggers: trigger_tx,
        };

        Ok((service, handle))
    }

    /// Get service statistics.
    pub fn stats(&self) -> &ServiceStats {
        &self.stats
    }

    /// Run the service loop.
    ///
    /// Returns the final statistics once both channels are closed and no
    /// periodic interval is configured.
    pub async fn run(mut self) -> ServiceStats {
        tracing::info!(
            data_dir = %self.config.data_dir.display(),
            sensors = self.config.tracked_sensors.len(),
            window_bytes = self.config.window_bytes,
            "TelemetryService started"
        );

        let mut report_interval = if self.config.report_interval_secs > 0 {
            Some(tokio::time::interval(Duration::from_secs(
                self.config.report_interval_secs,
            )))
        } else {
            None
        };
        let periodic = report_interval.is_some();

        loop {
            tokio::select! {
                Some(reading) = self.readings.recv() => {
                    self.handle_reading(reading);
                }
                Some(_) = self.triggers.recv() => {
                    self.handle_report();
                }
                _ = next_tick(&mut report_interval), if periodic => {
                    self.handle_report();
                }
                else => break,
            }
        }

        tracing::info!(
            readings_received = self.stats.readings_received,
            records_appended = self.stats.records_appended,
            reports_published = self.stats.reports_published,
            "TelemetryService stopped"
        );

        self.stats
    }

    /// Append one inbound reading to the day log.
    fn handle_reading(&mut self, reading: SensorReading) {
        self.stats.readings_received += 1;

        let record = Record::from(reading);
        match self.store.append(&record) {
            Ok(()) => {
                self.stats.records_appended += 1;
            }
            Err(e) => {
                // Record is dropped; the transport owns any retry policy.
                self.stats.append_errors += 1;
                tracing::error!(sensor = %record.sensor_id, error = %e, "failed to append record");
            }
        }
    }

    /// Run one report cycle and publish to every configured topic.
    fn handle_report(&mut self) {
        let now = Local::now().naive_local();

        let report = match report_now(&self.config, now) {
            Ok(report) => report,
            Err(e) => {
                self.stats.report_errors += 1;
                tracing::error!(error = %e, "report cycle failed");
                return;
            }
        };

        for topic in &self.config.publish_topics {
            match self.transport.publish(topic, &report) {
                Ok(()) => {
                    self.stats.reports_published += 1;
                    tracing::info!(topic = %topic, "published report");
                }
                Err(e) => {
                    self.stats.report_errors += 1;
                    tracing::error!(topic = %topic, error = %e, "failed to publish report");
                }
            }
        }
    }
}

/// Await the next periodic tick, or park forever when no interval is set.
async fn next_tick(interval: &mut Option<tokio::time::Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
