// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Sensorlog
//!
//! Append-only, calendar-day-rotated telemetry log with a bounded
//! latest-value readout.
//!
//! # Features
//!
//! - **Day Log Store** -- one CSV file per calendar day, append-only, with
//!   date rollover on the first later-dated append
//! - **Tail Scan** -- bounded backward read of the active day's file;
//!   resolution cost is independent of file size
//! - **Latest-Value Resolution** -- newest record per tracked sensor, with
//!   an explicit "No value found" sentinel for silent sensors
//! - **Report Formatting** -- compact comma-joined transmission string
//!
//! # Architecture
//!
//! ```text
//! TelemetryService
//! +-- DayLogStore    (append-only day files, date rollover)
//! +-- read_window    (bounded tail scan, newest-first Window)
//! +-- resolve        (latest value per tracked sensor)
//! +-- formatter      (comma-joined report string)
//! +-- Transport      (outbound publish seam)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use sensorlog::{Config, MockTransport, TelemetryService};
//! use std::sync::Arc;
//!
//! let config = Config::builder()
//!     .data_dir("/mnt/usb")
//!     .tracked_sensor("esp/bme1")
//!     .publish_topic("screen/display")
//!     .build();
//!
//! let transport = Arc::new(MockTransport::new());
//! let (service, handle) = TelemetryService::new(config, transport)?;
//! tokio::spawn(service.run());
//! ```

pub mod config;
pub mod formatter;
pub mod resolve;
pub mod service;
pub mod store;
pub mod tail;
pub mod transport;

pub use config::{Config, ConfigBuilder, ConfigError, FieldSpec};
pub use formatter::format_transmission;
pub use resolve::{resolve, ResolvedValue, NO_VALUE};
pub use service::{report_now, ServiceHandle, ServiceStats, TelemetryService};
pub use store::{day_path, DayLogStore, Record, StoreError};
pub use tail::{read_window, TailError, Window};
pub use transport::{MockTransport, ReportTrigger, SensorReading, Transport, TransportError};
