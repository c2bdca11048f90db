// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Transport seam.
//!
//! The pub/sub broker (connection setup, subscription, delivery
//! acknowledgement, retry) is an external collaborator. This module defines
//! the types it delivers inbound and the [`Transport`] trait the service
//! publishes through, plus an in-memory implementation for tests and
//! standalone runs.
//!
//! # Integration
//!
//! To wire the service to a real broker, implement the trait:
//!
//! ```ignore
//! impl Transport for MqttBridge {
//!     fn publish(&self, topic: &str, payload: &str) -> Result<(), TransportError> {
//!         // Hand off to the broker client...
//!     }
//! }
//! ```

use crate::store::Record;
use chrono::NaiveDateTime;
use std::sync::Mutex;
use thiserror::Error;

/// An inbound sensor reading delivered by the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorReading {
    /// Sensor identifier (topic the reading arrived on).
    pub sensor_id: String,
    /// Raw comma-separated payload exactly as the sensor published it.
    pub payload: String,
    /// Reception timestamp (naive local time).
    pub received_at: NaiveDateTime,
}

impl From<SensorReading> for Record {
    fn from(reading: SensorReading) -> Self {
        Record {
            captured_at: reading.received_at,
            sensor_id: reading.sensor_id,
            fields: reading.payload.split(',').map(str::to_string).collect(),
        }
    }
}

/// Bare trigger requesting one report cycle.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportTrigger;

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("publish to '{topic}' failed: {reason}")]
    Publish { topic: String, reason: String },
}

/// Outbound side of the pub/sub transport.
///
/// Delivery retry and timeouts are the implementation's concern; the service
/// treats a returned error as a dropped report.
pub trait Transport: Send + Sync {
    /// Publish a payload to a topic.
    fn publish(&self, topic: &str, payload: &str) -> Result<(), TransportError>;
}

/// In-memory transport for tests and standalone runs.
///
/// Records every published message for later inspection.
#[derive(Default)]
pub struct MockTransport {
    published: Mutex<Vec<(String, String)>>,
}

impl MockTransport {
    /// Create a new mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages published so far, as `(topic, payload)` pairs.
    pub fn published(&self) -> Vec<(String, String)> {
        let published = match self.published.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        published.clone()
    }
}

impl Transport for MockTransport {
    fn publish(&self, topic: &str, payload: &str) -> Result<(), TransportError> {
        tracing::debug!(topic = topic, "MockTransport: publish");

        let mut published = match self.published.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        published.push((topic.to_string(), payload.to_string()));
        Ok(())
    }
}
