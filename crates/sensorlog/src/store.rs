// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Append-only daily log store.
//!
//! One CSV file per calendar day, named `YYYY-MM-DD` under the data
//! directory. Lines are only ever appended; a day file becomes permanently
//! immutable once a later-dated append rolls the store over to a new file.

use chrono::{NaiveDate, NaiveDateTime};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Serialization format for record timestamps (second precision).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One logged observation.
///
/// `fields` order is fixed per sensor and caller-supplied; the store does not
/// validate it.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Capture timestamp (naive local time, second precision when written).
    pub captured_at: NaiveDateTime,
    /// Sensor identifier, opaque to the store.
    pub sensor_id: String,
    /// String-encoded observation values.
    pub fields: Vec<String>,
}

impl Record {
    /// Create a new record.
    pub fn new(
        captured_at: NaiveDateTime,
        sensor_id: impl Into<String>,
        fields: Vec<String>,
    ) -> Self {
        Self {
            captured_at,
            sensor_id: sensor_id.into(),
            fields,
        }
    }

    /// Serialize as one CSV line, without the terminator.
    fn to_line(&self) -> String {
        let mut parts = Vec::with_capacity(self.fields.len() + 2);
        parts.push(self.captured_at.format(TIMESTAMP_FORMAT).to_string());
        parts.push(self.sensor_id.clone());
        parts.extend(self.fields.iter().cloned());
        parts.join(",")
    }
}

/// Store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("record has an empty sensor id")]
    EmptySensorId,

    #[error("record has no fields")]
    EmptyFields,
}

/// Path of the day file for `date` under `data_dir`.
pub fn day_path(data_dir: &Path, date: NaiveDate) -> PathBuf {
    data_dir.join(date.format("%Y-%m-%d").to_string())
}

/// Append-only store partitioned by calendar day.
///
/// At most one day file is active at a time. The active date is owned here
/// and mutated only by the rollover check in [`DayLogStore::append`].
pub struct DayLogStore {
    data_dir: PathBuf,
    active_date: Option<NaiveDate>,
}

impl DayLogStore {
    /// Open a store rooted at `data_dir`, creating the directory if needed.
    ///
    /// No day file is active until the first append arrives.
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;

        Ok(Self {
            data_dir,
            active_date: None,
        })
    }

    /// Date of the currently active day file, if any append has happened.
    pub fn active_date(&self) -> Option<NaiveDate> {
        self.active_date
    }

    /// Path of the currently active day file.
    pub fn active_path(&self) -> Option<PathBuf> {
        self.active_date.map(|date| self.path_for(date))
    }

    /// Path of the day file for `date`.
    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        day_path(&self.data_dir, date)
    }

    /// Append one record to the active day file.
    ///
    /// A record dated later than the active file rolls the store over: the
    /// new date's file becomes active and the previous file stops receiving
    /// appends. A record dated *earlier* than the active file is still
    /// appended to the active file -- the log is ordered by arrival, not by
    /// event time.
    ///
    /// Each successful call durably persists exactly one line; no line is
    /// ever rewritten or removed. I/O failures surface to the caller, which
    /// owns the drop/retry decision.
    pub fn append(&mut self, record: &Record) -> Result<(), StoreError> {
        if record.sensor_id.is_empty() {
            return Err(StoreError::EmptySensorId);
        }
        if record.fields.is_empty() {
            return Err(StoreError::EmptyFields);
        }

        let date = record.captured_at.date();
        let active = match self.active_date {
            Some(active) if date > active => {
                tracing::info!(from = %active, to = %date, "rolling over to new day file");
                self.active_date = Some(date);
                date
            }
            Some(active) => {
                if date < active {
                    tracing::debug!(
                        record_date = %date,
                        active = %active,
                        "late-arriving record kept in active file"
                    );
                }
                active
            }
            None => {
                self.active_date = Some(date);
                date
            }
        };

        let path = self.path_for(active);
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;

        let mut line = record.to_line();
        line.push('\n');
        file.write_all(line.as_bytes())?;

        tracing::trace!(sensor = %record.sensor_id, file = %path.display(), "appended record");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn ts(date: &str, time: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{} {}", date, time), TIMESTAMP_FORMAT).unwrap()
    }

    fn record(date: &str, time: &str, sensor: &str, fields: &[&str]) -> Record {
        Record::new(
            ts(date, time),
            sensor,
            fields.iter().map(|f| f.to_string()).collect(),
        )
    }

    #[test]
    fn test_append_creates_day_file() {
        let dir = TempDir::new().unwrap();
        let mut store = DayLogStore::new(dir.path()).unwrap();

        store
            .append(&record("2025-06-26", "12:29:03", "esp/bme1", &["19.21", "43.38"]))
            .unwrap();

        let path = dir.path().join("2025-06-26");
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "2025-06-26 12:29:03,esp/bme1,19.21,43.38\n");
        assert_eq!(
            store.active_date(),
            Some(NaiveDate::from_ymd_opt(2025, 6, 26).unwrap())
        );
        assert_eq!(store.active_path(), Some(path));
    }

    #[test]
    fn test_append_only_monotonic_growth() {
        let dir = TempDir::new().unwrap();
        let mut store = DayLogStore::new(dir.path()).unwrap();
        let path = dir.path().join("2025-06-26");

        store
            .append(&record("2025-06-26", "12:00:00", "s1", &["1"]))
            .unwrap();
        let first = std::fs::read_to_string(&path).unwrap();

        store
            .append(&record("2025-06-26", "12:00:05", "s2", &["2"]))
            .unwrap();
        let second = std::fs::read_to_string(&path).unwrap();

        // Previously written bytes are untouched; the file only grows.
        assert!(second.starts_with(&first));
        assert!(second.len() > first.len());
        assert_eq!(second.lines().count(), 2);
    }

    #[test]
    fn test_rollover_creates_new_file() {
        let dir = TempDir::new().unwrap();
        let mut store = DayLogStore::new(dir.path()).unwrap();

        store
            .append(&record("2025-06-26", "23:59:58", "s1", &["old"]))
            .unwrap();
        let day1 = std::fs::read_to_string(dir.path().join("2025-06-26")).unwrap();

        store
            .append(&record("2025-06-27", "00:00:01", "s1", &["new"]))
            .unwrap();
        store
            .append(&record("2025-06-27", "00:00:06", "s1", &["newer"]))
            .unwrap();

        // Prior day's file received no further writes.
        assert_eq!(
            std::fs::read_to_string(dir.path().join("2025-06-26")).unwrap(),
            day1
        );

        let day2 = std::fs::read_to_string(dir.path().join("2025-06-27")).unwrap();
        assert_eq!(day2.lines().count(), 2);
        assert_eq!(
            store.active_date(),
            Some(NaiveDate::from_ymd_opt(2025, 6, 27).unwrap())
        );
    }

    #[test]
    fn test_out_of_order_record_stays_in_active_file() {
        let dir = TempDir::new().unwrap();
        let mut store = DayLogStore::new(dir.path()).unwrap();

        store
            .append(&record("2025-06-27", "08:00:00", "s1", &["today"]))
            .unwrap();
        // Late-arriving record dated the previous day.
        store
            .append(&record("2025-06-26", "23:59:59", "s1", &["late"]))
            .unwrap();

        assert!(!dir.path().join("2025-06-26").exists());
        let day2 = std::fs::read_to_string(dir.path().join("2025-06-27")).unwrap();
        assert_eq!(day2.lines().count(), 2);
        assert!(day2.contains("late"));
    }

    #[test]
    fn test_empty_sensor_id_rejected() {
        let dir = TempDir::new().unwrap();
        let mut store = DayLogStore::new(dir.path()).unwrap();

        let err = store
            .append(&record("2025-06-26", "12:00:00", "", &["1"]))
            .unwrap_err();
        assert!(matches!(err, StoreError::EmptySensorId));
    }

    #[test]
    fn test_empty_fields_rejected() {
        let dir = TempDir::new().unwrap();
        let mut store = DayLogStore::new(dir.path()).unwrap();

        let err = store
            .append(&Record::new(ts("2025-06-26", "12:00:00"), "s1", Vec::new()))
            .unwrap_err();
        assert!(matches!(err, StoreError::EmptyFields));
    }

    #[test]
    fn test_day_path() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap();
        assert_eq!(
            day_path(Path::new("/mnt/usb"), date),
            PathBuf::from("/mnt/usb/2025-01-05")
        );
    }
}
