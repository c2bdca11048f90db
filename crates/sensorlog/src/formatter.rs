// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Transmission string assembly.
//!
//! Flattens resolved values in tracked-sensor order, appends the capture
//! time (`HH:MM`) and date (`DD/MM/YY`), and joins everything with commas:
//!
//! ```text
//! 15.87 *C,43.23%,17.98 *C,43.38%,16.46 *C,41.73%,12:29,26/06/25
//! ```
//!
//! No escaping is performed; upstream sensors must not emit the delimiter in
//! their values.

use crate::resolve::ResolvedValue;
use chrono::NaiveDateTime;

/// Time component format of the report string.
pub const TIME_FORMAT: &str = "%H:%M";

/// Date component format of the report string.
pub const DATE_FORMAT: &str = "%d/%m/%y";

/// Assemble the outbound report string. Deterministic for identical inputs;
/// no trailing delimiter.
pub fn format_transmission(resolved: &[ResolvedValue], captured_at: NaiveDateTime) -> String {
    let mut parts: Vec<String> = Vec::new();

    for value in resolved {
        parts.extend(value.values.iter().cloned());
    }
    parts.push(captured_at.format(TIME_FORMAT).to_string());
    parts.push(captured_at.format(DATE_FORMAT).to_string());

    parts.join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::NO_VALUE;

    fn found(sensor_id: &str, values: &[&str]) -> ResolvedValue {
        ResolvedValue {
            sensor_id: sensor_id.to_string(),
            values: values.iter().map(|v| v.to_string()).collect(),
            found: true,
        }
    }

    fn missing(sensor_id: &str, slots: usize) -> ResolvedValue {
        ResolvedValue {
            sensor_id: sensor_id.to_string(),
            values: vec![NO_VALUE.to_string(); slots],
            found: false,
        }
    }

    fn capture_time() -> NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2025, 6, 26)
            .unwrap()
            .and_hms_opt(12, 29, 3)
            .unwrap()
    }

    #[test]
    fn test_format_flattens_in_order() {
        let resolved = vec![
            found("esp/bme1", &["15.87 *C", "43.23%"]),
            found("esp/bme2", &["17.98 *C", "43.38%"]),
        ];

        let out = format_transmission(&resolved, capture_time());
        assert_eq!(out, "15.87 *C,43.23%,17.98 *C,43.38%,12:29,26/06/25");
    }

    #[test]
    fn test_sentinel_appears_in_output() {
        let resolved = vec![found("s1", &["20 *C", "50%"]), missing("s2", 2)];

        let out = format_transmission(&resolved, capture_time());
        assert_eq!(out, "20 *C,50%,No value found,No value found,12:29,26/06/25");
    }

    #[test]
    fn test_no_trailing_comma_and_deterministic() {
        let resolved = vec![found("s1", &["20 *C", "50%"])];

        let first = format_transmission(&resolved, capture_time());
        let second = format_transmission(&resolved, capture_time());

        assert_eq!(first, second);
        assert!(!first.ends_with(','));
    }

    #[test]
    fn test_empty_resolution_still_carries_timestamp() {
        let out = format_transmission(&[], capture_time());
        assert_eq!(out, "12:29,26/06/25");
    }
}
