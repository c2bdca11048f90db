// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Latest-value resolution over a tail window.
//!
//! For each tracked sensor, the first matching line in the newest-first
//! window wins; older matches for the same sensor are ignored. A sensor with
//! no match in the window is reported with the [`NO_VALUE`] sentinel rather
//! than failing the whole resolution. The resolver never re-reads the file;
//! widening the window is a caller-level retry policy.

use crate::config::FieldSpec;
use crate::tail::Window;

/// Sentinel reported for a tracked sensor with no record in the window.
pub const NO_VALUE: &str = "No value found";

/// Latest values extracted for one tracked sensor.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedValue {
    /// Tracked sensor identifier this entry answers for.
    pub sensor_id: String,
    /// One entry per configured value field, unit suffix applied; the
    /// sentinel per slot when the sensor is silent.
    pub values: Vec<String>,
    /// False when the sentinel was emitted.
    pub found: bool,
}

/// Resolve the most recent values for each tracked sensor.
///
/// `tracked` order determines output order.
pub fn resolve(window: &Window, tracked: &[String], fields: &[FieldSpec]) -> Vec<ResolvedValue> {
    tracked
        .iter()
        .map(|sensor_id| resolve_one(window, sensor_id, fields))
        .collect()
}

fn resolve_one(window: &Window, sensor_id: &str, fields: &[FieldSpec]) -> ResolvedValue {
    for line in window.lines() {
        if !line.iter().any(|field| field == sensor_id) {
            continue;
        }

        match extract(line, fields) {
            Some(values) => {
                return ResolvedValue {
                    sensor_id: sensor_id.to_string(),
                    values,
                    found: true,
                }
            }
            None => {
                // Malformed match; an older line may still hold a complete
                // record for this sensor.
                tracing::debug!(sensor = sensor_id, "skipping malformed line during resolution");
            }
        }
    }

    ResolvedValue {
        sensor_id: sensor_id.to_string(),
        values: vec![NO_VALUE.to_string(); fields.len()],
        found: false,
    }
}

/// Extract the configured positions from one parsed line, appending unit
/// suffixes where missing. Returns `None` when the line is too short.
fn extract(line: &[String], fields: &[FieldSpec]) -> Option<Vec<String>> {
    fields
        .iter()
        .map(|spec| {
            line.get(spec.index).map(|raw| {
                if spec.unit.is_empty() || raw.ends_with(&spec.unit) {
                    raw.clone()
                } else {
                    format!("{}{}", raw, spec.unit)
                }
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn specs() -> Vec<FieldSpec> {
        vec![
            FieldSpec {
                index: 2,
                unit: " *C".to_string(),
            },
            FieldSpec {
                index: 3,
                unit: "%".to_string(),
            },
        ]
    }

    fn window(lines: &[&str]) -> Window {
        Window::from_lines(
            lines
                .iter()
                .map(|line| line.split(',').map(str::to_string).collect())
                .collect(),
        )
    }

    fn tracked(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn test_newest_match_wins_and_silent_sensor_gets_sentinel() {
        let window = window(&["t3,S1,20,50", "t2,S2,21,55", "t1,S1,19,48"]);
        let resolved = resolve(&window, &tracked(&["S1", "S2", "S3"]), &specs());

        assert_eq!(resolved.len(), 3);

        assert_eq!(resolved[0].sensor_id, "S1");
        assert!(resolved[0].found);
        assert_eq!(resolved[0].values, vec!["20 *C", "50%"]);

        assert_eq!(resolved[1].values, vec!["21 *C", "55%"]);

        assert_eq!(resolved[2].sensor_id, "S3");
        assert!(!resolved[2].found);
        assert_eq!(resolved[2].values, vec![NO_VALUE, NO_VALUE]);
    }

    #[test]
    fn test_output_follows_tracked_order_not_window_order() {
        let window = window(&["t2,S2,21,55", "t1,S1,19,48"]);
        let resolved = resolve(&window, &tracked(&["S1", "S2"]), &specs());

        assert_eq!(resolved[0].sensor_id, "S1");
        assert_eq!(resolved[1].sensor_id, "S2");
    }

    #[test]
    fn test_unit_not_duplicated() {
        let window = window(&["t1,S1,20 *C,50%"]);
        let resolved = resolve(&window, &tracked(&["S1"]), &specs());

        assert_eq!(resolved[0].values, vec!["20 *C", "50%"]);
    }

    #[test]
    fn test_malformed_newest_line_falls_back_to_older() {
        // Newest S1 line is too short for the configured positions.
        let window = window(&["t3,S1", "t2,S1,19,48"]);
        let resolved = resolve(&window, &tracked(&["S1"]), &specs());

        assert!(resolved[0].found);
        assert_eq!(resolved[0].values, vec!["19 *C", "48%"]);
    }

    #[test]
    fn test_empty_window_yields_all_sentinels() {
        let resolved = resolve(&Window::default(), &tracked(&["S1", "S2"]), &specs());

        assert!(resolved.iter().all(|value| !value.found));
        assert!(resolved
            .iter()
            .all(|value| value.values == vec![NO_VALUE, NO_VALUE]));
    }
}
