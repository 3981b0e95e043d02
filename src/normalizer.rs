//! Input normalization
//!
//! Screens raw store data before aggregation. Malformed entries and
//! out-of-range metric fields are dropped one by one and tallied in a
//! [`DiscardSummary`]; nothing here can fail.

use crate::config::ScoringConfig;
use crate::types::{DiscardSummary, HealthMetrics, ScreenTimeEntry};
use chrono::{DateTime, TimeZone, Utc};

/// Earliest accepted timestamp (2000-01-01T00:00:00Z) in nanoseconds
const MIN_TIMESTAMP_NS: i64 = 946_684_800_000_000_000;

/// First rejected timestamp (2100-01-01T00:00:00Z) in nanoseconds
const MAX_TIMESTAMP_NS: i64 = 4_102_444_800_000_000_000;

/// Hours in a day, the upper bound for nightly sleep
const MAX_SLEEP_HOURS: f64 = 24.0;

/// An entry that passed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidEntry {
    pub minutes: u64,
    pub device: crate::types::DeviceType,
    pub recorded_at: DateTime<Utc>,
}

/// Normalized aggregator input
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedInput {
    /// Accepted entries sorted by timestamp
    pub entries: Vec<ValidEntry>,
    /// Metric fields that passed validation
    pub metrics: HealthMetrics,
    pub discarded: DiscardSummary,
}

/// Normalizer for store data
pub struct Normalizer;

impl Normalizer {
    /// Validate entries and metric fields against the configuration
    pub fn normalize(
        entries: &[ScreenTimeEntry],
        metrics: Option<&HealthMetrics>,
        config: &ScoringConfig,
    ) -> NormalizedInput {
        let mut discarded = DiscardSummary::default();

        let mut accepted: Vec<ValidEntry> = entries
            .iter()
            .filter_map(|entry| validate_entry(entry, config, &mut discarded))
            .collect();
        // Stable sort keeps store order for identical timestamps
        accepted.sort_by_key(|e| e.recorded_at);

        let metrics = metrics
            .map(|m| validate_metrics(m, &mut discarded))
            .unwrap_or_default();

        NormalizedInput {
            entries: accepted,
            metrics,
            discarded,
        }
    }
}

fn validate_entry(
    entry: &ScreenTimeEntry,
    config: &ScoringConfig,
    discarded: &mut DiscardSummary,
) -> Option<ValidEntry> {
    if entry.minutes < 0 {
        tracing::debug!(minutes = entry.minutes, "discarding entry with negative minutes");
        discarded.negative_minutes += 1;
        return None;
    }
    if entry.minutes > config.max_entry_minutes {
        tracing::debug!(minutes = entry.minutes, "discarding entry longer than allowed");
        discarded.excessive_minutes += 1;
        return None;
    }
    if !(MIN_TIMESTAMP_NS..MAX_TIMESTAMP_NS).contains(&entry.timestamp) {
        tracing::debug!(timestamp = entry.timestamp, "discarding entry with timestamp out of range");
        discarded.timestamp_out_of_range += 1;
        return None;
    }

    Some(ValidEntry {
        minutes: entry.minutes as u64,
        device: entry.device,
        recorded_at: Utc.timestamp_nanos(entry.timestamp),
    })
}

fn validate_metrics(metrics: &HealthMetrics, discarded: &mut DiscardSummary) -> HealthMetrics {
    let mut reject = |field: &str| {
        tracing::debug!(field, "rejecting out-of-range health metric");
        discarded.rejected_metric_fields.push(field.to_string());
    };

    let bmi = match metrics.bmi {
        Some(v) if v.is_finite() && v > 0.0 => Some(v),
        Some(_) => {
            reject("bmi");
            None
        }
        None => None,
    };

    let sleep_hours_per_night = match metrics.sleep_hours_per_night {
        Some(v) if v.is_finite() && (0.0..=MAX_SLEEP_HOURS).contains(&v) => Some(v),
        Some(_) => {
            reject("sleepHoursPerNight");
            None
        }
        None => None,
    };

    let exercise_hours_per_week = match metrics.exercise_hours_per_week {
        Some(v) if v.is_finite() && v >= 0.0 => Some(v),
        Some(_) => {
            reject("exerciseHoursPerWeek");
            None
        }
        None => None,
    };

    HealthMetrics {
        bmi,
        sleep_hours_per_night,
        eye_strain_symptoms: metrics.eye_strain_symptoms,
        exercise_hours_per_week,
    }
}
