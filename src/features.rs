//! Usage feature derivation
//!
//! Reduces normalized entries and detected sessions to totals, temporal
//! buckets and lookback-window statistics.

use crate::config::ScoringConfig;
use crate::normalizer::ValidEntry;
use crate::types::{DailyUsage, DeviceType, UsageSession, UsageTrend, UsageWindow};
use chrono::{DateTime, Datelike, Duration, Timelike, Utc};
use std::collections::{BTreeMap, BTreeSet};

/// Totals and window statistics for one aggregation
#[derive(Debug, Clone, PartialEq)]
pub struct UsageFeatures {
    pub total_minutes: u64,
    pub device_minutes: BTreeMap<DeviceType, u64>,
    /// Monday first
    pub weekday_minutes: [u64; 7],
    pub late_night_minutes: u64,
    pub window: UsageWindow,
}

/// Feature deriver for screen-time usage
pub struct UsageFeatureDeriver;

impl UsageFeatureDeriver {
    /// Derive usage features
    ///
    /// `reference` ends the lookback window; when `None` the latest entry is
    /// used.
    pub fn derive(
        entries: &[ValidEntry],
        sessions: &[UsageSession],
        reference: Option<DateTime<Utc>>,
        config: &ScoringConfig,
    ) -> UsageFeatures {
        let mut device_minutes = zeroed_devices();
        let mut weekday_minutes = [0u64; 7];
        let mut late_night_minutes = 0u64;

        for entry in entries {
            let local = config.to_local(entry.recorded_at);
            *device_minutes.entry(entry.device).or_insert(0) += entry.minutes;
            weekday_minutes[local.weekday().num_days_from_monday() as usize] += entry.minutes;
            if config.is_late_night_hour(local.hour()) {
                late_night_minutes += entry.minutes;
            }
        }
        let total_minutes = device_minutes.values().sum();

        let reference = reference.or_else(|| entries.last().map(|e| e.recorded_at));
        let window = match reference {
            Some(reference) => compute_window(entries, sessions, reference, config),
            None => empty_window(config),
        };

        UsageFeatures {
            total_minutes,
            device_minutes,
            weekday_minutes,
            late_night_minutes,
            window,
        }
    }
}

fn zeroed_devices() -> BTreeMap<DeviceType, u64> {
    DeviceType::ALL.iter().map(|d| (*d, 0)).collect()
}

fn empty_window(config: &ScoringConfig) -> UsageWindow {
    UsageWindow {
        reference: None,
        days: config.lookback_days,
        minutes: 0,
        previous_minutes: 0,
        avg_daily_minutes: 0.0,
        device_minutes: zeroed_devices(),
        session_count: 0,
        late_night_sessions: 0,
        late_night_days: 0,
        extended_sessions: 0,
        longest_session_minutes: 0,
        break_compliance: None,
        trend: UsageTrend::InsufficientData,
        daily: Vec::new(),
    }
}

/// Window is `(reference - days, reference]`; the previous window is the same
/// length immediately before it.
fn compute_window(
    entries: &[ValidEntry],
    sessions: &[UsageSession],
    reference: DateTime<Utc>,
    config: &ScoringConfig,
) -> UsageWindow {
    let span = Duration::days(i64::from(config.lookback_days));
    let start = reference - span;
    let previous_start = start - span;
    let in_window = |at: DateTime<Utc>| at > start && at <= reference;

    let mut minutes = 0u64;
    let mut previous_minutes = 0u64;
    let mut device_minutes = zeroed_devices();
    let mut late_days = BTreeSet::new();

    for entry in entries {
        if in_window(entry.recorded_at) {
            minutes += entry.minutes;
            *device_minutes.entry(entry.device).or_insert(0) += entry.minutes;
            let local = config.to_local(entry.recorded_at);
            if config.is_late_night_hour(local.hour()) {
                late_days.insert(local.date_naive());
            }
        } else if entry.recorded_at > previous_start && entry.recorded_at <= start {
            previous_minutes += entry.minutes;
        }
    }

    let windowed: Vec<&UsageSession> = sessions.iter().filter(|s| in_window(s.start)).collect();
    let late_night_sessions = windowed.iter().filter(|s| s.late_night).count();
    let extended_sessions = windowed
        .iter()
        .filter(|s| s.minutes >= config.extended_session_minutes)
        .count();
    let longest_session_minutes = windowed.iter().map(|s| s.minutes).max().unwrap_or(0);
    let break_compliance = if windowed.is_empty() {
        None
    } else {
        let compliant = windowed
            .iter()
            .filter(|s| s.minutes <= config.break_interval_minutes)
            .count();
        Some(compliant as f64 / windowed.len() as f64)
    };

    UsageWindow {
        reference: Some(reference),
        days: config.lookback_days,
        minutes,
        previous_minutes,
        avg_daily_minutes: minutes as f64 / f64::from(config.lookback_days),
        device_minutes,
        session_count: windowed.len(),
        late_night_sessions,
        late_night_days: late_days.len(),
        extended_sessions,
        longest_session_minutes,
        break_compliance,
        trend: classify_trend(minutes, previous_minutes, config.trend_tolerance),
        daily: daily_series(entries, reference, config),
    }
}

/// Compare window minutes with the previous window
fn classify_trend(current: u64, previous: u64, tolerance: f64) -> UsageTrend {
    if previous == 0 {
        return UsageTrend::InsufficientData;
    }
    let change = (current as f64 - previous as f64) / previous as f64;
    if change > tolerance {
        UsageTrend::Rising
    } else if change < -tolerance {
        UsageTrend::Falling
    } else {
        UsageTrend::Steady
    }
}

/// Minutes per local day for the `lookback_days` days ending on the
/// reference's local date, oldest first
fn daily_series(
    entries: &[ValidEntry],
    reference: DateTime<Utc>,
    config: &ScoringConfig,
) -> Vec<DailyUsage> {
    let last_day = config.to_local(reference).date_naive();
    let days = i64::from(config.lookback_days);
    let first_day = last_day - Duration::days(days - 1);

    let mut by_day: BTreeMap<_, u64> = (0..days)
        .map(|i| (first_day + Duration::days(i), 0))
        .collect();

    for entry in entries {
        let day = config.to_local(entry.recorded_at).date_naive();
        if let Some(total) = by_day.get_mut(&day) {
            *total += entry.minutes;
        }
    }

    by_day
        .into_iter()
        .map(|(date, minutes)| DailyUsage { date, minutes })
        .collect()
}
