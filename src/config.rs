//! Scoring configuration
//!
//! Every threshold the engine classifies against lives here as a named value so
//! that callers (and tests) can probe behavior exactly at the boundary.

use crate::error::ComputeError;
use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

/// Burnout above this value is elevated
pub const DEFAULT_BURNOUT_THRESHOLD: u8 = 65;

/// Eye strain above this value is high
pub const DEFAULT_EYE_STRAIN_THRESHOLD: u8 = 65;

/// Sleep disruption above this value is elevated
pub const DEFAULT_SLEEP_DISRUPTION_THRESHOLD: u8 = 50;

/// Health score below this value needs attention
///
/// Exactly 60 is Normal here; earlier dashboard versions labelled it "Needs Work".
pub const DEFAULT_HEALTH_SCORE_THRESHOLD: u8 = 60;

/// Consecutive entries closer than this belong to the same session
pub const DEFAULT_SESSION_GAP_MINUTES: i64 = 15;

/// Late-night window start (local hour, inclusive)
pub const DEFAULT_LATE_NIGHT_START_HOUR: u32 = 23;

/// Late-night window end (local hour, exclusive)
pub const DEFAULT_LATE_NIGHT_END_HOUR: u32 = 5;

/// Length of the lookback window in days
pub const DEFAULT_LOOKBACK_DAYS: u32 = 7;

/// A single entry longer than a day is malformed
pub const DEFAULT_MAX_ENTRY_MINUTES: i64 = 24 * 60;

/// Longest accepted session gap, one day
pub const MAX_SESSION_GAP_MINUTES: i64 = 24 * 60;

/// Longest accepted lookback window, one leap year
pub const MAX_LOOKBACK_DAYS: u32 = 366;

/// Largest accepted per-entry limit; entries never exceed a day
pub const MAX_ENTRY_MINUTES_LIMIT: i64 = 24 * 60;

/// Largest accepted health score step in either direction
pub const MAX_HEALTH_ADJUSTMENT_STEP: i32 = 100;

/// Configuration for the score generator and the aggregator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Burnout classification threshold (elevated when strictly above)
    pub burnout_threshold: u8,
    /// Eye strain classification threshold (high when strictly above)
    pub eye_strain_threshold: u8,
    /// Sleep disruption classification threshold (elevated when strictly above)
    pub sleep_disruption_threshold: u8,
    /// Health score threshold (needs attention when strictly below)
    pub health_score_threshold: u8,

    /// Maximum gap between consecutive entries of one session, exclusive
    pub session_gap_minutes: i64,
    /// Local hour at which late night begins
    pub late_night_start_hour: u32,
    /// Local hour at which late night ends
    pub late_night_end_hour: u32,
    /// Fixed UTC offset used for local-time bucketing
    pub utc_offset_minutes: i32,
    /// Lookback window length in days
    pub lookback_days: u32,
    /// Entries above this many minutes are discarded
    pub max_entry_minutes: i64,

    /// More late-night sessions than this in the window raises a factor
    pub late_night_session_limit: usize,
    /// Sessions at least this long count as extended
    pub extended_session_minutes: u64,
    /// Sessions no longer than this count as break-compliant
    pub break_interval_minutes: u64,
    /// Break compliance below this ratio raises a factor
    pub min_break_compliance: f64,
    /// Average daily minutes above this raises a factor and escalates burnout
    pub high_daily_minutes: f64,
    /// Phone share of total minutes above this raises a factor
    pub phone_share_limit: f64,
    /// Relative change between windows that counts as a trend
    pub trend_tolerance: f64,

    /// Sleep below this many hours escalates sleep disruption
    pub short_sleep_hours: f64,
    /// Exercise below this many hours per week lowers the health score
    pub low_exercise_hours: f64,
    /// Exercise at or above this many hours per week raises the health score
    pub active_exercise_hours: f64,
    /// Lower bound of the healthy BMI range (inclusive)
    pub healthy_bmi_min: f64,
    /// Upper bound of the healthy BMI range (exclusive)
    pub healthy_bmi_max: f64,
    /// Points the health score moves per adjustment
    pub health_adjustment_step: i32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            burnout_threshold: DEFAULT_BURNOUT_THRESHOLD,
            eye_strain_threshold: DEFAULT_EYE_STRAIN_THRESHOLD,
            sleep_disruption_threshold: DEFAULT_SLEEP_DISRUPTION_THRESHOLD,
            health_score_threshold: DEFAULT_HEALTH_SCORE_THRESHOLD,
            session_gap_minutes: DEFAULT_SESSION_GAP_MINUTES,
            late_night_start_hour: DEFAULT_LATE_NIGHT_START_HOUR,
            late_night_end_hour: DEFAULT_LATE_NIGHT_END_HOUR,
            utc_offset_minutes: 0,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            max_entry_minutes: DEFAULT_MAX_ENTRY_MINUTES,
            late_night_session_limit: 3,
            extended_session_minutes: 180,
            break_interval_minutes: 60,
            min_break_compliance: 0.5,
            high_daily_minutes: 480.0,
            phone_share_limit: 0.5,
            trend_tolerance: 0.10,
            short_sleep_hours: 6.0,
            low_exercise_hours: 2.5,
            active_exercise_hours: 5.0,
            healthy_bmi_min: 18.5,
            healthy_bmi_max: 25.0,
            health_adjustment_step: 5,
        }
    }
}

impl ScoringConfig {
    /// Load a configuration from JSON; missing keys take their defaults
    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        let config: ScoringConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to pretty JSON
    pub fn to_json(&self) -> Result<String, ComputeError> {
        serde_json::to_string_pretty(self).map_err(ComputeError::JsonError)
    }

    /// Check that every value is usable
    pub fn validate(&self) -> Result<(), ComputeError> {
        for (name, value) in [
            ("burnout_threshold", self.burnout_threshold),
            ("eye_strain_threshold", self.eye_strain_threshold),
            ("sleep_disruption_threshold", self.sleep_disruption_threshold),
            ("health_score_threshold", self.health_score_threshold),
        ] {
            if value > 100 {
                return Err(ComputeError::InvalidConfig(format!(
                    "{name} must be within 0..=100, got {value}"
                )));
            }
        }

        if !(1..=MAX_SESSION_GAP_MINUTES).contains(&self.session_gap_minutes) {
            return Err(ComputeError::InvalidConfig(format!(
                "session_gap_minutes must be within 1..={MAX_SESSION_GAP_MINUTES}, got {}",
                self.session_gap_minutes
            )));
        }
        if self.late_night_start_hour > 23 || self.late_night_end_hour > 23 {
            return Err(ComputeError::InvalidConfig(
                "late-night hours must be within 0..=23".to_string(),
            ));
        }
        if !(1..=MAX_LOOKBACK_DAYS).contains(&self.lookback_days) {
            return Err(ComputeError::InvalidConfig(format!(
                "lookback_days must be within 1..={MAX_LOOKBACK_DAYS}, got {}",
                self.lookback_days
            )));
        }
        if !(1..=MAX_ENTRY_MINUTES_LIMIT).contains(&self.max_entry_minutes) {
            return Err(ComputeError::InvalidConfig(format!(
                "max_entry_minutes must be within 1..={MAX_ENTRY_MINUTES_LIMIT}, got {}",
                self.max_entry_minutes
            )));
        }
        if !(-MAX_HEALTH_ADJUSTMENT_STEP..=MAX_HEALTH_ADJUSTMENT_STEP)
            .contains(&self.health_adjustment_step)
        {
            return Err(ComputeError::InvalidConfig(format!(
                "health_adjustment_step must be within ±{MAX_HEALTH_ADJUSTMENT_STEP}, got {}",
                self.health_adjustment_step
            )));
        }
        if !(self.healthy_bmi_min < self.healthy_bmi_max) {
            return Err(ComputeError::InvalidConfig(
                "healthy_bmi_min must be below healthy_bmi_max".to_string(),
            ));
        }
        for (name, ratio) in [
            ("min_break_compliance", self.min_break_compliance),
            ("phone_share_limit", self.phone_share_limit),
        ] {
            if !(0.0..=1.0).contains(&ratio) {
                return Err(ComputeError::InvalidConfig(format!(
                    "{name} must be a ratio within 0..=1, got {ratio}"
                )));
            }
        }
        self.local_offset()?;
        Ok(())
    }

    /// The fixed offset used to place timestamps in local time
    pub fn local_offset(&self) -> Result<FixedOffset, ComputeError> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or(ComputeError::InvalidTimezone(self.utc_offset_minutes))
    }

    /// Place an instant in local time. An invalid offset falls back to UTC;
    /// `validate` rejects such configurations up front.
    pub fn to_local(&self, at: DateTime<Utc>) -> DateTime<FixedOffset> {
        let offset = self.local_offset().unwrap_or_else(|_| Utc.fix());
        at.with_timezone(&offset)
    }

    /// Whether a local hour falls inside the late-night window
    pub fn is_late_night_hour(&self, hour: u32) -> bool {
        let (start, end) = (self.late_night_start_hour, self.late_night_end_hour);
        if start <= end {
            hour >= start && hour < end
        } else {
            hour >= start || hour < end
        }
    }
}
