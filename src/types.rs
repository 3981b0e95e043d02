//! Core data types for screen-health
//!
//! Store-facing types keep the remote store's camelCase field names. Derived
//! types produced by the engine use snake_case.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Device a screen-time entry was recorded on
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Tablet,
    Computer,
    Phone,
}

impl DeviceType {
    /// Every device, in display order
    pub const ALL: [DeviceType; 3] = [DeviceType::Tablet, DeviceType::Computer, DeviceType::Phone];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Tablet => "tablet",
            DeviceType::Computer => "computer",
            DeviceType::Phone => "phone",
        }
    }
}

/// A single screen-time entry as held by the remote store
///
/// `minutes` is signed on the wire so that malformed submissions can be
/// represented and discarded instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenTimeEntry {
    /// Minutes of use
    pub minutes: i64,
    /// Device the time was spent on
    pub device: DeviceType,
    /// Recording instant, nanoseconds since the Unix epoch
    pub timestamp: i64,
}

impl ScreenTimeEntry {
    pub fn new(minutes: i64, device: DeviceType, recorded_at: DateTime<Utc>) -> Self {
        Self {
            minutes,
            device,
            timestamp: recorded_at.timestamp_nanos_opt().unwrap_or(i64::MAX),
        }
    }

    /// The recording instant as a UTC datetime
    pub fn recorded_at(&self) -> DateTime<Utc> {
        Utc.timestamp_nanos(self.timestamp)
    }
}

/// Self-reported health metrics; every field is independently optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthMetrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bmi: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep_hours_per_night: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eye_strain_symptoms: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercise_hours_per_week: Option<f64>,
}

/// User profile as held by the remote store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Everything the I/O layer fetched for one caller, handed over in one piece
///
/// Deserialization is lenient per entry: a screen-time entry that does not
/// fit [`ScreenTimeEntry`] is counted in `unparseable_entries` instead of
/// failing the whole snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawStoreSnapshot")]
pub struct StoreSnapshot {
    pub screen_time: Vec<ScreenTimeEntry>,
    pub health_metrics: Option<HealthMetrics>,
    /// Score previously saved by the client, if any
    pub risk_score: Option<i64>,
    pub profile: Option<UserProfile>,
    /// Entries dropped because they could not be read at all
    #[serde(skip)]
    pub unparseable_entries: usize,
}

/// Wire shape of [`StoreSnapshot`] before per-entry parsing
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStoreSnapshot {
    #[serde(default)]
    screen_time: Vec<serde_json::Value>,
    #[serde(default)]
    health_metrics: Option<HealthMetrics>,
    #[serde(default)]
    risk_score: Option<serde_json::Value>,
    #[serde(default)]
    profile: Option<UserProfile>,
}

impl From<RawStoreSnapshot> for StoreSnapshot {
    fn from(raw: RawStoreSnapshot) -> Self {
        let mut unparseable_entries = 0;
        let screen_time = raw
            .screen_time
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<ScreenTimeEntry>(value) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::debug!(error = %e, "discarding unparseable screen-time entry");
                    unparseable_entries += 1;
                    None
                }
            })
            .collect();

        // A non-integer cached score is ignored like an out-of-range one
        let risk_score = raw.risk_score.and_then(|value| value.as_i64());

        Self {
            screen_time,
            health_metrics: raw.health_metrics,
            risk_score,
            profile: raw.profile,
            unparseable_entries,
        }
    }
}

/// Four bounded risk scores, each in 0..=100
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskScoreSet {
    pub burnout: u8,
    pub eye_strain: u8,
    pub sleep_disruption: u8,
    pub health_score: u8,
}

/// Risk classification of one dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    /// Within the normal band
    Normal,
    /// Past the dimension's threshold
    Elevated,
}

impl RiskLevel {
    pub fn is_elevated(&self) -> bool {
        matches!(self, RiskLevel::Elevated)
    }
}

/// Classification of every dimension of a [`RiskScoreSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskLevels {
    pub burnout: RiskLevel,
    pub eye_strain: RiskLevel,
    pub sleep_disruption: RiskLevel,
    /// Elevated means the health score needs attention
    pub health_score: RiskLevel,
}

/// A risk factor or recommendation line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub text: String,
    pub detail: String,
}

impl Insight {
    pub fn new(text: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            detail: detail.into(),
        }
    }
}

pub type RiskFactor = Insight;
pub type Recommendation = Insight;

/// Escalation applied to one baseline dimension
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Escalation {
    /// Leave the baseline as is
    #[default]
    Baseline,
    /// Raise the dimension past its threshold
    Escalated,
}

/// Field-level adjustments the aggregator derives for the baseline scores
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskOverrides {
    pub burnout: Escalation,
    pub eye_strain: Escalation,
    pub sleep_disruption: Escalation,
    /// Signed points added to the health score
    pub health_adjustment: i32,
}

/// Entries and fields ignored during aggregation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscardSummary {
    /// Entries with negative minutes
    pub negative_minutes: usize,
    /// Entries longer than the configured maximum
    pub excessive_minutes: usize,
    /// Entries whose timestamp is outside the sane range
    pub timestamp_out_of_range: usize,
    /// Entries that could not be read, e.g. a timestamp beyond `i64`
    #[serde(default)]
    pub unparseable: usize,
    /// Health metric fields whose value was out of range
    pub rejected_metric_fields: Vec<String>,
}

impl DiscardSummary {
    /// Total number of discarded entries
    pub fn discarded_entries(&self) -> usize {
        self.negative_minutes + self.excessive_minutes + self.timestamp_out_of_range + self.unparseable
    }

    pub fn is_empty(&self) -> bool {
        self.discarded_entries() == 0 && self.rejected_metric_fields.is_empty()
    }
}

/// A maximal run of entries whose consecutive timestamps are within the gap
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageSession {
    /// Timestamp of the first entry
    pub start: DateTime<Utc>,
    /// Timestamp of the last entry
    pub end: DateTime<Utc>,
    /// Sum of the entries' minutes
    pub minutes: u64,
    pub entry_count: usize,
    /// Whether any entry was recorded in the late-night window
    pub late_night: bool,
}

/// Direction of screen time compared with the previous window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageTrend {
    Rising,
    Steady,
    Falling,
    InsufficientData,
}

/// Minutes on one local calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyUsage {
    pub date: NaiveDate,
    pub minutes: u64,
}

/// Statistics over the lookback window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageWindow {
    /// End of the window; `None` when no entry was accepted
    pub reference: Option<DateTime<Utc>>,
    pub days: u32,
    pub minutes: u64,
    pub previous_minutes: u64,
    pub avg_daily_minutes: f64,
    pub device_minutes: BTreeMap<DeviceType, u64>,
    pub session_count: usize,
    pub late_night_sessions: usize,
    /// Distinct local days with late-night usage
    pub late_night_days: usize,
    pub extended_sessions: usize,
    pub longest_session_minutes: u64,
    /// Share of sessions no longer than the break interval
    pub break_compliance: Option<f64>,
    pub trend: UsageTrend,
    /// Minutes per local day, oldest first
    pub daily: Vec<DailyUsage>,
}

/// Output of the metrics aggregator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateSummary {
    pub accepted_entries: usize,
    pub total_minutes: u64,
    /// Minutes per device; every device is present
    pub device_minutes: BTreeMap<DeviceType, u64>,
    /// Minutes per local weekday, Monday first
    pub weekday_minutes: [u64; 7],
    pub late_night_minutes: u64,
    pub sessions: Vec<UsageSession>,
    pub window: UsageWindow,
    pub overrides: RiskOverrides,
    pub risk_factors: Vec<RiskFactor>,
    pub recommendations: Vec<Recommendation>,
    pub discarded: DiscardSummary,
}

/// Scores, classifications and the aggregate behind them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellnessReport {
    /// Identity-seeded scores before overrides
    pub baseline: RiskScoreSet,
    /// Scores after overrides
    pub scores: RiskScoreSet,
    pub levels: RiskLevels,
    pub summary: AggregateSummary,
    /// Score previously saved in the store, when in range
    pub cached_risk_score: Option<u8>,
    pub display_name: String,
    pub initials: String,
}

/// Direction arrow shown on a metric card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardTrend {
    Up,
    Down,
}

/// Dashboard producer metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Header user block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardUser {
    pub display_name: String,
    pub initials: String,
}

/// One risk dimension as displayed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricCard {
    pub key: String,
    pub title: String,
    pub value: u8,
    pub level: RiskLevel,
    pub trend: CardTrend,
    pub trend_label: String,
    pub description: String,
}

/// A label/value pair in the quick stats bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickStat {
    pub label: String,
    pub value: String,
}

/// Usage block of the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardUsage {
    pub total_minutes: u64,
    pub window_minutes: u64,
    pub avg_daily_minutes: f64,
    pub trend: UsageTrend,
    pub device_minutes: BTreeMap<DeviceType, u64>,
    pub weekday_minutes: [u64; 7],
    pub daily: Vec<DailyUsage>,
    pub session_count: usize,
    pub late_night_sessions: usize,
}

/// Complete dashboard payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardPayload {
    pub producer: DashboardProducer,
    pub computed_at_utc: String,
    pub user: DashboardUser,
    pub metrics: Vec<MetricCard>,
    pub quick_stats: Vec<QuickStat>,
    pub usage: DashboardUsage,
    pub risk_factors: Vec<RiskFactor>,
    pub recommendations: Vec<Recommendation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached_risk_score: Option<u8>,
    pub discarded_entries: usize,
}
