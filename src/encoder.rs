//! Dashboard encoding
//!
//! Turns a [`WellnessReport`] into the read-only payload the presentation layer
//! renders: four metric cards, a quick stats bar, a usage block and the
//! factor/recommendation lists.

use crate::error::ComputeError;
use crate::seed::RiskDimension;
use crate::types::{
    CardTrend, DashboardPayload, DashboardProducer, DashboardUsage, DashboardUser, MetricCard,
    QuickStat, RiskLevel, WellnessReport,
};
use crate::{PRODUCER_NAME, VERSION};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Dashboard encoder for producing presentation payloads
pub struct DashboardEncoder {
    instance_id: String,
}

impl Default for DashboardEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Encode a report into a dashboard payload
    pub fn encode(&self, report: &WellnessReport) -> Result<DashboardPayload, ComputeError> {
        self.encode_at(report, Utc::now())
    }

    /// Encode with an explicit computation time
    pub fn encode_at(
        &self,
        report: &WellnessReport,
        computed_at: DateTime<Utc>,
    ) -> Result<DashboardPayload, ComputeError> {
        let summary = &report.summary;
        let window = &summary.window;

        let producer = DashboardProducer {
            name: PRODUCER_NAME.to_string(),
            version: VERSION.to_string(),
            instance_id: self.instance_id.clone(),
        };

        let user = DashboardUser {
            display_name: report.display_name.clone(),
            initials: report.initials.clone(),
        };

        let usage = DashboardUsage {
            total_minutes: summary.total_minutes,
            window_minutes: window.minutes,
            avg_daily_minutes: window.avg_daily_minutes,
            trend: window.trend,
            device_minutes: summary.device_minutes.clone(),
            weekday_minutes: summary.weekday_minutes,
            daily: window.daily.clone(),
            session_count: window.session_count,
            late_night_sessions: window.late_night_sessions,
        };

        Ok(DashboardPayload {
            producer,
            computed_at_utc: computed_at.to_rfc3339(),
            user,
            metrics: self.build_cards(report),
            quick_stats: self.build_quick_stats(report),
            usage,
            risk_factors: summary.risk_factors.clone(),
            recommendations: summary.recommendations.clone(),
            cached_risk_score: report.cached_risk_score,
            discarded_entries: summary.discarded.discarded_entries(),
        })
    }

    /// Encode to JSON string
    pub fn encode_to_json(&self, report: &WellnessReport) -> Result<String, ComputeError> {
        let payload = self.encode(report)?;
        serde_json::to_string_pretty(&payload).map_err(ComputeError::JsonError)
    }

    fn build_cards(&self, report: &WellnessReport) -> Vec<MetricCard> {
        RiskDimension::ALL
            .iter()
            .map(|dimension| {
                let level = dimension.level(&report.levels);
                MetricCard {
                    key: dimension.key().to_string(),
                    title: dimension.title().to_string(),
                    value: dimension.score(&report.scores),
                    level,
                    // up always means "worse"
                    trend: match level {
                        RiskLevel::Elevated => CardTrend::Up,
                        RiskLevel::Normal => CardTrend::Down,
                    },
                    trend_label: dimension.label(level).to_string(),
                    description: dimension.description().to_string(),
                }
            })
            .collect()
    }

    fn build_quick_stats(&self, report: &WellnessReport) -> Vec<QuickStat> {
        let window = &report.summary.window;

        let compliance = window
            .break_compliance
            .map(|ratio| format!("{:.0}%", ratio * 100.0))
            .unwrap_or_else(|| "n/a".to_string());

        let risk = if report.levels.burnout.is_elevated() {
            "High"
        } else {
            "Moderate"
        };

        vec![
            QuickStat {
                label: "Avg Screen Time".to_string(),
                value: format!("{:.1} hrs", window.avg_daily_minutes / 60.0),
            },
            QuickStat {
                label: "Break Compliance".to_string(),
                value: compliance,
            },
            QuickStat {
                label: "Night Usage".to_string(),
                value: format!("{}/{} days", window.late_night_days, window.days),
            },
            QuickStat {
                label: "Risk Level".to_string(),
                value: risk.to_string(),
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScoringConfig;
    use crate::pipeline::assess;
    use crate::types::{DeviceType, HealthMetrics, ScreenTimeEntry, StoreSnapshot, UserProfile};
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;

    fn report() -> WellnessReport {
        let start = Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap();
        let snapshot = StoreSnapshot {
            screen_time: vec![
                ScreenTimeEntry::new(90, DeviceType::Computer, start),
                ScreenTimeEntry::new(30, DeviceType::Phone, start + Duration::hours(3)),
                ScreenTimeEntry::new(
                    45,
                    DeviceType::Phone,
                    Utc.with_ymd_and_hms(2024, 1, 15, 23, 30, 0).unwrap(),
                ),
            ],
            health_metrics: Some(HealthMetrics {
                eye_strain_symptoms: Some(true),
                ..HealthMetrics::default()
            }),
            risk_score: Some(40),
            profile: Some(UserProfile {
                name: "grace hopper".to_string(),
                ..UserProfile::default()
            }),
            ..StoreSnapshot::default()
        };
        assess("abc", &snapshot, &ScoringConfig::default())
    }

    #[test]
    fn test_producer_block() {
        let encoder = DashboardEncoder::with_instance_id("test-instance".to_string());
        let payload = encoder.encode(&report()).unwrap();
        assert_eq!(payload.producer.name, "screen-health");
        assert_eq!(payload.producer.version, VERSION);
        assert_eq!(payload.producer.instance_id, "test-instance");
        assert_eq!(payload.user.display_name, "grace hopper");
        assert_eq!(payload.user.initials, "GH");
        assert_eq!(payload.cached_risk_score, Some(40));
    }

    #[test]
    fn test_unique_instance_ids() {
        let a = DashboardEncoder::new();
        let b = DashboardEncoder::new();
        assert_ne!(a.instance_id(), b.instance_id());
    }

    #[test]
    fn test_metric_cards() {
        let payload = DashboardEncoder::new().encode(&report()).unwrap();
        let keys: Vec<&str> = payload.metrics.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["burnout", "eye_strain", "sleep_disruption", "health_score"]);

        let burnout = &payload.metrics[0];
        assert_eq!(burnout.value, 59);
        assert_eq!(burnout.trend, CardTrend::Down);
        assert_eq!(burnout.trend_label, "Moderate");

        let eye = &payload.metrics[1];
        assert_eq!(eye.value, 66);
        assert_eq!(eye.level, RiskLevel::Elevated);
        assert_eq!(eye.trend, CardTrend::Up);
        assert_eq!(eye.trend_label, "High");

        let health = &payload.metrics[3];
        assert_eq!(health.value, 36);
        assert_eq!(health.trend, CardTrend::Up);
        assert_eq!(health.trend_label, "Needs Work");
    }

    #[test]
    fn test_quick_stats() {
        let payload = DashboardEncoder::new().encode(&report()).unwrap();
        let stats: Vec<(&str, &str)> = payload
            .quick_stats
            .iter()
            .map(|s| (s.label.as_str(), s.value.as_str()))
            .collect();
        // 165 minutes over 7 days
        assert_eq!(
            stats,
            vec![
                ("Avg Screen Time", "0.4 hrs"),
                ("Break Compliance", "67%"),
                ("Night Usage", "1/7 days"),
                ("Risk Level", "Moderate"),
            ]
        );
    }

    #[test]
    fn test_encode_at_is_stable() {
        let encoder = DashboardEncoder::with_instance_id("fixed".to_string());
        let at = Utc.with_ymd_and_hms(2024, 1, 16, 0, 0, 0).unwrap();
        let report = report();
        assert_eq!(
            encoder.encode_at(&report, at).unwrap(),
            encoder.encode_at(&report, at).unwrap()
        );
    }

    #[test]
    fn test_json_shape() {
        let json = DashboardEncoder::new().encode_to_json(&report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["usage"]["device_minutes"]["phone"], 75);
        assert_eq!(value["usage"]["device_minutes"]["tablet"], 0);
        assert_eq!(value["metrics"][1]["trend"], "up");
        assert_eq!(value["metrics"][1]["level"], "elevated");
        assert!(value["recommendations"].as_array().unwrap().len() >= 1);
    }
}
