//! Baseline overrides
//!
//! Each present health-metric field, and a couple of usage signals, adjusts one
//! risk dimension. Adjustments are field by field: an absent field leaves its
//! dimension at the identity-seeded baseline. Escalations only ever raise a
//! risk.

use crate::config::ScoringConfig;
use crate::types::{Escalation, HealthMetrics, RiskOverrides, RiskScoreSet, UsageWindow};

/// Derive overrides from validated metrics and the usage window
pub fn derive_overrides(
    metrics: &HealthMetrics,
    window: &UsageWindow,
    config: &ScoringConfig,
) -> RiskOverrides {
    let mut overrides = RiskOverrides::default();

    if metrics.eye_strain_symptoms == Some(true) {
        overrides.eye_strain = Escalation::Escalated;
    }

    if metrics
        .sleep_hours_per_night
        .is_some_and(|h| h < config.short_sleep_hours)
    {
        overrides.sleep_disruption = Escalation::Escalated;
    }

    if let Some(bmi) = metrics.bmi {
        if !(config.healthy_bmi_min..config.healthy_bmi_max).contains(&bmi) {
            overrides.health_adjustment = overrides
                .health_adjustment
                .saturating_sub(config.health_adjustment_step);
        }
    }

    if let Some(hours) = metrics.exercise_hours_per_week {
        if hours < config.low_exercise_hours {
            overrides.health_adjustment = overrides
                .health_adjustment
                .saturating_sub(config.health_adjustment_step);
        } else if hours >= config.active_exercise_hours {
            overrides.health_adjustment = overrides
                .health_adjustment
                .saturating_add(config.health_adjustment_step);
        }
    }

    if window.late_night_sessions > config.late_night_session_limit {
        overrides.sleep_disruption = Escalation::Escalated;
    }

    if window.avg_daily_minutes > config.high_daily_minutes {
        overrides.burnout = Escalation::Escalated;
    }

    overrides
}

/// Apply overrides to a baseline score set
pub fn apply_overrides(
    baseline: &RiskScoreSet,
    overrides: &RiskOverrides,
    config: &ScoringConfig,
) -> RiskScoreSet {
    RiskScoreSet {
        burnout: escalate(baseline.burnout, overrides.burnout, config.burnout_threshold),
        eye_strain: escalate(
            baseline.eye_strain,
            overrides.eye_strain,
            config.eye_strain_threshold,
        ),
        sleep_disruption: escalate(
            baseline.sleep_disruption,
            overrides.sleep_disruption,
            config.sleep_disruption_threshold,
        ),
        health_score: i32::from(baseline.health_score)
            .saturating_add(overrides.health_adjustment)
            .clamp(0, 100) as u8,
    }
}

/// Raise a score to one past its threshold when escalated
fn escalate(score: u8, escalation: Escalation, threshold: u8) -> u8 {
    match escalation {
        Escalation::Baseline => score,
        Escalation::Escalated => score.max(threshold.saturating_add(1).min(100)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::classify;
    use crate::types::{RiskLevel, UsageTrend};
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn quiet_window() -> UsageWindow {
        UsageWindow {
            reference: None,
            days: 7,
            minutes: 0,
            previous_minutes: 0,
            avg_daily_minutes: 0.0,
            device_minutes: BTreeMap::new(),
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

    fn baseline() -> RiskScoreSet {
        RiskScoreSet {
            burnout: 59,
            eye_strain: 64,
            sleep_disruption: 54,
            health_score: 36,
        }
    }

    #[test]
    fn test_absent_metrics_leave_baseline() {
        let config = ScoringConfig::default();
        let overrides = derive_overrides(&HealthMetrics::default(), &quiet_window(), &config);
        assert_eq!(overrides, RiskOverrides::default());
        assert_eq!(apply_overrides(&baseline(), &overrides, &config), baseline());
    }

    #[test]
    fn test_eye_strain_symptoms_escalate() {
        let config = ScoringConfig::default();
        let metrics = HealthMetrics {
            eye_strain_symptoms: Some(true),
            ..HealthMetrics::default()
        };
        let overrides = derive_overrides(&metrics, &quiet_window(), &config);
        let scores = apply_overrides(&baseline(), &overrides, &config);
        assert_eq!(scores.eye_strain, 66);
        assert_eq!(classify(&scores, &config).eye_strain, RiskLevel::Elevated);
        // other dimensions untouched
        assert_eq!(scores.burnout, 59);
        assert_eq!(scores.health_score, 36);
    }

    #[test]
    fn test_no_symptoms_do_not_lower() {
        let config = ScoringConfig::default();
        let metrics = HealthMetrics {
            eye_strain_symptoms: Some(false),
            ..HealthMetrics::default()
        };
        let high = RiskScoreSet {
            eye_strain: 80,
            ..baseline()
        };
        let overrides = derive_overrides(&metrics, &quiet_window(), &config);
        assert_eq!(apply_overrides(&high, &overrides, &config).eye_strain, 80);
    }

    #[test]
    fn test_escalation_never_lowers_a_score() {
        assert_eq!(escalate(84, Escalation::Escalated, 65), 84);
        assert_eq!(escalate(30, Escalation::Escalated, 50), 51);
        assert_eq!(escalate(30, Escalation::Baseline, 50), 30);
        assert_eq!(escalate(100, Escalation::Escalated, 100), 100);
    }

    #[test]
    fn test_short_sleep_boundary() {
        let config = ScoringConfig::default();
        let at = |hours: f64| {
            let metrics = HealthMetrics {
                sleep_hours_per_night: Some(hours),
                ..HealthMetrics::default()
            };
            derive_overrides(&metrics, &quiet_window(), &config).sleep_disruption
        };
        assert_eq!(at(5.9), Escalation::Escalated);
        assert_eq!(at(6.0), Escalation::Baseline);
    }

    #[test]
    fn test_health_adjustments() {
        let config = ScoringConfig::default();
        let metrics = HealthMetrics {
            bmi: Some(31.0),
            exercise_hours_per_week: Some(1.0),
            ..HealthMetrics::default()
        };
        let overrides = derive_overrides(&metrics, &quiet_window(), &config);
        assert_eq!(overrides.health_adjustment, -10);
        assert_eq!(apply_overrides(&baseline(), &overrides, &config).health_score, 26);

        let metrics = HealthMetrics {
            bmi: Some(22.0),
            exercise_hours_per_week: Some(6.0),
            ..HealthMetrics::default()
        };
        let overrides = derive_overrides(&metrics, &quiet_window(), &config);
        assert_eq!(overrides.health_adjustment, 5);
    }

    #[test]
    fn test_health_score_is_clamped() {
        let config = ScoringConfig::default();
        let overrides = RiskOverrides {
            health_adjustment: -500,
            ..RiskOverrides::default()
        };
        assert_eq!(apply_overrides(&baseline(), &overrides, &config).health_score, 0);
        let overrides = RiskOverrides {
            health_adjustment: 500,
            ..RiskOverrides::default()
        };
        assert_eq!(apply_overrides(&baseline(), &overrides, &config).health_score, 100);
    }

    #[test]
    fn test_oversized_step_saturates() {
        let config = ScoringConfig {
            health_adjustment_step: i32::MAX,
            ..ScoringConfig::default()
        };
        let metrics = HealthMetrics {
            bmi: Some(31.0),
            exercise_hours_per_week: Some(1.0),
            ..HealthMetrics::default()
        };
        let overrides = derive_overrides(&metrics, &quiet_window(), &config);
        assert_eq!(overrides.health_adjustment, i32::MIN);
        assert_eq!(apply_overrides(&baseline(), &overrides, &config).health_score, 0);
    }

    #[test]
    fn test_usage_escalations() {
        let config = ScoringConfig::default();
        let window = UsageWindow {
            late_night_sessions: 4,
            avg_daily_minutes: 500.0,
            ..quiet_window()
        };
        let overrides = derive_overrides(&HealthMetrics::default(), &window, &config);
        assert_eq!(overrides.sleep_disruption, Escalation::Escalated);
        assert_eq!(overrides.burnout, Escalation::Escalated);

        let window = UsageWindow {
            late_night_sessions: 3,
            avg_daily_minutes: 480.0,
            ..quiet_window()
        };
        let overrides = derive_overrides(&HealthMetrics::default(), &window, &config);
        assert_eq!(overrides, RiskOverrides::default());
    }
}
