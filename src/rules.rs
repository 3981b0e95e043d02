//! Risk factor and recommendation rules
//!
//! A fixed, ordered list of independent threshold rules. Every rule that
//! applies contributes one risk factor and one recommendation; there is no
//! first-match short circuit.

use crate::config::ScoringConfig;
use crate::types::{
    DeviceType, HealthMetrics, Insight, Recommendation, RiskFactor, UsageTrend, UsageWindow,
};

/// What the rules look at
#[derive(Debug, Clone, Copy)]
pub struct RuleInput<'a> {
    pub window: &'a UsageWindow,
    pub metrics: &'a HealthMetrics,
}

/// A single threshold rule
pub struct Rule {
    pub name: &'static str,
    evaluate: fn(&RuleInput<'_>, &ScoringConfig) -> Option<(RiskFactor, Recommendation)>,
}

impl Rule {
    pub fn evaluate(
        &self,
        input: &RuleInput<'_>,
        config: &ScoringConfig,
    ) -> Option<(RiskFactor, Recommendation)> {
        (self.evaluate)(input, config)
    }
}

/// All rules, in evaluation order
pub const RULES: &[Rule] = &[
    Rule {
        name: "late_night_usage",
        evaluate: late_night_usage,
    },
    Rule {
        name: "extended_sessions",
        evaluate: extended_sessions,
    },
    Rule {
        name: "high_daily_screen_time",
        evaluate: high_daily_screen_time,
    },
    Rule {
        name: "phone_heavy_usage",
        evaluate: phone_heavy_usage,
    },
    Rule {
        name: "insufficient_breaks",
        evaluate: insufficient_breaks,
    },
    Rule {
        name: "rising_screen_time",
        evaluate: rising_screen_time,
    },
    Rule {
        name: "eye_strain_symptoms",
        evaluate: eye_strain_symptoms,
    },
    Rule {
        name: "short_sleep",
        evaluate: short_sleep,
    },
    Rule {
        name: "low_exercise",
        evaluate: low_exercise,
    },
    Rule {
        name: "bmi_out_of_range",
        evaluate: bmi_out_of_range,
    },
];

/// Generic wellness tips shown when no rule fires
pub fn default_recommendations() -> Vec<Recommendation> {
    vec![
        Insight::new(
            "Take 20-20-20 eye breaks",
            "Every 20 min, look 20 ft away for 20 seconds",
        ),
        Insight::new(
            "Limit screens after 9 PM",
            "Blue light disrupts melatonin production",
        ),
        Insight::new(
            "Use app timers for social media",
            "Set a 45-minute daily limit",
        ),
        Insight::new(
            "Enable night mode after sunset",
            "Reduces eye strain and sleep disruption",
        ),
    ]
}

/// Run every rule and collect factors and recommendations
///
/// Recommendations are de-duplicated by text; when no rule fires the default
/// tips are returned instead.
pub fn evaluate_rules(
    input: &RuleInput<'_>,
    config: &ScoringConfig,
) -> (Vec<RiskFactor>, Vec<Recommendation>) {
    let mut factors = Vec::new();
    let mut recommendations: Vec<Recommendation> = Vec::new();

    for rule in RULES {
        if let Some((factor, recommendation)) = rule.evaluate(input, config) {
            tracing::debug!(rule = rule.name, detail = %factor.detail, "risk rule fired");
            factors.push(factor);
            if !recommendations.iter().any(|r| r.text == recommendation.text) {
                recommendations.push(recommendation);
            }
        }
    }

    if factors.is_empty() {
        recommendations = default_recommendations();
    }

    (factors, recommendations)
}

fn late_night_usage(
    input: &RuleInput<'_>,
    config: &ScoringConfig,
) -> Option<(RiskFactor, Recommendation)> {
    let window = input.window;
    if window.late_night_sessions <= config.late_night_session_limit {
        return None;
    }
    Some((
        Insight::new(
            "Late night usage detected",
            format!(
                "{} late-night sessions in the last {} days, activity after {}:00 on {} of {} days",
                window.late_night_sessions,
                window.days,
                config.late_night_start_hour,
                window.late_night_days,
                window.days
            ),
        ),
        Insight::new(
            "Limit screens after 9 PM",
            "Blue light disrupts melatonin production",
        ),
    ))
}

fn extended_sessions(
    input: &RuleInput<'_>,
    config: &ScoringConfig,
) -> Option<(RiskFactor, Recommendation)> {
    let window = input.window;
    if window.extended_sessions == 0 {
        return None;
    }
    Some((
        Insight::new(
            "Extended continuous sessions",
            format!(
                "{} sessions of {}+ minutes without breaks (longest {} minutes)",
                window.extended_sessions,
                config.extended_session_minutes,
                window.longest_session_minutes
            ),
        ),
        Insight::new(
            "Take 20-20-20 eye breaks",
            "Every 20 min, look 20 ft away for 20 seconds",
        ),
    ))
}

fn high_daily_screen_time(
    input: &RuleInput<'_>,
    config: &ScoringConfig,
) -> Option<(RiskFactor, Recommendation)> {
    let window = input.window;
    if window.avg_daily_minutes <= config.high_daily_minutes {
        return None;
    }
    Some((
        Insight::new(
            "High daily screen time",
            format!(
                "Average {:.1} hrs per day over the last {} days",
                window.avg_daily_minutes / 60.0,
                window.days
            ),
        ),
        Insight::new(
            "Set a daily screen time budget",
            format!(
                "Aim for under {:.0} hours of recreational screen time",
                config.high_daily_minutes / 60.0
            ),
        ),
    ))
}

fn phone_heavy_usage(
    input: &RuleInput<'_>,
    config: &ScoringConfig,
) -> Option<(RiskFactor, Recommendation)> {
    let window = input.window;
    if window.minutes == 0 {
        return None;
    }
    let phone = window
        .device_minutes
        .get(&DeviceType::Phone)
        .copied()
        .unwrap_or(0);
    let share = phone as f64 / window.minutes as f64;
    if share <= config.phone_share_limit {
        return None;
    }
    Some((
        Insight::new(
            "High phone usage ratio",
            format!(
                "{:.0}% of total screen time on phone ({} of {} minutes)",
                share * 100.0,
                phone,
                window.minutes
            ),
        ),
        Insight::new(
            "Use app timers for social media",
            "Set a 45-minute daily limit",
        ),
    ))
}

fn insufficient_breaks(
    input: &RuleInput<'_>,
    config: &ScoringConfig,
) -> Option<(RiskFactor, Recommendation)> {
    let window = input.window;
    let compliance = window.break_compliance?;
    if compliance >= config.min_break_compliance {
        return None;
    }
    Some((
        Insight::new(
            "Insufficient break intervals",
            format!(
                "Only {:.0}% of {} sessions stayed under {} minutes",
                compliance * 100.0,
                window.session_count,
                config.break_interval_minutes
            ),
        ),
        Insight::new(
            "Schedule regular breaks",
            format!(
                "Step away at least every {} minutes",
                config.break_interval_minutes
            ),
        ),
    ))
}

fn rising_screen_time(
    input: &RuleInput<'_>,
    _config: &ScoringConfig,
) -> Option<(RiskFactor, Recommendation)> {
    let window = input.window;
    if window.trend != UsageTrend::Rising {
        return None;
    }
    let change = (window.minutes as f64 - window.previous_minutes as f64)
        / window.previous_minutes as f64;
    Some((
        Insight::new(
            "Screen time trending up",
            format!(
                "{:.0}% more than the previous {} days ({} vs {} minutes)",
                change * 100.0,
                window.days,
                window.minutes,
                window.previous_minutes
            ),
        ),
        Insight::new(
            "Review your weekly usage",
            "Identify which sessions grew and set limits for them",
        ),
    ))
}

fn eye_strain_symptoms(
    input: &RuleInput<'_>,
    _config: &ScoringConfig,
) -> Option<(RiskFactor, Recommendation)> {
    if input.metrics.eye_strain_symptoms != Some(true) {
        return None;
    }
    Some((
        Insight::new("Eye strain symptoms reported", "Self-reported in your health metrics"),
        Insight::new(
            "Take 20-20-20 eye breaks",
            "Every 20 min, look 20 ft away for 20 seconds",
        ),
    ))
}

fn short_sleep(
    input: &RuleInput<'_>,
    config: &ScoringConfig,
) -> Option<(RiskFactor, Recommendation)> {
    let hours = input.metrics.sleep_hours_per_night?;
    if hours >= config.short_sleep_hours {
        return None;
    }
    Some((
        Insight::new(
            "Insufficient sleep",
            format!(
                "Averaging {:.1} hrs of sleep per night, below {:.1} hrs",
                hours, config.short_sleep_hours
            ),
        ),
        Insight::new(
            "Enable night mode after sunset",
            "Reduces eye strain and sleep disruption",
        ),
    ))
}

fn low_exercise(
    input: &RuleInput<'_>,
    config: &ScoringConfig,
) -> Option<(RiskFactor, Recommendation)> {
    let hours = input.metrics.exercise_hours_per_week?;
    if hours >= config.low_exercise_hours {
        return None;
    }
    Some((
        Insight::new(
            "Low physical activity",
            format!(
                "{:.1} hrs of exercise per week, below {:.1} hrs",
                hours, config.low_exercise_hours
            ),
        ),
        Insight::new(
            "Add movement breaks",
            "A short walk between sessions counts toward weekly activity",
        ),
    ))
}

fn bmi_out_of_range(
    input: &RuleInput<'_>,
    config: &ScoringConfig,
) -> Option<(RiskFactor, Recommendation)> {
    let bmi = input.metrics.bmi?;
    if (config.healthy_bmi_min..config.healthy_bmi_max).contains(&bmi) {
        return None;
    }
    Some((
        Insight::new(
            "BMI outside healthy range",
            format!(
                "BMI {:.1}, healthy range is {:.1} to {:.1}",
                bmi, config.healthy_bmi_min, config.healthy_bmi_max
            ),
        ),
        Insight::new(
            "Talk to a health professional",
            "Get guidance on nutrition and activity goals",
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn window() -> UsageWindow {
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

    fn run(window: &UsageWindow, metrics: &HealthMetrics) -> (Vec<RiskFactor>, Vec<Recommendation>) {
        evaluate_rules(&RuleInput { window, metrics }, &ScoringConfig::default())
    }

    #[test]
    fn test_no_rules_fire_gives_defaults() {
        let (factors, recommendations) = run(&window(), &HealthMetrics::default());
        assert!(factors.is_empty());
        assert_eq!(recommendations, default_recommendations());
        assert!(!recommendations.is_empty());
    }

    #[test]
    fn test_late_night_boundary() {
        let at_limit = UsageWindow {
            late_night_sessions: 3,
            ..window()
        };
        let (factors, _) = run(&at_limit, &HealthMetrics::default());
        assert!(factors.is_empty());

        let past_limit = UsageWindow {
            late_night_sessions: 4,
            late_night_days: 3,
            ..window()
        };
        let (factors, recommendations) = run(&past_limit, &HealthMetrics::default());
        assert_eq!(factors.len(), 1);
        assert_eq!(factors[0].text, "Late night usage detected");
        assert_eq!(
            factors[0].detail,
            "4 late-night sessions in the last 7 days, activity after 23:00 on 3 of 7 days"
        );
        assert_eq!(recommendations[0].text, "Limit screens after 9 PM");
    }

    #[test]
    fn test_all_applicable_rules_fire_in_order() {
        let mut devices = BTreeMap::new();
        devices.insert(DeviceType::Phone, 4000);
        devices.insert(DeviceType::Computer, 1000);
        let busy = UsageWindow {
            minutes: 5000,
            previous_minutes: 2000,
            avg_daily_minutes: 5000.0 / 7.0,
            device_minutes: devices,
            session_count: 10,
            late_night_sessions: 5,
            late_night_days: 4,
            extended_sessions: 2,
            longest_session_minutes: 240,
            break_compliance: Some(0.2),
            trend: UsageTrend::Rising,
            ..window()
        };
        let metrics = HealthMetrics {
            bmi: Some(17.0),
            sleep_hours_per_night: Some(5.0),
            eye_strain_symptoms: Some(true),
            exercise_hours_per_week: Some(1.0),
        };
        let (factors, recommendations) = run(&busy, &metrics);
        let texts: Vec<&str> = factors.iter().map(|f| f.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "Late night usage detected",
                "Extended continuous sessions",
                "High daily screen time",
                "High phone usage ratio",
                "Insufficient break intervals",
                "Screen time trending up",
                "Eye strain symptoms reported",
                "Insufficient sleep",
                "Low physical activity",
                "BMI outside healthy range",
            ]
        );
        // extended sessions and eye strain share a recommendation
        assert_eq!(recommendations.len(), 9);
        assert_eq!(factors[3].detail, "80% of total screen time on phone (4000 of 5000 minutes)");
        assert_eq!(factors[5].detail, "150% more than the previous 7 days (5000 vs 2000 minutes)");
    }

    #[test]
    fn test_recommendations_are_deduplicated() {
        let w = UsageWindow {
            extended_sessions: 1,
            longest_session_minutes: 200,
            ..window()
        };
        let metrics = HealthMetrics {
            eye_strain_symptoms: Some(true),
            ..HealthMetrics::default()
        };
        let (factors, recommendations) = run(&w, &metrics);
        assert_eq!(factors.len(), 2);
        assert_eq!(recommendations.len(), 1);
        assert_eq!(recommendations[0].text, "Take 20-20-20 eye breaks");
    }

    #[test]
    fn test_sleep_detail_reports_value() {
        let metrics = HealthMetrics {
            sleep_hours_per_night: Some(4.5),
            ..HealthMetrics::default()
        };
        let (factors, _) = run(&window(), &metrics);
        assert_eq!(
            factors[0].detail,
            "Averaging 4.5 hrs of sleep per night, below 6.0 hrs"
        );
    }

    #[test]
    fn test_rule_names_are_unique() {
        let mut names: Vec<&str> = RULES.iter().map(|r| r.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), RULES.len());
    }
}
