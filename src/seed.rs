//! Identity-seeded score generator
//!
//! Derives a baseline [`RiskScoreSet`] from the caller's identity key. The
//! digest is a plain checksum of character codes; it only seeds the baseline
//! and must keep its exact arithmetic so scores stay stable across versions.

use crate::config::ScoringConfig;
use crate::types::{RiskLevel, RiskLevels, RiskScoreSet};

/// Floor and modulus for each dimension
const BURNOUT_FLOOR: u64 = 45;
const BURNOUT_RANGE: u64 = 40;
const EYE_STRAIN_FLOOR: u64 = 50;
const EYE_STRAIN_RANGE: u64 = 35;
const SLEEP_DISRUPTION_FLOOR: u64 = 30;
const SLEEP_DISRUPTION_RANGE: u64 = 45;
const HEALTH_PENALTY_FLOOR: u64 = 40;
const HEALTH_PENALTY_RANGE: u64 = 30;

/// Sum of the UTF-16 code units of `key`
///
/// For the ASCII principals the identity provider hands out this is the sum of
/// code points.
pub fn identity_checksum(key: &str) -> u64 {
    key.encode_utf16()
        .fold(0u64, |acc, unit| acc.wrapping_add(u64::from(unit)))
}

/// Baseline scores for an identity key. Total and deterministic.
pub fn score_from_identity(key: &str) -> RiskScoreSet {
    let h = identity_checksum(key);

    RiskScoreSet {
        burnout: bounded(BURNOUT_FLOOR + h % BURNOUT_RANGE),
        eye_strain: bounded(EYE_STRAIN_FLOOR + h % EYE_STRAIN_RANGE),
        sleep_disruption: bounded(SLEEP_DISRUPTION_FLOOR + h % SLEEP_DISRUPTION_RANGE),
        health_score: bounded(100u64.saturating_sub(HEALTH_PENALTY_FLOOR + h % HEALTH_PENALTY_RANGE)),
    }
}

fn bounded(value: u64) -> u8 {
    value.min(100) as u8
}

/// Classify every dimension of a score set against the configured thresholds
pub fn classify(scores: &RiskScoreSet, config: &ScoringConfig) -> RiskLevels {
    RiskLevels {
        burnout: above(scores.burnout, config.burnout_threshold),
        eye_strain: above(scores.eye_strain, config.eye_strain_threshold),
        sleep_disruption: above(scores.sleep_disruption, config.sleep_disruption_threshold),
        health_score: if scores.health_score < config.health_score_threshold {
            RiskLevel::Elevated
        } else {
            RiskLevel::Normal
        },
    }
}

fn above(value: u8, threshold: u8) -> RiskLevel {
    if value > threshold {
        RiskLevel::Elevated
    } else {
        RiskLevel::Normal
    }
}

/// One of the four displayed risk dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RiskDimension {
    Burnout,
    EyeStrain,
    SleepDisruption,
    HealthScore,
}

impl RiskDimension {
    pub const ALL: [RiskDimension; 4] = [
        RiskDimension::Burnout,
        RiskDimension::EyeStrain,
        RiskDimension::SleepDisruption,
        RiskDimension::HealthScore,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            RiskDimension::Burnout => "burnout",
            RiskDimension::EyeStrain => "eye_strain",
            RiskDimension::SleepDisruption => "sleep_disruption",
            RiskDimension::HealthScore => "health_score",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            RiskDimension::Burnout => "Burnout Risk",
            RiskDimension::EyeStrain => "Eye Strain Risk",
            RiskDimension::SleepDisruption => "Sleep Disruption",
            RiskDimension::HealthScore => "Overall Health Score",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            RiskDimension::Burnout => "Based on usage patterns and session duration",
            RiskDimension::EyeStrain => "Continuous screen exposure without breaks",
            RiskDimension::SleepDisruption => "Late-night device usage impact on sleep",
            RiskDimension::HealthScore => "Composite digital wellness indicator",
        }
    }

    /// Label shown next to the value
    pub fn label(&self, level: RiskLevel) -> &'static str {
        match (self, level) {
            (RiskDimension::Burnout, RiskLevel::Elevated) => "Elevated",
            (RiskDimension::Burnout, RiskLevel::Normal) => "Moderate",
            (RiskDimension::EyeStrain, RiskLevel::Elevated) => "High",
            (RiskDimension::EyeStrain, RiskLevel::Normal) => "Moderate",
            (RiskDimension::SleepDisruption, RiskLevel::Elevated) => "Elevated",
            (RiskDimension::SleepDisruption, RiskLevel::Normal) => "Low",
            (RiskDimension::HealthScore, RiskLevel::Elevated) => "Needs Work",
            (RiskDimension::HealthScore, RiskLevel::Normal) => "Good",
        }
    }

    pub fn score(&self, scores: &RiskScoreSet) -> u8 {
        match self {
            RiskDimension::Burnout => scores.burnout,
            RiskDimension::EyeStrain => scores.eye_strain,
            RiskDimension::SleepDisruption => scores.sleep_disruption,
            RiskDimension::HealthScore => scores.health_score,
        }
    }

    pub fn level(&self, levels: &RiskLevels) -> RiskLevel {
        match self {
            RiskDimension::Burnout => levels.burnout,
            RiskDimension::EyeStrain => levels.eye_strain,
            RiskDimension::SleepDisruption => levels.sleep_disruption,
            RiskDimension::HealthScore => levels.health_score,
        }
    }
}
