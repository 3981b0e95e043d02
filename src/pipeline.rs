//! Pipeline orchestration
//!
//! Public entry points: the metrics aggregator, report assembly, and the
//! JSON-in/JSON-out dashboard call used by the FFI and the CLI.

use crate::config::ScoringConfig;
use crate::encoder::DashboardEncoder;
use crate::error::ComputeError;
use crate::features::UsageFeatureDeriver;
use crate::normalizer::Normalizer;
use crate::overrides::{apply_overrides, derive_overrides};
use crate::profile::{display_name, initials};
use crate::rules::{evaluate_rules, RuleInput};
use crate::seed::{classify, score_from_identity};
use crate::sessions::detect_sessions;
use crate::types::{
    AggregateSummary, HealthMetrics, ScreenTimeEntry, StoreSnapshot, WellnessReport,
};
use chrono::{DateTime, Utc};

/// Aggregate entries and metrics with the default configuration
///
/// Never fails: malformed input is discarded and counted in
/// [`AggregateSummary::discarded`].
pub fn aggregate(entries: &[ScreenTimeEntry], metrics: Option<&HealthMetrics>) -> AggregateSummary {
    Aggregator::default().aggregate(entries, metrics)
}

/// Metrics aggregator with an explicit configuration
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    config: ScoringConfig,
    reference: Option<DateTime<Utc>>,
}

impl Aggregator {
    pub fn new(config: ScoringConfig) -> Self {
        Self {
            config,
            reference: None,
        }
    }

    /// End the lookback window at `reference` instead of the latest entry
    pub fn with_reference_time(mut self, reference: DateTime<Utc>) -> Self {
        self.reference = Some(reference);
        self
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn aggregate(
        &self,
        entries: &[ScreenTimeEntry],
        metrics: Option<&HealthMetrics>,
    ) -> AggregateSummary {
        let config = &self.config;

        // Stage 1: drop malformed entries and metric fields
        let input = Normalizer::normalize(entries, metrics, config);

        // Stage 2: group into sessions
        let sessions = detect_sessions(&input.entries, config);

        // Stage 3: totals, buckets and window statistics
        let features = UsageFeatureDeriver::derive(&input.entries, &sessions, self.reference, config);

        // Stage 4: overrides for the baseline
        let overrides = derive_overrides(&input.metrics, &features.window, config);

        // Stage 5: risk factors and recommendations
        let (risk_factors, recommendations) = evaluate_rules(
            &RuleInput {
                window: &features.window,
                metrics: &input.metrics,
            },
            config,
        );

        if !input.discarded.is_empty() {
            tracing::debug!(
                entries = input.discarded.discarded_entries(),
                fields = input.discarded.rejected_metric_fields.len(),
                "ignored malformed input"
            );
        }

        AggregateSummary {
            accepted_entries: input.entries.len(),
            total_minutes: features.total_minutes,
            device_minutes: features.device_minutes,
            weekday_minutes: features.weekday_minutes,
            late_night_minutes: features.late_night_minutes,
            sessions,
            window: features.window,
            overrides,
            risk_factors,
            recommendations,
            discarded: input.discarded,
        }
    }

    /// Aggregate a store snapshot, counting entries that could not be read
    pub fn aggregate_snapshot(&self, snapshot: &StoreSnapshot) -> AggregateSummary {
        let mut summary = self.aggregate(&snapshot.screen_time, snapshot.health_metrics.as_ref());
        summary.discarded.unparseable = snapshot.unparseable_entries;
        summary
    }
}

/// Assemble a full report for one caller
pub fn assess(identity: &str, snapshot: &StoreSnapshot, config: &ScoringConfig) -> WellnessReport {
    Assessor::new(config.clone()).assess(identity, snapshot)
}

/// Report assembly: identity baseline, aggregate, overrides, classification
#[derive(Debug, Clone, Default)]
pub struct Assessor {
    aggregator: Aggregator,
}

impl Assessor {
    pub fn new(config: ScoringConfig) -> Self {
        Self {
            aggregator: Aggregator::new(config),
        }
    }

    pub fn with_reference_time(mut self, reference: DateTime<Utc>) -> Self {
        self.aggregator = self.aggregator.with_reference_time(reference);
        self
    }

    pub fn assess(&self, identity: &str, snapshot: &StoreSnapshot) -> WellnessReport {
        let config = self.aggregator.config();

        let baseline = score_from_identity(identity);
        let summary = self.aggregator.aggregate_snapshot(snapshot);
        let scores = apply_overrides(&baseline, &summary.overrides, config);
        let levels = classify(&scores, config);

        let cached_risk_score = snapshot.risk_score.and_then(|score| {
            let in_range = u8::try_from(score).ok().filter(|s| *s <= 100);
            if in_range.is_none() {
                tracing::debug!(score, "ignoring cached risk score out of range");
            }
            in_range
        });

        let profile = snapshot.profile.as_ref();

        WellnessReport {
            baseline,
            scores,
            levels,
            summary,
            cached_risk_score,
            display_name: display_name(profile, identity),
            initials: initials(profile),
        }
    }
}

/// Parse a store snapshot from JSON
pub fn parse_snapshot(json: &str) -> Result<StoreSnapshot, ComputeError> {
    serde_json::from_str(json)
        .map_err(|e| ComputeError::ParseError(e.to_string()))
}

/// Convert a store snapshot JSON to dashboard JSON (stateless, one-shot)
///
/// # Example
/// ```ignore
/// let dashboard_json = dashboard_to_json(snapshot_json, "2vxsx-fae")?;
/// ```
pub fn dashboard_to_json(snapshot_json: &str, identity: &str) -> Result<String, ComputeError> {
    DashboardProcessor::new().process(snapshot_json, identity)
}

/// Processor holding a configuration and encoder for repeated calls
pub struct DashboardProcessor {
    assessor: Assessor,
    encoder: DashboardEncoder,
}

impl Default for DashboardProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardProcessor {
    /// Create a processor with the default configuration
    pub fn new() -> Self {
        Self {
            assessor: Assessor::default(),
            encoder: DashboardEncoder::new(),
        }
    }

    /// Create a processor with a specific configuration
    pub fn with_config(config: ScoringConfig) -> Self {
        Self {
            assessor: Assessor::new(config),
            encoder: DashboardEncoder::new(),
        }
    }

    /// Replace the encoder, e.g. to pin the instance id
    pub fn with_encoder(mut self, encoder: DashboardEncoder) -> Self {
        self.encoder = encoder;
        self
    }

    /// Build the report for a parsed snapshot
    pub fn report(&self, snapshot: &StoreSnapshot, identity: &str) -> WellnessReport {
        self.assessor.assess(identity, snapshot)
    }

    /// Process a snapshot JSON and return dashboard JSON
    pub fn process(&self, snapshot_json: &str, identity: &str) -> Result<String, ComputeError> {
        let snapshot = parse_snapshot(snapshot_json)?;
        let report = self.report(&snapshot, identity);
        self.encoder.encode_to_json(&report)
    }
}
