//! Screen Health - screen-time wellness engine
//!
//! Two pure computations feed a wellness dashboard:
//!
//! - **Score generator**: derives a bounded baseline risk score set from the
//!   caller's identity key.
//! - **Metrics aggregator**: reduces screen-time entries and self-reported
//!   health metrics to totals, sessions, risk factors, recommendations and
//!   the overrides applied to the baseline.
//!
//! The report pipeline runs normalization → session detection → feature
//! derivation → overrides → rules → dashboard encoding. Fetching from the
//! remote store is left to the caller, who passes a [`StoreSnapshot`].

pub mod config;
pub mod encoder;
pub mod error;
pub mod features;
pub mod normalizer;
pub mod overrides;
pub mod pipeline;
pub mod profile;
pub mod rules;
pub mod seed;
pub mod sessions;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use config::ScoringConfig;
pub use encoder::DashboardEncoder;
pub use error::ComputeError;
pub use pipeline::{aggregate, assess, dashboard_to_json, Aggregator, Assessor, DashboardProcessor};
pub use seed::{classify, score_from_identity, RiskDimension};
pub use types::{
    AggregateSummary, DashboardPayload, DeviceType, HealthMetrics, RiskLevel, RiskLevels,
    RiskScoreSet, ScreenTimeEntry, StoreSnapshot, WellnessReport,
};

/// Library version embedded in dashboard payloads
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for dashboard payloads
pub const PRODUCER_NAME: &str = "screen-health";
