//! Usage session detection
//!
//! Groups timestamp-ordered entries into sessions: a new session starts
//! whenever the gap to the previous entry reaches the configured threshold.

use crate::config::ScoringConfig;
use crate::normalizer::ValidEntry;
use crate::types::UsageSession;
use chrono::{Duration, Timelike};

/// Group sorted entries into sessions
pub fn detect_sessions(entries: &[ValidEntry], config: &ScoringConfig) -> Vec<UsageSession> {
    let Some(first) = entries.first() else {
        return Vec::new();
    };

    let gap = Duration::minutes(config.session_gap_minutes);
    let is_late = |entry: &ValidEntry| config.is_late_night_hour(config.to_local(entry.recorded_at).hour());

    let mut sessions = Vec::new();
    let mut current = open_session(first, is_late(first));

    for pair in entries.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        if next.recorded_at - prev.recorded_at < gap {
            current.end = next.recorded_at;
            current.minutes += next.minutes;
            current.entry_count += 1;
            current.late_night |= is_late(next);
        } else {
            sessions.push(current);
            current = open_session(next, is_late(next));
        }
    }
    sessions.push(current);

    sessions
}

fn open_session(entry: &ValidEntry, late_night: bool) -> UsageSession {
    UsageSession {
        start: entry.recorded_at,
        end: entry.recorded_at,
        minutes: entry.minutes,
        entry_count: 1,
        late_night,
    }
}
