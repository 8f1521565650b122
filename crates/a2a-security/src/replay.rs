//! Replay protection: §4.4.4. An envelope's `meta.ts` must fall within a
//! configurable freshness window around "now" — too far in the future
//! signals clock skew or forgery, too far in the past signals a replayed
//! message.

use crate::error::{SecurityError, SecurityResult};
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Freshness window. Defaults to 5 seconds of tolerated skew in either
/// direction, per §4.4.4.
#[derive(Debug, Clone, Copy)]
pub struct ReplayConfig {
    pub max_future_skew: Duration,
    pub max_past_age: Duration,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            max_future_skew: Duration::from_secs(5),
            max_past_age: Duration::from_secs(5),
        }
    }
}

impl ReplayConfig {
    pub fn with_max_future_skew(mut self, skew: Duration) -> Self {
        self.max_future_skew = skew;
        self
    }

    pub fn with_max_past_age(mut self, age: Duration) -> Self {
        self.max_past_age = age;
        self
    }
}

/// Check `ts` (an envelope's `meta.ts`) against `now` under `config`.
pub fn check_replay_protection(ts: DateTime<Utc>, now: DateTime<Utc>, config: &ReplayConfig) -> SecurityResult<()> {
    if ts > now {
        let ahead = (ts - now).to_std().unwrap_or_default();
        if ahead > config.max_future_skew {
            return Err(SecurityError::ReplayTimestampFuture(ts.to_rfc3339()));
        }
        return Ok(());
    }

    let age = (now - ts).to_std().unwrap_or_default();
    if age > config.max_past_age {
        return Err(SecurityError::ReplayTimestampStale(ts.to_rfc3339()));
    }
    Ok(())
}
