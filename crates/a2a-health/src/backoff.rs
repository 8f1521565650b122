//! Jittered backoff for registry calls that fail with `E_REGISTRY_UNAVAILABLE`.
//!
//! Spec §4.3.4: registrations and heartbeats are retried by the caller with
//! jittered backoff. The sweeper and heartbeat publisher are that caller for
//! their own periodic calls, so a failed tick waits an extra randomized
//! delay (on top of its regular tick) before trying again, rather than
//! hammering an unreachable registry at the bare tick interval.

use rand::Rng;
use std::time::Duration;

/// Returns a random delay in `[0, base]`, capped at `max`. Called once per
/// consecutive failure; `base` typically doubles with the failure count by
/// the caller before reaching `max`.
pub fn jittered_delay(base: Duration, max: Duration) -> Duration {
    let capped_millis = base.min(max).as_millis().min(u128::from(u64::MAX)) as u64;
    if capped_millis == 0 {
        return Duration::ZERO;
    }
    let millis = rand::thread_rng().gen_range(0..=capped_millis);
    Duration::from_millis(millis)
}

/// Exponential-ish backoff base for the `n`th consecutive failure (0-indexed),
/// doubling from `floor` and capped at `ceiling`.
pub fn backoff_base(floor: Duration, ceiling: Duration, consecutive_failures: u32) -> Duration {
    let shift = consecutive_failures.min(16);
    floor.saturating_mul(1u32.checked_shl(shift).unwrap_or(u32::MAX)).min(ceiling)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jittered_delay_never_exceeds_cap() {
        for _ in 0..100 {
            let d = jittered_delay(Duration::from_millis(500), Duration::from_millis(200));
            assert!(d <= Duration::from_millis(200));
        }
    }

    #[test]
    fn backoff_base_grows_then_caps() {
        let floor = Duration::from_millis(100);
        let ceiling = Duration::from_secs(5);
        assert_eq!(backoff_base(floor, ceiling, 0), Duration::from_millis(100));
        assert_eq!(backoff_base(floor, ceiling, 1), Duration::from_millis(200));
        assert_eq!(backoff_base(floor, ceiling, 10), ceiling);
    }
}
