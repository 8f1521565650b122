//! Subscription-side backpressure: pause claiming at `maxPending`, resume at
//! a low-water mark, so slow consumers never propagate pressure back onto
//! publishers.
//!
//! Modeled on the bus's buffer/lag-policy split: configuration is a small
//! plain struct, and the runtime state is a [`tokio::sync::Notify`] loop
//! rather than a semaphore, because semaphores wake on every single permit
//! release and give no way to express "wait until we're back under the
//! low-water mark" hysteresis.

use std::sync::Mutex;
use tokio::sync::Notify;

/// Per-subscription backpressure tunables.
#[derive(Debug, Clone, Copy)]
pub struct BackpressureConfig {
    /// Stop claiming new messages once this many are delivered-but-unacked.
    pub max_pending: usize,
    /// Resume claiming once the in-flight count drops to this many or fewer.
    pub low_water_mark: usize,
}

impl BackpressureConfig {
    /// `low_water_mark` defaults to `max_pending / 2`, per the contract.
    pub fn new(max_pending: usize) -> Self {
        Self {
            max_pending: max_pending.max(1),
            low_water_mark: (max_pending / 2).max(1).min(max_pending.max(1)),
        }
    }

    pub fn with_low_water_mark(mut self, low_water_mark: usize) -> Self {
        self.low_water_mark = low_water_mark;
        self
    }
}

impl Default for BackpressureConfig {
    fn default() -> Self {
        Self::new(64)
    }
}

struct State {
    in_flight: usize,
    paused: bool,
}

/// Tracks one subscription's in-flight (delivered, not yet resolved) count
/// and gates the fetch loop accordingly.
pub struct PendingGate {
    config: BackpressureConfig,
    state: Mutex<State>,
    notify: Notify,
}

impl PendingGate {
    pub fn new(config: BackpressureConfig) -> Self {
        Self {
            config,
            state: Mutex::new(State {
                in_flight: 0,
                paused: false,
            }),
            notify: Notify::new(),
        }
    }

    /// Blocks the fetch loop until it is allowed to claim another message.
    /// Applies hysteresis: once paused at `max_pending`, stays paused until
    /// `in_flight` drops to `low_water_mark` or below, not merely below
    /// `max_pending`.
    pub async fn wait_for_capacity(&self) {
        loop {
            let should_wait = {
                let mut state = self.state.lock().unwrap();
                if state.paused {
                    if state.in_flight <= self.config.low_water_mark {
                        state.paused = false;
                        false
                    } else {
                        true
                    }
                } else if state.in_flight >= self.config.max_pending {
                    state.paused = true;
                    true
                } else {
                    false
                }
            };
            if !should_wait {
                return;
            }
            self.notify.notified().await;
        }
    }

    /// Record that a message was claimed and dispatched to a handler.
    pub fn mark_claimed(&self) {
        self.state.lock().unwrap().in_flight += 1;
    }

    /// Record that a claimed message reached a terminal state
    /// (ack/nack/reject), freeing one slot.
    pub fn mark_resolved(&self) {
        {
            let mut state = self.state.lock().unwrap();
            state.in_flight = state.in_flight.saturating_sub(1);
        }
        self.notify.notify_waiters();
    }

    pub fn in_flight(&self) -> usize {
        self.state.lock().unwrap().in_flight
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn low_water_mark_defaults_to_half() {
        let config = BackpressureConfig::new(64);
        assert_eq!(config.low_water_mark, 32);
    }

    #[tokio::test]
    async fn capacity_available_when_under_max() {
        let gate = PendingGate::new(BackpressureConfig::new(4));
        gate.mark_claimed();
        tokio::time::timeout(Duration::from_millis(50), gate.wait_for_capacity())
            .await
            .expect("should not block below max_pending");
    }

    #[tokio::test]
    async fn pauses_at_max_and_resumes_at_low_water_mark() {
        let gate = Arc::new(PendingGate::new(BackpressureConfig::new(4)));
        for _ in 0..4 {
            gate.mark_claimed();
        }

        let waiter = {
            let gate = gate.clone();
            tokio::spawn(async move {
                gate.wait_for_capacity().await;
            })
        };

        // Resolving just one (in_flight=3) must NOT be enough to resume
        // (low_water_mark is 2) — hysteresis keeps the gate paused.
        gate.mark_resolved();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        gate.mark_resolved();
        tokio::time::timeout(Duration::from_millis(200), waiter)
            .await
            .expect("waiter should resume once at/under low_water_mark")
            .unwrap();
    }
}
