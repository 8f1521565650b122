//! A single named, durable, append-only topic with per-consumer-group
//! offsets and pending-message tracking.
//!
//! This is the in-memory reference implementation of the transport backend
//! contract: "any durable log with append, per-consumer-group offsets,
//! explicit ack, and pending-message listing suffices." Swapping in a real
//! broker means replacing this module behind the same [`crate::Transport`]
//! surface.

use a2a_types::Envelope;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// One durably-appended message plus its offset in the log.
#[derive(Debug, Clone)]
pub struct StoredMessage {
    pub offset: u64,
    pub envelope: Envelope,
}

struct PendingEntry {
    offset: u64,
    envelope: Envelope,
    consumer: String,
    delivery_count: u32,
}

#[derive(Default)]
struct GroupState {
    /// Position in the log not yet claimed by anyone in this group.
    cursor: usize,
    /// Offsets nack'd or timed out, preferred over fresh log entries so a
    /// redelivery doesn't starve behind new traffic.
    redeliver_queue: VecDeque<u64>,
    pending: HashMap<u64, PendingEntry>,
}

/// Outcome of [`Topic::claim`].
pub enum Claim {
    /// Nothing new to deliver right now.
    Empty,
    /// A message was claimed and should be handed to the handler.
    /// `delivery_count` is 1 on first delivery and >1 on redelivery.
    Delivered {
        offset: u64,
        envelope: Envelope,
        delivery_count: u32,
    },
    /// A redelivered message exceeded the redelivery ceiling. It has
    /// already been removed from the pending set; the caller is
    /// responsible for writing the DLQ record (topics don't know about
    /// their own `:dlq` sibling).
    ExceededRedeliveries {
        offset: u64,
        envelope: Envelope,
        delivery_count: u32,
    },
}

/// A named topic: an append-only log plus per-group cursors.
pub struct Topic {
    name: String,
    log: Mutex<Vec<StoredMessage>>,
    groups: Mutex<HashMap<String, GroupState>>,
    next_offset: Mutex<u64>,
}

impl Topic {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            log: Mutex::new(Vec::new()),
            groups: Mutex::new(HashMap::new()),
            next_offset: Mutex::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Durably append an envelope, returning its offset.
    pub fn append(&self, envelope: Envelope) -> u64 {
        let offset = {
            let mut next = self.next_offset.lock().unwrap();
            let offset = *next;
            *next += 1;
            offset
        };
        self.log.lock().unwrap().push(StoredMessage { offset, envelope });
        offset
    }

    pub fn len(&self) -> usize {
        self.log.lock().unwrap().len()
    }

    /// Creates the named consumer group if it does not already exist.
    /// Idempotent, per the contract.
    fn ensure_group<'a>(groups: &'a mut HashMap<String, GroupState>, group: &str) -> &'a mut GroupState {
        groups.entry(group.to_string()).or_default()
    }

    /// Claim the next message for `consumer` within `group`: a pending
    /// redelivery takes priority over a fresh log entry. Messages whose
    /// delivery count would exceed `max_redeliveries` are returned as
    /// [`Claim::ExceededRedeliveries`] instead of being delivered again.
    pub fn claim(&self, group: &str, consumer: &str, max_redeliveries: u32) -> Claim {
        let log = self.log.lock().unwrap();
        let mut groups = self.groups.lock().unwrap();
        let state = Self::ensure_group(&mut groups, group);

        if let Some(offset) = state.redeliver_queue.pop_front() {
            let Some(entry) = state.pending.get_mut(&offset) else {
                // Already resolved by the time it was due for redelivery.
                return Claim::Empty;
            };
            entry.delivery_count += 1;
            entry.consumer = consumer.to_string();
            if entry.delivery_count > max_redeliveries {
                let entry = state.pending.remove(&offset).expect("just matched above");
                return Claim::ExceededRedeliveries {
                    offset,
                    envelope: entry.envelope,
                    delivery_count: entry.delivery_count,
                };
            }
            return Claim::Delivered {
                offset,
                envelope: entry.envelope.clone(),
                delivery_count: entry.delivery_count,
            };
        }

        if state.cursor < log.len() {
            let stored = &log[state.cursor];
            state.cursor += 1;
            state.pending.insert(
                stored.offset,
                PendingEntry {
                    offset: stored.offset,
                    envelope: stored.envelope.clone(),
                    consumer: consumer.to_string(),
                    delivery_count: 1,
                },
            );
            return Claim::Delivered {
                offset: stored.offset,
                envelope: stored.envelope.clone(),
                delivery_count: 1,
            };
        }

        Claim::Empty
    }

    pub fn ack(&self, group: &str, offset: u64) -> bool {
        let mut groups = self.groups.lock().unwrap();
        let state = Self::ensure_group(&mut groups, group);
        state.pending.remove(&offset).is_some()
    }

    /// Returns the message for later redelivery without counting a DLQ
    /// rejection.
    pub fn nack(&self, group: &str, offset: u64) -> bool {
        let mut groups = self.groups.lock().unwrap();
        let state = Self::ensure_group(&mut groups, group);
        if state.pending.contains_key(&offset) {
            state.redeliver_queue.push_back(offset);
            true
        } else {
            false
        }
    }

    /// Removes the message from pending and returns it so the caller can
    /// write a DLQ record.
    pub fn reject(&self, group: &str, offset: u64) -> Option<(Envelope, String)> {
        let mut groups = self.groups.lock().unwrap();
        let state = Self::ensure_group(&mut groups, group);
        state.pending.remove(&offset).map(|e| (e.envelope, e.consumer))
    }

    /// Number of delivered-but-unresolved messages across all consumers in
    /// a group (for diagnostics; per-subscription backpressure tracks its
    /// own in-flight count independently).
    pub fn group_pending_count(&self, group: &str) -> usize {
        self.groups
            .lock()
            .unwrap()
            .get(group)
            .map(|g| g.pending.len())
            .unwrap_or(0)
    }
}
