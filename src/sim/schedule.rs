//! Deferred work queue
//!
//! Staggered spawns are queued with a fire time on the simulation clock and
//! drained once per tick. Payloads are self-contained so they still fire after
//! the tool that queued them is switched away.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Scheduled<T> {
    at: f64,
    seq: u64,
    payload: T,
}

/// Time-ordered queue of pending payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scheduler<T> {
    pending: Vec<Scheduled<T>>,
    next_seq: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
            next_seq: 0,
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `payload` to fire at simulation time `at`
    pub fn schedule(&mut self, at: f64, payload: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        // Keep sorted by (time, insertion) so draining is a prefix split
        let idx = self
            .pending
            .partition_point(|s| s.at < at || (s.at == at && s.seq < seq));
        self.pending.insert(idx, Scheduled { at, seq, payload });
    }

    /// Remove and return every payload due at or before `now`, in fire order
    pub fn drain_due(&mut self, now: f64) -> Vec<T> {
        let due = self.pending.partition_point(|s| s.at <= now);
        self.pending.drain(..due).map(|s| s.payload).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_returns_due_in_order() {
        let mut s = Scheduler::new();
        s.schedule(0.3, "c");
        s.schedule(0.1, "a");
        s.schedule(0.2, "b");
        s.schedule(0.1, "a2");

        assert!(s.drain_due(0.05).is_empty());
        assert_eq!(s.drain_due(0.2), vec!["a", "a2", "b"]);
        assert_eq!(s.len(), 1);
        assert_eq!(s.drain_due(10.0), vec!["c"]);
        assert!(s.is_empty());
    }

    #[test]
    fn test_each_payload_fires_once() {
        let mut s = Scheduler::new();
        for i in 0..10u32 {
            s.schedule(i as f64 * 0.05, i);
        }
        let mut fired = Vec::new();
        let mut now = 0.0;
        while !s.is_empty() {
            fired.extend(s.drain_due(now));
            now += 1.0 / 60.0;
        }
        assert_eq!(fired, (0..10).collect::<Vec<_>>());
    }
}
