//! Sliding-door debounce filter.
//!
//! A raw door edge becomes visible to the state machine only after
//! `delay_secs` have passed since the most recent edge.  The filter keeps
//! the latest raw value and one deadline; it never queues transitions.
//!
//! ```text
//!   raw   ──┐   ┌────────────────────────────
//!           └───┘
//!   armed   ▲   ▲ (re-armed)
//!           │   │<──── delay ────>│
//!   settled ─────────────────────────────────  (unchanged: raw ended where it began)
//! ```

use crate::clock::Timestamp;

/// Delayed-propagation filter for the sliding-door contact.
#[derive(Debug, Clone)]
pub struct DoorDebounce {
    delay_secs: Timestamp,
    last_raw: bool,
    settled_open: bool,
    /// Time at which the pending edge is applied.
    pending_until: Option<Timestamp>,
}

impl DoorDebounce {
    /// Seed the filter with the door state observed at start-up.
    /// The initial state is considered settled.
    pub fn new(initial_open: bool, delay_secs: u32) -> Self {
        Self {
            delay_secs: Timestamp::from(delay_secs),
            last_raw: initial_open,
            settled_open: initial_open,
            pending_until: None,
        }
    }

    /// Feed one raw sample and return the settled state.
    pub fn update(&mut self, raw_open: bool, now: Timestamp) -> bool {
        if raw_open != self.last_raw {
            self.last_raw = raw_open;
            self.pending_until = Some(now + self.delay_secs);
        }

        if let Some(deadline) = self.pending_until {
            // Clock set backwards: a deadline more than one delay away can
            // only come from the old time base.
            let deadline = if deadline - now > self.delay_secs {
                let rearmed = now + self.delay_secs;
                self.pending_until = Some(rearmed);
                rearmed
            } else {
                deadline
            };

            if now >= deadline {
                self.settled_open = self.last_raw;
                self.pending_until = None;
            }
        }

        self.settled_open
    }

    /// Settled door state as of the last update.
    pub fn settled_open(&self) -> bool {
        self.settled_open
    }

    /// True while an edge is waiting for its delay to expire.
    pub fn is_pending(&self) -> bool {
        self.pending_until.is_some()
    }

    /// Deadline of the pending edge, if any.
    pub fn pending_until(&self) -> Option<Timestamp> {
        self.pending_until
    }

    /// Change the delay.  A longer delay leaves a pending deadline alone;
    /// a shorter one re-arms it to `now + delay` on the next update when
    /// the deadline lies further away than that.
    pub fn set_delay(&mut self, delay_secs: u32) {
        self.delay_secs = Timestamp::from(delay_secs);
    }
}
