//! The scheduler owns the virtual clock and the pending event list.  Events
//! are ordered by time, and events at the same instant are ordered by the
//! sequence of their `schedule` calls, so replay is deterministic for a
//! fixed stream of random draws.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use tracing::trace;

use crate::utils::errors::SimulationError;

/// A pending action, stamped with its firing time and insertion sequence.
#[derive(Debug, Clone)]
pub struct ScheduledEvent<A> {
    pub time: f64,
    pub sequence: u64,
    pub action: A,
}

impl<A> PartialEq for ScheduledEvent<A> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<A> Eq for ScheduledEvent<A> {}

impl<A> PartialOrd for ScheduledEvent<A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<A> Ord for ScheduledEvent<A> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed, so the max-heap pops the earliest (then lowest sequence) event
        other
            .time
            .total_cmp(&self.time)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

#[derive(Debug, Clone)]
pub struct Scheduler<A> {
    clock: f64,
    next_sequence: u64,
    events: BinaryHeap<ScheduledEvent<A>>,
}

impl<A> Default for Scheduler<A> {
    fn default() -> Self {
        Self {
            clock: 0.0,
            next_sequence: 0,
            events: BinaryHeap::new(),
        }
    }
}

impl<A> Scheduler<A> {
    /// The current virtual time.
    pub fn now(&self) -> f64 {
        self.clock
    }

    pub fn pending(&self) -> usize {
        self.events.len()
    }

    /// Insert `action` at `now + delay`.  Negative (and NaN) delays are
    /// rejected before the event list is touched.
    pub fn schedule(&mut self, delay: f64, action: A) -> Result<(), SimulationError> {
        if !(delay >= 0.0) {
            return Err(SimulationError::NegativeDelay(delay));
        }
        let time = self.clock + delay;
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        trace!(now = self.clock, time, sequence, "event scheduled");
        self.events.push(ScheduledEvent {
            time,
            sequence,
            action,
        });
        Ok(())
    }

    /// Pop the earliest event due at or before `horizon`, advancing the
    /// clock to its time.  `None` means the caller should stop draining.
    pub fn next_until(&mut self, horizon: f64) -> Result<Option<A>, SimulationError> {
        match self.events.peek() {
            Some(event) if event.time <= horizon => {}
            _ => return Ok(None),
        }
        let event = match self.events.pop() {
            Some(event) => event,
            None => return Ok(None),
        };
        if event.time < self.clock {
            return Err(SimulationError::TimeReversal {
                from: self.clock,
                to: event.time,
            });
        }
        self.clock = event.time;
        Ok(Some(event.action))
    }

    /// Move the clock forward to `horizon` once no more events are due.
    pub fn advance_to(&mut self, horizon: f64) -> Result<(), SimulationError> {
        if horizon < self.clock {
            return Err(SimulationError::TimeReversal {
                from: self.clock,
                to: horizon,
            });
        }
        self.clock = horizon;
        Ok(())
    }

    /// Execute every event due at or before `horizon` with `execute`, then
    /// leave the clock at `horizon`.  The handler receives the scheduler so
    /// that it can schedule follow-up events.
    pub fn run_until<F>(&mut self, horizon: f64, mut execute: F) -> Result<(), SimulationError>
    where
        F: FnMut(&mut Self, A) -> Result<(), SimulationError>,
    {
        while let Some(action) = self.next_until(horizon)? {
            execute(self, action)?;
        }
        self.advance_to(horizon)
    }
}
