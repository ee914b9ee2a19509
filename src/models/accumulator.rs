use serde::{Deserialize, Serialize};

use crate::utils::errors::SimulationError;
use crate::utils::time_average;

/// Running time integrals of a station's occupancy.  The integrals are
/// synchronized immediately before every change to the wait line length or
/// the occupied server count, using the counts that held since the previous
/// synchronization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationAccumulator {
    origin: f64,
    last_event_time: f64,
    queue_area: f64,
    busy_area: f64,
    system_area: f64,
    completed_count: usize,
}

impl StationAccumulator {
    pub fn new(origin: f64) -> Self {
        Self {
            origin,
            last_event_time: origin,
            ..Self::default()
        }
    }

    /// Integrate the given counts over `[last_event_time, now]`.
    pub fn synchronize(
        &mut self,
        now: f64,
        wait_line_length: usize,
        occupied_count: usize,
    ) -> Result<(), SimulationError> {
        let elapsed = now - self.last_event_time;
        if elapsed < 0.0 {
            return Err(SimulationError::TimeReversal {
                from: self.last_event_time,
                to: now,
            });
        }
        let queued = wait_line_length as f64;
        let busy = occupied_count as f64;
        self.queue_area += queued * elapsed;
        self.busy_area += busy * elapsed;
        self.system_area += (queued + busy) * elapsed;
        self.last_event_time = now;
        Ok(())
    }

    /// Drop the integrals collected so far and restart them at `now`, after
    /// a final synchronization.  Used at the end of the warm-up period.
    pub fn restart(
        &mut self,
        now: f64,
        wait_line_length: usize,
        occupied_count: usize,
    ) -> Result<(), SimulationError> {
        self.synchronize(now, wait_line_length, occupied_count)?;
        self.origin = now;
        self.queue_area = 0.0;
        self.busy_area = 0.0;
        self.system_area = 0.0;
        Ok(())
    }

    pub fn record_completion(&mut self) {
        self.completed_count += 1;
    }

    pub fn origin(&self) -> f64 {
        self.origin
    }

    pub fn last_event_time(&self) -> f64 {
        self.last_event_time
    }

    pub fn queue_area(&self) -> f64 {
        self.queue_area
    }

    pub fn busy_area(&self) -> f64 {
        self.busy_area
    }

    pub fn system_area(&self) -> f64 {
        self.system_area
    }

    pub fn completed_count(&self) -> usize {
        self.completed_count
    }

    /// Time integrated since the origin.
    pub fn observed_duration(&self) -> f64 {
        self.last_event_time - self.origin
    }

    pub fn avg_queue_length(&self, duration: f64) -> f64 {
        time_average(self.queue_area, duration)
    }

    pub fn avg_in_service(&self, duration: f64) -> f64 {
        time_average(self.busy_area, duration)
    }

    pub fn avg_in_system(&self, duration: f64) -> f64 {
        time_average(self.system_area, duration)
    }

    pub fn utilization(&self, servers: usize, duration: f64) -> f64 {
        time_average(self.busy_area, servers as f64 * duration)
    }
}
