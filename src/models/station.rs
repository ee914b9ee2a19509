use std::collections::VecDeque;

use tracing::trace;

use super::accumulator::StationAccumulator;
use super::entity::EntityId;
use crate::input_modeling::ContinuousRandomVariable;
use crate::utils::errors::SimulationError;
use crate::utils::validate_rate;

/// Stations are addressed by their position in the network configuration.
pub type StationId = usize;

/// One unit of a station's capacity, held by a single entity process.  The
/// grant is consumed by `Station::release`, so it cannot be released twice
/// or used after release.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a grant must be released back to its station"]
pub struct Grant {
    station: StationId,
}

impl Grant {
    pub fn station(&self) -> StationId {
        self.station
    }
}

/// The outcome of a capacity request.
#[derive(Debug, PartialEq, Eq)]
pub enum Acquisition {
    Granted(Grant),
    Queued,
}

/// A freed server handed directly to the head of the wait line.
#[derive(Debug, PartialEq, Eq)]
pub struct Handoff {
    pub entity: EntityId,
    pub grant: Grant,
}

/// The station is a bounded-capacity service point: a pool of identical
/// servers with a FIFO wait line.  Every change to the wait line or the
/// occupied server count is preceded by a synchronization of the station
/// accumulator, so the time integrals always reflect the counts that were
/// actually in effect.
#[derive(Debug, Clone)]
pub struct Station {
    id: StationId,
    name: String,
    servers: usize,
    service_rate: f64,
    service_time: ContinuousRandomVariable,
    occupied: usize,
    wait_line: VecDeque<EntityId>,
    accumulator: StationAccumulator,
}

impl Station {
    pub fn new(
        id: StationId,
        name: String,
        service_rate: f64,
        servers: usize,
    ) -> Result<Self, SimulationError> {
        let lambda = validate_rate(&name, service_rate)?;
        if servers == 0 {
            return Err(SimulationError::InvalidServerCount { station: name });
        }
        Ok(Self {
            id,
            name,
            servers,
            service_rate: lambda,
            service_time: ContinuousRandomVariable::Exp { lambda },
            occupied: 0,
            wait_line: VecDeque::new(),
            accumulator: StationAccumulator::new(0.0),
        })
    }

    pub fn id(&self) -> StationId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn servers(&self) -> usize {
        self.servers
    }

    pub fn service_rate(&self) -> f64 {
        self.service_rate
    }

    pub fn service_time(&self) -> &ContinuousRandomVariable {
        &self.service_time
    }

    pub fn occupied(&self) -> usize {
        self.occupied
    }

    pub fn wait_line_length(&self) -> usize {
        self.wait_line.len()
    }

    pub fn accumulator(&self) -> &StationAccumulator {
        &self.accumulator
    }

    fn synchronize(&mut self, now: f64) -> Result<(), SimulationError> {
        self.accumulator
            .synchronize(now, self.wait_line.len(), self.occupied)
    }

    /// Request one server for `entity`.  A free server is granted at once;
    /// otherwise the entity joins the back of the wait line.
    pub fn acquire(&mut self, entity: EntityId, now: f64) -> Result<Acquisition, SimulationError> {
        self.synchronize(now)?;
        if self.occupied < self.servers {
            self.occupied += 1;
            trace!(station = %self.name, entity, occupied = self.occupied, "server granted");
            Ok(Acquisition::Granted(Grant { station: self.id }))
        } else {
            self.wait_line.push_back(entity);
            trace!(station = %self.name, entity, queued = self.wait_line.len(), "entity queued");
            Ok(Acquisition::Queued)
        }
    }

    /// Return a server after a completed service.  When entities are
    /// waiting, the server passes straight to the head of the wait line.
    pub fn release(&mut self, grant: Grant, now: f64) -> Result<Option<Handoff>, SimulationError> {
        if grant.station != self.id || self.occupied == 0 {
            return Err(SimulationError::ReleaseWithoutAcquire(self.name.clone()));
        }
        self.synchronize(now)?;
        self.occupied -= 1;
        self.accumulator.record_completion();
        match self.wait_line.pop_front() {
            Some(entity) => {
                self.synchronize(now)?;
                self.occupied += 1;
                trace!(station = %self.name, entity, "server handed off");
                Ok(Some(Handoff {
                    entity,
                    grant: Grant { station: self.id },
                }))
            }
            None => {
                trace!(station = %self.name, occupied = self.occupied, "server released");
                Ok(None)
            }
        }
    }

    /// Restart the time integrals at the end of the warm-up period.
    pub fn restart_statistics(&mut self, now: f64) -> Result<(), SimulationError> {
        self.accumulator
            .restart(now, self.wait_line.len(), self.occupied)
    }

    /// Integrate the final interval up to the horizon.
    pub fn finalize(&mut self, horizon: f64) -> Result<(), SimulationError> {
        self.synchronize(horizon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station(servers: usize) -> Station {
        Station::new(0, String::from("doctor"), 1.0, servers).unwrap()
    }

    #[test]
    fn invalid_configuration_is_rejected() {
        assert!(matches!(
            Station::new(0, String::from("lab"), 0.0, 1),
            Err(SimulationError::InvalidRate { .. })
        ));
        assert!(matches!(
            Station::new(0, String::from("lab"), 1.0, 0),
            Err(SimulationError::InvalidServerCount { .. })
        ));
    }

    #[test]
    fn capacity_is_granted_until_exhausted() -> Result<(), SimulationError> {
        let mut station = station(2);
        assert!(matches!(station.acquire(0, 0.0)?, Acquisition::Granted(_)));
        assert!(matches!(station.acquire(1, 0.0)?, Acquisition::Granted(_)));
        assert_eq!(station.acquire(2, 0.0)?, Acquisition::Queued);
        assert_eq!(station.occupied(), 2);
        assert_eq!(station.wait_line_length(), 1);
        Ok(())
    }

    #[test]
    fn released_capacity_goes_to_the_head_of_the_wait_line() -> Result<(), SimulationError> {
        let mut station = station(1);
        let grant = match station.acquire(10, 0.0)? {
            Acquisition::Granted(grant) => grant,
            Acquisition::Queued => panic!("first request must be granted"),
        };
        assert_eq!(station.acquire(11, 1.0)?, Acquisition::Queued);
        assert_eq!(station.acquire(12, 2.0)?, Acquisition::Queued);

        let handoff = station.release(grant, 3.0)?.expect("wait line is not empty");
        assert_eq!(handoff.entity, 11);
        assert_eq!(station.occupied(), 1);
        assert_eq!(station.wait_line_length(), 1);

        let handoff = station.release(handoff.grant, 4.0)?.expect("wait line is not empty");
        assert_eq!(handoff.entity, 12);
        assert_eq!(station.release(handoff.grant, 5.0)?, None);
        assert_eq!(station.occupied(), 0);
        assert_eq!(station.accumulator().completed_count(), 3);

        // busy over [0, 5], one waiting over [1, 2] and [3, 4], two over [2, 3]
        assert!((station.accumulator().busy_area() - 5.0).abs() < 1.0e-12);
        assert!((station.accumulator().queue_area() - 4.0).abs() < 1.0e-12);
        Ok(())
    }

    #[test]
    fn foreign_grant_is_a_contract_violation() -> Result<(), SimulationError> {
        let mut first = station(1);
        let mut second = Station::new(1, String::from("lab"), 1.0, 1)?;
        let grant = match first.acquire(0, 0.0)? {
            Acquisition::Granted(grant) => grant,
            Acquisition::Queued => panic!("first request must be granted"),
        };
        assert!(matches!(
            second.release(grant, 1.0),
            Err(SimulationError::ReleaseWithoutAcquire(_))
        ));
        Ok(())
    }

    #[test]
    fn finalize_integrates_the_tail_interval() -> Result<(), SimulationError> {
        let mut station = station(1);
        let _grant = station.acquire(0, 2.0)?;
        station.finalize(10.0)?;
        assert_eq!(station.accumulator().last_event_time(), 10.0);
        assert!((station.accumulator().busy_area() - 8.0).abs() < 1.0e-12);
        Ok(())
    }
}
