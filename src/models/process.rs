use std::mem;

use super::entity::{Entity, EntityId};
use super::router::{RouteCursor, Router};
use super::station::{Acquisition, Grant, Handoff, Station, StationId};
use crate::input_modeling::UniformRNG;
use crate::simulator::scheduler::Scheduler;
use crate::utils::errors::SimulationError;

/// Scheduled resumptions.  A process suspends in exactly two places: in a
/// station's wait line (resumed by `Granted`) and during service (resumed by
/// `ServiceComplete`).  `Arrival` drives the arrival source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Arrival,
    Granted { entity: EntityId },
    ServiceComplete { entity: EntityId },
}

/// Where the process currently is along its route.
#[derive(Debug)]
pub enum Phase {
    Arriving,
    Queued { station: StationId },
    /// A server was handed over from the wait line, service starts when the
    /// `Granted` event fires.
    Resuming { grant: Grant },
    InService { grant: Grant },
    Routing,
    Done,
}

/// Where the process goes after a completed service.
#[derive(Debug, PartialEq, Eq)]
pub enum Departure {
    Next(StationId),
    Exit,
}

/// The entity process is an explicit state machine for one flow unit.  It
/// owns the entity ledger until the entity leaves the network.
#[derive(Debug)]
pub struct EntityProcess {
    entity: Entity,
    cursor: RouteCursor,
    phase: Phase,
}

impl EntityProcess {
    pub fn new(entity: Entity, cursor: RouteCursor) -> Self {
        Self {
            entity,
            cursor,
            phase: Phase::Arriving,
        }
    }

    pub fn id(&self) -> EntityId {
        self.entity.id()
    }

    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// The station the process is waiting at or being served by.
    pub fn current_station(&self) -> Option<StationId> {
        match &self.phase {
            Phase::Queued { station } => Some(*station),
            Phase::Resuming { grant } | Phase::InService { grant } => Some(grant.station()),
            Phase::Arriving | Phase::Routing | Phase::Done => None,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self.phase, Phase::Done)
    }

    /// Hand the entity ledger over once the process is no longer running.
    pub fn into_entity(self) -> Entity {
        self.entity
    }

    fn invalid_state(&self) -> SimulationError {
        SimulationError::InvalidProcessState(self.entity.id())
    }

    /// Join `station`: record the arrival and request a server.  A free
    /// server starts service immediately; otherwise the process waits.
    pub fn arrive(
        &mut self,
        station: &mut Station,
        scheduler: &mut Scheduler<Event>,
        uniform_rng: &mut UniformRNG,
    ) -> Result<(), SimulationError> {
        match self.phase {
            Phase::Arriving | Phase::Routing => {}
            _ => return Err(self.invalid_state()),
        }
        let now = scheduler.now();
        self.entity.record_arrival(station.id(), now);
        match station.acquire(self.entity.id(), now)? {
            Acquisition::Granted(grant) => self.begin_service(grant, station, scheduler, uniform_rng),
            Acquisition::Queued => {
                self.phase = Phase::Queued {
                    station: station.id(),
                };
                Ok(())
            }
        }
    }

    /// Accept a server handed over by a departing entity.  Service begins
    /// with the `Granted` resumption scheduled here.
    pub fn accept_handoff(
        &mut self,
        grant: Grant,
        scheduler: &mut Scheduler<Event>,
    ) -> Result<(), SimulationError> {
        match self.phase {
            Phase::Queued { station } if station == grant.station() => {}
            _ => return Err(self.invalid_state()),
        }
        self.phase = Phase::Resuming { grant };
        scheduler.schedule(
            0.0,
            Event::Granted {
                entity: self.entity.id(),
            },
        )
    }

    /// The `Granted` resumption: start service on the handed-over server.
    pub fn resume(
        &mut self,
        station: &mut Station,
        scheduler: &mut Scheduler<Event>,
        uniform_rng: &mut UniformRNG,
    ) -> Result<(), SimulationError> {
        match mem::replace(&mut self.phase, Phase::Routing) {
            Phase::Resuming { grant } if grant.station() == station.id() => {
                self.begin_service(grant, station, scheduler, uniform_rng)
            }
            other => {
                self.phase = other;
                Err(self.invalid_state())
            }
        }
    }

    fn begin_service(
        &mut self,
        grant: Grant,
        station: &Station,
        scheduler: &mut Scheduler<Event>,
        uniform_rng: &mut UniformRNG,
    ) -> Result<(), SimulationError> {
        self.entity.record_service_start(scheduler.now());
        let duration = station.service_time().random_variate(uniform_rng)?;
        self.phase = Phase::InService { grant };
        scheduler.schedule(
            duration,
            Event::ServiceComplete {
                entity: self.entity.id(),
            },
        )
    }

    /// The `ServiceComplete` resumption: record the service end and give the
    /// server back.  The returned hand-off, if any, belongs to the entity at
    /// the head of the station's wait line.
    pub fn complete_service(
        &mut self,
        station: &mut Station,
        now: f64,
    ) -> Result<Option<Handoff>, SimulationError> {
        match mem::replace(&mut self.phase, Phase::Routing) {
            Phase::InService { grant } if grant.station() == station.id() => {
                self.entity.record_service_end(now);
                station.release(grant, now)
            }
            other => {
                self.phase = other;
                Err(self.invalid_state())
            }
        }
    }

    /// Consult the router for the next station.  Leaving the network
    /// records the exit time and finishes the process.
    pub fn route(
        &mut self,
        router: &Router,
        uniform_rng: &mut UniformRNG,
        now: f64,
    ) -> Result<Departure, SimulationError> {
        if !matches!(self.phase, Phase::Routing) {
            return Err(self.invalid_state());
        }
        match router.next_station(&mut self.cursor, uniform_rng)? {
            Some(station) => Ok(Departure::Next(station)),
            None => {
                self.entity.record_exit(now);
                self.phase = Phase::Done;
                Ok(Departure::Exit)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::router::RouteStep;

    struct Fixture {
        stations: Vec<Station>,
        router: Router,
        scheduler: Scheduler<Event>,
        uniform_rng: UniformRNG,
    }

    fn fixture() -> Fixture {
        Fixture {
            stations: vec![
                Station::new(0, String::from("registration"), 2.0, 1).unwrap(),
                Station::new(1, String::from("doctor"), 2.0, 1).unwrap(),
            ],
            router: Router::new(vec![RouteStep::Visit(0), RouteStep::Visit(1)], 0.0).unwrap(),
            scheduler: Scheduler::default(),
            uniform_rng: UniformRNG::seeded(5),
        }
    }

    fn process(router: &Router, id: EntityId, now: f64) -> (StationId, EntityProcess) {
        let (entry, cursor) = router.start().unwrap();
        (entry, EntityProcess::new(Entity::new(id, now), cursor))
    }

    #[test]
    fn process_walks_the_route_and_exits() -> Result<(), SimulationError> {
        let mut f = fixture();
        let (entry, mut process) = process(&f.router, 0, 0.0);
        process.arrive(&mut f.stations[entry], &mut f.scheduler, &mut f.uniform_rng)?;
        assert!(matches!(process.phase(), Phase::InService { .. }));

        let mut next = Some(entry);
        while let Some(station) = next {
            let event = f.scheduler.next_until(f64::INFINITY)?;
            assert_eq!(event, Some(Event::ServiceComplete { entity: 0 }));
            let now = f.scheduler.now();
            assert_eq!(process.complete_service(&mut f.stations[station], now)?, None);
            next = match process.route(&f.router, &mut f.uniform_rng, now)? {
                Departure::Next(station) => {
                    process.arrive(&mut f.stations[station], &mut f.scheduler, &mut f.uniform_rng)?;
                    Some(station)
                }
                Departure::Exit => None,
            };
        }
        assert!(process.is_done());
        let entity = process.into_entity();
        assert_eq!(entity.visits().len(), 2);
        assert_eq!(entity.exited_at(), Some(f.scheduler.now()));
        Ok(())
    }

    #[test]
    fn queued_process_resumes_through_a_handoff() -> Result<(), SimulationError> {
        let mut f = fixture();
        let (entry, mut first) = process(&f.router, 0, 0.0);
        let (_, mut second) = process(&f.router, 1, 0.0);
        first.arrive(&mut f.stations[entry], &mut f.scheduler, &mut f.uniform_rng)?;
        second.arrive(&mut f.stations[entry], &mut f.scheduler, &mut f.uniform_rng)?;
        assert!(matches!(second.phase(), Phase::Queued { station: 0 }));

        f.scheduler.next_until(f64::INFINITY)?;
        let now = f.scheduler.now();
        let handoff = first
            .complete_service(&mut f.stations[entry], now)?
            .expect("second entity is waiting");
        assert_eq!(handoff.entity, 1);
        second.accept_handoff(handoff.grant, &mut f.scheduler)?;
        assert_eq!(
            f.scheduler.next_until(f64::INFINITY)?,
            Some(Event::Granted { entity: 1 })
        );
        second.resume(&mut f.stations[entry], &mut f.scheduler, &mut f.uniform_rng)?;
        assert!(matches!(second.phase(), Phase::InService { .. }));
        assert_eq!(second.entity().visits()[0].service_start, Some(now));
        Ok(())
    }

    #[test]
    fn out_of_order_events_are_contract_violations() -> Result<(), SimulationError> {
        let mut f = fixture();
        let (entry, mut process) = process(&f.router, 3, 0.0);
        assert!(matches!(
            process.complete_service(&mut f.stations[entry], 0.0),
            Err(SimulationError::InvalidProcessState(3))
        ));
        assert!(process
            .resume(&mut f.stations[entry], &mut f.scheduler, &mut f.uniform_rng)
            .is_err());
        assert!(process.route(&f.router, &mut f.uniform_rng, 0.0).is_err());
        assert!(matches!(process.phase(), Phase::Arriving));
        Ok(())
    }
}
