//! The simulator module provides the mechanics to run a queueing network
//! through virtual time.  A `Simulation` is created from a validated
//! network configuration, and every call to `run` is an independent,
//! seeded replication: fresh stations, a fresh random stream, and a fresh
//! scheduler.  The run proceeds through the warm-up period, restarts the
//! station integrals, continues to the horizon, and finalizes every station
//! before the statistics are handed back as a `RunOutput`.
//!
//! Execution is single threaded.  One event is executed at a time, and the
//! random stream is consumed in event order, so a run is a pure function of
//! (network, seed, warm-up duration, run duration).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::input_modeling::UniformRNG;
use crate::models::{
    Departure, Entity, EntityId, EntityProcess, Event, Generator, Router, Station,
    StationAccumulator, StationId,
};
use crate::output_analysis::RunSummary;
use crate::utils::errors::SimulationError;
use crate::utils::validate_duration;

pub mod config;
pub mod scheduler;

pub use self::config::{Network, NetworkConfig, RouteStepConfig, StationConfig};
pub use self::scheduler::Scheduler;

/// The `Simulation` struct is the entry point of clinic-sim.  It holds the
/// validated, immutable network, and produces one `RunOutput` per run.
#[derive(Debug, Clone)]
pub struct Simulation {
    network: Network,
}

impl Simulation {
    /// This constructor method validates the supplied configuration.  All
    /// configuration errors surface here, before any virtual time passes.
    pub fn post(config: &NetworkConfig) -> Result<Self, SimulationError> {
        Ok(Self {
            network: config.validate()?,
        })
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Run once with the warm-up and run durations of the configuration.
    pub fn run_configured(&self, seed: u64) -> Result<RunOutput, SimulationError> {
        self.run(
            seed,
            self.network.warmup_duration(),
            self.network.run_duration(),
        )
    }

    /// Run the network from an empty state until
    /// `warmup_duration + run_duration`.  Station integrals cover only the
    /// interval after the warm-up.
    pub fn run(
        &self,
        seed: u64,
        warmup_duration: f64,
        run_duration: f64,
    ) -> Result<RunOutput, SimulationError> {
        let warmup_duration = validate_duration("warmup duration", warmup_duration)?;
        let run_duration = validate_duration("run duration", run_duration)?;
        let horizon = warmup_duration + run_duration;
        info!(seed, warmup_duration, run_duration, "simulation run started");

        let mut replication = Replication::new(&self.network, seed);
        replication.start()?;
        replication.run_until(warmup_duration)?;
        replication.restart_statistics(warmup_duration)?;
        replication.run_until(horizon)?;
        let output = replication.finish(seed, warmup_duration, run_duration, horizon)?;

        info!(
            seed,
            horizon,
            entities = output.entities.len(),
            exited = output.entities.iter().filter(|entity| entity.has_exited()).count(),
            "simulation run finished"
        );
        Ok(output)
    }

    /// Run `replications` independent replications with seeds
    /// `base_seed + index`, summarizing each one.  The first failed run
    /// aborts the whole batch.
    pub fn replicate(
        &self,
        base_seed: u64,
        replications: usize,
    ) -> Result<Vec<RunSummary>, SimulationError> {
        (0..replications as u64)
            .map(|index| -> Result<RunSummary, SimulationError> {
                let output = self.run_configured(base_seed.wrapping_add(index))?;
                Ok(RunSummary::from_output(&output))
            })
            .collect()
    }
}

/// The live state of a single run.  The scheduler is kept apart from the
/// network state, so event handlers can schedule follow-up events while
/// mutating stations and processes.
struct Replication<'a> {
    scheduler: Scheduler<Event>,
    state: NetworkState<'a>,
}

struct NetworkState<'a> {
    router: &'a Router,
    generator: Generator,
    stations: Vec<Station>,
    processes: BTreeMap<EntityId, EntityProcess>,
    retired: Vec<Entity>,
    uniform_rng: UniformRNG,
}

impl<'a> Replication<'a> {
    fn new(network: &'a Network, seed: u64) -> Self {
        Self {
            scheduler: Scheduler::default(),
            state: NetworkState {
                router: &network.router,
                generator: network.generator.clone(),
                stations: network.stations.clone(),
                processes: BTreeMap::new(),
                retired: Vec::new(),
                uniform_rng: UniformRNG::seeded(seed),
            },
        }
    }

    fn start(&mut self) -> Result<(), SimulationError> {
        self.state
            .generator
            .schedule_next(&mut self.scheduler, &mut self.state.uniform_rng)
    }

    fn run_until(&mut self, horizon: f64) -> Result<(), SimulationError> {
        let Replication { scheduler, state } = self;
        scheduler.run_until(horizon, |scheduler, event| state.execute(scheduler, event))
    }

    fn restart_statistics(&mut self, now: f64) -> Result<(), SimulationError> {
        debug!(time = now, "warm-up finished, station statistics restarted");
        self.state
            .stations
            .iter_mut()
            .try_for_each(|station| station.restart_statistics(now))
    }

    fn finish(
        self,
        seed: u64,
        warmup_duration: f64,
        run_duration: f64,
        horizon: f64,
    ) -> Result<RunOutput, SimulationError> {
        let NetworkState {
            mut stations,
            processes,
            mut retired,
            ..
        } = self.state;
        stations
            .iter_mut()
            .try_for_each(|station| station.finalize(horizon))?;
        retired.extend(processes.into_iter().map(|(_, process)| process.into_entity()));
        retired.sort_by_key(Entity::id);
        Ok(RunOutput {
            seed,
            warmup_duration,
            run_duration,
            horizon,
            stations: stations.iter().map(StationOutput::from_station).collect(),
            entities: retired,
        })
    }
}

impl<'a> NetworkState<'a> {
    fn execute(&mut self, scheduler: &mut Scheduler<Event>, event: Event) -> Result<(), SimulationError> {
        match event {
            Event::Arrival => self.on_arrival(scheduler),
            Event::Granted { entity } => self.on_granted(scheduler, entity),
            Event::ServiceComplete { entity } => self.on_service_complete(scheduler, entity),
        }
    }

    fn on_arrival(&mut self, scheduler: &mut Scheduler<Event>) -> Result<(), SimulationError> {
        let entity = self.generator.spawn(scheduler.now());
        let id = entity.id();
        let (entry, cursor) = self.router.start()?;
        let mut process = EntityProcess::new(entity, cursor);
        process.arrive(&mut self.stations[entry], scheduler, &mut self.uniform_rng)?;
        self.processes.insert(id, process);
        self.generator.schedule_next(scheduler, &mut self.uniform_rng)
    }

    fn on_granted(
        &mut self,
        scheduler: &mut Scheduler<Event>,
        entity: EntityId,
    ) -> Result<(), SimulationError> {
        let process = self
            .processes
            .get_mut(&entity)
            .ok_or(SimulationError::UnknownEntity(entity))?;
        let station = current_station(process)?;
        process.resume(&mut self.stations[station], scheduler, &mut self.uniform_rng)
    }

    fn on_service_complete(
        &mut self,
        scheduler: &mut Scheduler<Event>,
        entity: EntityId,
    ) -> Result<(), SimulationError> {
        let now = scheduler.now();
        let mut process = self
            .processes
            .remove(&entity)
            .ok_or(SimulationError::UnknownEntity(entity))?;
        let station = current_station(&process)?;
        if let Some(handoff) = process.complete_service(&mut self.stations[station], now)? {
            self.processes
                .get_mut(&handoff.entity)
                .ok_or(SimulationError::UnknownEntity(handoff.entity))?
                .accept_handoff(handoff.grant, scheduler)?;
        }
        match process.route(self.router, &mut self.uniform_rng, now)? {
            Departure::Next(next) => {
                process.arrive(&mut self.stations[next], scheduler, &mut self.uniform_rng)?;
                self.processes.insert(entity, process);
            }
            Departure::Exit => {
                debug!(entity, time = now, "entity left the network");
                self.retired.push(process.into_entity());
            }
        }
        Ok(())
    }
}

fn current_station(process: &EntityProcess) -> Result<StationId, SimulationError> {
    process
        .current_station()
        .ok_or_else(|| SimulationError::InvalidProcessState(process.id()))
}

/// The final state of one station at the horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationOutput {
    pub id: StationId,
    pub name: String,
    pub servers: usize,
    pub service_rate: f64,
    pub occupied: usize,
    pub wait_line_length: usize,
    pub accumulator: StationAccumulator,
}

impl StationOutput {
    fn from_station(station: &Station) -> Self {
        Self {
            id: station.id(),
            name: station.name().to_string(),
            servers: station.servers(),
            service_rate: station.service_rate(),
            occupied: station.occupied(),
            wait_line_length: station.wait_line_length(),
            accumulator: station.accumulator().clone(),
        }
    }
}

/// Everything a run produces: finalized station accumulators, the ledger
/// of every entity created during the run (ordered by id), and the horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOutput {
    pub seed: u64,
    pub warmup_duration: f64,
    pub run_duration: f64,
    pub horizon: f64,
    pub stations: Vec<StationOutput>,
    pub entities: Vec<Entity>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_station(arrival_rate: f64, service_rate: f64) -> Simulation {
        let config =
            NetworkConfig::tandem(vec![StationConfig::new("desk", service_rate, 1)], arrival_rate)
                .with_durations(0.0, 100.0);
        Simulation::post(&config).unwrap()
    }

    #[test]
    fn run_reaches_the_horizon() -> Result<(), SimulationError> {
        let output = single_station(1.0, 2.0).run(3, 5.0, 20.0)?;
        assert_eq!(output.horizon, 25.0);
        assert_eq!(output.stations[0].accumulator.last_event_time(), 25.0);
        assert_eq!(output.stations[0].accumulator.origin(), 5.0);
        Ok(())
    }

    #[test]
    fn entities_are_ordered_by_id() -> Result<(), SimulationError> {
        let output = single_station(3.0, 1.0).run_configured(8)?;
        assert!(!output.entities.is_empty());
        assert!(output
            .entities
            .iter()
            .enumerate()
            .all(|(index, entity)| entity.id() == index));
        Ok(())
    }

    #[test]
    fn invalid_durations_are_rejected_before_running() {
        let simulation = single_station(1.0, 2.0);
        assert!(matches!(
            simulation.run(1, -1.0, 10.0),
            Err(SimulationError::InvalidDuration { .. })
        ));
        assert!(simulation.run(1, 0.0, f64::NAN).is_err());
    }

    #[test]
    fn zero_duration_run_is_empty() -> Result<(), SimulationError> {
        let output = single_station(1.0, 2.0).run(1, 0.0, 0.0)?;
        assert!(output.entities.is_empty());
        assert_eq!(output.stations[0].accumulator.busy_area(), 0.0);
        Ok(())
    }

    #[test]
    fn replications_use_consecutive_seeds() -> Result<(), SimulationError> {
        let simulation = single_station(1.0, 2.0);
        let summaries = simulation.replicate(40, 3)?;
        let seeds: Vec<u64> = summaries.iter().map(|summary| summary.seed).collect();
        assert_eq!(seeds, vec![40, 41, 42]);
        Ok(())
    }
}
