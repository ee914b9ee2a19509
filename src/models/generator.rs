use tracing::debug;

use super::entity::{Entity, EntityId};
use super::process::Event;
use crate::input_modeling::{ContinuousRandomVariable, UniformRNG};
use crate::simulator::scheduler::Scheduler;
use crate::utils::errors::SimulationError;
use crate::utils::validate_rate;

/// The generator produces entities with exponentially distributed
/// inter-arrival gaps, i.e. a Poisson arrival stream.  It schedules its own
/// `Arrival` events in perpetuity; the run horizon is what stops it.
#[derive(Debug, Clone)]
pub struct Generator {
    interarrival_time: ContinuousRandomVariable,
    next_id: EntityId,
}

impl Generator {
    pub fn new(arrival_rate: f64) -> Result<Self, SimulationError> {
        let lambda = validate_rate("arrival rate", arrival_rate)?;
        Ok(Self {
            interarrival_time: ContinuousRandomVariable::Exp { lambda },
            next_id: 0,
        })
    }

    /// Number of entities generated so far.
    pub fn generated(&self) -> usize {
        self.next_id
    }

    /// Draw the next gap and schedule the arrival after it.
    pub fn schedule_next(
        &self,
        scheduler: &mut Scheduler<Event>,
        uniform_rng: &mut UniformRNG,
    ) -> Result<(), SimulationError> {
        let gap = self.interarrival_time.random_variate(uniform_rng)?;
        scheduler.schedule(gap, Event::Arrival)
    }

    /// Instantiate the entity of the arrival that is firing now.
    pub fn spawn(&mut self, now: f64) -> Entity {
        let entity = Entity::new(self.next_id, now);
        self.next_id += 1;
        debug!(entity = entity.id(), time = now, "entity created");
        entity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrival_rate_must_be_positive() {
        assert!(matches!(
            Generator::new(0.0),
            Err(SimulationError::InvalidRate { .. })
        ));
    }

    #[test]
    fn arrival_count_matches_rate() -> Result<(), SimulationError> {
        let mut generator = Generator::new(2.0)?;
        let mut scheduler = Scheduler::default();
        let mut uniform_rng = UniformRNG::seeded(11);
        generator.schedule_next(&mut scheduler, &mut uniform_rng)?;
        scheduler.run_until(5000.0, |scheduler, event| {
            assert_eq!(event, Event::Arrival);
            let entity = generator.spawn(scheduler.now());
            assert_eq!(entity.created_at(), scheduler.now());
            generator.schedule_next(scheduler, &mut uniform_rng)
        })?;
        let rate = generator.generated() as f64 / 5000.0;
        assert!((rate - 2.0).abs() < 0.1);
        Ok(())
    }

    #[test]
    fn entity_ids_are_sequential() {
        let mut generator = Generator::new(1.0).unwrap();
        let ids: Vec<EntityId> = (0..3).map(|i| generator.spawn(i as f64).id()).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }
}
