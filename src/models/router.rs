//! The router holds the statically composed route of the network: an
//! ordered list of station visits, with optional branch points.  A branch
//! point sends an entity through a detour (one or more stations) with the
//! configured branch probability, and otherwise skips the detour.  The
//! decision is drawn from the simulation's random stream at the moment the
//! entity reaches the branch, which is directly after the service that
//! precedes it.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::StationId;
use crate::input_modeling::{BooleanRandomVariable, UniformRNG};
use crate::utils::errors::SimulationError;
use crate::utils::validate_probability;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RouteStep {
    Visit(StationId),
    Branch { detour: Vec<StationId> },
}

/// The position of one entity along the route.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteCursor {
    step: usize,
    detour: VecDeque<StationId>,
}

#[derive(Debug, Clone)]
pub struct Router {
    steps: Vec<RouteStep>,
    branch: BooleanRandomVariable,
}

impl Router {
    pub fn new(steps: Vec<RouteStep>, branch_probability: f64) -> Result<Self, SimulationError> {
        let p = validate_probability(branch_probability)?;
        match steps.first() {
            Some(RouteStep::Visit(_)) => Ok(Self {
                steps,
                branch: BooleanRandomVariable::Bernoulli { p },
            }),
            _ => Err(SimulationError::EmptyRoute),
        }
    }

    pub fn steps(&self) -> &[RouteStep] {
        &self.steps
    }

    /// The entry station, along with a cursor positioned just after it.
    pub fn start(&self) -> Result<(StationId, RouteCursor), SimulationError> {
        match self.steps.first() {
            Some(RouteStep::Visit(station)) => Ok((
                *station,
                RouteCursor {
                    step: 1,
                    detour: VecDeque::new(),
                },
            )),
            _ => Err(SimulationError::EmptyRoute),
        }
    }

    /// The next station for an entity that just completed a service, or
    /// `None` when the entity leaves the network.  Branch points reached on
    /// the way draw one Bernoulli variate each.
    pub fn next_station(
        &self,
        cursor: &mut RouteCursor,
        uniform_rng: &mut UniformRNG,
    ) -> Result<Option<StationId>, SimulationError> {
        if let Some(station) = cursor.detour.pop_front() {
            return Ok(Some(station));
        }
        while let Some(step) = self.steps.get(cursor.step) {
            cursor.step += 1;
            match step {
                RouteStep::Visit(station) => return Ok(Some(*station)),
                RouteStep::Branch { detour } => {
                    if self.branch.random_variate(uniform_rng)? {
                        cursor.detour.extend(detour.iter().copied());
                        if let Some(station) = cursor.detour.pop_front() {
                            return Ok(Some(station));
                        }
                    }
                }
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REGISTRATION: StationId = 0;
    const DOCTOR: StationId = 1;
    const LAB: StationId = 2;
    const PHARMACY: StationId = 3;

    fn clinic_router(p: f64) -> Router {
        Router::new(
            vec![
                RouteStep::Visit(REGISTRATION),
                RouteStep::Visit(DOCTOR),
                RouteStep::Branch { detour: vec![LAB] },
                RouteStep::Visit(PHARMACY),
            ],
            p,
        )
        .unwrap()
    }

    fn walk(router: &Router, uniform_rng: &mut UniformRNG) -> Vec<StationId> {
        let (entry, mut cursor) = router.start().unwrap();
        let mut path = vec![entry];
        while let Some(station) = router.next_station(&mut cursor, uniform_rng).unwrap() {
            path.push(station);
        }
        path
    }

    #[test]
    fn certain_branch_visits_the_detour() {
        let mut uniform_rng = UniformRNG::default();
        let path = walk(&clinic_router(1.0), &mut uniform_rng);
        assert_eq!(path, vec![REGISTRATION, DOCTOR, LAB, PHARMACY]);
    }

    #[test]
    fn impossible_branch_skips_the_detour() {
        let mut uniform_rng = UniformRNG::default();
        let path = walk(&clinic_router(0.0), &mut uniform_rng);
        assert_eq!(path, vec![REGISTRATION, DOCTOR, PHARMACY]);
    }

    #[test]
    fn branch_frequency_follows_probability() {
        let mut uniform_rng = UniformRNG::seeded(2024);
        let router = clinic_router(0.25);
        let detours = (0..4000)
            .filter(|_| walk(&router, &mut uniform_rng).contains(&LAB))
            .count();
        let frequency = detours as f64 / 4000.0;
        assert!((frequency - 0.25).abs() < 0.03);
    }

    #[test]
    fn route_must_start_with_a_visit() {
        assert!(matches!(
            Router::new(Vec::new(), 0.5),
            Err(SimulationError::EmptyRoute)
        ));
        assert!(matches!(
            Router::new(vec![RouteStep::Branch { detour: vec![LAB] }], 0.5),
            Err(SimulationError::EmptyRoute)
        ));
        assert!(matches!(
            Router::new(vec![RouteStep::Visit(LAB)], 1.5),
            Err(SimulationError::InvalidProbability(_))
        ));
    }
}
