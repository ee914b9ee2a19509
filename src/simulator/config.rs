//! Network configuration.  A `NetworkConfig` is a plain, serializable
//! description of the stations, the route through them, the arrival rate,
//! the branch probability, and the run durations.  Validation turns it into
//! an immutable `Network`, the only form the engine accepts.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{Generator, RouteStep, Router, Station};
use crate::utils::errors::SimulationError;
use crate::utils::{validate_duration, validate_probability};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationConfig {
    pub name: String,
    pub service_rate: f64,
    pub servers: usize,
}

impl StationConfig {
    pub fn new(name: &str, service_rate: f64, servers: usize) -> Self {
        Self {
            name: name.to_string(),
            service_rate,
            servers,
        }
    }
}

/// A route step, naming stations rather than addressing them by index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RouteStepConfig {
    Visit { station: String },
    Branch { detour: Vec<String> },
}

impl RouteStepConfig {
    pub fn visit(station: &str) -> Self {
        RouteStepConfig::Visit {
            station: station.to_string(),
        }
    }

    pub fn branch(detour: &[&str]) -> Self {
        RouteStepConfig::Branch {
            detour: detour.iter().map(|station| station.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    stations: Vec<StationConfig>,
    route: Vec<RouteStepConfig>,
    arrival_rate: f64,
    #[serde(default)]
    branch_probability: f64,
    #[serde(default)]
    warmup_duration: f64,
    run_duration: f64,
}

impl NetworkConfig {
    pub fn new(
        stations: Vec<StationConfig>,
        route: Vec<RouteStepConfig>,
        arrival_rate: f64,
        branch_probability: f64,
        warmup_duration: f64,
        run_duration: f64,
    ) -> Self {
        Self {
            stations,
            route,
            arrival_rate,
            branch_probability,
            warmup_duration,
            run_duration,
        }
    }

    /// The clinic: registration, then a doctor, then (with probability
    /// `lab_probability`) the lab, and finally the pharmacy.
    pub fn clinic(
        arrival_rate: f64,
        lab_probability: f64,
        registration: StationConfig,
        doctor: StationConfig,
        lab: StationConfig,
        pharmacy: StationConfig,
    ) -> Self {
        let route = vec![
            RouteStepConfig::Visit {
                station: registration.name.clone(),
            },
            RouteStepConfig::Visit {
                station: doctor.name.clone(),
            },
            RouteStepConfig::Branch {
                detour: vec![lab.name.clone()],
            },
            RouteStepConfig::Visit {
                station: pharmacy.name.clone(),
            },
        ];
        Self::new(
            vec![registration, doctor, lab, pharmacy],
            route,
            arrival_rate,
            lab_probability,
            0.0,
            0.0,
        )
    }

    /// A line of stations visited in configuration order.
    pub fn tandem(stations: Vec<StationConfig>, arrival_rate: f64) -> Self {
        let route = stations
            .iter()
            .map(|station| RouteStepConfig::Visit {
                station: station.name.clone(),
            })
            .collect();
        Self::new(stations, route, arrival_rate, 0.0, 0.0, 0.0)
    }

    pub fn with_durations(mut self, warmup_duration: f64, run_duration: f64) -> Self {
        self.warmup_duration = warmup_duration;
        self.run_duration = run_duration;
        self
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, SimulationError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SimulationError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn stations(&self) -> &[StationConfig] {
        &self.stations
    }

    pub fn route(&self) -> &[RouteStepConfig] {
        &self.route
    }

    pub fn arrival_rate(&self) -> f64 {
        self.arrival_rate
    }

    pub fn branch_probability(&self) -> f64 {
        self.branch_probability
    }

    pub fn warmup_duration(&self) -> f64 {
        self.warmup_duration
    }

    pub fn run_duration(&self) -> f64 {
        self.run_duration
    }

    /// Check every parameter and resolve station names, producing the
    /// immutable network the engine runs.
    pub fn validate(&self) -> Result<Network, SimulationError> {
        let mut station_ids = HashMap::new();
        let stations = self
            .stations
            .iter()
            .enumerate()
            .map(|(id, config)| {
                if station_ids.insert(config.name.clone(), id).is_some() {
                    return Err(SimulationError::DuplicateStation(config.name.clone()));
                }
                Station::new(id, config.name.clone(), config.service_rate, config.servers)
            })
            .collect::<Result<Vec<Station>, SimulationError>>()?;
        let resolve = |name: &String| {
            station_ids
                .get(name)
                .copied()
                .ok_or_else(|| SimulationError::UnknownStation(name.clone()))
        };
        let steps = self
            .route
            .iter()
            .map(|step| match step {
                RouteStepConfig::Visit { station } => Ok(RouteStep::Visit(resolve(station)?)),
                RouteStepConfig::Branch { detour } => Ok(RouteStep::Branch {
                    detour: detour.iter().map(resolve).collect::<Result<_, _>>()?,
                }),
            })
            .collect::<Result<Vec<RouteStep>, SimulationError>>()?;
        Ok(Network {
            stations,
            router: Router::new(steps, validate_probability(self.branch_probability)?)?,
            generator: Generator::new(self.arrival_rate)?,
            warmup_duration: validate_duration("warmup duration", self.warmup_duration)?,
            run_duration: validate_duration("run duration", self.run_duration)?,
        })
    }
}

/// A validated network.  Every run starts from a fresh copy of the
/// stations and the generator.
#[derive(Debug, Clone)]
pub struct Network {
    pub(crate) stations: Vec<Station>,
    pub(crate) router: Router,
    pub(crate) generator: Generator,
    pub(crate) warmup_duration: f64,
    pub(crate) run_duration: f64,
}

impl Network {
    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn warmup_duration(&self) -> f64 {
        self.warmup_duration
    }

    pub fn run_duration(&self) -> f64 {
        self.run_duration
    }
}
