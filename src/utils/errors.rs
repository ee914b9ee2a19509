use thiserror::Error;

/// `SimulationError` enumerates all possible errors returned by clinic-sim.
///
/// Configuration errors are raised before any virtual time advances.
/// Contract violations indicate a scheduler or resource-pool bug and abort
/// the run; no partial statistics are produced.
#[derive(Error, Debug)]
pub enum SimulationError {
    /// Represents a non-positive (or non-finite) arrival or service rate
    #[error("Rate `{name}` must be positive and finite, but was {value}")]
    InvalidRate { name: String, value: f64 },

    /// Represents a station configured without any servers
    #[error("Station `{station}` must have at least one server")]
    InvalidServerCount { station: String },

    /// Represents a branch probability outside of [0, 1]
    #[error("Probability must be within [0, 1], but was {0}")]
    InvalidProbability(f64),

    /// Represents a negative (or non-finite) warm-up or run duration
    #[error("Duration `{name}` must be non-negative and finite, but was {value}")]
    InvalidDuration { name: String, value: f64 },

    /// Represents an attempt to schedule an event in the past
    #[error("Events cannot be scheduled with a negative delay ({0})")]
    NegativeDelay(f64),

    /// Represents a route step naming a station that is not configured
    #[error("Station `{0}` is referenced by the route, but not configured")]
    UnknownStation(String),

    /// Represents two stations configured with the same name
    #[error("Station `{0}` is configured more than once")]
    DuplicateStation(String),

    /// Represents a route that never visits a station
    #[error("The route must visit at least one station before any branch")]
    EmptyRoute,

    /// Represents the clock, or an accumulator, being asked to move backwards
    #[error("Virtual time cannot move backwards (from {from} to {to})")]
    TimeReversal { from: f64, to: f64 },

    /// Represents a capacity release at a station with no occupied server
    #[error("Station `{0}` released capacity without a matching acquire")]
    ReleaseWithoutAcquire(String),

    /// Represents an event addressed to an entity with no live process
    #[error("No live process exists for entity {0}")]
    UnknownEntity(usize),

    /// Represents an event delivered to a process in the wrong state
    #[error("Entity {0} received an event that is invalid in its current state")]
    InvalidProcessState(usize),

    /// Represents summary statistics requested over an empty sample
    #[error("At least one point is required for a sample")]
    EmptySample,

    /// Represents a confidence level without a tabulated t-score
    #[error("No t-score is tabulated for alpha = {0}")]
    UnsupportedConfidenceLevel(f64),

    /// Represents a failed conversion to num-traits Float
    #[error("Failed to convert to a Float value")]
    FloatConvError,

    /// Transparent serde_json errors
    #[error(transparent)]
    JSONError(#[from] serde_json::error::Error),

    /// Transparent serde_yaml errors
    #[error(transparent)]
    YAMLError(#[from] serde_yaml::Error),

    /// Transparent Exponential distribution errors
    #[error(transparent)]
    ExpError(#[from] rand_distr::ExpError),

    /// Transparent Bernoulli distribution errors
    #[error(transparent)]
    BernoulliError(#[from] rand_distr::BernoulliError),
}

impl SimulationError {
    /// Contract violations point at an engine bug, rather than at the
    /// supplied configuration.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            SimulationError::TimeReversal { .. }
                | SimulationError::ReleaseWithoutAcquire(_)
                | SimulationError::UnknownEntity(_)
                | SimulationError::InvalidProcessState(_)
        )
    }
}
