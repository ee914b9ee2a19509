//! The utilies module provides general capabilities, that may span the
//! input modeling, models, output analysis, and simulator modules.  The
//! utilities are centered around error reporting, parameter validation, and
//! common arithmetic.

pub mod errors;

use errors::SimulationError;

/// Rates parameterize exponential distributions, so they must be strictly
/// positive and finite.
pub fn validate_rate(name: &str, value: f64) -> Result<f64, SimulationError> {
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(SimulationError::InvalidRate {
            name: name.to_string(),
            value,
        })
    }
}

pub fn validate_duration(name: &str, value: f64) -> Result<f64, SimulationError> {
    if value >= 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(SimulationError::InvalidDuration {
            name: name.to_string(),
            value,
        })
    }
}

pub fn validate_probability(value: f64) -> Result<f64, SimulationError> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(SimulationError::InvalidProbability(value))
    }
}

/// A ratio over an effective duration, defined as zero for an empty (or
/// degenerate) duration.
pub fn time_average(area: f64, duration: f64) -> f64 {
    if duration <= 0.0 {
        0.0
    } else {
        area / duration
    }
}
