//! Random variables underpin the stochastic behaviors of the network.
//! Timing (inter-arrival gaps, service durations) is exponential, and
//! routing is a Bernoulli trial.  The distributions are wrapped in enums
//! `Continuous` and `Boolean`, with their common parameterizations.

use rand::distributions::Distribution;
use rand_distr::{Bernoulli, Exp};
use serde::{Deserialize, Serialize};

use super::UniformRNG;
use crate::utils::errors::SimulationError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Continuous {
    Exp { lambda: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Boolean {
    Bernoulli { p: f64 },
}

impl Continuous {
    /// The generation of random variates drives stochastic behaviors during
    /// simulation execution.  This function requires the random number
    /// generator of the simulation, and produces a f64 random variate.
    pub fn random_variate(&self, uniform_rng: &mut UniformRNG) -> Result<f64, SimulationError> {
        match self {
            Continuous::Exp { lambda } => Ok(Exp::new(*lambda)?.sample(uniform_rng.rng())),
        }
    }

    pub fn mean(&self) -> f64 {
        match self {
            Continuous::Exp { lambda } => 1.0 / lambda,
        }
    }
}

impl Boolean {
    /// The generation of random variates drives stochastic behaviors during
    /// simulation execution.  This function requires the random number
    /// generator of the simulation, and produces a boolean random variate.
    pub fn random_variate(&self, uniform_rng: &mut UniformRNG) -> Result<bool, SimulationError> {
        match self {
            Boolean::Bernoulli { p } => Ok(Bernoulli::new(*p)?.sample(uniform_rng.rng())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empirical_mean(variable: &Continuous, sample_size: usize) -> f64 {
        let mut uniform_rng = UniformRNG::default();
        (0..sample_size)
            .map(|_| variable.random_variate(&mut uniform_rng).unwrap())
            .sum::<f64>()
            / (sample_size as f64)
    }

    #[test]
    fn exponential_samples_match_expectation() {
        let variable = Continuous::Exp { lambda: 7.0 };
        let mean = empirical_mean(&variable, 10000);
        let expected = variable.mean();
        assert!((mean - expected).abs() / expected < 0.025);
    }

    #[test]
    fn bernoulli_samples_match_expectation() {
        let variable = Boolean::Bernoulli { p: 0.3 };
        let mut uniform_rng = UniformRNG::default();
        let successes = (0..10000)
            .filter(|_| variable.random_variate(&mut uniform_rng).unwrap())
            .count();
        let frequency = successes as f64 / 10000.0;
        assert!((frequency - 0.3).abs() < 0.02);
    }

    #[test]
    fn degenerate_bernoulli_never_draws_wrong_outcome() {
        let mut uniform_rng = UniformRNG::default();
        let never = Boolean::Bernoulli { p: 0.0 };
        let always = Boolean::Bernoulli { p: 1.0 };
        assert!((0..1000).all(|_| !never.random_variate(&mut uniform_rng).unwrap()));
        assert!((0..1000).all(|_| always.random_variate(&mut uniform_rng).unwrap()));
    }

    #[test]
    fn invalid_parameters_are_reported() {
        let mut uniform_rng = UniformRNG::default();
        let exp = Continuous::Exp { lambda: -1.0 };
        assert!(matches!(
            exp.random_variate(&mut uniform_rng),
            Err(SimulationError::ExpError(_))
        ));
        let bernoulli = Boolean::Bernoulli { p: 1.5 };
        assert!(matches!(
            bernoulli.random_variate(&mut uniform_rng),
            Err(SimulationError::BernoulliError(_))
        ));
    }
}
