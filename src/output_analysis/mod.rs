//! The output analysis module turns run outputs into statistics.  The
//! `network` submodule is the query surface over a single run: derived
//! station metrics, the post-warm-up entity set, and the overall wait and
//! response figures.  Across replications, per-run scalars are analyzed as
//! independent, identically-distributed (IID) samples with
//! `IndependentSample`.

use num_traits::Float;
use serde::{Deserialize, Serialize};

pub mod network;
pub mod t_scores;

pub use self::network::{OverallMetrics, RunSummary, StationMetrics};

use crate::utils::errors::SimulationError;

fn sum<T: Float>(points: &[T]) -> T {
    points.iter().fold(T::zero(), |sum, point| sum + *point)
}

/// This function calculates the sample mean from a set of points - a simple
/// arithmetic mean.
fn sample_mean<T: Float>(points: &[T]) -> Result<T, SimulationError> {
    if points.is_empty() {
        return Err(SimulationError::EmptySample);
    }
    Ok(sum(points) / usize_to_float(points.len())?)
}

/// This function calculates the unbiased sample variance (n - 1 divisor),
/// given a set of points and the sample mean.  A single point has zero
/// variance.
fn sample_variance<T: Float>(points: &[T], mean: &T) -> Result<T, SimulationError> {
    if points.len() < 2 {
        return Ok(T::zero());
    }
    Ok(points
        .iter()
        .fold(T::zero(), |acc, point| acc + (*point - *mean).powi(2))
        / usize_to_float(points.len() - 1)?)
}

/// This function converts a usize to a Float, with an associated
/// `SimulationError` returned for failed conversions
fn usize_to_float<T: Float>(unconv: usize) -> Result<T, SimulationError> {
    T::from(unconv).ok_or(SimulationError::FloatConvError)
}

/// The confidence interval provides an upper and lower estimate on the
/// mean of a replicated output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval<T: Float> {
    lower: T,
    upper: T,
}

impl<T: Float> ConfidenceInterval<T> {
    pub fn lower(&self) -> T {
        self.lower
    }

    pub fn upper(&self) -> T {
        self.upper
    }

    pub fn half_width(&self) -> T {
        (self.upper - self.lower) / (T::one() + T::one())
    }

    pub fn contains(&self, value: T) -> bool {
        self.lower <= value && value <= self.upper
    }
}

/// The independent sample is for IID samples, such as one scalar summary
/// per replication.  There are no additional requirements on the data
/// beyond being IID.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct IndependentSample<T> {
    points: Vec<T>,
    mean: T,
    variance: T,
}

impl<T: Float> IndependentSample<T> {
    /// This constructor method creates an `IndependentSample` from a vector
    /// of floating point values.
    pub fn post(points: Vec<T>) -> Result<IndependentSample<T>, SimulationError> {
        let mean = sample_mean(&points)?;
        let variance = sample_variance(&points, &mean)?;
        Ok(IndependentSample {
            points,
            mean,
            variance,
        })
    }

    /// Calculate the confidence interval of the mean, based on the provided
    /// value of alpha.
    pub fn confidence_interval_mean(
        &self,
        alpha: T,
    ) -> Result<ConfidenceInterval<T>, SimulationError> {
        if self.points.len() == 1 {
            return Ok(ConfidenceInterval {
                lower: self.mean,
                upper: self.mean,
            });
        }
        let points_len: T = usize_to_float(self.points.len())?;
        let half_width = t_scores::t_score(alpha, self.points.len() - 1)? * self.variance.sqrt()
            / points_len.sqrt();
        Ok(ConfidenceInterval {
            lower: self.mean - half_width,
            upper: self.mean + half_width,
        })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Return the sample mean.
    pub fn point_estimate_mean(&self) -> T {
        self.mean
    }

    /// Return the sample variance.
    pub fn variance(&self) -> T {
        self.variance
    }

    /// Return the sample standard deviation.
    pub fn standard_deviation(&self) -> T {
        self.variance.sqrt()
    }
}
