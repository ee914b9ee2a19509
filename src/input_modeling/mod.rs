//! The input modeling module provides a foundation for configurable model
//! behaviors.  The module includes the random variable distributions used by
//! the queueing network (exponential timing, Bernoulli routing) and a
//! structure around seeded random number generation.

pub mod random_variable;
pub mod uniform_rng;

pub use random_variable::Boolean as BooleanRandomVariable;
pub use random_variable::Continuous as ContinuousRandomVariable;
pub use uniform_rng::UniformRNG;
