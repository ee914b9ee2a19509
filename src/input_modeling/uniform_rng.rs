use rand_core::SeedableRng;
use rand_pcg::Pcg64Mcg;
use serde::{Deserialize, Serialize};

/// The single random stream of a simulation run.  Arrival gaps, service
/// durations, and routing decisions all draw from it, so a fixed seed and a
/// fixed draw order reproduce the same event trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniformRNG {
    rng: Pcg64Mcg,
}

impl Default for UniformRNG {
    fn default() -> Self {
        Self::seeded(42)
    }
}

impl UniformRNG {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Pcg64Mcg::seed_from_u64(seed),
        }
    }

    pub fn rng(&mut self) -> &mut Pcg64Mcg {
        &mut self.rng
    }
}
