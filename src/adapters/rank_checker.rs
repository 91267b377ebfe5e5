use crate::domain::ports::RankChecker;
use crate::utils::error::{RankError, Result};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

pub const DEFAULT_MIN_POSITION: u32 = 1;
pub const DEFAULT_MAX_POSITION: u32 = 20;

/// 模擬搜尋排名：在 [min, max] 之間均勻取值
///
/// Stands in for a real search API client; swapping it out does not change
/// how positions are recorded.
#[derive(Debug)]
pub struct SimulatedRankChecker {
    min_position: u32,
    max_position: u32,
    rng: Mutex<StdRng>,
}

impl SimulatedRankChecker {
    pub fn new(min_position: u32, max_position: u32) -> Result<Self> {
        Self::with_rng(min_position, max_position, StdRng::from_entropy())
    }

    /// Deterministic sequence for a given seed.
    pub fn seeded(min_position: u32, max_position: u32, seed: u64) -> Result<Self> {
        Self::with_rng(min_position, max_position, StdRng::seed_from_u64(seed))
    }

    fn with_rng(min_position: u32, max_position: u32, rng: StdRng) -> Result<Self> {
        if min_position == 0 || min_position > max_position {
            return Err(RankError::ConfigValidationError {
                field: "tracking.min_position".to_string(),
                message: format!(
                    "Position range [{}, {}] must start at 1 or above and be non-empty",
                    min_position, max_position
                ),
            });
        }
        Ok(Self {
            min_position,
            max_position,
            rng: Mutex::new(rng),
        })
    }

    pub fn range(&self) -> (u32, u32) {
        (self.min_position, self.max_position)
    }
}

impl Default for SimulatedRankChecker {
    fn default() -> Self {
        Self {
            min_position: DEFAULT_MIN_POSITION,
            max_position: DEFAULT_MAX_POSITION,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }
}

#[async_trait]
impl RankChecker for SimulatedRankChecker {
    async fn check_position(&self, domain: &str, term: &str) -> Result<u32> {
        let mut rng = self.rng.lock().map_err(|_| RankError::RankCheckError {
            keyword: term.to_string(),
            message: "random source is unavailable".to_string(),
        })?;
        let position = rng.gen_range(self.min_position..=self.max_position);
        tracing::debug!("🎲 Simulated check for \"{}\" on {}: #{}", term, domain, position);
        Ok(position)
    }
}
