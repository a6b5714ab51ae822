use std::fmt;

use granary_core::{Depot, GrainType, Harvest, StorageError};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::GameConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CityId(pub Uuid);

impl CityId {
    /// Deterministic v4 id drawn from `rng`.
    pub fn generate(rng: &mut impl Rng) -> Self {
        let bytes: [u8; 16] = rng.gen();
        CityId(uuid::Builder::from_random_bytes(bytes).into_uuid())
    }
}

impl fmt::Display for CityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "city_{}", self.0)
    }
}

/// Everything that persists between turns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityState {
    pub id: CityId,
    pub name: String,
    pub seed: u64,
    pub year: u32,
    pub acres: u64,
    pub residents: u64,
    pub depot: Depot,
}

impl CityState {
    pub fn is_extinct(&self) -> bool {
        self.residents == 0
    }

    /// Rng for the turn about to run. Derived from the seed and year, so a
    /// city reloaded from a save continues the same sequence.
    pub fn turn_rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.seed ^ u64::from(self.year).rotate_left(32))
    }
}

pub fn found_city(
    config: &GameConfig,
    name: &str,
    seed: u64,
    rng: &mut impl Rng,
) -> Result<CityState, StorageError> {
    let mut depot = Depot::new(config.silo_count, config.silo_capacity)?;
    for grain in GrainType::ALL {
        let bushels = config.initial_bushels(grain);
        if !depot.store(Harvest::new(grain, bushels, 0))? {
            return Err(StorageError::InvalidArgument(format!(
                "initial {grain} stock of {bushels} does not fit the depot"
            )));
        }
    }

    let state = CityState {
        id: CityId::generate(rng),
        name: name.to_string(),
        seed,
        year: 0,
        acres: config.initial_acres,
        residents: config.initial_residents,
        depot,
    };
    info!(
        city = %state.id,
        name = %state.name,
        seed,
        bushels = state.depot.total_fill_level(),
        "city founded"
    );
    Ok(state)
}
