//! Shared test fixtures for granary_core and downstream crates.
//!
//! `base_depot()` is the three-silo depot most scenarios start from.
//! `mixed_depot()` holds several grains and harvest years, for withdrawal
//! and decay tests.

use crate::{Depot, GrainType, Harvest};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Three empty silos of 1000 units each.
pub fn base_depot() -> Depot {
    Depot::new(3, 1_000).unwrap()
}

/// Four silos of 1000: wheat 600 (two lots), corn 900, barley 300, one empty.
pub fn mixed_depot() -> Depot {
    let mut depot = Depot::new(4, 1_000).unwrap();
    assert!(depot.store(Harvest::new(GrainType::Wheat, 400, 2)).unwrap());
    assert!(depot.store(Harvest::new(GrainType::Wheat, 200, 1)).unwrap());
    assert!(depot.store(Harvest::new(GrainType::Corn, 900, 2)).unwrap());
    assert!(depot.store(Harvest::new(GrainType::Barley, 300, 2)).unwrap());
    depot
}

pub fn harvest(grain: GrainType, amount: u64) -> Harvest {
    Harvest::new(grain, amount, 0)
}

pub fn make_rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(42)
}
