//! City setup, yearly turns, and save files around the grain depot.
//!
//! Shared between the CLI runner and tests. All randomness comes from the
//! caller's rng.

mod city;
mod config;
mod save;
mod turn;

pub use city::{found_city, CityId, CityState};
pub use config::{load_config, validate_config, GameConfig, YieldRange};
pub use save::{load_state, save_state, SaveFile};
pub use turn::{
    autopilot_orders, equally_distributed, run_turn, validate_orders, OrderError, TurnOrders,
    TurnReport,
};

#[cfg(test)]
fn test_config() -> GameConfig {
    use granary_core::GrainType;

    GameConfig {
        silo_count: 6,
        silo_capacity: 1_000,
        initial_bushels: GrainType::ALL.into_iter().map(|g| (g, 500)).collect(),
        initial_acres: 300,
        initial_residents: 50,
        bushels_per_acre: 1,
        bushels_per_resident: 20,
        acres_per_resident: 10,
        max_rat_infestation_pct: 10,
        max_immigration_pct: 40,
        immigration_starvation_cutoff_pct: 40,
        yield_per_acre: GrainType::ALL
            .into_iter()
            .map(|g| (g, YieldRange { min: 2, max: 5 }))
            .collect(),
    }
}
