use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use granary_core::GrainType;
use serde::{Deserialize, Serialize};

/// Bushels harvested per planted acre, drawn uniformly from `min..=max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YieldRange {
    pub min: u64,
    pub max: u64,
}

/// Tunables for founding a city and running its turns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub silo_count: usize,
    pub silo_capacity: u64,
    pub initial_bushels: BTreeMap<GrainType, u64>,
    pub initial_acres: u64,
    pub initial_residents: u64,
    /// Seed grain needed to plant one acre.
    pub bushels_per_acre: u64,
    /// Grain one resident eats per year.
    pub bushels_per_resident: u64,
    /// Acres one resident can work.
    pub acres_per_resident: u64,
    pub max_rat_infestation_pct: u64,
    pub max_immigration_pct: u64,
    /// Starvation share (percent) at or above which nobody moves in.
    pub immigration_starvation_cutoff_pct: u64,
    pub yield_per_acre: BTreeMap<GrainType, YieldRange>,
}

impl GameConfig {
    pub fn initial_bushels(&self, grain: GrainType) -> u64 {
        self.initial_bushels.get(&grain).copied().unwrap_or(0)
    }

    pub fn yield_range(&self, grain: GrainType) -> YieldRange {
        self.yield_per_acre
            .get(&grain)
            .copied()
            .unwrap_or(YieldRange { min: 0, max: 0 })
    }
}

/// Validates a loaded config, panicking on any authoring error.
///
/// Catches mistakes like a zero-sized depot, percentages above 100, or a
/// grain with no yield range.
pub fn validate_config(config: &GameConfig) {
    assert!(config.silo_count > 0, "silo_count must be positive");
    assert!(config.silo_capacity > 0, "silo_capacity must be positive");
    assert!(
        config.bushels_per_resident > 0,
        "bushels_per_resident must be positive"
    );
    assert!(
        config.acres_per_resident > 0,
        "acres_per_resident must be positive"
    );
    assert!(
        config.max_rat_infestation_pct <= 100,
        "max_rat_infestation_pct {} exceeds 100",
        config.max_rat_infestation_pct,
    );
    assert!(
        config.max_immigration_pct <= 100,
        "max_immigration_pct {} exceeds 100",
        config.max_immigration_pct,
    );
    assert!(
        config.immigration_starvation_cutoff_pct <= 100,
        "immigration_starvation_cutoff_pct {} exceeds 100",
        config.immigration_starvation_cutoff_pct,
    );

    for grain in GrainType::ALL {
        let range = config.yield_per_acre.get(&grain);
        assert!(range.is_some(), "grain '{grain}' has no yield range");
        if let Some(range) = range {
            assert!(
                range.min <= range.max,
                "grain '{grain}' yield range {}..={} is inverted",
                range.min,
                range.max,
            );
        }
    }

    // Silos hold one grain each, so every stocked grain rounds up to whole silos.
    let silos_needed: u64 = config
        .initial_bushels
        .values()
        .map(|bushels| bushels.div_ceil(config.silo_capacity))
        .sum();
    assert!(
        silos_needed <= config.silo_count as u64,
        "initial bushels need {silos_needed} silos but the depot has {}",
        config.silo_count,
    );
}

pub fn load_config(config_dir: &str) -> Result<GameConfig> {
    let path = Path::new(config_dir).join("config.json");
    let config: GameConfig = serde_json::from_str(
        &std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?,
    )
    .with_context(|| format!("parsing {}", path.display()))?;
    validate_config(&config);
    Ok(config)
}
