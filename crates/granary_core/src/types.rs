//! Type definitions for `granary_core`.
//!
//! Grain kinds, silo status snapshots, and the persisted depot layout.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseGrainTypeError;
use crate::Harvest;

// ---------------------------------------------------------------------------
// Core enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GrainType {
    Barley,
    Corn,
    Millet,
    Rice,
    Rye,
    Wheat,
}

impl GrainType {
    pub const ALL: [GrainType; 6] = [
        GrainType::Barley,
        GrainType::Corn,
        GrainType::Millet,
        GrainType::Rice,
        GrainType::Rye,
        GrainType::Wheat,
    ];

    pub fn label(self) -> &'static str {
        match self {
            GrainType::Barley => "BARLEY",
            GrainType::Corn => "CORN",
            GrainType::Millet => "MILLET",
            GrainType::Rice => "RICE",
            GrainType::Rye => "RYE",
            GrainType::Wheat => "WHEAT",
        }
    }
}

impl fmt::Display for GrainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for GrainType {
    type Err = ParseGrainTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        GrainType::ALL
            .into_iter()
            .find(|grain| grain.label() == wanted)
            .ok_or_else(|| ParseGrainTypeError(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Read-only views
// ---------------------------------------------------------------------------

/// Point-in-time copy of a silo's occupancy. Later mutation of the silo does
/// not reach an already returned status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiloStatus {
    pub capacity: u64,
    pub fill_level: u64,
    pub grain_type: Option<GrainType>,
}

impl SiloStatus {
    pub fn free_capacity(&self) -> u64 {
        self.capacity - self.fill_level
    }

    /// Fill level as a percentage of capacity.
    pub fn fill_percentage(&self) -> f64 {
        if self.capacity == 0 {
            return 0.0;
        }
        self.fill_level as f64 / self.capacity as f64 * 100.0
    }
}

// ---------------------------------------------------------------------------
// Persisted layout
// ---------------------------------------------------------------------------

/// One silo as written to a save file. Lots carry their own harvest year, so
/// decay history does not need to be replayed on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiloSnapshot {
    pub capacity: u64,
    pub harvests: Vec<Harvest>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DepotSnapshot {
    pub silos: Vec<SiloSnapshot>,
}
