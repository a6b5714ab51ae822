use serde::{Deserialize, Serialize};

use crate::{GrainType, StorageError};

/// Basis points in one whole (100%).
const BASIS_POINTS: u64 = 10_000;

/// How quickly a grain spoils in storage.
///
/// Within its shelf life a lot loses `fresh_rate_bp` basis points of its
/// current amount per decay call; past it, `spoiled_rate_bp`. Losses round
/// up, so small lots eventually rot away entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecayPolicy {
    pub shelf_life: u32,
    pub fresh_rate_bp: u64,
    pub spoiled_rate_bp: u64,
}

impl DecayPolicy {
    pub fn for_grain(grain: GrainType) -> Self {
        let (shelf_life, fresh_rate_bp, spoiled_rate_bp) = match grain {
            GrainType::Barley => (5, 200, 2_500),
            GrainType::Corn => (3, 400, 3_000),
            GrainType::Millet => (8, 100, 2_000),
            GrainType::Rice => (6, 150, 2_000),
            GrainType::Rye => (4, 300, 2_500),
            GrainType::Wheat => (5, 250, 3_500),
        };
        Self {
            shelf_life,
            fresh_rate_bp,
            spoiled_rate_bp,
        }
    }

    /// Units lost by a lot of `amount` that is `age` periods old.
    pub fn loss(&self, amount: u64, age: u32) -> u64 {
        if age == 0 {
            return 0;
        }
        let rate = if age <= self.shelf_life {
            self.fresh_rate_bp
        } else {
            self.spoiled_rate_bp
        };
        amount
            .saturating_mul(rate.min(BASIS_POINTS))
            .div_ceil(BASIS_POINTS)
            .min(amount)
    }
}

/// A dated quantity of one grain type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Harvest {
    grain: GrainType,
    amount: u64,
    harvest_year: u32,
}

impl Harvest {
    pub fn new(grain: GrainType, amount: u64, harvest_year: u32) -> Self {
        Self {
            grain,
            amount,
            harvest_year,
        }
    }

    pub fn grain(&self) -> GrainType {
        self.grain
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub fn harvest_year(&self) -> u32 {
        self.harvest_year
    }

    pub fn is_spent(&self) -> bool {
        self.amount == 0
    }

    pub fn decay_policy(&self) -> DecayPolicy {
        DecayPolicy::for_grain(self.grain)
    }

    /// Expiry year. Lots with lower durability should be eaten first.
    pub fn durability(&self) -> u32 {
        self.harvest_year.saturating_add(self.decay_policy().shelf_life)
    }

    /// Moves `n` units into a new lot of the same grain and year.
    pub fn split(&mut self, n: u64) -> Result<Harvest, StorageError> {
        if n == 0 || n >= self.amount {
            return Err(StorageError::InvalidArgument(format!(
                "split size {n} must be between 1 and {}",
                self.amount.saturating_sub(1)
            )));
        }
        self.amount -= n;
        Ok(Harvest::new(self.grain, n, self.harvest_year))
    }

    /// Removes up to `n` units, returning how many were taken.
    pub fn consume(&mut self, n: u64) -> u64 {
        let taken = n.min(self.amount);
        self.amount -= taken;
        taken
    }

    /// Applies one period of spoilage as of `current_year`.
    pub fn decay(&mut self, current_year: u32) -> u64 {
        let age = current_year.saturating_sub(self.harvest_year);
        let lost = self.decay_policy().loss(self.amount, age);
        self.amount -= lost;
        lost
    }
}
