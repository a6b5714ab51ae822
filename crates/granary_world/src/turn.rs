use std::collections::BTreeMap;

use granary_core::{GrainType, Harvest, StorageError, EXPANSION_COST_PER_SILO};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::{CityState, GameConfig};

/// What the steward decides for one year.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnOrders {
    /// Bushels handed out to residents.
    pub feed: u64,
    /// Acres to sow, per grain.
    pub plant: BTreeMap<GrainType, u64>,
    pub buy_acres: u64,
    pub sell_acres: u64,
    /// Bushels per acre for this year's land trade.
    pub acre_price: u64,
    /// Silos to build, each with the configured silo capacity.
    pub expand: usize,
}

impl TurnOrders {
    pub fn planted_acres(&self) -> u64 {
        self.plant.values().sum()
    }

    fn seed_needed(&self, grain: GrainType, config: &GameConfig) -> u64 {
        self.plant
            .get(&grain)
            .copied()
            .unwrap_or(0)
            .saturating_mul(config.bushels_per_acre)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("insufficient grain: {wanted} bushels needed, {available} in stock")]
    InsufficientGrain { wanted: u64, available: u64 },
    #[error("insufficient {grain} seed: {wanted} bushels needed, {available} in stock")]
    InsufficientSeed {
        grain: GrainType,
        wanted: u64,
        available: u64,
    },
    #[error("not enough land: {wanted} acres needed, {owned} owned")]
    NotEnoughLand { wanted: u64, owned: u64 },
    #[error("not enough residents: {residents} residents can work {workable} acres, {wanted} requested")]
    NotEnoughResidents {
        wanted: u64,
        workable: u64,
        residents: u64,
    },
    #[error("depot is full, land cannot be sold")]
    DepotFull,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Outcome of one year, as shown to the player and written to turn logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnReport {
    /// Year the city is in once the turn has run.
    pub year: u32,
    pub fed: u64,
    pub starved: u64,
    pub starved_pct: u64,
    pub immigrants: u64,
    pub residents: u64,
    pub acres: u64,
    pub harvested: BTreeMap<GrainType, u64>,
    /// Harvest and sale proceeds the depot could not take in.
    pub grain_lost: u64,
    pub eaten_by_rats: u64,
    pub decayed: u64,
    pub expansion_paid: u64,
    pub bushels: BTreeMap<GrainType, u64>,
    pub total_capacity: u64,
    pub free_capacity: u64,
}

impl TurnReport {
    pub fn total_harvested(&self) -> u64 {
        self.harvested.values().sum()
    }

    pub fn total_bushels(&self) -> u64 {
        self.bushels.values().sum()
    }
}

/// Checks `orders` against the city's land, residents, and stock.
///
/// Seed is checked against stock before feeding; [`run_turn`] repeats the
/// check after feeding has drawn its share from every silo.
pub fn validate_orders(
    state: &CityState,
    orders: &TurnOrders,
    config: &GameConfig,
) -> Result<(), OrderError> {
    let available = state.depot.total_fill_level();
    let upfront = orders
        .acre_price
        .saturating_mul(orders.buy_acres)
        .saturating_add((orders.expand as u64).saturating_mul(EXPANSION_COST_PER_SILO))
        .saturating_add(orders.feed);
    if upfront > available {
        return Err(OrderError::InsufficientGrain {
            wanted: upfront,
            available,
        });
    }

    if orders.sell_acres > state.acres {
        return Err(OrderError::NotEnoughLand {
            wanted: orders.sell_acres,
            owned: state.acres,
        });
    }
    if orders.sell_acres > 0 && state.depot.is_full() {
        return Err(OrderError::DepotFull);
    }

    let owned = (state.acres - orders.sell_acres).saturating_add(orders.buy_acres);
    let planted = orders.planted_acres();
    if planted > owned {
        return Err(OrderError::NotEnoughLand {
            wanted: planted,
            owned,
        });
    }
    let workable = state.residents.saturating_mul(config.acres_per_resident);
    if planted > workable {
        return Err(OrderError::NotEnoughResidents {
            wanted: planted,
            workable,
            residents: state.residents,
        });
    }

    for grain in GrainType::ALL {
        let wanted = orders.seed_needed(grain, config);
        let in_stock = state.depot.fill_level(grain);
        if wanted > in_stock {
            return Err(OrderError::InsufficientSeed {
                grain,
                wanted,
                available: in_stock,
            });
        }
    }
    Ok(())
}

/// Runs one year. On error the city is left exactly as it was.
pub fn run_turn(
    state: &mut CityState,
    orders: &TurnOrders,
    config: &GameConfig,
    rng: &mut impl Rng,
) -> Result<TurnReport, OrderError> {
    validate_orders(state, orders, config)?;
    let mut next = state.clone();

    let mut grain_lost = trade_land(&mut next, orders)?;
    let expansion_paid = if orders.expand > 0 {
        next.depot.expand(orders.expand, config.silo_capacity)?
    } else {
        0
    };
    let fed = feed_and_plant(&mut next, orders, config)?;
    let population = update_population(&mut next, fed, config, rng);
    let (harvested, harvest_lost) = bring_in_harvest(&mut next, orders, config, rng)?;
    grain_lost += harvest_lost;

    // --- Rats and spoilage ---
    let stock = next.depot.total_fill_level();
    let eaten_by_rats = if stock > 0 {
        let most = stock.saturating_mul(config.max_rat_infestation_pct) / 100;
        next.depot.withdraw(rng.gen_range(0..=most))
    } else {
        0
    };
    let decayed = next.depot.decay(next.year);

    next.year += 1;
    let report = TurnReport {
        year: next.year,
        fed,
        starved: population.starved,
        starved_pct: population.starved_pct,
        immigrants: population.immigrants,
        residents: next.residents,
        acres: next.acres,
        harvested,
        grain_lost,
        eaten_by_rats,
        decayed,
        expansion_paid,
        bushels: next.depot.fill_by_grain().into_iter().collect(),
        total_capacity: next.depot.total_capacity(),
        free_capacity: next.depot.free_capacity(),
    };
    info!(
        city = %next.id,
        year = report.year,
        residents = report.residents,
        starved = report.starved,
        harvested = report.total_harvested(),
        rats = eaten_by_rats,
        decayed,
        bushels = report.total_bushels(),
        "turn complete"
    );
    *state = next;
    Ok(report)
}

// ---------------------------------------------------------------------------
// Turn steps
// ---------------------------------------------------------------------------

/// Buys, then sells, land for grain. Returns sale proceeds the depot dropped.
fn trade_land(next: &mut CityState, orders: &TurnOrders) -> Result<u64, OrderError> {
    if orders.buy_acres > 0 {
        next.depot.withdraw(orders.acre_price * orders.buy_acres);
        next.acres += orders.buy_acres;
    }
    let mut lost = 0;
    if orders.sell_acres > 0 {
        next.acres -= orders.sell_acres;
        let proceeds = orders.acre_price.saturating_mul(orders.sell_acres);
        for harvest in equally_distributed(proceeds, next.year) {
            lost += store_counting_loss(next, harvest)?;
        }
    }
    Ok(lost)
}

/// Feeds from all silos fairly, then takes seed per grain. Returns bushels fed.
fn feed_and_plant(
    next: &mut CityState,
    orders: &TurnOrders,
    config: &GameConfig,
) -> Result<u64, OrderError> {
    let fed = next.depot.withdraw(orders.feed);
    for grain in GrainType::ALL {
        let wanted = orders.seed_needed(grain, config);
        if wanted == 0 {
            continue;
        }
        let available = next.depot.fill_level(grain);
        if wanted > available {
            return Err(OrderError::InsufficientSeed {
                grain,
                wanted,
                available,
            });
        }
        next.depot.withdraw_grain(wanted, grain);
    }
    Ok(fed)
}

struct PopulationChange {
    starved: u64,
    starved_pct: u64,
    immigrants: u64,
}

fn update_population(
    next: &mut CityState,
    fed: u64,
    config: &GameConfig,
    rng: &mut impl Rng,
) -> PopulationChange {
    let fed_residents = fed / config.bushels_per_resident;
    let starved = next.residents.saturating_sub(fed_residents);
    let starved_pct = if next.residents == 0 {
        0
    } else {
        starved * 100 / next.residents
    };
    // Newcomers are a share of the population before the starved are removed.
    let immigrants = if starved_pct < config.immigration_starvation_cutoff_pct {
        next.residents * rng.gen_range(0..=config.max_immigration_pct) / 100
    } else {
        0
    };
    next.residents = next.residents - starved + immigrants;
    PopulationChange {
        starved,
        starved_pct,
        immigrants,
    }
}

/// Yields every planted field and stores the grain dated to the current year.
fn bring_in_harvest(
    next: &mut CityState,
    orders: &TurnOrders,
    config: &GameConfig,
    rng: &mut impl Rng,
) -> Result<(BTreeMap<GrainType, u64>, u64), StorageError> {
    let mut harvested = BTreeMap::new();
    let mut lost = 0;
    for grain in GrainType::ALL {
        let acres = orders.plant.get(&grain).copied().unwrap_or(0);
        let range = config.yield_range(grain);
        let amount = acres.saturating_mul(rng.gen_range(range.min..=range.max));
        harvested.insert(grain, amount);
        let harvest = Harvest::new(grain, amount, next.year);
        lost += store_counting_loss(next, harvest)?;
    }
    Ok((harvested, lost))
}

/// Stores `harvest` and returns how much of it the depot dropped.
fn store_counting_loss(state: &mut CityState, harvest: Harvest) -> Result<u64, StorageError> {
    let offered = harvest.amount();
    let before = state.depot.total_fill_level();
    if state.depot.store(harvest)? {
        return Ok(0);
    }
    let lost = offered - (state.depot.total_fill_level() - before);
    debug!(city = %state.id, lost, "depot overflowed");
    Ok(lost)
}

/// Splits `amount` over every grain type; leftover bushels go to the first
/// grains in order.
pub fn equally_distributed(amount: u64, year: u32) -> Vec<Harvest> {
    let count = GrainType::ALL.len() as u64;
    let share = amount / count;
    let mut remainder = amount % count;
    GrainType::ALL
        .into_iter()
        .map(|grain| {
            let mut bushels = share;
            if remainder > 0 {
                bushels += 1;
                remainder -= 1;
            }
            Harvest::new(grain, bushels, year)
        })
        .collect()
}

/// A cautious steward: feeds everyone the stock allows, then sows each grain
/// as far as the remaining seed and land go.
pub fn autopilot_orders(state: &CityState, config: &GameConfig) -> TurnOrders {
    let mut projected = state.depot.clone();
    let stock = projected.total_fill_level();

    // Build a silo when the depot is nearly full and the stock can pay for it.
    let nearly_full = projected.free_capacity() < config.silo_capacity;
    let expand = usize::from(nearly_full && stock > EXPANSION_COST_PER_SILO * 2);
    if expand > 0 && projected.expand(expand, config.silo_capacity).is_err() {
        return TurnOrders::default();
    }

    let feed = state
        .residents
        .saturating_mul(config.bushels_per_resident)
        .min(projected.total_fill_level());
    projected.withdraw(feed);

    let mut land = state.acres;
    let mut labour = state.residents.saturating_mul(config.acres_per_resident);
    let mut plant = BTreeMap::new();
    for grain in GrainType::ALL {
        let by_seed = if config.bushels_per_acre == 0 {
            land
        } else {
            projected.fill_level(grain) / config.bushels_per_acre
        };
        let acres = by_seed.min(land).min(labour);
        if acres > 0 {
            plant.insert(grain, acres);
            land -= acres;
            labour -= acres;
        }
    }

    TurnOrders {
        feed,
        plant,
        expand,
        ..TurnOrders::default()
    }
}
