use std::fmt;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::inspect::render_statuses;
use crate::silo::DetachedHarvests;
use crate::{DepotSnapshot, GrainType, Harvest, OrderedList, Silo, SiloStatus, StorageError};

/// Grain withdrawn per silo added by [`Depot::expand`].
pub const EXPANSION_COST_PER_SILO: u64 = 100;

/// All silos of one city.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "DepotSnapshot", into = "DepotSnapshot")]
pub struct Depot {
    silos: OrderedList<Silo>,
}

impl Depot {
    pub fn new(silo_count: usize, capacity_per_silo: u64) -> Result<Self, StorageError> {
        let mut depot = Depot::default();
        depot.append_silos(silo_count, capacity_per_silo)?;
        Ok(depot)
    }

    pub fn from_silos(silos: impl IntoIterator<Item = Silo>) -> Self {
        Self {
            silos: silos.into_iter().collect(),
        }
    }

    pub fn snapshot(&self) -> DepotSnapshot {
        DepotSnapshot {
            silos: self.silos.iter().map(Silo::snapshot).collect(),
        }
    }

    pub fn silos(&self) -> &OrderedList<Silo> {
        &self.silos
    }

    pub fn silo_count(&self) -> usize {
        self.silos.len()
    }

    // -----------------------------------------------------------------------
    // Storing
    // -----------------------------------------------------------------------

    /// Places `harvest` across compatible silos.
    ///
    /// If one pass leaves a remainder the depot is defragmented and scanned
    /// once more. Returns `false` when grain still could not be placed; that
    /// remainder is dropped.
    pub fn store(&mut self, harvest: Harvest) -> Result<bool, StorageError> {
        if harvest.is_spent() {
            return Ok(true);
        }
        let Some(rest) = place(&mut self.silos, harvest)? else {
            return Ok(true);
        };

        debug!(
            grain = %rest.grain(),
            remaining = rest.amount(),
            "store pass left a remainder, defragmenting"
        );
        self.defragment()?;

        match place(&mut self.silos, rest)? {
            None => Ok(true),
            Some(lost) => {
                warn!(
                    grain = %lost.grain(),
                    amount = lost.amount(),
                    "depot could not absorb harvest"
                );
                Ok(false)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Withdrawing
    // -----------------------------------------------------------------------

    /// Drains silos holding `grain`, in silo order, until `amount` is met.
    pub fn withdraw_grain(&mut self, amount: u64, grain: GrainType) -> u64 {
        let mut taken = 0;
        let mut cursor = self.silos.cursor_mut();
        while taken < amount {
            let Some(silo) = cursor.next() else {
                break;
            };
            if silo.grain_type() == Some(grain) {
                taken += silo.withdraw(amount - taken);
            }
        }
        taken
    }

    /// Takes `amount` without regard to grain type, spread fairly over silos.
    ///
    /// Every silo first owes an equal share. Silos that cannot cover it are
    /// emptied and their shortfall joins the remainder, which is then
    /// collected one unit per stocked silo per round-robin pass.
    pub fn withdraw(&mut self, amount: u64) -> u64 {
        let total = self.total_fill_level();
        if amount >= total {
            self.silos.for_each_mut(|silo| {
                silo.empty();
            });
            return total;
        }

        let silo_count = self.silos.len() as u64;
        let share = amount / silo_count;
        let mut remainder = amount % silo_count;
        let mut taken = 0;
        self.silos.for_each_mut(|silo| {
            if silo.fill_level() < share {
                remainder += share - silo.fill_level();
                taken += silo.fill_level();
                silo.empty();
            } else {
                taken += silo.withdraw(share);
            }
        });

        taken + self.collect_round_robin(remainder)
    }

    /// Round-robin collection of `remainder` single units from stocked silos,
    /// starting each pass at the first silo.
    ///
    /// Whole passes that cannot empty any silo are taken in one step.
    fn collect_round_robin(&mut self, mut remainder: u64) -> u64 {
        let mut taken = 0;
        while remainder > 0 {
            let stocked: Vec<u64> = self
                .silos
                .iter()
                .map(Silo::fill_level)
                .filter(|&fill| fill > 0)
                .collect();
            let Some(&smallest) = stocked.iter().min() else {
                break;
            };
            let stocked_count = stocked.len() as u64;

            let full_passes = (remainder / stocked_count).min(smallest);
            if full_passes > 0 {
                self.silos.for_each_mut(|silo| {
                    if silo.fill_level() > 0 {
                        taken += silo.withdraw(full_passes);
                    }
                });
                remainder -= full_passes * stocked_count;
                continue;
            }

            // Fewer units left than stocked silos: one partial pass finishes.
            self.silos.for_each_mut(|silo| {
                if remainder > 0 && silo.fill_level() > 0 {
                    let unit = silo.withdraw(1);
                    taken += unit;
                    remainder -= unit;
                }
            });
        }
        taken
    }

    // -----------------------------------------------------------------------
    // Maintenance
    // -----------------------------------------------------------------------

    /// Adds empty silos and pays for them out of existing stock.
    ///
    /// Returns the grain actually withdrawn as payment.
    pub fn expand(
        &mut self,
        silo_count: usize,
        capacity_per_silo: u64,
    ) -> Result<u64, StorageError> {
        self.append_silos(silo_count, capacity_per_silo)?;
        let cost = silo_count as u64 * EXPANSION_COST_PER_SILO;
        let paid = self.withdraw(cost);
        debug!(silo_count, capacity_per_silo, cost, paid, "depot expanded");
        Ok(paid)
    }

    /// Spoils every lot as of `current_year`. Returns the total lost.
    pub fn decay(&mut self, current_year: u32) -> u64 {
        let mut decayed = 0;
        self.silos.for_each_mut(|silo| decayed += silo.decay(current_year));
        decayed
    }

    /// Coalesces scattered lots of the same grain into as few silos as the
    /// store rules allow, freeing whole silos for other grains.
    ///
    /// The new layout is only committed when every lot fits; otherwise the
    /// depot is left exactly as it was. Returns whether the layout changed.
    pub fn defragment(&mut self) -> Result<bool, StorageError> {
        let mut rebuilt: OrderedList<Silo> = OrderedList::new();
        let mut detached: Vec<DetachedHarvests> = Vec::new();
        for silo in &self.silos {
            rebuilt.push_back(Silo::new(silo.capacity())?);
        }
        let mut scratch = self.silos.clone();
        scratch.for_each_mut(|silo| {
            if let Some(harvests) = silo.empty() {
                detached.push(harvests);
            }
        });

        for harvest in group_by_grain(detached) {
            if let Some(rest) = place(&mut rebuilt, harvest)? {
                debug!(
                    grain = %rest.grain(),
                    amount = rest.amount(),
                    "defragmented layout cannot hold all stock, keeping current layout"
                );
                return Ok(false);
            }
        }

        self.silos = rebuilt;
        Ok(true)
    }

    fn append_silos(
        &mut self,
        silo_count: usize,
        capacity_per_silo: u64,
    ) -> Result<(), StorageError> {
        for _ in 0..silo_count {
            self.silos.push_back(Silo::new(capacity_per_silo)?);
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Aggregates
    // -----------------------------------------------------------------------

    /// Grain held in silos bound to `grain` (empty silos contribute zero).
    pub fn fill_level(&self, grain: GrainType) -> u64 {
        self.silo_statuses(grain).map(|status| status.fill_level).sum()
    }

    /// Capacity available to `grain`: silos bound to it plus empty silos.
    pub fn capacity(&self, grain: GrainType) -> u64 {
        self.silo_statuses(grain).map(|status| status.capacity).sum()
    }

    pub fn total_fill_level(&self) -> u64 {
        self.silos.iter().map(Silo::fill_level).sum()
    }

    pub fn total_capacity(&self) -> u64 {
        self.silos.iter().map(Silo::capacity).sum()
    }

    pub fn free_capacity(&self) -> u64 {
        self.total_capacity() - self.total_fill_level()
    }

    pub fn is_full(&self) -> bool {
        self.total_fill_level() >= self.total_capacity()
    }

    /// Stored amount per grain type; every grain type has an entry.
    pub fn fill_by_grain(&self) -> AHashMap<GrainType, u64> {
        let mut totals: AHashMap<GrainType, u64> =
            GrainType::ALL.into_iter().map(|grain| (grain, 0)).collect();
        for silo in &self.silos {
            if let Some(grain) = silo.grain_type() {
                *totals.entry(grain).or_default() += silo.fill_level();
            }
        }
        totals
    }

    pub fn statuses(&self) -> OrderedList<SiloStatus> {
        self.silos.iter().map(Silo::status).collect()
    }

    /// Statuses of the silos bound to `grain` or empty, in silo order.
    pub fn silo_statuses(&self, grain: GrainType) -> SiloStatusCursor<'_> {
        SiloStatusCursor {
            silos: self.silos.iter(),
            grain,
            peeked: None,
        }
    }
}

impl TryFrom<DepotSnapshot> for Depot {
    type Error = StorageError;

    fn try_from(snapshot: DepotSnapshot) -> Result<Self, Self::Error> {
        let silos = snapshot
            .silos
            .iter()
            .map(Silo::from_snapshot)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Depot::from_silos(silos))
    }
}

impl From<Depot> for DepotSnapshot {
    fn from(depot: Depot) -> Self {
        depot.snapshot()
    }
}

/// Renders every silo, least filled first. The live silo order is untouched.
impl fmt::Display for Depot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut silos = self.silos.clone();
        silos.sort_by(Silo::by_fill_level);
        let statuses: OrderedList<SiloStatus> = silos.iter().map(Silo::status).collect();
        f.write_str(&render_statuses(&statuses))
    }
}

/// One placement pass over `silos`. Returns what did not fit.
fn place(
    silos: &mut OrderedList<Silo>,
    harvest: Harvest,
) -> Result<Option<Harvest>, StorageError> {
    let mut pending = harvest;
    let mut cursor = silos.cursor_mut();
    while let Some(silo) = cursor.next() {
        if !silo.accepts(pending.grain()) {
            continue;
        }
        match silo.store(pending)? {
            None => return Ok(None),
            Some(rest) => pending = rest,
        }
    }
    Ok(Some(pending))
}

/// Flattens detached lots, grouping grains by first appearance and keeping
/// lot order within each grain.
fn group_by_grain(detached: Vec<DetachedHarvests>) -> Vec<Harvest> {
    let mut order: Vec<GrainType> = Vec::new();
    let mut groups: AHashMap<GrainType, Vec<Harvest>> = AHashMap::new();
    for harvest in detached.into_iter().flatten() {
        let grain = harvest.grain();
        if !order.contains(&grain) {
            order.push(grain);
        }
        groups.entry(grain).or_default().push(harvest);
    }
    order
        .into_iter()
        .flat_map(|grain| groups.remove(&grain).unwrap_or_default())
        .collect()
}

// ---------------------------------------------------------------------------
// Status cursor
// ---------------------------------------------------------------------------

/// Single-pass traversal over the silos that may hold a given grain.
pub struct SiloStatusCursor<'a> {
    silos: crate::list::Iter<'a, Silo>,
    grain: GrainType,
    peeked: Option<SiloStatus>,
}

impl SiloStatusCursor<'_> {
    pub fn has_next(&mut self) -> bool {
        if self.peeked.is_none() {
            self.peeked = self.advance();
        }
        self.peeked.is_some()
    }

    pub fn try_next(&mut self) -> Result<SiloStatus, StorageError> {
        self.next().ok_or(StorageError::NoSuchElement)
    }

    fn advance(&mut self) -> Option<SiloStatus> {
        let grain = self.grain;
        self.silos
            .by_ref()
            .find(|silo| silo.accepts(grain))
            .map(Silo::status)
    }
}

impl Iterator for SiloStatusCursor<'_> {
    type Item = SiloStatus;

    fn next(&mut self) -> Option<Self::Item> {
        self.peeked.take().or_else(|| self.advance())
    }
}
