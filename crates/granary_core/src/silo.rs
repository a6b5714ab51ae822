use std::cmp::Ordering;

use smallvec::SmallVec;

use crate::{GrainType, Harvest, OrderedList, SiloSnapshot, SiloStatus, StorageError};

/// Lots detached from a silo in one go.
pub type DetachedHarvests = SmallVec<[Harvest; 4]>;

/// A fixed-capacity store for one grain type at a time.
///
/// The grain binding is taken from the first lot stored after the silo was
/// last emptied and lasts until the stock runs out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Silo {
    capacity: u64,
    fill_level: u64,
    stock: OrderedList<Harvest>,
}

impl Silo {
    pub fn new(capacity: u64) -> Result<Self, StorageError> {
        if capacity == 0 {
            return Err(StorageError::InvalidArgument(
                "silo capacity must be positive".to_string(),
            ));
        }
        Ok(Self {
            capacity,
            fill_level: 0,
            stock: OrderedList::new(),
        })
    }

    /// Rebuilds a silo from persisted lots, checking every silo invariant.
    pub fn from_snapshot(snapshot: &SiloSnapshot) -> Result<Self, StorageError> {
        let mut silo = Silo::new(snapshot.capacity)
            .map_err(|err| StorageError::InvalidSnapshot(err.to_string()))?;
        for harvest in &snapshot.harvests {
            if harvest.is_spent() {
                return Err(StorageError::InvalidSnapshot(
                    "silo contains an empty harvest".to_string(),
                ));
            }
            if harvest.amount() > silo.free_capacity() {
                return Err(StorageError::InvalidSnapshot(format!(
                    "harvests exceed silo capacity {}",
                    silo.capacity
                )));
            }
            silo.store(harvest.clone())
                .map_err(|err| StorageError::InvalidSnapshot(err.to_string()))?;
        }
        Ok(silo)
    }

    pub fn snapshot(&self) -> SiloSnapshot {
        SiloSnapshot {
            capacity: self.capacity,
            harvests: self.stock.iter().cloned().collect(),
        }
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn fill_level(&self) -> u64 {
        self.fill_level
    }

    pub fn free_capacity(&self) -> u64 {
        self.capacity - self.fill_level
    }

    pub fn is_empty(&self) -> bool {
        self.stock.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.fill_level >= self.capacity
    }

    pub fn grain_type(&self) -> Option<GrainType> {
        self.stock.first().map(Harvest::grain)
    }

    /// True if a harvest of `grain` may be routed here.
    pub fn accepts(&self, grain: GrainType) -> bool {
        self.grain_type().map_or(true, |held| held == grain)
    }

    pub fn harvest_count(&self) -> usize {
        self.stock.len()
    }

    pub fn harvests(&self) -> &OrderedList<Harvest> {
        &self.stock
    }

    pub fn status(&self) -> SiloStatus {
        SiloStatus {
            capacity: self.capacity,
            fill_level: self.fill_level,
            grain_type: self.grain_type(),
        }
    }

    /// Absorbs as much of `harvest` as fits and hands back the rest.
    pub fn store(&mut self, mut harvest: Harvest) -> Result<Option<Harvest>, StorageError> {
        if let Some(held) = self.grain_type() {
            if held != harvest.grain() {
                return Err(StorageError::GrainTypeMismatch {
                    held,
                    offered: harvest.grain(),
                });
            }
        }
        if harvest.is_spent() {
            return Ok(None);
        }
        if self.is_full() {
            return Ok(Some(harvest));
        }

        let room = self.free_capacity();
        if harvest.amount() <= room {
            self.fill_level += harvest.amount();
            self.stock.push_back(harvest);
            return Ok(None);
        }

        let stored = harvest.split(room)?;
        self.fill_level += stored.amount();
        self.stock.push_back(stored);
        Ok(Some(harvest))
    }

    /// Takes up to `amount` units, soonest-to-spoil lots first.
    pub fn withdraw(&mut self, amount: u64) -> u64 {
        if amount == 0 || self.stock.is_empty() {
            return 0;
        }
        self.stock.sort_by_key(Harvest::durability);

        let mut taken = 0;
        let mut cursor = self.stock.cursor_mut();
        while taken < amount {
            let Some(harvest) = cursor.next() else {
                break;
            };
            taken += harvest.consume(amount - taken);
            if harvest.is_spent() && cursor.remove().is_err() {
                break;
            }
        }
        self.fill_level -= taken;
        taken
    }

    /// Spoils every lot as of `current_year` and drops lots that rot away.
    pub fn decay(&mut self, current_year: u32) -> u64 {
        let mut decayed = 0;
        self.stock.for_each_mut(|harvest| decayed += harvest.decay(current_year));
        self.stock.remove_if(Harvest::is_spent);
        self.fill_level -= decayed;
        decayed
    }

    /// Detaches every lot, leaving the silo empty and unbound.
    pub fn empty(&mut self) -> Option<DetachedHarvests> {
        if self.stock.is_empty() {
            return None;
        }
        let stock = std::mem::take(&mut self.stock);
        self.fill_level = 0;
        Some(stock.into_iter().collect())
    }

    /// Display ordering: ascending fill level.
    pub fn by_fill_level(a: &Silo, b: &Silo) -> Ordering {
        a.fill_level.cmp(&b.fill_level)
    }
}
