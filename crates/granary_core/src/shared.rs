use std::sync::Arc;

use parking_lot::Mutex;

use crate::{Depot, DepotSnapshot, GrainType, Harvest, OrderedList, SiloStatus, StorageError};

/// A depot shared between threads.
///
/// Store and withdraw scan several silos per call, so every operation runs
/// under one lock per depot. Reads hand back copies.
#[derive(Debug, Clone, Default)]
pub struct SharedDepot {
    inner: Arc<Mutex<Depot>>,
}

impl SharedDepot {
    pub fn new(depot: Depot) -> Self {
        Self {
            inner: Arc::new(Mutex::new(depot)),
        }
    }

    pub fn store(&self, harvest: Harvest) -> Result<bool, StorageError> {
        self.inner.lock().store(harvest)
    }

    pub fn withdraw(&self, amount: u64) -> u64 {
        self.inner.lock().withdraw(amount)
    }

    pub fn withdraw_grain(&self, amount: u64, grain: GrainType) -> u64 {
        self.inner.lock().withdraw_grain(amount, grain)
    }

    pub fn decay(&self, current_year: u32) -> u64 {
        self.inner.lock().decay(current_year)
    }

    pub fn expand(&self, silo_count: usize, capacity_per_silo: u64) -> Result<u64, StorageError> {
        self.inner.lock().expand(silo_count, capacity_per_silo)
    }

    pub fn defragment(&self) -> Result<bool, StorageError> {
        self.inner.lock().defragment()
    }

    pub fn total_fill_level(&self) -> u64 {
        self.inner.lock().total_fill_level()
    }

    pub fn statuses(&self) -> OrderedList<SiloStatus> {
        self.inner.lock().statuses()
    }

    pub fn snapshot(&self) -> DepotSnapshot {
        self.inner.lock().snapshot()
    }

    /// Runs `f` with exclusive access, for multi-step sequences that must not
    /// interleave with other callers.
    pub fn with<R>(&self, f: impl FnOnce(&mut Depot) -> R) -> R {
        f(&mut self.inner.lock())
    }
}
