//! `granary_core`: capacity-bounded grain storage for one city.
//!
//! No IO. All randomness via the passed-in Rng.

mod depot;
mod error;
mod harvest;
pub mod inspect;
pub mod list;
mod shared;
mod silo;
mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod test_fixtures;

pub use depot::{Depot, SiloStatusCursor, EXPANSION_COST_PER_SILO};
pub use error::{ParseGrainTypeError, StorageError};
pub use harvest::{DecayPolicy, Harvest};
pub use inspect::{inspect, render_statuses, SiloFilter, SiloOrder};
pub use list::{CursorMut, OrderedList};
pub use shared::SharedDepot;
pub use silo::{DetachedHarvests, Silo};
pub use types::*;

#[cfg(test)]
mod tests;
