use super::*;
use crate::test_fixtures::{base_depot, harvest, make_rng, mixed_depot};

mod inspect;
mod withdraw;

// --- Shared test helpers ------------------------------------------------

/// Fill levels of every silo, in depot order.
fn fills(depot: &Depot) -> Vec<u64> {
    depot.silos().iter().map(Silo::fill_level).collect()
}

fn grains(depot: &Depot) -> Vec<Option<GrainType>> {
    depot.silos().iter().map(Silo::grain_type).collect()
}

fn list_of(values: &[i32]) -> OrderedList<i32> {
    values.iter().copied().collect()
}

fn to_vec<T: Clone>(list: &OrderedList<T>) -> Vec<T> {
    list.iter().cloned().collect()
}

/// Builds a depot straight from a persisted layout, bypassing store routing.
fn depot_from_layout(layout: Vec<(u64, Vec<Harvest>)>) -> Depot {
    let snapshot = DepotSnapshot {
        silos: layout
            .into_iter()
            .map(|(capacity, harvests)| SiloSnapshot { capacity, harvests })
            .collect(),
    };
    Depot::try_from(snapshot).unwrap()
}
