//! Read-only filter/sort/render view over silo statuses for operators.

use std::fmt::Write as _;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{Depot, GrainType, OrderedList, SiloStatus};

/// Width of the fill bar, in characters.
const FILL_BAR_WIDTH: u64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SiloFilter {
    #[default]
    All,
    Grain(GrainType),
    MinFill(u64),
    MaxFill(u64),
}

impl SiloFilter {
    pub fn matches(&self, status: &SiloStatus) -> bool {
        match *self {
            SiloFilter::All => true,
            SiloFilter::Grain(grain) => status.grain_type == Some(grain),
            SiloFilter::MinFill(min) => status.fill_level >= min,
            SiloFilter::MaxFill(max) => status.fill_level <= max,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SiloOrder {
    /// Silo order as stored in the depot.
    #[default]
    Unordered,
    /// Empty silos first, then by grain type.
    Grain,
    FillLevel,
    Capacity,
    /// Shuffled by the caller's rng.
    Random,
}

/// Filters and orders the statuses of every silo in `depot`.
pub fn inspect(
    depot: &Depot,
    filter: SiloFilter,
    order: SiloOrder,
    rng: &mut impl Rng,
) -> OrderedList<SiloStatus> {
    let mut statuses = depot.statuses().filter(|status| filter.matches(status));
    match order {
        SiloOrder::Unordered => {}
        SiloOrder::Grain => statuses.sort_by_key(|status| status.grain_type),
        SiloOrder::FillLevel => statuses.sort_by_key(|status| status.fill_level),
        SiloOrder::Capacity => statuses.sort_by_key(|status| status.capacity),
        SiloOrder::Random => {
            let mut keyed: OrderedList<(u32, SiloStatus)> =
                statuses.into_iter().map(|status| (rng.gen(), status)).collect();
            keyed.sort_by_key(|&(key, _)| key);
            statuses = keyed.into_iter().map(|(_, status)| status).collect();
        }
    }
    statuses
}

/// Text visualisation: one block per silo with a fill bar.
pub fn render_statuses(statuses: &OrderedList<SiloStatus>) -> String {
    let mut out = String::new();
    for (index, status) in statuses.iter().enumerate() {
        let grain = status
            .grain_type
            .map_or_else(|| "EMPTY".to_string(), |grain| grain.to_string());
        let filled = if status.capacity == 0 {
            0
        } else {
            (status.fill_level.saturating_mul(FILL_BAR_WIDTH) / status.capacity).min(FILL_BAR_WIDTH)
        };
        let bar: String = (0..FILL_BAR_WIDTH)
            .map(|i| if i < filled { '=' } else { '-' })
            .collect();

        let _ = writeln!(out, "Silo {}: {grain}", index + 1);
        let _ = writeln!(out, "Amount of Grain: {} units", status.fill_level);
        let _ = writeln!(out, "|{bar}| {:.2}% filled", status.fill_percentage());
        let _ = writeln!(out, "Capacity: {} units", status.capacity);
        out.push('\n');
    }
    out
}
