//! Per-run output under `runs/<run_id>/`: run metadata and one CSV row per turn.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use granary_core::GrainType;
use granary_world::{CityState, TurnReport};
use serde::Serialize;

pub fn generate_run_id(seed: u64) -> String {
    let now = chrono::Utc::now();
    format!("{}_seed{seed}", now.format("%Y%m%d_%H%M%S"))
}

pub fn create_run_dir(root: &Path, run_id: &str) -> Result<PathBuf> {
    let dir = root.join(run_id);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating run directory: {}", dir.display()))?;
    Ok(dir)
}

pub fn write_run_info(dir: &Path, run_id: &str, city: &CityState, turns: u32) -> Result<()> {
    let info = serde_json::json!({
        "run_id": run_id,
        "seed": city.seed,
        "city_id": city.id.to_string(),
        "city_name": city.name,
        "start_year": city.year,
        "start_time": chrono::Utc::now().to_rfc3339(),
        "runner": "granary_cli",
        "args": {
            "turns": turns,
        }
    });
    let path = dir.join("run_info.json");
    let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(file, &info)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// One `turns.csv` row. Per-grain stock is flattened into columns.
#[derive(Debug, Serialize)]
struct TurnRow {
    year: u32,
    residents: u64,
    starved: u64,
    immigrants: u64,
    acres: u64,
    fed: u64,
    harvested: u64,
    grain_lost: u64,
    eaten_by_rats: u64,
    decayed: u64,
    expansion_paid: u64,
    total_capacity: u64,
    free_capacity: u64,
    barley: u64,
    corn: u64,
    millet: u64,
    rice: u64,
    rye: u64,
    wheat: u64,
}

impl From<&TurnReport> for TurnRow {
    fn from(report: &TurnReport) -> Self {
        let stock = |grain: GrainType| report.bushels.get(&grain).copied().unwrap_or(0);
        Self {
            year: report.year,
            residents: report.residents,
            starved: report.starved,
            immigrants: report.immigrants,
            acres: report.acres,
            fed: report.fed,
            harvested: report.total_harvested(),
            grain_lost: report.grain_lost,
            eaten_by_rats: report.eaten_by_rats,
            decayed: report.decayed,
            expansion_paid: report.expansion_paid,
            total_capacity: report.total_capacity,
            free_capacity: report.free_capacity,
            barley: stock(GrainType::Barley),
            corn: stock(GrainType::Corn),
            millet: stock(GrainType::Millet),
            rice: stock(GrainType::Rice),
            rye: stock(GrainType::Rye),
            wheat: stock(GrainType::Wheat),
        }
    }
}

pub struct TurnLog {
    writer: csv::Writer<File>,
}

impl TurnLog {
    /// Creates `turns.csv` in `dir`. The header is written with the first row.
    pub fn create(dir: &Path) -> Result<Self> {
        let path = dir.join("turns.csv");
        let writer = csv::Writer::from_path(&path)
            .with_context(|| format!("creating {}", path.display()))?;
        Ok(Self { writer })
    }

    pub fn write(&mut self, report: &TurnReport) -> Result<()> {
        self.writer
            .serialize(TurnRow::from(report))
            .context("writing turn row")?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().context("flushing turns.csv")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn report(year: u32) -> TurnReport {
        TurnReport {
            year,
            fed: 100,
            starved: 0,
            starved_pct: 0,
            immigrants: 3,
            residents: 10,
            acres: 50,
            harvested: BTreeMap::from([(GrainType::Corn, 40), (GrainType::Rye, 2)]),
            grain_lost: 0,
            eaten_by_rats: 5,
            decayed: 1,
            expansion_paid: 0,
            bushels: BTreeMap::from([(GrainType::Corn, 700)]),
            total_capacity: 6_000,
            free_capacity: 5_300,
        }
    }

    #[test]
    fn turn_log_writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = TurnLog::create(dir.path()).unwrap();
        log.write(&report(1)).unwrap();
        log.write(&report(2)).unwrap();
        log.flush().unwrap();

        let text = std::fs::read_to_string(dir.path().join("turns.csv")).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("year,residents,starved"));
        assert!(lines[0].ends_with("rye,wheat"));
        assert!(lines[1].starts_with("1,10,0,3,50,100,42,"));
        assert!(lines[2].starts_with("2,"));
    }

    #[test]
    fn run_id_carries_seed() {
        let id = generate_run_id(17);
        assert!(id.ends_with("_seed17"));
        assert_eq!(id.split('_').count(), 3);
    }
}
