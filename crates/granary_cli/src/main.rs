mod report;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use granary_core::{inspect, render_statuses, GrainType, SiloFilter, SiloOrder};
use granary_world::{
    autopilot_orders, found_city, load_config, load_state, run_turn, save_state, CityState,
    TurnReport,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

use crate::report::{create_run_dir, generate_run_id, write_run_info, TurnLog};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "granary_cli", about = "Codeopolis granary runner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run autopilot turns for one city.
    Run {
        #[arg(long)]
        turns: u32,
        /// Found a new city with this seed. Mutually exclusive with --state.
        #[arg(long, conflicts_with = "state_file")]
        seed: Option<u64>,
        /// Resume a city from a save file. Mutually exclusive with --seed.
        #[arg(long = "state", conflicts_with = "seed")]
        state_file: Option<PathBuf>,
        #[arg(long, default_value = "./content")]
        config_dir: String,
        #[arg(long, default_value = "Codeopolis")]
        name: String,
        /// Write the final city to this save file.
        #[arg(long)]
        save: Option<PathBuf>,
        /// Skip writing run_info.json and turns.csv under runs/.
        #[arg(long)]
        no_report: bool,
    },
    /// Print the silos of a saved city.
    Inspect {
        #[arg(long = "state")]
        state_file: PathBuf,
        /// Only silos holding this grain.
        #[arg(long, conflicts_with_all = ["min_fill", "max_fill"])]
        grain: Option<GrainType>,
        #[arg(long, conflicts_with = "max_fill")]
        min_fill: Option<u64>,
        #[arg(long)]
        max_fill: Option<u64>,
        #[arg(long, value_enum, default_value_t = SortKey::None)]
        sort: SortKey,
        /// Seed for --sort random.
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SortKey {
    None,
    Grain,
    Fill,
    Capacity,
    Random,
}

impl From<SortKey> for SiloOrder {
    fn from(key: SortKey) -> Self {
        match key {
            SortKey::None => SiloOrder::Unordered,
            SortKey::Grain => SiloOrder::Grain,
            SortKey::Fill => SiloOrder::FillLevel,
            SortKey::Capacity => SiloOrder::Capacity,
            SortKey::Random => SiloOrder::Random,
        }
    }
}

// ---------------------------------------------------------------------------
// Run loop
// ---------------------------------------------------------------------------

struct RunArgs {
    turns: u32,
    seed: Option<u64>,
    state_file: Option<PathBuf>,
    config_dir: String,
    name: String,
    save: Option<PathBuf>,
    no_report: bool,
}

fn run(args: RunArgs) -> Result<()> {
    let config = load_config(&args.config_dir)?;

    let mut city = if let Some(path) = &args.state_file {
        load_state(path)?
    } else {
        let seed = args.seed.unwrap_or_else(rand::random);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        found_city(&config, &args.name, seed, &mut rng).context("founding city")?
    };

    let mut turn_log = None;
    if !args.no_report {
        let run_id = generate_run_id(city.seed);
        let run_dir = create_run_dir(Path::new("runs"), &run_id)?;
        write_run_info(&run_dir, &run_id, &city, args.turns)?;
        turn_log = Some(TurnLog::create(&run_dir)?);
        println!("Run directory: {}", run_dir.display());
    }

    println!(
        "Starting city {} ({}): turns={} seed={} year={}",
        city.name, city.id, args.turns, city.seed, city.year,
    );
    println!("{}", "-".repeat(80));

    for _ in 0..args.turns {
        if city.is_extinct() {
            println!("*** {} has no residents left ***", city.name);
            break;
        }
        let orders = autopilot_orders(&city, &config);
        let mut rng = city.turn_rng();
        let report = run_turn(&mut city, &orders, &config, &mut rng)
            .with_context(|| format!("running year {}", city.year))?;
        print_status(&report);

        if let Some(log) = turn_log.as_mut() {
            log.write(&report)?;
        }
    }

    println!("{}", "-".repeat(80));
    println!("Done. Final depot in year {}:", city.year);
    print!("{}", city.depot);

    if let Some(log) = turn_log.as_mut() {
        log.flush()?;
    }
    if let Some(path) = &args.save {
        save_state(path, &city)?;
        println!("Saved to {}", path.display());
    }
    Ok(())
}

fn print_status(report: &TurnReport) {
    println!(
        "[year={year:03}]  residents={residents:5}  starved={starved:4}  \
         harvested={harvested:6}  rats={rats:5}  decayed={decayed:5}  \
         bushels={bushels:6}/{capacity}",
        year = report.year,
        residents = report.residents,
        starved = report.starved,
        harvested = report.total_harvested(),
        rats = report.eaten_by_rats,
        decayed = report.decayed,
        bushels = report.total_bushels(),
        capacity = report.total_capacity,
    );
}

// ---------------------------------------------------------------------------
// Inspection
// ---------------------------------------------------------------------------

fn inspect_city(city: &CityState, filter: SiloFilter, order: SiloOrder, seed: u64) -> String {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let statuses = inspect(&city.depot, filter, order, &mut rng);
    if statuses.is_empty() {
        return "No silos match.\n".to_string();
    }
    render_statuses(&statuses)
}

fn silo_filter(
    grain: Option<GrainType>,
    min_fill: Option<u64>,
    max_fill: Option<u64>,
) -> SiloFilter {
    match (grain, min_fill, max_fill) {
        (Some(grain), _, _) => SiloFilter::Grain(grain),
        (None, Some(min), _) => SiloFilter::MinFill(min),
        (None, None, Some(max)) => SiloFilter::MaxFill(max),
        (None, None, None) => SiloFilter::All,
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .init();
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            turns,
            seed,
            state_file,
            config_dir,
            name,
            save,
            no_report,
        } => run(RunArgs {
            turns,
            seed,
            state_file,
            config_dir,
            name,
            save,
            no_report,
        })?,
        Commands::Inspect {
            state_file,
            grain,
            min_fill,
            max_fill,
            sort,
            seed,
        } => {
            let city = load_state(&state_file)?;
            info!(city = %city.id, silos = city.depot.silo_count(), "inspecting depot");
            let filter = silo_filter(grain, min_fill, max_fill);
            print!("{}", inspect_city(&city, filter, sort.into(), seed));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use granary_core::{Depot, Harvest};
    use granary_world::CityId;

    fn city() -> CityState {
        let mut depot = Depot::new(3, 100).unwrap();
        depot.store(Harvest::new(GrainType::Rye, 80, 0)).unwrap();
        depot.store(Harvest::new(GrainType::Corn, 30, 0)).unwrap();
        CityState {
            id: CityId::generate(&mut ChaCha8Rng::seed_from_u64(1)),
            name: "Test".to_string(),
            seed: 1,
            year: 0,
            acres: 10,
            residents: 10,
            depot,
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn seed_and_state_conflict() {
        let parsed = Cli::try_parse_from([
            "granary_cli", "run", "--turns", "1", "--seed", "1", "--state", "x.json",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn grain_argument_parses_case_insensitively() {
        let parsed = Cli::try_parse_from([
            "granary_cli", "inspect", "--state", "x.json", "--grain", "rye", "--sort", "fill",
        ])
        .unwrap();
        let Commands::Inspect { grain, .. } = parsed.command else {
            panic!("expected inspect");
        };
        assert_eq!(grain, Some(GrainType::Rye));
    }

    #[test]
    fn negative_amounts_are_rejected_at_parse_time() {
        let parsed = Cli::try_parse_from([
            "granary_cli", "inspect", "--state", "x.json", "--min-fill", "-5",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn inspect_filters_and_sorts() {
        let city = city();
        let text = inspect_city(&city, SiloFilter::MinFill(1), SiloOrder::FillLevel, 0);
        assert!(text.starts_with("Silo 1: CORN\n"));
        assert!(text.contains("Silo 2: RYE"));
        assert!(!text.contains("EMPTY"));

        let wheat = SiloFilter::Grain(GrainType::Wheat);
        let none = inspect_city(&city, wheat, SiloOrder::Unordered, 0);
        assert_eq!(none, "No silos match.\n");
    }

    #[test]
    fn filter_prefers_grain() {
        assert_eq!(silo_filter(None, None, None), SiloFilter::All);
        assert_eq!(silo_filter(None, None, Some(4)), SiloFilter::MaxFill(4));
        assert_eq!(
            silo_filter(Some(GrainType::Corn), None, None),
            SiloFilter::Grain(GrainType::Corn)
        );
    }
}
