//! Integration test: shipped config loads, and cities survive a save/load cycle.

use granary_core::test_fixtures::make_rng;
use granary_core::GrainType;
use granary_world::{
    autopilot_orders, found_city, load_config, load_state, run_turn, save_state, GameConfig,
};

/// Integration tests run from the crate directory, so go up two levels.
fn config_dir() -> String {
    let manifest = std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");
    format!("{manifest}/../../content")
}

fn shipped_config() -> GameConfig {
    load_config(&config_dir()).expect("load_config should succeed for the shipped config")
}

#[test]
fn shipped_config_loads() {
    let config = shipped_config();
    for grain in GrainType::ALL {
        let range = config.yield_range(grain);
        assert!(range.max > 0, "grain '{grain}' never yields");
    }
}

#[test]
fn missing_config_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_config(dir.path().to_str().unwrap()).unwrap_err();
    assert!(format!("{err:#}").contains("config.json"));
}

#[test]
fn city_round_trips_through_save_file() {
    let config = shipped_config();
    let mut rng = make_rng();
    let mut city = found_city(&config, "Roundtrip", 42, &mut rng).unwrap();
    for _ in 0..3 {
        let orders = autopilot_orders(&city, &config);
        let mut turn_rng = city.turn_rng();
        run_turn(&mut city, &orders, &config, &mut turn_rng).unwrap();
    }

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("saves").join("city.json");
    save_state(&path, &city).unwrap();
    let loaded = load_state(&path).unwrap();
    assert_eq!(loaded, city);

    let json = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let saved_at = value["saved_at"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(saved_at).is_ok());
}

#[test]
fn resumed_city_continues_deterministically() {
    let config = shipped_config();
    let mut city = found_city(&config, "Twin", 7, &mut make_rng()).unwrap();
    let mut twin = city.clone();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("twin.json");
    save_state(&path, &twin).unwrap();
    twin = load_state(&path).unwrap();

    for _ in 0..4 {
        let orders = autopilot_orders(&city, &config);
        let (mut rng_a, mut rng_b) = (city.turn_rng(), twin.turn_rng());
        let a = run_turn(&mut city, &orders, &config, &mut rng_a).unwrap();
        let b = run_turn(&mut twin, &orders, &config, &mut rng_b).unwrap();
        assert_eq!(a, b);
    }
}

#[test]
fn corrupted_depot_is_rejected_on_load() {
    let config = shipped_config();
    let city = found_city(&config, "Broken", 1, &mut make_rng()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    save_state(&path, &city).unwrap();

    let json = std::fs::read_to_string(&path).unwrap();
    let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
    value["state"]["depot"]["silos"][0]["harvests"][0]["amount"] = serde_json::json!(999_999);
    std::fs::write(&path, serde_json::to_string(&value).unwrap()).unwrap();

    let err = load_state(&path).unwrap_err();
    assert!(format!("{err:#}").contains("parsing save file"));
}
