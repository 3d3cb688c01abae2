//! Crop Advisor Integration Tests
//!
//! Drives the public API end to end: config file → CSV dataset → profiles →
//! ranking, plus a short game session mutating cells and re-ranking them.

use approx::assert_relative_eq;
use crop_advisor::{
    ActionCatalog, ActionSpec, ActionTable, AttributeBounds, ClassificationReport, CropProfileStore,
    FarmError, GameConfig, GoldScale, HistoricalDataset, SoilAttribute, SoilCell,
    SuitabilityEngine,
};
use std::path::{Path, PathBuf};

fn fixture(relative: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join(relative)
}

fn load_config() -> GameConfig {
    GameConfig::load(&fixture("config/game.json")).expect("Failed to load config")
}

// =========================================================================
// Section 1: Dataset and profiles
// =========================================================================

#[test]
fn test_profiles_from_sample_dataset() {
    let config = load_config();
    let store = config.build_profiles().unwrap();

    assert_eq!(store.len(), 8);
    assert_eq!(store.labels().next(), Some("rice"));

    let rice = store.get("rice").unwrap();
    assert_relative_eq!(rice[SoilAttribute::N.query_index()], 77.25, epsilon = 1e-9);
    assert_relative_eq!(rice[SoilAttribute::P.query_index()], 47.5, epsilon = 1e-9);
    assert_relative_eq!(rice[SoilAttribute::Rainfall.query_index()], 234.10483875, epsilon = 1e-6);
}

#[test]
fn test_allow_listed_crop_missing_from_dataset() {
    let dataset =
        HistoricalDataset::load_csv(&fixture("data/crop_recommendation_sample.csv")).unwrap();
    let allowed = vec!["rice".to_string(), "mango".to_string()];

    let err = CropProfileStore::build(dataset.records(), &allowed).unwrap_err();
    assert_eq!(err, FarmError::EmptyDataset { label: "mango".to_string() });
}

#[test]
fn test_csv_missing_column() {
    let path = std::env::temp_dir()
        .join(format!("crop_advisor_missing_{}.csv", std::process::id()));
    let csv = "N,P,K,temperature,humidity,ph,label\n90,42,43,20.8,82.0,6.5,rice\n";
    std::fs::write(&path, csv).unwrap();

    let result = HistoricalDataset::load_csv(&path);
    let _ = std::fs::remove_file(&path);

    let err = result.unwrap_err();
    let typed = err
        .chain()
        .find_map(|e| e.downcast_ref::<FarmError>())
        .expect("typed error in chain");
    assert!(matches!(typed, FarmError::MissingColumn { column, .. } if column == "rainfall"));
}

#[test]
fn test_report_on_training_data() {
    let config = load_config();
    let dataset = HistoricalDataset::load_csv(&config.dataset_path).unwrap();
    let store = CropProfileStore::build(dataset.records(), &config.crops_used).unwrap();
    let engine = SuitabilityEngine::new(&store, config.gold_scale().unwrap());

    let report = ClassificationReport::evaluate(&engine, dataset.records()).unwrap();
    assert_eq!(report.total, 32);
    assert_eq!(report.labels.len(), 8);
    assert!(report.accuracy > 0.8, "accuracy {}", report.accuracy);
}

// =========================================================================
// Section 2: Ranking scenarios
// =========================================================================

fn rice_wheat() -> CropProfileStore {
    CropProfileStore::from_profiles([
        ("rice", [90.0, 40.0, 40.0, 25.0, 80.0, 6.5, 200.0]),
        ("wheat", [50.0, 30.0, 20.0, 18.0, 50.0, 6.0, 60.0]),
    ])
    .unwrap()
}

#[test]
fn test_exact_match_ranks_first() {
    let store = rice_wheat();
    let engine = SuitabilityEngine::new(&store, GoldScale::new(100.0, 2.0).unwrap());
    let query = [90.0, 40.0, 40.0, 25.0, 80.0, 6.5, 200.0];

    let top = engine.top_n(1, &query, false).unwrap();
    assert_eq!(top.labels, vec!["rice"]);
    assert_eq!(top.value_of("rice"), Some(0.0));
    assert!(top.value_of("wheat").unwrap() > 0.0);

    let gold = GoldScale::new(100.0, 2.0).unwrap();
    assert_eq!(
        gold.gold_value("rice", top.value_of("rice").unwrap()),
        Err(FarmError::DivisionByZero { label: "rice".to_string() })
    );
}

#[test]
fn test_gold_ranking_on_sample_dataset() {
    let config = load_config();
    let store = config.build_profiles().unwrap();
    let engine = SuitabilityEngine::new(&store, config.gold_scale().unwrap());
    let query = [77.0, 40.0, 40.0, 25.0, 80.0, 7.0, 230.0];

    let plain = engine.top_n(3, &query, false).unwrap();
    let gold = engine.top_n(5, &query, true).unwrap();

    assert_eq!(gold.labels, vec!["rice", "jute", "coffee"]);
    assert_eq!(gold.labels, plain.labels);
    for label in &gold.labels {
        let distance = plain.value_of(label).unwrap();
        assert_relative_eq!(gold.value_of(label).unwrap(), 1000.0 / distance * 1.0, epsilon = 1e-9);
    }
    // closer crops are worth more
    assert!(gold.scores[0].value > gold.scores[1].value);
}

// =========================================================================
// Section 3: Game session
// =========================================================================

#[test]
fn test_irrigate_scenario() {
    let mut table = ActionTable::new();
    table.insert("irrigate".to_string(), ActionSpec::new("Irrigate Field", &[("humidity", 10.0)]));
    let catalog = ActionCatalog::from_table(&table, false).unwrap();

    let mut cell = SoilCell {
        n: 90,
        p: 42,
        k: 43,
        rainfall: 202.9,
        ph: 6.5,
        humidity: 40.0,
        temperature: 20.8,
        ..Default::default()
    };
    let before = cell.clone();

    let label = cell.apply_action("irrigate", &catalog, &AttributeBounds::Unbounded).unwrap();

    assert_eq!(label, "Irrigate Field");
    assert_relative_eq!(cell.humidity, 50.0);
    assert_eq!((cell.n, cell.p, cell.k), (before.n, before.p, before.k));
    assert_eq!(cell.rainfall, before.rainfall);
    assert_eq!(cell.ph, before.ph);
    assert_eq!(cell.temperature, before.temperature);
}

#[test]
fn test_session_actions_shift_recommendation() {
    let config = load_config();
    let catalog = config.action_catalog().unwrap();
    let store = config.build_profiles().unwrap();
    let engine = SuitabilityEngine::new(&store, config.gold_scale().unwrap());

    // Dry, low-nitrogen plot: a pulse crop fits best
    let start = SoilCell::from_query_vector(&[20.0, 65.0, 20.0, 20.0, 20.0, 5.8, 110.0]);
    let mut state = config.new_state(start).unwrap();
    assert_eq!(state.gold, 100);

    let before = engine.recommend(state.grid.cell_at(0, 0).unwrap(), 1, false).unwrap();
    assert_eq!(before.labels, vec!["kidneybeans"]);

    for _ in 0..6 {
        state.apply_action(0, 0, "irrigate", &catalog, &config.bounds).unwrap();
    }
    for _ in 0..3 {
        state.apply_action(0, 0, "fertilize_n", &catalog, &config.bounds).unwrap();
    }
    state.clock.advance(9);

    let cell = state.grid.cell_at(0, 0).unwrap();
    assert_relative_eq!(cell.humidity, 80.0, epsilon = 1e-9);
    assert_eq!(cell.n, 80);
    assert_eq!(state.grid.cell_at(0, 1).unwrap().humidity, 20.0);

    let after = engine.recommend(cell, 1, false).unwrap();
    assert_ne!(after.labels, before.labels);

    // the unknown action leaves everything as it was
    let snapshot = state.clone();
    assert!(matches!(
        state.apply_action(0, 0, "harvest", &catalog, &config.bounds),
        Err(FarmError::UnknownAction { .. })
    ));
    assert_eq!(state, snapshot);

    let recs = state.grid.recommend_all(&engine, 2, false);
    assert_eq!(recs.len(), 64);
    assert!(recs.iter().all(|r| r.result.as_ref().map(|t| t.labels.len() == 2).unwrap_or(false)));
}
