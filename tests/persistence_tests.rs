use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use wardroom::error::PersistenceError;
use wardroom::fleet::EntitySpec;
use wardroom::officer::Officer;
use wardroom::persistence::DurableState;
use wardroom::skills::Target;
use wardroom::{Catalog, EngineConfig, FleetEngine};

fn unique_temp_path(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("wardroom-{name}-{nanos}.json"))
}

fn catalog() -> Arc<Catalog> {
    Arc::new(Catalog::load_dir("data/catalog").expect("bundled catalog should load"))
}

fn fleet() -> Vec<EntitySpec> {
    vec![
        EntitySpec::new("flagship", 80.0).with_base("hull", 1000.0),
        EntitySpec::new("drone_a", 40.0)
            .automated(None)
            .with_base("hull_repair_rate", 10.0),
        EntitySpec::new("drone_b", 60.0)
            .automated(None)
            .with_base("hull_repair_rate", 10.0),
    ]
}

fn populated(engine: &mut FleetEngine) {
    for spec in fleet() {
        engine.materialize(spec).expect("entity should materialize");
    }
    engine.advance(1.0);
}

#[test]
fn restored_fleet_rebuilds_the_same_effective_values() {
    let config = EngineConfig::default();
    let mut engine = FleetEngine::new(config.clone(), catalog());
    let mut vance = Officer::new("vance", "sc_automated");
    vance.level = 3;
    vance.active_skills = ["sc_automated_expertise", "sc_automated_specialized_equipment"]
        .into_iter()
        .map(str::to_string)
        .collect();
    engine.assign(0, vance).expect("assign vance");
    engine
        .assign(2, Officer::new("haddad", "sc_starfaring"))
        .expect("assign haddad");
    populated(&mut engine);

    let raw = DurableState::capture(&engine).to_json().expect("state serializes");
    assert!(!raw.contains("stats"), "ledgers are derived, never stored");

    let state = DurableState::from_json(&raw).expect("state parses");
    let mut restored = state.restore(config, catalog()).expect("state restores");
    populated(&mut restored);

    assert_eq!(restored.officer(0), engine.officer(0));
    assert_eq!(restored.officer(2), engine.officer(2));
    assert_eq!(restored.budget(), engine.budget());
    for entity in engine.entities() {
        let twin = restored.entity(entity.id()).expect("same entities");
        assert_eq!(twin.effective_stats(), entity.effective_stats());
    }
    assert_eq!(
        restored
            .effective(&Target::Commander, "travel_speed_bonus")
            .expect("commander"),
        engine
            .effective(&Target::Commander, "travel_speed_bonus")
            .expect("commander"),
    );
}

#[test]
fn state_file_round_trips_through_disk() {
    let path = unique_temp_path("state");
    let mut engine = FleetEngine::new(EngineConfig::default(), catalog());
    engine
        .assign(1, Officer::new("okafor", "sc_warfare"))
        .expect("assign okafor");
    let state = DurableState::capture(&engine);
    state.save(&path).expect("state saves");

    let loaded = DurableState::load(&path).expect("state loads");
    assert_eq!(loaded, state);
    assert_eq!(loaded.slots.len(), 1);
    assert_eq!(loaded.slots[0].slot, 1);

    let _ = fs::remove_file(path);
}

#[test]
fn invalid_state_is_rejected_on_restore() {
    let raw = r#"{
        "version": 1,
        "saved_at": "2026-03-01T12:00:00Z",
        "fleet_slots": 3,
        "slots": [
            {"slot": 0, "officer": {"id": "reyes", "aptitude": "sc_tactical"}},
            {"slot": 1, "officer": {"id": "okafor", "aptitude": "sc_warfare"}}
        ]
    }"#;
    let state = DurableState::from_json(raw).expect("shape is valid");
    let err = state
        .restore(EngineConfig::default(), catalog())
        .expect_err("doctrine officers collide");
    assert!(matches!(err, PersistenceError::Rejected(_)));
}

#[test]
fn slot_count_must_match_the_configuration() {
    let config = EngineConfig {
        fleet_slots: 4,
        ..EngineConfig::default()
    };
    let mut engine = FleetEngine::new(config, catalog());
    engine
        .assign(3, Officer::new("haddad", "sc_starfaring"))
        .expect("fourth slot exists");
    let state = DurableState::capture(&engine);
    assert_eq!(state.fleet_slots, 4);

    let err = state
        .restore(EngineConfig::default(), catalog())
        .expect_err("three slots configured");
    assert!(matches!(
        err,
        PersistenceError::SlotCountMismatch {
            saved: 4,
            configured: 3
        }
    ));
}

#[test]
fn missing_state_file_is_an_io_error() {
    let path = unique_temp_path("missing");
    assert!(matches!(
        DurableState::load(&path),
        Err(PersistenceError::Io { .. })
    ));
}
