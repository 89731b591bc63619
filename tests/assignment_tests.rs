use std::sync::Arc;

use wardroom::error::EngineError;
use wardroom::officer::Officer;
use wardroom::{Catalog, EngineConfig, FleetEngine};

fn engine() -> FleetEngine {
    let catalog = Arc::new(Catalog::load_dir("data/catalog").expect("bundled catalog should load"));
    FleetEngine::new(EngineConfig::default(), catalog)
}

#[test]
fn one_officer_per_aptitude() {
    let mut engine = engine();
    engine
        .assign(0, Officer::new("reyes", "sc_tactical"))
        .expect("first tactical officer");

    let err = engine
        .assign(1, Officer::new("lindqvist", "sc_tactical"))
        .expect_err("second tactical officer");
    assert!(matches!(err, EngineError::DuplicateAptitudeAssignment { .. }));
    assert!(engine.officer(1).is_none());

    engine.unassign(0).expect("unassign");
    engine
        .assign(1, Officer::new("lindqvist", "sc_tactical"))
        .expect("aptitude is free again");
}

#[test]
fn shared_category_blocks_a_different_aptitude() {
    let mut engine = engine();
    engine
        .assign(0, Officer::new("reyes", "sc_tactical"))
        .expect("tactical officer");

    let err = engine
        .assign(1, Officer::new("okafor", "sc_warfare"))
        .expect_err("both are doctrine officers");
    assert_eq!(
        err,
        EngineError::DuplicateCategoryAssignment {
            candidate: "okafor".to_string(),
            existing: "reyes".to_string(),
            category: "doctrine".to_string(),
        }
    );

    engine
        .assign(1, Officer::new("vance", "sc_automated"))
        .expect("automation does not collide with doctrine");
    engine
        .assign(2, Officer::new("haddad", "sc_starfaring"))
        .expect("logistics does not collide either");
}

#[test]
fn replacing_an_officer_in_place_is_allowed() {
    let mut engine = engine();
    engine
        .assign(0, Officer::new("reyes", "sc_tactical"))
        .expect("tactical officer");
    let replaced = engine
        .assign(0, Officer::new("okafor", "sc_warfare"))
        .expect("the slot's own occupant is not a conflict");

    assert_eq!(replaced.map(|officer| officer.id), Some("reyes".to_string()));
    assert!(!engine.is_active("sc_tactical_tactical_drills"));
    assert!(engine.is_active("sc_warfare_coordinated_maneuvers"));
    assert!(engine.audit_leaks("sc_tactical_tactical_drills").is_empty());
}

#[test]
fn same_officer_cannot_hold_two_slots() {
    let mut engine = engine();
    engine
        .assign(0, Officer::new("vance", "sc_automated"))
        .expect("first slot");
    let err = engine
        .assign(1, Officer::new("vance", "sc_starfaring"))
        .expect_err("same officer id");
    assert_eq!(
        err,
        EngineError::DuplicateOfficer {
            officer: "vance".to_string(),
            slot: 0,
        }
    );
}

#[test]
fn slot_and_aptitude_must_exist() {
    let mut engine = engine();
    assert_eq!(
        engine.assign(7, Officer::new("vance", "sc_automated")),
        Err(EngineError::InvalidSlot { slot: 7, slots: 3 })
    );
    assert_eq!(
        engine.assign(0, Officer::new("nobody", "sc_psionics")),
        Err(EngineError::UnknownAptitude("sc_psionics".to_string()))
    );
    assert_eq!(engine.unassign(1), Err(EngineError::SlotEmpty { slot: 1 }));
}
