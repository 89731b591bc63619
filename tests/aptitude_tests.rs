use std::collections::BTreeSet;
use std::sync::Arc;

use wardroom::aptitude::SkillState;
use wardroom::error::EngineError;
use wardroom::officer::Officer;
use wardroom::{Catalog, EngineConfig, FleetEngine};

const EXPERTISE: &str = "sc_automated_expertise";
const EQUIPMENT: &str = "sc_automated_specialized_equipment";
const CYBER: &str = "sc_automated_cyber_warfare";
const HARDENED: &str = "sc_automated_hardened_subsystems";
const BULK: &str = "sc_automated_bulk_control";
const NEURAL: &str = "sc_automated_neural_link";

fn engine_with(officer: Officer) -> FleetEngine {
    let catalog = Arc::new(Catalog::load_dir("data/catalog").expect("bundled catalog should load"));
    let mut engine = FleetEngine::new(EngineConfig::default(), catalog);
    engine.assign(0, officer).expect("officer should assign");
    engine
}

fn vance(level: u8) -> Officer {
    let mut officer = Officer::new("vance", "sc_automated");
    officer.level = level;
    officer
}

fn state_of(engine: &FleetEngine, skill: &str) -> SkillState {
    engine
        .skill_states(0)
        .expect("slot is assigned")
        .into_iter()
        .find(|status| status.skill == skill)
        .map(|status| status.state)
        .expect("skill is listed")
}

#[test]
fn gates_unlock_as_earlier_sections_fill() {
    let mut engine = engine_with(vance(5));
    assert_eq!(state_of(&engine, EXPERTISE), SkillState::Unlockable);
    assert_eq!(state_of(&engine, CYBER), SkillState::Locked);

    let err = engine.activate_skill(0, CYBER).expect_err("gate not met");
    assert_eq!(
        err,
        EngineError::SectionGateNotMet {
            skill: CYBER.to_string(),
            required: 2,
            active: 0,
        }
    );

    engine.activate_skill(0, EXPERTISE).expect("first section is open");
    assert_eq!(state_of(&engine, CYBER), SkillState::Locked);
    engine.activate_skill(0, EQUIPMENT).expect("first section is open");
    assert_eq!(state_of(&engine, CYBER), SkillState::Unlockable);
    assert_eq!(state_of(&engine, EXPERTISE), SkillState::Active);
    engine.activate_skill(0, CYBER).expect("gate met");
}

#[test]
fn only_one_choice_per_exclusive_section() {
    let mut officer = vance(5);
    officer.active_skills = [EXPERTISE, EQUIPMENT, CYBER, HARDENED]
        .into_iter()
        .map(str::to_string)
        .collect();
    let mut engine = engine_with(officer);

    engine.activate_skill(0, BULK).expect("gate of four met");
    let err = engine.activate_skill(0, NEURAL).expect_err("section is exclusive");
    assert!(matches!(
        err,
        EngineError::ChooseOnlyOneViolation { ref active, .. } if active == BULK
    ));

    engine.deactivate_skill(0, BULK).expect("last section has no dependents");
    engine.activate_skill(0, NEURAL).expect("slot in the section is free again");
}

#[test]
fn prerequisites_cannot_be_pulled_from_under_a_dependent() {
    let mut officer = vance(5);
    officer.active_skills = [EXPERTISE, EQUIPMENT, CYBER]
        .into_iter()
        .map(str::to_string)
        .collect();
    let mut engine = engine_with(officer);

    let err = engine.deactivate_skill(0, EXPERTISE).expect_err("cyber warfare needs it");
    assert_eq!(err.kind(), "dependent_skill_active");

    engine.deactivate_skill(0, CYBER).expect("no dependents");
    engine.deactivate_skill(0, EXPERTISE).expect("gate no longer needed");
    assert!(!engine.is_active(EXPERTISE));
}

#[test]
fn skill_points_follow_level() {
    let mut engine = engine_with(vance(1));
    engine.activate_skill(0, EXPERTISE).expect("one point available");
    let err = engine.activate_skill(0, EQUIPMENT).expect_err("points exhausted");
    assert!(matches!(err, EngineError::SkillPointsExhausted { used: 1, available: 1, .. }));

    assert_eq!(engine.level_up(0).expect("assigned"), 2);
    engine.activate_skill(0, EQUIPMENT).expect("second point available");
}

#[test]
fn origin_skill_is_locked_while_assigned() {
    let mut engine = engine_with(vance(1));
    let origin = "sc_automated_automated_ships";
    assert!(engine.is_active(origin));
    assert_eq!(
        engine.deactivate_skill(0, origin),
        Err(EngineError::OriginSkillLocked(origin.to_string()))
    );
    assert!(engine.activate_skill(0, origin).is_err());
    assert!(engine
        .skill_states(0)
        .expect("assigned")
        .iter()
        .all(|status| status.skill != origin));
}

#[test]
fn reset_removes_chosen_skills_latest_first() {
    let mut officer = vance(5);
    officer.active_skills = [EXPERTISE, EQUIPMENT, CYBER]
        .into_iter()
        .map(str::to_string)
        .collect();
    let mut engine = engine_with(officer);

    let removed = engine.reset_skills(0).expect("assigned");
    assert_eq!(removed.first().map(String::as_str), Some(CYBER));
    assert_eq!(removed.len(), 3);
    assert!(engine.is_active("sc_automated_automated_ships"));
    assert_eq!(
        engine.officer(0).expect("assigned").active_skills,
        BTreeSet::new()
    );
}

#[test]
fn assigning_with_an_unreachable_skill_set_is_rejected() {
    let mut officer = vance(5);
    officer.active_skills = [CYBER].into_iter().map(str::to_string).collect();
    let catalog = Arc::new(Catalog::load_dir("data/catalog").expect("bundled catalog should load"));
    let mut engine = FleetEngine::new(EngineConfig::default(), catalog);

    let err = engine.assign(0, officer).expect_err("gate not met");
    assert_eq!(err.kind(), "section_gate_not_met");
    assert!(engine.officer(0).is_none());
    assert!(engine.active_skills().next().is_none());
}

#[test]
fn later_activations_never_close_an_open_gate() {
    let catalog = Catalog::load_dir("data/catalog").expect("bundled catalog should load");
    let aptitude = catalog.aptitude("sc_automated").expect("aptitude exists");
    let mut active = BTreeSet::new();
    for skill in [EXPERTISE, EQUIPMENT, CYBER, HARDENED, BULK] {
        let open: Vec<usize> = (0..aptitude.sections.len())
            .filter(|section| aptitude.can_activate(*section, &active))
            .collect();
        aptitude
            .check_activation(skill, &active)
            .unwrap_or_else(|err| panic!("{skill} should be allowed: {err}"));
        active.insert(skill.to_string());
        for section in open {
            assert!(aptitude.can_activate(section, &active), "section {section} closed");
        }
    }
}
