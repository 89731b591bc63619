use std::sync::Arc;

use wardroom::budget::{bonus_percent, BeyondDouble, ThresholdCurve};
use wardroom::fleet::{EntitySpec, InstalledCore};
use wardroom::ledger::stats;
use wardroom::officer::Officer;
use wardroom::report::{summarize, SHIP_LINES};
use wardroom::skills::Target;
use wardroom::{Catalog, EngineConfig, FleetEngine};

fn catalog() -> Arc<Catalog> {
    Arc::new(Catalog::load_dir("data/catalog").expect("bundled catalog should load"))
}

fn automated_fleet() -> FleetEngine {
    let mut engine = FleetEngine::new(EngineConfig::default(), catalog());
    engine
        .assign(0, Officer::new("vance", "sc_automated"))
        .expect("automated officer should assign");
    engine
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn threshold_curve_boundaries() {
    let curve = ThresholdCurve::with_max_bonus(60.0);
    assert!(approx(bonus_percent(0.0, 100.0, &curve), 60.0));
    assert!(approx(bonus_percent(100.0, 100.0, &curve), 60.0));
    assert!(approx(bonus_percent(200.0, 100.0, &curve), 30.0));
    assert!(approx(bonus_percent(50.0, 0.0, &curve), 0.0));
}

#[test]
fn beyond_double_is_configurable() {
    let linear = ThresholdCurve::with_max_bonus(100.0);
    let plateau = ThresholdCurve {
        beyond_double: BeyondDouble::Plateau,
        ..linear
    };
    let floored = ThresholdCurve {
        floor: 0.25,
        ..linear
    };
    assert!(approx(bonus_percent(300.0, 100.0, &linear), 0.0));
    assert!(approx(bonus_percent(300.0, 100.0, &plateau), 50.0));
    assert!(approx(bonus_percent(300.0, 100.0, &floored), 25.0));
    assert!(approx(bonus_percent(250.0, 100.0, &linear), 25.0));
}

#[test]
fn bonus_never_rises_as_usage_grows() {
    let linear = ThresholdCurve::with_max_bonus(100.0);
    let curves = [
        linear,
        ThresholdCurve {
            beyond_double: BeyondDouble::Plateau,
            ..linear
        },
        ThresholdCurve {
            floor: 0.8,
            ..linear
        },
        ThresholdCurve {
            beyond_double: BeyondDouble::Plateau,
            floor: 0.8,
            ..linear
        },
    ];
    let maximum = 120.0;
    for curve in &curves {
        let mut previous = bonus_percent(0.0, maximum, curve);
        assert!(approx(previous, curve.max_bonus));
        for step in 1..=480 {
            let used = step as f64;
            let bonus = bonus_percent(used, maximum, curve);
            assert!(
                bonus <= previous + 1e-12,
                "{curve:?}: bonus rose from {previous} to {bonus} at used={used}"
            );
            previous = bonus;
        }
        assert!(approx(bonus_percent(maximum, maximum, curve), curve.max_bonus));
        assert!(previous >= curve.floor * curve.max_bonus - 1e-9);
    }
}

#[test]
fn three_ships_against_one_hundred_twenty_points() {
    let mut engine = automated_fleet();
    for (id, cost) in [("a", 40.0), ("b", 50.0), ("c", 60.0)] {
        let core = InstalledCore::new("none", 1.0);
        engine
            .materialize(EntitySpec::new(id, cost).automated(Some(core)))
            .expect("entity should materialize");
    }

    let report = engine.advance(1.0);
    assert!(approx(report.budget.used, 150.0));
    assert!(approx(report.budget.maximum, 120.0));
    assert!(approx(report.budget.bonus_percent, 100.0 * 0.875));

    for id in ["a", "b", "c"] {
        let readiness = engine
            .effective(&Target::entity(id), stats::MAX_COMBAT_READINESS)
            .expect("entity exists");
        assert!(approx(readiness, 0.875));
    }
}

#[test]
fn readiness_offset_is_shared_not_stacked() {
    let mut engine = automated_fleet();
    engine.set_external_bonus("relay", 80.0, "Salvaged Relay");
    engine
        .materialize(EntitySpec::new("a", 100.0).automated(None))
        .expect("entity should materialize");
    engine.advance(1.0);
    engine.advance(1.0);

    let entity = engine.entity("a").expect("entity exists");
    assert_eq!(entity.stats.modifiers(stats::MAX_COMBAT_READINESS).count(), 1);
    assert!(approx(entity.effective(stats::MAX_COMBAT_READINESS), 1.0));
}

#[test]
fn offset_removed_when_no_source_provides_points() {
    let mut engine = automated_fleet();
    engine
        .materialize(EntitySpec::new("a", 10.0).automated(None))
        .expect("entity should materialize");
    engine.advance(1.0);
    assert!(approx(
        engine.entity("a").expect("entity exists").effective(stats::MAX_COMBAT_READINESS),
        1.0
    ));

    engine.unassign(0).expect("officer should unassign");
    let report = engine.advance(1.0);
    assert!(report.budget.is_inactive());
    assert_eq!(
        engine.entity("a").expect("entity exists").effective(stats::MAX_COMBAT_READINESS),
        0.0
    );
}

#[test]
fn exempt_and_crewed_ships_cost_nothing() {
    let mut engine = automated_fleet();
    let mut exempt = EntitySpec::new("exempt", 90.0).automated(None);
    exempt.no_penalty = true;
    let mut mothballed = EntitySpec::new("stored", 90.0).automated(None);
    mothballed.mothballed = true;
    engine.materialize(exempt).expect("materialize");
    engine.materialize(mothballed).expect("materialize");
    engine.materialize(EntitySpec::new("crewed", 90.0)).expect("materialize");

    let report = engine.advance(1.0);
    assert_eq!(report.budget.used, 0.0);
    assert_eq!(
        engine.entity("exempt").expect("exists").effective(stats::MAX_COMBAT_READINESS),
        0.0
    );
}

#[test]
fn unset_core_multiplier_counts_as_one() {
    let mut engine = automated_fleet();
    let unset = InstalledCore::new("alpha", 0.0);
    engine
        .materialize(EntitySpec::new("d", 10.0).automated(Some(unset)))
        .expect("entity should materialize");
    assert!(approx(engine.budget().used, 10.0));

    let mut core = InstalledCore::new("alpha", 4.0);
    core.flat_points = 5.0;
    engine
        .materialize(EntitySpec::new("e", 10.0).automated(Some(core)))
        .expect("entity should materialize");
    assert!(approx(engine.budget().used, 55.0));
}

#[test]
fn skill_can_discount_ship_points() {
    let mut engine = FleetEngine::new(EngineConfig::default(), catalog());
    let mut officer = Officer::new("vance", "sc_automated");
    officer.level = 2;
    officer
        .active_skills
        .insert("sc_automated_specialized_equipment".to_string());
    engine.assign(0, officer).expect("officer should assign");
    engine
        .materialize(EntitySpec::new("a", 50.0).automated(None))
        .expect("entity should materialize");

    assert!(approx(engine.budget().used, 40.0));
}

#[test]
fn summary_folds_ships_beyond_the_listed_ones() {
    let mut engine = automated_fleet();
    for index in 0..(SHIP_LINES + 3) {
        let spec = EntitySpec::new(format!("drone-{index:02}"), 10.0 + index as f64);
        engine
            .materialize(spec.automated(None))
            .expect("entity should materialize");
    }
    let summary = summarize(&engine);
    assert_eq!(summary.ships.len(), SHIP_LINES);
    assert_eq!(summary.ships[0].entity, format!("drone-{:02}", SHIP_LINES + 2));
    let other = summary.other_ships.as_ref().expect("remaining ships are folded");
    assert_eq!(other.count, 3);
    assert!(approx(other.points, 10.0 + 11.0 + 12.0));
    assert_eq!(summary.sources[0].key, "sc_automated_automated_ships");
    assert!(summary.render_text().contains("Other ships (3)"));
}
