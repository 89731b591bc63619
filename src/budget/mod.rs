//! Automated points budget: what autonomous ships cost against what skills
//! provide, and the combat-readiness offset that ratio earns.

mod curve;

use serde::Serialize;

use crate::fleet::Entity;
use crate::ledger::{stats, ModifierKind, StatLedger};

pub use curve::{bonus_percent, BeyondDouble, ThresholdCurve};

/// Points one autonomous ship consumes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitPoints {
    pub entity: String,
    pub name: String,
    pub points: f64,
    /// Core multiplier times the ship's own `auto_points_mult`.
    pub multiplier: f64,
}

/// Points for one entity, or `None` when it does not count toward the budget.
pub fn unit_points(entity: &Entity) -> Option<UnitPoints> {
    if !entity.counts_toward_budget() {
        return None;
    }
    let (core_mult, flat) = entity
        .spec
        .core
        .as_ref()
        .map(|core| (core.multiplier(), core.flat_points))
        .unwrap_or((1.0, 0.0));
    let multiplier = core_mult * entity.effective(stats::AUTO_POINTS_MULT);
    Some(UnitPoints {
        entity: entity.id().to_string(),
        name: entity.spec.name.clone(),
        points: flat + entity.spec.deployment_cost * multiplier,
        multiplier,
    })
}

/// Sum of `deployment_cost × core multiplier` over counted autonomous entities.
pub fn compute_used<'a, I>(entities: I) -> f64
where
    I: IntoIterator<Item = &'a Entity>,
{
    entities
        .into_iter()
        .filter_map(unit_points)
        .map(|unit| unit.points)
        .sum()
}

/// Sum of every active skill's declared points plus external bonuses.
pub fn compute_maximum<S, E>(skill_points: S, external_points: E) -> f64
where
    S: IntoIterator<Item = f64>,
    E: IntoIterator<Item = f64>,
{
    skill_points.into_iter().sum::<f64>() + external_points.into_iter().sum::<f64>()
}

/// A named contribution to the maximum.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointsSource {
    pub key: String,
    pub label: String,
    pub points: f64,
}

/// External bonuses: flat `automated_points` entries on the commander ledger
/// whose owner is tagged external. Anything else on that stat is ignored.
pub fn external_point_bonuses(commander: &StatLedger) -> Vec<PointsSource> {
    commander
        .modifiers(stats::AUTOMATED_POINTS)
        .filter(|(id, modifier)| id.owner.is_external() && modifier.kind == ModifierKind::Flat)
        .map(|(id, modifier)| PointsSource {
            key: id.to_string(),
            label: modifier.label.clone(),
            points: modifier.value,
        })
        .collect()
}

/// Per-tick budget state. Derived, never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BudgetSnapshot {
    pub used: f64,
    pub maximum: f64,
    pub bonus_percent: f64,
    pub max_bonus: f64,
}

impl BudgetSnapshot {
    pub fn compute(used: f64, maximum: f64, curve: &ThresholdCurve) -> Self {
        Self {
            used,
            maximum,
            bonus_percent: bonus_percent(used, maximum, curve),
            max_bonus: curve.max_bonus,
        }
    }

    /// No skill or external source provides points.
    pub fn is_inactive(&self) -> bool {
        self.maximum <= 0.0
    }
}
