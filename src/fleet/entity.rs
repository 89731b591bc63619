use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::HookKind;
use crate::ledger::{stats, StatLedger};

/// An AI core installed on an autonomous ship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstalledCore {
    pub id: String,
    /// Multiplier on the ship's deployment cost. `0.0` means unset.
    #[serde(default)]
    pub points_multiplier: f64,
    /// Points added on top of the multiplied cost.
    #[serde(default)]
    pub flat_points: f64,
}

impl InstalledCore {
    pub fn new(id: impl Into<String>, points_multiplier: f64) -> Self {
        Self {
            id: id.into(),
            points_multiplier,
            flat_points: 0.0,
        }
    }

    /// Stored multiplier, with the `0.0` "unset" sentinel read as 1.
    pub fn multiplier(&self) -> f64 {
        if self.points_multiplier == 0.0 {
            1.0
        } else {
            self.points_multiplier
        }
    }
}

/// Input description of a fleet member, as supplied by the simulation loop.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntitySpec {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub deployment_cost: f64,
    /// Needs no human crew; governed by the automated points budget.
    #[serde(default)]
    pub automated: bool,
    /// Automated but exempt from the budget (e.g. special hulls).
    #[serde(default)]
    pub no_penalty: bool,
    #[serde(default)]
    pub mothballed: bool,
    #[serde(default)]
    pub flagship: bool,
    #[serde(default)]
    pub core: Option<InstalledCore>,
    #[serde(default)]
    pub position: Option<[f64; 2]>,
    #[serde(default)]
    pub base_stats: BTreeMap<String, f64>,
}

impl EntitySpec {
    pub fn new(id: impl Into<String>, deployment_cost: f64) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            deployment_cost,
            ..Self::default()
        }
    }

    pub fn automated(mut self, core: Option<InstalledCore>) -> Self {
        self.automated = true;
        self.core = core;
        self
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Some([x, y]);
        self
    }

    pub fn with_base(mut self, stat: &str, value: f64) -> Self {
        self.base_stats.insert(stat.to_string(), value);
        self
    }
}

/// A materialized fleet member: its description plus its own modifier ledger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entity {
    #[serde(flatten)]
    pub spec: EntitySpec,
    #[serde(skip)]
    pub stats: StatLedger,
    #[serde(skip)]
    markers: BTreeSet<(String, HookKind)>,
}

impl Entity {
    pub fn new(spec: EntitySpec) -> Self {
        Self {
            spec,
            stats: StatLedger::new(),
            markers: BTreeSet::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.spec.id
    }

    /// Counted by the automated points budget.
    pub fn counts_toward_budget(&self) -> bool {
        self.spec.automated && !self.spec.no_penalty && !self.spec.mothballed
    }

    pub fn base(&self, stat: &str) -> f64 {
        match self.spec.base_stats.get(stat) {
            Some(value) => *value,
            None if stat == stats::AUTO_POINTS_MULT => 1.0,
            None => 0.0,
        }
    }

    pub fn effective(&self, stat: &str) -> f64 {
        self.stats.effective(stat, self.base(stat))
    }

    /// Every stat with a base value or a modifier, resolved to its effective value.
    pub fn effective_stats(&self) -> BTreeMap<String, f64> {
        let mut names: BTreeSet<&str> = self.spec.base_stats.keys().map(String::as_str).collect();
        names.extend(self.stats.stats());
        names
            .into_iter()
            .map(|stat| (stat.to_string(), self.effective(stat)))
            .collect()
    }

    pub fn distance_to(&self, other: &Entity) -> Option<f64> {
        let [ax, ay] = self.spec.position?;
        let [bx, by] = other.spec.position?;
        Some(((ax - bx).powi(2) + (ay - by).powi(2)).sqrt())
    }

    pub(crate) fn has_marker(&self, skill: &str, hook: HookKind) -> bool {
        self.markers.contains(&(skill.to_string(), hook))
    }

    pub(crate) fn set_marker(&mut self, skill: &str, hook: HookKind) {
        self.markers.insert((skill.to_string(), hook));
    }

    pub(crate) fn remove_markers_for(&mut self, skill: &str) {
        self.markers.retain(|(owner, _)| owner != skill);
    }
}
