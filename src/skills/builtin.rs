//! Plugin families the catalog can configure from data.

use serde::{Deserialize, Serialize};

use super::{HookSet, SkillContext, SkillPlugin, Target};
use crate::error::HookResult;
use crate::fleet::{Entity, EntitySpec};
use crate::ledger::ModifierKind;

/// Which fleet members an effect lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Commander,
    #[default]
    AllShips,
    AutomatedShips,
    CrewedShips,
    Flagship,
}

impl Scope {
    pub fn matches(self, spec: &EntitySpec) -> bool {
        match self {
            Self::Commander => false,
            Self::AllShips => true,
            Self::AutomatedShips => spec.automated,
            Self::CrewedShips => !spec.automated,
            Self::Flagship => spec.flagship,
        }
    }
}

fn default_kind() -> ModifierKind {
    ModifierKind::Flat
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatEffect {
    #[serde(default)]
    pub scope: Scope,
    pub stat: String,
    #[serde(default = "default_kind")]
    pub kind: ModifierKind,
    pub value: f64,
}

/// Identity shared by every family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillMeta {
    pub id: String,
    pub aptitude: String,
    pub name: String,
}

fn effect_part(index: usize) -> String {
    format!("e{index}")
}

/// Writes `effect` to the commander, or to every matching entity.
fn apply_everywhere(ctx: &mut SkillContext<'_>, part: &str, effect: &StatEffect) {
    if effect.scope == Scope::Commander {
        ctx.set_part(Target::Commander, &effect.stat, part, effect.kind, effect.value);
        return;
    }
    let targets: Vec<String> = ctx
        .entities()
        .filter(|entity| effect.scope.matches(&entity.spec))
        .map(|entity| entity.id().to_string())
        .collect();
    for id in targets {
        ctx.set_part(Target::Entity(id), &effect.stat, part, effect.kind, effect.value);
    }
}

/// Fixed modifiers, installed on activation and on every ship created while Active.
#[derive(Debug, Clone)]
pub struct StaticSkill {
    meta: SkillMeta,
    effects: Vec<StatEffect>,
}

impl StaticSkill {
    pub fn new(meta: SkillMeta, effects: Vec<StatEffect>) -> Self {
        Self { meta, effects }
    }
}

impl SkillPlugin for StaticSkill {
    fn id(&self) -> &str {
        &self.meta.id
    }

    fn aptitude(&self) -> &str {
        &self.meta.aptitude
    }

    fn name(&self) -> &str {
        &self.meta.name
    }

    fn capabilities(&self) -> HookSet {
        HookSet::ACTIVATION | HookSet::BEFORE_CREATE
    }

    fn on_activation(&mut self, ctx: &mut SkillContext<'_>) -> HookResult {
        for (index, effect) in self.effects.iter().enumerate() {
            apply_everywhere(ctx, &effect_part(index), effect);
        }
        Ok(())
    }

    fn before_entity_created(
        &mut self,
        ctx: &mut SkillContext<'_>,
        spec: &EntitySpec,
    ) -> HookResult {
        for (index, effect) in self.effects.iter().enumerate() {
            if effect.scope.matches(spec) {
                ctx.set_part(
                    Target::entity(&spec.id),
                    &effect.stat,
                    &effect_part(index),
                    effect.kind,
                    effect.value,
                );
            }
        }
        Ok(())
    }
}

/// Provides automated points to the fleet maximum and re-asserts its
/// effects every tick.
#[derive(Debug, Clone)]
pub struct AutoPointsSkill {
    meta: SkillMeta,
    points: f64,
    effects: Vec<StatEffect>,
}

impl AutoPointsSkill {
    /// `points` is the final contribution, already scaled by the engine's multiplier.
    pub fn new(meta: SkillMeta, points: f64, effects: Vec<StatEffect>) -> Self {
        Self {
            meta,
            points,
            effects,
        }
    }
}

impl SkillPlugin for AutoPointsSkill {
    fn id(&self) -> &str {
        &self.meta.id
    }

    fn aptitude(&self) -> &str {
        &self.meta.aptitude
    }

    fn name(&self) -> &str {
        &self.meta.name
    }

    fn capabilities(&self) -> HookSet {
        HookSet::ADVANCE
    }

    fn provided_points(&self) -> f64 {
        self.points
    }

    fn advance(&mut self, ctx: &mut SkillContext<'_>, _dt: f64) -> HookResult {
        for (index, effect) in self.effects.iter().enumerate() {
            apply_everywhere(ctx, &effect_part(index), effect);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RampParams {
    #[serde(default)]
    pub scope: Scope,
    pub stat: String,
    #[serde(default = "default_kind")]
    pub kind: ModifierKind,
    #[serde(default)]
    pub start: f64,
    pub full: f64,
    pub ramp_seconds: f64,
}

impl RampParams {
    /// `start` at time zero, `full` once `ramp_seconds` have elapsed.
    pub fn value_at(&self, elapsed: f64) -> f64 {
        if self.ramp_seconds <= 0.0 {
            return self.full;
        }
        let progress = (elapsed / self.ramp_seconds).clamp(0.0, 1.0);
        self.start + (self.full - self.start) * progress
    }
}

/// Bonus that grows with elapsed combat time.
#[derive(Debug, Clone)]
pub struct CombatRampSkill {
    meta: SkillMeta,
    params: RampParams,
}

impl CombatRampSkill {
    pub fn new(meta: SkillMeta, params: RampParams) -> Self {
        Self { meta, params }
    }
}

impl SkillPlugin for CombatRampSkill {
    fn id(&self) -> &str {
        &self.meta.id
    }

    fn aptitude(&self) -> &str {
        &self.meta.aptitude
    }

    fn name(&self) -> &str {
        &self.meta.name
    }

    fn capabilities(&self) -> HookSet {
        HookSet::ADVANCE | HookSet::AFTER_CREATE
    }

    fn advance(&mut self, ctx: &mut SkillContext<'_>, _dt: f64) -> HookResult {
        let effect = StatEffect {
            scope: self.params.scope,
            stat: self.params.stat.clone(),
            kind: self.params.kind,
            value: self.params.value_at(ctx.elapsed()),
        };
        apply_everywhere(ctx, &effect_part(0), &effect);
        Ok(())
    }

    // Ships joining mid-combat get the current value without waiting a tick.
    fn after_entity_created(
        &mut self,
        ctx: &mut SkillContext<'_>,
        entity: &Entity,
    ) -> HookResult {
        if self.params.scope.matches(&entity.spec) {
            let value = self.params.value_at(ctx.elapsed());
            ctx.set_part(
                Target::entity(entity.id()),
                &self.params.stat,
                &effect_part(0),
                self.params.kind,
                value,
            );
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProximityParams {
    #[serde(default)]
    pub scope: Scope,
    pub stat: String,
    #[serde(default = "default_kind")]
    pub kind: ModifierKind,
    pub per_ally: f64,
    pub radius: f64,
    #[serde(default = "default_max_stacks")]
    pub max_stacks: u32,
}

fn default_max_stacks() -> u32 {
    u32::MAX
}

/// Stacks a bonus for every other active ship within `radius`.
#[derive(Debug, Clone)]
pub struct ProximitySkill {
    meta: SkillMeta,
    params: ProximityParams,
}

impl ProximitySkill {
    pub fn new(meta: SkillMeta, params: ProximityParams) -> Self {
        Self { meta, params }
    }
}

impl SkillPlugin for ProximitySkill {
    fn id(&self) -> &str {
        &self.meta.id
    }

    fn aptitude(&self) -> &str {
        &self.meta.aptitude
    }

    fn name(&self) -> &str {
        &self.meta.name
    }

    fn capabilities(&self) -> HookSet {
        HookSet::ADVANCE
    }

    fn advance(&mut self, ctx: &mut SkillContext<'_>, _dt: f64) -> HookResult {
        let mut writes = Vec::new();
        for entity in ctx.entities().filter(|e| self.params.scope.matches(&e.spec)) {
            let allies = ctx
                .entities()
                .filter(|other| other.id() != entity.id() && !other.spec.mothballed)
                .filter_map(|other| entity.distance_to(other))
                .filter(|distance| *distance <= self.params.radius)
                .count() as u32;
            writes.push((entity.id().to_string(), allies.min(self.params.max_stacks)));
        }
        for (id, stacks) in writes {
            if stacks == 0 {
                ctx.clear(Target::Entity(id), &self.params.stat);
            } else {
                let value = self.params.per_ally * f64::from(stacks);
                ctx.set(Target::Entity(id), &self.params.stat, self.params.kind, value);
            }
        }
        Ok(())
    }
}

/// A skill with no engine-visible effect (flavor, or handled by other systems).
#[derive(Debug, Clone)]
pub struct InertSkill {
    meta: SkillMeta,
}

impl InertSkill {
    pub fn new(meta: SkillMeta) -> Self {
        Self { meta }
    }
}

impl SkillPlugin for InertSkill {
    fn id(&self) -> &str {
        &self.meta.id
    }

    fn aptitude(&self) -> &str {
        &self.meta.aptitude
    }

    fn name(&self) -> &str {
        &self.meta.name
    }

    fn capabilities(&self) -> HookSet {
        HookSet::empty()
    }
}
