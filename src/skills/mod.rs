//! Skill plugins: polymorphic units of behavior with a fixed lifecycle.
//!
//! The engine drives every plugin through [`SkillPlugin`] and never looks at
//! the concrete type. [`HookSet`] advertises which hooks a plugin overrides so
//! the engine can skip the rest; deactivation cleanup always runs.

mod builtin;
mod context;

use bitflags::bitflags;

use crate::error::{HookKind, HookResult};
use crate::fleet::{Entity, EntitySpec};

pub use builtin::{
    AutoPointsSkill, CombatRampSkill, InertSkill, ProximityParams, ProximitySkill, RampParams,
    Scope, SkillMeta, StatEffect, StaticSkill,
};
pub use context::{LedgerOp, SkillContext, Target};

bitflags! {
    /// Hooks a plugin overrides.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct HookSet: u8 {
        const ACTIVATION    = 1 << 0;
        const ADVANCE       = 1 << 1;
        const DEACTIVATION  = 1 << 2;
        const BEFORE_CREATE = 1 << 3;
        const AFTER_CREATE  = 1 << 4;
    }
}

impl HookSet {
    pub fn for_kind(kind: HookKind) -> Self {
        match kind {
            HookKind::Activation => Self::ACTIVATION,
            HookKind::Advance => Self::ADVANCE,
            HookKind::Deactivation => Self::DEACTIVATION,
            HookKind::BeforeEntityCreated => Self::BEFORE_CREATE,
            HookKind::AfterEntityCreated => Self::AFTER_CREATE,
        }
    }

    pub fn handles(self, kind: HookKind) -> bool {
        self.contains(Self::for_kind(kind))
    }
}

/// One skill's behavior. Every write goes through the [`SkillContext`], which
/// keys it under the skill's own id; the engine applies it only when the hook
/// returns `Ok`.
pub trait SkillPlugin: Send {
    fn id(&self) -> &str;

    fn aptitude(&self) -> &str;

    fn name(&self) -> &str {
        self.id()
    }

    fn capabilities(&self) -> HookSet;

    /// Automated points this skill adds to the fleet maximum while Active.
    fn provided_points(&self) -> f64 {
        0.0
    }

    /// Seeds initial modifiers. Runs once per activation edge.
    fn on_activation(&mut self, _ctx: &mut SkillContext<'_>) -> HookResult {
        Ok(())
    }

    /// Re-derives time-varying modifiers. Runs every tick, so it must re-set
    /// rather than accumulate.
    fn advance(&mut self, _ctx: &mut SkillContext<'_>, _dt: f64) -> HookResult {
        Ok(())
    }

    /// Removes everything the skill installed.
    fn on_deactivation(&mut self, ctx: &mut SkillContext<'_>) -> HookResult {
        ctx.clear_owned();
        Ok(())
    }

    /// Runs once per entity, before it joins the fleet.
    fn before_entity_created(
        &mut self,
        _ctx: &mut SkillContext<'_>,
        _spec: &EntitySpec,
    ) -> HookResult {
        Ok(())
    }

    /// Runs once per entity, after it joined the fleet (or when the skill
    /// activates while the entity already exists).
    fn after_entity_created(
        &mut self,
        _ctx: &mut SkillContext<'_>,
        _entity: &Entity,
    ) -> HookResult {
        Ok(())
    }
}
