//! Resolves skill definitions into live plugins.

use crate::catalog::parser::{SkillBehavior, SkillDefinition};
use crate::config::EngineConfig;
use crate::skills::{
    AutoPointsSkill, CombatRampSkill, InertSkill, ProximitySkill, SkillMeta, SkillPlugin,
    StaticSkill,
};

/// Build the plugin for `definition`. Declared points are scaled by
/// `config.auto_points_mult` here, so the engine only ever sees final values.
pub fn resolve_plugin(definition: &SkillDefinition, config: &EngineConfig) -> Box<dyn SkillPlugin> {
    let meta = SkillMeta {
        id: definition.id.clone(),
        aptitude: definition.aptitude.clone(),
        name: definition.display_name().to_string(),
    };
    match &definition.behavior {
        SkillBehavior::Static { effects } => Box::new(StaticSkill::new(meta, effects.clone())),
        SkillBehavior::AutoPoints { points, effects } => Box::new(AutoPointsSkill::new(
            meta,
            points * config.auto_points_mult,
            effects.clone(),
        )),
        SkillBehavior::CombatRamp(params) => Box::new(CombatRampSkill::new(meta, params.clone())),
        SkillBehavior::Proximity(params) => Box::new(ProximitySkill::new(meta, params.clone())),
        SkillBehavior::Inert => Box::new(InertSkill::new(meta)),
    }
}
