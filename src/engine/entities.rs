use tracing::info;

use super::hooks::{invoke, FleetView};
use super::FleetEngine;
use crate::error::{EngineError, HookKind};
use crate::fleet::{Entity, EntitySpec};
use crate::ledger::{stats, ModifierId, ModifierKind};

impl FleetEngine {
    /// Brings a new fleet member into being.
    ///
    /// Active skills see it twice: `before_entity_created` with the bare spec,
    /// then `after_entity_created` once it is part of the fleet. Each runs at
    /// most once per skill and entity.
    pub fn materialize(&mut self, spec: EntitySpec) -> Result<&Entity, EngineError> {
        if self.entities.contains_key(&spec.id) {
            return Err(EngineError::DuplicateEntity(spec.id));
        }
        let id = spec.id.clone();

        let view = FleetView {
            tick: self.tick,
            elapsed: self.elapsed,
            commander: &self.commander,
            entities: &self.entities,
        };
        let mut before = Vec::new();
        let mut failures = Vec::new();
        for (skill, active) in self.active.iter_mut() {
            if !active.plugin.capabilities().handles(HookKind::BeforeEntityCreated) {
                continue;
            }
            let label = active.plugin.name().to_string();
            let outcome = invoke(
                view,
                skill,
                &label,
                HookKind::BeforeEntityCreated,
                Some(&id),
                |ctx| active.plugin.before_entity_created(ctx, &spec),
            );
            match outcome {
                Ok(ops) => before.push((skill.clone(), ops)),
                Err(failure) => failures.push(failure),
            }
        }

        let automated = spec.automated;
        self.entities.insert(id.clone(), Entity::new(spec));
        for (skill, ops) in before {
            self.commit(&skill, ops);
            self.mark(&id, &skill, HookKind::BeforeEntityCreated);
        }

        let view = FleetView {
            tick: self.tick,
            elapsed: self.elapsed,
            commander: &self.commander,
            entities: &self.entities,
        };
        let mut after = Vec::new();
        if let Some(entity) = view.entities.get(&id) {
            for (skill, active) in self.active.iter_mut() {
                if !active.plugin.capabilities().handles(HookKind::AfterEntityCreated)
                    || entity.has_marker(skill, HookKind::AfterEntityCreated)
                {
                    continue;
                }
                let label = active.plugin.name().to_string();
                let outcome = invoke(
                    view,
                    skill,
                    &label,
                    HookKind::AfterEntityCreated,
                    Some(&id),
                    |ctx| active.plugin.after_entity_created(ctx, entity),
                );
                match outcome {
                    Ok(ops) => after.push((skill.clone(), ops)),
                    Err(failure) => failures.push(failure),
                }
            }
        }
        for (skill, ops) in after {
            self.commit(&skill, ops);
            self.mark(&id, &skill, HookKind::AfterEntityCreated);
        }
        for failure in failures {
            self.record_failure(failure);
        }

        info!(session = %self.session, entity = %id, automated, "entity materialized");
        self.entities.get(&id).ok_or(EngineError::UnknownEntity(id))
    }

    /// Drops an entity and everything installed on it.
    pub fn remove_entity(&mut self, id: &str) -> Result<Entity, EngineError> {
        let entity = self
            .entities
            .remove(id)
            .ok_or_else(|| EngineError::UnknownEntity(id.to_string()))?;
        info!(session = %self.session, entity = %id, "entity removed");
        Ok(entity)
    }

    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Injects automated points from outside the engine. Re-using `key` replaces.
    pub fn set_external_bonus(&mut self, key: &str, points: f64, label: &str) {
        self.commander.set(
            stats::AUTOMATED_POINTS,
            ModifierId::external(key),
            ModifierKind::Flat,
            points,
            label,
        );
        info!(session = %self.session, key, points, "external points bonus set");
    }

    pub fn clear_external_bonus(&mut self, key: &str) -> bool {
        self.commander
            .clear(stats::AUTOMATED_POINTS, &ModifierId::external(key))
            .is_some()
    }
}
