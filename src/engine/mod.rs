//! Per-fleet runtime: officer slots, active skill plugins, the commander and
//! entity ledgers, and the tick loop that keeps them in step.
//!
//! Every rejection is decided before anything changes. Plugin hooks run
//! isolated; their writes land only when the hook succeeds.

mod entities;
mod hooks;
mod tick;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::aptitude::SkillStatus;
use crate::catalog::Catalog;
use crate::config::EngineConfig;
use crate::error::{EngineError, HookFailure, HookKind, ModifierLeak};
use crate::fleet::{check_assignment, Entity, FleetSlots};
use crate::ledger::{ModifierOwner, StatLedger};
use crate::officer::{check_level, Officer};
use crate::skills::{LedgerOp, SkillPlugin, Target};

use hooks::{invoke, FleetView};

pub use tick::TickReport;

struct ActiveSkill {
    slot: usize,
    plugin: Box<dyn SkillPlugin>,
}

pub struct FleetEngine {
    session: Uuid,
    config: EngineConfig,
    catalog: Arc<Catalog>,
    slots: FleetSlots,
    commander: StatLedger,
    entities: BTreeMap<String, Entity>,
    active: BTreeMap<String, ActiveSkill>,
    tick: u64,
    elapsed: f64,
    failures: Vec<HookFailure>,
}

impl fmt::Debug for FleetEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FleetEngine")
            .field("session", &self.session)
            .field("tick", &self.tick)
            .field("slots", &self.slots)
            .field("active", &self.active.keys().collect::<Vec<_>>())
            .field("entities", &self.entities.len())
            .finish()
    }
}

impl FleetEngine {
    pub fn new(config: EngineConfig, catalog: Arc<Catalog>) -> Self {
        let session = Uuid::new_v4();
        info!(%session, slots = config.fleet_slots, "fleet engine created");
        Self {
            session,
            slots: FleetSlots::new(config.fleet_slots),
            config,
            catalog,
            commander: StatLedger::new(),
            entities: BTreeMap::new(),
            active: BTreeMap::new(),
            tick: 0,
            elapsed: 0.0,
            failures: Vec::new(),
        }
    }

    pub fn session(&self) -> Uuid {
        self.session
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn slots(&self) -> &FleetSlots {
        &self.slots
    }

    pub fn officer(&self, slot: usize) -> Option<&Officer> {
        self.slots.get(slot)
    }

    pub fn commander(&self) -> &StatLedger {
        &self.commander
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Every hook failure recorded so far, oldest first.
    pub fn failures(&self) -> &[HookFailure] {
        &self.failures
    }

    pub fn take_failures(&mut self) -> Vec<HookFailure> {
        std::mem::take(&mut self.failures)
    }

    pub fn active_skills(&self) -> impl Iterator<Item = &str> {
        self.active.keys().map(String::as_str)
    }

    pub fn is_active(&self, skill: &str) -> bool {
        self.active.contains_key(skill)
    }

    /// Slot of the officer whose aptitude brought `skill` in.
    pub fn skill_slot(&self, skill: &str) -> Option<usize> {
        self.active.get(skill).map(|active| active.slot)
    }

    /// Effective value of `stat` on the commander (base 0) or an entity.
    pub fn effective(&self, target: &Target, stat: &str) -> Result<f64, EngineError> {
        match target {
            Target::Commander => Ok(self.commander.effective(stat, 0.0)),
            Target::Entity(id) => self
                .entities
                .get(id)
                .map(|entity| entity.effective(stat))
                .ok_or_else(|| EngineError::UnknownEntity(id.clone())),
        }
    }

    /// Binds `officer` into `slot`, replacing whoever held it. Skills already in
    /// `officer.active_skills` are checked and activated earliest section first.
    pub fn assign(
        &mut self,
        slot: usize,
        officer: Officer,
    ) -> Result<Option<Officer>, EngineError> {
        let catalog = Arc::clone(&self.catalog);
        check_level(officer.level, self.config.max_officer_level)?;
        check_assignment(&officer, slot, &self.slots, catalog.aptitudes())?;
        let aptitude = catalog
            .aptitude(&officer.aptitude)
            .ok_or_else(|| EngineError::UnknownAptitude(officer.aptitude.clone()))?;

        let order = aptitude.activation_order(&officer.active_skills);
        let mut replay = Officer {
            active_skills: BTreeSet::new(),
            ..officer.clone()
        };
        for skill in &order {
            replay.check_activation(aptitude, skill, self.config.skill_points_per_level)?;
            replay.active_skills.insert(skill.to_string());
        }

        let mut plugins = Vec::with_capacity(order.len() + 1);
        if let Some(origin) = aptitude.origin_skill.as_deref() {
            plugins.push(catalog.instantiate(origin, &self.config)?);
        }
        for skill in &order {
            plugins.push(catalog.instantiate(skill, &self.config)?);
        }

        let replaced = self.release_slot(slot);
        info!(
            session = %self.session,
            slot,
            officer = %officer.id,
            aptitude = %officer.aptitude,
            skills = officer.active_skills.len(),
            "officer assigned"
        );
        self.slots.place(slot, officer);
        for plugin in plugins {
            self.start_skill(slot, plugin);
        }
        Ok(replaced)
    }

    /// Removes the officer in `slot` after deactivating all of its skills.
    pub fn unassign(&mut self, slot: usize) -> Result<Officer, EngineError> {
        self.officer_in(slot)?;
        self.release_slot(slot).ok_or(EngineError::SlotEmpty { slot })
    }

    pub fn activate_skill(&mut self, slot: usize, skill: &str) -> Result<(), EngineError> {
        let catalog = Arc::clone(&self.catalog);
        let officer = self.officer_in(slot)?;
        if catalog.skill(skill).is_none() {
            return Err(EngineError::UnknownSkill(skill.to_string()));
        }
        let aptitude = catalog
            .aptitude(&officer.aptitude)
            .ok_or_else(|| EngineError::UnknownAptitude(officer.aptitude.clone()))?;
        if aptitude.is_origin(skill) {
            return Err(EngineError::SkillAlreadyActive(skill.to_string()));
        }
        officer.check_activation(aptitude, skill, self.config.skill_points_per_level)?;
        let plugin = catalog.instantiate(skill, &self.config)?;

        if let Some(officer) = self.slots.get_mut(slot) {
            officer.active_skills.insert(skill.to_string());
        }
        self.start_skill(slot, plugin);
        Ok(())
    }

    pub fn deactivate_skill(&mut self, slot: usize, skill: &str) -> Result<(), EngineError> {
        let catalog = Arc::clone(&self.catalog);
        let officer = self.officer_in(slot)?;
        let aptitude = catalog
            .aptitude(&officer.aptitude)
            .ok_or_else(|| EngineError::UnknownAptitude(officer.aptitude.clone()))?;
        aptitude.check_deactivation(skill, &officer.active_skills)?;

        if let Some(officer) = self.slots.get_mut(slot) {
            officer.active_skills.remove(skill);
        }
        self.stop_skill(skill);
        Ok(())
    }

    /// Deactivates every chosen skill of the officer in `slot`, latest section
    /// first. The origin skill stays. Returns the skills removed, in order.
    pub fn reset_skills(&mut self, slot: usize) -> Result<Vec<String>, EngineError> {
        let removed = self.chosen_skills_latest_first(self.officer_in(slot)?);
        if let Some(officer) = self.slots.get_mut(slot) {
            officer.active_skills.clear();
        }
        for skill in &removed {
            self.stop_skill(skill);
        }
        info!(session = %self.session, slot, removed = removed.len(), "skills reset");
        Ok(removed)
    }

    pub fn level_up(&mut self, slot: usize) -> Result<u8, EngineError> {
        self.officer_in(slot)?;
        let max = self.config.max_officer_level;
        let officer = self
            .slots
            .get_mut(slot)
            .ok_or(EngineError::SlotEmpty { slot })?;
        Ok(officer.level_up(max))
    }

    /// `Locked / Unlockable / Active` for every section skill of the officer in `slot`.
    pub fn skill_states(&self, slot: usize) -> Result<Vec<SkillStatus>, EngineError> {
        let officer = self.officer_in(slot)?;
        let aptitude = self
            .catalog
            .aptitude(&officer.aptitude)
            .ok_or_else(|| EngineError::UnknownAptitude(officer.aptitude.clone()))?;
        Ok(aptitude.skill_states(&officer.active_skills))
    }

    /// Modifiers still owned by `skill`. Empty for a correctly deactivated skill.
    pub fn audit_leaks(&self, skill: &str) -> Vec<ModifierLeak> {
        let owner = ModifierOwner::Skill(skill.to_string());
        let leak = |target: &str, stat: String| ModifierLeak {
            skill: skill.to_string(),
            target: target.to_string(),
            stat,
        };
        let mut leaks: Vec<ModifierLeak> = self
            .commander
            .owned_by(&owner)
            .into_iter()
            .map(|(stat, _)| leak("commander", stat))
            .collect();
        for (id, entity) in &self.entities {
            leaks.extend(
                entity
                    .stats
                    .owned_by(&owner)
                    .into_iter()
                    .map(|(stat, _)| leak(id, stat)),
            );
        }
        leaks
    }

    fn officer_in(&self, slot: usize) -> Result<&Officer, EngineError> {
        if slot >= self.slots.len() {
            return Err(EngineError::InvalidSlot {
                slot,
                slots: self.slots.len(),
            });
        }
        self.slots.get(slot).ok_or(EngineError::SlotEmpty { slot })
    }

    fn chosen_skills_latest_first(&self, officer: &Officer) -> Vec<String> {
        let mut skills: Vec<String> = match self.catalog.aptitude(&officer.aptitude) {
            Some(aptitude) => aptitude
                .activation_order(&officer.active_skills)
                .into_iter()
                .map(str::to_string)
                .collect(),
            None => officer.active_skills.iter().cloned().collect(),
        };
        skills.reverse();
        skills
    }

    fn release_slot(&mut self, slot: usize) -> Option<Officer> {
        let officer = self.slots.get(slot)?;
        let mut skills = self.chosen_skills_latest_first(officer);
        if let Some(origin) = self
            .catalog
            .aptitude(&officer.aptitude)
            .and_then(|aptitude| aptitude.origin_skill.clone())
        {
            skills.push(origin);
        }
        for skill in &skills {
            self.stop_skill(skill);
        }
        let officer = self.slots.take(slot)?;
        info!(session = %self.session, slot, officer = %officer.id, "officer unassigned");
        Some(officer)
    }

    fn view(&self) -> FleetView<'_> {
        FleetView {
            tick: self.tick,
            elapsed: self.elapsed,
            commander: &self.commander,
            entities: &self.entities,
        }
    }

    /// Activation edge: seed modifiers, catch up on existing entities, then
    /// join the tick loop.
    fn start_skill(&mut self, slot: usize, mut plugin: Box<dyn SkillPlugin>) {
        let skill = plugin.id().to_string();
        let label = plugin.name().to_string();
        let capabilities = plugin.capabilities();

        if capabilities.handles(HookKind::Activation) {
            let outcome = invoke(self.view(), &skill, &label, HookKind::Activation, None, |ctx| {
                plugin.on_activation(ctx)
            });
            self.settle(&skill, outcome);
        }

        if capabilities.handles(HookKind::AfterEntityCreated) {
            let ids: Vec<String> = self.entities.keys().cloned().collect();
            for id in ids {
                let view = self.view();
                let Some(entity) = view.entities.get(&id) else {
                    continue;
                };
                if entity.has_marker(&skill, HookKind::AfterEntityCreated) {
                    continue;
                }
                let outcome = invoke(
                    view,
                    &skill,
                    &label,
                    HookKind::AfterEntityCreated,
                    Some(&id),
                    |ctx| plugin.after_entity_created(ctx, entity),
                );
                if self.settle(&skill, outcome) {
                    self.mark(&id, &skill, HookKind::AfterEntityCreated);
                }
            }
        }

        info!(
            session = %self.session,
            slot,
            skill = %skill,
            points = plugin.provided_points(),
            "skill activated"
        );
        self.active.insert(skill, ActiveSkill { slot, plugin });
    }

    /// Deactivation edge. A failing cleanup hook still leaves nothing behind:
    /// the skill's whole namespace is purged.
    fn stop_skill(&mut self, skill: &str) {
        let Some(mut active) = self.active.remove(skill) else {
            return;
        };
        let label = active.plugin.name().to_string();
        let outcome = invoke(self.view(), skill, &label, HookKind::Deactivation, None, |ctx| {
            active.plugin.on_deactivation(ctx)
        });
        if !self.settle(skill, outcome) {
            self.purge_owner(skill);
        }
        for entity in self.entities.values_mut() {
            entity.remove_markers_for(skill);
        }

        let leaks = self.audit_leaks(skill);
        if !leaks.is_empty() {
            let stats: Vec<&str> = leaks.iter().map(|leak| leak.stat.as_str()).collect();
            warn!(
                session = %self.session,
                skill,
                leaks = leaks.len(),
                ?stats,
                "skill left modifiers behind after deactivation"
            );
        }
        info!(session = %self.session, slot = active.slot, skill, "skill deactivated");
    }

    /// Commits a successful hook's writes, or records its failure. Returns
    /// whether the hook succeeded.
    fn settle(&mut self, skill: &str, outcome: Result<Vec<LedgerOp>, HookFailure>) -> bool {
        match outcome {
            Ok(ops) => {
                self.commit(skill, ops);
                true
            }
            Err(failure) => {
                self.record_failure(failure);
                false
            }
        }
    }

    fn commit(&mut self, skill: &str, ops: Vec<LedgerOp>) {
        for op in ops {
            match op {
                LedgerOp::Set {
                    target,
                    stat,
                    id,
                    kind,
                    value,
                    label,
                } => {
                    if let Some(ledger) = self.ledger_mut(&target, skill) {
                        ledger.set(&stat, id, kind, value, label);
                    }
                }
                LedgerOp::Clear { target, stat, id } => {
                    if let Some(ledger) = self.ledger_mut(&target, skill) {
                        ledger.clear(&stat, &id);
                    }
                }
                LedgerOp::ClearOwned => self.purge_owner(skill),
            }
        }
    }

    fn ledger_mut(&mut self, target: &Target, skill: &str) -> Option<&mut StatLedger> {
        match target {
            Target::Commander => Some(&mut self.commander),
            Target::Entity(id) => {
                let ledger = self.entities.get_mut(id).map(|entity| &mut entity.stats);
                if ledger.is_none() {
                    warn!(skill, entity = %id, "dropping write for unknown entity");
                }
                ledger
            }
        }
    }

    fn purge_owner(&mut self, skill: &str) {
        let owner = ModifierOwner::Skill(skill.to_string());
        self.commander.clear_owner(&owner);
        for entity in self.entities.values_mut() {
            entity.stats.clear_owner(&owner);
        }
    }

    fn mark(&mut self, entity: &str, skill: &str, hook: HookKind) {
        if let Some(entity) = self.entities.get_mut(entity) {
            entity.set_marker(skill, hook);
        }
    }

    fn record_failure(&mut self, failure: HookFailure) {
        error!(
            session = %self.session,
            skill = %failure.skill,
            hook = %failure.hook,
            tick = failure.tick,
            entity = ?failure.entity,
            "skill hook failed, skipping: {}",
            failure.message
        );
        self.failures.push(failure);
    }
}
