use std::collections::BTreeMap;

use crate::fleet::Entity;
use crate::ledger::{ModifierId, ModifierKind, StatLedger};

/// Which ledger a staged write lands in.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Target {
    Commander,
    Entity(String),
}

impl Target {
    pub fn entity(id: impl Into<String>) -> Self {
        Self::Entity(id.into())
    }
}

/// A ledger write requested by a hook. Applied only if the hook succeeds.
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerOp {
    Set {
        target: Target,
        stat: String,
        id: ModifierId,
        kind: ModifierKind,
        value: f64,
        label: String,
    },
    Clear {
        target: Target,
        stat: String,
        id: ModifierId,
    },
    /// Every modifier the skill owns, on the commander and on every entity.
    ClearOwned,
}

/// What a hook sees: read access to the settled fleet state, and a write
/// buffer whose modifier ids are always namespaced to the calling skill.
pub struct SkillContext<'a> {
    skill: &'a str,
    label: &'a str,
    tick: u64,
    elapsed: f64,
    commander: &'a StatLedger,
    entities: &'a BTreeMap<String, Entity>,
    ops: Vec<LedgerOp>,
}

impl<'a> SkillContext<'a> {
    pub fn new(
        skill: &'a str,
        label: &'a str,
        tick: u64,
        elapsed: f64,
        commander: &'a StatLedger,
        entities: &'a BTreeMap<String, Entity>,
    ) -> Self {
        Self {
            skill,
            label,
            tick,
            elapsed,
            commander,
            entities,
            ops: Vec::new(),
        }
    }

    pub fn skill_id(&self) -> &str {
        self.skill
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Seconds of simulated time since the engine started.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn commander(&self) -> &StatLedger {
        self.commander
    }

    pub fn entity(&self, id: &str) -> Option<&'a Entity> {
        self.entities.get(id)
    }

    pub fn entities(&self) -> impl Iterator<Item = &'a Entity> {
        self.entities.values()
    }

    pub fn set(&mut self, target: Target, stat: &str, kind: ModifierKind, value: f64) {
        let id = ModifierId::skill(self.skill);
        self.push_set(target, stat, id, kind, value);
    }

    /// Like [`set`](Self::set), for skills that keep several modifiers on one stat.
    pub fn set_part(
        &mut self,
        target: Target,
        stat: &str,
        part: &str,
        kind: ModifierKind,
        value: f64,
    ) {
        let id = ModifierId::skill(self.skill).with_part(part);
        self.push_set(target, stat, id, kind, value);
    }

    pub fn clear(&mut self, target: Target, stat: &str) {
        self.ops.push(LedgerOp::Clear {
            target,
            stat: stat.to_string(),
            id: ModifierId::skill(self.skill),
        });
    }

    pub fn clear_part(&mut self, target: Target, stat: &str, part: &str) {
        self.ops.push(LedgerOp::Clear {
            target,
            stat: stat.to_string(),
            id: ModifierId::skill(self.skill).with_part(part),
        });
    }

    pub fn clear_owned(&mut self) {
        self.ops.push(LedgerOp::ClearOwned);
    }

    pub fn staged(&self) -> &[LedgerOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<LedgerOp> {
        self.ops
    }

    fn push_set(
        &mut self,
        target: Target,
        stat: &str,
        id: ModifierId,
        kind: ModifierKind,
        value: f64,
    ) {
        self.ops.push(LedgerOp::Set {
            target,
            stat: stat.to_string(),
            id,
            kind,
            value,
            label: self.label.to_string(),
        });
    }
}
