use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::stacking::{CategoryTotals, ModifierKind};

/// Who installed a modifier. Kept separate from the display label so ids can
/// never collide through string concatenation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum ModifierOwner {
    /// A skill plugin, keyed by its globally unique skill id.
    Skill(String),
    /// A bonus injected from outside the engine (campaign events, other systems).
    External(String),
    /// The resource budget engine's own combat-readiness offset.
    Budget,
}

impl ModifierOwner {
    pub fn is_external(&self) -> bool {
        matches!(self, Self::External(_))
    }
}

impl fmt::Display for ModifierOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skill(id) => write!(f, "skill:{id}"),
            Self::External(key) => write!(f, "external:{key}"),
            Self::Budget => write!(f, "budget"),
        }
    }
}

/// Structured modifier key: the owner plus an optional sub-slot for owners
/// that install more than one modifier on the same stat.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ModifierId {
    pub owner: ModifierOwner,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part: Option<String>,
}

impl ModifierId {
    pub fn new(owner: ModifierOwner) -> Self {
        Self { owner, part: None }
    }

    pub fn skill(skill_id: impl Into<String>) -> Self {
        Self::new(ModifierOwner::Skill(skill_id.into()))
    }

    pub fn external(key: impl Into<String>) -> Self {
        Self::new(ModifierOwner::External(key.into()))
    }

    pub fn budget() -> Self {
        Self::new(ModifierOwner::Budget)
    }

    pub fn with_part(mut self, part: impl Into<String>) -> Self {
        self.part = Some(part.into());
        self
    }
}

impl fmt::Display for ModifierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.part {
            Some(part) => write!(f, "{}#{part}", self.owner),
            None => write!(f, "{}", self.owner),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    pub kind: ModifierKind,
    pub value: f64,
    /// Human-readable source shown by presentation layers. Never used for identity.
    #[serde(default)]
    pub label: String,
}

/// Per-statistic table of named adjustments.
///
/// At most one entry exists per `(stat, id)`; `set` replaces, `clear` is a
/// no-op when absent. Stats with no remaining entries are dropped so a ledger
/// that had everything removed compares equal to a fresh one. Ledgers are
/// derived state and are never serialized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatLedger {
    entries: BTreeMap<String, BTreeMap<ModifierId, Modifier>>,
}

impl StatLedger {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Installs or replaces the modifier keyed by `(stat, id)`. Returns the previous entry.
    pub fn set(
        &mut self,
        stat: &str,
        id: ModifierId,
        kind: ModifierKind,
        value: f64,
        label: impl Into<String>,
    ) -> Option<Modifier> {
        self.entries.entry(stat.to_string()).or_default().insert(
            id,
            Modifier {
                kind,
                value,
                label: label.into(),
            },
        )
    }

    pub fn clear(&mut self, stat: &str, id: &ModifierId) -> Option<Modifier> {
        let per_stat = self.entries.get_mut(stat)?;
        let removed = per_stat.remove(id);
        if per_stat.is_empty() {
            self.entries.remove(stat);
        }
        removed
    }

    /// Removes every modifier installed by `owner`, on every stat. Returns how many were removed.
    pub fn clear_owner(&mut self, owner: &ModifierOwner) -> usize {
        let mut removed = 0;
        self.entries.retain(|_, per_stat| {
            let before = per_stat.len();
            per_stat.retain(|id, _| &id.owner != owner);
            removed += before - per_stat.len();
            !per_stat.is_empty()
        });
        removed
    }

    pub fn get(&self, stat: &str, id: &ModifierId) -> Option<&Modifier> {
        self.entries.get(stat).and_then(|per_stat| per_stat.get(id))
    }

    pub fn totals_for(&self, stat: &str) -> CategoryTotals {
        let mut totals = CategoryTotals::default();
        if let Some(per_stat) = self.entries.get(stat) {
            for modifier in per_stat.values() {
                totals.apply(modifier.kind, modifier.value);
            }
        }
        totals
    }

    /// Effective value of `stat` for `base`. Pure: never mutates the ledger.
    pub fn effective(&self, stat: &str, base: f64) -> f64 {
        self.totals_for(stat).compose(base)
    }

    pub fn modifiers<'a>(
        &'a self,
        stat: &str,
    ) -> impl Iterator<Item = (&'a ModifierId, &'a Modifier)> + 'a {
        self.entries
            .get(stat)
            .into_iter()
            .flat_map(|per_stat| per_stat.iter())
    }

    /// `(stat, id)` pairs currently installed by `owner`.
    pub fn owned_by(&self, owner: &ModifierOwner) -> Vec<(String, ModifierId)> {
        self.entries
            .iter()
            .flat_map(|(stat, per_stat)| {
                per_stat
                    .keys()
                    .filter(|id| &id.owner == owner)
                    .map(move |id| (stat.clone(), id.clone()))
            })
            .collect()
    }

    /// Every entry as `(stat, id, modifier)`, ordered by stat then id.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ModifierId, &Modifier)> {
        self.entries.iter().flat_map(|(stat, per_stat)| {
            per_stat
                .iter()
                .map(move |(id, modifier)| (stat.as_str(), id, modifier))
        })
    }

    pub fn stats(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_drops_empty_stat_tables() {
        let mut ledger = StatLedger::new();
        ledger.set("armor", ModifierId::skill("a"), ModifierKind::Flat, 5.0, "A");
        assert!(ledger.clear("armor", &ModifierId::skill("a")).is_some());
        assert_eq!(ledger, StatLedger::new());
    }

    #[test]
    fn parts_are_distinct_keys_for_the_same_owner() {
        let mut ledger = StatLedger::new();
        let id = ModifierId::skill("drills");
        ledger.set("damage", id.clone(), ModifierKind::Percent, 5.0, "");
        ledger.set("damage", id.clone().with_part("missile"), ModifierKind::Percent, 5.0, "");

        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.clear_owner(&id.owner), 2);
        assert!(ledger.is_empty());
    }

    #[test]
    fn display_keeps_owner_and_part_apart() {
        let id = ModifierId::skill("sc_tactical_drills").with_part("ballistic");
        assert_eq!(id.to_string(), "skill:sc_tactical_drills#ballistic");
        assert_eq!(ModifierId::budget().to_string(), "budget");
    }
}
