//! Aptitudes: ordered, prerequisite-gated sections of skills.
//!
//! A section unlocks once enough skills are Active in strictly earlier
//! sections of the same aptitude. `choose_only_one` sections hold at most one
//! Active skill; swapping is the caller's job (deactivate, then activate).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AptitudeSection {
    pub skills: Vec<String>,
    #[serde(default)]
    pub required_previous_skills: u32,
    #[serde(default)]
    pub choose_only_one: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aptitude {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Exclusion tags: two assigned officers may not share any of these.
    #[serde(default)]
    pub categories: Vec<String>,
    /// Active whenever an officer of this aptitude is assigned. Never in a section.
    #[serde(default)]
    pub origin_skill: Option<String>,
    #[serde(default)]
    pub sections: Vec<AptitudeSection>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillState {
    Locked,
    Unlockable,
    Active,
}

/// One skill's position and state, as shown by presentation layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillStatus {
    pub skill: String,
    pub section: usize,
    pub state: SkillState,
}

impl Aptitude {
    pub fn section_of(&self, skill: &str) -> Option<usize> {
        self.sections
            .iter()
            .position(|section| section.skills.iter().any(|id| id == skill))
    }

    pub fn is_origin(&self, skill: &str) -> bool {
        self.origin_skill.as_deref() == Some(skill)
    }

    pub fn contains(&self, skill: &str) -> bool {
        self.is_origin(skill) || self.section_of(skill).is_some()
    }

    /// Every section skill, earliest section first.
    pub fn skills(&self) -> impl Iterator<Item = &str> {
        self.sections
            .iter()
            .flat_map(|section| section.skills.iter().map(String::as_str))
    }

    /// Active skills in sections strictly before `section`.
    pub fn active_before(&self, section: usize, active: &BTreeSet<String>) -> u32 {
        self.sections
            .iter()
            .take(section)
            .flat_map(|s| s.skills.iter())
            .filter(|skill| active.contains(*skill))
            .count() as u32
    }

    pub fn can_activate(&self, section: usize, active: &BTreeSet<String>) -> bool {
        self.sections
            .get(section)
            .is_some_and(|s| self.active_before(section, active) >= s.required_previous_skills)
    }

    /// Gate and exclusivity checks for activating `skill` on top of `active`.
    pub fn check_activation(
        &self,
        skill: &str,
        active: &BTreeSet<String>,
    ) -> Result<(), EngineError> {
        let index = self
            .section_of(skill)
            .ok_or_else(|| EngineError::SkillNotInAptitude {
                skill: skill.to_string(),
                aptitude: self.id.clone(),
            })?;
        if active.contains(skill) {
            return Err(EngineError::SkillAlreadyActive(skill.to_string()));
        }
        let section = &self.sections[index];
        let found = self.active_before(index, active);
        if found < section.required_previous_skills {
            return Err(EngineError::SectionGateNotMet {
                skill: skill.to_string(),
                required: section.required_previous_skills,
                active: found,
            });
        }
        if section.choose_only_one {
            if let Some(existing) = section.skills.iter().find(|id| active.contains(*id)) {
                return Err(EngineError::ChooseOnlyOneViolation {
                    skill: skill.to_string(),
                    active: existing.clone(),
                });
            }
        }
        Ok(())
    }

    /// Rejects removing `skill` when a later Active skill would lose its gate.
    pub fn check_deactivation(
        &self,
        skill: &str,
        active: &BTreeSet<String>,
    ) -> Result<(), EngineError> {
        if self.is_origin(skill) {
            return Err(EngineError::OriginSkillLocked(skill.to_string()));
        }
        let Some(index) = self.section_of(skill) else {
            return Err(EngineError::SkillNotInAptitude {
                skill: skill.to_string(),
                aptitude: self.id.clone(),
            });
        };
        if !active.contains(skill) {
            return Err(EngineError::SkillNotActive(skill.to_string()));
        }

        let mut remaining = active.clone();
        remaining.remove(skill);
        for (later, section) in self.sections.iter().enumerate().skip(index + 1) {
            if self.active_before(later, &remaining) >= section.required_previous_skills {
                continue;
            }
            if let Some(dependent) = section.skills.iter().find(|id| remaining.contains(*id)) {
                return Err(EngineError::DependentSkillActive {
                    skill: skill.to_string(),
                    dependent: dependent.clone(),
                });
            }
        }
        Ok(())
    }

    /// `Locked → Unlockable → Active` for every section skill.
    pub fn skill_states(&self, active: &BTreeSet<String>) -> Vec<SkillStatus> {
        self.sections
            .iter()
            .enumerate()
            .flat_map(|(index, section)| {
                let unlocked = self.can_activate(index, active);
                section.skills.iter().map(move |skill| SkillStatus {
                    skill: skill.clone(),
                    section: index,
                    state: if active.contains(skill) {
                        SkillState::Active
                    } else if unlocked {
                        SkillState::Unlockable
                    } else {
                        SkillState::Locked
                    },
                })
            })
            .collect()
    }

    /// `active` ordered earliest section first, so replaying it one by one
    /// satisfies every gate along the way.
    pub fn activation_order<'a>(&self, active: &'a BTreeSet<String>) -> Vec<&'a str> {
        let mut ordered: Vec<&str> = active.iter().map(String::as_str).collect();
        ordered.sort_by_key(|skill| (self.section_of(skill).unwrap_or(usize::MAX), *skill));
        ordered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn automated() -> Aptitude {
        Aptitude {
            id: "sc_automated".into(),
            name: "Automated".into(),
            categories: vec![],
            origin_skill: Some("sc_automated_automated_ships".into()),
            sections: vec![
                AptitudeSection {
                    skills: vec!["a1".into(), "a2".into()],
                    required_previous_skills: 0,
                    choose_only_one: false,
                },
                AptitudeSection {
                    skills: vec!["b1".into(), "b2".into()],
                    required_previous_skills: 2,
                    choose_only_one: false,
                },
                AptitudeSection {
                    skills: vec!["c1".into(), "c2".into()],
                    required_previous_skills: 4,
                    choose_only_one: true,
                },
            ],
        }
    }

    fn set(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn states_follow_gate_counts() {
        let apt = automated();
        let states = apt.skill_states(&set(&["a1"]));
        let state_of = |skill: &str| states.iter().find(|s| s.skill == skill).unwrap().state;
        assert_eq!(state_of("a1"), SkillState::Active);
        assert_eq!(state_of("a2"), SkillState::Unlockable);
        assert_eq!(state_of("b1"), SkillState::Locked);
    }

    #[test]
    fn origin_skill_is_not_a_section_skill() {
        let apt = automated();
        assert!(apt.contains("sc_automated_automated_ships"));
        assert!(apt.section_of("sc_automated_automated_ships").is_none());
        assert!(matches!(
            apt.check_deactivation("sc_automated_automated_ships", &set(&[])),
            Err(EngineError::OriginSkillLocked(_))
        ));
    }

    #[test]
    fn deactivation_protects_dependents() {
        let apt = automated();
        let active = set(&["a1", "a2", "b1"]);
        assert_eq!(
            apt.check_deactivation("a1", &active),
            Err(EngineError::DependentSkillActive {
                skill: "a1".into(),
                dependent: "b1".into(),
            })
        );
        assert!(apt.check_deactivation("b1", &active).is_ok());
    }

    #[test]
    fn activation_order_replays_earliest_first() {
        let apt = automated();
        let active = set(&["b1", "a2", "a1"]);
        assert_eq!(apt.activation_order(&active), vec!["a1", "a2", "b1"]);
    }
}
