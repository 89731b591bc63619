use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::aptitude::Aptitude;
use crate::error::EngineError;

/// Holder of exactly one aptitude, with a bounded level and the skills chosen
/// from that aptitude's sections. The origin skill is never stored here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Officer {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub aptitude: String,
    #[serde(default = "default_level")]
    pub level: u8,
    #[serde(default)]
    pub active_skills: BTreeSet<String>,
}

fn default_level() -> u8 {
    1
}

impl Officer {
    pub fn new(id: impl Into<String>, aptitude: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            aptitude: aptitude.into(),
            level: 1,
            active_skills: BTreeSet::new(),
        }
    }

    pub fn with_level(mut self, level: u8, max_level: u8) -> Result<Self, EngineError> {
        check_level(level, max_level)?;
        self.level = level;
        Ok(self)
    }

    /// Raises the level by one, saturating at `max_level`. Returns the new level.
    pub fn level_up(&mut self, max_level: u8) -> u8 {
        self.level = self.level.saturating_add(1).min(max_level.max(1));
        self.level
    }

    pub fn skill_points(&self, per_level: u32) -> u32 {
        u32::from(self.level) * per_level
    }

    pub fn points_used(&self) -> u32 {
        self.active_skills.len() as u32
    }

    /// Every check for choosing `skill`, without changing anything.
    pub fn check_activation(
        &self,
        aptitude: &Aptitude,
        skill: &str,
        per_level: u32,
    ) -> Result<(), EngineError> {
        aptitude.check_activation(skill, &self.active_skills)?;
        let available = self.skill_points(per_level);
        if self.points_used() >= available {
            return Err(EngineError::SkillPointsExhausted {
                officer: self.id.clone(),
                used: self.points_used(),
                available,
            });
        }
        Ok(())
    }
}

pub fn check_level(level: u8, max_level: u8) -> Result<(), EngineError> {
    if level == 0 || level > max_level {
        return Err(EngineError::InvalidLevel {
            level,
            max: max_level,
        });
    }
    Ok(())
}
