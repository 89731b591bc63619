//! Engine configuration structures and loaders.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::budget::ThresholdCurve;
use crate::error::ConfigError;

pub const CONFIG_ENV: &str = "WARDROOM_CONFIG";
pub const BIND_ENV: &str = "WARDROOM_BIND";
pub const DEFAULT_CONFIG_PATH: &str = "data/engine.yaml";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const MAX_FLEET_SLOTS: usize = 4;

/// Tunables for one fleet engine. Balance numbers live here, not in code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub fleet_slots: usize,
    pub max_officer_level: u8,
    pub skill_points_per_level: u32,
    /// Scales every point contribution a skill declares.
    pub auto_points_mult: f64,
    pub threshold: ThresholdCurve,
    /// Multiplier presets for named AI cores, used by scenario files that leave
    /// a core's multiplier unset.
    pub core_multipliers: BTreeMap<String, f64>,
    pub default_tick_seconds: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fleet_slots: 3,
            max_officer_level: 5,
            skill_points_per_level: 1,
            auto_points_mult: 1.0,
            threshold: ThresholdCurve::default(),
            core_multipliers: BTreeMap::from([
                ("alpha".to_string(), 4.0),
                ("beta".to_string(), 3.0),
                ("gamma".to_string(), 2.0),
            ]),
            default_tick_seconds: 1.0,
        }
    }
}

impl EngineConfig {
    /// Loads from `WARDROOM_CONFIG`, or `data/engine.yaml` when unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_or_default(path)
    }

    /// A missing file yields defaults; an unreadable or invalid one is an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no engine config found, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = serde_yaml::from_str(&raw).map_err(|source| ConfigError::Yaml {
            path: path.display().to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_FLEET_SLOTS).contains(&self.fleet_slots) {
            return Err(ConfigError::Invalid(format!(
                "fleet_slots must be within 1..={MAX_FLEET_SLOTS}, got {}",
                self.fleet_slots
            )));
        }
        if self.max_officer_level == 0 {
            return Err(ConfigError::Invalid("max_officer_level must be at least 1".into()));
        }
        if !(self.auto_points_mult.is_finite() && self.auto_points_mult >= 0.0) {
            return Err(ConfigError::Invalid(
                "auto_points_mult must be a non-negative number".into(),
            ));
        }
        if !(self.threshold.max_bonus.is_finite() && self.threshold.max_bonus >= 0.0) {
            return Err(ConfigError::Invalid(
                "threshold.max_bonus must be a non-negative number".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.threshold.floor) {
            return Err(ConfigError::Invalid(
                "threshold.floor must be a fraction within 0..=1".into(),
            ));
        }
        if let Some((name, _)) = self.core_multipliers.iter().find(|(_, mult)| **mult < 0.0) {
            return Err(ConfigError::Invalid(format!(
                "core multiplier '{name}' must not be negative"
            )));
        }
        if !(self.default_tick_seconds > 0.0) {
            return Err(ConfigError::Invalid(
                "default_tick_seconds must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn core_multiplier(&self, core_id: &str) -> Option<f64> {
        self.core_multipliers.get(core_id).copied()
    }
}

pub fn bind_addr() -> String {
    env::var(BIND_ENV).unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
}
