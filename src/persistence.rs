//! Durable fleet state: which officer sits in which slot, and which skills each
//! has chosen. Ledgers and budgets are never stored; restoring replays the
//! assignments and lets the engine rebuild them.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::catalog::Catalog;
use crate::config::EngineConfig;
use crate::engine::FleetEngine;
use crate::error::PersistenceError;
use crate::officer::Officer;

pub const STATE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotRecord {
    pub slot: usize,
    pub officer: Officer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DurableState {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub fleet_slots: usize,
    pub slots: Vec<SlotRecord>,
}

impl DurableState {
    pub fn capture(engine: &FleetEngine) -> Self {
        Self {
            version: STATE_VERSION,
            saved_at: Utc::now(),
            fleet_slots: engine.slots().len(),
            slots: engine
                .slots()
                .assigned()
                .map(|(slot, officer)| SlotRecord {
                    slot,
                    officer: officer.clone(),
                })
                .collect(),
        }
    }

    pub fn to_json(&self) -> Result<String, PersistenceError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(raw: &str) -> Result<Self, PersistenceError> {
        let state: Self = serde_json::from_str(raw)?;
        if state.version != STATE_VERSION {
            return Err(PersistenceError::Version {
                found: state.version,
                expected: STATE_VERSION,
            });
        }
        Ok(state)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PersistenceError> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?).map_err(|source| PersistenceError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| PersistenceError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// A fresh engine with every recorded officer reassigned. Each officer's
    /// skills are re-checked against the catalog, earliest section first.
    /// The configured slot count must match the saved one.
    pub fn restore(
        &self,
        config: EngineConfig,
        catalog: Arc<Catalog>,
    ) -> Result<FleetEngine, PersistenceError> {
        if self.fleet_slots != config.fleet_slots {
            return Err(PersistenceError::SlotCountMismatch {
                saved: self.fleet_slots,
                configured: config.fleet_slots,
            });
        }
        let mut engine = FleetEngine::new(config, catalog);
        for record in &self.slots {
            engine.assign(record.slot, record.officer.clone())?;
        }
        info!(
            session = %engine.session(),
            officers = self.slots.len(),
            saved_at = %self.saved_at,
            "fleet restored from durable state"
        );
        Ok(engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_version() {
        let raw = r#"{"version":99,"saved_at":"2026-01-01T00:00:00Z","fleet_slots":3,"slots":[]}"#;
        assert!(matches!(
            DurableState::from_json(raw),
            Err(PersistenceError::Version { found: 99, .. })
        ));
    }

    #[test]
    fn empty_fleet_round_trips() {
        let engine = FleetEngine::new(EngineConfig::default(), Arc::new(Catalog::default()));
        let state = DurableState::capture(&engine);
        let parsed = DurableState::from_json(&state.to_json().unwrap()).unwrap();
        assert_eq!(parsed, state);
        assert!(parsed.slots.is_empty());
    }
}
