//! Fleet officer skill engine: modifier ledgers, skill plugins with an
//! activation lifecycle, gated aptitude trees, and the automated ships
//! points budget.

pub mod aptitude;
pub mod budget;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod fleet;
pub mod ledger;
pub mod logging;
pub mod officer;
pub mod parallel;
pub mod persistence;
pub mod report;
pub mod server;
pub mod skills;

pub use catalog::Catalog;
pub use config::EngineConfig;
pub use engine::{FleetEngine, TickReport};
pub use error::{EngineError, HookFailure, ModifierLeak};
