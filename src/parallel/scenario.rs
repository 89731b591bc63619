//! Fleet scenarios: a starting fleet, a scripted list of events, and a number
//! of ticks to run it for. Scenarios are independent, so a batch of them can
//! run on separate workers.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::budget::BudgetSnapshot;
use crate::catalog::Catalog;
use crate::config::EngineConfig;
use crate::engine::{FleetEngine, TickReport};
use crate::error::{EngineError, ScenarioError};
use crate::fleet::EntitySpec;
use crate::parallel::batch::batch_ranges;
use crate::parallel::pool::WorkerPool;
use crate::persistence::SlotRecord;
use crate::report::{summarize, AutomatedPointsSummary};

fn default_ticks() -> u32 {
    10
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalBonus {
    pub key: String,
    pub points: f64,
    #[serde(default)]
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScenarioAction {
    Spawn { entity: EntitySpec },
    Remove { entity: String },
    Activate { slot: usize, skill: String },
    Deactivate { slot: usize, skill: String },
    Unassign { slot: usize },
    LevelUp { slot: usize },
}

/// An action applied just before tick `at_tick` runs. Ticks count from 1;
/// `0` and `1` both land before the first tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioEvent {
    pub at_tick: u64,
    pub action: ScenarioAction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub officers: Vec<SlotRecord>,
    #[serde(default)]
    pub entities: Vec<EntitySpec>,
    #[serde(default)]
    pub external_bonuses: Vec<ExternalBonus>,
    #[serde(default = "default_ticks")]
    pub ticks: u32,
    /// Overrides `default_tick_seconds` from the engine config.
    #[serde(default)]
    pub tick_seconds: Option<f64>,
    #[serde(default)]
    pub events: Vec<ScenarioEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedEvent {
    pub at_tick: u64,
    pub kind: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioOutcome {
    pub name: String,
    pub ticks: Vec<TickReport>,
    pub final_budget: BudgetSnapshot,
    pub summary: AutomatedPointsSummary,
    pub active_skills: Vec<String>,
    pub hook_failures: usize,
    pub rejected_events: Vec<RejectedEvent>,
}

pub fn parse_scenario(raw: &str, origin: &str) -> Result<Scenario, ScenarioError> {
    serde_yaml::from_str(raw).map_err(|source| ScenarioError::Yaml {
        path: origin.to_string(),
        source,
    })
}

pub fn load_scenario(path: impl AsRef<Path>) -> Result<Scenario, ScenarioError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| ScenarioError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_scenario(&raw, &path.display().to_string())
}

/// Every `*.yaml` / `*.yml` file in `dir`, sorted by file name.
pub fn load_scenario_dir(dir: impl AsRef<Path>) -> Result<Vec<Scenario>, ScenarioError> {
    let dir = dir.as_ref();
    let entries = fs::read_dir(dir).map_err(|source| ScenarioError::Io {
        path: dir.display().to_string(),
        source,
    })?;
    let mut paths: Vec<_> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            matches!(
                path.extension().and_then(|ext| ext.to_str()),
                Some("yaml") | Some("yml")
            )
        })
        .collect();
    paths.sort();
    paths.iter().map(load_scenario).collect()
}

/// Builds the starting fleet, then runs every tick, applying scripted events
/// as their tick comes up. Setup rejections abort the scenario; rejected
/// events are recorded and the run continues.
pub fn run_scenario(
    scenario: &Scenario,
    config: &EngineConfig,
    catalog: Arc<Catalog>,
) -> Result<ScenarioOutcome, ScenarioError> {
    let setup = |source: EngineError| ScenarioError::Setup {
        scenario: scenario.name.clone(),
        source,
    };

    let mut engine = FleetEngine::new(config.clone(), catalog);
    for bonus in &scenario.external_bonuses {
        let label = if bonus.label.is_empty() {
            bonus.key.as_str()
        } else {
            bonus.label.as_str()
        };
        engine.set_external_bonus(&bonus.key, bonus.points, label);
    }
    for spec in &scenario.entities {
        engine
            .materialize(with_core_preset(spec, config))
            .map_err(setup)?;
    }
    for record in &scenario.officers {
        engine
            .assign(record.slot, record.officer.clone())
            .map_err(setup)?;
    }

    let mut events: Vec<&ScenarioEvent> = scenario.events.iter().collect();
    events.sort_by_key(|event| event.at_tick);
    let mut pending = events.into_iter().peekable();

    let dt = scenario.tick_seconds.unwrap_or(config.default_tick_seconds);
    let mut ticks = Vec::with_capacity(scenario.ticks as usize);
    let mut rejected_events = Vec::new();
    for _ in 0..scenario.ticks {
        let next_tick = engine.tick() + 1;
        while let Some(event) = pending.next_if(|event| event.at_tick <= next_tick) {
            if let Err(err) = apply_event(&mut engine, config, &event.action) {
                warn!(
                    scenario = %scenario.name,
                    at_tick = event.at_tick,
                    kind = err.kind(),
                    "scenario event rejected: {err}"
                );
                rejected_events.push(RejectedEvent {
                    at_tick: event.at_tick,
                    kind: err.kind(),
                    message: err.to_string(),
                });
            }
        }
        ticks.push(engine.advance(dt));
    }

    let outcome = ScenarioOutcome {
        name: scenario.name.clone(),
        final_budget: engine.budget(),
        summary: summarize(&engine),
        active_skills: engine.active_skills().map(str::to_string).collect(),
        hook_failures: engine.failures().len(),
        rejected_events,
        ticks,
    };
    info!(
        scenario = %outcome.name,
        ticks = outcome.ticks.len(),
        used = outcome.final_budget.used,
        maximum = outcome.final_budget.maximum,
        bonus_percent = outcome.final_budget.bonus_percent,
        "scenario complete"
    );
    Ok(outcome)
}

/// Scenario files name their cores; an entry that leaves the multiplier unset
/// takes the configured preset for that core, if any.
fn with_core_preset(spec: &EntitySpec, config: &EngineConfig) -> EntitySpec {
    let mut spec = spec.clone();
    if let Some(core) = spec.core.as_mut().filter(|core| core.points_multiplier == 0.0) {
        if let Some(multiplier) = config.core_multiplier(&core.id) {
            core.points_multiplier = multiplier;
        }
    }
    spec
}

fn apply_event(
    engine: &mut FleetEngine,
    config: &EngineConfig,
    action: &ScenarioAction,
) -> Result<(), EngineError> {
    match action {
        ScenarioAction::Spawn { entity } => engine
            .materialize(with_core_preset(entity, config))
            .map(|_| ()),
        ScenarioAction::Remove { entity } => engine.remove_entity(entity).map(|_| ()),
        ScenarioAction::Activate { slot, skill } => engine.activate_skill(*slot, skill),
        ScenarioAction::Deactivate { slot, skill } => engine.deactivate_skill(*slot, skill),
        ScenarioAction::Unassign { slot } => engine.unassign(*slot).map(|_| ()),
        ScenarioAction::LevelUp { slot } => engine.level_up(*slot).map(|_| ()),
    }
}

/// Runs each scenario on its own engine across the pool's workers, one batch
/// per worker. Results keep the input order.
pub fn run_scenarios(
    scenarios: &[Scenario],
    config: &EngineConfig,
    catalog: Arc<Catalog>,
    pool: &WorkerPool,
) -> Vec<Result<ScenarioOutcome, ScenarioError>> {
    pool.install(|| {
        batch_ranges(scenarios.len(), rayon::current_num_threads())
            .into_par_iter()
            .flat_map_iter(|(start, end)| {
                let outcomes: Vec<_> = scenarios[start..end]
                    .iter()
                    .map(|scenario| run_scenario(scenario, config, Arc::clone(&catalog)))
                    .collect();
                debug!(start, end, "scenario batch finished");
                outcomes
            })
            .collect()
    })
}
