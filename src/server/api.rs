use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::aptitude::SkillStatus;
use crate::budget::{unit_points, BudgetSnapshot};
use crate::engine::{FleetEngine, TickReport};
use crate::error::{EngineError, HookFailure};
use crate::fleet::{Entity, EntitySpec};
use crate::ledger::{ModifierKind, StatLedger};
use crate::officer::Officer;
use crate::persistence::DurableState;
use crate::report::summarize;

/// Upper bound on ticks advanced by a single request.
pub const MAX_TICKS_PER_REQUEST: u32 = 10_000;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Parse(#[from] serde_json::Error),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Rejected(#[from] EngineError),

    #[error("{0}")]
    Internal(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub engine: &'static str,
    pub version: &'static str,
    pub session: String,
    pub tick: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModifierView {
    pub stat: String,
    pub source: String,
    pub kind: ModifierKind,
    pub value: f64,
    pub label: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntityView {
    pub id: String,
    pub name: String,
    pub automated: bool,
    pub counts_toward_budget: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<f64>,
    pub effective: BTreeMap<String, f64>,
    pub modifiers: Vec<ModifierView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlotView {
    pub slot: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub officer: Option<Officer>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FleetResponse {
    pub session: String,
    pub tick: u64,
    pub elapsed: f64,
    pub slots: Vec<SlotView>,
    pub active_skills: Vec<String>,
    pub entities: usize,
    pub budget: BudgetSnapshot,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommanderResponse {
    pub effective: BTreeMap<String, f64>,
    pub modifiers: Vec<ModifierView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkillStatesResponse {
    pub slot: usize,
    pub officer: String,
    pub skill_points: u32,
    pub points_used: u32,
    pub skills: Vec<SkillStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssignResponse {
    pub slot: usize,
    pub officer: Officer,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replaced: Option<Officer>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkillChangeResponse {
    pub slot: usize,
    pub skill: String,
    pub active: bool,
    pub budget: BudgetSnapshot,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TickRequest {
    pub dt: Option<f64>,
    pub ticks: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TickResponse {
    pub reports: Vec<TickReport>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExternalBonusRequest {
    pub points: f64,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailuresResponse {
    pub failures: Vec<HookFailure>,
}

fn modifier_views(ledger: &StatLedger) -> Vec<ModifierView> {
    ledger
        .iter()
        .map(|(stat, id, modifier)| ModifierView {
            stat: stat.to_string(),
            source: id.to_string(),
            kind: modifier.kind,
            value: modifier.value,
            label: modifier.label.clone(),
        })
        .collect()
}

fn entity_view(entity: &Entity) -> EntityView {
    EntityView {
        id: entity.id().to_string(),
        name: entity.spec.name.clone(),
        automated: entity.spec.automated,
        counts_toward_budget: entity.counts_toward_budget(),
        points: unit_points(entity).map(|points| points.points),
        effective: entity.effective_stats(),
        modifiers: modifier_views(&entity.stats),
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, ApiError> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn parse_body<T: for<'de> Deserialize<'de>>(body: &str) -> Result<T, ApiError> {
    Ok(serde_json::from_str(body)?)
}

pub fn health_payload(engine: &FleetEngine) -> Result<String, ApiError> {
    to_json(&HealthResponse {
        status: "ok",
        engine: "wardroom",
        version: env!("CARGO_PKG_VERSION"),
        session: engine.session().to_string(),
        tick: engine.tick(),
    })
}

pub fn fleet_payload(engine: &FleetEngine) -> Result<String, ApiError> {
    let slots = (0..engine.slots().len())
        .map(|slot| SlotView {
            slot,
            officer: engine.officer(slot).cloned(),
        })
        .collect();
    to_json(&FleetResponse {
        session: engine.session().to_string(),
        tick: engine.tick(),
        elapsed: engine.elapsed(),
        slots,
        active_skills: engine.active_skills().map(str::to_string).collect(),
        entities: engine.entities().count(),
        budget: engine.budget(),
    })
}

pub fn budget_payload(engine: &FleetEngine) -> Result<String, ApiError> {
    to_json(&summarize(engine))
}

pub fn commander_payload(engine: &FleetEngine) -> Result<String, ApiError> {
    let commander = engine.commander();
    let effective = commander
        .stats()
        .map(|stat| (stat.to_string(), commander.effective(stat, 0.0)))
        .collect();
    to_json(&CommanderResponse {
        effective,
        modifiers: modifier_views(commander),
    })
}

pub fn entities_payload(engine: &FleetEngine) -> Result<String, ApiError> {
    let views: Vec<EntityView> = engine.entities().map(entity_view).collect();
    to_json(&views)
}

pub fn entity_payload(engine: &FleetEngine, id: &str) -> Result<String, ApiError> {
    let entity = engine
        .entity(id)
        .ok_or_else(|| EngineError::UnknownEntity(id.to_string()))?;
    to_json(&entity_view(entity))
}

pub fn materialize_payload(engine: &mut FleetEngine, body: &str) -> Result<String, ApiError> {
    let spec: EntitySpec = parse_body(body)?;
    if spec.id.trim().is_empty() {
        return Err(ApiError::Validation("entity id must not be empty".to_string()));
    }
    let entity = engine.materialize(spec)?;
    to_json(&entity_view(entity))
}

pub fn remove_entity_payload(engine: &mut FleetEngine, id: &str) -> Result<String, ApiError> {
    let entity = engine.remove_entity(id)?;
    to_json(&entity_view(&entity))
}

pub fn skill_states_payload(engine: &FleetEngine, slot: usize) -> Result<String, ApiError> {
    let skills = engine.skill_states(slot)?;
    let officer = engine.officer(slot).ok_or(EngineError::SlotEmpty { slot })?;
    let per_level = engine.config().skill_points_per_level;
    to_json(&SkillStatesResponse {
        slot,
        officer: officer.id.clone(),
        skill_points: officer.skill_points(per_level),
        points_used: officer.points_used(),
        skills,
    })
}

pub fn assign_payload(
    engine: &mut FleetEngine,
    slot: usize,
    body: &str,
) -> Result<String, ApiError> {
    let officer: Officer = parse_body(body)?;
    let replaced = engine.assign(slot, officer.clone())?;
    to_json(&AssignResponse {
        slot,
        officer,
        replaced,
    })
}

pub fn unassign_payload(engine: &mut FleetEngine, slot: usize) -> Result<String, ApiError> {
    let officer = engine.unassign(slot)?;
    to_json(&SlotView {
        slot,
        officer: Some(officer),
    })
}

pub fn activate_payload(
    engine: &mut FleetEngine,
    slot: usize,
    skill: &str,
) -> Result<String, ApiError> {
    engine.activate_skill(slot, skill)?;
    to_json(&SkillChangeResponse {
        slot,
        skill: skill.to_string(),
        active: true,
        budget: engine.budget(),
    })
}

pub fn deactivate_payload(
    engine: &mut FleetEngine,
    slot: usize,
    skill: &str,
) -> Result<String, ApiError> {
    engine.deactivate_skill(slot, skill)?;
    to_json(&SkillChangeResponse {
        slot,
        skill: skill.to_string(),
        active: false,
        budget: engine.budget(),
    })
}

pub fn reset_payload(engine: &mut FleetEngine, slot: usize) -> Result<String, ApiError> {
    let removed = engine.reset_skills(slot)?;
    to_json(&serde_json::json!({ "slot": slot, "removed": removed }))
}

pub fn level_up_payload(engine: &mut FleetEngine, slot: usize) -> Result<String, ApiError> {
    let level = engine.level_up(slot)?;
    to_json(&serde_json::json!({ "slot": slot, "level": level }))
}

/// Empty body advances one tick of the configured length.
pub fn tick_payload(engine: &mut FleetEngine, body: &str) -> Result<String, ApiError> {
    let request: TickRequest = if body.trim().is_empty() {
        TickRequest::default()
    } else {
        parse_body(body)?
    };
    let dt = request.dt.unwrap_or(engine.config().default_tick_seconds);
    if !dt.is_finite() || dt < 0.0 {
        return Err(ApiError::Validation(format!("dt must be >= 0, got {dt}")));
    }
    let ticks = request.ticks.unwrap_or(1);
    if ticks == 0 || ticks > MAX_TICKS_PER_REQUEST {
        return Err(ApiError::Validation(format!(
            "ticks must be between 1 and {MAX_TICKS_PER_REQUEST}"
        )));
    }
    let reports = (0..ticks).map(|_| engine.advance(dt)).collect();
    to_json(&TickResponse { reports })
}

pub fn external_put_payload(
    engine: &mut FleetEngine,
    key: &str,
    body: &str,
) -> Result<String, ApiError> {
    let request: ExternalBonusRequest = parse_body(body)?;
    if !request.points.is_finite() {
        return Err(ApiError::Validation("points must be a finite number".to_string()));
    }
    let label = request.label.unwrap_or_else(|| key.to_string());
    engine.set_external_bonus(key, request.points, &label);
    to_json(&engine.points_sources())
}

/// `None` when no bonus was registered under `key`.
pub fn external_delete_payload(
    engine: &mut FleetEngine,
    key: &str,
) -> Result<Option<String>, ApiError> {
    if !engine.clear_external_bonus(key) {
        return Ok(None);
    }
    to_json(&engine.points_sources()).map(Some)
}

pub fn failures_payload(engine: &FleetEngine) -> Result<String, ApiError> {
    to_json(&FailuresResponse {
        failures: engine.failures().to_vec(),
    })
}

pub fn state_payload(engine: &FleetEngine) -> Result<String, ApiError> {
    DurableState::capture(engine)
        .to_json()
        .map_err(|err| ApiError::Internal(err.to_string()))
}

pub fn catalog_payload(engine: &FleetEngine) -> Result<String, ApiError> {
    let catalog = engine.catalog();
    to_json(&serde_json::json!({
        "aptitudes": catalog.aptitudes().values().collect::<Vec<_>>(),
        "skills": catalog.skills().collect::<Vec<_>>(),
    }))
}
