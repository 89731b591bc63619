use crate::engine::FleetEngine;
use crate::error::EngineError;
use crate::server::api::{self, ApiError};

pub struct HttpResponse {
    pub status_code: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl HttpResponse {
    fn json(body: String) -> Self {
        Self {
            status_code: 200,
            content_type: "application/json",
            body,
        }
    }
}

/// Dispatches one request against the fleet. Pure with respect to I/O: the
/// transport layer owns sockets and locking.
pub fn route_request(
    method: &str,
    path: &str,
    body: &str,
    engine: &mut FleetEngine,
) -> HttpResponse {
    let path = path.split('?').next().unwrap_or(path);
    let segments: Vec<&str> = path
        .trim_matches('/')
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect();

    let result = match (method, segments.as_slice()) {
        ("GET", ["api", "health"]) => api::health_payload(engine),
        ("GET", ["api", "fleet"]) => api::fleet_payload(engine),
        ("GET", ["api", "budget"]) => api::budget_payload(engine),
        ("GET", ["api", "commander"]) => api::commander_payload(engine),
        ("GET", ["api", "catalog"]) => api::catalog_payload(engine),
        ("GET", ["api", "failures"]) => api::failures_payload(engine),
        ("GET", ["api", "state"]) => api::state_payload(engine),
        ("GET", ["api", "entities"]) => api::entities_payload(engine),
        ("POST", ["api", "entities"]) => api::materialize_payload(engine, body),
        ("GET", ["api", "entities", id]) => api::entity_payload(engine, id),
        ("DELETE", ["api", "entities", id]) => api::remove_entity_payload(engine, id),
        ("POST", ["api", "tick"]) => api::tick_payload(engine, body),
        ("PUT", ["api", "external", key]) => api::external_put_payload(engine, key, body),
        ("DELETE", ["api", "external", key]) => match api::external_delete_payload(engine, key) {
            Ok(Some(payload)) => Ok(payload),
            Ok(None) => return error_response(404, "not_found", "No such bonus"),
            Err(err) => Err(err),
        },
        (method, ["api", "slots", slot, rest @ ..]) => {
            let Ok(slot) = slot.parse::<usize>() else {
                return error_response(400, "invalid_slot", &format!("Invalid slot '{slot}'"));
            };
            match (method, rest) {
                ("PUT", ["officer"]) => api::assign_payload(engine, slot, body),
                ("DELETE", ["officer"]) => api::unassign_payload(engine, slot),
                ("GET", ["skills"]) => api::skill_states_payload(engine, slot),
                ("POST", ["skills", skill]) => api::activate_payload(engine, slot, skill),
                ("DELETE", ["skills", skill]) => api::deactivate_payload(engine, slot, skill),
                ("POST", ["reset"]) => api::reset_payload(engine, slot),
                ("POST", ["level-up"]) => api::level_up_payload(engine, slot),
                _ => return error_response(404, "not_found", "Route not found"),
            }
        }
        _ => return error_response(404, "not_found", "Route not found"),
    };

    match result {
        Ok(payload) => HttpResponse::json(payload),
        Err(err) => api_error_response(&err),
    }
}

fn api_error_response(err: &ApiError) -> HttpResponse {
    match err {
        ApiError::Parse(err) => {
            error_response(400, "invalid_body", &format!("Invalid request body: {err}"))
        }
        ApiError::Validation(msg) => error_response(400, "validation", msg),
        ApiError::Rejected(rejection) => error_response(
            rejection_status(rejection),
            rejection.kind(),
            &rejection.to_string(),
        ),
        ApiError::Internal(msg) => error_response(500, "internal", msg),
    }
}

fn rejection_status(rejection: &EngineError) -> u16 {
    match rejection {
        EngineError::UnknownEntity(_)
        | EngineError::UnknownSkill(_)
        | EngineError::UnknownAptitude(_) => 404,
        EngineError::InvalidSlot { .. } | EngineError::InvalidLevel { .. } => 400,
        _ => 409,
    }
}

fn error_response(status_code: u16, kind: &str, message: &str) -> HttpResponse {
    HttpResponse {
        status_code,
        content_type: "application/json",
        body: serde_json::json!({
            "status": "error",
            "kind": kind,
            "message": message,
        })
        .to_string(),
    }
}
