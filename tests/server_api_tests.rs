use std::sync::{Arc, Mutex};

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use wardroom::server::router;
use wardroom::server::routes::route_request;
use wardroom::{Catalog, EngineConfig, FleetEngine};

fn engine() -> FleetEngine {
    let catalog = Catalog::load_dir("data/catalog").expect("bundled catalog should load");
    FleetEngine::new(EngineConfig::default(), Arc::new(catalog))
}

fn call(engine: &mut FleetEngine, method: &str, path: &str, body: &str) -> (u16, Value) {
    let response = route_request(method, path, body, engine);
    assert_eq!(response.content_type, "application/json");
    let payload = serde_json::from_str(&response.body).expect("response should be valid json");
    (response.status_code, payload)
}

#[test]
fn health_endpoint_returns_ok_json() {
    let (status, payload) = call(&mut engine(), "GET", "/api/health", "");
    assert_eq!(status, 200);
    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["engine"], "wardroom");
    assert_eq!(payload["tick"], 0);
}

#[test]
fn assign_tick_and_read_the_budget() {
    let mut engine = engine();
    let (status, payload) = call(
        &mut engine,
        "PUT",
        "/api/slots/0/officer",
        r#"{"id":"vance","aptitude":"sc_automated"}"#,
    );
    assert_eq!(status, 200);
    assert_eq!(payload["officer"]["level"], 1);

    for (id, cost) in [("a", 40), ("b", 50), ("c", 60)] {
        let body = format!(r#"{{"id":"{id}","deployment_cost":{cost},"automated":true}}"#);
        let (status, payload) = call(&mut engine, "POST", "/api/entities", &body);
        assert_eq!(status, 200);
        assert_eq!(payload["counts_toward_budget"], true);
    }

    let (status, payload) = call(&mut engine, "POST", "/api/tick", "");
    assert_eq!(status, 200);
    assert_eq!(payload["reports"].as_array().map(Vec::len), Some(1));

    let (_, budget) = call(&mut engine, "GET", "/api/budget", "");
    assert_eq!(budget["used"], 150.0);
    assert_eq!(budget["maximum"], 120.0);
    assert_eq!(budget["bonus_percent"], 87.5);
    assert_eq!(budget["ships"].as_array().map(Vec::len), Some(3));

    let (_, entity) = call(&mut engine, "GET", "/api/entities/a", "");
    assert_eq!(entity["effective"]["max_combat_readiness"], 0.875);
    assert!(entity["modifiers"]
        .as_array()
        .expect("modifiers listed")
        .iter()
        .any(|modifier| modifier["source"] == "budget"));
}

#[test]
fn skill_routes_follow_gates() {
    let mut engine = engine();
    call(
        &mut engine,
        "PUT",
        "/api/slots/0/officer",
        r#"{"id":"vance","aptitude":"sc_automated","level":5}"#,
    );

    let (status, payload) = call(
        &mut engine,
        "POST",
        "/api/slots/0/skills/sc_automated_cyber_warfare",
        "",
    );
    assert_eq!(status, 409);
    assert_eq!(payload["kind"], "section_gate_not_met");

    for skill in ["sc_automated_expertise", "sc_automated_specialized_equipment"] {
        let path = format!("/api/slots/0/skills/{skill}");
        let (status, payload) = call(&mut engine, "POST", &path, "");
        assert_eq!(status, 200);
        assert_eq!(payload["active"], true);
    }

    let (_, states) = call(&mut engine, "GET", "/api/slots/0/skills", "");
    assert_eq!(states["points_used"], 2);
    let cyber = states["skills"]
        .as_array()
        .expect("skills listed")
        .iter()
        .find(|status| status["skill"] == "sc_automated_cyber_warfare")
        .cloned()
        .expect("cyber warfare listed");
    assert_eq!(cyber["state"], "unlockable");

    let (status, payload) = call(&mut engine, "POST", "/api/slots/0/reset", "");
    assert_eq!(status, 200);
    assert_eq!(payload["removed"].as_array().map(Vec::len), Some(2));
}

#[test]
fn rejections_map_to_status_codes() {
    let mut engine = engine();
    call(
        &mut engine,
        "PUT",
        "/api/slots/0/officer",
        r#"{"id":"reyes","aptitude":"sc_tactical"}"#,
    );

    let (status, payload) = call(
        &mut engine,
        "PUT",
        "/api/slots/1/officer",
        r#"{"id":"okafor","aptitude":"sc_warfare"}"#,
    );
    assert_eq!(status, 409);
    assert_eq!(payload["kind"], "duplicate_category_assignment");
    assert_eq!(payload["status"], "error");

    let (status, _) = call(
        &mut engine,
        "PUT",
        "/api/slots/9/officer",
        r#"{"id":"x","aptitude":"sc_starfaring"}"#,
    );
    assert_eq!(status, 400);

    let (status, payload) = call(&mut engine, "GET", "/api/entities/ghost", "");
    assert_eq!(status, 404);
    assert_eq!(payload["kind"], "unknown_entity");

    let (status, payload) = call(&mut engine, "POST", "/api/entities", "{not json");
    assert_eq!(status, 400);
    assert_eq!(payload["kind"], "invalid_body");

    let (status, payload) = call(&mut engine, "POST", "/api/tick", r#"{"dt":-1}"#);
    assert_eq!(status, 400);
    assert_eq!(payload["kind"], "validation");
}

#[test]
fn external_bonus_can_be_set_and_removed() {
    let mut engine = engine();
    let (status, sources) = call(
        &mut engine,
        "PUT",
        "/api/external/salvaged_relay",
        r#"{"points":25,"label":"Salvaged Relay"}"#,
    );
    assert_eq!(status, 200);
    assert_eq!(sources[0]["key"], "salvaged_relay");
    assert_eq!(sources[0]["points"], 25.0);

    let (status, sources) = call(&mut engine, "DELETE", "/api/external/salvaged_relay", "");
    assert_eq!(status, 200);
    assert_eq!(sources.as_array().map(Vec::len), Some(0));

    let (status, _) = call(&mut engine, "DELETE", "/api/external/salvaged_relay", "");
    assert_eq!(status, 404);
}

#[test]
fn state_endpoint_lists_assignments_only() {
    let mut engine = engine();
    call(
        &mut engine,
        "PUT",
        "/api/slots/2/officer",
        r#"{"id":"haddad","aptitude":"sc_starfaring"}"#,
    );
    let (status, state) = call(&mut engine, "GET", "/api/state", "");
    assert_eq!(status, 200);
    assert_eq!(state["version"], 1);
    assert_eq!(state["slots"][0]["slot"], 2);
    assert_eq!(state["slots"][0]["officer"]["id"], "haddad");
}

#[tokio::test]
async fn router_serves_requests_against_the_shared_engine() {
    let shared = Arc::new(Mutex::new(engine()));
    let app = router(Arc::clone(&shared));

    let request = Request::builder()
        .method("POST")
        .uri("/api/entities")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"id":"drone","deployment_cost":30,"automated":true}"#))
        .expect("request should build");
    let response = app.clone().oneshot(request).await.expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);

    let request = Request::builder()
        .uri("/api/fleet")
        .body(Body::empty())
        .expect("request should build");
    let response = app.clone().oneshot(request).await.expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should read");
    let payload: Value = serde_json::from_slice(&bytes).expect("response should be valid json");
    assert_eq!(payload["entities"], 1);

    let request = Request::builder()
        .uri("/api/nowhere")
        .body(Body::empty())
        .expect("request should build");
    let response = app.oneshot(request).await.expect("router responds");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    assert!(shared.lock().expect("lock").entity("drone").is_some());
}
