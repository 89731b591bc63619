//! HTTP presentation layer over one shared fleet engine.
//!
//! Every request is forwarded to [`routes::route_request`] while holding the
//! engine lock, so requests never observe a half-finished tick.

use std::sync::{Arc, Mutex, PoisonError};

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tracing::{debug, info};

use crate::engine::FleetEngine;

pub mod api;
pub mod routes;

pub type SharedEngine = Arc<Mutex<FleetEngine>>;

pub fn router(engine: SharedEngine) -> Router {
    Router::new().fallback(dispatch).with_state(engine)
}

async fn dispatch(
    State(engine): State<SharedEngine>,
    method: Method,
    uri: Uri,
    body: String,
) -> Response {
    let response = {
        let mut engine = engine.lock().unwrap_or_else(PoisonError::into_inner);
        routes::route_request(method.as_str(), uri.path(), &body, &mut engine)
    };
    debug!(%method, path = uri.path(), status = response.status_code, "request handled");

    let status = StatusCode::from_u16(response.status_code)
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        [(header::CONTENT_TYPE, response.content_type)],
        Body::from(response.body),
    )
        .into_response()
}

/// Serves the API on `bind_addr` until the process is stopped.
pub fn run_server(bind_addr: &str, engine: FleetEngine) -> std::io::Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let session = engine.session();
        let app = router(Arc::new(Mutex::new(engine)));
        let listener = tokio::net::TcpListener::bind(bind_addr).await?;
        info!(%session, "wardroom server listening on http://{bind_addr}");
        axum::serve(listener, app).await
    })
}
