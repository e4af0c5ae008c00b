// In crates/web-server/src/lib.rs

use app_config::types::ServerSettings;
use axum::{
    body::Bytes,
    extract::{Form, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use core_types::AlertPayload;
use engine::{Relay, RiskSnapshot};
use serde_json::Value;
use std::sync::Arc;
use tokio::net::TcpListener;
use types::{AlertResponse, InboundSms};

pub mod error;
pub mod types;

// Re-export our custom error type for convenience.
pub use error::{Error, Result};

/// Header carrying the shared alert secret.
pub const ALERT_SECRET_HEADER: &str = "x-alert-secret";

/// The shared application state that is available to all API handlers.
#[derive(Clone)]
pub struct AppState {
    pub relay: Relay,
    pub alert_secret: Arc<str>,
}

impl AppState {
    pub fn new(relay: Relay, alert_secret: &str) -> Self {
        Self { relay, alert_secret: Arc::from(alert_secret) }
    }
}

/// Creates the main application router with all routes and middleware.
pub fn create_router(app_state: AppState) -> Router {
    let api_router = Router::new()
        .route("/alert", post(alert_handler))
        .route("/sms/inbound", post(inbound_sms_handler))
        .route("/risk-state", get(risk_state_handler));

    Router::new()
        .route("/health", get(health_check_handler))
        .nest("/api", api_router)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(app_state)
}

async fn health_check_handler() -> &'static str {
    "OK"
}

/// Handler for `POST /api/alert`.
///
/// The body is read raw: a payload that is not JSON is treated as an empty
/// alert and filtered, never rejected.
async fn alert_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<AlertResponse>> {
    let secret = headers.get(ALERT_SECRET_HEADER).and_then(|v| v.to_str().ok());
    if secret != Some(state.alert_secret.as_ref()) {
        tracing::warn!("Alert rejected: bad or missing secret.");
        return Err(Error::Unauthorized);
    }

    let value = serde_json::from_slice::<Value>(&body).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Alert body is not JSON. Treating it as empty.");
        Value::Object(Default::default())
    });

    let outcome = state.relay.handle_alert(AlertPayload::from_value(value)).await?;
    Ok(Json(outcome.into()))
}

/// Handler for `POST /api/sms/inbound`, Twilio's inbound message webhook.
async fn inbound_sms_handler(
    State(state): State<AppState>,
    Form(sms): Form<InboundSms>,
) -> Result<StatusCode> {
    tracing::info!(from = %sms.from, "Inbound SMS.");
    state.relay.handle_reply(&sms.body).await?;
    Ok(StatusCode::OK)
}

/// Handler for `GET /api/risk-state`.
async fn risk_state_handler(State(state): State<AppState>) -> Result<Json<RiskSnapshot>> {
    Ok(Json(state.relay.risk_state().await?))
}

/// Binds the listener and serves the relay until the process stops.
pub async fn run(settings: &ServerSettings, app_state: AppState) -> Result<()> {
    let app = create_router(app_state);

    let address = format!("{}:{}", settings.host, settings.port);
    tracing::info!("Web server listening on {}", address);

    let listener = TcpListener::bind(&address).await.map_err(Error::ServerBindError)?;
    axum::serve(listener, app.into_make_service()).await.map_err(Error::Serve)?;

    Ok(())
}
