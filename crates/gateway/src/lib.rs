//! HTTP gateway for Medgate.
//!
//! Exposes the closed tool surface to the UI collaborator:
//!
//! - `GET  /health`            — liveness
//! - `GET  /v1/tools`          — tool definitions
//! - `POST /v1/tools/{name}`   — invoke a tool; body = tool arguments
//!
//! Built on Axum. Every error reaches the caller as `{kind, message}`
//! with the matching status code — no stack traces, no internals, and
//! never partially-scrubbed data.

use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use medgate_core::error::GatewayError;
use medgate_core::tool::ToolRegistry;

/// Maximum request body size: tool arguments are small JSON objects.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub registry: ToolRegistry,
}

type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/v1/tools", get(list_tools_handler))
        .route("/v1/tools/{name}", post(call_tool_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the gateway HTTP server.
pub async fn start(host: &str, port: u16, registry: ToolRegistry) -> std::io::Result<()> {
    let addr = format!("{host}:{port}");
    let state = Arc::new(GatewayState { registry });
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("gateway listening on {addr}");
    axum::serve(listener, router).await
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn list_tools_handler(State(state): State<SharedState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "tools": state.registry.definitions() }))
}

async fn call_tool_handler(
    State(state): State<SharedState>,
    Path(name): Path<String>,
    Json(arguments): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let payload = state.registry.execute(&name, arguments).await?;
    Ok(Json(payload))
}

// ── Error mapping ─────────────────────────────────────────────────────────

/// The wire form of a failure: kind + message, nothing else.
#[derive(Debug, Serialize)]
struct ApiError {
    kind: &'static str,
    message: String,
    #[serde(skip)]
    status: StatusCode,
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        let status = match &err {
            GatewayError::Unauthorized => StatusCode::UNAUTHORIZED,
            GatewayError::NotFound { .. } => StatusCode::NOT_FOUND,
            GatewayError::InvalidCategory { .. } | GatewayError::InvalidRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            GatewayError::ProviderUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::ScrubFailure(_) | GatewayError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            kind: err.kind(),
            message: err.to_string(),
            status,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use medgate_assistant::{Behavior, ScriptedProvider};
    use medgate_core::record::{MedicationEntry, Patient};
    use medgate_core::store::RecordStore;
    use medgate_security::SharedSecretGate;
    use medgate_store::InMemoryStore;
    use medgate_tools::{ToolPipeline, default_registry};
    use tower::util::ServiceExt;

    const SECRET: &str = "doctor_secret";

    async fn test_router() -> Router {
        let store = Arc::new(InMemoryStore::new());
        store
            .insert_patient(Patient {
                id: "P1".into(),
                first_name: "Jane".into(),
                last_name: "Doe".into(),
                sex: "F".into(),
                dob: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
                contact: None,
            })
            .await
            .unwrap();
        store
            .insert_medication(MedicationEntry {
                patient_id: "P1".into(),
                drug: "Metformin".into(),
                dose: "500mg".into(),
                start: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                stop: None,
            })
            .await
            .unwrap();

        let pipeline = Arc::new(ToolPipeline::new(
            Box::new(SharedSecretGate::new(SECRET)),
            store,
            Arc::new(ScriptedProvider::new(Behavior::Answer("ok".into()))),
        ));
        build_router(Arc::new(GatewayState {
            registry: default_registry(pipeline),
        }))
    }

    fn post_json(uri: &str, body: serde_json::Value) -> axum::http::Request<axum::body::Body> {
        axum::http::Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(axum::body::Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), MAX_BODY_BYTES)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_is_ok() {
        let router = test_router().await;
        let response = router
            .oneshot(
                axum::http::Request::builder()
                    .uri("/health")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn tools_are_listed() {
        let router = test_router().await;
        let response = router
            .oneshot(
                axum::http::Request::builder()
                    .uri("/v1/tools")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        let names: Vec<&str> = body["tools"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(names.len(), 6);
        assert!(names.contains(&"ask_about_patient"));
        assert!(names.contains(&"get_vitals"));
    }

    #[tokio::test]
    async fn wrong_credential_maps_to_401() {
        let router = test_router().await;
        let response = router
            .oneshot(post_json(
                "/v1/tools/get_medications",
                serde_json::json!({"patient_id": "P1", "credential": "wrong"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = body_json(response).await;
        assert_eq!(body["kind"], "unauthorized");
        assert!(body.get("status").is_none());
    }

    #[tokio::test]
    async fn unknown_patient_maps_to_404() {
        let router = test_router().await;
        let response = router
            .oneshot(post_json(
                "/v1/tools/get_vitals",
                serde_json::json!({"patient_id": "ghost", "credential": SECRET}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["kind"], "not_found");
    }

    #[tokio::test]
    async fn unknown_tool_maps_to_400() {
        let router = test_router().await;
        let response = router
            .oneshot(post_json(
                "/v1/tools/run_sql",
                serde_json::json!({"credential": SECRET}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn successful_call_returns_scrubbed_payload() {
        let router = test_router().await;
        let response = router
            .oneshot(post_json(
                "/v1/tools/get_patient_summary",
                serde_json::json!({"patient_id": "P1", "credential": SECRET}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        let text = body.to_string();
        assert!(!text.contains("Jane"));
        assert!(text.contains("age_band"));
    }
}
