use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::{Body, Bytes},
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, put},
    Router,
};
use pgrecipe_models::{codes, ErrorResponse, HealthResponse, ScheduleResponse, WorkflowRequest};
use pgrecipe_orchestrations::{HostError, OrchestrationHost};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared API state
#[derive(Clone)]
pub struct AppState {
    pub host: Arc<dyn OrchestrationHost>,
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/healthz", get(health_check))
        .route("/workflows", put(schedule_workflow))
        .route("/workflows/:id", get(get_workflow))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Serve the API until `shutdown` resolves, then drain in-flight requests
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}

/// JSON response with indented encoding
struct PrettyJson<T>(StatusCode, T);

impl<T: Serialize> IntoResponse for PrettyJson<T> {
    fn into_response(self) -> Response {
        match serde_json::to_vec_pretty(&self.1) {
            Ok(body) => (self.0, [(header::CONTENT_TYPE, "application/json")], Body::from(body)).into_response(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode response");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

// ============================================================================
// Health Check
// ============================================================================

async fn health_check() -> impl IntoResponse {
    PrettyJson(StatusCode::OK, HealthResponse::ok())
}

// ============================================================================
// Workflows
// ============================================================================

async fn schedule_workflow(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let request: WorkflowRequest = serde_json::from_slice(&body)
        .map_err(|e| ApiError::Invalid(format!("Failed to decode request body: {}", e)))?;
    request.validate().map_err(ApiError::Invalid)?;

    let input = match &request.input {
        Some(input) => serde_json::to_string(input)
            .map_err(|e| ApiError::Internal(format!("Failed to encode input: {}", e)))?,
        None => return Err(ApiError::Invalid("name and input are required".to_string())),
    };

    let id = state
        .host
        .schedule(&request.name, input, request.instance_id().map(str::to_string))
        .await?;

    tracing::info!(instance_id = %id, orchestration = %request.name, "Workflow scheduled");

    Ok(PrettyJson(StatusCode::CREATED, ScheduleResponse { id }))
}

async fn get_workflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let metadata = state.host.fetch(&id).await?;
    Ok(PrettyJson(StatusCode::OK, metadata))
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
enum ApiError {
    Invalid(String),
    Internal(String),
}

impl From<HostError> for ApiError {
    fn from(err: HostError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::Invalid(msg) => (StatusCode::BAD_REQUEST, codes::INVALID, msg),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, codes::INTERNAL, msg)
            }
        };

        PrettyJson(status, ErrorResponse::new(code, message)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use axum::http::Request;
    use pgrecipe_models::{InstanceMetadata, RuntimeStatus};
    use pgrecipe_orchestrations::backends::simulated::Simulation;
    use pgrecipe_orchestrations::local_host::{ActivityRetry, LocalHost};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> (Router, LocalHost, Simulation) {
        let sim = Simulation::default();
        let host = LocalHost::with_retry(sim.backends(), ActivityRetry::new(3, Duration::ZERO));
        let router = create_router(AppState {
            host: Arc::new(host.clone()),
        });
        (router, host, sim)
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, String) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn put_workflows(body: &str) -> Request<Body> {
        Request::builder()
            .method("PUT")
            .uri("/workflows")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn recipe() -> Value {
        json!({
            "resource": { "name": "db1", "id": "/resources/db1", "type": "Applications.Datastores/postgres" },
            "runtime": { "kubernetes": { "namespace": "ns1" } }
        })
    }

    #[tokio::test]
    async fn test_health_check() {
        let (router, _, _) = app();
        let (status, body) = send(router, get("/healthz")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(serde_json::from_str::<Value>(&body).unwrap(), json!({ "status": "ok" }));
        assert!(body.contains('\n'));
    }

    #[tokio::test]
    async fn test_empty_name_is_invalid() {
        let (router, _, sim) = app();
        let (status, body) = send(router, put_workflows(r#"{"name":"","input":{}}"#)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["error"]["code"], "Invalid");
        assert_eq!(sim.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_or_null_input_is_invalid() {
        for request in [
            r#"{"name":"PostgresSQLDatabasesPut"}"#,
            r#"{"name":"PostgresSQLDatabasesPut","input":null}"#,
        ] {
            let (router, _, _) = app();
            let (status, body) = send(router, put_workflows(request)).await;

            assert_eq!(status, StatusCode::BAD_REQUEST);
            let body: Value = serde_json::from_str(&body).unwrap();
            assert_eq!(body["error"]["code"], "Invalid");
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_invalid() {
        let (router, _, _) = app();
        let (status, body) = send(router, put_workflows("{not json")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["error"]["code"], "Invalid");
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .starts_with("Failed to decode request body"));
    }

    #[tokio::test]
    async fn test_schedule_then_get() {
        let (router, host, _) = app();
        let request = json!({ "name": "PostgresSQLDatabasesPut", "input": recipe() });
        let (status, body) = send(router.clone(), put_workflows(&request.to_string())).await;

        assert_eq!(status, StatusCode::CREATED);
        let scheduled: ScheduleResponse = serde_json::from_str(&body).unwrap();
        assert!(!scheduled.id.is_empty());

        host.wait_for_terminal(&scheduled.id, Duration::from_secs(5))
            .await
            .unwrap();

        let (status, body) = send(router, get(&format!("/workflows/{}", scheduled.id))).await;
        assert_eq!(status, StatusCode::OK);

        let metadata: InstanceMetadata = serde_json::from_str(&body).unwrap();
        assert_eq!(metadata.id, scheduled.id);
        assert_eq!(metadata.name, "PostgresSQLDatabasesPut");
        assert_eq!(metadata.runtime_status, RuntimeStatus::Completed);

        let output: Value = serde_json::from_str(&metadata.serialized_output.unwrap()).unwrap();
        assert_eq!(output["values"]["host"], "ns1.db1.svc.cluster.local");
        assert_eq!(output["values"]["port"], 5432);
    }

    #[tokio::test]
    async fn test_caller_supplied_id() {
        let (router, _, _) = app();
        let request = json!({ "name": "PostgresSQLDatabasesPut", "input": recipe(), "id": "put-db1" });
        let (status, body) = send(router, put_workflows(&request.to_string())).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(serde_json::from_str::<Value>(&body).unwrap(), json!({ "id": "put-db1" }));
    }

    #[tokio::test]
    async fn test_unknown_orchestrator_is_internal() {
        let (router, _, _) = app();
        let request = json!({ "name": "NoSuchWorkflow", "input": {} });
        let (status, body) = send(router, put_workflows(&request.to_string())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["error"]["code"], "Internal");
        assert!(body["error"]["message"].as_str().unwrap().contains("NoSuchWorkflow"));
    }

    #[tokio::test]
    async fn test_unknown_instance_is_internal() {
        let (router, _, _) = app();
        let (status, body) = send(router, get("/workflows/missing")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["error"]["code"], "Internal");
    }
}
