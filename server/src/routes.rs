//! HTTP surface: cluster administration, health and the resolver bridge.
//!
//! Thin wrappers over the registry. Every registry failure keeps its
//! distinguishing reason in the response body so a caller can tell an
//! unknown cluster from a disabled one from one that is down.

use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Json;
use chrono::Utc;
use cluster_registry::{
    AvailabilityReport, ClusterEntry, ClusterRegistry, RegistryError, ResolveError, resolve_client,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// The cluster registry core.
    pub registry: Arc<ClusterRegistry>,
    /// Startup connectivity snapshot, served by the health endpoint.
    pub availability: AvailabilityReport,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("availability", &self.availability)
            .finish_non_exhaustive()
    }
}

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/v1/clusters", get(list_clusters).post(add_cluster))
        .route("/api/v1/clusters/available", get(available_clusters))
        .route(
            "/api/v1/clusters/{name}",
            get(get_cluster).put(update_cluster).delete(remove_cluster),
        )
        .route("/api/v1/clusters/{name}/version", get(cluster_version))
        .route(
            "/api/v1/active-cluster",
            get(active_cluster).put(set_active_cluster),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Registry failure wrapped for HTTP, preserving the reason.
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        let status = match &err {
            RegistryError::ConfigInvalid(_) => StatusCode::BAD_REQUEST,
            RegistryError::NotConfigured(_)
            | RegistryError::Inactive(_)
            | RegistryError::Unavailable(_)
            | RegistryError::ActiveClusterBroken(_)
            | RegistryError::NoActiveCluster => StatusCode::NOT_FOUND,
            RegistryError::ConnectionFailed { .. } => StatusCode::BAD_GATEWAY,
            RegistryError::PersistenceFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string())
    }
}

impl From<ResolveError> for ApiError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::MissingClusterName => {
                Self::new(StatusCode::BAD_REQUEST, err.to_string())
            }
            ResolveError::Registry(inner) => inner.into(),
        }
    }
}

async fn healthz(State(state): State<AppState>) -> Json<serde_json::Value> {
    let available = state.registry.available_client_names().await;
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now(),
        "clusters_at_startup": state.availability,
        "available_clusters": available,
    }))
}

async fn list_clusters(State(state): State<AppState>) -> Json<Vec<ClusterEntry>> {
    Json(state.registry.list_cluster_configs().await)
}

async fn get_cluster(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ClusterEntry>, ApiError> {
    Ok(Json(state.registry.cluster_config(&name).await?))
}

async fn add_cluster(
    State(state): State<AppState>,
    Json(entry): Json<ClusterEntry>,
) -> Result<StatusCode, ApiError> {
    state.registry.add_cluster(entry).await?;
    Ok(StatusCode::CREATED)
}

async fn update_cluster(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(entry): Json<ClusterEntry>,
) -> Result<StatusCode, ApiError> {
    state.registry.update_cluster(&name, entry).await?;
    Ok(StatusCode::OK)
}

async fn remove_cluster(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.registry.remove_cluster(&name).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn available_clusters(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.registry.available_client_names().await)
}

#[derive(Debug, Serialize, Deserialize)]
struct ActiveCluster {
    name: Option<String>,
}

async fn active_cluster(State(state): State<AppState>) -> Json<ActiveCluster> {
    Json(ActiveCluster {
        name: state.registry.active_cluster_name().await,
    })
}

#[derive(Debug, Deserialize)]
struct SetActiveRequest {
    name: String,
}

async fn set_active_cluster(
    State(state): State<AppState>,
    Json(req): Json<SetActiveRequest>,
) -> Result<StatusCode, ApiError> {
    state.registry.set_active_cluster(&req.name).await?;
    Ok(StatusCode::OK)
}

/// Resolver-backed pass-through: the one operation resource handlers
/// consume from the core, demonstrated against the version endpoint.
async fn cluster_version(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let client = resolve_client(&state.registry, Some(&name)).await?;
    let version = client.kube().apiserver_version().await.map_err(|e| {
        warn!(cluster = %name, error = %e, "apiserver version probe failed");
        ApiError::new(
            StatusCode::BAD_GATEWAY,
            format!("cluster '{name}' did not answer: {e}"),
        )
    })?;
    Ok(Json(serde_json::json!(version)))
}
