//! HTTP surface tests against a mock-backed registry.

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use cluster_registry::{
    AppConfig, ClusterEntry, ClusterRegistry, ConfigStore, MockConnector, ServerSettings,
};
use kubedeck_server::routes;
use std::sync::Arc;
use tower::ServiceExt;

async fn test_app(
    entries: Vec<ClusterEntry>,
    active: &str,
    reachable: &[&str],
) -> (axum::Router, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = ConfigStore::new(dir.path().join("config.yaml"));
    let config = AppConfig {
        server: ServerSettings {
            active_cluster: active.to_string(),
            ..ServerSettings::default()
        },
        clusters: entries,
    };
    store.save(&config).expect("seed config");

    let connector = Arc::new(MockConnector::new());
    for name in reachable {
        connector.set_reachable(*name);
    }
    let (registry, availability) = ClusterRegistry::initialize(store, config, connector).await;

    let app = routes::router(routes::AppState {
        registry: Arc::new(registry),
        availability,
    });
    (app, dir)
}

fn cluster_entry(name: &str, path: &str, active: bool) -> ClusterEntry {
    ClusterEntry {
        name: name.to_string(),
        config_path: path.to_string(),
        is_active: active,
    }
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn test_healthz_reports_startup_availability() {
    let (app, _dir) = test_app(
        vec![
            cluster_entry("alpha", "/tmp/alpha.kubeconfig", true),
            cluster_entry("beta", "/bad/path", true),
        ],
        "",
        &["alpha"],
    )
    .await;

    let response = app
        .oneshot(Request::get("/healthz").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["clusters_at_startup"]["alpha"], true);
    assert_eq!(body["clusters_at_startup"]["beta"], false);
    assert_eq!(body["available_clusters"], serde_json::json!(["alpha"]));
}

#[tokio::test]
async fn test_list_and_get_clusters() {
    let (app, _dir) = test_app(
        vec![cluster_entry("alpha", "/tmp/alpha.kubeconfig", true)],
        "",
        &["alpha"],
    )
    .await;

    let response = app
        .clone()
        .oneshot(
            Request::get("/api/v1/clusters")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body[0]["name"], "alpha");

    let response = app
        .oneshot(
            Request::get("/api/v1/clusters/ghost")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_add_cluster_and_duplicate_rejection() {
    let (app, _dir) = test_app(vec![], "", &["new"]).await;

    let add = || {
        Request::post("/api/v1/clusters")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                serde_json::to_vec(&cluster_entry("new", "/tmp/new.kubeconfig", true))
                    .expect("serialize"),
            ))
            .expect("request")
    };

    let response = app.clone().oneshot(add()).await.expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app.oneshot(add()).await.expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().expect("error message").contains("already exists"));
}

#[tokio::test]
async fn test_remove_unknown_cluster_is_404() {
    let (app, _dir) = test_app(vec![], "", &[]).await;

    let response = app
        .oneshot(
            Request::delete("/api/v1/clusters/ghost")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_set_and_get_active_cluster() {
    let (app, _dir) = test_app(
        vec![cluster_entry("alpha", "/tmp/alpha.kubeconfig", true)],
        "",
        &["alpha"],
    )
    .await;

    let response = app
        .clone()
        .oneshot(
            Request::put("/api/v1/active-cluster")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"name":"alpha"}"#))
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::get("/api/v1/active-cluster")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    let body = body_json(response).await;
    assert_eq!(body["name"], "alpha");
}

#[tokio::test]
async fn test_set_active_to_unavailable_cluster_is_404() {
    let (app, _dir) = test_app(
        vec![cluster_entry("down", "/bad/path", true)],
        "",
        &[],
    )
    .await;

    let response = app
        .oneshot(
            Request::put("/api/v1/active-cluster")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"name":"down"}"#))
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert!(body["error"].as_str().expect("error message").contains("unavailable"));
}

#[tokio::test]
async fn test_version_endpoint_distinguishes_unknown_and_inactive() {
    let (app, _dir) = test_app(
        vec![cluster_entry("off", "/tmp/off.kubeconfig", false)],
        "",
        &[],
    )
    .await;

    let response = app
        .clone()
        .oneshot(
            Request::get("/api/v1/clusters/ghost/version")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert!(body["error"].as_str().expect("error message").contains("not configured"));

    let response = app
        .oneshot(
            Request::get("/api/v1/clusters/off/version")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert!(body["error"].as_str().expect("error message").contains("inactive"));
}
