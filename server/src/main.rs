//! Kubedeck Server
//!
//! Management plane over one or more Kubernetes clusters. Loads the
//! persisted configuration document, brings up one client per
//! configured active cluster, and serves the administrative surface
//! plus health probes. Per-request cluster selection rides on the
//! `{name}` path segment, resolved through the cluster registry.

use anyhow::Context;
use cluster_registry::{ClusterRegistry, ConfigStore, KubeConnector};
use kubedeck_server::routes::{self, AppState};
use std::env;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    info!("Starting Kubedeck server");

    let config_path =
        env::var("KUBEDECK_CONFIG").unwrap_or_else(|_| "config.yaml".to_string());
    let store = ConfigStore::new(&config_path);
    let config = store
        .load()
        .with_context(|| format!("loading configuration from {config_path}"))?;
    let port = config.server.port.clone();

    let (registry, availability) =
        ClusterRegistry::initialize(store, config, Arc::new(KubeConnector::default())).await;

    for (cluster, connected) in &availability {
        if *connected {
            info!(cluster = %cluster, "cluster connected at startup");
        } else {
            warn!(cluster = %cluster, "cluster unavailable at startup");
        }
    }
    if availability.values().all(|up| !up) {
        warn!("no cluster connected at startup; cluster APIs will report unavailable");
    }

    let app = routes::router(AppState {
        registry: Arc::new(registry),
        availability,
    });

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "listening");
    axum::serve(listener, app).await.context("serving HTTP")?;

    Ok(())
}
