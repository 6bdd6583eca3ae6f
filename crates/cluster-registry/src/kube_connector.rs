//! Production cluster connector backed by kube-rs.
//!
//! Resolves a connection source into a `kube::Config`, builds the typed
//! client and probes the API server with a cheap version read under a
//! bounded timeout. No shared state is touched here; retention of a
//! failed cluster is the registry's decision.

use crate::client::ClusterClient;
use crate::connector::ClusterConnector;
use crate::error::{ConnectCause, RegistryError};
use crate::source::ConnectionSource;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use std::time::Duration;
use tracing::debug;

/// Default bound on the connectivity probe.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Builds kube clients from connection sources and probes reachability.
#[derive(Debug, Clone)]
pub struct KubeConnector {
    probe_timeout: Duration,
}

impl KubeConnector {
    /// Creates a connector with a custom probe timeout.
    #[must_use]
    pub fn new(probe_timeout: Duration) -> Self {
        Self { probe_timeout }
    }

    async fn resolve_config(
        &self,
        name: &str,
        source: &ConnectionSource,
    ) -> Result<Config, RegistryError> {
        let config_err = |reason: String| RegistryError::ConnectionFailed {
            cluster: name.to_string(),
            cause: ConnectCause::Config,
            reason,
        };

        match source {
            ConnectionSource::InCluster => {
                debug!(cluster = name, "using in-cluster configuration");
                Config::incluster().map_err(|e| config_err(e.to_string()))
            }
            ConnectionSource::DefaultPath => {
                // Honors $KUBECONFIG, then ~/.kube/config, then in-cluster.
                debug!(cluster = name, "inferring default kube configuration");
                Config::infer().await.map_err(|e| config_err(e.to_string()))
            }
            ConnectionSource::Path(path) => {
                debug!(cluster = name, path = %path.display(), "reading kubeconfig file");
                let kubeconfig =
                    Kubeconfig::read_from(path).map_err(|e| config_err(e.to_string()))?;
                Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                    .await
                    .map_err(|e| config_err(e.to_string()))
            }
        }
    }
}

impl Default for KubeConnector {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_TIMEOUT)
    }
}

#[async_trait::async_trait]
impl ClusterConnector for KubeConnector {
    async fn connect(
        &self,
        name: &str,
        source: &ConnectionSource,
    ) -> Result<ClusterClient, RegistryError> {
        let config = self.resolve_config(name, source).await?;
        let server_url = config.cluster_url.to_string();

        let client = Client::try_from(config).map_err(|e| RegistryError::ConnectionFailed {
            cluster: name.to_string(),
            cause: ConnectCause::Config,
            reason: e.to_string(),
        })?;

        // Cheap authenticated read to verify the API server answers.
        debug!(cluster = name, server_url = %server_url, "probing API server");
        let probe = tokio::time::timeout(self.probe_timeout, client.apiserver_version()).await;
        match probe {
            Ok(Ok(version)) => {
                debug!(
                    cluster = name,
                    version = %version.git_version,
                    "API server reachable"
                );
            }
            Ok(Err(e)) => {
                return Err(RegistryError::ConnectionFailed {
                    cluster: name.to_string(),
                    cause: ConnectCause::Connect,
                    reason: e.to_string(),
                });
            }
            Err(_) => {
                return Err(RegistryError::ConnectionFailed {
                    cluster: name.to_string(),
                    cause: ConnectCause::Connect,
                    reason: format!(
                        "API server did not respond within {:?}",
                        self.probe_timeout
                    ),
                });
            }
        }

        Ok(ClusterClient::new(client, server_url, source.clone()))
    }
}
