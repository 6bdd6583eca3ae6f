//! Mock ClusterConnector for unit testing
//!
//! Provides a scripted implementation of [`ClusterConnector`] so the
//! registry and resolver can be exercised without a real cluster.
//! Reachability is configured per cluster name; successful connects
//! return a genuine `kube::Client` pointed at a dummy URL (no network
//! I/O happens until a caller actually issues a request on it).

use crate::client::ClusterClient;
use crate::connector::ClusterConnector;
use crate::error::{ConnectCause, RegistryError};
use crate::source::ConnectionSource;
use std::collections::HashSet;
use std::sync::Mutex;

/// Scriptable connector for tests.
#[derive(Debug, Default)]
pub struct MockConnector {
    reachable: Mutex<HashSet<String>>,
    attempts: Mutex<Vec<String>>,
}

impl MockConnector {
    /// Creates a connector where every cluster is unreachable.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `name` as reachable; subsequent connects succeed.
    pub fn set_reachable(&self, name: impl Into<String>) {
        self.reachable.lock().unwrap().insert(name.into());
    }

    /// Marks `name` as unreachable; subsequent connects fail.
    pub fn set_unreachable(&self, name: &str) {
        self.reachable.lock().unwrap().remove(name);
    }

    /// Every cluster name a connect was attempted for, in order.
    #[must_use]
    pub fn attempts(&self) -> Vec<String> {
        self.attempts.lock().unwrap().clone()
    }

    /// Number of connect attempts made for `name`.
    #[must_use]
    pub fn connect_count(&self, name: &str) -> usize {
        self.attempts
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.as_str() == name)
            .count()
    }

    fn dummy_client(name: &str, source: &ConnectionSource) -> ClusterClient {
        let url = format!("http://{name}.mock.invalid:6443/");
        let uri: http::Uri = url.parse().unwrap();
        let config = kube::Config::new(uri);
        let client = kube::Client::try_from(config).unwrap();
        ClusterClient::new(client, url, source.clone())
    }
}

#[async_trait::async_trait]
impl ClusterConnector for MockConnector {
    async fn connect(
        &self,
        name: &str,
        source: &ConnectionSource,
    ) -> Result<ClusterClient, RegistryError> {
        self.attempts.lock().unwrap().push(name.to_string());
        if self.reachable.lock().unwrap().contains(name) {
            Ok(Self::dummy_client(name, source))
        } else {
            Err(RegistryError::ConnectionFailed {
                cluster: name.to_string(),
                cause: ConnectCause::Connect,
                reason: "mock endpoint unreachable".to_string(),
            })
        }
    }
}
