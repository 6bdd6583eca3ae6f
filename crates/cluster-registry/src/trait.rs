//! ClusterConnector trait for mocking
//!
//! This trait abstracts cluster client construction so the registry and
//! resolver can be unit-tested without a real cluster. The production
//! implementation is [`crate::kube_connector::KubeConnector`]; tests use
//! [`crate::mock::MockConnector`] (behind the `test-util` feature).

use crate::client::ClusterClient;
use crate::error::RegistryError;
use crate::source::ConnectionSource;

/// Builds and probes per-cluster clients.
///
/// Implementations must be `Send + Sync`: connects run from Tokio's
/// work-stealing runtime, possibly concurrently for different clusters.
#[async_trait::async_trait]
pub trait ClusterConnector: Send + Sync {
    /// Builds a client for `source` and verifies the API server answers.
    ///
    /// `name` is used only for diagnostics. On failure the returned
    /// error distinguishes a configuration problem from an unreachable
    /// endpoint; the caller decides whether anything is retained.
    async fn connect(
        &self,
        name: &str,
        source: &ConnectionSource,
    ) -> Result<ClusterClient, RegistryError>;
}
