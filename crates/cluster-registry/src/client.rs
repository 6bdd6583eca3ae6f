//! Per-cluster client handle.
//!
//! Wraps a single cluster's connection: the typed kube client plus the
//! resolved endpoint and the source it was built from, kept for
//! diagnostics. Handles are cheap to clone; the registry map owns the
//! canonical copy and hands out clones. A handle is never mutated in
//! place; updating a cluster always builds a fresh one.

use crate::source::ConnectionSource;
use kube::Client;

/// A live connection to one Kubernetes cluster.
#[derive(Clone)]
pub struct ClusterClient {
    client: Client,
    server_url: String,
    source: ConnectionSource,
}

impl ClusterClient {
    /// Wraps an already-built kube client with its connection metadata.
    #[must_use]
    pub fn new(client: Client, server_url: String, source: ConnectionSource) -> Self {
        Self {
            client,
            server_url,
            source,
        }
    }

    /// The typed kube client handle resource services issue verbs on.
    #[must_use]
    pub fn kube(&self) -> Client {
        self.client.clone()
    }

    /// The resolved API server URL this client talks to.
    #[must_use]
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// The connection source the client was built from.
    #[must_use]
    pub fn source(&self) -> &ConnectionSource {
        &self.source
    }
}

impl std::fmt::Debug for ClusterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterClient")
            .field("server_url", &self.server_url)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}
