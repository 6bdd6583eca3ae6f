//! Registry error types.
//!
//! Every failure the registry can produce is a value; nothing in this
//! crate terminates the process. The lookup variants are deliberately
//! distinct so callers can tell an unknown cluster from a disabled one
//! from one that is configured but down.

use thiserror::Error;

/// Cause classification for a failed cluster connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectCause {
    /// The connection source could not be turned into a client
    /// configuration (missing kubeconfig, parse failure, ...).
    Config,
    /// The client was built but the API server did not answer the
    /// connectivity probe in time.
    Connect,
}

impl std::fmt::Display for ConnectCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config => write!(f, "config error"),
            Self::Connect => write!(f, "connection error"),
        }
    }
}

/// Errors that can occur in the cluster registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A cluster entry is malformed: empty name, duplicate name, or an
    /// otherwise rejected administrative request.
    #[error("invalid cluster configuration: {0}")]
    ConfigInvalid(String),

    /// Client construction or the connectivity probe failed.
    #[error("cluster '{cluster}' connection failed ({cause}): {reason}")]
    ConnectionFailed {
        /// Name of the cluster that failed to connect.
        cluster: String,
        /// Whether configuration or connectivity was at fault.
        cause: ConnectCause,
        /// Underlying failure description.
        reason: String,
    },

    /// No cluster with this name exists in the configuration document.
    #[error("cluster '{0}' is not configured")]
    NotConfigured(String),

    /// The cluster exists but is marked inactive, so no client is kept.
    #[error("cluster '{0}' is configured but inactive")]
    Inactive(String),

    /// The cluster is configured and active but its client failed to
    /// initialize or has been discarded.
    #[error("cluster '{0}' is currently unavailable (client initialization failed)")]
    Unavailable(String),

    /// Writing the configuration document failed.
    #[error("configuration persistence failed: {0}")]
    PersistenceFailed(String),

    /// The configuration names a preferred active cluster that is not
    /// actually live.
    #[error("active cluster '{0}' is configured but not available")]
    ActiveClusterBroken(String),

    /// No active cluster is configured at all.
    #[error("no active cluster configured")]
    NoActiveCluster,
}

/// Errors produced by request-scoped client resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The request did not carry a cluster name.
    #[error("request is missing a cluster name")]
    MissingClusterName,

    /// The registry could not produce a client for the named cluster.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}
