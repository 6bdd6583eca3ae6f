//! Connection source descriptors.
//!
//! A cluster entry's `config_path` field is a free-form string in the
//! persisted document. At connect time it is parsed into one of three
//! source kinds: the in-cluster service account, the platform default
//! kubeconfig location, or an explicit kubeconfig file path.

use std::path::PathBuf;

/// Sentinel selecting the in-cluster service-account identity.
pub const IN_CLUSTER: &str = "in-cluster";

/// Sentinel selecting the platform default kubeconfig location.
pub const DEFAULT_PATH: &str = "default";

/// Where the credentials for a cluster connection come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionSource {
    /// Use the ambient in-process service-account identity.
    InCluster,
    /// Use `$KUBECONFIG` or `~/.kube/config`, whichever resolves.
    DefaultPath,
    /// Use an explicit kubeconfig file.
    Path(PathBuf),
}

impl ConnectionSource {
    /// Parses the raw `config_path` string of a cluster entry.
    ///
    /// An empty string is treated the same as the `"default"` sentinel:
    /// the connector falls back to the ambient default credential
    /// discovery.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            IN_CLUSTER => Self::InCluster,
            "" | DEFAULT_PATH => Self::DefaultPath,
            path => Self::Path(PathBuf::from(path)),
        }
    }
}

impl std::fmt::Display for ConnectionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InCluster => write!(f, "{IN_CLUSTER}"),
            Self::DefaultPath => write!(f, "{DEFAULT_PATH}"),
            Self::Path(p) => write!(f, "{}", p.display()),
        }
    }
}
