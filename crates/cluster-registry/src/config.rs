//! Configuration document model and persistence adapter.
//!
//! The persisted document is a YAML file holding the server settings,
//! the list of cluster entries and the preferred active cluster. The
//! [`ConfigStore`] owns the file path and is injected into the registry
//! at construction time; there is no global configuration singleton.
//! Saves are atomic: the document is written to a sibling temp file and
//! renamed over the original, so a crash mid-write never corrupts the
//! on-disk copy.

use crate::error::RegistryError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

fn default_port() -> String {
    "8080".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Server section of the configuration document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerSettings {
    /// TCP port the API server listens on.
    #[serde(default = "default_port")]
    pub port: String,
    /// HTTP read timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub read_timeout: u64,
    /// HTTP write timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub write_timeout: u64,
    /// Name of the preferred active cluster; empty means none.
    #[serde(rename = "activeCluster", default)]
    pub active_cluster: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: default_port(),
            read_timeout: default_timeout_secs(),
            write_timeout: default_timeout_secs(),
            active_cluster: String::new(),
        }
    }
}

/// One persisted cluster definition.
///
/// `name` is the unique, stable identifier used in API paths; it is
/// immutable once created. `config_path` is the raw connection source
/// descriptor (see [`crate::source::ConnectionSource`]). An entry with
/// `is_active == false` never gets a live client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClusterEntry {
    /// Unique cluster name.
    pub name: String,
    /// Connection source descriptor: a kubeconfig path, `"in-cluster"`,
    /// `"default"` or empty.
    #[serde(default)]
    pub config_path: String,
    /// Whether a client should be kept for this entry.
    #[serde(default)]
    pub is_active: bool,
}

/// The full persisted configuration document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// Server settings, including the preferred active cluster.
    #[serde(default)]
    pub server: ServerSettings,
    /// Configured clusters.
    #[serde(default)]
    pub clusters: Vec<ClusterEntry>,
}

impl AppConfig {
    /// Returns the entry for `name`, if configured.
    #[must_use]
    pub fn cluster(&self, name: &str) -> Option<&ClusterEntry> {
        self.clusters.iter().find(|c| c.name == name)
    }
}

/// Loads and saves the configuration document at a fixed path.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Creates a store for the given document path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The path this store reads and writes.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads and parses the document.
    ///
    /// Only YAML documents (`.yaml` / `.yml`) are supported. A missing
    /// file is an error: the server cannot start without its document.
    pub fn load(&self) -> Result<AppConfig, RegistryError> {
        match self.path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => {}
            other => {
                return Err(RegistryError::ConfigInvalid(format!(
                    "unsupported configuration format '{}' for {}",
                    other.unwrap_or(""),
                    self.path.display()
                )));
            }
        }

        let raw = fs::read_to_string(&self.path).map_err(|e| {
            RegistryError::PersistenceFailed(format!(
                "cannot read {}: {e}",
                self.path.display()
            ))
        })?;
        let config: AppConfig = serde_yaml::from_str(&raw).map_err(|e| {
            RegistryError::ConfigInvalid(format!(
                "cannot parse {}: {e}",
                self.path.display()
            ))
        })?;
        Ok(config)
    }

    /// Writes the document atomically: temp file in the same directory,
    /// then rename over the target.
    pub fn save(&self, config: &AppConfig) -> Result<(), RegistryError> {
        let raw = serde_yaml::to_string(config).map_err(|e| {
            RegistryError::PersistenceFailed(format!("cannot serialize configuration: {e}"))
        })?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, raw.as_bytes()).map_err(|e| {
            RegistryError::PersistenceFailed(format!("cannot write {}: {e}", tmp.display()))
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            // Leave no stale temp file behind on a failed rename.
            let _ = fs::remove_file(&tmp);
            RegistryError::PersistenceFailed(format!(
                "cannot replace {}: {e}",
                self.path.display()
            ))
        })?;
        Ok(())
    }
}
