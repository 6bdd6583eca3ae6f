//! Cluster registry.
//!
//! Owns the mapping from cluster name to live client, the optional
//! active-cluster pointer and the authoritative in-memory copy of the
//! configuration document. All mutation follows a persist-then-apply
//! protocol under an exclusive lock: the document is written first, and
//! only after a successful write is the client map touched. The durable
//! configuration therefore never references in-memory state that does
//! not exist; during the short window between persist and apply,
//! lookups simply report the cluster as unavailable.

use crate::client::ClusterClient;
use crate::config::{AppConfig, ClusterEntry, ConfigStore};
use crate::connector::ClusterConnector;
use crate::error::RegistryError;
use crate::source::ConnectionSource;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Per-cluster startup connectivity snapshot: name to "connected".
///
/// Produced once by [`ClusterRegistry::initialize`]; not updated
/// afterwards. Consumed by the health endpoint and startup logging.
pub type AvailabilityReport = BTreeMap<String, bool>;

struct Inner {
    config: AppConfig,
    clients: HashMap<String, ClusterClient>,
    active_name: Option<String>,
    active: Option<ClusterClient>,
}

/// Thread-safe registry of per-cluster clients.
///
/// Reads take a shared lock and never perform network I/O. Writes take
/// the exclusive lock for the whole validate-persist-apply sequence;
/// client (re)connection during a write happens under the lock, bounded
/// by the connector's probe timeout, so a hung endpoint cannot stall
/// the registry indefinitely.
pub struct ClusterRegistry {
    connector: Arc<dyn ClusterConnector>,
    store: ConfigStore,
    inner: RwLock<Inner>,
}

impl ClusterRegistry {
    /// Builds the registry from a loaded configuration document.
    ///
    /// Attempts a connection for every named, active entry and records
    /// the outcome in the returned [`AvailabilityReport`]. Unnamed
    /// entries are skipped; on duplicate names the first definition
    /// wins. Partial failure is expected: the registry stays usable for
    /// whichever clusters connected. If the document names a preferred
    /// active cluster and it connected, it becomes the active cluster;
    /// there is no fallback to "first available" here; that policy, if
    /// wanted, belongs to the caller.
    pub async fn initialize(
        store: ConfigStore,
        config: AppConfig,
        connector: Arc<dyn ClusterConnector>,
    ) -> (Self, AvailabilityReport) {
        let mut availability = AvailabilityReport::new();
        let mut clients: HashMap<String, ClusterClient> = HashMap::new();
        let mut seen: HashSet<String> = HashSet::new();

        if config.clusters.is_empty() {
            warn!("no clusters defined in the configuration document");
        }

        for entry in &config.clusters {
            if entry.name.is_empty() {
                warn!(
                    config_path = %entry.config_path,
                    "skipping unnamed cluster entry"
                );
                continue;
            }
            if !seen.insert(entry.name.clone()) {
                warn!(
                    cluster = %entry.name,
                    "duplicate cluster name, keeping the first definition"
                );
                continue;
            }
            if !entry.is_active {
                info!(cluster = %entry.name, "cluster marked inactive, skipping initialization");
                availability.insert(entry.name.clone(), false);
                continue;
            }

            let source = ConnectionSource::parse(&entry.config_path);
            match connector.connect(&entry.name, &source).await {
                Ok(client) => {
                    info!(
                        cluster = %entry.name,
                        server_url = client.server_url(),
                        "cluster client connected"
                    );
                    availability.insert(entry.name.clone(), true);
                    clients.insert(entry.name.clone(), client);
                }
                Err(e) => {
                    warn!(cluster = %entry.name, error = %e, "cluster client initialization failed");
                    availability.insert(entry.name.clone(), false);
                }
            }
        }

        let mut active_name = None;
        let mut active = None;
        let preferred = config.server.active_cluster.as_str();
        if !preferred.is_empty() {
            if let Some(client) = clients.get(preferred) {
                info!(cluster = preferred, "active cluster set from configuration");
                active_name = Some(preferred.to_string());
                active = Some(client.clone());
            } else {
                warn!(
                    cluster = preferred,
                    "configured active cluster is not available, leaving active cluster unset"
                );
            }
        }

        if clients.is_empty() && !config.clusters.is_empty() {
            warn!("no configured cluster produced a usable client");
        } else if !clients.is_empty() {
            info!(count = clients.len(), "cluster clients initialized");
        }

        let registry = Self {
            connector,
            store,
            inner: RwLock::new(Inner {
                config,
                clients,
                active_name,
                active,
            }),
        };
        (registry, availability)
    }

    // --- Lookup & selection -------------------------------------------------

    /// Returns the live client for `name`.
    ///
    /// Pure map lookup under the read lock. The failure distinguishes a
    /// cluster that was never configured, one that is configured but
    /// inactive, and one that is active but failed to initialize.
    pub async fn get_client(&self, name: &str) -> Result<ClusterClient, RegistryError> {
        let inner = self.inner.read().await;
        match inner.clients.get(name) {
            Some(client) => Ok(client.clone()),
            None => Err(lookup_failure(&inner.config, name)),
        }
    }

    /// Returns the designated active client.
    ///
    /// When the document names a preferred cluster that is not live,
    /// this reports [`RegistryError::ActiveClusterBroken`] rather than
    /// silently falling back to some other cluster.
    pub async fn get_active_client(&self) -> Result<ClusterClient, RegistryError> {
        let inner = self.inner.read().await;
        if let Some(client) = &inner.active {
            return Ok(client.clone());
        }
        let expected = inner.config.server.active_cluster.as_str();
        if expected.is_empty() {
            Err(RegistryError::NoActiveCluster)
        } else {
            Err(RegistryError::ActiveClusterBroken(expected.to_string()))
        }
    }

    /// Name of the current active cluster, if any.
    pub async fn active_cluster_name(&self) -> Option<String> {
        self.inner.read().await.active_name.clone()
    }

    /// Sorted names of clusters with a live client.
    ///
    /// Snapshot copy; the registry may mutate concurrently.
    pub async fn available_client_names(&self) -> Vec<String> {
        let inner = self.inner.read().await;
        let mut names: Vec<String> = inner.clients.keys().cloned().collect();
        names.sort();
        names
    }

    /// Snapshot of all live clients by name.
    pub async fn all_clients(&self) -> HashMap<String, ClusterClient> {
        self.inner.read().await.clients.clone()
    }

    /// The persisted entry for `name`.
    pub async fn cluster_config(&self, name: &str) -> Result<ClusterEntry, RegistryError> {
        let inner = self.inner.read().await;
        inner
            .config
            .cluster(name)
            .cloned()
            .ok_or_else(|| RegistryError::NotConfigured(name.to_string()))
    }

    /// Snapshot of all persisted cluster entries.
    pub async fn list_cluster_configs(&self) -> Vec<ClusterEntry> {
        self.inner.read().await.config.clusters.clone()
    }

    /// Switches the active cluster to `name` and persists the choice.
    ///
    /// The target must have a live client. If persisting fails the
    /// in-memory switch is kept and the failure is reported: rolling
    /// back would require re-validating a previous state that may
    /// itself no longer be live.
    pub async fn set_active_cluster(&self, name: &str) -> Result<(), RegistryError> {
        let mut inner = self.inner.write().await;
        let client = match inner.clients.get(name) {
            Some(client) => client.clone(),
            None => return Err(lookup_failure(&inner.config, name)),
        };

        inner.active = Some(client);
        inner.active_name = Some(name.to_string());
        inner.config.server.active_cluster = name.to_string();

        if let Err(e) = self.store.save(&inner.config) {
            return Err(RegistryError::PersistenceFailed(format!(
                "active cluster switched to '{name}', but saving the configuration failed: {e}; \
                 the on-disk document may be stale"
            )));
        }
        info!(cluster = name, "active cluster switched and persisted");
        Ok(())
    }

    // --- Mutation (add / update / remove) -----------------------------------

    /// Adds a cluster entry, persists the document and, when the entry
    /// is active, connects a client for it.
    ///
    /// Connection failure after a successful persist is not an error:
    /// the cluster is configured but reported unavailable on lookup.
    pub async fn add_cluster(&self, entry: ClusterEntry) -> Result<(), RegistryError> {
        let mut inner = self.inner.write().await;

        if entry.name.trim().is_empty() {
            return Err(RegistryError::ConfigInvalid(
                "cluster name must not be empty".to_string(),
            ));
        }
        if inner.config.cluster(&entry.name).is_some() {
            return Err(RegistryError::ConfigInvalid(format!(
                "cluster '{}' already exists",
                entry.name
            )));
        }

        inner.config.clusters.push(entry.clone());
        if let Err(e) = self.store.save(&inner.config) {
            inner.config.clusters.pop();
            return Err(e);
        }
        info!(cluster = %entry.name, "cluster added and persisted");

        if entry.is_active {
            let source = ConnectionSource::parse(&entry.config_path);
            match self.connector.connect(&entry.name, &source).await {
                Ok(client) => {
                    // The document may already name this cluster as the
                    // preferred active one (e.g. it was removed and re-added).
                    if inner.active.is_none()
                        && inner.config.server.active_cluster == entry.name
                    {
                        info!(cluster = %entry.name, "new cluster set active per configuration");
                        inner.active_name = Some(entry.name.clone());
                        inner.active = Some(client.clone());
                    }
                    inner.clients.insert(entry.name.clone(), client);
                    info!(cluster = %entry.name, "cluster client connected");
                }
                Err(e) => {
                    warn!(
                        cluster = %entry.name,
                        error = %e,
                        "cluster added but client initialization failed"
                    );
                }
            }
        } else {
            info!(cluster = %entry.name, "cluster added as inactive, no client initialized");
        }
        Ok(())
    }

    /// Replaces the entry for `name`, persists the document and swaps
    /// the client.
    ///
    /// The name is immutable; `updated.name` must be empty or equal to
    /// `name`. Any previously live client for the cluster is discarded
    /// unconditionally: a stale handle is never returned after an
    /// update, even if reconnection fails.
    pub async fn update_cluster(
        &self,
        name: &str,
        updated: ClusterEntry,
    ) -> Result<(), RegistryError> {
        let mut inner = self.inner.write().await;

        if !updated.name.is_empty() && updated.name != name {
            return Err(RegistryError::ConfigInvalid(format!(
                "cluster name is immutable (cannot rename '{name}' to '{}')",
                updated.name
            )));
        }
        let Some(index) = inner.config.clusters.iter().position(|c| c.name == name) else {
            return Err(RegistryError::NotConfigured(name.to_string()));
        };

        let updated = ClusterEntry {
            name: name.to_string(),
            config_path: updated.config_path,
            is_active: updated.is_active,
        };
        let was_active = inner.active_name.as_deref() == Some(name);

        let original = std::mem::replace(&mut inner.config.clusters[index], updated.clone());
        if let Err(e) = self.store.save(&inner.config) {
            inner.config.clusters[index] = original;
            return Err(e);
        }
        info!(cluster = name, "cluster updated and persisted");

        // Old client is dropped unconditionally; updates never mutate a
        // live client in place.
        if inner.clients.remove(name).is_some() {
            info!(cluster = name, "discarded previous cluster client");
        }
        if was_active {
            inner.active = None;
            inner.active_name = None;
        }

        if updated.is_active {
            let source = ConnectionSource::parse(&updated.config_path);
            match self.connector.connect(name, &source).await {
                Ok(client) => {
                    if inner.config.server.active_cluster == name {
                        info!(cluster = name, "updated cluster restored as active");
                        inner.active_name = Some(name.to_string());
                        inner.active = Some(client.clone());
                    }
                    inner.clients.insert(name.to_string(), client);
                    info!(cluster = name, "cluster client reconnected");
                }
                Err(e) => {
                    warn!(
                        cluster = name,
                        error = %e,
                        "cluster updated but client reconnection failed"
                    );
                }
            }
        } else {
            info!(cluster = name, "cluster updated as inactive, no client kept");
        }

        if was_active && inner.active.is_none() {
            self.clear_persisted_active(&mut inner, name);
        }
        Ok(())
    }

    /// Removes the entry for `name`, persists the document and drops
    /// its client.
    pub async fn remove_cluster(&self, name: &str) -> Result<(), RegistryError> {
        let mut inner = self.inner.write().await;

        let Some(index) = inner.config.clusters.iter().position(|c| c.name == name) else {
            return Err(RegistryError::NotConfigured(name.to_string()));
        };
        let was_active = inner.active_name.as_deref() == Some(name);

        let removed = inner.config.clusters.remove(index);
        if let Err(e) = self.store.save(&inner.config) {
            inner.config.clusters.insert(index, removed);
            return Err(e);
        }
        info!(cluster = name, "cluster removed and persisted");

        if inner.clients.remove(name).is_some() {
            info!(cluster = name, "discarded cluster client");
        }
        if was_active {
            inner.active = None;
            inner.active_name = None;
            self.clear_persisted_active(&mut inner, name);
        }
        Ok(())
    }

    /// Clears the document's preferred-active-cluster field and saves,
    /// best-effort. The in-memory state is already consistent at this
    /// point; a failed save is logged, not surfaced.
    fn clear_persisted_active(&self, inner: &mut Inner, name: &str) {
        if inner.config.server.active_cluster != name {
            return;
        }
        inner.config.server.active_cluster.clear();
        if let Err(e) = self.store.save(&inner.config) {
            warn!(
                cluster = name,
                error = %e,
                "failed to persist cleared active cluster; on-disk document still names it"
            );
        } else {
            info!(cluster = name, "cleared persisted active cluster");
        }
    }
}

impl std::fmt::Debug for ClusterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterRegistry")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

/// Explains why `name` has no live client, consulting the document.
fn lookup_failure(config: &AppConfig, name: &str) -> RegistryError {
    match config.cluster(name) {
        Some(entry) if !entry.is_active => RegistryError::Inactive(name.to_string()),
        Some(_) => RegistryError::Unavailable(name.to_string()),
        None => RegistryError::NotConfigured(name.to_string()),
    }
}
