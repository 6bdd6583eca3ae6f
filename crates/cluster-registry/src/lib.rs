//! Multi-Cluster Registry Core
//!
//! Owns, creates, validates, switches and exposes per-cluster
//! Kubernetes clients so that any handler can operate against an
//! arbitrarily named cluster selected at request time. Backed by a
//! persisted YAML configuration document; all mutation is
//! persist-then-apply and atomic on disk.
//!
//! # Example
//!
//! ```no_run
//! use cluster_registry::{ClusterRegistry, ConfigStore, KubeConnector, resolve_client};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Load the persisted document and bring up one client per
//! // configured, active cluster.
//! let store = ConfigStore::new("config.yaml");
//! let config = store.load()?;
//! let (registry, availability) =
//!     ClusterRegistry::initialize(store, config, Arc::new(KubeConnector::default())).await;
//!
//! for (cluster, up) in &availability {
//!     println!("{cluster}: {}", if *up { "connected" } else { "unavailable" });
//! }
//!
//! // Per-request: resolve the cluster named in the URL to a client.
//! let client = resolve_client(&registry, Some("alpha")).await?;
//! let version = client.kube().apiserver_version().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **Lifecycle**: add / update / remove cluster entries with
//!   persist-then-apply ordering and atomic document rewrites
//! - **Selection**: active-cluster pointer with distinct
//!   "broken" vs "unset" failure reporting
//! - **Lookup**: lock-protected, I/O-free lookups distinguishing
//!   unknown, inactive and unavailable clusters
//! - **Testing**: connector trait seam with a scriptable mock behind
//!   the `test-util` feature

pub mod client;
pub mod config;
pub mod error;
pub mod kube_connector;
pub mod registry;
pub mod resolver;
pub mod source;
#[path = "trait.rs"]
pub mod connector;
#[cfg(feature = "test-util")]
pub mod mock;

pub use client::ClusterClient;
pub use config::{AppConfig, ClusterEntry, ConfigStore, ServerSettings};
pub use connector::ClusterConnector;
pub use error::{ConnectCause, RegistryError, ResolveError};
pub use kube_connector::KubeConnector;
pub use registry::{AvailabilityReport, ClusterRegistry};
pub use resolver::resolve_client;
pub use source::ConnectionSource;
#[cfg(feature = "test-util")]
pub use mock::MockConnector;
