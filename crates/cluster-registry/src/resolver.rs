//! Request-scoped client resolution.
//!
//! The sole bridge between per-request resource handlers and the
//! registry: extract the cluster name from the request's addressing
//! scheme, hand back a live client or a typed failure. No caching, no
//! state. Handlers map [`ResolveError::MissingClusterName`] to a 400
//! and the registry's lookup failures to 404-class responses.

use crate::client::ClusterClient;
use crate::error::ResolveError;
use crate::registry::ClusterRegistry;

/// Resolves an optional request-supplied cluster name to a live client.
///
/// `cluster` is whatever the request addressing scheme carried (e.g.
/// the `{name}` path segment); `None` or a blank string is a bad
/// request.
pub async fn resolve_client(
    registry: &ClusterRegistry,
    cluster: Option<&str>,
) -> Result<ClusterClient, ResolveError> {
    let name = cluster
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or(ResolveError::MissingClusterName)?;
    Ok(registry.get_client(name).await?)
}
