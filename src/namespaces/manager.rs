//! Namespace registry implementation.

use crate::error::Result;
use crate::subscriptions::{Argument, NotificationHandler, SubscriptionTable};
use crate::types::{ConnectionId, ROOT_NAMESPACE};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// An isolated routing domain with its own subscriptions and connections.
pub struct Namespace {
    path: String,
    subscriptions: SubscriptionTable,
    connections: RwLock<HashSet<ConnectionId>>,
}

impl Namespace {
    fn new(path: String) -> Self {
        Self {
            path,
            subscriptions: SubscriptionTable::new(),
            connections: RwLock::new(HashSet::new()),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Subscribe `handler` to the notification `name` in this namespace.
    ///
    /// `name` may also be a mapping of names to handlers, in which case
    /// `handler` is ignored.
    pub fn on_notification(
        &self,
        name: impl Into<Argument>,
        handler: impl Into<Argument>,
    ) -> Result<()> {
        self.subscriptions.on(name.into(), handler.into())
    }

    /// Subscribe every name/handler pair of `subscriptions`.
    pub fn on_notifications(&self, subscriptions: impl Into<Argument>) -> Result<()> {
        self.subscriptions
            .on(subscriptions.into(), Argument::Undefined)
    }

    /// Unsubscribe `handler` from the notification `name` in this namespace.
    pub fn off_notification(
        &self,
        name: impl Into<Argument>,
        handler: impl Into<Argument>,
    ) -> Result<()> {
        self.subscriptions.off(name.into(), handler.into())
    }

    /// Unsubscribe every name/handler pair of `subscriptions`.
    pub fn off_notifications(&self, subscriptions: impl Into<Argument>) -> Result<()> {
        self.subscriptions
            .off(subscriptions.into(), Argument::Undefined)
    }

    /// Handlers currently subscribed to `name`, in registration order.
    pub fn handlers(&self, name: &str) -> Vec<NotificationHandler> {
        self.subscriptions.snapshot(name)
    }

    pub fn handler_count(&self, name: &str) -> usize {
        self.subscriptions.handler_count(name)
    }

    /// Names with at least one subscribed handler.
    pub fn notification_names(&self) -> Vec<String> {
        self.subscriptions.names()
    }

    // --- Connections ---

    pub(crate) fn attach(&self, id: ConnectionId) {
        self.connections.write().insert(id);
        tracing::debug!(namespace = %self.path, connection = %id, "connection attached");
    }

    pub(crate) fn detach(&self, id: ConnectionId) -> bool {
        let removed = self.connections.write().remove(&id);
        if removed {
            tracing::debug!(namespace = %self.path, connection = %id, "connection detached");
        }
        removed
    }

    pub fn is_connected(&self, id: ConnectionId) -> bool {
        self.connections.read().contains(&id)
    }

    pub fn connection_count(&self) -> usize {
        self.connections.read().len()
    }

    /// Active connections, sorted by id.
    pub fn connections(&self) -> Vec<ConnectionId> {
        let mut ids: Vec<_> = self.connections.read().iter().copied().collect();
        ids.sort();
        ids
    }
}

impl std::fmt::Debug for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Namespace")
            .field("path", &self.path)
            .field("notifications", &self.subscriptions.names())
            .field("connections", &self.connection_count())
            .finish()
    }
}

/// Maps namespace paths to namespaces, creating them on first reference.
///
/// Namespaces live as long as the registry. The root namespace exists from
/// construction.
pub struct NamespaceRegistry {
    namespaces: RwLock<HashMap<String, Arc<Namespace>>>,
    root: Arc<Namespace>,
}

impl NamespaceRegistry {
    /// Create a registry holding only the root namespace.
    pub fn new() -> Self {
        let root = Arc::new(Namespace::new(ROOT_NAMESPACE.to_string()));
        let mut namespaces = HashMap::new();
        namespaces.insert(ROOT_NAMESPACE.to_string(), Arc::clone(&root));

        Self {
            namespaces: RwLock::new(namespaces),
            root,
        }
    }

    pub fn root(&self) -> &Arc<Namespace> {
        &self.root
    }

    /// Get the namespace at `path`, creating it if this is the first reference.
    ///
    /// Repeated calls with the same path return the same instance.
    pub fn get_or_create(&self, path: &str) -> Arc<Namespace> {
        if let Some(ns) = self.namespaces.read().get(path) {
            return Arc::clone(ns);
        }

        // Another thread may have created it between the two locks.
        let mut namespaces = self.namespaces.write();
        let ns = namespaces.entry(path.to_string()).or_insert_with(|| {
            tracing::debug!(namespace = %path, "created namespace");
            Arc::new(Namespace::new(path.to_string()))
        });
        Arc::clone(ns)
    }

    /// Get the namespace at `path` without creating it.
    pub fn get(&self, path: &str) -> Option<Arc<Namespace>> {
        self.namespaces.read().get(path).cloned()
    }

    /// All known namespace paths, sorted.
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.namespaces.read().keys().cloned().collect();
        paths.sort();
        paths
    }

    pub fn len(&self) -> usize {
        self.namespaces.read().len()
    }

    /// Always false: the root namespace exists from construction.
    pub fn is_empty(&self) -> bool {
        self.namespaces.read().is_empty()
    }
}

impl Default for NamespaceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> NotificationHandler {
        NotificationHandler::from_fn(|_| {})
    }

    #[test]
    fn test_root_exists() {
        let registry = NamespaceRegistry::new();
        assert_eq!(registry.len(), 1);
        assert!(registry.get(ROOT_NAMESPACE).is_some());
        assert!(Arc::ptr_eq(
            registry.root(),
            &registry.get_or_create(ROOT_NAMESPACE)
        ));
    }

    #[test]
    fn test_get_or_create_is_idempotent() {
        let registry = NamespaceRegistry::new();

        let first = registry.get_or_create("/custom");
        let second = registry.get_or_create("/custom");

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.paths(), vec!["/".to_string(), "/custom".to_string()]);
    }

    #[test]
    fn test_get_does_not_create() {
        let registry = NamespaceRegistry::new();
        assert!(registry.get("/nope").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_tables_are_isolated() {
        let registry = NamespaceRegistry::new();
        let a = registry.get_or_create("/a");
        let b = registry.get_or_create("/b");

        a.on_notification("update", noop()).unwrap();

        assert_eq!(a.handlers("update").len(), 1);
        assert!(b.handlers("update").is_empty());
        assert!(registry.root().handlers("update").is_empty());
    }

    #[test]
    fn test_connections_attach_detach() {
        let registry = NamespaceRegistry::new();
        let ns = registry.get_or_create("/chat");

        ns.attach(ConnectionId(1));
        ns.attach(ConnectionId(2));
        assert_eq!(ns.connections(), vec![ConnectionId(1), ConnectionId(2)]);

        assert!(ns.detach(ConnectionId(1)));
        assert!(!ns.detach(ConnectionId(1)));
        assert_eq!(ns.connection_count(), 1);

        // Namespace outlives its connections.
        ns.detach(ConnectionId(2));
        assert!(Arc::ptr_eq(&ns, &registry.get_or_create("/chat")));
    }
}
