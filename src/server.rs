//! Server-side entry point tying the registry and dispatcher together.

use crate::dispatch::{DispatchSummary, Dispatcher};
use crate::error::{NotifyError, Result};
use crate::message::{CallEnvelope, InboundMessage};
use crate::namespaces::{Namespace, NamespaceRegistry};
use crate::subscriptions::Argument;
use crate::types::{ConnectionId, Notification};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Default threshold above which a handler invocation is logged as slow.
pub const DEFAULT_SLOW_HANDLER_MS: u64 = 1000;

/// Server configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Handler invocations taking at least this long are logged.
    /// Default: 1000ms
    pub slow_handler_threshold_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            slow_handler_threshold_ms: DEFAULT_SLOW_HANDLER_MS,
        }
    }
}

impl ServerConfig {
    /// Load configuration from a JSON document. Missing fields take defaults.
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| NotifyError::Config(e.to_string()))
    }

    pub fn slow_handler_threshold(&self) -> Duration {
        Duration::from_millis(self.slow_handler_threshold_ms)
    }
}

/// A connection attached to a namespace.
#[derive(Clone, Debug)]
pub struct ConnectionHandle {
    id: ConnectionId,
    namespace: Arc<Namespace>,
}

impl ConnectionHandle {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn namespace(&self) -> &Arc<Namespace> {
        &self.namespace
    }
}

/// Result of handling one inbound text frame.
#[derive(Clone, Debug, Default)]
pub struct MessageOutcome {
    /// One summary per notification in the frame, in frame order.
    pub dispatched: Vec<DispatchSummary>,
    /// Calls expecting a reply, for the request/response layer.
    pub calls: Vec<CallEnvelope>,
    /// Replies to server-initiated calls.
    pub replies: Vec<Value>,
}

/// Notification registry and dispatcher embedded in a JSON-RPC server.
///
/// Provides:
/// - Subscribing and unsubscribing handlers on the root namespace
/// - Lazily-created namespaces with their own subscriptions
/// - Connection attach/detach bookkeeping
/// - Dispatch of inbound notifications to the connection's namespace
pub struct NotificationServer {
    config: ServerConfig,
    registry: Arc<NamespaceRegistry>,
    dispatcher: Dispatcher,
    next_connection: AtomicU64,
}

impl NotificationServer {
    pub fn new(config: ServerConfig) -> Self {
        let dispatcher = Dispatcher::new(config.slow_handler_threshold());
        Self {
            config,
            registry: Arc::new(NamespaceRegistry::new()),
            dispatcher,
            next_connection: AtomicU64::new(1),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Shared handle to the namespace registry.
    pub fn registry(&self) -> Arc<NamespaceRegistry> {
        Arc::clone(&self.registry)
    }

    // --- Root namespace subscriptions ---

    /// Subscribe `handler` to `name` in the root namespace.
    ///
    /// `name` may instead be a mapping of names to handlers.
    pub fn on_notification(
        &self,
        name: impl Into<Argument>,
        handler: impl Into<Argument>,
    ) -> Result<()> {
        self.registry.root().on_notification(name, handler)
    }

    pub fn on_notifications(&self, subscriptions: impl Into<Argument>) -> Result<()> {
        self.registry.root().on_notifications(subscriptions)
    }

    /// Unsubscribe `handler` from `name` in the root namespace.
    pub fn off_notification(
        &self,
        name: impl Into<Argument>,
        handler: impl Into<Argument>,
    ) -> Result<()> {
        self.registry.root().off_notification(name, handler)
    }

    pub fn off_notifications(&self, subscriptions: impl Into<Argument>) -> Result<()> {
        self.registry.root().off_notifications(subscriptions)
    }

    // --- Namespaces ---

    /// Get the namespace at `path`, creating it on first reference.
    pub fn get_or_create_namespace(&self, path: &str) -> Arc<Namespace> {
        self.registry.get_or_create(path)
    }

    /// Shorthand for [`Self::get_or_create_namespace`].
    pub fn of(&self, path: &str) -> Arc<Namespace> {
        self.get_or_create_namespace(path)
    }

    /// All known namespace paths, sorted.
    pub fn namespaces(&self) -> Vec<String> {
        self.registry.paths()
    }

    // --- Connections ---

    /// Record a new connection in the namespace at `path`.
    pub fn connection_established(&self, path: &str) -> ConnectionHandle {
        let id = ConnectionId(self.next_connection.fetch_add(1, Ordering::SeqCst));
        let namespace = self.registry.get_or_create(path);
        namespace.attach(id);
        ConnectionHandle { id, namespace }
    }

    /// Detach a connection. Its namespace and subscriptions are kept.
    pub fn connection_closed(&self, connection: &ConnectionHandle) {
        connection.namespace.detach(connection.id);
    }

    // --- Dispatch ---

    /// Route a notification to the handlers subscribed in `path`.
    pub fn dispatch(
        &self,
        path: &str,
        method: &str,
        params: Option<Value>,
        connection: Option<ConnectionId>,
    ) -> DispatchSummary {
        let namespace = self.registry.get_or_create(path);
        let notification = Notification {
            namespace: path.to_string(),
            method: method.to_string(),
            params,
            connection,
        };
        self.dispatcher.dispatch(&namespace, &notification)
    }

    /// Decode a raw text frame from `connection` and dispatch its notifications.
    ///
    /// A frame that fails to decode dispatches nothing. Frames from a
    /// connection that was already closed are rejected.
    pub fn handle_message(
        &self,
        connection: &ConnectionHandle,
        raw: &str,
    ) -> Result<MessageOutcome> {
        if !connection.namespace.is_connected(connection.id) {
            return Err(NotifyError::ConnectionClosed(connection.id));
        }

        let messages = InboundMessage::parse_frame(raw)?;
        let mut outcome = MessageOutcome::default();

        for message in messages {
            match message {
                InboundMessage::Notification { method, params } => {
                    let notification = Notification {
                        namespace: connection.namespace.path().to_string(),
                        method,
                        params,
                        connection: Some(connection.id),
                    };
                    outcome
                        .dispatched
                        .push(self.dispatcher.dispatch(&connection.namespace, &notification));
                }
                InboundMessage::Call(call) => outcome.calls.push(call),
                InboundMessage::Reply(reply) => outcome.replies.push(reply),
            }
        }

        Ok(outcome)
    }
}

impl Default for NotificationServer {
    fn default() -> Self {
        Self::new(ServerConfig::default())
    }
}
