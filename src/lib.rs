//! # Notification Registry
//!
//! Namespaced notification subscriptions for a JSON-RPC server that talks to
//! each client over one long-lived, bidirectional connection.
//!
//! ## Core Concepts
//!
//! - **Notifications**: One-way JSON-RPC messages identified by method name
//! - **Handlers**: Callables subscribed to a notification name
//! - **Namespaces**: Isolated routing domains, each with its own subscriptions
//! - **Dispatch**: Running every handler subscribed to an inbound notification
//!
//! ## Example
//!
//! ```ignore
//! use rpc_notify::{NotificationHandler, NotificationServer, ServerConfig};
//!
//! let server = NotificationServer::new(ServerConfig::default());
//!
//! // Subscribe on the root namespace
//! server.on_notification("heartbeat", NotificationHandler::from_fn(|n| {
//!     println!("heartbeat from {:?}", n.connection);
//! }))?;
//!
//! // Subscribe in an isolated namespace
//! let chat = server.get_or_create_namespace("/chat");
//! chat.on_notification("typing", NotificationHandler::from_fn(|_| {}))?;
//!
//! // Feed inbound frames from the transport
//! let conn = server.connection_established("/chat");
//! server.handle_message(&conn, r#"{"jsonrpc":"2.0","method":"typing"}"#)?;
//! ```

pub mod dispatch;
pub mod error;
pub mod message;
pub mod namespaces;
pub mod server;
pub mod subscriptions;
pub mod types;

// Re-exports
pub use dispatch::{DispatchSummary, Dispatcher};
pub use error::{ErrorKind, NotifyError, Result};
pub use message::{CallEnvelope, InboundMessage};
pub use namespaces::{Namespace, NamespaceRegistry};
pub use server::{ConnectionHandle, MessageOutcome, NotificationServer, ServerConfig};
pub use subscriptions::{
    Argument, HandlerResult, NotificationHandler, SubscriptionTable, Subscriptions,
};
pub use types::*;
