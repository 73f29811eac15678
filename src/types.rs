//! Core types shared by the registry, dispatcher and server.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Path of the namespace that always exists.
pub const ROOT_NAMESPACE: &str = "/";

/// Notification names with this prefix are reserved for internal use.
pub const RESERVED_PREFIX: &str = "rpc.";

/// Unique identifier for a client connection.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub u64);

impl fmt::Debug for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConnectionId({})", self.0)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Observable kind of an argument, as reported in error messages.
///
/// Arrays and mappings both report `object`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Undefined,
    Null,
    Boolean,
    Number,
    String,
    Object,
    Function,
}

impl ValueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ValueKind::Undefined => "undefined",
            ValueKind::Null => "null",
            ValueKind::Boolean => "boolean",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Object => "object",
            ValueKind::Function => "function",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An inbound notification as seen by handlers.
#[derive(Clone, Debug, PartialEq)]
pub struct Notification {
    /// Namespace the message was routed to.
    pub namespace: String,
    /// JSON-RPC method name.
    pub method: String,
    /// Raw `params` member, if present.
    pub params: Option<serde_json::Value>,
    /// Originating connection, when the transport supplied one.
    pub connection: Option<ConnectionId>,
}

impl Notification {
    pub fn new(namespace: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            method: method.into(),
            params: None,
            connection: None,
        }
    }

    pub fn with_params(mut self, params: serde_json::Value) -> Self {
        self.params = Some(params);
        self
    }

    pub fn with_connection(mut self, connection: ConnectionId) -> Self {
        self.connection = Some(connection);
        self
    }
}
