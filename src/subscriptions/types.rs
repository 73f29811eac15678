//! Handler and argument types for notification subscriptions.

use crate::error::{NotifyError, Result};
use crate::types::{Notification, ValueKind, RESERVED_PREFIX};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Outcome of a single handler invocation. Errors are reported, never propagated.
pub type HandlerResult = std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>;

type HandlerFn = dyn Fn(&Notification) -> HandlerResult + Send + Sync;

/// A callable subscribed to a notification name.
///
/// Cloning is cheap and yields the same handler: identity is the identity of
/// the underlying closure allocation, so a clone unsubscribes the original.
#[derive(Clone)]
pub struct NotificationHandler {
    inner: Arc<HandlerFn>,
}

impl NotificationHandler {
    /// Wrap a closure that may report a failure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Notification) -> HandlerResult + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    /// Wrap a closure that cannot fail.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&Notification) + Send + Sync + 'static,
    {
        Self::new(move |notification| {
            f(notification);
            Ok(())
        })
    }

    /// True if both references point at the same underlying callable.
    pub fn same(&self, other: &NotificationHandler) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn call(&self, notification: &Notification) -> HandlerResult {
        (self.inner)(notification)
    }
}

impl fmt::Debug for NotificationHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NotificationHandler({:p})", Arc::as_ptr(&self.inner))
    }
}

/// A dynamically-typed argument to the subscribe/unsubscribe surface.
///
/// Embedding code that forwards loosely-typed input (for example values
/// decoded from JSON) goes through this type so every call is validated the
/// same way regardless of where it came from.
#[derive(Clone, Debug)]
pub enum Argument {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Argument>),
    Mapping(Vec<(String, Argument)>),
    Handler(NotificationHandler),
}

impl Argument {
    /// Build a mapping argument, preserving iteration order.
    pub fn mapping<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Argument>,
        I: IntoIterator<Item = (K, V)>,
    {
        Argument::Mapping(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Argument::Undefined => ValueKind::Undefined,
            Argument::Null => ValueKind::Null,
            Argument::Bool(_) => ValueKind::Boolean,
            Argument::Number(_) => ValueKind::Number,
            Argument::String(_) => ValueKind::String,
            Argument::Array(_) | Argument::Mapping(_) => ValueKind::Object,
            Argument::Handler(_) => ValueKind::Function,
        }
    }
}

impl From<&str> for Argument {
    fn from(s: &str) -> Self {
        Argument::String(s.to_string())
    }
}

impl From<String> for Argument {
    fn from(s: String) -> Self {
        Argument::String(s)
    }
}

impl From<bool> for Argument {
    fn from(b: bool) -> Self {
        Argument::Bool(b)
    }
}

impl From<i32> for Argument {
    fn from(n: i32) -> Self {
        Argument::Number(n as f64)
    }
}

impl From<i64> for Argument {
    fn from(n: i64) -> Self {
        Argument::Number(n as f64)
    }
}

impl From<u64> for Argument {
    fn from(n: u64) -> Self {
        Argument::Number(n as f64)
    }
}

impl From<f64> for Argument {
    fn from(n: f64) -> Self {
        Argument::Number(n)
    }
}

impl From<NotificationHandler> for Argument {
    fn from(h: NotificationHandler) -> Self {
        Argument::Handler(h)
    }
}

impl From<&NotificationHandler> for Argument {
    fn from(h: &NotificationHandler) -> Self {
        Argument::Handler(h.clone())
    }
}

impl<T: Into<Argument>> From<Option<T>> for Argument {
    fn from(value: Option<T>) -> Self {
        value.map_or(Argument::Null, Into::into)
    }
}

impl<K: Into<String>> From<Vec<(K, NotificationHandler)>> for Argument {
    fn from(entries: Vec<(K, NotificationHandler)>) -> Self {
        Argument::mapping(entries)
    }
}

impl From<HashMap<String, NotificationHandler>> for Argument {
    fn from(map: HashMap<String, NotificationHandler>) -> Self {
        let mut entries: Vec<_> = map.into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Argument::mapping(entries)
    }
}

impl From<serde_json::Value> for Argument {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Argument::Null,
            Value::Bool(b) => Argument::Bool(b),
            Value::Number(n) => Argument::Number(n.as_f64().unwrap_or(f64::NAN)),
            Value::String(s) => Argument::String(s),
            Value::Array(items) => Argument::Array(items.into_iter().map(Into::into).collect()),
            Value::Object(map) => Argument::mapping(map),
        }
    }
}

/// The two call shapes of subscribe/unsubscribe, resolved once at the API
/// boundary.
#[derive(Clone, Debug)]
pub enum Subscriptions {
    Single { name: String, handler: Argument },
    Bulk(Vec<(String, Argument)>),
}

impl Subscriptions {
    /// Resolve `(subject, handler)` into a call shape.
    ///
    /// A mapping subject carries its own handlers and ignores `handler`.
    pub fn resolve(subject: Argument, handler: Argument) -> Result<Self> {
        match subject {
            Argument::String(name) => Ok(Subscriptions::Single { name, handler }),
            Argument::Mapping(entries) => Ok(Subscriptions::Bulk(entries)),
            other => Err(NotifyError::NotAMapping { got: other.kind() }),
        }
    }

    /// Validate every pair, failing on the first invalid one.
    ///
    /// Nothing is returned unless all pairs pass, so callers can apply the
    /// result without risking a partial mutation.
    pub fn validate(self) -> Result<Vec<(String, NotificationHandler)>> {
        match self {
            Subscriptions::Single { name, handler } => {
                Ok(vec![validate_entry(name, handler)?])
            }
            Subscriptions::Bulk(entries) => entries
                .into_iter()
                .map(|(name, handler)| validate_entry(name, handler))
                .collect(),
        }
    }
}

fn validate_entry(name: String, handler: Argument) -> Result<(String, NotificationHandler)> {
    if name.is_empty() {
        return Err(NotifyError::EmptyName);
    }

    if name.starts_with(RESERVED_PREFIX) {
        return Err(NotifyError::ReservedPrefix { name });
    }

    match handler {
        Argument::Handler(h) => Ok((name, h)),
        other => Err(NotifyError::NotCallable { got: other.kind() }),
    }
}
