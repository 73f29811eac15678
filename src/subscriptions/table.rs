//! Per-namespace table of notification subscriptions.

use crate::error::Result;
use parking_lot::RwLock;
use std::collections::HashMap;

use super::types::{Argument, NotificationHandler, Subscriptions};

/// Maps notification names to their handlers in registration order.
///
/// Invariant: no name maps to an empty sequence.
pub struct SubscriptionTable {
    entries: RwLock<HashMap<String, Vec<NotificationHandler>>>,
}

impl SubscriptionTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Subscribe `handler` to `subject`, or every pair of a mapping `subject`.
    pub fn on(&self, subject: Argument, handler: Argument) -> Result<()> {
        let entries = Subscriptions::resolve(subject, handler)?.validate()?;

        let mut table = self.entries.write();
        for (name, handler) in entries {
            tracing::debug!(name = %name, handler = ?handler, "subscribed notification handler");
            table.entry(name).or_default().push(handler);
        }

        Ok(())
    }

    /// Unsubscribe `handler` from `subject`, or every pair of a mapping `subject`.
    ///
    /// Only the first matching occurrence is removed. Unknown names and
    /// handlers are ignored.
    pub fn off(&self, subject: Argument, handler: Argument) -> Result<()> {
        let entries = Subscriptions::resolve(subject, handler)?.validate()?;

        let mut table = self.entries.write();
        for (name, handler) in entries {
            let Some(handlers) = table.get_mut(&name) else {
                continue;
            };

            if let Some(pos) = handlers.iter().position(|h| h.same(&handler)) {
                handlers.remove(pos);
                tracing::debug!(
                    name = %name,
                    handler = ?handler,
                    "unsubscribed notification handler"
                );
            }

            if handlers.is_empty() {
                table.remove(&name);
            }
        }

        Ok(())
    }

    /// Copy of the handlers currently subscribed to `name`.
    ///
    /// The lock is released before this returns, so the caller may invoke the
    /// handlers while they subscribe or unsubscribe.
    pub fn snapshot(&self, name: &str) -> Vec<NotificationHandler> {
        self.entries
            .read()
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of handlers subscribed to `name`.
    pub fn handler_count(&self, name: &str) -> usize {
        self.entries.read().get(name).map_or(0, Vec::len)
    }

    /// Names with at least one handler, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for SubscriptionTable {
    fn default() -> Self {
        Self::new()
    }
}
