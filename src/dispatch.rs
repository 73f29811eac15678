//! Routing of inbound notifications to subscribed handlers.

use crate::namespaces::Namespace;
use crate::subscriptions::NotificationHandler;
use crate::types::Notification;
use serde::Serialize;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::{Duration, Instant};

/// What happened during one dispatch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DispatchSummary {
    /// Handlers subscribed to the method when dispatch started.
    pub matched: usize,
    /// Handlers that returned `Ok`.
    pub succeeded: usize,
    /// Handlers that returned an error or panicked.
    pub failed: usize,
}

/// Invokes handlers for inbound notifications.
///
/// Each handler runs inside its own failure boundary: an error or panic is
/// logged and counted, and the remaining handlers still run.
#[derive(Clone, Debug)]
pub struct Dispatcher {
    slow_handler_threshold: Duration,
}

impl Dispatcher {
    pub fn new(slow_handler_threshold: Duration) -> Self {
        Self {
            slow_handler_threshold,
        }
    }

    /// Invoke every handler subscribed to `notification.method` in `namespace`.
    ///
    /// Handlers run in registration order against a snapshot taken before the
    /// first one runs. Subscriptions changed by a handler take effect from the
    /// next dispatch.
    pub fn dispatch(&self, namespace: &Namespace, notification: &Notification) -> DispatchSummary {
        let handlers = namespace.handlers(&notification.method);

        if handlers.is_empty() {
            tracing::trace!(
                namespace = %namespace.path(),
                method = %notification.method,
                "no handlers for notification"
            );
            return DispatchSummary::default();
        }

        let mut summary = DispatchSummary {
            matched: handlers.len(),
            ..Default::default()
        };

        for (position, handler) in handlers.iter().enumerate() {
            if self.invoke(handler, position, notification) {
                summary.succeeded += 1;
            } else {
                summary.failed += 1;
            }
        }

        summary
    }

    fn invoke(
        &self,
        handler: &NotificationHandler,
        position: usize,
        notification: &Notification,
    ) -> bool {
        let start = Instant::now();
        let result = catch_unwind(AssertUnwindSafe(|| handler.call(notification)));
        let elapsed = start.elapsed();

        if elapsed >= self.slow_handler_threshold {
            tracing::warn!(
                namespace = %notification.namespace,
                method = %notification.method,
                position,
                duration_ms = elapsed.as_millis() as u64,
                "slow notification handler"
            );
        }

        match result {
            Ok(Ok(())) => true,
            Ok(Err(err)) => {
                tracing::warn!(
                    namespace = %notification.namespace,
                    method = %notification.method,
                    position,
                    error = %err,
                    "notification handler failed"
                );
                false
            }
            Err(panic) => {
                tracing::warn!(
                    namespace = %notification.namespace,
                    method = %notification.method,
                    position,
                    panic = panic_message(&*panic),
                    "notification handler panicked"
                );
                false
            }
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(Duration::from_millis(crate::server::DEFAULT_SLOW_HANDLER_MS))
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "<non-string panic payload>"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespaces::NamespaceRegistry;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn recorder(log: &Arc<Mutex<Vec<&'static str>>>, tag: &'static str) -> NotificationHandler {
        let log = Arc::clone(log);
        NotificationHandler::from_fn(move |_| log.lock().push(tag))
    }

    #[test]
    fn test_dispatch_in_registration_order() {
        let registry = NamespaceRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let ns = registry.root();

        ns.on_notification("n", recorder(&log, "a")).unwrap();
        ns.on_notification("n", recorder(&log, "b")).unwrap();
        ns.on_notification("other", recorder(&log, "x")).unwrap();

        let summary = Dispatcher::default().dispatch(ns, &Notification::new("/", "n"));

        assert_eq!(*log.lock(), vec!["a", "b"]);
        assert_eq!(
            summary,
            DispatchSummary {
                matched: 2,
                succeeded: 2,
                failed: 0
            }
        );
    }

    #[test]
    fn test_unmatched_is_noop() {
        let registry = NamespaceRegistry::new();
        let summary =
            Dispatcher::default().dispatch(registry.root(), &Notification::new("/", "nothing"));
        assert_eq!(summary, DispatchSummary::default());
    }

    #[test]
    fn test_failures_are_isolated() {
        let registry = NamespaceRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let ns = registry.root();

        ns.on_notification("n", NotificationHandler::new(|_| Err("boom".into())))
            .unwrap();
        ns.on_notification("n", NotificationHandler::from_fn(|_| panic!("handler panic")))
            .unwrap();
        ns.on_notification("n", recorder(&log, "last")).unwrap();

        let summary = Dispatcher::default().dispatch(ns, &Notification::new("/", "n"));

        assert_eq!(*log.lock(), vec!["last"]);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.succeeded, 1);
    }

    #[test]
    fn test_panic_message_extraction() {
        let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(&*payload), "owned");

        let payload: Box<dyn std::any::Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(&*payload), "<non-string panic payload>");
    }
}
