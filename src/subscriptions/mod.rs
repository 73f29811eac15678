//! Notification subscriptions.
//!
//! A [`SubscriptionTable`] maps notification names to the handlers that
//! should run when a matching notification arrives. Every namespace owns one.
//!
//! Subscribe and unsubscribe accept two call shapes:
//! - a name and a handler
//! - a mapping of names to handlers
//!
//! Both are resolved into [`Subscriptions`] and validated in full before the
//! table is touched, so a bulk call with one bad pair changes nothing.
//!
//! # Example
//!
//! ```ignore
//! let table = SubscriptionTable::new();
//! let handler = NotificationHandler::from_fn(|n| println!("{:?}", n.params));
//!
//! table.on("progress".into(), handler.clone().into())?;
//! table.off(Argument::mapping([("progress", handler)]), Argument::Undefined)?;
//! ```

mod table;
mod types;

pub use table::SubscriptionTable;
pub use types::{Argument, HandlerResult, NotificationHandler, Subscriptions};
