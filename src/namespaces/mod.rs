//! Namespace registry.

mod manager;

pub use manager::{Namespace, NamespaceRegistry};
