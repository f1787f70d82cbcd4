//! # Context Registry
//!
//! Maps context ids to live [`GraphContext`]s. The map is the only shared
//! mutable state of the service and sits behind a [`RwLock`]; lookups clone
//! what they need out of a context and release the lock before any query
//! runs.

use crate::context::GraphContext;
use crate::events::ContextId;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Thread-safe id → context map.
#[derive(Debug, Default)]
pub struct ContextRegistry {
    contexts: RwLock<HashMap<ContextId, GraphContext>>,
}

impl ContextRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    // Contexts stay consistent even if a holder panicked, so poisoning is
    // ignored.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<ContextId, GraphContext>> {
        self.contexts.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<ContextId, GraphContext>> {
        self.contexts.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inserts a context under its own id and returns the context it
    /// replaced, if any.
    pub fn insert(&self, context: GraphContext) -> Option<GraphContext> {
        self.write().insert(context.id().to_string(), context)
    }

    /// Removes and returns a context.
    pub fn remove(&self, id: &str) -> Option<GraphContext> {
        self.write().remove(id)
    }

    /// Runs `f` against a context under the read lock.
    pub fn with<R>(&self, id: &str, f: impl FnOnce(&GraphContext) -> R) -> Option<R> {
        self.read().get(id).map(f)
    }

    /// Returns true if a context is registered under `id`.
    pub fn contains(&self, id: &str) -> bool {
        self.read().contains_key(id)
    }

    /// Returns the registered ids, sorted.
    pub fn ids(&self) -> Vec<ContextId> {
        let mut ids: Vec<ContextId> = self.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of registered contexts.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns true if no context is registered.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Removes and returns every context.
    pub fn drain(&self) -> Vec<GraphContext> {
        self.write().drain().map(|(_, context)| context).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ContextState;
    use config::constants::WeldTolerance;
    use glam::DVec3;
    use surface_graph::primitives::create_cube;
    use tokio::sync::broadcast;

    fn context(id: &str) -> GraphContext {
        let (events, _) = broadcast::channel(8);
        GraphContext::spawn(id, create_cube(DVec3::ONE, false), WeldTolerance::default(), events)
    }

    #[test]
    fn test_insert_and_lookup() {
        let registry = ContextRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.insert(context("b")).is_none());
        assert!(registry.insert(context("a")).is_none());

        assert_eq!(registry.len(), 2);
        assert!(registry.contains("a"));
        assert_eq!(registry.ids(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(registry.with("a", |c| c.id().to_string()), Some("a".to_string()));
        assert_eq!(registry.with("missing", |c| c.id().to_string()), None);
    }

    #[test]
    fn test_insert_returns_replaced() {
        let registry = ContextRegistry::new();
        registry.insert(context("a"));
        let mut old = registry.insert(context("a")).unwrap();
        old.dispose();
        assert_eq!(old.state(), ContextState::Disposed);
        assert_eq!(registry.len(), 1);
        assert_ne!(registry.with("a", |c| c.state()), Some(ContextState::Disposed));
    }

    #[test]
    fn test_remove_and_drain() {
        let registry = ContextRegistry::new();
        registry.insert(context("a"));
        registry.insert(context("b"));
        assert!(registry.remove("a").is_some());
        assert!(registry.remove("a").is_none());

        let drained = registry.drain();
        assert_eq!(drained.len(), 1);
        assert!(registry.is_empty());
    }
}
