//! # Readiness Events
//!
//! Public lifecycle labels and the notifications broadcast when a context
//! finishes building.

use crate::error::ContextError;

/// Opaque caller-chosen context identifier.
pub type ContextId = String;

/// Lifecycle state of a context.
///
/// ```text
/// Building → Ready → Disposed
///     ↓
///   Failed  → Disposed
/// ```
///
/// `Building → Disposed` cancels the build. Nothing leaves `Disposed`.
#[derive(Debug, Clone, PartialEq)]
pub enum ContextState {
    /// The worker is building the graph.
    Building,
    /// The graph and its index are resident and can be queried.
    Ready,
    /// Spawning the worker or building the graph failed.
    Failed(ContextError),
    /// The context was disposed.
    Disposed,
}

impl ContextState {
    /// Returns true once the state can no longer change by itself.
    ///
    /// Only `Building` is transient; `Ready` and `Failed` still move to
    /// `Disposed` on an explicit dispose.
    pub fn is_settled(&self) -> bool {
        !matches!(self, ContextState::Building)
    }
}

/// Broadcast when a context becomes `Ready` or `Failed`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadinessEvent {
    /// Context that settled
    pub context_id: ContextId,
    /// `Ready` or `Failed`
    pub state: ContextState,
}
