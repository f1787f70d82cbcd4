//! # Context Status
//!
//! The state machine behind every context, published through a
//! [`tokio::sync::watch`] channel. The watch value is the only place a
//! context's readiness is recorded: queries, readiness handles and the worker
//! all read it.

use crate::error::{ContextError, ContextResult};
use crate::events::{ContextId, ContextState, ReadinessEvent};
use std::sync::Arc;
use surface_graph::SurfaceModel;
use tokio::sync::{broadcast, watch};
use tracing::debug;

/// Current status of a context, carrying the resident model once ready.
#[derive(Debug, Clone)]
pub enum ContextStatus {
    /// The worker is building the graph.
    Building,
    /// The resident model.
    Ready(Arc<SurfaceModel>),
    /// Spawning or building failed.
    Failed(ContextError),
    /// The context was disposed.
    Disposed,
}

impl ContextStatus {
    /// Returns the public lifecycle label.
    pub fn state(&self) -> ContextState {
        match self {
            ContextStatus::Building => ContextState::Building,
            ContextStatus::Ready(_) => ContextState::Ready,
            ContextStatus::Failed(err) => ContextState::Failed(err.clone()),
            ContextStatus::Disposed => ContextState::Disposed,
        }
    }

    /// Returns the resident model if the context is ready.
    ///
    /// # Errors
    ///
    /// [`ContextError::Disposed`] after disposal, otherwise
    /// [`ContextError::NotReady`].
    pub fn model(&self) -> ContextResult<Arc<SurfaceModel>> {
        match self {
            ContextStatus::Ready(model) => Ok(Arc::clone(model)),
            ContextStatus::Disposed => Err(ContextError::Disposed),
            ContextStatus::Building | ContextStatus::Failed(_) => Err(ContextError::NotReady),
        }
    }

    fn can_become(&self, next: &ContextStatus) -> bool {
        matches!(
            (self, next),
            (ContextStatus::Building, ContextStatus::Ready(_))
                | (ContextStatus::Building, ContextStatus::Failed(_))
                | (ContextStatus::Building, ContextStatus::Disposed)
                | (ContextStatus::Ready(_), ContextStatus::Disposed)
                | (ContextStatus::Failed(_), ContextStatus::Disposed)
        )
    }
}

// =============================================================================
// STATUS CELL
// =============================================================================

/// Shared writer side of a context's status, held by the context and its
/// worker.
#[derive(Debug)]
pub(crate) struct StatusCell {
    id: ContextId,
    tx: watch::Sender<ContextStatus>,
    events: broadcast::Sender<ReadinessEvent>,
}

impl StatusCell {
    pub(crate) fn new(id: ContextId, events: broadcast::Sender<ReadinessEvent>) -> Arc<Self> {
        let (tx, _) = watch::channel(ContextStatus::Building);
        Arc::new(Self { id, tx, events })
    }

    pub(crate) fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn snapshot(&self) -> ContextStatus {
        self.tx.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<ContextStatus> {
        self.tx.subscribe()
    }

    /// Applies `next` if the state machine allows it and returns whether it
    /// did. `Ready` and `Failed` are also broadcast as readiness events.
    pub(crate) fn transition(&self, next: ContextStatus) -> bool {
        let state = next.state();
        let applied = self.tx.send_if_modified(|current| {
            if current.can_become(&next) {
                *current = next;
                true
            } else {
                false
            }
        });

        if applied {
            debug!(context = %self.id, ?state, "context state changed");
            if matches!(state, ContextState::Ready | ContextState::Failed(_)) {
                // No subscribers is not an error.
                let _ = self.events.send(ReadinessEvent {
                    context_id: self.id.clone(),
                    state,
                });
            }
        } else {
            debug!(context = %self.id, ?state, "ignored stale state change");
        }
        applied
    }
}

// =============================================================================
// READINESS HANDLE
// =============================================================================

/// Awaitable readiness of one build attempt.
///
/// # Example
///
/// ```rust
/// use graph_service::{ContextState, GeodesicService};
/// use surface_graph::primitives::create_cube;
/// use glam::DVec3;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let service = GeodesicService::default();
/// service.initialize_for_context("cube", create_cube(DVec3::ONE, false));
/// let handle = service.readiness("cube").unwrap();
/// assert_eq!(handle.wait().await, ContextState::Ready);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ReadinessHandle {
    rx: watch::Receiver<ContextStatus>,
}

impl ReadinessHandle {
    pub(crate) fn new(rx: watch::Receiver<ContextStatus>) -> Self {
        Self { rx }
    }

    /// Returns the current state without waiting.
    pub fn state(&self) -> ContextState {
        self.rx.borrow().state()
    }

    /// Waits until the build settles and returns `Ready`, `Failed` or
    /// `Disposed`.
    ///
    /// Never hangs: if the context is dropped without settling, resolves to
    /// `Disposed`.
    pub async fn wait(mut self) -> ContextState {
        let settled = match self
            .rx
            .wait_for(|status| !matches!(status, ContextStatus::Building))
            .await
        {
            Ok(status) => status.state(),
            Err(_) => ContextState::Disposed,
        };
        settled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use surface_graph::{primitives::create_cube, GraphBuilder, GraphBuildError};

    fn cell() -> (Arc<StatusCell>, broadcast::Receiver<ReadinessEvent>) {
        let (events, rx) = broadcast::channel(8);
        (StatusCell::new("ctx".to_string(), events), rx)
    }

    fn model() -> Arc<SurfaceModel> {
        let mesh = create_cube(glam::DVec3::ONE, false);
        Arc::new(SurfaceModel::build(&GraphBuilder::default(), &mesh).unwrap())
    }

    #[test]
    fn test_build_then_dispose() {
        let (cell, mut events) = cell();
        assert!(cell.transition(ContextStatus::Ready(model())));
        assert_eq!(cell.snapshot().state(), ContextState::Ready);
        assert!(cell.transition(ContextStatus::Disposed));
        assert_eq!(cell.snapshot().state(), ContextState::Disposed);

        let event = events.try_recv().unwrap();
        assert_eq!(event.context_id, "ctx");
        assert_eq!(event.state, ContextState::Ready);
        // Disposal is not broadcast
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_disposed_is_final() {
        let (cell, mut events) = cell();
        assert!(cell.transition(ContextStatus::Disposed));
        assert!(!cell.transition(ContextStatus::Ready(model())));
        assert!(!cell.transition(ContextStatus::Failed(ContextError::NotReady)));
        assert!(!cell.transition(ContextStatus::Building));
        assert_eq!(cell.snapshot().state(), ContextState::Disposed);
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_ready_is_not_rebuilt() {
        let (cell, _events) = cell();
        assert!(cell.transition(ContextStatus::Ready(model())));
        assert!(!cell.transition(ContextStatus::Failed(GraphBuildError::Cancelled.into())));
        assert!(!cell.transition(ContextStatus::Building));
    }

    #[test]
    fn test_model_by_status() {
        assert_eq!(ContextStatus::Building.model().unwrap_err(), ContextError::NotReady);
        assert_eq!(
            ContextStatus::Failed(ContextError::NotReady).model().unwrap_err(),
            ContextError::NotReady
        );
        assert_eq!(ContextStatus::Disposed.model().unwrap_err(), ContextError::Disposed);
        assert!(ContextStatus::Ready(model()).model().is_ok());
    }

    #[tokio::test]
    async fn test_handle_resolves_on_failure() {
        let (cell, _events) = cell();
        let handle = ReadinessHandle::new(cell.subscribe());
        assert_eq!(handle.state(), ContextState::Building);

        cell.transition(ContextStatus::Failed(GraphBuildError::EmptyMesh.into()));
        assert_eq!(
            handle.wait().await,
            ContextState::Failed(ContextError::Build(GraphBuildError::EmptyMesh))
        );
    }

    #[tokio::test]
    async fn test_handle_resolves_when_dropped() {
        let (cell, _events) = cell();
        let handle = ReadinessHandle::new(cell.subscribe());
        drop(cell);
        assert_eq!(handle.wait().await, ContextState::Disposed);
    }
}
