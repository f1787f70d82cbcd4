//! # Graph Context
//!
//! One mesh, its worker thread and its resident model.
//!
//! Creating a context starts the worker and queues the build; the context is
//! `Building` until the worker publishes the model. Queries never block:
//! they read the current status and either run against the resident
//! [`SurfaceModel`] or fail with [`ContextError::NotReady`].

use crate::error::{ContextError, ContextResult};
use crate::events::{ContextId, ContextState, ReadinessEvent};
use crate::protocol::WorkerRequest;
use crate::status::{ContextStatus, ReadinessHandle, StatusCell};
use crate::worker;
use config::constants::WeldTolerance;
use glam::DVec3;
use std::sync::Arc;
use std::thread::JoinHandle;
use surface_graph::{GraphSummary, MeshData, SurfaceHit, SurfaceModel, SurfacePath, VertexIndex};
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, warn};

/// A mesh context owning one graph worker.
///
/// Dropping a context disposes it without waiting for the worker.
#[derive(Debug)]
pub struct GraphContext {
    status: Arc<StatusCell>,
    requests: Option<mpsc::UnboundedSender<WorkerRequest>>,
    worker: Option<JoinHandle<()>>,
}

impl GraphContext {
    /// Starts a worker and queues the build of `mesh`.
    ///
    /// If the worker cannot be spawned the context is created `Failed` with
    /// [`ContextError::WorkerSpawn`] and the failure is broadcast.
    pub fn spawn(
        id: impl Into<ContextId>,
        mesh: MeshData,
        tolerance: WeldTolerance,
        events: broadcast::Sender<ReadinessEvent>,
    ) -> Self {
        let status = StatusCell::new(id.into(), events);
        let (tx, rx) = mpsc::unbounded_channel();

        let worker = match worker::spawn(Arc::clone(&status), rx) {
            Ok(handle) => handle,
            Err(err) => {
                warn!(context = %status.id(), error = %err, "failed to spawn graph worker");
                return Self::failed(status, ContextError::WorkerSpawn(err.to_string()));
            }
        };

        debug!(
            context = %status.id(),
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count(),
            "queued surface graph build"
        );
        if tx.send(WorkerRequest::Build { mesh, tolerance }).is_err() {
            warn!(context = %status.id(), "graph worker exited before receiving its build");
            status.transition(ContextStatus::Failed(ContextError::WorkerSpawn(
                "worker exited before receiving its build".to_string(),
            )));
        }

        Self {
            status,
            requests: Some(tx),
            worker: Some(worker),
        }
    }

    fn failed(status: Arc<StatusCell>, error: ContextError) -> Self {
        status.transition(ContextStatus::Failed(error));
        Self {
            status,
            requests: None,
            worker: None,
        }
    }

    /// Returns the context id.
    pub fn id(&self) -> &str {
        self.status.id()
    }

    /// Returns true if a worker thread was started for this context.
    pub fn has_worker(&self) -> bool {
        self.worker.is_some()
    }

    /// Returns the current status.
    pub fn status(&self) -> ContextStatus {
        self.status.snapshot()
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> ContextState {
        self.status.snapshot().state()
    }

    /// Returns true once the model is resident.
    pub fn is_ready(&self) -> bool {
        matches!(self.status.snapshot(), ContextStatus::Ready(_))
    }

    /// Returns a handle that resolves when the build settles.
    pub fn readiness(&self) -> ReadinessHandle {
        ReadinessHandle::new(self.status.subscribe())
    }

    /// Returns the resident model.
    ///
    /// # Errors
    ///
    /// [`ContextError::NotReady`] before the build finishes or after it
    /// failed, [`ContextError::Disposed`] after disposal.
    pub fn model(&self) -> ContextResult<Arc<SurfaceModel>> {
        self.status.snapshot().model()
    }

    /// Summary counts of the resident graph.
    pub fn summary(&self) -> ContextResult<GraphSummary> {
        Ok(self.model()?.summary())
    }

    /// Nearest welded vertex to `point`.
    pub fn nearest_vertex(&self, point: DVec3) -> ContextResult<Option<VertexIndex>> {
        Ok(self.model()?.nearest_vertex(point))
    }

    /// Nearest welded vertex among the corners of the hit triangle.
    pub fn nearest_vertex_to_hit(&self, hit: &SurfaceHit) -> ContextResult<Option<VertexIndex>> {
        Ok(self.model()?.nearest_vertex_to_hit(hit))
    }

    /// Shortest surface path, computed on the calling thread.
    pub fn shortest_path(
        &self,
        start: VertexIndex,
        end: VertexIndex,
    ) -> ContextResult<SurfacePath> {
        Ok(self.model()?.shortest_path(start, end)?)
    }

    /// Shortest surface path through consecutive waypoints.
    pub fn shortest_path_through(&self, waypoints: &[VertexIndex]) -> ContextResult<SurfacePath> {
        Ok(self.model()?.shortest_path_through(waypoints)?)
    }

    /// Queues a shortest path query on the worker thread.
    ///
    /// The returned receiver yields the path, or errors if the worker stops
    /// before answering.
    ///
    /// # Errors
    ///
    /// [`ContextError::NotReady`] unless the context is ready,
    /// [`ContextError::Disposed`] if the worker is gone.
    pub fn request_path(
        &self,
        start: VertexIndex,
        end: VertexIndex,
    ) -> ContextResult<oneshot::Receiver<ContextResult<SurfacePath>>> {
        self.model()?;
        let requests = self.requests.as_ref().ok_or(ContextError::Disposed)?;
        let (reply, answer) = oneshot::channel();
        requests
            .send(WorkerRequest::FindPath { start, end, reply })
            .map_err(|_| ContextError::Disposed)?;
        Ok(answer)
    }

    /// Disposes the context: cancels a running build, stops the worker and
    /// publishes `Disposed`. Does not wait for the worker. Idempotent.
    pub fn dispose(&mut self) {
        if self.status.transition(ContextStatus::Disposed) {
            debug!(context = %self.status.id(), "context disposed");
        }
        if let Some(requests) = self.requests.take() {
            // Fails only if the worker already exited.
            let _ = requests.send(WorkerRequest::Shutdown);
        }
    }

    /// Waits for the worker thread to exit. Call after [`GraphContext::dispose`].
    pub fn join(&mut self) {
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!(context = %self.status.id(), "graph worker panicked");
            }
        }
    }
}

impl Drop for GraphContext {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests;
