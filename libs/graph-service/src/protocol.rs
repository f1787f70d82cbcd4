//! # Worker Protocol
//!
//! Messages exchanged between a context and its worker thread.

use crate::error::{ContextError, ContextResult};
use config::constants::WeldTolerance;
use std::sync::Arc;
use surface_graph::{MeshData, SurfacePath, SurfaceModel, VertexIndex};
use tokio::sync::oneshot;

/// Requests accepted by a graph worker.
#[derive(Debug)]
pub enum WorkerRequest {
    /// Build the graph and spatial index for a mesh.
    Build {
        /// Mesh buffers
        mesh: MeshData,
        /// Welding tolerance
        tolerance: WeldTolerance,
    },
    /// Compute a shortest path on the worker thread.
    FindPath {
        /// Start vertex
        start: VertexIndex,
        /// End vertex
        end: VertexIndex,
        /// Receives the path or the reason there is none
        reply: oneshot::Sender<ContextResult<SurfacePath>>,
    },
    /// Stop the worker, cancelling any build in progress.
    Shutdown,
}

/// Outcome of a build request.
#[derive(Debug, Clone)]
pub enum WorkerResponse {
    /// The model is built and indexed.
    Built(Arc<SurfaceModel>),
    /// The build failed or was cancelled.
    Failed(ContextError),
}
