//! # Graph Worker
//!
//! The loop run by each context's worker thread.
//!
//! Requests are handled in arrival order. While a build runs, the worker
//! polls its request channel from the builder's cancellation probe: a
//! `Shutdown` (or every sender being dropped) cancels the build, anything else
//! is deferred until the build is done.
//!
//! If the thread unwinds, a guard marks the context `Failed` so readiness
//! waiters are released.

use crate::error::ContextError;
use crate::protocol::{WorkerRequest, WorkerResponse};
use crate::status::{ContextStatus, StatusCell};
use config::constants::{WeldTolerance, GRAPH_WORKER_THREAD_PREFIX};
use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;
use surface_graph::{GraphBuildError, GraphBuilder, MeshData, SurfaceModel};
use tokio::sync::mpsc::{error::TryRecvError, UnboundedReceiver};
use tracing::{debug, error, info, warn};

/// Starts the worker thread for a context.
pub(crate) fn spawn(
    status: Arc<StatusCell>,
    requests: UnboundedReceiver<WorkerRequest>,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name(thread_name(status.id()))
        .spawn(move || Worker::new(status, requests).run())
}

/// Thread names may not contain NUL.
fn thread_name(id: &str) -> String {
    let id: String = id.chars().map(|c| if c == '\0' { '_' } else { c }).collect();
    format!("{GRAPH_WORKER_THREAD_PREFIX}{id}")
}

/// Fails the context when dropped during a panic.
///
/// Only a `Building` context is affected; a resident model stays usable.
struct PanicGuard {
    status: Arc<StatusCell>,
}

impl PanicGuard {
    fn new(status: Arc<StatusCell>) -> Self {
        Self { status }
    }
}

impl Drop for PanicGuard {
    fn drop(&mut self) {
        if thread::panicking() {
            error!(context = %self.status.id(), "graph worker panicked");
            self.status.transition(ContextStatus::Failed(ContextError::WorkerPanicked));
        }
    }
}

struct Worker {
    status: Arc<StatusCell>,
    requests: UnboundedReceiver<WorkerRequest>,
    deferred: VecDeque<WorkerRequest>,
    stopping: bool,
}

impl Worker {
    fn new(status: Arc<StatusCell>, requests: UnboundedReceiver<WorkerRequest>) -> Self {
        Self {
            status,
            requests,
            deferred: VecDeque::new(),
            stopping: false,
        }
    }

    fn run(mut self) {
        let _guard = PanicGuard::new(Arc::clone(&self.status));
        debug!(context = %self.status.id(), "graph worker started");
        while !self.stopping {
            let Some(request) = self.next_request() else {
                break;
            };
            match request {
                WorkerRequest::Build { mesh, tolerance } => {
                    let response = self.build(&mesh, tolerance);
                    self.complete(response);
                }
                WorkerRequest::FindPath { start, end, reply } => {
                    let result = self.status.snapshot().model().and_then(|model| {
                        model
                            .shortest_path(start, end)
                            .map_err(ContextError::from)
                    });
                    // The caller may have stopped waiting.
                    let _ = reply.send(result);
                }
                WorkerRequest::Shutdown => self.stopping = true,
            }
        }
        debug!(context = %self.status.id(), "graph worker exited");
    }

    fn next_request(&mut self) -> Option<WorkerRequest> {
        match self.deferred.pop_front() {
            Some(request) => Some(request),
            None => self.requests.blocking_recv(),
        }
    }

    fn build(&mut self, mesh: &MeshData, tolerance: WeldTolerance) -> WorkerResponse {
        let started = Instant::now();
        let builder = GraphBuilder::new(tolerance);

        let requests = &mut self.requests;
        let deferred = &mut self.deferred;
        let stopping = &mut self.stopping;
        let result = SurfaceModel::build_cancellable(&builder, mesh, || loop {
            match requests.try_recv() {
                Ok(WorkerRequest::Shutdown) | Err(TryRecvError::Disconnected) => {
                    *stopping = true;
                    return true;
                }
                Ok(request) => deferred.push_back(request),
                Err(TryRecvError::Empty) => return false,
            }
        });

        match result {
            Ok(model) => {
                let summary = model.summary();
                info!(
                    context = %self.status.id(),
                    vertices = summary.vertex_count,
                    edges = summary.edge_count,
                    components = summary.component_count,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "surface graph ready"
                );
                WorkerResponse::Built(Arc::new(model))
            }
            Err(GraphBuildError::Cancelled) => {
                debug!(context = %self.status.id(), "surface graph build cancelled");
                WorkerResponse::Failed(GraphBuildError::Cancelled.into())
            }
            Err(err) => {
                warn!(context = %self.status.id(), error = %err, "surface graph build failed");
                WorkerResponse::Failed(err.into())
            }
        }
    }

    fn complete(&self, response: WorkerResponse) {
        let next = match response {
            WorkerResponse::Built(model) => ContextStatus::Ready(model),
            WorkerResponse::Failed(err) => ContextStatus::Failed(err),
        };
        self.status.transition(next);
    }
}
