//! # Geodesic Service
//!
//! The facade used by the viewer. Every method is keyed by context id and is
//! safe to call from any thread; none of the synchronous methods block on a
//! build.
//!
//! Query methods return `None` whenever there is nothing to answer with: an
//! unknown or disposed id, a context that is still building or failed, or a
//! query without result. Use [`GeodesicService::context_status`] to tell these
//! apart.

use crate::context::GraphContext;
use crate::events::{ContextId, ContextState, ReadinessEvent};
use crate::registry::ContextRegistry;
use crate::status::ReadinessHandle;
use config::constants::ServiceConfig;
use glam::DVec3;
use std::sync::Arc;
use surface_graph::{GraphSummary, MeshData, SurfaceHit, SurfaceModel, SurfacePath, VertexIndex};
use tokio::sync::broadcast;
use tracing::{debug, info};

/// Registry of mesh contexts and the query API over them.
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
/// assert!(service.initialize_for_context("cube", create_cube(DVec3::ONE, false)));
/// service.readiness("cube").unwrap().wait().await;
///
/// let start = service.get_closest_vertex_index(DVec3::new(0.0, 0.0, -0.1), "cube").unwrap();
/// let end = service.get_closest_vertex_index(DVec3::new(1.0, 1.0, 1.1), "cube").unwrap();
/// let points = service.find_shortest_path(start, end, "cube").unwrap();
/// assert_eq!(points.first(), Some(&DVec3::ZERO));
/// assert_eq!(points.last(), Some(&DVec3::ONE));
///
/// service.dispose_context("cube");
/// assert!(!service.is_context_ready("cube"));
/// # }
/// ```
#[derive(Debug)]
pub struct GeodesicService {
    config: ServiceConfig,
    registry: ContextRegistry,
    events: broadcast::Sender<ReadinessEvent>,
}

impl Default for GeodesicService {
    fn default() -> Self {
        Self::new(ServiceConfig::default())
    }
}

impl GeodesicService {
    /// Creates a service with the given configuration.
    pub fn new(config: ServiceConfig) -> Self {
        let (events, _) = broadcast::channel(config.readiness_capacity());
        Self {
            config,
            registry: ContextRegistry::new(),
            events,
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Subscribes to `Ready` and `Failed` notifications of all contexts.
    pub fn subscribe(&self) -> broadcast::Receiver<ReadinessEvent> {
        self.events.subscribe()
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Starts building the graph for a mesh under `id`.
    ///
    /// An existing context with the same id is disposed and replaced. Returns
    /// false if no worker could be started; the context is then recorded as
    /// `Failed`. Otherwise readiness is reported asynchronously.
    pub fn initialize_for_context(&self, id: impl Into<ContextId>, mesh: MeshData) -> bool {
        let id = id.into();
        if let Some(mut old) = self.registry.remove(&id) {
            info!(context = %id, "replacing existing context");
            old.dispose();
        }

        let tolerance = self.config.weld_tolerance();
        let context = GraphContext::spawn(id, mesh, tolerance, self.events.clone());
        let spawned = context.has_worker();
        // A concurrent initialize for the same id may have won the race.
        if let Some(mut raced) = self.registry.insert(context) {
            raced.dispose();
        }
        spawned
    }

    /// Returns true once the context's graph is resident.
    pub fn is_context_ready(&self, id: &str) -> bool {
        self.registry.with(id, GraphContext::is_ready).unwrap_or(false)
    }

    /// Returns the lifecycle state, or `None` for an unknown id.
    pub fn context_status(&self, id: &str) -> Option<ContextState> {
        self.registry.with(id, GraphContext::state)
    }

    /// Returns a handle resolving when the context's build settles.
    pub fn readiness(&self, id: &str) -> Option<ReadinessHandle> {
        self.registry.with(id, GraphContext::readiness)
    }

    /// Disposes and removes a context. No-op for an unknown id.
    pub fn dispose_context(&self, id: &str) {
        if let Some(mut context) = self.registry.remove(id) {
            context.dispose();
        }
    }

    /// Disposes every context and waits for their workers to exit.
    pub fn dispose_all(&self) {
        let mut contexts = self.registry.drain();
        for context in &mut contexts {
            context.dispose();
        }
        for context in &mut contexts {
            context.join();
        }
        debug!(count = contexts.len(), "disposed all contexts");
    }

    /// Returns the registered context ids, sorted.
    pub fn context_ids(&self) -> Vec<ContextId> {
        self.registry.ids()
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    fn model(&self, id: &str) -> Option<Arc<SurfaceModel>> {
        self.registry.with(id, |context| context.model().ok()).flatten()
    }

    /// Summary counts of the context's graph.
    pub fn graph_summary(&self, id: &str) -> Option<GraphSummary> {
        Some(self.model(id)?.summary())
    }

    /// Nearest graph vertex to an arbitrary point.
    pub fn get_closest_vertex_index(&self, point: DVec3, id: &str) -> Option<VertexIndex> {
        self.model(id)?.nearest_vertex(point)
    }

    /// Nearest graph vertex among the corners of the triangle a ray hit.
    ///
    /// `None` if the hit carries no usable triangle data.
    pub fn get_closest_graph_vertex_near_intersection(
        &self,
        hit: &SurfaceHit,
        id: &str,
    ) -> Option<VertexIndex> {
        self.model(id)?.nearest_vertex_to_hit(hit)
    }

    /// Positions along the shortest surface path, start and end included.
    ///
    /// `start == end` yields a single point.
    pub fn find_shortest_path(
        &self,
        start: VertexIndex,
        end: VertexIndex,
        id: &str,
    ) -> Option<Vec<DVec3>> {
        self.find_surface_path(start, end, id).map(SurfacePath::into_points)
    }

    /// Shortest surface path with its vertices and length.
    pub fn find_surface_path(
        &self,
        start: VertexIndex,
        end: VertexIndex,
        id: &str,
    ) -> Option<SurfacePath> {
        self.model(id)?.shortest_path(start, end).ok()
    }

    /// Shortest surface path through consecutive waypoints.
    pub fn find_path_through(&self, waypoints: &[VertexIndex], id: &str) -> Option<SurfacePath> {
        self.model(id)?.shortest_path_through(waypoints).ok()
    }

    /// Computes the shortest surface path on the context's worker thread.
    ///
    /// Resolves to `None` under the same conditions as
    /// [`GeodesicService::find_surface_path`], or if the context is disposed
    /// before the worker answers.
    pub async fn find_shortest_path_async(
        &self,
        start: VertexIndex,
        end: VertexIndex,
        id: &str,
    ) -> Option<SurfacePath> {
        let answer = self
            .registry
            .with(id, |context| context.request_path(start, end).ok())
            .flatten()?;
        answer.await.ok()?.ok()
    }
}
