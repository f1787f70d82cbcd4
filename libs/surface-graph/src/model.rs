//! # Surface Model
//!
//! A built graph together with its nearest-vertex index: everything needed to
//! answer click-to-path queries for one mesh.

use crate::builder::GraphBuilder;
use crate::error::{BuildResult, PathError};
use crate::graph::{SurfaceGraph, VertexIndex};
use crate::mesh::MeshData;
use crate::path::{shortest_path, shortest_path_through, SurfacePath};
use crate::spatial_index::SpatialIndex;
use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Ray hit reported by the renderer's raycaster.
///
/// `face_vertices` are mesh vertex indices (as in the submitted index
/// buffer), not welded indices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceHit {
    /// Hit point in mesh-local space
    pub point: DVec3,
    /// Index of the hit triangle
    pub face_index: Option<usize>,
    /// Mesh vertex indices of the hit triangle
    pub face_vertices: Option<[u32; 3]>,
}

impl SurfaceHit {
    /// Creates a hit carrying the triangle's mesh vertex indices.
    pub fn on_triangle(point: DVec3, face_index: usize, face_vertices: [u32; 3]) -> Self {
        Self {
            point,
            face_index: Some(face_index),
            face_vertices: Some(face_vertices),
        }
    }
}

/// Summary counts of a built graph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GraphSummary {
    /// Welded vertex count
    pub vertex_count: usize,
    /// Undirected edge count
    pub edge_count: usize,
    /// Triangle count of the source mesh
    pub face_count: usize,
    /// Connected component count
    pub component_count: usize,
    /// Welding distance applied
    pub weld_tolerance: f64,
}

/// A [`SurfaceGraph`] and the [`SpatialIndex`] over its vertices.
///
/// Immutable once built and `Send + Sync`, so one model can serve queries
/// from several threads.
///
/// # Example
///
/// ```rust
/// use surface_graph::{primitives::create_cube, GraphBuilder, SurfaceModel};
/// use glam::DVec3;
///
/// let cube = create_cube(DVec3::ONE, false);
/// let model = SurfaceModel::build(&GraphBuilder::default(), &cube).unwrap();
/// let a = model.nearest_vertex(DVec3::new(-0.1, 0.0, 0.0)).unwrap();
/// let b = model.nearest_vertex(DVec3::new(1.1, 0.0, 0.0)).unwrap();
/// let path = model.shortest_path(a, b).unwrap();
/// assert!((path.length - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct SurfaceModel {
    graph: SurfaceGraph,
    index: SpatialIndex,
}

impl SurfaceModel {
    /// Builds the graph and its spatial index.
    pub fn build(builder: &GraphBuilder, mesh: &MeshData) -> BuildResult<Self> {
        Self::build_cancellable(builder, mesh, || false)
    }

    /// Builds the graph and its spatial index, polling `is_cancelled` during
    /// graph construction.
    pub fn build_cancellable<F>(
        builder: &GraphBuilder,
        mesh: &MeshData,
        is_cancelled: F,
    ) -> BuildResult<Self>
    where
        F: FnMut() -> bool,
    {
        let graph = builder.build_cancellable(mesh, is_cancelled)?;
        Ok(Self::from_graph(graph))
    }

    /// Indexes an already built graph.
    pub fn from_graph(graph: SurfaceGraph) -> Self {
        let index = SpatialIndex::from_graph(&graph);
        Self { graph, index }
    }

    /// Returns the graph.
    pub fn graph(&self) -> &SurfaceGraph {
        &self.graph
    }

    /// Returns the spatial index.
    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    /// Returns summary counts of the graph.
    pub fn summary(&self) -> GraphSummary {
        GraphSummary {
            vertex_count: self.graph.vertex_count(),
            edge_count: self.graph.edge_count(),
            face_count: self.graph.face_count(),
            component_count: self.graph.component_count(),
            weld_tolerance: self.graph.weld_tolerance(),
        }
    }

    /// Nearest welded vertex to an arbitrary point.
    pub fn nearest_vertex(&self, point: DVec3) -> Option<VertexIndex> {
        self.index.nearest_vertex(point)
    }

    /// Nearest welded vertex among the corners of the hit triangle.
    ///
    /// The corners come from `face_vertices` when present, otherwise from
    /// `face_index`. Returns `None` if the hit carries neither or they do not
    /// resolve against this graph.
    pub fn nearest_vertex_to_hit(&self, hit: &SurfaceHit) -> Option<VertexIndex> {
        let corners = self.hit_corners(hit)?;
        self.index.nearest_vertex_among(&corners, hit.point)
    }

    fn hit_corners(&self, hit: &SurfaceHit) -> Option<[VertexIndex; 3]> {
        if let Some([a, b, c]) = hit.face_vertices {
            return Some([
                self.graph.welded_index(a)?,
                self.graph.welded_index(b)?,
                self.graph.welded_index(c)?,
            ]);
        }
        self.graph.face(hit.face_index?)
    }

    /// Shortest surface path between two welded vertices.
    pub fn shortest_path(
        &self,
        start: VertexIndex,
        end: VertexIndex,
    ) -> Result<SurfacePath, PathError> {
        shortest_path(&self.graph, start, end)
    }

    /// Shortest surface path through consecutive welded vertices.
    pub fn shortest_path_through(
        &self,
        waypoints: &[VertexIndex],
    ) -> Result<SurfacePath, PathError> {
        shortest_path_through(&self.graph, waypoints)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::create_cube;

    fn model() -> SurfaceModel {
        SurfaceModel::build(&GraphBuilder::default(), &create_cube(DVec3::ONE, false)).unwrap()
    }

    #[test]
    fn test_summary() {
        let summary = model().summary();
        assert_eq!(summary.vertex_count, 8);
        assert_eq!(summary.edge_count, 18);
        assert_eq!(summary.face_count, 12);
        assert_eq!(summary.component_count, 1);
    }

    #[test]
    fn test_hit_restricts_to_triangle() {
        let model = model();
        // Closer to bottom corner 0 than to any top corner; restricted to the
        // top triangle (4, 5, 6) the answer must be a top corner.
        let point = DVec3::new(0.05, 0.05, 0.45);
        assert_eq!(model.nearest_vertex(point), Some(0));

        let hit = SurfaceHit::on_triangle(point, 2, [4, 5, 6]);
        assert_eq!(model.nearest_vertex_to_hit(&hit), Some(4));
    }

    #[test]
    fn test_hit_by_face_index_only() {
        let model = model();
        let hit = SurfaceHit {
            point: DVec3::new(0.9, 0.1, 1.0),
            face_index: Some(2),
            face_vertices: None,
        };
        assert_eq!(model.nearest_vertex_to_hit(&hit), Some(5));
    }

    #[test]
    fn test_hit_without_triangle_data() {
        let model = model();
        let hit = SurfaceHit {
            point: DVec3::ZERO,
            face_index: None,
            face_vertices: None,
        };
        assert_eq!(model.nearest_vertex_to_hit(&hit), None);

        let bad = SurfaceHit::on_triangle(DVec3::ZERO, 0, [0, 1, 99]);
        assert_eq!(model.nearest_vertex_to_hit(&bad), None);
    }

    #[test]
    fn test_hit_on_welded_soup() {
        let soup = create_cube(DVec3::ONE, false).to_unindexed();
        let model = SurfaceModel::build(&GraphBuilder::default(), &soup).unwrap();
        // Face 2 of the soup uses corners 6, 7, 8 which are cube vertices 4, 5, 6
        let hit = SurfaceHit::on_triangle(DVec3::new(0.9, 0.1, 1.0), 2, [6, 7, 8]);
        let vertex = model.nearest_vertex_to_hit(&hit).unwrap();
        assert_eq!(model.graph().position(vertex), Some(DVec3::new(1.0, 0.0, 1.0)));
    }

    #[test]
    fn test_model_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SurfaceModel>();
    }
}
