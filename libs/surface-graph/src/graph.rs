//! # Surface Graph
//!
//! Immutable weighted edge graph over the welded vertices of a mesh.
//!
//! Every triangle edge becomes an undirected edge weighted by the Euclidean
//! distance between its welded endpoints. The graph also remembers how mesh
//! vertices and faces map onto welded vertices so that renderer hit data can
//! be resolved against it.

use glam::DVec3;

/// Index of a welded vertex, in `[0, vertex_count)`.
pub type VertexIndex = u32;

/// One directed half of an undirected graph edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    /// Neighbouring welded vertex
    pub to: VertexIndex,
    /// Euclidean distance between the two welded positions
    pub weight: f64,
}

/// Weighted adjacency graph built from a mesh by [`GraphBuilder`].
///
/// The graph never changes after construction; a new mesh means a new graph.
///
/// Invariants:
/// - adjacency is symmetric with equal weights in both directions
/// - no vertex is its own neighbour
/// - weights are non-negative
///
/// [`GraphBuilder`]: crate::GraphBuilder
#[derive(Debug, Clone)]
pub struct SurfaceGraph {
    /// Welded positions, indexed by [`VertexIndex`]
    vertices: Vec<DVec3>,
    /// Neighbour sets in insertion order
    adjacency: Vec<Vec<Edge>>,
    /// Mesh vertex -> welded vertex (`None` for vertices no triangle uses)
    remap: Vec<Option<VertexIndex>>,
    /// Mesh faces in welded indices, by face index
    faces: Vec<[VertexIndex; 3]>,
    /// Connected component label per welded vertex
    components: Vec<u32>,
    /// Number of connected components
    component_count: usize,
    /// Number of undirected edges
    edge_count: usize,
    /// Welding distance the graph was built with
    weld_tolerance: f64,
}

impl SurfaceGraph {
    /// Assembles a graph and labels its connected components.
    pub(crate) fn from_parts(
        vertices: Vec<DVec3>,
        adjacency: Vec<Vec<Edge>>,
        remap: Vec<Option<VertexIndex>>,
        faces: Vec<[VertexIndex; 3]>,
        weld_tolerance: f64,
    ) -> Self {
        let edge_count = adjacency.iter().map(Vec::len).sum::<usize>() / 2;
        let (components, component_count) = label_components(&adjacency);

        Self {
            vertices,
            adjacency,
            remap,
            faces,
            components,
            component_count,
            edge_count,
            weld_tolerance,
        }
    }

    /// Returns the number of welded vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the number of undirected edges.
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Returns the number of mesh faces the graph was built from.
    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Returns the number of connected components.
    #[inline]
    pub fn component_count(&self) -> usize {
        self.component_count
    }

    /// Returns the welding distance used during construction.
    #[inline]
    pub fn weld_tolerance(&self) -> f64 {
        self.weld_tolerance
    }

    /// Returns all welded positions.
    #[inline]
    pub fn vertices(&self) -> &[DVec3] {
        &self.vertices
    }

    /// Returns true if `vertex` is a valid welded index.
    #[inline]
    pub fn contains(&self, vertex: VertexIndex) -> bool {
        (vertex as usize) < self.vertices.len()
    }

    /// Returns the position of a welded vertex.
    #[inline]
    pub fn position(&self, vertex: VertexIndex) -> Option<DVec3> {
        self.vertices.get(vertex as usize).copied()
    }

    /// Returns the neighbours of a welded vertex (empty if out of range).
    #[inline]
    pub fn neighbors(&self, vertex: VertexIndex) -> &[Edge] {
        self.adjacency
            .get(vertex as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Returns the weight of the edge between two vertices, if any.
    pub fn edge_weight(&self, a: VertexIndex, b: VertexIndex) -> Option<f64> {
        self.neighbors(a)
            .iter()
            .find(|edge| edge.to == b)
            .map(|edge| edge.weight)
    }

    /// Resolves a mesh vertex index to its welded vertex.
    pub fn welded_index(&self, mesh_vertex: u32) -> Option<VertexIndex> {
        self.remap.get(mesh_vertex as usize).copied().flatten()
    }

    /// Returns a mesh face expressed in welded indices.
    pub fn face(&self, face: usize) -> Option<[VertexIndex; 3]> {
        self.faces.get(face).copied()
    }

    /// Returns the component label of a vertex.
    pub fn component(&self, vertex: VertexIndex) -> Option<u32> {
        self.components.get(vertex as usize).copied()
    }

    /// Returns true if both vertices exist and are connected.
    pub fn same_component(&self, a: VertexIndex, b: VertexIndex) -> bool {
        match (self.component(a), self.component(b)) {
            (Some(ca), Some(cb)) => ca == cb,
            _ => false,
        }
    }

    /// Computes the axis-aligned bounding box of the welded positions.
    pub fn bounding_box(&self) -> (DVec3, DVec3) {
        let Some((&first, rest)) = self.vertices.split_first() else {
            return (DVec3::ZERO, DVec3::ZERO);
        };
        rest.iter()
            .fold((first, first), |(min, max), v| (min.min(*v), max.max(*v)))
    }
}

/// Labels connected components with an explicit stack.
///
/// Labels are assigned in order of the lowest vertex index of each component.
fn label_components(adjacency: &[Vec<Edge>]) -> (Vec<u32>, usize) {
    const UNLABELED: u32 = u32::MAX;

    let mut labels = vec![UNLABELED; adjacency.len()];
    let mut next_label = 0u32;
    let mut stack = Vec::new();

    for seed in 0..adjacency.len() {
        if labels[seed] != UNLABELED {
            continue;
        }
        labels[seed] = next_label;
        stack.push(seed);

        while let Some(vertex) = stack.pop() {
            for edge in &adjacency[vertex] {
                let to = edge.to as usize;
                if labels[to] == UNLABELED {
                    labels[to] = next_label;
                    stack.push(to);
                }
            }
        }
        next_label += 1;
    }

    (labels, next_label as usize)
}
