//! # Graph Builder
//!
//! Converts mesh buffers into a [`SurfaceGraph`].
//!
//! ## Algorithm
//!
//! 1. Validate the buffers ([`MeshData::validate`])
//! 2. Weld every referenced mesh vertex: positions are quantized to cells of
//!    the weld tolerance, and a vertex joins the lowest-indexed welded vertex
//!    within tolerance in its own or a neighbouring cell
//! 3. Insert each triangle edge as a symmetric weighted edge (set semantics,
//!    collapsed edges are skipped)
//! 4. Label connected components
//!
//! ## Example
//!
//! ```rust
//! use surface_graph::{primitives::create_cube, GraphBuilder};
//! use glam::DVec3;
//!
//! // A triangle soup cube: 36 corners weld down to 8 vertices
//! let soup = create_cube(DVec3::ONE, false).to_unindexed();
//! let graph = GraphBuilder::default().build(&soup).unwrap();
//! assert_eq!(graph.vertex_count(), 8);
//! ```

use crate::error::{BuildResult, GraphBuildError};
use crate::graph::{Edge, SurfaceGraph, VertexIndex};
use crate::mesh::MeshData;
use config::constants::{WeldTolerance, BUILD_CANCEL_CHECK_INTERVAL};
use glam::DVec3;
use std::collections::HashMap;
use tracing::debug;

/// Builds [`SurfaceGraph`]s from mesh buffers with a fixed weld tolerance.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GraphBuilder {
    tolerance: WeldTolerance,
}

impl GraphBuilder {
    /// Creates a builder with the given weld tolerance.
    pub fn new(tolerance: WeldTolerance) -> Self {
        Self { tolerance }
    }

    /// Returns the configured weld tolerance.
    pub fn tolerance(&self) -> WeldTolerance {
        self.tolerance
    }

    /// Builds a graph from mesh buffers.
    ///
    /// # Errors
    ///
    /// Returns [`GraphBuildError::EmptyMesh`] for a mesh without triangles,
    /// [`GraphBuildError::DegenerateMesh`] if fewer than two distinct vertices
    /// survive welding, [`GraphBuildError::InvalidTolerance`] if the weld
    /// tolerance resolves to a non-positive or non-finite distance, and a
    /// buffer error for malformed input.
    pub fn build(&self, mesh: &MeshData) -> BuildResult<SurfaceGraph> {
        self.build_cancellable(mesh, || false)
    }

    /// Builds a graph, polling `is_cancelled` between phases and every
    /// [`BUILD_CANCEL_CHECK_INTERVAL`] vertices or triangles.
    ///
    /// # Errors
    ///
    /// Same as [`GraphBuilder::build`], plus [`GraphBuildError::Cancelled`]
    /// once the probe returns true.
    pub fn build_cancellable<F>(
        &self,
        mesh: &MeshData,
        mut is_cancelled: F,
    ) -> BuildResult<SurfaceGraph>
    where
        F: FnMut() -> bool,
    {
        mesh.validate()?;

        let (min, max) = mesh.bounding_box();
        let tolerance = self.tolerance.resolve((max - min).length());
        if !(tolerance > 0.0 && tolerance.is_finite()) {
            return Err(GraphBuildError::InvalidTolerance { tolerance });
        }

        let referenced = mesh.referenced_vertices();
        check_cancelled(&mut is_cancelled)?;

        // Weld in position-buffer order so welded indices follow first use.
        let mut welder = Welder::new(tolerance);
        let mut remap = vec![None; mesh.vertex_count()];
        for (mesh_vertex, used) in referenced.iter().enumerate() {
            if mesh_vertex % BUILD_CANCEL_CHECK_INTERVAL == 0 {
                check_cancelled(&mut is_cancelled)?;
            }
            if !used {
                continue;
            }
            if let Some(position) = mesh.position(mesh_vertex) {
                remap[mesh_vertex] = Some(welder.weld(position));
            }
        }

        let vertices = welder.into_vertices();
        if vertices.len() < 2 {
            return Err(GraphBuildError::DegenerateMesh {
                distinct_vertices: vertices.len(),
            });
        }

        let mut adjacency: Vec<Vec<Edge>> = vec![Vec::new(); vertices.len()];
        let mut faces = Vec::with_capacity(mesh.triangle_count());
        for (face, tri) in mesh.triangles().enumerate() {
            if face % BUILD_CANCEL_CHECK_INTERVAL == 0 {
                check_cancelled(&mut is_cancelled)?;
            }
            let mut welded = [0; 3];
            for (slot, index) in welded.iter_mut().zip(tri) {
                // validate() guarantees every triangle corner was welded
                *slot = remap[index as usize].ok_or(GraphBuildError::IndexOutOfRange {
                    face,
                    index,
                    vertex_count: mesh.vertex_count(),
                })?;
            }
            faces.push(welded);

            let [a, b, c] = welded;
            for (u, v) in [(a, b), (b, c), (c, a)] {
                insert_edge(&mut adjacency, &vertices, u, v);
            }
        }
        check_cancelled(&mut is_cancelled)?;

        let graph = SurfaceGraph::from_parts(vertices, adjacency, remap, faces, tolerance);
        debug!(
            mesh_vertices = mesh.vertex_count(),
            welded_vertices = graph.vertex_count(),
            edges = graph.edge_count(),
            components = graph.component_count(),
            tolerance,
            "built surface graph"
        );
        Ok(graph)
    }
}

/// Builds a graph with the given weld tolerance.
///
/// Shorthand for `GraphBuilder::new(tolerance).build(mesh)`.
pub fn build_graph(mesh: &MeshData, tolerance: WeldTolerance) -> BuildResult<SurfaceGraph> {
    GraphBuilder::new(tolerance).build(mesh)
}

fn check_cancelled<F: FnMut() -> bool>(is_cancelled: &mut F) -> BuildResult<()> {
    if is_cancelled() {
        Err(GraphBuildError::Cancelled)
    } else {
        Ok(())
    }
}

/// Inserts `u - v` in both directions unless it is a self-loop or already present.
fn insert_edge(adjacency: &mut [Vec<Edge>], vertices: &[DVec3], u: VertexIndex, v: VertexIndex) {
    if u == v || adjacency[u as usize].iter().any(|edge| edge.to == v) {
        return;
    }
    let weight = vertices[u as usize].distance(vertices[v as usize]);
    adjacency[u as usize].push(Edge { to: v, weight });
    adjacency[v as usize].push(Edge { to: u, weight });
}

// =============================================================================
// WELDING
// =============================================================================

/// Quantized cell coordinate, one cell per weld tolerance.
type WeldCell = (i64, i64, i64);

/// Incremental vertex welder backed by a spatial hash.
struct Welder {
    tolerance: f64,
    tolerance_sq: f64,
    cells: HashMap<WeldCell, Vec<VertexIndex>>,
    vertices: Vec<DVec3>,
}

impl Welder {
    fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            tolerance_sq: tolerance * tolerance,
            cells: HashMap::new(),
            vertices: Vec::new(),
        }
    }

    /// Far-out coordinates saturate at the `i64` bounds, so distinct
    /// vertices may share a cell there; welding still compares distances.
    fn cell_of(&self, p: DVec3) -> WeldCell {
        (
            (p.x / self.tolerance).floor() as i64,
            (p.y / self.tolerance).floor() as i64,
            (p.z / self.tolerance).floor() as i64,
        )
    }

    /// Returns the welded index for `position`, creating a new vertex when no
    /// existing one lies within tolerance.
    fn weld(&mut self, position: DVec3) -> VertexIndex {
        let cell = self.cell_of(position);

        let mut best: Option<VertexIndex> = None;
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let neighbor = (
                        cell.0.saturating_add(dx),
                        cell.1.saturating_add(dy),
                        cell.2.saturating_add(dz),
                    );
                    let Some(candidates) = self.cells.get(&neighbor) else {
                        continue;
                    };
                    for &candidate in candidates {
                        let d2 = self.vertices[candidate as usize].distance_squared(position);
                        if d2 <= self.tolerance_sq && best.map_or(true, |b| candidate < b) {
                            best = Some(candidate);
                        }
                    }
                }
            }
        }

        if let Some(index) = best {
            return index;
        }

        let index = self.vertices.len() as VertexIndex;
        self.vertices.push(position);
        self.cells.entry(cell).or_default().push(index);
        index
    }

    fn into_vertices(self) -> Vec<DVec3> {
        self.vertices
    }
}
