//! # Surface Shortest Paths
//!
//! Dijkstra over a [`SurfaceGraph`]. The result approximates the geodesic
//! between two surface points by the shortest chain of mesh edges.
//!
//! ## Algorithm
//!
//! - Min-priority queue keyed by tentative distance ([`BinaryHeap`] with a
//!   reversed ordering)
//! - Early exit once the target vertex is settled
//! - Predecessors are only replaced by strictly shorter routes, so the first
//!   discovered of several equal-length routes is kept
//! - Vertices in different components are rejected up front using the
//!   component labels computed at build time
//!
//! ## Example
//!
//! ```rust
//! use surface_graph::{primitives::create_cube, shortest_path, GraphBuilder};
//! use glam::DVec3;
//!
//! let graph = GraphBuilder::default().build(&create_cube(DVec3::ONE, false)).unwrap();
//! let path = shortest_path(&graph, 0, 1).unwrap();
//! assert_eq!(path.vertices, vec![0, 1]);
//! assert!((path.length - 1.0).abs() < 1e-12);
//! ```

use crate::error::PathError;
use crate::graph::{SurfaceGraph, VertexIndex};
use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A path along the mesh surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfacePath {
    /// Welded vertices from start to end
    pub vertices: Vec<VertexIndex>,
    /// Positions of `vertices`
    pub points: Vec<DVec3>,
    /// Sum of the edge weights along the path
    pub length: f64,
}

impl SurfacePath {
    fn single(vertex: VertexIndex, point: DVec3) -> Self {
        Self {
            vertices: vec![vertex],
            points: vec![point],
            length: 0.0,
        }
    }

    /// Returns true for a zero-length, single-point path.
    pub fn is_single_point(&self) -> bool {
        self.vertices.len() == 1
    }

    /// Returns the number of edges along the path.
    pub fn segment_count(&self) -> usize {
        self.vertices.len().saturating_sub(1)
    }

    /// Consumes the path and returns its positions.
    pub fn into_points(self) -> Vec<DVec3> {
        self.points
    }
}

/// Heap entry ordered so that [`BinaryHeap`] pops the smallest distance first.
#[derive(Debug, Clone, Copy, PartialEq)]
struct QueueEntry {
    distance: f64,
    vertex: VertexIndex,
}

impl Eq for QueueEntry {}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.vertex.cmp(&self.vertex))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn check_vertex(graph: &SurfaceGraph, index: VertexIndex) -> Result<DVec3, PathError> {
    graph.position(index).ok_or(PathError::InvalidVertex {
        index,
        vertex_count: graph.vertex_count(),
    })
}

/// Computes the shortest surface path between two welded vertices.
///
/// # Errors
///
/// - [`PathError::InvalidVertex`] if either index is outside the graph
/// - [`PathError::NotFound`] if the vertices are not connected
pub fn shortest_path(
    graph: &SurfaceGraph,
    start: VertexIndex,
    end: VertexIndex,
) -> Result<SurfacePath, PathError> {
    let start_point = check_vertex(graph, start)?;
    check_vertex(graph, end)?;

    if start == end {
        return Ok(SurfacePath::single(start, start_point));
    }
    if !graph.same_component(start, end) {
        return Err(PathError::NotFound { start, end });
    }

    let n = graph.vertex_count();
    let mut distance = vec![f64::INFINITY; n];
    let mut previous: Vec<Option<VertexIndex>> = vec![None; n];
    let mut settled = vec![false; n];
    let mut queue = BinaryHeap::new();

    distance[start as usize] = 0.0;
    queue.push(QueueEntry {
        distance: 0.0,
        vertex: start,
    });

    while let Some(QueueEntry { distance: d, vertex }) = queue.pop() {
        if settled[vertex as usize] {
            continue;
        }
        settled[vertex as usize] = true;
        if vertex == end {
            break;
        }

        for edge in graph.neighbors(vertex) {
            let to = edge.to as usize;
            if settled[to] {
                continue;
            }
            let candidate = d + edge.weight;
            if candidate < distance[to] {
                distance[to] = candidate;
                previous[to] = Some(vertex);
                queue.push(QueueEntry {
                    distance: candidate,
                    vertex: edge.to,
                });
            }
        }
    }

    if !settled[end as usize] {
        return Err(PathError::NotFound { start, end });
    }

    let mut vertices = vec![end];
    let mut current = end;
    while let Some(prev) = previous[current as usize] {
        vertices.push(prev);
        current = prev;
    }
    vertices.reverse();

    let points = vertices.iter().filter_map(|&v| graph.position(v)).collect();
    Ok(SurfacePath {
        vertices,
        points,
        length: distance[end as usize],
    })
}

/// Chains shortest paths through consecutive waypoints into one polyline.
///
/// Shared waypoints appear once. A single waypoint yields a single-point
/// path.
///
/// # Errors
///
/// [`PathError::NoWaypoints`] for an empty slice, otherwise the error of the
/// first segment that fails.
pub fn shortest_path_through(
    graph: &SurfaceGraph,
    waypoints: &[VertexIndex],
) -> Result<SurfacePath, PathError> {
    let (&first, rest) = waypoints.split_first().ok_or(PathError::NoWaypoints)?;
    let mut path = SurfacePath::single(first, check_vertex(graph, first)?);

    let mut from = first;
    for &to in rest {
        let segment = shortest_path(graph, from, to)?;
        path.vertices.extend_from_slice(&segment.vertices[1..]);
        path.points.extend_from_slice(&segment.points[1..]);
        path.length += segment.length;
        from = to;
    }

    Ok(path)
}

/// Sums the straight-line lengths between consecutive points.
///
/// # Example
///
/// ```rust
/// use surface_graph::polyline_length;
/// use glam::DVec3;
///
/// assert_eq!(polyline_length(&[DVec3::ZERO, DVec3::X, DVec3::new(1.0, 2.0, 0.0)]), 3.0);
/// ```
pub fn polyline_length(points: &[DVec3]) -> f64 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::GraphBuilder;
    use crate::mesh::MeshData;
    use crate::primitives::{create_cube, create_grid};
    use approx::assert_relative_eq;

    fn cube_graph() -> SurfaceGraph {
        GraphBuilder::default().build(&create_cube(DVec3::ONE, false)).unwrap()
    }

    #[test]
    fn test_same_vertex_is_single_point() {
        let graph = cube_graph();
        let path = shortest_path(&graph, 3, 3).unwrap();
        assert!(path.is_single_point());
        assert_eq!(path.points, vec![DVec3::new(0.0, 1.0, 0.0)]);
        assert_eq!(path.length, 0.0);
        assert_eq!(path.segment_count(), 0);
    }

    #[test]
    fn test_adjacent_corners() {
        let graph = cube_graph();
        let path = shortest_path(&graph, 0, 4).unwrap();
        assert_eq!(path.vertices, vec![0, 4]);
        assert_relative_eq!(path.length, 1.0);
    }

    #[test]
    fn test_opposite_corners_follow_surface() {
        let graph = cube_graph();
        let path = shortest_path(&graph, 0, 6).unwrap();
        // One face diagonal plus one edge, never the interior diagonal
        assert_relative_eq!(path.length, 1.0 + 2f64.sqrt(), epsilon = 1e-12);
        assert!(path.length > 3f64.sqrt());
        assert_eq!(path.segment_count(), 2);
        assert_relative_eq!(polyline_length(&path.points), path.length, epsilon = 1e-12);
    }

    #[test]
    fn test_path_is_reversible() {
        let graph = cube_graph();
        for a in 0..8 {
            for b in 0..8 {
                let ab = shortest_path(&graph, a, b).unwrap();
                let ba = shortest_path(&graph, b, a).unwrap();
                assert_relative_eq!(ab.length, ba.length, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_grid_path_length() {
        let graph = GraphBuilder::default().build(&create_grid(4, 4, 1.0)).unwrap();
        // (0,0) -> (4,0) along the bottom row
        let path = shortest_path(&graph, 0, 4).unwrap();
        assert_eq!(path.vertices, vec![0, 1, 2, 3, 4]);
        assert_relative_eq!(path.length, 4.0);

        // (0,0) -> (4,4) along the diagonals
        let path = shortest_path(&graph, 0, 24).unwrap();
        assert_relative_eq!(path.length, 4.0 * 2f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_disconnected_components() {
        let mut mesh = create_cube(DVec3::ONE, false);
        let mut far = create_cube(DVec3::ONE, false);
        for (i, c) in far.positions.iter_mut().enumerate() {
            if i % 3 == 0 {
                *c += 10.0;
            }
        }
        mesh.merge(&far);
        let graph = GraphBuilder::default().build(&mesh).unwrap();
        assert_eq!(graph.component_count(), 2);

        assert_eq!(
            shortest_path(&graph, 0, 9).unwrap_err(),
            PathError::NotFound { start: 0, end: 9 }
        );
        assert!(shortest_path(&graph, 8, 14).is_ok());
    }

    #[test]
    fn test_invalid_vertex() {
        let graph = cube_graph();
        assert_eq!(
            shortest_path(&graph, 0, 8).unwrap_err(),
            PathError::InvalidVertex {
                index: 8,
                vertex_count: 8
            }
        );
    }

    #[test]
    fn test_equal_length_routes_are_stable() {
        // Square 0-1-2-3 fanned to a raised apex, no 0-2 edge: two routes of length 2
        let mesh = MeshData::indexed(
            vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.5, 0.5, 5.0],
            vec![0, 1, 4, 1, 2, 4, 2, 3, 4, 3, 0, 4],
        );
        let graph = GraphBuilder::default().build(&mesh).unwrap();
        let first = shortest_path(&graph, 0, 2).unwrap();
        let second = shortest_path(&graph, 0, 2).unwrap();
        assert_eq!(first, second);
        assert_relative_eq!(first.length, 2.0);
    }

    #[test]
    fn test_path_through_waypoints() {
        let graph = GraphBuilder::default().build(&create_grid(4, 4, 1.0)).unwrap();
        let path = shortest_path_through(&graph, &[0, 4, 24]).unwrap();
        assert_eq!(path.vertices.first(), Some(&0));
        assert_eq!(path.vertices.last(), Some(&24));
        assert_eq!(path.vertices.iter().filter(|&&v| v == 4).count(), 1);
        assert_relative_eq!(path.length, 8.0);
        assert_eq!(path.points.len(), path.vertices.len());
    }

    #[test]
    fn test_path_through_edge_cases() {
        let graph = cube_graph();
        assert_eq!(shortest_path_through(&graph, &[]).unwrap_err(), PathError::NoWaypoints);
        let single = shortest_path_through(&graph, &[5]).unwrap();
        assert!(single.is_single_point());
    }
}
