//! # Error Types
//!
//! Error types for graph construction and path queries. All errors are
//! explicit and carry enough context to tell which buffer or vertex was at
//! fault.
//!
//! ## Error Policy
//!
//! - Build errors are terminal for the mesh that produced them
//! - Path errors are expected, recoverable query outcomes
//! - "No path" is never reported as an empty path

use crate::graph::VertexIndex;
use thiserror::Error;

// =============================================================================
// BUILD ERRORS
// =============================================================================

/// Errors that can occur while turning mesh buffers into a [`SurfaceGraph`].
///
/// [`SurfaceGraph`]: crate::SurfaceGraph
///
/// ## Example
///
/// ```rust
/// use surface_graph::{GraphBuilder, GraphBuildError, MeshData};
///
/// let empty = MeshData::indexed(vec![0.0, 0.0, 0.0], vec![]);
/// match GraphBuilder::default().build(&empty) {
///     Err(GraphBuildError::EmptyMesh) => {}
///     other => panic!("unexpected: {other:?}"),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphBuildError {
    /// The mesh has no triangles.
    #[error("Mesh has no triangles")]
    EmptyMesh,

    /// Welding left fewer than two distinct vertices.
    #[error(
        "Degenerate mesh: {distinct_vertices} distinct vertices after welding (need at least 2)"
    )]
    DegenerateMesh {
        /// Number of welded vertices that remained
        distinct_vertices: usize,
    },

    /// The position buffer does not hold whole `[x, y, z]` triples.
    #[error("Position buffer length {len} is not a multiple of 3")]
    MalformedPositions {
        /// Length of the position buffer
        len: usize,
    },

    /// The index buffer (or the vertex count of a non-indexed mesh) does not
    /// describe whole triangles.
    #[error("Index count {len} is not a multiple of 3")]
    MalformedIndices {
        /// Number of indices
        len: usize,
    },

    /// A triangle references a vertex that does not exist.
    #[error("Triangle {face} references vertex {index} but the mesh has {vertex_count} vertices")]
    IndexOutOfRange {
        /// Offending triangle
        face: usize,
        /// Offending vertex index
        index: u32,
        /// Number of vertices in the position buffer
        vertex_count: usize,
    },

    /// A referenced vertex has a NaN or infinite coordinate.
    #[error("Vertex {index} has a non-finite coordinate")]
    NonFiniteVertex {
        /// Offending vertex index
        index: usize,
    },

    /// The weld tolerance resolved to zero, a negative or a non-finite
    /// distance.
    #[error("Weld tolerance must be positive and finite, got {tolerance}")]
    InvalidTolerance {
        /// Resolved tolerance
        tolerance: f64,
    },

    /// The build was abandoned through its cancellation probe.
    #[error("Graph build cancelled")]
    Cancelled,
}

// =============================================================================
// PATH ERRORS
// =============================================================================

/// Errors returned by shortest-path queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PathError {
    /// Both vertices exist but lie in different connected components.
    #[error("No path between vertex {start} and vertex {end}")]
    NotFound {
        /// Start vertex
        start: VertexIndex,
        /// End vertex
        end: VertexIndex,
    },

    /// A vertex index is outside the graph.
    #[error("Vertex {index} out of range (graph has {vertex_count} vertices)")]
    InvalidVertex {
        /// Offending index
        index: VertexIndex,
        /// Number of vertices in the graph
        vertex_count: usize,
    },

    /// A multi-point path was requested without any waypoint.
    #[error("At least one waypoint is required")]
    NoWaypoints,
}

// =============================================================================
// RESULT TYPE ALIAS
// =============================================================================

/// Result type alias for graph construction.
pub type BuildResult<T> = Result<T, GraphBuildError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GraphBuildError::IndexOutOfRange {
            face: 3,
            index: 42,
            vertex_count: 8,
        };
        assert!(err.to_string().contains("42"));
        assert!(err.to_string().contains("Triangle 3"));

        let err = PathError::NotFound { start: 1, end: 7 };
        assert_eq!(err.to_string(), "No path between vertex 1 and vertex 7");
    }

    /// Errors cross the worker thread boundary.
    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GraphBuildError>();
        assert_send_sync::<PathError>();
    }
}
