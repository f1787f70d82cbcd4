//! # Error Types
//!
//! Errors surfaced by graph contexts. Build and spawn failures are terminal
//! for a context and reported once through readiness; query failures are
//! turned into `None` by the facade.

use surface_graph::{GraphBuildError, PathError};
use thiserror::Error;

/// Errors of a single graph context.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ContextError {
    /// The worker thread could not be started.
    #[error("Failed to spawn graph worker: {0}")]
    WorkerSpawn(String),

    /// The worker thread panicked before the build settled.
    #[error("Graph worker panicked")]
    WorkerPanicked,

    /// Graph construction failed.
    #[error("Graph build failed: {0}")]
    Build(#[from] GraphBuildError),

    /// A path query failed.
    #[error("Path query failed: {0}")]
    Path(#[from] PathError),

    /// The graph is still being built, or its build failed.
    #[error("Context is not ready")]
    NotReady,

    /// The context has been disposed.
    #[error("Context has been disposed")]
    Disposed,
}

/// Result type for context operations.
pub type ContextResult<T> = Result<T, ContextError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_error_conversion() {
        let err: ContextError = GraphBuildError::EmptyMesh.into();
        assert_eq!(err, ContextError::Build(GraphBuildError::EmptyMesh));
        assert!(err.to_string().contains("no triangles"));
    }

    #[test]
    fn test_worker_panicked_display() {
        assert_eq!(ContextError::WorkerPanicked.to_string(), "Graph worker panicked");
    }

    #[test]
    fn test_path_error_conversion() {
        let err: ContextError = PathError::NotFound { start: 1, end: 2 }.into();
        assert!(matches!(err, ContextError::Path(PathError::NotFound { .. })));
    }
}
