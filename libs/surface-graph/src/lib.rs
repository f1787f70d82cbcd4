//! # Surface Graph
//!
//! Shortest paths along triangle mesh surfaces, used to measure lengths on a
//! rendered model from clicked points.
//!
//! ## Architecture
//!
//! ```text
//! MeshData (f32 buffers) → GraphBuilder (welding) → SurfaceGraph
//!                                                      ↓
//!                              SpatialIndex ← SurfaceModel → shortest_path
//! ```
//!
//! ## Algorithms
//!
//! All algorithms are pure Rust and synchronous; the concurrency model lives
//! in the `graph-service` crate.
//! - **Welding**: Spatial hash over tolerance-sized cells
//! - **Nearest vertex**: Hash grid with ring search
//! - **Shortest path**: Dijkstra with early exit (mesh-edge distance, not
//!   exact geodesics)
//!
//! ## Usage
//!
//! ```rust
//! use surface_graph::{primitives::create_cube, GraphBuilder, SurfaceModel};
//! use glam::DVec3;
//!
//! let mesh = create_cube(DVec3::ONE, false).to_unindexed();
//! let model = SurfaceModel::build(&GraphBuilder::default(), &mesh).unwrap();
//!
//! let start = model.nearest_vertex(DVec3::new(0.0, 0.0, -0.1)).unwrap();
//! let end = model.nearest_vertex(DVec3::new(1.0, 1.0, 1.1)).unwrap();
//! let path = model.shortest_path(start, end).unwrap();
//! assert!(path.length > 3f64.sqrt());
//! ```

pub mod builder;
pub mod error;
pub mod graph;
pub mod mesh;
pub mod model;
pub mod path;
pub mod primitives;
pub mod spatial_index;

pub use builder::{build_graph, GraphBuilder};
pub use error::{BuildResult, GraphBuildError, PathError};
pub use graph::{Edge, SurfaceGraph, VertexIndex};
pub use mesh::MeshData;
pub use model::{GraphSummary, SurfaceHit, SurfaceModel};
pub use path::{polyline_length, shortest_path, shortest_path_through, SurfacePath};
pub use spatial_index::SpatialIndex;

pub use config::constants::WeldTolerance;
