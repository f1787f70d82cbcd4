//! # Primitives
//!
//! Small procedural meshes used by tests, benchmarks and demos.

use crate::mesh::MeshData;
use glam::DVec3;

/// Creates a cube or rectangular prism mesh.
///
/// # Arguments
///
/// * `size` - Dimensions [x, y, z]
/// * `center` - If true, center at origin; if false, corner at origin
///
/// # Returns
///
/// An indexed mesh with 8 vertices and 12 triangles (2 per face). Each face is
/// split along one diagonal, so the edge graph has 18 edges.
///
/// # Example
///
/// ```rust
/// use surface_graph::primitives::create_cube;
/// use glam::DVec3;
///
/// let mesh = create_cube(DVec3::splat(10.0), false);
/// assert_eq!(mesh.vertex_count(), 8);
/// assert_eq!(mesh.triangle_count(), 12);
/// ```
pub fn create_cube(size: DVec3, center: bool) -> MeshData {
    let (min, max) = if center {
        let half = size / 2.0;
        (-half, half)
    } else {
        (DVec3::ZERO, size)
    };

    let vertices = [
        DVec3::new(min.x, min.y, min.z), // 0: left-front-bottom
        DVec3::new(max.x, min.y, min.z), // 1: right-front-bottom
        DVec3::new(max.x, max.y, min.z), // 2: right-back-bottom
        DVec3::new(min.x, max.y, min.z), // 3: left-back-bottom
        DVec3::new(min.x, min.y, max.z), // 4: left-front-top
        DVec3::new(max.x, min.y, max.z), // 5: right-front-top
        DVec3::new(max.x, max.y, max.z), // 6: right-back-top
        DVec3::new(min.x, max.y, max.z), // 7: left-back-top
    ];

    // Counter-clockwise winding for outward normals
    let triangles = [
        [0, 2, 1], // bottom
        [0, 3, 2],
        [4, 5, 6], // top
        [4, 6, 7],
        [0, 1, 5], // front
        [0, 5, 4],
        [2, 3, 7], // back
        [2, 7, 6],
        [3, 0, 4], // left
        [3, 4, 7],
        [1, 2, 6], // right
        [1, 6, 5],
    ];

    MeshData::from_triangles(&vertices, &triangles)
}

/// Creates a flat grid of `columns x rows` quads in the XY plane, starting at
/// the origin, two triangles per quad.
///
/// Vertex `(i, j)` sits at `(i * spacing, j * spacing, 0)` and has index
/// `j * (columns + 1) + i`.
///
/// # Example
///
/// ```rust
/// use surface_graph::primitives::create_grid;
///
/// let mesh = create_grid(4, 3, 1.0);
/// assert_eq!(mesh.vertex_count(), 20);
/// assert_eq!(mesh.triangle_count(), 24);
/// ```
pub fn create_grid(columns: u32, rows: u32, spacing: f64) -> MeshData {
    let stride = columns + 1;
    let mut vertices = Vec::with_capacity(((columns + 1) * (rows + 1)) as usize);
    for j in 0..=rows {
        for i in 0..=columns {
            vertices.push(DVec3::new(i as f64 * spacing, j as f64 * spacing, 0.0));
        }
    }

    let mut triangles = Vec::with_capacity((columns * rows * 2) as usize);
    for j in 0..rows {
        for i in 0..columns {
            let v0 = j * stride + i;
            let v1 = v0 + 1;
            let v2 = v0 + stride + 1;
            let v3 = v0 + stride;
            triangles.push([v0, v1, v2]);
            triangles.push([v0, v2, v3]);
        }
    }

    MeshData::from_triangles(&vertices, &triangles)
}
