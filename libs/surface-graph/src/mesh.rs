//! # Mesh Buffers
//!
//! Raw triangle buffers as handed over by the rendering side: flat `f32`
//! positions and an optional flat `u32` index buffer.

use crate::error::{BuildResult, GraphBuildError};
use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Vertex and index buffers of one mesh, in the mesh's local space.
///
/// Positions stay `f32` as they arrive from the GPU side; they are widened to
/// `f64` when read.
///
/// # Example
///
/// ```rust
/// use surface_graph::MeshData;
///
/// let mesh = MeshData::indexed(
///     vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
///     vec![0, 1, 2],
/// );
/// assert_eq!(mesh.vertex_count(), 3);
/// assert_eq!(mesh.triangle_count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshData {
    /// Vertex positions as [x, y, z, x, y, z, ...]
    pub positions: Vec<f32>,
    /// Triangle indices as [i0, i1, i2, ...]; `None` for non-indexed meshes
    /// where each consecutive position triple is a triangle
    pub indices: Option<Vec<u32>>,
}

impl MeshData {
    /// Creates an indexed mesh.
    pub fn indexed(positions: Vec<f32>, indices: Vec<u32>) -> Self {
        Self {
            positions,
            indices: Some(indices),
        }
    }

    /// Creates a non-indexed mesh (triangle soup).
    pub fn unindexed(positions: Vec<f32>) -> Self {
        Self {
            positions,
            indices: None,
        }
    }

    /// Creates an indexed mesh from `f64` vertices and triangles.
    pub fn from_triangles(vertices: &[DVec3], triangles: &[[u32; 3]]) -> Self {
        let mut positions = Vec::with_capacity(vertices.len() * 3);
        for v in vertices {
            positions.push(v.x as f32);
            positions.push(v.y as f32);
            positions.push(v.z as f32);
        }
        let indices = triangles.iter().flat_map(|tri| tri.iter().copied()).collect();
        Self::indexed(positions, indices)
    }

    /// Returns the number of vertices in the position buffer.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Returns the number of complete triangles.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        match &self.indices {
            Some(indices) => indices.len() / 3,
            None => self.vertex_count() / 3,
        }
    }

    /// Returns true if the mesh carries an index buffer.
    #[inline]
    pub fn is_indexed(&self) -> bool {
        self.indices.is_some()
    }

    /// Returns the position of a vertex, or `None` if out of range.
    pub fn position(&self, index: usize) -> Option<DVec3> {
        let base = index.checked_mul(3)?;
        let xyz = self.positions.get(base..base + 3)?;
        Some(DVec3::new(xyz[0] as f64, xyz[1] as f64, xyz[2] as f64))
    }

    /// Returns the vertex indices of a triangle, or `None` if out of range.
    pub fn triangle(&self, face: usize) -> Option<[u32; 3]> {
        if face >= self.triangle_count() {
            return None;
        }
        match &self.indices {
            Some(indices) => {
                let base = face * 3;
                Some([indices[base], indices[base + 1], indices[base + 2]])
            }
            None => {
                let base = (face * 3) as u32;
                Some([base, base + 1, base + 2])
            }
        }
    }

    /// Iterates over all complete triangles.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        (0..self.triangle_count()).filter_map(move |face| self.triangle(face))
    }

    /// Marks the vertices used by at least one complete triangle.
    ///
    /// Out-of-range indices are ignored; [`MeshData::validate`] reports them.
    pub fn referenced_vertices(&self) -> Vec<bool> {
        let mut referenced = vec![false; self.vertex_count()];
        for index in self.triangles().flatten() {
            if let Some(slot) = referenced.get_mut(index as usize) {
                *slot = true;
            }
        }
        referenced
    }

    /// Computes the axis-aligned bounding box of the referenced vertices.
    ///
    /// Returns (min, max) corners; both are zero if no vertex is referenced.
    pub fn bounding_box(&self) -> (DVec3, DVec3) {
        let referenced = self.referenced_vertices();
        let mut points = referenced
            .iter()
            .enumerate()
            .filter(|(_, used)| **used)
            .filter_map(|(i, _)| self.position(i));
        let Some(first) = points.next() else {
            return (DVec3::ZERO, DVec3::ZERO);
        };
        points.fold((first, first), |(min, max), p| (min.min(p), max.max(p)))
    }

    /// Expands an indexed mesh into a triangle soup with one position per
    /// triangle corner, the layout most exporters produce when vertices carry
    /// per-face normals or UVs.
    pub fn to_unindexed(&self) -> Self {
        let mut positions = Vec::with_capacity(self.triangle_count() * 9);
        for tri in self.triangles() {
            for index in tri {
                let base = index as usize * 3;
                if let Some(xyz) = self.positions.get(base..base + 3) {
                    positions.extend_from_slice(xyz);
                }
            }
        }
        Self::unindexed(positions)
    }

    /// Appends another mesh to this one.
    ///
    /// Indices of `other` are offset past this mesh's vertices. If either
    /// mesh is non-indexed, the result is a non-indexed soup.
    pub fn merge(&mut self, other: &MeshData) {
        let offset = (self.positions.len() / 3) as u32;
        if let (Some(indices), Some(other_indices)) =
            (self.indices.as_mut(), other.indices.as_ref())
        {
            indices.extend(other_indices.iter().map(|i| i + offset));
            self.positions.extend_from_slice(&other.positions);
            return;
        }

        let mut soup = self.to_unindexed();
        soup.positions.extend_from_slice(&other.to_unindexed().positions);
        *self = soup;
    }

    /// Checks buffer shapes, index ranges and coordinate finiteness.
    ///
    /// Checks, in order:
    /// - Position buffer holds whole triples
    /// - Index buffer holds whole triangles
    /// - At least one triangle exists
    /// - All indices are in range
    /// - Every referenced vertex has finite coordinates
    pub fn validate(&self) -> BuildResult<()> {
        if self.positions.len() % 3 != 0 {
            return Err(GraphBuildError::MalformedPositions {
                len: self.positions.len(),
            });
        }

        let index_len = match &self.indices {
            Some(indices) => indices.len(),
            None => self.vertex_count(),
        };
        if index_len % 3 != 0 {
            return Err(GraphBuildError::MalformedIndices { len: index_len });
        }

        if self.triangle_count() == 0 {
            return Err(GraphBuildError::EmptyMesh);
        }

        let vertex_count = self.vertex_count();
        for (face, tri) in self.triangles().enumerate() {
            for index in tri {
                if index as usize >= vertex_count {
                    return Err(GraphBuildError::IndexOutOfRange {
                        face,
                        index,
                        vertex_count,
                    });
                }
            }
        }

        let referenced = self.referenced_vertices();
        let non_finite = referenced
            .iter()
            .enumerate()
            .filter(|(_, used)| **used)
            .find(|(i, _)| self.position(*i).map_or(true, |p| !p.is_finite()));
        if let Some((index, _)) = non_finite {
            return Err(GraphBuildError::NonFiniteVertex { index });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> MeshData {
        MeshData::indexed(
            vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            vec![0, 1, 2],
        )
    }

    #[test]
    fn test_counts() {
        let mesh = triangle();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        assert!(mesh.is_indexed());
    }

    #[test]
    fn test_unindexed_triangles() {
        let mesh = triangle().to_unindexed();
        assert!(!mesh.is_indexed());
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.triangle(0), Some([0, 1, 2]));
        assert_eq!(mesh.triangle(1), None);
    }

    #[test]
    fn test_position_widening() {
        let mesh = triangle();
        assert_eq!(mesh.position(1), Some(DVec3::X));
        assert_eq!(mesh.position(3), None);
    }

    #[test]
    fn test_bounding_box() {
        let mesh = MeshData::unindexed(vec![-1.0, 2.0, 0.0, 3.0, -4.0, 5.0, 0.0, 0.0, 0.0]);
        let (min, max) = mesh.bounding_box();
        assert_eq!(min, DVec3::new(-1.0, -4.0, 0.0));
        assert_eq!(max, DVec3::new(3.0, 2.0, 5.0));
        assert_eq!(MeshData::default().bounding_box(), (DVec3::ZERO, DVec3::ZERO));
    }

    #[test]
    fn test_merge_indexed() {
        let mut mesh = triangle();
        mesh.merge(&triangle());
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.triangle(1), Some([3, 4, 5]));
        assert!(mesh.is_indexed());
    }

    #[test]
    fn test_merge_with_soup() {
        let mut mesh = triangle();
        mesh.merge(&triangle().to_unindexed());
        assert!(!mesh.is_indexed());
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.position(4), Some(DVec3::X));
    }

    #[test]
    fn test_validate_ok() {
        assert_eq!(triangle().validate(), Ok(()));
    }

    #[test]
    fn test_validate_malformed_positions() {
        let mesh = MeshData::indexed(vec![0.0, 1.0], vec![0, 0, 0]);
        assert_eq!(
            mesh.validate(),
            Err(GraphBuildError::MalformedPositions { len: 2 })
        );
    }

    #[test]
    fn test_validate_malformed_indices() {
        let mut mesh = triangle();
        mesh.indices = Some(vec![0, 1]);
        assert_eq!(mesh.validate(), Err(GraphBuildError::MalformedIndices { len: 2 }));

        let soup = MeshData::unindexed(vec![0.0; 12]);
        assert_eq!(soup.validate(), Err(GraphBuildError::MalformedIndices { len: 4 }));
    }

    #[test]
    fn test_validate_empty() {
        assert_eq!(MeshData::default().validate(), Err(GraphBuildError::EmptyMesh));
        let no_faces = MeshData::indexed(vec![0.0; 9], vec![]);
        assert_eq!(no_faces.validate(), Err(GraphBuildError::EmptyMesh));
    }

    #[test]
    fn test_validate_out_of_range() {
        let mut mesh = triangle();
        mesh.indices = Some(vec![0, 1, 9]);
        assert_eq!(
            mesh.validate(),
            Err(GraphBuildError::IndexOutOfRange {
                face: 0,
                index: 9,
                vertex_count: 3
            })
        );
    }

    #[test]
    fn test_validate_non_finite() {
        let mut mesh = triangle();
        mesh.positions[4] = f32::NAN;
        assert_eq!(mesh.validate(), Err(GraphBuildError::NonFiniteVertex { index: 1 }));
    }

    #[test]
    fn test_unreferenced_vertices_are_not_validated() {
        let mut positions = triangle().positions;
        positions.extend_from_slice(&[f32::NAN, f32::INFINITY, 100.0]);
        let mesh = MeshData::indexed(positions, vec![0, 1, 2]);
        assert_eq!(mesh.referenced_vertices(), vec![true, true, true, false]);
        assert_eq!(mesh.validate(), Ok(()));
    }

    #[test]
    fn test_bounding_box_ignores_unreferenced() {
        let mut positions = triangle().positions;
        positions.extend_from_slice(&[50.0, 50.0, 50.0]);
        let mesh = MeshData::indexed(positions, vec![0, 1, 2]);
        assert_eq!(mesh.bounding_box(), (DVec3::ZERO, DVec3::new(1.0, 1.0, 0.0)));
    }
}
