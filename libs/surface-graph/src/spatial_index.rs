//! # Spatial Index for Nearest-Vertex Queries
//!
//! Uses spatial hashing for fast nearest welded vertex lookups. Click points
//! from the renderer almost never land exactly on a vertex; this index maps
//! them onto the graph.
//!
//! ## Features
//!
//! - **Spatial hashing**: Grid-based acceleration structure
//! - **Ring search**: Cells are visited in growing shells around the query
//!   until no unvisited cell can hold a closer vertex
//! - **Restricted search**: Nearest vertex among a caller-supplied subset,
//!   e.g. the three corners of the triangle a ray hit
//!
//! Ties are broken towards the lowest vertex index, so results are
//! reproducible.
//!
//! ## Example
//!
//! ```rust
//! use surface_graph::{primitives::create_cube, GraphBuilder, SpatialIndex};
//! use glam::DVec3;
//!
//! let graph = GraphBuilder::default().build(&create_cube(DVec3::ONE, false)).unwrap();
//! let index = SpatialIndex::from_graph(&graph);
//! assert_eq!(index.nearest_vertex(DVec3::new(0.9, 0.1, -0.2)), Some(1));
//! ```

use crate::graph::{SurfaceGraph, VertexIndex};
use config::constants::{MIN_SPATIAL_CELL_SIZE, SPATIAL_CELL_SIZE_FACTOR};
use glam::DVec3;
use rayon::prelude::*;
use std::collections::HashMap;

/// 3D cell coordinate for spatial hashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CellCoord {
    x: i64,
    y: i64,
    z: i64,
}

impl CellCoord {
    /// Creates a cell coordinate from 3D position.
    fn from_position(pos: DVec3, cell_size: f64) -> Self {
        Self {
            x: (pos.x / cell_size).floor() as i64,
            y: (pos.y / cell_size).floor() as i64,
            z: (pos.z / cell_size).floor() as i64,
        }
    }
}

/// Candidate vertex with its squared distance to the query point.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    distance_sq: f64,
    vertex: VertexIndex,
}

impl Candidate {
    /// Closer wins; equal distances go to the lower index.
    fn closer_than(&self, other: &Candidate) -> bool {
        self.distance_sq < other.distance_sq
            || (self.distance_sq == other.distance_sq && self.vertex < other.vertex)
    }

    fn pick(best: Option<Candidate>, next: Candidate) -> Option<Candidate> {
        match best {
            Some(current) if !next.closer_than(&current) => Some(current),
            _ => Some(next),
        }
    }
}

/// Nearest-vertex index over the welded positions of a graph.
///
/// Uses a hash grid to map 3D space to vertex lists. Built once per graph and
/// read-only afterwards, so it can be shared between threads.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    /// Hash grid: cell -> vertex indices
    grid: HashMap<CellCoord, Vec<VertexIndex>>,
    /// Indexed positions
    positions: Vec<DVec3>,
    /// Cell size for hashing
    cell_size: f64,
    /// Lowest occupied cell on each axis
    cell_min: CellCoord,
    /// Highest occupied cell on each axis
    cell_max: CellCoord,
}

impl SpatialIndex {
    /// Creates a spatial index over the welded vertices of a graph.
    pub fn from_graph(graph: &SurfaceGraph) -> Self {
        Self::from_positions(graph.vertices().to_vec())
    }

    /// Creates a spatial index over arbitrary positions.
    ///
    /// The cell size is derived from the extent of the point set and the
    /// number of points so that a cell holds a handful of vertices on average.
    pub fn from_positions(positions: Vec<DVec3>) -> Self {
        let (bounds_min, bounds_max) = match positions.split_first() {
            Some((&first, rest)) => rest
                .iter()
                .fold((first, first), |(min, max), p| (min.min(*p), max.max(*p))),
            None => (DVec3::ZERO, DVec3::ZERO),
        };

        let extent = (bounds_max - bounds_min).max_element();
        let count = positions.len().max(1) as f64;
        let cell_size =
            (extent / count.cbrt() * SPATIAL_CELL_SIZE_FACTOR).max(MIN_SPATIAL_CELL_SIZE);

        let mut grid: HashMap<CellCoord, Vec<VertexIndex>> = HashMap::new();
        for (i, p) in positions.iter().enumerate() {
            let cell = CellCoord::from_position(*p, cell_size);
            grid.entry(cell).or_default().push(i as VertexIndex);
        }

        Self {
            grid,
            positions,
            cell_size,
            cell_min: CellCoord::from_position(bounds_min, cell_size),
            cell_max: CellCoord::from_position(bounds_max, cell_size),
        }
    }

    /// Returns the number of indexed vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if nothing is indexed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Returns the number of occupied cells.
    pub fn cell_count(&self) -> usize {
        self.grid.len()
    }

    /// Returns the cell size used for hashing.
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Finds the vertex closest to `point`.
    ///
    /// Returns `None` only for an empty index or a non-finite query point.
    pub fn nearest_vertex(&self, point: DVec3) -> Option<VertexIndex> {
        if self.positions.is_empty() || !point.is_finite() {
            return None;
        }

        let center = CellCoord::from_position(point, self.cell_size);
        let axes = [
            (center.x, self.cell_min.x, self.cell_max.x),
            (center.y, self.cell_min.y, self.cell_max.y),
            (center.z, self.cell_min.z, self.cell_max.z),
        ];
        // Rings closer than `min_ring` lie entirely outside the occupied cells.
        let min_ring = axes
            .iter()
            .map(|&(c, lo, hi)| lo.saturating_sub(c).max(c.saturating_sub(hi)).max(0))
            .max()
            .unwrap_or(0);
        let max_ring = axes
            .iter()
            .map(|&(c, lo, hi)| {
                let below = c.saturating_sub(lo).saturating_abs();
                below.max(hi.saturating_sub(c).saturating_abs())
            })
            .max()
            .unwrap_or(0);

        // Past this many visited cells a linear scan is cheaper.
        let cell_budget = self.positions.len().max(64);
        let mut visited = 0usize;
        let mut best: Option<Candidate> = None;

        for ring in min_ring..=max_ring {
            if visited > cell_budget {
                return self.nearest_linear(point);
            }
            visited += self.visit_ring(center, ring, point, &mut best);

            // Every vertex in a later ring is at least `ring * cell_size` away.
            if let Some(found) = best {
                let reach = ring as f64 * self.cell_size;
                if reach * reach > found.distance_sq {
                    break;
                }
            }
        }

        best.map(|c| c.vertex)
    }

    /// Finds the vertex closest to `point` among `candidates`.
    ///
    /// Out-of-range candidates are ignored; returns `None` if none is valid.
    pub fn nearest_vertex_among(
        &self,
        candidates: &[VertexIndex],
        point: DVec3,
    ) -> Option<VertexIndex> {
        candidates
            .iter()
            .filter_map(|&vertex| {
                self.positions.get(vertex as usize).map(|p| Candidate {
                    distance_sq: p.distance_squared(point),
                    vertex,
                })
            })
            .fold(None, Candidate::pick)
            .map(|c| c.vertex)
    }

    /// Visits the cells at Chebyshev distance `ring` from `center`, clipped to
    /// the occupied bounds. Returns the number of cells visited.
    fn visit_ring(
        &self,
        center: CellCoord,
        ring: i64,
        point: DVec3,
        best: &mut Option<Candidate>,
    ) -> usize {
        let x_lo = center.x.saturating_sub(ring).max(self.cell_min.x);
        let x_hi = center.x.saturating_add(ring).min(self.cell_max.x);
        let y_lo = center.y.saturating_sub(ring).max(self.cell_min.y);
        let y_hi = center.y.saturating_add(ring).min(self.cell_max.y);
        let z_lo = center.z.saturating_sub(ring).max(self.cell_min.z);
        let z_hi = center.z.saturating_add(ring).min(self.cell_max.z);

        let mut visited = 0;
        for x in x_lo..=x_hi {
            for y in y_lo..=y_hi {
                let on_shell = x.abs_diff(center.x) == ring.unsigned_abs()
                    || y.abs_diff(center.y) == ring.unsigned_abs();
                if on_shell {
                    for z in z_lo..=z_hi {
                        visited += 1;
                        self.visit_cell(CellCoord { x, y, z }, point, best);
                    }
                } else {
                    for z in [center.z.saturating_sub(ring), center.z.saturating_add(ring)] {
                        if z < z_lo || z > z_hi {
                            continue;
                        }
                        visited += 1;
                        self.visit_cell(CellCoord { x, y, z }, point, best);
                    }
                }
            }
        }
        visited
    }

    fn visit_cell(&self, cell: CellCoord, point: DVec3, best: &mut Option<Candidate>) {
        let Some(vertices) = self.grid.get(&cell) else {
            return;
        };
        for &vertex in vertices {
            let candidate = Candidate {
                distance_sq: self.positions[vertex as usize].distance_squared(point),
                vertex,
            };
            *best = Candidate::pick(*best, candidate);
        }
    }

    /// Parallel brute-force scan used for queries far outside the mesh.
    fn nearest_linear(&self, point: DVec3) -> Option<VertexIndex> {
        self.positions
            .par_iter()
            .enumerate()
            .map(|(i, p)| Candidate {
                distance_sq: p.distance_squared(point),
                vertex: i as VertexIndex,
            })
            .reduce_with(|a, b| if b.closer_than(&a) { b } else { a })
            .map(|c| c.vertex)
    }
}
