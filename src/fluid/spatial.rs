//! Uniform-cell spatial hash for neighbor search.
//!
//! The plane is split into square cells whose side equals the kernel support
//! radius, so every neighbor of a particle lies in its own cell or one of the
//! eight around it. Buckets are keyed by a signed linear cell index in a hash
//! map: particles that drift outside the domain before boundary correction
//! produce negative or out-of-range indices and must still be stored.

use std::collections::HashMap;

use super::math::{norm, Vector2};
use super::particle::Particle;

/// Geometry of the grid: cell size, extent and offset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridConfig {
    /// Cell side, equal to the support radius.
    pub cell_size: f64,
    /// Number of columns provisioned for the extent.
    pub columns: i64,
    /// Number of rows provisioned for the extent.
    pub rows: i64,
    /// Added to particle positions before computing cells.
    pub offset: Vector2,
}

impl GridConfig {
    /// Create a configuration covering `extent` with cells of `cell_size`.
    pub fn for_domain(extent: Vector2, offset: Vector2, cell_size: f64) -> Self {
        // +0.5 keeps particles sitting exactly on the far edge inside the grid
        let columns = (extent.x / cell_size + 0.5).ceil() as i64;
        let rows = (extent.y / cell_size + 0.5).ceil() as i64;
        Self {
            cell_size,
            columns,
            rows,
            offset,
        }
    }

    fn axis_cell(&self, coordinate: f64) -> i64 {
        (coordinate / self.cell_size + 0.5).ceil() as i64
    }

    /// Column and row of a position.
    pub fn cell_coords(&self, position: Vector2) -> (i64, i64) {
        let world = self.offset + position;
        (self.axis_cell(world.x), self.axis_cell(world.y))
    }

    /// Linear cell index of a position.
    ///
    /// Wraps instead of overflowing, so diverged (huge or infinite)
    /// coordinates still map to some bucket.
    pub fn cell_index(&self, position: Vector2) -> i64 {
        let (column, row) = self.cell_coords(position);
        row.wrapping_mul(self.columns).wrapping_add(column)
    }

    /// Linear offsets of the 3×3 neighborhood around a cell.
    ///
    /// With fewer than three columns some offsets coincide; see
    /// [`neighbor_cells`](Self::neighbor_cells) for the distinct keys.
    pub fn neighbor_offsets(&self) -> [i64; 9] {
        let c = self.columns;
        [-c - 1, -c, -c + 1, -1, 0, 1, c - 1, c, c + 1]
    }

    /// Distinct bucket keys of the 3×3 neighborhood around `center`, in
    /// offset order.
    pub fn neighbor_cells(&self, center: i64) -> Vec<i64> {
        let mut keys = Vec::with_capacity(9);
        for offset in self.neighbor_offsets() {
            let key = center.wrapping_add(offset);
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }
}

/// Spatial hash grid mapping cell index -> particle indices.
#[derive(Clone, Debug)]
pub struct SpatialGrid {
    config: GridConfig,
    cells: HashMap<i64, Vec<usize>>,
}

impl SpatialGrid {
    /// Create an empty grid.
    pub fn new(config: GridConfig) -> Self {
        Self {
            config,
            cells: HashMap::new(),
        }
    }

    /// Geometry the grid was created with.
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Remove every bucket.
    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Rebuild the grid from current particle positions.
    pub fn build(&mut self, particles: &[Particle]) {
        self.clear();
        for (i, particle) in particles.iter().enumerate() {
            let index = self.config.cell_index(particle.position);
            self.cells.entry(index).or_default().push(i);
        }
    }

    /// Number of particles stored.
    pub fn len(&self) -> usize {
        self.cells.values().map(Vec::len).sum()
    }

    /// True when no particle is stored.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of non-empty cells.
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    /// Particle indices stored in a cell.
    pub fn cell(&self, index: i64) -> &[usize] {
        self.cells.get(&index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Indices of all particles strictly within the support radius of
    /// particle `i`, excluding `i` itself.
    ///
    /// Exact as long as no particle moved more than one cell since the last
    /// [`build`](Self::build).
    pub fn neighbors(&self, particles: &[Particle], i: usize) -> Vec<usize> {
        let mut neighbors = Vec::with_capacity(32);
        self.collect_within(particles, particles[i].position, Some(i), &mut neighbors);
        neighbors
    }

    /// Indices of all particles strictly within the support radius of an
    /// arbitrary point.
    pub fn neighbors_of_point(&self, particles: &[Particle], point: Vector2) -> Vec<usize> {
        let mut neighbors = Vec::new();
        self.collect_within(particles, point, None, &mut neighbors);
        neighbors
    }

    fn collect_within(
        &self,
        particles: &[Particle],
        point: Vector2,
        exclude: Option<usize>,
        out: &mut Vec<usize>,
    ) {
        let h = self.config.cell_size;
        let center = self.config.cell_index(point);

        for key in self.config.neighbor_cells(center) {
            let Some(bucket) = self.cells.get(&key) else {
                continue;
            };
            for &j in bucket {
                if Some(j) == exclude {
                    continue;
                }
                if norm(point - particles[j].position) < h {
                    out.push(j);
                }
            }
        }
    }
}
