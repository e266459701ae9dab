/*
This code is part of the flowshed hydrological analysis library.
Created: 14/03/2025
Last Modified: 02/07/2025
License: MIT
*/
use crate::error::AnalysisError;

/// Connectivity of the pixel graph: four cardinal neighbours, or the full
/// eight-cell Moore neighbourhood.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NeighborMode {
    D4,
    D8,
}

impl NeighborMode {
    pub fn num_neighbors(&self) -> usize {
        match self {
            NeighborMode::D4 => 4,
            NeighborMode::D8 => 8,
        }
    }
}

/// Regular raster grid of `ny` rows by `nx` columns with cell spacing `step`.
/// Cells are addressed by linear index `i = r * nx + c`. The outermost ring is
/// the domain boundary and carries no valid flow; every neighbour query is for
/// interior cells, whose translated indices always land inside the grid.
///
/// The canonical neighbour order is NE, E, SE, S, SW, W, NW, N for D8 and
/// E, S, W, N for D4. Tie-breaks throughout the library resolve to the first
/// neighbour in this order.
#[derive(Clone, Debug)]
pub struct Grid {
    nx: usize,
    ny: usize,
    step: f64,
    mode: NeighborMode,
    offsets: Vec<isize>,
    distances: Vec<f64>,
}

impl Grid {
    pub fn new(
        nx: usize,
        ny: usize,
        step: f64,
        mode: NeighborMode,
    ) -> Result<Grid, AnalysisError> {
        if nx < 3 || ny < 3 {
            return Err(AnalysisError::GridTooSmall { nx, ny });
        }
        let n = nx as isize;
        let diag = step * std::f64::consts::SQRT_2;
        let (offsets, distances) = match mode {
            NeighborMode::D4 => (vec![1, n, -1, -n], vec![step; 4]),
            NeighborMode::D8 => (
                vec![-n + 1, 1, n + 1, n, n - 1, -1, -n - 1, -n],
                vec![diag, step, diag, step, diag, step, diag, step],
            ),
        };
        Ok(Grid {
            nx,
            ny,
            step,
            mode,
            offsets,
            distances,
        })
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn mode(&self) -> NeighborMode {
        self.mode
    }

    pub fn num_cells(&self) -> usize {
        self.nx * self.ny
    }

    pub fn num_interior_cells(&self) -> usize {
        (self.nx - 2) * (self.ny - 2)
    }

    pub fn num_neighbors(&self) -> usize {
        self.offsets.len()
    }

    pub fn row(&self, ix: usize) -> usize {
        ix / self.nx
    }

    pub fn col(&self, ix: usize) -> usize {
        ix % self.nx
    }

    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.nx + col
    }

    pub fn is_boundary(&self, ix: usize) -> bool {
        let r = ix / self.nx;
        let c = ix % self.nx;
        r == 0 || r == self.ny - 1 || c == 0 || c == self.nx - 1
    }

    /// All domain-boundary indices, ascending.
    pub fn boundary_indices(&self) -> Vec<usize> {
        (0..self.num_cells()).filter(|&i| self.is_boundary(i)).collect()
    }

    /// The `k`-th neighbour of interior cell `ix` in canonical order.
    pub fn neighbor(&self, ix: usize, k: usize) -> usize {
        (ix as isize + self.offsets[k]) as usize
    }

    /// Neighbours of interior cell `ix` in canonical order.
    pub fn neighbors(&self, ix: usize) -> impl Iterator<Item = usize> + '_ {
        self.offsets.iter().map(move |&d| (ix as isize + d) as usize)
    }

    /// Distance to the `k`-th canonical neighbour.
    pub fn distance(&self, k: usize) -> f64 {
        self.distances[k]
    }

    /// Distance between two neighbouring cells, classified by index
    /// difference: `|a - b|` of 1 or `nx` is a cardinal step, anything else a
    /// diagonal one.
    pub fn pair_distance(&self, a: usize, b: usize) -> f64 {
        let d = a.abs_diff(b);
        if d == 1 || d == self.nx {
            self.step
        } else {
            self.step * std::f64::consts::SQRT_2
        }
    }
}
