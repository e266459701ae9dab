/*
This code is part of the flowshed hydrological analysis library.
Created: 04/04/2025
Last Modified: 09/07/2025
License: MIT
*/
use crate::hydro::flow_field::{BOUNDARY, NO_FLOW};
use crate::structures::Grid;

// Interior cells that have not been resolved yet. Distinct from BOUNDARY so
// the two states can never alias during the relaxation.
const UNLABELLED: isize = -3;

/// Labels every interior cell with the linear index of the terminal minimum
/// it drains to. Minima label themselves; every other cell takes the label at
/// the end of its flow path, found by walking the path once and writing the
/// label back over the whole walk. Boundary cells stay `BOUNDARY`.
pub fn node_endpoints(flow: &[isize], grid: &Grid) -> Vec<isize> {
    let n = grid.num_cells();
    let mut endpoints = vec![UNLABELLED; n];
    for ix in 0..n {
        if grid.is_boundary(ix) {
            endpoints[ix] = BOUNDARY;
        } else if flow[ix] == NO_FLOW {
            endpoints[ix] = ix as isize;
        }
    }

    let mut path: Vec<usize> = vec![];
    for ix in 0..n {
        if endpoints[ix] != UNLABELLED {
            continue;
        }
        path.clear();
        let mut current = ix;
        while endpoints[current] == UNLABELLED {
            path.push(current);
            // an unlabelled cell is interior and not a minimum, so it has a
            // flow target, and targets are never on the boundary ring
            current = flow[current] as usize;
        }
        let label = endpoints[current];
        for &visited in &path {
            endpoints[visited] = label;
        }
    }

    endpoints
}

/// Groups interior cells by their terminal minimum. Returns the minima in
/// ascending index order and, aligned with them, each minimum's local
/// watershed with cells ascending.
pub fn local_watersheds(endpoints: &[isize]) -> (Vec<usize>, Vec<Vec<usize>>) {
    let minima: Vec<usize> = endpoints
        .iter()
        .enumerate()
        .filter(|&(ix, &e)| e == ix as isize)
        .map(|(ix, _)| ix)
        .collect();

    let mut watersheds: Vec<Vec<usize>> = vec![vec![]; minima.len()];
    for (ix, &e) in endpoints.iter().enumerate() {
        if e >= 0 {
            let slot = minima
                .binary_search(&(e as usize))
                .expect("endpoint label is not a minimum");
            watersheds[slot].push(ix);
        }
    }

    (minima, watersheds)
}

#[cfg(test)]
mod test {
    use super::{local_watersheds, node_endpoints};
    use crate::hydro::flow_field::{flow_directions, BOUNDARY};
    use crate::structures::{Grid, NeighborMode};

    #[test]
    fn every_cell_on_a_slope_reaches_the_terminal_row() {
        let grid = Grid::new(5, 5, 1.0, NeighborMode::D8).unwrap();
        let heights: Vec<f64> = (0..25).map(|i| 10.0 - (i / 5) as f64).collect();
        let flow = flow_directions(&heights, &grid);
        let endpoints = node_endpoints(&flow, &grid);
        for col in 1..4 {
            let terminal = grid.index(3, col) as isize;
            assert_eq!(endpoints[grid.index(1, col)], terminal);
            assert_eq!(endpoints[grid.index(2, col)], terminal);
            assert_eq!(endpoints[grid.index(3, col)], terminal);
        }
        for ix in grid.boundary_indices() {
            assert_eq!(endpoints[ix], BOUNDARY);
        }
    }

    #[test]
    fn local_watersheds_partition_the_interior() {
        let grid = Grid::new(5, 5, 1.0, NeighborMode::D8).unwrap();
        let heights: Vec<f64> = (0..25).map(|i| 10.0 - (i / 5) as f64).collect();
        let flow = flow_directions(&heights, &grid);
        let endpoints = node_endpoints(&flow, &grid);
        let (minima, sheds) = local_watersheds(&endpoints);
        assert_eq!(minima, vec![16, 17, 18]);
        assert_eq!(sheds[0], vec![6, 11, 16]);
        assert_eq!(sheds[1], vec![7, 12, 17]);
        assert_eq!(sheds[2], vec![8, 13, 18]);
    }

    #[test]
    fn a_single_pit_collects_the_whole_interior() {
        let mut heights = vec![9.0; 25];
        heights[12] = 1.0;
        let grid = Grid::new(5, 5, 1.0, NeighborMode::D8).unwrap();
        let flow = flow_directions(&heights, &grid);
        let endpoints = node_endpoints(&flow, &grid);
        let (minima, sheds) = local_watersheds(&endpoints);
        assert_eq!(minima, vec![12]);
        assert_eq!(sheds[0].len(), 9);
    }
}
