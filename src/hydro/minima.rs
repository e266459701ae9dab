/*
This code is part of the flowshed hydrological analysis library.
Created: 04/04/2025
Last Modified: 09/07/2025
License: MIT
*/
use crate::structures::Grid;
use std::collections::VecDeque;

/// Groups spatially adjacent minima into combined minima: the connected
/// components of the minima set under the active connectivity. A minimum with
/// no neighbouring minimum forms a singleton component. Components are
/// reported in order of their smallest member, members ascending.
pub fn combine_minima(minima: &[usize], grid: &Grid) -> Vec<Vec<usize>> {
    let n = grid.num_cells();
    let mut is_minimum = vec![false; n];
    for &m in minima {
        is_minimum[m] = true;
    }

    let mut visited = vec![false; n];
    let mut combined: Vec<Vec<usize>> = vec![];
    let mut queue: VecDeque<usize> = VecDeque::new();
    for &m in minima {
        if visited[m] {
            continue;
        }
        visited[m] = true;
        queue.push_back(m);
        let mut component = vec![];
        while let Some(current) = queue.pop_front() {
            component.push(current);
            for nb in grid.neighbors(current) {
                if is_minimum[nb] && !visited[nb] {
                    visited[nb] = true;
                    queue.push_back(nb);
                }
            }
        }
        component.sort_unstable();
        combined.push(component);
    }

    combined
}

#[cfg(test)]
mod test {
    use super::combine_minima;
    use crate::structures::{Grid, NeighborMode};

    #[test]
    fn adjacent_minima_merge_into_one_component() {
        let grid = Grid::new(6, 6, 1.0, NeighborMode::D8).unwrap();
        // (1,1), (2,2) touch diagonally; (4,4) stands alone
        let minima = vec![7, 14, 28];
        let combined = combine_minima(&minima, &grid);
        assert_eq!(combined, vec![vec![7, 14], vec![28]]);
    }

    #[test]
    fn d4_does_not_connect_diagonals() {
        let grid = Grid::new(6, 6, 1.0, NeighborMode::D4).unwrap();
        let minima = vec![7, 14, 28];
        let combined = combine_minima(&minima, &grid);
        assert_eq!(combined, vec![vec![7], vec![14], vec![28]]);
    }

    #[test]
    fn a_chain_of_minima_is_a_single_component() {
        let grid = Grid::new(7, 3, 1.0, NeighborMode::D8).unwrap();
        // the whole interior row
        let minima = vec![8, 9, 10, 11, 12];
        let combined = combine_minima(&minima, &grid);
        assert_eq!(combined, vec![vec![8, 9, 10, 11, 12]]);
    }
}
