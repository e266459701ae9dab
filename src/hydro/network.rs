/*
This code is part of the flowshed hydrological analysis library.
Created: 16/05/2025
Last Modified: 18/07/2025
License: MIT
*/
use crate::hydro::spill::SpillPair;
use crate::hydro::watersheds::map_cells_to_watersheds;
use crate::structures::{FlowGraph, Grid};
use std::collections::VecDeque;

/// Watershed-level connectivity derived from the spill pairs: one node per
/// watershed, one edge along each spill that lands in another watershed.
/// After the spill fixed point this graph is a forest, so upslope and
/// downslope traversals terminate.
#[derive(Clone, Debug)]
pub struct WatershedNetwork {
    graph: FlowGraph,
}

impl WatershedNetwork {
    pub fn new(
        watersheds: &[Vec<usize>],
        spill_pairs: &[SpillPair],
        grid: &Grid,
    ) -> WatershedNetwork {
        let cell_to_watershed = map_cells_to_watersheds(watersheds, grid.num_cells());
        let succ: Vec<isize> = spill_pairs
            .iter()
            .map(|p| cell_to_watershed[p.to])
            .collect();
        WatershedNetwork {
            graph: FlowGraph::from_successors(succ),
        }
    }

    pub fn num_watersheds(&self) -> usize {
        self.graph.len()
    }

    /// The watershed a spill drains into, if it does not exit the domain.
    pub fn downslope_neighbor(&self, watershed: usize) -> Option<usize> {
        self.graph.successor(watershed)
    }

    /// Every watershed whose outflow eventually passes through `watershed`,
    /// in breadth-first order starting with `watershed` itself.
    pub fn upslope_watersheds(&self, watershed: usize) -> Vec<usize> {
        let mut visited = vec![false; self.graph.len()];
        let mut order = vec![];
        let mut queue: VecDeque<usize> = VecDeque::new();
        visited[watershed] = true;
        queue.push_back(watershed);
        while let Some(w) = queue.pop_front() {
            order.push(w);
            for &p in self.graph.predecessors(w) {
                if !visited[p] {
                    visited[p] = true;
                    queue.push_back(p);
                }
            }
        }
        order
    }

    /// The chain of watersheds `watershed` drains through, in flow order
    /// starting with `watershed` itself.
    pub fn downslope_watersheds(&self, watershed: usize) -> Vec<usize> {
        let mut order = vec![watershed];
        let mut current = watershed;
        while let Some(next) = self.graph.successor(current) {
            order.push(next);
            current = next;
        }
        order
    }
}

#[cfg(test)]
mod test {
    use super::WatershedNetwork;
    use crate::hydro::spill::SpillPair;
    use crate::structures::{Grid, NeighborMode};

    fn cascade() -> (Vec<Vec<usize>>, Vec<SpillPair>, Grid) {
        // three watersheds on a 9 x 3 strip: 0 -> 1 -> 2 -> boundary
        let grid = Grid::new(9, 3, 1.0, NeighborMode::D8).unwrap();
        let watersheds = vec![
            vec![10, 11],
            vec![12, 13],
            vec![14, 15, 16],
        ];
        let spills = vec![
            SpillPair { from: 11, to: 12 },
            SpillPair { from: 13, to: 14 },
            SpillPair { from: 16, to: 17 }, // 17 is on the boundary ring
        ];
        (watersheds, spills, grid)
    }

    #[test]
    fn downslope_walks_the_spill_chain() {
        let (watersheds, spills, grid) = cascade();
        let network = WatershedNetwork::new(&watersheds, &spills, &grid);
        assert_eq!(network.downslope_watersheds(0), vec![0, 1, 2]);
        assert_eq!(network.downslope_watersheds(2), vec![2]);
        assert_eq!(network.downslope_neighbor(2), None);
    }

    #[test]
    fn upslope_gathers_every_contributing_watershed() {
        let (watersheds, spills, grid) = cascade();
        let network = WatershedNetwork::new(&watersheds, &spills, &grid);
        assert_eq!(network.upslope_watersheds(2), vec![2, 1, 0]);
        assert_eq!(network.upslope_watersheds(0), vec![0]);
    }
}
