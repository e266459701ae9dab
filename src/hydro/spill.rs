/*
This code is part of the flowshed hydrological analysis library.
Created: 25/04/2025
Last Modified: 18/07/2025
License: MIT
*/
use crate::hydro::watersheds::map_cells_to_watersheds;
use crate::structures::Grid;
use std::collections::BTreeSet;

/// The edge carrying outward flow from a watershed: `from` belongs to the
/// watershed, `to` is a grid neighbour of `from` outside it, either in
/// another watershed or on the domain boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpillPair {
    pub from: usize,
    pub to: usize,
}

/// Ordered cell pairs `(u, v)` with `u` inside the watershed and `v` a grid
/// neighbour outside it. Cells are scanned ascending, neighbours in canonical
/// order; that scan order is the tie-break for everything downstream.
fn boundary_pairs(
    cells: &[usize],
    watershed: isize,
    cell_to_watershed: &[isize],
    grid: &Grid,
) -> Vec<(usize, usize)> {
    let mut pairs: Vec<(usize, usize)> = vec![];
    for &u in cells {
        for v in grid.neighbors(u) {
            if cell_to_watershed[v] != watershed {
                pairs.push((u, v));
            }
        }
    }
    pairs
}

/// Picks the spill pair: among boundary pairs whose two heights both lie at
/// or below the lowest max-height of any pair, the one with the steepest
/// descent `(h[u] - h[v]) / distance`. First-seen wins on an exact tie.
fn steepest_spill_pair(
    pairs: &[(usize, usize)],
    heights: &[f64],
    grid: &Grid,
) -> (usize, usize) {
    let mut min_of_max = f64::INFINITY;
    for &(u, v) in pairs {
        let rim = heights[u].max(heights[v]);
        if rim < min_of_max {
            min_of_max = rim;
        }
    }

    let mut steepest: Option<(usize, usize)> = None;
    let mut max_slope = f64::NEG_INFINITY;
    for &(u, v) in pairs {
        if heights[u] <= min_of_max && heights[v] <= min_of_max {
            let slope = (heights[u] - heights[v]) / grid.pair_distance(u, v);
            if slope > max_slope {
                max_slope = slope;
                steepest = Some((u, v));
            }
        }
    }
    // a watershed always touches something outside itself, so at least the
    // pair that set min_of_max qualifies
    steepest.expect("watershed has no boundary pairs")
}

/// Simple directed cycles of a functional graph (out-degree at most one).
/// Each node belongs to at most one cycle; cycles are reported in order of
/// discovery from ascending start nodes.
fn functional_cycles(out_edges: &[isize]) -> Vec<Vec<usize>> {
    const WHITE: u8 = 0;
    const ON_PATH: u8 = 1;
    const DONE: u8 = 2;
    let mut state = vec![WHITE; out_edges.len()];
    let mut cycles: Vec<Vec<usize>> = vec![];
    for start in 0..out_edges.len() {
        if state[start] != WHITE {
            continue;
        }
        let mut path: Vec<usize> = vec![];
        let mut current = start as isize;
        while current >= 0 && state[current as usize] == WHITE {
            state[current as usize] = ON_PATH;
            path.push(current as usize);
            current = out_edges[current as usize];
        }
        if current >= 0 && state[current as usize] == ON_PATH {
            let entry = path
                .iter()
                .position(|&w| w == current as usize)
                .expect("cycle entry must be on the current path");
            cycles.push(path[entry..].to_vec());
        }
        for &w in &path {
            state[w] = DONE;
        }
    }
    cycles
}

/// Runs the spill fixed point: compute one steepest spill pair per watershed,
/// merge every pair of mutually spilling watersheds, and once no 2-cycles
/// remain collapse any longer directed cycle, repeating until the spill graph
/// is cycle-free. Spill pairs of untouched watersheds are carried across
/// rounds so only newly formed watersheds get their boundary rescanned.
///
/// Returns the final watershed list and, aligned with it, exactly one spill
/// pair per watershed pointing into another watershed or onto the domain
/// boundary.
pub fn resolve_spill_pairs(
    watersheds: Vec<Vec<usize>>,
    heights: &[f64],
    grid: &Grid,
) -> (Vec<Vec<usize>>, Vec<SpillPair>) {
    let n = grid.num_cells();
    let mut watersheds = watersheds;
    // cell-level spill pairs that survived every merge so far
    let mut stable_pairs: BTreeSet<(usize, usize)> = BTreeSet::new();

    let mut round = 0;
    loop {
        round += 1;
        let cell_to_watershed = map_cells_to_watersheds(&watersheds, n);

        // assign carried pairs to their watersheds; rescan the rest
        let mut pair_of: Vec<Option<(usize, usize)>> = vec![None; watersheds.len()];
        for &(u, v) in &stable_pairs {
            let w = cell_to_watershed[u];
            debug_assert!(w >= 0, "carried spill pair must start inside a watershed");
            pair_of[w as usize] = Some((u, v));
        }
        let mut num_rescanned = 0;
        for w in 0..watersheds.len() {
            if pair_of[w].is_none() {
                let pairs = boundary_pairs(&watersheds[w], w as isize, &cell_to_watershed, grid);
                let spill = steepest_spill_pair(&pairs, heights, grid);
                stable_pairs.insert(spill);
                pair_of[w] = Some(spill);
                num_rescanned += 1;
            }
        }
        log::debug!(
            "spill round {}: {} watersheds, {} rescanned",
            round,
            watersheds.len(),
            num_rescanned
        );

        // watershed-level spill edges; -1 marks a spill onto the boundary
        let out_edges: Vec<isize> = pair_of
            .iter()
            .map(|p| {
                let (_, v) = p.expect("every watershed has a spill pair");
                cell_to_watershed[v]
            })
            .collect();

        // mutually spilling watersheds merge pairwise; each watershed has one
        // outgoing spill, so the pairs cannot overlap
        let mut merge_groups: Vec<Vec<usize>> = vec![];
        for a in 0..out_edges.len() {
            let b = out_edges[a];
            if b >= 0 && a < b as usize && out_edges[b as usize] == a as isize {
                merge_groups.push(vec![a, b as usize]);
            }
        }
        if merge_groups.is_empty() {
            merge_groups = functional_cycles(&out_edges);
            if !merge_groups.is_empty() {
                log::debug!(
                    "spill round {}: collapsing {} spill cycles",
                    round,
                    merge_groups.len()
                );
            }
        }
        if merge_groups.is_empty() {
            let spill_pairs = pair_of
                .into_iter()
                .map(|p| {
                    let (from, to) = p.expect("every watershed has a spill pair");
                    SpillPair { from, to }
                })
                .collect();
            return (watersheds, spill_pairs);
        }

        // union each group's cells; drop the merged watersheds' spill pairs
        // so the unions are rescanned next round
        let mut merged = vec![false; watersheds.len()];
        for group in &merge_groups {
            for &w in group {
                merged[w] = true;
            }
        }
        for (w, pair) in pair_of.iter().enumerate() {
            if merged[w] {
                stable_pairs.remove(&pair.expect("every watershed has a spill pair"));
            }
        }
        let mut next: Vec<Vec<usize>> = Vec::with_capacity(watersheds.len());
        for (w, cells) in watersheds.iter_mut().enumerate() {
            if !merged[w] {
                next.push(std::mem::take(cells));
            }
        }
        for group in &merge_groups {
            let mut union: Vec<usize> = vec![];
            for &w in group {
                union.extend_from_slice(&watersheds[w]);
            }
            union.sort_unstable();
            next.push(union);
        }
        watersheds = next;
    }
}

#[cfg(test)]
mod test {
    use super::{functional_cycles, resolve_spill_pairs, steepest_spill_pair};
    use crate::structures::{Grid, NeighborMode};

    #[test]
    fn steepest_pair_prefers_the_lowest_rim_then_the_steepest_drop() {
        let grid = Grid::new(5, 5, 10.0, NeighborMode::D8).unwrap();
        let mut heights = vec![20.0; 25];
        heights[6] = 10.0; // (1, 1), inside
        heights[7] = 12.0; // (1, 2), low rim crossing
        heights[11] = 15.0; // (2, 1), high rim with a steep drop beyond it
        heights[12] = 1.0;
        let pairs = vec![(6, 7), (11, 12)];
        // min-of-max is max(10, 12) = 12, so the steep (11, 12) drop is
        // above the rim and (6, 7) wins
        assert_eq!(steepest_spill_pair(&pairs, &heights, &grid), (6, 7));
    }

    #[test]
    fn steepest_pair_ties_resolve_to_first_seen() {
        let grid = Grid::new(5, 5, 10.0, NeighborMode::D8).unwrap();
        let mut heights = vec![20.0; 25];
        heights[6] = 10.0;
        heights[7] = 10.0;
        heights[8] = 10.0;
        heights[13] = 10.0;
        let pairs = vec![(6, 7), (8, 13)];
        assert_eq!(steepest_spill_pair(&pairs, &heights, &grid), (6, 7));
    }

    #[test]
    fn finds_disjoint_cycles_in_a_functional_graph() {
        // 0 -> 1 -> 2 -> 0 is a cycle; 3 -> 1 feeds it; 4 -> 5 -> -1 drains
        let out_edges = vec![1, 2, 0, 1, 5, -1];
        assert_eq!(functional_cycles(&out_edges), vec![vec![0, 1, 2]]);
    }

    #[test]
    fn two_cycles_are_both_reported() {
        let out_edges = vec![1, 0, 3, 2, -1];
        assert_eq!(functional_cycles(&out_edges), vec![vec![0, 1], vec![2, 3]]);
    }

    #[test]
    fn chain_without_cycles_reports_nothing() {
        let out_edges = vec![1, 2, 3, -1];
        assert!(functional_cycles(&out_edges).is_empty());
    }

    #[test]
    fn mutually_spilling_watersheds_merge() {
        // Two one-cell-deep basins either side of a low saddle; each basin's
        // cheapest exit is across the saddle into the other.
        let grid = Grid::new(7, 5, 10.0, NeighborMode::D8).unwrap();
        let mut heights = vec![20.0; 35];
        for r in 1..4 {
            for c in 1..6 {
                heights[grid.index(r, c)] = 15.0;
            }
        }
        heights[grid.index(2, 2)] = 5.0;
        heights[grid.index(2, 4)] = 5.0;
        heights[grid.index(2, 3)] = 8.0;

        let watersheds = vec![
            vec![
                grid.index(1, 1),
                grid.index(1, 2),
                grid.index(2, 1),
                grid.index(2, 2),
                grid.index(3, 1),
                grid.index(3, 2),
            ],
            vec![
                grid.index(1, 3),
                grid.index(1, 4),
                grid.index(1, 5),
                grid.index(2, 3),
                grid.index(2, 4),
                grid.index(2, 5),
                grid.index(3, 3),
                grid.index(3, 4),
                grid.index(3, 5),
            ],
        ];
        let (merged, spills) = resolve_spill_pairs(watersheds, &heights, &grid);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].len(), 15);
        assert_eq!(spills.len(), 1);
        // the merged watershed spills outward onto the boundary ring
        assert!(grid.is_boundary(spills[0].to));
    }
}
