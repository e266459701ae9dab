/*
This code is part of the flowshed hydrological analysis library.
Created: 02/05/2025
Last Modified: 18/07/2025
License: MIT
*/
use crate::hydro::spill::SpillPair;
use crate::structures::Grid;

/// Spill height per watershed: the higher of the two spill-pair endpoints.
pub fn spill_heights(spill_pairs: &[SpillPair], heights: &[f64]) -> Vec<f64> {
    spill_pairs
        .iter()
        .map(|p| heights[p.from].max(heights[p.to]))
        .collect()
}

/// The trap of each watershed: its cells at or below the spill height, i.e.
/// the filled interior of the closed depression. Never empty, since the spill
/// pair's `from` cell qualifies. Returns the traps and their sizes.
pub fn all_traps(
    watersheds: &[Vec<usize>],
    spill_heights: &[f64],
    heights: &[f64],
) -> (Vec<Vec<usize>>, Vec<usize>) {
    let traps: Vec<Vec<usize>> = watersheds
        .iter()
        .zip(spill_heights)
        .map(|(cells, &spill)| {
            cells
                .iter()
                .copied()
                .filter(|&ix| heights[ix] <= spill)
                .collect()
        })
        .collect();
    let sizes = traps.iter().map(|t| t.len()).collect();
    (traps, sizes)
}

/// Trap cells with at least one neighbour outside their trap. Inflow from the
/// surrounding terrain can only arrive through these cells.
pub fn trap_boundaries(traps: &[Vec<usize>], grid: &Grid) -> Vec<Vec<usize>> {
    let mut trap_of = vec![-1isize; grid.num_cells()];
    for (k, trap) in traps.iter().enumerate() {
        for &ix in trap {
            trap_of[ix] = k as isize;
        }
    }
    traps
        .iter()
        .enumerate()
        .map(|(k, trap)| {
            trap.iter()
                .copied()
                .filter(|&ix| grid.neighbors(ix).any(|nb| trap_of[nb] != k as isize))
                .collect()
        })
        .collect()
}
