/*
This code is part of the flowshed hydrological analysis library.
Created: 28/03/2025
Last Modified: 25/07/2025
License: MIT
*/

//! The hydrological conditioning pipeline over a raster DEM: single-cell pit
//! filling, steepest-descent flow routing, watershed delineation with spill
//! analysis, depression flattening, and upslope flow accumulation with traps
//! collapsed to super-nodes.

pub mod accumulation;
pub mod endpoints;
pub mod flatten;
pub mod flow_field;
pub mod minima;
pub mod network;
pub mod pit_fill;
pub mod spill;
pub mod traps;
pub mod watersheds;

pub use self::network::WatershedNetwork;
pub use self::pit_fill::fill_single_cell_pits;
pub use self::spill::SpillPair;
pub use self::traps::{all_traps, spill_heights, trap_boundaries};

use crate::error::{validate_raster, AnalysisError};
use crate::structures::{Grid, NeighborMode};

/// The watershed structure of a surface: the watershed partition of the
/// interior, one spill pair per watershed, and the flow field the partition
/// was derived from.
#[derive(Clone, Debug)]
pub struct WatershedAnalysis {
    /// Cell sets, ascending within each watershed. Together they cover every
    /// interior cell exactly once.
    pub watersheds: Vec<Vec<usize>>,
    /// One spill pair per watershed, aligned with `watersheds`.
    pub spill_pairs: Vec<SpillPair>,
    /// Steepest-descent target per cell; see `flow_field` for the sentinels.
    pub flow: Vec<isize>,
}

/// Delineates the watersheds of a surface and resolves their spill geometry.
/// Single-cell pits should be filled first (`fill_single_cell_pits`); an
/// unfilled pit simply shows up as its own small watershed.
pub fn compute_watersheds(
    heights: &[f64],
    nx: usize,
    ny: usize,
    step: f64,
    mode: NeighborMode,
) -> Result<WatershedAnalysis, AnalysisError> {
    validate_raster(heights, nx, ny)?;
    let grid = Grid::new(nx, ny, step, mode)?;
    Ok(watershed_pipeline(heights, &grid))
}

/// Fills every depression: raises single-cell pits, then lifts each
/// watershed's trap to its spill height. Afterwards every interior cell
/// either has a downslope neighbour or sits on a flattened lake at its
/// outflow level, and running the operation again changes nothing.
pub fn make_depressionless(
    heights: &mut [f64],
    nx: usize,
    ny: usize,
    step: f64,
    mode: NeighborMode,
) -> Result<(), AnalysisError> {
    validate_raster(heights, nx, ny)?;
    let grid = Grid::new(nx, ny, step, mode)?;
    fill_single_cell_pits(heights, nx, ny)?;
    let analysis = watershed_pipeline(heights, &grid);
    let heights_of_spill = spill_heights(&analysis.spill_pairs, heights);
    let (trap_sets, _sizes) = all_traps(&analysis.watersheds, &heights_of_spill, heights);
    flatten::flatten_traps(heights, &trap_sets, &heights_of_spill);
    Ok(())
}

/// Computes the accumulated upslope count for every cell: the number of
/// interior cells whose drainage path passes through it, with every lake
/// cell reporting its whole trap's accumulation. The input surface is left
/// untouched; conditioning happens on an internal copy.
pub fn accumulate_flow(
    heights: &[f64],
    nx: usize,
    ny: usize,
    step: f64,
    mode: NeighborMode,
) -> Result<Vec<i64>, AnalysisError> {
    validate_raster(heights, nx, ny)?;
    let grid = Grid::new(nx, ny, step, mode)?;

    let mut surface = heights.to_vec();
    fill_single_cell_pits(&mut surface, nx, ny)?;
    let analysis = watershed_pipeline(&surface, &grid);
    let heights_of_spill = spill_heights(&analysis.spill_pairs, &surface);
    let (trap_sets, trap_sizes) = all_traps(&analysis.watersheds, &heights_of_spill, &surface);
    flatten::flatten_traps(&mut surface, &trap_sets, &heights_of_spill);

    // route flow over the conditioned surface; trap outflow is severed in
    // the accumulator, super-nodes drain the lakes instead
    let flow = flow_field::flow_directions(&surface, &grid);
    Ok(accumulation::accumulate(
        &flow,
        &trap_sets,
        &trap_sizes,
        &analysis.spill_pairs,
        &grid,
    ))
}

fn watershed_pipeline(heights: &[f64], grid: &Grid) -> WatershedAnalysis {
    let flow = flow_field::flow_directions(heights, grid);
    let node_endpoints = endpoints::node_endpoints(&flow, grid);
    let (minima_cells, local) = endpoints::local_watersheds(&node_endpoints);
    let combined = minima::combine_minima(&minima_cells, grid);
    let assembled = watersheds::combine_watersheds(&local, &minima_cells, &combined);
    let (final_watersheds, spill_pairs) = spill::resolve_spill_pairs(assembled, heights, grid);
    log::debug!(
        "delineated {} watersheds from {} minima",
        final_watersheds.len(),
        minima_cells.len()
    );
    WatershedAnalysis {
        watersheds: final_watersheds,
        spill_pairs,
        flow,
    }
}
