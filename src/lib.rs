/*
This code is part of the flowshed hydrological analysis library.
Created: 14/03/2025
Last Modified: 25/07/2025
License: MIT
*/

//! flowshed computes a hydrologically conditioned flow structure over a
//! raster digital elevation model: it partitions the grid into watersheds,
//! fills depressions to produce a drainage surface with no closed sinks,
//! determines the spill geometry between depressions, routes flow through
//! trap interiors, and computes the accumulated upslope contributing area
//! at every cell.
//!
//! Loading a DEM and rendering the results are left to the caller; the
//! library works on a plain row-major `&[f64]` height buffer with its grid
//! dimensions, cell spacing, and a D4/D8 connectivity flag.
//!
//! The typical workflow mirrors the pipeline:
//!
//! ```
//! use flowshed::{accumulate_flow, NeighborMode};
//!
//! // a 5 x 5 tilted plane draining south
//! let heights: Vec<f64> = (0..25).map(|i| 10.0 - (i / 5) as f64).collect();
//! let upslope = accumulate_flow(&heights, 5, 5, 1.0, NeighborMode::D8)?;
//! assert_eq!(upslope.len(), 25);
//! # Ok::<(), flowshed::AnalysisError>(())
//! ```

pub mod error;
pub mod hydro;
pub mod structures;

pub use crate::error::AnalysisError;
pub use crate::hydro::{
    accumulate_flow, all_traps, compute_watersheds, fill_single_cell_pits, make_depressionless,
    spill_heights, trap_boundaries, SpillPair, WatershedAnalysis, WatershedNetwork,
};
pub use crate::structures::{FlowGraph, Grid, NeighborMode};
