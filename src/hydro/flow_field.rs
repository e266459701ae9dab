/*
This code is part of the flowshed hydrological analysis library.
Created: 28/03/2025
Last Modified: 09/07/2025
License: MIT
*/
use crate::structures::Grid;
use std::sync::mpsc;
use std::thread;

/// The cell has no downslope neighbour: a local minimum, a flat cell, or a
/// cell whose steepest descent would leave the domain.
pub const NO_FLOW: isize = -1;

/// Domain-boundary ring cells carry no valid flow at all.
pub const BOUNDARY: isize = -2;

/// Computes the steepest-descent target for every interior cell. The entry
/// for cell `i` is the linear index of the neighbour with the greatest
/// positive slope `(h[i] - h[nb]) / distance`, or `NO_FLOW` when no slope is
/// positive. When two neighbours tie, the first in canonical order wins. A
/// chosen target on the boundary ring is rewritten to `NO_FLOW`: the flow
/// would exit the domain and is treated as a pit from there on.
pub fn flow_directions(heights: &[f64], grid: &Grid) -> Vec<isize> {
    let nx = grid.nx();
    let ny = grid.ny();
    let mut flow = vec![BOUNDARY; grid.num_cells()];

    let num_procs = num_cpus::get();
    let (tx, rx) = mpsc::channel();
    thread::scope(|s| {
        for tid in 0..num_procs {
            let tx = tx.clone();
            s.spawn(move || {
                let num_neighbors = grid.num_neighbors();
                let (mut z, mut slope, mut max_slope): (f64, f64, f64);
                let mut target: isize;
                for row in (1..ny - 1).filter(|r| r % num_procs == tid) {
                    let mut data = vec![NO_FLOW; nx];
                    for col in 1..nx - 1 {
                        let ix = row * nx + col;
                        z = heights[ix];
                        max_slope = 0f64;
                        target = NO_FLOW;
                        for k in 0..num_neighbors {
                            let nb = grid.neighbor(ix, k);
                            slope = (z - heights[nb]) / grid.distance(k);
                            if slope > max_slope {
                                max_slope = slope;
                                target = nb as isize;
                            }
                        }
                        if target >= 0 && grid.is_boundary(target as usize) {
                            target = NO_FLOW;
                        }
                        data[col] = target;
                    }
                    tx.send((row, data)).expect("error sending data from thread");
                }
            });
        }
        drop(tx);
    });

    let mut num_pits = 0;
    while let Ok((row, data)) = rx.recv() {
        for col in 1..nx - 1 {
            if data[col] == NO_FLOW {
                num_pits += 1;
            }
            flow[row * nx + col] = data[col];
        }
    }
    log::debug!(
        "flow field: {} interior cells without a downslope neighbour",
        num_pits
    );

    flow
}
