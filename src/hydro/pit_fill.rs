/*
This code is part of the flowshed hydrological analysis library.
Created: 28/03/2025
Last Modified: 02/07/2025
License: MIT
*/
use crate::error::{validate_raster, AnalysisError};
use std::sync::mpsc;
use std::thread;

/// Raises every strictly interior cell that sits below all eight of its
/// neighbours to the elevation of its lowest neighbour. Pits are detected
/// against the original surface and raised in one batch, so the result does
/// not depend on scan order. Multi-cell depressions are left alone; they are
/// resolved later through spill analysis and flattening. Detection always
/// uses the eight-cell neighbourhood, whatever the flow-routing connectivity.
pub fn fill_single_cell_pits(
    heights: &mut [f64],
    nx: usize,
    ny: usize,
) -> Result<(), AnalysisError> {
    validate_raster(heights, nx, ny)?;

    let num_procs = num_cpus::get();
    let (tx, rx) = mpsc::channel();
    let snapshot: &[f64] = heights;
    thread::scope(|s| {
        for tid in 0..num_procs {
            let tx = tx.clone();
            s.spawn(move || {
                let dx: [isize; 8] = [1, 1, 1, 0, -1, -1, -1, 0];
                let dy: [isize; 8] = [-1, 0, 1, 1, 1, 0, -1, -1];
                for row in (1..ny - 1).filter(|r| r % num_procs == tid) {
                    let mut raised: Vec<(usize, f64)> = vec![];
                    for col in 1..nx - 1 {
                        let z = snapshot[row * nx + col];
                        let mut min_zn = f64::INFINITY;
                        let mut flag = true;
                        for n in 0..8 {
                            let r_n = (row as isize + dy[n]) as usize;
                            let c_n = (col as isize + dx[n]) as usize;
                            let zn = snapshot[r_n * nx + c_n];
                            if zn < min_zn {
                                min_zn = zn;
                            }
                            if zn <= z {
                                flag = false;
                                break;
                            }
                        }
                        if flag {
                            raised.push((row * nx + col, min_zn));
                        }
                    }
                    if !raised.is_empty() {
                        tx.send(raised).expect("error sending data from thread");
                    }
                }
            });
        }
        drop(tx);
    });

    let mut num_filled = 0;
    while let Ok(raised) = rx.recv() {
        for (ix, z) in raised {
            heights[ix] = z;
            num_filled += 1;
        }
    }
    if num_filled > 0 {
        log::debug!("raised {} single-cell pits", num_filled);
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::fill_single_cell_pits;

    #[test]
    fn raises_an_isolated_pit_to_its_lowest_neighbour() {
        let mut heights = vec![5.0; 25];
        heights[12] = 0.0; // centre of a 5 x 5 grid
        heights[13] = 4.0; // lowest neighbour
        fill_single_cell_pits(&mut heights, 5, 5).unwrap();
        assert_eq!(heights[12], 4.0);
    }

    #[test]
    fn leaves_cells_with_a_downslope_neighbour_alone() {
        let mut heights = vec![5.0; 25];
        heights[12] = 3.0;
        heights[13] = 2.0; // already has somewhere to drain
        let before = heights.clone();
        fill_single_cell_pits(&mut heights, 5, 5).unwrap();
        assert_eq!(heights, before);
    }

    #[test]
    fn leaves_multi_cell_depressions_alone() {
        let mut heights = vec![9.0; 36]; // 6 x 6
        heights[14] = 1.0; // (2, 2)
        heights[15] = 1.0; // (2, 3), a two-cell flat-bottomed depression
        let before = heights.clone();
        fill_single_cell_pits(&mut heights, 6, 6).unwrap();
        assert_eq!(heights, before);
    }

    #[test]
    fn raises_equal_pits_simultaneously() {
        // Two pits far enough apart that neither is the other's neighbour;
        // both must be detected against the original surface.
        let mut heights = vec![7.0; 49]; // 7 x 7
        heights[8] = 1.0; // (1, 1)
        heights[40] = 2.0; // (5, 5)
        fill_single_cell_pits(&mut heights, 7, 7).unwrap();
        assert_eq!(heights[8], 7.0);
        assert_eq!(heights[40], 7.0);
    }
}
