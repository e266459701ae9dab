/*
This code is part of the flowshed hydrological analysis library.
Created: 14/03/2025
Last Modified: 14/03/2025
License: MIT
*/
use thiserror::Error;

/// Classified failures surfaced by the public operations. Nothing is retried;
/// a raster is either usable or rejected up front.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// The grid carries no interior cells.
    #[error("grid must be at least 3 x 3 to have an interior (got {nx} x {ny})")]
    GridTooSmall { nx: usize, ny: usize },

    /// The height buffer does not match the stated grid dimensions.
    #[error("height raster has {len} cells but the grid is {nx} x {ny}")]
    RasterSizeMismatch { nx: usize, ny: usize, len: usize },

    /// NaN or infinite elevations cannot be routed.
    #[error("non-finite height at cell {index}")]
    NonFiniteHeight { index: usize },
}

/// Up-front validation shared by every public operation.
pub(crate) fn validate_raster(
    heights: &[f64],
    nx: usize,
    ny: usize,
) -> Result<(), AnalysisError> {
    if nx < 3 || ny < 3 {
        return Err(AnalysisError::GridTooSmall { nx, ny });
    }
    if heights.len() != nx * ny {
        return Err(AnalysisError::RasterSizeMismatch {
            nx,
            ny,
            len: heights.len(),
        });
    }
    for (index, z) in heights.iter().enumerate() {
        if !z.is_finite() {
            return Err(AnalysisError::NonFiniteHeight { index });
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::{validate_raster, AnalysisError};

    #[test]
    fn rejects_grids_without_an_interior() {
        let heights = vec![0f64; 10];
        assert_eq!(
            validate_raster(&heights, 5, 2),
            Err(AnalysisError::GridTooSmall { nx: 5, ny: 2 })
        );
    }

    #[test]
    fn rejects_mismatched_buffers() {
        let heights = vec![0f64; 10];
        assert_eq!(
            validate_raster(&heights, 4, 4),
            Err(AnalysisError::RasterSizeMismatch {
                nx: 4,
                ny: 4,
                len: 10
            })
        );
    }

    #[test]
    fn rejects_non_finite_heights() {
        let mut heights = vec![0f64; 16];
        heights[5] = f64::NAN;
        assert_eq!(
            validate_raster(&heights, 4, 4),
            Err(AnalysisError::NonFiniteHeight { index: 5 })
        );
    }
}
