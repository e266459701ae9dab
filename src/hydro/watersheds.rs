/*
This code is part of the flowshed hydrological analysis library.
Created: 11/04/2025
Last Modified: 09/07/2025
License: MIT
*/

/// Assembles the watershed for each combined minimum as the union of the
/// local watersheds of its member minima. Cell lists stay sorted ascending;
/// the spill engine relies on that order for its deterministic tie-break.
pub fn combine_watersheds(
    local_watersheds: &[Vec<usize>],
    minima: &[usize],
    combined_minima: &[Vec<usize>],
) -> Vec<Vec<usize>> {
    combined_minima
        .iter()
        .map(|group| {
            let mut watershed: Vec<usize> = vec![];
            for &m in group {
                let slot = minima
                    .binary_search(&m)
                    .expect("combined minimum is not a known minimum");
                watershed.extend_from_slice(&local_watersheds[slot]);
            }
            watershed.sort_unstable();
            watershed
        })
        .collect()
}

/// Inverse map from cell index to watershed index; `-1` for cells outside
/// every watershed (the domain-boundary ring).
pub fn map_cells_to_watersheds(watersheds: &[Vec<usize>], num_cells: usize) -> Vec<isize> {
    let mut mapping = vec![-1isize; num_cells];
    for (w, cells) in watersheds.iter().enumerate() {
        for &ix in cells {
            mapping[ix] = w as isize;
        }
    }
    mapping
}
