//! Triangle index buffers for tile grids.

use crate::GeometrySettings;

/// Number of indices the skirt adds: two triangles per perimeter edge.
#[must_use]
pub fn num_skirt_elements(settings: &GeometrySettings) -> usize {
    if settings.has_skirt() {
        (settings.tile_size as usize).saturating_sub(1) * 4 * 6
    } else {
        0
    }
}

/// Builds the index buffer for a `tile_size` x `tile_size` grid, followed by
/// the skirt strip when the settings ask for one.
///
/// Surface vertices are row-major. Skirt vertices follow them as
/// (top, bottom) pairs walking the perimeter, and the strip closes back onto
/// its first pair.
#[must_use]
pub fn create_indices(settings: &GeometrySettings) -> Vec<u32> {
    let ts = settings.tile_size.max(2);
    let cells = ((ts - 1) * (ts - 1)) as usize;
    let mut indices = Vec::with_capacity(cells * 6 + num_skirt_elements(settings));

    for j in 0..ts - 1 {
        for i in 0..ts - 1 {
            let i00 = j * ts + i;
            let i01 = i00 + ts;
            let i10 = i00 + 1;
            let i11 = i01 + 1;
            indices.extend_from_slice(&[i01, i00, i11, i00, i10, i11]);
        }
    }

    if settings.has_skirt() {
        let begin = ts * ts;
        let end = begin + (ts - 1) * 8;
        let mut i = begin;
        while i < end - 3 {
            indices.extend_from_slice(&[i, i + 1, i + 2, i + 2, i + 1, i + 3]);
            i += 2;
        }
        indices.extend_from_slice(&[i, i + 1, begin, begin, i + 1, begin + 1]);
    }

    indices
}
