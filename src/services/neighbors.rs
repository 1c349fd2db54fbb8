use std::cmp::Ordering;

use crate::store::EmbeddingMatrix;

/// Euclidean (L2) distance between two vectors of equal length
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum::<f32>()
        .sqrt()
}

/// Exact K-nearest-neighbor search over the rows of `y`
///
/// Returns up to `k` row indices ordered nearest first. Ties are broken by
/// ascending row index and NaN distances sort after every other distance.
/// When `k` exceeds the row count every row is returned, fully sorted.
pub fn find_nearest(x: &[f32], y: &EmbeddingMatrix, k: usize) -> Vec<usize> {
    let mut scored: Vec<(usize, f32)> = y
        .iter_rows()
        .enumerate()
        .map(|(index, row)| (index, euclidean_distance(x, row)))
        .collect();

    scored.sort_by(nearest_first);
    scored.truncate(k);
    scored.into_iter().map(|(index, _)| index).collect()
}

/// Orders `(index, distance)` pairs by distance, then by index
fn nearest_first(a: &(usize, f32), b: &(usize, f32)) -> Ordering {
    a.1.is_nan()
        .cmp(&b.1.is_nan())
        .then_with(|| a.1.total_cmp(&b.1))
        .then_with(|| a.0.cmp(&b.0))
}
