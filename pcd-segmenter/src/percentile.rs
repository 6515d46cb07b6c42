/// Linear-interpolation percentile over an ascending-sorted slice:
/// `rank = p / 100 * (n - 1)`, interpolating between the adjacent values.
///
/// The slice must be non-empty and sorted; callers guard both.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    debug_assert!(!sorted.is_empty());

    let n = sorted.len();
    let rank = p / 100.0 * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = lo + 1;

    if hi >= n {
        return sorted[n - 1];
    }

    let frac = rank - lo as f64;
    sorted[lo] + frac * (sorted[hi] - sorted[lo])
}
