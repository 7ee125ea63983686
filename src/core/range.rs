/// Length of the intersection of two closed ranges, 0 when disjoint
///
/// Both ranges must be given as `(low, high)` with `low <= high`.
#[inline]
pub fn overlap_length(a: (f64, f64), b: (f64, f64)) -> f64 {
    (a.1.min(b.1) - a.0.max(b.0)).max(0.0)
}

/// Share of the candidate's raise covered by the investor's check range, in [0, 1]
///
/// A zero-width raise counts as fully covered when the single amount lies
/// inside the check range.
#[inline]
pub fn coverage_ratio(raise: (f64, f64), check: (f64, f64)) -> f64 {
    let width = raise.1 - raise.0;
    if width <= 0.0 {
        return if raise.0 >= check.0 && raise.0 <= check.1 { 1.0 } else { 0.0 };
    }

    (overlap_length(raise, check) / width).clamp(0.0, 1.0)
}
