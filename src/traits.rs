use num_traits::Float;

// ===== Float comparison helpers =====

/// Difference between two estimates, relative to their magnitude.
///
/// Magnitudes below one are treated as one, so values that are both close to zero
/// compare by absolute difference.
pub fn relative_difference<T: Float>(a: T, b: T) -> T {
    let scale = T::one().max(a.abs()).max(b.abs());
    (a - b).abs() / scale
}

/// True when `a` and `b` agree within `tolerance` in the sense of [`relative_difference`]
#[inline]
pub fn approx_eq<T: Float>(a: T, b: T, tolerance: T) -> bool {
    relative_difference(a, b) <= tolerance
}
