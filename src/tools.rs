use core::ops::{Add, Mul};
use num_traits::Float;

/// Bipolar value of a bit: `0 -> -1`, `1 -> +1`
///
/// A sigma-delta bitstream is physically bipolar. Every linear operation
/// on bits goes through this mapping.
#[inline]
pub fn bipolar<T: Float>(bit: bool) -> T {
    if bit { T::one() } else { -T::one() }
}

// Multiply-accumulate vectors `x` and `a`.
//
// A.k.a. dot product.
// Rust/LLVM optimize this nicely.
pub fn macc<T>(y0: T, x: &[T], a: &[T]) -> T
where
    T: Add<Output = T> + Mul<Output = T> + Copy,
{
    x.iter()
        .zip(a)
        .map(|(x, a)| *x * *a)
        .fold(y0, |y, xa| y + xa)
}

/// Mean of `|a - b|` over the common length.
///
/// Returns `None` if there is nothing to average.
pub fn mean_abs_diff<T: Float>(a: &[T], b: &[T]) -> Option<T> {
    let n = a.len().min(b.len());
    if n == 0 {
        return None;
    }
    let sum = a
        .iter()
        .zip(b)
        .fold(T::zero(), |s, (a, b)| s + (*a - *b).abs());
    T::from(n).map(|n| sum / n)
}
