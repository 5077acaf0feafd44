//! Tools to test the model
#![allow(dead_code)]
use alloc::vec::Vec;
use num_traits::Float;
use rustfft::{FftPlanner, num_complex::Complex};

/// Maximum acceptable error between a computed and actual value given fixed and relative
/// tolerances.
///
/// # Args
/// * `a` - First input.
/// * `b` - Second input. The relative tolerance is computed with respect to the maximum of the
///   absolute values of the first and second inputs.
/// * `rtol` - Relative tolerance.
/// * `atol` - Fixed tolerance.
///
/// # Returns
/// Maximum acceptable error.
pub fn max_error<T: Float>(a: T, b: T, rtol: T, atol: T) -> T {
    rtol * a.abs().max(b.abs()) + atol
}

/// Return whether two numbers are within absolute plus relative tolerance
pub fn isclose<T: Float>(a: T, b: T, rtol: T, atol: T) -> bool {
    (a - b).abs() <= max_error(a, b, rtol, atol)
}

/// Return whether all values are close
pub fn allclose<T: Float>(a: &[T], b: &[T], rtol: T, atol: T) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(a, b)| isclose(*a, *b, rtol, atol))
}

/// Power of `x` in the bins covering `[lo, hi)` (units of the sample rate).
///
/// Hann windowed, one sided, not normalized: only ratios between bands
/// of the same record are meaningful.
pub fn band_power(x: &[f64], lo: f64, hi: f64) -> f64 {
    let n = x.len();
    let mut y: Vec<_> = x
        .iter()
        .enumerate()
        .map(|(i, x)| {
            let w = 0.5 - 0.5 * (core::f64::consts::TAU * i as f64 / n as f64).cos();
            Complex { re: x * w, im: 0.0 }
        })
        .collect();
    FftPlanner::new().plan_fft_forward(n).process(&mut y);
    let (lo, hi) = ((lo * n as f64) as usize, (hi * n as f64) as usize);
    y[lo..hi.min(n / 2)].iter().map(|y| y.norm_sqr()).sum()
}
