use alloc::{vec, vec::Vec};
use num_traits::Float;

use crate::{ConfigurationError, Error, Inplace, Lowpass, Process, tools::macc};

/// Direct form FIR filter
///
/// Causal linear convolution with a delay line of the same length as the
/// coefficients. The delay line starts zeroed.
#[derive(Clone, Debug, PartialEq)]
pub struct Fir<T> {
    taps: Vec<T>,
    // Delay line, stored twice so that the newest `taps.len()` items
    // are always contiguous, newest first, at `pos`.
    x: Vec<T>,
    pos: usize,
}

impl<T: Float> Fir<T> {
    /// Create a new filter
    ///
    /// # Arguments
    /// * `taps`: Impulse response, `taps[0]` applies to the newest input.
    pub fn new(taps: Vec<T>) -> Result<Self, Error> {
        if taps.is_empty() {
            return Err(ConfigurationError::TapCount.into());
        }
        let n = taps.len();
        Ok(Self {
            taps,
            x: vec![T::zero(); 2 * n],
            pos: 0,
        })
    }

    /// Filter coefficients
    pub fn taps(&self) -> &[T] {
        &self.taps
    }

    /// Clear the delay line
    pub fn reset(&mut self) {
        self.x.fill(T::zero());
        self.pos = 0;
    }
}

impl<T: Float> Process<T> for Fir<T> {
    fn process(&mut self, x0: T) -> T {
        let n = self.taps.len();
        self.pos = self.pos.checked_sub(1).unwrap_or(n - 1);
        self.x[self.pos] = x0;
        self.x[self.pos + n] = x0;
        macc(T::zero(), &self.x[self.pos..self.pos + n], &self.taps)
    }
}

impl<T: Float> Inplace<T> for Fir<T> {}

/// Anti-aliasing decimator
///
/// A linear phase low-pass with `20 * rate + 1` Hamming windowed taps and a
/// cutoff at the output Nyquist frequency, evaluated only at the retained
/// positions. The filter delay is compensated: output `k` is centered on
/// input `k * rate`. Input outside the block is taken as zero.
#[derive(Clone, Debug, PartialEq)]
pub struct Decimator {
    taps: Vec<f64>,
    rate: usize,
}

impl Decimator {
    /// Create a new decimator
    ///
    /// # Errors
    /// [`ConfigurationError`] if `rate < 2`.
    pub fn new(rate: usize) -> Result<Self, Error> {
        if rate < 2 {
            return Err(ConfigurationError::Cutoff {
                cutoff: 0.5,
                nyquist: 0.5 * rate as f64,
            }
            .into());
        }
        let taps = Lowpass::new(20 * rate + 1, 0.5, rate as f64).build()?;
        Ok(Self { taps, rate })
    }

    /// Rate change
    pub fn rate(&self) -> usize {
        self.rate
    }

    /// Decimate a block.
    ///
    /// Returns `ceil(x.len() / rate)` items.
    pub fn decimate(&self, x: &[f64]) -> Vec<f64> {
        let half = self.taps.len() / 2;
        (0..x.len().div_ceil(self.rate))
            .map(|k| {
                let c = k * self.rate + half;
                // taps `lo..=hi` overlap the input
                let lo = (c + 1).saturating_sub(x.len());
                let hi = c.min(self.taps.len() - 1);
                self.taps[lo..=hi]
                    .iter()
                    .zip(x[c - hi..=c - lo].iter().rev())
                    .fold(0.0, |y, (h, x)| y + h * x)
            })
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testing::{allclose, isclose};
    use rand::{prelude::*, rngs::StdRng};

    #[test]
    fn impulse() {
        let mut f = Fir::new(vec![0.5, 0.25, -0.125]).unwrap();
        let y = f.run(&[1.0, 0.0, 0.0, 0.0, 2.0]);
        assert_eq!(y, [0.5, 0.25, -0.125, 0.0, 1.0]);
        f.reset();
        assert_eq!(f.process(4.0), 2.0);
        assert!(Fir::<f32>::new(vec![]).is_err());
    }

    #[test]
    fn convolution() {
        let mut rng = StdRng::seed_from_u64(42);
        let h: Vec<f64> = (0..17).map(|_| rng.random_range(-1.0..1.0)).collect();
        let x: Vec<f64> = (0..100).map(|_| rng.random_range(-1.0..1.0)).collect();
        let want: Vec<f64> = (0..x.len())
            .map(|i| (0..h.len().min(i + 1)).map(|j| h[j] * x[i - j]).sum())
            .collect();
        let mut y = x.clone();
        Fir::new(h).unwrap().inplace(&mut y);
        assert!(allclose(&y, &want, 1e-12, 1e-12));
    }

    #[test]
    fn decimate() {
        let d = Decimator::new(4).unwrap();
        assert_eq!(d.rate(), 4);
        assert!(d.decimate(&[]).is_empty());
        assert_eq!(d.decimate(&[1.0; 9]).len(), 3);

        let x = [1.0; 400];
        let y = d.decimate(&x);
        assert_eq!(y.len(), 100);
        // half of the centered response is outside at the edges
        assert!(y[0] > 0.5 && y[0] < 0.75, "{}", y[0]);
        for y in &y[11..89] {
            assert!(isclose(*y, 1.0, 0.0, 1e-12));
        }
        assert!(Decimator::new(1).is_err());
    }

    #[test]
    fn zero_phase() {
        let d = Decimator::new(8).unwrap();
        let mut x = [0.0; 800];
        x[400] = 1.0;
        let y = d.decimate(&x);
        let peak = y
            .iter()
            .enumerate()
            .fold((0, 0.0), |m, (i, y)| if *y > m.1 { (i, *y) } else { m });
        assert_eq!(peak.0, 50);
    }
}
