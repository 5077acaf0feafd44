use alloc::{vec, vec::Vec};

use crate::{ConfigurationError, Error, Process};

/// Boxcar moving average of a bitstream
///
/// Emits the bipolar mean `2 * ones / window - 1` of the last `window` bits,
/// once the window has been filled ("valid" convolution).
/// Counting is exact: there is no drift over long runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Boxcar {
    bits: Vec<bool>,
    pos: usize,
    fill: usize,
    ones: usize,
}

impl Boxcar {
    /// Create a new boxcar
    ///
    /// # Errors
    /// [`ConfigurationError::Window`] if `window == 0`.
    pub fn new(window: usize) -> Result<Self, Error> {
        if window == 0 {
            return Err(ConfigurationError::Window.into());
        }
        Ok(Self {
            bits: vec![false; window],
            pos: 0,
            fill: 0,
            ones: 0,
        })
    }

    /// Averaging window length
    pub fn window(&self) -> usize {
        self.bits.len()
    }
}

impl Process<bool, Option<f64>> for Boxcar {
    fn process(&mut self, x: bool) -> Option<f64> {
        let old = core::mem::replace(&mut self.bits[self.pos], x);
        self.pos = (self.pos + 1) % self.bits.len();
        if self.fill < self.bits.len() {
            self.fill += 1;
        } else {
            self.ones -= old as usize;
        }
        self.ones += x as usize;
        (self.fill == self.bits.len())
            .then(|| 2.0 * self.ones as f64 / self.bits.len() as f64 - 1.0)
    }
}

/// Smooth a bitstream with a boxcar moving average.
///
/// The result has `bits.len() - window + 1` items (none if `bits` is shorter
/// than `window`).
///
/// ```
/// # use sdm::smooth;
/// let y = smooth(&[true, true, false, true, false, false], 4).unwrap();
/// assert_eq!(y, [0.5, 0.0, -0.5]);
/// ```
pub fn smooth(bits: &[bool], window: usize) -> Result<Vec<f64>, Error> {
    let mut boxcar = Boxcar::new(window)?;
    Ok(bits.iter().filter_map(|b| boxcar.process(*b)).collect())
}
