use alloc::vec::Vec;
use core::iter::{Repeat, Take, repeat};

use crate::Error;

/// Zero-order hold interpolator
///
/// Every low-rate sample is emitted `factor` times. There is no anti-alias
/// filtering: noise shaping is entirely left to the modulator loop.
#[derive(Clone, Debug)]
pub struct Hold<T> {
    factor: usize,
    up: Take<Repeat<T>>,
}

impl<T: Copy + Default> Hold<T> {
    /// Create a new hold with the given rate change.
    ///
    /// # Errors
    /// [`Error::InvalidFactor`] if `factor < 1`.
    pub fn new(factor: usize) -> Result<Self, Error> {
        if factor < 1 {
            return Err(Error::InvalidFactor { factor });
        }
        Ok(Self {
            factor,
            up: repeat(T::default()).take(0),
        })
    }

    /// Rate change
    pub fn factor(&self) -> usize {
        self.factor
    }

    /// Optionally ingest a new low-rate sample and retrieve the next output.
    ///
    /// A new sample replaces whatever remained of the previous one.
    /// Returns `None` once the current sample has been emitted `factor` times
    /// and no new one was supplied.
    pub fn update(&mut self, x: Option<T>) -> Option<T> {
        if let Some(x) = x {
            self.up = repeat(x).take(self.factor);
        }
        self.up.next()
    }
}

/// Oversample by zero-order hold.
///
/// The output has `x.len() * factor` items.
///
/// ```
/// # use sdm::oversample;
/// assert_eq!(oversample(&[1, -2], 3).unwrap(), [1, 1, 1, -2, -2, -2]);
/// ```
///
/// # Errors
/// [`Error::InvalidFactor`] if `factor < 1`.
pub fn oversample<T: Copy>(x: &[T], factor: usize) -> Result<Vec<T>, Error> {
    if factor < 1 {
        return Err(Error::InvalidFactor { factor });
    }
    Ok(x.iter().flat_map(|x| repeat(*x).take(factor)).collect())
}

#[cfg(test)]
mod test {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[quickcheck]
    fn length(x: Vec<i16>, factor: u8) -> bool {
        let factor = factor as usize + 1;
        let y = oversample(&x, factor).unwrap();
        y.len() == x.len() * factor
            && y.chunks_exact(factor)
                .zip(&x)
                .all(|(c, x)| c.iter().all(|c| c == x))
    }

    #[test]
    fn invalid() {
        assert_eq!(
            oversample(&[1], 0).unwrap_err(),
            Error::InvalidFactor { factor: 0 }
        );
        assert!(Hold::<i32>::new(0).is_err());
        assert!(oversample::<i32>(&[], 64).unwrap().is_empty());
    }

    #[test]
    fn hold() {
        let mut h = Hold::new(3).unwrap();
        assert_eq!(h.update(None), None);
        assert_eq!(h.update(Some(7)), Some(7));
        assert_eq!(h.update(None), Some(7));
        assert_eq!(h.update(None), Some(7));
        assert_eq!(h.update(None), None);
        assert_eq!(h.update(Some(-1)), Some(-1));
        assert_eq!(h.update(Some(2)), Some(2));
        assert_eq!(h.factor(), 3);
    }
}
