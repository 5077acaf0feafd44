//! Windowed-sinc FIR low-pass design and fixed point coefficient export
use alloc::vec::Vec;
use core::fmt;

use num_complex::Complex;
use num_traits::{AsPrimitive, Float, FloatConst};
use serde::{Deserialize, Serialize};

use crate::{ConfigurationError, Error};

/// Fixed point coefficient scale (Q15)
pub const COEFFICIENT_SCALE: f64 = (1 << 15) as f64;

/// FIR design window
///
/// All windows are symmetric (filter design, not spectral analysis).
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::EnumString,
    strum::AsRefStr,
    strum::IntoStaticStr,
)]
pub enum Window {
    /// No window (truncated sinc)
    Rectangular,
    /// Hamming, `0.54 - 0.46 cos`
    #[default]
    Hamming,
    /// Hann, `0.5 - 0.5 cos`
    Hann,
    /// Blackman, `0.42 - 0.5 cos + 0.08 cos2`
    Blackman,
}

impl Window {
    /// Window weight for tap `n` of a `len` tap filter.
    pub fn weight<T>(&self, n: usize, len: usize) -> T
    where
        T: 'static + Float + FloatConst,
        usize: AsPrimitive<T>,
        f64: AsPrimitive<T>,
    {
        if len < 2 {
            return T::one();
        }
        let x = T::TAU() * n.as_() / (len - 1).as_();
        match self {
            Self::Rectangular => T::one(),
            Self::Hamming => 0.54f64.as_() - 0.46f64.as_() * x.cos(),
            Self::Hann => 0.5f64.as_() - 0.5f64.as_() * x.cos(),
            Self::Blackman => {
                0.42f64.as_() - 0.5f64.as_() * x.cos() + 0.08f64.as_() * (x + x).cos()
            }
        }
    }
}

/// Windowed-sinc low-pass filter design
///
/// The designed taps are normalized to unity DC gain (they sum to one).
///
/// ```
/// # use sdm::Lowpass;
/// let h: Vec<f64> = Lowpass::new(64, 22_050.0, 2_822_400.0).build().unwrap();
/// assert_eq!(h.len(), 64);
/// assert!((h.iter().sum::<f64>() - 1.0).abs() < 1e-9);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Lowpass<T> {
    /// Number of taps
    pub taps: usize,
    /// Cutoff frequency, same units as `sample_rate`
    pub cutoff: T,
    /// Sampling frequency
    pub sample_rate: T,
    /// Design window
    pub window: Window,
}

impl<T> Lowpass<T>
where
    T: 'static + Float + FloatConst + AsPrimitive<f64>,
    usize: AsPrimitive<T>,
    f64: AsPrimitive<T>,
{
    /// Hamming windowed low-pass
    ///
    /// # Arguments
    /// * `taps`: Number of taps
    /// * `cutoff`: Cutoff frequency
    /// * `sample_rate`: Sampling frequency in the same units as `cutoff`
    pub fn new(taps: usize, cutoff: T, sample_rate: T) -> Self {
        Self {
            taps,
            cutoff,
            sample_rate,
            window: Window::default(),
        }
    }

    /// Decimation coefficient table preset: 80 taps, 20 kHz at 2.8224 MHz
    pub fn hardware() -> Self {
        Self::new(80, 20_000f64.as_(), 2_822_400f64.as_())
    }

    /// Select the design window
    pub fn window(mut self, window: Window) -> Self {
        self.window = window;
        self
    }

    /// Check parameters and compute the taps.
    ///
    /// # Errors
    /// [`ConfigurationError`] on zero taps, invalid sampling frequency,
    /// or a cutoff outside `(0, sample_rate/2)`.
    pub fn build(&self) -> Result<Vec<T>, Error> {
        let n = self.taps;
        if n == 0 {
            return Err(ConfigurationError::TapCount.into());
        }
        let fs = self.sample_rate;
        if !(fs.is_finite() && fs > T::zero()) {
            return Err(ConfigurationError::SampleRate(fs.as_()).into());
        }
        let half: T = 0.5f64.as_();
        let nyquist = fs * half;
        if !(self.cutoff > T::zero() && self.cutoff < nyquist) {
            return Err(ConfigurationError::Cutoff {
                cutoff: self.cutoff.as_(),
                nyquist: nyquist.as_(),
            }
            .into());
        }
        // Cutoff relative to Nyquist
        let fc = self.cutoff / nyquist;
        let center = half * (n - 1).as_();
        let mut h: Vec<T> = (0..n)
            .map(|i| {
                let m: T = i.as_();
                let m = m - center;
                fc * sinc(fc * m) * self.window.weight(i, n)
            })
            .collect();
        let dc = h.iter().fold(T::zero(), |s, h| s + *h);
        h.iter_mut().for_each(|h| *h = *h / dc);
        log::debug!(
            "lowpass {n} taps {:?} fc={:.6}",
            self.window,
            AsPrimitive::<f64>::as_(fc)
        );
        Ok(h)
    }
}

fn sinc<T: Float + FloatConst>(x: T) -> T {
    if x == T::zero() {
        T::one()
    } else {
        let x = x * T::PI();
        x.sin() / x
    }
}

/// Complex frequency response of FIR taps
///
/// # Arguments
/// * `taps`: FIR coefficients, oldest first
/// * `frequency`: Frequency to evaluate at
/// * `sample_rate`: Sampling frequency in the same units
pub fn response<T>(taps: &[T], frequency: T, sample_rate: T) -> Complex<T>
where
    T: 'static + Float + FloatConst,
    usize: AsPrimitive<T>,
{
    let w = -T::TAU() * frequency / sample_rate;
    taps.iter()
        .enumerate()
        .fold(Complex::new(T::zero(), T::zero()), |y, (n, h)| {
            y + Complex::from_polar(*h, w * n.as_())
        })
}

/// Encode a coefficient as a Q15 two's complement word.
///
/// The scaled value is truncated toward zero and then wrapped into 16 bits.
/// Note that `1.0` itself is not representable and wraps to `0x8000`.
pub fn quantize<T: AsPrimitive<f64>>(c: T) -> u16 {
    let c = (c.as_() * COEFFICIENT_SCALE) as i64;
    c.rem_euclid(1 << 16) as u16
}

/// Fixed point coefficient table for a hardware coefficient loader
///
/// Maps tap index to Q15 two's complement word.
///
/// ```
/// # use sdm::{CoefficientTable, Lowpass};
/// let h: Vec<f64> = Lowpass::hardware().build().unwrap();
/// let table = CoefficientTable::new(&h);
/// assert_eq!(table.get(0), Some(0x0025));
/// assert!(table.to_string().starts_with("0: 0x0025\n"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoefficientTable {
    words: Vec<u16>,
}

impl CoefficientTable {
    /// Quantize coefficients
    pub fn new<T: AsPrimitive<f64>>(coefficients: &[T]) -> Self {
        Self {
            words: coefficients.iter().map(|c| quantize(*c)).collect(),
        }
    }

    /// Number of taps
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Word for a tap
    pub fn get(&self, tap: usize) -> Option<u16> {
        self.words.get(tap).copied()
    }

    /// All words, tap order
    pub fn words(&self) -> &[u16] {
        &self.words
    }

    /// Signed (truncated, scaled) coefficient values
    pub fn signed(&self) -> impl Iterator<Item = i16> + '_ {
        self.words.iter().map(|w| *w as i16)
    }

    /// `$readmemh` memory image view: four hex digits per line
    pub fn memh(&self) -> Memh<'_> {
        Memh(self)
    }
}

impl fmt::Display for CoefficientTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, w) in self.words.iter().enumerate() {
            writeln!(f, "{i}: {w:#06x}")?;
        }
        Ok(())
    }
}

/// See [`CoefficientTable::memh()`]
#[derive(Copy, Clone, Debug)]
pub struct Memh<'a>(&'a CoefficientTable);

impl fmt::Display for Memh<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for w in self.0.words.iter() {
            writeln!(f, "{w:04x}")?;
        }
        Ok(())
    }
}
