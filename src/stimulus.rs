use core::f64::consts::TAU;
use core::iter::Take;
use num_traits::Float;
use serde::{Deserialize, Serialize};

use crate::AMPLITUDE;

/// Sine tone generator
///
/// Yields `amplitude * sin(2π f n / fs) * 32767` truncated toward zero,
/// starting at phase zero.
///
/// ```
/// # use sdm::Tone;
/// let x: Vec<i32> = Tone::new(0.5, 11_025.0, 44_100.0).take(4).collect();
/// assert_eq!(x, [0, 16383, 0, -16383]);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tone {
    /// Relative amplitude, `1.0` is full scale
    pub amplitude: f64,
    /// Tone frequency
    pub frequency: f64,
    /// Sampling frequency, same units as `frequency`
    pub sample_rate: f64,
    index: u64,
}

impl Tone {
    /// Unbounded tone at a given sample rate
    pub fn new(amplitude: f64, frequency: f64, sample_rate: f64) -> Self {
        Self {
            amplitude,
            frequency,
            sample_rate,
            index: 0,
        }
    }

    /// A whole number of periods with a given number of samples per period
    pub fn periods(
        amplitude: f64,
        frequency: f64,
        periods: usize,
        samples_per_period: usize,
    ) -> Take<Self> {
        Self::new(amplitude, frequency, frequency * samples_per_period as f64)
            .take(periods * samples_per_period)
    }
}

impl Iterator for Tone {
    type Item = i32;

    fn next(&mut self) -> Option<Self::Item> {
        let t = self.index as f64 / self.sample_rate;
        self.index += 1;
        Some((self.amplitude * Float::sin(TAU * self.frequency * t) * AMPLITUDE) as i32)
    }
}
