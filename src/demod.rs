use alloc::vec::Vec;
use miniconf::Tree;
use num_traits::Float;
use serde::{Deserialize, Serialize};

use crate::{ConfigurationError, Decimator, Error, Fir, Inplace, Lowpass, Window, bipolar};

/// Magnitude of a full scale reconstructed sample
pub const AMPLITUDE: f64 = 32767.0;

/// Reconstruction filter settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Tree)]
#[tree(meta(doc, typename))]
pub struct DemodulatorConfig {
    /// Low-pass filter taps
    pub taps: u32,
    /// Low-pass filter design window
    #[tree(with=miniconf::leaf)]
    pub window: Window,
}

impl Default for DemodulatorConfig {
    fn default() -> Self {
        Self {
            taps: 64,
            window: Window::Hamming,
        }
    }
}

/// Sigma-delta demodulator
///
/// 1. Bits are mapped to `±1`.
/// 2. A causal low-pass at half the audio rate removes the shaped
///    quantization noise.
/// 3. The result is decimated to the audio rate by a zero-phase anti-alias
///    filter (see [`Decimator`]).
/// 4. Output is clipped to `[-1, 1]` and scaled to `±32767`, rounding to
///    nearest.
///
/// ```
/// # use sdm::{Demodulator, DemodulatorConfig};
/// let mut d = Demodulator::new(2_822_400, 44_100, &DemodulatorConfig::default()).unwrap();
/// assert_eq!(d.rate(), 64);
/// let y = d.demodulate(&[true; 64 * 100]);
/// assert_eq!(y.len(), 100);
/// assert_eq!(y[50], 32767);
/// ```
#[derive(Clone, Debug)]
pub struct Demodulator {
    lowpass: Fir<f64>,
    decimator: Decimator,
}

impl Demodulator {
    /// Design the filters.
    ///
    /// # Arguments
    /// * `bit_rate`: Input bit rate
    /// * `audio_rate`: Output sample rate, `bit_rate` must be an integer multiple
    /// * `config`: Low-pass settings
    pub fn new(bit_rate: u32, audio_rate: u32, config: &DemodulatorConfig) -> Result<Self, Error> {
        if audio_rate == 0 || bit_rate % audio_rate != 0 {
            return Err(ConfigurationError::Ratio {
                bit_rate,
                audio_rate,
            }
            .into());
        }
        let rate = (bit_rate / audio_rate) as usize;
        let taps = Lowpass::new(
            config.taps as usize,
            audio_rate as f64 * 0.5,
            bit_rate as f64,
        )
        .window(config.window)
        .build()?;
        log::debug!("demodulator {bit_rate}/{audio_rate}: decimation {rate}");
        Ok(Self {
            lowpass: Fir::new(taps)?,
            decimator: Decimator::new(rate)?,
        })
    }

    /// Decimation ratio
    pub fn rate(&self) -> usize {
        self.decimator.rate()
    }

    /// Reconstruct audio from a bitstream.
    ///
    /// Each call is an independent run starting from a zeroed delay line.
    /// Returns `ceil(bits.len() / rate)` samples.
    pub fn demodulate(&mut self, bits: &[bool]) -> Vec<i32> {
        self.lowpass.reset();
        let mut y: Vec<f64> = bits.iter().map(|b| bipolar(*b)).collect();
        self.lowpass.inplace(&mut y);
        self.decimator
            .decimate(&y)
            .into_iter()
            .map(|y| Float::round(y.clamp(-1.0, 1.0) * AMPLITUDE) as i32)
            .collect()
    }
}

/// Demodulate with the default filter settings.
pub fn demodulate(bits: &[bool], bit_rate: u32, audio_rate: u32) -> Result<Vec<i32>, Error> {
    Ok(Demodulator::new(bit_rate, audio_rate, &DemodulatorConfig::default())?.demodulate(bits))
}
