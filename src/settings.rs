use miniconf::Tree;
use serde::{Deserialize, Serialize};

use crate::{ConfigurationError, DemodulatorConfig, Error, OVERFLOW_BOUND, Order, ScoreboardConfig};

/// Conversion chain and verification settings
///
/// Every leaf can be accessed by path, e.g. `/demodulator/taps` or
/// `/scoreboard/tolerance`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Tree)]
#[tree(meta(doc, typename))]
pub struct Settings {
    /// Audio sample rate in Hz
    pub sample_rate: u32,
    /// Modulator bit rate in Hz
    pub bit_rate: u32,
    /// Oversampling factor (bit clocks per audio sample)
    pub factor: u32,
    /// Modulator loop order
    #[tree(with=miniconf::leaf)]
    pub order: Order,
    /// Integrator magnitude beyond which the loop is reported as overflowing
    pub overflow_bound: u64,
    /// Reconstruction filter
    pub demodulator: DemodulatorConfig,
    /// Equivalence comparison
    pub scoreboard: ScoreboardConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            bit_rate: 2_822_400,
            factor: 64,
            order: Order::First,
            overflow_bound: OVERFLOW_BOUND,
            demodulator: DemodulatorConfig::default(),
            scoreboard: ScoreboardConfig::default(),
        }
    }
}

impl Settings {
    /// Check the settings
    ///
    /// A factor inconsistent with the two rates is accepted with a warning:
    /// the modulator path and the demodulator are configured independently.
    pub fn validate(&self) -> Result<(), Error> {
        if self.factor < 1 {
            return Err(Error::InvalidFactor {
                factor: self.factor as _,
            });
        }
        if self.sample_rate == 0 || self.bit_rate % self.sample_rate != 0 {
            return Err(ConfigurationError::Ratio {
                bit_rate: self.bit_rate,
                audio_rate: self.sample_rate,
            }
            .into());
        }
        if self.demodulator.taps == 0 {
            return Err(ConfigurationError::TapCount.into());
        }
        self.scoreboard.validate()?;
        if self.bit_rate / self.sample_rate != self.factor {
            log::warn!(
                "factor {} does not match {} Hz / {} Hz",
                self.factor,
                self.bit_rate,
                self.sample_rate
            );
        }
        Ok(())
    }
}
