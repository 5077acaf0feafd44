use alloc::vec::Vec;

use crate::{
    CoefficientTable, ComparisonResult, Demodulator, Dut, Error, Harness, Lowpass, ModelDut,
    Modulation, Scoreboard, Settings, modulate_bounded, oversample,
};

/// Golden model of the conversion chain
///
/// ```
/// # use sdm::{Model, Settings, Tone};
/// let mut m = Model::new(Settings::default()).unwrap();
/// let x: Vec<i32> = Tone::new(0.5, 1000.0, 44_100.0).take(441).collect();
/// let bits = m.modulate(&x).unwrap().bits;
/// assert_eq!(bits.len(), 441 * 64);
/// assert_eq!(m.demodulate(&bits).len(), 441);
/// ```
#[derive(Clone, Debug)]
pub struct Model {
    settings: Settings,
    demodulator: Demodulator,
}

impl Model {
    /// Check settings and design the filters
    pub fn new(settings: Settings) -> Result<Self, Error> {
        settings.validate()?;
        let demodulator = Demodulator::new(
            settings.bit_rate,
            settings.sample_rate,
            &settings.demodulator,
        )?;
        Ok(Self {
            settings,
            demodulator,
        })
    }

    /// Settings
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Oversampling factor
    pub fn factor(&self) -> usize {
        self.settings.factor as _
    }

    /// Oversample and modulate audio.
    ///
    /// Every call starts from zeroed integrators.
    pub fn modulate(&self, audio: &[i32]) -> Result<Modulation, Error> {
        let x = oversample(audio, self.factor())?;
        Ok(modulate_bounded(
            &x,
            self.settings.order,
            self.settings.overflow_bound,
        ))
    }

    /// Reconstruct audio from a bitstream
    pub fn demodulate(&mut self, bits: &[bool]) -> Vec<i32> {
        self.demodulator.demodulate(bits)
    }

    /// Idle scoreboard
    pub fn scoreboard(&self) -> Result<Scoreboard, Error> {
        Scoreboard::new(self.settings.scoreboard.clone())
    }

    /// Model backed implementation with a pipeline latency in bit clocks
    pub fn dut(&self, latency: usize) -> Result<ModelDut, Error> {
        ModelDut::new(self.settings.order, self.factor(), latency)
    }

    /// Check an implementation against the model for a stimulus
    pub fn verify<D: Dut>(&self, dut: D, stimulus: &[i32]) -> Result<ComparisonResult, Error> {
        let reference = self.modulate(stimulus)?;
        let mut harness = Harness::new(dut, self.factor(), self.scoreboard()?)?;
        harness.run(stimulus, reference).cloned()
    }

    /// Q15 coefficient table of the hardware decimation filter preset
    pub fn coefficients() -> Result<CoefficientTable, Error> {
        let h: Vec<f64> = Lowpass::hardware().build()?;
        Ok(CoefficientTable::new(&h))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{Diagnostic, FULL_SCALE, Order, Tone, smooth};

    fn tone(len: usize) -> Vec<i32> {
        Tone::new(0.5, 100.0, 44_100.0).take(len).collect()
    }

    #[test]
    fn round_trip() {
        let mut m = Model::new(Settings::default()).unwrap();
        let x = tone(4410);
        let modulation = m.modulate(&x).unwrap();
        assert!(modulation.diagnostics.is_empty());
        let y = m.demodulate(&modulation.bits);
        let e = x.iter().zip(&y).map(|(x, y)| (x - y).abs()).sum::<i32>() / x.len() as i32;
        assert!(e < 500, "{e}");
    }

    #[test]
    fn order_error() {
        let x = tone(4410);
        let ideal: Vec<f64> = oversample(&x, 64)
            .unwrap()
            .windows(256)
            .map(|w| w.iter().sum::<i32>() as f64 / (256 * FULL_SCALE) as f64)
            .collect();
        let error = |order| {
            let m = Model::new(Settings {
                order,
                ..Default::default()
            })
            .unwrap();
            let y = smooth(&m.modulate(&x).unwrap().bits, 256).unwrap();
            crate::mean_abs_diff(&y, &ideal).unwrap()
        };
        let (e1, e2) = (error(Order::First), error(Order::Second));
        log::info!("moving average error {e1} {e2}");
        assert!(e1 < 0.01);
        assert!(e2 <= e1 + Settings::default().scoreboard.tolerance);
    }

    #[test]
    fn overflow_reported() {
        let m = Model::new(Settings {
            order: Order::Second,
            ..Default::default()
        })
        .unwrap();
        let r = m.verify(m.dut(2).unwrap(), &tone(4410)).unwrap();
        assert!(r.pass);
        assert!(matches!(
            r.diagnostics[..],
            [Diagnostic::AccumulatorOverflow { .. }]
        ));
    }

    #[test]
    fn verify() {
        let m = Model::new(Settings::default()).unwrap();
        let x = tone(441);
        let r = m.verify(m.dut(3).unwrap(), &x).unwrap();
        assert!(r.pass);
        assert_eq!(r.captured_len, 441 * 64);

        let m2 = Model::new(Settings {
            factor: 32,
            ..Default::default()
        })
        .unwrap();
        // half as many bits per sample
        let r = m.verify(m2.dut(0).unwrap(), &x).unwrap();
        assert!(!r.pass);
    }

    #[test]
    fn coefficients() {
        let t = Model::coefficients().unwrap();
        assert_eq!(t.len(), 80);
        assert_eq!(t.get(0), Some(0x0025));
    }
}
