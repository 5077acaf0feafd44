//! Sequential drive and capture against an implementation under test
use alloc::collections::VecDeque;

use crate::{ComparisonResult, Dsm, Error, Hold, Modulation, Order, Phase, Process, Scoreboard};

/// Implementation under test
///
/// The harness presents one audio sample, then advances `factor` bit clocks,
/// sampling the `(data, valid)` output pair once per clock.
pub trait Dut {
    /// Present the next audio sample
    fn drive(&mut self, x: i32);

    /// Advance one bit clock and sample `(data, valid)`
    fn clock(&mut self) -> (bool, bool);
}

impl<T: Dut> Dut for &mut T {
    fn drive(&mut self, x: i32) {
        (*self).drive(x)
    }

    fn clock(&mut self) -> (bool, bool) {
        (*self).clock()
    }
}

/// Output monitor
///
/// Inactive until the first rising edge of `valid`, then yields `data` on
/// every clock where `valid` is high.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Monitor {
    armed: bool,
    valid: bool,
}

impl Monitor {
    /// Whether the first rising edge of `valid` has been seen
    pub fn is_armed(&self) -> bool {
        self.armed
    }
}

impl Process<(bool, bool), Option<bool>> for Monitor {
    fn process(&mut self, (data, valid): (bool, bool)) -> Option<bool> {
        self.armed |= valid && !self.valid;
        self.valid = valid;
        (self.armed && valid).then_some(data)
    }
}

/// Model backed implementation
///
/// Zero-order hold and modulator followed by a pipeline delay of `latency`
/// bit clocks. `valid` is low while the pipeline holds no modulator output.
#[derive(Clone, Debug)]
pub struct ModelDut {
    hold: Hold<i32>,
    dsm: Dsm,
    pending: Option<i32>,
    pipeline: VecDeque<Option<bool>>,
    latency: usize,
}

impl ModelDut {
    /// Create a new model implementation
    pub fn new(order: Order, factor: usize, latency: usize) -> Result<Self, Error> {
        Ok(Self {
            hold: Hold::new(factor)?,
            dsm: Dsm::new(order),
            pending: None,
            pipeline: VecDeque::with_capacity(latency + 1),
            latency,
        })
    }

    /// The modulator
    pub fn dsm(&self) -> &Dsm {
        &self.dsm
    }
}

impl Dut for ModelDut {
    fn drive(&mut self, x: i32) {
        self.pending = Some(x);
    }

    fn clock(&mut self) -> (bool, bool) {
        let q = self
            .hold
            .update(self.pending.take())
            .map(|x| self.dsm.process(x));
        self.pipeline.push_back(q);
        let q = if self.pipeline.len() > self.latency {
            self.pipeline.pop_front().flatten()
        } else {
            None
        };
        (q.unwrap_or_default(), q.is_some())
    }
}

/// Verification run
///
/// Drive and capture are interleaved on a single thread. After the stimulus
/// has been driven completely the implementation is clocked further, for up
/// to `drain` clocks, until the scoreboard has captured enough.
#[derive(Debug)]
pub struct Harness<D> {
    dut: D,
    factor: usize,
    drain: usize,
    monitor: Monitor,
    scoreboard: Scoreboard,
}

impl<D: Dut> Harness<D> {
    /// Create a new harness
    ///
    /// # Arguments
    /// * `dut`: Implementation under test
    /// * `factor`: Bit clocks per audio sample
    /// * `scoreboard`: Idle scoreboard
    pub fn new(dut: D, factor: usize, scoreboard: Scoreboard) -> Result<Self, Error> {
        if factor < 1 {
            return Err(Error::InvalidFactor { factor });
        }
        Ok(Self {
            dut,
            factor,
            drain: 16 * factor,
            monitor: Monitor::default(),
            scoreboard,
        })
    }

    /// Maximum number of clocks after the stimulus
    pub fn with_drain(mut self, drain: usize) -> Self {
        self.drain = drain;
        self
    }

    /// Implementation under test
    pub fn dut(&self) -> &D {
        &self.dut
    }

    /// The scoreboard
    pub fn scoreboard(&self) -> &Scoreboard {
        &self.scoreboard
    }

    fn clock(&mut self) -> Result<(), Error> {
        if let Some(bit) = self.monitor.process(self.dut.clock()) {
            self.scoreboard.capture(bit)?;
        }
        Ok(())
    }

    /// Drive the stimulus, capture the implementation output and compare it
    /// against the model output for the same stimulus.
    pub fn run(
        &mut self,
        stimulus: &[i32],
        reference: Modulation,
    ) -> Result<&ComparisonResult, Error> {
        self.scoreboard.start(reference)?;
        for x in stimulus.iter() {
            self.dut.drive(*x);
            for _ in 0..self.factor {
                self.clock()?;
            }
        }
        self.scoreboard.finish_stimulus()?;
        for _ in 0..self.drain {
            if self.scoreboard.phase() != Phase::Capturing {
                break;
            }
            self.clock()?;
        }
        if self.scoreboard.phase() == Phase::Capturing {
            log::warn!(
                "capture incomplete after {} drain clocks: {} of {} bits",
                self.drain,
                self.scoreboard.captured().len(),
                self.scoreboard.expected()
            );
            self.scoreboard.finish_capture()?;
        }
        self.scoreboard.report()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{Diagnostic, ScoreboardConfig, Termination, Tone, modulate, oversample};
    use alloc::vec::Vec;

    fn stimulus() -> (Vec<i32>, Modulation) {
        let x: Vec<i32> = Tone::new(0.5, 100.0, 44_100.0).take(441).collect();
        let m = modulate(&oversample(&x, 64).unwrap(), Order::First);
        (x, m)
    }

    fn scoreboard() -> Scoreboard {
        Scoreboard::new(ScoreboardConfig::default()).unwrap()
    }

    /// Inverts the output of another implementation
    struct Inverted<D>(D);

    impl<D: Dut> Dut for Inverted<D> {
        fn drive(&mut self, x: i32) {
            self.0.drive(x)
        }

        fn clock(&mut self) -> (bool, bool) {
            let (data, valid) = self.0.clock();
            (!data, valid)
        }
    }

    /// Never asserts valid
    struct Stuck;

    impl Dut for Stuck {
        fn drive(&mut self, _x: i32) {}

        fn clock(&mut self) -> (bool, bool) {
            (true, false)
        }
    }

    #[test]
    fn monitor() {
        let mut m = Monitor::default();
        let timeline = [
            (true, false),
            (true, false),
            (false, true),
            (true, true),
            (true, false),
            (false, true),
        ];
        let y = m.run(&timeline);
        assert_eq!(y, [None, None, Some(false), Some(true), None, Some(false)]);
        assert!(m.is_armed());
        assert_eq!(Monitor::default().process((true, true)), Some(true));
    }

    #[test]
    fn latency() {
        let mut dut = ModelDut::new(Order::First, 2, 3).unwrap();
        dut.drive(20000);
        let y: Vec<_> = (0..6).map(|_| dut.clock()).collect();
        assert_eq!(
            y,
            [
                (false, false),
                (false, false),
                (false, false),
                (false, true),
                (true, true),
                (false, false)
            ]
        );
        assert_eq!(dut.dsm().len(), 2);
    }

    #[test]
    fn model_equivalent() {
        let (x, m) = stimulus();
        let n = m.bits.len();
        let dut = ModelDut::new(Order::First, 64, 5).unwrap();
        let mut h = Harness::new(dut, 64, scoreboard()).unwrap();
        let r = h.run(&x, m).unwrap();
        assert!(r.pass);
        assert_eq!(r.mean_abs_diff, 0.0);
        assert_eq!((r.captured_len, r.reference_len), (n, n));
        assert!(r.diagnostics.is_empty());
        assert_eq!(h.scoreboard().phase(), Phase::Reported);
        assert_eq!(h.dut().dsm().len(), n);
        let (x, m) = stimulus();
        assert!(h.run(&x, m).is_err());
    }

    #[test]
    fn inverted() {
        let (x, m) = stimulus();
        let dut = Inverted(ModelDut::new(Order::First, 64, 0).unwrap());
        let mut h = Harness::new(dut, 64, scoreboard()).unwrap();
        let r = h.run(&x, m).unwrap();
        assert!(!r.pass);
        assert!(r.diagnostics.is_empty());
    }

    #[test]
    fn second_order() {
        let (x, m) = stimulus();
        let mut dut = ModelDut::new(Order::Second, 64, 1).unwrap();
        let r = Harness::new(&mut dut, 64, scoreboard())
            .unwrap()
            .run(&x, m)
            .unwrap()
            .clone();
        assert!(r.pass);
        assert!(r.mean_abs_diff > 0.0);
        assert_eq!(dut.dsm().order(), Order::Second);
    }

    #[test]
    fn stuck() {
        let (x, m) = stimulus();
        let n = m.bits.len();
        let mut h = Harness::new(Stuck, 64, scoreboard()).unwrap().with_drain(10);
        let r = h.run(&x, m).unwrap();
        assert!(!r.pass);
        assert_eq!(
            r.diagnostics,
            [
                Diagnostic::LengthMismatch {
                    captured: 0,
                    reference: n
                },
                Diagnostic::InsufficientData {
                    len: 0,
                    window: 256
                }
            ]
        );
    }

    #[test]
    fn stimulus_termination() {
        let (x, m) = stimulus();
        let n = m.bits.len();
        let config = ScoreboardConfig {
            termination: Termination::Stimulus,
            ..Default::default()
        };
        let dut = ModelDut::new(Order::First, 64, 7).unwrap();
        let mut h = Harness::new(dut, 64, Scoreboard::new(config).unwrap()).unwrap();
        let r = h.run(&x, m).unwrap();
        assert!(r.pass);
        assert_eq!(
            r.diagnostics,
            [Diagnostic::LengthMismatch {
                captured: n - 7,
                reference: n
            }]
        );
    }

    #[test]
    fn invalid() {
        let dut = ModelDut::new(Order::First, 64, 0).unwrap();
        assert!(Harness::new(dut, 0, scoreboard()).is_err());
        assert!(ModelDut::new(Order::First, 0, 0).is_err());
    }
}
