//! Bitstream equivalence scoreboard
//!
//! Two bitstreams are equivalent if their moving averages agree on average
//! within a tolerance. Individual bits are not compared: two correct
//! modulators may legitimately dither differently.
use alloc::vec::Vec;
use miniconf::Tree;
use serde::{Deserialize, Serialize};

use crate::{ConfigurationError, Diagnostic, Error, Modulation, mean_abs_diff, smooth};

/// Capture termination criterion
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
pub enum Termination {
    /// Capture completes once as many bits as the reference has are captured
    #[default]
    Count,
    /// Capture completes when the stimulus has been driven completely
    Stimulus,
}

/// Scoreboard life cycle
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Waiting for the reference
    #[default]
    Idle,
    /// Accumulating implementation bits
    Capturing,
    /// Both stimulus and capture are complete
    Comparing,
    /// Result available (terminal)
    Reported,
}

/// Comparison settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Tree)]
#[tree(meta(doc, typename))]
pub struct ScoreboardConfig {
    /// Moving average window in bits
    pub window: u32,
    /// Pass threshold for the mean absolute difference of the moving
    /// averages (bipolar units, `[0, 2]`)
    pub tolerance: f64,
    /// Capture termination
    #[tree(with=miniconf::leaf)]
    pub termination: Termination,
}

impl Default for ScoreboardConfig {
    fn default() -> Self {
        Self {
            window: 256,
            tolerance: 0.1,
            termination: Termination::Count,
        }
    }
}

impl ScoreboardConfig {
    /// Check the settings
    pub fn validate(&self) -> Result<(), Error> {
        if self.window == 0 {
            return Err(ConfigurationError::Window.into());
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(ConfigurationError::Tolerance(self.tolerance).into());
        }
        Ok(())
    }
}

/// Scoreboard verdict and supporting data
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// Equivalence verdict
    pub pass: bool,
    /// Mean absolute difference of the smoothed streams.
    ///
    /// Infinite if there was not enough data for a single window.
    pub mean_abs_diff: f64,
    /// Smoothed implementation stream
    pub captured: Vec<f64>,
    /// Smoothed model stream
    pub reference: Vec<f64>,
    /// Number of implementation bits captured
    pub captured_len: usize,
    /// Number of model bits
    pub reference_len: usize,
    /// Findings of the model run and the comparison
    pub diagnostics: Vec<Diagnostic>,
}

/// Compare two bitstreams.
///
/// The longer stream is truncated to the length of the shorter one.
///
/// ```
/// # use sdm::{ScoreboardConfig, compare};
/// let bits: Vec<bool> = (0..1000).map(|i| i % 3 == 0).collect();
/// let r = compare(&bits, &bits, &ScoreboardConfig::default()).unwrap();
/// assert!(r.pass);
/// assert_eq!(r.mean_abs_diff, 0.0);
/// assert_eq!(r.captured.len(), 1000 - 255);
/// ```
pub fn compare(
    captured: &[bool],
    reference: &[bool],
    config: &ScoreboardConfig,
) -> Result<ComparisonResult, Error> {
    config.validate()?;
    let window = config.window as usize;
    let mut diagnostics = Vec::new();
    let len = captured.len().min(reference.len());
    if captured.len() != reference.len() {
        log::warn!(
            "captured {} bits, reference has {}: comparing {len}",
            captured.len(),
            reference.len()
        );
        diagnostics.push(Diagnostic::LengthMismatch {
            captured: captured.len(),
            reference: reference.len(),
        });
    }
    let c = smooth(&captured[..len], window)?;
    let r = smooth(&reference[..len], window)?;
    let mean_abs_diff = match mean_abs_diff(&c, &r) {
        Some(d) => d,
        None => {
            log::warn!("{len} bits are not enough for a {window} bit window");
            diagnostics.push(Diagnostic::InsufficientData { len, window });
            f64::INFINITY
        }
    };
    let pass = mean_abs_diff < config.tolerance;
    log::debug!(
        "mean absolute difference {mean_abs_diff:.4} tolerance {}: {}",
        config.tolerance,
        if pass { "pass" } else { "fail" }
    );
    Ok(ComparisonResult {
        pass,
        mean_abs_diff,
        captured: c,
        reference: r,
        captured_len: captured.len(),
        reference_len: reference.len(),
        diagnostics,
    })
}

/// Equivalence scoreboard
///
/// The drive side and the capture side each signal completion. Comparison
/// starts only after both did.
///
/// ```
/// # use sdm::{Order, Phase, Scoreboard, ScoreboardConfig, modulate};
/// let reference = modulate(&[1000; 512], Order::First);
/// let bits = reference.bits.clone();
/// let mut s = Scoreboard::new(ScoreboardConfig::default()).unwrap();
/// s.start(reference).unwrap();
/// for b in bits {
///     s.capture(b).unwrap();
/// }
/// assert_eq!(s.phase(), Phase::Capturing);
/// s.finish_stimulus().unwrap();
/// assert_eq!(s.phase(), Phase::Comparing);
/// assert!(s.report().unwrap().pass);
/// ```
#[derive(Clone, Debug)]
pub struct Scoreboard {
    config: ScoreboardConfig,
    phase: Phase,
    reference: Vec<bool>,
    captured: Vec<bool>,
    diagnostics: Vec<Diagnostic>,
    stimulus_done: bool,
    capture_done: bool,
    result: Option<ComparisonResult>,
}

impl Scoreboard {
    /// Create an idle scoreboard
    pub fn new(config: ScoreboardConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            config,
            phase: Phase::Idle,
            reference: Vec::new(),
            captured: Vec::new(),
            diagnostics: Vec::new(),
            stimulus_done: false,
            capture_done: false,
            result: None,
        })
    }

    /// Settings
    pub fn config(&self) -> &ScoreboardConfig {
        &self.config
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Number of bits the capture side is expected to deliver
    pub fn expected(&self) -> usize {
        self.reference.len()
    }

    /// Implementation bits captured so far
    pub fn captured(&self) -> &[bool] {
        &self.captured
    }

    fn check(&self, expected: Phase) -> Result<(), Error> {
        if self.phase != expected {
            return Err(Error::Phase {
                expected,
                actual: self.phase,
            });
        }
        Ok(())
    }

    fn join(&mut self) {
        if self.stimulus_done && self.capture_done {
            self.phase = Phase::Comparing;
        }
    }

    /// Record the model output for the stimulus and start capturing.
    ///
    /// The diagnostics of the model run are carried into the result.
    pub fn start(&mut self, reference: Modulation) -> Result<(), Error> {
        self.check(Phase::Idle)?;
        self.reference = reference.bits;
        self.diagnostics = reference.diagnostics;
        self.phase = Phase::Capturing;
        Ok(())
    }

    /// Accumulate an implementation bit.
    ///
    /// Bits beyond the expected count are dropped under [`Termination::Count`].
    pub fn capture(&mut self, bit: bool) -> Result<(), Error> {
        self.check(Phase::Capturing)?;
        if self.capture_done {
            return Ok(());
        }
        self.captured.push(bit);
        if self.config.termination == Termination::Count
            && self.captured.len() >= self.reference.len()
        {
            self.capture_done = true;
            self.join();
        }
        Ok(())
    }

    /// Signal that the stimulus has been driven completely.
    pub fn finish_stimulus(&mut self) -> Result<(), Error> {
        self.check(Phase::Capturing)?;
        self.stimulus_done = true;
        if self.config.termination == Termination::Stimulus {
            self.capture_done = true;
        }
        self.join();
        Ok(())
    }

    /// Signal that no more bits will be captured.
    pub fn finish_capture(&mut self) -> Result<(), Error> {
        self.check(Phase::Capturing)?;
        self.capture_done = true;
        self.join();
        Ok(())
    }

    /// Compare and obtain the result.
    ///
    /// May be called again once reported.
    pub fn report(&mut self) -> Result<&ComparisonResult, Error> {
        if self.phase == Phase::Comparing {
            let mut result = compare(&self.captured, &self.reference, &self.config)?;
            let mut diagnostics = core::mem::take(&mut self.diagnostics);
            diagnostics.append(&mut result.diagnostics);
            result.diagnostics = diagnostics;
            self.result = Some(result);
            self.phase = Phase::Reported;
        }
        self.result.as_ref().ok_or(Error::Phase {
            expected: Phase::Comparing,
            actual: self.phase,
        })
    }
}
