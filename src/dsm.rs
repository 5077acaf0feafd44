use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::{ConfigurationError, Diagnostic, Process};

/// Feedback reference: the magnitude of a full scale 16 bit sample
pub const FULL_SCALE: i64 = 1 << 15;

/// Default integrator magnitude above which the loop is reported as overflowing
pub const OVERFLOW_BOUND: u64 = (FULL_SCALE as u64) << 8;

/// Modulator loop order
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Serialize,
    Deserialize,
    strum::EnumString,
    strum::AsRefStr,
    strum::IntoStaticStr,
    strum::FromRepr,
)]
#[repr(u8)]
pub enum Order {
    /// Single integrator, first order noise shaping
    #[default]
    First = 1,
    /// Two chained integrators, feedback into the first only
    Second = 2,
}

impl TryFrom<u8> for Order {
    type Error = ConfigurationError;

    fn try_from(order: u8) -> Result<Self, Self::Error> {
        Self::from_repr(order).ok_or(ConfigurationError::Order(order))
    }
}

/// One-bit delta-sigma modulator
///
/// * Input: samples on the 16 bit scale at the bit rate (already oversampled)
/// * Output: one bit per input sample
/// * Integrators start at zero and are neither clamped nor saturated.
///   Input well beyond full scale or a loop that lost stability make them grow
///   without limit. This is observable through [`Dsm::diagnostic()`] but never
///   corrected. They are 128 bit wide: full scale `i32` input into the second
///   order loop takes more than `10^14` samples to exhaust them.
///
/// The second order loop feeds back into the first integrator only.
/// Its noise transfer function has its poles on the unit circle, so the
/// integrators wander far beyond full scale even for moderate input.
///
/// ```
/// # use sdm::{Dsm, Order, Process};
/// let mut d = Dsm::new(Order::First);
/// let bits = d.run(&[16384; 4]);
/// assert_eq!(bits, [false, true, true, true]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dsm {
    order: Order,
    integrator: [i128; 2],
    bound: u64,
    index: usize,
    peak: u128,
    overflow: Option<usize>,
}

impl Dsm {
    /// Zero-initialized modulator with the default overflow bound
    pub fn new(order: Order) -> Self {
        Self {
            order,
            integrator: [0; 2],
            bound: OVERFLOW_BOUND,
            index: 0,
            peak: 0,
            overflow: None,
        }
    }

    /// Set the integrator magnitude bound for overflow reporting
    pub fn with_bound(mut self, bound: u64) -> Self {
        self.bound = bound;
        self
    }

    /// Loop order
    pub fn order(&self) -> Order {
        self.order
    }

    /// Current integrator state (unused integrators are zero)
    pub fn integrators(&self) -> [i128; 2] {
        self.integrator
    }

    /// Number of samples processed since creation or reset
    pub fn len(&self) -> usize {
        self.index
    }

    /// Whether no sample has been processed
    pub fn is_empty(&self) -> bool {
        self.index == 0
    }

    /// Start a new independent run
    pub fn reset(&mut self) {
        *self = Self::new(self.order).with_bound(self.bound);
    }

    /// Accumulator overflow finding of the run, if any.
    pub fn diagnostic(&self) -> Option<Diagnostic> {
        self.overflow.map(|index| Diagnostic::AccumulatorOverflow {
            index,
            magnitude: self.peak,
            bound: self.bound,
        })
    }

    fn check(&mut self) {
        let magnitude = self
            .integrator
            .iter()
            .fold(0, |m, i| m.max(i.unsigned_abs()));
        self.peak = self.peak.max(magnitude);
        if magnitude > u128::from(self.bound) && self.overflow.is_none() {
            log::warn!(
                "{:?} order integrator {magnitude} exceeds {} at sample {}",
                self.order,
                self.bound,
                self.index
            );
            self.overflow = Some(self.index);
        }
    }
}

#[inline]
fn feedback(q: bool) -> i128 {
    let fs = i128::from(FULL_SCALE);
    if q { fs } else { -fs }
}

impl Process<i32, bool> for Dsm {
    /// Ingest input sample, emit new output bit.
    fn process(&mut self, x: i32) -> bool {
        let x = i128::from(x);
        let [i1, i2] = &mut self.integrator;
        let q = match self.order {
            Order::First => {
                let q = *i1 > 0;
                *i1 = i1.wrapping_add(x - feedback(q));
                q
            }
            Order::Second => {
                *i1 = i1.wrapping_add(x - feedback(*i2 > 0));
                *i2 = i2.wrapping_add(*i1);
                *i2 > 0
            }
        };
        self.check();
        self.index += 1;
        q
    }
}

/// Bitstream with the findings of the run that produced it
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modulation {
    /// One bit per input sample
    pub bits: Vec<bool>,
    /// Runtime diagnostics
    pub diagnostics: Vec<Diagnostic>,
}

/// Modulate a sequence with fresh modulator state.
///
/// The input is expected at the bit rate, see [`crate::oversample()`].
pub fn modulate(x: &[i32], order: Order) -> Modulation {
    modulate_bounded(x, order, OVERFLOW_BOUND)
}

/// Modulate with a specific overflow reporting bound
pub fn modulate_bounded(x: &[i32], order: Order, bound: u64) -> Modulation {
    let mut dsm = Dsm::new(order).with_bound(bound);
    let bits = dsm.run(x);
    Modulation {
        bits,
        diagnostics: dsm.diagnostic().into_iter().collect(),
    }
}
