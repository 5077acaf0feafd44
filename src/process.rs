//! Sample processing
//!
//! Every stateful stage of the chain (modulator, FIR, moving average, monitor)
//! is a [`Process`]: it owns its state and maps one input item to one output item.
//! Rate changing stages (hold, decimator) are built on top of these.
use alloc::vec::Vec;

/// Processing block
///
/// Single input, single output.
///
/// Implementors own their state exclusively. A processor must not be shared
/// between independent runs; reset it or create a fresh one instead.
pub trait Process<X: Copy, Y = X> {
    /// Update the state with a new input and obtain an output
    fn process(&mut self, x: X) -> Y;

    /// Process a sequence into a new owned sequence of the same length
    fn run(&mut self, x: &[X]) -> Vec<Y> {
        x.iter().map(|x| self.process(*x)).collect()
    }
}

/// Process a block in place.
pub trait Inplace<X: Copy>: Process<X> {
    /// Process an input block into the same data as output
    fn inplace(&mut self, xy: &mut [X]) {
        for xy in xy.iter_mut() {
            *xy = self.process(*xy);
        }
    }
}
