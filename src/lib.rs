#![cfg_attr(not(any(test, doctest, feature = "std")), no_std)]
#![doc = include_str!("../README.md")]

extern crate alloc;

mod error;
pub use error::*;
mod process;
pub use process::*;
mod tools;
pub use tools::*;
mod design;
pub use design::*;
mod fir;
pub use fir::*;
mod hold;
pub use hold::*;
mod dsm;
pub use dsm::*;
mod demod;
pub use demod::*;
mod smooth;
pub use smooth::*;
mod scoreboard;
pub use scoreboard::*;
mod harness;
pub use harness::*;
mod stimulus;
pub use stimulus::*;
mod settings;
pub use settings::*;
mod model;
pub use model::*;

#[cfg(test)]
pub mod testing;
