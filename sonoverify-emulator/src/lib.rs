#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::unescaped_backticks)]

//! Emulated instruments of a verification bench.
//!
//! A [`Bench`] holds the state shared by a [`ScopeEmulator`], a [`TransducerEmulator`] and a
//! [`PowerSupplyEmulator`]. Firing the transducer while the scope is armed synthesizes a
//! tone burst whose amplitude follows an [`AcousticField`] evaluated at the current focus.
//! Every instrument call is recorded as an [`Event`], and failures can be injected with
//! [`Bench::break_down`].

mod bench;
mod field;
mod power;
mod scope;
mod transducer;

pub use bench::{Bench, EmulatorOption, Event, Fault};
pub use field::{AcousticField, GaussianFocus};
pub use power::PowerSupplyEmulator;
pub use scope::{timebase_interval, ScopeEmulator};
pub use transducer::TransducerEmulator;
