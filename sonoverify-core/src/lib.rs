#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::unescaped_backticks)]

//! Core traits and types for focused-ultrasound field verification.
//!
//! This crate defines the vocabulary shared by the measurement engine and the instrument
//! drivers: physical units, [`Waveform`], [`FocusPoint`], and the [`Scope`],
//! [`Transducer`] and [`PowerSupply`] traits that concrete drivers implement.
//!
//! [`Scope`]: instrument::Scope
//! [`Transducer`]: instrument::Transducer
//! [`PowerSupply`]: instrument::PowerSupply

/// Common constants and units.
pub mod common;
/// Focus positions.
pub mod geometry;
/// Interfaces to the instruments of a verification bench.
pub mod instrument;
/// Sleep and polling utilities.
pub mod sleep;
mod waveform;

pub use geometry::FocusPoint;
pub use waveform::{Waveform, WaveformError};
