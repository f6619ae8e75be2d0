#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::unescaped_backticks)]

//! Acoustic-field verification of focused-ultrasound transducers.
//!
//! A [`CaptureCoordinator`] owns a scope, a transducer and its power supply, and runs the
//! configure, arm, trigger, wait and read protocol that yields one synchronized
//! [`Capture`]. A [`FieldScanner`] turns captures into scalar metrics over spatial grids and
//! searches the focal peak by gradient ascent. Captured voltage is converted into pressure
//! with [`hydrophone`].
//!
//! [`Capture`]: capture::Capture
//! [`FieldScanner`]: scan::FieldScanner

/// Synchronized multi-instrument acquisition.
pub mod capture;
/// Errors.
pub mod error;
/// Derivative-free optimization over the acoustic field.
pub mod optimize;
/// Commonly used items.
pub mod prelude;
/// Spatial measurements.
pub mod scan;

pub use sonoverify_core as base;
pub use sonoverify_hydrophone as hydrophone;

pub use capture::CaptureCoordinator;
