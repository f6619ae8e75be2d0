#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::unescaped_backticks)]

//! Hydrophone calibration records and conversion of captured voltage into pressure.
//!
//! A [`CalibrationRecord`] is parsed from the text format produced by hydrophone
//! calibration services. [`SensitivityModel`] turns its frequency table into a continuous
//! Pa/V response, and [`Deconvolver`] applies that response to a voltage [`Waveform`].
//!
//! [`Waveform`]: sonoverify_core::Waveform

mod deconvolution;
mod error;
mod hydrophone;
mod record;
mod sensitivity;

pub use deconvolution::{deconvolve, Bandpass, DeconvolutionOption, Deconvolver};
pub use error::CalibrationError;
pub use hydrophone::Hydrophone;
pub use record::{
    CalibrationRecord, FrequencyRange, MetadataSummary, MetadataValue, FREQUENCY_COLUMN,
    SENSITIVITY_DB_COLUMN, SENSITIVITY_COLUMN,
};
pub use sensitivity::SensitivityModel;
