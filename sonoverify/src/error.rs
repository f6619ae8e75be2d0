use std::time::Duration;

use sonoverify_core::{instrument::InstrumentError, WaveformError};
use sonoverify_hydrophone::CalibrationError;
use thiserror::Error;

/// An error produced by a verification session.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum VerificationError {
    /// The scope did not complete the acquisition in time.
    #[error("Capture did not complete within {timeout:?}")]
    CaptureTimeout {
        /// The timeout that elapsed.
        timeout: Duration,
    },
    /// The power supply did not reach the target voltage in time.
    #[error("Power supply did not settle at {target} V within {timeout:?}")]
    SettleTimeout {
        /// The target voltage.
        target: f64,
        /// The timeout that elapsed.
        timeout: Duration,
    },
    /// An instrument reported an error.
    #[error("{0}")]
    Instrument(#[from] InstrumentError),
    /// The scan parameters are invalid.
    #[error("Invalid scan parameter: {0}")]
    InvalidScan(String),
    /// Calibration data is unusable.
    #[error("{0}")]
    Calibration(#[from] CalibrationError),
    /// A waveform cannot be constructed.
    #[error("{0}")]
    Waveform(#[from] WaveformError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rstest::rstest]
    #[case(
        "Capture did not complete within 5s",
        VerificationError::CaptureTimeout { timeout: Duration::from_secs(5) }
    )]
    #[case(
        "Power supply did not settle at 12.5 V within 1s",
        VerificationError::SettleTimeout { target: 12.5, timeout: Duration::from_secs(1) }
    )]
    #[case(
        "scope not connected",
        VerificationError::Instrument(InstrumentError::new("scope not connected".to_owned()))
    )]
    #[case(
        "Invalid scan parameter: x coordinates are empty",
        VerificationError::InvalidScan("x coordinates are empty".to_owned())
    )]
    #[case(
        "Waveform must contain at least one sample",
        VerificationError::Waveform(WaveformError::Empty)
    )]
    fn display(#[case] expect: &str, #[case] e: VerificationError) {
        assert_eq!(expect, e.to_string());
    }
}
