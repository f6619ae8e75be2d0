use sonoverify_core::WaveformError;
use thiserror::Error;

/// An error produced while loading or using hydrophone calibration data.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CalibrationError {
    /// The calibration source cannot be read.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// The calibration file is malformed.
    #[error("Line {line}: {reason}")]
    Format {
        /// The 1-based line number, or 0 when the error concerns the file as a whole.
        line: usize,
        /// Description of the problem.
        reason: String,
    },
    /// The record lacks the column required for the requested operation.
    #[error("Calibration data has no {column} column")]
    MissingCalibrationData {
        /// The name of the missing column.
        column: String,
    },
    /// Result waveform cannot be constructed.
    #[error("{0}")]
    Waveform(#[from] WaveformError),
}

impl CalibrationError {
    pub(crate) fn format(line: usize, reason: impl Into<String>) -> Self {
        Self::Format {
            line,
            reason: reason.into(),
        }
    }
}
