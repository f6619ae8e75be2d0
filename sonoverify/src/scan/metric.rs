use sonoverify_core::instrument::Channel;
use sonoverify_hydrophone::{Deconvolver, SensitivityModel};

use crate::{capture::Capture, error::VerificationError};

/// A scalar figure of merit evaluated on a [`Capture`].
pub trait FieldMetric {
    /// Evaluates the metric.
    fn evaluate(&self, capture: &Capture) -> Result<f64, VerificationError>;
}

impl<F> FieldMetric for F
where
    F: Fn(&Capture) -> Result<f64, VerificationError>,
{
    fn evaluate(&self, capture: &Capture) -> Result<f64, VerificationError> {
        self(capture)
    }
}

/// Peak-to-peak voltage of a channel in \[V\].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeakToPeak {
    /// The evaluated channel.
    pub channel: Channel,
}

impl Default for PeakToPeak {
    fn default() -> Self {
        Self {
            channel: Channel::A,
        }
    }
}

impl FieldMetric for PeakToPeak {
    fn evaluate(&self, capture: &Capture) -> Result<f64, VerificationError> {
        Ok(capture.waveform(self.channel)?.peak_to_peak())
    }
}

/// Peak-to-peak pressure of a hydrophone channel in \[Pa\].
#[derive(Debug, Clone, PartialEq)]
pub struct PeakToPeakPressure {
    /// The channel the hydrophone is connected to.
    pub channel: Channel,
    model: SensitivityModel,
    deconvolver: Deconvolver,
}

impl PeakToPeakPressure {
    /// Creates a new [`PeakToPeakPressure`] on channel A.
    #[must_use]
    pub fn new(model: SensitivityModel, deconvolver: Deconvolver) -> Self {
        Self {
            channel: Channel::A,
            model,
            deconvolver,
        }
    }
}

impl FieldMetric for PeakToPeakPressure {
    fn evaluate(&self, capture: &Capture) -> Result<f64, VerificationError> {
        let voltage = capture.waveform(self.channel)?;
        let pressure = self.deconvolver.deconvolve(voltage, &self.model)?;
        Ok(pressure.peak_to_peak())
    }
}
