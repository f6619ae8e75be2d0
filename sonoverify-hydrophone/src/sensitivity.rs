use crate::{
    error::CalibrationError,
    record::{CalibrationRecord, SENSITIVITY_COLUMN},
};

/// The continuous receive response of a hydrophone in \[Pa/V\].
///
/// Built from the `SENS_VPERPA` column of a [`CalibrationRecord`]. The response is defined
/// for every frequency; negative frequencies are evaluated at `|f|`.
///
/// - Below the lowest calibrated frequency (including DC) the response is flat, equal to
///   the value at the lowest calibrated frequency.
/// - Between calibration points the response is linearly interpolated in Pa/V.
/// - Above the highest calibrated frequency the last segment is continued linearly.
///   This may reach non-positive values far above the calibrated range.
///
/// A single-point table yields a constant response.
#[derive(Debug, Clone, PartialEq)]
pub struct SensitivityModel {
    freq_hz: Vec<f64>,
    pa_per_v: Vec<f64>,
}

impl SensitivityModel {
    /// Builds the model from a calibration record.
    ///
    /// # Errors
    ///
    /// Returns [`CalibrationError::MissingCalibrationData`] if the record has no
    /// `SENS_VPERPA` column.
    pub fn build(record: &CalibrationRecord) -> Result<Self, CalibrationError> {
        let sens = record.column(SENSITIVITY_COLUMN).ok_or_else(|| {
            CalibrationError::MissingCalibrationData {
                column: SENSITIVITY_COLUMN.to_owned(),
            }
        })?;
        let freq_hz = record.frequencies_hz();
        let pa_per_v = sens.iter().map(|s| 1. / s).collect::<Vec<_>>();
        pa_per_v
            .iter()
            .zip(&freq_hz)
            .filter(|(s, _)| !(s.is_finite() && **s > 0.))
            .for_each(|(s, f)| {
                tracing::warn!("Non-positive or non-finite sensitivity {} Pa/V at {} Hz", s, f)
            });
        Ok(Self { freq_hz, pa_per_v })
    }

    /// The number of calibration points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.freq_hz.len()
    }

    /// Returns `true` if the model has no calibration point.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.freq_hz.is_empty()
    }

    /// The lowest calibrated frequency in \[Hz\].
    #[must_use]
    pub fn min_frequency_hz(&self) -> f64 {
        self.freq_hz[0]
    }

    /// The highest calibrated frequency in \[Hz\].
    #[must_use]
    pub fn max_frequency_hz(&self) -> f64 {
        self.freq_hz[self.len() - 1]
    }

    /// Returns the sensitivity at `frequency_hz` in \[Pa/V\].
    #[must_use]
    pub fn sensitivity_pa_per_v(&self, frequency_hz: f64) -> f64 {
        let f = frequency_hz.abs();
        let n = self.len();
        if n == 1 || f <= self.freq_hz[0] {
            return self.pa_per_v[0];
        }
        // Index of the segment's right end, clamped to the last segment above range.
        let hi = self.freq_hz.partition_point(|&x| x < f).clamp(1, n - 1);
        let lo = hi - 1;
        let (f0, f1) = (self.freq_hz[lo], self.freq_hz[hi]);
        let (s0, s1) = (self.pa_per_v[lo], self.pa_per_v[hi]);
        s0 + (s1 - s0) * (f - f0) / (f1 - f0)
    }

    /// Returns the sensitivity at each of `frequencies_hz` in \[Pa/V\].
    #[must_use]
    pub fn sensitivity_pa_per_v_batch(&self, frequencies_hz: &[f64]) -> Vec<f64> {
        frequencies_hz
            .iter()
            .map(|&f| self.sensitivity_pa_per_v(f))
            .collect()
    }
}
