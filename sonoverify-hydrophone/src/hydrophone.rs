use std::{fmt, path::Path};

use getset::Getters;
use sonoverify_core::Waveform;

use crate::{
    deconvolution::{DeconvolutionOption, Deconvolver},
    error::CalibrationError,
    record::{CalibrationRecord, MetadataSummary, SENSITIVITY_COLUMN},
    sensitivity::SensitivityModel,
};

/// A calibrated hydrophone.
///
/// A record without linear sensitivity data still loads; operations that need the
/// sensitivity then fail with [`CalibrationError::MissingCalibrationData`].
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct Hydrophone {
    /// The calibration record.
    #[getset(get = "pub")]
    record: CalibrationRecord,
    model: Option<SensitivityModel>,
}

impl Hydrophone {
    /// Creates a new [`Hydrophone`] from a calibration record.
    #[must_use]
    pub fn new(record: CalibrationRecord) -> Self {
        let model = SensitivityModel::build(&record).ok();
        if model.is_none() {
            tracing::warn!("Calibration record has no {} column", SENSITIVITY_COLUMN);
        }
        Self { record, model }
    }

    /// Loads a calibration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CalibrationError> {
        Ok(Self::new(CalibrationRecord::load(path)?))
    }

    /// The sensitivity model.
    pub fn model(&self) -> Result<&SensitivityModel, CalibrationError> {
        self.model
            .as_ref()
            .ok_or_else(|| CalibrationError::MissingCalibrationData {
                column: SENSITIVITY_COLUMN.to_owned(),
            })
    }

    /// Returns the sensitivity at `frequency_hz` in \[Pa/V\].
    pub fn sensitivity_pa_per_v(&self, frequency_hz: f64) -> Result<f64, CalibrationError> {
        Ok(self.model()?.sensitivity_pa_per_v(frequency_hz))
    }

    /// Returns the sensitivity at each of `frequencies_hz` in \[Pa/V\].
    pub fn frequency_response(&self, frequencies_hz: &[f64]) -> Result<Vec<f64>, CalibrationError> {
        Ok(self.model()?.sensitivity_pa_per_v_batch(frequencies_hz))
    }

    /// Converts a voltage waveform into pressure.
    pub fn deconvolve(
        &self,
        voltage: &Waveform,
        option: DeconvolutionOption,
    ) -> Result<Waveform, CalibrationError> {
        Deconvolver::new(option).deconvolve(voltage, self.model()?)
    }

    /// Returns the well-known metadata of the record.
    #[must_use]
    pub fn summary(&self) -> MetadataSummary {
        self.record.summary()
    }
}

impl fmt::Display for Hydrophone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = self.summary();
        let show = |v: Option<crate::MetadataValue>| v.map_or("Unknown".to_owned(), |v| v.to_string());
        write!(
            f,
            "Hydrophone(manufacturer={}, model={}, serial_number={}, aperture={} um)",
            show(summary.manufacturer),
            show(summary.model),
            show(summary.serial_number),
            show(summary.aperture_um)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::tests::RECORD;

    use std::{fs::File, io::Write};

    #[test]
    fn load() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("cal.txt");
        File::create(&path)?.write_all(RECORD.as_bytes())?;

        let hydrophone = Hydrophone::load(&path)?;
        approx::assert_relative_eq!(
            1. / 5.0e-8,
            hydrophone.sensitivity_pa_per_v(1e6)?,
            max_relative = 1e-12
        );
        assert_eq!(3, hydrophone.frequency_response(&[0., 5e6, 20e6])?.len());
        assert_eq!(
            "Hydrophone(manufacturer=ONDA, model=HNR-0500, serial_number=2246, aperture=500 um)",
            hydrophone.to_string()
        );
        Ok(())
    }

    #[test]
    fn missing_sensitivity_is_lazy() -> anyhow::Result<()> {
        let record = "DATA_FIELDS\t2\nDATA_FIELD\tFREQ_MHz\nDATA_FIELD\tSENS_DB\nHEADER_END\n2.0\t-264\n"
            .parse::<CalibrationRecord>()?;
        let hydrophone = Hydrophone::new(record);
        assert_eq!(1, hydrophone.summary().frequency_range.map_or(0, |r| r.n_points));
        assert!(matches!(
            hydrophone.sensitivity_pa_per_v(1e6),
            Err(CalibrationError::MissingCalibrationData { .. })
        ));
        assert!(matches!(
            hydrophone.deconvolve(&Waveform::new(vec![0.; 4], 1e-8)?, Default::default()),
            Err(CalibrationError::MissingCalibrationData { .. })
        ));
        assert_eq!(
            "Hydrophone(manufacturer=Unknown, model=Unknown, serial_number=Unknown, aperture=Unknown um)",
            hydrophone.to_string()
        );
        Ok(())
    }
}
