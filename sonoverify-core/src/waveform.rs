use derive_more::Deref;
use thiserror::Error;

/// An error produced when constructing a [`Waveform`].
#[derive(Error, Debug, PartialEq, Clone, Copy)]
#[non_exhaustive]
pub enum WaveformError {
    /// A waveform must contain at least one sample.
    #[error("Waveform must contain at least one sample")]
    Empty,
    /// The sample interval is not a positive finite number.
    #[error("Sample interval ({0} s) must be positive and finite")]
    InvalidSampleInterval(f64),
}

/// A uniformly sampled real-valued signal (voltage or pressure).
#[derive(Clone, Debug, PartialEq, Deref)]
pub struct Waveform {
    #[deref]
    samples: Vec<f64>,
    sample_interval: f64,
}

impl Waveform {
    /// Creates a new [`Waveform`].
    ///
    /// `sample_interval` is the time between samples in seconds.
    pub fn new(samples: Vec<f64>, sample_interval: f64) -> Result<Self, WaveformError> {
        if samples.is_empty() {
            return Err(WaveformError::Empty);
        }
        if !(sample_interval.is_finite() && sample_interval > 0.) {
            return Err(WaveformError::InvalidSampleInterval(sample_interval));
        }
        Ok(Self {
            samples,
            sample_interval,
        })
    }

    /// Creates a new [`Waveform`] with the same sample interval as `self`.
    pub fn with_samples(&self, samples: Vec<f64>) -> Result<Self, WaveformError> {
        Self::new(samples, self.sample_interval)
    }

    /// The samples.
    #[must_use]
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Consumes the waveform and returns the samples.
    #[must_use]
    pub fn into_samples(self) -> Vec<f64> {
        self.samples
    }

    /// The time between samples in seconds.
    #[must_use]
    pub const fn sample_interval(&self) -> f64 {
        self.sample_interval
    }

    /// The sampling rate in Hz.
    #[must_use]
    pub fn sample_rate(&self) -> f64 {
        1. / self.sample_interval
    }

    /// The time span covered by the samples in seconds.
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 * self.sample_interval
    }

    /// The time of each sample in seconds, starting at zero.
    #[must_use]
    pub fn time_axis(&self) -> Vec<f64> {
        (0..self.samples.len())
            .map(|i| i as f64 * self.sample_interval)
            .collect()
    }

    /// The smallest sample.
    #[must_use]
    pub fn min(&self) -> f64 {
        self.samples.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// The largest sample.
    #[must_use]
    pub fn max(&self) -> f64 {
        self.samples.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// The difference between the largest and the smallest sample.
    #[must_use]
    pub fn peak_to_peak(&self) -> f64 {
        self.max() - self.min()
    }
}
