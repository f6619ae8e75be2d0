use rustfft::{num_complex::Complex, FftPlanner};
use sonoverify_core::{common::Freq, Waveform};

use crate::{error::CalibrationError, sensitivity::SensitivityModel};

/// A Butterworth band-pass weighting applied in the frequency domain.
///
/// The pass band spans `center * (1 ± bandwidth / 2)`, clipped to `[0, fs / 2]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bandpass {
    /// The center frequency.
    pub center: Freq<f64>,
    /// The width of the pass band as a fraction of the center frequency.
    pub bandwidth: f64,
    /// The filter order.
    pub order: u32,
}

impl Bandpass {
    /// Creates a 4th-order [`Bandpass`].
    #[must_use]
    pub const fn new(center: Freq<f64>, bandwidth: f64) -> Self {
        Self {
            center,
            bandwidth,
            order: 4,
        }
    }

    fn edges(&self, sample_rate: f64) -> (f64, f64) {
        let fc = self.center.hz();
        let low = (fc * (1. - self.bandwidth / 2.)).max(0.);
        let high = (fc * (1. + self.bandwidth / 2.)).min(sample_rate / 2.);
        (low, high)
    }

    fn weight(&self, f: f64, (low, high): (f64, f64)) -> f64 {
        let f = f.abs();
        if f == 0. || high <= low {
            return 0.;
        }
        let f0_sq = low * high;
        let b = high - low;
        let x = (f * f - f0_sq) / (f * b);
        1. / (1. + x.powi(2 * self.order as i32)).sqrt()
    }
}

/// The option of [`Deconvolver`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DeconvolutionOption {
    /// Optional band-pass weighting applied on top of the inverse response.
    pub bandpass: Option<Bandpass>,
}

/// Converts between hydrophone voltage and acoustic pressure in the frequency domain.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Deconvolver {
    option: DeconvolutionOption,
}

/// Deconvolves `voltage` into pressure with the default [`Deconvolver`].
pub fn deconvolve(
    voltage: &Waveform,
    model: &SensitivityModel,
) -> Result<Waveform, CalibrationError> {
    Deconvolver::default().deconvolve(voltage, model)
}

impl Deconvolver {
    /// Creates a new [`Deconvolver`].
    #[must_use]
    pub const fn new(option: DeconvolutionOption) -> Self {
        Self { option }
    }

    /// Converts a voltage waveform \[V\] into a pressure waveform \[Pa\].
    ///
    /// Every DFT bin is multiplied by the sensitivity at the bin's absolute frequency; the
    /// DC bin uses the sensitivity at the lowest calibrated frequency. The result has the
    /// length and sample interval of `voltage`. No regularization is applied.
    #[tracing::instrument(level = "debug", skip_all, fields(n = voltage.len()))]
    pub fn deconvolve(
        &self,
        voltage: &Waveform,
        model: &SensitivityModel,
    ) -> Result<Waveform, CalibrationError> {
        let edges = self
            .option
            .bandpass
            .map(|bp| (bp, bp.edges(voltage.sample_rate())));
        let dc = model.sensitivity_pa_per_v(model.min_frequency_hz());
        let mut warned = 0usize;
        let samples = filter(voltage, |f| {
            let s = if f == 0. {
                dc
            } else {
                model.sensitivity_pa_per_v(f)
            };
            if !(s.is_finite() && s > 0.) {
                warned += 1;
            }
            match edges {
                Some((bp, edges)) => s * bp.weight(f, edges),
                None => s,
            }
        });
        if warned > 0 {
            tracing::warn!(
                "Sensitivity is non-positive or non-finite in {} of {} bins",
                warned,
                voltage.len()
            );
        }
        Ok(voltage.with_samples(samples)?)
    }

    /// Converts a pressure waveform \[Pa\] into the voltage \[V\] the hydrophone would output.
    ///
    /// This is the inverse of [`Deconvolver::deconvolve`] without band-pass weighting.
    pub fn apply_response(
        &self,
        pressure: &Waveform,
        model: &SensitivityModel,
    ) -> Result<Waveform, CalibrationError> {
        let dc = model.sensitivity_pa_per_v(model.min_frequency_hz());
        let samples = filter(pressure, |f| {
            let s = if f == 0. {
                dc
            } else {
                model.sensitivity_pa_per_v(f)
            };
            1. / s
        });
        Ok(pressure.with_samples(samples)?)
    }
}

fn bin_frequency(k: usize, n: usize, dt: f64) -> f64 {
    let k = if k <= n / 2 {
        k as f64
    } else {
        k as f64 - n as f64
    };
    k / (n as f64 * dt)
}

fn filter(waveform: &Waveform, mut response: impl FnMut(f64) -> f64) -> Vec<f64> {
    let n = waveform.len();
    let dt = waveform.sample_interval();

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(n);
    let ifft = planner.plan_fft_inverse(n);

    let mut buf = waveform
        .iter()
        .map(|&v| Complex::new(v, 0.))
        .collect::<Vec<_>>();
    fft.process(&mut buf);
    buf.iter_mut()
        .enumerate()
        .for_each(|(k, c)| *c *= response(bin_frequency(k, n, dt)));
    ifft.process(&mut buf);

    let scale = 1. / n as f64;
    buf.into_iter().map(|c| c.re * scale).collect()
}
