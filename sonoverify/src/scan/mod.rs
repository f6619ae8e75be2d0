mod metric;
mod result;

use itertools::iproduct;
use sonoverify_core::{
    instrument::{BlockConfig, Channel, PowerSupply, PulseParams, Scope, SettleOption, Transducer},
    sleep::Sleep,
    FocusPoint,
};

pub use metric::{FieldMetric, PeakToPeak, PeakToPeakPressure};
pub use result::ScanResult;

use crate::{
    capture::{Capture, CaptureCoordinator},
    error::VerificationError,
    optimize::{self, GradientAscentOption},
};

fn validate_axis(name: &str, values: &[f64]) -> Result<(), VerificationError> {
    if values.is_empty() {
        return Err(VerificationError::InvalidScan(format!(
            "{name} coordinates are empty"
        )));
    }
    if let Some(v) = values.iter().find(|v| !v.is_finite()) {
        return Err(VerificationError::InvalidScan(format!(
            "{name} coordinate {v} is not finite"
        )));
    }
    Ok(())
}

fn validate_finite(name: &str, v: f64) -> Result<(), VerificationError> {
    if !v.is_finite() {
        return Err(VerificationError::InvalidScan(format!(
            "{name} ({v}) is not finite"
        )));
    }
    Ok(())
}

/// Spatial measurements over a [`CaptureCoordinator`].
///
/// Coordinates are in \[mm\] in the transducer's coordinate system. Every measurement is a
/// full [`capture`](CaptureCoordinator::capture) evaluated by a [`FieldMetric`].
pub struct FieldScanner<'a, S, T, P, Z, M = PeakToPeak>
where
    S: Scope,
    T: Transducer,
    P: PowerSupply,
    Z: Sleep,
    M: FieldMetric,
{
    coordinator: &'a mut CaptureCoordinator<S, T, P, Z>,
    block: BlockConfig,
    metric: M,
}

impl<'a, S, T, P, Z> FieldScanner<'a, S, T, P, Z>
where
    S: Scope,
    T: Transducer,
    P: PowerSupply,
    Z: Sleep,
{
    /// Creates a new [`FieldScanner`] measuring the peak-to-peak voltage of channel A.
    pub fn new(coordinator: &'a mut CaptureCoordinator<S, T, P, Z>, block: BlockConfig) -> Self {
        Self {
            coordinator,
            block,
            metric: PeakToPeak::default(),
        }
    }
}

impl<'a, S, T, P, Z, M> FieldScanner<'a, S, T, P, Z, M>
where
    S: Scope,
    T: Transducer,
    P: PowerSupply,
    Z: Sleep,
    M: FieldMetric,
{
    /// Replaces the metric evaluated by [`measure`](Self::measure) and the scans.
    pub fn with_metric<M2: FieldMetric>(self, metric: M2) -> FieldScanner<'a, S, T, P, Z, M2> {
        FieldScanner {
            coordinator: self.coordinator,
            block: self.block,
            metric,
        }
    }

    /// The block configuration of every capture.
    pub const fn block(&self) -> &BlockConfig {
        &self.block
    }

    /// The metric.
    pub const fn metric(&self) -> &M {
        &self.metric
    }

    fn capture(
        &mut self,
        x: f64,
        y: f64,
        z: f64,
        pulse: &PulseParams,
    ) -> Result<Capture, VerificationError> {
        self.coordinator
            .capture(pulse, &FocusPoint::at(x, y, z), &self.block)
    }

    /// Captures at `(x, y, z)` and returns the peak-to-peak voltage of channel A.
    pub fn peak_to_peak(
        &mut self,
        x: f64,
        y: f64,
        z: f64,
        pulse: &PulseParams,
    ) -> Result<f64, VerificationError> {
        let capture = self.capture(x, y, z, pulse)?;
        Ok(capture.waveform(Channel::A)?.peak_to_peak())
    }

    /// Captures at `(x, y, z)` and evaluates the metric.
    pub fn measure(
        &mut self,
        x: f64,
        y: f64,
        z: f64,
        pulse: &PulseParams,
    ) -> Result<f64, VerificationError> {
        let capture = self.capture(x, y, z, pulse)?;
        let value = self.metric.evaluate(&capture)?;
        tracing::debug!("({}, {}, {}): {}", x, y, z, value);
        Ok(value)
    }

    /// Measures every `(x, y)` pair of `xs × ys` at depth `z`.
    ///
    /// Points are visited with x in the outer loop and y in the inner loop. The first
    /// failing capture aborts the scan; no partial result is returned.
    #[tracing::instrument(level = "info", skip_all, fields(nx = xs.len(), ny = ys.len(), z = z))]
    pub fn grid_scan(
        &mut self,
        xs: &[f64],
        ys: &[f64],
        z: f64,
        pulse: &PulseParams,
    ) -> Result<ScanResult, VerificationError> {
        validate_axis("x", xs)?;
        validate_axis("y", ys)?;
        validate_finite("z", z)?;

        let total = xs.len() * ys.len();
        let values = iproduct!(xs, ys)
            .enumerate()
            .map(|(i, (&x, &y))| {
                tracing::info!("Scanning point {}/{}: ({}, {}, {})", i + 1, total, x, y, z);
                self.measure(x, y, z, pulse)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ScanResult::new(xs.to_vec(), ys.to_vec(), values))
    }

    /// Searches the lateral position of the maximum of the metric at depth `z`.
    ///
    /// See [`optimize::gradient_ascent`]; every evaluation is one capture.
    #[tracing::instrument(level = "info", skip(self, pulse))]
    pub fn gradient_ascent(
        &mut self,
        x0: f64,
        y0: f64,
        z: f64,
        pulse: &PulseParams,
        option: &GradientAscentOption,
    ) -> Result<(f64, f64), VerificationError> {
        option.validate().map_err(VerificationError::InvalidScan)?;
        validate_finite("x0", x0)?;
        validate_finite("y0", y0)?;
        validate_finite("z", z)?;

        let (x, y) = optimize::gradient_ascent(
            |x, y| self.measure(x, y, z, pulse),
            x0,
            y0,
            option,
        )?;
        tracing::info!("Peak found at ({:.3}, {:.3}, {:.3})", x, y, z);
        Ok((x, y))
    }

    /// Captures at `focus` once per drive voltage, in order.
    #[tracing::instrument(level = "info", skip_all, fields(n = voltages.len()))]
    pub fn voltage_sweep(
        &mut self,
        voltages: &[f64],
        focus: &FocusPoint,
        pulse: &PulseParams,
        settle: &SettleOption,
    ) -> Result<Vec<(f64, Capture)>, VerificationError> {
        if voltages.is_empty() {
            return Err(VerificationError::InvalidScan(
                "voltages are empty".to_owned(),
            ));
        }
        if let Some(v) = voltages.iter().find(|v| !(v.is_finite() && **v >= 0.)) {
            return Err(VerificationError::InvalidScan(format!(
                "voltage {v} must be non-negative and finite"
            )));
        }

        voltages
            .iter()
            .map(|&v| -> Result<_, VerificationError> {
                self.coordinator.set_drive_voltage(v, settle)?;
                let pulse = PulseParams {
                    voltage: v,
                    ..*pulse
                };
                let capture = self.coordinator.capture(&pulse, focus, &self.block)?;
                Ok((v, capture))
            })
            .collect()
    }
}
