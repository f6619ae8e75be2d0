use std::time::Duration;

use crate::sleep::{poll_until, StdSleeper};

use super::InstrumentError;

/// An output of a power supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerOutput {
    /// A single output, numbered from 1.
    Channel(u8),
    /// Every output at once.
    All,
}

impl PowerOutput {
    /// Iterates over the concrete outputs this selector addresses.
    pub fn outputs(&self, num_outputs: u8) -> impl Iterator<Item = u8> {
        let (first, last) = match *self {
            PowerOutput::Channel(ch) => (ch, ch),
            PowerOutput::All => (1, num_outputs),
        };
        first..=last
    }
}

/// The option of [`PowerSupply::wait_settled`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettleOption {
    /// The maximum time to wait.
    pub timeout: Duration,
    /// The allowed relative deviation from the target.
    pub threshold: f64,
    /// The time between readbacks.
    pub poll_interval: Duration,
}

impl Default for SettleOption {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(1),
            threshold: 0.02,
            poll_interval: Duration::from_millis(1),
        }
    }
}

fn within(target: f64, actual: f64, threshold: f64) -> bool {
    if target == 0. {
        actual.abs() <= threshold
    } else {
        ((actual - target) / target).abs() <= threshold
    }
}

/// A trait that provides the interface with the DC power supply driving the transducer.
pub trait PowerSupply: Send {
    /// The number of independent outputs.
    fn num_outputs(&self) -> u8 {
        2
    }

    /// Sets the voltage setpoint in \[V\].
    fn set_voltage(&mut self, volts: f64, output: PowerOutput) -> Result<(), InstrumentError>;

    /// Reads back the actual output voltage in \[V\].
    fn get_voltage(&mut self, output: u8) -> Result<f64, InstrumentError>;

    /// Sets the current limit in \[A\].
    fn set_current_limit(&mut self, amps: f64, output: PowerOutput)
        -> Result<(), InstrumentError>;

    /// Reads back the actual output current in \[A\].
    fn get_current(&mut self, output: u8) -> Result<f64, InstrumentError>;

    /// Enables or disables outputs.
    fn set_output(&mut self, enable: bool, output: PowerOutput) -> Result<(), InstrumentError>;

    /// Returns whether the output is enabled.
    fn output_enabled(&mut self, output: u8) -> Result<bool, InstrumentError>;

    /// Blocks until every enabled output addressed by `output` reads back `target` volts.
    ///
    /// Returns `false` on timeout.
    fn wait_settled(
        &mut self,
        target: f64,
        output: PowerOutput,
        option: &SettleOption,
    ) -> Result<bool, InstrumentError> {
        let outputs = output.outputs(self.num_outputs()).collect::<Vec<_>>();
        poll_until(&StdSleeper, option.timeout, option.poll_interval, || {
            for &ch in &outputs {
                if !self.output_enabled(ch)? {
                    continue;
                }
                let actual = self.get_voltage(ch)?;
                if !within(target, actual, option.threshold) {
                    tracing::trace!("Output {} at {} V, waiting for {} V", ch, actual, target);
                    return Ok(false);
                }
            }
            Ok(true)
        })
    }
}

impl PowerSupply for Box<dyn PowerSupply> {
    fn num_outputs(&self) -> u8 {
        self.as_ref().num_outputs()
    }

    fn set_voltage(&mut self, volts: f64, output: PowerOutput) -> Result<(), InstrumentError> {
        self.as_mut().set_voltage(volts, output)
    }

    fn get_voltage(&mut self, output: u8) -> Result<f64, InstrumentError> {
        self.as_mut().get_voltage(output)
    }

    fn set_current_limit(
        &mut self,
        amps: f64,
        output: PowerOutput,
    ) -> Result<(), InstrumentError> {
        self.as_mut().set_current_limit(amps, output)
    }

    fn get_current(&mut self, output: u8) -> Result<f64, InstrumentError> {
        self.as_mut().get_current(output)
    }

    fn set_output(&mut self, enable: bool, output: PowerOutput) -> Result<(), InstrumentError> {
        self.as_mut().set_output(enable, output)
    }

    fn output_enabled(&mut self, output: u8) -> Result<bool, InstrumentError> {
        self.as_mut().output_enabled(output)
    }

    fn wait_settled(
        &mut self,
        target: f64,
        output: PowerOutput,
        option: &SettleOption,
    ) -> Result<bool, InstrumentError> {
        self.as_mut().wait_settled(target, output, option)
    }
}
