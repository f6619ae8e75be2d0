use sonoverify_core::instrument::{InstrumentError, PowerOutput, PowerSupply};

use crate::bench::{Bench, BenchState, Event, Fault, OutputState};

/// An emulated multi-output DC power supply.
///
/// Each voltage readback of an enabled output closes [`EmulatorOption::slew`] of the gap
/// between the actual voltage and its setpoint, so settling takes several polls.
///
/// [`EmulatorOption::slew`]: crate::EmulatorOption::slew
pub struct PowerSupplyEmulator {
    bench: Bench,
}

impl PowerSupplyEmulator {
    pub(crate) const fn new(bench: Bench) -> Self {
        Self { bench }
    }

    fn for_each_output(
        state: &mut BenchState,
        output: PowerOutput,
        mut f: impl FnMut(&mut OutputState),
    ) -> Result<(), InstrumentError> {
        let num_outputs = state.option.num_outputs;
        output
            .outputs(num_outputs)
            .try_for_each(|ch| state.output_mut(ch).map(&mut f))
    }
}

impl PowerSupply for PowerSupplyEmulator {
    fn num_outputs(&self) -> u8 {
        self.bench.lock().option.num_outputs
    }

    fn set_voltage(&mut self, volts: f64, output: PowerOutput) -> Result<(), InstrumentError> {
        let mut state = self.bench.lock();
        state.check(Fault::PowerSupply, "Power supply")?;
        if !(volts.is_finite() && volts >= 0.) {
            return Err(InstrumentError::new(format!("Invalid voltage: {volts} V")));
        }
        state.events.push(Event::SetVoltage(volts));
        Self::for_each_output(&mut state, output, |o| o.setpoint = volts)
    }

    fn get_voltage(&mut self, output: u8) -> Result<f64, InstrumentError> {
        let mut state = self.bench.lock();
        state.check(Fault::PowerSupply, "Power supply")?;
        let stuck = state.has_fault(Fault::StuckVoltage);
        let slew = state.option.slew;
        let o = state.output_mut(output)?;
        if !o.enabled {
            o.actual = 0.;
        } else if !stuck {
            o.actual += slew * (o.setpoint - o.actual);
        }
        Ok(o.actual)
    }

    fn set_current_limit(
        &mut self,
        amps: f64,
        output: PowerOutput,
    ) -> Result<(), InstrumentError> {
        let mut state = self.bench.lock();
        state.check(Fault::PowerSupply, "Power supply")?;
        if !(amps.is_finite() && amps >= 0.) {
            return Err(InstrumentError::new(format!("Invalid current limit: {amps} A")));
        }
        state.events.push(Event::SetCurrentLimit(amps));
        Self::for_each_output(&mut state, output, |o| o.current_limit = amps)
    }

    fn get_current(&mut self, output: u8) -> Result<f64, InstrumentError> {
        let state = self.bench.lock();
        state.check(Fault::PowerSupply, "Power supply")?;
        let load = state.option.load_ohms;
        let o = state.output(output)?;
        if !o.enabled {
            return Ok(0.);
        }
        let current = o.actual / load;
        Ok(if o.current_limit > 0. {
            current.min(o.current_limit)
        } else {
            current
        })
    }

    fn set_output(&mut self, enable: bool, output: PowerOutput) -> Result<(), InstrumentError> {
        let mut state = self.bench.lock();
        state.check(Fault::PowerSupply, "Power supply")?;
        state.events.push(Event::SetOutput(enable));
        Self::for_each_output(&mut state, output, |o| o.enabled = enable)
    }

    fn output_enabled(&mut self, output: u8) -> Result<bool, InstrumentError> {
        let state = self.bench.lock();
        state.check(Fault::PowerSupply, "Power supply")?;
        Ok(state.output(output)?.enabled)
    }
}
