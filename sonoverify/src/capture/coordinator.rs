use sonoverify_core::{
    instrument::{
        BlockConfig, Channel, ChannelOption, InstrumentError, PowerOutput, PowerSupply,
        PulseParams, Scope, ScopeData, SettleOption, Transducer, TriggerOption,
    },
    sleep::{Sleep, StdSleeper},
    FocusPoint,
};

use getset::{Getters, MutGetters};

use super::{Armed, Capture, CaptureOption};
use crate::error::VerificationError;

/// A measurement session over a scope, a transducer and the power supply driving it.
///
/// All acquisitions go through this struct. It owns the instruments exclusively, so at most
/// one capture is in flight at a time. Dropping the coordinator turns the power outputs off
/// and stops the transducer; use [`close`](CaptureCoordinator::close) to observe errors.
#[derive(Getters, MutGetters)]
pub struct CaptureCoordinator<S: Scope, T: Transducer, P: PowerSupply, Z: Sleep = StdSleeper> {
    /// The oscilloscope.
    #[getset(get = "pub", get_mut = "pub")]
    scope: S,
    /// The transducer driving system.
    #[getset(get = "pub", get_mut = "pub")]
    transducer: T,
    /// The power supply of the transducer.
    #[getset(get = "pub", get_mut = "pub")]
    power_supply: P,
    sleeper: Z,
    is_open: bool,
    /// The option used for every [`capture`](CaptureCoordinator::capture).
    pub option: CaptureOption,
}

impl<S: Scope, T: Transducer, P: PowerSupply> CaptureCoordinator<S, T, P> {
    /// Equivalent to [`Self::with_option`] with default [`CaptureOption`].
    pub fn new(scope: S, transducer: T, power_supply: P) -> Self {
        Self::with_option(scope, transducer, power_supply, CaptureOption::default())
    }

    /// Equivalent to [`Self::with_sleeper`] with [`StdSleeper`].
    pub fn with_option(scope: S, transducer: T, power_supply: P, option: CaptureOption) -> Self {
        Self::with_sleeper(scope, transducer, power_supply, option, StdSleeper)
    }
}

impl<S: Scope, T: Transducer, P: PowerSupply, Z: Sleep> CaptureCoordinator<S, T, P, Z> {
    /// Opens a session with a [`CaptureOption`] and the sleeper used for the arm delay.
    pub fn with_sleeper(
        scope: S,
        transducer: T,
        power_supply: P,
        option: CaptureOption,
        sleeper: Z,
    ) -> Self {
        tracing::info!("Opening verification session: {:?}", option);
        Self {
            scope,
            transducer,
            power_supply,
            sleeper,
            is_open: true,
            option,
        }
    }

    fn prepare(
        transducer: &mut T,
        pulse: &PulseParams,
        focus: &FocusPoint,
    ) -> Result<(), InstrumentError> {
        tracing::debug!("Configuring pulse: {:?}", pulse);
        transducer.configure_pulse(pulse)?;
        tracing::debug!("Setting focus: {:?}", focus.position());
        transducer.set_focus(focus)
    }

    /// Configures the scope channels and trigger.
    pub fn configure_scope(
        &mut self,
        channels: &[(Channel, ChannelOption)],
        trigger: &TriggerOption,
    ) -> Result<(), VerificationError> {
        channels
            .iter()
            .try_for_each(|(ch, option)| self.scope.configure_channel(*ch, option))?;
        self.scope.configure_trigger(trigger)?;
        Ok(())
    }

    /// Enables or disables all power supply outputs.
    pub fn enable_output(&mut self, enable: bool) -> Result<(), VerificationError> {
        tracing::info!("Power outputs {}", if enable { "on" } else { "off" });
        self.power_supply.set_output(enable, PowerOutput::All)?;
        Ok(())
    }

    /// Sets the drive voltage on all outputs and waits until it settles.
    pub fn set_drive_voltage(
        &mut self,
        volts: f64,
        settle: &SettleOption,
    ) -> Result<(), VerificationError> {
        tracing::info!("Setting drive voltage to {} V", volts);
        self.power_supply.set_voltage(volts, PowerOutput::All)?;
        if !self
            .power_supply
            .wait_settled(volts, PowerOutput::All, settle)?
        {
            tracing::error!("Drive voltage did not settle at {} V", volts);
            return Err(VerificationError::SettleTimeout {
                target: volts,
                timeout: settle.timeout,
            });
        }
        Ok(())
    }

    /// Arms the scope after configuring the transducer.
    ///
    /// Most callers want [`capture`](Self::capture), which runs the whole protocol.
    pub fn arm(
        &mut self,
        pulse: &PulseParams,
        focus: &FocusPoint,
        block: &BlockConfig,
    ) -> Result<Armed<'_, S, T>, VerificationError> {
        Self::prepare(&mut self.transducer, pulse, focus)?;
        Ok(Armed::arm(&mut self.scope, &mut self.transducer, block)?)
    }

    /// Performs one synchronized acquisition.
    ///
    /// The transducer is configured and focused, the scope is armed, the pulse is fired after
    /// [`CaptureOption::arm_delay`], and the channels in [`CaptureOption::channels`] are read
    /// once the acquisition completes.
    ///
    /// # Errors
    ///
    /// Returns [`VerificationError::CaptureTimeout`] if the acquisition does not complete
    /// within [`CaptureOption::timeout`]. Any instrument failure aborts the capture with
    /// [`VerificationError::Instrument`]. Either way the scope is stopped once armed, so
    /// that the capture can be retried.
    #[tracing::instrument(level = "debug", skip(self, pulse, block), fields(focus = ?focus.position()))]
    pub fn capture(
        &mut self,
        pulse: &PulseParams,
        focus: &FocusPoint,
        block: &BlockConfig,
    ) -> Result<Capture, VerificationError> {
        Self::prepare(&mut self.transducer, pulse, focus)?;
        let armed = Armed::arm(&mut self.scope, &mut self.transducer, block)?;
        let data = match Self::acquire(armed, &self.sleeper, &self.option) {
            Ok(data) => data,
            Err(e) => {
                // A timed out acquisition has already been aborted.
                if !matches!(e, VerificationError::CaptureTimeout { .. }) {
                    tracing::warn!("Capture failed after arming: {}", e);
                    if let Err(e) = self.scope.stop() {
                        tracing::error!("Failed to stop the scope: {}", e);
                    }
                }
                return Err(e);
            }
        };
        Ok(Capture::new(data, &self.option.channels)?)
    }

    fn acquire(
        armed: Armed<'_, S, T>,
        sleeper: &Z,
        option: &CaptureOption,
    ) -> Result<ScopeData, VerificationError> {
        let timeout = option.timeout;
        sleeper.sleep(option.arm_delay);

        let mut triggered = armed.trigger()?;
        if !triggered.wait(timeout)? {
            tracing::warn!("Capture did not complete within {:?}", timeout);
            if let Err(e) = triggered.abort() {
                tracing::error!("Failed to stop the scope: {}", e);
            }
            return Err(VerificationError::CaptureTimeout { timeout });
        }
        Ok(triggered.read(&option.channels)?)
    }

    /// Stops the transducer and aborts any pending acquisition.
    pub fn stop(&mut self) -> Result<(), VerificationError> {
        self.transducer.stop_trigger()?;
        self.scope.stop()?;
        Ok(())
    }

    /// Closes the session, turning the power outputs off and stopping the transducer.
    pub fn close(mut self) -> Result<(), VerificationError> {
        self.close_impl()
    }

    fn close_impl(&mut self) -> Result<(), VerificationError> {
        if !self.is_open {
            return Ok(());
        }
        self.is_open = false;
        tracing::info!("Closing verification session");

        // Every step is attempted; the first failure is reported.
        let results: [Result<(), InstrumentError>; 3] = [
            self.power_supply.set_output(false, PowerOutput::All),
            self.transducer.stop_trigger(),
            self.scope.stop(),
        ];
        results
            .into_iter()
            .collect::<Result<(), _>>()
            .map_err(VerificationError::from)
    }
}

impl<S: Scope, T: Transducer, P: PowerSupply, Z: Sleep> Drop for CaptureCoordinator<S, T, P, Z> {
    fn drop(&mut self) {
        if let Err(e) = self.close_impl() {
            tracing::warn!("Failed to release instruments: {}", e);
        }
    }
}
