use std::time::Duration;

use sonoverify_core::instrument::{
    BlockConfig, Channel, InstrumentError, Scope, ScopeData, Transducer,
};

/// A scope armed for a block acquisition.
///
/// Obtained from [`CaptureCoordinator::arm`]; the pulse can only be fired through this token.
///
/// [`CaptureCoordinator::arm`]: crate::CaptureCoordinator::arm
#[must_use = "an armed scope waits for a trigger"]
pub struct Armed<'a, S: Scope, T: Transducer> {
    scope: &'a mut S,
    transducer: &'a mut T,
}

impl<'a, S: Scope, T: Transducer> Armed<'a, S, T> {
    pub(crate) fn arm(
        scope: &'a mut S,
        transducer: &'a mut T,
        block: &BlockConfig,
    ) -> Result<Self, InstrumentError> {
        tracing::debug!(
            "Arming scope: {} + {} samples, timebase {}",
            block.pre_trigger_samples,
            block.post_trigger_samples,
            block.timebase
        );
        scope.arm(block)?;
        Ok(Self { scope, transducer })
    }

    /// Fires the configured pulse.
    pub fn trigger(self) -> Result<Triggered<'a, S>, InstrumentError> {
        tracing::debug!("Triggering pulse");
        self.transducer.trigger_pulse()?;
        Ok(Triggered { scope: self.scope })
    }
}

/// A scope whose acquisition has been triggered.
#[must_use = "a triggered acquisition should be read or aborted"]
pub struct Triggered<'a, S: Scope> {
    scope: &'a mut S,
}

impl<S: Scope> Triggered<'_, S> {
    /// Blocks until the acquisition completes or `timeout` elapses.
    pub fn wait(&mut self, timeout: Duration) -> Result<bool, InstrumentError> {
        self.scope.wait_complete(timeout)
    }

    /// Reads back the acquired samples.
    pub fn read(self, channels: &[Channel]) -> Result<ScopeData, InstrumentError> {
        tracing::debug!("Reading channels {:?}", channels);
        self.scope.read(channels)
    }

    /// Aborts the acquisition.
    pub fn abort(self) -> Result<(), InstrumentError> {
        self.scope.stop()
    }
}
