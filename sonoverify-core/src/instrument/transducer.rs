use std::time::Duration;

use crate::{
    common::{kHz, Freq},
    geometry::FocusPoint,
};

use super::InstrumentError;

/// How the transducer emits after a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriggerMode {
    /// One burst per trigger.
    #[default]
    Single,
    /// Bursts repeat every [`PulseParams::interval`] until stopped.
    Continuous,
}

/// Parameters of an emitted tone burst.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PulseParams {
    /// The carrier frequency.
    pub frequency: Freq<f64>,
    /// The drive amplitude in \[V\].
    pub voltage: f64,
    /// The length of a burst.
    pub duration: Duration,
    /// The repetition period in [`TriggerMode::Continuous`].
    pub interval: Duration,
    /// The trigger mode.
    pub mode: TriggerMode,
}

impl PulseParams {
    /// The number of carrier cycles in a burst.
    #[must_use]
    pub fn num_cycles(&self) -> f64 {
        self.frequency.hz() * self.duration.as_secs_f64()
    }
}

impl Default for PulseParams {
    fn default() -> Self {
        Self {
            frequency: 400. * kHz,
            voltage: 10.,
            duration: Duration::from_micros(50),
            interval: Duration::from_millis(20),
            mode: TriggerMode::Single,
        }
    }
}

/// A trait that provides the interface with the transducer driving system.
pub trait Transducer: Send {
    /// Configures the tone burst emitted by subsequent triggers.
    fn configure_pulse(&mut self, pulse: &PulseParams) -> Result<(), InstrumentError>;

    /// Steers the beam to `focus`.
    fn set_focus(&mut self, focus: &FocusPoint) -> Result<(), InstrumentError>;

    /// Emits the configured burst.
    fn trigger_pulse(&mut self) -> Result<(), InstrumentError>;

    /// Stops any ongoing emission.
    fn stop_trigger(&mut self) -> Result<(), InstrumentError> {
        Ok(())
    }
}

impl Transducer for Box<dyn Transducer> {
    fn configure_pulse(&mut self, pulse: &PulseParams) -> Result<(), InstrumentError> {
        self.as_mut().configure_pulse(pulse)
    }

    fn set_focus(&mut self, focus: &FocusPoint) -> Result<(), InstrumentError> {
        self.as_mut().set_focus(focus)
    }

    fn trigger_pulse(&mut self) -> Result<(), InstrumentError> {
        self.as_mut().trigger_pulse()
    }

    fn stop_trigger(&mut self) -> Result<(), InstrumentError> {
        self.as_mut().stop_trigger()
    }
}
