use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use rand::{rngs::StdRng, SeedableRng};
use sonoverify_core::{
    geometry::Point3,
    instrument::{
        BlockConfig, Channel, ChannelOption, InstrumentError, PulseParams, ScopeData,
        TriggerOption,
    },
    FocusPoint,
};
use sonoverify_hydrophone::SensitivityModel;

use crate::{
    field::AcousticField, power::PowerSupplyEmulator, scope::ScopeEmulator,
    transducer::TransducerEmulator,
};

/// An instrument call recorded by the [`Bench`].
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum Event {
    ConfigureChannel(Channel),
    ConfigureTrigger,
    Arm,
    WaitComplete,
    Read,
    StopScope,
    ConfigurePulse,
    SetFocus(Point3),
    Trigger,
    StopTrigger,
    SetVoltage(f64),
    SetCurrentLimit(f64),
    SetOutput(bool),
}

/// A failure injected into the [`Bench`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Every scope call fails.
    Scope,
    /// Every transducer call fails.
    Transducer,
    /// Every power supply call fails.
    PowerSupply,
    /// Acquisitions never complete.
    NeverComplete,
    /// Triggering fails once this many pulses have been fired.
    FailAfterTriggers(usize),
    /// The scope omits this channel from read data.
    MissingChannel(Channel),
    /// Output voltages stop following their setpoints.
    StuckVoltage,
}

/// The option of [`Bench`].
#[derive(Debug, Clone, PartialEq)]
pub struct EmulatorOption {
    /// The flat hydrophone sensitivity in \[Pa/V\], used when `hydrophone` is `None`.
    pub sensitivity_pa_per_v: f64,
    /// A frequency-dependent hydrophone response applied to the synthesized pressure.
    pub hydrophone: Option<SensitivityModel>,
    /// The amplitude of uniform noise added to every channel in \[V\].
    pub noise_v: f64,
    /// The seed of the noise generator.
    pub seed: u64,
    /// The level of the sync output on channel B in \[V\].
    pub sync_level_v: f64,
    /// The number of power supply outputs.
    pub num_outputs: u8,
    /// The fraction of the remaining setpoint error closed by every voltage readback.
    pub slew: f64,
    /// The resistive load on each output in \[Ω\].
    pub load_ohms: f64,
}

impl Default for EmulatorOption {
    fn default() -> Self {
        Self {
            sensitivity_pa_per_v: 2e7,
            hydrophone: None,
            noise_v: 0.,
            seed: 0,
            sync_level_v: 3.3,
            num_outputs: 2,
            slew: 0.5,
            load_ohms: 50.,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct OutputState {
    pub(crate) setpoint: f64,
    pub(crate) actual: f64,
    pub(crate) current_limit: f64,
    pub(crate) enabled: bool,
}

pub(crate) struct BenchState {
    pub(crate) field: Box<dyn AcousticField>,
    pub(crate) option: EmulatorOption,
    pub(crate) rng: StdRng,
    pub(crate) events: Vec<Event>,
    pub(crate) faults: Vec<Fault>,
    pub(crate) channels: BTreeMap<Channel, ChannelOption>,
    pub(crate) trigger: TriggerOption,
    pub(crate) armed: Option<BlockConfig>,
    pub(crate) acquired: Option<ScopeData>,
    pub(crate) pulse: Option<PulseParams>,
    pub(crate) focus: Option<FocusPoint>,
    pub(crate) num_triggers: usize,
    pub(crate) emitting: bool,
    pub(crate) outputs: Vec<OutputState>,
}

impl BenchState {
    pub(crate) fn check(&self, fault: Fault, name: &str) -> Result<(), InstrumentError> {
        if self.faults.contains(&fault) {
            return Err(InstrumentError::new(format!("{name} is broken")));
        }
        Ok(())
    }

    pub(crate) fn has_fault(&self, fault: Fault) -> bool {
        self.faults.contains(&fault)
    }

    pub(crate) fn output(&self, output: u8) -> Result<&OutputState, InstrumentError> {
        (output as usize)
            .checked_sub(1)
            .and_then(|i| self.outputs.get(i))
            .ok_or_else(|| InstrumentError::new(format!("Output {output} does not exist")))
    }

    pub(crate) fn output_mut(&mut self, output: u8) -> Result<&mut OutputState, InstrumentError> {
        (output as usize)
            .checked_sub(1)
            .and_then(|i| self.outputs.get_mut(i))
            .ok_or_else(|| InstrumentError::new(format!("Output {output} does not exist")))
    }
}

/// The shared state of an emulated verification bench.
///
/// Cloning a [`Bench`] yields another handle to the same state.
#[derive(Clone)]
pub struct Bench {
    state: Arc<Mutex<BenchState>>,
}

impl Bench {
    /// Creates a new [`Bench`] whose hydrophone sees `field`.
    pub fn new(field: impl AcousticField + 'static, option: EmulatorOption) -> Self {
        let outputs = vec![OutputState::default(); option.num_outputs as usize];
        Self {
            state: Arc::new(Mutex::new(BenchState {
                field: Box::new(field),
                rng: StdRng::seed_from_u64(option.seed),
                option,
                events: Vec::new(),
                faults: Vec::new(),
                channels: Channel::ALL
                    .iter()
                    .map(|&ch| (ch, ChannelOption::default()))
                    .collect(),
                trigger: TriggerOption::default(),
                armed: None,
                acquired: None,
                pulse: None,
                focus: None,
                num_triggers: 0,
                emitting: false,
                outputs,
            })),
        }
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, BenchState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a scope attached to this bench.
    pub fn scope(&self) -> ScopeEmulator {
        ScopeEmulator::new(self.clone())
    }

    /// Returns a transducer attached to this bench.
    pub fn transducer(&self) -> TransducerEmulator {
        TransducerEmulator::new(self.clone())
    }

    /// Returns a power supply attached to this bench.
    pub fn power_supply(&self) -> PowerSupplyEmulator {
        PowerSupplyEmulator::new(self.clone())
    }

    /// The recorded instrument calls, oldest first.
    pub fn events(&self) -> Vec<Event> {
        self.lock().events.clone()
    }

    /// Forgets the recorded instrument calls.
    pub fn clear_events(&self) {
        self.lock().events.clear();
    }

    /// Injects a failure.
    pub fn break_down(&self, fault: Fault) {
        tracing::debug!("Injecting fault: {:?}", fault);
        self.lock().faults.push(fault);
    }

    /// Removes every injected failure.
    pub fn repair(&self) {
        self.lock().faults.clear();
    }

    /// The number of pulses fired so far.
    pub fn num_triggers(&self) -> usize {
        self.lock().num_triggers
    }

    /// The current focus of the transducer.
    pub fn focus(&self) -> Option<FocusPoint> {
        self.lock().focus.clone()
    }

    /// Returns whether the transducer is emitting in continuous mode.
    pub fn is_emitting(&self) -> bool {
        self.lock().emitting
    }

    /// Returns whether the power supply output `output` (numbered from 1) is enabled.
    pub fn output_enabled(&self, output: u8) -> bool {
        self.lock()
            .output(output)
            .is_ok_and(|o| o.enabled)
    }
}
