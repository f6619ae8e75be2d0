mod coordinator;
mod protocol;

use std::{collections::BTreeMap, time::Duration};

use getset::Getters;
use sonoverify_core::{
    common::{DEFAULT_ARM_DELAY, DEFAULT_TIMEOUT},
    instrument::{Channel, InstrumentError, ScopeData},
    Waveform,
};

pub use coordinator::CaptureCoordinator;
pub use protocol::{Armed, Triggered};

use crate::error::VerificationError;

/// The option of [`CaptureCoordinator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureOption {
    /// The maximum time to wait for an acquisition to complete.
    pub timeout: Duration,
    /// The delay between arming the scope and firing the pulse.
    pub arm_delay: Duration,
    /// The channels read back after each acquisition.
    pub channels: Vec<Channel>,
}

impl Default for CaptureOption {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            arm_delay: DEFAULT_ARM_DELAY,
            channels: vec![Channel::A, Channel::B],
        }
    }
}

/// One synchronized acquisition: a voltage waveform per channel on a shared time axis.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct Capture {
    waveforms: BTreeMap<Channel, Waveform>,
    /// The time of each sample in \[s\] from the start of the block.
    #[getset(get = "pub")]
    time_axis: Vec<f64>,
}

impl Capture {
    pub(crate) fn new(mut data: ScopeData, channels: &[Channel]) -> Result<Self, InstrumentError> {
        let n = data.time_axis.len();
        let waveforms = channels
            .iter()
            .map(|&ch| {
                let samples = data.channels.remove(&ch).ok_or_else(|| {
                    InstrumentError::new(format!("Scope returned no data for channel {ch}"))
                })?;
                if samples.len() != n {
                    return Err(InstrumentError::new(format!(
                        "Channel {ch} has {} samples, but the time axis has {n}",
                        samples.len()
                    )));
                }
                let waveform = Waveform::new(samples, data.sample_interval)
                    .map_err(|e| InstrumentError::new(format!("Channel {ch}: {e}")))?;
                Ok((ch, waveform))
            })
            .collect::<Result<_, _>>()?;
        Ok(Self {
            waveforms,
            time_axis: data.time_axis,
        })
    }

    /// Returns the waveform of `channel`, if it was captured.
    #[must_use]
    pub fn get(&self, channel: Channel) -> Option<&Waveform> {
        self.waveforms.get(&channel)
    }

    /// Returns the waveform of `channel`.
    pub fn waveform(&self, channel: Channel) -> Result<&Waveform, VerificationError> {
        self.get(channel).ok_or_else(|| {
            InstrumentError::new(format!("Channel {channel} was not captured")).into()
        })
    }

    /// The captured channels, ascending.
    pub fn channels(&self) -> impl Iterator<Item = Channel> + '_ {
        self.waveforms.keys().copied()
    }

    /// The number of samples per channel.
    #[must_use]
    pub fn len(&self) -> usize {
        self.time_axis.len()
    }

    /// Returns `true` if no sample was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.time_axis.is_empty()
    }
}
