use std::{collections::BTreeMap, time::Duration};

use derive_more::Display;

use super::InstrumentError;

/// An input channel of the oscilloscope.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Channel {
    /// Channel A
    A,
    /// Channel B
    B,
    /// Channel C
    C,
    /// Channel D
    D,
}

impl Channel {
    /// All channels.
    pub const ALL: [Channel; 4] = [Channel::A, Channel::B, Channel::C, Channel::D];
}

/// The input coupling of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Coupling {
    /// AC coupling
    AC,
    /// DC coupling
    #[default]
    DC,
}

/// The option of a scope channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelOption {
    /// Whether the channel is enabled.
    pub enabled: bool,
    /// The full-scale input range in \[mV\].
    pub range_mv: u32,
    /// The input coupling.
    pub coupling: Coupling,
    /// The analog offset in \[V\].
    pub offset: f64,
}

impl Default for ChannelOption {
    fn default() -> Self {
        Self {
            enabled: true,
            range_mv: 100,
            coupling: Coupling::DC,
            offset: 0.,
        }
    }
}

/// The edge or level that fires the trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriggerDirection {
    /// Fires on a rising edge.
    #[default]
    Rising,
    /// Fires on a falling edge.
    Falling,
    /// Fires while the signal is above the threshold.
    GateHigh,
    /// Fires while the signal is below the threshold.
    GateLow,
}

/// The option of the scope trigger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerOption {
    /// The source channel.
    pub channel: Channel,
    /// The threshold in \[mV\].
    pub threshold_mv: f64,
    /// The direction.
    pub direction: TriggerDirection,
    /// If `Some`, the scope triggers by itself after this duration.
    pub auto_trigger: Option<Duration>,
}

impl Default for TriggerOption {
    fn default() -> Self {
        Self {
            channel: Channel::B,
            threshold_mv: 1000.,
            direction: TriggerDirection::Rising,
            auto_trigger: None,
        }
    }
}

/// The configuration of a block-mode acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockConfig {
    /// The number of samples before the trigger event.
    pub pre_trigger_samples: usize,
    /// The number of samples after the trigger event.
    pub post_trigger_samples: usize,
    /// The instrument-specific index of the sampling interval.
    pub timebase: u32,
}

impl BlockConfig {
    /// The total number of samples of the acquisition.
    #[must_use]
    pub const fn num_samples(&self) -> usize {
        self.pre_trigger_samples + self.post_trigger_samples
    }
}

impl Default for BlockConfig {
    fn default() -> Self {
        Self {
            pre_trigger_samples: 2500,
            post_trigger_samples: 10000,
            timebase: 8,
        }
    }
}

/// Raw data read back from the scope after a block acquisition.
///
/// Samples are in \[V\]; the time axis and the sample interval are in \[s\].
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeData {
    /// The samples of each channel.
    pub channels: BTreeMap<Channel, Vec<f64>>,
    /// The time of each sample, shared by all channels.
    pub time_axis: Vec<f64>,
    /// The time between samples.
    pub sample_interval: f64,
}

/// A trait that provides the interface with the oscilloscope.
pub trait Scope: Send {
    /// Configures an input channel.
    fn configure_channel(
        &mut self,
        channel: Channel,
        option: &ChannelOption,
    ) -> Result<(), InstrumentError>;

    /// Configures the trigger.
    fn configure_trigger(&mut self, option: &TriggerOption) -> Result<(), InstrumentError>;

    /// Arms the scope for a single block acquisition.
    fn arm(&mut self, block: &BlockConfig) -> Result<(), InstrumentError>;

    /// Blocks until the armed acquisition completes or `timeout` elapses.
    ///
    /// Returns `false` on timeout.
    fn wait_complete(&mut self, timeout: Duration) -> Result<bool, InstrumentError>;

    /// Reads back the samples of the completed acquisition.
    fn read(&mut self, channels: &[Channel]) -> Result<ScopeData, InstrumentError>;

    /// Aborts a pending acquisition.
    fn stop(&mut self) -> Result<(), InstrumentError> {
        Ok(())
    }
}

impl Scope for Box<dyn Scope> {
    fn configure_channel(
        &mut self,
        channel: Channel,
        option: &ChannelOption,
    ) -> Result<(), InstrumentError> {
        self.as_mut().configure_channel(channel, option)
    }

    fn configure_trigger(&mut self, option: &TriggerOption) -> Result<(), InstrumentError> {
        self.as_mut().configure_trigger(option)
    }

    fn arm(&mut self, block: &BlockConfig) -> Result<(), InstrumentError> {
        self.as_mut().arm(block)
    }

    fn wait_complete(&mut self, timeout: Duration) -> Result<bool, InstrumentError> {
        self.as_mut().wait_complete(timeout)
    }

    fn read(&mut self, channels: &[Channel]) -> Result<ScopeData, InstrumentError> {
        self.as_mut().read(channels)
    }

    fn stop(&mut self) -> Result<(), InstrumentError> {
        self.as_mut().stop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_config() {
        let block = BlockConfig::default();
        assert_eq!(12500, block.num_samples());
        assert_eq!(8, block.timebase);
    }

    #[test]
    fn channel_display() {
        assert_eq!(
            vec!["A", "B", "C", "D"],
            Channel::ALL.iter().map(|c| c.to_string()).collect::<Vec<_>>()
        );
    }
}
