use std::{collections::BTreeMap, time::Duration};

use rand::Rng;
use sonoverify_core::{
    common::{METER, WATER_SOUND_SPEED},
    instrument::{
        BlockConfig, Channel, ChannelOption, InstrumentError, Scope, ScopeData, TriggerOption,
    },
    sleep::{Sleep, StdSleeper},
    Waveform,
};
use sonoverify_hydrophone::Deconvolver;

use crate::bench::{Bench, BenchState, Event, Fault};

/// The sampling interval in \[s\] of a timebase index.
#[must_use]
pub fn timebase_interval(timebase: u32) -> f64 {
    if timebase < 3 {
        (1u64 << timebase) as f64 / 1e9
    } else {
        (timebase - 2) as f64 / 125e6
    }
}

impl BenchState {
    /// Synthesizes a block; `fired` tells whether the transducer emitted into it.
    pub(crate) fn acquire(
        &mut self,
        block: &BlockConfig,
        fired: bool,
    ) -> Result<ScopeData, InstrumentError> {
        let n = block.num_samples();
        let dt = timebase_interval(block.timebase);
        let t_trigger = block.pre_trigger_samples as f64 * dt;
        let time_axis = (0..n).map(|i| i as f64 * dt).collect::<Vec<_>>();

        let mut pressure = vec![0.; n];
        let mut sync = vec![0.; n];
        if let (true, Some(pulse), Some(focus)) = (fired, self.pulse.as_ref(), self.focus.as_ref())
        {
            let amp = self.field.pressure_per_volt(focus.position()) * pulse.voltage;
            let delay = focus.z().abs() / METER / WATER_SOUND_SPEED;
            let freq = pulse.frequency.hz();
            let duration = pulse.duration.as_secs_f64();
            tracing::trace!("Synthesizing burst: {} Pa, delay {} s", amp, delay);
            time_axis.iter().enumerate().for_each(|(i, &t)| {
                let since_trigger = t - t_trigger;
                if (0.0..duration).contains(&since_trigger) {
                    sync[i] = self.option.sync_level_v;
                }
                let tau = since_trigger - delay;
                if (0.0..duration).contains(&tau) {
                    pressure[i] = amp * (2. * std::f64::consts::PI * freq * tau).sin();
                }
            });
        }

        let hydrophone = match &self.option.hydrophone {
            Some(model) => {
                let pressure = Waveform::new(pressure, dt)
                    .map_err(|e| InstrumentError::new(e.to_string()))?;
                Deconvolver::default()
                    .apply_response(&pressure, model)
                    .map_err(|e| InstrumentError::new(e.to_string()))?
                    .into_samples()
            }
            None => pressure
                .into_iter()
                .map(|p| p / self.option.sensitivity_pa_per_v)
                .collect(),
        };

        let mut channels = BTreeMap::new();
        channels.insert(Channel::A, hydrophone);
        channels.insert(Channel::B, sync);
        channels.insert(Channel::C, vec![0.; n]);
        channels.insert(Channel::D, vec![0.; n]);

        let noise = self.option.noise_v;
        if noise > 0. {
            channels
                .values_mut()
                .flat_map(|samples| samples.iter_mut())
                .for_each(|v| *v += self.rng.random_range(-noise..=noise));
        }

        Ok(ScopeData {
            channels,
            time_axis,
            sample_interval: dt,
        })
    }
}

/// An emulated oscilloscope.
pub struct ScopeEmulator {
    bench: Bench,
}

impl ScopeEmulator {
    pub(crate) const fn new(bench: Bench) -> Self {
        Self { bench }
    }
}

impl Scope for ScopeEmulator {
    fn configure_channel(
        &mut self,
        channel: Channel,
        option: &ChannelOption,
    ) -> Result<(), InstrumentError> {
        let mut state = self.bench.lock();
        state.check(Fault::Scope, "Scope")?;
        state.events.push(Event::ConfigureChannel(channel));
        state.channels.insert(channel, *option);
        Ok(())
    }

    fn configure_trigger(&mut self, option: &TriggerOption) -> Result<(), InstrumentError> {
        let mut state = self.bench.lock();
        state.check(Fault::Scope, "Scope")?;
        state.events.push(Event::ConfigureTrigger);
        state.trigger = *option;
        Ok(())
    }

    fn arm(&mut self, block: &BlockConfig) -> Result<(), InstrumentError> {
        let mut state = self.bench.lock();
        state.check(Fault::Scope, "Scope")?;
        state.events.push(Event::Arm);
        if block.num_samples() == 0 {
            return Err(InstrumentError::new(
                "Block must contain at least one sample".to_owned(),
            ));
        }
        state.armed = Some(*block);
        state.acquired = None;
        Ok(())
    }

    fn wait_complete(&mut self, timeout: Duration) -> Result<bool, InstrumentError> {
        let mut state = self.bench.lock();
        state.check(Fault::Scope, "Scope")?;
        state.events.push(Event::WaitComplete);
        if state.acquired.is_some() {
            return Ok(true);
        }
        let block = state
            .armed
            .ok_or_else(|| InstrumentError::new("Scope is not armed".to_owned()))?;

        let auto_trigger = state.trigger.auto_trigger;
        let never_complete = state.has_fault(Fault::NeverComplete);
        match auto_trigger {
            Some(delay) if delay <= timeout && !never_complete => {
                drop(state);
                StdSleeper.sleep(delay);
                let mut state = self.bench.lock();
                tracing::debug!("Auto trigger after {:?}", delay);
                let data = state.acquire(&block, false)?;
                state.acquired = Some(data);
                state.armed = None;
                Ok(true)
            }
            _ => {
                drop(state);
                StdSleeper.sleep(timeout);
                Ok(false)
            }
        }
    }

    fn read(&mut self, channels: &[Channel]) -> Result<ScopeData, InstrumentError> {
        let mut state = self.bench.lock();
        state.check(Fault::Scope, "Scope")?;
        state.events.push(Event::Read);
        let data = state
            .acquired
            .as_ref()
            .ok_or_else(|| InstrumentError::new("No completed acquisition".to_owned()))?;
        let mut out = BTreeMap::new();
        for &ch in channels {
            if !state.channels.get(&ch).is_some_and(|c| c.enabled) {
                return Err(InstrumentError::new(format!("Channel {ch} is disabled")));
            }
            if state.has_fault(Fault::MissingChannel(ch)) {
                continue;
            }
            if let Some(samples) = data.channels.get(&ch) {
                out.insert(ch, samples.clone());
            }
        }
        Ok(ScopeData {
            channels: out,
            time_axis: data.time_axis.clone(),
            sample_interval: data.sample_interval,
        })
    }

    fn stop(&mut self) -> Result<(), InstrumentError> {
        let mut state = self.bench.lock();
        state.check(Fault::Scope, "Scope")?;
        state.events.push(Event::StopScope);
        state.armed = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use sonoverify_core::{
        geometry::Point3,
        instrument::{PulseParams, Transducer},
        FocusPoint,
    };

    use super::*;
    use crate::bench::EmulatorOption;

    #[rstest::rstest]
    #[case(1e-9, 0)]
    #[case(2e-9, 1)]
    #[case(4e-9, 2)]
    #[case(8e-9, 3)]
    #[case(48e-9, 8)]
    fn interval(#[case] expect: f64, #[case] timebase: u32) {
        approx::assert_relative_eq!(expect, timebase_interval(timebase), max_relative = 1e-12);
    }

    fn block() -> BlockConfig {
        BlockConfig {
            pre_trigger_samples: 100,
            post_trigger_samples: 2000,
            timebase: 3,
        }
    }

    #[test]
    fn burst() -> anyhow::Result<()> {
        let bench = Bench::new(
            |_: &Point3| 10.,
            EmulatorOption {
                sensitivity_pa_per_v: 100.,
                ..Default::default()
            },
        );
        let mut scope = bench.scope();
        let mut transducer = bench.transducer();
        transducer.configure_pulse(&PulseParams::default())?;
        transducer.set_focus(&FocusPoint::at(0., 0., 3.))?;
        scope.arm(&block())?;
        transducer.trigger_pulse()?;
        assert!(scope.wait_complete(Duration::ZERO)?);

        let data = scope.read(&[Channel::A, Channel::B])?;
        assert_eq!(2100, data.time_axis.len());
        assert_eq!(8e-9, data.sample_interval);

        // 10 Pa/V at 10 V through 100 Pa/V; 3 mm of water delays the burst by 2 us.
        let a = &data.channels[&Channel::A];
        let onset = 100 + 250;
        assert!(a[..onset].iter().all(|&v| v == 0.));
        let peak = a.iter().copied().fold(0., f64::max);
        approx::assert_abs_diff_eq!(1., peak, epsilon = 1e-2);

        let b = &data.channels[&Channel::B];
        assert_eq!(0., b[99]);
        assert_eq!(3.3, b[100]);
        Ok(())
    }

    #[test]
    fn timeout_without_trigger() -> anyhow::Result<()> {
        let bench = Bench::new(|_: &Point3| 0., EmulatorOption::default());
        let mut scope = bench.scope();
        scope.arm(&block())?;
        assert!(!scope.wait_complete(Duration::from_millis(1))?);
        assert!(scope.read(&[Channel::A]).is_err());
        Ok(())
    }

    #[test]
    fn auto_trigger() -> anyhow::Result<()> {
        let bench = Bench::new(|_: &Point3| 0., EmulatorOption::default());
        let mut scope = bench.scope();
        scope.configure_trigger(&TriggerOption {
            auto_trigger: Some(Duration::from_millis(1)),
            ..Default::default()
        })?;
        scope.arm(&block())?;
        assert!(scope.wait_complete(Duration::from_millis(100))?);
        let data = scope.read(&[Channel::B])?;
        assert!(data.channels[&Channel::B].iter().all(|&v| v == 0.));
        Ok(())
    }

    #[test]
    fn disabled_channel() -> anyhow::Result<()> {
        let bench = Bench::new(|_: &Point3| 0., EmulatorOption::default());
        let mut scope = bench.scope();
        scope.configure_channel(
            Channel::C,
            &ChannelOption {
                enabled: false,
                ..Default::default()
            },
        )?;
        scope.configure_trigger(&TriggerOption {
            auto_trigger: Some(Duration::ZERO),
            ..Default::default()
        })?;
        scope.arm(&block())?;
        assert!(scope.wait_complete(Duration::ZERO)?);
        assert_eq!(
            Err(InstrumentError::new("Channel C is disabled".to_owned())),
            scope.read(&[Channel::C])
        );
        Ok(())
    }

    #[test]
    fn noise_is_seeded() -> anyhow::Result<()> {
        let read = || -> anyhow::Result<Vec<f64>> {
            let bench = Bench::new(
                |_: &Point3| 0.,
                EmulatorOption {
                    noise_v: 1e-3,
                    seed: 42,
                    ..Default::default()
                },
            );
            let mut state = bench.lock();
            Ok(state.acquire(&block(), false)?.channels[&Channel::A].clone())
        };
        let a = read()?;
        assert_eq!(a, read()?);
        assert!(a.iter().all(|v| v.abs() <= 1e-3));
        assert!(a.iter().any(|&v| v != 0.));
        Ok(())
    }

    #[test]
    fn broken() {
        let bench = Bench::new(|_: &Point3| 0., EmulatorOption::default());
        bench.break_down(Fault::Scope);
        let mut scope = bench.scope();
        assert_eq!(
            Err(InstrumentError::new("Scope is broken".to_owned())),
            scope.arm(&block())
        );
        assert!(bench.events().is_empty());
    }
}
