use sonoverify_core::{
    instrument::{InstrumentError, PulseParams, Transducer, TriggerMode},
    FocusPoint,
};

use crate::bench::{Bench, Event, Fault};

/// An emulated transducer driving system.
///
/// A pulse is only observed by an armed [`ScopeEmulator`](crate::ScopeEmulator) attached to
/// the same [`Bench`]; firing without an armed scope is an error.
pub struct TransducerEmulator {
    bench: Bench,
}

impl TransducerEmulator {
    pub(crate) const fn new(bench: Bench) -> Self {
        Self { bench }
    }
}

impl Transducer for TransducerEmulator {
    fn configure_pulse(&mut self, pulse: &PulseParams) -> Result<(), InstrumentError> {
        let mut state = self.bench.lock();
        state.check(Fault::Transducer, "Transducer")?;
        state.events.push(Event::ConfigurePulse);
        state.pulse = Some(*pulse);
        Ok(())
    }

    fn set_focus(&mut self, focus: &FocusPoint) -> Result<(), InstrumentError> {
        let mut state = self.bench.lock();
        state.check(Fault::Transducer, "Transducer")?;
        state.events.push(Event::SetFocus(*focus.position()));
        state.focus = Some(focus.clone());
        Ok(())
    }

    fn trigger_pulse(&mut self) -> Result<(), InstrumentError> {
        let mut state = self.bench.lock();
        state.check(Fault::Transducer, "Transducer")?;
        if state.faults.iter().any(
            |f| matches!(f, Fault::FailAfterTriggers(n) if state.num_triggers >= *n),
        ) {
            return Err(InstrumentError::new(format!(
                "Trigger failed after {} pulses",
                state.num_triggers
            )));
        }
        let pulse = state
            .pulse
            .ok_or_else(|| InstrumentError::new("Pulse is not configured".to_owned()))?;
        let block = state
            .armed
            .ok_or_else(|| InstrumentError::new("Scope is not armed".to_owned()))?;

        state.events.push(Event::Trigger);
        state.num_triggers += 1;
        state.emitting = pulse.mode == TriggerMode::Continuous;

        if state.has_fault(Fault::NeverComplete) {
            tracing::debug!("Pulse fired, but the acquisition will not complete");
            return Ok(());
        }
        let data = state.acquire(&block, true)?;
        state.acquired = Some(data);
        state.armed = None;
        Ok(())
    }

    fn stop_trigger(&mut self) -> Result<(), InstrumentError> {
        let mut state = self.bench.lock();
        state.check(Fault::Transducer, "Transducer")?;
        state.events.push(Event::StopTrigger);
        state.emitting = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use sonoverify_core::{
        geometry::Point3,
        instrument::{BlockConfig, Scope},
    };

    use super::*;
    use crate::bench::EmulatorOption;

    fn bench() -> Bench {
        Bench::new(|_: &Point3| 1., EmulatorOption::default())
    }

    #[test]
    fn trigger_requires_armed_scope() -> anyhow::Result<()> {
        let bench = bench();
        let mut transducer = bench.transducer();
        transducer.configure_pulse(&PulseParams::default())?;
        assert_eq!(
            Err(InstrumentError::new("Scope is not armed".to_owned())),
            transducer.trigger_pulse()
        );
        assert_eq!(0, bench.num_triggers());
        Ok(())
    }

    #[test]
    fn trigger_requires_pulse() -> anyhow::Result<()> {
        let bench = bench();
        bench.scope().arm(&BlockConfig::default())?;
        assert_eq!(
            Err(InstrumentError::new("Pulse is not configured".to_owned())),
            bench.transducer().trigger_pulse()
        );
        Ok(())
    }

    #[test]
    fn fail_after_triggers() -> anyhow::Result<()> {
        let bench = bench();
        bench.break_down(Fault::FailAfterTriggers(2));
        let mut scope = bench.scope();
        let mut transducer = bench.transducer();
        transducer.configure_pulse(&PulseParams::default())?;
        (0..2).try_for_each(|_| -> anyhow::Result<()> {
            scope.arm(&BlockConfig::default())?;
            transducer.trigger_pulse()?;
            Ok(())
        })?;
        scope.arm(&BlockConfig::default())?;
        assert_eq!(
            Err(InstrumentError::new("Trigger failed after 2 pulses".to_owned())),
            transducer.trigger_pulse()
        );
        assert_eq!(2, bench.num_triggers());
        Ok(())
    }

    #[rstest::rstest]
    #[case(false, TriggerMode::Single)]
    #[case(true, TriggerMode::Continuous)]
    fn emitting(#[case] expect: bool, #[case] mode: TriggerMode) -> anyhow::Result<()> {
        let bench = bench();
        let mut transducer = bench.transducer();
        transducer.configure_pulse(&PulseParams {
            mode,
            ..Default::default()
        })?;
        bench.scope().arm(&BlockConfig::default())?;
        transducer.trigger_pulse()?;
        assert_eq!(expect, bench.is_emitting());
        transducer.stop_trigger()?;
        assert!(!bench.is_emitting());
        Ok(())
    }

    #[test]
    fn focus() -> anyhow::Result<()> {
        let bench = bench();
        bench.transducer().set_focus(&FocusPoint::at(1., 2., 3.))?;
        assert_eq!(Some(FocusPoint::at(1., 2., 3.)), bench.focus());
        assert_eq!(
            vec![Event::SetFocus(Point3::new(1., 2., 3.))],
            bench.events()
        );
        Ok(())
    }
}
