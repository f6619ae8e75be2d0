use std::time::Duration;

use sonoverify::{base::geometry::Point3, prelude::*};
use sonoverify_emulator::{Bench, EmulatorOption, Event, Fault};

use crate::{block, open, TIMEOUT};

fn bench() -> Bench {
    Bench::new(|_: &Point3| 1e3, EmulatorOption::default())
}

#[test]
fn protocol_order() -> anyhow::Result<()> {
    let bench = bench();
    let mut coordinator = open(&bench);

    let capture =
        coordinator.capture(&PulseParams::default(), &FocusPoint::at(1., 2., 3.), &block())?;

    assert_eq!(
        vec![
            Event::ConfigurePulse,
            Event::SetFocus(Point3::new(1., 2., 3.)),
            Event::Arm,
            Event::Trigger,
            Event::WaitComplete,
            Event::Read,
        ],
        bench.events()
    );
    assert_eq!(
        vec![Channel::A, Channel::B],
        capture.channels().collect::<Vec<_>>()
    );
    assert_eq!(2100, capture.len());
    assert_eq!(0., capture.time_axis()[0]);
    assert_eq!(8e-9, capture.waveform(Channel::A)?.sample_interval());
    assert_eq!(1, bench.num_triggers());
    Ok(())
}

#[test]
fn capture_reflects_focus() -> anyhow::Result<()> {
    let bench = Bench::new(
        |p: &Point3| if p.x == 0. { 1e3 } else { 0. },
        EmulatorOption::default(),
    );
    let mut coordinator = open(&bench);
    let pulse = PulseParams::default();

    let on = coordinator.capture(&pulse, &FocusPoint::at(0., 0., 3.), &block())?;
    let off = coordinator.capture(&pulse, &FocusPoint::at(5., 0., 3.), &block())?;

    assert!(on.waveform(Channel::A)?.peak_to_peak() > 0.);
    assert_eq!(0., off.waveform(Channel::A)?.peak_to_peak());
    assert_eq!(
        on.waveform(Channel::B)?.peak_to_peak(),
        off.waveform(Channel::B)?.peak_to_peak()
    );
    Ok(())
}

#[test]
fn timeout_then_retry() -> anyhow::Result<()> {
    let bench = bench();
    let mut coordinator = open(&bench);
    let pulse = PulseParams::default();
    let focus = FocusPoint::at(0., 0., 3.);

    bench.break_down(Fault::NeverComplete);
    let res = coordinator.capture(&pulse, &focus, &block());
    assert!(matches!(
        res,
        Err(VerificationError::CaptureTimeout { timeout }) if timeout == TIMEOUT
    ));
    assert_eq!(Some(&Event::StopScope), bench.events().last());

    bench.repair();
    bench.clear_events();
    coordinator.capture(&pulse, &focus, &block())?;
    assert_eq!(Some(&Event::Read), bench.events().last());
    assert_eq!(2, bench.num_triggers());
    Ok(())
}

#[test]
fn trigger_failure_stops_scope() -> anyhow::Result<()> {
    let bench = bench();
    let mut coordinator = open(&bench);
    let pulse = PulseParams::default();
    let focus = FocusPoint::at(0., 0., 3.);

    bench.break_down(Fault::FailAfterTriggers(0));
    match coordinator.capture(&pulse, &focus, &block()) {
        Err(VerificationError::Instrument(e)) => {
            assert_eq!("Trigger failed after 0 pulses", e.msg())
        }
        other => panic!("expected instrument error, got {other:?}"),
    }
    assert_eq!(
        vec![
            Event::ConfigurePulse,
            Event::SetFocus(Point3::new(0., 0., 3.)),
            Event::Arm,
            Event::StopScope
        ],
        bench.events()
    );

    bench.repair();
    bench.clear_events();
    coordinator.capture(&pulse, &focus, &block())?;
    assert_eq!(Some(&Event::Read), bench.events().last());
    Ok(())
}

#[rstest::rstest]
#[case(Fault::Scope, "Scope is broken")]
#[case(Fault::Transducer, "Transducer is broken")]
#[case(Fault::MissingChannel(Channel::B), "Scope returned no data for channel B")]
fn instrument_failure(#[case] fault: Fault, #[case] expect: &str) {
    let bench = bench();
    let mut coordinator = open(&bench);
    bench.break_down(fault);
    match coordinator.capture(&PulseParams::default(), &FocusPoint::at(0., 0., 3.), &block()) {
        Err(VerificationError::Instrument(e)) => assert_eq!(expect, e.msg()),
        other => panic!("expected instrument error, got {other:?}"),
    }
}

#[test]
fn staged_protocol() -> anyhow::Result<()> {
    let bench = bench();
    let mut coordinator = open(&bench);

    let armed = coordinator.arm(
        &PulseParams::default(),
        &FocusPoint::at(0., 0., 3.),
        &block(),
    )?;
    let mut triggered = armed.trigger()?;
    assert!(triggered.wait(Duration::ZERO)?);
    let data = triggered.read(&[Channel::C])?;
    assert!(data.channels[&Channel::C].iter().all(|&v| v == 0.));
    Ok(())
}

#[test]
fn configure_scope() -> anyhow::Result<()> {
    let bench = bench();
    let mut coordinator = open(&bench);
    coordinator.configure_scope(
        &[
            (Channel::A, ChannelOption::default()),
            (
                Channel::B,
                ChannelOption {
                    range_mv: 5000,
                    ..Default::default()
                },
            ),
        ],
        &TriggerOption::default(),
    )?;
    assert_eq!(
        vec![
            Event::ConfigureChannel(Channel::A),
            Event::ConfigureChannel(Channel::B),
            Event::ConfigureTrigger
        ],
        bench.events()
    );
    Ok(())
}

#[test]
fn drive_voltage() -> anyhow::Result<()> {
    let bench = bench();
    let mut coordinator = open(&bench);
    coordinator.enable_output(true)?;
    coordinator.set_drive_voltage(12., &SettleOption::default())?;
    let readback = coordinator.power_supply_mut().get_voltage(1)?;
    approx::assert_relative_eq!(12., readback, max_relative = 0.02);
    Ok(())
}

#[test]
fn settle_timeout() -> anyhow::Result<()> {
    let bench = bench();
    let mut coordinator = open(&bench);
    coordinator.enable_output(true)?;
    bench.break_down(Fault::StuckVoltage);
    let settle = SettleOption {
        timeout: Duration::from_millis(20),
        ..Default::default()
    };
    let res = coordinator.set_drive_voltage(12., &settle);
    assert!(matches!(
        res,
        Err(VerificationError::SettleTimeout { target, timeout })
            if target == 12. && timeout == Duration::from_millis(20)
    ));
    Ok(())
}

#[test]
fn close_releases_outputs() -> anyhow::Result<()> {
    let bench = bench();
    let mut coordinator = open(&bench);
    coordinator.enable_output(true)?;
    assert!(bench.output_enabled(1));
    bench.clear_events();

    coordinator.close()?;

    assert!(!bench.output_enabled(1));
    assert!(!bench.output_enabled(2));
    assert_eq!(
        vec![Event::SetOutput(false), Event::StopTrigger, Event::StopScope],
        bench.events()
    );
    Ok(())
}

#[test]
fn drop_releases_outputs() -> anyhow::Result<()> {
    let bench = bench();
    {
        let mut coordinator = open(&bench);
        coordinator.enable_output(true)?;
        assert!(bench.output_enabled(2));
    }
    assert!(!bench.output_enabled(2));
    Ok(())
}

#[test]
fn close_reports_first_error() -> anyhow::Result<()> {
    let bench = bench();
    let mut coordinator = open(&bench);
    coordinator.enable_output(true)?;
    bench.break_down(Fault::Transducer);

    let res = coordinator.close();

    assert!(matches!(res, Err(VerificationError::Instrument(_))));
    assert!(!bench.output_enabled(1));
    assert_eq!(Some(&Event::StopScope), bench.events().last());
    Ok(())
}
