use sonoverify::{base::geometry::Point3, prelude::*};
use sonoverify_emulator::{Bench, EmulatorOption, Event, Fault};

use crate::{block, open};

const Z: f64 = 3.;

fn unit_bench(field: impl Fn(&Point3) -> f64 + Send + 'static) -> Bench {
    Bench::new(
        field,
        EmulatorOption {
            sensitivity_pa_per_v: 1.,
            ..Default::default()
        },
    )
}

fn unit_pulse() -> PulseParams {
    PulseParams {
        voltage: 1.,
        ..Default::default()
    }
}

fn focuses(bench: &Bench) -> Vec<(f64, f64)> {
    bench
        .events()
        .into_iter()
        .filter_map(|e| match e {
            Event::SetFocus(p) => Some((p.x, p.y)),
            _ => None,
        })
        .collect()
}

#[test]
fn grid_scan_order() -> anyhow::Result<()> {
    let field = |p: &Point3| 100. + 10. * p.x + p.y;
    let bench = unit_bench(field);
    let mut coordinator = open(&bench);
    let mut scanner = FieldScanner::new(&mut coordinator, block());

    let result = scanner.grid_scan(&[0., 1., 2.], &[0., 1.], Z, &unit_pulse())?;

    assert_eq!(
        vec![(0., 0.), (0., 1.), (1., 0.), (1., 1.), (2., 0.), (2., 1.)],
        focuses(&bench)
    );
    assert_eq!(6, result.len());
    assert_eq!(6, bench.num_triggers());

    let reference = result.values()[0] / field(&Point3::new(0., 0., Z));
    result.iter().for_each(|(x, y, v)| {
        approx::assert_relative_eq!(
            field(&Point3::new(x, y, Z)),
            v / reference,
            max_relative = 1e-9
        );
    });
    assert_eq!(Some((2., 1.)), result.argmax().map(|(x, y, _)| (x, y)));
    Ok(())
}

#[test]
fn grid_scan_aborts_on_failure() {
    let bench = unit_bench(|_: &Point3| 1.);
    let mut coordinator = open(&bench);
    let mut scanner = FieldScanner::new(&mut coordinator, block());
    bench.break_down(Fault::FailAfterTriggers(3));

    let res = scanner.grid_scan(&[0., 1., 2.], &[0., 1.], Z, &unit_pulse());

    assert!(matches!(res, Err(VerificationError::Instrument(_))));
    assert_eq!(3, bench.num_triggers());
    assert_eq!(4, focuses(&bench).len());
}

#[rstest::rstest]
#[case(&[], &[0.], Z)]
#[case(&[0.], &[], Z)]
#[case(&[f64::NAN], &[0.], Z)]
#[case(&[0.], &[0.], f64::INFINITY)]
fn grid_scan_invalid(#[case] xs: &[f64], #[case] ys: &[f64], #[case] z: f64) {
    let bench = unit_bench(|_: &Point3| 1.);
    let mut coordinator = open(&bench);
    let mut scanner = FieldScanner::new(&mut coordinator, block());

    let res = scanner.grid_scan(xs, ys, z, &unit_pulse());

    assert!(matches!(res, Err(VerificationError::InvalidScan(_))));
    assert!(bench.events().is_empty());
}

#[test]
fn gradient_ascent_finds_peak() -> anyhow::Result<()> {
    let bench = unit_bench(|p: &Point3| 100. - (p.x - 3.).powi(2) - (p.y + 2.).powi(2));
    let mut coordinator = open(&bench);
    let mut scanner = FieldScanner::new(&mut coordinator, block());

    let (x, y) =
        scanner.gradient_ascent(0., 0., Z, &unit_pulse(), &GradientAscentOption::default())?;

    approx::assert_abs_diff_eq!(3., x, epsilon = 0.5);
    approx::assert_abs_diff_eq!(-2., y, epsilon = 0.5);
    assert_eq!(40, bench.num_triggers());
    Ok(())
}

#[test]
fn gradient_ascent_invalid_option() {
    let bench = unit_bench(|_: &Point3| 1.);
    let mut coordinator = open(&bench);
    let mut scanner = FieldScanner::new(&mut coordinator, block());
    let option = GradientAscentOption {
        step_size: 0.,
        ..Default::default()
    };

    let res = scanner.gradient_ascent(0., 0., Z, &unit_pulse(), &option);

    assert!(matches!(res, Err(VerificationError::InvalidScan(_))));
    assert_eq!(0, bench.num_triggers());
}

#[test]
fn voltage_sweep() -> anyhow::Result<()> {
    let bench = unit_bench(|_: &Point3| 10.);
    let mut coordinator = open(&bench);
    coordinator.enable_output(true)?;
    let mut scanner = FieldScanner::new(&mut coordinator, block());
    let focus = FocusPoint::at(0., 0., Z);

    let sweep = scanner.voltage_sweep(
        &[2., 4., 6.],
        &focus,
        &unit_pulse(),
        &SettleOption::default(),
    )?;

    assert_eq!(
        vec![2., 4., 6.],
        sweep.iter().map(|(v, _)| *v).collect::<Vec<_>>()
    );
    let voltages = bench
        .events()
        .into_iter()
        .filter_map(|e| match e {
            Event::SetVoltage(v) => Some(v),
            _ => None,
        })
        .collect::<Vec<_>>();
    assert_eq!(vec![2., 4., 6.], voltages);

    let p2p = sweep
        .iter()
        .map(|(_, c)| c.waveform(Channel::A).map(|w| w.peak_to_peak()))
        .collect::<Result<Vec<_>, _>>()?;
    approx::assert_relative_eq!(2., p2p[1] / p2p[0], max_relative = 1e-9);
    approx::assert_relative_eq!(3., p2p[2] / p2p[0], max_relative = 1e-9);
    Ok(())
}

#[rstest::rstest]
#[case(&[])]
#[case(&[1., -1.])]
#[case(&[f64::NAN])]
fn voltage_sweep_invalid(#[case] voltages: &[f64]) {
    let bench = unit_bench(|_: &Point3| 1.);
    let mut coordinator = open(&bench);
    let mut scanner = FieldScanner::new(&mut coordinator, block());

    let res = scanner.voltage_sweep(
        voltages,
        &FocusPoint::at(0., 0., Z),
        &unit_pulse(),
        &SettleOption::default(),
    );

    assert!(matches!(res, Err(VerificationError::InvalidScan(_))));
    assert!(bench.events().is_empty());
}

#[test]
fn custom_metric() -> anyhow::Result<()> {
    let bench = unit_bench(|_: &Point3| 1.);
    let mut coordinator = open(&bench);
    let mut scanner = FieldScanner::new(&mut coordinator, block()).with_metric(
        |c: &Capture| -> Result<f64, VerificationError> { Ok(c.waveform(Channel::B)?.max()) },
    );

    assert_eq!(3.3, scanner.measure(0., 0., Z, &unit_pulse())?);
    Ok(())
}
