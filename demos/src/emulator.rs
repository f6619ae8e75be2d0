mod tests;

use anyhow::Result;

use sonoverify::{base::geometry::Point3, prelude::*};
use sonoverify_emulator::{Bench, EmulatorOption, GaussianFocus};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let bench = Bench::new(
        GaussianFocus {
            center: Point3::new(2., -1., 50.),
            peak: 1e5,
            width: 2.,
        },
        EmulatorOption {
            noise_v: 1e-5,
            ..Default::default()
        },
    );

    let coordinator = CaptureCoordinator::new(
        bench.scope(),
        bench.transducer(),
        bench.power_supply(),
    );

    tests::run(coordinator)
}
