mod freq;

use std::time::Duration;

pub use freq::*;

/// meter
pub const METER: f64 = 1000.0;

/// millimeter
pub const MILLIMETER: f64 = METER / 1000.0;

/// \[㎜\]
#[allow(non_upper_case_globals)]
pub const mm: f64 = MILLIMETER;

/// The speed of sound in water at room temperature in \[m/s\]
pub const WATER_SOUND_SPEED: f64 = 1500.0;

/// The default timeout of a block acquisition
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// The default delay between arming the scope and firing the pulse
pub const DEFAULT_ARM_DELAY: Duration = Duration::from_millis(10);
