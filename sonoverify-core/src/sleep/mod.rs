use std::time::{Duration, Instant};

pub use spin_sleep::{SpinSleeper, SpinStrategy};

#[cfg(target_os = "windows")]
unsafe extern "system" {
    fn timeBeginPeriod(u: u32) -> u32;
    fn timeEndPeriod(u: u32) -> u32;
}

/// A trait for sleep operations.
pub trait Sleep: core::fmt::Debug {
    /// Sleep for the specified duration.
    fn sleep(&self, duration: Duration);
}

impl Sleep for Box<dyn Sleep> {
    fn sleep(&self, duration: Duration) {
        self.as_ref().sleep(duration);
    }
}

impl Sleep for Box<dyn Sleep + Send> {
    fn sleep(&self, duration: Duration) {
        self.as_ref().sleep(duration);
    }
}

/// A sleeper that uses [`std::thread::sleep`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StdSleeper;

impl Sleep for StdSleeper {
    fn sleep(&self, duration: Duration) {
        if duration.is_zero() {
            return;
        }

        #[cfg(target_os = "windows")]
        unsafe {
            timeBeginPeriod(1);
        }
        std::thread::sleep(duration);
        #[cfg(target_os = "windows")]
        unsafe {
            timeEndPeriod(1);
        }
    }
}

impl Sleep for SpinSleeper {
    fn sleep(&self, duration: Duration) {
        SpinSleeper::sleep(*self, duration);
    }
}

/// A sleeper that uses a spin loop to wait until the deadline is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpinWaitSleeper;

impl Sleep for SpinWaitSleeper {
    fn sleep(&self, duration: Duration) {
        let deadline = Instant::now() + duration;
        while Instant::now() < deadline {
            core::hint::spin_loop();
        }
    }
}

/// Calls `condition` every `interval` until it returns `true` or `timeout` elapses.
///
/// The condition is always evaluated at least once, and once more after the deadline.
/// Returns `Ok(false)` on timeout.
pub fn poll_until<S, E, F>(
    sleeper: &S,
    timeout: Duration,
    interval: Duration,
    mut condition: F,
) -> Result<bool, E>
where
    S: Sleep + ?Sized,
    F: FnMut() -> Result<bool, E>,
{
    let start = Instant::now();
    loop {
        if condition()? {
            return Ok(true);
        }
        if start.elapsed() > timeout {
            return Ok(false);
        }
        sleeper.sleep(interval);
    }
}
