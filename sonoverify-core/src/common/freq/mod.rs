mod float;

use derive_more::{Add, Div, Mul, Sub};

/// \[Hz\]
pub struct Hz;

/// \[kHz\]
#[allow(non_camel_case_types)]
pub struct kHz;

/// \[MHz\]
pub struct MHz;

/// Frequency
///
/// Built by multiplying a number with a unit marker, e.g. `400. * kHz`.
#[derive(Clone, Copy, PartialEq, PartialOrd, Default, Add, Sub, Mul, Div)]
pub struct Freq<T> {
    pub(crate) freq: T,
}

impl<T: std::fmt::Display> std::fmt::Debug for Freq<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} Hz", self.freq)
    }
}

impl<T: Copy> Freq<T> {
    /// Returns the frequency in Hz.
    #[inline]
    pub const fn hz(&self) -> T {
        self.freq
    }
}

impl Freq<f64> {
    /// Returns the frequency in MHz.
    #[must_use]
    pub fn mhz(&self) -> f64 {
        self.freq * 1e-6
    }

    /// Returns the period in seconds.
    #[must_use]
    pub fn period(&self) -> f64 {
        self.freq.recip()
    }

    /// Returns the angular frequency in \[rad/s\].
    #[must_use]
    pub fn omega(&self) -> f64 {
        2. * std::f64::consts::PI * self.freq
    }
}
