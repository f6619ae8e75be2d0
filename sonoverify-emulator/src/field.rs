use sonoverify_core::geometry::Point3;

/// The acoustic pressure at a fixed hydrophone as a function of the focus position.
pub trait AcousticField: Send {
    /// The peak pressure in \[Pa\] per volt of drive when the beam is focused at `focus`
    /// (in \[mm\]).
    fn pressure_per_volt(&self, focus: &Point3) -> f64;
}

impl<F> AcousticField for F
where
    F: Fn(&Point3) -> f64 + Send,
{
    fn pressure_per_volt(&self, focus: &Point3) -> f64 {
        self(focus)
    }
}

/// A Gaussian focal spot around the hydrophone position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianFocus {
    /// The hydrophone position in \[mm\].
    pub center: Point3,
    /// The pressure at the center in \[Pa/V\].
    pub peak: f64,
    /// The standard deviation of the spot in \[mm\].
    pub width: f64,
}

impl AcousticField for GaussianFocus {
    fn pressure_per_volt(&self, focus: &Point3) -> f64 {
        let d2 = (focus - self.center).norm_squared();
        self.peak * (-d2 / (2. * self.width * self.width)).exp()
    }
}
