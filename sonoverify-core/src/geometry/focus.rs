use getset::Getters;

use super::Point3;

/// A point at which the transducer concentrates its beamformed energy.
///
/// The position is given in millimeters in the transducer's coordinate system.
/// `apodization` holds one weight per transducer element; `None` means uniform weighting.
#[derive(Clone, Debug, PartialEq, Getters)]
pub struct FocusPoint {
    #[getset(get = "pub")]
    /// The position of the focus.
    position: Point3,
    #[getset(get = "pub")]
    /// The element weights.
    apodization: Option<Vec<f64>>,
}

impl FocusPoint {
    /// Creates a new [`FocusPoint`] with uniform apodization.
    #[must_use]
    pub const fn new(position: Point3) -> Self {
        Self {
            position,
            apodization: None,
        }
    }

    /// Creates a new [`FocusPoint`] from coordinates in millimeters.
    #[must_use]
    pub fn at(x: f64, y: f64, z: f64) -> Self {
        Self::new(Point3::new(x, y, z))
    }

    /// Sets the element weights.
    #[must_use]
    pub fn with_apodization(self, apodization: impl IntoIterator<Item = f64>) -> Self {
        Self {
            apodization: Some(apodization.into_iter().collect()),
            ..self
        }
    }

    /// Returns the x coordinate.
    #[must_use]
    pub fn x(&self) -> f64 {
        self.position.x
    }

    /// Returns the y coordinate.
    #[must_use]
    pub fn y(&self) -> f64 {
        self.position.y
    }

    /// Returns the z coordinate.
    #[must_use]
    pub fn z(&self) -> f64 {
        self.position.z
    }

    /// Returns the weight of the `idx`-th element. Elements default to `1.0` without apodization.
    #[must_use]
    pub fn weight(&self, idx: usize) -> Option<f64> {
        match &self.apodization {
            Some(w) => w.get(idx).copied(),
            None => Some(1.0),
        }
    }
}
