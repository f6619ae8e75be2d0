use itertools::iproduct;

/// Metric values over a rectangular grid of focus positions.
///
/// Values are stored in Cartesian-product order: x outer, y inner.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanResult {
    xs: Vec<f64>,
    ys: Vec<f64>,
    values: Vec<f64>,
}

impl ScanResult {
    pub(crate) fn new(xs: Vec<f64>, ys: Vec<f64>, values: Vec<f64>) -> Self {
        debug_assert_eq!(xs.len() * ys.len(), values.len());
        Self { xs, ys, values }
    }

    /// The x coordinates in \[mm\].
    #[must_use]
    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    /// The y coordinates in \[mm\].
    #[must_use]
    pub fn ys(&self) -> &[f64] {
        &self.ys
    }

    /// The values in scan order.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// The number of grid points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the grid has no point.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the value at the `i`-th x and `j`-th y coordinate.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        (i < self.xs.len() && j < self.ys.len()).then(|| self.values[i * self.ys.len() + j])
    }

    /// Iterates over `(x, y, value)` in scan order.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        iproduct!(self.xs.iter(), self.ys.iter())
            .zip(self.values.iter())
            .map(|((&x, &y), &v)| (x, y, v))
    }

    /// Returns the point with the largest value. NaN values are ignored.
    #[must_use]
    pub fn argmax(&self) -> Option<(f64, f64, f64)> {
        self.iter()
            .filter(|(_, _, v)| !v.is_nan())
            .max_by(|a, b| a.2.total_cmp(&b.2))
    }
}
