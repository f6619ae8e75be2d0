/// The option of [`gradient_ascent`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientAscentOption {
    /// The finite-difference step in \[mm\].
    pub step_size: f64,
    /// The number of iterations.
    pub iterations: usize,
    /// The gradient multiplier of each update.
    pub learning_rate: f64,
}

impl Default for GradientAscentOption {
    fn default() -> Self {
        Self {
            step_size: 0.5,
            iterations: 10,
            learning_rate: 0.1,
        }
    }
}

impl GradientAscentOption {
    pub(crate) fn validate(&self) -> Result<(), String> {
        if !(self.step_size.is_finite() && self.step_size > 0.) {
            return Err(format!(
                "step size must be positive and finite, got {}",
                self.step_size
            ));
        }
        if !self.learning_rate.is_finite() {
            return Err(format!(
                "learning rate must be finite, got {}",
                self.learning_rate
            ));
        }
        Ok(())
    }
}

/// Maximizes `objective(x, y)` by fixed-step gradient ascent.
///
/// Each iteration estimates the gradient with central differences, which costs four
/// evaluations, and moves by `learning_rate` times the gradient. The iteration budget is
/// fixed: there is no convergence test, step adaptation or monotonicity check. The first
/// error returned by `objective` aborts the search.
pub fn gradient_ascent<E>(
    mut objective: impl FnMut(f64, f64) -> Result<f64, E>,
    x0: f64,
    y0: f64,
    option: &GradientAscentOption,
) -> Result<(f64, f64), E> {
    let h = option.step_size;
    let (mut x, mut y) = (x0, y0);
    for i in 0..option.iterations {
        let grad_x = (objective(x + h, y)? - objective(x - h, y)?) / (2. * h);
        let grad_y = (objective(x, y + h)? - objective(x, y - h)?) / (2. * h);
        x += option.learning_rate * grad_x;
        y += option.learning_rate * grad_y;
        tracing::info!(
            "Iteration {}: ({:.3}, {:.3}), gradient ({:.3e}, {:.3e})",
            i + 1,
            x,
            y,
            grad_x,
            grad_y
        );
    }
    Ok((x, y))
}
