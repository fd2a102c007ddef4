/// Outcome of a Halley iteration.
#[derive(Debug, Clone, Copy)]
pub struct HalleyResult {
    pub root: f64,
    /// Number of updates actually applied before the step size vanished (or
    /// the iteration budget ran out).
    pub iterations: usize,
}

/// Halley's method: cubically convergent root finding for a function with
/// cheap first and second derivatives.
///
/// `f_and_derivs` returns (f, f', f'') at a point. The update is
///
///   x <- x - (f f') / (f'^2 - f f'' / 2)
///
/// Iteration stops early once the step is below machine precision relative
/// to x, so `iterations` reports how quickly the guess settled. The caller
/// is responsible for checking the residual.
pub fn halley(
    f_and_derivs: impl Fn(f64) -> (f64, f64, f64),
    initial_guess: f64,
    max_iterations: usize,
) -> HalleyResult {
    let mut x = initial_guess;

    for i in 0..max_iterations {
        let (f, f_prime, f_prime2) = f_and_derivs(x);
        if f == 0.0 {
            return HalleyResult {
                root: x,
                iterations: i,
            };
        }

        let denominator = f_prime * f_prime - 0.5 * f * f_prime2;
        let step = f * f_prime / denominator;
        if !step.is_finite() {
            // Flat spot; nothing more we can do from here
            return HalleyResult {
                root: x,
                iterations: i,
            };
        }

        x -= step;

        if step.abs() <= f64::EPSILON * x.abs().max(1.0) {
            return HalleyResult {
                root: x,
                iterations: i + 1,
            };
        }
    }

    HalleyResult {
        root: x,
        iterations: max_iterations,
    }
}
