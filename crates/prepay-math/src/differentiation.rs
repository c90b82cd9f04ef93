//! Finite-difference derivatives on sampled data.

use crate::error::{MathError, MathResult};

/// Derivative of samples `ys` taken at the (possibly uneven) abscissae `xs`.
///
/// Second-order accurate everywhere: central differences weighted for
/// uneven spacing in the interior, second-order one-sided stencils at the
/// two ends. Two samples fall back to the plain slope at both ends.
///
/// # Errors
///
/// Fails on fewer than two samples, mismatched lengths, or repeated `xs`.
///
/// # Example
///
/// ```rust
/// use prepay_math::differentiation::gradient;
///
/// let xs = [0.0, 0.5, 2.0, 3.0];
/// let ys: Vec<f64> = xs.iter().map(|x| x * x).collect();
/// let dy = gradient(&ys, &xs).unwrap();
/// for (d, x) in dy.iter().zip(xs) {
///     assert!((d - 2.0 * x).abs() < 1e-12);
/// }
/// ```
pub fn gradient(ys: &[f64], xs: &[f64]) -> MathResult<Vec<f64>> {
    MathError::check_lengths(ys.len(), xs.len())?;
    let n = xs.len();
    if n < 2 {
        return Err(MathError::insufficient_data(2, n));
    }
    if xs.windows(2).any(|w| w[1] == w[0]) {
        return Err(MathError::invalid_input("repeated abscissa in gradient"));
    }

    if n == 2 {
        let slope = (ys[1] - ys[0]) / (xs[1] - xs[0]);
        return Ok(vec![slope, slope]);
    }

    let mut out = vec![0.0; n];

    for i in 1..n - 1 {
        let hs = xs[i] - xs[i - 1];
        let hd = xs[i + 1] - xs[i];
        out[i] = (hs * hs * ys[i + 1] + (hd * hd - hs * hs) * ys[i] - hd * hd * ys[i - 1])
            / (hs * hd * (hd + hs));
    }

    let dx1 = xs[1] - xs[0];
    let dx2 = xs[2] - xs[1];
    let a = -(2.0 * dx1 + dx2) / (dx1 * (dx1 + dx2));
    let b = (dx1 + dx2) / (dx1 * dx2);
    let c = -dx1 / (dx2 * (dx1 + dx2));
    out[0] = a * ys[0] + b * ys[1] + c * ys[2];

    let dx1 = xs[n - 2] - xs[n - 3];
    let dx2 = xs[n - 1] - xs[n - 2];
    let a = dx2 / (dx1 * (dx1 + dx2));
    let b = -(dx2 + dx1) / (dx1 * dx2);
    let c = (2.0 * dx2 + dx1) / (dx2 * (dx1 + dx2));
    out[n - 1] = a * ys[n - 3] + b * ys[n - 2] + c * ys[n - 1];

    Ok(out)
}
