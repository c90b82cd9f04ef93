//! Linear interpolation.

/// Piecewise-linear interpolation with flat ends.
///
/// `xs` must be ascending. Points left of `xs[0]` take `ys[0]`, points
/// right of the last node take the last value. An empty grid yields NaN;
/// a single node yields its value everywhere.
///
/// # Example
///
/// ```rust
/// use prepay_math::interpolation::interp;
///
/// let xs = [0.0, 7.0, 14.0];
/// let ys = [0.10, 0.12, 0.11];
/// assert!((interp(3.5, &xs, &ys) - 0.11).abs() < 1e-12);
/// assert_eq!(interp(30.0, &xs, &ys), 0.11);
/// ```
#[must_use]
pub fn interp(x: f64, xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n == 0 {
        return f64::NAN;
    }
    if x <= xs[0] {
        return ys[0];
    }
    if x >= xs[n - 1] {
        return ys[n - 1];
    }
    // First index with xs[i] > x; 1 <= i <= n - 1 here.
    let i = xs[..n].partition_point(|&v| v <= x);
    let (x0, x1) = (xs[i - 1], xs[i]);
    let (y0, y1) = (ys[i - 1], ys[i]);
    if x1 == x0 {
        return y1;
    }
    y0 + (x - x0) / (x1 - x0) * (y1 - y0)
}
