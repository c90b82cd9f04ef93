//! Rate representation conversions.
//!
//! Market inputs arrive as effective-annual (EA) rates, sometimes quoted in
//! percent. Models and discounting work with continuously-compounded short
//! rates:
//!
//! - `r = ln(1 + EA)`
//! - `EA = exp(r) - 1`
//!
//! Both directions use `ln_1p`/`exp_m1` so that small rates keep full
//! precision.

/// Largest value still read as a percentage quote.
const PERCENT_CEILING: f64 = 100.0;

/// Converts an effective-annual rate to a continuously-compounded rate.
///
/// # Example
///
/// ```rust
/// use prepay_curves::conversion::{ea_to_short, short_to_ea};
///
/// let r = ea_to_short(0.12);
/// assert!((r - 1.12_f64.ln()).abs() < 1e-15);
/// assert!((short_to_ea(r) - 0.12).abs() < 1e-15);
/// ```
#[must_use]
#[inline]
pub fn ea_to_short(ea: f64) -> f64 {
    ea.ln_1p()
}

/// Converts a continuously-compounded rate back to effective-annual.
#[must_use]
#[inline]
pub fn short_to_ea(rate: f64) -> f64 {
    rate.exp_m1()
}

/// Scales percentage quotes to decimals in place.
///
/// A set of rates whose largest finite value lies in `(1, 100]` is taken
/// to be quoted in percent and divided by 100. Anything else is left as is.
/// Returns `true` when the values were rescaled.
///
/// # Example
///
/// ```rust
/// use prepay_curves::conversion::normalize_percent;
///
/// let mut rates = vec![9.5, 10.25, 11.0];
/// assert!(normalize_percent(&mut rates));
/// assert!((rates[0] - 0.095).abs() < 1e-15);
///
/// let mut decimals = vec![0.095, 0.1025];
/// assert!(!normalize_percent(&mut decimals));
/// ```
pub fn normalize_percent(values: &mut [f64]) -> bool {
    let max = values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(f64::NEG_INFINITY, f64::max);

    if max > 1.0 && max <= PERCENT_CEILING {
        for v in values.iter_mut() {
            *v /= 100.0;
        }
        true
    } else {
        false
    }
}

/// Same rule as [`normalize_percent`] applied to a whole matrix at once.
pub fn normalize_percent_rows(rows: &mut [Vec<f64>]) -> bool {
    let max = rows
        .iter()
        .flatten()
        .copied()
        .filter(|v| v.is_finite())
        .fold(f64::NEG_INFINITY, f64::max);

    if max > 1.0 && max <= PERCENT_CEILING {
        for v in rows.iter_mut().flatten() {
            *v /= 100.0;
        }
        true
    } else {
        false
    }
}
