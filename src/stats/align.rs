//! Rounding of scores to the precision their error supports.

/// Rounds `x` to the decimal place implied by `error`.
///
/// The place is that of the error's second significant digit, or of its
/// first when the second is zero. Places left of the units digit are
/// shifted one step finer. A zero (or non-finite) error returns `x`
/// unchanged.
///
/// ```
/// use u_metabench::stats::align_to_error;
///
/// assert_eq!(align_to_error(12.345, 0.0), 12.345);
/// assert_eq!(align_to_error(12.3456, 0.0123), 12.346);
/// assert_eq!(align_to_error(12.345, 2.0), 12.0);
/// ```
pub fn align_to_error(x: f64, error: f64) -> f64 {
    let error = error.abs();
    if error == 0.0 || !error.is_finite() || !x.is_finite() {
        return x;
    }
    round_to(x, decimals_for(error))
}

/// Decimal places implied by a positive, finite error.
pub fn decimals_for(error: f64) -> i32 {
    // shortest round-trip representation, e.g. "1.23e-2"
    let formatted = format!("{:e}", error);
    let (mantissa, exponent) = formatted.split_once('e').unwrap_or((formatted.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let second_digit = mantissa
        .chars()
        .filter(|c| c.is_ascii_digit())
        .nth(1)
        .unwrap_or('0');

    let decimals = if second_digit == '0' {
        -exponent
    } else {
        1 - exponent
    };
    if decimals < 0 {
        (decimals + 1).min(0)
    } else {
        decimals
    }
}

fn round_to(x: f64, decimals: i32) -> f64 {
    if decimals >= 0 {
        let scale = 10f64.powi(decimals);
        (x * scale).round() / scale
    } else {
        let scale = 10f64.powi(-decimals);
        (x / scale).round() * scale
    }
}
