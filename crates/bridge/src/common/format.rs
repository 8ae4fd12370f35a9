//! Number rendering.
//!
//! McPAT and HotSpot were historically fed numbers printed by a scripting runtime, so
//! floats are written in the shortest form that round-trips, always with a fractional
//! part or an exponent (`2.0`, `0.125`, `1e+16`, `1.5e-05`).

/// Smallest decimal exponent printed in positional notation.
const MIN_POSITIONAL_EXP: i32 = -4;

/// First decimal exponent printed in scientific notation.
const MAX_POSITIONAL_EXP: i32 = 16;

/// Formats a float in shortest round-trip form.
///
/// # Arguments
///
/// * `value` - The value to format.
///
/// # Returns
///
/// `"inf"`, `"-inf"` and `"nan"` for non-finite input; positional notation with at least
/// one fractional digit for decimal exponents in `-4..16`; scientific notation with a
/// signed, two-digit exponent otherwise.
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_owned();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_owned();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0.0" } else { "0.0" }.to_owned();
    }

    let sci = format!("{value:e}");
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    if (MIN_POSITIONAL_EXP..MAX_POSITIONAL_EXP).contains(&exp) {
        let mut out = format!("{value}");
        if !out.contains('.') {
            out.push_str(".0");
        }
        out
    } else {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exp.unsigned_abs())
    }
}

/// Formats an integral count or a float, whichever the value is.
///
/// Whole numbers that fit in an `i64` print without a fractional part; everything else
/// goes through [`format_float`].
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 9.0e18 {
        format!("{}", value as i64)
    } else {
        format_float(value)
    }
}
