//! String and number conversion.
//!
//! Integers are parsed in base 10. Floats are rendered in shortest
//! round-trip scientific notation with a signed, two-digit exponent
//! (`1.5E+00`), and booleans accept the usual single-letter and
//! capitalised spellings.

use crate::error::{Result, UtilsError};
use std::fmt::Display;
use std::num::ParseIntError;
use std::str::FromStr;

mod sealed {
    pub trait Sealed {}
}

/// Primitive integers supported by [`string_to_integer`] and [`integer_to_string`].
pub trait Integer: sealed::Sealed + FromStr<Err = ParseIntError> + Display + Copy {
    /// Type name used in error messages.
    const NAME: &'static str;
}

macro_rules! impl_integer {
    ($($ty:ty),*) => {
        $(
            impl sealed::Sealed for $ty {}
            impl Integer for $ty {
                const NAME: &'static str = stringify!($ty);
            }
        )*
    };
}

impl_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

/// Parse a base-10 integer.
///
/// ```rust
/// use service_utils::conv::string_to_integer;
///
/// assert_eq!(string_to_integer::<i16>("-123").unwrap(), -123);
/// assert!(string_to_integer::<u8>("256").is_err());
/// ```
pub fn string_to_integer<T: Integer>(input: &str) -> Result<T> {
    input
        .parse::<T>()
        .map_err(|e| UtilsError::conversion(input, T::NAME, e))
}

/// Render an integer in base 10.
pub fn integer_to_string<T: Integer>(value: T) -> String {
    value.to_string()
}

/// Parse a boolean.
///
/// Accepts `1 t T TRUE true True` and `0 f F FALSE false False`.
pub fn string_to_bool(input: &str) -> Result<bool> {
    match input {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(UtilsError::conversion(input, "bool", "invalid syntax")),
    }
}

/// Render a boolean as `"true"` or `"false"`.
pub fn bool_to_string(value: bool) -> String {
    value.to_string()
}

/// Parse an `f32`. Finite literals that overflow are rejected.
pub fn string_to_f32(input: &str) -> Result<f32> {
    let value = input
        .parse::<f32>()
        .map_err(|e| UtilsError::conversion(input, "f32", e))?;
    check_range(input, "f32", value.is_infinite())?;
    Ok(value)
}

/// Parse an `f64`. Finite literals that overflow are rejected.
pub fn string_to_f64(input: &str) -> Result<f64> {
    let value = input
        .parse::<f64>()
        .map_err(|e| UtilsError::conversion(input, "f64", e))?;
    check_range(input, "f64", value.is_infinite())?;
    Ok(value)
}

fn check_range(input: &str, target: &'static str, infinite: bool) -> Result<()> {
    if infinite && !is_infinity_literal(input) {
        return Err(UtilsError::conversion(input, target, "value out of range"));
    }
    Ok(())
}

fn is_infinity_literal(input: &str) -> bool {
    let unsigned = input.trim_start_matches(['+', '-']);
    unsigned.eq_ignore_ascii_case("inf") || unsigned.eq_ignore_ascii_case("infinity")
}

/// Render an `f32` in scientific notation, e.g. `3.14E+00`.
pub fn f32_to_string(value: f32) -> String {
    if value.is_nan() || value.is_infinite() {
        return special_to_string(value.is_nan(), value.is_sign_negative());
    }
    normalize_exponent(&format!("{:E}", value))
}

/// Render an `f64` in scientific notation, e.g. `1E+06`.
pub fn f64_to_string(value: f64) -> String {
    if value.is_nan() || value.is_infinite() {
        return special_to_string(value.is_nan(), value.is_sign_negative());
    }
    normalize_exponent(&format!("{:E}", value))
}

fn special_to_string(nan: bool, negative: bool) -> String {
    match (nan, negative) {
        (true, _) => "NaN".to_string(),
        (false, true) => "-Inf".to_string(),
        (false, false) => "+Inf".to_string(),
    }
}

/// `1.5E-7` -> `1.5E-07`, `1E6` -> `1E+06`.
fn normalize_exponent(formatted: &str) -> String {
    match formatted.split_once('E') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{}E{}{:0>2}", mantissa, sign, digits)
        }
        None => formatted.to_string(),
    }
}
