// This module renders single scalars as C literals for the generated mode tables. The
// numeric representation of the downstream runtime (fixed-point integers or single
// precision floats) is carried by the word type: `i16`/`i32` words render as plain
// decimal, `f32` words render with C `%#.8g` semantics plus an `f` suffix so the
// target compiler reads them back as floats. Eight significant digits are not always
// enough to reproduce an f32 exactly, so a literal that would not round-trip is
// widened to nine digits. Formatting is pure and total over finite values.

//! Numeric literal formatting.

use std::fmt;

/// Numeric representation of the target runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericMode {
    /// Integer (Q-format) words.
    Fixed,
    /// Single precision float words.
    Float,
}

impl NumericMode {
    /// Base name of the generated body file for this mode.
    pub fn base_name(self) -> &'static str {
        match self {
            NumericMode::Fixed => "static_modes_fixed",
            NumericMode::Float => "static_modes_float",
        }
    }

    /// File name of the generated body file for this mode.
    pub fn output_file_name(self) -> String {
        format!("{}.h", self.base_name())
    }
}

impl fmt::Display for NumericMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericMode::Fixed => write!(f, "fixed-point"),
            NumericMode::Float => write!(f, "floating-point"),
        }
    }
}

/// A table word of the target runtime (`opus_val16`, `kiss_twiddle_scalar`, ...).
pub trait Word: Copy + fmt::Debug + PartialEq {
    /// Representation this word type renders in.
    const MODE: NumericMode;

    /// C literal that parses back to exactly this value.
    fn literal(&self) -> String;
}

impl Word for i16 {
    const MODE: NumericMode = NumericMode::Fixed;

    fn literal(&self) -> String {
        self.to_string()
    }
}

impl Word for i32 {
    const MODE: NumericMode = NumericMode::Fixed;

    fn literal(&self) -> String {
        self.to_string()
    }
}

impl Word for f32 {
    const MODE: NumericMode = NumericMode::Float;

    fn literal(&self) -> String {
        let short = format_significant(*self, FLOAT_DIGITS);
        let exact = short
            .parse::<f32>()
            .map(|parsed| parsed.to_bits() == self.to_bits())
            .unwrap_or(false);
        if exact {
            format!("{short}f")
        } else {
            format!("{}f", format_significant(*self, FLOAT_DIGITS + 1))
        }
    }
}

/// Minimum significant digits of a float literal.
pub const FLOAT_DIGITS: usize = 8;

/// Render a word as a literal.
pub fn format_word<W: Word>(value: W) -> String {
    value.literal()
}

/// Render `value` like C's `%#.{digits}g`.
///
/// Trailing zeros and the decimal point are always kept. The exponent form
/// is used when the decimal exponent is below -4 or at least `digits`.
pub fn format_significant(value: f32, digits: usize) -> String {
    let digits = digits.max(1);
    if !value.is_finite() {
        return value.to_string();
    }
    if value == 0.0 {
        let sign = if value.is_sign_negative() { "-" } else { "" };
        return format!("{sign}0.{}", "0".repeat(digits - 1));
    }

    let scientific = format!("{:.*e}", digits - 1, value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if exponent < -4 || exponent >= digits as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        let mantissa = if mantissa.contains('.') {
            mantissa.to_string()
        } else {
            format!("{mantissa}.")
        };
        format!("{mantissa}e{sign}{:02}", exponent.unsigned_abs())
    } else {
        let decimals = (digits as i32 - 1 - exponent) as usize;
        let fixed = format!("{:.*}", decimals, value);
        if decimals == 0 {
            format!("{fixed}.")
        } else {
            fixed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reparse(literal: &str) -> f32 {
        literal
            .strip_suffix('f')
            .expect("float literal carries an f suffix")
            .parse()
            .expect("literal parses")
    }

    #[test]
    fn test_fixed_words_are_plain_decimal() {
        assert_eq!(format_word(32767i16), "32767");
        assert_eq!(format_word(-5898i16), "-5898");
        assert_eq!(format_word(0i32), "0");
        assert_eq!(<i16 as Word>::MODE, NumericMode::Fixed);
    }

    #[test]
    fn test_float_words_keep_eight_digits() {
        assert_eq!(format_word(0.5f32), "0.50000000f");
        assert_eq!(format_word(1.0f32), "1.0000000f");
        assert_eq!(format_word(-0.25f32), "-0.25000000f");
        assert_eq!(format_word(0.0f32), "0.0000000f");
        assert_eq!(<f32 as Word>::MODE, NumericMode::Float);
    }

    #[test]
    fn test_float_exponent_form() {
        // 2^-15
        assert_eq!(format_word(3.0517578e-5f32), "3.0517578e-05f");
        assert_eq!(format_significant(1.0e9, 8), "1.0000000e+09");
    }

    #[test]
    fn test_large_integral_value_keeps_point() {
        assert_eq!(format_significant(12345678.0, 8), "12345678.");
    }

    #[test]
    fn test_float_literals_round_trip() {
        for i in 0..4096 {
            let x = (i as f32 * 0.713_3).sin() * (1.0 + i as f32 / 97.0);
            let literal = format_word(x);
            assert_eq!(reparse(&literal).to_bits(), x.to_bits(), "{literal}");
        }
        for i in 1..2048 {
            let scale = 1.0f32 / i as f32;
            assert_eq!(reparse(&format_word(scale)).to_bits(), scale.to_bits());
        }
    }

    #[test]
    fn test_output_names_follow_mode() {
        assert_eq!(NumericMode::Fixed.output_file_name(), "static_modes_fixed.h");
        assert_eq!(NumericMode::Float.output_file_name(), "static_modes_float.h");
    }
}
