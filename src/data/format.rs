//! printf-style number formatting for written tables.
//!
//! Supports a single conversion of the form
//! `%[flags][width][.precision]conv` with flags `- + space 0 #` and
//! conversions `g G e E f F d i`, following C semantics.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid number format {spec:?}: {reason}")]
pub struct FormatParseError {
    pub spec: String,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Conversion {
    General,
    Exponent,
    Fixed,
    Integer,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Flags {
    left: bool,
    plus: bool,
    space: bool,
    zero: bool,
    alternate: bool,
}

/// A parsed numeric format such as `%.8g` or `%10.3f`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberFormat {
    spec: String,
    flags: Flags,
    width: Option<usize>,
    precision: Option<usize>,
    conversion: Conversion,
    uppercase: bool,
}

impl Default for NumberFormat {
    /// `%.8g`: eight significant digits, trailing zeros trimmed.
    fn default() -> Self {
        NumberFormat {
            spec: "%.8g".to_string(),
            flags: Flags::default(),
            width: None,
            precision: Some(8),
            conversion: Conversion::General,
            uppercase: false,
        }
    }
}

impl fmt::Display for NumberFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.spec)
    }
}

impl FromStr for NumberFormat {
    type Err = FormatParseError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        NumberFormat::parse(spec)
    }
}

impl NumberFormat {
    pub fn parse(spec: &str) -> Result<Self, FormatParseError> {
        let fail = |reason: &str| FormatParseError {
            spec: spec.to_string(),
            reason: reason.to_string(),
        };

        let rest = spec
            .strip_prefix('%')
            .ok_or_else(|| fail("must start with '%'"))?;
        let mut chars = rest.chars().peekable();

        let mut flags = Flags::default();
        while let Some(&c) = chars.peek() {
            match c {
                '-' => flags.left = true,
                '+' => flags.plus = true,
                ' ' => flags.space = true,
                '0' => flags.zero = true,
                '#' => flags.alternate = true,
                _ => break,
            }
            chars.next();
        }

        let mut width = String::new();
        while let Some(c) = chars.next_if(|c| c.is_ascii_digit()) {
            width.push(c);
        }

        let mut precision = None;
        if chars.next_if_eq(&'.').is_some() {
            let mut digits = String::new();
            while let Some(c) = chars.next_if(|c| c.is_ascii_digit()) {
                digits.push(c);
            }
            // "%.g" means precision 0, as in C
            precision = Some(digits.parse().unwrap_or(0));
        }

        let conv = chars.next().ok_or_else(|| fail("missing conversion"))?;
        let (conversion, uppercase) = match conv {
            'g' => (Conversion::General, false),
            'G' => (Conversion::General, true),
            'e' => (Conversion::Exponent, false),
            'E' => (Conversion::Exponent, true),
            'f' => (Conversion::Fixed, false),
            'F' => (Conversion::Fixed, true),
            'd' | 'i' => (Conversion::Integer, false),
            other => return Err(fail(&format!("unsupported conversion '{other}'"))),
        };
        if chars.next().is_some() {
            return Err(fail("trailing characters after conversion"));
        }

        Ok(NumberFormat {
            spec: spec.to_string(),
            flags,
            width: if width.is_empty() {
                None
            } else {
                Some(width.parse().map_err(|_| fail("width too large"))?)
            },
            precision,
            conversion,
            uppercase,
        })
    }

    /// The original format string.
    pub fn as_str(&self) -> &str {
        &self.spec
    }

    /// Render one value.
    pub fn format(&self, value: f64) -> String {
        let negative = value.is_sign_negative() && !value.is_nan();
        let magnitude = value.abs();

        let mut body = if value.is_nan() {
            "nan".to_string()
        } else if value.is_infinite() {
            "inf".to_string()
        } else {
            match self.conversion {
                Conversion::General => self.general(magnitude),
                Conversion::Exponent => {
                    exponential(magnitude, self.precision.unwrap_or(6), self.flags.alternate)
                }
                Conversion::Fixed => {
                    fixed(magnitude, self.precision.unwrap_or(6), self.flags.alternate)
                }
                Conversion::Integer => format!("{:.0}", magnitude.trunc()),
            }
        };
        if self.uppercase {
            body = body.to_uppercase();
        }

        let sign = if negative && !(self.conversion == Conversion::Integer && body == "0") {
            "-"
        } else if self.flags.plus {
            "+"
        } else if self.flags.space {
            " "
        } else {
            ""
        };

        let len = sign.len() + body.len();
        let pad = self.width.map(|w| w.saturating_sub(len)).unwrap_or(0);
        if pad == 0 {
            format!("{sign}{body}")
        } else if self.flags.left {
            format!("{sign}{body}{}", " ".repeat(pad))
        } else if self.flags.zero && value.is_finite() {
            format!("{sign}{}{body}", "0".repeat(pad))
        } else {
            format!("{}{sign}{body}", " ".repeat(pad))
        }
    }

    fn general(&self, magnitude: f64) -> String {
        let precision = match self.precision {
            None => 6,
            Some(0) => 1,
            Some(p) => p,
        };
        let exp = if magnitude == 0.0 {
            0
        } else {
            split_exponent(&format!("{:.*e}", precision - 1, magnitude)).1
        };

        let p = precision as i32;
        let text = if exp < p && exp >= -4 {
            fixed(magnitude, (p - 1 - exp) as usize, self.flags.alternate)
        } else {
            exponential(magnitude, precision - 1, self.flags.alternate)
        };

        if self.flags.alternate {
            text
        } else {
            trim_fraction_zeros(&text)
        }
    }
}

fn fixed(magnitude: f64, precision: usize, alternate: bool) -> String {
    let text = format!("{magnitude:.precision$}");
    if alternate && precision == 0 {
        format!("{text}.")
    } else {
        text
    }
}

fn exponential(magnitude: f64, precision: usize, alternate: bool) -> String {
    let text = format!("{magnitude:.precision$e}");
    let (mantissa, exp) = split_exponent(&text);
    let mantissa = if alternate && precision == 0 {
        format!("{mantissa}.")
    } else {
        mantissa.to_string()
    };
    let sign = if exp < 0 { '-' } else { '+' };
    format!("{mantissa}e{sign}{:02}", exp.unsigned_abs())
}

/// Split Rust's `1.25e-3` form into mantissa and exponent.
fn split_exponent(text: &str) -> (&str, i32) {
    match text.split_once('e') {
        Some((mantissa, exp)) => (mantissa, exp.parse().unwrap_or(0)),
        None => (text, 0),
    }
}

fn trim_fraction_zeros(text: &str) -> String {
    let (mantissa, suffix) = match text.find('e') {
        Some(pos) => text.split_at(pos),
        None => (text, ""),
    };
    let mantissa = if mantissa.contains('.') {
        mantissa.trim_end_matches('0').trim_end_matches('.')
    } else {
        mantissa
    };
    format!("{mantissa}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(spec: &str, v: f64) -> String {
        NumberFormat::parse(spec).unwrap().format(v)
    }

    #[test]
    fn default_is_eight_significant_digits() {
        let f = NumberFormat::default();
        assert_eq!(f.as_str(), "%.8g");
        assert_eq!(f, NumberFormat::parse("%.8g").unwrap());
    }

    #[test]
    fn general_matches_c_printf() {
        let cases = [
            ("%.8g", 1.0, "1"),
            ("%.8g", 7.0, "7"),
            ("%.8g", 0.1, "0.1"),
            ("%.8g", 0.0, "0"),
            ("%.8g", -2.5, "-2.5"),
            ("%.8g", 3.14159265358979, "3.1415927"),
            ("%.8g", 123456789.0, "1.2345679e+08"),
            ("%.8g", 0.0001, "0.0001"),
            ("%.8g", 0.00001, "1e-05"),
            ("%g", 1234567.0, "1.23457e+06"),
            ("%g", 100000.0, "100000"),
            ("%G", 1e-10, "1E-10"),
        ];
        for (spec, value, expected) in cases {
            assert_eq!(fmt(spec, value), expected, "{spec} of {value}");
        }
    }

    #[test]
    fn width_and_flags() {
        assert_eq!(fmt("%8g", 1.0), "       1");
        assert_eq!(fmt("%-6d", 3.7), "3     ");
        assert_eq!(fmt("%+08.2f", 3.14159), "+0003.14");
        assert_eq!(fmt("% .1f", 2.0), " 2.0");
        assert_eq!(fmt("%#.3g", 1.0), "1.00");
    }

    #[test]
    fn exponent_and_fixed() {
        assert_eq!(fmt("%e", 12345.678), "1.234568e+04");
        assert_eq!(fmt("%.2E", 0.000123), "1.23E-04");
        assert_eq!(fmt("%.3f", 2.0), "2.000");
        assert_eq!(fmt("%d", -4.9), "-4");
    }

    #[test]
    fn exponent_mantissa_forms() {
        assert_eq!(fmt("%.0e", 3.0), "3e+00");
        assert_eq!(fmt("%#.0e", 3.0), "3.e+00");
        assert_eq!(fmt("%.3e", 1.5e-300), "1.500e-300");
        assert_eq!(fmt("%.1e", 0.0), "0.0e+00");
    }

    #[test]
    fn non_finite_values() {
        assert_eq!(fmt("%.8g", f64::NAN), "nan");
        assert_eq!(fmt("%.8g", f64::INFINITY), "inf");
        assert_eq!(fmt("%.8g", f64::NEG_INFINITY), "-inf");
        assert_eq!(fmt("%08.2f", f64::NAN), "     nan");
    }

    #[test]
    fn rejects_malformed_specs() {
        for bad in ["8g", "%", "%.8x", "%.8g ms", "%s"] {
            assert!(NumberFormat::parse(bad).is_err(), "{bad} should fail");
        }
    }
}
