//! JSON-schema scalar resolution.
//!
//! Classifies a plain scalar's lexeme into null/bool/int/float/string, and
//! applies explicit `!!tag` overrides. The predicates run in a fixed order
//! and the first match wins; anything unmatched stays a string. The emitter
//! reuses [`classify`] to decide which strings must be quoted to survive a
//! round trip.

use crate::error::{Error, Result};
use crate::value::Value;

/// Resolve a plain scalar, honoring an explicit tag when present.
pub fn resolve(lexeme: &str, tag: Option<&str>) -> Result<Value> {
    match tag {
        Some(tag) => apply_tag(lexeme, tag),
        None => Ok(classify(lexeme)),
    }
}

/// Apply an explicit tag to a scalar lexeme.
///
/// `!!null`/`!!bool`/`!!int`/`!!float` coerce (failing with the matching
/// schema error), `!!str` and every unrecognized tag produce a string.
pub fn apply_tag(lexeme: &str, tag: &str) -> Result<Value> {
    match tag {
        "!!null" => Ok(Value::Null),
        "!!bool" => match parse_bool(lexeme) {
            Some(b) => Ok(Value::Bool(b)),
            None => Err(Error::InvalidBool(lexeme.to_string())),
        },
        "!!int" => match parse_int(lexeme) {
            Some(n) => Ok(Value::Int(n)),
            None => Err(Error::InvalidInt(lexeme.to_string())),
        },
        "!!float" => match parse_float(lexeme) {
            Some(f) => Ok(Value::Float(f)),
            None => Err(Error::InvalidFloat(lexeme.to_string())),
        },
        _ => Ok(Value::String(lexeme.to_string())),
    }
}

/// Classify an untagged plain scalar per the JSON schema.
pub fn classify(lexeme: &str) -> Value {
    if is_null(lexeme) {
        return Value::Null;
    }
    if let Some(b) = parse_bool(lexeme) {
        return Value::Bool(b);
    }
    if is_int(lexeme) {
        // A lexeme that matches the predicate but overflows i64 stays a
        // string; schema errors occur only under explicit tags.
        return match parse_int(lexeme) {
            Some(n) => Value::Int(n),
            None => Value::String(lexeme.to_string()),
        };
    }
    if let Some(f) = parse_special_float(lexeme) {
        return Value::Float(f);
    }
    if is_float(lexeme) {
        return match parse_decimal_float(lexeme) {
            Some(f) => Value::Float(f),
            None => Value::String(lexeme.to_string()),
        };
    }
    Value::String(lexeme.to_string())
}

/// True when the lexeme is the null literal (or empty).
pub fn is_null(lexeme: &str) -> bool {
    matches!(lexeme, "" | "null" | "Null" | "NULL" | "~")
}

fn parse_bool(lexeme: &str) -> Option<bool> {
    match lexeme {
        "true" | "True" | "TRUE" => Some(true),
        "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}

/// True when the lexeme matches the hex, octal, or decimal integer form.
fn is_int(lexeme: &str) -> bool {
    if let Some(digits) = strip_radix_prefix(lexeme, "0x", "0X") {
        return !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_hexdigit() || b == b'_');
    }
    if let Some(digits) = strip_radix_prefix(lexeme, "0o", "0O") {
        return !digits.is_empty() && digits.bytes().all(|b| (b'0'..=b'7').contains(&b) || b == b'_');
    }
    let digits = lexeme
        .strip_prefix(|c| c == '+' || c == '-')
        .unwrap_or(lexeme);
    !digits.is_empty()
        && digits.bytes().any(|b| b.is_ascii_digit())
        && digits.bytes().all(|b| b.is_ascii_digit() || b == b'_')
}

fn strip_radix_prefix<'a>(lexeme: &'a str, lower: &str, upper: &str) -> Option<&'a str> {
    lexeme
        .strip_prefix(lower)
        .or_else(|| lexeme.strip_prefix(upper))
}

fn parse_int(lexeme: &str) -> Option<i64> {
    let compact: String = lexeme.chars().filter(|c| *c != '_').collect();
    if let Some(digits) = strip_radix_prefix(&compact, "0x", "0X") {
        return i64::from_str_radix(digits, 16).ok();
    }
    if let Some(digits) = strip_radix_prefix(&compact, "0o", "0O") {
        return i64::from_str_radix(digits, 8).ok();
    }
    compact.parse::<i64>().ok()
}

fn parse_special_float(lexeme: &str) -> Option<f64> {
    match lexeme {
        ".inf" | ".Inf" | ".INF" | "+.inf" | "+.Inf" | "+.INF" => Some(f64::INFINITY),
        "-.inf" | "-.Inf" | "-.INF" => Some(f64::NEG_INFINITY),
        ".nan" | ".NaN" | ".NAN" => Some(f64::NAN),
        _ => None,
    }
}

/// True when the lexeme is a decimal float: optional sign, at most one `.`,
/// at most one `e`/`E` (after which a sign may appear again), and at least
/// one digit, with either a dot or an exponent present.
fn is_float(lexeme: &str) -> bool {
    let body = lexeme
        .strip_prefix(|c| c == '+' || c == '-')
        .unwrap_or(lexeme);
    if body.is_empty() {
        return false;
    }
    let mut mantissa_digits = false;
    let mut exponent_digits = false;
    let mut seen_dot = false;
    let mut seen_exp = false;
    let mut prev: Option<char> = None;
    for c in body.chars() {
        match c {
            '0'..='9' => {
                if seen_exp {
                    exponent_digits = true;
                } else {
                    mantissa_digits = true;
                }
            }
            '_' => {}
            '.' => {
                if seen_dot || seen_exp {
                    return false;
                }
                seen_dot = true;
            }
            'e' | 'E' => {
                if seen_exp || !mantissa_digits {
                    return false;
                }
                seen_exp = true;
            }
            '+' | '-' => {
                if !matches!(prev, Some('e') | Some('E')) {
                    return false;
                }
            }
            _ => return false,
        }
        prev = Some(c);
    }
    mantissa_digits && (seen_dot || seen_exp) && (!seen_exp || exponent_digits)
}

fn parse_decimal_float(lexeme: &str) -> Option<f64> {
    let compact: String = lexeme.chars().filter(|c| *c != '_').collect();
    compact.parse::<f64>().ok()
}

/// Parse a float lexeme for an explicit `!!float` tag.
fn parse_float(lexeme: &str) -> Option<f64> {
    parse_special_float(lexeme).or_else(|| {
        if is_float(lexeme) || is_int(lexeme) {
            parse_decimal_float(lexeme)
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classified(lexeme: &str) -> Value {
        classify(lexeme)
    }

    #[test]
    fn test_null_words() {
        assert_eq!(classified(""), Value::Null);
        assert_eq!(classified("null"), Value::Null);
        assert_eq!(classified("Null"), Value::Null);
        assert_eq!(classified("NULL"), Value::Null);
        assert_eq!(classified("~"), Value::Null);
    }

    #[test]
    fn test_bool_words() {
        assert_eq!(classified("true"), Value::Bool(true));
        assert_eq!(classified("TRUE"), Value::Bool(true));
        assert_eq!(classified("False"), Value::Bool(false));
        // Only the canonical casings count.
        assert_eq!(classified("tRuE"), Value::String("tRuE".into()));
    }

    #[test]
    fn test_int_radixes() {
        assert_eq!(classified("0"), Value::Int(0));
        assert_eq!(classified("-17"), Value::Int(-17));
        assert_eq!(classified("+17"), Value::Int(17));
        assert_eq!(classified("1_000_000"), Value::Int(1_000_000));
        assert_eq!(classified("0xFF"), Value::Int(255));
        assert_eq!(classified("0o755"), Value::Int(493));
    }

    #[test]
    fn test_int_overflow_stays_string() {
        let lexeme = "99999999999999999999999999";
        assert_eq!(classified(lexeme), Value::String(lexeme.into()));
    }

    #[test]
    fn test_special_floats() {
        assert_eq!(classified(".inf"), Value::Float(f64::INFINITY));
        assert_eq!(classified("+.Inf"), Value::Float(f64::INFINITY));
        assert_eq!(classified("-.INF"), Value::Float(f64::NEG_INFINITY));
        assert!(matches!(classified(".nan"), Value::Float(f) if f.is_nan()));
    }

    #[test]
    fn test_decimal_floats() {
        assert_eq!(classified("3.14"), Value::Float(3.14));
        assert_eq!(classified("-0.5"), Value::Float(-0.5));
        assert_eq!(classified(".5"), Value::Float(0.5));
        assert_eq!(classified("1.23e-4"), Value::Float(1.23e-4));
        assert_eq!(classified("1e5"), Value::Float(1e5));
    }

    #[test]
    fn test_version_string_is_not_float() {
        assert_eq!(classified("1.0.0"), Value::String("1.0.0".into()));
        assert_eq!(classified("1.2e3e4"), Value::String("1.2e3e4".into()));
        assert_eq!(classified("."), Value::String(".".into()));
        assert_eq!(classified("-."), Value::String("-.".into()));
        assert_eq!(classified("e3"), Value::String("e3".into()));
    }

    #[test]
    fn test_plain_strings() {
        assert_eq!(classified("hello"), Value::String("hello".into()));
        assert_eq!(classified("yes"), Value::String("yes".into()));
        assert_eq!(classified("0x"), Value::String("0x".into()));
        assert_eq!(classified("_"), Value::String("_".into()));
    }

    #[test]
    fn test_explicit_tags() {
        assert_eq!(apply_tag("", "!!null").unwrap(), Value::Null);
        assert_eq!(apply_tag("true", "!!bool").unwrap(), Value::Bool(true));
        assert_eq!(apply_tag("0x10", "!!int").unwrap(), Value::Int(16));
        assert_eq!(apply_tag("1_0", "!!float").unwrap(), Value::Float(10.0));
        assert_eq!(
            apply_tag("17", "!!str").unwrap(),
            Value::String("17".into())
        );
        assert_eq!(
            apply_tag("17", "!custom").unwrap(),
            Value::String("17".into())
        );
    }

    #[test]
    fn test_explicit_tag_failures() {
        assert!(matches!(
            apply_tag("maybe", "!!bool"),
            Err(Error::InvalidBool(_))
        ));
        assert!(matches!(
            apply_tag("12.5", "!!int"),
            Err(Error::InvalidInt(_))
        ));
        assert!(matches!(
            apply_tag("pi", "!!float"),
            Err(Error::InvalidFloat(_))
        ));
    }
}
