//! Shortest round-trip conversion between `f64` and text.
//!
//! Every encoder renders floating point values through [`format`] so that a value read back with
//! [`parse`] has exactly the same bits.

use std::fmt::Write;

use crate::{MetricError, Result};


/// Integers above this magnitude are no longer exact, so they switch to exponential notation.
const MAX_EXACT_INTEGER: f64 = 9007199254740992.0;

pub fn format(x: f64) -> String {
    let mut buf = String::with_capacity(24);
    write(&mut buf, x);
    buf
}

pub fn write(buf: &mut String, x: f64) {
    if x.is_nan() {
        buf.push_str(if x.is_sign_negative() { "-nan" } else { "nan" });
        return;
    }

    if x.is_infinite() {
        buf.push_str(if x < 0.0 { "-inf" } else { "inf" });
        return;
    }

    if x == 0.0 {
        buf.push('0');
        return;
    }

    if x < 0.0 {
        buf.push('-');
    }

    let (digits, exponent) = shortest_digits(x.abs());

    if exponent < -4 || x.abs() > MAX_EXACT_INTEGER {
        write_exponential(buf, &digits, exponent);
    } else {
        write_fixed(buf, &digits, exponent);
    }
}

/// Returns the shortest digit string that round trips, along with the base 10 exponent of its first digit.
fn shortest_digits(x: f64) -> (String, i32) {
    let sci = format!("{:e}", x);
    let (mantissa, exponent) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    (mantissa.replace('.', ""), exponent)
}

fn write_exponential(buf: &mut String, digits: &str, exponent: i32) {
    let (first, rest) = digits.split_at(1);
    buf.push_str(first);
    if !rest.is_empty() {
        buf.push('.');
        buf.push_str(rest);
    }

    let sign = if exponent < 0 { '-' } else { '+' };
    // write! into a String cannot fail
    let _ = write!(buf, "e{}{:02}", sign, exponent.abs());
}

fn write_fixed(buf: &mut String, digits: &str, exponent: i32) {
    if exponent < 0 {
        buf.push_str("0.");
        for _ in 0..(-exponent - 1) {
            buf.push('0');
        }
        buf.push_str(digits);
        return;
    }

    let int_len = exponent as usize + 1;
    if digits.len() > int_len {
        buf.push_str(&digits[..int_len]);
        buf.push('.');
        buf.push_str(&digits[int_len..]);
    } else {
        buf.push_str(digits);
        for _ in digits.len()..int_len {
            buf.push('0');
        }
    }
}

/// Parses decimal, scientific and hexadecimal (`0x1.8p3`) numbers as well as `nan`, `inf` and `infinity`.
pub fn parse(s: &str) -> Result<f64> {
    let text = s.trim();
    let (negative, unsigned) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let magnitude = if unsigned.eq_ignore_ascii_case("nan") {
        f64::NAN
    } else if unsigned.eq_ignore_ascii_case("inf") || unsigned.eq_ignore_ascii_case("infinity") {
        f64::INFINITY
    } else if unsigned.len() > 2 && unsigned.get(..2).map_or(false, |p| p.eq_ignore_ascii_case("0x")) {
        parse_hex(&unsigned[2..]).ok_or_else(|| MetricError::ParseError(s.to_owned()))?
    } else if unsigned.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        unsigned
            .parse::<f64>()
            .map_err(|_| MetricError::ParseError(s.to_owned()))?
    } else {
        return Err(MetricError::ParseError(s.to_owned()));
    };

    Ok(if negative { -magnitude } else { magnitude })
}

/// Hex digits kept in the accumulator; anything further only feeds the sticky bit.
const HEX_DIGITS: u32 = 15;

fn parse_hex(s: &str) -> Option<f64> {
    let (mantissa, exponent) = match s.find(|c| c == 'p' || c == 'P') {
        Some(i) => (&s[..i], s[i + 1..].parse::<i64>().ok()?),
        None => (s, 0),
    };

    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((i, f)) => (i, f),
        None => (mantissa, ""),
    };

    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }

    let mut value: u64 = 0;
    let mut shift = exponent.clamp(-MAX_BINARY_SHIFT, MAX_BINARY_SHIFT);
    let mut significant = 0;
    let mut sticky = false;
    for c in int_part.chars() {
        let digit = c.to_digit(16)? as u64;
        if significant < HEX_DIGITS {
            value = (value << 4) | digit;
            if value != 0 {
                significant += 1;
            }
        } else {
            shift += 4;
            sticky |= digit != 0;
        }
    }

    for c in frac_part.chars() {
        let digit = c.to_digit(16)? as u64;
        if significant < HEX_DIGITS {
            value = (value << 4) | digit;
            if value != 0 {
                significant += 1;
            }
            shift -= 4;
        } else {
            sticky |= digit != 0;
        }
    }

    Some(round_binary(value, shift, sticky))
}

/// Beyond this every finite mantissa has already overflowed or underflowed.
const MAX_BINARY_SHIFT: i64 = 1 << 16;

/// Rounds `value * 2^shift` to the nearest `f64`, ties to even. `sticky` marks nonzero bits below `value`.
fn round_binary(value: u64, shift: i64, sticky: bool) -> f64 {
    if value == 0 {
        return 0.0;
    }

    let bits = 64 - i64::from(value.leading_zeros());
    let top = bits - 1 + shift;
    // subnormals keep fewer mantissa bits
    let precision = if top >= -1022 { 53 } else { 53 - (-1022 - top) };
    let drop = bits - precision;

    let (mantissa, shift) = if drop <= 0 {
        (value, shift)
    } else if drop > 64 {
        (0, shift + drop)
    } else {
        let wide = u128::from(value);
        let drop_bits = drop as u32;
        let kept = wide >> drop_bits;
        let rest = wide & ((1u128 << drop_bits) - 1);
        let half = 1u128 << (drop_bits - 1);
        let round_up = rest > half || (rest == half && (sticky || kept & 1 == 1));
        ((kept as u64) + u64::from(round_up), shift + drop)
    };

    // 2^shift alone can underflow for subnormal results
    let first = shift / 2;
    mantissa as f64 * 2f64.powi(first as i32) * 2f64.powi((shift - first) as i32)
}
