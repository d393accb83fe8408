//! Conversion of pre-tokenized numeric literals into fixed-width values.
//!
//! The tokenizer has already classified the literal and checked where signs,
//! radix prefixes and `_` separators may appear. The functions here only
//! check that each digit belongs to the radix and that the value fits.

use error::{Error, ErrorAt, Errors};

use alloc::string::String;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum LiteralKind {
    Int,
    HexInt,
    Float,
    HexFloat,
    Infinity,
    Nan,
    NanPayload,
}

/// Unsigned integer targets.
pub trait Nat: Copy {
    const MAX: u64;
    fn from_u64(v: u64) -> Self;
}

/// Signed integer targets. `MAX` is the largest positive value; a negative
/// literal may have a magnitude of `MAX + 1`.
pub trait Int: Copy {
    const MAX: u64;
    fn from_magnitude(magnitude: u64, negative: bool) -> Self;
}

/// IEEE 754 binary float targets.
pub trait Float: Copy {
    const MANTISSA_BITS: u32;
    const EXPONENT_BITS: u32;
    fn from_bits64(bits: u64) -> Self;
    fn parse_bits(text: &str) -> Option<u64>;
}

macro_rules! impl_nat {
    ($($t:ty),*) => {
        $(
            impl Nat for $t {
                const MAX: u64 = <$t>::max_value() as u64;
                fn from_u64(v: u64) -> Self { v as $t }
            }
        )*
    }
}

macro_rules! impl_int {
    ($($t:ty => $u:ty),*) => {
        $(
            impl Int for $t {
                const MAX: u64 = <$t>::max_value() as u64;
                fn from_magnitude(magnitude: u64, negative: bool) -> Self {
                    if negative {
                        (magnitude as $u).wrapping_neg() as $t
                    } else {
                        magnitude as $t
                    }
                }
            }
        )*
    }
}

impl_nat!(u8, u16, u32, u64);
impl_int!(i8 => u8, i16 => u16, i32 => u32, i64 => u64);

impl Float for f32 {
    const MANTISSA_BITS: u32 = 23;
    const EXPONENT_BITS: u32 = 8;
    fn from_bits64(bits: u64) -> Self { f32::from_bits(bits as u32) }
    fn parse_bits(text: &str) -> Option<u64> {
        text.parse::<f32>().ok().map(|v| v.to_bits() as u64)
    }
}

impl Float for f64 {
    const MANTISSA_BITS: u32 = 52;
    const EXPONENT_BITS: u32 = 11;
    fn from_bits64(bits: u64) -> Self { f64::from_bits(bits) }
    fn parse_bits(text: &str) -> Option<u64> {
        text.parse::<f64>().ok().map(|v| v.to_bits())
    }
}

pub fn str_to_nat<T: Nat>(kind: LiteralKind, span: &[u8]) -> Result<T, Error> {
    nat_at(kind, span).map_err(|e| e.error)
}

pub fn str_to_int<T: Int>(kind: LiteralKind, span: &[u8]) -> Result<T, Error> {
    int_at(kind, span).map_err(|e| e.error)
}

pub fn str_to_float<T: Float>(kind: LiteralKind, span: &[u8]) -> Result<T, Error> {
    float_at(kind, span).map_err(|e| e.error)
}

/// Like `str_to_nat`, reporting a failure to `errors` at the offset of the
/// offending character.
pub fn str_to_nat_with<T: Nat, E: Errors>(kind: LiteralKind, span: &[u8], errors: E) -> Option<T> {
    report(nat_at(kind, span), errors)
}

pub fn str_to_int_with<T: Int, E: Errors>(kind: LiteralKind, span: &[u8], errors: E) -> Option<T> {
    report(int_at(kind, span), errors)
}

pub fn str_to_float_with<T: Float, E: Errors>(kind: LiteralKind, span: &[u8], errors: E) -> Option<T> {
    report(float_at(kind, span), errors)
}

fn report<T, E: Errors>(result: Result<T, ErrorAt>, mut errors: E) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            errors.on_error(e.offset, e.error);
            None
        }
    }
}

fn fail<T>(offset: usize, error: Error) -> Result<T, ErrorAt> {
    Err(ErrorAt { offset, error })
}

fn radix_for(kind: LiteralKind) -> Result<u64, ErrorAt> {
    match kind {
        LiteralKind::Int => Ok(10),
        LiteralKind::HexInt => Ok(16),
        _ => fail(0, Error::InvalidLiteral),
    }
}

fn nat_at<T: Nat>(kind: LiteralKind, span: &[u8]) -> Result<T, ErrorAt> {
    let radix = radix_for(kind)?;
    let pos = skip_radix_prefix(span, 0, radix);
    accumulate(span, pos, span.len(), radix, T::MAX).map(T::from_u64)
}

fn int_at<T: Int>(kind: LiteralKind, span: &[u8]) -> Result<T, ErrorAt> {
    let radix = radix_for(kind)?;
    let (negative, pos) = read_sign(span);
    let pos = skip_radix_prefix(span, pos, radix);
    let limit = if negative { T::MAX + 1 } else { T::MAX };
    let magnitude = accumulate(span, pos, span.len(), radix, limit)?;
    Ok(T::from_magnitude(magnitude, negative))
}

fn read_sign(span: &[u8]) -> (bool, usize) {
    match span.first() {
        Some(&b'-') => (true, 1),
        Some(&b'+') => (false, 1),
        _ => (false, 0),
    }
}

fn skip_radix_prefix(span: &[u8], pos: usize, radix: u64) -> usize {
    let rest = &span[pos..];
    if radix == 16 && (rest.starts_with(b"0x") || rest.starts_with(b"0X")) {
        pos + 2
    } else {
        pos
    }
}

fn digit_value(c: u8, radix: u64) -> Option<u64> {
    let v = match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        b'A'..=b'F' => c - b'A' + 10,
        _ => return None,
    };
    if (v as u64) < radix { Some(v as u64) } else { None }
}

// Accumulates span[start..end] as an unsigned magnitude no larger than
// `limit`, skipping `_` separators.
fn accumulate(span: &[u8], start: usize, end: usize, radix: u64, limit: u64) -> Result<u64, ErrorAt> {
    let mut value = 0u64;
    let mut digits = 0;
    for (i, &c) in span[start..end].iter().enumerate() {
        let offset = start + i;
        if c == b'_' {
            continue
        }
        let d = match digit_value(c, radix) {
            Some(d) => d,
            None => return fail(offset, Error::InvalidDigit(c)),
        };
        value = match value.checked_mul(radix).and_then(|v| v.checked_add(d)) {
            Some(v) if v <= limit => v,
            _ => return fail(offset, Error::NumericOverflow),
        };
        digits += 1;
    }
    if digits == 0 {
        return fail(start, Error::InvalidLiteral)
    }
    Ok(value)
}

fn float_at<T: Float>(kind: LiteralKind, span: &[u8]) -> Result<T, ErrorAt> {
    let mbits = T::MANTISSA_BITS;
    let ebits = T::EXPONENT_BITS;
    let inf = ((1u64 << ebits) - 1) << mbits;
    let (negative, pos) = read_sign(span);
    let sign = if negative { 1u64 << (mbits + ebits) } else { 0 };
    let body = &span[pos..];

    let bits = match kind {
        LiteralKind::Infinity => {
            if body != b"inf" {
                return fail(pos, Error::InvalidLiteral)
            }
            inf
        }
        LiteralKind::Nan => {
            if body != b"nan" {
                return fail(pos, Error::InvalidLiteral)
            }
            inf | 1 << (mbits - 1)
        }
        LiteralKind::NanPayload => {
            if !body.starts_with(b"nan:") {
                return fail(pos, Error::InvalidLiteral)
            }
            let start = skip_radix_prefix(span, pos + 4, 16);
            let payload = accumulate(span, start, span.len(), 16, (1 << mbits) - 1)?;
            if payload == 0 {
                return fail(start, Error::InvalidLiteral)
            }
            inf | payload
        }
        LiteralKind::Float | LiteralKind::Int => {
            decimal_float_bits::<T>(span, pos, inf)?
        }
        LiteralKind::HexFloat | LiteralKind::HexInt => {
            hex_float_bits(span, pos, mbits, ebits)?
        }
    };
    Ok(T::from_bits64(sign | bits))
}

fn decimal_float_bits<T: Float>(span: &[u8], pos: usize, inf: u64) -> Result<u64, ErrorAt> {
    // core's parser also takes "nan", "inf" and "infinity"; only an exponent
    // marker may be a letter here.
    if let Some(i) = span[pos..].iter().position(|&c| c.is_ascii_alphabetic() && c != b'e' && c != b'E') {
        return fail(pos + i, Error::InvalidLiteral)
    }
    let text: String = span[pos..].iter()
        .filter(|&&c| c != b'_')
        .map(|&c| c as char)
        .collect();
    match T::parse_bits(&text) {
        Some(bits) if bits & inf == inf => fail(pos, Error::NumericOverflow),
        Some(bits) => Ok(bits),
        None => fail(pos, Error::InvalidLiteral),
    }
}

// Far beyond any representable exponent; larger values saturate here.
const EXPONENT_LIMIT: i64 = 1 << 20;

fn hex_float_bits(span: &[u8], pos: usize, mbits: u32, ebits: u32) -> Result<u64, ErrorAt> {
    let start = skip_radix_prefix(span, pos, 16);
    let mut sig = 0u64;
    let mut exp = 0i64;
    let mut sticky = false;
    let mut in_fraction = false;
    let mut digits = 0;
    let mut i = start;
    while i < span.len() {
        let c = span[i];
        match c {
            b'_' => {}
            b'.' if !in_fraction => in_fraction = true,
            b'p' | b'P' => break,
            _ => {
                let d = match digit_value(c, 16) {
                    Some(d) => d,
                    None => return fail(i, Error::InvalidDigit(c)),
                };
                // Keep 60 significant bits; anything further only matters
                // for rounding.
                if sig >> 60 == 0 {
                    sig = sig << 4 | d;
                    if in_fraction {
                        exp -= 4;
                    }
                } else {
                    sticky |= d != 0;
                    if !in_fraction {
                        exp += 4;
                    }
                }
                digits += 1;
            }
        }
        i += 1;
    }
    if digits == 0 {
        return fail(start, Error::InvalidLiteral)
    }

    if i < span.len() {
        i += 1;
        let (negative, skip) = read_sign(&span[i..]);
        i += skip;
        let e = accumulate_saturating(span, i)?;
        exp = if negative { exp - e } else { exp + e };
    }

    match make_float(sig, exp, sticky, mbits, ebits) {
        Some(bits) => Ok(bits),
        None => fail(pos, Error::NumericOverflow),
    }
}

fn accumulate_saturating(span: &[u8], start: usize) -> Result<i64, ErrorAt> {
    let mut value = 0i64;
    let mut digits = 0;
    for (i, &c) in span[start..].iter().enumerate() {
        if c == b'_' {
            continue
        }
        let d = match digit_value(c, 10) {
            Some(d) => d as i64,
            None => return fail(start + i, Error::InvalidDigit(c)),
        };
        value = (value * 10 + d).min(EXPONENT_LIMIT);
        digits += 1;
    }
    if digits == 0 {
        return fail(start, Error::InvalidLiteral)
    }
    Ok(value)
}

// Builds the bit pattern (without sign) nearest to `sig * 2^exp`, ties to
// even, where `sticky` marks non-zero bits below `sig`. `None` when the value
// rounds to infinity.
fn make_float(sig: u64, exp: i64, sticky: bool, mbits: u32, ebits: u32) -> Option<u64> {
    if sig == 0 {
        return Some(0)
    }
    let bias = (1i64 << (ebits - 1)) - 1;
    let inf = ((1u64 << ebits) - 1) << mbits;
    let msb = 63 - sig.leading_zeros() as i64;
    let e = msb + exp;
    if e > bias {
        return None
    }
    let min_e = 1 - bias;
    let normal = e >= min_e;
    let ulp = (if normal { e } else { min_e }) - mbits as i64;
    let shift = ulp - exp;
    let mant = if shift <= 0 {
        sig << (-shift) as u32
    } else if shift >= 65 {
        0
    } else {
        round_shift(sig, shift as u32, sticky)
    };
    let bits = if normal {
        (((e + bias - 1) as u64) << mbits) + mant
    } else {
        mant
    };
    if bits >= inf { None } else { Some(bits) }
}

fn round_shift(sig: u64, shift: u32, sticky: bool) -> u64 {
    let v = sig as u128;
    let kept = (v >> shift) as u64;
    let rem = v & ((1u128 << shift) - 1);
    let half = 1u128 << (shift - 1);
    if rem > half || (rem == half && (sticky || kept & 1 == 1)) {
        kept + 1
    } else {
        kept
    }
}
