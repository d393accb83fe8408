use features::Feature;

use alloc::vec::Vec;
use core::fmt;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    UnexpectedEof,
    LengthOutOfBounds,
    InvalidU32,
    InvalidI32,
    InvalidI33,
    InvalidU64,
    InvalidI64,
    InvalidUtf8,
    InvalidOpcode(u8),
    InvalidMiscOpcode(u32),
    InvalidValueType(u8),
    InvalidBlockType,
    InvalidReserved(u8),
    InvalidSectionId(u8),
    InvalidMagic,
    InvalidVersion,
    FeatureDisabled(Feature),

    InvalidDigit(u8),
    InvalidLiteral,
    NumericOverflow,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::Error::*;
        match *self {
            UnexpectedEof => write!(f, "unexpected end of input"),
            LengthOutOfBounds => write!(f, "length out of bounds"),
            InvalidU32 => write!(f, "invalid u32"),
            InvalidI32 => write!(f, "invalid s32"),
            InvalidI33 => write!(f, "invalid s33"),
            InvalidU64 => write!(f, "invalid u64"),
            InvalidI64 => write!(f, "invalid s64"),
            InvalidUtf8 => write!(f, "invalid utf-8 encoding"),
            InvalidOpcode(code) => write!(f, "unknown opcode: 0x{:02x}", code),
            InvalidMiscOpcode(code) => write!(f, "unknown opcode: 0xfc 0x{:x}", code),
            InvalidValueType(code) => write!(f, "unknown value type: 0x{:02x}", code),
            InvalidBlockType => write!(f, "invalid block type"),
            InvalidReserved(v) => write!(f, "expected reserved byte 0, got {}", v),
            InvalidSectionId(id) => write!(f, "unknown section id: {}", id),
            InvalidMagic => write!(f, "magic mismatch"),
            InvalidVersion => write!(f, "version mismatch"),
            FeatureDisabled(feature) => write!(f, "{} not allowed", feature.as_str()),
            InvalidDigit(c) => write!(f, "invalid digit {:?}", c as char),
            InvalidLiteral => write!(f, "invalid literal"),
            NumericOverflow => write!(f, "numeric value out of range"),
        }
    }
}

/// An error together with the byte offset at which it was detected.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct ErrorAt {
    pub offset: usize,
    pub error: Error,
}

impl fmt::Display for ErrorAt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:08x}: {}", self.offset, self.error)
    }
}

/// A sink for decode failures.
///
/// Decoders call `on_error` at most once per unit they decode (a lazy
/// section, a literal). What happens to the error afterwards is up to the
/// implementation.
pub trait Errors {
    fn on_error(&mut self, offset: usize, error: Error);
}

impl<'e, E: Errors + ?Sized> Errors for &'e mut E {
    fn on_error(&mut self, offset: usize, error: Error) {
        (**self).on_error(offset, error)
    }
}

/// Collects every reported error in order.
#[derive(Debug, Default, Clone)]
pub struct ErrorList {
    errors: Vec<ErrorAt>,
}

impl ErrorList {
    pub fn new() -> Self {
        ErrorList { errors: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[ErrorAt] {
        &self.errors
    }

    pub fn clear(&mut self) {
        self.errors.clear()
    }
}

impl Errors for ErrorList {
    fn on_error(&mut self, offset: usize, error: Error) {
        self.errors.push(ErrorAt { offset, error })
    }
}

/// Forwards errors to the `error!` log macro and keeps a count.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogErrors {
    count: usize,
}

impl LogErrors {
    pub fn new() -> Self {
        LogErrors { count: 0 }
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

impl Errors for LogErrors {
    fn on_error(&mut self, offset: usize, error: Error) {
        error!("{}", ErrorAt { offset, error });
        self.count += 1;
    }
}
