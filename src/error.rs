//! Library-wide error and result types, including the validation-failure
//! taxonomy raised by generated decoders.

use std::fmt;
use std::io;

/// Result alias used throughout streamkit.
pub type Result<T> = std::result::Result<T, Error>;

/// All errors the library can produce.
///
/// Error messages are kept intentionally terse; callers that need richer
/// context should wrap `Error` in their own type. Validation failures are
/// the exception: they carry a source path and stream position so that a
/// decode error deep inside a nested structure is still addressable.
#[derive(Debug)]
pub enum Error {
    /// The stream ended before all requested bytes could be read. Both the
    /// requested and the actually-available byte counts are reported.
    Eof { requested: usize, available: usize },
    /// A terminated read reached the end of the stream without finding its
    /// terminator byte, and the caller asked for that to be an error.
    MissingTerminator(u8),
    /// A bit-level read requested more than 64 bits at once.
    BitWidthTooLarge(u32),
    /// The underlying source does not support seeking (pipes, sockets).
    Unseekable,
    /// The underlying source has no known size (pipes, sockets).
    UnknownSize,
    /// A repeating-key XOR was invoked with an empty key.
    EmptyXorKey,
    /// Bit rotation over byte groups other than 1 is not supported.
    UnsupportedRotateGroup(usize),
    /// An underlying I/O operation failed.
    Io(io::Error),
    /// Zlib inflation failed.
    #[cfg(feature = "compression")]
    Zlib,
    /// A decoder-side validation check failed.
    Validation(ValidationError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Eof {
                requested,
                available,
            } => write!(f, "attempted to read {requested} bytes, got only {available}"),
            Error::MissingTerminator(term) => {
                write!(f, "end of stream reached, but no terminator {term} found")
            }
            Error::BitWidthTooLarge(n) => write!(f, "unable to read {n} bits in one call"),
            Error::Unseekable => write!(f, "source does not support seeking"),
            Error::UnknownSize => write!(f, "source has no known size"),
            Error::EmptyXorKey => write!(f, "XOR key must not be empty"),
            Error::UnsupportedRotateGroup(n) => {
                write!(f, "unable to rotate in groups of {n} bytes")
            }
            Error::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "compression")]
            Error::Zlib => write!(f, "zlib inflation failed"),
            Error::Validation(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        if let Error::Io(e) = self {
            Some(e)
        } else {
            None
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<ValidationError> for Error {
    fn from(e: ValidationError) -> Self {
        Error::Validation(e)
    }
}

/// A single decoder-side validation failure.
///
/// Built at the moment a check fails and never mutated afterwards. The
/// `src_path` names the logical field that failed (supplied by the
/// decoder); `pos` is the stream position at failure time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub kind: ValidationKind,
    pub src_path: String,
    pub pos: u64,
}

/// What exactly a validation check compared, with operands pre-rendered
/// through [`ValueRepr`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationKind {
    /// Fixed expected contents did not match the data actually read.
    UnexpectedData { expected: String, actual: String },
    /// An endianness-switching expression produced no usable byte order.
    UndecidedEndianness,
    /// Value is not equal to the single expected value.
    NotEqual { expected: String, actual: String },
    /// Value is below the allowed minimum.
    LessThan { min: String, actual: String },
    /// Value is above the allowed maximum.
    GreaterThan { max: String, actual: String },
    /// Value is not in the allowed set.
    NotAnyOf { actual: String },
    /// Value fails an arbitrary boolean expression.
    ExprFailed { actual: String },
}

impl ValidationError {
    pub fn unexpected_data<V: ValueRepr + ?Sized>(
        expected: &V,
        actual: &V,
        pos: u64,
        src_path: impl Into<String>,
    ) -> Self {
        Self {
            kind: ValidationKind::UnexpectedData {
                expected: expected.repr(),
                actual: actual.repr(),
            },
            src_path: src_path.into(),
            pos,
        }
    }

    pub fn undecided_endianness(pos: u64, src_path: impl Into<String>) -> Self {
        Self {
            kind: ValidationKind::UndecidedEndianness,
            src_path: src_path.into(),
            pos,
        }
    }

    pub fn not_equal<V: ValueRepr + ?Sized>(
        expected: &V,
        actual: &V,
        pos: u64,
        src_path: impl Into<String>,
    ) -> Self {
        Self {
            kind: ValidationKind::NotEqual {
                expected: expected.repr(),
                actual: actual.repr(),
            },
            src_path: src_path.into(),
            pos,
        }
    }

    pub fn less_than<V: ValueRepr + ?Sized>(
        min: &V,
        actual: &V,
        pos: u64,
        src_path: impl Into<String>,
    ) -> Self {
        Self {
            kind: ValidationKind::LessThan {
                min: min.repr(),
                actual: actual.repr(),
            },
            src_path: src_path.into(),
            pos,
        }
    }

    pub fn greater_than<V: ValueRepr + ?Sized>(
        max: &V,
        actual: &V,
        pos: u64,
        src_path: impl Into<String>,
    ) -> Self {
        Self {
            kind: ValidationKind::GreaterThan {
                max: max.repr(),
                actual: actual.repr(),
            },
            src_path: src_path.into(),
            pos,
        }
    }

    pub fn not_any_of<V: ValueRepr + ?Sized>(
        actual: &V,
        pos: u64,
        src_path: impl Into<String>,
    ) -> Self {
        Self {
            kind: ValidationKind::NotAnyOf {
                actual: actual.repr(),
            },
            src_path: src_path.into(),
            pos,
        }
    }

    pub fn expr_failed<V: ValueRepr + ?Sized>(
        actual: &V,
        pos: u64,
        src_path: impl Into<String>,
    ) -> Self {
        Self {
            kind: ValidationKind::ExprFailed {
                actual: actual.repr(),
            },
            src_path: src_path.into(),
            pos,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: at pos {}: ", self.src_path, self.pos)?;
        match &self.kind {
            ValidationKind::UnexpectedData { expected, actual } => {
                write!(
                    f,
                    "unexpected fixed contents: got {actual}, was waiting for {expected}"
                )
            }
            ValidationKind::UndecidedEndianness => {
                write!(f, "unable to decide on endianness for a type")
            }
            ValidationKind::NotEqual { expected, actual } => {
                write!(
                    f,
                    "validation failed: not equal, expected {expected}, but got {actual}"
                )
            }
            ValidationKind::LessThan { min, actual } => {
                write!(
                    f,
                    "validation failed: not in range, min {min}, but got {actual}"
                )
            }
            ValidationKind::GreaterThan { max, actual } => {
                write!(
                    f,
                    "validation failed: not in range, max {max}, but got {actual}"
                )
            }
            ValidationKind::NotAnyOf { actual } => {
                write!(f, "validation failed: not any of the list, got {actual}")
            }
            ValidationKind::ExprFailed { actual } => {
                write!(
                    f,
                    "validation failed: not matching the expression, got {actual}"
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Renders a value for inclusion in a validation diagnostic.
///
/// Byte arrays become bracketed space-separated hex pairs (`[61 62 63]`);
/// everything else uses its natural textual representation.
pub trait ValueRepr {
    fn repr(&self) -> String;
}

impl ValueRepr for [u8] {
    fn repr(&self) -> String {
        let pairs: Vec<String> = self.iter().map(|b| format!("{b:02x}")).collect();
        format!("[{}]", pairs.join(" "))
    }
}

impl ValueRepr for Vec<u8> {
    fn repr(&self) -> String {
        self.as_slice().repr()
    }
}

impl<const N: usize> ValueRepr for [u8; N] {
    fn repr(&self) -> String {
        self.as_slice().repr()
    }
}

impl ValueRepr for str {
    fn repr(&self) -> String {
        format!("{self:?}")
    }
}

macro_rules! display_repr {
    ($($t:ty),*) => {
        $(impl ValueRepr for $t {
            fn repr(&self) -> String {
                self.to_string()
            }
        })*
    };
}

display_repr!(u8, u16, u32, u64, i8, i16, i32, i64, f32, f64, bool);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eof_reports_both_counts() {
        let e = Error::Eof {
            requested: 5,
            available: 4,
        };
        assert_eq!(e.to_string(), "attempted to read 5 bytes, got only 4");
    }

    #[test]
    fn bytes_render_as_hex_pairs() {
        assert_eq!(b"abc".repr(), "[61 62 63]");
        assert_eq!(Vec::<u8>::new().repr(), "[]");
    }

    #[test]
    fn numbers_render_naturally() {
        assert_eq!(513u16.repr(), "513");
        assert_eq!((-1i8).repr(), "-1");
    }

    #[test]
    fn not_equal_message() {
        let e = ValidationError::not_equal(&258u16, &513u16, 2, "/seq/0/magic");
        assert_eq!(
            e.to_string(),
            "/seq/0/magic: at pos 2: validation failed: not equal, expected 258, but got 513"
        );
    }

    #[test]
    fn unexpected_data_message_uses_hex() {
        let e =
            ValidationError::unexpected_data(b"ab".as_slice(), b"xy".as_slice(), 0, "/header");
        assert_eq!(
            e.to_string(),
            "/header: at pos 0: unexpected fixed contents: got [78 79], was waiting for [61 62]"
        );
    }

    #[test]
    fn validation_converts_into_error() {
        let v = ValidationError::not_any_of(&7u8, 9, "/seq/1/kind");
        let e: Error = v.clone().into();
        match e {
            Error::Validation(inner) => assert_eq!(inner, v),
            other => panic!("expected Validation, got {other:?}"),
        }
    }
}
