//! Base contract for generated decoder types.

use std::path::Path;

use crate::stream::Stream;
use crate::Result;

/// A type that can be decoded from a [`Stream`].
///
/// Generated decoders implement [`decode`] and get the in-memory and file
/// entry points for free. A decoder holds whatever references to its
/// stream, parent, and root it needs for navigation; those references are
/// non-owning by construction, so the resulting object graph is acyclic
/// and needs no cycle detection.
///
/// [`decode`]: Decode::decode
pub trait Decode: Sized {
    /// Decode one value from the stream's current position.
    fn decode(io: &mut Stream) -> Result<Self>;

    /// Decode from an in-memory byte buffer.
    fn from_bytes(data: impl Into<Vec<u8>>) -> Result<Self> {
        Self::decode(&mut Stream::from_bytes(data))
    }

    /// Decode from a local file.
    fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::decode(&mut Stream::open(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    /// Tiny hand-written stand-in for a generated decoder: a magic byte
    /// followed by a little-endian u16 length and that many payload bytes.
    #[derive(Debug)]
    struct Record {
        len: u16,
        payload: Vec<u8>,
    }

    impl Decode for Record {
        fn decode(io: &mut Stream) -> Result<Self> {
            let magic = io.read_u1()?;
            if magic != 0x7e {
                let pos = io.pos()?;
                return Err(ValidationError::not_equal(&0x7eu8, &magic, pos, "/seq/0/magic").into());
            }
            let len = io.read_u2le()?;
            let payload = io.read_bytes(len as usize)?;
            Ok(Self { len, payload })
        }
    }

    #[test]
    fn decodes_from_bytes() {
        let r = Record::from_bytes([0x7e, 0x03, 0x00, b'a', b'b', b'c']).unwrap();
        assert_eq!(r.len, 3);
        assert_eq!(r.payload, b"abc");
    }

    #[test]
    fn bad_magic_is_a_validation_failure() {
        let err = Record::from_bytes([0x00, 0x01, 0x00, b'x']).unwrap_err();
        assert_eq!(
            err.to_string(),
            "/seq/0/magic: at pos 1: validation failed: not equal, expected 126, but got 0"
        );
    }

    #[test]
    fn truncated_payload_is_eof() {
        let err = Record::from_bytes([0x7e, 0x05, 0x00, b'a']).unwrap_err();
        assert_eq!(err.to_string(), "attempted to read 5 bytes, got only 1");
    }
}
