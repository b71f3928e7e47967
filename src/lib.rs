//! **streamkit** - runtime stream primitives for generated binary format
//! decoders.
//!
//! A decoder generated from a format description does no byte wrangling of
//! its own: it calls into a [`Stream`] for every primitive it reads. This
//! crate is that runtime - a seekable, bit-capable decoding stream with
//! bounded zero-copy substreams and a precise, addressable error taxonomy.
//!
//! # Module overview
//! | Module | Contents |
//! |--------|----------|
//! | [`stream`]  | [`Stream`]: typed reads, bit accumulator, terminated reads, substreams |
//! | [`source`]  | [`source::ByteSource`] trait; in-memory, file, pipe, and bounded sources |
//! | [`process`] | byte-array transforms: XOR (one/many), rotate, zlib (feature-gated) |
//! | [`utils`]   | slice helpers: strip trailing padding, truncate at terminator |
//! | [`decode`]  | [`Decode`]: the entry-point contract generated decoders implement |
//! | [`error`]   | [`Error`], [`Result`], and the validation-failure taxonomy |
//!
//! # Example
//!
//! ```
//! use streamkit::Stream;
//!
//! # fn main() -> streamkit::Result<()> {
//! let mut io = Stream::from_bytes([0x01, 0x02, b'h', b'i', 0x00, 0xff]);
//! assert_eq!(io.read_u2le()?, 0x0201);
//! assert_eq!(io.read_bytes_term(0, false, true, true)?, b"hi");
//!
//! // Carve the last byte out as an independent bounded view.
//! let mut tail = io.substream(1)?;
//! assert_eq!(tail.read_u1()?, 0xff);
//! assert!(io.is_eof()?);
//! # Ok(())
//! # }
//! ```

pub mod decode;
pub mod error;
pub mod process;
pub mod source;
pub mod stream;
pub mod utils;

pub use decode::Decode;
pub use error::{Error, Result};
pub use stream::Stream;
