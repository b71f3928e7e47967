//! The decoding stream: typed primitive reads, the bit accumulator, byte
//! and terminated reads, and bounded substreams.
//!
//! A [`Stream`] wraps a [`ByteSource`] and is the only API surface a
//! generated decoder talks to. All reads are synchronous and may block on
//! the underlying source; the stream is not reentrant from multiple
//! threads (position and the bit accumulator are mutable shared state).
//!
//! ## Conventions
//!
//! * **Exact reads** - every `read_*` primitive consumes exactly the bytes
//!   it promises or fails with [`Error::Eof`] reporting both the requested
//!   and available counts. There is no partial-read ambiguity.
//! * **Explicit byte order** - `le`/`be` method suffixes select the byte
//!   order; assembly always goes through explicit byte-order conversion,
//!   never host-endianness branching.
//! * **Explicit alignment** - byte-oriented reads do not implicitly drop
//!   pending sub-byte bits. A decoder that mixes bit- and byte-level reads
//!   calls [`Stream::align_to_byte`] at the switch points itself.

use std::cell::RefCell;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use std::rc::Rc;

use crate::source::{BufSource, ByteSource, IoSource, PipeSource, SharedSource, SubSource};
use crate::{Error, Result};

/// A positioned, bit-capable decoding stream over a shared byte source.
pub struct Stream {
    source: SharedSource,
    // Pending sub-byte bits. At rest `bits` holds at most `bits_left` (0..=7)
    // valid bits; intermediate math widens to u128 because a 64-bit read can
    // transiently combine up to 71 bits.
    bits: u64,
    bits_left: u32,
}

impl Stream {
    /// Wrap an existing byte source.
    pub fn new(source: impl ByteSource + 'static) -> Self {
        Self::from_shared(Rc::new(RefCell::new(source)))
    }

    /// Wrap an already-shared byte source handle.
    pub fn from_shared(source: SharedSource) -> Self {
        Self {
            source,
            bits: 0,
            bits_left: 0,
        }
    }

    /// Decode from an in-memory byte buffer.
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        Self::new(BufSource::new(data))
    }

    /// Decode from any seekable reader (a file, a cursor, ...).
    pub fn from_io<R: Read + Seek + 'static>(inner: R) -> Self {
        Self::new(IoSource::new(inner))
    }

    /// Decode from a forward-only reader (a socket, a pipe).
    ///
    /// Seeking and size queries on such a stream fail loudly; see
    /// [`PipeSource`].
    pub fn from_reader<R: Read + 'static>(inner: R) -> Self {
        Self::new(PipeSource::new(inner))
    }

    /// Open a local file for decoding (buffered).
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::from_io(BufReader::new(file)))
    }

    /// Shared handle to the underlying byte source.
    pub fn source(&self) -> SharedSource {
        Rc::clone(&self.source)
    }

    // ----------------------------------------------------------------
    // Positioning
    // ----------------------------------------------------------------

    /// True when the source is at its end and no sub-byte bits are pending.
    pub fn is_eof(&mut self) -> Result<bool> {
        Ok(self.bits_left == 0 && self.source.borrow_mut().is_eof()?)
    }

    /// Seek to an absolute byte offset. Seeking past the end is legal and
    /// only affects subsequent EOF checks.
    pub fn seek(&mut self, pos: u64) -> Result<()> {
        self.source.borrow_mut().seek(pos)
    }

    /// Current byte position from the start of the stream.
    pub fn pos(&mut self) -> Result<u64> {
        self.source.borrow_mut().pos()
    }

    /// Total stream size in bytes.
    pub fn size(&mut self) -> Result<u64> {
        self.source.borrow_mut().size()
    }

    // ----------------------------------------------------------------
    // Integers
    // ----------------------------------------------------------------

    pub fn read_u1(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u2le(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u2be(&mut self) -> Result<u16> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    pub fn read_u4le(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u4be(&mut self) -> Result<u32> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    pub fn read_u8le(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    pub fn read_u8be(&mut self) -> Result<u64> {
        Ok(u64::from_be_bytes(self.read_array()?))
    }

    pub fn read_s1(&mut self) -> Result<i8> {
        Ok(self.read_u1()? as i8)
    }

    pub fn read_s2le(&mut self) -> Result<i16> {
        Ok(i16::from_le_bytes(self.read_array()?))
    }

    pub fn read_s2be(&mut self) -> Result<i16> {
        Ok(i16::from_be_bytes(self.read_array()?))
    }

    pub fn read_s4le(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    pub fn read_s4be(&mut self) -> Result<i32> {
        Ok(i32::from_be_bytes(self.read_array()?))
    }

    pub fn read_s8le(&mut self) -> Result<i64> {
        Ok(i64::from_le_bytes(self.read_array()?))
    }

    pub fn read_s8be(&mut self) -> Result<i64> {
        Ok(i64::from_be_bytes(self.read_array()?))
    }

    // ----------------------------------------------------------------
    // Floating point
    // ----------------------------------------------------------------

    pub fn read_f4le(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    pub fn read_f4be(&mut self) -> Result<f32> {
        Ok(f32::from_be_bytes(self.read_array()?))
    }

    pub fn read_f8le(&mut self) -> Result<f64> {
        Ok(f64::from_le_bytes(self.read_array()?))
    }

    pub fn read_f8be(&mut self) -> Result<f64> {
        Ok(f64::from_be_bytes(self.read_array()?))
    }

    // ----------------------------------------------------------------
    // Unaligned bit values
    // ----------------------------------------------------------------

    /// Discard any pending sub-byte bits, returning to byte alignment.
    ///
    /// Required between bit-level and byte-level reads, and when switching
    /// between the big- and little-endian bit conventions on one stream.
    pub fn align_to_byte(&mut self) {
        self.bits = 0;
        self.bits_left = 0;
    }

    /// Read `n` bits (0..=64), delivered most-significant-bit-first across
    /// the logical bit stream. Leftover bits are kept for the next call.
    pub fn read_bits_int_be(&mut self, n: u32) -> Result<u64> {
        if n > 64 {
            return Err(Error::BitWidthTooLarge(n));
        }

        let mut res: u128;
        let bits_needed = n as i64 - self.bits_left as i64;
        self.bits_left = (-bits_needed).rem_euclid(8) as u32;

        if bits_needed > 0 {
            // 1 bit => 1 byte; 8 bits => 1 byte; 9 bits => 2 bytes
            let bytes_needed = ((bits_needed - 1) / 8) + 1;
            let buf = self.read_bytes(bytes_needed as usize)?;
            res = 0;
            for b in buf {
                res = res << 8 | b as u128;
            }

            let new_bits = res;
            res = res >> self.bits_left | (self.bits as u128) << bits_needed;
            self.bits = new_bits as u64; // masked below
        } else {
            res = (self.bits >> -bits_needed) as u128; // shift unneeded bits out
        }

        let mask = (1u64 << self.bits_left) - 1; // bits_left is in 0..=7
        self.bits &= mask;

        Ok(res as u64)
    }

    /// Read `n` bits (0..=64), delivered least-significant-bit-first across
    /// the logical bit stream. Leftover bits are kept for the next call.
    pub fn read_bits_int_le(&mut self, n: u32) -> Result<u64> {
        if n > 64 {
            return Err(Error::BitWidthTooLarge(n));
        }

        let mut res: u128;
        let bits_needed = n as i64 - self.bits_left as i64;

        if bits_needed > 0 {
            // 1 bit => 1 byte; 8 bits => 1 byte; 9 bits => 2 bytes
            let bytes_needed = ((bits_needed - 1) / 8) + 1;
            let buf = self.read_bytes(bytes_needed as usize)?;
            let mut raw: u128 = 0;
            for (i, b) in buf.iter().enumerate() {
                raw |= (*b as u128) << (i * 8);
            }

            let new_bits = raw >> bits_needed;
            res = raw << self.bits_left | self.bits as u128;
            self.bits = new_bits as u64;
        } else {
            res = self.bits as u128;
            self.bits >>= n;
        }

        self.bits_left = (-bits_needed).rem_euclid(8) as u32;

        let mask = (1u128 << n) - 1;
        Ok((res & mask) as u64)
    }

    // ----------------------------------------------------------------
    // Byte arrays
    // ----------------------------------------------------------------

    /// Read exactly `n` bytes.
    ///
    /// Returns [`Error::Eof`] with the requested and available counts when
    /// fewer bytes remain.
    pub fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        let buf = self.source.borrow_mut().read(n)?;
        if buf.len() < n {
            return Err(Error::Eof {
                requested: n,
                available: buf.len(),
            });
        }
        Ok(buf)
    }

    /// Read all remaining bytes, possibly none.
    pub fn read_bytes_full(&mut self) -> Result<Vec<u8>> {
        self.source.borrow_mut().read_to_end()
    }

    /// Read bytes up to a terminator.
    ///
    /// * `include_term` - keep the terminator in the returned bytes.
    /// * `consume_term` - when false, rewind so the terminator stays
    ///   readable by the next call.
    /// * `eos_error` - when true, hitting end of stream without a match is
    ///   [`Error::MissingTerminator`]; when false, the accumulated bytes
    ///   are returned as-is.
    pub fn read_bytes_term(
        &mut self,
        term: u8,
        include_term: bool,
        consume_term: bool,
        eos_error: bool,
    ) -> Result<Vec<u8>> {
        let mut source = self.source.borrow_mut();
        let mut out = Vec::new();
        loop {
            match source.getc()? {
                None => {
                    if eos_error {
                        return Err(Error::MissingTerminator(term));
                    }
                    return Ok(out);
                }
                Some(b) if b == term => {
                    if include_term {
                        out.push(b);
                    }
                    if !consume_term {
                        let pos = source.pos()?;
                        source.seek(pos - 1)?;
                    }
                    return Ok(out);
                }
                Some(b) => out.push(b),
            }
        }
    }

    // ----------------------------------------------------------------
    // Substreams
    // ----------------------------------------------------------------

    /// Reserve the next `n` bytes as an independent substream.
    ///
    /// The substream shares this stream's bytes without copying, addresses
    /// them as `[0, n)`, and has its own position and EOF boundary. This
    /// stream's position advances by `n` immediately, whether or not the
    /// substream is ever read.
    pub fn substream(&mut self, n: u64) -> Result<Stream> {
        let start = {
            let mut source = self.source.borrow_mut();
            let start = source.pos()?;
            source.seek(start + n)?;
            start
        };
        Ok(Stream::new(SubSource::new(self.source(), start, n)))
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let bytes = self.read_bytes(N)?;
        let mut buf = [0u8; N];
        buf.copy_from_slice(&bytes);
        Ok(buf)
    }
}
