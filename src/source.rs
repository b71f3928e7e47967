//! Byte sources: the capability set a [`crate::stream::Stream`] reads from.
//!
//! A source supports reading a given number of bytes (short results at end
//! of data, never over-reads), reading to the end, single-byte advance,
//! absolute seeking, and position/size queries. Four implementations are
//! provided:
//!
//! | Type | Backing | Notes |
//! |------|---------|-------|
//! | [`BufSource`]  | `Vec<u8>` | in-memory, always seekable |
//! | [`IoSource`]   | any [`Read`] + [`Seek`] | files, cursors |
//! | [`PipeSource`] | any [`Read`] | sockets/pipes; `seek` and `size` fail |
//! | [`SubSource`]  | a window over another source | zero-copy bounded view |
//!
//! Sources are shared between a stream and its substreams as
//! `Rc<RefCell<dyn ByteSource>>`; the model is strictly single-threaded.

use std::cell::RefCell;
use std::io::{Read, Seek, SeekFrom};
use std::rc::Rc;

use crate::{Error, Result};

/// Shared handle to a byte source, as held by streams and substreams.
pub type SharedSource = Rc<RefCell<dyn ByteSource>>;

/// Capability set required to back a stream.
///
/// `read` returns short (possibly empty) results when fewer bytes remain;
/// it is the stream layer that turns a short read into an EOF error.
/// Seeking past the end is legal and only affects subsequent EOF checks.
pub trait ByteSource {
    /// Read up to `n` bytes from the current position.
    fn read(&mut self, n: usize) -> Result<Vec<u8>>;

    /// Read everything from the current position to the end of the source.
    fn read_to_end(&mut self) -> Result<Vec<u8>>;

    /// Read a single byte, or `None` at end of data.
    fn getc(&mut self) -> Result<Option<u8>>;

    /// Seek to an absolute byte offset.
    fn seek(&mut self, pos: u64) -> Result<()>;

    /// Current position in bytes from the start of the source.
    fn pos(&mut self) -> Result<u64>;

    /// Total size of the source in bytes.
    fn size(&mut self) -> Result<u64>;

    /// Whether the current position is at or past the end of the source.
    fn is_eof(&mut self) -> Result<bool> {
        Ok(self.pos()? >= self.size()?)
    }
}

/// In-memory source over an owned byte buffer.
#[derive(Debug, Clone)]
pub struct BufSource {
    data: Vec<u8>,
    pos: u64,
}

impl BufSource {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            pos: 0,
        }
    }
}

impl ByteSource for BufSource {
    fn read(&mut self, n: usize) -> Result<Vec<u8>> {
        let len = self.data.len() as u64;
        if self.pos >= len {
            return Ok(Vec::new());
        }
        let start = self.pos as usize;
        let end = (self.pos.saturating_add(n as u64)).min(len) as usize;
        self.pos = end as u64;
        Ok(self.data[start..end].to_vec())
    }

    fn read_to_end(&mut self) -> Result<Vec<u8>> {
        self.read(self.data.len())
    }

    fn getc(&mut self) -> Result<Option<u8>> {
        let Some(&b) = self.data.get(self.pos as usize) else {
            return Ok(None);
        };
        self.pos += 1;
        Ok(Some(b))
    }

    fn seek(&mut self, pos: u64) -> Result<()> {
        self.pos = pos;
        Ok(())
    }

    fn pos(&mut self) -> Result<u64> {
        Ok(self.pos)
    }

    fn size(&mut self) -> Result<u64> {
        Ok(self.data.len() as u64)
    }
}

/// Source over any seekable reader (a [`std::fs::File`], a
/// [`std::io::Cursor`], a memory-mapped region, ...).
#[derive(Debug)]
pub struct IoSource<R> {
    inner: R,
}

impl<R: Read + Seek> IoSource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Consume the source, returning the inner reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read + Seek> ByteSource for IoSource<R> {
    fn read(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; n];
        let mut filled = 0;
        while filled < n {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(k) => filled += k,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        buf.truncate(filled);
        Ok(buf)
    }

    fn read_to_end(&mut self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.inner.read_to_end(&mut buf)?;
        Ok(buf)
    }

    fn getc(&mut self) -> Result<Option<u8>> {
        let mut b = [0u8; 1];
        loop {
            match self.inner.read(&mut b) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(b[0])),
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn seek(&mut self, pos: u64) -> Result<()> {
        self.inner.seek(SeekFrom::Start(pos))?;
        Ok(())
    }

    fn pos(&mut self) -> Result<u64> {
        Ok(self.inner.stream_position()?)
    }

    fn size(&mut self) -> Result<u64> {
        let saved = self.inner.stream_position()?;
        let end = self.inner.seek(SeekFrom::End(0))?;
        self.inner.seek(SeekFrom::Start(saved))?;
        Ok(end)
    }
}

/// Source over a forward-only reader such as a socket or pipe.
///
/// Position is tracked manually; a one-byte peek buffer lets [`is_eof`]
/// work without losing data. `seek` fails with [`Error::Unseekable`] and
/// `size` with [`Error::UnknownSize`], as the transport has neither.
///
/// [`is_eof`]: ByteSource::is_eof
#[derive(Debug)]
pub struct PipeSource<R> {
    inner: R,
    pos: u64,
    peeked: Option<u8>,
}

impl<R: Read> PipeSource<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            pos: 0,
            peeked: None,
        }
    }
}

impl<R: Read> ByteSource for PipeSource<R> {
    fn read(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(n);
        if n > 0
            && let Some(b) = self.peeked.take()
        {
            out.push(b);
        }
        let mut buf = vec![0u8; n - out.len()];
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(k) => filled += k,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        out.extend_from_slice(&buf[..filled]);
        self.pos += out.len() as u64;
        Ok(out)
    }

    fn read_to_end(&mut self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        if let Some(b) = self.peeked.take() {
            out.push(b);
        }
        self.inner.read_to_end(&mut out)?;
        self.pos += out.len() as u64;
        Ok(out)
    }

    fn getc(&mut self) -> Result<Option<u8>> {
        if let Some(b) = self.peeked.take() {
            self.pos += 1;
            return Ok(Some(b));
        }
        let mut b = [0u8; 1];
        loop {
            match self.inner.read(&mut b) {
                Ok(0) => return Ok(None),
                Ok(_) => {
                    self.pos += 1;
                    return Ok(Some(b[0]));
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn seek(&mut self, _pos: u64) -> Result<()> {
        Err(Error::Unseekable)
    }

    fn pos(&mut self) -> Result<u64> {
        Ok(self.pos)
    }

    fn size(&mut self) -> Result<u64> {
        Err(Error::UnknownSize)
    }

    fn is_eof(&mut self) -> Result<bool> {
        if self.peeked.is_some() {
            return Ok(false);
        }
        let mut b = [0u8; 1];
        loop {
            match self.inner.read(&mut b) {
                Ok(0) => return Ok(true),
                Ok(_) => {
                    self.peeked = Some(b[0]);
                    return Ok(false);
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/// Bounded zero-copy view over a window of a parent source.
///
/// All operations work in local coordinates `[0, size)` and are translated
/// to `start + pos` in the parent before touching it. Every operation saves
/// the parent position first and restores it before returning, on success
/// and on error alike, so sibling views over the same parent never observe
/// each other's reads. The local position may be seeked past `size`; reads
/// there return empty results.
pub struct SubSource {
    parent: SharedSource,
    start: u64,
    size: u64,
    pos: u64,
}

impl SubSource {
    pub fn new(parent: SharedSource, start: u64, size: u64) -> Self {
        Self {
            parent,
            start,
            size,
            pos: 0,
        }
    }

    /// Offset of the window start in parent coordinates.
    pub fn parent_start(&self) -> u64 {
        self.start
    }

    /// Runs `f` against the parent positioned at `start + pos`, restoring
    /// the parent's own position on the way out.
    fn with_parent<T>(&mut self, f: impl FnOnce(&mut dyn ByteSource) -> Result<T>) -> Result<T> {
        let mut parent = self.parent.borrow_mut();
        let saved = parent.pos()?;
        parent.seek(self.start + self.pos)?;
        let res = f(&mut *parent);
        parent.seek(saved)?;
        res
    }

    /// Bytes left in the window, zero when positioned at or past the end.
    fn remaining(&self) -> u64 {
        self.size.saturating_sub(self.pos)
    }
}

impl ByteSource for SubSource {
    fn read(&mut self, n: usize) -> Result<Vec<u8>> {
        let len = (n as u64).min(self.remaining()) as usize;
        if len == 0 {
            return Ok(Vec::new());
        }
        let out = self.with_parent(|p| p.read(len))?;
        self.pos += out.len() as u64;
        Ok(out)
    }

    fn read_to_end(&mut self) -> Result<Vec<u8>> {
        let len = self.remaining() as usize;
        if len == 0 {
            return Ok(Vec::new());
        }
        let out = self.with_parent(|p| p.read(len))?;
        self.pos += out.len() as u64;
        Ok(out)
    }

    fn getc(&mut self) -> Result<Option<u8>> {
        if self.remaining() == 0 {
            return Ok(None);
        }
        let b = self.with_parent(|p| p.getc())?;
        if b.is_some() {
            self.pos += 1;
        }
        Ok(b)
    }

    fn seek(&mut self, pos: u64) -> Result<()> {
        self.pos = pos;
        Ok(())
    }

    fn pos(&mut self) -> Result<u64> {
        Ok(self.pos)
    }

    fn size(&mut self) -> Result<u64> {
        Ok(self.size)
    }

    fn is_eof(&mut self) -> Result<bool> {
        Ok(self.pos >= self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sub_12345() -> (SharedSource, SubSource) {
        let parent: SharedSource = Rc::new(RefCell::new(BufSource::new(*b"12345")));
        let sub = SubSource::new(Rc::clone(&parent), 1, 3);
        (parent, sub)
    }

    #[test]
    fn buf_read_and_advance() {
        let mut src = BufSource::new(*b"12345");
        assert_eq!(src.read(2).unwrap(), b"12");
        assert_eq!(src.pos().unwrap(), 2);
        assert_eq!(src.read_to_end().unwrap(), b"345");
        assert!(src.is_eof().unwrap());
    }

    #[test]
    fn buf_read_past_end_is_empty_and_keeps_pos() {
        let mut src = BufSource::new(*b"ab");
        src.seek(10).unwrap();
        assert_eq!(src.read(3).unwrap(), b"");
        assert_eq!(src.pos().unwrap(), 10);
    }

    #[test]
    fn io_source_size_restores_position() {
        let mut src = IoSource::new(Cursor::new(b"12345".to_vec()));
        src.seek(2).unwrap();
        assert_eq!(src.size().unwrap(), 5);
        assert_eq!(src.pos().unwrap(), 2);
        assert_eq!(src.read(2).unwrap(), b"34");
    }

    #[test]
    fn pipe_source_refuses_seek_and_size() {
        let mut src = PipeSource::new(&b"xyz"[..]);
        assert!(matches!(src.seek(0), Err(Error::Unseekable)));
        assert!(matches!(src.size(), Err(Error::UnknownSize)));
    }

    #[test]
    fn pipe_source_eof_peek_does_not_lose_data() {
        let mut src = PipeSource::new(&b"ab"[..]);
        assert!(!src.is_eof().unwrap());
        assert_eq!(src.read(2).unwrap(), b"ab");
        assert_eq!(src.pos().unwrap(), 2);
        assert!(src.is_eof().unwrap());
    }

    #[test]
    fn sub_reads_its_window() {
        let (_, mut sub) = sub_12345();
        assert_eq!(sub.read(3).unwrap(), b"234");
        assert_eq!(sub.pos().unwrap(), 3);
        assert!(sub.is_eof().unwrap());
    }

    #[test]
    fn sub_read_caps_at_window_end() {
        let (_, mut sub) = sub_12345();
        assert_eq!(sub.read(4).unwrap(), b"234");
        assert_eq!(sub.pos().unwrap(), 3);
    }

    #[test]
    fn sub_seek_past_end_then_read_is_empty() {
        let (_, mut sub) = sub_12345();
        sub.seek(10).unwrap();
        assert!(sub.is_eof().unwrap());
        assert_eq!(sub.read(1).unwrap(), b"");
        assert_eq!(sub.read_to_end().unwrap(), b"");
        assert_eq!(sub.pos().unwrap(), 10);
    }

    #[test]
    fn sub_does_not_move_parent_position() {
        let (parent, mut sub) = sub_12345();
        parent.borrow_mut().seek(4).unwrap();
        assert_eq!(sub.read(2).unwrap(), b"23");
        assert_eq!(sub.getc().unwrap(), Some(b'4'));
        assert_eq!(parent.borrow_mut().pos().unwrap(), 4);
    }

    #[test]
    fn sub_getc_at_end_is_none() {
        let (_, mut sub) = sub_12345();
        sub.seek(3).unwrap();
        assert_eq!(sub.getc().unwrap(), None);
    }

    #[test]
    fn nested_sub_translates_through_both_layers() {
        let (_, sub) = sub_12345();
        let mid: SharedSource = Rc::new(RefCell::new(sub));
        let mut inner = SubSource::new(Rc::clone(&mid), 1, 2);
        assert_eq!(inner.read(2).unwrap(), b"34");
        assert_eq!(mid.borrow_mut().pos().unwrap(), 0);
    }
}
