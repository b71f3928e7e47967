//! Slice-level helpers for already-materialized byte buffers.
//!
//! These operate on bytes a decoder has read in full, unlike the
//! terminated reads on [`crate::stream::Stream`] which scan the stream
//! itself.

/// Trim trailing occurrences of `pad` from `bytes`.
pub fn bytes_strip_right(bytes: &[u8], pad: u8) -> Vec<u8> {
    let mut len = bytes.len();
    while len > 0 && bytes[len - 1] == pad {
        len -= 1;
    }
    bytes[..len].to_vec()
}

/// Truncate `bytes` at the first occurrence of `term`.
///
/// The terminator is kept when `include_term` is set. Without a
/// terminator the input is returned unmodified.
pub fn bytes_terminate(bytes: &[u8], term: u8, include_term: bool) -> Vec<u8> {
    match bytes.iter().position(|&b| b == term) {
        Some(i) => bytes[..i + usize::from(include_term)].to_vec(),
        None => bytes.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_right_trims_padding() {
        assert_eq!(bytes_strip_right(b"abc\0\0\0", 0), b"abc");
        assert_eq!(bytes_strip_right(b"abc   ", b' '), b"abc");
    }

    #[test]
    fn strip_right_leaves_interior_pads() {
        assert_eq!(bytes_strip_right(b"a\0b\0", 0), b"a\0b");
    }

    #[test]
    fn strip_right_all_padding_gives_empty() {
        assert_eq!(bytes_strip_right(b"\0\0", 0), b"");
        assert_eq!(bytes_strip_right(b"", 0), b"");
    }

    #[test]
    fn terminate_truncates_at_first_match() {
        assert_eq!(bytes_terminate(b"ab\0cd\0e", 0, false), b"ab");
        assert_eq!(bytes_terminate(b"ab\0cd\0e", 0, true), b"ab\0");
    }

    #[test]
    fn terminate_without_match_copies_through() {
        assert_eq!(bytes_terminate(b"abc", 0, false), b"abc");
    }
}
