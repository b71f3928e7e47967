//! Byte-array post-processing transforms.
//!
//! Pure functions applied by decoders to already-materialized byte
//! buffers, typically to undo light obfuscation or compression declared
//! by a format: single-byte XOR, repeating-key XOR, per-byte rotation,
//! and (behind the `compression` feature) zlib inflation.

use crate::{Error, Result};

/// XOR every byte of `data` with a single key byte.
///
/// XOR is symmetric: applying the same key twice restores the input.
pub fn process_xor_one(data: &[u8], key: u8) -> Vec<u8> {
    data.iter().map(|&b| b ^ key).collect()
}

/// XOR every byte of `data` with a repeating multi-byte key.
///
/// Returns [`Error::EmptyXorKey`] when the key has no bytes.
pub fn process_xor_many(data: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    if key.is_empty() {
        return Err(Error::EmptyXorKey);
    }
    Ok(data
        .iter()
        .enumerate()
        .map(|(i, &b)| b ^ key[i % key.len()])
        .collect())
}

/// Rotate every byte of `data` left by `amount` bits.
///
/// The amount is normalized modulo 8, so negative amounts perform the
/// corresponding right rotation and rotating by 0 or 8 is the identity.
/// Only `group_size == 1` is supported; rotation over wider byte groups
/// fails with [`Error::UnsupportedRotateGroup`].
pub fn process_rotate_left(data: &[u8], amount: i32, group_size: usize) -> Result<Vec<u8>> {
    if group_size != 1 {
        return Err(Error::UnsupportedRotateGroup(group_size));
    }
    let amount = amount.rem_euclid(8) as u32;
    Ok(data.iter().map(|&b| b.rotate_left(amount)).collect())
}

/// Inflate a zlib-compressed buffer (requires the `compression` feature).
///
/// Returns [`Error::Zlib`] on any inflation failure.
#[cfg(feature = "compression")]
pub fn process_zlib(data: &[u8]) -> Result<Vec<u8>> {
    use std::io::Read;

    let mut out = Vec::new();
    flate2::read::ZlibDecoder::new(data)
        .read_to_end(&mut out)
        .map_err(|_| Error::Zlib)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xor_one_is_involution() {
        let data = b"The quick brown fox";
        let once = process_xor_one(data, 0x5a);
        assert_ne!(once, data);
        assert_eq!(process_xor_one(&once, 0x5a), data);
    }

    #[test]
    fn xor_one_zero_key_is_identity() {
        assert_eq!(process_xor_one(b"abc", 0), b"abc");
    }

    #[test]
    fn xor_many_cycles_key() {
        let out = process_xor_many(&[0x10, 0x20, 0x30, 0x40], &[0x01, 0x02]).unwrap();
        assert_eq!(out, [0x11, 0x22, 0x31, 0x42]);
    }

    #[test]
    fn xor_many_is_involution() {
        let data = b"binary stream contents";
        let key = [0xde, 0xad, 0xbe];
        let once = process_xor_many(data, &key).unwrap();
        assert_eq!(process_xor_many(&once, &key).unwrap(), data);
    }

    #[test]
    fn xor_many_empty_key_fails() {
        assert!(matches!(
            process_xor_many(b"abc", &[]),
            Err(Error::EmptyXorKey)
        ));
    }

    #[test]
    fn rotate_zero_and_eight_are_identity() {
        let data = [0x00, 0x01, 0x80, 0xff, 0x5a];
        assert_eq!(process_rotate_left(&data, 0, 1).unwrap(), data);
        assert_eq!(process_rotate_left(&data, 8, 1).unwrap(), data);
    }

    #[test]
    fn rotate_left_by_one() {
        assert_eq!(
            process_rotate_left(&[0b1000_0001], 1, 1).unwrap(),
            [0b0000_0011]
        );
    }

    #[test]
    fn negative_amount_rotates_right() {
        assert_eq!(
            process_rotate_left(&[0b0000_0011], -1, 1).unwrap(),
            [0b1000_0001]
        );
    }

    #[test]
    fn rotate_wide_groups_unsupported() {
        assert!(matches!(
            process_rotate_left(&[0; 8], 3, 2),
            Err(Error::UnsupportedRotateGroup(2))
        ));
    }

    #[cfg(feature = "compression")]
    #[test]
    fn zlib_round_trip() {
        use flate2::Compression;
        use flate2::write::ZlibEncoder;
        use std::io::Write;

        let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
        enc.write_all(b"streams all the way down").unwrap();
        let packed = enc.finish().unwrap();

        assert_eq!(process_zlib(&packed).unwrap(), b"streams all the way down");
    }

    #[cfg(feature = "compression")]
    #[test]
    fn zlib_garbage_fails() {
        assert!(matches!(process_zlib(b"not zlib"), Err(Error::Zlib)));
    }
}
