//! The 4-byte size fields used throughout a tag.
//!
//! Tag and frame sizes come in two shapes. Synch-safe fields carry 7 bits
//! per byte so that no encoded byte ever has its top bit set, keeping naive
//! MPEG sync scanners from tripping over them. Raw fields are plain 32-bit
//! big-endian integers, used for frame sizes in ID3v2.3.

use crate::id3v2::{Error, Result};

/// The largest size a synch-safe field can carry.
const SYNCH_SAFE_MAX: u64 = 0x0FFF_FFFF;

/// The largest size a raw field can carry.
const SYNCH_UNSAFE_MAX: u64 = 0xFFFF_FFFF;

/// Decodes a 4-byte size field. Synch-safe decoding fails with
/// [`Error::InvalidSizeFormat`] if any byte has its top bit set; raw
/// decoding accepts anything.
pub(crate) fn to_size(raw: [u8; 4], synch_safe: bool) -> Result<u32> {
    let mut size: u32 = 0;

    for &byte in raw.iter() {
        if synch_safe {
            if byte & 0x80 != 0 {
                return Err(Error::InvalidSizeFormat);
            }

            size = (size << 7) | u32::from(byte);
        } else {
            size = (size << 8) | u32::from(byte);
        }
    }

    Ok(size)
}

/// Encodes a size into a 4-byte field, failing with [`Error::SizeOverflow`]
/// when the size does not fit the requested mode.
pub(crate) fn from_size(size: u64, synch_safe: bool) -> Result<[u8; 4]> {
    let (max, bits, mask) = if synch_safe {
        (SYNCH_SAFE_MAX, 7, 0x7F)
    } else {
        (SYNCH_UNSAFE_MAX, 8, 0xFF)
    };

    if size > max {
        return Err(Error::SizeOverflow);
    }

    let mut raw = [0; 4];

    for (i, byte) in raw.iter_mut().enumerate() {
        *byte = ((size >> (bits * (3 - i))) as u8) & mask;
    }

    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_synch_safe() {
        for &size in &[0u32, 1, 127, 128, 0x7F7F, 15351, SYNCH_SAFE_MAX as u32] {
            let raw = from_size(u64::from(size), true).unwrap();
            assert_eq!(to_size(raw, true).unwrap(), size);
        }
    }

    #[test]
    fn round_trip_raw() {
        for &size in &[0u32, 255, 65535, 0xABCDEF, u32::MAX] {
            let raw = from_size(u64::from(size), false).unwrap();
            assert_eq!(to_size(raw, false).unwrap(), size);
        }
    }

    #[test]
    fn encode_synch_safe_size() {
        assert_eq!(from_size(15351, true).unwrap(), [0, 0, 0x77, 0x77]);
        assert_eq!(to_size([0, 0, 0x77, 0x77], true).unwrap(), 15351);
    }

    #[test]
    fn encode_raw_size() {
        assert_eq!(from_size(65535, false).unwrap(), [0, 0, 0xFF, 0xFF]);
        assert_eq!(to_size([0, 0, 0xFF, 0xFF], false).unwrap(), 65535);
    }

    #[test]
    fn reject_unsafe_bytes_in_synch_safe_mode() {
        // Raw-encoded 65535 is not valid synch-safe data.
        assert!(matches!(
            to_size([0, 0, 0xFF, 0xFF], true),
            Err(Error::InvalidSizeFormat)
        ));

        // Any byte with the top bit set must be rejected, whichever it is.
        for i in 0..4 {
            let mut raw = [0; 4];
            raw[i] = 0x80;

            assert!(matches!(to_size(raw, true), Err(Error::InvalidSizeFormat)));
            assert!(matches!(to_size(raw, false), Ok(_)));
        }
    }

    #[test]
    fn reject_oversized_values() {
        assert!(matches!(
            from_size(SYNCH_SAFE_MAX + 1, true),
            Err(Error::SizeOverflow)
        ));
        assert!(matches!(
            from_size(SYNCH_UNSAFE_MAX + 1, false),
            Err(Error::SizeOverflow)
        ));
        assert!(from_size(SYNCH_UNSAFE_MAX, false).is_ok());
    }
}
