//! Wire pixel formats and the pack/unpack codec
//!
//! The logical frame is always 8 bits per pixel; transfers to the controller
//! may use a denser wire encoding. Pure logic, no I/O.

extern crate alloc;

use alloc::vec::Vec;

use crate::error::PixelError;

/// Wire-level pixel bit depth for a single transfer.
///
/// The discriminants are the pixel-format field values of the image-load
/// argument word. `Bpp3` exists on the wire but packs three pixels into
/// bit groups that never align to a byte, so the codec rejects it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u16)]
pub enum PixelFormat {
    /// 2 bits per pixel, four pixels per byte.
    Bpp2 = 0,
    /// 3 bits per pixel. Accepted by the controller, unsupported here.
    Bpp3 = 1,
    /// 4 bits per pixel, two pixels per byte.
    Bpp4 = 2,
    /// 8 bits per pixel, sent unchanged.
    Bpp8 = 3,
}

impl PixelFormat {
    /// Pixel-format field of the image-load argument word.
    pub const fn wire_value(self) -> u16 {
        self as u16
    }

    /// Number of pixels packed into each output byte, if byte-aligned.
    pub const fn pixels_per_byte(self) -> Option<usize> {
        match self {
            PixelFormat::Bpp2 => Some(4),
            PixelFormat::Bpp3 => None,
            PixelFormat::Bpp4 => Some(2),
            PixelFormat::Bpp8 => Some(1),
        }
    }
}

/// Pack an 8-bpp pixel buffer into the wire representation.
///
/// Packing keeps each pixel's most significant bits and discards the rest
/// (truncation, not rounding). Pixels fill each output byte most significant
/// group first, in scan order.
///
/// # Errors
///
/// Returns [`PixelError::UnsupportedFormat`] for [`PixelFormat::Bpp3`], and
/// [`PixelError::InvalidBufferLength`] if the input length is not a multiple
/// of the pack factor.
pub fn pack(pixels: &[u8], format: PixelFormat) -> Result<Vec<u8>, PixelError> {
    check_length(pixels.len(), format)?;

    match format {
        PixelFormat::Bpp8 => Ok(pixels.to_vec()),
        PixelFormat::Bpp4 => Ok(pixels
            .chunks_exact(2)
            .map(|pair| (pair[0] & 0xF0) | (pair[1] >> 4))
            .collect()),
        PixelFormat::Bpp2 => Ok(pixels
            .chunks_exact(4)
            .map(|quad| {
                (quad[0] & 0xC0) | ((quad[1] >> 2) & 0x30) | ((quad[2] >> 4) & 0x0C) | (quad[3] >> 6)
            })
            .collect()),
        PixelFormat::Bpp3 => Err(PixelError::UnsupportedFormat(format)),
    }
}

/// Reject lengths that do not fill a whole number of packed bytes.
fn check_length(len: usize, format: PixelFormat) -> Result<(), PixelError> {
    let group = format
        .pixels_per_byte()
        .ok_or(PixelError::UnsupportedFormat(format))?;
    if len % group == 0 {
        Ok(())
    } else {
        Err(PixelError::InvalidBufferLength { len, group })
    }
}

/// Expand a packed buffer back to 8 bpp.
///
/// Only 8 bpp round-trips losslessly; at 4 and 2 bpp the result holds the
/// truncated values the pack step kept, with the discarded low bits zero.
///
/// # Errors
///
/// Returns [`PixelError::UnsupportedFormat`] for [`PixelFormat::Bpp3`].
pub fn unpack(packed: &[u8], format: PixelFormat) -> Result<Vec<u8>, PixelError> {
    let group = format
        .pixels_per_byte()
        .ok_or(PixelError::UnsupportedFormat(format))?;

    let mut pixels = Vec::with_capacity(packed.len() * group);
    for &byte in packed {
        match format {
            PixelFormat::Bpp8 => pixels.push(byte),
            PixelFormat::Bpp4 => {
                pixels.push(byte & 0xF0);
                pixels.push(byte << 4);
            }
            PixelFormat::Bpp2 => {
                pixels.push(byte & 0xC0);
                pixels.push((byte << 2) & 0xC0);
                pixels.push((byte << 4) & 0xC0);
                pixels.push(byte << 6);
            }
            // pixels_per_byte returned None above
            PixelFormat::Bpp3 => {}
        }
    }

    Ok(pixels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn pack_8bpp_is_identity() {
        let pixels = vec![0x00, 0x7F, 0x80, 0xFF];
        assert_eq!(pack(&pixels, PixelFormat::Bpp8).unwrap(), pixels);
    }

    #[test]
    fn pack_4bpp_truncates_low_nibble() {
        // 0xAB keeps 0xA, 0xCD keeps 0xC; first pixel lands in the high nibble.
        let packed = pack(&[0xAB, 0xCD, 0x0F, 0xF0], PixelFormat::Bpp4).unwrap();
        assert_eq!(packed, vec![0xAC, 0x0F]);
    }

    #[test]
    fn pack_2bpp_keeps_top_two_bits() {
        // 0b11.., 0b10.., 0b01.., 0b00.. -> 0b11_10_01_00
        let packed = pack(&[0xFF, 0xBF, 0x7F, 0x3F], PixelFormat::Bpp2).unwrap();
        assert_eq!(packed, vec![0b1110_0100]);
    }

    #[test]
    fn pack_rejects_unaligned_length() {
        let err = pack(&[0x00, 0x01, 0x02], PixelFormat::Bpp4).unwrap_err();
        assert_eq!(err, PixelError::InvalidBufferLength { len: 3, group: 2 });

        let err = pack(&[0x00; 6], PixelFormat::Bpp2).unwrap_err();
        assert_eq!(err, PixelError::InvalidBufferLength { len: 6, group: 4 });
    }

    #[test]
    fn pack_rejects_3bpp() {
        let err = pack(&[0x00; 8], PixelFormat::Bpp3).unwrap_err();
        assert_eq!(err, PixelError::UnsupportedFormat(PixelFormat::Bpp3));
        let err = unpack(&[0x00; 3], PixelFormat::Bpp3).unwrap_err();
        assert_eq!(err, PixelError::UnsupportedFormat(PixelFormat::Bpp3));
    }

    #[test]
    fn round_trip_lossless_only_at_8bpp() {
        let pixels = vec![0xAB, 0xCD, 0x12, 0x34];

        let full = unpack(&pack(&pixels, PixelFormat::Bpp8).unwrap(), PixelFormat::Bpp8).unwrap();
        assert_eq!(full, pixels);

        let nibbles =
            unpack(&pack(&pixels, PixelFormat::Bpp4).unwrap(), PixelFormat::Bpp4).unwrap();
        assert_eq!(nibbles, vec![0xA0, 0xC0, 0x10, 0x30]);

        let pairs = unpack(&pack(&pixels, PixelFormat::Bpp2).unwrap(), PixelFormat::Bpp2).unwrap();
        assert_eq!(pairs, vec![0x80, 0xC0, 0x00, 0x00]);
    }
}
