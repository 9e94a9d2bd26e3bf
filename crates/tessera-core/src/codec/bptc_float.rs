// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! BPTC_FLOAT (BC6H) decoder, unsigned and signed. Output is half-float
//! RGB in 64-bit pixels with a zero fourth lane.
//!
//! Fourteen modes are distinguished by a 2-bit or 5-bit prefix. Each mode
//! fixes per-channel endpoint widths; delta endpoints are sign-extended and
//! added to the first endpoint modulo its width. Interpolation happens in
//! the unquantized 16/17-bit domain and the result is scaled by 31/32 into
//! a raw IEEE-754 half-precision bit pattern.

use super::bptc::{ANCHOR_SECOND_SUBSET, PARTITION_2, WEIGHTS_3, WEIGHTS_4};
use super::{block16, require_output};
use crate::bits::{BitReader, Block128};
use crate::error::DecodeError;
use crate::mode::{DecompressFlags, ModeMask};
use crate::pixel::{pack_rgb16, put_pixel64};

/// Per-mode endpoint precision: the width of the first endpoint and the
/// widths of the delta fields (none for the direct modes).
struct ModeInfo {
    endpoint_bits: u32,
    delta_bits: Option<(u32, u32, u32)>,
    two_regions: bool,
}

/// Mode properties indexed by the mode-mask bit number (mode `n` of the
/// format is bit `n - 1`).
const MODES: [ModeInfo; 14] = [
    ModeInfo { endpoint_bits: 10, delta_bits: Some((5, 5, 5)), two_regions: true },
    ModeInfo { endpoint_bits: 7, delta_bits: Some((6, 6, 6)), two_regions: true },
    ModeInfo { endpoint_bits: 11, delta_bits: Some((5, 4, 4)), two_regions: true },
    ModeInfo { endpoint_bits: 11, delta_bits: Some((4, 5, 4)), two_regions: true },
    ModeInfo { endpoint_bits: 11, delta_bits: Some((4, 4, 5)), two_regions: true },
    ModeInfo { endpoint_bits: 9, delta_bits: Some((5, 5, 5)), two_regions: true },
    ModeInfo { endpoint_bits: 8, delta_bits: Some((6, 5, 5)), two_regions: true },
    ModeInfo { endpoint_bits: 8, delta_bits: Some((5, 6, 5)), two_regions: true },
    ModeInfo { endpoint_bits: 8, delta_bits: Some((5, 5, 6)), two_regions: true },
    ModeInfo { endpoint_bits: 6, delta_bits: None, two_regions: true },
    ModeInfo { endpoint_bits: 10, delta_bits: None, two_regions: false },
    ModeInfo { endpoint_bits: 11, delta_bits: Some((9, 9, 9)), two_regions: false },
    ModeInfo { endpoint_bits: 12, delta_bits: Some((8, 8, 8)), two_regions: false },
    ModeInfo { endpoint_bits: 16, delta_bits: Some((4, 4, 4)), two_regions: false },
];

/// Maps a 5-bit mode prefix to its mode-mask bit number.
fn mode_index(prefix: u32) -> Option<usize> {
    match prefix {
        0b00000 => Some(0),
        0b00001 => Some(1),
        0b00010 => Some(2),
        0b00110 => Some(3),
        0b01010 => Some(4),
        0b01110 => Some(5),
        0b10010 => Some(6),
        0b10110 => Some(7),
        0b11010 => Some(8),
        0b11110 => Some(9),
        0b00011 => Some(10),
        0b00111 => Some(11),
        0b01011 => Some(12),
        0b01111 => Some(13),
        _ => None,
    }
}

#[inline]
fn sign_extend(value: i32, bits: u32) -> i32 {
    let shift = 32 - bits;
    (value << shift) >> shift
}

/// Unquantizes an endpoint channel to the 16-bit (unsigned) or signed
/// 15-bit-magnitude interpolation domain.
fn unquantize(value: i32, bits: u32, signed: bool) -> i32 {
    if !signed {
        if bits >= 15 {
            value
        } else if value == 0 {
            0
        } else if value == (1 << bits) - 1 {
            0xFFFF
        } else {
            ((value << 15) + 0x4000) >> (bits - 1)
        }
    } else if bits >= 16 {
        value
    } else {
        let (negative, magnitude) = if value < 0 { (true, -value) } else { (false, value) };
        let unquantized = if magnitude == 0 {
            0
        } else if magnitude >= (1 << (bits - 1)) - 1 {
            0x7FFF
        } else {
            ((magnitude << 15) + 0x4000) >> (bits - 1)
        };
        if negative {
            -unquantized
        } else {
            unquantized
        }
    }
}

/// Scales an interpolated value by 31/32 and reinterprets it as a raw
/// half-float bit pattern.
fn finish_unquantize(value: i32, signed: bool) -> u16 {
    if !signed {
        ((value * 31) >> 6) as u16
    } else {
        let scaled = if value < 0 {
            -((-value * 31) >> 5)
        } else {
            (value * 31) >> 5
        };
        if scaled < 0 {
            (-scaled as u16) | 0x8000
        } else {
            scaled as u16
        }
    }
}

#[inline]
fn interpolate(e0: i32, e1: i32, weight: u32) -> i32 {
    (e0 * (64 - weight as i32) + e1 * weight as i32 + 32) >> 6
}

/// Reads the mode-specific endpoint fields into four (r, g, b) endpoints.
///
/// The field order interleaves the high bits of the delta endpoints with
/// the base endpoint fields; each arm transcribes one row of the format's
/// layout table.
fn read_endpoints(reader: &mut BitReader, index: usize) -> ([u32; 4], [u32; 4], [u32; 4]) {
    let mut r = [0u32; 4];
    let mut g = [0u32; 4];
    let mut b = [0u32; 4];
    match index {
        0 => {
            g[2] |= reader.read_bit() << 4;
            b[2] |= reader.read_bit() << 4;
            b[3] |= reader.read_bit() << 4;
            r[0] |= reader.read(10);
            g[0] |= reader.read(10);
            b[0] |= reader.read(10);
            r[1] |= reader.read(5);
            g[3] |= reader.read_bit() << 4;
            g[2] |= reader.read(4);
            g[1] |= reader.read(5);
            b[3] |= reader.read_bit();
            g[3] |= reader.read(4);
            b[1] |= reader.read(5);
            b[3] |= reader.read_bit() << 1;
            b[2] |= reader.read(4);
            r[2] |= reader.read(5);
            b[3] |= reader.read_bit() << 2;
            r[3] |= reader.read(5);
            b[3] |= reader.read_bit() << 3;
        }
        1 => {
            g[2] |= reader.read_bit() << 5;
            g[3] |= reader.read_bit() << 4;
            g[3] |= reader.read_bit() << 5;
            r[0] |= reader.read(7);
            b[3] |= reader.read_bit();
            b[3] |= reader.read_bit() << 1;
            b[2] |= reader.read_bit() << 4;
            g[0] |= reader.read(7);
            b[2] |= reader.read_bit() << 5;
            b[3] |= reader.read_bit() << 2;
            g[2] |= reader.read_bit() << 4;
            b[0] |= reader.read(7);
            b[3] |= reader.read_bit() << 3;
            b[3] |= reader.read_bit() << 5;
            b[3] |= reader.read_bit() << 4;
            r[1] |= reader.read(6);
            g[2] |= reader.read(4);
            g[1] |= reader.read(6);
            g[3] |= reader.read(4);
            b[1] |= reader.read(6);
            b[2] |= reader.read(4);
            r[2] |= reader.read(6);
            r[3] |= reader.read(6);
        }
        2 => {
            r[0] |= reader.read(10);
            g[0] |= reader.read(10);
            b[0] |= reader.read(10);
            r[1] |= reader.read(5);
            r[0] |= reader.read_bit() << 10;
            g[2] |= reader.read(4);
            g[1] |= reader.read(4);
            g[0] |= reader.read_bit() << 10;
            b[3] |= reader.read_bit();
            g[3] |= reader.read(4);
            b[1] |= reader.read(4);
            b[0] |= reader.read_bit() << 10;
            b[3] |= reader.read_bit() << 1;
            b[2] |= reader.read(4);
            r[2] |= reader.read(5);
            b[3] |= reader.read_bit() << 2;
            r[3] |= reader.read(5);
            b[3] |= reader.read_bit() << 3;
        }
        3 => {
            r[0] |= reader.read(10);
            g[0] |= reader.read(10);
            b[0] |= reader.read(10);
            r[1] |= reader.read(4);
            r[0] |= reader.read_bit() << 10;
            g[3] |= reader.read_bit() << 4;
            g[2] |= reader.read(4);
            g[1] |= reader.read(5);
            g[0] |= reader.read_bit() << 10;
            g[3] |= reader.read(4);
            b[1] |= reader.read(4);
            b[0] |= reader.read_bit() << 10;
            b[3] |= reader.read_bit() << 1;
            b[2] |= reader.read(4);
            r[2] |= reader.read(4);
            b[3] |= reader.read_bit();
            b[3] |= reader.read_bit() << 2;
            r[3] |= reader.read(4);
            g[2] |= reader.read_bit() << 4;
            b[3] |= reader.read_bit() << 3;
        }
        4 => {
            r[0] |= reader.read(10);
            g[0] |= reader.read(10);
            b[0] |= reader.read(10);
            r[1] |= reader.read(4);
            r[0] |= reader.read_bit() << 10;
            b[2] |= reader.read_bit() << 4;
            g[2] |= reader.read(4);
            g[1] |= reader.read(4);
            g[0] |= reader.read_bit() << 10;
            b[3] |= reader.read_bit();
            g[3] |= reader.read(4);
            b[1] |= reader.read(5);
            b[0] |= reader.read_bit() << 10;
            b[2] |= reader.read(4);
            r[2] |= reader.read(4);
            b[3] |= reader.read_bit() << 1;
            b[3] |= reader.read_bit() << 2;
            r[3] |= reader.read(4);
            b[3] |= reader.read_bit() << 4;
            b[3] |= reader.read_bit() << 3;
        }
        5 => {
            r[0] |= reader.read(9);
            b[2] |= reader.read_bit() << 4;
            g[0] |= reader.read(9);
            g[2] |= reader.read_bit() << 4;
            b[0] |= reader.read(9);
            b[3] |= reader.read_bit() << 4;
            r[1] |= reader.read(5);
            g[3] |= reader.read_bit() << 4;
            g[2] |= reader.read(4);
            g[1] |= reader.read(5);
            b[3] |= reader.read_bit();
            g[3] |= reader.read(4);
            b[1] |= reader.read(5);
            b[3] |= reader.read_bit() << 1;
            b[2] |= reader.read(4);
            r[2] |= reader.read(5);
            b[3] |= reader.read_bit() << 2;
            r[3] |= reader.read(5);
            b[3] |= reader.read_bit() << 3;
        }
        6 => {
            r[0] |= reader.read(8);
            g[3] |= reader.read_bit() << 4;
            b[2] |= reader.read_bit() << 4;
            g[0] |= reader.read(8);
            b[3] |= reader.read_bit() << 2;
            g[2] |= reader.read_bit() << 4;
            b[0] |= reader.read(8);
            b[3] |= reader.read_bit() << 3;
            b[3] |= reader.read_bit() << 4;
            r[1] |= reader.read(6);
            g[2] |= reader.read(4);
            g[1] |= reader.read(5);
            b[3] |= reader.read_bit();
            g[3] |= reader.read(4);
            b[1] |= reader.read(5);
            b[3] |= reader.read_bit() << 1;
            b[2] |= reader.read(4);
            r[2] |= reader.read(6);
            r[3] |= reader.read(6);
        }
        7 => {
            r[0] |= reader.read(8);
            b[3] |= reader.read_bit();
            b[2] |= reader.read_bit() << 4;
            g[0] |= reader.read(8);
            g[2] |= reader.read_bit() << 5;
            g[2] |= reader.read_bit() << 4;
            b[0] |= reader.read(8);
            g[3] |= reader.read_bit() << 5;
            b[3] |= reader.read_bit() << 4;
            r[1] |= reader.read(5);
            g[3] |= reader.read_bit() << 4;
            g[2] |= reader.read(4);
            g[1] |= reader.read(6);
            g[3] |= reader.read(4);
            b[1] |= reader.read(5);
            b[3] |= reader.read_bit() << 1;
            b[2] |= reader.read(4);
            r[2] |= reader.read(5);
            b[3] |= reader.read_bit() << 2;
            r[3] |= reader.read(5);
            b[3] |= reader.read_bit() << 3;
        }
        8 => {
            r[0] |= reader.read(8);
            b[3] |= reader.read_bit() << 1;
            b[2] |= reader.read_bit() << 4;
            g[0] |= reader.read(8);
            b[2] |= reader.read_bit() << 5;
            g[2] |= reader.read_bit() << 4;
            b[0] |= reader.read(8);
            b[3] |= reader.read_bit() << 5;
            b[3] |= reader.read_bit() << 4;
            r[1] |= reader.read(5);
            g[3] |= reader.read_bit() << 4;
            g[2] |= reader.read(4);
            g[1] |= reader.read(5);
            b[3] |= reader.read_bit();
            g[3] |= reader.read(4);
            b[1] |= reader.read(6);
            b[2] |= reader.read(4);
            r[2] |= reader.read(5);
            b[3] |= reader.read_bit() << 2;
            r[3] |= reader.read(5);
            b[3] |= reader.read_bit() << 3;
        }
        9 => {
            r[0] |= reader.read(6);
            g[3] |= reader.read_bit() << 4;
            b[3] |= reader.read_bit();
            b[3] |= reader.read_bit() << 1;
            b[2] |= reader.read_bit() << 4;
            g[0] |= reader.read(6);
            g[2] |= reader.read_bit() << 5;
            b[2] |= reader.read_bit() << 5;
            b[3] |= reader.read_bit() << 2;
            g[2] |= reader.read_bit() << 4;
            b[0] |= reader.read(6);
            g[3] |= reader.read_bit() << 5;
            b[3] |= reader.read_bit() << 3;
            b[3] |= reader.read_bit() << 5;
            b[3] |= reader.read_bit() << 4;
            r[1] |= reader.read(6);
            g[2] |= reader.read(4);
            g[1] |= reader.read(6);
            g[3] |= reader.read(4);
            b[1] |= reader.read(6);
            b[2] |= reader.read(4);
            r[2] |= reader.read(6);
            r[3] |= reader.read(6);
        }
        10 => {
            r[0] |= reader.read(10);
            g[0] |= reader.read(10);
            b[0] |= reader.read(10);
            r[1] |= reader.read(10);
            g[1] |= reader.read(10);
            b[1] |= reader.read(10);
        }
        11 => {
            r[0] |= reader.read(10);
            g[0] |= reader.read(10);
            b[0] |= reader.read(10);
            r[1] |= reader.read(9);
            r[0] |= reader.read_bit() << 10;
            g[1] |= reader.read(9);
            g[0] |= reader.read_bit() << 10;
            b[1] |= reader.read(9);
            b[0] |= reader.read_bit() << 10;
        }
        12 => {
            r[0] |= reader.read(10);
            g[0] |= reader.read(10);
            b[0] |= reader.read(10);
            r[1] |= reader.read(8);
            r[0] |= reader.read_reversed(2) << 10;
            g[1] |= reader.read(8);
            g[0] |= reader.read_reversed(2) << 10;
            b[1] |= reader.read(8);
            b[0] |= reader.read_reversed(2) << 10;
        }
        _ => {
            r[0] |= reader.read(10);
            g[0] |= reader.read(10);
            b[0] |= reader.read(10);
            r[1] |= reader.read(4);
            r[0] |= reader.read_reversed(6) << 10;
            g[1] |= reader.read(4);
            g[0] |= reader.read_reversed(6) << 10;
            b[1] |= reader.read(4);
            b[0] |= reader.read_reversed(6) << 10;
        }
    }
    (r, g, b)
}

fn decompress_bptc_float(
    bitstring: &[u8],
    mode_mask: ModeMask,
    _flags: DecompressFlags,
    pixel_buffer: &mut [u8],
    signed: bool,
) -> Result<(), DecodeError> {
    let block = block16(bitstring)?;
    require_output(pixel_buffer, 128)?;
    let mut reader = BitReader::new(Block128::load(block));

    let prefix = reader.read(2);
    let prefix = if prefix < 2 {
        prefix
    } else {
        prefix | reader.read(3) << 2
    };
    let index = mode_index(prefix).ok_or(DecodeError::InvalidBlock)?;
    if !mode_mask.allows(index as u32) {
        return Err(DecodeError::ModeRejected);
    }
    let mode = &MODES[index];

    let (r_raw, g_raw, b_raw) = read_endpoints(&mut reader, index);
    let endpoint_count = if mode.two_regions { 4 } else { 2 };
    let bits = mode.endpoint_bits;
    let mask = if bits == 32 { u32::MAX } else { (1u32 << bits) - 1 };

    let mut r = r_raw.map(|value| value as i32);
    let mut g = g_raw.map(|value| value as i32);
    let mut b = b_raw.map(|value| value as i32);
    if signed {
        r[0] = sign_extend(r[0], bits);
        g[0] = sign_extend(g[0], bits);
        b[0] = sign_extend(b[0], bits);
    }
    if let Some((delta_r, delta_g, delta_b)) = mode.delta_bits {
        for e in 1..endpoint_count {
            r[e] = sign_extend(r[e], delta_r);
            g[e] = sign_extend(g[e], delta_g);
            b[e] = sign_extend(b[e], delta_b);
            // Deltas add to the first endpoint modulo its width.
            r[e] = (r[e] + r[0]) & mask as i32;
            g[e] = (g[e] + g[0]) & mask as i32;
            b[e] = (b[e] + b[0]) & mask as i32;
            if signed {
                r[e] = sign_extend(r[e], bits);
                g[e] = sign_extend(g[e], bits);
                b[e] = sign_extend(b[e], bits);
            }
        }
    } else if signed {
        for e in 1..endpoint_count {
            r[e] = sign_extend(r[e], bits);
            g[e] = sign_extend(g[e], bits);
            b[e] = sign_extend(b[e], bits);
        }
    }
    for e in 0..endpoint_count {
        r[e] = unquantize(r[e], bits, signed);
        g[e] = unquantize(g[e], bits, signed);
        b[e] = unquantize(b[e], bits, signed);
    }

    let partition = if mode.two_regions {
        reader.read(5) as usize
    } else {
        0
    };
    let index_bits = if mode.two_regions { 3u32 } else { 4u32 };
    let anchor = if mode.two_regions {
        ANCHOR_SECOND_SUBSET[partition] as usize
    } else {
        0
    };
    for i in 0..16 {
        let is_anchor = i == 0 || (mode.two_regions && i == anchor);
        let width = if is_anchor { index_bits - 1 } else { index_bits };
        let weight_index = reader.read(width);
        let subset = if mode.two_regions {
            PARTITION_2[partition][i] as usize
        } else {
            0
        };
        let weight = if mode.two_regions {
            WEIGHTS_3[weight_index as usize]
        } else {
            WEIGHTS_4[weight_index as usize]
        };
        let red = finish_unquantize(interpolate(r[2 * subset], r[2 * subset + 1], weight), signed);
        let green =
            finish_unquantize(interpolate(g[2 * subset], g[2 * subset + 1], weight), signed);
        let blue = finish_unquantize(interpolate(b[2 * subset], b[2 * subset + 1], weight), signed);
        put_pixel64(pixel_buffer, i, pack_rgb16(red, green, blue));
    }
    Ok(())
}

/// Decompresses a 128-bit unsigned BPTC_FLOAT (BC6H) block. Output is
/// FLOAT_RGBX16.
pub fn decompress_block_bptc_float(
    bitstring: &[u8],
    mode_mask: ModeMask,
    flags: DecompressFlags,
    pixel_buffer: &mut [u8],
) -> Result<(), DecodeError> {
    decompress_bptc_float(bitstring, mode_mask, flags, pixel_buffer, false)
}

/// Decompresses a 128-bit signed BPTC_FLOAT (BC6H) block. Output is
/// SIGNED_FLOAT_RGBX16.
pub fn decompress_block_bptc_signed_float(
    bitstring: &[u8],
    mode_mask: ModeMask,
    flags: DecompressFlags,
    pixel_buffer: &mut [u8],
) -> Result<(), DecodeError> {
    decompress_bptc_float(bitstring, mode_mask, flags, pixel_buffer, true)
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use half::f16;

    fn lane(buffer: &[u8], pixel: usize, channel: usize) -> u16 {
        let offset = pixel * 8 + channel * 2;
        u16::from_le_bytes([buffer[offset], buffer[offset + 1]])
    }

    #[test]
    fn test_all_zero_block_decodes_to_zero() {
        let block = [0u8; 16];
        let mut out = [0u8; 128];
        decompress_block_bptc_float(&block, ModeMask::ALL, DecompressFlags::EMPTY, &mut out)
            .unwrap();
        for i in 0..16 {
            for channel in 0..3 {
                let bits = lane(&out, i, channel);
                assert_eq!(bits, 0);
                assert_eq!(f16::from_bits(bits).to_f32(), 0.0);
            }
            assert_eq!(lane(&out, i, 3), 0, "fourth lane must stay zero");
        }
    }

    #[test]
    fn test_reserved_mode_is_invalid() {
        let mut block = [0u8; 16];
        block[0] = 0b10011;
        let mut out = [0u8; 128];
        assert_eq!(
            decompress_block_bptc_float(&block, ModeMask::ALL, DecompressFlags::EMPTY, &mut out),
            Err(DecodeError::InvalidBlock)
        );
    }

    #[test]
    fn test_mode_mask_rejection() {
        let block = [0u8; 16]; // mode prefix 0b00 -> mask bit 0
        let mut out = [0u8; 128];
        assert_eq!(
            decompress_block_bptc_float(
                &block,
                ModeMask::ALL_MODES_BPTC_FLOAT.without(ModeMask::from_bits(1)),
                DecompressFlags::EMPTY,
                &mut out
            ),
            Err(DecodeError::ModeRejected)
        );
    }

    #[test]
    fn test_unsigned_max_endpoint_is_half_max() {
        // Mode prefix 0b00011 (one region, direct 10-bit endpoints) with the
        // red first endpoint saturated and all indices zero: every pixel is
        // the unquantized-then-finished maximum, the largest half float.
        let mut block = [0u8; 16];
        block[0] = 0x03 | 0xE0;
        block[1] = 0x7F;
        let mut out = [0u8; 128];
        decompress_block_bptc_float(&block, ModeMask::ALL, DecompressFlags::EMPTY, &mut out)
            .unwrap();
        for i in 0..16 {
            let red = lane(&out, i, 0);
            assert_eq!(red, 0x7BFF);
            assert_eq!(f16::from_bits(red).to_f32(), 65504.0);
            assert_eq!(lane(&out, i, 1), 0);
            assert_eq!(lane(&out, i, 2), 0);
        }
    }

    #[test]
    fn test_signed_endpoint_produces_negative_half() {
        // Same block under the signed decoder: the all-ones 10-bit field is
        // -1, which unquantizes to -96 and finishes to a negative half.
        let mut block = [0u8; 16];
        block[0] = 0x03 | 0xE0;
        block[1] = 0x7F;
        let mut out = [0u8; 128];
        decompress_block_bptc_signed_float(&block, ModeMask::ALL, DecompressFlags::EMPTY, &mut out)
            .unwrap();
        for i in 0..16 {
            let red = lane(&out, i, 0);
            assert_eq!(red, 0x805D);
            assert!(f16::from_bits(red).to_f32() < 0.0);
        }
    }

    #[test]
    fn test_unquantize_unsigned_boundaries() {
        assert_eq!(unquantize(0, 10, false), 0);
        assert_eq!(unquantize((1 << 10) - 1, 10, false), 0xFFFF);
        assert_eq!(unquantize(0x1234, 16, false), 0x1234);
        let middle = unquantize(512, 10, false);
        assert!(middle > 0x7000 && middle < 0x9000);
    }

    #[test]
    fn test_unquantize_signed_symmetry() {
        for value in [-200, -5, 0, 5, 200] {
            assert_eq!(unquantize(value, 10, true), -unquantize(-value, 10, true));
        }
        assert_eq!(unquantize((1 << 9) - 1, 10, true), 0x7FFF);
        assert_eq!(unquantize(-((1 << 9) - 1), 10, true), -0x7FFF);
    }

    #[test]
    fn test_finish_unquantize() {
        assert_eq!(finish_unquantize(0, false), 0);
        assert_eq!(finish_unquantize(0xFFFF, false), 0x7BFF);
        assert_eq!(finish_unquantize(0x7FFF, true), 0x7BFF);
        assert_eq!(finish_unquantize(-0x7FFF, true), 0xFBFF);
        assert_eq!(f16::from_bits(0x7BFF).to_f32(), 65504.0);
        assert_eq!(f16::from_bits(0xFBFF).to_f32(), -65504.0);
    }
}
