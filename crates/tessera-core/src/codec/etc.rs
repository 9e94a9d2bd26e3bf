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

//! ETC family decoders: ETC1, ETC2, ETC2 punchthrough and ETC2+EAC alpha.
//!
//! The 64-bit color bitstream is shared by the whole family. Pixels are
//! numbered column-major inside the block (pixel `i` sits at x = i / 4,
//! y = i % 4) and remapped to the row-major output buffer on emit.

use super::eac::{eac_index_bits, eac_pixel_index, scanline_index, EAC_MODIFIER_TABLE};
use super::{block16, block8, require_output};
use crate::error::DecodeError;
use crate::mode::{DecompressFlags, EtcMode, ModeMask, SetModeFlags};
use crate::pixel::{pack_rgb8, pixel32_b8, pixel32_g8, pixel32_r8, put_pixel32};
use crate::util::clamp::clamp0_255;

/// Intensity modifiers, indexed by table codeword then 2-bit pixel index.
const MODIFIER_TABLE: [[i32; 4]; 8] = [
    [2, 8, -2, -8],
    [5, 17, -5, -17],
    [9, 29, -9, -29],
    [13, 42, -13, -42],
    [18, 60, -18, -60],
    [24, 80, -24, -80],
    [33, 106, -33, -106],
    [47, 183, -47, -183],
];

/// Intensity modifiers of a non-opaque punchthrough block: the small
/// magnitudes are forced to zero and index 2 marks a transparent pixel.
const PUNCHTHROUGH_MODIFIER_TABLE: [[i32; 4]; 8] = [
    [0, 8, 0, -8],
    [0, 17, 0, -17],
    [0, 29, 0, -29],
    [0, 42, 0, -42],
    [0, 60, 0, -60],
    [0, 80, 0, -80],
    [0, 106, 0, -106],
    [0, 183, 0, -183],
];

/// Paint distances of the T and H modes.
const DISTANCE_TABLE: [i32; 8] = [3, 6, 11, 16, 23, 32, 41, 64];

/// Sign-extends a 3-bit differential field.
#[inline]
fn sign_extend_3(value: u8) -> i32 {
    ((value as i32) << 29) >> 29
}

/// Expands a 4-bit channel to 8 bits.
#[inline]
fn expand_4(value: u8) -> i32 {
    value as i32 * 0x11
}

/// Expands a 5-bit channel to 8 bits.
#[inline]
fn expand_5(value: i32) -> i32 {
    (value << 3) | (value >> 2)
}

/// Expands a 6-bit channel to 8 bits.
#[inline]
fn expand_6(value: i32) -> i32 {
    (value << 2) | (value >> 4)
}

/// Expands a 7-bit channel to 8 bits.
#[inline]
fn expand_7(value: i32) -> i32 {
    (value << 1) | (value >> 6)
}

/// Returns the 32 bits of per-pixel index data (bytes 4..8, big-endian).
#[inline]
fn pixel_index_bits(block: &[u8; 8]) -> u32 {
    u32::from_be_bytes([block[4], block[5], block[6], block[7]])
}

/// Returns the 2-bit index of column-major pixel `i`: the low bit plane
/// occupies bits 0..16, the high bit plane bits 16..32.
#[inline]
fn pixel_index_2(bits: u32, i: usize) -> usize {
    ((bits >> i & 1) | (bits >> (15 + i) & 2)) as usize
}

/// The two 8-bit base colors of an individual-mode block.
fn individual_base_colors(block: &[u8; 8]) -> ([i32; 3], [i32; 3]) {
    let first = [
        expand_4(block[0] >> 4),
        expand_4(block[1] >> 4),
        expand_4(block[2] >> 4),
    ];
    let second = [
        expand_4(block[0] & 0xF),
        expand_4(block[1] & 0xF),
        expand_4(block[2] & 0xF),
    ];
    (first, second)
}

/// The 5-bit base color and per-channel deltas of a differential-mode block.
#[inline]
fn differential_channels(block: &[u8; 8]) -> [(i32, i32); 3] {
    [
        ((block[0] >> 3) as i32, sign_extend_3(block[0] & 0x7)),
        ((block[1] >> 3) as i32, sign_extend_3(block[1] & 0x7)),
        ((block[2] >> 3) as i32, sign_extend_3(block[2] & 0x7)),
    ]
}

/// Resolves the mode of a block whose differential bit is set.
///
/// A channel sum outside the 5-bit range selects the ETC2 reinterpretation
/// for that channel; the channels are checked in red, green, blue order.
fn differential_mode(block: &[u8; 8]) -> EtcMode {
    let channels = differential_channels(block);
    let overflows = |&(base, delta): &(i32, i32)| !(0..=31).contains(&(base + delta));
    if overflows(&channels[0]) {
        EtcMode::T
    } else if overflows(&channels[1]) {
        EtcMode::H
    } else if overflows(&channels[2]) {
        EtcMode::Planar
    } else {
        EtcMode::Differential
    }
}

/// The two 8-bit base colors of a differential-mode block.
fn differential_base_colors(block: &[u8; 8]) -> ([i32; 3], [i32; 3]) {
    let channels = differential_channels(block);
    let first = [
        expand_5(channels[0].0),
        expand_5(channels[1].0),
        expand_5(channels[2].0),
    ];
    let second = [
        expand_5(channels[0].0 + channels[0].1),
        expand_5(channels[1].0 + channels[1].1),
        expand_5(channels[2].0 + channels[2].1),
    ];
    (first, second)
}

/// Paints a block from two sub-block base colors and the modifier tables.
///
/// `non_opaque` selects punchthrough semantics: zeroed small modifiers and
/// transparent black for pixel index 2.
fn decompress_modifier_block(
    block: &[u8; 8],
    first: [i32; 3],
    second: [i32; 3],
    non_opaque: bool,
    pixel_buffer: &mut [u8],
) {
    let table_first = (block[3] >> 5) as usize;
    let table_second = (block[3] >> 2 & 0x7) as usize;
    let flip = block[3] & 0x1 != 0;
    let bits = pixel_index_bits(block);
    for i in 0..16 {
        let x = i >> 2;
        let y = i & 3;
        let index = pixel_index_2(bits, i);
        if non_opaque && index == 2 {
            put_pixel32(pixel_buffer, scanline_index(i), 0);
            continue;
        }
        let in_first = if flip { y < 2 } else { x < 2 };
        let (base, table) = if in_first {
            (first, table_first)
        } else {
            (second, table_second)
        };
        let modifier = if non_opaque {
            PUNCHTHROUGH_MODIFIER_TABLE[table][index]
        } else {
            MODIFIER_TABLE[table][index]
        };
        let pixel = pack_rgb8(
            clamp0_255(base[0] + modifier),
            clamp0_255(base[1] + modifier),
            clamp0_255(base[2] + modifier),
        );
        put_pixel32(pixel_buffer, scanline_index(i), pixel);
    }
}

/// Paints a block from a four-entry paint palette (T and H modes).
fn decompress_paint_block(
    block: &[u8; 8],
    paint: [u32; 4],
    non_opaque: bool,
    pixel_buffer: &mut [u8],
) {
    let bits = pixel_index_bits(block);
    for i in 0..16 {
        let index = pixel_index_2(bits, i);
        let pixel = if non_opaque && index == 2 {
            0
        } else {
            paint[index]
        };
        put_pixel32(pixel_buffer, scanline_index(i), pixel);
    }
}

/// Decodes a T-mode block: paint set {A, B+d, B, B-d}.
fn decompress_t_mode(block: &[u8; 8], non_opaque: bool, pixel_buffer: &mut [u8]) {
    let a_r = expand_4((block[0] & 0x18) >> 1 | (block[0] & 0x3));
    let a_g = expand_4(block[1] >> 4);
    let a_b = expand_4(block[1] & 0xF);
    let b_r = expand_4(block[2] >> 4);
    let b_g = expand_4(block[2] & 0xF);
    let b_b = expand_4(block[3] >> 4);
    let distance_index = (block[3] & 0x0C) >> 1 | (block[3] & 0x1);
    let distance = DISTANCE_TABLE[distance_index as usize];
    let paint = [
        pack_rgb8(a_r as u8, a_g as u8, a_b as u8),
        pack_rgb8(
            clamp0_255(b_r + distance),
            clamp0_255(b_g + distance),
            clamp0_255(b_b + distance),
        ),
        pack_rgb8(b_r as u8, b_g as u8, b_b as u8),
        pack_rgb8(
            clamp0_255(b_r - distance),
            clamp0_255(b_g - distance),
            clamp0_255(b_b - distance),
        ),
    ];
    decompress_paint_block(block, paint, non_opaque, pixel_buffer);
}

/// Decodes an H-mode block: paint set {A+d, A-d, B+d, B-d}.
fn decompress_h_mode(block: &[u8; 8], non_opaque: bool, pixel_buffer: &mut [u8]) {
    let a_r4 = ((block[0] & 0x78) >> 3) as i32;
    let a_g4 = ((block[0] & 0x07) << 1 | (block[1] & 0x10) >> 4) as i32;
    let a_b4 = ((block[1] & 0x08) | (block[1] & 0x03) << 1 | (block[2] & 0x80) >> 7) as i32;
    let b_r4 = ((block[2] & 0x78) >> 3) as i32;
    let b_g4 = ((block[2] & 0x07) << 1 | (block[3] & 0x80) >> 7) as i32;
    let b_b4 = ((block[3] & 0x78) >> 3) as i32;
    // The distance index's low bit is an ordering comparison of the two
    // unexpanded base colors.
    let a_value = a_r4 << 8 | a_g4 << 4 | a_b4;
    let b_value = b_r4 << 8 | b_g4 << 4 | b_b4;
    let tiebreak = (a_value >= b_value) as u8;
    let distance_index = (block[3] & 0x04) | (block[3] & 0x01) << 1 | tiebreak;
    let distance = DISTANCE_TABLE[distance_index as usize];
    let (a_r, a_g, a_b) = (expand_4(a_r4 as u8), expand_4(a_g4 as u8), expand_4(a_b4 as u8));
    let (b_r, b_g, b_b) = (expand_4(b_r4 as u8), expand_4(b_g4 as u8), expand_4(b_b4 as u8));
    let paint = [
        pack_rgb8(
            clamp0_255(a_r + distance),
            clamp0_255(a_g + distance),
            clamp0_255(a_b + distance),
        ),
        pack_rgb8(
            clamp0_255(a_r - distance),
            clamp0_255(a_g - distance),
            clamp0_255(a_b - distance),
        ),
        pack_rgb8(
            clamp0_255(b_r + distance),
            clamp0_255(b_g + distance),
            clamp0_255(b_b + distance),
        ),
        pack_rgb8(
            clamp0_255(b_r - distance),
            clamp0_255(b_g - distance),
            clamp0_255(b_b - distance),
        ),
    ];
    decompress_paint_block(block, paint, non_opaque, pixel_buffer);
}

/// Decodes a planar-mode block from its origin, horizontal and vertical
/// corner colors. Planar blocks are always opaque.
fn decompress_planar_mode(block: &[u8; 8], pixel_buffer: &mut [u8]) {
    let r_o = expand_6(((block[0] & 0x7E) >> 1) as i32);
    let g_o = expand_7(((block[0] & 0x1) << 6 | (block[1] & 0x7E) >> 1) as i32);
    let b_o = expand_6(
        ((block[1] & 0x1) << 5 | (block[2] & 0x18) | (block[2] & 0x03) << 1
            | (block[3] & 0x80) >> 7) as i32,
    );
    let r_h = expand_6(((block[3] & 0x7C) >> 1 | (block[3] & 0x1)) as i32);
    let g_h = expand_7(((block[4] & 0xFE) >> 1) as i32);
    let b_h = expand_6(((block[4] & 0x1) << 5 | (block[5] & 0xF8) >> 3) as i32);
    let r_v = expand_6(((block[5] & 0x7) << 3 | (block[6] & 0xE0) >> 5) as i32);
    let g_v = expand_7(((block[6] & 0x1F) << 2 | (block[7] & 0xC0) >> 6) as i32);
    let b_v = expand_6((block[7] & 0x3F) as i32);
    for y in 0..4i32 {
        for x in 0..4i32 {
            let pixel = pack_rgb8(
                clamp0_255(((r_h - r_o) * x + (r_v - r_o) * y + 4 * r_o + 2) >> 2),
                clamp0_255(((g_h - g_o) * x + (g_v - g_o) * y + 4 * g_o + 2) >> 2),
                clamp0_255(((b_h - b_o) * x + (b_v - b_o) * y + 4 * b_o + 2) >> 2),
            );
            put_pixel32(pixel_buffer, (y * 4 + x) as usize, pixel);
        }
    }
}

fn check_mode(mode: EtcMode, mode_mask: ModeMask) -> Result<(), DecodeError> {
    if !mode_mask.contains(mode.mode_mask()) {
        return Err(DecodeError::ModeRejected);
    }
    Ok(())
}

/// Decompresses a 64-bit ETC1 block. Output is RGBA8 with alpha 0xFF.
///
/// Differential deltas that overflow the 5-bit range are an ETC2 encoding
/// and make the block invalid here.
pub fn decompress_block_etc1(
    bitstring: &[u8],
    mode_mask: ModeMask,
    _flags: DecompressFlags,
    pixel_buffer: &mut [u8],
) -> Result<(), DecodeError> {
    let block = block8(bitstring)?;
    require_output(pixel_buffer, 64)?;
    if block[3] & 0x2 == 0 {
        check_mode(EtcMode::Individual, mode_mask)?;
        let (first, second) = individual_base_colors(block);
        decompress_modifier_block(block, first, second, false, pixel_buffer);
        return Ok(());
    }
    if differential_mode(block) != EtcMode::Differential {
        return Err(DecodeError::InvalidBlock);
    }
    check_mode(EtcMode::Differential, mode_mask)?;
    let (first, second) = differential_base_colors(block);
    decompress_modifier_block(block, first, second, false, pixel_buffer);
    Ok(())
}

/// Decompresses a 64-bit ETC2 block. Output is RGBA8 with alpha 0xFF.
pub fn decompress_block_etc2(
    bitstring: &[u8],
    mode_mask: ModeMask,
    _flags: DecompressFlags,
    pixel_buffer: &mut [u8],
) -> Result<(), DecodeError> {
    let block = block8(bitstring)?;
    require_output(pixel_buffer, 64)?;
    if block[3] & 0x2 == 0 {
        check_mode(EtcMode::Individual, mode_mask)?;
        let (first, second) = individual_base_colors(block);
        decompress_modifier_block(block, first, second, false, pixel_buffer);
        return Ok(());
    }
    let mode = differential_mode(block);
    check_mode(mode, mode_mask)?;
    match mode {
        EtcMode::T => decompress_t_mode(block, false, pixel_buffer),
        EtcMode::H => decompress_h_mode(block, false, pixel_buffer),
        EtcMode::Planar => decompress_planar_mode(block, pixel_buffer),
        _ => {
            let (first, second) = differential_base_colors(block);
            decompress_modifier_block(block, first, second, false, pixel_buffer);
        }
    }
    Ok(())
}

/// Decompresses a 64-bit ETC2 punchthrough block. Output is RGBA8; pixels of
/// a non-opaque block with index 2 decode to transparent black.
pub fn decompress_block_etc2_punchthrough(
    bitstring: &[u8],
    mode_mask: ModeMask,
    flags: DecompressFlags,
    pixel_buffer: &mut [u8],
) -> Result<(), DecodeError> {
    let block = block8(bitstring)?;
    require_output(pixel_buffer, 64)?;
    // The differential bit is reused as the opacity bit.
    let opaque = block[3] & 0x2 != 0;
    if flags.contains(DecompressFlags::OPAQUE_ONLY) && !opaque {
        return Err(DecodeError::OpacityMismatch);
    }
    if flags.contains(DecompressFlags::NON_OPAQUE_ONLY) && opaque {
        return Err(DecodeError::OpacityMismatch);
    }
    let mode = differential_mode(block);
    check_mode(mode, mode_mask)?;
    match mode {
        EtcMode::T => decompress_t_mode(block, !opaque, pixel_buffer),
        EtcMode::H => decompress_h_mode(block, !opaque, pixel_buffer),
        EtcMode::Planar => {
            // Planar cannot express punchthrough pixels; an encoder never
            // emits a non-opaque planar block, and the decoded result is
            // fully opaque either way.
            if !opaque && flags.contains(DecompressFlags::ENCODE) {
                return Err(DecodeError::ModeRejected);
            }
            decompress_planar_mode(block, pixel_buffer);
        }
        _ => {
            let (first, second) = differential_base_colors(block);
            decompress_modifier_block(block, first, second, !opaque, pixel_buffer);
        }
    }
    Ok(())
}

/// Decompresses a 128-bit ETC2+EAC block: a 64-bit EAC alpha prefix followed
/// by a 64-bit ETC2 color block. Output is RGBA8.
pub fn decompress_block_etc2_eac(
    bitstring: &[u8],
    mode_mask: ModeMask,
    flags: DecompressFlags,
    pixel_buffer: &mut [u8],
) -> Result<(), DecodeError> {
    let block = block16(bitstring)?;
    require_output(pixel_buffer, 64)?;
    decompress_block_etc2(&block[8..16], mode_mask, flags, pixel_buffer)?;
    let alpha_block: &[u8; 8] = block[0..8].try_into().unwrap();
    let base = alpha_block[0] as i32;
    let multiplier = (alpha_block[1] >> 4) as i32;
    let table = (alpha_block[1] & 0xF) as usize;
    let bits = eac_index_bits(alpha_block);
    for i in 0..16 {
        let modifier = EAC_MODIFIER_TABLE[table][eac_pixel_index(bits, i)];
        let alpha = clamp0_255(base + modifier * multiplier);
        pixel_buffer[scanline_index(i) * 4 + 3] = alpha;
    }
    Ok(())
}

/// Returns the internal mode of an ETC1 block without decoding it.
pub fn get_mode_etc1(bitstring: &[u8]) -> Result<EtcMode, DecodeError> {
    let block = block8(bitstring)?;
    if block[3] & 0x2 == 0 {
        Ok(EtcMode::Individual)
    } else {
        Ok(EtcMode::Differential)
    }
}

/// Returns the internal mode of an ETC2 block without decoding it.
pub fn get_mode_etc2(bitstring: &[u8]) -> Result<EtcMode, DecodeError> {
    let block = block8(bitstring)?;
    if block[3] & 0x2 == 0 {
        Ok(EtcMode::Individual)
    } else {
        Ok(differential_mode(block))
    }
}

/// Returns the internal mode of an ETC2 punchthrough block without decoding
/// it. Individual mode does not exist in this format.
pub fn get_mode_etc2_punchthrough(bitstring: &[u8]) -> Result<EtcMode, DecodeError> {
    let block = block8(bitstring)?;
    Ok(differential_mode(block))
}

/// Returns the internal mode of the color part of an ETC2+EAC block.
pub fn get_mode_etc2_eac(bitstring: &[u8]) -> Result<EtcMode, DecodeError> {
    let block = block16(bitstring)?;
    get_mode_etc2(&block[8..16])
}

/// Returns `true` if every channel of an 8-bit color is representable by a
/// replicated 4-bit value.
#[inline]
fn representable_4bit(color: [u8; 3]) -> bool {
    color.iter().all(|&c| c >> 4 == c & 0xF)
}

/// Returns `true` if an 8-bit channel is a replicated 5-bit value.
#[inline]
fn representable_5bit(channel: u8) -> bool {
    expand_5((channel >> 3) as i32) == channel as i32
}

/// The current 8-bit sub-block base colors of an ETC1 block.
fn current_base_colors(block: &[u8; 8]) -> ([i32; 3], [i32; 3]) {
    if block[3] & 0x2 == 0 {
        individual_base_colors(block)
    } else {
        differential_base_colors(block)
    }
}

/// Rewrites the mode and base-color fields of an ETC1 block so that decoding
/// yields the same pixels in the requested mode.
///
/// The intensity tables, flip bit and all per-pixel modifier indices are
/// preserved. With [`SetModeFlags::MAX_TWO_COLORS`], `colors` supplies the
/// two 32-bit RGBA sub-block base colors directly. Returns `false` and
/// leaves the bitstring untouched when the requested mode cannot represent
/// the block's base colors exactly, or when the mode is not INDIVIDUAL or
/// DIFFERENTIAL.
pub fn set_mode_etc1(
    bitstring: &mut [u8],
    mode: EtcMode,
    flags: SetModeFlags,
    colors: &[u32],
) -> bool {
    let end = 8.min(bitstring.len());
    let Ok(block) = <&mut [u8; 8]>::try_from(&mut bitstring[0..end]) else {
        return false;
    };
    let (first, second) = if flags.contains(SetModeFlags::MAX_TWO_COLORS) && colors.len() >= 2 {
        (
            [
                pixel32_r8(colors[0]) as i32,
                pixel32_g8(colors[0]) as i32,
                pixel32_b8(colors[0]) as i32,
            ],
            [
                pixel32_r8(colors[1]) as i32,
                pixel32_g8(colors[1]) as i32,
                pixel32_b8(colors[1]) as i32,
            ],
        )
    } else {
        current_base_colors(block)
    };
    let first = [first[0] as u8, first[1] as u8, first[2] as u8];
    let second = [second[0] as u8, second[1] as u8, second[2] as u8];
    match mode {
        EtcMode::Individual => {
            if !representable_4bit(first) || !representable_4bit(second) {
                return false;
            }
            for channel in 0..3 {
                block[channel] = (first[channel] & 0xF0) | (second[channel] >> 4);
            }
            block[3] &= !0x2;
            true
        }
        EtcMode::Differential => {
            for channel in 0..3 {
                if !representable_5bit(first[channel]) || !representable_5bit(second[channel]) {
                    return false;
                }
                let delta = (second[channel] >> 3) as i32 - (first[channel] >> 3) as i32;
                if !(-4..=3).contains(&delta) {
                    return false;
                }
            }
            for channel in 0..3 {
                let base = first[channel] & 0xF8;
                let delta = (second[channel] >> 3) as i32 - (first[channel] >> 3) as i32;
                block[channel] = base | (delta as u8 & 0x7);
            }
            block[3] |= 0x2;
            true
        }
        _ => false,
    }
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(buffer: &[u8], i: usize) -> [u8; 4] {
        buffer[i * 4..i * 4 + 4].try_into().unwrap()
    }

    fn decode_etc1(block: &[u8; 8]) -> [u8; 64] {
        let mut out = [0u8; 64];
        decompress_block_etc1(block, ModeMask::ALL, DecompressFlags::EMPTY, &mut out).unwrap();
        out
    }

    #[test]
    fn test_individual_uniform_with_modifier() {
        // Both sub-blocks gray 0x88, intensity table 0, all indices 0: the
        // smallest positive modifier (+2) applies to every pixel.
        let block = [0x88, 0x88, 0x88, 0x00, 0, 0, 0, 0];
        let out = decode_etc1(&block);
        for i in 0..16 {
            assert_eq!(pixel(&out, i), [0x8A, 0x8A, 0x8A, 0xFF]);
        }
    }

    #[test]
    fn test_individual_saturates_to_white() {
        // Base 0xFF in both halves; +2 saturates at 255.
        let block = [0xFF, 0xFF, 0xFF, 0x00, 0, 0, 0, 0];
        let out = decode_etc1(&block);
        for i in 0..16 {
            assert_eq!(pixel(&out, i), [0xFF, 0xFF, 0xFF, 0xFF]);
        }
    }

    #[test]
    fn test_individual_sub_block_split() {
        // Left half 0x00, right half 0xFF, no flip: columns 0..2 take the
        // first base color, columns 2..4 the second.
        let block = [0x0F, 0x0F, 0x0F, 0x00, 0, 0, 0, 0];
        let out = decode_etc1(&block);
        for y in 0..4 {
            assert_eq!(pixel(&out, y * 4), [0x02, 0x02, 0x02, 0xFF]);
            assert_eq!(pixel(&out, y * 4 + 3), [0xFF, 0xFF, 0xFF, 0xFF]);
        }
    }

    #[test]
    fn test_differential_negative_modifier() {
        // Differential, base 0x84 both halves (delta 0), table 0, all
        // indices 3 (-8).
        let block = [0x80, 0x80, 0x80, 0x02, 0xFF, 0xFF, 0xFF, 0xFF];
        let out = decode_etc1(&block);
        let expected = (0x84 - 8) as u8;
        for i in 0..16 {
            assert_eq!(pixel(&out, i), [expected, expected, expected, 0xFF]);
        }
    }

    #[test]
    fn test_etc1_rejects_overflowing_deltas() {
        // Red delta -4 from base 0 overflows; ETC1 cannot reinterpret.
        let block = [0x04, 0x00, 0x00, 0x02, 0, 0, 0, 0];
        let mut out = [0u8; 64];
        assert_eq!(
            decompress_block_etc1(&block, ModeMask::ALL, DecompressFlags::EMPTY, &mut out),
            Err(DecodeError::InvalidBlock)
        );
    }

    #[test]
    fn test_etc1_mode_mask_rejection() {
        let block = [0x88, 0x88, 0x88, 0x00, 0, 0, 0, 0];
        let mut out = [0u8; 64];
        assert_eq!(
            decompress_block_etc1(
                &block,
                ModeMask::ETC_DIFFERENTIAL,
                DecompressFlags::EMPTY,
                &mut out
            ),
            Err(DecodeError::ModeRejected)
        );
    }

    #[test]
    fn test_etc2_t_mode_paint_colors() {
        // Red overflow selects T mode. Paint color A is black, B is white;
        // every pixel index selects paint entry 2 (B itself).
        let block = [0x04, 0x00, 0xFF, 0xF2, 0xFF, 0xFF, 0x00, 0x00];
        let mut out = [0u8; 64];
        decompress_block_etc2(&block, ModeMask::ALL, DecompressFlags::EMPTY, &mut out).unwrap();
        for i in 0..16 {
            assert_eq!(pixel(&out, i), [0xFF, 0xFF, 0xFF, 0xFF]);
        }
        assert_eq!(get_mode_etc2(&block).unwrap(), EtcMode::T);
    }

    #[test]
    fn test_etc2_h_mode_paint_colors() {
        // Green overflow selects H mode; paint entry 0 is A + distance 3.
        let block = [0x00, 0x04, 0x7F, 0xF2, 0, 0, 0, 0];
        let mut out = [0u8; 64];
        decompress_block_etc2(&block, ModeMask::ALL, DecompressFlags::EMPTY, &mut out).unwrap();
        for i in 0..16 {
            assert_eq!(pixel(&out, i), [0x03, 0x03, 0x03, 0xFF]);
        }
        assert_eq!(get_mode_etc2(&block).unwrap(), EtcMode::H);
    }

    #[test]
    fn test_etc2_planar_uniform() {
        // O, H and V corners all encode the same color, so every pixel is
        // that color.
        let block = [0x55, 0x2B, 0x0D, 0x56, 0xAB, 0x55, 0x55, 0x6A];
        assert_eq!(get_mode_etc2(&block).unwrap(), EtcMode::Planar);
        let mut out = [0u8; 64];
        decompress_block_etc2(&block, ModeMask::ALL, DecompressFlags::EMPTY, &mut out).unwrap();
        for i in 0..16 {
            assert_eq!(pixel(&out, i), [0xAA, 0xAB, 0xAA, 0xFF]);
        }
    }

    #[test]
    fn test_etc2_mode_mask_blocks_reinterpretation() {
        let t_block = [0x04, 0x00, 0xFF, 0xF2, 0xFF, 0xFF, 0x00, 0x00];
        let mut out = [0u8; 64];
        assert_eq!(
            decompress_block_etc2(
                &t_block,
                ModeMask::ALL_MODES_ETC2.without(ModeMask::ETC_T),
                DecompressFlags::EMPTY,
                &mut out
            ),
            Err(DecodeError::ModeRejected)
        );
    }

    #[test]
    fn test_punchthrough_transparent_pixel() {
        // Non-opaque differential block; pixel 0 has index 2 and decodes to
        // transparent black, the others have index 0 (zero modifier).
        let block = [0x80, 0x80, 0x80, 0x00, 0x00, 0x01, 0x00, 0x00];
        let mut out = [0u8; 64];
        decompress_block_etc2_punchthrough(&block, ModeMask::ALL, DecompressFlags::EMPTY, &mut out)
            .unwrap();
        assert_eq!(pixel(&out, 0), [0, 0, 0, 0]);
        let base = expand_5(0x80 >> 3) as u8;
        for i in 1..16 {
            assert_eq!(pixel(&out, i), [base, base, base, 0xFF]);
        }
    }

    #[test]
    fn test_punchthrough_opacity_flags() {
        let non_opaque = [0x80, 0x80, 0x80, 0x00, 0, 0, 0, 0];
        let opaque = [0x80, 0x80, 0x80, 0x02, 0, 0, 0, 0];
        let mut out = [0u8; 64];
        assert_eq!(
            decompress_block_etc2_punchthrough(
                &non_opaque,
                ModeMask::ALL,
                DecompressFlags::OPAQUE_ONLY,
                &mut out
            ),
            Err(DecodeError::OpacityMismatch)
        );
        assert_eq!(
            decompress_block_etc2_punchthrough(
                &opaque,
                ModeMask::ALL,
                DecompressFlags::NON_OPAQUE_ONLY,
                &mut out
            ),
            Err(DecodeError::OpacityMismatch)
        );
    }

    #[test]
    fn test_punchthrough_encode_flag_rejects_non_opaque_planar() {
        // Blue overflow with the opacity bit clear: planar, which no
        // encoder emits non-opaque.
        let block = [0x55, 0x2B, 0x0D, 0x54, 0xAB, 0x55, 0x55, 0x6A];
        let mut out = [0u8; 64];
        assert_eq!(
            decompress_block_etc2_punchthrough(
                &block,
                ModeMask::ALL,
                DecompressFlags::ENCODE,
                &mut out
            ),
            Err(DecodeError::ModeRejected)
        );
        // Without the flag the block decodes fully opaque.
        decompress_block_etc2_punchthrough(&block, ModeMask::ALL, DecompressFlags::EMPTY, &mut out)
            .unwrap();
        for i in 0..16 {
            assert_eq!(pixel(&out, i)[3], 0xFF);
        }
    }

    #[test]
    fn test_etc2_eac_alpha_channel() {
        // Alpha: base 0, multiplier 0 decodes to zero alpha everywhere.
        // Color: individual white block.
        let mut block = [0u8; 16];
        block[1] = 0x0D; // multiplier 0, table 13
        block[8] = 0xFF;
        block[9] = 0xFF;
        block[10] = 0xFF;
        let mut out = [0u8; 64];
        decompress_block_etc2_eac(&block, ModeMask::ALL, DecompressFlags::EMPTY, &mut out).unwrap();
        for i in 0..16 {
            assert_eq!(pixel(&out, i), [0xFF, 0xFF, 0xFF, 0x00]);
        }
    }

    #[test]
    fn test_mode_queries() {
        assert_eq!(
            get_mode_etc1(&[0x88, 0x88, 0x88, 0x00, 0, 0, 0, 0]).unwrap(),
            EtcMode::Individual
        );
        assert_eq!(
            get_mode_etc1(&[0x80, 0x80, 0x80, 0x02, 0, 0, 0, 0]).unwrap(),
            EtcMode::Differential
        );
        assert_eq!(
            get_mode_etc2_punchthrough(&[0x55, 0x55, 0x0D, 0x54, 0, 0, 0, 0]).unwrap(),
            EtcMode::Planar
        );
        let mut eac_block = [0u8; 16];
        eac_block[11] = 0x02;
        eac_block[8] = 0x80;
        eac_block[9] = 0x80;
        eac_block[10] = 0x80;
        assert_eq!(get_mode_etc2_eac(&eac_block).unwrap(), EtcMode::Differential);
    }

    #[test]
    fn test_set_mode_differential_to_individual() {
        // Differential block with black base colors, expressible in 4 bits.
        let mut block = [0x00, 0x00, 0x00, 0x02, 0x12, 0x34, 0x56, 0x78];
        let before = decode_etc1(&block);
        assert!(set_mode_etc1(&mut block, EtcMode::Individual, SetModeFlags::EMPTY, &[]));
        assert_eq!(get_mode_etc1(&block).unwrap(), EtcMode::Individual);
        let after = decode_etc1(&block);
        assert_eq!(before[..], after[..]);
    }

    #[test]
    fn test_set_mode_individual_to_differential() {
        // Individual block whose base colors are also 5-bit replicable.
        let mut block = [0x00, 0x00, 0x00, 0x00, 0xAB, 0xCD, 0x00, 0xFF];
        let before = decode_etc1(&block);
        assert!(set_mode_etc1(&mut block, EtcMode::Differential, SetModeFlags::EMPTY, &[]));
        assert_eq!(get_mode_etc1(&block).unwrap(), EtcMode::Differential);
        let after = decode_etc1(&block);
        assert_eq!(before[..], after[..]);
    }

    #[test]
    fn test_set_mode_fails_silently() {
        // Base color 0x84 is not replicable from 4 bits; the block must be
        // left unchanged.
        let mut block = [0x80, 0x80, 0x80, 0x02, 0, 0, 0, 0];
        let original = block;
        assert!(!set_mode_etc1(&mut block, EtcMode::Individual, SetModeFlags::EMPTY, &[]));
        assert_eq!(block, original);
        assert!(!set_mode_etc1(&mut block, EtcMode::Planar, SetModeFlags::EMPTY, &[]));
        assert_eq!(block, original);
    }

    #[test]
    fn test_set_mode_with_two_colors_hint() {
        let mut block = [0x12, 0x34, 0x56, 0x00, 0, 0, 0, 0];
        // Both supplied colors are 4-bit replicable.
        let colors = [
            crate::pixel::pack_rgb8(0x22, 0x44, 0x66),
            crate::pixel::pack_rgb8(0x88, 0xAA, 0xCC),
        ];
        assert!(set_mode_etc1(
            &mut block,
            EtcMode::Individual,
            SetModeFlags::MAX_TWO_COLORS,
            &colors
        ));
        assert_eq!(block[0], 0x28);
        assert_eq!(block[1], 0x4A);
        assert_eq!(block[2], 0x6C);
    }
}
