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

//! S3TC decoders: BC1, BC1A, BC2 and BC3. Output is RGBA8.

use super::rgtc::alpha_palette_unsigned;
use super::{block16, block8, require_output};
use crate::bits::Block64;
use crate::error::DecodeError;
use crate::mode::{DecompressFlags, ModeMask};
use crate::pixel::{pack_rgb8, pack_rgba8, put_pixel32};

/// Expands a 5-6-5 color to three 8-bit channels by bit replication.
#[inline]
fn expand_565(color: u16) -> (i32, i32, i32) {
    let r = ((color >> 11) & 0x1F) as i32;
    let g = ((color >> 5) & 0x3F) as i32;
    let b = (color & 0x1F) as i32;
    ((r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2))
}

/// Derives the four-entry BC1 color palette.
///
/// `force_four_colors` selects the opaque four-color interpretation
/// regardless of the endpoint ordering (BC2/BC3 payloads).
/// `punchthrough_alpha` makes index 3 of the three-color case transparent
/// black instead of opaque black.
fn bc1_palette(
    color0: u16,
    color1: u16,
    force_four_colors: bool,
    punchthrough_alpha: bool,
) -> [u32; 4] {
    let (r0, g0, b0) = expand_565(color0);
    let (r1, g1, b1) = expand_565(color1);
    let mut palette = [
        pack_rgb8(r0 as u8, g0 as u8, b0 as u8),
        pack_rgb8(r1 as u8, g1 as u8, b1 as u8),
        0,
        0,
    ];
    if color0 > color1 || force_four_colors {
        palette[2] = pack_rgb8(
            ((2 * r0 + r1) / 3) as u8,
            ((2 * g0 + g1) / 3) as u8,
            ((2 * b0 + b1) / 3) as u8,
        );
        palette[3] = pack_rgb8(
            ((r0 + 2 * r1) / 3) as u8,
            ((g0 + 2 * g1) / 3) as u8,
            ((b0 + 2 * b1) / 3) as u8,
        );
    } else {
        palette[2] = pack_rgb8(
            ((r0 + r1) / 2) as u8,
            ((g0 + g1) / 2) as u8,
            ((b0 + b1) / 2) as u8,
        );
        palette[3] = if punchthrough_alpha {
            pack_rgba8(0, 0, 0, 0)
        } else {
            pack_rgb8(0, 0, 0)
        };
    }
    palette
}

/// Checks the opacity policy flags against the endpoint-order block mode.
fn check_bc1_opacity(color0: u16, color1: u16, flags: DecompressFlags) -> Result<(), DecodeError> {
    let opaque_mode = color0 > color1;
    if flags.contains(DecompressFlags::OPAQUE_ONLY) && !opaque_mode {
        return Err(DecodeError::OpacityMismatch);
    }
    if flags.contains(DecompressFlags::NON_OPAQUE_ONLY) && opaque_mode {
        return Err(DecodeError::OpacityMismatch);
    }
    Ok(())
}

fn decompress_bc1_payload(
    block: &[u8; 8],
    force_four_colors: bool,
    punchthrough_alpha: bool,
    pixel_buffer: &mut [u8],
) {
    let block = Block64::load(block);
    let color0 = block.bits(0, 16) as u16;
    let color1 = block.bits(16, 16) as u16;
    let palette = bc1_palette(color0, color1, force_four_colors, punchthrough_alpha);
    let indices = block.bits(32, 32);
    for i in 0..16 {
        put_pixel32(pixel_buffer, i, palette[(indices >> (2 * i) & 0x3) as usize]);
    }
}

/// Decompresses a 64-bit BC1 block. Alpha is always 0xFF.
pub fn decompress_block_bc1(
    bitstring: &[u8],
    _mode_mask: ModeMask,
    flags: DecompressFlags,
    pixel_buffer: &mut [u8],
) -> Result<(), DecodeError> {
    let block = block8(bitstring)?;
    require_output(pixel_buffer, 64)?;
    let endpoints = Block64::load(block);
    check_bc1_opacity(endpoints.bits(0, 16) as u16, endpoints.bits(16, 16) as u16, flags)?;
    decompress_bc1_payload(block, false, false, pixel_buffer);
    Ok(())
}

/// Decompresses a 64-bit BC1A block: index 3 of the three-color mode is
/// transparent black.
pub fn decompress_block_bc1a(
    bitstring: &[u8],
    _mode_mask: ModeMask,
    flags: DecompressFlags,
    pixel_buffer: &mut [u8],
) -> Result<(), DecodeError> {
    let block = block8(bitstring)?;
    require_output(pixel_buffer, 64)?;
    let endpoints = Block64::load(block);
    check_bc1_opacity(endpoints.bits(0, 16) as u16, endpoints.bits(16, 16) as u16, flags)?;
    decompress_bc1_payload(block, false, true, pixel_buffer);
    Ok(())
}

/// Decompresses a 128-bit BC2 block: explicit 4-bit alpha plus a BC1 color
/// payload forced to the four-color interpretation.
pub fn decompress_block_bc2(
    bitstring: &[u8],
    _mode_mask: ModeMask,
    _flags: DecompressFlags,
    pixel_buffer: &mut [u8],
) -> Result<(), DecodeError> {
    let block = block16(bitstring)?;
    require_output(pixel_buffer, 64)?;
    let alpha_bits = Block64::load(block[0..8].try_into().unwrap());
    let color_block: &[u8; 8] = block[8..16].try_into().unwrap();
    decompress_bc1_payload(color_block, true, false, pixel_buffer);
    for i in 0..16 {
        // Replicate the 4-bit alpha to 8 bits and overwrite the alpha byte.
        let alpha4 = alpha_bits.bits(4 * i as u32, 4) as u8;
        pixel_buffer[i * 4 + 3] = alpha4 * 0x11;
    }
    Ok(())
}

/// Decompresses a 128-bit BC3 block: BC4-style interpolated alpha plus a BC1
/// color payload forced to the four-color interpretation.
pub fn decompress_block_bc3(
    bitstring: &[u8],
    _mode_mask: ModeMask,
    _flags: DecompressFlags,
    pixel_buffer: &mut [u8],
) -> Result<(), DecodeError> {
    let block = block16(bitstring)?;
    require_output(pixel_buffer, 64)?;
    let alpha_palette = alpha_palette_unsigned(block[0], block[1]);
    let alpha_block = Block64::load(block[0..8].try_into().unwrap());
    let color_block: &[u8; 8] = block[8..16].try_into().unwrap();
    decompress_bc1_payload(color_block, true, false, pixel_buffer);
    for i in 0..16 {
        let index = alpha_block.bits(16 + 3 * i as u32, 3) as usize;
        pixel_buffer[i * 4 + 3] = alpha_palette[index];
    }
    Ok(())
}
