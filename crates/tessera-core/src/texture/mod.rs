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

//! Generic block dispatch and whole-texture decompression.
//!
//! [`decompress_block`] routes one compressed block to its family decoder
//! and optionally converts the output pixels. The texture walkers iterate a
//! compressed buffer block by block and deposit the results either as
//! contiguous 4x4 tiles or into a row-major linear image. A failing block
//! aborts the walk; pixels already written stay written.

use crate::codec;
use crate::error::DecodeError;
use crate::format::TextureFormat;
use crate::mode::{DecompressFlags, ModeMask};
use crate::pixel::convert::convert_pixels;
use crate::pixel::PixelFormat;
use crate::MAX_BLOCK_SIZE;

type BlockDecoder = fn(&[u8], ModeMask, DecompressFlags, &mut [u8]) -> Result<(), DecodeError>;

/// Returns the family decoder for a texture format.
fn family_decoder(texture_format: TextureFormat) -> BlockDecoder {
    match texture_format {
        TextureFormat::Bc1 => codec::s3tc::decompress_block_bc1,
        TextureFormat::Bc1a => codec::s3tc::decompress_block_bc1a,
        TextureFormat::Bc2 => codec::s3tc::decompress_block_bc2,
        TextureFormat::Bc3 => codec::s3tc::decompress_block_bc3,
        TextureFormat::Rgtc1 => codec::rgtc::decompress_block_rgtc1,
        TextureFormat::SignedRgtc1 => codec::rgtc::decompress_block_signed_rgtc1,
        TextureFormat::Rgtc2 => codec::rgtc::decompress_block_rgtc2,
        TextureFormat::SignedRgtc2 => codec::rgtc::decompress_block_signed_rgtc2,
        TextureFormat::BptcFloat => codec::bptc_float::decompress_block_bptc_float,
        TextureFormat::BptcSignedFloat => codec::bptc_float::decompress_block_bptc_signed_float,
        TextureFormat::Bptc => codec::bptc::decompress_block_bptc,
        TextureFormat::Etc1 => codec::etc::decompress_block_etc1,
        TextureFormat::Etc2 => codec::etc::decompress_block_etc2,
        TextureFormat::Etc2Punchthrough => codec::etc::decompress_block_etc2_punchthrough,
        TextureFormat::Etc2Eac => codec::etc::decompress_block_etc2_eac,
        TextureFormat::EacR11 => codec::eac::decompress_block_eac_r11,
        TextureFormat::EacSignedR11 => codec::eac::decompress_block_eac_signed_r11,
        TextureFormat::EacRg11 => codec::eac::decompress_block_eac_rg11,
        TextureFormat::EacSignedRg11 => codec::eac::decompress_block_eac_signed_rg11,
    }
}

/// Decompresses one block of `texture_format` into `pixel_format` output.
///
/// When `pixel_format` differs from the format's native output, the block is
/// decoded to a stack scratch buffer and converted; only same-precision
/// conversions succeed.
pub fn decompress_block(
    bitstring: &[u8],
    texture_format: TextureFormat,
    mode_mask: ModeMask,
    flags: DecompressFlags,
    pixel_buffer: &mut [u8],
    pixel_format: PixelFormat,
) -> Result<(), DecodeError> {
    let native = texture_format.pixel_format();
    let decoder = family_decoder(texture_format);
    if pixel_format == native {
        return decoder(bitstring, mode_mask, flags, pixel_buffer);
    }
    // Fail before paying for the decode when the conversion cannot work.
    convert_pixels(&[], native, &mut [], pixel_format, 0).inspect_err(|_| {
        log::trace!("{texture_format:?} cannot produce {pixel_format:?} (native {native:?})");
    })?;
    let mut scratch = [0u8; MAX_BLOCK_SIZE];
    decoder(bitstring, mode_mask, flags, &mut scratch)?;
    convert_pixels(
        &scratch[..native.block_size()],
        native,
        pixel_buffer,
        pixel_format,
        16,
    )
}

fn require_texture_buffers(
    bitstring: &[u8],
    texture_format: TextureFormat,
    block_count: usize,
    pixel_buffer: &[u8],
    pixel_format: PixelFormat,
) -> Result<(), DecodeError> {
    if !pixel_format.is_valid() {
        return Err(DecodeError::UnsupportedConversion {
            native: texture_format.pixel_format(),
            requested: pixel_format,
        });
    }
    let compressed_bytes = block_count * texture_format.block_size();
    if bitstring.len() < compressed_bytes {
        return Err(DecodeError::TruncatedInput {
            expected: compressed_bytes,
            actual: bitstring.len(),
        });
    }
    let decoded_bytes = block_count * pixel_format.block_size();
    if pixel_buffer.len() < decoded_bytes {
        return Err(DecodeError::OutputTooSmall {
            expected: decoded_bytes,
            actual: pixel_buffer.len(),
        });
    }
    Ok(())
}

/// Decompresses an entire texture as contiguous 4x4 tiles.
///
/// Tile `i` (blocks in row-major order) occupies bytes
/// `i * 16 * pixel_size .. (i + 1) * 16 * pixel_size` of the output.
pub fn decompress_texture_tiled(
    bitstring: &[u8],
    texture_format: TextureFormat,
    width_in_blocks: u32,
    height_in_blocks: u32,
    pixel_buffer: &mut [u8],
    pixel_format: PixelFormat,
) -> Result<(), DecodeError> {
    let block_count = width_in_blocks as usize * height_in_blocks as usize;
    require_texture_buffers(bitstring, texture_format, block_count, pixel_buffer, pixel_format)?;
    let block_size = texture_format.block_size();
    let tile_size = pixel_format.block_size();
    for i in 0..block_count {
        let block = &bitstring[i * block_size..(i + 1) * block_size];
        let tile = &mut pixel_buffer[i * tile_size..(i + 1) * tile_size];
        decompress_block(
            block,
            texture_format,
            ModeMask::ALL,
            DecompressFlags::EMPTY,
            tile,
            pixel_format,
        )
        .inspect_err(|error| {
            log::debug!(
                "tiled decode of {texture_format:?} aborted at block {} / {}: {error}",
                i,
                block_count
            );
        })?;
    }
    Ok(())
}

/// Decompresses an entire texture into a row-major linear image of
/// `4 * width_in_blocks` by `4 * height_in_blocks` pixels.
pub fn decompress_texture_linear(
    bitstring: &[u8],
    texture_format: TextureFormat,
    width_in_blocks: u32,
    height_in_blocks: u32,
    pixel_buffer: &mut [u8],
    pixel_format: PixelFormat,
) -> Result<(), DecodeError> {
    let width_in_blocks = width_in_blocks as usize;
    let height_in_blocks = height_in_blocks as usize;
    let block_count = width_in_blocks * height_in_blocks;
    require_texture_buffers(bitstring, texture_format, block_count, pixel_buffer, pixel_format)?;
    let block_size = texture_format.block_size();
    let pixel_size = pixel_format.pixel_size();
    let row_bytes = 4 * pixel_size;
    let image_pitch = width_in_blocks * row_bytes;
    let mut tile = [0u8; MAX_BLOCK_SIZE];
    for block_y in 0..height_in_blocks {
        for block_x in 0..width_in_blocks {
            let i = block_y * width_in_blocks + block_x;
            let block = &bitstring[i * block_size..(i + 1) * block_size];
            decompress_block(
                block,
                texture_format,
                ModeMask::ALL,
                DecompressFlags::EMPTY,
                &mut tile,
                pixel_format,
            )
            .inspect_err(|error| {
                log::debug!(
                    "linear decode of {texture_format:?} aborted at block ({block_x}, {block_y}): {error}"
                );
            })?;
            // Scatter the tile's four rows into the linear image.
            for row in 0..4 {
                let source = &tile[row * row_bytes..(row + 1) * row_bytes];
                let offset = (block_y * 4 + row) * image_pitch + block_x * row_bytes;
                pixel_buffer[offset..offset + row_bytes].copy_from_slice(source);
            }
        }
    }
    Ok(())
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    // BC1 blocks painting a single color.
    const WHITE_BC1: [u8; 8] = [0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00];
    const BLACK_BC1: [u8; 8] = [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];

    #[test]
    fn test_generic_block_native_format() {
        let mut out = [0u8; 64];
        decompress_block(
            &WHITE_BC1,
            TextureFormat::Bc1,
            ModeMask::ALL,
            DecompressFlags::EMPTY,
            &mut out,
            PixelFormat::RGBA8,
        )
        .unwrap();
        assert!(out.iter().all(|&byte| byte == 0xFF));
    }

    #[test]
    fn test_generic_block_with_conversion() {
        // A red BC1 block converted to BGRA8 carries red in byte 2.
        let red_bc1 = [0x00, 0xF8, 0x00, 0xF8, 0x00, 0x00, 0x00, 0x00];
        let mut out = [0u8; 64];
        decompress_block(
            &red_bc1,
            TextureFormat::Bc1,
            ModeMask::ALL,
            DecompressFlags::EMPTY,
            &mut out,
            PixelFormat::BGRA8,
        )
        .unwrap();
        for pixel in out.chunks_exact(4) {
            assert_eq!(pixel, [0x00, 0x00, 0xFF, 0xFF]);
        }
    }

    #[test]
    fn test_generic_block_rejects_precision_change() {
        let mut out = [0u8; 128];
        assert!(matches!(
            decompress_block(
                &WHITE_BC1,
                TextureFormat::Bc1,
                ModeMask::ALL,
                DecompressFlags::EMPTY,
                &mut out,
                PixelFormat::FLOAT_RGBX16,
            ),
            Err(DecodeError::UnsupportedConversion { .. })
        ));
    }

    #[test]
    fn test_tiled_walker_layout() {
        let mut data = [0u8; 32];
        data[0..8].copy_from_slice(&WHITE_BC1);
        data[8..16].copy_from_slice(&BLACK_BC1);
        data[16..24].copy_from_slice(&BLACK_BC1);
        data[24..32].copy_from_slice(&WHITE_BC1);
        let mut out = [0u8; 4 * 64];
        decompress_texture_tiled(&data, TextureFormat::Bc1, 2, 2, &mut out, PixelFormat::RGBA8)
            .unwrap();
        // Tile 0 is all white, tile 1 all black (with opaque alpha).
        assert!(out[0..64].iter().all(|&byte| byte == 0xFF));
        for pixel in out[64..128].chunks_exact(4) {
            assert_eq!(pixel, [0, 0, 0, 0xFF]);
        }
        assert!(out[192..256].iter().all(|&byte| byte == 0xFF));
    }

    #[test]
    fn test_linear_walker_layout() {
        let mut data = [0u8; 16];
        data[0..8].copy_from_slice(&WHITE_BC1);
        data[8..16].copy_from_slice(&BLACK_BC1);
        let mut out = [0u8; 2 * 64];
        decompress_texture_linear(&data, TextureFormat::Bc1, 2, 1, &mut out, PixelFormat::RGBA8)
            .unwrap();
        // The image is 8x4; each row holds four white then four black pixels.
        let pitch = 8 * 4;
        for row in 0..4 {
            let row_bytes = &out[row * pitch..(row + 1) * pitch];
            assert!(row_bytes[0..16].iter().all(|&byte| byte == 0xFF));
            for pixel in row_bytes[16..32].chunks_exact(4) {
                assert_eq!(pixel, [0, 0, 0, 0xFF]);
            }
        }
    }

    #[test]
    fn test_walker_aborts_on_invalid_block() {
        // Second block is an ETC1 bitstream with overflowing deltas.
        let good = [0x88, 0x88, 0x88, 0x00, 0, 0, 0, 0];
        let bad = [0x04, 0x00, 0x00, 0x02, 0, 0, 0, 0];
        let mut data = [0u8; 16];
        data[0..8].copy_from_slice(&good);
        data[8..16].copy_from_slice(&bad);
        let mut out = [0u8; 2 * 64];
        assert_eq!(
            decompress_texture_tiled(&data, TextureFormat::Etc1, 2, 1, &mut out, PixelFormat::RGBA8),
            Err(DecodeError::InvalidBlock)
        );
        // The first tile was written before the abort.
        assert_eq!(&out[0..4], &[0x8A, 0x8A, 0x8A, 0xFF]);
    }

    #[test]
    fn test_walker_buffer_validation() {
        let mut out = [0u8; 64];
        assert!(matches!(
            decompress_texture_tiled(
                &[0u8; 8],
                TextureFormat::Bc1,
                2,
                1,
                &mut out,
                PixelFormat::RGBA8
            ),
            Err(DecodeError::TruncatedInput { .. })
        ));
        assert!(matches!(
            decompress_texture_linear(
                &[0u8; 16],
                TextureFormat::Bc1,
                2,
                1,
                &mut out,
                PixelFormat::RGBA8
            ),
            Err(DecodeError::OutputTooSmall { .. })
        ));
    }

    #[test]
    fn test_concurrent_decodes_are_identical() {
        // The decoders are stateless; decoding the same block from several
        // threads into disjoint buffers is bit-identical.
        let gradient = [0xE0, 0xFF, 0x1F, 0x00, 0x00, 0x55, 0xAA, 0xFF];
        let mut reference = [0u8; 64];
        decompress_block(
            &gradient,
            TextureFormat::Bc1,
            ModeMask::ALL,
            DecompressFlags::EMPTY,
            &mut reference,
            PixelFormat::RGBA8,
        )
        .unwrap();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                std::thread::spawn(move || {
                    let mut out = [0u8; 64];
                    decompress_block(
                        &gradient,
                        TextureFormat::Bc1,
                        ModeMask::ALL,
                        DecompressFlags::EMPTY,
                        &mut out,
                        PixelFormat::RGBA8,
                    )
                    .unwrap();
                    out
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), reference);
        }
    }

    #[test]
    fn test_every_format_decodes_zero_or_reports_invalid() {
        // Every family decoder accepts its block size and either decodes an
        // all-zero block or reports a structural error, never panics.
        for format in TextureFormat::ALL {
            let data = [0u8; 16];
            let mut out = [0u8; MAX_BLOCK_SIZE];
            let result = decompress_block(
                &data[..format.block_size()],
                format,
                ModeMask::ALL,
                DecompressFlags::EMPTY,
                &mut out,
                format.pixel_format(),
            );
            match format {
                TextureFormat::Bptc => assert_eq!(result, Err(DecodeError::InvalidBlock)),
                _ => assert!(result.is_ok(), "{format:?}: {result:?}"),
            }
        }
    }
}
