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

//! Lossless pixel-format conversion.
//!
//! Only same-precision reshuffles are supported: component reordering
//! (RGB vs BGR), dropping an alpha component, and inserting an opaque one.
//! Anything that would change the pixel size or component depth is
//! rejected.

use crate::error::DecodeError;
use crate::pixel::PixelFormat;
use bytemuck::{bytes_of, pod_read_unaligned};

/// The supported conversion shapes.
enum Conversion {
    /// Source and target layout are identical.
    Copy,
    /// 32-bit pixels with 8-bit components: reorder and rewrite alpha.
    Reshuffle8 {
        swap_red_blue: bool,
        source_alpha: bool,
        target_alpha: bool,
    },
    /// 64-bit pixels with 16-bit lanes: swap lanes 0 and 2.
    SwapWide,
}

const PACKED_8BIT: [PixelFormat; 4] = [
    PixelFormat::RGBA8,
    PixelFormat::BGRA8,
    PixelFormat::RGBX8,
    PixelFormat::BGRX8,
];

fn classify(
    source_format: PixelFormat,
    target_format: PixelFormat,
) -> Result<Conversion, DecodeError> {
    if source_format == target_format {
        return Ok(Conversion::Copy);
    }
    if PACKED_8BIT.contains(&source_format) && PACKED_8BIT.contains(&target_format) {
        return Ok(Conversion::Reshuffle8 {
            swap_red_blue: source_format.is_bgr() != target_format.is_bgr(),
            source_alpha: source_format.has_alpha(),
            target_alpha: target_format.has_alpha(),
        });
    }
    // Half-float RGBX pairs convert by lane swap when only the component
    // order differs.
    if source_format.is_float()
        && target_format.is_float()
        && source_format.is_signed() == target_format.is_signed()
        && source_format.pixel_size() == 8
        && target_format.pixel_size() == 8
    {
        return Ok(Conversion::SwapWide);
    }
    Err(DecodeError::UnsupportedConversion {
        native: source_format,
        requested: target_format,
    })
}

/// Converts `pixel_count` pixels from `source_format` to `target_format`.
///
/// Both buffers must hold at least `pixel_count` pixels of their respective
/// formats. Returns an error for conversions that would change precision or
/// pixel size.
pub fn convert_pixels(
    source: &[u8],
    source_format: PixelFormat,
    target: &mut [u8],
    target_format: PixelFormat,
    pixel_count: usize,
) -> Result<(), DecodeError> {
    let conversion = classify(source_format, target_format)?;
    let source_bytes = pixel_count * source_format.pixel_size();
    if source.len() < source_bytes {
        return Err(DecodeError::TruncatedInput {
            expected: source_bytes,
            actual: source.len(),
        });
    }
    let target_bytes = pixel_count * target_format.pixel_size();
    if target.len() < target_bytes {
        return Err(DecodeError::OutputTooSmall {
            expected: target_bytes,
            actual: target.len(),
        });
    }
    match conversion {
        Conversion::Copy => {
            target[..target_bytes].copy_from_slice(&source[..source_bytes]);
        }
        Conversion::Reshuffle8 {
            swap_red_blue,
            source_alpha,
            target_alpha,
        } => {
            for (src, dst) in source[..source_bytes]
                .chunks_exact(4)
                .zip(target[..target_bytes].chunks_exact_mut(4))
            {
                let (c0, c2) = if swap_red_blue {
                    (src[2], src[0])
                } else {
                    (src[0], src[2])
                };
                dst[0] = c0;
                dst[1] = src[1];
                dst[2] = c2;
                // The fourth byte carries alpha only when both formats have
                // it; inserting alpha or padding an X lane writes 0xFF.
                dst[3] = if source_alpha && target_alpha {
                    src[3]
                } else {
                    0xFF
                };
            }
        }
        Conversion::SwapWide => {
            // 16-bit lane access assumes the little-endian host the pixel
            // packing helpers are defined for.
            for (src, dst) in source[..source_bytes]
                .chunks_exact(8)
                .zip(target[..target_bytes].chunks_exact_mut(8))
            {
                let mut lanes: [u16; 4] = pod_read_unaligned(src);
                lanes.swap(0, 2);
                dst.copy_from_slice(bytes_of(&lanes));
            }
        }
    }
    Ok(())
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba_bgra_round_trip() {
        let source = [1u8, 2, 3, 4, 5, 6, 7, 8];
        let mut swapped = [0u8; 8];
        convert_pixels(&source, PixelFormat::RGBA8, &mut swapped, PixelFormat::BGRA8, 2).unwrap();
        assert_eq!(swapped, [3, 2, 1, 4, 7, 6, 5, 8]);
        let mut restored = [0u8; 8];
        convert_pixels(&swapped, PixelFormat::BGRA8, &mut restored, PixelFormat::RGBA8, 2)
            .unwrap();
        assert_eq!(restored, source);
    }

    #[test]
    fn test_identity_copy() {
        let source = [9u8, 8, 7, 6];
        let mut target = [0u8; 4];
        convert_pixels(&source, PixelFormat::RGBA8, &mut target, PixelFormat::RGBA8, 1).unwrap();
        assert_eq!(target, source);
    }

    #[test]
    fn test_insert_opaque_alpha() {
        let source = [10u8, 20, 30, 99];
        let mut target = [0u8; 4];
        convert_pixels(&source, PixelFormat::RGBX8, &mut target, PixelFormat::RGBA8, 1).unwrap();
        assert_eq!(target, [10, 20, 30, 0xFF]);
    }

    #[test]
    fn test_drop_alpha_pads_with_opaque() {
        let source = [10u8, 20, 30, 42];
        let mut target = [0u8; 4];
        convert_pixels(&source, PixelFormat::RGBA8, &mut target, PixelFormat::BGRX8, 1).unwrap();
        assert_eq!(target, [30, 20, 10, 0xFF]);
    }

    #[test]
    fn test_float_lane_swap() {
        let source = [0x11u8, 0x11, 0x22, 0x22, 0x33, 0x33, 0x00, 0x00];
        let mut target = [0u8; 8];
        convert_pixels(
            &source,
            PixelFormat::FLOAT_RGBX16,
            &mut target,
            PixelFormat::FLOAT_BGRX16,
            1,
        )
        .unwrap();
        assert_eq!(target, [0x33, 0x33, 0x22, 0x22, 0x11, 0x11, 0x00, 0x00]);
    }

    #[test]
    fn test_precision_change_is_rejected() {
        let source = [0u8; 4];
        let mut target = [0u8; 8];
        assert!(matches!(
            convert_pixels(
                &source,
                PixelFormat::RGBA8,
                &mut target,
                PixelFormat::FLOAT_RGBX16,
                1
            ),
            Err(DecodeError::UnsupportedConversion { .. })
        ));
        let mut r16 = [0u8; 2];
        assert!(matches!(
            convert_pixels(&source[..1], PixelFormat::R8, &mut r16, PixelFormat::R16, 1),
            Err(DecodeError::UnsupportedConversion { .. })
        ));
    }

    #[test]
    fn test_signedness_mismatch_is_rejected() {
        let source = [0u8; 8];
        let mut target = [0u8; 8];
        assert!(matches!(
            convert_pixels(
                &source,
                PixelFormat::FLOAT_RGBX16,
                &mut target,
                PixelFormat::SIGNED_FLOAT_BGRX16,
                1
            ),
            Err(DecodeError::UnsupportedConversion { .. })
        ));
    }

    #[test]
    fn test_buffer_checks() {
        let source = [0u8; 4];
        let mut target = [0u8; 4];
        assert!(matches!(
            convert_pixels(&source, PixelFormat::RGBA8, &mut target, PixelFormat::BGRA8, 2),
            Err(DecodeError::TruncatedInput { .. })
        ));
        let big_source = [0u8; 8];
        assert!(matches!(
            convert_pixels(
                &big_source,
                PixelFormat::RGBA8,
                &mut target,
                PixelFormat::BGRA8,
                2
            ),
            Err(DecodeError::OutputTooSmall { .. })
        ));
    }
}
