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

//! The closed enumeration of supported compressed texture formats.

use crate::pixel::PixelFormat;

/// Identifies one supported block-compression codec.
///
/// The numeric values are stable (`Bc1` is 0 by convention) but callers
/// should treat them as opaque tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum TextureFormat {
    /// S3TC BC1: 5-6-5 endpoints, 2-bit indices, opaque output.
    Bc1 = 0,
    /// BC1 with 1-bit punchthrough alpha in the three-color mode.
    Bc1a,
    /// BC2: explicit 4-bit alpha plus a BC1 color payload.
    Bc2,
    /// BC3: interpolated 8-bit alpha plus a BC1 color payload.
    Bc3,
    /// RGTC1 (BC4): one unsigned interpolated channel.
    Rgtc1,
    /// Signed RGTC1 (signed BC4).
    SignedRgtc1,
    /// RGTC2 (BC5): two independent unsigned channels.
    Rgtc2,
    /// Signed RGTC2 (signed BC5).
    SignedRgtc2,
    /// BPTC_FLOAT (BC6H): unsigned half-float RGB.
    BptcFloat,
    /// BPTC_SIGNED_FLOAT (BC6H): signed half-float RGB.
    BptcSignedFloat,
    /// BPTC (BC7): 8-mode RGBA.
    Bptc,
    /// ETC1: individual/differential RGB.
    Etc1,
    /// ETC2 RGB: ETC1 plus T, H and planar modes.
    Etc2,
    /// ETC2 RGB with punchthrough alpha.
    Etc2Punchthrough,
    /// ETC2 RGB with an EAC alpha channel.
    Etc2Eac,
    /// EAC R11: one unsigned 11-bit channel.
    EacR11,
    /// EAC signed R11.
    EacSignedR11,
    /// EAC RG11: two unsigned 11-bit channels.
    EacRg11,
    /// EAC signed RG11.
    EacSignedRg11,
}

impl TextureFormat {
    /// Every supported format, in tag order.
    pub const ALL: [TextureFormat; 19] = [
        TextureFormat::Bc1,
        TextureFormat::Bc1a,
        TextureFormat::Bc2,
        TextureFormat::Bc3,
        TextureFormat::Rgtc1,
        TextureFormat::SignedRgtc1,
        TextureFormat::Rgtc2,
        TextureFormat::SignedRgtc2,
        TextureFormat::BptcFloat,
        TextureFormat::BptcSignedFloat,
        TextureFormat::Bptc,
        TextureFormat::Etc1,
        TextureFormat::Etc2,
        TextureFormat::Etc2Punchthrough,
        TextureFormat::Etc2Eac,
        TextureFormat::EacR11,
        TextureFormat::EacSignedR11,
        TextureFormat::EacRg11,
        TextureFormat::EacSignedRg11,
    ];

    /// Returns the size of one compressed block in bytes (8 or 16).
    pub const fn block_size(self) -> usize {
        match self {
            TextureFormat::Bc1
            | TextureFormat::Bc1a
            | TextureFormat::Rgtc1
            | TextureFormat::SignedRgtc1
            | TextureFormat::Etc1
            | TextureFormat::Etc2
            | TextureFormat::Etc2Punchthrough
            | TextureFormat::EacR11
            | TextureFormat::EacSignedR11 => 8,
            TextureFormat::Bc2
            | TextureFormat::Bc3
            | TextureFormat::Rgtc2
            | TextureFormat::SignedRgtc2
            | TextureFormat::BptcFloat
            | TextureFormat::BptcSignedFloat
            | TextureFormat::Bptc
            | TextureFormat::Etc2Eac
            | TextureFormat::EacRg11
            | TextureFormat::EacSignedRg11 => 16,
        }
    }

    /// Returns the pixel format the family decoder natively produces.
    pub const fn pixel_format(self) -> PixelFormat {
        match self {
            TextureFormat::Bc1
            | TextureFormat::Bc1a
            | TextureFormat::Bc2
            | TextureFormat::Bc3
            | TextureFormat::Bptc
            | TextureFormat::Etc1
            | TextureFormat::Etc2
            | TextureFormat::Etc2Punchthrough
            | TextureFormat::Etc2Eac => PixelFormat::RGBA8,
            TextureFormat::Rgtc1 => PixelFormat::R8,
            TextureFormat::Rgtc2 => PixelFormat::RG8,
            TextureFormat::SignedRgtc1 => PixelFormat::SIGNED_R16,
            TextureFormat::SignedRgtc2 => PixelFormat::SIGNED_RG16,
            TextureFormat::EacR11 => PixelFormat::R16,
            TextureFormat::EacSignedR11 => PixelFormat::SIGNED_R16,
            TextureFormat::EacRg11 => PixelFormat::RG16,
            TextureFormat::EacSignedRg11 => PixelFormat::SIGNED_RG16,
            TextureFormat::BptcFloat => PixelFormat::FLOAT_RGBX16,
            TextureFormat::BptcSignedFloat => PixelFormat::SIGNED_FLOAT_RGBX16,
        }
    }
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bc1_is_zero() {
        assert_eq!(TextureFormat::Bc1 as u32, 0);
    }

    #[test]
    fn test_block_sizes() {
        for format in TextureFormat::ALL {
            let size = format.block_size();
            assert!(size == 8 || size == 16, "{format:?}");
        }
        assert_eq!(TextureFormat::Etc1.block_size(), 8);
        assert_eq!(TextureFormat::Etc2Eac.block_size(), 16);
        assert_eq!(TextureFormat::Bptc.block_size(), 16);
        assert_eq!(TextureFormat::EacR11.block_size(), 8);
        assert_eq!(TextureFormat::EacRg11.block_size(), 16);
    }

    #[test]
    fn test_native_pixel_formats_are_valid() {
        for format in TextureFormat::ALL {
            assert!(format.pixel_format().is_valid(), "{format:?}");
        }
    }

    #[test]
    fn test_tag_order_matches_all() {
        for (i, format) in TextureFormat::ALL.iter().enumerate() {
            assert_eq!(*format as u32, i as u32);
        }
    }
}
