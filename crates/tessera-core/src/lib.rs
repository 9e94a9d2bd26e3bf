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

//! # Tessera Core
//!
//! Decoder for GPU block-compressed texture data: the S3TC/RGTC/BPTC family
//! (BC1 through BC7, including BC6H half-float) and the ETC1/ETC2/EAC
//! family, decoded one 4x4 block at a time or as whole tiled/linear
//! textures.
//!
//! Every decode is a pure function over caller-provided slices: no
//! allocation, no shared state, safe to run from any number of threads as
//! long as output buffers are not shared.
//!
//! ```
//! use tessera_core::{
//!     decompress_block, DecompressFlags, ModeMask, PixelFormat, TextureFormat,
//! };
//!
//! // A BC1 block with both endpoints white decodes to sixteen opaque
//! // white pixels.
//! let block = [0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00];
//! let mut pixels = [0u8; 64];
//! decompress_block(
//!     &block,
//!     TextureFormat::Bc1,
//!     ModeMask::ALL,
//!     DecompressFlags::EMPTY,
//!     &mut pixels,
//!     PixelFormat::RGBA8,
//! )
//! .unwrap();
//! assert!(pixels.iter().all(|&byte| byte == 0xFF));
//! ```

#![warn(missing_docs)]

pub mod bits;
pub mod codec;
pub mod error;
pub mod format;
pub mod mode;
pub mod pixel;
pub mod texture;
pub mod util;

pub use error::DecodeError;
pub use format::TextureFormat;
pub use mode::{DecompressFlags, EtcMode, ModeMask, SetModeFlags};
pub use pixel::convert::convert_pixels;
pub use pixel::PixelFormat;
pub use texture::{decompress_block, decompress_texture_linear, decompress_texture_tiled};

/// The largest decoded 4x4 block size in bytes over all output formats
/// (sixteen 64-bit pixels).
pub const MAX_BLOCK_SIZE: usize = 128;
