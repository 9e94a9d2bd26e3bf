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

//! Per-family block decoders.
//!
//! Every decoder takes one compressed block, a mode mask, policy flags and a
//! caller-supplied output buffer, and emits sixteen pixels (one 4x4 block,
//! row-major) in the family's natural output format. Decoding never
//! allocates; on error the output buffer contents are unspecified.

pub mod bptc;
pub mod bptc_float;
pub mod eac;
pub mod etc;
pub mod rgtc;
pub mod s3tc;

pub use self::bptc::decompress_block_bptc;
pub use self::bptc_float::{decompress_block_bptc_float, decompress_block_bptc_signed_float};
pub use self::eac::{
    decompress_block_eac_r11, decompress_block_eac_rg11, decompress_block_eac_signed_r11,
    decompress_block_eac_signed_rg11,
};
pub use self::etc::{
    decompress_block_etc1, decompress_block_etc2, decompress_block_etc2_eac,
    decompress_block_etc2_punchthrough, get_mode_etc1, get_mode_etc2, get_mode_etc2_eac,
    get_mode_etc2_punchthrough, set_mode_etc1,
};
pub use self::rgtc::{
    decompress_block_rgtc1, decompress_block_rgtc2, decompress_block_signed_rgtc1,
    decompress_block_signed_rgtc2,
};
pub use self::s3tc::{
    decompress_block_bc1, decompress_block_bc1a, decompress_block_bc2, decompress_block_bc3,
};

use crate::error::DecodeError;

/// Borrows the input slice as an 8-byte block.
pub(crate) fn block8(bitstring: &[u8]) -> Result<&[u8; 8], DecodeError> {
    bitstring
        .get(0..8)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or(DecodeError::TruncatedInput {
            expected: 8,
            actual: bitstring.len(),
        })
}

/// Borrows the input slice as a 16-byte block.
pub(crate) fn block16(bitstring: &[u8]) -> Result<&[u8; 16], DecodeError> {
    bitstring
        .get(0..16)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or(DecodeError::TruncatedInput {
            expected: 16,
            actual: bitstring.len(),
        })
}

/// Checks that the output buffer can hold `expected` bytes.
pub(crate) fn require_output(buffer: &[u8], expected: usize) -> Result<(), DecodeError> {
    if buffer.len() < expected {
        return Err(DecodeError::OutputTooSmall {
            expected,
            actual: buffer.len(),
        });
    }
    Ok(())
}
