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

//! Mode masks and policy flags controlling which blocks decode successfully.

use crate::tessera_bitflags;

/// The internal paint mode of an ETC-family block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EtcMode {
    /// Two 4-bit-per-channel base colors, one per half.
    Individual,
    /// A 5-bit base color plus a 3-bit signed delta for the second half.
    Differential,
    /// Two paint colors with a distance table (red-overflow encoding).
    T,
    /// Two paint colors with a split distance field (green-overflow encoding).
    H,
    /// Three corner colors interpolated across the block (blue-overflow encoding).
    Planar,
}

impl EtcMode {
    /// Returns the mode-mask bit corresponding to this mode.
    #[inline]
    pub const fn mode_mask(self) -> ModeMask {
        match self {
            EtcMode::Individual => ModeMask::ETC_INDIVIDUAL,
            EtcMode::Differential => ModeMask::ETC_DIFFERENTIAL,
            EtcMode::T => ModeMask::ETC_T,
            EtcMode::H => ModeMask::ETC_H,
            EtcMode::Planar => ModeMask::ETC_PLANAR,
        }
    }
}

tessera_bitflags! {
    /// Selects which internal codec sub-modes a decode accepts.
    ///
    /// A block whose internal mode is not in the mask is reported as
    /// rejected without being fully reconstructed. Each codec family defines
    /// its own bit layout; `ALL` permits every mode of every family.
    pub struct ModeMask: u32 {
        /// ETC individual mode.
        const ETC_INDIVIDUAL = 0x1;
        /// ETC differential mode.
        const ETC_DIFFERENTIAL = 0x2;
        /// ETC2 T mode.
        const ETC_T = 0x4;
        /// ETC2 H mode.
        const ETC_H = 0x8;
        /// ETC2 planar mode.
        const ETC_PLANAR = 0x10;
        /// Every mode an ETC1 block can use.
        const ALL_MODES_ETC1 = 0x3;
        /// Every mode an ETC2 block can use.
        const ALL_MODES_ETC2 = 0x1F;
        /// Every mode an ETC2 punchthrough block can use (individual mode
        /// does not exist in that format).
        const ALL_MODES_ETC2_PUNCHTHROUGH = 0x1E;
        /// Every BPTC (BC7) mode; mode `n` is bit `n`.
        const ALL_MODES_BPTC = 0xFF;
        /// Every BPTC_FLOAT (BC6H) mode; mode `n` is bit `n - 1`.
        const ALL_MODES_BPTC_FLOAT = 0x3FFF;
        /// Every mode of every codec family.
        const ALL = 0xFFFF_FFFF;
    }
}

impl ModeMask {
    /// Returns `true` if the numbered mode bit is permitted.
    #[inline]
    pub const fn allows(self, mode_index: u32) -> bool {
        self.bits & (1 << mode_index) != 0
    }
}

tessera_bitflags! {
    /// Independent policy bits applied on top of the mode mask.
    pub struct DecompressFlags: u32 {
        /// Reject blocks encoded in a way no conforming encoder emits.
        const ENCODE = 0x1;
        /// Reject blocks encoded in a non-opaque mode, for formats that
        /// distinguish opaque and non-opaque modes.
        const OPAQUE_ONLY = 0x2;
        /// Reject blocks encoded in an opaque mode, for formats that
        /// distinguish opaque and non-opaque modes.
        const NON_OPAQUE_ONLY = 0x4;
    }
}

tessera_bitflags! {
    /// Describes the post-decode character of a block for [`set_mode_etc1`].
    ///
    /// [`set_mode_etc1`]: crate::codec::etc::set_mode_etc1
    pub struct SetModeFlags: u32 {
        /// Alpha is 0xFF for every pixel of the block.
        const OPAQUE = 0x2;
        /// Alpha is not 0xFF for at least one pixel.
        const NON_OPAQUE = 0x4;
        /// Alpha is either 0x00 or 0xFF for every pixel.
        const PUNCHTHROUGH = 0x8;
        /// The block contains at most two distinct pixel colors.
        const MAX_TWO_COLORS = 0x10;
    }
}
