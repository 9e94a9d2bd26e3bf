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

//! BPTC (BC7) decoder. Output is RGBA8.
//!
//! A block's mode is the position of the lowest set bit of its first byte.
//! Each mode fixes the subset count, partition/rotation/index-selection
//! fields, endpoint precision, P-bit placement and index widths; the
//! partition, anchor and weight tables are fixed constants from the format
//! specification.

use super::{block16, require_output};
use crate::bits::{BitReader, Block128};
use crate::error::DecodeError;
use crate::mode::{DecompressFlags, ModeMask};
use crate::pixel::{pack_rgba8, put_pixel32};

/// Per-pixel subset assignment for two-subset partitions.
pub(crate) const PARTITION_2: [[u8; 16]; 64] = [
    [0, 0, 1, 1, 0, 0, 1, 1, 0, 0, 1, 1, 0, 0, 1, 1],
    [0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 1],
    [0, 1, 1, 1, 0, 1, 1, 1, 0, 1, 1, 1, 0, 1, 1, 1],
    [0, 0, 0, 1, 0, 0, 1, 1, 0, 0, 1, 1, 0, 1, 1, 1],
    [0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 1, 1],
    [0, 0, 1, 1, 0, 1, 1, 1, 0, 1, 1, 1, 1, 1, 1, 1],
    [0, 0, 0, 1, 0, 0, 1, 1, 0, 1, 1, 1, 1, 1, 1, 1],
    [0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 1, 1, 0, 1, 1, 1],
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 1, 1],
    [0, 0, 1, 1, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
    [0, 0, 0, 0, 0, 0, 0, 1, 0, 1, 1, 1, 1, 1, 1, 1],
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 1, 1, 1],
    [0, 0, 0, 1, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
    [0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 1, 1, 1],
    [0, 0, 0, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1],
    [0, 0, 0, 0, 1, 0, 0, 0, 1, 1, 1, 0, 1, 1, 1, 1],
    [0, 1, 1, 1, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 1, 1, 1, 0],
    [0, 1, 1, 1, 0, 0, 1, 1, 0, 0, 0, 1, 0, 0, 0, 0],
    [0, 0, 1, 1, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 1, 0, 0, 0, 1, 1, 0, 0, 1, 1, 1, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 1, 1, 0, 0],
    [0, 1, 1, 1, 0, 0, 1, 1, 0, 0, 1, 1, 0, 0, 0, 1],
    [0, 0, 1, 1, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 0],
    [0, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 1, 1, 0, 0],
    [0, 1, 1, 0, 0, 1, 1, 0, 0, 1, 1, 0, 0, 1, 1, 0],
    [0, 0, 1, 1, 0, 1, 1, 0, 0, 1, 1, 0, 1, 1, 0, 0],
    [0, 0, 0, 1, 0, 1, 1, 1, 1, 1, 1, 0, 1, 0, 0, 0],
    [0, 0, 0, 0, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0],
    [0, 1, 1, 1, 0, 0, 0, 1, 1, 0, 0, 0, 1, 1, 1, 0],
    [0, 0, 1, 1, 1, 0, 0, 1, 1, 0, 0, 1, 1, 1, 0, 0],
    [0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1],
    [0, 0, 0, 0, 1, 1, 1, 1, 0, 0, 0, 0, 1, 1, 1, 1],
    [0, 1, 0, 1, 1, 0, 1, 0, 0, 1, 0, 1, 1, 0, 1, 0],
    [0, 0, 1, 1, 0, 0, 1, 1, 1, 1, 0, 0, 1, 1, 0, 0],
    [0, 0, 1, 1, 1, 1, 0, 0, 0, 0, 1, 1, 1, 1, 0, 0],
    [0, 1, 0, 1, 0, 1, 0, 1, 1, 0, 1, 0, 1, 0, 1, 0],
    [0, 1, 1, 0, 1, 0, 0, 1, 0, 1, 1, 0, 1, 0, 0, 1],
    [0, 1, 0, 1, 1, 0, 1, 0, 1, 0, 1, 0, 0, 1, 0, 1],
    [0, 1, 1, 1, 0, 0, 1, 1, 1, 1, 0, 0, 1, 1, 1, 0],
    [0, 0, 0, 1, 0, 0, 1, 1, 1, 1, 0, 0, 1, 0, 0, 0],
    [0, 0, 1, 1, 0, 0, 1, 0, 0, 1, 0, 0, 1, 1, 0, 0],
    [0, 0, 1, 1, 1, 0, 1, 1, 1, 1, 0, 1, 1, 1, 0, 0],
    [0, 1, 1, 0, 1, 0, 0, 1, 1, 0, 0, 1, 0, 1, 1, 0],
    [0, 0, 1, 1, 1, 1, 0, 0, 1, 1, 0, 0, 0, 0, 1, 1],
    [0, 1, 1, 0, 0, 1, 1, 0, 1, 0, 0, 1, 1, 0, 0, 1],
    [0, 0, 0, 0, 0, 1, 1, 0, 0, 1, 1, 0, 0, 0, 0, 0],
    [0, 1, 0, 0, 1, 1, 1, 0, 0, 1, 0, 0, 0, 0, 0, 0],
    [0, 0, 1, 0, 0, 1, 1, 1, 0, 0, 1, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 1, 0, 0, 1, 1, 1, 0, 0, 1, 0],
    [0, 0, 0, 0, 0, 1, 0, 0, 1, 1, 1, 0, 0, 1, 0, 0],
    [0, 1, 1, 0, 1, 1, 0, 0, 1, 0, 0, 1, 0, 0, 1, 1],
    [0, 0, 1, 1, 0, 1, 1, 0, 1, 1, 0, 0, 1, 0, 0, 1],
    [0, 1, 1, 0, 0, 0, 1, 1, 1, 0, 0, 1, 1, 1, 0, 0],
    [0, 0, 1, 1, 1, 0, 0, 1, 1, 1, 0, 0, 0, 1, 1, 0],
    [0, 1, 1, 0, 1, 1, 0, 0, 1, 1, 0, 0, 1, 0, 0, 1],
    [0, 1, 1, 0, 0, 0, 1, 1, 0, 0, 1, 1, 1, 0, 0, 1],
    [0, 1, 1, 1, 1, 1, 1, 0, 1, 0, 0, 0, 0, 0, 0, 1],
    [0, 0, 0, 1, 1, 0, 0, 0, 1, 1, 1, 0, 0, 1, 1, 1],
    [0, 0, 0, 0, 1, 1, 1, 1, 0, 0, 1, 1, 0, 0, 1, 1],
    [0, 0, 1, 1, 0, 0, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0],
    [0, 0, 1, 0, 0, 0, 1, 0, 1, 1, 1, 0, 1, 1, 1, 0],
    [0, 1, 0, 0, 0, 1, 0, 0, 1, 1, 1, 0, 1, 1, 1, 0],
];

/// Per-pixel subset assignment for three-subset partitions.
const PARTITION_3: [[u8; 16]; 64] = [
    [0, 0, 1, 1, 0, 0, 1, 1, 0, 2, 2, 1, 2, 2, 2, 2],
    [0, 0, 0, 1, 0, 0, 1, 1, 2, 2, 1, 1, 2, 2, 2, 1],
    [0, 0, 0, 0, 2, 0, 0, 1, 2, 2, 1, 1, 2, 2, 1, 1],
    [0, 2, 2, 2, 0, 0, 2, 2, 0, 0, 1, 1, 0, 1, 1, 1],
    [0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 2, 2, 1, 1, 2, 2],
    [0, 0, 1, 1, 0, 0, 1, 1, 0, 0, 2, 2, 0, 0, 2, 2],
    [0, 0, 2, 2, 0, 0, 2, 2, 1, 1, 1, 1, 1, 1, 1, 1],
    [0, 0, 1, 1, 0, 0, 1, 1, 2, 2, 1, 1, 2, 2, 1, 1],
    [0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2],
    [0, 0, 0, 0, 1, 1, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2],
    [0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 2, 2],
    [0, 0, 1, 2, 0, 0, 1, 2, 0, 0, 1, 2, 0, 0, 1, 2],
    [0, 1, 1, 2, 0, 1, 1, 2, 0, 1, 1, 2, 0, 1, 1, 2],
    [0, 1, 2, 2, 0, 1, 2, 2, 0, 1, 2, 2, 0, 1, 2, 2],
    [0, 0, 1, 1, 0, 1, 1, 2, 1, 1, 2, 2, 1, 2, 2, 2],
    [0, 0, 1, 1, 2, 0, 0, 1, 2, 2, 0, 0, 2, 2, 2, 0],
    [0, 0, 0, 1, 0, 0, 1, 1, 0, 1, 1, 2, 1, 1, 2, 2],
    [0, 1, 1, 1, 0, 0, 1, 1, 2, 0, 0, 1, 2, 2, 0, 0],
    [0, 0, 0, 0, 1, 1, 2, 2, 1, 1, 2, 2, 1, 1, 2, 2],
    [0, 0, 2, 2, 0, 0, 2, 2, 0, 0, 2, 2, 1, 1, 1, 1],
    [0, 1, 1, 1, 0, 1, 1, 1, 0, 2, 2, 2, 0, 2, 2, 2],
    [0, 0, 0, 1, 0, 0, 0, 1, 2, 2, 2, 1, 2, 2, 2, 1],
    [0, 0, 0, 0, 0, 0, 1, 1, 0, 1, 2, 2, 0, 1, 2, 2],
    [0, 0, 0, 0, 1, 1, 0, 0, 2, 2, 1, 0, 2, 2, 1, 0],
    [0, 1, 2, 2, 0, 1, 2, 2, 0, 0, 1, 1, 0, 0, 0, 0],
    [0, 0, 1, 2, 0, 0, 1, 2, 1, 1, 2, 2, 2, 2, 2, 2],
    [0, 1, 1, 0, 1, 2, 2, 1, 1, 2, 2, 1, 0, 1, 1, 0],
    [0, 0, 0, 0, 0, 1, 1, 0, 1, 2, 2, 1, 1, 2, 2, 1],
    [0, 0, 2, 2, 1, 1, 0, 2, 1, 1, 0, 2, 0, 0, 2, 2],
    [0, 1, 1, 0, 0, 1, 1, 0, 2, 0, 0, 2, 2, 2, 2, 2],
    [0, 0, 1, 1, 0, 1, 2, 2, 0, 1, 2, 2, 0, 0, 1, 1],
    [0, 0, 0, 0, 2, 0, 0, 0, 2, 2, 1, 1, 2, 2, 2, 1],
    [0, 0, 0, 0, 0, 0, 0, 2, 1, 1, 2, 2, 1, 2, 2, 2],
    [0, 2, 2, 2, 0, 0, 2, 2, 0, 0, 1, 2, 0, 0, 1, 1],
    [0, 0, 1, 1, 0, 0, 1, 2, 0, 0, 2, 2, 0, 2, 2, 2],
    [0, 1, 2, 0, 0, 1, 2, 0, 0, 1, 2, 0, 0, 1, 2, 0],
    [0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 0, 0, 0, 0],
    [0, 1, 2, 0, 1, 2, 0, 1, 2, 0, 1, 2, 0, 1, 2, 0],
    [0, 1, 2, 0, 2, 0, 1, 2, 1, 2, 0, 1, 0, 1, 2, 0],
    [0, 0, 1, 1, 2, 2, 0, 0, 1, 1, 2, 2, 0, 0, 1, 1],
    [0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 0, 0, 0, 0, 1, 1],
    [0, 1, 0, 1, 0, 1, 0, 1, 2, 2, 2, 2, 2, 2, 2, 2],
    [0, 0, 0, 0, 0, 0, 0, 0, 2, 1, 2, 1, 2, 1, 2, 1],
    [0, 0, 2, 2, 1, 1, 2, 2, 0, 0, 2, 2, 1, 1, 2, 2],
    [0, 0, 2, 2, 0, 0, 1, 1, 0, 0, 2, 2, 0, 0, 1, 1],
    [0, 2, 2, 0, 1, 2, 2, 1, 0, 2, 2, 0, 1, 2, 2, 1],
    [0, 1, 0, 1, 2, 2, 2, 2, 2, 2, 2, 2, 0, 1, 0, 1],
    [0, 0, 0, 0, 2, 1, 2, 1, 2, 1, 2, 1, 2, 1, 2, 1],
    [0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 2, 2, 2, 2],
    [0, 2, 2, 2, 0, 1, 1, 1, 0, 2, 2, 2, 0, 1, 1, 1],
    [0, 0, 0, 2, 1, 1, 1, 2, 0, 0, 0, 2, 1, 1, 1, 2],
    [0, 0, 0, 0, 2, 1, 1, 2, 2, 1, 1, 2, 2, 1, 1, 2],
    [0, 2, 2, 2, 0, 1, 1, 1, 0, 1, 1, 1, 0, 2, 2, 2],
    [0, 0, 0, 2, 1, 1, 1, 2, 1, 1, 1, 2, 0, 0, 0, 2],
    [0, 1, 1, 0, 0, 1, 1, 0, 0, 1, 1, 0, 0, 2, 2, 2],
    [0, 0, 0, 0, 0, 0, 0, 0, 2, 1, 1, 2, 2, 1, 1, 2],
    [0, 1, 1, 0, 0, 1, 1, 0, 2, 2, 2, 2, 2, 2, 2, 2],
    [0, 0, 2, 2, 0, 0, 1, 1, 0, 0, 1, 1, 0, 0, 2, 2],
    [0, 0, 2, 2, 1, 1, 2, 2, 1, 1, 2, 2, 0, 0, 2, 2],
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2, 1, 1, 2],
    [0, 0, 0, 2, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0, 1],
    [0, 2, 2, 2, 1, 2, 2, 2, 0, 2, 2, 2, 1, 2, 2, 2],
    [0, 1, 0, 1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2],
    [0, 1, 1, 1, 2, 0, 1, 1, 2, 2, 0, 1, 2, 2, 2, 0],
];

/// Anchor index of the second subset for two-subset partitions.
pub(crate) const ANCHOR_SECOND_SUBSET: [u8; 64] = [
    15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 2, 8, 2, 2, 8, 8, 15, 2,
    8, 2, 2, 8, 8, 2, 2, 15, 15, 6, 8, 2, 8, 15, 15, 2, 8, 2, 2, 2, 15, 15, 6, 6, 2, 6, 8, 15,
    15, 2, 2, 15, 15, 15, 15, 15, 2, 2, 15,
];

/// Anchor index of the second subset for three-subset partitions.
const ANCHOR_SECOND_OF_THREE: [u8; 64] = [
    3, 3, 15, 15, 8, 3, 15, 15, 8, 8, 6, 6, 6, 5, 3, 3, 3, 3, 8, 15, 3, 3, 6, 10, 5, 8, 8, 6, 8,
    5, 15, 15, 8, 15, 3, 5, 6, 10, 8, 15, 15, 3, 15, 5, 15, 15, 15, 15, 3, 15, 5, 5, 5, 8, 5, 10,
    5, 10, 8, 13, 15, 12, 3, 3,
];

/// Anchor index of the third subset for three-subset partitions.
const ANCHOR_THIRD_OF_THREE: [u8; 64] = [
    15, 8, 8, 3, 15, 15, 3, 8, 15, 15, 15, 15, 15, 15, 15, 8, 15, 8, 15, 3, 15, 8, 15, 8, 3, 15,
    6, 10, 15, 15, 10, 8, 15, 3, 15, 10, 10, 8, 9, 10, 6, 15, 8, 15, 3, 6, 6, 8, 15, 3, 15, 15,
    15, 15, 15, 15, 15, 15, 15, 15, 3, 15, 15, 8,
];

/// Interpolation weights for 2-bit indices.
pub(crate) const WEIGHTS_2: [u32; 4] = [0, 21, 43, 64];
/// Interpolation weights for 3-bit indices.
pub(crate) const WEIGHTS_3: [u32; 8] = [0, 9, 18, 27, 37, 46, 55, 64];
/// Interpolation weights for 4-bit indices.
pub(crate) const WEIGHTS_4: [u32; 16] = [0, 4, 9, 13, 17, 21, 26, 30, 34, 38, 43, 47, 51, 55, 60, 64];

/// Interpolates between two endpoint channels with a 6-bit weight.
#[inline]
pub(crate) fn interpolate(e0: u32, e1: u32, weight: u32) -> u32 {
    (e0 * (64 - weight) + e1 * weight + 32) >> 6
}

/// Returns the weight table for an index width of 2, 3 or 4 bits.
#[inline]
pub(crate) fn weight_for(bits: u32, index: u32) -> u32 {
    match bits {
        2 => WEIGHTS_2[index as usize],
        3 => WEIGHTS_3[index as usize],
        _ => WEIGHTS_4[index as usize],
    }
}

/// Fixed per-mode properties of the eight BPTC modes.
struct ModeInfo {
    subsets: u32,
    partition_bits: u32,
    rotation_bits: u32,
    index_selection_bits: u32,
    color_bits: u32,
    alpha_bits: u32,
    endpoint_pbits: bool,
    shared_pbits: bool,
    index_bits: u32,
    secondary_index_bits: u32,
}

const MODES: [ModeInfo; 8] = [
    ModeInfo { subsets: 3, partition_bits: 4, rotation_bits: 0, index_selection_bits: 0, color_bits: 4, alpha_bits: 0, endpoint_pbits: true, shared_pbits: false, index_bits: 3, secondary_index_bits: 0 },
    ModeInfo { subsets: 2, partition_bits: 6, rotation_bits: 0, index_selection_bits: 0, color_bits: 6, alpha_bits: 0, endpoint_pbits: false, shared_pbits: true, index_bits: 3, secondary_index_bits: 0 },
    ModeInfo { subsets: 3, partition_bits: 6, rotation_bits: 0, index_selection_bits: 0, color_bits: 5, alpha_bits: 0, endpoint_pbits: false, shared_pbits: false, index_bits: 2, secondary_index_bits: 0 },
    ModeInfo { subsets: 2, partition_bits: 6, rotation_bits: 0, index_selection_bits: 0, color_bits: 7, alpha_bits: 0, endpoint_pbits: true, shared_pbits: false, index_bits: 2, secondary_index_bits: 0 },
    ModeInfo { subsets: 1, partition_bits: 0, rotation_bits: 2, index_selection_bits: 1, color_bits: 5, alpha_bits: 6, endpoint_pbits: false, shared_pbits: false, index_bits: 2, secondary_index_bits: 3 },
    ModeInfo { subsets: 1, partition_bits: 0, rotation_bits: 2, index_selection_bits: 0, color_bits: 7, alpha_bits: 8, endpoint_pbits: false, shared_pbits: false, index_bits: 2, secondary_index_bits: 2 },
    ModeInfo { subsets: 1, partition_bits: 0, rotation_bits: 0, index_selection_bits: 0, color_bits: 7, alpha_bits: 7, endpoint_pbits: true, shared_pbits: false, index_bits: 4, secondary_index_bits: 0 },
    ModeInfo { subsets: 2, partition_bits: 6, rotation_bits: 0, index_selection_bits: 0, color_bits: 5, alpha_bits: 5, endpoint_pbits: true, shared_pbits: false, index_bits: 2, secondary_index_bits: 0 },
];

/// Expands an endpoint channel to 8 bits by left shift and replication.
#[inline]
fn expand_endpoint(value: u32, bits: u32) -> u32 {
    let shifted = value << (8 - bits);
    shifted | (shifted >> bits)
}

/// Returns the subset a pixel belongs to for the given mode and partition.
#[inline]
fn pixel_subset(subsets: u32, partition: usize, i: usize) -> usize {
    match subsets {
        1 => 0,
        2 => PARTITION_2[partition][i] as usize,
        _ => PARTITION_3[partition][i] as usize,
    }
}

/// Returns `true` if pixel `i` is the anchor of its subset.
fn is_anchor(subsets: u32, partition: usize, i: usize) -> bool {
    match subsets {
        1 => i == 0,
        2 => i == 0 || i == ANCHOR_SECOND_SUBSET[partition] as usize,
        _ => {
            i == 0
                || i == ANCHOR_SECOND_OF_THREE[partition] as usize
                || i == ANCHOR_THIRD_OF_THREE[partition] as usize
        }
    }
}

/// Reads sixteen per-pixel indices; anchor pixels carry one bit less.
fn read_indices(
    reader: &mut BitReader,
    bits: u32,
    subsets: u32,
    partition: usize,
) -> [u32; 16] {
    let mut indices = [0u32; 16];
    for (i, index) in indices.iter_mut().enumerate() {
        let width = if is_anchor(subsets, partition, i) {
            bits - 1
        } else {
            bits
        };
        *index = reader.read(width);
    }
    indices
}

/// Decompresses a 128-bit BPTC (BC7) block. Output is RGBA8.
pub fn decompress_block_bptc(
    bitstring: &[u8],
    mode_mask: ModeMask,
    flags: DecompressFlags,
    pixel_buffer: &mut [u8],
) -> Result<(), DecodeError> {
    let block = block16(bitstring)?;
    require_output(pixel_buffer, 64)?;
    if block[0] == 0 {
        return Err(DecodeError::InvalidBlock);
    }
    let mode_index = block[0].trailing_zeros();
    if !mode_mask.allows(mode_index) {
        return Err(DecodeError::ModeRejected);
    }
    let mode = &MODES[mode_index as usize];
    // Modes without an alpha channel are opaque; the rest are not.
    let opaque_mode = mode.alpha_bits == 0;
    if flags.contains(DecompressFlags::OPAQUE_ONLY) && !opaque_mode {
        return Err(DecodeError::OpacityMismatch);
    }
    if flags.contains(DecompressFlags::NON_OPAQUE_ONLY) && opaque_mode {
        return Err(DecodeError::OpacityMismatch);
    }

    let mut reader = BitReader::new(Block128::load(block));
    reader.skip(mode_index + 1);
    let rotation = reader.read(mode.rotation_bits);
    let index_selection = reader.read(mode.index_selection_bits) != 0;
    let partition = reader.read(mode.partition_bits) as usize;

    let endpoint_count = (2 * mode.subsets) as usize;
    // Endpoints are stored channel-major: all red values, then green, blue
    // and alpha.
    let mut endpoints = [[0u32; 4]; 6];
    for channel in 0..3 {
        for endpoint in endpoints.iter_mut().take(endpoint_count) {
            endpoint[channel] = reader.read(mode.color_bits);
        }
    }
    if mode.alpha_bits > 0 {
        for endpoint in endpoints.iter_mut().take(endpoint_count) {
            endpoint[3] = reader.read(mode.alpha_bits);
        }
    }

    // P-bits pad every endpoint channel with an extra low bit, stored one
    // per endpoint or one per subset.
    let mut color_bits = mode.color_bits;
    let mut alpha_bits = mode.alpha_bits;
    if mode.endpoint_pbits || mode.shared_pbits {
        let mut pbits = [0u32; 6];
        if mode.endpoint_pbits {
            for pbit in pbits.iter_mut().take(endpoint_count) {
                *pbit = reader.read_bit();
            }
        } else {
            let mut shared = [0u32; 3];
            for bit in shared.iter_mut().take(mode.subsets as usize) {
                *bit = reader.read_bit();
            }
            for (e, pbit) in pbits.iter_mut().take(endpoint_count).enumerate() {
                *pbit = shared[e / 2];
            }
        }
        for (e, endpoint) in endpoints.iter_mut().take(endpoint_count).enumerate() {
            for channel in endpoint.iter_mut() {
                *channel = *channel << 1 | pbits[e];
            }
        }
        color_bits += 1;
        if mode.alpha_bits > 0 {
            alpha_bits += 1;
        }
    }

    // Expand every endpoint channel to 8 bits.
    let mut expanded = [[0u32; 4]; 6];
    for (e, endpoint) in endpoints.iter().take(endpoint_count).enumerate() {
        for channel in 0..3 {
            expanded[e][channel] = expand_endpoint(endpoint[channel], color_bits);
        }
        expanded[e][3] = if mode.alpha_bits > 0 {
            expand_endpoint(endpoint[3], alpha_bits)
        } else {
            0xFF
        };
    }

    let primary = read_indices(&mut reader, mode.index_bits, mode.subsets, partition);
    let secondary = if mode.secondary_index_bits > 0 {
        read_indices(&mut reader, mode.secondary_index_bits, mode.subsets, partition)
    } else {
        primary
    };

    for i in 0..16 {
        let subset = pixel_subset(mode.subsets, partition, i);
        let e0 = expanded[2 * subset];
        let e1 = expanded[2 * subset + 1];
        let (color_index, color_index_bits, alpha_index, alpha_index_bits) =
            if mode.secondary_index_bits == 0 {
                (primary[i], mode.index_bits, primary[i], mode.index_bits)
            } else if index_selection {
                // The index-selection bit swaps which index stream drives
                // color and which drives alpha.
                (secondary[i], mode.secondary_index_bits, primary[i], mode.index_bits)
            } else {
                (primary[i], mode.index_bits, secondary[i], mode.secondary_index_bits)
            };
        let color_weight = weight_for(color_index_bits, color_index);
        let alpha_weight = weight_for(alpha_index_bits, alpha_index);
        let mut r = interpolate(e0[0], e1[0], color_weight) as u8;
        let mut g = interpolate(e0[1], e1[1], color_weight) as u8;
        let mut b = interpolate(e0[2], e1[2], color_weight) as u8;
        let mut a = if mode.alpha_bits > 0 {
            interpolate(e0[3], e1[3], alpha_weight) as u8
        } else {
            0xFF
        };
        match rotation {
            1 => core::mem::swap(&mut a, &mut r),
            2 => core::mem::swap(&mut a, &mut g),
            3 => core::mem::swap(&mut a, &mut b),
            _ => {}
        }
        put_pixel32(pixel_buffer, i, pack_rgba8(r, g, b, a));
    }
    Ok(())
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(buffer: &[u8], i: usize) -> [u8; 4] {
        buffer[i * 4..i * 4 + 4].try_into().unwrap()
    }

    #[test]
    fn test_zero_mode_byte_is_invalid() {
        let block = [0u8; 16];
        let mut out = [0u8; 64];
        assert_eq!(
            decompress_block_bptc(&block, ModeMask::ALL, DecompressFlags::EMPTY, &mut out),
            Err(DecodeError::InvalidBlock)
        );
    }

    #[test]
    fn test_mode_mask_rejection() {
        let mut block = [0xFFu8; 16];
        block[0] = 0x01; // mode 0
        let mut out = [0u8; 64];
        assert_eq!(
            decompress_block_bptc(
                &block,
                ModeMask::ALL_MODES_BPTC.without(ModeMask::from_bits(1)),
                DecompressFlags::EMPTY,
                &mut out
            ),
            Err(DecodeError::ModeRejected)
        );
    }

    #[test]
    fn test_mode0_identical_endpoints_paint_one_color() {
        // Mode 0 with every endpoint and P-bit set: all palette entries
        // expand to 0xFF regardless of partition or index bits.
        let mut block = [0xFFu8; 16];
        block[0] = 0x01;
        let mut out = [0u8; 64];
        decompress_block_bptc(&block, ModeMask::ALL, DecompressFlags::EMPTY, &mut out).unwrap();
        for i in 0..16 {
            assert_eq!(pixel(&out, i), [0xFF, 0xFF, 0xFF, 0xFF]);
        }
    }

    #[test]
    fn test_mode5_zero_block_is_transparent_black() {
        // Mode 5 (0x20) with every endpoint and index bit zero: both alpha
        // endpoints are zero, so every pixel is transparent black.
        let mut block = [0u8; 16];
        block[0] = 0x20;
        let mut out = [0u8; 64];
        decompress_block_bptc(&block, ModeMask::ALL, DecompressFlags::EMPTY, &mut out).unwrap();
        for i in 0..16 {
            assert_eq!(pixel(&out, i), [0, 0, 0, 0]);
        }
    }

    #[test]
    fn test_opacity_flags_follow_alpha_modes() {
        let mut opaque = [0xFFu8; 16];
        opaque[0] = 0x01; // mode 0, no alpha
        let mut non_opaque = [0u8; 16];
        non_opaque[0] = 0x20; // mode 5, alpha channel
        let mut out = [0u8; 64];
        assert_eq!(
            decompress_block_bptc(
                &opaque,
                ModeMask::ALL,
                DecompressFlags::NON_OPAQUE_ONLY,
                &mut out
            ),
            Err(DecodeError::OpacityMismatch)
        );
        assert_eq!(
            decompress_block_bptc(
                &non_opaque,
                ModeMask::ALL,
                DecompressFlags::OPAQUE_ONLY,
                &mut out
            ),
            Err(DecodeError::OpacityMismatch)
        );
    }

    #[test]
    fn test_partition_tables_reference_valid_subsets() {
        for partition in 0..64 {
            for i in 0..16 {
                assert!(PARTITION_2[partition][i] < 2);
                assert!(PARTITION_3[partition][i] < 3);
            }
            // Pixel 0 always belongs to subset 0.
            assert_eq!(PARTITION_2[partition][0], 0);
            assert_eq!(PARTITION_3[partition][0], 0);
        }
    }

    #[test]
    fn test_anchor_tables_are_in_range() {
        for partition in 0..64 {
            assert!(ANCHOR_SECOND_SUBSET[partition] < 16);
            assert!(ANCHOR_SECOND_OF_THREE[partition] < 16);
            assert!(ANCHOR_THIRD_OF_THREE[partition] < 16);
        }
    }

    #[test]
    fn test_weight_tables_span_full_range() {
        assert_eq!(WEIGHTS_2[0], 0);
        assert_eq!(WEIGHTS_2[3], 64);
        assert_eq!(WEIGHTS_3[7], 64);
        assert_eq!(WEIGHTS_4[15], 64);
        assert_eq!(interpolate(0, 255, 64), 255);
        assert_eq!(interpolate(0, 255, 0), 0);
    }
}
