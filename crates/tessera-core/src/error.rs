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

//! The error type shared by every decode operation.

use crate::pixel::PixelFormat;
use thiserror::Error;

/// The closed set of failures a decode operation can report.
///
/// No failure is recoverable internally; on error the contents of the output
/// buffer are unspecified. Callers that need to distinguish causes ahead of
/// time can pre-filter blocks with the mode-query helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The bitstream failed a codec-specific structural check (reserved
    /// mode, zero mode byte, deltas the codec cannot reinterpret).
    #[error("compressed block failed a structural validity check")]
    InvalidBlock,

    /// The block's internal mode is not in the caller's mode mask, or the
    /// ENCODE flag rejected a sub-mode no conforming encoder emits.
    #[error("block mode is not permitted by the caller's mode mask or flags")]
    ModeRejected,

    /// OPAQUE_ONLY was set on a non-opaque block, or NON_OPAQUE_ONLY on an
    /// opaque one.
    #[error("block opacity does not satisfy the requested opacity filter")]
    OpacityMismatch,

    /// The requested output pixel format cannot be produced from the
    /// decoder's native format at matching precision.
    #[error("cannot convert pixels from {native:?} to {requested:?} at matching precision")]
    UnsupportedConversion {
        /// The format the decoder natively produces.
        native: PixelFormat,
        /// The format the caller asked for.
        requested: PixelFormat,
    },

    /// The compressed input slice is shorter than the format requires.
    #[error("compressed input too short: expected {expected} bytes, got {actual}")]
    TruncatedInput {
        /// The number of bytes the operation needs.
        expected: usize,
        /// The number of bytes provided.
        actual: usize,
    },

    /// The output buffer is smaller than the decoded result.
    #[error("output buffer too small: expected {expected} bytes, got {actual}")]
    OutputTooSmall {
        /// The number of bytes the operation needs.
        expected: usize,
        /// The number of bytes provided.
        actual: usize,
    },
}
