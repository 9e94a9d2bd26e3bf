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

//! In-crate bitmask type generator.
//!
//! The mask and flag types of this library need a very small surface: named
//! constants, union, containment tests and a readable `Debug`. Generating
//! them here keeps that surface exactly as small as the callers require.
#[macro_export]
#[doc(hidden)]
macro_rules! tessera_bitflags {
    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident: $ty:ty {
            $(
                $(#[$flag_attr:meta])*
                const $flag_name:ident = $flag_value:expr;
            )*
        }
    ) => {
        $(#[$attr])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
        $vis struct $name {
            pub(crate) bits: $ty,
        }

        impl $name {
            $(
                $(#[$flag_attr])*
                pub const $flag_name: Self = Self { bits: $flag_value };
            )*

            /// No flags set.
            pub const EMPTY: Self = Self { bits: 0 };

            /// Wraps a raw bit pattern; bits matching no named flag are kept.
            pub const fn from_bits(bits: $ty) -> Self {
                Self { bits }
            }

            /// The raw bit pattern.
            pub const fn bits(&self) -> $ty {
                self.bits
            }

            /// Whether every flag in `other` is also set in `self`.
            pub const fn contains(&self, other: Self) -> bool {
                (self.bits & other.bits) == other.bits
            }

            /// Whether `self` and `other` share at least one flag.
            pub const fn intersects(&self, other: Self) -> bool {
                (self.bits & other.bits) != 0
            }

            /// Sets the flags in `other`.
            pub fn insert(&mut self, other: Self) {
                self.bits |= other.bits;
            }

            /// Clears the flags in `other`.
            pub fn remove(&mut self, other: Self) {
                self.bits &= !other.bits;
            }

            /// A copy of `self` with the flags in `other` set.
            #[must_use]
            pub const fn with(self, other: Self) -> Self {
                Self { bits: self.bits | other.bits }
            }

            /// A copy of `self` with the flags in `other` cleared.
            #[must_use]
            pub const fn without(self, other: Self) -> Self {
                Self { bits: self.bits & !other.bits }
            }
        }

        impl core::ops::BitOr for $name {
            type Output = Self;
            fn bitor(self, other: Self) -> Self {
                self.with(other)
            }
        }

        impl core::ops::BitOrAssign for $name {
            fn bitor_assign(&mut self, other: Self) {
                self.insert(other);
            }
        }

        // Debug prints the set single-bit flags joined by `+`; constants
        // composed of several bits decompose into those bits, and anything
        // matching no named flag is shown as a hex remainder.
        impl core::fmt::Debug for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}(", stringify!($name))?;
                if self.bits == 0 {
                    return write!(f, "0)");
                }
                let mut remaining = self.bits;
                let mut separator = "";
                $(
                    if ($flag_value as $ty) != 0
                        && (($flag_value as $ty) & (($flag_value as $ty).wrapping_sub(1))) == 0
                        && (self.bits & ($flag_value as $ty)) == ($flag_value as $ty)
                    {
                        write!(f, "{separator}{}", stringify!($flag_name))?;
                        separator = "+";
                        remaining &= !($flag_value as $ty);
                    }
                )*
                if remaining != 0 {
                    write!(f, "{separator}{remaining:#x}")?;
                }
                write!(f, ")")
            }
        }
    };
}
