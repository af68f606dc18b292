// Copyright 2026 the Datum Bridge Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Runtime type identifiers.

use core::fmt;

/// An engine-assigned object identifier naming a data type.
///
/// The value is opaque to this crate: it is only ever used as a classification key. The
/// associated constants name the engine's built-in types that classification knows about.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct TypeOid(u32);

impl TypeOid {
    /// The invalid OID. Never names a type.
    pub const INVALID: Self = Self(0);

    /// `bool`.
    pub const BOOL: Self = Self(16);
    /// `int8` (64-bit signed integer).
    pub const INT8: Self = Self(20);
    /// `int2` (16-bit signed integer).
    pub const INT2: Self = Self(21);
    /// `int4` (32-bit signed integer).
    pub const INT4: Self = Self(23);
    /// `float4` (32-bit float).
    pub const FLOAT4: Self = Self(700);
    /// `float8` (64-bit float).
    pub const FLOAT8: Self = Self(701);

    /// `bool[]`.
    pub const BOOL_ARRAY: Self = Self(1000);
    /// `int2[]`.
    pub const INT2_ARRAY: Self = Self(1005);
    /// `int4[]`.
    pub const INT4_ARRAY: Self = Self(1007);
    /// `int8[]`.
    pub const INT8_ARRAY: Self = Self(1016);
    /// `float4[]`.
    pub const FLOAT4_ARRAY: Self = Self(1021);
    /// `float8[]`.
    pub const FLOAT8_ARRAY: Self = Self(1022);

    /// First OID handed out for user-defined types.
    pub const FIRST_NORMAL: Self = Self(16384);

    /// Creates an OID from its raw value.
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw integer backing this OID.
    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Returns `true` unless this is [`TypeOid::INVALID`].
    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for TypeOid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for TypeOid {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}
