// Copyright 2026 the Datum Bridge Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Opaque value handles as handed over by the engine.
//!
//! A [`Datum`] is one machine word. Pass-by-value scalars are stored in the word itself; the
//! accessors here are the engine's fixed encodings for those scalars. Pass-by-reference values
//! (arrays, rows) are engine references that only the [`Engine`](crate::Engine) can decode.

/// A word-sized engine value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Datum(u64);

#[allow(
    clippy::cast_possible_truncation,
    reason = "narrow scalars occupy the low bits of the datum word"
)]
impl Datum {
    /// The all-zero datum.
    pub const NULL: Self = Self(0);

    /// Creates a datum from its raw word.
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw word.
    #[inline]
    pub const fn as_raw(self) -> u64 {
        self.0
    }

    /// Encodes a boolean.
    #[inline]
    pub fn from_bool(v: bool) -> Self {
        Self(u64::from(v))
    }

    /// Decodes a boolean. Any non-zero word is `true`.
    #[inline]
    pub const fn get_bool(self) -> bool {
        self.0 != 0
    }

    /// Encodes a 16-bit integer (sign-extended into the word).
    #[inline]
    pub const fn from_i16(v: i16) -> Self {
        Self(v as i64 as u64)
    }

    /// Decodes a 16-bit integer from the low bits of the word.
    #[inline]
    pub const fn get_i16(self) -> i16 {
        self.0 as i16
    }

    /// Encodes a 32-bit integer (sign-extended into the word).
    #[inline]
    pub const fn from_i32(v: i32) -> Self {
        Self(v as i64 as u64)
    }

    /// Decodes a 32-bit integer from the low bits of the word.
    #[inline]
    pub const fn get_i32(self) -> i32 {
        self.0 as i32
    }

    /// Encodes a 64-bit integer.
    #[inline]
    pub const fn from_i64(v: i64) -> Self {
        Self(v as u64)
    }

    /// Decodes a 64-bit integer.
    #[inline]
    pub const fn get_i64(self) -> i64 {
        self.0 as i64
    }

    /// Encodes a 32-bit float by its bit pattern.
    #[inline]
    pub fn from_f32(v: f32) -> Self {
        Self(u64::from(v.to_bits()))
    }

    /// Decodes a 32-bit float from the low 32 bits of the word.
    #[inline]
    pub fn get_f32(self) -> f32 {
        f32::from_bits(self.0 as u32)
    }

    /// Encodes a 64-bit float by its bit pattern.
    #[inline]
    pub fn from_f64(v: f64) -> Self {
        Self(v.to_bits())
    }

    /// Decodes a 64-bit float.
    #[inline]
    pub fn get_f64(self) -> f64 {
        f64::from_bits(self.0)
    }
}

/// An engine reference to a row's tuple header.
///
/// Rows are passed through unopened; the handle is only meaningful to the engine that produced
/// it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TupleHeader(u64);

impl TupleHeader {
    /// Creates a tuple header reference from its raw engine value.
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw engine value.
    #[inline]
    pub const fn as_raw(self) -> u64 {
        self.0
    }

    /// Re-encodes the reference as a datum.
    #[inline]
    pub const fn to_datum(self) -> Datum {
        Datum(self.0)
    }
}
