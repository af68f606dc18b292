// Copyright 2026 the Datum Bridge Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typed values produced by classification.
//!
//! [`Value`] is a closed tagged union; its kind is fixed at construction. Classification hands
//! values out as [`ValueRef`] (`Rc<Value>`), so array-kind values share their ownership handle
//! with every holder and release it with the last one.

use alloc::rc::Rc;

use crate::array::{ArrayView, ArrayViewMut};
use crate::datum::{Datum, TupleHeader};
use crate::error::KindMismatch;

/// Scalar kinds that can be extracted from a datum word.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// Boolean.
    Bool,
    /// Signed 16-bit integer.
    I16,
    /// Signed 32-bit integer.
    I32,
    /// Signed 64-bit integer.
    I64,
    /// 32-bit float.
    F32,
    /// 64-bit float.
    F64,
}

impl ScalarKind {
    /// Extracts a scalar of this kind from `datum`, by copy.
    pub fn extract(self, datum: Datum) -> Value {
        match self {
            Self::Bool => Value::Bool(datum.get_bool()),
            Self::I16 => Value::I16(datum.get_i16()),
            Self::I32 => Value::I32(datum.get_i32()),
            Self::I64 => Value::I64(datum.get_i64()),
            Self::F32 => Value::F32(datum.get_f32()),
            Self::F64 => Value::F64(datum.get_f64()),
        }
    }
}

/// The discriminant of a [`Value`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Boolean.
    Bool,
    /// Signed 16-bit integer.
    I16,
    /// Signed 32-bit integer.
    I32,
    /// Signed 64-bit integer.
    I64,
    /// 32-bit float.
    F32,
    /// 64-bit float.
    F64,
    /// Read-only view of a float8 array.
    F64Array,
    /// Writable view of a float8 array.
    F64ArrayMut,
    /// Composite (row) value.
    Composite,
}

impl From<ScalarKind> for ValueKind {
    fn from(kind: ScalarKind) -> Self {
        match kind {
            ScalarKind::Bool => Self::Bool,
            ScalarKind::I16 => Self::I16,
            ScalarKind::I32 => Self::I32,
            ScalarKind::I64 => Self::I64,
            ScalarKind::F32 => Self::F32,
            ScalarKind::F64 => Self::F64,
        }
    }
}

/// A typed value.
#[derive(Debug)]
pub enum Value {
    /// Boolean.
    Bool(bool),
    /// Signed 16-bit integer.
    I16(i16),
    /// Signed 32-bit integer.
    I32(i32),
    /// Signed 64-bit integer.
    I64(i64),
    /// 32-bit float.
    F32(f32),
    /// 64-bit float.
    F64(f64),
    /// Read-only float8 array aliasing engine memory.
    F64Array(ArrayView<f64>),
    /// Writable float8 array aliasing engine memory.
    F64ArrayMut(ArrayViewMut<f64>),
    /// Composite (row) value, passed through as the engine's tuple header.
    Composite(TupleHeader),
}

/// Shared handle to a classified value.
pub type ValueRef = Rc<Value>;

impl Value {
    /// Returns this value's kind.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Bool(_) => ValueKind::Bool,
            Self::I16(_) => ValueKind::I16,
            Self::I32(_) => ValueKind::I32,
            Self::I64(_) => ValueKind::I64,
            Self::F32(_) => ValueKind::F32,
            Self::F64(_) => ValueKind::F64,
            Self::F64Array(_) => ValueKind::F64Array,
            Self::F64ArrayMut(_) => ValueKind::F64ArrayMut,
            Self::Composite(_) => ValueKind::Composite,
        }
    }

    /// Extracts the value as `T`. No conversion between kinds is performed.
    pub fn get<T: FromValue>(&self) -> Result<T, KindMismatch> {
        T::from_value(self).ok_or(KindMismatch {
            expected: T::KIND,
            found: self.kind(),
        })
    }

    /// Returns the read side of an array value, writable or not.
    pub fn as_array(&self) -> Option<&ArrayView<f64>> {
        match self {
            Self::F64Array(view) => Some(view),
            Self::F64ArrayMut(view) => Some(view.as_const()),
            _ => None,
        }
    }

    /// Returns the writable view of a writable array value.
    pub fn as_array_mut(&self) -> Option<&ArrayViewMut<f64>> {
        match self {
            Self::F64ArrayMut(view) => Some(view),
            _ => None,
        }
    }

    /// Returns the tuple header of a composite value.
    pub fn as_composite(&self) -> Option<TupleHeader> {
        match self {
            Self::Composite(tuple) => Some(*tuple),
            _ => None,
        }
    }

    /// Returns `true` for array-kind values.
    pub fn is_array(&self) -> bool {
        matches!(self, Self::F64Array(_) | Self::F64ArrayMut(_))
    }

    /// Re-encodes a scalar or composite value as a datum for handing back to the engine.
    ///
    /// Arrays return `None`: producing an array datum needs an engine allocation.
    pub fn to_datum(&self) -> Option<Datum> {
        Some(match self {
            Self::Bool(v) => Datum::from_bool(*v),
            Self::I16(v) => Datum::from_i16(*v),
            Self::I32(v) => Datum::from_i32(*v),
            Self::I64(v) => Datum::from_i64(*v),
            Self::F32(v) => Datum::from_f32(*v),
            Self::F64(v) => Datum::from_f64(*v),
            Self::Composite(tuple) => tuple.to_datum(),
            Self::F64Array(_) | Self::F64ArrayMut(_) => return None,
        })
    }
}

/// Scalar types that can be read out of a [`Value`].
pub trait FromValue: Sized {
    /// The value kind this type is read from.
    const KIND: ValueKind;

    /// Returns the payload if `value` has kind [`Self::KIND`].
    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! impl_from_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl FromValue for $ty {
                const KIND: ValueKind = ValueKind::$variant;

                #[inline]
                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::$variant(v) => Some(*v),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_from_value! {
    bool => Bool,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    f32 => F32,
    f64 => F64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_is_exact_per_kind() {
        let v = Value::I16(-3);
        assert_eq!(v.get::<i16>(), Ok(-3));
        assert_eq!(
            v.get::<i32>(),
            Err(KindMismatch {
                expected: ValueKind::I32,
                found: ValueKind::I16
            })
        );
    }

    #[test]
    fn extract_matches_the_kind() {
        for kind in [
            ScalarKind::Bool,
            ScalarKind::I16,
            ScalarKind::I32,
            ScalarKind::I64,
            ScalarKind::F32,
            ScalarKind::F64,
        ] {
            assert_eq!(kind.extract(Datum::NULL).kind(), ValueKind::from(kind));
        }
    }

    #[test]
    fn scalars_reencode_to_the_same_word() {
        let d = Datum::from_i64(i64::MIN);
        assert_eq!(ScalarKind::I64.extract(d).to_datum(), Some(d));
        let t = TupleHeader::new(0x40);
        assert_eq!(Value::Composite(t).to_datum(), Some(Datum::from_raw(0x40)));
        assert_eq!(Value::Composite(t).as_composite(), Some(t));
    }
}
