// Copyright 2026 the Datum Bridge Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Marshalling errors.

use alloc::boxed::Box;

use crate::guard::ForeignFault;
use crate::oid::TypeOid;
use crate::value::{ScalarKind, ValueKind};

/// Why an array was rejected.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ShapeRejection {
    /// The array does not have exactly one dimension.
    #[error("multidimensional arrays not yet supported (ndim={ndim})")]
    Multidimensional {
        /// Dimensionality reported by the engine.
        ndim: usize,
    },
    /// The array carries a NULL bitmap.
    #[error("arrays with nulls not yet supported")]
    ContainsNulls,
}

/// An array view shape error.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ShapeError {
    /// The requested extent is larger than the backing buffer.
    #[error("extent {extent} exceeds buffer capacity {capacity}")]
    ExceedsCapacity {
        /// Requested element count.
        extent: usize,
        /// Backing buffer length.
        capacity: usize,
    },
    /// An element index was outside the view.
    #[error("index {index} out of bounds for extent {extent}")]
    OutOfBounds {
        /// Offending index.
        index: usize,
        /// View element count.
        extent: usize,
    },
}

/// A value was read as a kind it does not have.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("value kind mismatch: expected {expected:?}, found {found:?}")]
pub struct KindMismatch {
    /// Kind requested by the caller.
    pub expected: ValueKind,
    /// Kind held by the value.
    pub found: ValueKind,
}

/// Classification errors.
///
/// Unsupported types are not errors; they classify to an absent value.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MarshalError {
    /// The array's shape is not supported.
    #[error("unsupported array shape: {0}")]
    UnsupportedShape(ShapeRejection),
    /// The engine faulted inside the guarded introspection region.
    #[error("an exception occurred while converting a datum: {0}")]
    ForeignFault(#[from] ForeignFault),
    /// The array's declared extent does not fit its storage.
    #[error("invalid array view: {0}")]
    Shape(#[from] ShapeError),
    /// The engine's array storage does not hold the declared element type.
    #[error("array of element type {elem_type} is stored as {found:?}")]
    ElementStorage {
        /// Declared element type.
        elem_type: TypeOid,
        /// Kind of the elements actually stored.
        found: ScalarKind,
    },
    /// Marshalling a function argument failed.
    #[error("argument {index}: {source}")]
    Argument {
        /// Zero-based argument position.
        index: usize,
        /// The underlying error.
        source: Box<Self>,
    },
}

impl From<ShapeRejection> for MarshalError {
    fn from(rejection: ShapeRejection) -> Self {
        Self::UnsupportedShape(rejection)
    }
}

impl MarshalError {
    /// Returns `true` for errors that reject the input's shape rather than signal a broken
    /// engine.
    pub fn is_unsupported_shape(&self) -> bool {
        match self {
            Self::UnsupportedShape(_) => true,
            Self::Argument { source, .. } => source.is_unsupported_shape(),
            Self::ForeignFault(_) | Self::Shape(_) | Self::ElementStorage { .. } => false,
        }
    }
}
