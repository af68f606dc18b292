// Copyright 2026 the Datum Bridge Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The host engine boundary.
//!
//! Everything this crate needs from the engine goes through [`Engine`]: type introspection,
//! decoding of pass-by-reference datums, and the guarded call region used to intercept engine
//! faults. Scalar decoding needs no engine call and lives on [`Datum`].

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use crate::datum::{Datum, TupleHeader};
use crate::guard::ForeignFault;
use crate::oid::TypeOid;
use crate::value::ScalarKind;

/// An engine-managed element buffer.
///
/// Cloning shares the buffer (one more reference on engine memory); it never copies elements.
#[derive(Debug)]
pub struct EngineBuffer<T>(Rc<RefCell<Vec<T>>>);

impl<T> EngineBuffer<T> {
    /// Places `elems` under engine management.
    #[must_use]
    pub fn new(elems: Vec<T>) -> Self {
        Self(Rc::new(RefCell::new(elems)))
    }

    /// Returns the number of elements in the buffer.
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    /// Returns `true` if the buffer holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of live references to the buffer, the engine's own included.
    pub fn ref_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    /// Returns `true` if `self` and `other` reference the same memory.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Runs `f` over the buffer contents.
    ///
    /// # Panics
    ///
    /// Panics if the buffer is mutably borrowed, i.e. when called from inside a writable view's
    /// `with_slice_mut` over the same buffer.
    pub fn with_slice<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        f(&self.0.borrow())
    }

    pub(crate) fn cell(&self) -> &Rc<RefCell<Vec<T>>> {
        &self.0
    }
}

impl<T: Copy> EngineBuffer<T> {
    /// Returns element `index`, if in bounds.
    pub fn get(&self, index: usize) -> Option<T> {
        self.0.borrow().get(index).copied()
    }

    /// Copies the buffer out.
    pub fn to_vec(&self) -> Vec<T> {
        self.0.borrow().clone()
    }
}

impl<T> Clone for EngineBuffer<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

/// Typed element storage of an engine array.
#[derive(Clone, Debug)]
pub enum ArrayData {
    /// `bool` elements.
    Bool(EngineBuffer<bool>),
    /// `int2` elements.
    I16(EngineBuffer<i16>),
    /// `int4` elements.
    I32(EngineBuffer<i32>),
    /// `int8` elements.
    I64(EngineBuffer<i64>),
    /// `float4` elements.
    F32(EngineBuffer<f32>),
    /// `float8` elements.
    F64(EngineBuffer<f64>),
}

impl ArrayData {
    /// Returns the number of stored elements.
    pub fn len(&self) -> usize {
        match self {
            Self::Bool(b) => b.len(),
            Self::I16(b) => b.len(),
            Self::I32(b) => b.len(),
            Self::I64(b) => b.len(),
            Self::F32(b) => b.len(),
            Self::F64(b) => b.len(),
        }
    }

    /// Returns `true` if no elements are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the scalar kind of the stored elements.
    pub fn elem_kind(&self) -> ScalarKind {
        match self {
            Self::Bool(_) => ScalarKind::Bool,
            Self::I16(_) => ScalarKind::I16,
            Self::I32(_) => ScalarKind::I32,
            Self::I64(_) => ScalarKind::I64,
            Self::F32(_) => ScalarKind::F32,
            Self::F64(_) => ScalarKind::F64,
        }
    }
}

/// A decoded engine array: header fields plus a shared reference to its element storage.
#[derive(Clone, Debug)]
pub struct RawArray {
    elem_type: TypeOid,
    dims: Vec<usize>,
    has_nulls: bool,
    data: ArrayData,
}

impl RawArray {
    /// Creates an array header over `data` with explicit dimensions.
    #[must_use]
    pub fn new(elem_type: TypeOid, dims: Vec<usize>, data: ArrayData) -> Self {
        Self {
            elem_type,
            dims,
            has_nulls: false,
            data,
        }
    }

    /// Creates a one-dimensional array header spanning all of `data`.
    #[must_use]
    pub fn one_dim(elem_type: TypeOid, data: ArrayData) -> Self {
        let len = data.len();
        Self::new(elem_type, alloc::vec![len], data)
    }

    /// Marks the array as carrying a NULL bitmap.
    #[must_use]
    pub fn with_nulls(mut self) -> Self {
        self.has_nulls = true;
        self
    }

    /// Element type OID.
    pub fn elem_type(&self) -> TypeOid {
        self.elem_type
    }

    /// Number of dimensions. Zero for an empty array.
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    /// Per-dimension extents.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Whether the array has a NULL bitmap.
    pub fn has_nulls(&self) -> bool {
        self.has_nulls
    }

    /// Element storage.
    pub fn data(&self) -> &ArrayData {
        &self.data
    }
}

/// The host engine, as seen from the marshalling layer.
///
/// Introspection and decoding methods may raise engine faults (for example on an unknown type
/// OID or a corrupt datum). Callers must run them inside [`Engine::guarded`].
pub trait Engine {
    /// Returns `true` if `type_id` names a composite (row) type.
    fn type_is_rowtype(&self, type_id: TypeOid) -> bool;

    /// Returns `true` if `type_id` names an array type.
    fn type_is_array(&self, type_id: TypeOid) -> bool;

    /// Decodes a row datum into its tuple header reference.
    fn datum_get_tuple_header(&self, datum: Datum) -> TupleHeader;

    /// Decodes an array datum.
    ///
    /// The returned header shares the engine's element storage; no elements are copied.
    fn datum_get_array(&self, datum: Datum) -> RawArray;

    /// Runs `f` in a region where engine faults are intercepted.
    ///
    /// A fault raised by any engine call inside `f` is returned as a [`ForeignFault`]. The
    /// default implementation uses [`catch_foreign`](crate::guard::catch_foreign) when the `std`
    /// feature is enabled; without it, faults are not interceptable and `f` runs directly.
    fn guarded<R>(&self, f: impl FnOnce(&Self) -> R) -> Result<R, ForeignFault> {
        #[cfg(feature = "std")]
        {
            crate::guard::catch_foreign(|| f(self))
        }
        #[cfg(not(feature = "std"))]
        {
            Ok(f(self))
        }
    }
}
