// Copyright 2026 the Datum Bridge Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Array ownership handles and one-dimensional views.
//!
//! An [`ArrayHandle`] governs the lifetime of an element buffer. Its scope is a type parameter:
//!
//! - [`Global`]: the buffer is engine-managed. The handle holds one reference on it; dropping the
//!   handle releases that reference and never frees engine memory. Views alias the engine buffer,
//!   so writes are visible to the engine.
//! - [`Local`]: the buffer was allocated here and is freed with the last handle.
//!
//! [`ArrayView`] and [`ArrayViewMut`] pair a shared handle with an [`Extent`]. The extent never
//! exceeds the buffer length; this is checked once, at view construction.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;
use core::marker::PhantomData;

use crate::engine::{ArrayData, EngineBuffer};
use crate::error::ShapeError;
use crate::value::ScalarKind;

/// Runtime name of a memory scope.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    /// Engine-managed memory.
    Global,
    /// Memory owned by this layer.
    Local,
}

/// Type-level memory scope of an [`ArrayHandle`].
pub trait MemoryScope: fmt::Debug + 'static {
    /// The scope's runtime name.
    const KIND: ScopeKind;
}

/// Engine-managed memory scope.
#[derive(Debug)]
pub enum Global {}

/// Locally owned memory scope.
#[derive(Debug)]
pub enum Local {}

impl MemoryScope for Global {
    const KIND: ScopeKind = ScopeKind::Global;
}

impl MemoryScope for Local {
    const KIND: ScopeKind = ScopeKind::Local;
}

/// A fixed-width array element type.
pub trait Element: Copy + fmt::Debug + PartialEq + 'static {
    /// Scalar kind of the element.
    const KIND: ScalarKind;

    /// Returns the engine buffer in `data` if it stores elements of this type.
    fn engine_buffer(data: &ArrayData) -> Option<&EngineBuffer<Self>>;
}

macro_rules! impl_element {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Element for $ty {
                const KIND: ScalarKind = ScalarKind::$variant;

                #[inline]
                fn engine_buffer(data: &ArrayData) -> Option<&EngineBuffer<Self>> {
                    match data {
                        ArrayData::$variant(buf) => Some(buf),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_element! {
    bool => Bool,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    f32 => F32,
    f64 => F64,
}

/// Shape of a one-dimensional view: its element count.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Extent(usize);

impl Extent {
    /// Creates an extent of `len` elements.
    #[inline]
    pub const fn new(len: usize) -> Self {
        Self(len)
    }

    /// Element count.
    #[inline]
    pub const fn len(self) -> usize {
        self.0
    }

    /// Returns `true` for a zero-length extent.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Ownership handle over a contiguous element buffer, scoped by `S`.
pub struct ArrayHandle<T: Element, S: MemoryScope> {
    buffer: Rc<RefCell<Vec<T>>>,
    _scope: PhantomData<S>,
}

impl<T: Element> ArrayHandle<T, Global> {
    /// Takes a reference on an engine-managed buffer. No elements are copied.
    #[must_use]
    pub fn share(buffer: &EngineBuffer<T>) -> Self {
        Self {
            buffer: Rc::clone(buffer.cell()),
            _scope: PhantomData,
        }
    }
}

impl<T: Element> ArrayHandle<T, Local> {
    /// Takes ownership of `elems` as a locally scoped buffer.
    #[must_use]
    pub fn from_vec(elems: Vec<T>) -> Self {
        Self {
            buffer: Rc::new(RefCell::new(elems)),
            _scope: PhantomData,
        }
    }

    /// Allocates a locally scoped buffer of `len` default elements.
    #[must_use]
    pub fn zeroed(len: usize) -> Self
    where
        T: Default,
    {
        Self::from_vec(alloc::vec![T::default(); len])
    }

    /// Releases the buffer, returning its elements.
    ///
    /// Returns `Err(self)` if the buffer is still referenced elsewhere.
    pub fn into_vec(self) -> Result<Vec<T>, Self> {
        match Rc::try_unwrap(self.buffer) {
            Ok(cell) => Ok(cell.into_inner()),
            Err(buffer) => Err(Self {
                buffer,
                _scope: PhantomData,
            }),
        }
    }
}

impl<T: Element, S: MemoryScope> ArrayHandle<T, S> {
    /// Buffer length (the backing capacity for views).
    pub fn len(&self) -> usize {
        self.buffer.borrow().len()
    }

    /// Returns `true` if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The handle's memory scope.
    #[inline]
    pub fn scope(&self) -> ScopeKind {
        S::KIND
    }
}

impl<T: Element, S: MemoryScope> fmt::Debug for ArrayHandle<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayHandle")
            .field("scope", &S::KIND)
            .field("elem", &T::KIND)
            .field("len", &self.len())
            .finish()
    }
}

fn check_extent<T: Element, S: MemoryScope>(
    handle: &ArrayHandle<T, S>,
    extent: Extent,
) -> Result<(), ShapeError> {
    let capacity = handle.len();
    if extent.len() > capacity {
        return Err(ShapeError::ExceedsCapacity {
            extent: extent.len(),
            capacity,
        });
    }
    Ok(())
}

/// A read-only one-dimensional view.
pub struct ArrayView<T: Element, S: MemoryScope = Global> {
    handle: Rc<ArrayHandle<T, S>>,
    extent: Extent,
}

impl<T: Element, S: MemoryScope> ArrayView<T, S> {
    /// Creates a view of the first `extent` elements of `handle`.
    pub fn new(handle: Rc<ArrayHandle<T, S>>, extent: Extent) -> Result<Self, ShapeError> {
        check_extent(&handle, extent)?;
        Ok(Self { handle, extent })
    }

    /// The view's shape.
    #[inline]
    pub fn extent(&self) -> Extent {
        self.extent
    }

    /// Element count.
    #[inline]
    pub fn len(&self) -> usize {
        self.extent.len()
    }

    /// Returns `true` if the view has no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.extent.is_empty()
    }

    /// The ownership handle behind the view.
    pub fn handle(&self) -> &Rc<ArrayHandle<T, S>> {
        &self.handle
    }

    /// Returns element `index`, if inside the view.
    ///
    /// # Panics
    ///
    /// Panics if called from inside a writable view's `with_slice_mut` over the same buffer.
    pub fn get(&self, index: usize) -> Option<T> {
        if index >= self.len() {
            return None;
        }
        self.handle.buffer.borrow().get(index).copied()
    }

    /// Runs `f` over the viewed elements.
    ///
    /// # Panics
    ///
    /// Panics if called from inside a writable view's `with_slice_mut` over the same buffer.
    pub fn with_slice<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        let buf = self.handle.buffer.borrow();
        f(&buf[..self.len()])
    }

    /// Copies the viewed elements out.
    pub fn to_vec(&self) -> Vec<T> {
        self.with_slice(<[T]>::to_vec)
    }
}

impl<T: Element, S: MemoryScope> Clone for ArrayView<T, S> {
    fn clone(&self) -> Self {
        Self {
            handle: Rc::clone(&self.handle),
            extent: self.extent,
        }
    }
}

impl<T: Element, S: MemoryScope> fmt::Debug for ArrayView<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayView")
            .field("extent", &self.extent)
            .field("handle", &self.handle)
            .finish()
    }
}

/// A writable one-dimensional view.
///
/// Over a [`Global`] handle, writes go straight to engine memory.
pub struct ArrayViewMut<T: Element, S: MemoryScope = Global> {
    view: ArrayView<T, S>,
}

impl<T: Element, S: MemoryScope> ArrayViewMut<T, S> {
    /// Creates a writable view of the first `extent` elements of `handle`.
    pub fn new(handle: Rc<ArrayHandle<T, S>>, extent: Extent) -> Result<Self, ShapeError> {
        Ok(Self {
            view: ArrayView::new(handle, extent)?,
        })
    }

    /// A read-only view sharing this view's handle and extent.
    pub fn as_const(&self) -> &ArrayView<T, S> {
        &self.view
    }

    /// Element count.
    #[inline]
    pub fn len(&self) -> usize {
        self.view.len()
    }

    /// Returns `true` if the view has no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.view.is_empty()
    }

    /// Returns element `index`, if inside the view.
    pub fn get(&self, index: usize) -> Option<T> {
        self.view.get(index)
    }

    /// Overwrites element `index`.
    pub fn set(&self, index: usize, value: T) -> Result<(), ShapeError> {
        let extent = self.len();
        let mut buf = self.view.handle.buffer.borrow_mut();
        match buf.get_mut(index) {
            Some(slot) if index < extent => {
                *slot = value;
                Ok(())
            }
            _ => Err(ShapeError::OutOfBounds { index, extent }),
        }
    }

    /// Sets every viewed element to `value`.
    pub fn fill(&self, value: T) {
        self.with_slice_mut(|elems| elems.fill(value));
    }

    /// Runs `f` over the viewed elements, mutably.
    ///
    /// # Panics
    ///
    /// Panics if another borrow of the same buffer is active, i.e. when nested inside a
    /// `with_slice` or `with_slice_mut` call over the same buffer.
    pub fn with_slice_mut<R>(&self, f: impl FnOnce(&mut [T]) -> R) -> R {
        let len = self.len();
        let mut buf = self.view.handle.buffer.borrow_mut();
        f(&mut buf[..len])
    }

    /// Runs `f` over the viewed elements.
    pub fn with_slice<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        self.view.with_slice(f)
    }

    /// Copies the viewed elements out.
    pub fn to_vec(&self) -> Vec<T> {
        self.view.to_vec()
    }
}

impl<T: Element, S: MemoryScope> fmt::Debug for ArrayViewMut<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayViewMut")
            .field("extent", &self.view.extent)
            .field("handle", &self.view.handle)
            .finish()
    }
}
