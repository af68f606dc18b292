// Copyright 2026 the Datum Bridge Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `datum_bridge`: typed values from host database engine datums.
//!
//! A host engine hands an embedded application values as opaque, word-sized [`Datum`]s together
//! with a runtime [`TypeOid`]. This crate classifies the type, decodes the datum, and produces a
//! reference-counted [`Value`] that the rest of the application consumes without knowing whether
//! the datum was a scalar, a one-dimensional array, or a composite row.
//!
//! ## Boundary
//!
//! The engine is reached only through the [`Engine`] trait. Type introspection runs inside
//! [`Engine::guarded`], so an engine error raised while classifying surfaces as
//! [`MarshalError::ForeignFault`] instead of unwinding into the caller.
//!
//! ## Arrays
//!
//! Float8 arrays are not copied: the produced view aliases the engine buffer through an
//! [`ArrayHandle`] scoped [`Global`]. Writable views (requested with `writable = true`) mutate the
//! engine buffer in place. Multidimensional arrays and arrays with NULL elements are rejected.
//!
//! ## Example
//!
//! ```
//! use datum_bridge::sim::SimEngine;
//! use datum_bridge::{Classifier, Datum, TypeOid, ValueKind};
//!
//! let mut engine = SimEngine::new();
//! let classifier = Classifier::default();
//!
//! let v = classifier
//!     .classify(&engine, false, TypeOid::INT4, Datum::from_i32(-7))?
//!     .expect("int4 is supported");
//! assert_eq!(v.get::<i32>(), Ok(-7));
//!
//! let arr = engine.alloc_float8_array(vec![1.0, 2.0]);
//! let v = classifier
//!     .classify(&engine, true, TypeOid::FLOAT8_ARRAY, arr)?
//!     .expect("float8[] is supported");
//! assert_eq!(v.kind(), ValueKind::F64ArrayMut);
//! # Ok::<(), datum_bridge::MarshalError>(())
//! ```
//!
//! ## Features
//!
//! - `std` (default): enables the unwinding fault guard ([`guard::catch_foreign`]). Without it,
//!   engine faults are plain panics and [`Engine::guarded`] cannot intercept them.

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod array;
pub mod classify;
pub mod datum;
pub mod engine;
pub mod error;
pub mod guard;
pub mod oid;
pub mod sim;
pub mod value;

pub use array::{
    ArrayHandle, ArrayView, ArrayViewMut, Element, Extent, Global, Local, MemoryScope, ScopeKind,
};
pub use classify::{Arg, Classifier, Marshalled, ScalarTable};
pub use datum::{Datum, TupleHeader};
pub use engine::{ArrayData, Engine, EngineBuffer, RawArray};
pub use error::{KindMismatch, MarshalError, ShapeError, ShapeRejection};
pub use guard::ForeignFault;
pub use oid::TypeOid;
pub use value::{FromValue, ScalarKind, Value, ValueKind, ValueRef};
