// Copyright 2026 the Datum Bridge Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conformance fixtures for `datum_bridge`.
//!
//! The tests live under `tests/`; this crate only provides shared setup.

use datum_bridge::sim::SimEngine;
use datum_bridge::{ArrayData, Datum, EngineBuffer, RawArray, TypeOid};

/// Installs a test-writer `tracing` subscriber once per process.
///
/// Honors `RUST_LOG`; defaults to `datum_bridge=debug`.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("datum_bridge=debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Stores a float8 array with explicit dimensions in `engine`.
///
/// `dims` need not match `elems.len()`; the engine takes the header as given.
pub fn float8_array(engine: &mut SimEngine, dims: Vec<usize>, elems: Vec<f64>) -> Datum {
    engine.alloc_array(RawArray::new(
        TypeOid::FLOAT8,
        dims,
        ArrayData::F64(EngineBuffer::new(elems)),
    ))
}

/// Stores a one-dimensional int4 array in `engine`.
pub fn int4_array(engine: &mut SimEngine, elems: Vec<i32>) -> Datum {
    engine.alloc_array(RawArray::one_dim(
        TypeOid::INT4,
        ArrayData::I32(EngineBuffer::new(elems)),
    ))
}
