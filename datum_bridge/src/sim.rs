// Copyright 2026 the Datum Bridge Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An in-memory reference engine.
//!
//! [`SimEngine`] implements [`Engine`] over a small type catalog and `Vec`-backed arenas for
//! pass-by-reference datums. Array and row datums are tagged arena indices; decoding a datum that
//! does not name a live arena slot raises an engine fault, as does introspecting an OID marked
//! with [`SimEngine::fault_on`].
//!
//! The catalog is preloaded with the built-in scalar and array types from [`TypeOid`].

use alloc::format;
use alloc::vec::Vec;

use hashbrown::{HashMap, HashSet};

use crate::datum::{Datum, TupleHeader};
use crate::engine::{ArrayData, Engine, EngineBuffer, RawArray};
use crate::guard::raise;
use crate::oid::TypeOid;

const TAG_SHIFT: u32 = 56;
const ARRAY_TAG: u64 = 0xa1;
const TUPLE_TAG: u64 = 0x7e;
const INDEX_MASK: u64 = (1 << TAG_SHIFT) - 1;

/// Catalog entry of a type known to [`SimEngine`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TypeEntry {
    /// A pass-by-value base type.
    Scalar,
    /// An array type with the given element type.
    Array {
        /// Element type.
        elem: TypeOid,
    },
    /// A composite (row) type.
    Row,
}

/// In-memory [`Engine`] implementation.
#[derive(Debug)]
pub struct SimEngine {
    types: HashMap<TypeOid, TypeEntry>,
    faulty: HashSet<TypeOid>,
    arrays: Vec<RawArray>,
    tuples: Vec<Vec<Datum>>,
    next_oid: u32,
}

impl Default for SimEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SimEngine {
    /// Creates an engine whose catalog holds the built-in types.
    #[must_use]
    pub fn new() -> Self {
        let mut types = HashMap::new();
        for oid in [
            TypeOid::BOOL,
            TypeOid::INT2,
            TypeOid::INT4,
            TypeOid::INT8,
            TypeOid::FLOAT4,
            TypeOid::FLOAT8,
        ] {
            types.insert(oid, TypeEntry::Scalar);
        }
        for (array, elem) in [
            (TypeOid::BOOL_ARRAY, TypeOid::BOOL),
            (TypeOid::INT2_ARRAY, TypeOid::INT2),
            (TypeOid::INT4_ARRAY, TypeOid::INT4),
            (TypeOid::INT8_ARRAY, TypeOid::INT8),
            (TypeOid::FLOAT4_ARRAY, TypeOid::FLOAT4),
            (TypeOid::FLOAT8_ARRAY, TypeOid::FLOAT8),
        ] {
            types.insert(array, TypeEntry::Array { elem });
        }
        Self {
            types,
            faulty: HashSet::new(),
            arrays: Vec::new(),
            tuples: Vec::new(),
            next_oid: TypeOid::FIRST_NORMAL.as_u32(),
        }
    }

    /// Returns the catalog entry for `oid`.
    pub fn type_entry(&self, oid: TypeOid) -> Option<TypeEntry> {
        self.types.get(&oid).copied()
    }

    /// Registers a new composite type and returns its OID.
    pub fn register_row_type(&mut self) -> TypeOid {
        let oid = self.alloc_oid();
        self.types.insert(oid, TypeEntry::Row);
        oid
    }

    /// Registers a new array type over `elem` and returns its OID.
    pub fn register_array_type(&mut self, elem: TypeOid) -> TypeOid {
        let oid = self.alloc_oid();
        self.types.insert(oid, TypeEntry::Array { elem });
        oid
    }

    /// Registers a new pass-by-value type (for example a domain) and returns its OID.
    pub fn register_scalar_type(&mut self) -> TypeOid {
        let oid = self.alloc_oid();
        self.types.insert(oid, TypeEntry::Scalar);
        oid
    }

    /// Makes every introspection of `oid` raise an engine fault.
    pub fn fault_on(&mut self, oid: TypeOid) {
        self.faulty.insert(oid);
    }

    /// Stores `array` and returns its datum.
    pub fn alloc_array(&mut self, array: RawArray) -> Datum {
        let idx = u32::try_from(self.arrays.len()).unwrap_or(u32::MAX);
        self.arrays.push(array);
        tagged(ARRAY_TAG, idx)
    }

    /// Stores a one-dimensional, NULL-free float8 array and returns its datum.
    pub fn alloc_float8_array(&mut self, elems: Vec<f64>) -> Datum {
        self.alloc_array(RawArray::one_dim(
            TypeOid::FLOAT8,
            ArrayData::F64(EngineBuffer::new(elems)),
        ))
    }

    /// Stores a row with the given field datums and returns its datum.
    pub fn alloc_tuple(&mut self, fields: Vec<Datum>) -> Datum {
        let idx = u32::try_from(self.tuples.len()).unwrap_or(u32::MAX);
        self.tuples.push(fields);
        tagged(TUPLE_TAG, idx)
    }

    /// Returns the stored array behind `datum`.
    pub fn array(&self, datum: Datum) -> Option<&RawArray> {
        self.arrays.get(untag(ARRAY_TAG, datum)?)
    }

    /// Returns the engine-side float8 buffer behind `datum`.
    pub fn float8_buffer(&self, datum: Datum) -> Option<EngineBuffer<f64>> {
        match self.array(datum)?.data() {
            ArrayData::F64(buf) => Some(buf.clone()),
            _ => None,
        }
    }

    /// Returns the field datums of the row referenced by `tuple`.
    pub fn tuple_fields(&self, tuple: TupleHeader) -> Option<&[Datum]> {
        let idx = untag(TUPLE_TAG, Datum::from_raw(tuple.as_raw()))?;
        self.tuples.get(idx).map(Vec::as_slice)
    }

    fn alloc_oid(&mut self) -> TypeOid {
        let oid = TypeOid::new(self.next_oid);
        self.next_oid = self.next_oid.saturating_add(1);
        oid
    }

    fn check_fault(&self, oid: TypeOid) {
        if self.faulty.contains(&oid) {
            raise(format!("cache lookup failed for type {oid}"));
        }
    }
}

fn tagged(tag: u64, idx: u32) -> Datum {
    Datum::from_raw((tag << TAG_SHIFT) | u64::from(idx))
}

fn untag(tag: u64, datum: Datum) -> Option<usize> {
    let raw = datum.as_raw();
    if raw >> TAG_SHIFT != tag {
        return None;
    }
    usize::try_from(raw & INDEX_MASK).ok()
}

impl Engine for SimEngine {
    fn type_is_rowtype(&self, type_id: TypeOid) -> bool {
        self.check_fault(type_id);
        matches!(self.types.get(&type_id), Some(TypeEntry::Row))
    }

    fn type_is_array(&self, type_id: TypeOid) -> bool {
        self.check_fault(type_id);
        matches!(self.types.get(&type_id), Some(TypeEntry::Array { .. }))
    }

    fn datum_get_tuple_header(&self, datum: Datum) -> TupleHeader {
        match untag(TUPLE_TAG, datum).filter(|&idx| idx < self.tuples.len()) {
            Some(_) => TupleHeader::new(datum.as_raw()),
            None => raise(format!("invalid row datum {:#x}", datum.as_raw())),
        }
    }

    fn datum_get_array(&self, datum: Datum) -> RawArray {
        match self.array(datum) {
            Some(array) => array.clone(),
            None => raise(format!("invalid array datum {:#x}", datum.as_raw())),
        }
    }
}
