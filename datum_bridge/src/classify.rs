// Copyright 2026 the Datum Bridge Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Datum classification.
//!
//! [`Classifier::classify`] turns a `(type OID, datum)` pair into a [`Value`]:
//!
//! 1. Row and array checks run inside [`Engine::guarded`], together with decoding the
//!    pass-by-reference representation. A fault there becomes [`MarshalError::ForeignFault`].
//! 2. Rows are passed through as [`Value::Composite`].
//! 3. Arrays must be one-dimensional and NULL-free; float8 arrays become views over engine
//!    memory. Other element types are not supported yet and classify to `None`.
//! 4. Everything else is looked up in the [`ScalarTable`].
//!
//! `Ok(None)` means "unsupported type" and is not an error.

use alloc::rc::Rc;
use alloc::vec::Vec;

use hashbrown::HashMap;
use tracing::{debug, error, trace, warn};

use crate::array::{ArrayHandle, ArrayView, ArrayViewMut, Element, Extent, Global};
use crate::datum::{Datum, TupleHeader};
use crate::engine::{Engine, RawArray};
use crate::error::{MarshalError, ShapeRejection};
use crate::oid::TypeOid;
use crate::value::{ScalarKind, Value, ValueRef};

/// Mapping from scalar type OIDs to the kind used to decode their datums.
#[derive(Clone, Debug)]
pub struct ScalarTable {
    kinds: HashMap<TypeOid, ScalarKind>,
}

impl ScalarTable {
    /// Creates a table with no entries.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            kinds: HashMap::new(),
        }
    }

    /// Creates a table with the engine's built-in scalar types.
    #[must_use]
    pub fn builtin() -> Self {
        let mut table = Self::empty();
        table.register(TypeOid::BOOL, ScalarKind::Bool);
        table.register(TypeOid::INT2, ScalarKind::I16);
        table.register(TypeOid::INT4, ScalarKind::I32);
        table.register(TypeOid::INT8, ScalarKind::I64);
        table.register(TypeOid::FLOAT4, ScalarKind::F32);
        table.register(TypeOid::FLOAT8, ScalarKind::F64);
        table
    }

    /// Maps `oid` to `kind`, returning the kind it replaced.
    ///
    /// Use this for domains and binary-compatible types whose datums share a built-in encoding.
    pub fn register(&mut self, oid: TypeOid, kind: ScalarKind) -> Option<ScalarKind> {
        self.kinds.insert(oid, kind)
    }

    /// Returns the kind registered for `oid`.
    pub fn kind_of(&self, oid: TypeOid) -> Option<ScalarKind> {
        self.kinds.get(&oid).copied()
    }

    /// Number of registered OIDs.
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Iterates over registered `(oid, kind)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (TypeOid, ScalarKind)> + '_ {
        self.kinds.iter().map(|(oid, kind)| (*oid, *kind))
    }
}

impl Default for ScalarTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// One argument of an engine function call.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Arg {
    /// Declared type of the argument.
    pub type_id: TypeOid,
    /// Argument datum. Not inspected when `is_null` is set.
    pub datum: Datum,
    /// Whether the argument is SQL NULL.
    pub is_null: bool,
}

impl Arg {
    /// A non-NULL argument.
    #[inline]
    pub const fn new(type_id: TypeOid, datum: Datum) -> Self {
        Self {
            type_id,
            datum,
            is_null: false,
        }
    }

    /// A NULL argument of type `type_id`.
    #[inline]
    pub const fn null(type_id: TypeOid) -> Self {
        Self {
            type_id,
            datum: Datum::NULL,
            is_null: true,
        }
    }
}

/// Outcome of marshalling one argument.
#[derive(Clone, Debug)]
pub enum Marshalled {
    /// The argument was NULL.
    Null,
    /// The argument's type is not supported.
    Unsupported(TypeOid),
    /// The classified value.
    Value(ValueRef),
}

impl Marshalled {
    /// Returns the classified value, if any.
    pub fn value(&self) -> Option<&ValueRef> {
        match self {
            Self::Value(v) => Some(v),
            Self::Null | Self::Unsupported(_) => None,
        }
    }
}

/// What the guarded introspection region found out about a type.
#[derive(Debug)]
enum Introspected {
    Row(TupleHeader),
    Array(RawArray),
    Other,
}

/// Classifies engine datums into [`Value`]s.
#[derive(Clone, Debug)]
pub struct Classifier {
    scalars: ScalarTable,
    float8_element: TypeOid,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(ScalarTable::builtin())
    }
}

impl Classifier {
    /// Creates a classifier dispatching scalars through `scalars`.
    #[must_use]
    pub fn new(scalars: ScalarTable) -> Self {
        Self {
            scalars,
            float8_element: TypeOid::FLOAT8,
        }
    }

    /// Sets the element type OID whose arrays are exposed as float8 views.
    #[must_use]
    pub fn with_float8_element(mut self, oid: TypeOid) -> Self {
        self.float8_element = oid;
        self
    }

    /// The scalar dispatch table.
    pub fn scalars(&self) -> &ScalarTable {
        &self.scalars
    }

    /// Classifies `datum` of type `type_id`.
    ///
    /// `writable` requests a writable view when the datum is an array; it is ignored for other
    /// kinds. The datum must encode a value of `type_id`; this is not checked.
    ///
    /// Returns `Ok(None)` for types that are not supported.
    pub fn classify<E: Engine>(
        &self,
        engine: &E,
        writable: bool,
        type_id: TypeOid,
        datum: Datum,
    ) -> Result<Option<ValueRef>, MarshalError> {
        let introspected = engine
            .guarded(|engine| {
                // Both checks run; a fault in either one is reported. Rows win.
                let is_row = engine.type_is_rowtype(type_id);
                let is_array = engine.type_is_array(type_id);
                if is_row {
                    Introspected::Row(engine.datum_get_tuple_header(datum))
                } else if is_array {
                    Introspected::Array(engine.datum_get_array(datum))
                } else {
                    Introspected::Other
                }
            })
            .inspect_err(|fault| {
                error!(
                    type_oid = type_id.as_u32(),
                    fault = fault.message(),
                    "engine fault while classifying datum"
                );
            })?;

        let value = match introspected {
            Introspected::Row(tuple) => Some(Value::Composite(tuple)),
            Introspected::Array(array) => self.classify_array(writable, type_id, &array)?,
            Introspected::Other => self.classify_scalar(type_id, datum),
        };

        match &value {
            Some(v) => trace!(
                type_oid = type_id.as_u32(),
                writable,
                kind = ?v.kind(),
                "classified datum"
            ),
            None => debug!(type_oid = type_id.as_u32(), "unsupported type"),
        }
        Ok(value.map(Rc::new))
    }

    /// Classifies each argument of an engine function call, in order.
    ///
    /// NULL arguments are not inspected. The first hard error stops marshalling and is reported
    /// with the argument's position.
    pub fn marshal_args<E: Engine>(
        &self,
        engine: &E,
        writable: bool,
        args: &[Arg],
    ) -> Result<Vec<Marshalled>, MarshalError> {
        args.iter()
            .enumerate()
            .map(|(index, arg)| {
                if arg.is_null {
                    return Ok(Marshalled::Null);
                }
                match self.classify(engine, writable, arg.type_id, arg.datum) {
                    Ok(Some(v)) => Ok(Marshalled::Value(v)),
                    Ok(None) => Ok(Marshalled::Unsupported(arg.type_id)),
                    Err(source) => Err(MarshalError::Argument {
                        index,
                        source: source.into(),
                    }),
                }
            })
            .collect()
    }

    fn classify_array(
        &self,
        writable: bool,
        type_id: TypeOid,
        array: &RawArray,
    ) -> Result<Option<Value>, MarshalError> {
        let rejection = if array.ndim() != 1 {
            Some(ShapeRejection::Multidimensional { ndim: array.ndim() })
        } else if array.has_nulls() {
            Some(ShapeRejection::ContainsNulls)
        } else {
            None
        };
        if let Some(rejection) = rejection {
            warn!(type_oid = type_id.as_u32(), %rejection, "rejecting array");
            return Err(rejection.into());
        }

        // Only float8 elements are mapped so far; other element types stay unsupported.
        if array.elem_type() != self.float8_element {
            debug!(
                type_oid = type_id.as_u32(),
                elem_oid = array.elem_type().as_u32(),
                "unsupported array element type"
            );
            return Ok(None);
        }

        let Some(buffer) = f64::engine_buffer(array.data()) else {
            return Err(MarshalError::ElementStorage {
                elem_type: array.elem_type(),
                found: array.data().elem_kind(),
            });
        };
        let handle = Rc::new(ArrayHandle::<f64, Global>::share(buffer));
        let extent = Extent::new(array.dims()[0]);
        Ok(Some(if writable {
            Value::F64ArrayMut(ArrayViewMut::new(handle, extent)?)
        } else {
            Value::F64Array(ArrayView::new(handle, extent)?)
        }))
    }

    fn classify_scalar(&self, type_id: TypeOid, datum: Datum) -> Option<Value> {
        self.scalars.kind_of(type_id).map(|kind| kind.extract(datum))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{ArrayData, EngineBuffer};
    use crate::value::ValueKind;
    use alloc::vec;
    use core::cell::Cell;

    /// Engine answering every question from fixed fields.
    #[derive(Debug)]
    struct FixedEngine {
        row: bool,
        array: Option<RawArray>,
        array_faults: bool,
        calls: Cell<u32>,
    }

    impl FixedEngine {
        fn scalar() -> Self {
            Self {
                row: false,
                array: None,
                array_faults: false,
                calls: Cell::new(0),
            }
        }

        fn array(array: RawArray) -> Self {
            Self {
                array: Some(array),
                ..Self::scalar()
            }
        }
    }

    impl Engine for FixedEngine {
        fn type_is_rowtype(&self, _type_id: TypeOid) -> bool {
            self.calls.set(self.calls.get() + 1);
            self.row
        }

        fn type_is_array(&self, _type_id: TypeOid) -> bool {
            self.calls.set(self.calls.get() + 1);
            if self.array_faults {
                crate::guard::raise("array check failed");
            }
            self.array.is_some()
        }

        fn datum_get_tuple_header(&self, datum: Datum) -> TupleHeader {
            TupleHeader::new(datum.as_raw())
        }

        fn datum_get_array(&self, _datum: Datum) -> RawArray {
            self.array.clone().expect("array datum")
        }
    }

    fn float8s(dims: Vec<usize>, elems: Vec<f64>) -> RawArray {
        RawArray::new(TypeOid::FLOAT8, dims, ArrayData::F64(EngineBuffer::new(elems)))
    }

    #[test]
    fn builtin_table_covers_the_six_scalars() {
        let table = ScalarTable::builtin();
        assert_eq!(table.len(), 6);
        assert_eq!(table.kind_of(TypeOid::INT2), Some(ScalarKind::I16));
        assert_eq!(table.kind_of(TypeOid::FLOAT8_ARRAY), None);
    }

    #[test]
    fn registered_oids_extend_scalar_dispatch() {
        let domain = TypeOid::new(TypeOid::FIRST_NORMAL.as_u32() + 1);
        let mut table = ScalarTable::builtin();
        assert_eq!(table.register(domain, ScalarKind::I32), None);
        let c = Classifier::new(table);
        let v = c
            .classify(&FixedEngine::scalar(), false, domain, Datum::from_i32(5))
            .unwrap()
            .unwrap();
        assert_eq!(v.get::<i32>(), Ok(5));
    }

    #[test]
    fn rows_pass_through_as_tuple_headers() {
        let engine = FixedEngine {
            row: true,
            ..FixedEngine::scalar()
        };
        let v = Classifier::default()
            .classify(&engine, true, TypeOid::FIRST_NORMAL, Datum::from_raw(0x99))
            .unwrap()
            .unwrap();
        assert_eq!(v.as_composite(), Some(TupleHeader::new(0x99)));
        // The array check runs even for rows.
        assert_eq!(engine.calls.get(), 2);
    }

    #[cfg(feature = "std")]
    #[test]
    fn array_check_faults_are_reported_for_rows() {
        let engine = FixedEngine {
            row: true,
            array_faults: true,
            ..FixedEngine::scalar()
        };
        let err = Classifier::default()
            .classify(&engine, false, TypeOid::FIRST_NORMAL, Datum::from_raw(0x99))
            .unwrap_err();
        assert_eq!(
            err,
            MarshalError::ForeignFault(crate::guard::ForeignFault::new("array check failed"))
        );
        assert_eq!(engine.calls.get(), 2);
    }

    #[test]
    fn writable_flag_selects_the_view_variant() {
        let engine = FixedEngine::array(float8s(vec![2], vec![1.0, 2.0]));
        let c = Classifier::default();
        let ro = c
            .classify(&engine, false, TypeOid::FLOAT8_ARRAY, Datum::NULL)
            .unwrap()
            .unwrap();
        let rw = c
            .classify(&engine, true, TypeOid::FLOAT8_ARRAY, Datum::NULL)
            .unwrap()
            .unwrap();
        assert_eq!(ro.kind(), ValueKind::F64Array);
        assert_eq!(rw.kind(), ValueKind::F64ArrayMut);
        assert!(ro.as_array_mut().is_none());
        assert_eq!(rw.as_array().map(ArrayView::to_vec), Some(vec![1.0, 2.0]));
    }

    #[test]
    fn shape_checks_come_before_element_dispatch() {
        let c = Classifier::default();
        let engine = FixedEngine::array(RawArray::new(
            TypeOid::INT4,
            vec![1, 1],
            ArrayData::I32(EngineBuffer::new(vec![1])),
        ));
        assert_eq!(
            c.classify(&engine, false, TypeOid::INT4_ARRAY, Datum::NULL)
                .unwrap_err(),
            MarshalError::UnsupportedShape(ShapeRejection::Multidimensional { ndim: 2 })
        );

        let engine = FixedEngine::array(float8s(vec![], vec![]));
        assert_eq!(
            c.classify(&engine, false, TypeOid::FLOAT8_ARRAY, Datum::NULL)
                .unwrap_err(),
            MarshalError::UnsupportedShape(ShapeRejection::Multidimensional { ndim: 0 })
        );

        let engine = FixedEngine::array(float8s(vec![1], vec![1.0]).with_nulls());
        assert_eq!(
            c.classify(&engine, false, TypeOid::FLOAT8_ARRAY, Datum::NULL)
                .unwrap_err(),
            MarshalError::UnsupportedShape(ShapeRejection::ContainsNulls)
        );
    }

    #[test]
    fn other_element_types_are_unsupported() {
        let engine = FixedEngine::array(RawArray::one_dim(
            TypeOid::INT4,
            ArrayData::I32(EngineBuffer::new(vec![1, 2])),
        ));
        let got = Classifier::default()
            .classify(&engine, false, TypeOid::INT4_ARRAY, Datum::NULL)
            .unwrap();
        assert!(got.is_none());
    }

    #[test]
    fn mismatched_storage_and_oversized_extent_are_errors() {
        let c = Classifier::default();
        let engine = FixedEngine::array(RawArray::one_dim(
            TypeOid::FLOAT8,
            ArrayData::F32(EngineBuffer::new(vec![1.0])),
        ));
        assert_eq!(
            c.classify(&engine, false, TypeOid::FLOAT8_ARRAY, Datum::NULL)
                .unwrap_err(),
            MarshalError::ElementStorage {
                elem_type: TypeOid::FLOAT8,
                found: ScalarKind::F32
            }
        );

        let engine = FixedEngine::array(float8s(vec![3], vec![1.0]));
        assert!(matches!(
            c.classify(&engine, true, TypeOid::FLOAT8_ARRAY, Datum::NULL),
            Err(MarshalError::Shape(_))
        ));
    }

    #[test]
    fn float8_element_oid_is_configurable() {
        let custom = TypeOid::new(9701);
        let engine = FixedEngine::array(RawArray::one_dim(
            custom,
            ArrayData::F64(EngineBuffer::new(vec![4.0])),
        ));
        let default = Classifier::default();
        assert!(
            default
                .classify(&engine, false, TypeOid::INVALID, Datum::NULL)
                .unwrap()
                .is_none()
        );
        let configured = Classifier::default().with_float8_element(custom);
        let v = configured
            .classify(&engine, false, TypeOid::INVALID, Datum::NULL)
            .unwrap()
            .unwrap();
        assert_eq!(v.as_array().and_then(|a| a.get(0)), Some(4.0));
    }

    #[test]
    fn marshal_args_reports_the_failing_position() {
        let engine = FixedEngine::array(float8s(vec![1], vec![1.0]).with_nulls());
        let err = Classifier::default()
            .marshal_args(
                &engine,
                false,
                &[
                    Arg::null(TypeOid::FLOAT8_ARRAY),
                    Arg::new(TypeOid::FLOAT8_ARRAY, Datum::NULL),
                ],
            )
            .unwrap_err();
        assert!(err.is_unsupported_shape());
        assert!(matches!(err, MarshalError::Argument { index: 1, .. }));
    }
}
