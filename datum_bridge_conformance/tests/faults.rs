// Copyright 2026 the Datum Bridge Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Engine faults and argument marshalling.

use datum_bridge::sim::SimEngine;
use datum_bridge::{Arg, Classifier, Datum, Marshalled, MarshalError, TypeOid};
use datum_bridge_conformance::{float8_array, init_tracing};

#[test]
fn introspection_faults_become_errors() {
    init_tracing();
    let mut engine = SimEngine::new();
    let row_type = engine.register_row_type();
    engine.fault_on(row_type);

    let err = Classifier::default()
        .classify(&engine, false, row_type, Datum::NULL)
        .unwrap_err();
    let MarshalError::ForeignFault(fault) = &err else {
        panic!("expected a foreign fault, got {err:?}");
    };
    assert_eq!(
        fault.message(),
        format!("cache lookup failed for type {row_type}")
    );
}

#[test]
fn faults_on_builtin_scalars_are_caught_too() {
    init_tracing();
    let mut engine = SimEngine::new();
    engine.fault_on(TypeOid::INT4);
    assert!(matches!(
        Classifier::default().classify(&engine, false, TypeOid::INT4, Datum::from_i32(1)),
        Err(MarshalError::ForeignFault(_))
    ));
    // Other types are unaffected.
    assert!(
        Classifier::default()
            .classify(&engine, false, TypeOid::INT8, Datum::from_i64(1))
            .unwrap()
            .is_some()
    );
}

#[test]
fn undecodable_datums_become_errors() {
    init_tracing();
    let mut engine = SimEngine::new();
    let row_type = engine.register_row_type();
    let c = Classifier::default();
    let bogus = Datum::from_i64(-1);

    for type_id in [row_type, TypeOid::FLOAT8_ARRAY] {
        let err = c.classify(&engine, true, type_id, bogus).unwrap_err();
        assert!(matches!(err, MarshalError::ForeignFault(_)), "{err:?}");
    }
}

#[test]
fn the_classifier_stays_usable_after_a_fault() {
    init_tracing();
    let mut engine = SimEngine::new();
    let c = Classifier::default();
    let good = engine.alloc_float8_array(vec![1.0]);

    assert!(
        c.classify(&engine, false, TypeOid::FLOAT8_ARRAY, Datum::from_raw(7))
            .is_err()
    );
    let v = c
        .classify(&engine, false, TypeOid::FLOAT8_ARRAY, good)
        .unwrap()
        .unwrap();
    assert_eq!(v.as_array().unwrap().get(0), Some(1.0));
}

#[test]
fn marshal_args_keeps_positions() {
    init_tracing();
    let mut engine = SimEngine::new();
    let arr = engine.alloc_float8_array(vec![0.5, 1.5]);
    let unknown = TypeOid::new(77_777);

    let out = Classifier::default()
        .marshal_args(
            &engine,
            true,
            &[
                Arg::new(TypeOid::INT2, Datum::from_i16(-2)),
                Arg::null(TypeOid::FLOAT8),
                Arg::new(unknown, Datum::NULL),
                Arg::new(TypeOid::FLOAT8_ARRAY, arr),
            ],
        )
        .unwrap();

    assert_eq!(out.len(), 4);
    assert_eq!(out[0].value().unwrap().get::<i16>(), Ok(-2));
    assert!(matches!(out[1], Marshalled::Null));
    assert!(matches!(out[2], Marshalled::Unsupported(oid) if oid == unknown));
    let view = out[3].value().unwrap().as_array_mut().unwrap();
    view.set(0, 9.0).unwrap();
    assert_eq!(engine.float8_buffer(arr).unwrap().get(0), Some(9.0));
}

#[test]
fn marshal_args_stops_at_the_first_error() {
    init_tracing();
    let mut engine = SimEngine::new();
    let square = float8_array(&mut engine, vec![2, 2], vec![0.0; 4]);
    engine.fault_on(TypeOid::BOOL);

    let err = Classifier::default()
        .marshal_args(
            &engine,
            false,
            &[
                Arg::new(TypeOid::INT4, Datum::from_i32(3)),
                Arg::new(TypeOid::FLOAT8_ARRAY, square),
                Arg::new(TypeOid::BOOL, Datum::from_bool(true)),
            ],
        )
        .unwrap_err();
    let MarshalError::Argument { index, source } = &err else {
        panic!("expected an argument error, got {err:?}");
    };
    assert_eq!(*index, 1);
    assert!(source.is_unsupported_shape());
    assert!(err.to_string().contains("argument 1"), "{err}");
}

#[test]
fn null_arguments_are_never_introspected() {
    init_tracing();
    let mut engine = SimEngine::new();
    engine.fault_on(TypeOid::FLOAT8_ARRAY);
    let out = Classifier::default()
        .marshal_args(&engine, false, &[Arg::null(TypeOid::FLOAT8_ARRAY)])
        .unwrap();
    assert!(matches!(out[..], [Marshalled::Null]));
}
