//! End-to-end appender tests against the in-memory backend.

use quiver_append::{Appender, Datum, SliceDatum};
use quiver_vector::{Database, EngineConfig, Interval, LogicalType, TypeTag, Value};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn single_column(capacity: usize, ty: LogicalType) -> (Database, Appender) {
    init_tracing();
    let db = Database::with_config(EngineConfig::with_vector_capacity(capacity));
    db.create_table("t", [("v", ty)]).expect("fresh table");
    let appender = Appender::new(db.appender("t").expect("table exists")).expect("appender");
    (db, appender)
}

fn round_trip(ty: LogicalType, datum: Datum) -> Value {
    let (db, mut appender) = single_column(8, ty);
    appender.append_row([datum]).expect("row accepted");
    appender.close().expect("flushed");
    let rows = db.scan("t").expect("table exists");
    assert_eq!(rows.len(), 1);
    rows[0][0].clone()
}

#[test]
fn test_integer_round_trips() {
    assert_eq!(
        round_trip(LogicalType::primitive(TypeTag::TinyInt), Datum::Int(-5)),
        Value::Int8(-5)
    );
    assert_eq!(
        round_trip(LogicalType::primitive(TypeTag::SmallInt), Datum::Int(300)),
        Value::Int16(300)
    );
    assert_eq!(
        round_trip(
            LogicalType::primitive(TypeTag::Integer),
            Datum::Int(-70_000)
        ),
        Value::Int32(-70_000)
    );
    assert_eq!(
        round_trip(
            LogicalType::primitive(TypeTag::BigInt),
            Datum::Int(i64::MIN)
        ),
        Value::Int64(i64::MIN)
    );
    assert_eq!(
        round_trip(
            LogicalType::primitive(TypeTag::HugeInt),
            Datum::Int(i64::MIN)
        ),
        Value::Int128(i128::from(i64::MIN))
    );
    assert_eq!(
        round_trip(LogicalType::primitive(TypeTag::UTinyInt), Datum::Int(255)),
        Value::UInt8(255)
    );
    assert_eq!(
        round_trip(
            LogicalType::primitive(TypeTag::USmallInt),
            Datum::Int(65_535)
        ),
        Value::UInt16(65_535)
    );
    assert_eq!(
        round_trip(
            LogicalType::primitive(TypeTag::UInteger),
            Datum::Int(4_000_000_000)
        ),
        Value::UInt32(4_000_000_000)
    );
    assert_eq!(
        round_trip(
            LogicalType::primitive(TypeTag::UBigInt),
            Datum::Int(i64::MAX)
        ),
        Value::UInt64(i64::MAX as u64)
    );
    assert_eq!(
        round_trip(
            LogicalType::primitive(TypeTag::UHugeInt),
            Datum::Int(i64::MAX)
        ),
        Value::UInt128(i64::MAX as u128)
    );
}

#[test]
fn test_float_and_bool_round_trips() {
    assert_eq!(
        round_trip(LogicalType::primitive(TypeTag::Float), Datum::Float(1.5)),
        Value::Float32(1.5)
    );
    assert_eq!(
        round_trip(LogicalType::primitive(TypeTag::Double), Datum::Float(-2.25)),
        Value::Float64(-2.25)
    );
    assert_eq!(
        round_trip(LogicalType::primitive(TypeTag::Boolean), Datum::Bool(true)),
        Value::Boolean(true)
    );
}

#[test]
fn test_temporal_round_trips() {
    assert_eq!(
        round_trip(LogicalType::primitive(TypeTag::Date), Datum::Int(19_000)),
        Value::Date(19_000)
    );
    assert_eq!(
        round_trip(
            LogicalType::primitive(TypeTag::Time),
            Datum::Int(43_200_000_000)
        ),
        Value::Time(43_200_000_000)
    );
    assert_eq!(
        round_trip(
            LogicalType::primitive(TypeTag::Timestamp),
            Datum::Int(1_700_000_000_000_000)
        ),
        Value::Timestamp(1_700_000_000_000_000)
    );
    // Timestamps with a time zone share the plain timestamp representation.
    assert_eq!(
        round_trip(
            LogicalType::primitive(TypeTag::TimestampTz),
            Datum::Int(1_700_000_000_000_000)
        ),
        Value::Timestamp(1_700_000_000_000_000)
    );
    let iv = Interval {
        months: 14,
        days: -3,
        micros: 86_400_000_000,
    };
    assert_eq!(
        round_trip(
            LogicalType::primitive(TypeTag::Interval),
            Datum::Bytes(iv.to_bytes().to_vec())
        ),
        Value::Interval(iv)
    );
}

#[test]
fn test_varlen_round_trips() {
    assert_eq!(
        round_trip(
            LogicalType::primitive(TypeTag::Varchar),
            Datum::from("héllo")
        ),
        Value::Text("héllo".into())
    );
    assert_eq!(
        round_trip(
            LogicalType::primitive(TypeTag::Blob),
            Datum::Bytes(vec![0x00, 0xff, 0x10])
        ),
        Value::Blob(vec![0x00, 0xff, 0x10])
    );
    assert_eq!(
        round_trip(
            LogicalType::primitive(TypeTag::Bit),
            Datum::Bytes(vec![0b1010_0101, 0b0000_0001])
        ),
        Value::Bit(vec![0b1010_0101, 0b0000_0001])
    );
}

#[test]
fn test_out_of_range_per_width() {
    for (ty, value, name) in [
        (TypeTag::TinyInt, 128i64, "tinyint"),
        (TypeTag::SmallInt, 40_000, "smallint"),
        (TypeTag::Integer, 3_000_000_000, "integer"),
        (TypeTag::UTinyInt, -1, "utinyint"),
        (TypeTag::USmallInt, 70_000, "usmallint"),
        (TypeTag::UInteger, -1, "uinteger"),
        (TypeTag::UBigInt, -1, "ubigint"),
    ] {
        let (_db, mut appender) = single_column(8, LogicalType::primitive(ty));
        let err = appender
            .append_value(0, value)
            .expect_err("out of range value");
        assert!(err.is_out_of_range(), "{name}: wrong error kind: {err}");
        assert!(err.to_string().contains(name), "{name}: {err}");
    }
}

#[test]
fn test_decimal_round_trip_and_scaling() {
    let (db, mut appender) = single_column(8, LogicalType::decimal(12, 3));
    appender.append_row([Datum::Float(1234.5678)]).expect("scaled");
    appender.append_row([Datum::Int(42)]).expect("unscaled integer");
    appender.append_row([Datum::Float(-0.001)]).expect("negative");
    appender.close().expect("flushed");
    assert_eq!(
        db.scan("t").expect("table exists"),
        vec![
            vec![Value::Decimal(1_234_567)],
            vec![Value::Decimal(42)],
            vec![Value::Decimal(-1)],
        ]
    );
}

#[test]
fn test_uuid_text_binary_identity() {
    let text = "8f2c1c1e-4a5b-7c6d-9e8f-001122334455";
    let raw = 0x8f2c_1c1e_4a5b_7c6d_9e8f_0011_2233_4455u128;

    let from_text = round_trip(LogicalType::primitive(TypeTag::Uuid), Datum::from(text));
    let from_binary = round_trip(
        LogicalType::primitive(TypeTag::Uuid),
        Datum::Bytes(raw.to_be_bytes().to_vec()),
    );
    assert_eq!(from_text, from_binary);
    assert_eq!(from_text, Value::Uuid((raw ^ (1u128 << 127)) as i128));
}

#[test]
fn test_uuid_malformed_inputs() {
    for bad in [
        "8f2c1c1e4a5b7c6d9e8f001122334455----",
        "8f2c1c1e-4a5b-7c6d-9e8f-00112233445g",
        "not a uuid",
    ] {
        let (_db, mut appender) =
            single_column(8, LogicalType::primitive(TypeTag::Uuid));
        let err = appender.append_value(0, bad).expect_err("malformed uuid");
        assert!(err.is_invalid_uuid(), "{bad}: {err}");
    }
}

#[test]
fn test_nulls_interleaved() {
    let (db, mut appender) = single_column(8, LogicalType::primitive(TypeTag::Integer));
    appender.append_row([Datum::Int(1)]).expect("row");
    appender.append_row([Datum::Null]).expect("null row");
    appender.append_row([Datum::Int(3)]).expect("row");
    appender.close().expect("flushed");
    assert_eq!(
        db.scan("t").expect("table exists"),
        vec![
            vec![Value::Int32(1)],
            vec![Value::Null],
            vec![Value::Int32(3)],
        ]
    );
}

#[test]
fn test_chunk_boundary_small_capacity() {
    // Capacity 4: ten rows cross two implicit flush points.
    let (db, mut appender) = single_column(4, LogicalType::primitive(TypeTag::BigInt));
    for i in 0..10i64 {
        appender.append_row([i]).expect("row accepted");
        // Rows become visible in engine-capacity batches.
        let visible = db.row_count("t").expect("table exists");
        assert_eq!(visible, ((i + 1) / 4 * 4) as usize);
    }
    appender.close().expect("flushed");
    let rows = db.scan("t").expect("table exists");
    assert_eq!(rows.len(), 10);
    for (i, row) in rows.iter().enumerate() {
        assert_eq!(row[0], Value::Int64(i as i64));
    }
}

#[test]
fn test_default_capacity_boundary() {
    init_tracing();
    let db = Database::new();
    db.create_table("t", [("v", LogicalType::primitive(TypeTag::Integer))])
        .expect("fresh table");
    let mut appender =
        Appender::new(db.appender("t").expect("table exists")).expect("appender");
    assert_eq!(appender.vector_capacity(), 2048);

    for i in 0..2049i64 {
        appender.append_row([i]).expect("row accepted");
    }
    // Exactly one implicit flush has happened.
    assert_eq!(db.row_count("t").expect("table exists"), 2048);
    appender.close().expect("flushed");
    assert_eq!(db.row_count("t").expect("table exists"), 2049);
}

#[test]
fn test_list_entries_share_child_vector() {
    let (db, mut appender) = single_column(
        8,
        LogicalType::list(LogicalType::primitive(TypeTag::Integer)),
    );
    appender
        .append_row([Datum::List(SliceDatum::Int32(vec![1, 2, 3]))])
        .expect("first list");
    appender
        .append_row([Datum::List(SliceDatum::Int32(vec![4, 5]))])
        .expect("second list");
    appender.append_row([Datum::Null]).expect("null list");
    appender.close().expect("flushed");
    assert_eq!(
        db.scan("t").expect("table exists"),
        vec![
            vec![Value::List(vec![
                Value::Int32(1),
                Value::Int32(2),
                Value::Int32(3)
            ])],
            vec![Value::List(vec![Value::Int32(4), Value::Int32(5)])],
            vec![Value::Null],
        ]
    );
}

#[test]
fn test_text_list_round_trip() {
    let (db, mut appender) = single_column(
        8,
        LogicalType::list(LogicalType::primitive(TypeTag::Varchar)),
    );
    appender
        .append_row([Datum::List(SliceDatum::Text(vec![
            "one".into(),
            "two".into(),
        ]))])
        .expect("text list");
    appender.close().expect("flushed");
    assert_eq!(
        db.scan("t").expect("table exists"),
        vec![vec![Value::List(vec![
            Value::Text("one".into()),
            Value::Text("two".into())
        ])]]
    );
}

#[test]
fn test_invalid_utf8_rejected_at_flush() {
    let (db, mut appender) = single_column(8, LogicalType::primitive(TypeTag::Varchar));
    appender
        .append_row([Datum::Bytes(vec![0xff, 0xfe])])
        .expect("staged; validation happens at flush");
    let err = appender.flush().expect_err("engine rejects bad utf-8");
    assert!(err.is_append_failed());
    assert!(err.to_string().contains("utf-8"));
    assert_eq!(appender.last_error(), Some(err.to_string().as_str()));

    // The rejected rows are gone and the appender accepts fresh ones.
    assert_eq!(db.row_count("t").expect("table exists"), 0);
    appender.append_row([Datum::from("ok")]).expect("fresh row");
    appender.close().expect("flushed");
    assert_eq!(
        db.scan("t").expect("table exists"),
        vec![vec![Value::Text("ok".into())]]
    );
}

#[test]
fn test_bind_type_mismatch_text() {
    let (_db, mut appender) = single_column(8, LogicalType::primitive(TypeTag::Boolean));
    let err = appender.append_value(0, 1i64).expect_err("integer into boolean");
    assert!(err.is_bind_type_mismatch());
    assert_eq!(
        err.to_string(),
        "type mismatch: cannot bind a integer value to a boolean column"
    );
}

#[test]
fn test_five_thousand_rows_mixed_styles() {
    init_tracing();
    let db = Database::with_config(EngineConfig::with_vector_capacity(512));
    db.create_table(
        "events",
        [
            ("id", LogicalType::primitive(TypeTag::Integer)),
            ("score", LogicalType::primitive(TypeTag::Double)),
            ("label", LogicalType::primitive(TypeTag::Varchar)),
        ],
    )
    .expect("fresh table");
    let mut appender =
        Appender::new(db.appender("events").expect("table exists")).expect("appender");

    for i in 0..5000i64 {
        if i % 2 == 0 {
            appender
                .append_row([
                    Datum::Int(i),
                    Datum::Float(i as f64 / 2.0),
                    Datum::from(format!("row-{i}")),
                ])
                .expect("row accepted");
        } else {
            appender.begin_row();
            appender.append_value(0, i).expect("id");
            appender.append_value(1, i as f64 / 2.0).expect("score");
            if i % 7 == 0 {
                appender.append_value(2, Datum::Null).expect("null label");
            } else {
                appender.append_value(2, format!("row-{i}")).expect("label");
            }
            appender.end_row().expect("row complete");
        }
        // Interleave explicit flushes with the implicit ones.
        if i % 1111 == 0 {
            appender.flush().expect("explicit flush");
        }
    }
    appender.close().expect("final flush");

    let rows = db.scan("events").expect("table exists");
    assert_eq!(rows.len(), 5000);
    for (i, row) in rows.iter().enumerate() {
        let i = i as i64;
        assert_eq!(row[0], Value::Int32(i as i32));
        assert_eq!(row[1], Value::Float64(i as f64 / 2.0));
        if i % 2 == 1 && i % 7 == 0 {
            assert_eq!(row[2], Value::Null);
        } else {
            assert_eq!(row[2], Value::Text(format!("row-{i}")));
        }
    }
}
