//! Integration tests for numeric coercion

use std::str::FromStr;

use bigdecimal::BigDecimal;

use oracle_coerce::column::ColumnDescriptor;
use oracle_coerce::config::{CoercionConfig, SessionTimeZone};
use oracle_coerce::registry::ColumnTypeRegistry;
use oracle_coerce::types::{decode_oracle_number, encode_oracle_number};
use oracle_coerce::value::{HostType, HostValue};
use oracle_coerce::Error;

fn write_read(declared: &str, value: HostValue) -> oracle_coerce::Result<HostValue> {
    let mut registry = ColumnTypeRegistry::new(CoercionConfig::default());
    let column = ColumnDescriptor::from_declared("measurement", declared, true);
    let coercer = registry.coercer_for("readings", &column)?;
    let bind = coercer.to_storage(&value, &column, None, SessionTimeZone::Utc)?;
    coercer.to_host(&bind.into_raw(), &column, None)
}

fn dec(s: &str) -> BigDecimal {
    BigDecimal::from_str(s).unwrap()
}

mod binary_float_tests {
    use super::*;

    #[test]
    fn test_binary_float_reads_single_precision_value() {
        let read = write_read("BINARY_FLOAT", HostValue::Float(4.4)).unwrap();
        assert_eq!(read, HostValue::Float(4.4f32 as f64));
        assert_eq!(read.as_f64().unwrap(), 4.400000095367432);
        assert_ne!(read.as_f64().unwrap(), 4.4);
    }

    #[test]
    fn test_binary_double_reads_exact_value() {
        let read = write_read("BINARY_DOUBLE", HostValue::Float(4.4)).unwrap();
        assert_eq!(read.as_f64().unwrap(), 4.4);
    }

    #[test]
    fn test_binary_float_from_text_and_decimal() {
        assert_eq!(
            write_read("BINARY_FLOAT", "0.5".into()).unwrap(),
            HostValue::Float(0.5)
        );
        assert_eq!(
            write_read("BINARY_FLOAT", HostValue::Decimal(dec("-2.25"))).unwrap(),
            HostValue::Float(-2.25)
        );
    }

    #[test]
    fn test_binary_float_rejects_values_beyond_single_precision() {
        for value in [
            HostValue::Float(1e300),
            HostValue::Float(-3.5e38),
            HostValue::Decimal(dec("1e300")),
            "4e38".into(),
        ] {
            let err = write_read("BINARY_FLOAT", value.clone()).unwrap_err();
            match err {
                Error::OutOfRange { type_name, .. } => assert_eq!(type_name, "BINARY_FLOAT"),
                other => panic!("expected out of range for {:?}, got {:?}", value, other),
            }
        }

        // the largest f32 still fits
        let read = write_read("BINARY_FLOAT", HostValue::Float(f32::MAX as f64)).unwrap();
        assert_eq!(read, HostValue::Float(f32::MAX as f64));
        assert_eq!(
            write_read("BINARY_DOUBLE", HostValue::Float(1e300)).unwrap(),
            HostValue::Float(1e300)
        );
    }
}

mod number_tests {
    use super::*;

    #[test]
    fn test_integer_columns() {
        assert_eq!(
            write_read("NUMBER(18)", HostValue::Integer(999_999_999_999_999_999)).unwrap(),
            HostValue::Integer(999_999_999_999_999_999)
        );
        assert_eq!(
            write_read("NUMBER(5,0)", HostValue::Integer(-12345)).unwrap(),
            HostValue::Integer(-12345)
        );
    }

    #[test]
    fn test_wide_integer_column_reads_as_decimal() {
        assert_eq!(
            write_read("NUMBER(38)", HostValue::Integer(i64::MAX)).unwrap(),
            HostValue::Decimal(BigDecimal::from(i64::MAX))
        );
    }

    #[test]
    fn test_scale_rounding_half_up() {
        assert_eq!(
            write_read("NUMBER(8,2)", HostValue::Decimal(dec("1.005"))).unwrap(),
            HostValue::Decimal(dec("1.01"))
        );
        assert_eq!(
            write_read("NUMBER(8,2)", HostValue::Decimal(dec("1.004"))).unwrap(),
            HostValue::Decimal(dec("1.00"))
        );
        assert_eq!(
            write_read("NUMBER(6)", HostValue::Decimal(dec("2.5"))).unwrap(),
            HostValue::Integer(3)
        );
    }

    #[test]
    fn test_negative_scale_rounds_to_tens() {
        assert_eq!(
            write_read("NUMBER(5,-2)", HostValue::Integer(123_456)).unwrap(),
            HostValue::Decimal(dec("123500"))
        );
    }

    #[test]
    fn test_precision_overflow() {
        let err = write_read("NUMBER(4,2)", HostValue::Decimal(dec("100.5"))).unwrap_err();
        match err {
            Error::PrecisionOverflow {
                value,
                precision,
                scale,
            } => {
                assert_eq!(value, "100.5");
                assert_eq!(precision, 4);
                assert_eq!(scale, 2);
            }
            other => panic!("expected precision overflow, got {:?}", other),
        }

        assert!(matches!(
            write_read("NUMBER(3)", HostValue::Integer(1000)),
            Err(Error::PrecisionOverflow { .. })
        ));
    }

    #[test]
    fn test_float_into_number_uses_shortest_representation() {
        assert_eq!(
            write_read("NUMBER", HostValue::Float(4.4)).unwrap(),
            HostValue::Decimal(dec("4.4"))
        );
    }

    #[test]
    fn test_null_round_trip() {
        assert_eq!(
            write_read("NUMBER(10,2)", HostValue::Null).unwrap(),
            HostValue::Null
        );
    }

    #[test]
    fn test_wire_format_of_known_values() {
        // 1 -> exponent byte 0xc1, mantissa 2
        assert_eq!(encode_oracle_number(&dec("1")).unwrap(), vec![0xc1, 0x02]);
        // -1 -> inverted exponent, inverted mantissa, terminator
        assert_eq!(
            encode_oracle_number(&dec("-1")).unwrap(),
            vec![0x3e, 0x64, 0x66]
        );
        assert_eq!(decode_oracle_number(&[0xc2, 0x02, 0x18]).unwrap(), dec("123"));
    }
}

mod host_type_tests {
    use super::*;

    #[test]
    fn test_host_type_does_not_depend_on_values() {
        let registry = ColumnTypeRegistry::new(CoercionConfig::default());
        let cases = [
            ("NUMBER(9)", HostType::Integer),
            ("NUMBER(18,0)", HostType::Integer),
            ("NUMBER(19)", HostType::Decimal),
            ("NUMBER(12,4)", HostType::Decimal),
            ("NUMBER", HostType::Decimal),
            ("NUMBER(*,0)", HostType::Decimal),
            ("BINARY_FLOAT", HostType::Float),
            ("BINARY_DOUBLE", HostType::Float),
        ];

        for (declared, expected) in cases {
            let column = ColumnDescriptor::from_declared("n", declared, true);
            let coercer = registry.resolve(&column).unwrap();
            assert_eq!(
                coercer.host_type(&column, None).unwrap(),
                expected,
                "{}",
                declared
            );
        }
    }
}
