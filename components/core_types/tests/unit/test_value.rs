//! Unit tests for the Value enum

use core_types::{format_number, ObjRef, Value};

#[cfg(test)]
mod value_truthiness_tests {
    use super::*;

    #[test]
    fn test_only_nil_and_false_are_falsey() {
        let falsey = [Value::Nil, Value::Bool(false)];
        let truthy = [
            Value::Bool(true),
            Value::Number(0.0),
            Value::Number(-1.0),
            Value::Obj(ObjRef(0)),
        ];
        assert!(falsey.iter().all(Value::is_falsey));
        assert!(truthy.iter().all(|v| !v.is_falsey()));
    }
}

#[cfg(test)]
mod value_conversion_tests {
    use super::*;

    #[test]
    fn test_from_primitives() {
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(1.5), Value::Number(1.5));
        assert_eq!(Value::from(ObjRef(9)), Value::Obj(ObjRef(9)));
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Value::Number(4.0).as_number(), Some(4.0));
        assert_eq!(Value::Nil.as_number(), None);
        assert_eq!(Value::Obj(ObjRef(2)).as_obj(), Some(ObjRef(2)));
        assert!(Value::Number(1.0).is_number());
        assert!(!Value::Bool(true).is_number());
    }

    #[test]
    fn test_default_is_nil() {
        assert_eq!(Value::default(), Value::Nil);
    }
}

#[cfg(test)]
mod number_format_tests {
    use super::*;

    #[test]
    fn test_integral_numbers_have_no_fraction() {
        assert_eq!(format_number(7.0), "7");
        assert_eq!(format_number(-12.0), "-12");
        assert_eq!(format_number(100000.0), "100000");
    }

    #[test]
    fn test_fractions_round_trip() {
        assert_eq!(format_number(3.5), "3.5");
        assert_eq!(format_number(0.25), "0.25");
        let text = format_number(0.1 + 0.2);
        assert_eq!(text.parse::<f64>().unwrap(), 0.1 + 0.2);
    }

    #[test]
    fn test_non_finite() {
        assert_eq!(format_number(f64::NAN), "nan");
        assert_eq!(format_number(f64::NEG_INFINITY), "-inf");
    }
}
