use serde::Serialize;

use crate::{Clamped, ElementKind};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValueError {
    #[error("Cannot convert {value} to a {kind} element")]
    TypeMismatch { kind: ElementKind, value: Value },
}

/// A kind-erased element value.
///
/// Mirrors the two numeric domains of native typed views: every kind except the
/// big integer ones reads and writes plain numbers, the big integer kinds only
/// accept integers of arbitrary width.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    BigInt(i128),
}

const TWO_POW_32: f64 = 4_294_967_296.0;

impl Value {
    fn mismatch(&self, kind: ElementKind) -> ValueError {
        ValueError::TypeMismatch { kind, value: *self }
    }

    /// Low 32 bits of the number truncated towards zero; NaN and infinities become 0.
    ///
    /// Callers narrow the result further with `as`, which keeps the low bits.
    pub(crate) fn to_modular(&self, kind: ElementKind) -> Result<u32, ValueError> {
        let x = self.to_number(kind)?;
        if !x.is_finite() {
            return Ok(0);
        }
        Ok(x.trunc().rem_euclid(TWO_POW_32) as u32)
    }

    pub(crate) fn to_number(&self, kind: ElementKind) -> Result<f64, ValueError> {
        match *self {
            Value::Number(x) if !kind.is_bigint() => Ok(x),
            _ => Err(self.mismatch(kind)),
        }
    }

    pub(crate) fn to_bigint(&self, kind: ElementKind) -> Result<i128, ValueError> {
        match *self {
            Value::BigInt(b) if kind.is_bigint() => Ok(b),
            _ => Err(self.mismatch(kind)),
        }
    }

    pub fn as_f64(&self) -> f64 {
        match *self {
            Value::Number(x) => x,
            Value::BigInt(b) => b as f64,
        }
    }

    pub fn is_bigint(&self) -> bool {
        matches!(self, Value::BigInt(_))
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Number(x) => write!(f, "{}", x),
            Value::BigInt(b) => write!(f, "{}n", b),
        }
    }
}

macro_rules! number_from {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Number(v as f64)
            }
        })*
    };
}

macro_rules! bigint_from {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::BigInt(v as i128)
            }
        })*
    };
}

number_from!(i8, u8, i16, u16, i32, u32, f32, f64);
bigint_from!(i64, u64, i128);

impl From<Clamped> for Value {
    fn from(v: Clamped) -> Self {
        Value::Number(v.0 as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ViewElement;

    #[test]
    fn test_integer_wrapping() {
        assert_eq!(i8::from_value(&Value::from(200)).unwrap(), -56);
        assert_eq!(u8::from_value(&Value::from(-1)).unwrap(), 255);
        assert_eq!(u16::from_value(&Value::from(65537)).unwrap(), 1);
        assert_eq!(i32::from_value(&Value::from(-2.9)).unwrap(), -2);
        assert_eq!(u32::from_value(&Value::from(-1.0)).unwrap(), u32::MAX);
        assert_eq!(i16::from_value(&Value::from(f64::NAN)).unwrap(), 0);
        assert_eq!(u32::from_value(&Value::from(f64::INFINITY)).unwrap(), 0);
    }

    #[test]
    fn test_float_and_clamped() {
        assert_eq!(f32::from_value(&Value::from(0.1)).unwrap(), 0.1f32);
        assert_eq!(f64::from_value(&Value::from(-3.25)).unwrap(), -3.25);
        assert_eq!(Clamped::from_value(&Value::from(-7)).unwrap(), Clamped(0));
        assert_eq!(Clamped::from_value(&Value::from(254.5)).unwrap(), Clamped(254));
    }

    #[test]
    fn test_bigint_wrapping() {
        assert_eq!(i64::from_value(&Value::from(-5i64)).unwrap(), -5);
        assert_eq!(u64::from_value(&Value::from(-1i64)).unwrap(), u64::MAX);
        assert_eq!(
            i64::from_value(&Value::BigInt(1i128 << 64)).unwrap(),
            0,
            "2^64 wraps to zero"
        );
        assert_eq!(u64::MAX.to_value(), Value::BigInt(u64::MAX as i128));
    }

    #[test]
    fn test_domain_mismatch() {
        let err = i64::from_value(&Value::from(1)).unwrap_err();
        assert_eq!(
            err,
            ValueError::TypeMismatch {
                kind: ElementKind::BigInt64,
                value: Value::Number(1.0)
            }
        );
        assert!(f32::from_value(&Value::from(1u64)).is_err());
        assert!(Clamped::from_value(&Value::BigInt(3)).is_err());
        assert_eq!(err.to_string(), "Cannot convert 1 to a bigint64 element");
    }
}
