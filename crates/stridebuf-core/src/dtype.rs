use byteorder::{ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::{Value, ValueError};

/// The catalog of element types a view can decode.
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Int8,
    Uint8,
    Uint8Clamped,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Float32,
    Float64,
    BigInt64,
    BigUint64,
}

impl ElementKind {
    /// Returns the size of the type in bytes.
    pub const fn size_of(self) -> usize {
        match self {
            ElementKind::Int8 | ElementKind::Uint8 | ElementKind::Uint8Clamped => 1,
            ElementKind::Int16 | ElementKind::Uint16 => 2,
            ElementKind::Int32 | ElementKind::Uint32 | ElementKind::Float32 => 4,
            ElementKind::Float64 | ElementKind::BigInt64 | ElementKind::BigUint64 => 8,
        }
    }

    pub fn is_float(self) -> bool {
        matches!(self, ElementKind::Float32 | ElementKind::Float64)
    }

    /// Big integer kinds only accept [`Value::BigInt`], every other kind only [`Value::Number`].
    pub fn is_bigint(self) -> bool {
        matches!(self, ElementKind::BigInt64 | ElementKind::BigUint64)
    }
}

/// A Rust type that can be stored in a view, one per [`ElementKind`].
pub trait ViewElement:
    Copy + std::fmt::Debug + PartialEq + Send + Sync + 'static + bytemuck::Pod
{
    const KIND: ElementKind;

    /// `bytes` is exactly `KIND.size_of()` long.
    fn read_le(bytes: &[u8]) -> Self;

    fn write_le(self, bytes: &mut [u8]);

    fn to_value(self) -> Value;

    fn from_value(value: &Value) -> Result<Self, ValueError>;
}

/// An unsigned byte that saturates instead of wrapping when converted from a number.
#[repr(transparent)]
#[derive(
    Debug,
    Copy,
    Clone,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    bytemuck::Pod,
    bytemuck::Zeroable,
    Serialize,
    Deserialize,
)]
pub struct Clamped(pub u8);

impl Clamped {
    /// NaN maps to 0, everything else is clamped to `0..=255` and rounded half to even.
    pub fn from_f64(x: f64) -> Self {
        if x.is_nan() {
            return Clamped(0);
        }
        Clamped(x.clamp(0.0, 255.0).round_ties_even() as u8)
    }
}

impl From<u8> for Clamped {
    fn from(v: u8) -> Self {
        Clamped(v)
    }
}

impl From<Clamped> for u8 {
    fn from(v: Clamped) -> Self {
        v.0
    }
}

macro_rules! map_byte_type {
    ($t:ty, $v:ident) => {
        impl ViewElement for $t {
            const KIND: ElementKind = ElementKind::$v;

            fn read_le(bytes: &[u8]) -> Self {
                bytes[0] as Self
            }

            fn write_le(self, bytes: &mut [u8]) {
                bytes[0] = self as u8;
            }

            fn to_value(self) -> Value {
                Value::Number(self as f64)
            }

            fn from_value(value: &Value) -> Result<Self, ValueError> {
                Ok(value.to_modular(Self::KIND)? as Self)
            }
        }
    };
}

macro_rules! map_int_type {
    ($t:ty, $v:ident, $read:ident, $write:ident) => {
        impl ViewElement for $t {
            const KIND: ElementKind = ElementKind::$v;

            fn read_le(bytes: &[u8]) -> Self {
                LittleEndian::$read(bytes)
            }

            fn write_le(self, bytes: &mut [u8]) {
                LittleEndian::$write(bytes, self)
            }

            fn to_value(self) -> Value {
                Value::Number(self as f64)
            }

            fn from_value(value: &Value) -> Result<Self, ValueError> {
                Ok(value.to_modular(Self::KIND)? as Self)
            }
        }
    };
}

macro_rules! map_float_type {
    ($t:ty, $v:ident, $read:ident, $write:ident) => {
        impl ViewElement for $t {
            const KIND: ElementKind = ElementKind::$v;

            fn read_le(bytes: &[u8]) -> Self {
                LittleEndian::$read(bytes)
            }

            fn write_le(self, bytes: &mut [u8]) {
                LittleEndian::$write(bytes, self)
            }

            fn to_value(self) -> Value {
                Value::Number(self as f64)
            }

            fn from_value(value: &Value) -> Result<Self, ValueError> {
                Ok(value.to_number(Self::KIND)? as Self)
            }
        }
    };
}

macro_rules! map_bigint_type {
    ($t:ty, $v:ident, $read:ident, $write:ident) => {
        impl ViewElement for $t {
            const KIND: ElementKind = ElementKind::$v;

            fn read_le(bytes: &[u8]) -> Self {
                LittleEndian::$read(bytes)
            }

            fn write_le(self, bytes: &mut [u8]) {
                LittleEndian::$write(bytes, self)
            }

            fn to_value(self) -> Value {
                Value::BigInt(self as i128)
            }

            fn from_value(value: &Value) -> Result<Self, ValueError> {
                //`as` truncation is the 64 bit two's complement wrap
                Ok(value.to_bigint(Self::KIND)? as Self)
            }
        }
    };
}

map_byte_type!(i8, Int8);
map_byte_type!(u8, Uint8);
map_int_type!(i16, Int16, read_i16, write_i16);
map_int_type!(u16, Uint16, read_u16, write_u16);
map_int_type!(i32, Int32, read_i32, write_i32);
map_int_type!(u32, Uint32, read_u32, write_u32);
map_float_type!(f32, Float32, read_f32, write_f32);
map_float_type!(f64, Float64, read_f64, write_f64);
map_bigint_type!(i64, BigInt64, read_i64, write_i64);
map_bigint_type!(u64, BigUint64, read_u64, write_u64);

impl ViewElement for Clamped {
    const KIND: ElementKind = ElementKind::Uint8Clamped;

    fn read_le(bytes: &[u8]) -> Self {
        Clamped(bytes[0])
    }

    fn write_le(self, bytes: &mut [u8]) {
        bytes[0] = self.0;
    }

    fn to_value(self) -> Value {
        Value::Number(self.0 as f64)
    }

    fn from_value(value: &Value) -> Result<Self, ValueError> {
        Ok(Clamped::from_f64(value.to_number(Self::KIND)?))
    }
}

/// Binds `$T` to the Rust element type of a runtime [`ElementKind`] and evaluates `$body`.
macro_rules! with_element_type {
    ($kind:expr, $T:ident => $body:expr) => {
        match $kind {
            $crate::ElementKind::Int8 => {
                type $T = i8;
                $body
            }
            $crate::ElementKind::Uint8 => {
                type $T = u8;
                $body
            }
            $crate::ElementKind::Uint8Clamped => {
                type $T = $crate::Clamped;
                $body
            }
            $crate::ElementKind::Int16 => {
                type $T = i16;
                $body
            }
            $crate::ElementKind::Uint16 => {
                type $T = u16;
                $body
            }
            $crate::ElementKind::Int32 => {
                type $T = i32;
                $body
            }
            $crate::ElementKind::Uint32 => {
                type $T = u32;
                $body
            }
            $crate::ElementKind::Float32 => {
                type $T = f32;
                $body
            }
            $crate::ElementKind::Float64 => {
                type $T = f64;
                $body
            }
            $crate::ElementKind::BigInt64 => {
                type $T = i64;
                $body
            }
            $crate::ElementKind::BigUint64 => {
                type $T = u64;
                $body
            }
        }
    };
}

pub(crate) use with_element_type;

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_widths_match_rust_types() {
        for kind in ElementKind::iter() {
            let rust_size = with_element_type!(kind, T => std::mem::size_of::<T>());
            assert_eq!(kind.size_of(), rust_size, "{}", kind);
            let declared = with_element_type!(kind, T => <T as ViewElement>::KIND);
            assert_eq!(declared, kind);
        }
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(ElementKind::Uint8Clamped.to_string(), "uint8clamped");
        assert_eq!("Float32".parse::<ElementKind>().unwrap(), ElementKind::Float32);
        assert_eq!("bigint64".parse::<ElementKind>().unwrap(), ElementKind::BigInt64);
        assert!("float16".parse::<ElementKind>().is_err());
    }

    #[test]
    fn test_clamped_rounding() {
        assert_eq!(Clamped::from_f64(f64::NAN), Clamped(0));
        assert_eq!(Clamped::from_f64(-4.0), Clamped(0));
        assert_eq!(Clamped::from_f64(300.0), Clamped(255));
        assert_eq!(Clamped::from_f64(1.5), Clamped(2));
        assert_eq!(Clamped::from_f64(2.5), Clamped(2));
        assert_eq!(Clamped::from_f64(2.51), Clamped(3));
    }

    #[test]
    fn test_little_endian_layout() {
        let mut bytes = [0u8; 4];
        0x0102_0304u32.write_le(&mut bytes);
        assert_eq!(bytes, [4, 3, 2, 1]);
        assert_eq!(i16::read_le(&[0xff, 0xff]), -1);
        assert_eq!(f32::read_le(&1f32.to_le_bytes()), 1.0);
    }
}
