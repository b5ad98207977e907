use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

// DType — element types a record field can be declared with
//
// Readers hand back whatever numeric type is convenient (usually i64 or f64);
// the schema names the dtype the field must end up with. The set mirrors what
// atomistic training pipelines feed to models:
//
//   F16 / BF16 — half precision features
//   F32        — coordinates, energies, forces, cells (the default)
//   F64        — high-precision reference data
//   U8 / U32   — masks and indices
//   I32        — atomic numbers, per-atom structure indices
//   I64        — labels and wide indices

/// Enum of all supported element data types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    F16,
    BF16,
    F32,
    F64,
    U8,
    U32,
    I32,
    I64,
}

impl DType {
    /// Size of one element in bytes.
    pub fn size_in_bytes(&self) -> usize {
        match self {
            DType::F16 | DType::BF16 => 2,
            DType::F32 => 4,
            DType::F64 => 8,
            DType::U8 => 1,
            DType::U32 | DType::I32 => 4,
            DType::I64 => 8,
        }
    }

    /// Whether this dtype is a floating-point type.
    pub fn is_float(&self) -> bool {
        matches!(self, DType::F16 | DType::BF16 | DType::F32 | DType::F64)
    }

    /// Whether this dtype is an integer type.
    pub fn is_int(&self) -> bool {
        !self.is_float()
    }

    /// Canonical long name, as used in schema descriptors.
    pub fn as_str(&self) -> &'static str {
        match self {
            DType::F16 => "float16",
            DType::BF16 => "bfloat16",
            DType::F32 => "float32",
            DType::F64 => "float64",
            DType::U8 => "uint8",
            DType::U32 => "uint32",
            DType::I32 => "int32",
            DType::I64 => "int64",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let dtype = match s {
            "float16" | "f16" | "half" => DType::F16,
            "bfloat16" | "bf16" => DType::BF16,
            "float32" | "f32" | "float" => DType::F32,
            "float64" | "f64" | "double" => DType::F64,
            "uint8" | "u8" => DType::U8,
            "uint32" | "u32" => DType::U32,
            "int32" | "i32" | "int" => DType::I32,
            "int64" | "i64" => DType::I64,
            other => return Err(Error::InvalidSchema(format!("unknown dtype '{other}'"))),
        };
        Ok(dtype)
    }
}

impl Serialize for DType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

// WithDType — Rust types a field value can be read as or built from

/// Trait implemented by Rust types that can be stored in a record field.
///
/// `NumCast` gives range-checked conversion from the `i64` storage used for
/// integer fields; `to_f64`/`from_f64` cover the `f64` storage used for floats.
pub trait WithDType: Copy + Send + Sync + 'static + num_traits::NumCast + fmt::Debug {
    /// The corresponding DType enum variant.
    const DTYPE: DType;

    /// Convert this value to f64.
    fn to_f64(self) -> f64;

    /// Create a value of this type from f64 (saturating for integers).
    fn from_f64(v: f64) -> Self;
}

macro_rules! with_dtype_primitive {
    ($ty:ty, $dtype:expr) => {
        impl WithDType for $ty {
            const DTYPE: DType = $dtype;
            fn to_f64(self) -> f64 {
                self as f64
            }
            fn from_f64(v: f64) -> Self {
                v as $ty
            }
        }
    };
}

with_dtype_primitive!(f32, DType::F32);
with_dtype_primitive!(f64, DType::F64);
with_dtype_primitive!(u8, DType::U8);
with_dtype_primitive!(u32, DType::U32);
with_dtype_primitive!(i32, DType::I32);
with_dtype_primitive!(i64, DType::I64);

impl WithDType for half::f16 {
    const DTYPE: DType = DType::F16;
    fn to_f64(self) -> f64 {
        half::f16::to_f64(self)
    }
    fn from_f64(v: f64) -> Self {
        half::f16::from_f64(v)
    }
}

impl WithDType for half::bf16 {
    const DTYPE: DType = DType::BF16;
    fn to_f64(self) -> f64 {
        half::bf16::to_f64(self)
    }
    fn from_f64(v: f64) -> Self {
        half::bf16::from_f64(v)
    }
}

/// Round `v` to the precision of a float dtype.
pub(crate) fn round_to(dtype: DType, v: f64) -> f64 {
    match dtype {
        DType::F16 => half::f16::from_f64(v).to_f64(),
        DType::BF16 => half::bf16::from_f64(v).to_f64(),
        DType::F32 => (v as f32) as f64,
        _ => v,
    }
}

/// Check that an integer fits the range of an integer dtype.
pub(crate) fn int_fits(dtype: DType, v: i64) -> bool {
    match dtype {
        DType::U8 => <u8 as num_traits::NumCast>::from(v).is_some(),
        DType::U32 => <u32 as num_traits::NumCast>::from(v).is_some(),
        DType::I32 => <i32 as num_traits::NumCast>::from(v).is_some(),
        DType::I64 => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dtype_size() {
        assert_eq!(DType::F16.size_in_bytes(), 2);
        assert_eq!(DType::F32.size_in_bytes(), 4);
        assert_eq!(DType::I32.size_in_bytes(), 4);
        assert_eq!(DType::U8.size_in_bytes(), 1);
    }

    #[test]
    fn test_parse_names_and_aliases() {
        assert_eq!("float32".parse::<DType>().unwrap(), DType::F32);
        assert_eq!("i32".parse::<DType>().unwrap(), DType::I32);
        assert_eq!("bfloat16".parse::<DType>().unwrap(), DType::BF16);
        assert!("complex64".parse::<DType>().is_err());
    }

    #[test]
    fn test_round_to_precision() {
        assert_eq!(round_to(DType::F32, 3.14), 3.140000104904175);
        assert_eq!(round_to(DType::F64, 3.14), 3.14);
        assert_eq!(round_to(DType::F16, 1.0 / 3.0), half::f16::from_f64(1.0 / 3.0).to_f64());
    }

    #[test]
    fn test_int_range() {
        assert!(int_fits(DType::U8, 255));
        assert!(!int_fits(DType::U8, 256));
        assert!(!int_fits(DType::U32, -1));
        assert!(!int_fits(DType::I32, i64::from(i32::MAX) + 1));
        assert!(int_fits(DType::I64, i64::MIN));
    }

    #[test]
    fn test_with_dtype_mapping() {
        assert_eq!(<i32 as WithDType>::DTYPE, DType::I32);
        assert_eq!(<half::bf16 as WithDType>::DTYPE, DType::BF16);
        assert_eq!(<f32 as WithDType>::from_f64(0.5).to_f64(), 0.5);
    }
}
