// Value — a tagged numeric array held by one record field
//
// Readers build values from whatever Rust numbers they have at hand; the
// schema later coerces each value to its declared dtype. Storage is widened:
//
//   integer dtypes  → Data::Int(Vec<i64>)
//   float dtypes    → Data::Float(Vec<f64>), rounded to the dtype's precision
//
// so coercion and batching never need per-dtype code paths, while `to_vec::<T>`
// hands the data back in the declared type.

use crate::dtype::{int_fits, round_to, DType, WithDType};
use crate::error::{Error, Result};
use crate::shape::Shape;

/// Flat, row-major element storage.
#[derive(Debug, Clone, PartialEq)]
pub enum Data {
    Int(Vec<i64>),
    Float(Vec<f64>),
}

impl Data {
    /// Number of stored elements.
    pub fn len(&self) -> usize {
        match self {
            Data::Int(v) => v.len(),
            Data::Float(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A field value: dtype + shape + flat data.
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    dtype: DType,
    shape: Shape,
    data: Data,
}

impl Value {
    /// Build a value from raw parts, checking the element count.
    ///
    /// The data variant must match the dtype kind (`Int` for integer dtypes).
    /// Type errors name the field `value`; use [`Value::from_field_data`] when
    /// the field is known.
    pub fn from_data(data: Data, shape: impl Into<Shape>, dtype: DType) -> Result<Self> {
        Self::from_field_data("value", data, shape, dtype)
    }

    /// Like [`Value::from_data`], reporting type errors against `field`.
    pub fn from_field_data(field: &str, data: Data, shape: impl Into<Shape>, dtype: DType) -> Result<Self> {
        let shape = shape.into();
        let expected = shape.elem_count();
        if data.len() != expected {
            return Err(Error::ElementCountMismatch {
                shape,
                expected,
                got: data.len(),
            });
        }
        let data = match (data, dtype.is_float()) {
            (Data::Float(v), true) => Data::Float(v.into_iter().map(|x| round_to(dtype, x)).collect()),
            (Data::Int(v), false) => {
                if let Some(bad) = v.iter().find(|&&x| !int_fits(dtype, x)) {
                    return Err(type_mismatch(field, dtype, format!("value {bad} out of range")));
                }
                Data::Int(v)
            }
            (Data::Int(_), true) => return Err(type_mismatch(field, dtype, "integer storage".to_string())),
            (Data::Float(_), false) => return Err(type_mismatch(field, dtype, "float storage".to_string())),
        };
        Ok(Self { dtype, shape, data })
    }

    /// Build a value from a typed slice; the dtype follows `T`.
    pub fn from_slice<T: WithDType>(values: &[T], shape: impl Into<Shape>) -> Result<Self> {
        Self::from_data(widen(values), shape, T::DTYPE)
    }

    /// A typed vector with explicit shape.
    pub fn from_vec<T: WithDType>(values: Vec<T>, shape: impl Into<Shape>) -> Result<Self> {
        Self::from_slice(&values, shape)
    }

    /// A scalar value.
    pub fn scalar<T: WithDType>(v: T) -> Self {
        Self {
            dtype: T::DTYPE,
            shape: Shape::scalar(),
            data: widen(&[v]),
        }
    }

    /// A rank-1 value, e.g. atomic numbers of a structure.
    pub fn vector<T: WithDType>(values: &[T]) -> Self {
        Self {
            dtype: T::DTYPE,
            shape: Shape::from(values.len()),
            data: widen(values),
        }
    }

    /// An `[n, 3]` value from per-atom 3-vectors (coordinates, forces).
    pub fn rows3(rows: &[[f64; 3]]) -> Self {
        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        Self {
            dtype: DType::F64,
            shape: Shape::from((rows.len(), 3)),
            data: Data::Float(flat),
        }
    }

    /// A `[3, 3]` value, e.g. a periodic cell.
    pub fn matrix3(m: &[[f64; 3]; 3]) -> Self {
        Self::rows3(m)
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn data(&self) -> &Data {
        &self.data
    }

    /// Number of elements.
    pub fn elem_count(&self) -> usize {
        self.data.len()
    }

    /// All elements converted to `f64`.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        match &self.data {
            Data::Int(v) => v.iter().map(|&x| x as f64).collect(),
            Data::Float(v) => v.clone(),
        }
    }

    /// All elements converted to `T`.
    ///
    /// Integers out of range for `T` and non-finite floats read as an integer
    /// type are an error.
    pub fn to_vec<T: WithDType>(&self) -> Result<Vec<T>> {
        match &self.data {
            Data::Int(v) => v
                .iter()
                .map(|&x| {
                    <T as num_traits::NumCast>::from(x)
                        .ok_or_else(|| type_mismatch("value", T::DTYPE, format!("value {x} out of range")))
                })
                .collect(),
            Data::Float(v) if T::DTYPE.is_float() => {
                Ok(v.iter().map(|&x| <T as WithDType>::from_f64(x)).collect())
            }
            Data::Float(v) => v
                .iter()
                .map(|&x| {
                    <T as num_traits::NumCast>::from(x)
                        .ok_or_else(|| type_mismatch("value", T::DTYPE, format!("value {x} not representable")))
                })
                .collect(),
        }
    }

    /// The single element of a scalar value as `f64`.
    pub fn scalar_f64(&self) -> Result<f64> {
        if self.shape.rank() != 0 {
            return Err(Error::msg(format!("not a scalar: value has shape {}", self.shape)));
        }
        Ok(self.to_f64_vec()[0])
    }

    /// Coerce to `target`, reporting failures against `field`.
    ///
    /// int → float always succeeds; float → float rounds to the target
    /// precision; float → int requires finite integral values; every integer
    /// result must fit the target range.
    pub fn coerce(&self, field: &str, target: DType) -> Result<Value> {
        if self.dtype == target {
            return Ok(self.clone());
        }
        let mismatch = |detail: String| type_mismatch(field, target, detail);
        let data = match (&self.data, target.is_float()) {
            (Data::Int(v), true) => Data::Float(v.iter().map(|&x| round_to(target, x as f64)).collect()),
            (Data::Float(v), true) => Data::Float(v.iter().map(|&x| round_to(target, x)).collect()),
            (Data::Float(v), false) => {
                let mut out = Vec::with_capacity(v.len());
                for &x in v {
                    if !x.is_finite() || x.fract() != 0.0 {
                        return Err(mismatch(format!("{} value {x} is not integral", self.dtype)));
                    }
                    match <i64 as num_traits::NumCast>::from(x) {
                        Some(i) if int_fits(target, i) => out.push(i),
                        _ => return Err(mismatch(format!("value {x} out of range"))),
                    }
                }
                Data::Int(out)
            }
            (Data::Int(v), false) => {
                if let Some(bad) = v.iter().find(|&&x| !int_fits(target, x)) {
                    return Err(mismatch(format!("value {bad} out of range")));
                }
                Data::Int(v.clone())
            }
        };
        Ok(Value {
            dtype: target,
            shape: self.shape.clone(),
            data,
        })
    }
}

fn type_mismatch(field: &str, expected: DType, detail: String) -> Error {
    Error::TypeMismatch {
        field: field.to_string(),
        expected,
        detail,
    }
}

/// Widen typed values to the storage variant of their dtype kind.
fn widen<T: WithDType>(values: &[T]) -> Data {
    if T::DTYPE.is_float() {
        Data::Float(values.iter().map(|&v| WithDType::to_f64(v)).collect())
    } else {
        // every integer WithDType type fits in i64
        Data::Int(
            values
                .iter()
                .map(|&v| <i64 as num_traits::NumCast>::from(v).unwrap_or(i64::MAX))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_value() {
        let v = Value::scalar(0.0f64);
        assert_eq!(v.dtype(), DType::F64);
        assert_eq!(v.shape().rank(), 0);
        assert_eq!(v.scalar_f64().unwrap(), 0.0);
    }

    #[test]
    fn test_element_count_checked() {
        let err = Value::from_vec(vec![1.0f64, 2.0], (1, 3)).unwrap_err();
        assert!(matches!(err, Error::ElementCountMismatch { expected: 3, got: 2, .. }));
    }

    #[test]
    fn test_rows3() {
        let v = Value::rows3(&[[0.0, 0.0, 0.0], [1.0, 2.0, 3.0]]);
        assert_eq!(v.shape(), &Shape::from((2, 3)));
        assert_eq!(v.to_f64_vec(), vec![0.0, 0.0, 0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_int_to_float_coercion() {
        let v = Value::vector(&[29i64, 47]).coerce("elems", DType::F32).unwrap();
        assert_eq!(v.dtype(), DType::F32);
        assert_eq!(v.to_vec::<f32>().unwrap(), vec![29.0, 47.0]);
    }

    #[test]
    fn test_integral_float_to_int_coercion() {
        let v = Value::vector(&[1.0f64, 8.0]).coerce("elems", DType::I32).unwrap();
        assert_eq!(v.data(), &Data::Int(vec![1, 8]));
    }

    #[test]
    fn test_fractional_float_to_int_rejected() {
        let err = Value::vector(&[1.5f64]).coerce("elems", DType::I32).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { expected: DType::I32, .. }));
        assert_eq!(err.field(), Some("elems"));
    }

    #[test]
    fn test_out_of_range_int_rejected() {
        let err = Value::vector(&[300i64]).coerce("mask", DType::U8).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
    }

    #[test]
    fn test_float_beyond_i64_rejected() {
        let err = Value::vector(&[1.0e19f64]).coerce("n", DType::I64).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { expected: DType::I64, .. }));
        let err = Value::vector(&[-1.0e19f64]).coerce("n", DType::I64).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
        let v = Value::vector(&[-9.0e18f64]).coerce("n", DType::I64).unwrap();
        assert_eq!(v.data(), &Data::Int(vec![-9_000_000_000_000_000_000]));
    }

    #[test]
    fn test_from_data_type_errors() {
        let err = Value::from_field_data("mask", Data::Int(vec![256]), 1, DType::U8).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { expected: DType::U8, .. }));
        assert_eq!(err.field(), Some("mask"));

        let err = Value::from_data(Data::Float(vec![1.0]), 1, DType::I32).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { expected: DType::I32, .. }));
        assert!(matches!(
            Value::from_data(Data::Int(vec![1]), 1, DType::F32),
            Err(Error::TypeMismatch { .. })
        ));
        assert!(matches!(Value::vector(&[-1i32]).to_vec::<u32>(), Err(Error::TypeMismatch { .. })));
    }

    #[test]
    fn test_float_rounding_to_f32() {
        let v = Value::scalar(0.1f64).coerce("e_data", DType::F32).unwrap();
        assert_eq!(v.scalar_f64().unwrap(), 0.1f32 as f64);
    }

    #[test]
    fn test_to_vec_roundtrip_types() {
        let v = Value::vector(&[1u8, 2, 3]);
        assert_eq!(v.dtype(), DType::U8);
        assert_eq!(v.to_vec::<i64>().unwrap(), vec![1, 2, 3]);
        assert!(Value::vector(&[-1i32]).to_vec::<u32>().is_err());
    }
}
