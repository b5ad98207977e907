// Schema — declared field set of the records a dataset produces
//
// A schema maps field names to a dtype and a shape pattern. It is either built
// from the two feature flags of a list loader:
//
//   default_schema(pbc = false, force = false)
//     elems   int32    [atoms]
//     coord   float32  [atoms, 3]
//     e_data  float32  []
//   + cell    float32  [3, 3]       when pbc
//   + f_data  float32  [atoms, 3]   when force
//
// or given explicitly, in code or as a JSON descriptor:
//
//   {"elems": {"dtype": "int32", "shape": [null]},
//    "coord": {"dtype": "float32", "shape": [null, 3]}}
//
// Validation turns a raw reader record into a record holding exactly the
// declared fields, each coerced to its declared dtype.

use std::collections::btree_map::{self, BTreeMap};

use serde::{Deserialize, Serialize};

use crate::dtype::DType;
use crate::dynamic_shape::{ShapeEnv, SymDim, SymbolicShape};
use crate::error::{Error, Result};
use crate::record::Record;

/// Per-atom atomic numbers.
pub const ELEMS: &str = "elems";
/// Per-atom cartesian coordinates.
pub const COORD: &str = "coord";
/// Total energy of the structure.
pub const E_DATA: &str = "e_data";
/// Periodic cell vectors (row-wise).
pub const CELL: &str = "cell";
/// Per-atom forces.
pub const F_DATA: &str = "f_data";

/// Symbolic name shared by the per-atom dims of the default schema.
pub const ATOMS: &str = "atoms";

/// Declared dtype and shape pattern of one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub dtype: DType,
    pub shape: SymbolicShape,
}

impl FieldSpec {
    pub fn new(dtype: DType, shape: impl Into<SymbolicShape>) -> Self {
        Self {
            dtype,
            shape: shape.into(),
        }
    }

    /// A scalar field.
    pub fn scalar(dtype: DType) -> Self {
        Self::new(dtype, SymbolicShape::scalar())
    }

    /// A field with one row per atom: `[atoms, trailing...]`.
    pub fn per_atom(dtype: DType, trailing: &[usize]) -> Self {
        let mut dims = vec![SymDim::symbolic(ATOMS)];
        dims.extend(trailing.iter().map(|&d| SymDim::Fixed(d)));
        Self::new(dtype, dims)
    }
}

/// Mapping from field name to [`FieldSpec`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    fields: BTreeMap<String, FieldSpec>,
}

/// The schema implied by the `pbc` and `force` flags.
pub fn default_schema(pbc: bool, force: bool) -> Schema {
    let mut schema = Schema::new()
        .with_field(ELEMS, FieldSpec::per_atom(DType::I32, &[]))
        .with_field(COORD, FieldSpec::per_atom(DType::F32, &[3]))
        .with_field(E_DATA, FieldSpec::scalar(DType::F32));
    if pbc {
        schema.insert(CELL, FieldSpec::new(DType::F32, vec![SymDim::Fixed(3), SymDim::Fixed(3)]));
    }
    if force {
        schema.insert(F_DATA, FieldSpec::per_atom(DType::F32, &[3]));
    }
    schema
}

impl Schema {
    /// An empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a field, builder style.
    pub fn with_field(mut self, name: impl Into<String>, spec: FieldSpec) -> Self {
        self.fields.insert(name.into(), spec);
        self
    }

    /// Add (or replace) a field, returning the previous spec.
    pub fn insert(&mut self, name: impl Into<String>, spec: FieldSpec) -> Option<FieldSpec> {
        self.fields.insert(name.into(), spec)
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Field names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, FieldSpec> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// A copy of `self` where every field of `overrides` replaces or extends
    /// the field of the same name.
    pub fn merge(&self, overrides: &Schema) -> Schema {
        let mut merged = self.clone();
        for (name, spec) in overrides.iter() {
            merged.fields.insert(name.clone(), spec.clone());
        }
        merged
    }

    /// Parse a JSON schema descriptor.
    pub fn from_json(json: &str) -> Result<Schema> {
        serde_json::from_str(json).map_err(|e| Error::InvalidSchema(e.to_string()))
    }

    /// Render this schema as a JSON descriptor.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::InvalidSchema(e.to_string()))
    }

    /// Check `record` against this schema and coerce it to the declared dtypes.
    ///
    /// With `strict`, fields the schema does not declare are rejected; without
    /// it they are dropped. The returned record holds exactly the declared
    /// fields. Symbolic dims are bound per record, so e.g. the atom count must
    /// agree across `elems`, `coord` and `f_data` of one structure.
    pub fn validate(&self, mut record: Record, strict: bool) -> Result<Record> {
        if strict {
            if let Some(extra) = record.names().find(|name| !self.contains(name)) {
                return Err(Error::undeclared(extra));
            }
        }

        let mut env = ShapeEnv::new();
        let mut out = Record::new();
        for (name, spec) in self.iter() {
            let value = record.remove(name).ok_or_else(|| Error::missing(name.as_str()))?;
            if !spec.shape.unify(value.shape(), &mut env) {
                return Err(Error::ShapeError {
                    field: name.clone(),
                    expected: spec.shape.clone(),
                    got: value.shape().clone(),
                });
            }
            out.insert(name.clone(), value.coerce(name, spec.dtype)?);
        }

        for dropped in record.names() {
            tracing::trace!(field = dropped, "dropping field not declared in schema");
        }
        Ok(out)
    }
}

impl FromIterator<(String, FieldSpec)> for Schema {
    fn from_iter<I: IntoIterator<Item = (String, FieldSpec)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}
