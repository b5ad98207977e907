// Dynamic Shapes — schema shape patterns with wildcard dimensions
//
// The size of an atomic structure is not known until its record is read, so a
// schema cannot spell out concrete shapes. A field shape is a pattern instead:
//
//   SymDim::Fixed(3)           — must be exactly 3 (coordinate components)
//   SymDim::Dynamic            — anything (a plain wildcard)
//   SymDim::Symbolic("atoms")  — anything, but the same value everywhere it
//                                appears within one record
//
// Symbolic names are bound per record through a ShapeEnv: `elems [atoms]`,
// `coord [atoms, 3]` and `f_data [atoms, 3]` must agree on the atom count of a
// structure, while two different structures may have different atom counts.
//
// Descriptor form (JSON): null = Dynamic, integer = Fixed, string = Symbolic.
//
//   {"shape": [null, 3]}       {"shape": ["atoms", 3]}       {"shape": []}

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::shape::Shape;

// SymDim — A single dimension that can be fixed, named, or dynamic

/// A dimension pattern in a field schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SymDim {
    /// Exact size, e.g. the 3 spatial components.
    Fixed(usize),
    /// Named wildcard; all occurrences within one record must agree.
    Symbolic(String),
    /// Unconstrained wildcard.
    Dynamic,
}

impl SymDim {
    /// Create a fixed dimension.
    pub fn fixed(n: usize) -> Self {
        SymDim::Fixed(n)
    }

    /// Create a named symbolic dimension.
    pub fn symbolic(name: impl Into<String>) -> Self {
        SymDim::Symbolic(name.into())
    }

    /// Create a dynamic (wildcard) dimension.
    pub fn dynamic() -> Self {
        SymDim::Dynamic
    }

    /// Is this a concrete (fixed) dimension?
    pub fn is_fixed(&self) -> bool {
        matches!(self, SymDim::Fixed(_))
    }

    /// Check a concrete value against this pattern without binding anything.
    ///
    /// Unbound symbolic names match any value.
    pub fn matches(&self, value: usize, env: &ShapeEnv) -> bool {
        match self {
            SymDim::Fixed(n) => value == *n,
            SymDim::Symbolic(name) => env.get(name).map_or(true, |bound| bound == value),
            SymDim::Dynamic => true,
        }
    }
}

impl fmt::Display for SymDim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymDim::Fixed(n) => write!(f, "{n}"),
            SymDim::Symbolic(s) => write!(f, "{s}"),
            SymDim::Dynamic => write!(f, "?"),
        }
    }
}

impl From<usize> for SymDim {
    fn from(n: usize) -> Self {
        SymDim::Fixed(n)
    }
}

impl From<&str> for SymDim {
    fn from(s: &str) -> Self {
        SymDim::Symbolic(s.to_string())
    }
}

impl From<Option<usize>> for SymDim {
    /// `None` is a wildcard, mirroring `[None, 3]` style shape declarations.
    fn from(d: Option<usize>) -> Self {
        d.map_or(SymDim::Dynamic, SymDim::Fixed)
    }
}

impl Serialize for SymDim {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SymDim::Fixed(n) => serializer.serialize_u64(*n as u64),
            SymDim::Symbolic(name) => serializer.serialize_str(name),
            SymDim::Dynamic => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for SymDim {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Fixed(usize),
            Symbolic(String),
        }

        Ok(match Option::<Repr>::deserialize(deserializer)? {
            None => SymDim::Dynamic,
            Some(Repr::Fixed(n)) => SymDim::Fixed(n),
            Some(Repr::Symbolic(name)) => SymDim::Symbolic(name),
        })
    }
}

// SymbolicShape — A shape pattern with mixed fixed/symbolic/dynamic dims

/// A shape pattern declared for one schema field.
///
/// ```ignore
/// let coord = SymbolicShape::from(vec![SymDim::symbolic("atoms"), SymDim::fixed(3)]);
/// let mut env = ShapeEnv::new();
/// assert!(coord.unify(&Shape::from((5, 3)), &mut env));
/// assert_eq!(env.get("atoms"), Some(5));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolicShape {
    dims: Vec<SymDim>,
}

impl SymbolicShape {
    /// Create a new symbolic shape from a vector of SymDim.
    pub fn new(dims: Vec<SymDim>) -> Self {
        Self { dims }
    }

    /// The scalar pattern `[]`.
    pub fn scalar() -> Self {
        Self { dims: Vec::new() }
    }

    /// Create a fully-fixed pattern from a concrete shape.
    pub fn from_shape(shape: &Shape) -> Self {
        Self {
            dims: shape.dims().iter().map(|&d| SymDim::Fixed(d)).collect(),
        }
    }

    /// Number of dimensions.
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Get the dimension patterns.
    pub fn dims(&self) -> &[SymDim] {
        &self.dims
    }

    /// Check if all dimensions are fixed.
    pub fn is_concrete(&self) -> bool {
        self.dims.iter().all(|d| d.is_fixed())
    }

    /// Whether the leading dimension is a wildcard (a per-atom field).
    pub fn has_variable_leading(&self) -> bool {
        self.dims.first().is_some_and(|d| !d.is_fixed())
    }

    /// Check if a concrete shape matches this pattern without binding.
    pub fn matches(&self, shape: &Shape, env: &ShapeEnv) -> bool {
        self.rank() == shape.rank()
            && self
                .dims
                .iter()
                .zip(shape.dims())
                .all(|(pattern, &value)| pattern.matches(value, env))
    }

    /// Unify this pattern with a concrete shape, binding symbolic dims.
    ///
    /// On failure `env` is left untouched. A name repeated inside the pattern
    /// must take the same value at every position.
    pub fn unify(&self, shape: &Shape, env: &mut ShapeEnv) -> bool {
        if self.rank() != shape.rank() {
            return false;
        }
        let mut new_bindings: Vec<(&str, usize)> = Vec::new();
        for (pattern, &value) in self.dims.iter().zip(shape.dims()) {
            match pattern {
                SymDim::Fixed(n) => {
                    if value != *n {
                        return false;
                    }
                }
                SymDim::Symbolic(name) => {
                    let bound = env.get(name).or_else(|| {
                        new_bindings
                            .iter()
                            .find(|(n, _)| *n == name.as_str())
                            .map(|&(_, v)| v)
                    });
                    match bound {
                        Some(b) if b != value => return false,
                        Some(_) => {}
                        None => new_bindings.push((name.as_str(), value)),
                    }
                }
                SymDim::Dynamic => {}
            }
        }
        for (name, value) in new_bindings {
            env.bind(name, value);
        }
        true
    }
}

impl fmt::Display for SymbolicShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{d}")?;
        }
        write!(f, "]")
    }
}

impl From<Vec<SymDim>> for SymbolicShape {
    fn from(dims: Vec<SymDim>) -> Self {
        Self::new(dims)
    }
}

impl From<Shape> for SymbolicShape {
    fn from(shape: Shape) -> Self {
        Self::from_shape(&shape)
    }
}

impl From<&[Option<usize>]> for SymbolicShape {
    fn from(dims: &[Option<usize>]) -> Self {
        Self::new(dims.iter().map(|&d| SymDim::from(d)).collect())
    }
}

// ShapeEnv — symbolic bindings collected while validating one record

/// Maps symbolic dimension names to the concrete values seen in one record.
#[derive(Debug, Clone, Default)]
pub struct ShapeEnv {
    bindings: HashMap<String, usize>,
}

impl ShapeEnv {
    /// Create an empty shape environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a symbolic name to a concrete value.
    pub fn bind(&mut self, name: impl Into<String>, value: usize) {
        self.bindings.insert(name.into(), value);
    }

    /// Look up a bound value.
    pub fn get(&self, name: &str) -> Option<usize> {
        self.bindings.get(name).copied()
    }

    /// Number of bound names.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether nothing is bound yet.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord_pattern() -> SymbolicShape {
        SymbolicShape::new(vec![SymDim::symbolic("atoms"), SymDim::fixed(3)])
    }

    #[test]
    fn test_unify_binds_symbolic() {
        let mut env = ShapeEnv::new();
        assert!(coord_pattern().unify(&Shape::from((5, 3)), &mut env));
        assert_eq!(env.get("atoms"), Some(5));
    }

    #[test]
    fn test_unify_rejects_fixed_mismatch() {
        let mut env = ShapeEnv::new();
        assert!(!coord_pattern().unify(&Shape::from((5, 2)), &mut env));
        assert!(env.is_empty());
    }

    #[test]
    fn test_unify_rejects_rank_mismatch() {
        let mut env = ShapeEnv::new();
        assert!(!coord_pattern().unify(&Shape::from(15), &mut env));
    }

    #[test]
    fn test_unify_consistent_across_fields() {
        let elems = SymbolicShape::new(vec![SymDim::symbolic("atoms")]);
        let mut env = ShapeEnv::new();
        assert!(elems.unify(&Shape::from(4), &mut env));
        assert!(coord_pattern().unify(&Shape::from((4, 3)), &mut env));
        assert!(!coord_pattern().unify(&Shape::from((5, 3)), &mut env));
    }

    #[test]
    fn test_repeated_name_in_one_pattern() {
        let square = SymbolicShape::new(vec![SymDim::symbolic("n"), SymDim::symbolic("n")]);
        let mut env = ShapeEnv::new();
        assert!(!square.unify(&Shape::from((2, 3)), &mut env));
        assert!(env.is_empty());
        assert!(square.unify(&Shape::from((3, 3)), &mut env));
    }

    #[test]
    fn test_dynamic_matches_anything() {
        let pattern = SymbolicShape::from(&[None, Some(3)][..]);
        let env = ShapeEnv::new();
        assert!(pattern.matches(&Shape::from((0, 3)), &env));
        assert!(pattern.matches(&Shape::from((100, 3)), &env));
        assert!(!pattern.matches(&Shape::from((100, 4)), &env));
        assert!(pattern.has_variable_leading());
    }

    #[test]
    fn test_display() {
        assert_eq!(coord_pattern().to_string(), "[atoms, 3]");
        assert_eq!(SymbolicShape::from(&[None][..]).to_string(), "[?]");
    }

    #[test]
    fn test_json_form() {
        let pattern: SymbolicShape = serde_json::from_str(r#"[null, "atoms", 3]"#).unwrap();
        assert_eq!(
            pattern.dims(),
            &[SymDim::Dynamic, SymDim::symbolic("atoms"), SymDim::Fixed(3)]
        );
        assert_eq!(serde_json::to_string(&pattern).unwrap(), r#"[null,"atoms",3]"#);
    }
}
