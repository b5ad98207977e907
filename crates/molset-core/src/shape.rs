use std::fmt;

// Shape — concrete shape of a record field
//
//   - Scalar (an energy):          Shape([])
//   - Per-atom vector (elements):  Shape([n_atoms])
//   - Per-atom 3-vectors (coords): Shape([n_atoms, 3])
//   - Periodic cell:               Shape([3, 3])
//
// The element count is the product of all dims; a scalar holds one element.

/// N-dimensional shape of a field value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Shape(Vec<usize>);

impl Shape {
    /// Create a new shape from a vector of dimension sizes.
    pub fn new(dims: Vec<usize>) -> Self {
        Shape(dims)
    }

    /// The scalar shape `[]`.
    pub fn scalar() -> Self {
        Shape(Vec::new())
    }

    /// The dimension sizes as a slice.
    pub fn dims(&self) -> &[usize] {
        &self.0
    }

    /// Number of dimensions (0 for scalar).
    pub fn rank(&self) -> usize {
        self.0.len()
    }

    /// Total number of elements. A scalar shape has 1 element.
    pub fn elem_count(&self) -> usize {
        self.0.iter().product()
    }

    /// Size of the leading dimension, `None` for scalars.
    pub fn leading(&self) -> Option<usize> {
        self.0.first().copied()
    }

    /// The shape without its leading dimension.
    pub fn trailing(&self) -> &[usize] {
        self.0.get(1..).unwrap_or(&[])
    }

    /// A new shape with `n` prepended as the leading dimension.
    pub fn prepend(&self, n: usize) -> Shape {
        let mut dims = Vec::with_capacity(self.rank() + 1);
        dims.push(n);
        dims.extend_from_slice(&self.0);
        Shape(dims)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", d)?;
        }
        write!(f, "]")
    }
}

impl From<()> for Shape {
    /// Scalar shape (0 dimensions).
    fn from(_: ()) -> Self {
        Shape(vec![])
    }
}

impl From<usize> for Shape {
    fn from(d: usize) -> Self {
        Shape(vec![d])
    }
}

impl From<(usize, usize)> for Shape {
    fn from((d0, d1): (usize, usize)) -> Self {
        Shape(vec![d0, d1])
    }
}

impl From<(usize, usize, usize)> for Shape {
    fn from((d0, d1, d2): (usize, usize, usize)) -> Self {
        Shape(vec![d0, d1, d2])
    }
}

impl From<Vec<usize>> for Shape {
    fn from(v: Vec<usize>) -> Self {
        Shape(v)
    }
}

impl From<&[usize]> for Shape {
    fn from(s: &[usize]) -> Self {
        Shape(s.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_shape() {
        let s = Shape::from(());
        assert_eq!(s.rank(), 0);
        assert_eq!(s.elem_count(), 1);
        assert_eq!(s.leading(), None);
        assert!(s.trailing().is_empty());
    }

    #[test]
    fn test_coord_shape() {
        let s = Shape::from((4, 3));
        assert_eq!(s.rank(), 2);
        assert_eq!(s.elem_count(), 12);
        assert_eq!(s.leading(), Some(4));
        assert_eq!(s.trailing(), &[3]);
    }

    #[test]
    fn test_empty_structure_has_no_elements() {
        assert_eq!(Shape::from((0, 3)).elem_count(), 0);
    }

    #[test]
    fn test_prepend() {
        assert_eq!(Shape::from((3, 3)).prepend(2), Shape::from((2, 3, 3)));
        assert_eq!(Shape::scalar().prepend(5), Shape::from(5));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Shape::from((3, 4))), "[3, 4]");
        assert_eq!(format!("{}", Shape::scalar()), "[]");
    }
}
