use std::collections::btree_map::{self, BTreeMap};

use crate::value::Value;

/// One training example: field name → value.
///
/// Fields are kept in name order so records print and compare deterministically.
/// Readers typically build one with the chained `with` helpers:
///
/// ```ignore
/// let record = Record::new()
///     .with(ELEMS, Value::vector(&[29i64]))
///     .with(COORD, Value::rows3(&[[0.0, 0.0, 0.0]]))
///     .with(E_DATA, Value::scalar(0.0f64));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a field, builder style.
    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    /// Add (or replace) a field, returning the previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.fields.insert(name.into(), value)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Field names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_lookup() {
        let r = Record::new()
            .with("e_data", Value::scalar(1.5f64))
            .with("elems", Value::vector(&[1i64, 8, 1]));
        assert_eq!(r.len(), 2);
        assert!(r.contains("elems"));
        assert_eq!(r.get("e_data").unwrap().scalar_f64().unwrap(), 1.5);
        assert_eq!(r.names().collect::<Vec<_>>(), vec!["e_data", "elems"]);
    }

    #[test]
    fn test_insert_replaces() {
        let mut r = Record::new().with("e_data", Value::scalar(1.0f64));
        let old = r.insert("e_data", Value::scalar(2.0f64));
        assert_eq!(old.unwrap().scalar_f64().unwrap(), 1.0);
        assert_eq!(r.len(), 1);
        assert!(r.remove("e_data").is_some());
        assert!(r.is_empty());
    }
}
