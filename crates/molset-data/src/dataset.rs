// Dataset trait — unified interface for record sources

use std::iter::FusedIterator;
use std::sync::Arc;

use molset_core::{Record, Result, Schema};

/// A dataset is a finite, ordered, indexed collection of records produced on
/// demand.
///
/// Implementations must be `Send + Sync`: a dataset is immutable once built and
/// any number of consumers may read it at the same time, each through its own
/// cursor (see [`Records`]).
pub trait Dataset: Send + Sync {
    /// Total number of records.
    fn len(&self) -> usize;

    /// Whether the dataset is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Produce the record at position `index`.
    ///
    /// Every call produces the record afresh; nothing is cached.
    fn get(&self, index: usize) -> Result<Record>;

    /// The schema every produced record conforms to.
    fn schema(&self) -> &Schema;

    /// Optional human-readable name.
    fn name(&self) -> &str {
        "dataset"
    }
}

impl<D: Dataset + ?Sized> Dataset for Arc<D> {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn get(&self, index: usize) -> Result<Record> {
        (**self).get(index)
    }

    fn schema(&self) -> &Schema {
        (**self).schema()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<D: Dataset + ?Sized> Dataset for &D {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn get(&self, index: usize) -> Result<Record> {
        (**self).get(index)
    }

    fn schema(&self) -> &Schema {
        (**self).schema()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// A consumer-owned cursor over a dataset, yielding records in order.
///
/// A failed record is yielded as `Err` at its position and ends the iteration:
/// bad items are never skipped.
pub struct Records<'a, D: Dataset + ?Sized> {
    dataset: &'a D,
    position: usize,
    failed: bool,
}

impl<'a, D: Dataset + ?Sized> Records<'a, D> {
    /// A new cursor at the start of `dataset`.
    pub fn new(dataset: &'a D) -> Self {
        Self {
            dataset,
            position: 0,
            failed: false,
        }
    }

    /// Index of the next record to be produced.
    pub fn position(&self) -> usize {
        self.position
    }

    fn remaining(&self) -> usize {
        if self.failed {
            0
        } else {
            self.dataset.len().saturating_sub(self.position)
        }
    }
}

impl<'a, D: Dataset + ?Sized> Iterator for Records<'a, D> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining() == 0 {
            return None;
        }
        let result = self.dataset.get(self.position);
        self.position += 1;
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        // a failing record can end iteration early
        let remaining = self.remaining();
        (remaining.min(1), Some(remaining))
    }
}

impl<'a, D: Dataset + ?Sized> FusedIterator for Records<'a, D> {}

/// Iterate any dataset with a fresh cursor.
pub fn records<D: Dataset + ?Sized>(dataset: &D) -> Records<'_, D> {
    Records::new(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use molset_core::{default_schema, Error, Value, E_DATA};

    struct Countdown {
        n: usize,
        fail_at: Option<usize>,
        schema: Schema,
    }

    impl Countdown {
        fn new(n: usize, fail_at: Option<usize>) -> Self {
            Self {
                n,
                fail_at,
                schema: default_schema(false, false),
            }
        }
    }

    impl Dataset for Countdown {
        fn len(&self) -> usize {
            self.n
        }

        fn get(&self, index: usize) -> Result<Record> {
            if Some(index) == self.fail_at {
                return Err(Error::reader(index, "boom"));
            }
            Ok(Record::new().with(E_DATA, Value::scalar(index as f64)))
        }

        fn schema(&self) -> &Schema {
            &self.schema
        }
    }

    #[test]
    fn test_cursor_yields_in_order() {
        let ds = Countdown::new(3, None);
        let energies: Vec<f64> = records(&ds)
            .map(|r| r.unwrap().get(E_DATA).unwrap().scalar_f64().unwrap())
            .collect();
        assert_eq!(energies, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_cursor_stops_after_error() {
        let ds = Countdown::new(5, Some(1));
        let mut it = records(&ds);
        assert!(it.next().unwrap().is_ok());
        assert!(it.next().unwrap().is_err());
        assert_eq!(it.position(), 2);
        assert!(it.next().is_none());
        assert!(it.next().is_none());
    }

    #[test]
    fn test_independent_cursors() {
        let ds = Countdown::new(4, None);
        let mut a = records(&ds);
        a.next();
        a.next();
        let b = records(&ds);
        assert_eq!(a.position(), 2);
        assert_eq!(b.count(), 4);
        assert_eq!(a.count(), 2);
    }

    #[test]
    fn test_arc_and_dyn_datasets() {
        let ds: Arc<dyn Dataset> = Arc::new(Countdown::new(2, None));
        assert_eq!(ds.len(), 2);
        assert_eq!(records(&ds).count(), 2);
        assert_eq!(ds.name(), "dataset");
    }
}
