// BatchLoader — sparse batching of variable-size structures
//
// Structures in one batch have different atom counts, so per-atom fields
// cannot be stacked into a dense [batch, atoms, ...] block. Instead:
//
//   per-atom fields (leading dim is a wildcard)   → concatenated along axis 0
//   per-structure fields (e_data, cell, ...)      → stacked under a batch axis
//   ind_1 [total_atoms, 1] int32                  → structure index of each atom
//
// Example, two structures with 1 and 2 atoms:
//
//   elems  [1] + [2]       → [3]         ind_1  [[0], [1], [1]]
//   coord  [1,3] + [2,3]   → [3, 3]
//   e_data []  + []        → [2]
//   cell   [3,3] + [3,3]   → [2, 3, 3]

use std::borrow::Cow;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{thread_rng, SeedableRng};
use rayon::prelude::*;

use molset_core::{bail, Data, DType, Error, FieldSpec, Record, Result, Schema, Shape, SymDim, Value, ELEMS};

use crate::dataset::Dataset;

/// Name of the per-atom structure index field added to every batch.
pub const IND_1: &str = "ind_1";

/// Configuration for the BatchLoader.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Number of structures per batch.
    pub batch_size: usize,
    /// Whether to drop the last incomplete batch.
    pub drop_last: bool,
    /// Whether to shuffle record order each epoch.
    pub shuffle: bool,
    /// Optional random seed for reproducible shuffling.
    pub seed: Option<u64>,
    /// Number of parallel workers for record fetching (0 = sequential).
    pub num_workers: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 32,
            drop_last: false,
            shuffle: false,
            seed: None,
            num_workers: 0,
        }
    }
}

impl BatchConfig {
    pub fn batch_size(mut self, bs: usize) -> Self {
        self.batch_size = bs;
        self
    }

    pub fn drop_last(mut self, d: bool) -> Self {
        self.drop_last = d;
        self
    }

    pub fn shuffle(mut self, s: bool) -> Self {
        self.shuffle = s;
        self
    }

    pub fn seed(mut self, s: u64) -> Self {
        self.seed = Some(s);
        self
    }

    pub fn num_workers(mut self, n: usize) -> Self {
        self.num_workers = n;
        self
    }
}

/// Groups the records of a dataset into sparse batches.
pub struct BatchLoader<'a, D: Dataset + ?Sized> {
    dataset: &'a D,
    config: BatchConfig,
    indices: Vec<usize>,
    epoch: u64,
}

impl<'a, D: Dataset + ?Sized> BatchLoader<'a, D> {
    /// Create a new BatchLoader over a dataset.
    ///
    /// # Panics
    /// Panics if `config.batch_size` is zero.
    pub fn new(dataset: &'a D, config: BatchConfig) -> Self {
        assert!(config.batch_size > 0, "BatchLoader: batch_size must be positive");
        tracing::debug!(
            dataset = dataset.name(),
            records = dataset.len(),
            batch_size = config.batch_size,
            "created batch loader"
        );
        Self {
            dataset,
            indices: (0..dataset.len()).collect(),
            config,
            epoch: 0,
        }
    }

    /// The number of batches per epoch.
    pub fn num_batches(&self) -> usize {
        if self.config.drop_last {
            self.dataset.len() / self.config.batch_size
        } else {
            self.dataset.len().div_ceil(self.config.batch_size)
        }
    }

    /// Total number of records.
    pub fn len(&self) -> usize {
        self.dataset.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }

    /// Reshuffle record order (called at the start of each epoch).
    ///
    /// A seeded loader derives each epoch's order from `seed + epoch`, so runs
    /// are reproducible while epochs still differ.
    fn reshuffle(&mut self) {
        if !self.config.shuffle {
            return;
        }
        self.indices = (0..self.dataset.len()).collect();
        match self.config.seed {
            Some(seed) => {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(self.epoch));
                self.indices.shuffle(&mut rng);
            }
            None => self.indices.shuffle(&mut thread_rng()),
        }
    }

    /// Fetch the records at `indices`, in order, optionally in parallel via rayon.
    ///
    /// The first failing record in list order is reported.
    fn fetch_records(&self, indices: &[usize]) -> Result<Vec<Record>> {
        if self.config.num_workers > 0 && indices.len() > 1 {
            let fetched: Vec<Result<Record>> =
                indices.par_iter().map(|&i| self.dataset.get(i)).collect();
            fetched.into_iter().collect()
        } else {
            indices.iter().map(|&i| self.dataset.get(i)).collect()
        }
    }

    /// Start a new epoch and iterate over its batches.
    pub fn iter_batches(&mut self) -> BatchIter<'_, 'a, D> {
        self.reshuffle();
        self.epoch += 1;
        BatchIter {
            loader: self,
            batch_idx: 0,
            failed: false,
        }
    }
}

/// Iterator that yields one batch at a time.
///
/// Like record cursors, it ends after yielding an error.
pub struct BatchIter<'l, 'a, D: Dataset + ?Sized> {
    loader: &'l BatchLoader<'a, D>,
    batch_idx: usize,
    failed: bool,
}

impl<'l, 'a, D: Dataset + ?Sized> Iterator for BatchIter<'l, 'a, D> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.batch_idx >= self.loader.num_batches() {
            return None;
        }
        let bs = self.loader.config.batch_size;
        let n = self.loader.dataset.len();
        let start = self.batch_idx * bs;
        let end = (start + bs).min(n);
        self.batch_idx += 1;

        let result = self
            .loader
            .fetch_records(&self.loader.indices[start..end])
            .and_then(|records| collate(self.loader.dataset.schema(), &records));
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }
}

/// Merge records into one sparse batch record (see the module header).
///
/// The field name [`IND_1`] is reserved for the structure index; a schema
/// declaring it is rejected.
pub fn collate(schema: &Schema, records: &[Record]) -> Result<Record> {
    if schema.contains(IND_1) {
        bail!("field '{IND_1}' is reserved for the batch structure index");
    }
    let counting_field = if schema.get(ELEMS).is_some_and(|s| s.shape.has_variable_leading()) {
        Some(ELEMS)
    } else {
        schema
            .iter()
            .find(|(_, spec)| spec.shape.has_variable_leading())
            .map(|(name, _)| name.as_str())
    };

    let mut batch = Record::new();
    let mut atom_counts: Vec<usize> = Vec::new();
    for (name, spec) in schema.iter() {
        let values = records
            .iter()
            .map(|r| {
                let v = r.get(name).ok_or_else(|| Error::missing(name.as_str()))?;
                if v.dtype() == spec.dtype {
                    Ok(Cow::Borrowed(v))
                } else {
                    v.coerce(name, spec.dtype).map(Cow::Owned)
                }
            })
            .collect::<Result<Vec<Cow<'_, Value>>>>()?;

        let per_atom = spec.shape.has_variable_leading();
        if Some(name.as_str()) == counting_field {
            atom_counts = values.iter().map(|v| v.shape().leading().unwrap_or(0)).collect();
        }
        batch.insert(name.clone(), join(name, spec, &values, per_atom, records.len())?);
    }

    if counting_field.is_some() {
        let ind: Vec<i64> = atom_counts
            .iter()
            .enumerate()
            .flat_map(|(i, &count)| std::iter::repeat(i as i64).take(count))
            .collect();
        let total = ind.len();
        batch.insert(IND_1, Value::from_field_data(IND_1, Data::Int(ind), (total, 1), DType::I32)?);
    }
    Ok(batch)
}

/// Concatenate (per-atom) or stack (per-structure) the values of one field.
fn join(
    name: &str,
    spec: &FieldSpec,
    values: &[Cow<'_, Value>],
    per_atom: bool,
    batch_size: usize,
) -> Result<Value> {
    let shape_error = |got: &Shape| Error::ShapeError {
        field: name.to_string(),
        expected: spec.shape.clone(),
        got: got.clone(),
    };

    let shape = match values.first() {
        None => {
            // empty batch: zero rows with the declared fixed trailing dims
            let dims = spec
                .shape
                .dims()
                .iter()
                .skip(usize::from(per_atom))
                .map(|d| match d {
                    SymDim::Fixed(n) => *n,
                    _ => 0,
                })
                .collect::<Vec<_>>();
            Shape::new(dims).prepend(0)
        }
        Some(first) if per_atom => {
            let trailing = first.shape().trailing();
            let mut rows = 0;
            for v in values {
                if v.shape().trailing() != trailing {
                    return Err(shape_error(v.shape()));
                }
                rows += v.shape().leading().unwrap_or(0);
            }
            Shape::from(trailing).prepend(rows)
        }
        Some(first) => {
            if let Some(v) = values.iter().find(|v| v.shape() != first.shape()) {
                return Err(shape_error(v.shape()));
            }
            first.shape().prepend(batch_size)
        }
    };

    let data = if spec.dtype.is_float() {
        let mut out = Vec::with_capacity(shape.elem_count());
        for v in values {
            out.extend(v.to_f64_vec());
        }
        Data::Float(out)
    } else {
        let mut out = Vec::with_capacity(shape.elem_count());
        for v in values {
            match v.data() {
                Data::Int(d) => out.extend_from_slice(d),
                Data::Float(_) => bail!("field '{name}' holds floats for {}", spec.dtype),
            }
        }
        Data::Int(out)
    };
    Value::from_field_data(name, data, shape, spec.dtype)
}
