// Subsets — named partitions of a dataset
//
// A split configuration is an ordered list of (name, weight) pairs. Items are
// handed out in list order (or in a seeded random order when shuffling is
// requested): every subset but the last receives floor(n * w / total) items,
// the last one takes the remainder so nothing is lost.
//
//   SplitConfig::default()                               → {"train": all}
//   SplitConfig::weighted(&[("train", 8.0), ("test", 2.0)])
//   SplitConfig::weighted(&[("train", 8.0), ("test", 2.0)]).shuffle(true).seed(0)

use std::collections::HashSet;
use std::ops::Index;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{thread_rng, SeedableRng};

use molset_core::{Error, Record, Result, Schema};

use crate::dataset::{Dataset, Records};

/// Name of the subset produced when no partition is requested.
pub const TRAIN: &str = "train";

// Configuration

/// How to partition a dataset into named subsets.
#[derive(Debug, Clone)]
pub struct SplitConfig {
    /// Subset names with their relative weights, in hand-out order.
    pub splits: Vec<(String, f64)>,
    /// Whether to permute items before partitioning.
    pub shuffle: bool,
    /// Optional random seed for reproducible shuffling.
    pub seed: Option<u64>,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self::weighted(&[(TRAIN, 1.0)])
    }
}

impl SplitConfig {
    /// Partition by the given weights, keeping list order.
    pub fn weighted(splits: &[(&str, f64)]) -> Self {
        Self {
            splits: splits.iter().map(|&(n, w)| (n.to_string(), w)).collect(),
            shuffle: false,
            seed: None,
        }
    }

    pub fn shuffle(mut self, s: bool) -> Self {
        self.shuffle = s;
        self
    }

    pub fn seed(mut self, s: u64) -> Self {
        self.seed = Some(s);
        self
    }

    fn check(&self) -> Result<()> {
        if self.splits.is_empty() {
            return Err(Error::InvalidSplit("no subsets requested".to_string()));
        }
        let mut seen = HashSet::new();
        for (name, weight) in &self.splits {
            if !seen.insert(name.as_str()) {
                return Err(Error::InvalidSplit(format!("duplicate subset '{name}'")));
            }
            if !weight.is_finite() || *weight <= 0.0 {
                return Err(Error::InvalidSplit(format!(
                    "subset '{name}' has weight {weight}, expected a positive number"
                )));
            }
        }
        Ok(())
    }
}

/// Assign the indices `0..n` to the subsets of `config`.
///
/// Returns `(name, indices)` pairs in configuration order. Without shuffling
/// every subset is a contiguous run of the list, in list order.
pub fn split_indices(n: usize, config: &SplitConfig) -> Result<Vec<(String, Vec<usize>)>> {
    config.check()?;

    let mut indices: Vec<usize> = (0..n).collect();
    if config.shuffle {
        match config.seed {
            Some(seed) => indices.shuffle(&mut StdRng::seed_from_u64(seed)),
            None => indices.shuffle(&mut thread_rng()),
        }
    }

    let total: f64 = config.splits.iter().map(|(_, w)| w).sum();
    let last = config.splits.len() - 1;
    let mut parts = Vec::with_capacity(config.splits.len());
    let mut offset = 0;
    for (i, (name, weight)) in config.splits.iter().enumerate() {
        let count = if i == last {
            n - offset
        } else {
            // absorb rounding error so that e.g. 100 * 0.29 floors to 29
            let exact = n as f64 * weight / total;
            ((exact + exact * 1e-12).floor() as usize).min(n - offset)
        };
        parts.push((name.clone(), indices[offset..offset + count].to_vec()));
        offset += count;
    }
    Ok(parts)
}

// SubsetDataset — view of selected indices

/// A dataset that exposes only the records at the given indices of a shared
/// parent dataset.
pub struct SubsetDataset<D: Dataset> {
    inner: Arc<D>,
    indices: Vec<usize>,
    name: String,
}

impl<D: Dataset> SubsetDataset<D> {
    /// Create a subset of `inner` containing only the records at `indices`.
    ///
    /// Indices out of range surface as `IndexOutOfRange` when read.
    pub fn new(inner: Arc<D>, indices: Vec<usize>, name: impl Into<String>) -> Self {
        Self {
            inner,
            indices,
            name: name.into(),
        }
    }

    /// Parent indices of this subset, in iteration order.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// The parent dataset.
    pub fn parent(&self) -> &D {
        &self.inner
    }

    /// A fresh cursor over the subset's records.
    pub fn iter(&self) -> Records<'_, Self> {
        Records::new(self)
    }
}

impl<D: Dataset> Dataset for SubsetDataset<D> {
    fn len(&self) -> usize {
        self.indices.len()
    }

    fn get(&self, index: usize) -> Result<Record> {
        let parent = *self.indices.get(index).ok_or(Error::IndexOutOfRange {
            index,
            len: self.indices.len(),
        })?;
        self.inner.get(parent)
    }

    fn schema(&self) -> &Schema {
        self.inner.schema()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<'a, D: Dataset> IntoIterator for &'a SubsetDataset<D> {
    type Item = Result<Record>;
    type IntoIter = Records<'a, SubsetDataset<D>>;

    fn into_iter(self) -> Self::IntoIter {
        Records::new(self)
    }
}

// Splits — the named subsets of one dataset

/// Named subsets over one shared dataset, in configuration order.
///
/// Look subsets up with [`Splits::subset`] (fallible) or by indexing with the
/// subset name, which panics on unknown names like map indexing does.
pub struct Splits<D: Dataset> {
    subsets: Vec<SubsetDataset<D>>,
}

impl<D: Dataset> Splits<D> {
    /// Partition `dataset` according to `config`.
    pub fn new(dataset: D, config: &SplitConfig) -> Result<Self> {
        let parts = split_indices(dataset.len(), config)?;
        let inner = Arc::new(dataset);
        let subsets: Vec<SubsetDataset<D>> = parts
            .into_iter()
            .map(|(name, indices)| SubsetDataset::new(Arc::clone(&inner), indices, name))
            .collect();
        tracing::debug!(
            dataset = inner.name(),
            sizes = ?subsets.iter().map(|s| (s.name().to_string(), s.len())).collect::<Vec<_>>(),
            shuffled = config.shuffle,
            "split dataset"
        );
        Ok(Self { subsets })
    }

    pub fn get(&self, name: &str) -> Option<&SubsetDataset<D>> {
        self.subsets.iter().find(|s| s.name() == name)
    }

    /// The subset called `name`, or `UnknownSubset`.
    pub fn subset(&self, name: &str) -> Result<&SubsetDataset<D>> {
        self.get(name)
            .ok_or_else(|| Error::UnknownSubset(name.to_string()))
    }

    /// Subset names in configuration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.subsets.iter().map(|s| s.name())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SubsetDataset<D>> {
        self.subsets.iter()
    }

    /// Number of subsets.
    pub fn len(&self) -> usize {
        self.subsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subsets.is_empty()
    }
}

impl<D: Dataset> Index<&str> for Splits<D> {
    type Output = SubsetDataset<D>;

    fn index(&self, name: &str) -> &Self::Output {
        match self.get(name) {
            Some(subset) => subset,
            None => panic!("Splits: no subset named '{name}'"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use molset_core::{default_schema, Value, E_DATA};

    /// Tiny helper dataset for testing.
    struct TinyDataset {
        n: usize,
        schema: Schema,
    }

    impl TinyDataset {
        fn new(n: usize) -> Self {
            Self {
                n,
                schema: default_schema(false, false),
            }
        }
    }

    impl Dataset for TinyDataset {
        fn len(&self) -> usize {
            self.n
        }
        fn get(&self, idx: usize) -> Result<Record> {
            if idx >= self.n {
                return Err(Error::IndexOutOfRange { index: idx, len: self.n });
            }
            Ok(Record::new().with(E_DATA, Value::scalar(idx as f64)))
        }
        fn schema(&self) -> &Schema {
            &self.schema
        }
    }

    fn energies<D: Dataset>(ds: &D) -> Vec<f64> {
        Records::new(ds)
            .map(|r| r.unwrap().get(E_DATA).unwrap().scalar_f64().unwrap())
            .collect()
    }

    #[test]
    fn default_is_single_train_subset() {
        let parts = split_indices(5, &SplitConfig::default()).unwrap();
        assert_eq!(parts, vec![(TRAIN.to_string(), vec![0, 1, 2, 3, 4])]);
    }

    #[test]
    fn weighted_split_keeps_order() {
        let parts = split_indices(10, &SplitConfig::weighted(&[("train", 8.0), ("test", 2.0)])).unwrap();
        assert_eq!(parts[0].1, (0..8).collect::<Vec<_>>());
        assert_eq!(parts[1].1, vec![8, 9]);
    }

    #[test]
    fn remainder_goes_to_last_subset() {
        let config = SplitConfig::weighted(&[("a", 1.0), ("b", 1.0), ("c", 1.0)]);
        let parts = split_indices(10, &config).unwrap();
        let sizes: Vec<usize> = parts.iter().map(|(_, idx)| idx.len()).collect();
        assert_eq!(sizes, vec![3, 3, 4]);
    }

    #[test]
    fn decimal_weights_floor_exactly() {
        let config = SplitConfig::weighted(&[("train", 0.29), ("test", 0.71)]);
        let sizes: Vec<usize> = split_indices(100, &config)
            .unwrap()
            .iter()
            .map(|(_, idx)| idx.len())
            .collect();
        assert_eq!(sizes, vec![29, 71]);

        let config = SplitConfig::weighted(&[("train", 0.7), ("valid", 0.1), ("test", 0.2)]);
        let sizes: Vec<usize> = split_indices(10, &config)
            .unwrap()
            .iter()
            .map(|(_, idx)| idx.len())
            .collect();
        assert_eq!(sizes, vec![7, 1, 2]);
    }

    #[test]
    fn split_of_empty_list() {
        let parts = split_indices(0, &SplitConfig::weighted(&[("train", 8.0), ("test", 2.0)])).unwrap();
        assert!(parts.iter().all(|(_, idx)| idx.is_empty()));
    }

    #[test]
    fn seeded_shuffle_is_reproducible() {
        let config = SplitConfig::weighted(&[("train", 0.8), ("test", 0.2)]).shuffle(true).seed(123);
        let s1 = split_indices(50, &config).unwrap();
        let s2 = split_indices(50, &config).unwrap();
        assert_eq!(s1, s2);
        let mut all: Vec<usize> = s1.iter().flat_map(|(_, idx)| idx.clone()).collect();
        all.sort_unstable();
        assert_eq!(all, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn invalid_configs_rejected() {
        assert!(matches!(split_indices(3, &SplitConfig::weighted(&[])), Err(Error::InvalidSplit(_))));
        let dup = SplitConfig::weighted(&[("train", 1.0), ("train", 1.0)]);
        assert!(matches!(split_indices(3, &dup), Err(Error::InvalidSplit(_))));
        let zero = SplitConfig::weighted(&[("train", 1.0), ("test", 0.0)]);
        assert!(matches!(split_indices(3, &zero), Err(Error::InvalidSplit(_))));
        let nan = SplitConfig::weighted(&[("train", f64::NAN)]);
        assert!(matches!(split_indices(3, &nan), Err(Error::InvalidSplit(_))));
    }

    #[test]
    fn subset_dataset() {
        let sub = SubsetDataset::new(Arc::new(TinyDataset::new(10)), vec![2, 5, 7], "picked");
        assert_eq!(sub.len(), 3);
        assert_eq!(sub.name(), "picked");
        assert_eq!(energies(&sub), vec![2.0, 5.0, 7.0]);
        assert!(matches!(sub.get(3), Err(Error::IndexOutOfRange { index: 3, len: 3 })));
    }

    #[test]
    fn splits_lookup() {
        let splits = Splits::new(
            TinyDataset::new(10),
            &SplitConfig::weighted(&[("train", 8.0), ("test", 2.0)]),
        )
        .unwrap();
        assert_eq!(splits.len(), 2);
        assert_eq!(splits.names().collect::<Vec<_>>(), vec!["train", "test"]);
        assert_eq!(energies(&splits["test"]), vec![8.0, 9.0]);
        assert_eq!(splits.subset("train").unwrap().len(), 8);
        assert!(matches!(splits.subset("valid"), Err(Error::UnknownSubset(_))));
        assert!(splits.get("valid").is_none());
    }

    #[test]
    #[should_panic(expected = "no subset named 'valid'")]
    fn splits_index_panics_on_unknown() {
        let splits = Splits::new(TinyDataset::new(4), &SplitConfig::default()).unwrap();
        let _ = &splits["valid"];
    }
}
