// ListLoader — adapt a list of items plus a reader function into a dataset
//
// The caller owns two things: a list of opaque items (file names, database
// keys, in-memory structures) and a reader that turns one item into a record.
// The loader pairs them with a schema and yields a dataset that calls the
// reader lazily, once per consumed record, and validates what it returns.
//
// Usage:
//
//   let loader = list_loader(ListLoaderConfig::default().force(true), |path: &PathBuf| {
//       read_structure(path)          // -> Result<Record, E>
//   });
//   // or, with the item type inferred from the reader body:
//   let loader = list_loader(ListLoaderConfig::default(), |path| read_structure(path));
//   let dataset = loader.load(paths);
//   for record in dataset.iter() {
//       let record = record?;
//       // ...
//   }
//
//   // or partitioned:
//   let splits = loader.load_split(paths, &SplitConfig::weighted(&[("train", 8.0), ("test", 2.0)]))?;
//   for record in splits["train"].iter() { ... }

use std::fmt;
use std::sync::Arc;

use molset_core::{default_schema, Error, Record, Result, Schema};

use crate::dataset::{Dataset, Records};
use crate::split::{SplitConfig, Splits};

// Configuration

/// Configuration for a list loader.
#[derive(Debug, Clone)]
pub struct ListLoaderConfig {
    /// Require and surface a periodic cell (`cell`, `[3, 3]`) per record.
    pub pbc: bool,
    /// Require and surface per-atom forces (`f_data`, `[atoms, 3]`) per record.
    pub force: bool,
    /// Explicit schema. When set it fully determines the produced fields and
    /// `pbc`/`force` are ignored.
    pub format: Option<Schema>,
    /// Reject undeclared fields instead of dropping them.
    /// Defaults to `true` with an explicit `format`, `false` otherwise.
    pub strict: Option<bool>,
    /// Name reported by the produced datasets.
    pub name: String,
}

impl Default for ListLoaderConfig {
    fn default() -> Self {
        Self {
            pbc: false,
            force: false,
            format: None,
            strict: None,
            name: "list".to_string(),
        }
    }
}

impl ListLoaderConfig {
    pub fn pbc(mut self, pbc: bool) -> Self {
        self.pbc = pbc;
        self
    }

    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn format(mut self, schema: Schema) -> Self {
        self.format = Some(schema);
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = Some(strict);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// The effective schema: the explicit format, else the flag defaults.
    pub fn schema(&self) -> Schema {
        match &self.format {
            Some(schema) => schema.clone(),
            None => default_schema(self.pbc, self.force),
        }
    }

    /// The effective strictness.
    pub fn is_strict(&self) -> bool {
        self.strict.unwrap_or(self.format.is_some())
    }
}

// ListLoader

/// A configured reader, ready to be applied to item lists.
///
/// Created with [`list_loader`]. The same loader can be applied to any number
/// of lists; each call produces an independent dataset.
pub struct ListLoader<R> {
    config: ListLoaderConfig,
    schema: Arc<Schema>,
    reader: Arc<R>,
}

/// Wrap `reader` into a [`ListLoader`] with the given configuration.
///
/// `reader` maps one item to a record; it may perform I/O and may fail. Its
/// error type only needs to convert into a boxed error. The item type is
/// fixed here, so closures need no parameter annotations.
pub fn list_loader<T, E, R>(config: ListLoaderConfig, reader: R) -> ListLoader<R>
where
    T: Send + Sync,
    R: Fn(&T) -> std::result::Result<Record, E> + Send + Sync,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let schema = Arc::new(config.schema());
    tracing::debug!(
        fields = ?schema.names().collect::<Vec<_>>(),
        strict = config.is_strict(),
        "configured list loader"
    );
    ListLoader {
        config,
        schema,
        reader: Arc::new(reader),
    }
}

impl<R> ListLoader<R> {
    pub fn config(&self) -> &ListLoaderConfig {
        &self.config
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Build a single dataset over `items`, in list order.
    pub fn load<T, E>(&self, items: Vec<T>) -> ListDataset<T, R>
    where
        T: Send + Sync,
        R: Fn(&T) -> std::result::Result<Record, E> + Send + Sync,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let items: Arc<[T]> = items.into();
        tracing::debug!(name = %self.config.name, items = items.len(), "loaded item list");
        ListDataset {
            items,
            reader: Arc::clone(&self.reader),
            schema: Arc::clone(&self.schema),
            strict: self.config.is_strict(),
            name: self.config.name.clone(),
        }
    }

    /// Build a dataset over `items` and partition it into named subsets.
    pub fn load_split<T, E>(
        &self,
        items: Vec<T>,
        split: &SplitConfig,
    ) -> Result<Splits<ListDataset<T, R>>>
    where
        T: Send + Sync,
        R: Fn(&T) -> std::result::Result<Record, E> + Send + Sync,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Splits::new(self.load(items), split)
    }
}

impl<R> fmt::Debug for ListLoader<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListLoader")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

// ListDataset

/// The dataset produced by a [`ListLoader`].
///
/// Holds the item list and reader immutably; every `get` invokes the reader
/// for exactly one item and validates the result against the schema.
pub struct ListDataset<T, R> {
    items: Arc<[T]>,
    reader: Arc<R>,
    schema: Arc<Schema>,
    strict: bool,
    name: String,
}

impl<T, R, E> ListDataset<T, R>
where
    T: Send + Sync,
    R: Fn(&T) -> std::result::Result<Record, E> + Send + Sync,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    /// The backing items, in list order.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Whether undeclared fields are rejected.
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// A fresh cursor over all records.
    pub fn iter(&self) -> Records<'_, Self> {
        Records::new(self)
    }
}

impl<T, R, E> Dataset for ListDataset<T, R>
where
    T: Send + Sync,
    R: Fn(&T) -> std::result::Result<Record, E> + Send + Sync,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    fn len(&self) -> usize {
        self.items.len()
    }

    fn get(&self, index: usize) -> Result<Record> {
        let item = self.items.get(index).ok_or(Error::IndexOutOfRange {
            index,
            len: self.items.len(),
        })?;
        let raw = (self.reader)(item).map_err(|e| Error::reader(index, e))?;
        match self.schema.validate(raw, self.strict) {
            Ok(record) => {
                tracing::trace!(index, "produced record");
                Ok(record)
            }
            Err(e) => {
                tracing::debug!(index, error = %e, "record rejected");
                Err(e)
            }
        }
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<'a, T, R, E> IntoIterator for &'a ListDataset<T, R>
where
    T: Send + Sync,
    R: Fn(&T) -> std::result::Result<Record, E> + Send + Sync,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    type Item = Result<Record>;
    type IntoIter = Records<'a, ListDataset<T, R>>;

    fn into_iter(self) -> Self::IntoIter {
        Records::new(self)
    }
}

impl<T, R> Clone for ListDataset<T, R> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
            reader: Arc::clone(&self.reader),
            schema: Arc::clone(&self.schema),
            strict: self.strict,
            name: self.name.clone(),
        }
    }
}

impl<T, R> fmt::Debug for ListDataset<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListDataset")
            .field("name", &self.name)
            .field("len", &self.items.len())
            .field("schema", &self.schema)
            .field("strict", &self.strict)
            .finish_non_exhaustive()
    }
}
