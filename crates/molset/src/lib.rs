//! # molset
//!
//! Turn lists of atomic structures into schema-checked training datasets.
//!
//! This is the top-level facade crate that re-exports everything you need.
//!
//! ## Usage
//!
//! ```rust
//! use molset::prelude::*;
//!
//! fn read(symbol: &&str) -> std::result::Result<Record, String> {
//!     let z = molset::element::atomic_number(symbol).ok_or("unknown element")?;
//!     Ok(Record::new()
//!         .with(ELEMS, Value::vector(&[i64::from(z)]))
//!         .with(COORD, Value::rows3(&[[0.0, 0.0, 0.0]]))
//!         .with(E_DATA, Value::scalar(0.0f64)))
//! }
//!
//! let loader = list_loader(ListLoaderConfig::default(), read);
//! let splits = loader.load_split(vec!["Cu", "Ag", "Au"], &SplitConfig::default()).unwrap();
//! assert_eq!(splits["train"].iter().count(), 3);
//! ```
//!
//! ## Architecture
//!
//! | Crate | Purpose |
//! |-------|----------|
//! | `molset-core` | DType, Shape, SymbolicShape, Value, Record, Schema, element table, Error |
//! | `molset-data` | Dataset trait, list loader, subsets and splitting, sparse batch loader |

/// Re-export core types.
pub use molset_core::{
    default_schema, element, Data, DType, Error, FieldSpec, Record, Result, Schema, SchemaProblem,
    Shape, ShapeEnv, SymDim, SymbolicShape, Value, WithDType, ATOMS, CELL, COORD, ELEMS, E_DATA,
    F_DATA,
};

/// Re-export datasets, loaders and splitting.
pub mod data {
    pub use molset_data::*;
}

/// Prelude: import this for the most common types.
pub mod prelude {
    pub use crate::data::{
        collate, list_loader, records, BatchConfig, BatchLoader, Dataset, ListDataset, ListLoader,
        ListLoaderConfig, SplitConfig, Splits, SubsetDataset, IND_1, TRAIN,
    };
    pub use crate::{
        default_schema, DType, Error, FieldSpec, Record, Result, Schema, Shape, SymDim, Value,
        CELL, COORD, ELEMS, E_DATA, F_DATA,
    };
}
