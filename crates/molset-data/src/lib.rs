//! # molset-data
//!
//! Datasets over lists of atomic structures.
//!
//! This crate provides:
//! - [`Dataset`] trait — indexed, lazily produced records with a schema
//! - [`list_loader`] / [`ListLoader`] — wrap an item list and a reader function
//!   into a schema-checked [`ListDataset`]
//! - [`SplitConfig`] / [`Splits`] — named subsets (`"train"`, `"test"`, …) with
//!   optional seeded shuffling
//! - [`BatchLoader`] — sparse batching of variable-size structures

pub mod dataset;
pub mod list_loader;
pub mod loader;
pub mod split;

pub use dataset::{records, Dataset, Records};
pub use list_loader::{list_loader, ListDataset, ListLoader, ListLoaderConfig};
pub use loader::{collate, BatchConfig, BatchIter, BatchLoader, IND_1};
pub use split::{split_indices, SplitConfig, Splits, SubsetDataset, TRAIN};
