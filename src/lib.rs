//! Indexable tabular datasets backed by a pair of feature / label tables,
//! with train/test splitting and batched, shuffled loading.

pub mod batch;
pub mod config;
pub mod data;
pub mod encode;
pub mod error;
pub mod iris;
pub mod session;

pub use batch::{Batch, DataLoader, LoaderConfig};
pub use data::{train_test_split, Dataset, Record, Subset};
pub use data::{FeatureTable, LabelTable, TabularDataset};
pub use encode::LabelEncoder;
pub use error::DatasetError;
