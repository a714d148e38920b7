/// Data layer: core types, loading, and splitting.
///
/// Architecture:
/// ```text
///  data.csv / targets.csv  (or .parquet)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse files → FeatureTable + LabelTable
///   └──────────┘
///        │
///        ▼
///   ┌────────────────┐
///   │ TabularDataset │  rows paired by index, len / get
///   └────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  split    │  shuffled indices → train / test Subset views
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod split;

pub use model::{Dataset, FeatureTable, LabelTable, Record, TabularDataset};
pub use split::{train_test_split, Subset};
