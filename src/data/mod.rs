/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → OrderDataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ OrderDataset  │  Vec<Order>, label universes, date span
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  country + date-range predicates → FilteredView
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod filter;
