/// Data layer: core types, loading, filtering and derived views.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐      ┌──────────┐
///   │  loader   │ ───▶ │ distance │  derive km / hours from the base
///   └──────────┘      └──────────┘
///        │
///        ▼
///   ┌─────────────────┐
///   │ PropertyDataset  │  Vec<Property>, category universe
///   └─────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  FilterCriteria → FilteredView (row indices)
///   └──────────┘
///        │
///        ├──────────────▶ aggregate   map markers + chart datasets
///        └──────────────▶ detail      selected property + route
/// ```

pub mod aggregate;
pub mod detail;
pub mod distance;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;

#[cfg(test)]
pub(crate) mod fixtures;
