/// Data layer: loading, caching, filtering and the per-interval aggregates.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  read columns → RawRecord → clean → CleanedDataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  cache    │  one load per source, shared Arc<CleanedDataset>
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  year interval → FilteredView
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐   ┌─────────┐   ┌─────────┐
///   │ aggregate  │ → │  words   │ → │  cloud   │
///   └───────────┘   └─────────┘   └─────────┘
///    counts, top      title token    word-cloud
///    journals, rows   frequencies    placement
/// ```

pub mod aggregate;
pub mod cache;
pub mod cloud;
pub mod filter;
pub mod loader;
pub mod model;
pub mod words;
