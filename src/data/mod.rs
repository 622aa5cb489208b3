/// Data layer: core types, loading, derivation, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse file → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  derive  │  Renovated, LotFrontageAvailable, Latitude/Longitude
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter  │  neighbourhood / year selection → row indices
///   └──────────┘
///        │
///        ▼
///   ┌────────────────────┐
///   │ aggregate / stats  │  group-by, pivot, correlation, box, histogram
///   └────────────────────┘
/// ```

pub mod aggregate;
pub mod derive;
pub mod filter;
pub mod loader;
pub mod model;
pub mod stats;
