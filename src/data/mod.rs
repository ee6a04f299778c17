/// Data layer: core types, loading, and comparison.
///
/// Architecture:
/// ```text
///  .csv / .xlsx / .json        .csv / .xlsx / .json
///        │                           │
///        ▼                           ▼
///   ┌──────────┐                ┌──────────┐
///   │  loader   │               │  loader   │   parse file → Dataset
///   └──────────┘                └──────────┘
///        │                           │
///        ▼                           ▼
///    Dataset A ──extract──▶ NumericSet A
///    Dataset B ──extract──▶ NumericSet B
///        │                           │
///        └────────── compare ────────┘
///                       │
///                       ▼
///        AnnotatedDataset A + AnnotatedDataset B
///        (flag = numeric value absent from the other file)
/// ```
pub mod compare;
pub mod loader;
pub mod model;
