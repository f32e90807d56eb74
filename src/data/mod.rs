/// Data layer: cell model, file formats, search and chart preparation.
///
/// Architecture:
/// ```text
///  .csv / .xlsx / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse bytes → Dataset (column-wise type inference)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  model   │  Dataset = Vec<Column>, Cell = Text | Number | Bool | Missing
///   └──────────┘
///        │
///        ├──► filter   row search → visible indices (view only)
///        ├──► explore  per-column profile and value counts
///        ├──► chart    ChartRequest → ChartSpec (points, categories)
///        └──► export   Dataset → csv / json / parquet bytes
/// ```

pub mod chart;
pub mod explore;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
