/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///   trades .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RecordTable, coerce Date
///   └──────────┘
///        │
///        ▼
///   ┌─────────────┐
///   │ RecordTable │  Vec<TradeRecord>
///   └─────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  inclusive date range → new RecordTable
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod filter;
