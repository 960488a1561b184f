//! Data layer: table model, loading, aggregation and writing.
//!
//! Architecture:
//! ```text
//!   input.csv
//!       │
//!       ▼
//!   ┌──────────┐
//!   │   path    │  extension + existence check
//!   └──────────┘
//!       │
//!       ▼
//!   ┌──────────┐
//!   │  loader   │  TableParser (csv | arrow) → Matrix + header
//!   └──────────┘
//!       │
//!       ▼
//!   ┌───────────┐
//!   │ aggregate  │  append row sum → combined Matrix
//!   └───────────┘
//!       │
//!       ▼
//!   ┌──────────┐
//!   │  writer   │  NumberFormat + comment header → output.csv
//!   └──────────┘
//! ```

pub mod aggregate;
pub mod format;
pub mod loader;
pub mod model;
pub mod path;
pub mod writer;
