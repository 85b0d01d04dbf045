//! # Tracko IO
//!
//! Excel 試算表匯入與 CSV 匯出

pub mod error;
pub mod export;
pub mod importer;
pub mod mapping;
pub mod normalize;
pub mod sheet;

// Re-export 主要類型
pub use error::{ImportError, Result, RowError};
pub use export::CsvExporter;
pub use importer::{sheet_names, ExcelImporter, ImportResult};
pub use sheet::{RawCell, SheetRow, SheetRows};
