// ==========================================
// avisos 看板 - 导入层
// ==========================================
// 职责: 外部表格 → 领域记录
// 支持: Excel, CSV
// ==========================================

// 模块声明
pub mod aviso_importer;
pub mod column_reconciler;
pub mod data_cleaner;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod importer_trait;
pub mod raw_table;

// 重导出核心类型
pub use aviso_importer::{AvisoImporter, ImportOutcome};
pub use column_reconciler::{ColumnReconciler, Reconciliation};
pub use data_cleaner::DataCleaner as DataCleanerImpl;
pub use error::{ImportError, ImportResult};
pub use field_mapper::FieldMapper as FieldMapperImpl;
pub use file_parser::{CsvParser, ExcelParser, UniversalFileParser};
pub use raw_table::{RawCell, RawTable};

// 重导出 Trait 接口
pub use importer_trait::{DataCleaner, FieldMapper, FileParser};
