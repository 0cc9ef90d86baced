// ==========================================
// avisos 看板 - 领域层
// ==========================================
// 职责: 记录模型、字段目录、基础类型
// ==========================================

pub mod aviso;
pub mod schema;
pub mod types;

// 重导出核心类型
pub use aviso::{format_number, Aviso};
pub use schema::{
    normalize_header, Field, FieldCatalog, Schema, ID_COLUMN, MANAGED_COLUMN, TICKET_COLUMN,
};
pub use types::{FieldKind, ManagedView, Metric};
