// ==========================================
// avisos 看板 - 仓储层
// ==========================================
// 职责: 状态文件读写、表格导出
// 红线: 仓储层不含业务逻辑
// 红线: 所有落盘均为原子写入
// ==========================================

pub mod atomic_file;
pub mod error;
pub mod persistent_state_repo;
pub mod table_export;

pub use atomic_file::write_atomically;
pub use error::{RepositoryError, RepositoryResult};
pub use persistent_state_repo::{PersistedState, PersistentStateRepository, StateFormat};
pub use table_export::{TableExporter, DEFAULT_SHEET_NAME};
