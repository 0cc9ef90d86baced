// ==========================================
// avisos 看板 - API 层
// ==========================================
// 职责: 提供会话接口，供命令行调用
// ==========================================

pub mod dashboard_api;
pub mod error;

// 重导出核心类型
pub use dashboard_api::{DashboardSession, OpenMode, SessionOrigin};
pub use error::{ApiError, ApiResult};
