// ==========================================
// avisos 看板 - 核心库
// ==========================================
// 功能: SAP PM 维护通知（avisos）分类看板的数据核心
// 流程: 源表格导入 → 内存记录仓 → 过滤/指标 → 编辑持久化 → 导出
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "es");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 记录与列结构
pub mod domain;

// 导入层 - 表格解析与列对齐
pub mod importer;

// 引擎层 - 过滤、聚合、配色
pub mod engine;

// 数据仓储层 - 状态文件与导出
pub mod repository;

// 配置层
pub mod config;

// API 层 - 会话接口
pub mod api;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{Aviso, Field, FieldCatalog, FieldKind, ManagedView, Metric, Schema};

// 引擎
pub use engine::{
    CriticalityColorMapper, DashboardSummary, FilterCriteria, FilterValue, GroupStat,
    HistogramBucket, RecordEdit, RecordStore,
};

// 导入
pub use importer::{AvisoImporter, ColumnReconciler, ImportError, Reconciliation};

// 仓储
pub use repository::{PersistedState, PersistentStateRepository, RepositoryError, TableExporter};

// 配置
pub use config::{ConfigError, DashboardConfig};

// API
pub use api::{ApiError, ApiResult, DashboardSession, OpenMode, SessionOrigin};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "Clasificación de avisos SAP PM";
