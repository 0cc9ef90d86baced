// ==========================================
// avisos 看板 - 配置层
// ==========================================
// 职责: 配置加载（JSON 文件 + 环境变量 + 默认值）
// ==========================================

pub mod dashboard_config;

pub use dashboard_config::{
    config_keys, default_state_path, ConfigError, ConfigResult, DashboardConfig,
    DEFAULT_SOURCE_FILE, DEFAULT_STATE_FILE,
};
