// ==========================================
// avisos 看板 - 配置
// ==========================================
// 加载顺序: 默认值 → JSON 配置文件（可选）→ 环境变量覆写
// 红线: 配置文件中缺省的项使用默认值（serde default）
// ==========================================

use crate::domain::{Field, FieldCatalog};
use crate::engine::{CriticalityColorMapper, ALL_SENTINEL};
use crate::importer::FieldMapperImpl;
use crate::repository::{StateFormat, DEFAULT_SHEET_NAME};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_SOURCE_FILE: &str = "predicciones_avisos_sin_gestionar_rf_v5.xlsx";
pub const DEFAULT_STATE_FILE: &str = "avisos_persistente.xlsx";
const APP_DIR: &str = "avisos-dashboard";

pub mod config_keys {
    // 环境变量
    pub const ENV_CONFIG: &str = "AVISOS_CONFIG";
    pub const ENV_SOURCE: &str = "AVISOS_SOURCE";
    pub const ENV_STATE: &str = "AVISOS_STATE";
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("无法读取配置文件 {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("配置文件格式错误: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("配置无效: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// 默认状态文件路径
///
/// # 返回
/// - 用户数据目录/avisos-dashboard/avisos_persistente.xlsx
/// - 无用户数据目录时为当前目录下的 avisos_persistente.xlsx
pub fn default_state_path() -> PathBuf {
    match dirs::data_dir() {
        Some(data_dir) => data_dir.join(APP_DIR).join(DEFAULT_STATE_FILE),
        None => PathBuf::from(DEFAULT_STATE_FILE),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// 源预测表格
    pub source_path: PathBuf,
    /// 持久化状态文件
    pub state_path: PathBuf,
    /// 过滤器「全部」哨兵
    pub all_sentinel: String,
    pub criticality_min: f64,
    pub criticality_max: f64,
    /// 下拉过滤列
    pub filter_columns: Vec<String>,
    /// 期望的规范列（有序）
    pub desired_columns: Vec<String>,
    /// 规范名 → 显示名
    pub rename: BTreeMap<String, String>,
    pub sheet_name: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            source_path: PathBuf::from(DEFAULT_SOURCE_FILE),
            state_path: default_state_path(),
            all_sentinel: ALL_SENTINEL.to_string(),
            criticality_min: 1.0,
            criticality_max: 100.0,
            filter_columns: vec![
                Field::PlanningGroup.canonical().to_string(),
                Field::Priority.canonical().to_string(),
                Field::AbcIndicator.canonical().to_string(),
            ],
            desired_columns: Field::ALL.iter().map(|f| f.canonical().to_string()).collect(),
            rename: BTreeMap::new(),
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
        }
    }
}

impl DashboardConfig {
    /// 从 JSON 文本解析
    pub fn from_json_str(raw: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// 加载配置（文件可选）并应用环境变量覆写
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match path {
            Some(path) => {
                let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.display().to_string(),
                    source,
                })?;
                tracing::info!("已读取配置文件: {}", path.display());
                Self::from_json_str(&raw)?
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// 应用覆写（空值忽略）
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(source) = non_empty(config_keys::ENV_SOURCE) {
            tracing::debug!(config_key = config_keys::ENV_SOURCE, value = %source, "覆写源文件路径");
            self.source_path = PathBuf::from(source);
        }
        if let Some(state) = non_empty(config_keys::ENV_STATE) {
            tracing::debug!(config_key = config_keys::ENV_STATE, value = %state, "覆写状态文件路径");
            self.state_path = PathBuf::from(state);
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !self.criticality_min.is_finite() || !self.criticality_max.is_finite() {
            return Err(ConfigError::Invalid("危急度范围必须为有限数值".to_string()));
        }
        if self.criticality_min > self.criticality_max {
            return Err(ConfigError::Invalid(format!(
                "危急度下限 {} 大于上限 {}",
                self.criticality_min, self.criticality_max
            )));
        }
        if self.all_sentinel.trim().is_empty() {
            return Err(ConfigError::Invalid("「全部」哨兵不能为空".to_string()));
        }
        if self.sheet_name.trim().is_empty() {
            return Err(ConfigError::Invalid("工作表名不能为空".to_string()));
        }
        if StateFormat::from_path(&self.state_path).is_none() {
            return Err(ConfigError::Invalid(format!(
                "状态文件扩展名不受支持: {}（仅支持 .xlsx / .csv）",
                self.state_path.display()
            )));
        }
        Ok(())
    }

    pub fn catalog(&self) -> FieldCatalog {
        FieldCatalog::new(&self.rename)
    }

    pub fn field_mapper(&self) -> FieldMapperImpl {
        FieldMapperImpl::new(self.criticality_min, self.criticality_max)
    }

    pub fn color_mapper(&self) -> CriticalityColorMapper {
        CriticalityColorMapper::new(self.criticality_min, self.criticality_max)
    }
}
