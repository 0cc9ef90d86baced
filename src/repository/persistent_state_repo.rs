// ==========================================
// avisos 看板 - 持久化状态仓储
// ==========================================
// 职责: 状态文件的读取 / 原子保存 / 丢弃
// 红线: 读取结果显式区分 不存在 / 有效 / 解析失败 / 结构缺失
// 红线: 保存为整表覆盖，失败时旧文件保持完整
// ==========================================

use crate::domain::{Field, FieldCatalog};
use crate::engine::{CriticalityColorMapper, RecordStore};
use crate::importer::{AvisoImporter, FieldMapperImpl, ImportError, UniversalFileParser};
use crate::repository::atomic_file::write_atomically;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::table_export::{TableExporter, DEFAULT_SHEET_NAME};
use std::fs;
use std::path::{Path, PathBuf};

/// 状态文件读取结果
#[derive(Debug)]
pub enum PersistedState {
    /// 文件不存在
    Absent,
    /// 可用的持久化表格
    Valid(RecordStore),
    /// 文件存在但无法解析
    ParseError(ImportError),
    /// 可解析，但缺少标记列
    SchemaMissing { missing: Vec<String> },
}

impl PersistedState {
    /// 是否应丢弃后重建
    pub fn is_corrupted(&self) -> bool {
        matches!(
            self,
            PersistedState::ParseError(_) | PersistedState::SchemaMissing { .. }
        )
    }
}

/// 状态文件格式，由扩展名决定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateFormat {
    Xlsx,
    Csv,
}

impl StateFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());
        match ext.as_deref() {
            Some("xlsx") => Some(StateFormat::Xlsx),
            Some("csv") => Some(StateFormat::Csv),
            _ => None,
        }
    }
}

pub struct PersistentStateRepository {
    path: PathBuf,
    mapper: FieldMapperImpl,
    exporter: TableExporter,
}

impl PersistentStateRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            mapper: FieldMapperImpl::default(),
            exporter: TableExporter::default(),
        }
    }

    /// 使用自定义危急度范围（映射与着色一致）
    pub fn with_criticality_bounds(mut self, vmin: f64, vmax: f64) -> Self {
        self.mapper = FieldMapperImpl::new(vmin, vmax);
        self.exporter = TableExporter::new(DEFAULT_SHEET_NAME, CriticalityColorMapper::new(vmin, vmax));
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// 读取状态文件
    pub fn load(&self, catalog: &FieldCatalog) -> PersistedState {
        if !self.path.exists() {
            tracing::debug!("状态文件不存在: {}", self.path.display());
            return PersistedState::Absent;
        }

        let raw = match UniversalFileParser.parse(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("状态文件解析失败 {}: {}", self.path.display(), e);
                return PersistedState::ParseError(e);
            }
        };

        let has_marker = raw
            .headers
            .iter()
            .any(|h| catalog.resolve(h) == Some(Field::Managed));
        if !has_marker {
            let marker = catalog.display_name(Field::Managed);
            tracing::warn!("状态文件缺少标记列 {}: {}", marker, self.path.display());
            return PersistedState::SchemaMissing {
                missing: vec![marker],
            };
        }

        let outcome =
            AvisoImporter::for_persisted(catalog.clone(), self.mapper.clone()).import_table(&raw);
        tracing::info!(
            "已载入持久化状态: {} ({} 条)",
            self.path.display(),
            outcome.avisos.len()
        );
        PersistedState::Valid(RecordStore::new(outcome.schema, outcome.avisos))
    }

    /// 整表保存（原子覆盖），写入格式跟随扩展名
    pub fn save(&self, store: &RecordStore) -> RepositoryResult<()> {
        let bytes = match StateFormat::from_path(&self.path) {
            Some(StateFormat::Xlsx) => self.exporter.xlsx_bytes(store.schema(), store.records())?,
            Some(StateFormat::Csv) => self.exporter.csv_bytes(store.schema(), store.records())?,
            None => {
                return Err(RepositoryError::UnsupportedStateFormat(
                    self.path.display().to_string(),
                ))
            }
        };
        write_atomically(&self.path, &bytes)?;
        tracing::debug!("已保存状态: {} ({} 条)", self.path.display(), store.len());
        Ok(())
    }

    /// 删除损坏的状态文件；文件不存在视为成功
    pub fn discard(&self) -> RepositoryResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::warn!("已丢弃状态文件: {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(RepositoryError::WriteError {
                path: self.path.display().to_string(),
                message: e.to_string(),
            }),
        }
    }
}
