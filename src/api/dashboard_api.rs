// ==========================================
// avisos 看板 - 会话 API
// ==========================================
// 职责: 持有一份显式的记录仓，串联 导入 / 持久化 / 过滤 / 指标 / 导出
// 红线: 每次编辑后整表持久化（原子覆盖）
// 红线: 编辑按稳定主键定位
// 红线: 状态文件损坏时丢弃并从源表格重建
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::DashboardConfig;
use crate::domain::{Aviso, ManagedView};
use crate::engine::{
    CriticalityColorMapper, DashboardSummary, FilterCriteria, GroupStat, HistogramBucket,
    RecordEdit, RecordStore,
};
use crate::importer::AvisoImporter;
use crate::repository::{PersistedState, PersistentStateRepository, TableExporter};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 会话打开方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OpenMode {
    /// 优先使用有效的持久化状态
    #[default]
    Resume,
    /// 总是从源表格重建并覆盖状态文件
    Rebuild,
}

/// 会话数据来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionOrigin {
    /// 持久化状态文件
    Persisted,
    /// 源表格
    Source,
    /// 状态文件损坏，已丢弃并从源表格重建
    RebuiltAfterCorruption,
}

pub struct DashboardSession {
    config: DashboardConfig,
    repo: PersistentStateRepository,
    exporter: TableExporter,
    color_mapper: CriticalityColorMapper,
    store: RecordStore,
    origin: SessionOrigin,
}

impl DashboardSession {
    /// 打开会话
    ///
    /// # 参数
    /// - config: 已加载的配置
    /// - mode: Resume / Rebuild
    ///
    /// # 返回
    /// - Err(ApiError::SourceNotFound): 需要重建但源文件不存在
    pub fn open(config: DashboardConfig, mode: OpenMode) -> ApiResult<Self> {
        config.validate()?;
        let repo = PersistentStateRepository::new(&config.state_path)
            .with_criticality_bounds(config.criticality_min, config.criticality_max);

        let mut origin = SessionOrigin::Source;
        if mode == OpenMode::Resume {
            match repo.load(&config.catalog()) {
                PersistedState::Valid(store) => {
                    tracing::info!("会话使用持久化状态 ({} 条)", store.len());
                    return Ok(Self::assemble(config, repo, store, SessionOrigin::Persisted));
                }
                PersistedState::Absent => {}
                PersistedState::ParseError(e) => {
                    tracing::warn!("状态文件无法解析，丢弃后重建: {}", e);
                    repo.discard()?;
                    origin = SessionOrigin::RebuiltAfterCorruption;
                }
                PersistedState::SchemaMissing { missing } => {
                    tracing::warn!("状态文件缺少列 {:?}，丢弃后重建", missing);
                    repo.discard()?;
                    origin = SessionOrigin::RebuiltAfterCorruption;
                }
            }
        }

        let store = Self::load_source(&config)?;
        repo.save(&store)?;
        tracing::info!(
            "会话已从源表格构建: {} ({} 条)",
            config.source_path.display(),
            store.len()
        );
        Ok(Self::assemble(config, repo, store, origin))
    }

    fn assemble(
        config: DashboardConfig,
        repo: PersistentStateRepository,
        store: RecordStore,
        origin: SessionOrigin,
    ) -> Self {
        let color_mapper = config.color_mapper();
        let exporter = TableExporter::new(config.sheet_name.clone(), color_mapper);
        Self {
            config,
            repo,
            exporter,
            color_mapper,
            store,
            origin,
        }
    }

    fn load_source(config: &DashboardConfig) -> ApiResult<RecordStore> {
        let source = &config.source_path;
        if !source.exists() {
            tracing::error!("源文件不存在: {}", source.display());
            return Err(ApiError::SourceNotFound(source.display().to_string()));
        }

        let importer = AvisoImporter::for_source(
            config.catalog(),
            config.desired_columns.clone(),
            config.field_mapper(),
        );
        let outcome = importer.import_file(source)?;
        Ok(RecordStore::new(outcome.schema, outcome.avisos))
    }

    fn persist(&self) -> ApiResult<()> {
        self.repo.save(&self.store)?;
        Ok(())
    }

    /// 保存失败时恢复编辑前的内存状态，内存与文件保持一致
    fn persist_or_rollback(&mut self, snapshot: RecordStore) -> ApiResult<()> {
        if let Err(e) = self.persist() {
            tracing::error!("状态保存失败，已撤销本次编辑: {}", e);
            self.store = snapshot;
            return Err(e);
        }
        Ok(())
    }

    // ==========================================
    // 只读查询
    // ==========================================

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn origin(&self) -> SessionOrigin {
        self.origin
    }

    pub fn state_path(&self) -> &Path {
        self.repo.path()
    }

    /// 由 (列, 值) 对构造过滤条件，哨兵值视为「全部」
    pub fn criteria<I, K, V>(&self, pairs: I) -> FilterCriteria
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        FilterCriteria::from_pairs(pairs, &self.config.all_sentinel)
    }

    pub fn summary(&self, criteria: &FilterCriteria) -> DashboardSummary {
        self.store.summary(criteria)
    }

    pub fn filtered(&self, criteria: &FilterCriteria) -> Vec<&Aviso> {
        self.store.filter(criteria)
    }

    pub fn view(&self, view: ManagedView, criteria: &FilterCriteria) -> Vec<&Aviso> {
        self.store.view(view, criteria)
    }

    pub fn filter_options(&self, column: &str) -> Vec<String> {
        self.store.filter_options(column, &self.config.all_sentinel)
    }

    /// 配置中全部过滤列的下拉选项
    pub fn all_filter_options(&self) -> Vec<(String, Vec<String>)> {
        self.config
            .filter_columns
            .iter()
            .map(|column| (column.clone(), self.filter_options(column)))
            .collect()
    }

    pub fn group_stats(&self, group_column: &str, value_column: &str) -> Vec<GroupStat> {
        self.store.aggregate_mean_by_group(group_column, value_column)
    }

    pub fn histogram(&self, criteria: &FilterCriteria) -> Vec<HistogramBucket> {
        self.store.histogram(criteria)
    }

    pub fn color_for(&self, value: Option<f64>) -> String {
        self.color_mapper.color_hex(value)
    }

    // ==========================================
    // 编辑（编辑后持久化）
    // ==========================================

    /// 设置已处理标记；主键不存在时返回 Ok(false)，不写文件；保存失败则撤销
    pub fn set_managed(&mut self, id: &str, value: bool) -> ApiResult<bool> {
        let snapshot = self.store.clone();
        let found = self.store.set_managed(id, value);
        if found {
            self.persist_or_rollback(snapshot)?;
        }
        Ok(found)
    }

    /// 设置工单号；主键不存在时返回 Ok(false)，不写文件
    pub fn set_ticket(&mut self, id: &str, value: &str) -> ApiResult<bool> {
        let snapshot = self.store.clone();
        let found = self.store.set_ticket(id, value.trim());
        if found {
            self.persist_or_rollback(snapshot)?;
        }
        Ok(found)
    }

    /// 批量编辑，返回生效条数
    pub fn apply_edits(&mut self, edits: &[RecordEdit]) -> ApiResult<usize> {
        let snapshot = self.store.clone();
        let applied = self.store.apply_edits(edits);
        if applied > 0 {
            self.persist_or_rollback(snapshot)?;
        }
        tracing::info!("批量编辑: 提交 {} 条, 生效 {} 条", edits.len(), applied);
        Ok(applied)
    }

    /// 从导出的表格按主键合并 已处理 / 工单号
    pub fn import_state<P: AsRef<Path>>(&mut self, path: P) -> ApiResult<usize> {
        let path = path.as_ref();
        let exported = PersistentStateRepository::new(path)
            .with_criticality_bounds(self.config.criticality_min, self.config.criticality_max);

        let other = match exported.load(&self.config.catalog()) {
            PersistedState::Valid(store) => store,
            PersistedState::Absent => return Err(ApiError::NotFound(path.display().to_string())),
            PersistedState::ParseError(e) => return Err(e.into()),
            PersistedState::SchemaMissing { missing } => {
                return Err(ApiError::InvalidInput(format!(
                    "{} 缺少列: {}",
                    path.display(),
                    missing.join(", ")
                )))
            }
        };

        let snapshot = self.store.clone();
        let updated = self.store.merge_state(other.records());
        if updated > 0 {
            self.persist_or_rollback(snapshot)?;
        }
        tracing::info!("已从 {} 合并状态: {} 条更新", path.display(), updated);
        Ok(updated)
    }

    // ==========================================
    // 导出
    // ==========================================

    /// 整表导出 XLSX
    pub fn export_xlsx<P: AsRef<Path>>(&self, path: P) -> ApiResult<()> {
        self.exporter
            .export_xlsx(self.store.schema(), self.store.records(), path.as_ref())?;
        Ok(())
    }

    /// 导出当前过滤视图为 CSV，返回导出条数
    pub fn export_csv<P: AsRef<Path>>(&self, path: P, criteria: &FilterCriteria) -> ApiResult<usize> {
        let rows = self.store.filter(criteria);
        let count = rows.len();
        self.exporter
            .export_csv(self.store.schema(), rows, path.as_ref())?;
        Ok(count)
    }
}
