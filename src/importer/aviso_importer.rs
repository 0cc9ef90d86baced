// ==========================================
// avisos 看板 - 导入管道
// ==========================================
// 流程: 文件解析 → 列对齐 → 结构推导 → 字段映射
// 两种入口: 源表格（规范名 + 重命名 + 别名）/ 持久化表格（显示名）
// ==========================================

use crate::domain::{normalize_header, Aviso, FieldCatalog, Schema};
use crate::importer::column_reconciler::ColumnReconciler;
use crate::importer::error::ImportResult;
use crate::importer::field_mapper::FieldMapper;
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::importer_trait::FieldMapper as _;
use crate::importer::raw_table::RawTable;
use std::path::Path;
use std::time::Instant;

/// 导入结果
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub schema: Schema,
    pub avisos: Vec<Aviso>,
    /// 未匹配的期望列（告警，不阻断）
    pub missing_columns: Vec<String>,
}

pub struct AvisoImporter {
    catalog: FieldCatalog,
    desired: Vec<String>,
    apply_rename: bool,
    mapper: FieldMapper,
}

impl AvisoImporter {
    /// 源表格导入器
    ///
    /// # 参数
    /// - desired: 期望的规范列名（有序）
    pub fn for_source(catalog: FieldCatalog, desired: Vec<String>, mapper: FieldMapper) -> Self {
        Self {
            catalog,
            desired,
            apply_rename: true,
            mapper,
        }
    }

    /// 持久化表格导入器：表头已是显示名，不再重命名，保持文件列序
    pub fn for_persisted(catalog: FieldCatalog, mapper: FieldMapper) -> Self {
        Self {
            catalog,
            desired: Vec::new(),
            apply_rename: false,
            mapper,
        }
    }

    pub fn catalog(&self) -> &FieldCatalog {
        &self.catalog
    }

    /// 解析并导入文件
    pub fn import_file<P: AsRef<Path>>(&self, path: P) -> ImportResult<ImportOutcome> {
        let path = path.as_ref();
        let start = Instant::now();
        let raw = UniversalFileParser.parse(path)?;
        let outcome = self.import_table(&raw);

        tracing::info!(
            "导入完成: {} ({} 条, {} 列, 缺失 {} 列, 耗时 {}ms)",
            path.display(),
            outcome.avisos.len(),
            outcome.schema.fields().len(),
            outcome.missing_columns.len(),
            start.elapsed().as_millis()
        );
        Ok(outcome)
    }

    /// 对已解析的原始表格执行对齐与映射
    pub fn import_table(&self, raw: &RawTable) -> ImportOutcome {
        let desired: Vec<String> = if self.apply_rename {
            self.desired.clone()
        } else {
            raw.headers
                .iter()
                .filter(|h| self.catalog.resolve(h).is_some())
                .map(|h| normalize_header(h))
                .collect()
        };

        let mut reconciler = ColumnReconciler::new(desired);
        if self.apply_rename {
            reconciler = reconciler
                .with_rename(self.catalog.rename_map())
                .with_aliases(self.catalog.alias_map());
        }
        let reconciliation = reconciler.reconcile(raw);

        let schema = Schema::from_headers(self.catalog.clone(), &reconciliation.table.headers);
        let avisos = self.mapper.map_table(&reconciliation.table, &schema);

        ImportOutcome {
            schema,
            avisos,
            missing_columns: reconciliation.missing,
        }
    }
}
