// ==========================================
// avisos 看板 - 列对齐
// ==========================================
// 阶段 1: 期望列名 ↔ 实际表头（可能含多余空白/换行）
// 职责: 投影 + 重命名，记录未匹配的期望列
// 红线: 缺列只告警不报错（不同版本的表格列集合本就不同）
// ==========================================

use crate::domain::schema::normalize_header;
use crate::importer::raw_table::RawTable;
use std::collections::{BTreeMap, HashMap};

/// 对齐结果
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    /// 仅含匹配列的新表（按期望顺序，已重命名，单元格原样）
    pub table: RawTable,
    /// 未投影的期望列名（未匹配，或与前面的期望列指向同一源列）
    pub missing: Vec<String>,
}

impl Reconciliation {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

pub struct ColumnReconciler {
    desired: Vec<String>,
    rename: BTreeMap<String, String>,
    aliases: BTreeMap<String, Vec<String>>,
}

impl ColumnReconciler {
    /// 创建列对齐器
    ///
    /// # 参数
    /// - desired: 期望的规范列名（有序）
    pub fn new<I, S>(desired: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            desired: desired.into_iter().map(Into::into).collect(),
            rename: BTreeMap::new(),
            aliases: BTreeMap::new(),
        }
    }

    /// 规范名 → 最终显示名
    pub fn with_rename(mut self, rename: &BTreeMap<String, String>) -> Self {
        self.rename = rename
            .iter()
            .map(|(k, v)| (normalize_header(k), v.clone()))
            .collect();
        self
    }

    /// 规范名 → 可接受的同义表头（精确匹配失败后才尝试）
    pub fn with_aliases(mut self, aliases: BTreeMap<String, Vec<String>>) -> Self {
        self.aliases = aliases
            .into_iter()
            .map(|(k, v)| (normalize_header(&k), v))
            .collect();
        self
    }

    /// 执行对齐
    pub fn reconcile(&self, source: &RawTable) -> Reconciliation {
        // 规范化表头 → 原始列索引（重复时保留第一个）
        let mut lookup: HashMap<String, usize> = HashMap::with_capacity(source.headers.len());
        for (idx, header) in source.headers.iter().enumerate() {
            lookup.entry(normalize_header(header)).or_insert(idx);
        }

        let mut selected: Vec<(usize, String)> = Vec::with_capacity(self.desired.len());
        let mut missing = Vec::new();

        for desired in &self.desired {
            let key = normalize_header(desired);
            let found = lookup.get(&key).copied().or_else(|| {
                self.aliases
                    .get(&key)
                    .into_iter()
                    .flatten()
                    .find_map(|alias| lookup.get(&normalize_header(alias)).copied())
            });

            match found {
                Some(idx) if !selected.iter().any(|(i, _)| *i == idx) => {
                    let name = self.rename.get(&key).cloned().unwrap_or(key);
                    selected.push((idx, name));
                }
                Some(_) => {
                    tracing::warn!("列 '{}' 与其他期望列指向同一源列，已跳过", desired);
                    missing.push(desired.clone());
                }
                None => {
                    tracing::warn!("未匹配列: '{}'", desired);
                    missing.push(desired.clone());
                }
            }
        }

        let mut table = RawTable::new(selected.iter().map(|(_, name)| name.clone()).collect());
        table.rows = source
            .rows
            .iter()
            .map(|row| {
                selected
                    .iter()
                    .map(|(idx, _)| row.get(*idx).cloned().unwrap_or_default())
                    .collect()
            })
            .collect();

        Reconciliation { table, missing }
    }
}
