// ==========================================
// avisos 看板 - 过滤条件
// ==========================================
// 职责: 列 → 精确匹配值 /「全部」哨兵
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 下拉框「全部」的默认哨兵
pub const ALL_SENTINEL: &str = "(Todos)";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterValue {
    All,
    Exact(String),
}

impl FilterValue {
    /// 下拉框取值 → 过滤值（等于哨兵视为全部）
    pub fn parse(value: &str, sentinel: &str) -> Self {
        if value == sentinel {
            FilterValue::All
        } else {
            FilterValue::Exact(value.to_string())
        }
    }

    pub fn matches(&self, candidate: Option<&str>) -> bool {
        match self {
            FilterValue::All => true,
            FilterValue::Exact(expected) => candidate == Some(expected.as_str()),
        }
    }
}

/// 过滤条件集合（列名 → 过滤值）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    criteria: BTreeMap<String, FilterValue>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 (列, 值) 对构造；值等于哨兵时视为全部
    pub fn from_pairs<I, K, V>(pairs: I, sentinel: &str) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let criteria = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), FilterValue::parse(v.as_ref(), sentinel)))
            .collect();
        Self { criteria }
    }

    pub fn with(mut self, column: impl Into<String>, value: FilterValue) -> Self {
        self.criteria.insert(column.into(), value);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FilterValue)> {
        self.criteria.iter()
    }

    /// 没有任何精确条件
    pub fn is_unrestricted(&self) -> bool {
        self.criteria.values().all(|v| *v == FilterValue::All)
    }
}
