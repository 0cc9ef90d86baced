// ==========================================
// avisos 看板 - 领域类型定义
// ==========================================
// 职责: 字段类型、视图模式、指标值等基础枚举
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 字段类型 (Field Kind)
// ==========================================
// 加载时一次性按类型强制转换
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldKind {
    Text,   // 自由文本/分类值
    Date,   // 日期（无时间部分）
    Number, // 浮点数
    Bool,   // 布尔标记
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Text => write!(f, "TEXT"),
            FieldKind::Date => write!(f, "DATE"),
            FieldKind::Number => write!(f, "NUMBER"),
            FieldKind::Bool => write!(f, "BOOL"),
        }
    }
}

// ==========================================
// 视图模式 (Managed View)
// ==========================================
// 对应看板上的「Todos los avisos / Sólo gestionados」切换
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ManagedView {
    #[default]
    All,           // 全部
    ManagedOnly,   // 仅已处理
    UnmanagedOnly, // 仅未处理
}

impl ManagedView {
    pub fn includes(&self, managed: bool) -> bool {
        match self {
            ManagedView::All => true,
            ManagedView::ManagedOnly => managed,
            ManagedView::UnmanagedOnly => !managed,
        }
    }
}

impl fmt::Display for ManagedView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManagedView::All => write!(f, "ALL"),
            ManagedView::ManagedOnly => write!(f, "MANAGED_ONLY"),
            ManagedView::UnmanagedOnly => write!(f, "UNMANAGED_ONLY"),
        }
    }
}

// ==========================================
// 指标值 (Metric)
// ==========================================
// 无数据时返回 NoData 占位，不让 NaN 静默传播
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Metric {
    Value(f64),
    NoData,
}

impl Metric {
    /// 从可能为空的均值构造
    pub fn from_mean(sum: f64, count: usize) -> Self {
        if count == 0 {
            Metric::NoData
        } else {
            Metric::Value(sum / count as f64)
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Metric::Value(v) => Some(*v),
            Metric::NoData => None,
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, Metric::NoData)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Value(v) => write!(f, "{:.1}", v),
            Metric::NoData => write!(f, "—"),
        }
    }
}
