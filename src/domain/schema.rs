// ==========================================
// avisos 看板 - 字段目录与表结构
// ==========================================
// 职责: 定义规范列名、别名、字段类型，以及加载后实际存在的列集合
// 红线: 字段类型在加载时确定，使用处不再临时判断
// ==========================================

use crate::domain::types::FieldKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 主键列（aviso 编号）
pub const ID_COLUMN: &str = "Aviso";
/// 已处理标记列，同时作为持久化文件的结构标记列
pub const MANAGED_COLUMN: &str = "Gestionado";
/// 工单号/备注列
pub const TICKET_COLUMN: &str = "Ticket";

/// 表头规范化：所有空白（含换行）折叠为单个空格并去掉首尾空白
///
/// # 示例
/// ```
/// use avisos_dashboard::domain::schema::normalize_header;
/// assert_eq!(normalize_header("Fecha de\naviso "), "Fecha de aviso");
/// ```
pub fn normalize_header(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ==========================================
// Field - 规范字段
// ==========================================
// 各版本表格中出现过的字段并集
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Id,
    NoticeDate,
    Description,
    TechnicalLocation,
    AbcIndicator,
    PlanningGroup,
    NoticeClass,
    Denomination,
    Priority,
    MotiveText,
    ProblemText,
    Criticality,
    CriticalityLevel,
    PredictedOrderClass,
    PredictedActivityClass,
    PredictedWorkCenter,
    EstimatedCost,
    Managed,
    Ticket,
}

impl Field {
    pub const ALL: [Field; 19] = [
        Field::Id,
        Field::NoticeDate,
        Field::Description,
        Field::TechnicalLocation,
        Field::AbcIndicator,
        Field::PlanningGroup,
        Field::NoticeClass,
        Field::Denomination,
        Field::Priority,
        Field::MotiveText,
        Field::ProblemText,
        Field::Criticality,
        Field::CriticalityLevel,
        Field::PredictedOrderClass,
        Field::PredictedActivityClass,
        Field::PredictedWorkCenter,
        Field::EstimatedCost,
        Field::Managed,
        Field::Ticket,
    ];

    /// 源表格中的规范列名
    pub fn canonical(&self) -> &'static str {
        match self {
            Field::Id => ID_COLUMN,
            Field::NoticeDate => "Fecha de aviso",
            Field::Description => "Descripción",
            Field::TechnicalLocation => "Ubicac.técnica",
            Field::AbcIndicator => "Indicador ABC",
            Field::PlanningGroup => "Grupo planif.",
            Field::NoticeClass => "Clase de aviso",
            Field::Denomination => "Denominación",
            Field::Priority => "Prioridad",
            Field::MotiveText => "Txt. cód. mot.",
            Field::ProblemText => "TextoCódProblem",
            Field::Criticality => "criticidad_final",
            Field::CriticalityLevel => "Nivel criticidad",
            Field::PredictedOrderClass => "Clase de orden_pred",
            Field::PredictedActivityClass => "Cl.actividad PM_pred",
            Field::PredictedWorkCenter => "Pto.tbjo.resp._pred",
            Field::EstimatedCost => "Costo estimado",
            Field::Managed => MANAGED_COLUMN,
            Field::Ticket => TICKET_COLUMN,
        }
    }

    /// 其他版本表格里出现过的同义列名
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Field::Id => &["N° Aviso", "Nro. Aviso"],
            Field::Criticality => &["Criticidad_1a100", "Criticidad"],
            Field::EstimatedCost => &["Costo_estimado", "Costo estimado (CLP)"],
            Field::Priority => &["Prioridad aviso"],
            _ => &[],
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Field::NoticeDate => FieldKind::Date,
            Field::Criticality | Field::EstimatedCost => FieldKind::Number,
            Field::Managed => FieldKind::Bool,
            _ => FieldKind::Text,
        }
    }
}

// ==========================================
// FieldCatalog - 字段目录（规范名 → 显示名）
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct FieldCatalog {
    rename: BTreeMap<String, String>,
}

impl FieldCatalog {
    /// 创建字段目录
    ///
    /// # 参数
    /// - rename: 规范名 → 显示名（键按表头规则规范化）
    pub fn new(rename: &BTreeMap<String, String>) -> Self {
        let rename = rename
            .iter()
            .map(|(k, v)| (normalize_header(k), normalize_header(v)))
            .filter(|(k, v)| !k.is_empty() && !v.is_empty())
            .collect();
        Self { rename }
    }

    pub fn rename_map(&self) -> &BTreeMap<String, String> {
        &self.rename
    }

    /// 字段的显示名（导出/持久化表头使用）
    pub fn display_name(&self, field: Field) -> String {
        let canonical = field.canonical();
        self.rename
            .get(canonical)
            .cloned()
            .unwrap_or_else(|| canonical.to_string())
    }

    /// 列名解析为字段：依次匹配显示名、规范名、别名
    pub fn resolve(&self, column: &str) -> Option<Field> {
        let wanted = normalize_header(column);
        if wanted.is_empty() {
            return None;
        }
        Field::ALL
            .iter()
            .copied()
            .find(|f| self.display_name(*f) == wanted)
            .or_else(|| Field::ALL.iter().copied().find(|f| f.canonical() == wanted))
            .or_else(|| {
                Field::ALL
                    .iter()
                    .copied()
                    .find(|f| f.aliases().iter().any(|a| normalize_header(a) == wanted))
            })
    }

    /// 规范名 → 别名列表，供列对齐使用
    pub fn alias_map(&self) -> BTreeMap<String, Vec<String>> {
        Field::ALL
            .iter()
            .filter(|f| !f.aliases().is_empty())
            .map(|f| {
                (
                    f.canonical().to_string(),
                    f.aliases().iter().map(|a| a.to_string()).collect(),
                )
            })
            .collect()
    }
}

// ==========================================
// Schema - 已加载表格的列结构
// ==========================================
// 用途: 记录实际存在的字段及其顺序，导出时保持同一列集合
#[derive(Debug, Clone)]
pub struct Schema {
    catalog: FieldCatalog,
    fields: Vec<Field>,
}

impl Schema {
    /// 由表头推导结构
    ///
    /// # 说明
    /// - 无法识别的表头记录告警并忽略
    /// - 重复字段只保留第一次出现
    /// - Gestionado / Ticket 缺失时追加到末尾
    pub fn from_headers(catalog: FieldCatalog, headers: &[String]) -> Self {
        let mut fields: Vec<Field> = Vec::with_capacity(headers.len() + 2);
        for header in headers {
            match catalog.resolve(header) {
                Some(field) if !fields.contains(&field) => fields.push(field),
                Some(_) => tracing::warn!("重复列已忽略: {}", header),
                None => tracing::warn!("未知列已忽略: {}", header),
            }
        }
        for field in [Field::Managed, Field::Ticket] {
            if !fields.contains(&field) {
                fields.push(field);
            }
        }
        Self { catalog, fields }
    }

    pub fn catalog(&self) -> &FieldCatalog {
        &self.catalog
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn contains(&self, field: Field) -> bool {
        self.fields.contains(&field)
    }

    pub fn display_name(&self, field: Field) -> String {
        self.catalog.display_name(field)
    }

    /// 导出表头（按字段顺序）
    pub fn headers(&self) -> Vec<String> {
        self.fields.iter().map(|f| self.display_name(*f)).collect()
    }

    /// 解析列名，仅返回当前表格中存在的字段
    pub fn resolve(&self, column: &str) -> Option<Field> {
        self.catalog.resolve(column).filter(|f| self.contains(*f))
    }
}
