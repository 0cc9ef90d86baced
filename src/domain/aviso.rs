// ==========================================
// avisos 看板 - 维护通知领域模型
// ==========================================
// 用途: 导入层写入，引擎层读取；仅 managed / ticket 可在会话中修改
// ==========================================

use crate::domain::schema::Field;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// Aviso - 维护通知（一行记录）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aviso {
    // ===== 主键 =====
    pub id: String, // aviso 编号；源表无该列时为行序号

    // ===== 基础信息 =====
    pub notice_date: Option<NaiveDate>,       // Fecha de aviso
    pub description: Option<String>,          // Descripción
    pub technical_location: Option<String>,   // Ubicac.técnica
    pub abc_indicator: Option<String>,        // Indicador ABC
    pub planning_group: Option<String>,       // Grupo planif.
    pub notice_class: Option<String>,         // Clase de aviso
    pub denomination: Option<String>,         // Denominación
    pub priority: Option<String>,             // Prioridad
    pub motive_text: Option<String>,          // Txt. cód. mot.
    pub problem_text: Option<String>,         // TextoCódProblem

    // ===== 模型输出 =====
    pub criticality: Option<f64>,              // criticidad_final，仅 [1,100]
    pub criticality_level: Option<String>,     // Nivel criticidad
    pub predicted_order_class: Option<String>, // Clase de orden_pred
    pub predicted_activity_class: Option<String>, // Cl.actividad PM_pred
    pub predicted_work_center: Option<String>, // Pto.tbjo.resp._pred
    pub estimated_cost: Option<f64>,           // 估算成本（>= 0）

    // ===== 人工处理 =====
    pub managed: bool,  // Gestionado
    pub ticket: String, // Ticket（可为空）
}

impl Aviso {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            notice_date: None,
            description: None,
            technical_location: None,
            abc_indicator: None,
            planning_group: None,
            notice_class: None,
            denomination: None,
            priority: None,
            motive_text: None,
            problem_text: None,
            criticality: None,
            criticality_level: None,
            predicted_order_class: None,
            predicted_activity_class: None,
            predicted_work_center: None,
            estimated_cost: None,
            managed: false,
            ticket: String::new(),
        }
    }

    /// 文本类可选字段的槽位（非文本字段返回 None）
    pub fn text_slot(&self, field: Field) -> Option<&Option<String>> {
        match field {
            Field::Description => Some(&self.description),
            Field::TechnicalLocation => Some(&self.technical_location),
            Field::AbcIndicator => Some(&self.abc_indicator),
            Field::PlanningGroup => Some(&self.planning_group),
            Field::NoticeClass => Some(&self.notice_class),
            Field::Denomination => Some(&self.denomination),
            Field::Priority => Some(&self.priority),
            Field::MotiveText => Some(&self.motive_text),
            Field::ProblemText => Some(&self.problem_text),
            Field::CriticalityLevel => Some(&self.criticality_level),
            Field::PredictedOrderClass => Some(&self.predicted_order_class),
            Field::PredictedActivityClass => Some(&self.predicted_activity_class),
            Field::PredictedWorkCenter => Some(&self.predicted_work_center),
            _ => None,
        }
    }

    pub fn text_slot_mut(&mut self, field: Field) -> Option<&mut Option<String>> {
        match field {
            Field::Description => Some(&mut self.description),
            Field::TechnicalLocation => Some(&mut self.technical_location),
            Field::AbcIndicator => Some(&mut self.abc_indicator),
            Field::PlanningGroup => Some(&mut self.planning_group),
            Field::NoticeClass => Some(&mut self.notice_class),
            Field::Denomination => Some(&mut self.denomination),
            Field::Priority => Some(&mut self.priority),
            Field::MotiveText => Some(&mut self.motive_text),
            Field::ProblemText => Some(&mut self.problem_text),
            Field::CriticalityLevel => Some(&mut self.criticality_level),
            Field::PredictedOrderClass => Some(&mut self.predicted_order_class),
            Field::PredictedActivityClass => Some(&mut self.predicted_activity_class),
            Field::PredictedWorkCenter => Some(&mut self.predicted_work_center),
            _ => None,
        }
    }

    /// 字段的文本表示（过滤、CSV 导出、筛选项使用）
    ///
    /// 缺失值返回 None
    pub fn text_value(&self, field: Field) -> Option<String> {
        match field {
            Field::Id => Some(self.id.clone()),
            Field::NoticeDate => self.notice_date.map(|d| d.format("%Y-%m-%d").to_string()),
            Field::Criticality => self.criticality.map(format_number),
            Field::EstimatedCost => self.estimated_cost.map(format_number),
            Field::Managed => Some(self.managed.to_string()),
            Field::Ticket => Some(self.ticket.clone()),
            other => self.text_slot(other).and_then(|v| v.clone()),
        }
    }

    /// 字段的数值表示；文本字段尝试解析，失败视为缺失
    pub fn numeric_value(&self, field: Field) -> Option<f64> {
        match field {
            Field::Criticality => self.criticality,
            Field::EstimatedCost => self.estimated_cost,
            Field::Managed => Some(if self.managed { 1.0 } else { 0.0 }),
            Field::NoticeDate => None,
            other => self
                .text_value(other)
                .and_then(|s| s.trim().replace(',', ".").parse::<f64>().ok())
                .filter(|v| v.is_finite()),
        }
    }
}

/// 数值格式化：整数值不带小数部分（电子表格中的编号常以浮点存储）
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_defaults() {
        let aviso = Aviso::new("1001");
        assert_eq!(aviso.id, "1001");
        assert!(!aviso.managed);
        assert!(aviso.ticket.is_empty());
        assert!(aviso.criticality.is_none());
    }

    #[test]
    fn test_text_value_rendering() {
        let mut aviso = Aviso::new("1001");
        aviso.planning_group = Some("A".to_string());
        aviso.criticality = Some(57.0);
        aviso.notice_date = NaiveDate::from_ymd_opt(2025, 3, 4);

        assert_eq!(aviso.text_value(Field::PlanningGroup), Some("A".to_string()));
        assert_eq!(aviso.text_value(Field::Criticality), Some("57".to_string()));
        assert_eq!(
            aviso.text_value(Field::NoticeDate),
            Some("2025-03-04".to_string())
        );
        assert_eq!(aviso.text_value(Field::Managed), Some("false".to_string()));
        assert_eq!(aviso.text_value(Field::Priority), None);
    }

    #[test]
    fn test_numeric_value_coerces_text() {
        let mut aviso = Aviso::new("1");
        aviso.priority = Some("2".to_string());
        aviso.description = Some("bomba".to_string());
        assert_eq!(aviso.numeric_value(Field::Priority), Some(2.0));
        assert_eq!(aviso.numeric_value(Field::Description), None);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(10234567.0), "10234567");
        assert_eq!(format_number(12.5), "12.5");
    }
}
