// ==========================================
// avisos 看板 - 字段映射器实现
// ==========================================
// 阶段 3: 已对齐表格 → Aviso
// 职责: 表头 → 字段 + 一次性类型转换
// ==========================================

use crate::domain::{Aviso, Field, Schema};
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::importer_trait::{DataCleaner as _, FieldMapper as FieldMapperTrait};
use crate::importer::raw_table::{RawCell, RawTable};
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct FieldMapper {
    cleaner: DataCleaner,
    criticality_min: f64,
    criticality_max: f64,
}

impl FieldMapper {
    /// # 参数
    /// - criticality_min / criticality_max: 危急度有效范围，范围外视为缺失
    pub fn new(criticality_min: f64, criticality_max: f64) -> Self {
        Self {
            cleaner: DataCleaner,
            criticality_min,
            criticality_max,
        }
    }

    fn map_row(&self, table: &RawTable, row: usize, columns: &[(Field, usize)]) -> Aviso {
        let mut aviso = Aviso::new(String::new());

        for (field, col) in columns {
            let cell = table.cell(row, *col);
            match field {
                Field::Id => {
                    if let Some(id) = self.cleaner.clean_text(cell) {
                        aviso.id = id;
                    }
                }
                Field::NoticeDate => aviso.notice_date = self.cleaner.coerce_date(cell),
                Field::Criticality => {
                    aviso.criticality = self.cleaner.coerce_criticality(
                        cell,
                        self.criticality_min,
                        self.criticality_max,
                    )
                }
                Field::EstimatedCost => aviso.estimated_cost = self.cleaner.coerce_cost(cell),
                Field::Managed => aviso.managed = self.cleaner.coerce_bool(cell),
                // 工单号原样保留，保存再读取不改变内容
                Field::Ticket => {
                    aviso.ticket = match cell {
                        RawCell::Text(s) => s.clone(),
                        other => self.cleaner.clean_text(other).unwrap_or_default(),
                    }
                }
                other => {
                    if let Some(slot) = aviso.text_slot_mut(*other) {
                        *slot = self.cleaner.clean_text(cell);
                    }
                }
            }
        }

        // 无主键时使用行序号（从 1 开始）
        if aviso.id.is_empty() {
            aviso.id = (row + 1).to_string();
        }
        aviso
    }
}

impl Default for FieldMapper {
    fn default() -> Self {
        Self::new(1.0, 100.0)
    }
}

impl FieldMapperTrait for FieldMapper {
    fn map_table(&self, table: &RawTable, schema: &Schema) -> Vec<Aviso> {
        let columns: Vec<(Field, usize)> = table
            .headers
            .iter()
            .enumerate()
            .filter_map(|(idx, header)| schema.resolve(header).map(|f| (f, idx)))
            .collect();

        if !columns.iter().any(|(f, _)| *f == Field::Id) {
            tracing::warn!("表格无主键列，使用行序号作为替代主键");
        }

        let avisos: Vec<Aviso> = (0..table.row_count())
            .map(|row| self.map_row(table, row, &columns))
            .collect();

        let duplicates = {
            let mut seen = HashSet::with_capacity(avisos.len());
            avisos.iter().filter(|a| !seen.insert(a.id.as_str())).count()
        };
        if duplicates > 0 {
            tracing::warn!("发现 {} 条重复主键（不强制唯一，编辑按首条匹配）", duplicates);
        }

        avisos
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FieldCatalog;
    use chrono::NaiveDate;

    fn table(headers: &[&str], rows: Vec<Vec<RawCell>>) -> (RawTable, Schema) {
        let headers: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
        let schema = Schema::from_headers(FieldCatalog::default(), &headers);
        let mut table = RawTable::new(headers);
        for row in rows {
            table.push_row(row);
        }
        (table, schema)
    }

    #[test]
    fn test_field_mapper_basic() {
        let (table, schema) = table(
            &["Aviso", "Fecha de aviso", "Grupo planif.", "criticidad_final", "Prioridad"],
            vec![vec![
                RawCell::Number(10234567.0),
                RawCell::Text("2025-01-20".to_string()),
                RawCell::Text(" A ".to_string()),
                RawCell::Number(57.5),
                RawCell::Number(2.0),
            ]],
        );

        let avisos = FieldMapper::default().map_table(&table, &schema);

        assert_eq!(avisos.len(), 1);
        let aviso = &avisos[0];
        assert_eq!(aviso.id, "10234567");
        assert_eq!(aviso.notice_date, NaiveDate::from_ymd_opt(2025, 1, 20));
        assert_eq!(aviso.planning_group, Some("A".to_string()));
        assert_eq!(aviso.criticality, Some(57.5));
        assert_eq!(aviso.priority, Some("2".to_string()));
        assert!(!aviso.managed);
        assert_eq!(aviso.ticket, "");
    }

    #[test]
    fn test_field_mapper_invalid_values_become_missing() {
        let (table, schema) = table(
            &["Aviso", "criticidad_final", "Fecha de aviso"],
            vec![
                vec![
                    RawCell::Text("1".to_string()),
                    RawCell::Text("alta".to_string()),
                    RawCell::Text("sin fecha".to_string()),
                ],
                vec![
                    RawCell::Text("2".to_string()),
                    RawCell::Number(250.0),
                    RawCell::Empty,
                ],
            ],
        );

        let avisos = FieldMapper::default().map_table(&table, &schema);

        assert!(avisos.iter().all(|a| a.criticality.is_none()));
        assert!(avisos.iter().all(|a| a.notice_date.is_none()));
    }

    #[test]
    fn test_field_mapper_positional_id() {
        let (table, schema) = table(
            &["Grupo planif."],
            vec![
                vec![RawCell::Text("A".to_string())],
                vec![RawCell::Text("B".to_string())],
            ],
        );

        let avisos = FieldMapper::default().map_table(&table, &schema);

        assert_eq!(avisos[0].id, "1");
        assert_eq!(avisos[1].id, "2");
    }

    #[test]
    fn test_field_mapper_reads_managed_and_ticket() {
        let (table, schema) = table(
            &["Aviso", "Gestionado", "Ticket"],
            vec![vec![
                RawCell::Text("1".to_string()),
                RawCell::Bool(true),
                RawCell::Text("INC-42".to_string()),
            ]],
        );

        let avisos = FieldMapper::default().map_table(&table, &schema);

        assert!(avisos[0].managed);
        assert_eq!(avisos[0].ticket, "INC-42");
    }

    #[test]
    fn test_field_mapper_keeps_ticket_text_verbatim() {
        let (table, schema) = table(
            &["Aviso", "Ticket"],
            vec![
                vec![RawCell::Text("1".to_string()), RawCell::Text("  OT-6 ".to_string())],
                vec![RawCell::Text("2".to_string()), RawCell::Number(42.0)],
                vec![RawCell::Text("3".to_string()), RawCell::Empty],
            ],
        );

        let avisos = FieldMapper::default().map_table(&table, &schema);

        assert_eq!(avisos[0].ticket, "  OT-6 ");
        assert_eq!(avisos[1].ticket, "42");
        assert_eq!(avisos[2].ticket, "");
    }
}
