// ==========================================
// avisos 看板 - 记录仓（内存）
// ==========================================
// 职责: 持有完整记录表 + 派生视图（过滤/分区/聚合）
// 红线: 编辑按稳定主键定位，不使用位置索引
// 红线: 主键不存在时为空操作（界面可能引用已被过滤掉的行）
// ==========================================

use crate::domain::{Aviso, Field, ManagedView, Schema};
use crate::engine::aggregate::{self, DashboardSummary, GroupStat, HistogramBucket};
use crate::engine::filter::FilterCriteria;
use serde::{Deserialize, Serialize};

/// 单条编辑（表格编辑器提交）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordEdit {
    SetManaged { id: String, value: bool },
    SetTicket { id: String, value: String },
}

#[derive(Debug, Clone)]
pub struct RecordStore {
    schema: Schema,
    records: Vec<Aviso>,
}

impl RecordStore {
    pub fn new(schema: Schema, records: Vec<Aviso>) -> Self {
        Self { schema, records }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn records(&self) -> &[Aviso] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Aviso> {
        self.records.iter().find(|a| a.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Aviso> {
        self.records.iter_mut().find(|a| a.id == id)
    }

    /// 按条件过滤
    ///
    /// # 说明
    /// - 每个非「全部」条件按文本精确匹配
    /// - 当前表格中不存在的列忽略
    /// - 无条件 → 全量
    pub fn filter(&self, criteria: &FilterCriteria) -> Vec<&Aviso> {
        let active: Vec<(Field, _)> = criteria
            .iter()
            .filter_map(|(column, value)| match self.schema.resolve(column) {
                Some(field) => Some((field, value)),
                None => {
                    tracing::debug!("过滤列不存在，已忽略: {}", column);
                    None
                }
            })
            .collect();

        self.records
            .iter()
            .filter(|aviso| {
                active
                    .iter()
                    .all(|(field, value)| value.matches(aviso.text_value(*field).as_deref()))
            })
            .collect()
    }

    /// 按已处理标记分区 → (已处理, 未处理)
    pub fn partition_by_managed(&self) -> (Vec<&Aviso>, Vec<&Aviso>) {
        self.records.iter().partition(|a| a.managed)
    }

    /// 视图模式 + 过滤条件
    pub fn view(&self, view: ManagedView, criteria: &FilterCriteria) -> Vec<&Aviso> {
        self.filter(criteria)
            .into_iter()
            .filter(|a| view.includes(a.managed))
            .collect()
    }

    /// 设置已处理标记
    ///
    /// # 返回
    /// - true: 找到记录
    /// - false: 主键不存在（不修改任何数据）
    pub fn set_managed(&mut self, id: &str, value: bool) -> bool {
        match self.get_mut(id) {
            Some(aviso) => {
                aviso.managed = value;
                true
            }
            None => {
                tracing::debug!("set_managed: 主键不存在 {}", id);
                false
            }
        }
    }

    /// 设置工单号
    pub fn set_ticket(&mut self, id: &str, value: impl Into<String>) -> bool {
        match self.get_mut(id) {
            Some(aviso) => {
                aviso.ticket = value.into();
                true
            }
            None => {
                tracing::debug!("set_ticket: 主键不存在 {}", id);
                false
            }
        }
    }

    /// 批量编辑，返回生效条数
    pub fn apply_edits(&mut self, edits: &[RecordEdit]) -> usize {
        edits
            .iter()
            .filter(|edit| match edit {
                RecordEdit::SetManaged { id, value } => self.set_managed(id, *value),
                RecordEdit::SetTicket { id, value } => self.set_ticket(id, value.clone()),
            })
            .count()
    }

    /// 从另一份表格按主键合并 managed / ticket，返回更新条数
    pub fn merge_state(&mut self, other: &[Aviso]) -> usize {
        let mut updated = 0;
        for source in other {
            if let Some(target) = self.get_mut(&source.id) {
                if target.managed != source.managed || target.ticket != source.ticket {
                    target.managed = source.managed;
                    target.ticket = source.ticket.clone();
                    updated += 1;
                }
            }
        }
        updated
    }

    /// 分组均值（全量记录）
    pub fn aggregate_mean_by_group(&self, group_column: &str, value_column: &str) -> Vec<GroupStat> {
        aggregate::aggregate_mean_by_group(&self.records, &self.schema, group_column, value_column)
    }

    pub fn summary(&self, criteria: &FilterCriteria) -> DashboardSummary {
        DashboardSummary::compute(self.filter(criteria))
    }

    pub fn histogram(&self, criteria: &FilterCriteria) -> Vec<HistogramBucket> {
        aggregate::criticality_histogram(self.filter(criteria))
    }

    /// 下拉筛选项；列不存在时只有哨兵
    pub fn filter_options(&self, column: &str, sentinel: &str) -> Vec<String> {
        match self.schema.resolve(column) {
            Some(field) => aggregate::filter_options(&self.records, field, sentinel),
            None => vec![sentinel.to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FieldCatalog;
    use crate::engine::filter::{FilterValue, ALL_SENTINEL};

    fn store() -> RecordStore {
        let headers: Vec<String> = ["Aviso", "Grupo planif.", "Prioridad", "criticidad_final"]
            .iter()
            .map(|h| h.to_string())
            .collect();
        let schema = Schema::from_headers(FieldCatalog::default(), &headers);

        let rows = [
            ("1", "A", "1", Some(80.0)),
            ("2", "A", "2", Some(20.0)),
            ("3", "B", "1", None),
            ("4", "C", "3", Some(55.0)),
        ];
        let records = rows
            .iter()
            .map(|(id, group, prio, crit)| {
                let mut a = Aviso::new(*id);
                a.planning_group = Some(group.to_string());
                a.priority = Some(prio.to_string());
                a.criticality = *crit;
                a
            })
            .collect();
        RecordStore::new(schema, records)
    }

    fn ids(records: &[&Aviso]) -> Vec<String> {
        records.iter().map(|a| a.id.clone()).collect()
    }

    #[test]
    fn test_filter_sentinel_returns_all() {
        let store = store();
        let criteria = FilterCriteria::from_pairs([("Grupo planif.", "(Todos)")], ALL_SENTINEL);
        assert_eq!(store.filter(&criteria).len(), 4);
        assert_eq!(store.filter(&FilterCriteria::new()).len(), 4);
    }

    #[test]
    fn test_filter_exact_match() {
        let store = store();
        let criteria = FilterCriteria::from_pairs([("Grupo planif.", "A")], ALL_SENTINEL);
        assert_eq!(ids(&store.filter(&criteria)), vec!["1", "2"]);

        let criteria = FilterCriteria::new()
            .with("Grupo planif.", FilterValue::Exact("A".to_string()))
            .with("Prioridad", FilterValue::Exact("2".to_string()));
        assert_eq!(ids(&store.filter(&criteria)), vec!["2"]);
    }

    #[test]
    fn test_filter_unknown_column_ignored() {
        let store = store();
        let criteria = FilterCriteria::from_pairs([("Indicador ABC", "A")], ALL_SENTINEL);
        assert_eq!(store.filter(&criteria).len(), 4);
    }

    #[test]
    fn test_set_managed_unknown_id_is_noop() {
        let mut store = store();
        let before: Vec<Aviso> = store.records().to_vec();

        assert!(!store.set_managed("999", true));
        assert!(!store.set_ticket("999", "T-1"));

        assert_eq!(store.records(), before.as_slice());
    }

    #[test]
    fn test_set_managed_and_partition() {
        let mut store = store();
        assert!(store.set_managed("2", true));
        assert!(store.set_ticket("2", "INC-7"));

        let (managed, unmanaged) = store.partition_by_managed();
        assert_eq!(ids(&managed), vec!["2"]);
        assert_eq!(unmanaged.len(), 3);
        assert_eq!(store.get("2").map(|a| a.ticket.as_str()), Some("INC-7"));

        let view = store.view(ManagedView::ManagedOnly, &FilterCriteria::new());
        assert_eq!(ids(&view), vec!["2"]);
    }

    #[test]
    fn test_apply_edits_counts_applied() {
        let mut store = store();
        let edits = vec![
            RecordEdit::SetManaged { id: "1".to_string(), value: true },
            RecordEdit::SetTicket { id: "1".to_string(), value: "T-9".to_string() },
            RecordEdit::SetManaged { id: "nope".to_string(), value: true },
        ];
        assert_eq!(store.apply_edits(&edits), 2);
        assert!(store.get("1").map(|a| a.managed).unwrap_or(false));
    }

    #[test]
    fn test_merge_state_by_id() {
        let mut store = store();
        let mut exported = Aviso::new("3");
        exported.managed = true;
        exported.ticket = "OT-3".to_string();
        let stranger = Aviso::new("77");

        assert_eq!(store.merge_state(&[exported, stranger]), 1);
        let merged = store.get("3").cloned().unwrap_or_else(|| Aviso::new(""));
        assert!(merged.managed);
        assert_eq!(merged.ticket, "OT-3");
    }

    #[test]
    fn test_aggregate_and_options() {
        let store = store();
        let stats = store.aggregate_mean_by_group("Grupo planif.", "criticidad_final");
        assert_eq!(stats.len(), 3);
        assert!(stats[1].mean.is_no_data());

        assert_eq!(
            store.filter_options("Grupo planif.", ALL_SENTINEL),
            vec!["(Todos)", "A", "B", "C"]
        );
        assert_eq!(store.filter_options("Indicador ABC", ALL_SENTINEL), vec!["(Todos)"]);
    }
}
