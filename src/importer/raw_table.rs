// ==========================================
// avisos 看板 - 原始表格
// ==========================================
// 用途: 文件解析 → 列对齐 → 字段映射 之间的中间产物
// 生命周期: 仅在导入流程内
// ==========================================

use chrono::NaiveDateTime;

/// 单元格原始值（不做业务转换）
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RawCell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl RawCell {
    pub fn is_blank(&self) -> bool {
        match self {
            RawCell::Empty => true,
            RawCell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

/// 带表头的原始表格
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<RawCell>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// 追加一行；完全空白的行跳过
    pub fn push_row(&mut self, row: Vec<RawCell>) {
        if row.iter().all(RawCell::is_blank) {
            return;
        }
        self.rows.push(row);
    }

    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    /// 取单元格；行长度不足时视为空
    pub fn cell(&self, row: usize, col: usize) -> &RawCell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&RawCell::Empty)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}
