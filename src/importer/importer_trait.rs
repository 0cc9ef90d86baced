// ==========================================
// avisos 看板 - 导入管道 Trait
// ==========================================
// 职责: 定义导入各阶段接口（不包含实现）
// 管道: 文件解析 → 列对齐 → 清洗/类型转换 → 字段映射
// ==========================================

use crate::domain::{Aviso, Schema};
use crate::importer::error::ImportResult;
use crate::importer::raw_table::{RawCell, RawTable};
use chrono::NaiveDate;
use std::path::Path;

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口（阶段 0）
// 实现者: ExcelParser, CsvParser
pub trait FileParser: Send + Sync {
    /// 解析文件为原始表格（第一行为表头）
    ///
    /// # 返回
    /// - Ok(RawTable): 表头原样保留（规范化在列对齐阶段进行）
    /// - Err: 文件不存在、格式不支持、解析失败
    fn parse_to_raw_table(&self, file_path: &Path) -> ImportResult<RawTable>;
}

// ==========================================
// DataCleaner Trait
// ==========================================
// 用途: 宽松类型转换（阶段 2）
// 红线: 非法值一律视为缺失，不返回错误
pub trait DataCleaner: Send + Sync {
    /// 文本：去首尾空白，空串视为缺失
    fn clean_text(&self, cell: &RawCell) -> Option<String>;

    /// 数值：无法解析或非有限值视为缺失
    fn coerce_f64(&self, cell: &RawCell) -> Option<f64>;

    /// 日期：支持 Excel 日期、序列号及常见文本格式
    fn coerce_date(&self, cell: &RawCell) -> Option<NaiveDate>;

    /// 布尔：无法识别视为 false
    fn coerce_bool(&self, cell: &RawCell) -> bool;

    /// 危急度：仅保留 [min, max] 范围内的数值
    fn coerce_criticality(&self, cell: &RawCell, min: f64, max: f64) -> Option<f64>;
}

// ==========================================
// FieldMapper Trait
// ==========================================
// 用途: 已对齐表格 → 领域记录（阶段 3）
pub trait FieldMapper: Send + Sync {
    /// 按结构映射所有行
    ///
    /// # 说明
    /// - 表中没有主键列时，以行序号（从 1 开始）作为替代主键
    fn map_table(&self, table: &RawTable, schema: &Schema) -> Vec<Aviso>;
}
