// ==========================================
// avisos 看板 - 数据清洗器实现
// ==========================================
// 职责: TRIM / NULL 标准化 / 数值、日期、布尔的宽松转换
// 红线: 非法值转为缺失，从不中断导入
// ==========================================

use crate::domain::format_number;
use crate::importer::importer_trait::DataCleaner as DataCleanerTrait;
use crate::importer::raw_table::RawCell;
use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};

/// Excel 日期序列号的合法上限（9999-12-31）
const MAX_EXCEL_SERIAL: f64 = 2_958_466.0;

/// Excel 序列号 → 日期时间（1900 日期系统）
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 || serial >= MAX_EXCEL_SERIAL {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(Duration::milliseconds(millis))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DataCleaner;

impl DataCleaner {
    const DATE_FORMATS: [&'static str; 5] = ["%Y-%m-%d", "%d.%m.%Y", "%d/%m/%Y", "%d-%m-%Y", "%Y%m%d"];
    const DATETIME_FORMATS: [&'static str; 3] =
        ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%d.%m.%Y %H:%M:%S"];

    fn parse_date_text(value: &str) -> Option<NaiveDate> {
        let value = value.trim();
        Self::DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
            .or_else(|| {
                Self::DATETIME_FORMATS
                    .iter()
                    .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                    .map(|dt| dt.date())
            })
    }

    /// 文本数值解析：接受小数逗号（"12,5"）
    fn parse_number_text(value: &str) -> Option<f64> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return None;
        }
        trimmed
            .parse::<f64>()
            .ok()
            .or_else(|| {
                if trimmed.contains(',') && !trimmed.contains('.') {
                    trimmed.replace(',', ".").parse::<f64>().ok()
                } else {
                    None
                }
            })
            .filter(|v| v.is_finite())
    }

    /// 估算成本：负数视为缺失
    pub fn coerce_cost(&self, cell: &RawCell) -> Option<f64> {
        self.coerce_f64(cell).filter(|v| *v >= 0.0)
    }
}

impl DataCleanerTrait for DataCleaner {
    fn clean_text(&self, cell: &RawCell) -> Option<String> {
        let text = match cell {
            RawCell::Empty => return None,
            RawCell::Text(s) => s.trim().to_string(),
            RawCell::Number(n) => format_number(*n),
            RawCell::Bool(b) => b.to_string(),
            RawCell::DateTime(dt) => {
                if dt.hour() == 0 && dt.minute() == 0 && dt.second() == 0 {
                    dt.date().format("%Y-%m-%d").to_string()
                } else {
                    dt.format("%Y-%m-%d %H:%M:%S").to_string()
                }
            }
        };
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    fn coerce_f64(&self, cell: &RawCell) -> Option<f64> {
        match cell {
            RawCell::Number(n) if n.is_finite() => Some(*n),
            RawCell::Text(s) => Self::parse_number_text(s),
            _ => None,
        }
    }

    fn coerce_date(&self, cell: &RawCell) -> Option<NaiveDate> {
        match cell {
            RawCell::DateTime(dt) => Some(dt.date()),
            RawCell::Number(n) => excel_serial_to_datetime(*n).map(|dt| dt.date()),
            RawCell::Text(s) => Self::parse_date_text(s),
            _ => None,
        }
    }

    fn coerce_bool(&self, cell: &RawCell) -> bool {
        match cell {
            RawCell::Bool(b) => *b,
            RawCell::Number(n) => *n != 0.0,
            RawCell::Text(s) => matches!(
                s.trim().to_lowercase().as_str(),
                "true" | "1" | "x" | "si" | "sí" | "s" | "y" | "yes" | "verdadero"
            ),
            _ => false,
        }
    }

    fn coerce_criticality(&self, cell: &RawCell, min: f64, max: f64) -> Option<f64> {
        self.coerce_f64(cell).filter(|v| *v >= min && *v <= max)
    }
}
