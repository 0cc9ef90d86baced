// ==========================================
// avisos 看板 - 表格导出
// ==========================================
// XLSX: 整表导出（Gestionado 为布尔，Ticket 为文本，危急度单元格按渐变着色）
// CSV: 当前过滤视图导出
// 两者都经原子写入落盘
// ==========================================

use crate::domain::{Aviso, Field, FieldKind, Schema};
use crate::engine::CriticalityColorMapper;
use crate::repository::atomic_file::write_atomically;
use crate::repository::error::RepositoryResult;
use rust_xlsxwriter::{Color, Format, Workbook, Worksheet};
use std::path::Path;

pub const DEFAULT_SHEET_NAME: &str = "Avisos";

pub struct TableExporter {
    sheet_name: String,
    color_mapper: CriticalityColorMapper,
}

impl Default for TableExporter {
    fn default() -> Self {
        Self::new(DEFAULT_SHEET_NAME, CriticalityColorMapper::default())
    }
}

impl TableExporter {
    pub fn new(sheet_name: impl Into<String>, color_mapper: CriticalityColorMapper) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            color_mapper,
        }
    }

    fn write_cell(
        &self,
        sheet: &mut Worksheet,
        row: u32,
        col: u16,
        field: Field,
        aviso: &Aviso,
    ) -> RepositoryResult<()> {
        match field.kind() {
            FieldKind::Bool => {
                sheet.write_boolean(row, col, aviso.managed)?;
            }
            FieldKind::Number => {
                let Some(value) = aviso.numeric_value(field) else {
                    return Ok(());
                };
                match self.color_mapper.rgb(Some(value)).filter(|_| field == Field::Criticality) {
                    Some(rgb) => {
                        let format = Format::new().set_background_color(Color::RGB(rgb.to_u32()));
                        sheet.write_number_with_format(row, col, value, &format)?;
                    }
                    None => {
                        sheet.write_number(row, col, value)?;
                    }
                }
            }
            FieldKind::Text | FieldKind::Date => {
                if let Some(text) = aviso.text_value(field).filter(|t| !t.is_empty()) {
                    sheet.write_string(row, col, text)?;
                }
            }
        }
        Ok(())
    }

    /// 生成 XLSX 内容
    pub fn xlsx_bytes<'a, I>(&self, schema: &Schema, records: I) -> RepositoryResult<Vec<u8>>
    where
        I: IntoIterator<Item = &'a Aviso>,
    {
        let mut workbook = Workbook::new();
        let header_format = Format::new().set_bold();

        let sheet = workbook.add_worksheet();
        sheet.set_name(&self.sheet_name)?;

        for (col, header) in schema.headers().iter().enumerate() {
            sheet.write_string_with_format(0, col as u16, header, &header_format)?;
        }
        sheet.set_freeze_panes(1, 0)?;

        for (idx, aviso) in records.into_iter().enumerate() {
            let row = (idx + 1) as u32;
            for (col, field) in schema.fields().iter().enumerate() {
                self.write_cell(sheet, row, col as u16, *field, aviso)?;
            }
        }

        Ok(workbook.save_to_buffer()?)
    }

    /// 导出 XLSX（原子写入）
    pub fn export_xlsx<'a, I>(&self, schema: &Schema, records: I, path: &Path) -> RepositoryResult<()>
    where
        I: IntoIterator<Item = &'a Aviso>,
    {
        let bytes = self.xlsx_bytes(schema, records)?;
        write_atomically(path, &bytes)?;
        tracing::info!("已导出 Excel: {}", path.display());
        Ok(())
    }

    /// 生成 CSV 内容
    pub fn csv_bytes<'a, I>(&self, schema: &Schema, records: I) -> RepositoryResult<Vec<u8>>
    where
        I: IntoIterator<Item = &'a Aviso>,
    {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(schema.headers())?;
        for aviso in records {
            let row: Vec<String> = schema
                .fields()
                .iter()
                .map(|f| aviso.text_value(*f).unwrap_or_default())
                .collect();
            writer.write_record(&row)?;
        }
        writer
            .into_inner()
            .map_err(|e| crate::repository::error::RepositoryError::CsvWriteError(e.to_string()))
    }

    /// 导出 CSV（原子写入）
    pub fn export_csv<'a, I>(&self, schema: &Schema, records: I, path: &Path) -> RepositoryResult<()>
    where
        I: IntoIterator<Item = &'a Aviso>,
    {
        let bytes = self.csv_bytes(schema, records)?;
        write_atomically(path, &bytes)?;
        tracing::info!("已导出 CSV: {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FieldCatalog;

    fn schema() -> Schema {
        let headers: Vec<String> = ["Aviso", "Grupo planif.", "criticidad_final"]
            .iter()
            .map(|h| h.to_string())
            .collect();
        Schema::from_headers(FieldCatalog::default(), &headers)
    }

    fn records() -> Vec<Aviso> {
        let mut a = Aviso::new("1001");
        a.planning_group = Some("A".to_string());
        a.criticality = Some(75.0);
        a.managed = true;
        a.ticket = "INC-1".to_string();
        let b = Aviso::new("1002");
        vec![a, b]
    }

    #[test]
    fn test_csv_bytes() {
        let records = records();
        let bytes = TableExporter::default().csv_bytes(&schema(), &records).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Aviso,Grupo planif.,criticidad_final,Gestionado,Ticket");
        assert_eq!(lines[1], "1001,A,75,true,INC-1");
        assert_eq!(lines[2], "1002,,,false,");
    }

    #[test]
    fn test_xlsx_bytes_is_zip() {
        let records = records();
        let bytes = TableExporter::default().xlsx_bytes(&schema(), &records).unwrap();
        // xlsx 为 zip 容器
        assert_eq!(&bytes[..2], b"PK");
    }
}
