// ==========================================
// avisos 看板 - 仓储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use crate::importer::ImportError;
use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== 文件写入错误 =====
    #[error("文件写入失败 ({path}): {message}")]
    WriteError { path: String, message: String },

    #[error("Excel 生成失败: {0}")]
    XlsxWriteError(String),

    #[error("CSV 生成失败: {0}")]
    CsvWriteError(String),

    #[error("不支持的状态文件格式: {0}（仅支持 .xlsx / .csv）")]
    UnsupportedStateFormat(String),

    // ===== 文件读取错误 =====
    #[error(transparent)]
    Import(#[from] ImportError),

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),
}

// 实现 From<rust_xlsxwriter::XlsxError>
impl From<rust_xlsxwriter::XlsxError> for RepositoryError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        RepositoryError::XlsxWriteError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for RepositoryError {
    fn from(err: csv::Error) -> Self {
        RepositoryError::CsvWriteError(err.to_string())
    }
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;
