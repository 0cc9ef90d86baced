// ==========================================
// avisos 看板 - 原子写文件
// ==========================================
// 同目录临时文件写入 + fsync + rename
// 红线: 后续读取不可能看到写了一半的文件
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

fn write_error(path: &Path, message: impl Into<String>) -> RepositoryError {
    RepositoryError::WriteError {
        path: path.display().to_string(),
        message: message.into(),
    }
}

/// 以原子方式整体替换文件内容
pub fn write_atomically(path: &Path, bytes: &[u8]) -> RepositoryResult<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&parent)
        .map_err(|e| write_error(path, format!("无法创建目录 {}: {}", parent.display(), e)))?;

    let mut tmp = NamedTempFile::new_in(&parent)
        .map_err(|e| write_error(path, format!("无法创建临时文件: {}", e)))?;
    tmp.write_all(bytes)
        .map_err(|e| write_error(path, format!("临时文件写入失败: {}", e)))?;
    tmp.flush()
        .map_err(|e| write_error(path, format!("临时文件刷新失败: {}", e)))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| write_error(path, format!("临时文件同步失败: {}", e)))?;
    tmp.persist(path)
        .map_err(|e| write_error(path, format!("替换目标文件失败: {}", e.error)))?;

    tracing::debug!("已写入 {} ({} 字节)", path.display(), bytes.len());
    Ok(())
}
