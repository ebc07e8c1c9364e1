use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{AppError, AppResult};

/// 一份扫描试卷
///
/// 文件内容只读一次，克隆时共享同一份字节。
#[derive(Debug, Clone)]
pub struct ExamDocument {
    /// 文档标识（文件名去掉扩展名）
    pub id: String,
    /// 文件名（用于匹配学生信息）
    pub file_name: String,
    pub path: PathBuf,
    bytes: Arc<Vec<u8>>,
}

impl ExamDocument {
    /// 读取 PDF 文件
    pub async fn open(path: &Path) -> AppResult<Self> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| AppError::DocumentLoad {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::from_bytes(path, bytes))
    }

    /// 使用已读入内存的内容创建
    pub fn from_bytes(path: impl AsRef<Path>, bytes: Vec<u8>) -> Self {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let id = path
            .file_stem()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        Self {
            id,
            file_name,
            path: path.to_path_buf(),
            bytes: Arc::new(bytes),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}
