use std::path::{Path, PathBuf};

use tokio::fs;

use crate::error::ConfigError;

/// 列出目录中所有 PDF 文件，按文件名排序
pub async fn list_exam_documents(folder: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    if !folder.is_dir() {
        return Err(ConfigError::DirectoryNotFound {
            path: folder.to_path_buf(),
        });
    }

    let read_failed = |source| ConfigError::ReadFailed {
        path: folder.to_path_buf(),
        source,
    };

    let mut documents = Vec::new();
    let mut entries = fs::read_dir(folder).await.map_err(read_failed)?;

    while let Some(entry) = entries.next_entry().await.map_err(read_failed)? {
        let path = entry.path();
        let is_pdf = path
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        if is_pdf && path.is_file() {
            tracing::debug!(
                "发现试卷: {}",
                path.file_name().unwrap_or_default().to_string_lossy()
            );
            documents.push(path);
        }
    }

    documents.sort();
    Ok(documents)
}
