//! 外部文件加载：布局、标准答案、学生信息、试卷列表

mod answer_key_loader;
mod document_loader;
mod layout_loader;
mod metadata_loader;

pub use answer_key_loader::load_answer_key;
pub use document_loader::list_exam_documents;
pub use layout_loader::load_exam_layout;
pub use metadata_loader::load_student_metadata;

use std::path::Path;

use serde::de::DeserializeOwned;
use tokio::fs;

use crate::error::ConfigError;

/// 结构化配置文件格式，按扩展名判断
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Json,
    Toml,
}

impl FileFormat {
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("json") => Ok(FileFormat::Json),
            Some("toml") => Ok(FileFormat::Toml),
            _ => Err(ConfigError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// 读取并反序列化 JSON / TOML 文件
async fn read_structured<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let format = FileFormat::from_path(path)?;
    let content = fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;

    match format {
        FileFormat::Json => {
            serde_json::from_str(&content).map_err(|source| ConfigError::JsonParseFailed {
                path: path.to_path_buf(),
                source,
            })
        }
        FileFormat::Toml => toml::from_str(&content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            FileFormat::from_path(Path::new("a/config_file.JSON")).unwrap(),
            FileFormat::Json
        );
        assert_eq!(
            FileFormat::from_path(Path::new("layout.toml")).unwrap(),
            FileFormat::Toml
        );
        assert!(matches!(
            FileFormat::from_path(Path::new("layout.yaml")),
            Err(ConfigError::UnsupportedFormat { .. })
        ));
    }
}
