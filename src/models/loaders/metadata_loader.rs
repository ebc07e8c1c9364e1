use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::ConfigError;
use crate::models::{MetadataIndex, StudentMetadata};

#[derive(Debug, Deserialize)]
struct MetadataRow {
    filename: String,
    student_name: String,
    student_id: String,
}

/// 从 CSV 加载学生信息，表头为 `filename,student_name,student_id`
pub async fn load_student_metadata(path: &Path) -> Result<MetadataIndex, ConfigError> {
    let content = tokio::fs::read(path)
        .await
        .map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;

    let mut reader = csv::Reader::from_reader(content.as_slice());
    let mut entries = HashMap::new();
    for row in reader.deserialize::<MetadataRow>() {
        let row = row.map_err(|source| ConfigError::CsvParseFailed {
            path: path.to_path_buf(),
            source,
        })?;
        entries.insert(
            row.filename,
            StudentMetadata {
                student_name: row.student_name,
                student_id: row.student_id,
            },
        );
    }

    info!("✓ 已加载 {} 条学生信息 ({})", entries.len(), path.display());
    Ok(MetadataIndex::new(entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_load_metadata_csv() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(b"filename,student_name,student_id\nexam1.pdf,Alice,A123\nexam2.pdf,\"Doe, John\",J7\n")
            .unwrap();

        let index = load_student_metadata(file.path()).await.unwrap();
        assert_eq!(index.len(), 2);
        let john = index.get("exam2.pdf").unwrap();
        assert_eq!(john.student_name, "Doe, John");
        assert_eq!(john.student_id, "J7");
        assert!(index.get("exam3.pdf").is_none());
    }

    #[tokio::test]
    async fn test_missing_column_is_rejected() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(b"filename,student_name\nexam1.pdf,Alice\n").unwrap();

        assert!(matches!(
            load_student_metadata(file.path()).await,
            Err(ConfigError::CsvParseFailed { .. })
        ));
    }
}
