use std::path::Path;

use tracing::info;

use super::read_structured;
use crate::error::ConfigError;
use crate::models::layout::{ExamLayout, RawLayout};

/// 从 JSON / TOML 文件加载区域布局
///
/// JSON 示例：
/// ```json
/// {"pages": {"0": [{"type": "name", "box": [50, 40, 300, 80]},
///                  {"type": "answer", "box": [50, 200, 550, 400]}]}}
/// ```
pub async fn load_exam_layout(path: &Path) -> Result<ExamLayout, ConfigError> {
    let raw: RawLayout = read_structured(path).await?;
    let layout = ExamLayout::from_raw(raw)?;

    info!(
        "✓ 已加载区域布局: {} 页, {} 道题目 ({})",
        layout.pages().len(),
        layout.question_count(),
        path.display()
    );

    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BoxKind;
    use std::io::Write;

    fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_load_json_layout() {
        let file = write_temp(
            ".json",
            r#"{"pages": {"0": [
                {"type": "name", "box": [10, 10, 200, 40]},
                {"type": "id", "box": [210, 10, 400, 40]},
                {"type": "answer", "box": [10, 100, 500, 300]},
                {"box": [10, 320, 500, 500]}
            ]}}"#,
        );

        let layout = load_exam_layout(file.path()).await.unwrap();
        let page = &layout.pages()[0];
        assert_eq!(page.page_index, 0);
        let kinds: Vec<BoxKind> = page.boxes.iter().map(|b| b.kind).collect();
        assert_eq!(
            kinds,
            vec![BoxKind::Name, BoxKind::Id, BoxKind::Answer, BoxKind::Answer]
        );
        assert_eq!(layout.question_count(), 2);
    }

    #[tokio::test]
    async fn test_load_toml_layout() {
        let file = write_temp(
            ".toml",
            r#"
[[pages."1"]]
type = "answer"
box = [10.5, 100.0, 500.0, 300.0]

[[pages."0"]]
type = "name"
box = [10, 10, 200, 40]
"#,
        );

        let layout = load_exam_layout(file.path()).await.unwrap();
        assert_eq!(layout.pages().len(), 2);
        assert_eq!(layout.pages()[0].page_index, 0);
        assert_eq!(layout.pages()[1].boxes[0].coords.x0, 10.5);
    }

    #[tokio::test]
    async fn test_unknown_type_is_config_error() {
        let file = write_temp(
            ".json",
            r#"{"pages": {"0": [{"type": "essay", "box": [10, 10, 200, 40]}]}}"#,
        );
        let err = load_exam_layout(file.path()).await.unwrap_err();
        assert!(matches!(err, ConfigError::JsonParseFailed { .. }));
    }

    #[tokio::test]
    async fn test_missing_file_is_config_error() {
        let err = load_exam_layout(Path::new("/nonexistent/layout.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::ReadFailed { .. }));
    }
}
