use std::collections::HashMap;
use std::path::Path;

use tracing::info;

use super::read_structured;
use crate::error::ConfigError;
use crate::models::AnswerKey;

/// 从 JSON / TOML 文件加载标准答案
///
/// 键为 `"Page {p}, Question {i}"`，值为标准答案文本。
pub async fn load_answer_key(path: &Path) -> Result<AnswerKey, ConfigError> {
    let answers: HashMap<String, String> = read_structured(path).await?;
    info!("✓ 已加载 {} 条标准答案 ({})", answers.len(), path.display());
    Ok(AnswerKey::new(answers))
}
