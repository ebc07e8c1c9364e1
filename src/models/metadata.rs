use std::collections::HashMap;

use serde::Deserialize;

/// 学生信息（来自外部 CSV，按文件名索引）
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StudentMetadata {
    pub student_name: String,
    pub student_id: String,
}

/// 文件名 → 学生信息
#[derive(Debug, Clone, Default)]
pub struct MetadataIndex {
    entries: HashMap<String, StudentMetadata>,
}

impl MetadataIndex {
    pub fn new(entries: HashMap<String, StudentMetadata>) -> Self {
        Self { entries }
    }

    pub fn get(&self, file_name: &str) -> Option<&StudentMetadata> {
        self.entries.get(file_name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
