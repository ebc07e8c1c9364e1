//! 学生身份、题目标识与评分记录

use std::fmt;

use serde::{Deserialize, Serialize};

/// 题目标识：(页码, 页内答案序号)
///
/// 序号从 1 开始，对外显示为 `Page {p}, Question {i}`，与标准答案文件中的键一致。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QuestionKey {
    pub page_index: u32,
    pub ordinal: usize,
}

impl QuestionKey {
    pub fn new(page_index: u32, ordinal: usize) -> Self {
        Self {
            page_index,
            ordinal,
        }
    }

    /// 标准答案文件中使用的字符串键
    pub fn external_id(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for QuestionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Page {}, Question {}", self.page_index, self.ordinal)
    }
}

/// 身份字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityField {
    Name,
    Id,
}

impl fmt::Display for IdentityField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityField::Name => write!(f, "姓名"),
            IdentityField::Id => write!(f, "学号"),
        }
    }
}

/// 一份试卷的学生身份
///
/// 第一个非空值生效，后续不同的值不会覆盖，只返回冲突供调用方记录。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentIdentity {
    name: Option<String>,
    id: Option<String>,
}

impl StudentIdentity {
    /// 记录一次识别结果，返回被拒绝的冲突值（如果有）
    pub fn observe(&mut self, field: IdentityField, candidate: &str) -> Option<String> {
        let candidate = candidate.trim();
        if candidate.is_empty() {
            return None;
        }

        let slot = match field {
            IdentityField::Name => &mut self.name,
            IdentityField::Id => &mut self.id,
        };

        if let Some(existing) = slot.as_deref() {
            return (existing != candidate).then(|| candidate.to_string());
        }
        *slot = Some(candidate.to_string());
        None
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// 用备用来源补全缺失的字段
    pub fn fill_missing(&mut self, name: Option<&str>, id: Option<&str>) {
        if self.name.is_none() {
            self.name = name.filter(|v| !v.trim().is_empty()).map(str::to_string);
        }
        if self.id.is_none() {
            self.id = id.filter(|v| !v.trim().is_empty()).map(str::to_string);
        }
    }

    /// 输出用的 (姓名, 学号)，缺失时为 `Unknown`
    pub fn resolved(&self) -> (String, String) {
        (
            self.name.clone().unwrap_or_else(|| UNKNOWN.to_string()),
            self.id.clone().unwrap_or_else(|| UNKNOWN.to_string()),
        )
    }
}

const UNKNOWN: &str = "Unknown";

/// 评分记录，输出的最小单位
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradingRecord {
    #[serde(rename = "Student Name")]
    pub student_name: String,
    #[serde(rename = "Student ID")]
    pub student_id: String,
    #[serde(rename = "Question ID")]
    pub question_id: String,
    #[serde(rename = "Student Answer")]
    pub student_answer: String,
    #[serde(rename = "Correct Answer")]
    pub correct_answer: String,
    #[serde(rename = "Grading Result")]
    pub grading_result: String,
}

impl GradingRecord {
    pub fn new(
        identity: &StudentIdentity,
        key: QuestionKey,
        student_answer: impl Into<String>,
        correct_answer: impl Into<String>,
        grading_result: impl Into<String>,
    ) -> Self {
        let (student_name, student_id) = identity.resolved();
        Self {
            student_name,
            student_id,
            question_id: key.external_id(),
            student_answer: student_answer.into(),
            correct_answer: correct_answer.into(),
            grading_result: grading_result.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_key_external_id() {
        assert_eq!(QuestionKey::new(0, 1).external_id(), "Page 0, Question 1");
        assert!(QuestionKey::new(0, 2) < QuestionKey::new(1, 1));
    }

    #[test]
    fn test_identity_first_value_wins() {
        let mut identity = StudentIdentity::default();
        assert_eq!(identity.observe(IdentityField::Name, "  "), None);
        assert_eq!(identity.observe(IdentityField::Name, " Alice "), None);
        assert_eq!(identity.observe(IdentityField::Name, "Alice"), None);
        assert_eq!(
            identity.observe(IdentityField::Name, "Alicia"),
            Some("Alicia".to_string())
        );
        assert_eq!(identity.name(), Some("Alice"));
        assert_eq!(identity.id(), None);
    }

    #[test]
    fn test_identity_fallback_and_unknown() {
        let mut identity = StudentIdentity::default();
        identity.observe(IdentityField::Id, "A123");
        identity.fill_missing(Some("Bob"), Some("B999"));
        assert_eq!(identity.resolved(), ("Bob".to_string(), "A123".to_string()));

        let empty = StudentIdentity::default();
        assert_eq!(
            empty.resolved(),
            ("Unknown".to_string(), "Unknown".to_string())
        );
    }

    #[test]
    fn test_record_serializes_with_report_headers() {
        let mut identity = StudentIdentity::default();
        identity.observe(IdentityField::Name, "Alice");
        let record = GradingRecord::new(&identity, QuestionKey::new(0, 1), "water", "H2O", "80");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["Student Name"], "Alice");
        assert_eq!(json["Student ID"], "Unknown");
        assert_eq!(json["Question ID"], "Page 0, Question 1");
        assert_eq!(json["Grading Result"], "80");
    }
}
