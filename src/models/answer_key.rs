use std::collections::HashMap;

use super::record::QuestionKey;

/// 标准答案表：`"Page p, Question i"` → 标准答案
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerKey {
    answers: HashMap<String, String>,
}

impl AnswerKey {
    pub fn new(answers: HashMap<String, String>) -> Self {
        Self { answers }
    }

    /// 查找标准答案，空白答案视为缺失
    pub fn lookup(&self, key: &QuestionKey) -> Option<&str> {
        self.answers
            .get(&key.external_id())
            .map(String::as_str)
            .filter(|answer| !answer.trim().is_empty())
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}

impl FromIterator<(String, String)> for AnswerKey {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_skips_blank_answers() {
        let key: AnswerKey = [
            ("Page 0, Question 1".to_string(), "H2O".to_string()),
            ("Page 0, Question 2".to_string(), "   ".to_string()),
        ]
        .into_iter()
        .collect();

        assert_eq!(key.lookup(&QuestionKey::new(0, 1)), Some("H2O"));
        assert_eq!(key.lookup(&QuestionKey::new(0, 2)), None);
        assert_eq!(key.lookup(&QuestionKey::new(1, 1)), None);
        assert_eq!(key.len(), 2);
    }
}
