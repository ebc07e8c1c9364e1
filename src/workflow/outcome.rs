//! 单个区域 / 单道题的处理结果
//!
//! 失败不再折叠成空字符串，而是保留失败原因，输出时才统一转成文本。

use crate::error::{GradingError, RecognitionError};

/// 一个区域的识别结果
#[derive(Debug)]
pub enum AnswerOutcome {
    /// 识别成功（可能是空文本，表示区域内没有字）
    Recognized(String),
    /// 区域渲染失败（图片为空），没有发送识别
    NotRendered,
    /// 识别服务失败
    RecognitionFailed(RecognitionError),
}

impl AnswerOutcome {
    /// 输出用文本，失败时为空字符串
    pub fn text(&self) -> &str {
        match self {
            AnswerOutcome::Recognized(text) => text.trim(),
            AnswerOutcome::NotRendered | AnswerOutcome::RecognitionFailed(_) => "",
        }
    }

    /// 是否有可评分的文本
    pub fn is_blank(&self) -> bool {
        self.text().is_empty()
    }
}

/// 一道题的评分结果
#[derive(Debug)]
pub enum GradeOutcome {
    Graded(String),
    /// 学生答案为空，没有调用评分
    NotAttempted,
    /// 评分服务失败
    Failed(GradingError),
}

impl GradeOutcome {
    /// 输出用文本，未评分或失败时为空字符串
    pub fn text(&self) -> &str {
        match self {
            GradeOutcome::Graded(text) => text,
            GradeOutcome::NotAttempted | GradeOutcome::Failed(_) => "",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failures_render_as_empty_text() {
        assert!(AnswerOutcome::NotRendered.is_blank());
        assert!(AnswerOutcome::RecognitionFailed(RecognitionError::EmptyImage).is_blank());
        assert!(AnswerOutcome::Recognized("  \n".to_string()).is_blank());
        assert_eq!(AnswerOutcome::Recognized(" water ".to_string()).text(), "water");

        assert_eq!(GradeOutcome::NotAttempted.text(), "");
        assert_eq!(GradeOutcome::Graded("80".to_string()).text(), "80");
    }
}
