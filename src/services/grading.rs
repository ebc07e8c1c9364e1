//! 评分服务 - 业务能力层
//!
//! 只负责"对比学生答案与标准答案并给出评语"能力，返回自由文本，不解析分数。

use std::future::Future;
use std::sync::Arc;

use super::llm_service::{ChatOptions, LlmService};
use crate::config::Config;
use crate::error::GradingError;

const GRADER_SYSTEM_PROMPT: &str = "You are a strict and experienced exam grader.";

/// 评分服务接口
pub trait Grader: Send + Sync + 'static {
    fn grade(
        &self,
        student_answer: &str,
        correct_answer: &str,
    ) -> impl Future<Output = Result<String, GradingError>> + Send;
}

/// 基于 Chat LLM 的评分
pub struct LlmGrader {
    llm: Arc<LlmService>,
    model: String,
    options: ChatOptions,
}

impl LlmGrader {
    pub fn new(llm: Arc<LlmService>, config: &Config) -> Self {
        Self {
            llm,
            model: config.grading_model.clone(),
            options: ChatOptions {
                temperature: Some(0.0),
                ..ChatOptions::default()
            },
        }
    }
}

impl Grader for LlmGrader {
    async fn grade(&self, student_answer: &str, correct_answer: &str) -> Result<String, GradingError> {
        let prompt = build_grading_prompt(student_answer, correct_answer);
        let feedback = self
            .llm
            .chat(
                &self.model,
                &prompt,
                Some(GRADER_SYSTEM_PROMPT),
                None,
                &self.options,
            )
            .await?;
        Ok(feedback)
    }
}

/// 构建评分提示词
fn build_grading_prompt(student_answer: &str, correct_answer: &str) -> String {
    format!(
        "You are an experienced exam grader. \
         Please grade the following answer by comparing it to the correct answer. \
         Provide a numerical score (0-100) and detailed feedback explaining your grading decision.\n\n\
         Student Answer:\n{}\n\n\
         Correct Answer:\n{}\n\n\
         Grade and feedback:",
        student_answer, correct_answer
    )
}
