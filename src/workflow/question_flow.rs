//! 题目处理流程 - 流程层
//!
//! 核心职责：定义"一道题"的评分流程
//!
//! 流程顺序：
//! 1. 查标准答案，没有则跳过
//! 2. 学生答案为空则不评分，直接生成记录
//! 3. 调用评分服务，失败时评分结果为空，记录仍然生成

use std::sync::Arc;

use tokio::sync::Semaphore;

use super::observer::PipelineObserver;
use super::outcome::{AnswerOutcome, GradeOutcome};
use super::question_ctx::QuestionCtx;
use crate::error::{AppError, AppResult};
use crate::models::{AnswerKey, GradingRecord, StudentIdentity};
use crate::services::Grader;
use crate::utils::CancelFlag;

/// 题目处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessResult {
    /// 生成了评分记录
    Recorded(GradingRecord),
    /// 跳过（没有标准答案）
    Skipped,
}

/// 题目处理流程
///
/// - 只处理单道题
/// - 不持有任何稀缺资源，评分请求数由共享信号量限制
pub struct QuestionFlow<G> {
    grader: Arc<G>,
    request_limit: Arc<Semaphore>,
    observer: Arc<dyn PipelineObserver>,
}

impl<G> Clone for QuestionFlow<G> {
    fn clone(&self) -> Self {
        Self {
            grader: self.grader.clone(),
            request_limit: self.request_limit.clone(),
            observer: self.observer.clone(),
        }
    }
}

impl<G: Grader> QuestionFlow<G> {
    pub fn new(
        grader: Arc<G>,
        request_limit: Arc<Semaphore>,
        observer: Arc<dyn PipelineObserver>,
    ) -> Self {
        Self {
            grader,
            request_limit,
            observer,
        }
    }

    pub async fn run(
        &self,
        ctx: &QuestionCtx,
        identity: &StudentIdentity,
        answer: &AnswerOutcome,
        answer_key: &AnswerKey,
        cancel: &CancelFlag,
    ) -> AppResult<ProcessResult> {
        let Some(correct_answer) = answer_key.lookup(&ctx.key) else {
            self.observer.question_skipped(ctx);
            return Ok(ProcessResult::Skipped);
        };

        let grade = if answer.is_blank() {
            self.observer.blank_answer(ctx, answer);
            GradeOutcome::NotAttempted
        } else {
            cancel.check(&ctx.document_id)?;
            self.grade(ctx, answer.text(), correct_answer, cancel).await?
        };

        if let GradeOutcome::Failed(e) = &grade {
            self.observer.grading_failed(ctx, e);
        }

        let record = GradingRecord::new(
            identity,
            ctx.key,
            answer.text(),
            correct_answer,
            grade.text(),
        );
        self.observer.record_emitted(ctx, &record);

        Ok(ProcessResult::Recorded(record))
    }

    async fn grade(
        &self,
        ctx: &QuestionCtx,
        student_answer: &str,
        correct_answer: &str,
        cancel: &CancelFlag,
    ) -> AppResult<GradeOutcome> {
        // 信号量关闭意味着整个批次在退出
        let _permit = self
            .request_limit
            .acquire()
            .await
            .map_err(|_| AppError::Cancelled {
                document_id: ctx.document_id.clone(),
            })?;
        // 排队等待许可期间可能已被取消
        cancel.check(&ctx.document_id)?;

        Ok(match self.grader.grade(student_answer, correct_answer).await {
            Ok(feedback) => GradeOutcome::Graded(feedback),
            Err(e) => GradeOutcome::Failed(e),
        })
    }
}
