//! 流程事件观察者
//!
//! 编排层不直接决定日志写到哪里，所有失败、跳过与产出都通过观察者上报。
//! 默认实现写入 `tracing`，测试中可以替换成收集事件的实现。

use tracing::{debug, info, warn};

use super::outcome::AnswerOutcome;
use super::question_ctx::{DocumentCtx, QuestionCtx};
use crate::error::{GradingError, RecognitionError, RenderError};
use crate::models::{GradingRecord, IdentityField, RegionRole};
use crate::utils::logging::truncate_text;

/// 流程事件观察者
///
/// 所有方法都有空的默认实现，只需覆盖关心的事件。
pub trait PipelineObserver: Send + Sync {
    /// 区域渲染失败，该区域按空图片继续
    fn region_failed(&self, _ctx: &DocumentCtx, _page: u32, _role: RegionRole, _error: &RenderError) {}

    /// 区域识别失败，该区域按空文本继续
    fn recognition_failed(
        &self,
        _ctx: &DocumentCtx,
        _page: u32,
        _role: RegionRole,
        _error: &RecognitionError,
    ) {
    }

    /// 后续页面识别出的身份与已确定的不一致
    fn identity_conflict(&self, _ctx: &DocumentCtx, _field: IdentityField, _kept: &str, _rejected: &str) {}

    /// 没有标准答案，跳过该题
    fn question_skipped(&self, _ctx: &QuestionCtx) {}

    /// 学生答案为空，不调用评分
    fn blank_answer(&self, _ctx: &QuestionCtx, _outcome: &AnswerOutcome) {}

    /// 评分失败，记录仍然输出
    fn grading_failed(&self, _ctx: &QuestionCtx, _error: &GradingError) {}

    fn record_emitted(&self, _ctx: &QuestionCtx, _record: &GradingRecord) {}
}

/// 写入 tracing 日志的观察者
#[derive(Debug, Clone, Default)]
pub struct TracingObserver {
    verbose_logging: bool,
}

impl TracingObserver {
    pub fn new(verbose_logging: bool) -> Self {
        Self { verbose_logging }
    }
}

impl PipelineObserver for TracingObserver {
    fn region_failed(&self, ctx: &DocumentCtx, page: u32, role: RegionRole, error: &RenderError) {
        warn!("{} ⚠️ 第 {} 页{}渲染失败: {}", ctx, page, role, error);
    }

    fn recognition_failed(
        &self,
        ctx: &DocumentCtx,
        page: u32,
        role: RegionRole,
        error: &RecognitionError,
    ) {
        warn!("{} ⚠️ 第 {} 页{}识别失败: {}", ctx, page, role, error);
    }

    fn identity_conflict(&self, ctx: &DocumentCtx, field: IdentityField, kept: &str, rejected: &str) {
        warn!(
            "{} ⚠️ {}不一致: 保留 '{}'，忽略 '{}'",
            ctx, field, kept, rejected
        );
    }

    fn question_skipped(&self, ctx: &QuestionCtx) {
        warn!("{} ⚠️ 标准答案中没有 '{}'，跳过", ctx, ctx.key);
    }

    fn blank_answer(&self, ctx: &QuestionCtx, outcome: &AnswerOutcome) {
        match outcome {
            AnswerOutcome::Recognized(_) => info!("{} 学生答案为空，不评分", ctx),
            AnswerOutcome::NotRendered => info!("{} 答案区域未渲染，不评分", ctx),
            AnswerOutcome::RecognitionFailed(e) => info!("{} 答案识别失败，不评分 ({})", ctx, e),
        }
    }

    fn grading_failed(&self, ctx: &QuestionCtx, error: &GradingError) {
        warn!("{} ⚠️ 评分失败: {}", ctx, error);
    }

    fn record_emitted(&self, ctx: &QuestionCtx, record: &GradingRecord) {
        if self.verbose_logging {
            info!(
                "{} ✓ 学生答案: {} | 评分: {}",
                ctx,
                truncate_text(&record.student_answer, 40),
                truncate_text(&record.grading_result, 80)
            );
        } else {
            debug!("{} ✓ 已生成评分记录", ctx);
        }
    }
}
