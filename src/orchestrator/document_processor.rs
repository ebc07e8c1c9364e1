//! 单份试卷处理器 - 编排层
//!
//! ## 职责
//!
//! 驱动一份试卷走完 渲染 → 识别 → 关联身份 → 评分 → 生成记录。
//!
//! ## 阶段
//!
//! 1. **Init**：生成提取计划
//! 2. **Extracting**：在阻塞线程池上逐页光栅化并裁剪区域，失败的区域记为空图片
//! 3. **Recognizing**：所有非空区域同时发出识别请求，单个失败记为空文本
//! 4. **Correlating**：按页码顺序取第一个非空姓名 / 学号，缺失时用学生信息表补全
//! 5. **Grading**：按 (页码, 序号) 顺序为每道题评分并生成记录
//!
//! 每个阶段开始前以及每次远程调用前检查取消标记；取消后本试卷已产生的记录全部丢弃。

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{debug, info};

use crate::error::{AppError, AppResult, RenderError};
use crate::infrastructure::RegionRenderer;
use crate::models::{
    AnswerKey, ExamDocument, ExamLayout, GradingRecord, IdentityField, MetadataIndex,
    PageExtraction, QuestionKey, RegionRole, RenderedRegion, StudentIdentity,
};
use crate::services::{Grader, Recognizer};
use crate::utils::CancelFlag;
use crate::workflow::{
    plan, AnswerOutcome, DocumentCtx, PagePlan, PipelineObserver, ProcessResult, QuestionFlow,
    TracingObserver,
};

/// 单份试卷的处理统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DocumentStats {
    pub regions: usize,
    pub render_failures: usize,
    pub recognition_failures: usize,
    pub questions: usize,
    pub skipped: usize,
}

/// 单份试卷的处理结果
#[derive(Debug)]
pub struct DocumentReport {
    pub identity: StudentIdentity,
    /// 按 (页码, 序号) 排列
    pub records: Vec<GradingRecord>,
    pub stats: DocumentStats,
}

/// 单份试卷处理器
///
/// 批次中所有试卷共用一个处理器；远程请求数由内部的信号量统一限制。
pub struct DocumentProcessor<R, G> {
    renderer: Arc<dyn RegionRenderer>,
    recognizer: Arc<R>,
    grader: Arc<G>,
    layout: Arc<ExamLayout>,
    answer_key: Arc<AnswerKey>,
    metadata: Arc<MetadataIndex>,
    observer: Arc<dyn PipelineObserver>,
    request_limit: Arc<Semaphore>,
    dpi: u32,
}

impl<R: Recognizer, G: Grader> DocumentProcessor<R, G> {
    pub fn new(
        renderer: Arc<dyn RegionRenderer>,
        recognizer: Arc<R>,
        grader: Arc<G>,
        layout: Arc<ExamLayout>,
        answer_key: Arc<AnswerKey>,
        dpi: u32,
        max_concurrent_requests: usize,
    ) -> Self {
        Self {
            renderer,
            recognizer,
            grader,
            layout,
            answer_key,
            metadata: Arc::new(MetadataIndex::default()),
            observer: Arc::new(TracingObserver::default()),
            request_limit: Arc::new(Semaphore::new(max_concurrent_requests.max(1))),
            dpi,
        }
    }

    /// 设置学生信息表（识别不到姓名 / 学号时使用）
    pub fn with_metadata(mut self, metadata: Arc<MetadataIndex>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// 处理一份试卷
    pub async fn process(
        &self,
        document: &ExamDocument,
        ctx: &DocumentCtx,
        cancel: &CancelFlag,
    ) -> AppResult<DocumentReport> {
        // ========== Init ==========
        cancel.check(&ctx.document_id)?;
        let plans = plan(&self.layout, &document.id, self.dpi)?;
        info!("{} 🔍 开始处理，共 {} 页", ctx, plans.len());

        let mut stats = DocumentStats::default();

        // ========== Extracting ==========
        let pages = self.extract(document, ctx, &plans, &mut stats).await;
        cancel.check(&ctx.document_id)?;

        // ========== Recognizing ==========
        let jobs: Vec<(u32, RegionRole, &RenderedRegion)> = pages
            .iter()
            .flat_map(|page| {
                page.regions()
                    .map(move |(role, region)| (page.page_index, role, region))
            })
            .collect();
        let outcomes = join_all(
            jobs.iter()
                .map(|&(page, role, region)| self.recognize(ctx, page, role, region, cancel)),
        )
        .await
        .into_iter()
        .collect::<AppResult<Vec<_>>>()?;
        stats.recognition_failures = outcomes
            .iter()
            .filter(|o| matches!(o, AnswerOutcome::RecognitionFailed(_)))
            .count();
        cancel.check(&ctx.document_id)?;

        // ========== Correlating ==========
        let mut identity = StudentIdentity::default();
        let mut answers: Vec<(QuestionKey, AnswerOutcome)> = Vec::new();
        for (&(page, role, _), outcome) in jobs.iter().zip(outcomes) {
            let field = match role {
                RegionRole::Name => IdentityField::Name,
                RegionRole::Id => IdentityField::Id,
                RegionRole::Answer(ordinal) => {
                    answers.push((QuestionKey::new(page, ordinal), outcome));
                    continue;
                }
            };
            self.observe_identity(ctx, &mut identity, field, &outcome);
        }
        if let Some(meta) = self.metadata.get(&ctx.file_name) {
            identity.fill_missing(Some(meta.student_name.as_str()), Some(meta.student_id.as_str()));
        }
        let (name, id) = identity.resolved();
        info!("{} 👤 学生: {} ({})", ctx, name, id);

        // ========== Grading ==========
        cancel.check(&ctx.document_id)?;
        let flow = QuestionFlow::new(
            self.grader.clone(),
            self.request_limit.clone(),
            self.observer.clone(),
        );
        let question_ctxs: Vec<_> = answers.iter().map(|(key, _)| ctx.question(*key)).collect();
        let results = join_all(question_ctxs.iter().zip(&answers).map(|(q_ctx, (_, answer))| {
            flow.run(q_ctx, &identity, answer, &self.answer_key, cancel)
        }))
        .await;

        stats.questions = answers.len();
        let mut records = Vec::with_capacity(answers.len());
        for result in results {
            match result? {
                ProcessResult::Recorded(record) => records.push(record),
                ProcessResult::Skipped => stats.skipped += 1,
            }
        }

        info!(
            "{} ✓ 处理完成: {} 条记录, 跳过 {} 题, 渲染失败 {} 个区域, 识别失败 {} 个区域",
            ctx,
            records.len(),
            stats.skipped,
            stats.render_failures,
            stats.recognition_failures
        );

        Ok(DocumentReport {
            identity,
            records,
            stats,
        })
    }

    /// 渲染全部页面，页与页之间并行
    async fn extract(
        &self,
        document: &ExamDocument,
        ctx: &DocumentCtx,
        plans: &[PagePlan],
        stats: &mut DocumentStats,
    ) -> Vec<PageExtraction> {
        let handles = plans.iter().map(|plan| {
            let renderer = self.renderer.clone();
            let document = document.clone();
            let boxes = plan.boxes();
            let page_index = plan.page_index;
            let dpi = self.dpi;
            tokio::task::spawn_blocking(move || {
                renderer.render_page(&document, page_index, &boxes, dpi)
            })
        });
        let rendered = join_all(handles).await;

        let mut pages = Vec::with_capacity(plans.len());
        for (plan, result) in plans.iter().zip(rendered) {
            let results = result.unwrap_or_else(|e| {
                vec![
                    Err(RenderError::RasterFailed {
                        page: plan.page_index,
                        reason: e.to_string(),
                    });
                    plan.requests.len()
                ]
            });

            let mut extraction = PageExtraction::new(plan.page_index);
            let mut results = results.into_iter();
            for request in &plan.requests {
                stats.regions += 1;
                let region = match results.next() {
                    Some(Ok(region)) => region,
                    Some(Err(e)) => {
                        stats.render_failures += 1;
                        self.observer.region_failed(ctx, plan.page_index, request.role, &e);
                        RenderedRegion::empty()
                    }
                    None => {
                        stats.render_failures += 1;
                        let e = RenderError::RasterFailed {
                            page: plan.page_index,
                            reason: "渲染器返回的区域数量不足".to_string(),
                        };
                        self.observer.region_failed(ctx, plan.page_index, request.role, &e);
                        RenderedRegion::empty()
                    }
                };
                extraction.insert(request.role, region);
            }

            debug!(
                "{} 第 {} 页渲染完成: {} 个区域",
                ctx,
                plan.page_index,
                plan.requests.len()
            );
            pages.push(extraction);
        }

        pages
    }

    /// 识别单个区域，空图片不发送
    async fn recognize(
        &self,
        ctx: &DocumentCtx,
        page: u32,
        role: RegionRole,
        region: &RenderedRegion,
        cancel: &CancelFlag,
    ) -> AppResult<AnswerOutcome> {
        if region.is_empty() {
            return Ok(AnswerOutcome::NotRendered);
        }

        cancel.check(&ctx.document_id)?;
        let _permit = self
            .request_limit
            .acquire()
            .await
            .map_err(|_| AppError::Cancelled {
                document_id: ctx.document_id.clone(),
            })?;
        // 排队等待许可期间可能已被取消
        cancel.check(&ctx.document_id)?;

        match self.recognizer.recognize(region).await {
            Ok(text) => {
                debug!("{} 第 {} 页{}识别完成", ctx, page, role);
                Ok(AnswerOutcome::Recognized(text))
            }
            Err(e) => {
                self.observer.recognition_failed(ctx, page, role, &e);
                Ok(AnswerOutcome::RecognitionFailed(e))
            }
        }
    }

    fn observe_identity(
        &self,
        ctx: &DocumentCtx,
        identity: &mut StudentIdentity,
        field: IdentityField,
        outcome: &AnswerOutcome,
    ) {
        if let Some(rejected) = identity.observe(field, outcome.text()) {
            let kept = match field {
                IdentityField::Name => identity.name(),
                IdentityField::Id => identity.id(),
            };
            self.observer
                .identity_conflict(ctx, field, kept.unwrap_or_default(), &rejected);
        }
    }
}
