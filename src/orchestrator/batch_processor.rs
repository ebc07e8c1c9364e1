//! 批量试卷处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量试卷的处理和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：加载区域布局、标准答案、学生信息，准备渲染器与 LLM 服务
//! 2. **批量加载**：扫描试卷目录下的所有 PDF
//! 3. **并发控制**：使用 Semaphore 限制同时处理的试卷数
//! 4. **分批处理**：将试卷分批次处理，每批完成后再开始下一批
//! 5. **取消**：Ctrl-C 置位根取消标记，未完成的试卷在下一个阶段边界停止
//! 6. **统一输出**：所有试卷完成后一次性写出评分记录

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{AppError, SinkError};
use crate::infrastructure::PdfiumRenderer;
use crate::models::{
    list_exam_documents, load_answer_key, load_exam_layout, load_student_metadata, ExamDocument,
    GradingRecord, MetadataIndex,
};
use crate::orchestrator::document_processor::DocumentProcessor;
use crate::services::{
    Grader, LlmGrader, LlmService, RecordCollector, Recognizer, ResultSink, VisionRecognizer,
};
use crate::utils::logging::{
    log_batch_complete, log_batch_start, log_documents_loaded, log_startup, print_final_stats,
};
use crate::utils::CancelFlag;
use crate::workflow::{DocumentCtx, TracingObserver};

/// 应用主结构
pub struct App {
    config: Config,
    processor: Arc<DocumentProcessor<VisionRecognizer, LlmGrader>>,
    sink: ResultSink,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        config.validate().context("配置不合法")?;
        log_startup(&config);

        let layout = load_exam_layout(&config.layout_file)
            .await
            .context("加载区域布局失败")?;
        let answer_key = load_answer_key(&config.answer_key_file)
            .await
            .context("加载标准答案失败")?;
        let metadata = match &config.metadata_file {
            Some(path) => load_student_metadata(path)
                .await
                .context("加载学生信息失败")?,
            None => MetadataIndex::default(),
        };

        let renderer = PdfiumRenderer::new(config.max_raster_pixels).context("初始化 PDFium 失败")?;
        let llm = Arc::new(LlmService::new(&config));

        let processor = DocumentProcessor::new(
            Arc::new(renderer),
            Arc::new(VisionRecognizer::new(llm.clone(), &config)),
            Arc::new(LlmGrader::new(llm, &config)),
            Arc::new(layout),
            Arc::new(answer_key),
            config.render_dpi,
            config.max_concurrent_requests,
        )
        .with_metadata(Arc::new(metadata))
        .with_observer(Arc::new(TracingObserver::new(config.verbose_logging)));

        Ok(Self {
            sink: ResultSink::new(&config.output_file),
            processor: Arc::new(processor),
            config,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<()> {
        info!("\n📁 正在扫描待评分的试卷...");
        let paths = list_exam_documents(&self.config.exam_folder).await?;

        if paths.is_empty() {
            warn!("⚠️ 没有找到待评分的 PDF 文件，程序结束");
            return Ok(());
        }

        log_documents_loaded(paths.len(), self.config.max_concurrent_documents);

        // Ctrl-C 取消整个批次
        let root = CancelFlag::new();
        let watcher = {
            let root = root.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("⚠️ 收到中断信号，正在取消未完成的试卷...");
                    root.cancel();
                }
            })
        };

        let summary = process_documents(
            self.processor.clone(),
            paths,
            self.config.max_concurrent_documents,
            &root,
        )
        .await?;
        watcher.abort();

        match self.sink.save(&summary.records, self.config.output_format) {
            Ok(()) => {}
            Err(SinkError::EmptyOutput) => warn!("⚠️ 没有任何评分记录，未生成 CSV 文件"),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("写出评分结果失败: {}", self.sink.path().display())
                })
            }
        }

        print_final_stats(
            summary.success,
            summary.failed,
            summary.total,
            summary.records.len(),
            self.sink.path(),
            &self.config.output_log_file,
        );

        Ok(())
    }
}

/// 批量处理结果
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
    /// 按试卷顺序、再按 (页码, 序号) 排列
    pub records: Vec<GradingRecord>,
}

/// 分批并发处理试卷
///
/// 单份试卷失败（读取失败、被取消等）只计入失败数，不影响其他试卷。
pub async fn process_documents<R: Recognizer, G: Grader>(
    processor: Arc<DocumentProcessor<R, G>>,
    paths: Vec<PathBuf>,
    max_concurrent: usize,
    cancel: &CancelFlag,
) -> Result<BatchSummary> {
    let max_concurrent = max_concurrent.max(1);
    let semaphore = Arc::new(Semaphore::new(max_concurrent));
    let collector = Arc::new(RecordCollector::new());
    let total = paths.len();
    let total_batches = total.div_ceil(max_concurrent);
    let mut summary = BatchSummary {
        total,
        ..Default::default()
    };

    // 分批处理
    for (batch_idx, batch_paths) in paths.chunks(max_concurrent).enumerate() {
        let batch_start = batch_idx * max_concurrent;
        let batch_num = batch_idx + 1;
        log_batch_start(
            batch_num,
            total_batches,
            batch_start + 1,
            batch_start + batch_paths.len(),
            total,
        );

        let mut handles = Vec::with_capacity(batch_paths.len());
        for (idx, path) in batch_paths.iter().enumerate() {
            let document_index = batch_start + idx;
            let permit = semaphore.clone().acquire_owned().await?;
            let processor = processor.clone();
            let collector = collector.clone();
            let cancel = cancel.child();
            let task_path = path.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                let document = ExamDocument::open(&task_path).await?;
                let ctx = DocumentCtx::new(
                    document.id.clone(),
                    document_index,
                    document.file_name.clone(),
                );
                let report = processor.process(&document, &ctx, &cancel).await?;
                collector.append(document_index, report.records);
                Ok::<_, AppError>(())
            });
            handles.push((path.clone(), handle));
        }

        // 等待本批所有任务完成
        let mut batch_success = 0;
        for (path, handle) in handles {
            match handle.await {
                Ok(Ok(())) => batch_success += 1,
                Ok(Err(e)) => {
                    error!("[文档 {}] ❌ 处理失败: {}", path.display(), e);
                    summary.failed += 1;
                }
                Err(e) => {
                    error!("[文档 {}] ❌ 任务执行失败: {}", path.display(), e);
                    summary.failed += 1;
                }
            }
        }
        summary.success += batch_success;

        log_batch_complete(batch_num, batch_success, batch_paths.len());
    }

    summary.records = Arc::try_unwrap(collector)
        .map(RecordCollector::into_records)
        .map_err(|_| anyhow::anyhow!("仍有试卷任务持有结果收集器"))?;

    Ok(summary)
}
