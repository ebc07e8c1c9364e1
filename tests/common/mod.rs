//! 集成测试用的假渲染器、假识别服务、假评分服务与事件收集器
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use exam_grader::error::{GradingError, LlmError, RecognitionError, RenderError};
use exam_grader::models::{
    AnswerKey, BoxCoords, BoxKind, BoxSpec, ExamDocument, ExamLayout, GradingRecord,
    IdentityField, PageConfig, RegionRole, RenderedRegion,
};
use exam_grader::services::{Grader, Recognizer};
use exam_grader::utils::CancelFlag;
use exam_grader::workflow::{AnswerOutcome, DocumentCtx, PipelineObserver, QuestionCtx};
use exam_grader::{DocumentProcessor, RegionRenderer};

/// 区域标签：`p{页码}-x{左边界}`，假渲染器把它当作"图片"内容
pub fn label(page: u32, x0: f64) -> String {
    format!("p{}-x{}", page, x0 as u32)
}

pub fn spec(kind: BoxKind, x0: f64) -> BoxSpec {
    BoxSpec {
        kind,
        coords: BoxCoords::new(x0, 10.0, x0 + 50.0, 40.0).unwrap(),
    }
}

pub fn layout(pages: Vec<(u32, Vec<BoxSpec>)>) -> ExamLayout {
    ExamLayout::new(
        pages
            .into_iter()
            .map(|(page_index, boxes)| PageConfig { page_index, boxes })
            .collect(),
    )
    .unwrap()
}

pub fn answer_key(entries: &[(&str, &str)]) -> AnswerKey {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn document(name: &str) -> ExamDocument {
    ExamDocument::from_bytes(format!("scans/{name}.pdf"), b"%PDF-fake".to_vec())
}

/// 假渲染器：区域内容为其标签，可指定失败的区域与页数
#[derive(Default)]
pub struct FakeRenderer {
    pub failing: HashSet<String>,
    pub page_count: Option<u32>,
    pub calls: AtomicUsize,
}

impl FakeRenderer {
    pub fn failing(labels: &[&str]) -> Self {
        Self {
            failing: labels.iter().map(|l| l.to_string()).collect(),
            ..Self::default()
        }
    }
}

impl RegionRenderer for FakeRenderer {
    fn render_page(
        &self,
        _document: &ExamDocument,
        page_index: u32,
        boxes: &[BoxCoords],
        _dpi: u32,
    ) -> Vec<Result<RenderedRegion, RenderError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(page_count) = self.page_count {
            if page_index >= page_count {
                return vec![
                    Err(RenderError::PageOutOfRange {
                        page: page_index,
                        page_count: page_count as usize,
                    });
                    boxes.len()
                ];
            }
        }

        boxes
            .iter()
            .map(|coords| {
                let label = label(page_index, coords.x0);
                if self.failing.contains(&label) {
                    Err(RenderError::EmptyRegion { page: page_index })
                } else {
                    Ok(RenderedRegion::from_png(label.into_bytes()))
                }
            })
            .collect()
    }
}

/// 假识别服务：按标签查表，查不到视为服务失败
#[derive(Default)]
pub struct FakeRecognizer {
    pub texts: HashMap<String, String>,
    pub calls: AtomicUsize,
    /// 识别前等待的时间
    pub delay: Option<Duration>,
    /// 识别完成时置位的取消标记
    pub cancel_on_call: Option<CancelFlag>,
}

impl FakeRecognizer {
    pub fn new(texts: &[(String, &str)]) -> Self {
        Self {
            texts: texts
                .iter()
                .map(|(k, v)| (k.clone(), v.to_string()))
                .collect(),
            ..Self::default()
        }
    }
}

impl Recognizer for FakeRecognizer {
    async fn recognize(&self, region: &RenderedRegion) -> Result<String, RecognitionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(cancel) = &self.cancel_on_call {
            cancel.cancel();
        }
        let label = String::from_utf8_lossy(region.as_bytes()).to_string();
        self.texts
            .get(&label)
            .cloned()
            .ok_or(RecognitionError::Service(LlmError::Timeout {
                model: "fake-vision".to_string(),
                secs: 1,
            }))
    }
}

/// 假评分服务：学生答案为 `boom` 时失败
#[derive(Default)]
pub struct FakeGrader {
    pub graded: Mutex<Vec<(String, String)>>,
}

impl FakeGrader {
    pub fn calls(&self) -> Vec<(String, String)> {
        self.graded.lock().unwrap().clone()
    }
}

impl Grader for FakeGrader {
    async fn grade(&self, student: &str, correct: &str) -> Result<String, GradingError> {
        self.graded
            .lock()
            .unwrap()
            .push((student.to_string(), correct.to_string()));
        if student == "boom" {
            return Err(GradingError::Service(LlmError::EmptyContent {
                model: "fake-grader".to_string(),
            }));
        }
        let score = if student.eq_ignore_ascii_case(correct) { 100 } else { 40 };
        Ok(format!("Score: {score}. Compared '{student}' with '{correct}'."))
    }
}

/// 收集流程事件
#[derive(Default)]
pub struct RecordingObserver {
    pub events: Mutex<Vec<String>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl PipelineObserver for RecordingObserver {
    fn region_failed(&self, _ctx: &DocumentCtx, page: u32, role: RegionRole, _e: &RenderError) {
        self.push(format!("region_failed {page} {role:?}"));
    }

    fn recognition_failed(
        &self,
        _ctx: &DocumentCtx,
        page: u32,
        role: RegionRole,
        _e: &RecognitionError,
    ) {
        self.push(format!("recognition_failed {page} {role:?}"));
    }

    fn identity_conflict(&self, _ctx: &DocumentCtx, field: IdentityField, kept: &str, rejected: &str) {
        self.push(format!("identity_conflict {field:?} {kept} {rejected}"));
    }

    fn question_skipped(&self, ctx: &QuestionCtx) {
        self.push(format!("question_skipped {}", ctx.key));
    }

    fn blank_answer(&self, ctx: &QuestionCtx, _outcome: &AnswerOutcome) {
        self.push(format!("blank_answer {}", ctx.key));
    }

    fn grading_failed(&self, ctx: &QuestionCtx, _e: &GradingError) {
        self.push(format!("grading_failed {}", ctx.key));
    }

    fn record_emitted(&self, _ctx: &QuestionCtx, record: &GradingRecord) {
        self.push(format!("record_emitted {}", record.question_id));
    }
}

/// 组装一个使用假服务的处理器
pub struct Harness {
    pub renderer: Arc<FakeRenderer>,
    pub recognizer: Arc<FakeRecognizer>,
    pub grader: Arc<FakeGrader>,
    pub observer: Arc<RecordingObserver>,
    pub processor: DocumentProcessor<FakeRecognizer, FakeGrader>,
}

impl Harness {
    pub fn new(
        renderer: FakeRenderer,
        recognizer: FakeRecognizer,
        layout: ExamLayout,
        key: AnswerKey,
    ) -> Self {
        Self::with_request_limit(renderer, recognizer, layout, key, 4)
    }

    pub fn with_request_limit(
        renderer: FakeRenderer,
        recognizer: FakeRecognizer,
        layout: ExamLayout,
        key: AnswerKey,
        max_concurrent_requests: usize,
    ) -> Self {
        let renderer = Arc::new(renderer);
        let recognizer = Arc::new(recognizer);
        let grader = Arc::new(FakeGrader::default());
        let observer = Arc::new(RecordingObserver::default());
        let processor = DocumentProcessor::new(
            renderer.clone(),
            recognizer.clone(),
            grader.clone(),
            Arc::new(layout),
            Arc::new(key),
            300,
            max_concurrent_requests,
        )
        .with_observer(observer.clone());

        Self {
            renderer,
            recognizer,
            grader,
            observer,
            processor,
        }
    }
}

pub fn ctx(document: &ExamDocument, index: usize) -> DocumentCtx {
    DocumentCtx::new(document.id.clone(), index, document.file_name.clone())
}
