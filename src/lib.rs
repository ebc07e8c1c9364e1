//! # Exam Grader
//!
//! 一个用于批量评阅扫描试卷的 Rust 应用程序：
//! 按区域布局从 PDF 中裁剪姓名、学号与答案区域，交给 Vision LLM 识别手写内容，
//! 再由 LLM 对照标准答案评分，最终输出一份 CSV / JSON 成绩表。
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（PDFium），只暴露能力
//! - `RegionRenderer` - 把页面上的矩形区域渲染成 PNG
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个区域或单道题
//! - `Recognizer` - 手写识别能力
//! - `Grader` - 评分能力
//! - `ResultSink` - 写出成绩表能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一道题"的完整处理流程
//! - `extraction_plan` - 区域布局 → 按页分组的渲染请求
//! - `QuestionFlow` - 查标准答案 → 评分 → 生成记录
//! - `PipelineObserver` - 失败、跳过与产出事件的上报
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量试卷处理器，管理资源和并发
//! - `orchestrator/document_processor` - 单份试卷处理器，驱动各个阶段
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{PdfiumRenderer, RegionRenderer};
pub use models::{ExamDocument, ExamLayout, GradingRecord, QuestionKey, StudentIdentity};
pub use orchestrator::{process_documents, App, DocumentProcessor};
pub use services::{Grader, OutputFormat, Recognizer, ResultSink};
pub use utils::CancelFlag;
pub use workflow::{DocumentCtx, PipelineObserver, ProcessResult, QuestionFlow};
