pub mod extraction_plan;
pub mod observer;
pub mod outcome;
pub mod question_ctx;
pub mod question_flow;

pub use extraction_plan::{plan, PagePlan};
pub use observer::{PipelineObserver, TracingObserver};
pub use outcome::{AnswerOutcome, GradeOutcome};
pub use question_ctx::{DocumentCtx, QuestionCtx};
pub use question_flow::{ProcessResult, QuestionFlow};
