pub mod grading;
pub mod llm_service;
pub mod recognition;
pub mod result_sink;

pub use grading::{Grader, LlmGrader};
pub use llm_service::{ChatOptions, LlmService};
pub use recognition::{Recognizer, VisionRecognizer};
pub use result_sink::{load_json, OutputFormat, RecordCollector, ResultSink};
