pub mod answer_key;
pub mod document;
pub mod layout;
pub mod loaders;
pub mod metadata;
pub mod record;
pub mod region;

pub use answer_key::AnswerKey;
pub use document::ExamDocument;
pub use layout::{BoxCoords, BoxKind, BoxSpec, ExamLayout, PageConfig};
pub use loaders::{
    list_exam_documents, load_answer_key, load_exam_layout, load_student_metadata,
};
pub use metadata::{MetadataIndex, StudentMetadata};
pub use record::{GradingRecord, IdentityField, QuestionKey, StudentIdentity};
pub use region::{ExtractionRequest, PageExtraction, RegionRole, RenderedRegion};
