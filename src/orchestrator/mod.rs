pub mod batch_processor;
pub mod document_processor;

pub use batch_processor::{process_documents, App, BatchSummary};
pub use document_processor::{DocumentProcessor, DocumentReport, DocumentStats};
