pub mod form;
pub mod loaders;
pub mod paper;
pub mod request;

pub use form::{FileUpload, FormFields, FormValue};
pub use loaders::{load_all_request_files, load_manual_file, load_request_file, ManualSpec, RequestSpec};
pub use paper::{
    GeneratedPaper, GenerationOutcome, PaperContent, PaperRecord, Question, QuestionRow, Section,
};
pub use request::{GenerationRequest, MarkDistribution, MARK_FIELDS, MAX_FILE_SIZE, PDF_MIME_TYPE};
