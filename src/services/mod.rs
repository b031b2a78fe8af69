pub mod export;
pub mod paper_store;
pub mod prompt_builder;
pub mod response_parser;

pub use export::{export_to_word, render_paper_html, render_record_html, word_document};
pub use paper_store::{flatten_rows, PaperStore};
pub use prompt_builder::{build_prompt, response_schema};
pub use response_parser::parse_model_response;
