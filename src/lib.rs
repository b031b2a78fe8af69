//! # Generate Paper
//!
//! A Rust application that turns syllabus PDFs into formal exam papers.
//!
//! ## Architecture
//!
//! The system keeps a strict four-layer architecture:
//!
//! ### ① Infrastructure
//! - `infrastructure/` - owns scarce resources, exposes capabilities
//! - `ScratchStore` - the only owner of the staging directory
//!
//! ### ② Services
//! - `services/` - single-paper capabilities, "what can I do"
//! - `prompt_builder` - prompt and response schema construction
//! - `response_parser` - model reply validation and decoding
//! - `PaperStore` - database persistence
//! - `export` - HTML rendering and Word export
//!
//! ### ③ Workflow
//! - `workflow/` - the full flow for one request
//! - `GenerationFlow` - validate → stage → upload → generate → parse
//!
//! ### ④ Orchestration
//! - `orchestrator/batch_processor` - batch processor, owns concurrency
//!
//! The HTTP clients in `clients/` sit below the services, and `models/`
//! is the shared vocabulary every layer speaks.

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// re-export the types most callers need
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::ScratchStore;
pub use models::{GeneratedPaper, GenerationOutcome, GenerationRequest};
pub use orchestrator::App;
pub use workflow::GenerationFlow;
