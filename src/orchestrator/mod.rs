//! Orchestration layer
//!
//! ## Responsibilities
//!
//! Batch scheduling and lifecycle management, the command center of the
//! whole system.
//!
//! ## Layout
//!
//! ### `batch_processor` - batch paper processor
//! - Manages the application lifecycle (initialize, run, report)
//! - Loads paper requests (Vec<RequestSpec>)
//! - Bounds concurrency (Semaphore)
//! - Saves and exports finished papers
//! - Prints global statistics
//!
//! ## Layering
//!
//! ```text
//! batch_processor (Vec<RequestSpec>)
//!     ↓
//! workflow::GenerationFlow (one request)
//!     ↓
//! services (prompt / parse / store / export)
//!     ↓
//! infrastructure + clients (ScratchStore / GeminiClient / SupabaseClient)
//! ```
//!
//! ## Design principles
//!
//! 1. **Single responsibility**: the orchestrator schedules, the workflow generates
//! 2. **Downward dependencies**: orchestrator → workflow → services → infrastructure
//! 3. **No business logic**: only scheduling and statistics live here

pub mod batch_processor;

pub use batch_processor::App;
