pub mod scratch;

pub use scratch::{ScratchStore, StagedFile};
