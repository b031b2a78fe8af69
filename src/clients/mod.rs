pub mod gemini;
pub mod supabase;

pub use gemini::{DocumentModel, GeminiClient, RemoteFile};
pub use supabase::SupabaseClient;
