pub mod openai_compat;
pub mod traits;
pub(crate) mod util;

// Re-exports for convenience.
pub use openai_compat::OpenAiCompatClient;
pub use traits::{CompletionClient, CompletionRequest, CompletionResponse, Usage};
pub use util::resolve_api_key;
