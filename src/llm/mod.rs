pub mod openai_compat;
pub mod provider;
pub mod types;

#[cfg(test)]
mod tests;

pub use openai_compat::OpenAiCompatClient;
pub use provider::CompletionProvider;
pub use types::{ChatMessage, Completion, CompletionRequest};
