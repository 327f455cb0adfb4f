//! Sentence-embedding providers used for both query-time retrieval and the
//! offline index build.

mod http;
mod provider;

pub use http::HttpEmbeddingProvider;
pub use provider::EmbeddingProvider;
