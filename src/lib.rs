//! talkdoc: retrieval-augmented health question answering.
//!
//! A question is answered in two passes: a draft grounded in a local vector
//! index, then a refinement grounded in fresh web search snippets.

pub mod classifier;
pub mod core;
pub mod embedding;
pub mod llm;
pub mod pipeline;
pub mod rag;
pub mod search;
pub mod server;
pub mod shell;
pub mod state;

#[cfg(test)]
mod test_support;
