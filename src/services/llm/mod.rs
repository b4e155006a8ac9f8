pub mod client;

pub use client::{CompletionMessage, LlmService};
