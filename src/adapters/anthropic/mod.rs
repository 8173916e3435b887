//! Completion service backed by the Anthropic Messages API.

pub mod client;
pub mod errors;
pub mod types;

pub use client::AnthropicClient;
pub use errors::AnthropicApiError;
