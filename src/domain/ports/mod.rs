//! Port trait definitions (Hexagonal Architecture)
//!
//! Async interfaces that infrastructure adapters implement:
//! - CompletionService: the language-model completion API
//! - SearchService: web search

pub mod completion_service;
pub mod search_service;

pub use completion_service::CompletionService;
pub use search_service::SearchService;
