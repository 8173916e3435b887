//! Domain layer for the purchase analysis engine.
//!
//! This module contains the core models, errors, and the port traits that
//! external collaborators (completion service, web search) implement.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
