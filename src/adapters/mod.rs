//! Adapters between the service ports and the outside world.

pub mod anthropic;
pub mod http;
pub mod mock;
pub mod tavily;
