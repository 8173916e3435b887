//! Structured logging on tracing-subscriber: JSON or pretty console output,
//! rotating JSON log files, and secret scrubbing for surfaced messages.

pub mod config;
pub mod logger;
pub mod secret_scrubbing;

pub use config::{LogConfig, LogFormat, RotationPolicy};
pub use logger::LoggerImpl;
pub use secret_scrubbing::SecretScrubber;
