//! Terminal rendering of job events and the final report.
//!
//! All styling goes through `console`, which drops colors when stdout is
//! not a terminal or `NO_COLOR` is set.

mod events;
mod report;

pub use events::EventRenderer;
pub use report::{colorize_decision, AnalysisOutput};
