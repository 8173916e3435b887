//! HTTP surface over the analysis service.

pub mod analysis_http;

pub use analysis_http::{AnalysisHttpServer, AnalysisState, DONE_SENTINEL};
