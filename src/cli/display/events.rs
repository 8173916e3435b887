use console::style;

use crate::cli::output::truncate;
use crate::domain::models::{AgentRole, AnalysisEvent, StepEvent};

const THOUGHT_WIDTH: usize = 110;

/// Renders a live event stream, printing a header whenever the speaking
/// agent changes.
#[derive(Debug, Default)]
pub struct EventRenderer {
    current: Option<AgentRole>,
}

impl EventRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, event: &AnalysisEvent) {
        for line in self.lines(event) {
            println!("{line}");
        }
    }

    /// Lines printed for `event`, header included.
    pub fn lines(&mut self, event: &AnalysisEvent) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(agent) = event.agent() {
            if self.current != Some(agent) {
                self.current = Some(agent);
                lines.push(format!("\n{}", style(format!("== {} ==", agent.title())).bold()));
            }
        }

        match event {
            AnalysisEvent::Step {
                step: StepEvent::Think { text },
                ..
            } => {
                let thought = text.split_whitespace().collect::<Vec<_>>().join(" ");
                lines.push(format!("  {}", style(truncate(&thought, THOUGHT_WIDTH)).dim()));
            }
            AnalysisEvent::Step {
                step: StepEvent::Search { query },
                ..
            } => lines.push(format!("  {} {query}", style("search").cyan())),
            AnalysisEvent::WritingStart { .. } => {
                lines.push(format!("  {}", style("writing analysis...").yellow()));
            }
            AnalysisEvent::Analysis { text, .. } => lines.push(format!(
                "  {} ({} words)",
                style("analysis complete").green(),
                text.split_whitespace().count()
            )),
            AnalysisEvent::Alternatives { data } => {
                lines.push(format!("  {} alternatives found", data.len()));
                for alt in data {
                    lines.push(format!("   - {} ({})", alt.name, alt.price));
                }
            }
            AnalysisEvent::Verdict { data } => lines.push(format!(
                "  {} {} ({}%)",
                style("verdict").bold(),
                super::colorize_decision(data.decision),
                data.confidence
            )),
            AnalysisEvent::Error { message } => {
                lines.push(format!("{} {message}", style("error:").red().bold()));
            }
            AnalysisEvent::Done => {}
        }
        lines
    }
}
