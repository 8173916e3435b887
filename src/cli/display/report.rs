use std::fmt::Write as _;

use console::{style, StyledObject};
use serde::Serialize;

use crate::cli::output::CommandOutput;
use crate::domain::models::{AgentResult, Decision};
use crate::services::PipelineReport;

/// Decision label colored by how favourable it is.
pub fn colorize_decision(decision: Decision) -> StyledObject<&'static str> {
    let label = style(decision.as_str()).bold();
    match decision {
        Decision::Buy => label.green(),
        Decision::Wait => label.yellow(),
        Decision::ConsiderAlternatives => label.cyan(),
        Decision::Skip => label.red(),
        Decision::YouDontNeedIt => label.magenta(),
    }
}

/// Final output of `shouldibuy analyze`.
#[derive(Debug, Serialize)]
pub struct AnalysisOutput {
    pub product: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owns: Option<String>,
    pub report: PipelineReport,
}

impl CommandOutput for AnalysisOutput {
    fn to_human(&self) -> String {
        let verdict = &self.report.verdict;
        let mut out = String::new();

        let _ = writeln!(out, "\n{}", style(format!("Should I buy {}?", self.product)).bold());
        if let Some(owns) = &self.owns {
            let _ = writeln!(out, "{}", style(format!("(currently own: {owns})")).dim());
        }
        let _ = writeln!(
            out,
            "\n{}  {}% confidence",
            colorize_decision(verdict.decision),
            verdict.confidence
        );
        if let Some(alternative) = &verdict.alternative {
            let _ = writeln!(out, "Instead: {alternative}");
        }
        if verdict.is_fallback() {
            let _ = writeln!(out, "{}", style("No verdict was synthesised.").yellow());
        }
        for bullet in &verdict.bullets {
            let _ = writeln!(out, "  * {bullet}");
        }
        let _ = writeln!(out, "\n{}", verdict.reasoning);

        if !self.report.alternatives.alternatives.is_empty() {
            let _ = writeln!(out, "\n{}", style("Alternatives").bold().underlined());
            for alt in &self.report.alternatives.alternatives {
                let _ = writeln!(out, "  {} ({}): {}", alt.name, alt.price, alt.note);
            }
        }

        for (title, result) in [
            ("Advocate", &self.report.advocate),
            ("Skeptic", &self.report.skeptic),
            ("Economist", &self.report.economist),
        ] {
            write_analysis(&mut out, title, result);
        }
        out
    }
}

fn write_analysis(out: &mut String, title: &str, result: &AgentResult) {
    let _ = writeln!(
        out,
        "\n{} {}",
        style(title).bold().underlined(),
        style(format!("({} searches)", result.searches.len())).dim()
    );
    if result.analysis.is_empty() {
        let _ = writeln!(out, "{}", style("No analysis produced.").dim());
    } else {
        let _ = writeln!(out, "{}", result.analysis);
    }
}
