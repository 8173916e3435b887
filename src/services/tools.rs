//! Tool schemas offered to the completion service.

use serde_json::json;

use crate::domain::models::alternatives::{MAX_ALTERNATIVES, MIN_ALTERNATIVES};
use crate::domain::models::verdict::{BULLET_COUNT, MAX_CONFIDENCE, MIN_CONFIDENCE};
use crate::domain::models::{Decision, ToolSpec};

pub const SEARCH_TOOL: &str = "search";
pub const SUBMIT_ALTERNATIVES_TOOL: &str = "submit_alternatives";
pub const SUBMIT_VERDICT_TOOL: &str = "submit_verdict";

/// Web search tool. `purpose` completes "Search the web for ...".
pub fn search_tool(purpose: &str) -> ToolSpec {
    ToolSpec {
        name: SEARCH_TOOL.to_string(),
        description: format!("Search the web for {purpose}."),
        input_schema: json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                }
            },
            "required": ["query"]
        }),
    }
}

pub fn submit_alternatives_tool() -> ToolSpec {
    ToolSpec {
        name: SUBMIT_ALTERNATIVES_TOOL.to_string(),
        description: "Submit the final list of alternative products once you have enough \
                      information. Call this when done searching."
            .to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "alternatives": {
                    "type": "array",
                    "description": format!(
                        "{MIN_ALTERNATIVES}-{MAX_ALTERNATIVES} products consumers commonly consider instead of the original"
                    ),
                    "items": {
                        "type": "object",
                        "properties": {
                            "name": {"type": "string", "description": "Product name and model number"},
                            "price": {"type": "string", "description": "Current retail price, e.g. '$199'"},
                            "note": {"type": "string", "description": "One sentence: key reason to consider this over the original"}
                        },
                        "required": ["name", "price", "note"]
                    },
                    "minItems": MIN_ALTERNATIVES,
                    "maxItems": MAX_ALTERNATIVES
                }
            },
            "required": ["alternatives"]
        }),
    }
}

fn decision_criteria(decision: Decision) -> &'static str {
    match decision {
        Decision::Buy => "BUY: strong case, fair price, no major red flags.",
        Decision::Wait => {
            "WAIT: good product but current price is meaningfully above the recent low."
        }
        Decision::ConsiderAlternatives => {
            "CONSIDER ALTERNATIVES: a specific better-value product exists that avoids the \
             Skeptic's primary concern."
        }
        Decision::Skip => {
            "SKIP: fundamental problems (legal, structural, safety) that outweigh benefits \
             regardless of price."
        }
        Decision::YouDontNeedIt => {
            "YOU DON'T NEED IT: the user already owns a product that covers this use case, or \
             the purchase is redundant given their existing setup, regardless of the product's \
             quality or price."
        }
    }
}

/// Verdict submission tool. The ownership decision is only offered when the
/// user said what they already own.
pub fn submit_verdict_tool(ownership: bool) -> ToolSpec {
    let decisions = Decision::offered(ownership);
    let names: Vec<&str> = decisions.iter().map(|d| d.as_str()).collect();
    let criteria = decisions
        .iter()
        .map(|d| decision_criteria(*d))
        .collect::<Vec<_>>()
        .join(" ");

    ToolSpec {
        name: SUBMIT_VERDICT_TOOL.to_string(),
        description: "Submit the final verdict for this product analysis.".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "decision": {
                    "type": "string",
                    "enum": names,
                    "description": criteria
                },
                "confidence": {
                    "type": "integer",
                    "minimum": MIN_CONFIDENCE,
                    "maximum": MAX_CONFIDENCE,
                    "description": "Confidence in this verdict (1-100). Higher when the three agents strongly agree."
                },
                "reasoning": {
                    "type": "string",
                    "description": "2-3 sentences explaining the verdict. Reference specific findings from the agents: name the lawsuit, the price, the alternative."
                },
                "alternative": {
                    "type": "string",
                    "description": "CONSIDER ALTERNATIVES only: exact product name and price, e.g. 'Bose QuietComfort (2024) · $199 from Bose.com'. Omit for all other verdicts."
                },
                "bullets": {
                    "type": "array",
                    "description": "Exactly 3 short bullet points (max 12 words each) summarising the key findings that drove this verdict. Draw from specific facts named by the agents: prices, ratings, failure modes, alternatives.",
                    "items": {"type": "string"},
                    "minItems": BULLET_COUNT,
                    "maxItems": BULLET_COUNT
                }
            },
            "required": ["decision", "confidence", "reasoning", "bullets"]
        }),
    }
}
