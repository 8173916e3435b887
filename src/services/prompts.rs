//! System prompts for every role.
//!
//! Prompts are assembled from paragraphs joined by blank lines. Each one
//! states today's date and the role's own search budget, and frames the
//! analysis around what the user already owns when that is known.

use chrono::{Local, NaiveDate};

use crate::domain::models::{AgentRole, PipelineContext};

const NO_PRIOR_ANALYSIS: &str = "No prior analysis available.";

const ONE_AT_A_TIME: &str = "Search one query at a time. After each result, reason about what \
                             you found and what to look for next before searching again. Never \
                             batch multiple searches at once.";

/// User message that opens every analyst conversation.
pub fn analysis_request(product: &str) -> String {
    format!("Analyze this product: {product}")
}

/// User message that opens the Alternatives conversation.
pub fn alternatives_request(product: &str) -> String {
    format!("Find the top alternatives to: {product}")
}

/// User message for the single Orchestrator call.
pub const VERDICT_REQUEST: &str = "Synthesize the three analyses and submit your verdict.";

/// What every prompt needs to know about the request.
#[derive(Debug, Clone)]
pub struct Brief<'a> {
    pub product: &'a str,
    pub owns: Option<&'a str>,
    date: String,
}

impl<'a> Brief<'a> {
    /// Brief dated today in local time.
    pub fn new(product: &'a str, owns: Option<&'a str>) -> Self {
        Self::dated(product, owns, Local::now().date_naive())
    }

    pub fn dated(product: &'a str, owns: Option<&'a str>, date: NaiveDate) -> Self {
        Self {
            product,
            owns,
            date: date.format("%B %d, %Y").to_string(),
        }
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    fn header(&self, role: AgentRole) -> String {
        format!(
            "You are the {} agent in a product analysis pipeline.\n\nToday's date is {}. \
             Prioritize recent sources over older ones.",
            role.title(),
            self.date
        )
    }
}

fn prior(context: &PipelineContext, role: AgentRole) -> &str {
    context
        .get(role)
        .filter(|text| !text.trim().is_empty())
        .unwrap_or(NO_PRIOR_ANALYSIS)
}

fn quoted(intro: &str, text: &str) -> String {
    format!("{intro}\n---\n{text}\n---")
}

fn join(paragraphs: Vec<String>) -> String {
    paragraphs
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn advocate_system(brief: &Brief<'_>, budget: u32) -> String {
    let owns = brief.owns.map_or_else(String::new, |owns| {
        format!(
            "The user currently owns: {owns}. Make the case for what this product adds on top \
             of what they already have."
        )
    });
    join(vec![
        brief.header(AgentRole::Advocate),
        owns,
        "Your job is to find and present the strongest factual case FOR buying this product. \
         Start with a broad search. After each search, identify the strongest specific claims \
         worth verifying with data. Follow leads. If a reviewer mentions a benchmark score, find \
         it. If a spec claim is made, verify it. Stop when you have enough sourced evidence to \
         make a compelling case, not before."
            .to_string(),
        format!("You have {budget} searches to gather information. Use them wisely. {ONE_AT_A_TIME}"),
        "Write no more than 3-4 concise paragraphs. No headers, no bullet points, no tables, no \
         markdown. Dense, evidence-rich prose only. Every sentence must cite a source or score."
            .to_string(),
    ])
}

pub fn skeptic_system(brief: &Brief<'_>, budget: u32, context: &PipelineContext) -> String {
    let owns = brief.owns.map_or_else(String::new, |owns| {
        format!(
            "The user currently owns: {owns}. Frame your analysis in the context of their \
             existing ownership. Scrutinize the Advocate's case for weaknesses that matter given \
             what the user already owns, and whether the upgrade is actually worth it versus \
             keeping the existing product."
        )
    });
    join(vec![
        brief.header(AgentRole::Skeptic),
        owns,
        quoted(
            "The Advocate has already built the case FOR buying this product:",
            prior(context, AgentRole::Advocate),
        ),
        "Your job is to find what they missed. Search specifically for:\n\
         - Reddit complaints, owner forums, failure reports\n\
         - Durability issues, long-term problems\n\
         - What owners regret after buying\n\
         - Claims the Advocate made that don't hold up under scrutiny"
            .to_string(),
        "Do not repeat anything the Advocate already covered. Only find the weaknesses."
            .to_string(),
        format!("Only {budget} searches maximum. {ONE_AT_A_TIME}"),
        "Write 2-3 paragraphs. No headers, no bullets, no markdown. Plain prose, every sentence \
         cited."
            .to_string(),
    ])
}

pub fn economist_system(brief: &Brief<'_>, budget: u32, context: &PipelineContext) -> String {
    let owns = brief.owns.map_or_else(String::new, |owns| {
        format!(
            "The user currently owns: {owns}. Frame your analysis around the value of buying \
             this product given what they already have. Factor in possible resale or trade-in \
             value of their existing product."
        )
    });
    join(vec![
        brief.header(AgentRole::Economist),
        owns,
        quoted(
            "The Advocate made the case FOR buying:",
            prior(context, AgentRole::Advocate),
        ),
        quoted(
            "The Skeptic identified these weaknesses:",
            prior(context, AgentRole::Skeptic),
        ),
        "Your job is to answer two questions with evidence:\n\
         1. Is the current price a good time to buy, or should the buyer wait for a better deal? \
         Find the current price, the 90-day low, and any predictable sale windows. If waiting \
         makes sense, name an exact price alert threshold.\n\
         2. What are the 1-2 best-value alternatives at different price points that specifically \
         address the Skeptic's primary concerns? Name exact products with exact current prices \
         and one concrete reason each avoids the identified weakness."
            .to_string(),
        format!(
            "Search for the current price versus its 90-day history, competing products with \
             current prices, and value comparisons. {ONE_AT_A_TIME} {budget} searches maximum."
        ),
        "Write 2-3 paragraphs. No headers, no bullets, no markdown. Plain prose, every price \
         cited. Do NOT give a final BUY/WAIT/SKIP verdict; the Orchestrator makes that call. End \
         with price and value findings only."
            .to_string(),
    ])
}

pub fn alternatives_system(brief: &Brief<'_>, budget: u32) -> String {
    join(vec![
        format!(
            "You are the Alternatives agent in a product analysis pipeline.\nToday's date is {}.",
            brief.date
        ),
        format!(
            "Your only job: identify 3-5 products that consumers most commonly compare to, or \
             buy instead of, the {}.",
            brief.product
        ),
        "Search for what people actually consider as alternatives. Focus on:\n\
         - Products in the same category and price range\n\
         - Commonly mentioned competitors in reviews and comparison articles\n\
         - A range of price points where relevant (budget, mid, premium)"
            .to_string(),
        format!(
            "You have {budget} searches maximum. Be efficient: one broad search often surfaces \
             most candidates. When done, call submit_alternatives with your findings. Do not \
             write prose analysis."
        ),
    ])
}

pub fn orchestrator_system(brief: &Brief<'_>, context: &PipelineContext) -> String {
    let owns = brief.owns.map_or_else(String::new, |owns| {
        format!(
            "The user currently owns: {owns}. Frame your verdict in the context of their \
             existing ownership. An owner of an older version may be inclined to upgrade; an \
             owner of a competitor may switch if this product fixes a key weakness of theirs. \
             The Advocate's case must still stand on its own merits, and the Skeptic's concerns \
             must not be dismissed because of what the user already owns."
        )
    });
    let mut criteria = String::from(
        "Decision criteria:\n\
         - BUY: the Advocate's case is compelling, the Skeptic found no major structural issues, \
         and the Economist confirms the price is fair\n\
         - WAIT: good product but current price is meaningfully above the Economist's documented \
         recent low\n\
         - CONSIDER ALTERNATIVES: a specific product named by the Economist exists at a lower \
         price and avoids the Skeptic's primary concern\n\
         - SKIP: the Skeptic identified fundamental problems (active litigation, structural \
         failure, safety) that override the Advocate's case",
    );
    if brief.owns.is_some() {
        criteria.push_str(
            "\n- YOU DON'T NEED IT: the user already owns something that covers this use case; \
             use this when the ownership makes the purchase redundant, not when the product \
             itself is bad",
        );
    }

    join(vec![
        format!(
            "You are the Orchestrator in a product analysis pipeline.\nToday's date is {}.",
            brief.date
        ),
        owns,
        format!(
            "Three specialized agents have analyzed the {}:",
            brief.product
        ),
        quoted(
            "ADVOCATE: the case FOR buying:",
            prior(context, AgentRole::Advocate),
        ),
        quoted(
            "SKEPTIC: weaknesses and problems found:",
            prior(context, AgentRole::Skeptic),
        ),
        quoted(
            "ECONOMIST: price timing and value alternatives:",
            prior(context, AgentRole::Economist),
        ),
        "Synthesize these three perspectives into one decisive verdict. Call submit_verdict \
         immediately."
            .to_string(),
        criteria,
        "Confidence reflects how clearly the three analyses converge. Be decisive. Do not hedge."
            .to_string(),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brief(owns: Option<&'static str>) -> Brief<'static> {
        Brief::dated(
            "Sony WH-1000XM5 Headphones",
            owns,
            NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
        )
    }

    #[test]
    fn test_prompts_carry_date_and_budget() {
        let prompt = advocate_system(&brief(None), 10);
        assert!(prompt.contains("Today's date is March 14, 2026."));
        assert!(prompt.contains("You have 10 searches"));
        assert!(!prompt.contains("currently owns"));
    }

    #[test]
    fn test_skeptic_quotes_advocate_verbatim() {
        let mut context = PipelineContext::new();
        context
            .record(AgentRole::Advocate, "Strong ANC, 30h battery.")
            .unwrap();
        let prompt = skeptic_system(&brief(None), 7, &context);
        assert!(prompt.contains("---\nStrong ANC, 30h battery.\n---"));
        assert!(prompt.contains("Only 7 searches maximum."));
    }

    #[test]
    fn test_missing_or_empty_context_uses_placeholder() {
        let mut context = PipelineContext::new();
        context.record(AgentRole::Advocate, "").unwrap();
        let prompt = economist_system(&brief(None), 7, &context);
        assert_eq!(prompt.matches(NO_PRIOR_ANALYSIS).count(), 2);
    }

    #[test]
    fn test_ownership_framing() {
        let owned = brief(Some("Sony WH-1000XM4"));
        assert!(skeptic_system(&owned, 7, &PipelineContext::new())
            .contains("The user currently owns: Sony WH-1000XM4."));
        assert!(economist_system(&owned, 7, &PipelineContext::new()).contains("trade-in"));

        let verdict = orchestrator_system(&owned, &PipelineContext::new());
        assert!(verdict.contains("YOU DON'T NEED IT"));
        let verdict = orchestrator_system(&brief(None), &PipelineContext::new());
        assert!(!verdict.contains("YOU DON'T NEED IT"));
    }

    #[test]
    fn test_alternatives_names_product() {
        let prompt = alternatives_system(&brief(None), 3);
        assert!(prompt.contains("instead of, the Sony WH-1000XM5 Headphones."));
        assert!(prompt.contains("You have 3 searches maximum."));
    }
}
