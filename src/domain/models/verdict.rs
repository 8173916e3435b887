//! The orchestrator's verdict and its shape validation.
//!
//! The canonical schema has five decisions and exactly three bullets.
//! `YOU DON'T NEED IT` is only offered, and only accepted, when the buyer
//! told us what they already own.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Number of summary bullets every verdict carries.
pub const BULLET_COUNT: usize = 3;

/// Lowest confidence a synthesised verdict may carry.
pub const MIN_CONFIDENCE: u8 = 1;

/// Highest confidence a synthesised verdict may carry.
pub const MAX_CONFIDENCE: u8 = 100;

const FALLBACK_REASONING: &str = "Orchestrator failed to produce a verdict.";

/// Purchase decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Decision {
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "WAIT")]
    Wait,
    #[serde(rename = "CONSIDER ALTERNATIVES")]
    ConsiderAlternatives,
    #[serde(rename = "SKIP")]
    Skip,
    #[serde(rename = "YOU DON'T NEED IT")]
    YouDontNeedIt,
}

impl Decision {
    pub const ALL: [Self; 5] = [
        Self::Buy,
        Self::Wait,
        Self::ConsiderAlternatives,
        Self::Skip,
        Self::YouDontNeedIt,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Wait => "WAIT",
            Self::ConsiderAlternatives => "CONSIDER ALTERNATIVES",
            Self::Skip => "SKIP",
            Self::YouDontNeedIt => "YOU DON'T NEED IT",
        }
    }

    /// Decisions offered to the model. The ownership decision needs ownership context.
    pub fn offered(ownership: bool) -> Vec<Self> {
        Self::ALL
            .into_iter()
            .filter(|d| ownership || *d != Self::YouDontNeedIt)
            .collect()
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL.into_iter().find(|d| d.as_str().eq_ignore_ascii_case(value))
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ways a `submit_verdict` input can violate the schema.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerdictError {
    #[error("missing or non-string field `{0}`")]
    MissingField(&'static str),

    #[error("unknown decision `{0}`")]
    UnknownDecision(String),

    #[error("decision `YOU DON'T NEED IT` requires ownership context")]
    OwnershipDecisionWithoutOwnership,

    #[error("confidence must be an integer")]
    ConfidenceNotInteger,

    #[error("confidence {0} outside 1-100")]
    ConfidenceOutOfRange(i64),

    #[error("expected exactly 3 bullets, got {0}")]
    BulletCount(usize),

    #[error("bullets must be non-empty strings")]
    InvalidBullet,

    #[error("decision `CONSIDER ALTERNATIVES` requires an alternative")]
    MissingAlternative,
}

/// The pipeline's terminal decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub decision: Decision,
    pub confidence: u8,
    pub reasoning: String,
    /// Set if and only if `decision` is `CONSIDER ALTERNATIVES`.
    pub alternative: Option<String>,
    pub bullets: Vec<String>,
}

impl Verdict {
    /// Validate the structured input of a `submit_verdict` call.
    ///
    /// An `alternative` sent alongside any other decision is dropped.
    pub fn from_tool_input(input: &Value, ownership: bool) -> Result<Self, VerdictError> {
        let raw_decision = required_str(input, "decision")?;
        let decision = Decision::parse(raw_decision)
            .ok_or_else(|| VerdictError::UnknownDecision(raw_decision.to_string()))?;
        if decision == Decision::YouDontNeedIt && !ownership {
            return Err(VerdictError::OwnershipDecisionWithoutOwnership);
        }

        let confidence = parse_confidence(input.get("confidence"))?;
        let reasoning = required_str(input, "reasoning")?.trim().to_string();
        if reasoning.is_empty() {
            return Err(VerdictError::MissingField("reasoning"));
        }

        let bullets = parse_bullets(input.get("bullets"))?;

        let alternative = input
            .get("alternative")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let alternative = match decision {
            Decision::ConsiderAlternatives => Some(alternative.ok_or(VerdictError::MissingAlternative)?),
            _ => None,
        };

        Ok(Self {
            decision,
            confidence,
            reasoning,
            alternative,
            bullets,
        })
    }

    /// Fixed verdict used when the orchestrator returned no `submit_verdict` call.
    ///
    /// Confidence 0 and empty bullets mark it as a default, not a judgment.
    pub fn fallback() -> Self {
        Self {
            decision: Decision::Skip,
            confidence: 0,
            reasoning: FALLBACK_REASONING.to_string(),
            alternative: None,
            bullets: Vec::new(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.confidence == 0
    }
}

fn required_str<'a>(input: &'a Value, field: &'static str) -> Result<&'a str, VerdictError> {
    input
        .get(field)
        .and_then(Value::as_str)
        .ok_or(VerdictError::MissingField(field))
}

fn parse_confidence(value: Option<&Value>) -> Result<u8, VerdictError> {
    let value = value.ok_or(VerdictError::MissingField("confidence"))?;
    let raw = match value.as_i64() {
        Some(n) => n,
        None => match value.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e9 => f as i64,
            _ => return Err(VerdictError::ConfidenceNotInteger),
        },
    };
    if !(i64::from(MIN_CONFIDENCE)..=i64::from(MAX_CONFIDENCE)).contains(&raw) {
        return Err(VerdictError::ConfidenceOutOfRange(raw));
    }
    u8::try_from(raw).map_err(|_| VerdictError::ConfidenceOutOfRange(raw))
}

fn parse_bullets(value: Option<&Value>) -> Result<Vec<String>, VerdictError> {
    let items = value
        .and_then(Value::as_array)
        .ok_or(VerdictError::MissingField("bullets"))?;
    if items.len() != BULLET_COUNT {
        return Err(VerdictError::BulletCount(items.len()));
    }
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .ok_or(VerdictError::InvalidBullet)
        })
        .collect()
}
