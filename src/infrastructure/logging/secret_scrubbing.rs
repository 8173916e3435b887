use regex::{Captures, Regex};
use std::fmt;
use std::sync::OnceLock;

/// Redacts credentials from text before it is logged or surfaced to a
/// stream consumer.
pub struct SecretScrubber {
    anthropic_key: Option<Regex>,
    tavily_key: Option<Regex>,
    bearer: Option<Regex>,
    key_value: Option<Regex>,
}

impl SecretScrubber {
    pub fn new() -> Self {
        let compile = |pattern: &str| match Regex::new(pattern) {
            Ok(regex) => Some(regex),
            Err(err) => {
                tracing::error!(pattern, error = %err, "secret pattern failed to compile");
                None
            }
        };
        Self {
            // sk-ant-api03-...
            anthropic_key: compile(r"sk-ant-[a-zA-Z0-9_-]{8,}"),
            // tvly-...
            tavily_key: compile(r"tvly-[a-zA-Z0-9_-]{8,}"),
            bearer: compile(r"Bearer\s+[a-zA-Z0-9._~+/=-]+"),
            // api_key=..., "x-api-key": "...", token: ...
            key_value: compile(
                r#"(?i)(["']?(?:x-api-key|api_key|apikey|token|secret)["']?\s*[:=]\s*)["']?[a-zA-Z0-9._-]{8,}["']?"#,
            ),
        }
    }

    /// Process-wide instance.
    pub fn global() -> &'static Self {
        static SCRUBBER: OnceLock<SecretScrubber> = OnceLock::new();
        SCRUBBER.get_or_init(Self::new)
    }

    pub fn scrub(&self, message: &str) -> String {
        let mut scrubbed = message.to_string();
        if let Some(re) = &self.anthropic_key {
            scrubbed = re.replace_all(&scrubbed, "[API_KEY_REDACTED]").into_owned();
        }
        if let Some(re) = &self.tavily_key {
            scrubbed = re.replace_all(&scrubbed, "[API_KEY_REDACTED]").into_owned();
        }
        if let Some(re) = &self.bearer {
            scrubbed = re
                .replace_all(&scrubbed, "Bearer [TOKEN_REDACTED]")
                .into_owned();
        }
        if let Some(re) = &self.key_value {
            scrubbed = re
                .replace_all(&scrubbed, |caps: &Captures<'_>| format!("{}[REDACTED]", &caps[1]))
                .into_owned();
        }
        scrubbed
    }
}

impl Default for SecretScrubber {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SecretScrubber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretScrubber").finish()
    }
}
