//! Analyses threaded from earlier agents into later ones.

use crate::domain::errors::{DomainError, DomainResult};

use super::agent::AgentRole;

/// Role name to final analysis text, in completion order.
///
/// Each role is written at most once. Agents receive a snapshot taken at
/// invocation time, never a handle to the growing context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineContext {
    entries: Vec<(AgentRole, String)>,
}

impl PipelineContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished agent's analysis.
    pub fn record(&mut self, role: AgentRole, analysis: impl Into<String>) -> DomainResult<()> {
        if self.get(role).is_some() {
            return Err(DomainError::DuplicateContext(role));
        }
        self.entries.push((role, analysis.into()));
        Ok(())
    }

    pub fn get(&self, role: AgentRole) -> Option<&str> {
        self.entries
            .iter()
            .find(|(r, _)| *r == role)
            .map(|(_, text)| text.as_str())
    }

    /// Independent copy for handing to the next agent.
    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_preserves_completion_order() {
        let mut ctx = PipelineContext::new();
        ctx.record(AgentRole::Advocate, "for").unwrap();
        ctx.record(AgentRole::Skeptic, "against").unwrap();
        assert_eq!(ctx.len(), 2);
        let order: Vec<_> = ctx.snapshot().entries.iter().map(|(r, _)| *r).collect();
        assert_eq!(order, vec![AgentRole::Advocate, AgentRole::Skeptic]);
        assert_eq!(ctx.get(AgentRole::Skeptic), Some("against"));
        assert_eq!(ctx.get(AgentRole::Economist), None);
    }

    #[test]
    fn test_single_writer_per_role() {
        let mut ctx = PipelineContext::new();
        ctx.record(AgentRole::Advocate, "first").unwrap();
        let err = ctx.record(AgentRole::Advocate, "second").unwrap_err();
        assert!(matches!(err, DomainError::DuplicateContext(AgentRole::Advocate)));
        assert_eq!(ctx.get(AgentRole::Advocate), Some("first"));
    }

    #[test]
    fn test_snapshot_is_isolated() {
        let mut ctx = PipelineContext::new();
        ctx.record(AgentRole::Advocate, "for").unwrap();
        let snapshot = ctx.snapshot();
        ctx.record(AgentRole::Skeptic, "against").unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(ctx.len(), 2);
    }

    #[test]
    fn test_empty_analysis_is_valid_context() {
        let mut ctx = PipelineContext::new();
        ctx.record(AgentRole::Advocate, "").unwrap();
        assert_eq!(ctx.get(AgentRole::Advocate), Some(""));
        assert!(!ctx.is_empty());
    }
}
