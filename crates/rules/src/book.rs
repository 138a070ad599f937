//! The configured set of reserve rules.

use stockres_core::{DomainError, DomainResult, RuleId};
use stockres_locations::LocationTree;

use crate::demand::Demand;
use crate::matching::applicable_rules;
use crate::rule::ReserveRule;
use crate::validation::validate_rule;

/// Validated reserve rules in creation order.
///
/// Creation order is the tie-break between rules sharing a sequence, so
/// updates replace a rule in place instead of re-appending it.
#[derive(Debug, Clone, Default)]
pub struct RuleBook {
    rules: Vec<ReserveRule>,
}

impl RuleBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, rule: ReserveRule, tree: &LocationTree) -> DomainResult<RuleId> {
        if self.position(rule.id).is_some() {
            return Err(DomainError::validation(format!(
                "rule {} already exists",
                rule.id
            )));
        }
        validate_rule(&rule, tree)?;

        tracing::info!(
            rule_id = %rule.id,
            removals = rule.removals.len(),
            "created reserve rule '{}'",
            rule.name
        );
        let id = rule.id;
        self.rules.push(rule);
        Ok(id)
    }

    pub fn update(&mut self, rule: ReserveRule, tree: &LocationTree) -> DomainResult<()> {
        let idx = self
            .position(rule.id)
            .ok_or_else(|| DomainError::not_found("rule", rule.id))?;
        validate_rule(&rule, tree)?;

        tracing::info!(rule_id = %rule.id, "updated reserve rule '{}'", rule.name);
        self.rules[idx] = rule;
        Ok(())
    }

    /// Deactivate a rule; it stays in the book but never matches again.
    pub fn archive(&mut self, id: RuleId) -> DomainResult<()> {
        let idx = self
            .position(id)
            .ok_or_else(|| DomainError::not_found("rule", id))?;
        self.rules[idx].active = false;
        tracing::info!(rule_id = %id, "archived reserve rule");
        Ok(())
    }

    pub fn get(&self, id: RuleId) -> DomainResult<&ReserveRule> {
        self.position(id)
            .map(|idx| &self.rules[idx])
            .ok_or_else(|| DomainError::not_found("rule", id))
    }

    pub fn rules(&self) -> &[ReserveRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn applicable(&self, demand: &Demand, tree: &LocationTree) -> Vec<&ReserveRule> {
        applicable_rules(&self.rules, demand, tree)
    }

    fn position(&self, id: RuleId) -> Option<usize> {
        self.rules.iter().position(|r| r.id == id)
    }
}
