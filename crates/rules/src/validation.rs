//! Configuration-time rule validation.

use stockres_core::{DomainError, DomainResult};
use stockres_locations::LocationTree;

use crate::rule::ReserveRule;

/// Check a rule against the location tree before it is stored.
///
/// - the rule location must exist (`NotFound` otherwise)
/// - the fallback location must be the rule location or inside it
/// - every removal location must be the rule location or inside it
pub fn validate_rule(rule: &ReserveRule, tree: &LocationTree) -> DomainResult<()> {
    if rule.name.trim().is_empty() {
        return Err(DomainError::validation("rule name cannot be empty"));
    }

    let root = tree.get(rule.location)?;

    if let Some(fallback) = rule.fallback_location {
        if !tree.is_descendant_or_self(fallback, rule.location) {
            return Err(DomainError::validation(format!(
                "rule '{}': fallback location {} must be a child of {}",
                rule.name, fallback, root.complete_name
            )));
        }
    }

    for removal in &rule.removals {
        if !tree.is_descendant_or_self(removal.location, rule.location) {
            return Err(DomainError::validation(format!(
                "rule '{}': removal location {} must be a child of {}",
                rule.name, removal.location, root.complete_name
            )));
        }
    }

    Ok(())
}
