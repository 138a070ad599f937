use serde::{Deserialize, Serialize};

use stockres_core::{LocationId, PackagingTypeId, Predicate, RuleId};

/// How a removal rule picks stock among its candidate locations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RemovalStrategy {
    /// Canonical location order, partial takes allowed.
    #[default]
    #[serde(alias = "default")]
    Plain,
    /// Only take a location's whole quantity, largest locations first.
    EmptyBin,
    /// Only take whole packages, largest packaging first.
    Packaging {
        /// Restrict to these packaging types; empty means every type.
        #[serde(default)]
        packaging_types: Vec<PackagingTypeId>,
    },
}

impl RemovalStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            RemovalStrategy::Plain => "plain",
            RemovalStrategy::EmptyBin => "empty_bin",
            RemovalStrategy::Packaging { .. } => "packaging",
        }
    }
}

/// One place (and way) a reserve rule takes stock from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemovalRule {
    pub location: LocationId,
    #[serde(default)]
    pub sequence: i32,
    #[serde(default)]
    pub strategy: RemovalStrategy,
    /// Restricts which quants count as available.
    #[serde(default)]
    pub quant_domain: Predicate,
}

impl RemovalRule {
    pub fn new(location: LocationId) -> Self {
        Self {
            location,
            sequence: 0,
            strategy: RemovalStrategy::Plain,
            quant_domain: Predicate::always(),
        }
    }

    pub fn with_sequence(mut self, sequence: i32) -> Self {
        self.sequence = sequence;
        self
    }

    pub fn with_strategy(mut self, strategy: RemovalStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_quant_domain(mut self, quant_domain: Predicate) -> Self {
        self.quant_domain = quant_domain;
        self
    }
}

/// A reservation rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReserveRule {
    pub id: RuleId,
    pub name: String,
    #[serde(default)]
    pub sequence: i32,
    /// The rule applies to demands whose source location is inside this one.
    pub location: LocationId,
    /// Where any quantity left after every removal rule is routed.
    #[serde(default)]
    pub fallback_location: Option<LocationId>,
    /// Which demands the rule applies to.
    #[serde(default)]
    pub rule_domain: Predicate,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub removals: Vec<RemovalRule>,
}

fn default_active() -> bool {
    true
}

impl ReserveRule {
    pub fn new(name: impl Into<String>, location: LocationId) -> Self {
        Self {
            id: RuleId::new(),
            name: name.into(),
            sequence: 0,
            location,
            fallback_location: None,
            rule_domain: Predicate::always(),
            active: true,
            removals: Vec::new(),
        }
    }

    pub fn with_sequence(mut self, sequence: i32) -> Self {
        self.sequence = sequence;
        self
    }

    pub fn with_fallback(mut self, location: LocationId) -> Self {
        self.fallback_location = Some(location);
        self
    }

    pub fn with_domain(mut self, rule_domain: Predicate) -> Self {
        self.rule_domain = rule_domain;
        self
    }

    pub fn with_removal(mut self, removal: RemovalRule) -> Self {
        self.removals.push(removal);
        self
    }

    /// Removal rules by ascending sequence; equal sequences keep their
    /// configured order.
    pub fn ordered_removals(&self) -> Vec<&RemovalRule> {
        let mut removals: Vec<&RemovalRule> = self.removals.iter().collect();
        removals.sort_by_key(|r| r.sequence);
        removals
    }
}
