//! The allocation pass: rules → removal rules → strategy → lines.

use std::collections::HashMap;

use stockres_core::{DomainResult, LocationId, Predicate, ProductId, Quantity};
use stockres_inventory::{ProductCatalog, QuantitySource};
use stockres_locations::LocationTree;
use stockres_rules::{Demand, RemovalRule, ReserveRule, applicable_rules};

use crate::config::{EngineConfig, FallbackPolicy};
use crate::result::{AllocationLine, AllocationResult, LineKind};
use crate::strategy::{Bin, PackagingSize, select};

/// Runs allocation passes against a fixed view of locations, stock, products
/// and rules.
///
/// An `Allocator` never mutates anything; each [`allocate`](Self::allocate)
/// call is independent. See [`QuantitySource`] for the isolation callers must
/// provide between concurrent passes.
pub struct Allocator<'a, Q> {
    tree: &'a LocationTree,
    quants: Q,
    catalog: &'a ProductCatalog,
    rules: &'a [ReserveRule],
    config: EngineConfig,
}

impl<'a, Q: QuantitySource> Allocator<'a, Q> {
    pub fn new(
        tree: &'a LocationTree,
        quants: Q,
        catalog: &'a ProductCatalog,
        rules: &'a [ReserveRule],
    ) -> Self {
        Self {
            tree,
            quants,
            catalog,
            rules,
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Decide where `demand` is reserved from.
    ///
    /// Fails (without producing any line) when the demand's source location
    /// or product is unknown, or when a rule references an unknown location.
    pub fn allocate(&self, demand: &Demand) -> DomainResult<AllocationResult> {
        self.tree.get(demand.source())?;
        let packaging = PackagingSize::for_product(self.catalog, demand.product())?;
        let rules = applicable_rules(self.rules, demand, self.tree);

        tracing::debug!(
            product_id = %demand.product(),
            source = %demand.source(),
            quantity = %demand.quantity(),
            rules = rules.len(),
            "allocating demand"
        );

        let mut pass = Pass {
            product: demand.product(),
            remaining: demand.quantity(),
            lines: Vec::new(),
            taken: HashMap::new(),
        };

        'rules: for rule in &rules {
            for removal in rule.ordered_removals() {
                if pass.remaining.is_zero() {
                    break 'rules;
                }
                self.apply_removal(rule, removal, demand.source(), &packaging, &mut pass)?;
            }
        }

        if !pass.remaining.is_zero() {
            if let Some(rule) = self.fallback_rule(&rules) {
                self.assign_fallback(rule, &mut pass)?;
            }
        }

        let result = AllocationResult::new(
            demand.product(),
            demand.source(),
            demand.quantity(),
            pass.lines,
            pass.remaining,
        );
        tracing::info!(
            product_id = %demand.product(),
            outcome = ?result.outcome(),
            reserved = %result.reserved(),
            remainder = %result.remainder(),
            "allocation finished"
        );
        Ok(result)
    }

    fn apply_removal(
        &self,
        rule: &ReserveRule,
        removal: &RemovalRule,
        source: LocationId,
        packaging: &[PackagingSize],
        pass: &mut Pass,
    ) -> DomainResult<()> {
        self.tree.get(removal.location)?;
        let Some(scope) = self.scope(removal.location, source) else {
            tracing::debug!(
                rule_id = %rule.id,
                removal_location = %removal.location,
                "removal location outside demand source, skipped"
            );
            return Ok(());
        };

        let bins: Vec<Bin> = self
            .tree
            .expand(scope)?
            .iter()
            .filter_map(|&location| {
                let free = self
                    .quants
                    .available_quantity(location, pass.product, &removal.quant_domain)
                    .saturating_sub(pass.taken_at(location));
                (!free.is_zero()).then(|| Bin::new(location, free))
            })
            .collect();

        let selections = select(&removal.strategy, &bins, pass.remaining, packaging);
        tracing::debug!(
            rule_id = %rule.id,
            strategy = removal.strategy.name(),
            candidates = bins.len(),
            selected = selections.len(),
            "applied removal rule"
        );

        for selection in selections {
            let quantity = selection.quantity.min(pass.remaining);
            if quantity.is_zero() {
                continue;
            }
            pass.take(selection.location, quantity);
            pass.lines.push(AllocationLine {
                location: selection.location,
                quantity,
                rule: rule.id,
                kind: LineKind::Reserved,
            });
        }
        Ok(())
    }

    /// The part of `removal` that lies under the demand's `source`: the removal
    /// location itself when it is inside the source, the source when the
    /// removal location contains it, nothing when the two are disjoint.
    fn scope(&self, removal: LocationId, source: LocationId) -> Option<LocationId> {
        if self.tree.is_descendant_or_self(removal, source) {
            Some(removal)
        } else if self.tree.is_descendant_or_self(source, removal) {
            Some(source)
        } else {
            None
        }
    }

    fn fallback_rule<'r>(&self, rules: &[&'r ReserveRule]) -> Option<&'r ReserveRule> {
        let declared = |rule: &&'r ReserveRule| rule.fallback_location.is_some();
        match self.config.fallback_policy {
            FallbackPolicy::LastDeclared => rules.iter().rev().copied().find(declared),
            FallbackPolicy::FirstDeclared => rules.iter().copied().find(declared),
        }
    }

    fn assign_fallback(&self, rule: &ReserveRule, pass: &mut Pass) -> DomainResult<()> {
        let Some(location) = rule.fallback_location else {
            return Ok(());
        };
        let available: Quantity = self
            .tree
            .expand(location)?
            .iter()
            .map(|&loc| {
                self.quants
                    .available_quantity(loc, pass.product, &Predicate::always())
                    .saturating_sub(pass.taken_at(loc))
            })
            .sum();
        let quantity = pass.remaining;

        tracing::debug!(
            rule_id = %rule.id,
            fallback = %location,
            quantity = %quantity,
            available = %available,
            "routing remainder to fallback location"
        );
        pass.lines.push(AllocationLine {
            location,
            quantity,
            rule: rule.id,
            kind: LineKind::Fallback {
                available: available.min(quantity),
            },
        });
        pass.remaining = Quantity::ZERO;
        Ok(())
    }
}

/// Mutable state of one allocation pass.
struct Pass {
    product: ProductId,
    remaining: Quantity,
    lines: Vec<AllocationLine>,
    /// Quantity already taken per location earlier in this pass.
    taken: HashMap<LocationId, Quantity>,
}

impl Pass {
    fn taken_at(&self, location: LocationId) -> Quantity {
        self.taken.get(&location).copied().unwrap_or_default()
    }

    fn take(&mut self, location: LocationId, quantity: Quantity) {
        *self.taken.entry(location).or_default() += quantity;
        self.remaining = self.remaining.saturating_sub(quantity);
    }
}
