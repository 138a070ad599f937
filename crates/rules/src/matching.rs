//! Rule matching & ordering.

use stockres_locations::LocationTree;

use crate::demand::Demand;
use crate::rule::ReserveRule;

/// Rules that apply to `demand`, in evaluation order.
///
/// A rule applies when it is active, its location contains the demand's
/// source location, and its domain accepts the demand. The result is sorted
/// by ascending sequence; equal sequences keep the order of `rules`
/// (creation order).
pub fn applicable_rules<'a>(
    rules: &'a [ReserveRule],
    demand: &Demand,
    tree: &LocationTree,
) -> Vec<&'a ReserveRule> {
    let mut matched: Vec<&ReserveRule> = rules
        .iter()
        .filter(|rule| rule.active)
        .filter(|rule| tree.is_descendant_or_self(demand.source(), rule.location))
        .filter(|rule| rule.rule_domain.matches(demand))
        .collect();
    matched.sort_by_key(|rule| rule.sequence);
    matched
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use stockres_core::{Condition, LocationId, Operator, Predicate, ProductId, Quantity};

    fn setup() -> (LocationTree, LocationId, LocationId) {
        let mut b = LocationTree::builder();
        let stock = b.add_root("Stock");
        let zone2 = b.add_child(stock, "Zone2").unwrap();
        (b.build(), stock, zone2)
    }

    fn demand(product: ProductId, source: LocationId) -> Demand {
        Demand::new(product, Quantity::from(10), source).unwrap()
    }

    #[test]
    fn rules_are_sorted_by_sequence_with_stable_ties() {
        let (tree, stock, _) = setup();
        let rules = vec![
            ReserveRule::new("b", stock).with_sequence(2),
            ReserveRule::new("a", stock).with_sequence(1),
            ReserveRule::new("c", stock).with_sequence(2),
        ];
        let names: Vec<&str> = applicable_rules(&rules, &demand(ProductId::new(), stock), &tree)
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn rule_domain_excludes_product() {
        let (tree, stock, _) = setup();
        let product = ProductId::new();
        let excluded = ReserveRule::new("excluded", stock)
            .with_sequence(1)
            .with_domain(Predicate::always().and(Condition::new(
                "product_id",
                Operator::Ne,
                product.to_string(),
            )));
        let kept = ReserveRule::new("kept", stock).with_sequence(2);
        let rules = vec![excluded, kept];
        let matched = applicable_rules(&rules, &demand(product, stock), &tree);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].name, "kept");
    }

    #[test]
    fn rule_must_contain_demand_source() {
        let (tree, stock, zone2) = setup();
        let rules = vec![ReserveRule::new("zone2 only", zone2)];
        assert!(applicable_rules(&rules, &demand(ProductId::new(), stock), &tree).is_empty());
        assert_eq!(
            applicable_rules(&rules, &demand(ProductId::new(), zone2), &tree).len(),
            1
        );
    }

    #[test]
    fn inactive_rules_never_match() {
        let (tree, stock, _) = setup();
        let mut rule = ReserveRule::new("archived", stock);
        rule.active = false;
        let rules = vec![rule];
        assert!(applicable_rules(&rules, &demand(ProductId::new(), stock), &tree).is_empty());
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: output is sorted by sequence and ties keep input order.
        #[test]
        fn ordering_is_sorted_and_stable(sequences in prop::collection::vec(-5i32..5, 0..30)) {
            let (tree, stock, _) = setup();
            let rules: Vec<ReserveRule> = sequences
                .iter()
                .enumerate()
                .map(|(i, s)| ReserveRule::new(format!("{i}"), stock).with_sequence(*s))
                .collect();
            let matched = applicable_rules(&rules, &demand(ProductId::new(), stock), &tree);
            prop_assert_eq!(matched.len(), rules.len());
            for pair in matched.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                prop_assert!(a.sequence <= b.sequence);
                if a.sequence == b.sequence {
                    let ia: usize = a.name.parse().unwrap();
                    let ib: usize = b.name.parse().unwrap();
                    prop_assert!(ia < ib);
                }
            }
        }
    }
}
