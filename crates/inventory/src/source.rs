use std::sync::{Arc, RwLock};

use chrono::Utc;
use rust_decimal::Decimal;

use stockres_core::{LocationId, Predicate, ProductId, Quantity};

use crate::quant::Quant;

/// Read-only view over on-hand quantity.
///
/// # Isolation
///
/// Implementations report quantity that is not already committed elsewhere.
/// Callers running allocations for different demands concurrently must hold
/// whatever lock or transaction their inventory system needs around one full
/// allocation pass, so two passes never see the same free unit.
pub trait QuantitySource: Send + Sync {
    /// Free quantity of `product` stored directly at `location` (not its
    /// children), counting only quants accepted by `filter`. Never negative.
    fn available_quantity(
        &self,
        location: LocationId,
        product: ProductId,
        filter: &Predicate,
    ) -> Quantity;
}

impl<S> QuantitySource for Arc<S>
where
    S: QuantitySource + ?Sized,
{
    fn available_quantity(
        &self,
        location: LocationId,
        product: ProductId,
        filter: &Predicate,
    ) -> Quantity {
        (**self).available_quantity(location, product, filter)
    }
}

impl<S> QuantitySource for &S
where
    S: QuantitySource + ?Sized,
{
    fn available_quantity(
        &self,
        location: LocationId,
        product: ProductId,
        filter: &Predicate,
    ) -> Quantity {
        (**self).available_quantity(location, product, filter)
    }
}

/// In-memory quant store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryQuantStore {
    quants: RwLock<Vec<Quant>>,
}

impl InMemoryQuantStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, quant: Quant) {
        if let Ok(mut quants) = self.quants.write() {
            quants.push(quant);
        }
    }

    /// Add `delta` units of `product` at `location`.
    ///
    /// Merges into the existing quant without lot or package when there is one,
    /// otherwise records a new quant dated now.
    pub fn update_available_quantity(&self, product: ProductId, location: LocationId, delta: Decimal) {
        let Ok(mut quants) = self.quants.write() else {
            return;
        };
        let existing = quants.iter_mut().find(|q| {
            q.product == product && q.location == location && q.lot.is_none() && q.package.is_none()
        });
        match existing {
            Some(quant) => quant.quantity += delta,
            None => quants.push(Quant::new(product, location, delta).with_in_date(Utc::now())),
        }
    }

    pub fn quants_for(&self, product: ProductId) -> Vec<Quant> {
        match self.quants.read() {
            Ok(quants) => quants.iter().filter(|q| q.product == product).cloned().collect(),
            Err(_) => vec![],
        }
    }
}

impl QuantitySource for InMemoryQuantStore {
    fn available_quantity(
        &self,
        location: LocationId,
        product: ProductId,
        filter: &Predicate,
    ) -> Quantity {
        let Ok(quants) = self.quants.read() else {
            return Quantity::ZERO;
        };
        let total: Decimal = quants
            .iter()
            .filter(|q| q.location == location && q.product == product)
            .filter(|q| filter.matches(*q))
            .map(|q| q.quantity)
            .sum();
        Quantity::clamped(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use stockres_core::{Condition, Operator};

    #[test]
    fn update_merges_into_plain_quant() {
        let store = InMemoryQuantStore::new();
        let product = ProductId::new();
        let bin = LocationId::new();

        store.update_available_quantity(product, bin, Decimal::from(100));
        store.update_available_quantity(product, bin, Decimal::from(20));

        assert_eq!(store.quants_for(product).len(), 1);
        assert_eq!(
            store.available_quantity(bin, product, &Predicate::always()),
            Quantity::from(120)
        );
    }

    #[test]
    fn filter_is_applied_per_quant() {
        let store = InMemoryQuantStore::new();
        let product = ProductId::new();
        let bin = LocationId::new();
        store.add(Quant::new(product, bin, Decimal::from(30)).with_lot("A"));
        store.add(Quant::new(product, bin, Decimal::from(70)).with_lot("B"));

        let only_b = Predicate::always().and(Condition::new("lot", Operator::Eq, "B"));
        assert_eq!(store.available_quantity(bin, product, &only_b), Quantity::from(70));

        let big = Predicate::always().and(Condition::new("quantity", Operator::Gt, 200));
        assert!(store.available_quantity(bin, product, &big).is_zero());
    }

    #[test]
    fn other_products_and_locations_are_ignored() {
        let store = InMemoryQuantStore::new();
        let product = ProductId::new();
        let bin = LocationId::new();
        store.add(Quant::new(ProductId::new(), bin, Decimal::from(10)));
        store.add(Quant::new(product, LocationId::new(), Decimal::from(10)));
        assert!(store.available_quantity(bin, product, &Predicate::always()).is_zero());
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: available quantity is never negative, even with negative quants.
        #[test]
        fn available_quantity_is_never_negative(
            deltas in prop::collection::vec(-500i64..500i64, 1..20)
        ) {
            let store = InMemoryQuantStore::new();
            let product = ProductId::new();
            let bin = LocationId::new();
            for delta in &deltas {
                store.add(Quant::new(product, bin, Decimal::from(*delta)));
            }
            let available = store.available_quantity(bin, product, &Predicate::always());
            let expected: i64 = deltas.iter().sum::<i64>().max(0);
            prop_assert_eq!(available.value(), Decimal::from(expected));
        }
    }
}
