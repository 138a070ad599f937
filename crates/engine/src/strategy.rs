//! Removal strategies: which candidate locations to take from, and how much.

use rust_decimal::Decimal;
use serde::Serialize;

use stockres_core::{DomainResult, LocationId, PackagingTypeId, ProductId, Quantity};
use stockres_inventory::ProductCatalog;
use stockres_rules::RemovalStrategy;

/// A candidate location and the quantity free there for this pass.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Bin {
    pub location: LocationId,
    pub quantity: Quantity,
}

impl Bin {
    pub fn new(location: LocationId, quantity: Quantity) -> Self {
        Self { location, quantity }
    }
}

/// A packaging size usable by the packaging strategy.
///
/// `quantity` stays a raw decimal: the catalog may hold zero or negative
/// sizes, which [`select`] skips.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PackagingSize {
    pub quantity: Decimal,
    pub priority: i32,
    pub packaging_type: Option<PackagingTypeId>,
}

impl PackagingSize {
    pub fn new(quantity: Decimal) -> Self {
        Self {
            quantity,
            priority: 0,
            packaging_type: None,
        }
    }

    pub fn of_type(mut self, packaging_type: PackagingTypeId) -> Self {
        self.packaging_type = Some(packaging_type);
        self
    }

    /// Sizes configured on `product`; priority comes from the packaging
    /// type's sequence (0 when untyped).
    pub fn for_product(catalog: &ProductCatalog, product: ProductId) -> DomainResult<Vec<Self>> {
        catalog
            .packagings(product)?
            .iter()
            .map(|packaging| {
                let priority = match packaging.packaging_type {
                    Some(type_id) => catalog.packaging_type(type_id)?.sequence,
                    None => 0,
                };
                Ok(Self {
                    quantity: packaging.quantity,
                    priority,
                    packaging_type: packaging.packaging_type,
                })
            })
            .collect()
    }
}

/// A decision to take `quantity` from `location`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub location: LocationId,
    pub quantity: Quantity,
}

/// Apply `strategy` to `bins` (in canonical order) for at most `requested`.
///
/// The returned quantities never exceed their bin nor, summed, `requested`.
pub fn select(
    strategy: &RemovalStrategy,
    bins: &[Bin],
    requested: Quantity,
    packaging: &[PackagingSize],
) -> Vec<Selection> {
    if requested.is_zero() {
        return Vec::new();
    }
    match strategy {
        RemovalStrategy::Plain => take_in_order(bins, requested),
        RemovalStrategy::EmptyBin => take_whole_bins(bins, requested),
        RemovalStrategy::Packaging { packaging_types } => {
            take_packages(bins, requested, &eligible_sizes(packaging, packaging_types))
        }
    }
}

fn take_in_order(bins: &[Bin], requested: Quantity) -> Vec<Selection> {
    let mut remaining = requested;
    let mut selections = Vec::new();
    for bin in bins {
        if remaining.is_zero() {
            break;
        }
        let take = remaining.min(bin.quantity);
        if take.is_zero() {
            continue;
        }
        selections.push(Selection {
            location: bin.location,
            quantity: take,
        });
        remaining = remaining.saturating_sub(take);
    }
    selections
}

fn take_whole_bins(bins: &[Bin], requested: Quantity) -> Vec<Selection> {
    // Stable sort: equal quantities keep canonical order.
    let mut largest_first: Vec<&Bin> = bins.iter().filter(|b| !b.quantity.is_zero()).collect();
    largest_first.sort_by(|a, b| b.quantity.cmp(&a.quantity));

    let mut remaining = requested;
    let mut selections = Vec::new();
    for bin in largest_first {
        if remaining.is_zero() {
            break;
        }
        if bin.quantity > remaining {
            continue;
        }
        selections.push(Selection {
            location: bin.location,
            quantity: bin.quantity,
        });
        remaining = remaining.saturating_sub(bin.quantity);
    }
    selections
}

/// Positive sizes allowed by the type filter, largest first.
fn eligible_sizes(packaging: &[PackagingSize], types: &[PackagingTypeId]) -> Vec<Quantity> {
    let mut eligible: Vec<&PackagingSize> = packaging
        .iter()
        .filter(|size| {
            if size.quantity <= Decimal::ZERO {
                tracing::debug!("ignoring packaging size {} (not positive)", size.quantity);
                return false;
            }
            true
        })
        .filter(|size| {
            types.is_empty() || size.packaging_type.is_some_and(|t| types.contains(&t))
        })
        .collect();
    eligible.sort_by(|a, b| {
        b.quantity
            .cmp(&a.quantity)
            .then_with(|| a.priority.cmp(&b.priority))
    });
    eligible
        .into_iter()
        .map(|size| Quantity::clamped(size.quantity))
        .collect()
}

fn take_packages(bins: &[Bin], requested: Quantity, sizes: &[Quantity]) -> Vec<Selection> {
    if sizes.is_empty() {
        return Vec::new();
    }

    let mut remaining = requested;
    let mut selections = Vec::new();
    for bin in bins {
        if remaining.is_zero() {
            break;
        }
        let taken: Quantity = packages_within(remaining.min(bin.quantity), sizes)
            .iter()
            .map(|&(_, take)| take)
            .sum();
        if taken.is_zero() {
            continue;
        }
        selections.push(Selection {
            location: bin.location,
            quantity: taken,
        });
        remaining = remaining.saturating_sub(taken);
    }
    selections
}

/// Whole packages that fit in `cap`, exhausting each size (largest first)
/// before the next. Yields `(size, quantity taken)` for every size used.
fn packages_within(cap: Quantity, sizes: &[Quantity]) -> Vec<(Quantity, Quantity)> {
    let mut left = cap;
    let mut packages = Vec::new();
    for &size in sizes {
        if size > left {
            continue;
        }
        let Some(take) = left.whole_multiple_of(size) else {
            continue;
        };
        if take.is_zero() {
            continue;
        }
        left = left.saturating_sub(take);
        packages.push((size, take));
    }
    packages
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal::prelude::ToPrimitive;

    fn q(value: u32) -> Quantity {
        Quantity::from(value)
    }

    fn bins(quantities: &[u32]) -> Vec<Bin> {
        quantities
            .iter()
            .map(|&value| Bin::new(LocationId::new(), q(value)))
            .collect()
    }

    fn sizes(quantities: &[i64]) -> Vec<PackagingSize> {
        quantities
            .iter()
            .map(|&value| PackagingSize::new(Decimal::from(value)))
            .collect()
    }

    fn taken(selections: &[Selection]) -> Vec<u32> {
        selections
            .iter()
            .map(|s| s.quantity.value().to_u32().unwrap())
            .collect()
    }

    fn packaging() -> RemovalStrategy {
        RemovalStrategy::Packaging {
            packaging_types: vec![],
        }
    }

    #[test]
    fn plain_takes_in_order_until_satisfied() {
        let candidates = bins(&[100, 100, 100]);
        let selections = select(&RemovalStrategy::Plain, &candidates, q(150), &[]);
        assert_eq!(taken(&selections), vec![100, 50]);
        assert_eq!(selections[0].location, candidates[0].location);
        assert_eq!(selections[1].location, candidates[1].location);
    }

    #[test]
    fn plain_skips_empty_bins() {
        let candidates = bins(&[0, 30]);
        let selections = select(&RemovalStrategy::Plain, &candidates, q(10), &[]);
        assert_eq!(selections.len(), 1);
        assert_eq!(selections[0].location, candidates[1].location);
    }

    #[test]
    fn empty_bin_prefers_largest_bin() {
        // Zone1: Bin1=30, Bin2=60, demand 80.
        let candidates = bins(&[30, 60]);
        let selections = select(&RemovalStrategy::EmptyBin, &candidates, q(80), &[]);
        assert_eq!(taken(&selections), vec![60]);
        assert_eq!(selections[0].location, candidates[1].location);
    }

    #[test]
    fn empty_bin_never_partially_takes() {
        let candidates = bins(&[300, 150]);
        let selections = select(&RemovalStrategy::EmptyBin, &candidates, q(250), &[]);
        assert_eq!(taken(&selections), vec![150]);
        assert_eq!(selections[0].location, candidates[1].location);
    }

    #[test]
    fn empty_bin_ties_keep_canonical_order() {
        let candidates = bins(&[50, 50]);
        let selections = select(&RemovalStrategy::EmptyBin, &candidates, q(80), &[]);
        assert_eq!(selections.len(), 1);
        assert_eq!(selections[0].location, candidates[0].location);
    }

    #[test]
    fn packaging_takes_largest_fitting_packages() {
        let candidates = bins(&[40, 510]);
        let selections = select(&packaging(), &candidates, q(590), &sizes(&[50, 500]));
        assert_eq!(taken(&selections), vec![500]);
        assert_eq!(selections[0].location, candidates[1].location);
    }

    #[test]
    fn packaging_mixes_sizes_within_one_bin() {
        let candidates = bins(&[600]);
        let selections = select(&packaging(), &candidates, q(560), &sizes(&[500, 50, 10]));
        assert_eq!(taken(&selections), vec![560]);
    }

    #[test]
    fn packaging_exhausts_each_size_before_the_next() {
        let sizes = [q(500), q(50), q(10)];
        assert_eq!(
            packages_within(q(560), &sizes),
            vec![(q(500), q(500)), (q(50), q(50)), (q(10), q(10))]
        );
        assert_eq!(
            packages_within(q(1_170), &sizes),
            vec![(q(500), q(1_000)), (q(50), q(150)), (q(10), q(20))]
        );
        assert_eq!(
            packages_within(q(590), &sizes[..2]),
            vec![(q(500), q(500)), (q(50), q(50))]
        );
        assert!(packages_within(q(9), &sizes).is_empty());
    }

    #[test]
    fn packaging_skips_size_too_small_to_count() {
        let candidates = bins(&[1_000_000]);
        let tiny = [PackagingSize::new(Decimal::new(1, 27))];
        assert!(select(&packaging(), &candidates, q(1_000_000), &tiny).is_empty());

        let with_pallet = [
            PackagingSize::new(Decimal::new(1, 27)),
            PackagingSize::new(Decimal::from(400)),
        ];
        let selections = select(&packaging(), &candidates, q(1_000_000), &with_pallet);
        assert_eq!(taken(&selections), vec![1_000_000]);
    }

    #[test]
    fn packaging_ignores_zero_and_negative_sizes() {
        let candidates = bins(&[40]);
        let selections = select(&packaging(), &candidates, q(590), &sizes(&[500, 50, 0, -5]));
        assert!(selections.is_empty());
    }

    #[test]
    fn packaging_without_sizes_selects_nothing() {
        let candidates = bins(&[100]);
        assert!(select(&packaging(), &candidates, q(50), &[]).is_empty());
        assert!(select(&packaging(), &candidates, q(50), &sizes(&[0])).is_empty());
    }

    #[test]
    fn packaging_type_filter_limits_sizes() {
        let pallet = PackagingTypeId::new();
        let box_type = PackagingTypeId::new();
        let available = vec![
            PackagingSize::new(Decimal::from(500)).of_type(pallet),
            PackagingSize::new(Decimal::from(50)).of_type(box_type),
            PackagingSize::new(Decimal::from(1)),
        ];
        let candidates = bins(&[600]);
        let only_pallets = RemovalStrategy::Packaging {
            packaging_types: vec![pallet],
        };
        let selections = select(&only_pallets, &candidates, q(560), &available);
        assert_eq!(taken(&selections), vec![500]);
    }

    #[test]
    fn nothing_is_selected_for_zero_request() {
        let candidates = bins(&[10]);
        assert!(select(&RemovalStrategy::Plain, &candidates, Quantity::ZERO, &[]).is_empty());
    }

    fn strategies() -> impl Strategy<Value = RemovalStrategy> {
        prop_oneof![
            Just(RemovalStrategy::Plain),
            Just(RemovalStrategy::EmptyBin),
            Just(packaging()),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 512,
            ..ProptestConfig::default()
        })]

        /// Property: no strategy takes more than requested or more than a bin holds.
        #[test]
        fn selections_are_bounded(
            strategy in strategies(),
            quantities in prop::collection::vec(0u32..1_000, 0..12),
            package_sizes in prop::collection::vec(-10i64..300, 0..5),
            requested in 1u32..3_000,
        ) {
            let candidates = bins(&quantities);
            let selections = select(&strategy, &candidates, q(requested), &sizes(&package_sizes));

            let total: Quantity = selections.iter().map(|s| s.quantity).sum();
            prop_assert!(total <= q(requested));
            for selection in &selections {
                let bin = candidates.iter().find(|b| b.location == selection.location).unwrap();
                prop_assert!(selection.quantity <= bin.quantity);
                prop_assert!(!selection.quantity.is_zero());
            }
        }

        /// Property: empty-bin takes whole bins, in descending quantity order.
        #[test]
        fn empty_bin_takes_whole_bins_largest_first(
            quantities in prop::collection::vec(0u32..500, 0..12),
            requested in 1u32..2_000,
        ) {
            let candidates = bins(&quantities);
            let selections = select(&RemovalStrategy::EmptyBin, &candidates, q(requested), &[]);
            for selection in &selections {
                let bin = candidates.iter().find(|b| b.location == selection.location).unwrap();
                prop_assert_eq!(selection.quantity, bin.quantity);
            }
            for pair in selections.windows(2) {
                prop_assert!(pair[0].quantity >= pair[1].quantity);
            }
        }

        /// Property: every packaging take decomposes into whole eligible
        /// packages, and no eligible package still fits in what the bin
        /// could have given.
        #[test]
        fn packaging_exhausts_larger_sizes_first(
            quantities in prop::collection::vec(0u32..1_000, 0..8),
            package_sizes in prop::collection::vec(-10i64..300, 0..4),
            requested in 1u32..3_000,
        ) {
            let candidates = bins(&quantities);
            let selections = select(&packaging(), &candidates, q(requested), &sizes(&package_sizes));

            let mut eligible: Vec<Quantity> = package_sizes
                .iter()
                .filter(|s| **s > 0)
                .map(|s| Quantity::new(Decimal::from(*s)).unwrap())
                .collect();
            eligible.sort_by(|a, b| b.cmp(a));

            match eligible.last().copied() {
                None => prop_assert!(selections.is_empty()),
                Some(smallest) => {
                    let mut picked = selections.iter().peekable();
                    let mut remaining = q(requested);
                    for bin in &candidates {
                        let cap = remaining.min(bin.quantity);
                        let taken = match picked.peek() {
                            Some(s) if s.location == bin.location => {
                                picked.next().map_or(Quantity::ZERO, |s| s.quantity)
                            }
                            _ => Quantity::ZERO,
                        };
                        let mut left = taken;
                        for &size in &eligible {
                            if let Some(whole) = left.whole_multiple_of(size) {
                                left = left.saturating_sub(whole);
                            }
                        }
                        prop_assert!(left.is_zero());
                        prop_assert!(cap.saturating_sub(taken) < smallest);
                        remaining = remaining.saturating_sub(taken);
                    }
                    prop_assert!(picked.next().is_none());
                }
            }
        }

        /// Property: identical inputs give identical selections.
        #[test]
        fn selection_is_deterministic(
            strategy in strategies(),
            quantities in prop::collection::vec(0u32..1_000, 0..12),
            requested in 1u32..3_000,
        ) {
            let candidates = bins(&quantities);
            let packs = sizes(&[100, 10]);
            let first = select(&strategy, &candidates, q(requested), &packs);
            let second = select(&strategy, &candidates, q(requested), &packs);
            prop_assert_eq!(first, second);
        }
    }
}
