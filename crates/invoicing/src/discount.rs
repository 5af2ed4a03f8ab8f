use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bazaar_catalog::{DiscountTier, LineItem};
use bazaar_core::{DomainError, DomainResult};

/// The single tier chosen for a line item and the discount it yields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedDiscount {
    pub tier: DiscountTier,
    pub amount: Decimal,
}

/// Picks the best applying bulk discount tier for a line item.
///
/// A tier qualifies when it belongs to the line's merchant and the line's
/// quantity reaches its threshold. Among qualifying tiers the one with the
/// largest resulting amount wins (not the largest percent, not the lowest
/// threshold); tiers are never stacked. Equal amounts keep the earliest tier
/// in candidate order.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscountResolver;

impl DiscountResolver {
    pub fn new() -> Self {
        Self
    }

    pub fn qualifies(&self, line: &LineItem, tier: &DiscountTier) -> bool {
        tier.merchant_id() == line.merchant_id && line.quantity >= tier.threshold()
    }

    /// `quantity * unit_price * percent / 100`.
    pub fn amount_for(&self, line: &LineItem, tier: &DiscountTier) -> DomainResult<Decimal> {
        let rate = tier
            .percent()
            .checked_div(Decimal::ONE_HUNDRED)
            .ok_or_else(|| DomainError::invariant("discount rate overflow"))?;
        line.revenue()?
            .checked_mul(rate)
            .ok_or_else(|| DomainError::invariant(format!("line item {} discount overflow", line.id)))
    }

    /// Resolve against candidates, ignoring tiers of other merchants.
    ///
    /// `Ok(None)` means no discount (amount 0), which is not an error.
    pub fn resolve(
        &self,
        line: &LineItem,
        candidates: &[DiscountTier],
    ) -> DomainResult<Option<ResolvedDiscount>> {
        let mut best: Option<(&DiscountTier, Decimal)> = None;
        for tier in candidates.iter().filter(|t| self.qualifies(line, t)) {
            let amount = self.amount_for(line, tier)?;
            match best {
                Some((_, best_amount)) if amount <= best_amount => {}
                _ => best = Some((tier, amount)),
            }
        }

        Ok(best.map(|(tier, amount)| ResolvedDiscount {
            tier: tier.clone(),
            amount,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazaar_catalog::LineItemStatus;
    use bazaar_core::{DiscountTierId, InvoiceId, ItemId, LineItemId, MerchantId};
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn line(merchant_id: MerchantId, quantity: u32, unit_price: Decimal) -> LineItem {
        LineItem {
            id: LineItemId::new(),
            invoice_id: InvoiceId::new(),
            item_id: ItemId::new(),
            merchant_id,
            quantity,
            unit_price,
            status: LineItemStatus::Shipped,
        }
    }

    fn tier(merchant_id: MerchantId, threshold: u32, percent: Decimal) -> DiscountTier {
        DiscountTier::new(DiscountTierId::new(), merchant_id, threshold, percent).unwrap()
    }

    #[test]
    fn below_threshold_gets_no_discount() {
        let merchant = MerchantId::new();
        let tiers = vec![tier(merchant, 10, dec!(20))];
        let resolved = DiscountResolver::new()
            .resolve(&line(merchant, 9, dec!(10)), &tiers)
            .unwrap();
        assert_eq!(resolved, None);
    }

    #[test]
    fn threshold_is_inclusive() {
        let merchant = MerchantId::new();
        let tiers = vec![tier(merchant, 10, dec!(20))];
        let resolved = DiscountResolver::new()
            .resolve(&line(merchant, 10, dec!(10)), &tiers)
            .unwrap()
            .unwrap();
        assert_eq!(resolved.amount, dec!(20));
    }

    #[test]
    fn met_threshold_discounts_whole_line() {
        let merchant = MerchantId::new();
        let tiers = vec![tier(merchant, 10, dec!(20))];
        let resolved = DiscountResolver::new()
            .resolve(&line(merchant, 19, dec!(10)), &tiers)
            .unwrap()
            .unwrap();
        assert_eq!(resolved.amount, dec!(38));
        assert_eq!(resolved.tier, tiers[0]);
    }

    #[test]
    fn selects_largest_amount_among_qualifying_tiers() {
        let merchant = MerchantId::new();
        let twenty = tier(merchant, 10, dec!(20));
        let ten = tier(merchant, 5, dec!(10));
        let sixty = tier(merchant, 500, dec!(60));
        let tiers = vec![ten.clone(), twenty.clone(), sixty];

        let resolved = DiscountResolver::new()
            .resolve(&line(merchant, 100, dec!(10)), &tiers)
            .unwrap()
            .unwrap();
        assert_eq!(resolved.tier, twenty);
        assert_eq!(resolved.amount, dec!(200));

        // Only the lower tier is reachable at quantity 7.
        let resolved = DiscountResolver::new()
            .resolve(&line(merchant, 7, dec!(10)), &tiers)
            .unwrap()
            .unwrap();
        assert_eq!(resolved.tier, ten);
        assert_eq!(resolved.amount, dec!(7));
    }

    #[test]
    fn other_merchants_tiers_never_apply() {
        let own = MerchantId::new();
        let other = MerchantId::new();
        let tiers = vec![tier(other, 1, dec!(50))];
        let l = line(own, 100, dec!(10));

        let resolver = DiscountResolver::new();
        assert!(!resolver.qualifies(&l, &tiers[0]));
        assert_eq!(resolver.resolve(&l, &tiers).unwrap(), None);

        // A pool mixing both merchants' tiers still only yields the own tier.
        let own_tier = tier(own, 10, dec!(20));
        let pool = vec![tiers[0].clone(), own_tier.clone()];
        let resolved = resolver.resolve(&l, &pool).unwrap().unwrap();
        assert_eq!(resolved.tier, own_tier);
        assert_eq!(resolved.amount, dec!(200));
    }

    #[test]
    fn equal_amounts_keep_first_candidate() {
        let merchant = MerchantId::new();
        let first = tier(merchant, 5, dec!(15));
        let second = tier(merchant, 8, dec!(15));
        let tiers = vec![first.clone(), second];

        let resolved = DiscountResolver::new()
            .resolve(&line(merchant, 10, dec!(4)), &tiers)
            .unwrap()
            .unwrap();
        assert_eq!(resolved.tier, first);
        assert_eq!(resolved.amount, dec!(6));
    }

    #[test]
    fn no_tiers_means_no_discount() {
        let resolved = DiscountResolver::new()
            .resolve(&line(MerchantId::new(), 1000, dec!(3)), &[])
            .unwrap();
        assert!(resolved.is_none());
    }

    #[test]
    fn overflowing_line_fails_instead_of_panicking() {
        let merchant = MerchantId::new();
        let tiers = vec![tier(merchant, 1, dec!(20))];
        let err = DiscountResolver::new()
            .resolve(&line(merchant, 2, Decimal::MAX), &tiers)
            .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(msg) if msg.contains("overflow")));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: the chosen amount is the maximum over all qualifying tiers,
        /// and never exceeds the line's revenue.
        #[test]
        fn chosen_amount_is_max_of_qualifying(
            quantity in 1u32..1_000,
            price_cents in 0i64..100_000,
            tiers in prop::collection::vec((1u32..1_200, 1u32..=100), 0..8)
        ) {
            let merchant = MerchantId::new();
            let l = line(merchant, quantity, Decimal::new(price_cents, 2));
            let candidates: Vec<DiscountTier> = tiers
                .iter()
                .map(|(threshold, percent)| tier(merchant, *threshold, Decimal::from(*percent)))
                .collect();

            let resolver = DiscountResolver::new();
            let expected = candidates
                .iter()
                .filter(|t| t.threshold() <= quantity)
                .map(|t| resolver.amount_for(&l, t).unwrap())
                .max();

            let resolved = resolver.resolve(&l, &candidates).unwrap();
            prop_assert_eq!(resolved.as_ref().map(|r| r.amount), expected);
            if let Some(r) = resolved {
                prop_assert!(r.amount >= Decimal::ZERO);
                prop_assert!(r.amount <= l.revenue().unwrap());
                prop_assert!(r.tier.threshold() <= quantity);
            }
        }
    }
}
