//! Revenue and discount aggregation over line items.
//!
//! Discounts are resolved per line item (one tier at most) and then summed;
//! there is no grouping key beyond "one line item, one resolved discount".
//! That makes every total additive: splitting the items of an invoice by
//! merchant and summing the parts gives exactly the whole.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bazaar_catalog::{CatalogView, DiscountTier, LineItem};
use bazaar_core::{DomainError, DomainResult, LineItemId, MerchantId};

use crate::discount::{DiscountResolver, ResolvedDiscount};

/// Discount tiers indexed by owning merchant.
#[derive(Debug, Clone, Default)]
pub struct TierBook {
    by_merchant: HashMap<MerchantId, Vec<DiscountTier>>,
    order: Vec<MerchantId>,
}

impl TierBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the tiers of each given merchant from the catalog.
    pub fn load<C>(
        catalog: &C,
        merchants: impl IntoIterator<Item = MerchantId>,
    ) -> DomainResult<Self>
    where
        C: CatalogView + ?Sized,
    {
        let mut book = Self::new();
        for merchant_id in merchants {
            if book.by_merchant.contains_key(&merchant_id) {
                continue;
            }
            let tiers = catalog.discount_tiers_of(merchant_id)?;
            book.insert(merchant_id, tiers);
        }
        Ok(book)
    }

    /// Record the tiers of one merchant, replacing any previous entry.
    pub fn insert(&mut self, merchant_id: MerchantId, tiers: Vec<DiscountTier>) {
        if self.by_merchant.insert(merchant_id, tiers).is_none() {
            self.order.push(merchant_id);
        }
    }

    /// Tiers of one merchant; empty when the merchant has none (or is unknown).
    pub fn tiers_for(&self, merchant_id: MerchantId) -> &[DiscountTier] {
        self.by_merchant
            .get(&merchant_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every tier of every merchant, merchants in insertion order.
    pub fn pooled(&self) -> Vec<DiscountTier> {
        self.order
            .iter()
            .flat_map(|m| self.tiers_for(*m).iter().cloned())
            .collect()
    }
}

impl FromIterator<DiscountTier> for TierBook {
    fn from_iter<I: IntoIterator<Item = DiscountTier>>(iter: I) -> Self {
        let mut book = Self::new();
        for tier in iter {
            let merchant_id = tier.merchant_id();
            if !book.by_merchant.contains_key(&merchant_id) {
                book.order.push(merchant_id);
            }
            book.by_merchant.entry(merchant_id).or_default().push(tier);
        }
        book
    }
}

/// Gross revenue, discount and net revenue of some set of line items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenueSummary {
    pub revenue: Decimal,
    pub discount: Decimal,
    pub discounted_revenue: Decimal,
}

impl RevenueSummary {
    /// Invariant: `discount <= revenue`, so the net figure cannot overflow.
    pub fn new(revenue: Decimal, discount: Decimal) -> Self {
        Self {
            revenue,
            discount,
            discounted_revenue: revenue - discount,
        }
    }

    /// Combine two disjoint summaries.
    pub fn checked_add(self, rhs: Self) -> DomainResult<Self> {
        Ok(Self::new(
            add_checked(self.revenue, rhs.revenue, "revenue")?,
            add_checked(self.discount, rhs.discount, "discount")?,
        ))
    }
}

/// Per-line-item figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineMetrics {
    pub line_item_id: LineItemId,
    pub merchant_id: MerchantId,
    pub revenue: Decimal,
    pub discount: Option<ResolvedDiscount>,
    pub discounted_revenue: Decimal,
}

impl LineMetrics {
    pub fn discount_amount(&self) -> Decimal {
        self.discount
            .as_ref()
            .map_or(Decimal::ZERO, |d| d.amount)
    }

    pub fn summary(&self) -> RevenueSummary {
        RevenueSummary::new(self.revenue, self.discount_amount())
    }
}

/// Sums revenue and resolved discounts over line items.
///
/// Each item is resolved against its own merchant's tiers from the
/// [`TierBook`]; items whose merchant has no qualifying tier contribute
/// their full revenue and a zero discount. Every sum is checked: an
/// overflow is an `InvariantViolation`, never a panic.
#[derive(Debug, Clone, Copy)]
pub struct RevenueAggregator<'a> {
    tiers: &'a TierBook,
    resolver: DiscountResolver,
}

impl<'a> RevenueAggregator<'a> {
    pub fn new(tiers: &'a TierBook) -> Self {
        Self {
            tiers,
            resolver: DiscountResolver::new(),
        }
    }

    /// Σ `quantity * unit_price`.
    pub fn revenue<'b>(
        &self,
        items: impl IntoIterator<Item = &'b LineItem>,
    ) -> DomainResult<Decimal> {
        items.into_iter().try_fold(Decimal::ZERO, |total, item| {
            add_checked(total, item.revenue()?, "revenue")
        })
    }

    /// Resolved discount of a single item.
    pub fn resolve(&self, item: &LineItem) -> DomainResult<Option<ResolvedDiscount>> {
        self.resolver
            .resolve(item, self.tiers.tiers_for(item.merchant_id))
    }

    /// Σ resolved discount amounts (0 for items with no qualifying tier).
    pub fn discount_total<'b>(
        &self,
        items: impl IntoIterator<Item = &'b LineItem>,
    ) -> DomainResult<Decimal> {
        items.into_iter().try_fold(Decimal::ZERO, |total, item| {
            match self.resolve(item)? {
                Some(resolved) => add_checked(total, resolved.amount, "discount"),
                None => Ok(total),
            }
        })
    }

    pub fn discounted_revenue<'b>(
        &self,
        items: impl IntoIterator<Item = &'b LineItem>,
    ) -> DomainResult<Decimal> {
        Ok(self.summarize(items)?.discounted_revenue)
    }

    pub fn summarize<'b>(
        &self,
        items: impl IntoIterator<Item = &'b LineItem>,
    ) -> DomainResult<RevenueSummary> {
        items
            .into_iter()
            .try_fold(RevenueSummary::default(), |total, item| {
                total.checked_add(self.line_metrics(item)?.summary())
            })
    }

    pub fn line_metrics(&self, item: &LineItem) -> DomainResult<LineMetrics> {
        let revenue = item.revenue()?;
        let discount = self.resolve(item)?;
        let amount = discount.as_ref().map_or(Decimal::ZERO, |d| d.amount);
        Ok(LineMetrics {
            line_item_id: item.id,
            merchant_id: item.merchant_id,
            revenue,
            discount,
            discounted_revenue: revenue - amount,
        })
    }

    pub fn line_breakdown<'b>(
        &self,
        items: impl IntoIterator<Item = &'b LineItem>,
    ) -> DomainResult<Vec<LineMetrics>> {
        items
            .into_iter()
            .map(|item| self.line_metrics(item))
            .collect()
    }

    /// Legacy discount total: each item is resolved against the pooled tiers
    /// of every merchant in the book. The resolver still only admits tiers of
    /// the item's own merchant, so this equals [`Self::discount_total`].
    pub fn legacy_discount_total<'b>(
        &self,
        items: impl IntoIterator<Item = &'b LineItem>,
    ) -> DomainResult<Decimal> {
        let pool = self.tiers.pooled();
        items.into_iter().try_fold(Decimal::ZERO, |total, item| {
            match self.resolver.resolve(item, &pool)? {
                Some(resolved) => add_checked(total, resolved.amount, "discount"),
                None => Ok(total),
            }
        })
    }
}

fn add_checked(lhs: Decimal, rhs: Decimal, what: &str) -> DomainResult<Decimal> {
    lhs.checked_add(rhs)
        .ok_or_else(|| DomainError::invariant(format!("{what} total overflow")))
}
