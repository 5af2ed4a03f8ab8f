//! Invoice metrics facade.
//!
//! Answers revenue/discount queries for one invoice (optionally narrowed to one
//! merchant) by reading a consistent snapshot from a [`CatalogView`] and running
//! it through [`RevenueAggregator`]. Every query is a pure read: it either
//! succeeds for the whole requested scope or fails with the first unresolvable
//! identifier (`DomainError::MissingInput`). There are no partial results.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bazaar_catalog::{CatalogView, LineItem};
use bazaar_core::{DomainError, DomainResult, InvoiceId, LineItemId, MerchantId};

use crate::discount::{DiscountResolver, ResolvedDiscount};
use crate::revenue::{LineMetrics, RevenueAggregator, RevenueSummary, TierBook};

/// One merchant's contribution to an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerchantSummary {
    pub merchant_id: MerchantId,
    pub totals: RevenueSummary,
}

/// Invoice totals with the per-merchant split they are made of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceSummary {
    pub invoice_id: InvoiceId,
    pub totals: RevenueSummary,
    pub merchants: Vec<MerchantSummary>,
}

/// Line items of one invoice plus the tiers of the merchants selling them.
struct InvoiceSnapshot {
    items: Vec<LineItem>,
    tiers: TierBook,
}

impl InvoiceSnapshot {
    fn aggregator(&self) -> RevenueAggregator<'_> {
        RevenueAggregator::new(&self.tiers)
    }

    fn items_of(&self, merchant_id: MerchantId) -> impl Iterator<Item = &LineItem> {
        self.items
            .iter()
            .filter(move |item| item.merchant_id == merchant_id)
    }
}

#[derive(Debug, Clone)]
pub struct InvoiceMetrics<C> {
    catalog: C,
    resolver: DiscountResolver,
}

impl<C> InvoiceMetrics<C>
where
    C: CatalogView,
{
    pub fn new(catalog: C) -> Self {
        Self {
            catalog,
            resolver: DiscountResolver::new(),
        }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Gross revenue of every line item on the invoice.
    pub fn total_revenue(&self, invoice_id: InvoiceId) -> DomainResult<Decimal> {
        let snapshot = self.load(invoice_id)?;
        let revenue = snapshot.aggregator().revenue(&snapshot.items)?;
        tracing::debug!(%invoice_id, %revenue, "total revenue");
        Ok(revenue)
    }

    /// Legacy whole-invoice discounted revenue.
    ///
    /// Each line item is resolved against the pooled tiers of every merchant
    /// on the invoice, still restricted to tiers of the item's own merchant.
    /// The result always equals [`Self::invoice_discounted_revenue`].
    #[deprecated(note = "use `invoice_discounted_revenue`; the pooled form is kept for compatibility")]
    pub fn discounted_revenue(&self, invoice_id: InvoiceId) -> DomainResult<Decimal> {
        let snapshot = self.load(invoice_id)?;
        let agg = snapshot.aggregator();
        let revenue = agg.revenue(&snapshot.items)?;
        let discount = agg.legacy_discount_total(&snapshot.items)?;
        let net = revenue
            .checked_sub(discount)
            .ok_or_else(|| DomainError::invariant("discounted revenue overflow"))?;
        tracing::debug!(%invoice_id, discounted_revenue = %net, "legacy discounted revenue");
        Ok(net)
    }

    /// Gross revenue of the merchant's line items on the invoice.
    pub fn merchant_revenue(
        &self,
        invoice_id: InvoiceId,
        merchant_id: MerchantId,
    ) -> DomainResult<Decimal> {
        let snapshot = self.load_for_merchant(invoice_id, merchant_id)?;
        let revenue = snapshot
            .aggregator()
            .revenue(snapshot.items_of(merchant_id))?;
        tracing::debug!(%invoice_id, %merchant_id, %revenue, "merchant revenue");
        Ok(revenue)
    }

    /// Discount earned on the merchant's line items; 0 when nothing qualifies
    /// or the merchant sold nothing on this invoice.
    pub fn merchant_discount(
        &self,
        invoice_id: InvoiceId,
        merchant_id: MerchantId,
    ) -> DomainResult<Decimal> {
        let snapshot = self.load_for_merchant(invoice_id, merchant_id)?;
        let discount = snapshot
            .aggregator()
            .discount_total(snapshot.items_of(merchant_id))?;
        tracing::debug!(%invoice_id, %merchant_id, %discount, "merchant discount");
        Ok(discount)
    }

    pub fn merchant_discounted_revenue(
        &self,
        invoice_id: InvoiceId,
        merchant_id: MerchantId,
    ) -> DomainResult<Decimal> {
        let snapshot = self.load_for_merchant(invoice_id, merchant_id)?;
        let net = snapshot
            .aggregator()
            .discounted_revenue(snapshot.items_of(merchant_id))?;
        tracing::debug!(%invoice_id, %merchant_id, discounted_revenue = %net, "merchant discounted revenue");
        Ok(net)
    }

    /// Sum of every line item's resolved discount.
    pub fn invoice_discount(&self, invoice_id: InvoiceId) -> DomainResult<Decimal> {
        let snapshot = self.load(invoice_id)?;
        let discount = snapshot.aggregator().discount_total(&snapshot.items)?;
        tracing::debug!(%invoice_id, %discount, "invoice discount");
        Ok(discount)
    }

    pub fn invoice_discounted_revenue(&self, invoice_id: InvoiceId) -> DomainResult<Decimal> {
        let snapshot = self.load(invoice_id)?;
        let net = snapshot.aggregator().discounted_revenue(&snapshot.items)?;
        tracing::debug!(%invoice_id, discounted_revenue = %net, "invoice discounted revenue");
        Ok(net)
    }

    /// The tier applying to a single line item, if any.
    pub fn find_discount(&self, line_item_id: LineItemId) -> DomainResult<Option<ResolvedDiscount>> {
        let line = self.catalog.line_item(line_item_id)?;
        let tiers = self.catalog.discount_tiers_of(line.merchant_id)?;
        self.resolver.resolve(&line, &tiers)
    }

    /// Distinct merchants on the invoice, in order of first appearance.
    pub fn merchants_on(&self, invoice_id: InvoiceId) -> DomainResult<Vec<MerchantId>> {
        self.catalog.invoice(invoice_id)?;
        let items = self.catalog.line_items_of(invoice_id)?;
        Ok(distinct_merchants(&items))
    }

    pub fn line_breakdown(&self, invoice_id: InvoiceId) -> DomainResult<Vec<LineMetrics>> {
        let snapshot = self.load(invoice_id)?;
        snapshot.aggregator().line_breakdown(&snapshot.items)
    }

    pub fn merchant_breakdown(&self, invoice_id: InvoiceId) -> DomainResult<Vec<MerchantSummary>> {
        let snapshot = self.load(invoice_id)?;
        Self::merchant_summaries(&snapshot)
    }

    /// Invoice totals and their per-merchant split, from a single snapshot read.
    pub fn invoice_summary(&self, invoice_id: InvoiceId) -> DomainResult<InvoiceSummary> {
        let snapshot = self.load(invoice_id)?;
        let totals = snapshot.aggregator().summarize(&snapshot.items)?;
        let merchants = Self::merchant_summaries(&snapshot)?;
        tracing::debug!(
            %invoice_id,
            revenue = %totals.revenue,
            discount = %totals.discount,
            merchants = merchants.len(),
            "invoice summary"
        );
        Ok(InvoiceSummary {
            invoice_id,
            totals,
            merchants,
        })
    }

    fn merchant_summaries(snapshot: &InvoiceSnapshot) -> DomainResult<Vec<MerchantSummary>> {
        let agg = snapshot.aggregator();
        distinct_merchants(&snapshot.items)
            .into_iter()
            .map(|merchant_id| {
                Ok(MerchantSummary {
                    merchant_id,
                    totals: agg.summarize(snapshot.items_of(merchant_id))?,
                })
            })
            .collect()
    }

    fn load(&self, invoice_id: InvoiceId) -> DomainResult<InvoiceSnapshot> {
        self.catalog.invoice(invoice_id)?;
        let items = self.catalog.line_items_of(invoice_id)?;
        let tiers = TierBook::load(&self.catalog, distinct_merchants(&items))?;
        Ok(InvoiceSnapshot { items, tiers })
    }

    fn load_for_merchant(
        &self,
        invoice_id: InvoiceId,
        merchant_id: MerchantId,
    ) -> DomainResult<InvoiceSnapshot> {
        self.catalog.invoice(invoice_id)?;
        self.catalog.merchant(merchant_id)?;
        let items = self.catalog.line_items_of(invoice_id)?;
        let tiers = TierBook::load(&self.catalog, [merchant_id])?;
        Ok(InvoiceSnapshot { items, tiers })
    }
}

fn distinct_merchants(items: &[LineItem]) -> Vec<MerchantId> {
    let mut merchants: Vec<MerchantId> = Vec::new();
    for item in items {
        if !merchants.contains(&item.merchant_id) {
            merchants.push(item.merchant_id);
        }
    }
    merchants
}
