use std::sync::Arc;

use bazaar_core::{DomainResult, InvoiceId, ItemId, LineItemId, MerchantId};

use crate::model::{DiscountTier, Invoice, LineItem, Merchant};

/// Read-only access to invoices, line items and merchants' discount tiers.
///
/// Implementations must answer every call of one metrics query from a
/// consistent snapshot. Unknown identifiers are reported as
/// `DomainError::MissingInput`; an empty tier list is not an error.
pub trait CatalogView: Send + Sync {
    fn invoice(&self, invoice_id: InvoiceId) -> DomainResult<Invoice>;

    fn merchant(&self, merchant_id: MerchantId) -> DomainResult<Merchant>;

    fn line_item(&self, line_item_id: LineItemId) -> DomainResult<LineItem>;

    /// Line items of an invoice, in the order they were recorded.
    fn line_items_of(&self, invoice_id: InvoiceId) -> DomainResult<Vec<LineItem>>;

    fn merchant_of(&self, item_id: ItemId) -> DomainResult<MerchantId>;

    fn discount_tiers_of(&self, merchant_id: MerchantId) -> DomainResult<Vec<DiscountTier>>;
}

impl<S> CatalogView for Arc<S>
where
    S: CatalogView + ?Sized,
{
    fn invoice(&self, invoice_id: InvoiceId) -> DomainResult<Invoice> {
        (**self).invoice(invoice_id)
    }

    fn merchant(&self, merchant_id: MerchantId) -> DomainResult<Merchant> {
        (**self).merchant(merchant_id)
    }

    fn line_item(&self, line_item_id: LineItemId) -> DomainResult<LineItem> {
        (**self).line_item(line_item_id)
    }

    fn line_items_of(&self, invoice_id: InvoiceId) -> DomainResult<Vec<LineItem>> {
        (**self).line_items_of(invoice_id)
    }

    fn merchant_of(&self, item_id: ItemId) -> DomainResult<MerchantId> {
        (**self).merchant_of(item_id)
    }

    fn discount_tiers_of(&self, merchant_id: MerchantId) -> DomainResult<Vec<DiscountTier>> {
        (**self).discount_tiers_of(merchant_id)
    }
}
