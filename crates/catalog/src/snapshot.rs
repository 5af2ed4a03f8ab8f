//! Immutable in-memory catalog snapshot.
//!
//! A snapshot is assembled once through [`CatalogBuilder`], which checks every
//! reference as records are added, and is read-only afterwards. Because
//! nothing is mutated after `build()`, a snapshot can be shared across threads
//! (directly or behind an `Arc`) without locking.

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;

use bazaar_core::{
    DiscountTierId, DomainError, DomainResult, Entity, InvoiceId, ItemId, LineItemId, MerchantId,
};

use crate::model::{DiscountTier, Invoice, Item, LineItem, Merchant, NewLineItem};
use crate::view::CatalogView;

/// In-memory catalog for tests, batch jobs and embedding callers.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    merchants: HashMap<MerchantId, Merchant>,
    items: HashMap<ItemId, Item>,
    invoices: HashMap<InvoiceId, Invoice>,
    line_items: HashMap<LineItemId, LineItem>,
    lines_by_invoice: HashMap<InvoiceId, Vec<LineItemId>>,
    tiers_by_merchant: HashMap<MerchantId, Vec<DiscountTier>>,
    tier_ids: HashSet<DiscountTierId>,
}

impl InMemoryCatalog {
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    /// Invoices with at least one line item that has not shipped yet, oldest first.
    pub fn incomplete_invoices(&self) -> Vec<Invoice> {
        let mut invoices: Vec<Invoice> = self
            .lines_by_invoice
            .iter()
            .filter(|(_, lines)| {
                lines.iter().any(|id| {
                    self.line_items
                        .get(id)
                        .is_some_and(|line| !line.status.is_shipped())
                })
            })
            .filter_map(|(invoice_id, _)| self.invoices.get(invoice_id).cloned())
            .collect();

        invoices.sort_by_key(|inv| (inv.created_at, inv.id));
        invoices
    }

    fn lookup<'a, E: Entity>(map: &'a HashMap<E::Id, E>, id: &E::Id) -> DomainResult<&'a E> {
        map.get(id).ok_or_else(|| DomainError::missing(E::KIND, id))
    }
}

impl CatalogView for InMemoryCatalog {
    fn invoice(&self, invoice_id: InvoiceId) -> DomainResult<Invoice> {
        Self::lookup(&self.invoices, &invoice_id).cloned()
    }

    fn merchant(&self, merchant_id: MerchantId) -> DomainResult<Merchant> {
        Self::lookup(&self.merchants, &merchant_id).cloned()
    }

    fn line_item(&self, line_item_id: LineItemId) -> DomainResult<LineItem> {
        Self::lookup(&self.line_items, &line_item_id).cloned()
    }

    fn line_items_of(&self, invoice_id: InvoiceId) -> DomainResult<Vec<LineItem>> {
        Self::lookup(&self.invoices, &invoice_id)?;

        let Some(ids) = self.lines_by_invoice.get(&invoice_id) else {
            return Ok(Vec::new());
        };

        ids.iter()
            .map(|id| Self::lookup(&self.line_items, id).cloned())
            .collect()
    }

    fn merchant_of(&self, item_id: ItemId) -> DomainResult<MerchantId> {
        Self::lookup(&self.items, &item_id).map(|item| item.merchant_id)
    }

    fn discount_tiers_of(&self, merchant_id: MerchantId) -> DomainResult<Vec<DiscountTier>> {
        Self::lookup(&self.merchants, &merchant_id)?;
        Ok(self
            .tiers_by_merchant
            .get(&merchant_id)
            .cloned()
            .unwrap_or_default())
    }
}

/// Validating builder for [`InMemoryCatalog`].
///
/// Records must be added parents-first: merchants before their items and
/// tiers, invoices and items before the line items that reference them.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    catalog: InMemoryCatalog,
}

impl CatalogBuilder {
    pub fn add_merchant(&mut self, merchant: Merchant) -> DomainResult<&mut Self> {
        insert_unique(&mut self.catalog.merchants, merchant)?;
        Ok(self)
    }

    pub fn add_item(&mut self, item: Item) -> DomainResult<&mut Self> {
        self.ensure_merchant(item.merchant_id)?;
        if item.unit_price < Decimal::ZERO {
            return Err(DomainError::validation("item unit_price must not be negative"));
        }
        insert_unique(&mut self.catalog.items, item)?;
        Ok(self)
    }

    pub fn add_invoice(&mut self, invoice: Invoice) -> DomainResult<&mut Self> {
        insert_unique(&mut self.catalog.invoices, invoice)?;
        Ok(self)
    }

    /// Materialize a line item, resolving its merchant through the item.
    pub fn add_line_item(&mut self, new: NewLineItem) -> DomainResult<&mut Self> {
        if new.quantity == 0 {
            return Err(DomainError::validation("line item quantity must be positive"));
        }
        if new.unit_price < Decimal::ZERO {
            return Err(DomainError::validation(
                "line item unit_price must not be negative",
            ));
        }
        if !self.catalog.invoices.contains_key(&new.invoice_id) {
            return Err(DomainError::missing(Invoice::KIND, new.invoice_id));
        }
        let merchant_id = self.catalog.merchant_of(new.item_id)?;

        let line = LineItem {
            id: new.id,
            invoice_id: new.invoice_id,
            item_id: new.item_id,
            merchant_id,
            quantity: new.quantity,
            unit_price: new.unit_price,
            status: new.status,
        };
        insert_unique(&mut self.catalog.line_items, line)?;
        self.catalog
            .lines_by_invoice
            .entry(new.invoice_id)
            .or_default()
            .push(new.id);
        Ok(self)
    }

    pub fn add_discount_tier(&mut self, tier: DiscountTier) -> DomainResult<&mut Self> {
        self.ensure_merchant(tier.merchant_id())?;
        if !self.catalog.tier_ids.insert(*tier.id()) {
            return Err(DomainError::invariant(format!(
                "duplicate {} id {}",
                DiscountTier::KIND,
                tier.id()
            )));
        }
        self.catalog
            .tiers_by_merchant
            .entry(tier.merchant_id())
            .or_default()
            .push(tier);
        Ok(self)
    }

    /// Freeze the snapshot.
    pub fn build(self) -> InMemoryCatalog {
        let catalog = self.catalog;
        tracing::debug!(
            merchants = catalog.merchants.len(),
            items = catalog.items.len(),
            invoices = catalog.invoices.len(),
            line_items = catalog.line_items.len(),
            discount_tiers = catalog.tier_ids.len(),
            "catalog snapshot built"
        );
        catalog
    }

    fn ensure_merchant(&self, merchant_id: MerchantId) -> DomainResult<()> {
        if self.catalog.merchants.contains_key(&merchant_id) {
            Ok(())
        } else {
            Err(DomainError::missing(Merchant::KIND, merchant_id))
        }
    }
}

fn insert_unique<E: Entity>(map: &mut HashMap<E::Id, E>, entity: E) -> DomainResult<()> {
    let id = *entity.id();
    if map.contains_key(&id) {
        return Err(DomainError::invariant(format!("duplicate {} id {}", E::KIND, id)));
    }
    map.insert(id, entity);
    Ok(())
}
