use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bazaar_core::{
    CustomerId, DiscountTierId, DomainError, DomainResult, Entity, InvoiceId, ItemId, LineItemId,
    MerchantId,
};

/// Seller of items; owns zero or more bulk discount tiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Merchant {
    pub id: MerchantId,
    pub name: String,
}

/// Catalog item sold by exactly one merchant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub merchant_id: MerchantId,
    pub name: String,
    /// Current list price. Line items record their own price at purchase time.
    pub unit_price: Decimal,
}

/// Invoice status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Cancelled,
    InProgress,
    Completed,
}

/// Customer invoice. Line items reference it by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub customer_id: CustomerId,
    pub status: InvoiceStatus,
    pub created_at: DateTime<Utc>,
}

/// Fulfilment status of a single line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineItemStatus {
    Pending,
    Packaged,
    Shipped,
}

impl LineItemStatus {
    pub fn is_shipped(self) -> bool {
        self == LineItemStatus::Shipped
    }
}

/// Input for materializing a line item; the owning merchant is looked up
/// through the item when the line is added to a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLineItem {
    pub id: LineItemId,
    pub invoice_id: InvoiceId,
    pub item_id: ItemId,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub status: LineItemStatus,
}

/// One invoice's purchase of a quantity of one item at a recorded unit price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: LineItemId,
    pub invoice_id: InvoiceId,
    pub item_id: ItemId,
    /// Owning merchant, resolved through `item_id` at materialization.
    pub merchant_id: MerchantId,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub status: LineItemStatus,
}

impl LineItem {
    /// Gross revenue of this line: `quantity * unit_price`.
    pub fn revenue(&self) -> DomainResult<Decimal> {
        Decimal::from(self.quantity)
            .checked_mul(self.unit_price)
            .ok_or_else(|| DomainError::invariant(format!("line item {} revenue overflow", self.id)))
    }
}

/// Merchant-owned bulk discount: `percent` off a line whose quantity reaches
/// `threshold`.
///
/// Deserialization goes through [`DiscountTier::new`], so a decoded tier is
/// always complete and in range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DiscountTierRecord")]
pub struct DiscountTier {
    id: DiscountTierId,
    merchant_id: MerchantId,
    threshold: u32,
    percent: Decimal,
}

impl DiscountTier {
    /// Create a tier.
    ///
    /// Invariants:
    /// - `threshold` is a positive quantity
    /// - `percent` lies in `(0, 100]`
    pub fn new(
        id: DiscountTierId,
        merchant_id: MerchantId,
        threshold: u32,
        percent: Decimal,
    ) -> DomainResult<Self> {
        if threshold == 0 {
            return Err(DomainError::invalid_tier("threshold must be positive"));
        }
        if percent <= Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
            return Err(DomainError::invalid_tier(format!(
                "percent must be in (0, 100], got {percent}"
            )));
        }
        Ok(Self {
            id,
            merchant_id,
            threshold,
            percent,
        })
    }

    pub fn merchant_id(&self) -> MerchantId {
        self.merchant_id
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn percent(&self) -> Decimal {
        self.percent
    }
}

/// A discount tier as stored, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountTierRecord {
    pub id: DiscountTierId,
    pub merchant_id: MerchantId,
    pub threshold: Option<u32>,
    pub percent: Option<Decimal>,
}

impl From<DiscountTier> for DiscountTierRecord {
    fn from(tier: DiscountTier) -> Self {
        Self {
            id: tier.id,
            merchant_id: tier.merchant_id,
            threshold: Some(tier.threshold),
            percent: Some(tier.percent),
        }
    }
}

impl TryFrom<DiscountTierRecord> for DiscountTier {
    type Error = DomainError;

    fn try_from(raw: DiscountTierRecord) -> Result<Self, Self::Error> {
        let threshold = raw
            .threshold
            .ok_or_else(|| DomainError::invalid_tier("threshold is required"))?;
        let percent = raw
            .percent
            .ok_or_else(|| DomainError::invalid_tier("percent is required"))?;
        DiscountTier::new(raw.id, raw.merchant_id, threshold, percent)
    }
}

impl Entity for Merchant {
    type Id = MerchantId;
    const KIND: &'static str = "merchant";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Entity for Item {
    type Id = ItemId;
    const KIND: &'static str = "item";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Entity for Invoice {
    type Id = InvoiceId;
    const KIND: &'static str = "invoice";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Entity for LineItem {
    type Id = LineItemId;
    const KIND: &'static str = "line item";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Entity for DiscountTier {
    type Id = DiscountTierId;
    const KIND: &'static str = "discount tier";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
