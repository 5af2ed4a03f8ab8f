//! JSON catalog documents.
//!
//! A document is a flat dump of the catalog tables. Loading replays it
//! through [`CatalogBuilder`], so references and ranges are checked exactly
//! as for programmatic construction.

use serde::{Deserialize, Serialize};

use bazaar_core::{DomainError, DomainResult};

use crate::model::{DiscountTier, DiscountTierRecord, Invoice, Item, Merchant, NewLineItem};
use crate::snapshot::InMemoryCatalog;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogDocument {
    pub merchants: Vec<Merchant>,
    pub items: Vec<Item>,
    pub invoices: Vec<Invoice>,
    pub line_items: Vec<NewLineItem>,
    /// Validated into [`DiscountTier`]s while loading.
    pub discount_tiers: Vec<DiscountTierRecord>,
}

impl CatalogDocument {
    pub fn into_catalog(self) -> DomainResult<InMemoryCatalog> {
        let mut builder = InMemoryCatalog::builder();
        for merchant in self.merchants {
            builder.add_merchant(merchant)?;
        }
        for item in self.items {
            builder.add_item(item)?;
        }
        for invoice in self.invoices {
            builder.add_invoice(invoice)?;
        }
        for line in self.line_items {
            builder.add_line_item(line)?;
        }
        for record in self.discount_tiers {
            builder.add_discount_tier(DiscountTier::try_from(record)?)?;
        }
        Ok(builder.build())
    }
}

impl InMemoryCatalog {
    /// Parse and validate a JSON [`CatalogDocument`].
    pub fn from_json(json: &str) -> DomainResult<Self> {
        let document: CatalogDocument = serde_json::from_str(json)
            .map_err(|e| DomainError::validation(format!("malformed catalog document: {e}")))?;
        document.into_catalog()
    }
}
