//! Catalog module: the read-only data the revenue engine consumes.
//!
//! Holds the invoice/merchant/discount data model, the `CatalogView` read
//! interface, and an immutable in-memory snapshot implementing it. Nothing
//! here computes revenue.

pub mod document;
pub mod model;
pub mod snapshot;
pub mod view;

pub use document::CatalogDocument;
pub use model::{
    DiscountTier, DiscountTierRecord, Invoice, InvoiceStatus, Item, LineItem, LineItemStatus, Merchant, NewLineItem,
};
pub use snapshot::{CatalogBuilder, InMemoryCatalog};
pub use view::CatalogView;
