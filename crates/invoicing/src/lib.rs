//! Invoice revenue and bulk-discount engine.
//!
//! Pure, deterministic computation over a catalog snapshot: no IO, no
//! mutation. Data flows one way: `CatalogView` → [`DiscountResolver`] →
//! [`RevenueAggregator`] → [`InvoiceMetrics`].

pub mod discount;
pub mod metrics;
pub mod revenue;

pub use discount::{DiscountResolver, ResolvedDiscount};
pub use metrics::{InvoiceMetrics, InvoiceSummary, MerchantSummary};
pub use revenue::{LineMetrics, RevenueAggregator, RevenueSummary, TierBook};
