use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use bazaar_catalog::{
    DiscountTier, InMemoryCatalog, Invoice, InvoiceStatus, Item, LineItemStatus, Merchant,
    NewLineItem,
};
use bazaar_core::{CustomerId, DiscountTierId, InvoiceId, ItemId, LineItemId, MerchantId};
use bazaar_invoicing::InvoiceMetrics;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const MERCHANTS: usize = 8;

/// One invoice with `lines` line items spread round-robin over a few merchants,
/// each merchant carrying three tiers.
fn setup_invoice(lines: usize) -> (InvoiceMetrics<InMemoryCatalog>, InvoiceId) {
    let mut builder = InMemoryCatalog::builder();

    let merchants: Vec<MerchantId> = (0..MERCHANTS)
        .map(|i| {
            let id = MerchantId::new();
            builder
                .add_merchant(Merchant {
                    id,
                    name: format!("merchant {i}"),
                })
                .unwrap();
            for (threshold, percent) in [(5, dec!(10)), (10, dec!(20)), (50, dec!(35))] {
                let tier = DiscountTier::new(DiscountTierId::new(), id, threshold, percent).unwrap();
                builder.add_discount_tier(tier).unwrap();
            }
            id
        })
        .collect();

    let invoice_id = InvoiceId::new();
    builder
        .add_invoice(Invoice {
            id: invoice_id,
            customer_id: CustomerId::new(),
            status: InvoiceStatus::InProgress,
            created_at: Utc::now(),
        })
        .unwrap();

    for i in 0..lines {
        let item_id = ItemId::new();
        let unit_price = Decimal::new(199 + i as i64, 2);
        builder
            .add_item(Item {
                id: item_id,
                merchant_id: merchants[i % MERCHANTS],
                name: format!("item {i}"),
                unit_price,
            })
            .unwrap();
        builder
            .add_line_item(NewLineItem {
                id: LineItemId::new(),
                invoice_id,
                item_id,
                quantity: (i % 60) as u32 + 1,
                unit_price,
                status: LineItemStatus::Shipped,
            })
            .unwrap();
    }

    (InvoiceMetrics::new(builder.build()), invoice_id)
}

fn bench_invoice_discount(c: &mut Criterion) {
    let mut group = c.benchmark_group("invoice_discount");

    for lines in [10, 100, 1000].iter() {
        group.throughput(Throughput::Elements(*lines as u64));
        group.bench_with_input(BenchmarkId::new("lines", lines), lines, |b, &lines| {
            let (metrics, invoice_id) = setup_invoice(lines);
            b.iter(|| black_box(metrics.invoice_discount(black_box(invoice_id)).unwrap()));
        });
    }

    group.finish();
}

fn bench_invoice_summary(c: &mut Criterion) {
    let mut group = c.benchmark_group("invoice_summary");

    for lines in [10, 100, 1000].iter() {
        group.throughput(Throughput::Elements(*lines as u64));
        group.bench_with_input(BenchmarkId::new("lines", lines), lines, |b, &lines| {
            let (metrics, invoice_id) = setup_invoice(lines);
            b.iter(|| black_box(metrics.invoice_summary(black_box(invoice_id)).unwrap()));
        });
    }

    group.finish();
}

#[allow(deprecated)]
fn bench_scoped_vs_pooled(c: &mut Criterion) {
    let mut group = c.benchmark_group("scoped_vs_pooled");
    let (metrics, invoice_id) = setup_invoice(200);

    group.bench_function("merchant_scoped", |b| {
        b.iter(|| black_box(metrics.invoice_discounted_revenue(invoice_id).unwrap()))
    });
    group.bench_function("pooled_legacy", |b| {
        b.iter(|| black_box(metrics.discounted_revenue(invoice_id).unwrap()))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_invoice_discount,
    bench_invoice_summary,
    bench_scoped_vs_pooled
);
criterion_main!(benches);
