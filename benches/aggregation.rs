use beige_ledger::{
    core::demo::DemoDataGenerator,
    core::services::{ExportService, MonthKey, SummaryService, TransactionFilter, TransactionService},
    currency::CurrencyCode,
    ledger::{default_categories, Transaction},
};
use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn sample_ledger(count: usize) -> (Vec<Transaction>, NaiveDate) {
    let today = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
    let transactions = DemoDataGenerator::new(42).generate(today, &default_categories(), count);
    (transactions, today)
}

fn benchmark_monthly_summary(c: &mut Criterion) {
    let (transactions, today) = sample_ledger(10_000);
    let month = MonthKey::of(today);
    let currency = CurrencyCode::new("EUR");

    c.bench_function("monthly_summary_10k", |b| {
        b.iter(|| {
            SummaryService::monthly_summary(
                black_box(&transactions),
                month,
                &currency,
                black_box(3000.0),
            )
        });
    });
}

fn benchmark_trend_and_daily(c: &mut Criterion) {
    let (transactions, today) = sample_ledger(10_000);
    let month = MonthKey::of(today);
    let currency = CurrencyCode::new("USD");

    c.bench_function("spending_trend_10k", |b| {
        b.iter(|| SummaryService::spending_trend(black_box(&transactions), month, &currency));
    });
    c.bench_function("daily_spending_10k", |b| {
        b.iter(|| SummaryService::daily_spending(black_box(&transactions), month, &currency));
    });
}

fn benchmark_filter_and_export(c: &mut Criterion) {
    let (transactions, _) = sample_ledger(10_000);
    let filter = TransactionFilter {
        search: Some("bakery".into()),
        ..TransactionFilter::default()
    };

    c.bench_function("filter_paginate_10k", |b| {
        b.iter(|| {
            let matches = TransactionService::filter(black_box(&transactions), &filter);
            TransactionService::paginate(matches, 3, 10).total_items
        });
    });
    c.bench_function("csv_export_1k", |b| {
        let rows: Vec<&Transaction> = transactions.iter().take(1_000).collect();
        b.iter(|| ExportService::to_csv_string(black_box(&rows)).map(|csv| csv.len()));
    });
}

criterion_group!(
    benches,
    benchmark_monthly_summary,
    benchmark_trend_and_daily,
    benchmark_filter_and_export
);
criterion_main!(benches);
