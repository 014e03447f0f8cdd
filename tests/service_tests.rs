mod common;

use beige_ledger::{
    core::services::{
        ExportService, KindFilter, MonthKey, SettingsUpdate, SummaryService, TransactionFilter,
        TransactionService,
    },
    currency::{convert_amount, format_currency, CurrencyCode},
    ledger::{TransactionDraft, TransactionKind},
};
use common::{date, setup_memory_manager, txn};

fn usd() -> CurrencyCode {
    CurrencyCode::new("USD")
}

#[test]
fn conversion_properties_hold() {
    for amount in [0.0, 0.01, 42.5, 123_456.789] {
        assert_eq!(convert_amount(amount, "EUR", "EUR"), amount);
        let there = convert_amount(amount, "USD", "JPY");
        let back = convert_amount(there, "JPY", "USD");
        assert!((back - amount).abs() < 1e-9, "{amount} -> {there} -> {back}");
    }
    let eur = convert_amount(100.0, "INR", "EUR");
    assert!((eur - 1.1018).abs() < 1e-3, "got {eur}");
}

#[test]
fn currency_formatting_matches_display_rules() {
    assert_eq!(format_currency(0.0, "USD"), "$0.00");
    assert_eq!(format_currency(1234.5, "USD"), "$1,234.50");
    assert_eq!(format_currency(1_000_000.0, "EUR"), "€1,000,000.00");
}

#[test]
fn over_budget_month_caps_display_but_not_ratio() {
    let march = date(2025, 3, 10);
    let transactions = vec![
        txn(TransactionKind::Expense, 2000.0, "USD", "Housing", march),
        txn(TransactionKind::Expense, 1500.0, "USD", "Shopping", march),
        txn(TransactionKind::Income, 5000.0, "USD", "Salary", march),
    ];
    let summary =
        SummaryService::monthly_summary(&transactions, MonthKey::of(march), &usd(), 3000.0);
    assert_eq!(summary.expense, 3500.0);
    assert_eq!(summary.balance, 1500.0);
    assert_eq!(summary.budget.display_percent, 100.0);
    assert!((summary.budget.ratio_percent - 116.666).abs() < 0.01);
    assert!(summary.budget.over_budget());
}

#[test]
fn expenses_aggregate_by_category_in_display_currency() {
    let day = date(2025, 3, 5);
    let transactions = vec![
        txn(TransactionKind::Expense, 50.0, "USD", "Food", day),
        txn(TransactionKind::Expense, 20.0, "USD", "Transport", day),
        txn(TransactionKind::Expense, 30.0, "USD", "Food", day),
        txn(TransactionKind::Income, 999.0, "USD", "Food", day),
        txn(TransactionKind::Expense, 75.0, "USD", "Food", date(2025, 2, 28)),
    ];
    let breakdown = SummaryService::category_breakdown(&transactions, MonthKey::of(day), &usd());
    let pairs: Vec<(&str, f64)> = breakdown
        .iter()
        .map(|entry| (entry.name.as_str(), entry.amount))
        .collect();
    assert_eq!(pairs, vec![("Food", 80.0), ("Transport", 20.0)]);

    let in_eur =
        SummaryService::category_breakdown(&transactions, MonthKey::of(day), &CurrencyCode::new("EUR"));
    assert!((in_eur[0].amount - 73.6).abs() < 1e-9);
}

#[test]
fn trend_and_daily_views_cover_the_whole_window() {
    let transactions = vec![
        txn(TransactionKind::Expense, 250.0, "USD", "Shopping", date(2025, 3, 3)),
        txn(TransactionKind::Expense, 40.0, "USD", "Food", date(2025, 3, 3)),
        txn(TransactionKind::Expense, 10.0, "USD", "Food", date(2024, 10, 31)),
        txn(TransactionKind::Expense, 99.0, "USD", "Food", date(2024, 9, 30)),
    ];
    let march = MonthKey::new(2025, 3).unwrap();

    let trend = SummaryService::spending_trend(&transactions, march, &usd());
    let labels: Vec<&str> = trend.iter().map(|point| point.label()).collect();
    assert_eq!(labels, vec!["Oct", "Nov", "Dec", "Jan", "Feb", "Mar"]);
    assert_eq!(trend[0].expense, 10.0);
    assert_eq!(trend[5].expense, 290.0);

    let daily = SummaryService::daily_spending(&transactions, march, &usd());
    assert_eq!(daily.days.len(), 31);
    assert_eq!(daily.days[2].amount, 290.0);
    assert!(daily.days[2].is_high_spending());
    assert_eq!(daily.peak().map(|day| day.day), Some(3));
    assert_eq!(daily.total(), 290.0);
}

#[test]
fn removing_a_category_keeps_transaction_names() {
    let mut manager = setup_memory_manager();
    let id = manager
        .add_transaction(
            TransactionDraft::new(TransactionKind::Expense, 18.0)
                .with_category("Food & Dining")
                .with_merchant("Noodle Bar"),
        )
        .unwrap();
    let food = manager
        .ledger()
        .categories
        .iter()
        .find(|category| category.name == "Food & Dining")
        .map(|category| category.id.clone())
        .unwrap();

    manager.remove_category(&food).unwrap();
    assert!(manager.ledger().category(&food).is_none());
    let kept = TransactionService::get(manager.ledger(), &id).unwrap();
    assert_eq!(kept.category, "Food & Dining");
    assert!(manager
        .ledger()
        .dangling_categories()
        .contains(&"Food & Dining"));
}

#[test]
fn new_transactions_use_display_currency_and_go_first() {
    let mut manager = setup_memory_manager();
    manager
        .update_settings(SettingsUpdate {
            currency: Some(CurrencyCode::new("GBP")),
            monthly_budget: None,
        })
        .unwrap();
    let id = manager
        .add_transaction(TransactionDraft::new(TransactionKind::Income, 100.0))
        .unwrap();
    let first = &manager.ledger().transactions[0];
    assert_eq!(first.id, id);
    assert_eq!(first.currency.as_str(), "GBP");
    assert_eq!(first.date, manager.today());
    assert_eq!(first.category, "Other Income");

    assert!(manager
        .add_transaction(TransactionDraft::new(TransactionKind::Expense, f64::NAN))
        .is_err());
    assert!(manager
        .update_transaction(&id, TransactionDraft::new(TransactionKind::Income, -1.0))
        .is_err());
    assert_eq!(manager.ledger().transactions[0].amount, 100.0);
}

#[test]
fn filter_then_paginate() {
    let mut manager = setup_memory_manager();
    for index in 0..12 {
        manager
            .add_transaction(
                TransactionDraft::new(TransactionKind::Expense, 5.0 + index as f64)
                    .with_merchant(format!("Kiosk {index}"))
                    .with_category("Shopping")
                    .with_notes("Weekend MARKET run"),
            )
            .unwrap();
    }
    let filter = TransactionFilter {
        search: Some("market".into()),
        kind: KindFilter::Only(TransactionKind::Expense),
        category: Some("Shopping".into()),
    };
    let matches = TransactionService::filter(&manager.ledger().transactions, &filter);
    assert_eq!(matches.len(), 12);
    assert_eq!(matches[0].merchant, "Kiosk 11");

    let page = TransactionService::paginate(matches, 9, 5);
    assert_eq!(page.page, 3);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.items.len(), 2);
    assert!(page.has_previous());
    assert!(!page.has_next());

    let none = TransactionFilter {
        kind: KindFilter::Only(TransactionKind::Income),
        ..filter
    };
    let empty = TransactionService::paginate(
        TransactionService::filter(&manager.ledger().transactions, &none),
        1,
        10,
    );
    assert_eq!(empty.total_items, 0);
    assert_eq!(empty.page, 1);
}

#[test]
fn csv_export_quotes_awkward_fields() {
    let mut first = txn(TransactionKind::Expense, 42.5, "EUR", "Food & Dining", date(2025, 3, 2));
    first.merchant = "Smith, Jones & Co".into();
    first.notes = Some("said \"thanks\"".into());
    let mut second = txn(TransactionKind::Income, 1200.0, "USD", "Salary", date(2025, 3, 1));
    second.merchant = "Employer".into();
    second.payment_method = "Bank Transfer".into();

    let csv = ExportService::to_csv_string(&[&first, &second]).unwrap();
    insta::assert_snapshot!(csv.trim_end(), @r###"
Date,Type,Amount,Currency,Category,Merchant,Payment Method,Notes
2025-03-02,expense,42.5,EUR,Food & Dining,"Smith, Jones & Co",Card,"said ""thanks"""
2025-03-01,income,1200,USD,Salary,Employer,Bank Transfer,""
"###);
}
