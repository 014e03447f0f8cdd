//! Dashboard and report aggregation in the display currency.

use std::{cmp::Ordering, fmt, str::FromStr};

use chrono::{Datelike, NaiveDate};
use tracing::debug;

use crate::currency::{convert_amount, CurrencyCode};
use crate::ledger::{Transaction, TransactionKind};

/// A day whose converted expense total exceeds this is flagged.
pub const HIGH_SPENDING_THRESHOLD: f64 = 200.0;
/// Months in the spending trend, current month included.
pub const TREND_MONTHS: u32 = 6;

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// A calendar month of a specific year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn month(self) -> u32 {
        self.month
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// The month `delta` months away; negative goes back in time.
    pub fn offset(self, delta: i32) -> Self {
        let index = self.year * 12 + (self.month as i32 - 1) + delta;
        Self {
            year: index.div_euclid(12),
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    pub fn days_in_month(self) -> u32 {
        match self.month {
            4 | 6 | 9 | 11 => 30,
            2 if is_leap_year(self.year) => 29,
            2 => 28,
            _ => 31,
        }
    }

    /// Short English month name, e.g. `Mar`.
    pub fn label(self) -> &'static str {
        MONTH_LABELS[(self.month - 1) as usize]
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = String;

    /// Parses `YYYY-MM`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("invalid month `{value}` (expected YYYY-MM)");
        let (year, month) = value.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        MonthKey::new(year, month).ok_or_else(invalid)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub name: String,
    pub amount: f64,
}

/// Spend against the monthly budget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetUtilization {
    pub budget: f64,
    pub spent: f64,
    /// Uncapped `spent / budget * 100`; 0 when no budget is set.
    pub ratio_percent: f64,
    /// `ratio_percent` capped at 100 for progress display.
    pub display_percent: f64,
}

impl BudgetUtilization {
    pub fn over_budget(&self) -> bool {
        self.ratio_percent > 100.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySummary {
    pub month: MonthKey,
    pub currency: CurrencyCode,
    pub income: f64,
    pub expense: f64,
    pub balance: f64,
    pub budget: BudgetUtilization,
    /// Expense totals per category name, largest first.
    pub categories: Vec<CategoryTotal>,
    pub transaction_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrendPoint {
    pub month: MonthKey,
    pub expense: f64,
}

impl TrendPoint {
    pub fn label(&self) -> &'static str {
        self.month.label()
    }

    /// Expense rounded half away from zero to a whole unit.
    pub fn rounded_expense(&self) -> f64 {
        self.expense.round()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailySpending {
    pub day: u32,
    pub amount: f64,
}

impl DailySpending {
    pub fn is_high_spending(&self) -> bool {
        self.amount > HIGH_SPENDING_THRESHOLD
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyReport {
    pub month: MonthKey,
    pub currency: CurrencyCode,
    pub days: Vec<DailySpending>,
}

impl DailyReport {
    pub fn total(&self) -> f64 {
        self.days.iter().map(|day| day.amount).sum()
    }

    pub fn peak(&self) -> Option<&DailySpending> {
        self.days
            .iter()
            .filter(|day| day.amount > 0.0)
            .max_by(|a, b| a.amount.partial_cmp(&b.amount).unwrap_or(Ordering::Equal))
    }
}

pub struct SummaryService;

impl SummaryService {
    /// Converts `txn.amount` into `currency`.
    pub fn converted(txn: &Transaction, currency: &CurrencyCode) -> f64 {
        convert_amount(txn.amount, txn.currency.as_str(), currency.as_str())
    }

    /// Sum of converted amounts of `kind` within `month`.
    pub fn total(
        transactions: &[Transaction],
        month: MonthKey,
        kind: TransactionKind,
        currency: &CurrencyCode,
    ) -> f64 {
        transactions
            .iter()
            .filter(|txn| txn.kind == kind && month.contains(txn.date))
            .map(|txn| Self::converted(txn, currency))
            .sum()
    }

    pub fn budget_utilization(spent: f64, budget: f64) -> BudgetUtilization {
        let ratio_percent = if budget > 0.0 {
            spent / budget * 100.0
        } else {
            0.0
        };
        BudgetUtilization {
            budget,
            spent,
            ratio_percent,
            display_percent: ratio_percent.min(100.0),
        }
    }

    /// Converted expense totals grouped by category name, sorted descending.
    /// Equal totals keep the order in which their category first appeared.
    pub fn category_breakdown(
        transactions: &[Transaction],
        month: MonthKey,
        currency: &CurrencyCode,
    ) -> Vec<CategoryTotal> {
        let mut totals: Vec<CategoryTotal> = Vec::new();
        for txn in transactions
            .iter()
            .filter(|txn| txn.is_expense() && month.contains(txn.date))
        {
            let amount = Self::converted(txn, currency);
            match totals.iter_mut().find(|entry| entry.name == txn.category) {
                Some(entry) => entry.amount += amount,
                None => totals.push(CategoryTotal {
                    name: txn.category.clone(),
                    amount,
                }),
            }
        }
        totals.sort_by(|a, b| b.amount.partial_cmp(&a.amount).unwrap_or(Ordering::Equal));
        totals
    }

    pub fn monthly_summary(
        transactions: &[Transaction],
        month: MonthKey,
        currency: &CurrencyCode,
        monthly_budget: f64,
    ) -> MonthlySummary {
        let income = Self::total(transactions, month, TransactionKind::Income, currency);
        let expense = Self::total(transactions, month, TransactionKind::Expense, currency);
        let transaction_count = transactions
            .iter()
            .filter(|txn| month.contains(txn.date))
            .count();
        debug!(%month, %currency, income, expense, transaction_count, "monthly summary");
        MonthlySummary {
            month,
            currency: currency.clone(),
            income,
            expense,
            balance: income - expense,
            budget: Self::budget_utilization(expense, monthly_budget),
            categories: Self::category_breakdown(transactions, month, currency),
            transaction_count,
        }
    }

    /// Expense totals for the six months ending with `current`, oldest first.
    pub fn spending_trend(
        transactions: &[Transaction],
        current: MonthKey,
        currency: &CurrencyCode,
    ) -> Vec<TrendPoint> {
        (0..TREND_MONTHS as i32)
            .rev()
            .map(|back| {
                let month = current.offset(-back);
                TrendPoint {
                    month,
                    expense: Self::total(transactions, month, TransactionKind::Expense, currency),
                }
            })
            .collect()
    }

    /// One entry per calendar day of `month` with its converted expense total.
    pub fn daily_spending(
        transactions: &[Transaction],
        month: MonthKey,
        currency: &CurrencyCode,
    ) -> DailyReport {
        let mut days: Vec<DailySpending> = (1..=month.days_in_month())
            .map(|day| DailySpending { day, amount: 0.0 })
            .collect();
        for txn in transactions
            .iter()
            .filter(|txn| txn.is_expense() && month.contains(txn.date))
        {
            if let Some(slot) = days.get_mut(txn.date.day0() as usize) {
                slot.amount += Self::converted(txn, currency);
            }
        }
        DailyReport {
            month,
            currency: currency.clone(),
            days,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn txn(kind: TransactionKind, amount: f64, currency: &str, category: &str, on: NaiveDate) -> Transaction {
        Transaction {
            id: format!("{category}-{amount}-{on}"),
            date: on,
            kind,
            amount,
            currency: CurrencyCode::new(currency),
            category: category.into(),
            payment_method: "Card".into(),
            merchant: "Shop".into(),
            notes: None,
        }
    }

    fn usd() -> CurrencyCode {
        CurrencyCode::new("USD")
    }

    fn march() -> MonthKey {
        MonthKey::new(2025, 3).unwrap()
    }

    #[test]
    fn category_breakdown_groups_and_sorts_descending() {
        let on = date(2025, 3, 4);
        let txns = vec![
            txn(TransactionKind::Expense, 50.0, "USD", "Food", on),
            txn(TransactionKind::Expense, 20.0, "USD", "Transport", on),
            txn(TransactionKind::Expense, 30.0, "USD", "Food", on),
            txn(TransactionKind::Income, 999.0, "USD", "Salary", on),
        ];
        let breakdown = SummaryService::category_breakdown(&txns, march(), &usd());
        assert_eq!(
            breakdown,
            vec![
                CategoryTotal { name: "Food".into(), amount: 80.0 },
                CategoryTotal { name: "Transport".into(), amount: 20.0 },
            ]
        );
    }

    #[test]
    fn budget_display_is_capped_but_ratio_is_not() {
        let utilization = SummaryService::budget_utilization(3500.0, 3000.0);
        assert_eq!(utilization.display_percent, 100.0);
        assert!((utilization.ratio_percent - 116.666).abs() < 0.01);
        assert!(utilization.over_budget());

        let unset = SummaryService::budget_utilization(50.0, 0.0);
        assert_eq!(unset.ratio_percent, 0.0);
        assert!(!unset.over_budget());

        assert!(!SummaryService::budget_utilization(3000.0, 3000.0).over_budget());
    }

    #[test]
    fn monthly_summary_converts_and_ignores_other_months() {
        let txns = vec![
            txn(TransactionKind::Income, 920.0, "EUR", "Salary", date(2025, 3, 1)),
            txn(TransactionKind::Expense, 100.0, "USD", "Food", date(2025, 3, 31)),
            txn(TransactionKind::Expense, 500.0, "USD", "Food", date(2025, 2, 28)),
            txn(TransactionKind::Expense, 500.0, "USD", "Food", date(2024, 3, 15)),
        ];
        let summary = SummaryService::monthly_summary(&txns, march(), &usd(), 200.0);
        assert!((summary.income - 1000.0).abs() < 1e-9);
        assert_eq!(summary.expense, 100.0);
        assert!((summary.balance - 900.0).abs() < 1e-9);
        assert_eq!(summary.budget.display_percent, 50.0);
        assert_eq!(summary.transaction_count, 2);
    }

    #[test]
    fn trend_covers_six_months_oldest_first_across_years() {
        let txns = vec![
            txn(TransactionKind::Expense, 10.4, "USD", "Food", date(2024, 10, 3)),
            txn(TransactionKind::Expense, 20.5, "USD", "Food", date(2025, 3, 3)),
        ];
        let trend = SummaryService::spending_trend(&txns, march(), &usd());
        let labels: Vec<&str> = trend.iter().map(TrendPoint::label).collect();
        assert_eq!(labels, ["Oct", "Nov", "Dec", "Jan", "Feb", "Mar"]);
        assert_eq!(trend[0].month, MonthKey::new(2024, 10).unwrap());
        assert_eq!(trend[0].rounded_expense(), 10.0);
        assert_eq!(trend[5].rounded_expense(), 21.0);
        assert_eq!(trend[3].expense, 0.0);
    }

    #[test]
    fn daily_report_has_one_entry_per_day() {
        let txns = vec![
            txn(TransactionKind::Expense, 150.0, "USD", "Food", date(2024, 2, 29)),
            txn(TransactionKind::Expense, 60.0, "USD", "Food", date(2024, 2, 29)),
            txn(TransactionKind::Expense, 200.0, "USD", "Food", date(2024, 2, 1)),
            txn(TransactionKind::Income, 900.0, "USD", "Salary", date(2024, 2, 2)),
        ];
        let report = SummaryService::daily_spending(&txns, MonthKey::new(2024, 2).unwrap(), &usd());
        assert_eq!(report.days.len(), 29);
        assert_eq!(report.days[28].amount, 210.0);
        assert!(report.days[28].is_high_spending());
        assert!(!report.days[0].is_high_spending());
        assert_eq!(report.days[1].amount, 0.0);
        assert_eq!(report.peak().map(|d| d.day), Some(29));
        assert_eq!(report.total(), 410.0);
    }

    #[test]
    fn month_key_parsing_and_offsets() {
        assert_eq!("2025-03".parse::<MonthKey>(), Ok(march()));
        assert!("2025-13".parse::<MonthKey>().is_err());
        assert!("march".parse::<MonthKey>().is_err());
        assert_eq!(march().offset(-3), MonthKey::new(2024, 12).unwrap());
        assert_eq!(march().offset(10), MonthKey::new(2026, 1).unwrap());
        assert_eq!(march().to_string(), "2025-03");
        assert_eq!(MonthKey::new(2023, 2).unwrap().days_in_month(), 28);
        assert_eq!(MonthKey::new(2000, 2).unwrap().days_in_month(), 29);
    }
}
