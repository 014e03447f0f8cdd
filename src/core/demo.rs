//! First-run sample transactions.

use chrono::{Duration, NaiveDate};
use uuid::Uuid;

use crate::{
    currency::CurrencyCode,
    ledger::{Category, Transaction, TransactionKind},
};

pub const DEMO_TRANSACTION_COUNT: usize = 40;
pub const DEMO_WINDOW_DAYS: u64 = 90;
pub const DEMO_INCOME_MERCHANT: &str = "Employer";

const MERCHANTS: &[&str] = &[
    "Amazon",
    "Whole Foods",
    "Uber",
    "Starbucks",
    "Shell",
    "Netflix",
    "Target",
    "Local Bakery",
    "Japan Rail",
    "London Tube",
    "Paris Bistro",
];
const PAYMENT_METHODS: &[&str] = &["Card", "Cash", "UPI"];
// Repeated entries weight the draw towards USD.
const CURRENCY_POOL: &[&str] = &["USD", "USD", "USD", "EUR", "GBP", "INR", "JPY"];
const HIGH_DENOMINATION: &[&str] = &["INR", "JPY", "KRW"];
const HIGH_DENOMINATION_SCALE: f64 = 80.0;

/// SplitMix64. Deterministic for a given seed, which is all the sample
/// data needs.
#[derive(Debug, Clone)]
struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `[0, 1)`.
    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, bound: u64) -> u64 {
        (self.next_f64() * bound as f64) as u64
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.below(items.len() as u64) as usize]
    }
}

/// Builds the sample ledger shown on first run.
#[derive(Debug, Clone)]
pub struct DemoDataGenerator {
    rng: SplitMix64,
}

impl DemoDataGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SplitMix64::new(seed),
        }
    }

    /// Seeds from a fresh random UUID.
    pub fn from_entropy() -> Self {
        Self::new(Uuid::new_v4().as_u128() as u64)
    }

    /// `count` transactions dated within the last 90 days of `today`,
    /// newest first. Categories are drawn from `categories` by kind.
    pub fn generate(
        &mut self,
        today: NaiveDate,
        categories: &[Category],
        count: usize,
    ) -> Vec<Transaction> {
        let expense_names = names_for(categories, TransactionKind::Expense);
        let income_names = names_for(categories, TransactionKind::Income);

        let mut data: Vec<Transaction> = (0..count)
            .map(|_| self.one(today, &expense_names, &income_names))
            .collect();
        data.sort_by(|a, b| b.date.cmp(&a.date));
        data
    }

    fn one(&mut self, today: NaiveDate, expenses: &[String], incomes: &[String]) -> Transaction {
        let rng = &mut self.rng;
        let is_income = rng.next_f64() > 0.8;
        let kind = if is_income {
            TransactionKind::Income
        } else {
            TransactionKind::Expense
        };
        let date = today - Duration::days(rng.below(DEMO_WINDOW_DAYS) as i64);
        let currency = *rng.pick(CURRENCY_POOL);

        let mut amount = if is_income {
            (rng.below(2000) + 1000) as f64
        } else {
            (rng.below(200) + 5) as f64
        };
        if HIGH_DENOMINATION.contains(&currency) {
            amount *= HIGH_DENOMINATION_SCALE;
        }

        let pool = if is_income { incomes } else { expenses };
        let category = if pool.is_empty() {
            kind.fallback_category().to_string()
        } else {
            rng.pick(pool).clone()
        };
        let payment_method = rng.pick(PAYMENT_METHODS).to_string();
        let merchant = if is_income {
            DEMO_INCOME_MERCHANT.to_string()
        } else {
            rng.pick(MERCHANTS).to_string()
        };
        let notes = if is_income {
            "Monthly payment"
        } else {
            "Regular purchase"
        };

        Transaction {
            id: Uuid::new_v4().to_string(),
            date,
            kind,
            amount,
            currency: CurrencyCode::new(currency),
            category,
            payment_method,
            merchant,
            notes: Some(notes.to_string()),
        }
    }
}

fn names_for(categories: &[Category], kind: TransactionKind) -> Vec<String> {
    categories
        .iter()
        .filter(|category| category.kind == kind)
        .map(|category| category.name.clone())
        .collect()
}
