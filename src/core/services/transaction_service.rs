//! Validated CRUD, filtering and paging over ledger transactions.

use std::str::FromStr;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::core::services::{validate_amount, ServiceError, ServiceResult};
use crate::ledger::{Ledger, Transaction, TransactionDraft, TransactionKind};

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Kind selector of the list view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KindFilter {
    #[default]
    All,
    Only(TransactionKind),
}

impl KindFilter {
    pub fn matches(self, kind: TransactionKind) -> bool {
        match self {
            KindFilter::All => true,
            KindFilter::Only(expected) => expected == kind,
        }
    }
}

impl FromStr for KindFilter {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.trim().eq_ignore_ascii_case("all") {
            return Ok(KindFilter::All);
        }
        value
            .parse::<TransactionKind>()
            .map(KindFilter::Only)
            .map_err(|_| format!("unknown type filter `{value}` (expected all, income or expense)"))
    }
}

/// Search, kind and category criteria. All must match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    /// Case-insensitive substring of merchant or notes.
    pub search: Option<String>,
    pub kind: KindFilter,
    /// Exact category name.
    pub category: Option<String>,
}

impl TransactionFilter {
    pub fn matches(&self, txn: &Transaction) -> bool {
        let matches_search = match self.search.as_deref() {
            Some(term) if !term.is_empty() => {
                let needle = term.to_lowercase();
                txn.merchant.to_lowercase().contains(&needle)
                    || txn
                        .notes
                        .as_deref()
                        .map(|notes| notes.to_lowercase().contains(&needle))
                        .unwrap_or(false)
            }
            _ => true,
        };
        let matches_category = match self.category.as_deref() {
            Some(category) => txn.category == category,
            None => true,
        };
        matches_search && self.kind.matches(txn.kind) && matches_category
    }
}

/// One page of a filtered list. `page` is 1-based and always within range.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a> {
    pub items: Vec<&'a Transaction>,
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

impl Page<'_> {
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

pub struct TransactionService;

impl TransactionService {
    pub fn validate(draft: &TransactionDraft) -> ServiceResult<()> {
        validate_amount("Amount", draft.amount)?;
        if let Some(currency) = &draft.currency {
            if currency.is_empty() {
                return Err(ServiceError::Invalid("Currency code cannot be empty".into()));
            }
        }
        Ok(())
    }

    /// Records a new transaction at the front of the list and returns its id.
    pub fn add(ledger: &mut Ledger, draft: TransactionDraft, today: NaiveDate) -> ServiceResult<String> {
        Self::validate(&draft)?;
        let id = Uuid::new_v4().to_string();
        let currency = ledger.settings.currency.clone();
        let txn = draft.into_transaction(id.clone(), today, &currency);
        ledger.transactions.insert(0, txn);
        Ok(id)
    }

    /// Replaces the record `id` wholesale, keeping its id and position.
    pub fn update(
        ledger: &mut Ledger,
        id: &str,
        draft: TransactionDraft,
        today: NaiveDate,
    ) -> ServiceResult<()> {
        Self::validate(&draft)?;
        let currency = ledger.settings.currency.clone();
        let slot = ledger
            .transactions
            .iter_mut()
            .find(|txn| txn.id == id)
            .ok_or_else(|| not_found(id))?;
        *slot = draft.into_transaction(id.to_string(), today, &currency);
        Ok(())
    }

    pub fn remove(ledger: &mut Ledger, id: &str) -> ServiceResult<Transaction> {
        let position = ledger
            .transactions
            .iter()
            .position(|txn| txn.id == id)
            .ok_or_else(|| not_found(id))?;
        Ok(ledger.transactions.remove(position))
    }

    pub fn get<'a>(ledger: &'a Ledger, id: &str) -> ServiceResult<&'a Transaction> {
        ledger.transaction(id).ok_or_else(|| not_found(id))
    }

    /// Matching transactions in stored order.
    pub fn filter<'a>(transactions: &'a [Transaction], filter: &TransactionFilter) -> Vec<&'a Transaction> {
        transactions.iter().filter(|txn| filter.matches(txn)).collect()
    }

    /// Slices `items` into pages of `page_size`, clamping `page` into range.
    pub fn paginate(items: Vec<&Transaction>, page: usize, page_size: usize) -> Page<'_> {
        let page_size = page_size.max(1);
        let total_items = items.len();
        let total_pages = total_items.div_ceil(page_size);
        let page = page.clamp(1, total_pages.max(1));
        let start = (page - 1) * page_size;
        let items = items.into_iter().skip(start).take(page_size).collect();
        Page {
            items,
            page,
            total_pages,
            total_items,
        }
    }

    /// Up to `limit` transactions ordered by date, newest first. Ties keep
    /// stored order.
    pub fn most_recent(transactions: &[Transaction], limit: usize) -> Vec<&Transaction> {
        let mut ordered: Vec<&Transaction> = transactions.iter().collect();
        ordered.sort_by(|a, b| b.date.cmp(&a.date));
        ordered.truncate(limit);
        ordered
    }
}

fn not_found(id: &str) -> ServiceError {
    ServiceError::NotFound(format!("Transaction `{id}` not found"))
}
