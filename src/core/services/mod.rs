pub mod category_service;
pub mod export_service;
pub mod settings_service;
pub mod summary_service;
pub mod transaction_service;

pub use category_service::CategoryService;
pub use export_service::ExportService;
pub use settings_service::{SettingsService, SettingsUpdate};
pub use summary_service::{
    BudgetUtilization, CategoryTotal, DailyReport, DailySpending, MonthKey, MonthlySummary,
    SummaryService, TrendPoint, HIGH_SPENDING_THRESHOLD, TREND_MONTHS,
};
pub use transaction_service::{KindFilter, Page, TransactionFilter, TransactionService};

use crate::errors::LedgerError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("{0}")]
    Invalid(String),
    #[error("{0}")]
    NotFound(String),
}

/// Rejects amounts that cannot be stored or aggregated meaningfully.
pub(crate) fn validate_amount(label: &str, value: f64) -> ServiceResult<()> {
    if !value.is_finite() {
        return Err(ServiceError::Invalid(format!("{label} must be a number")));
    }
    if value < 0.0 {
        return Err(ServiceError::Invalid(format!("{label} cannot be negative")));
    }
    Ok(())
}
