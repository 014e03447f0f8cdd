use tracing::warn;

use crate::currency::CurrencyCode;
use crate::ledger::Ledger;

use super::{validate_amount, ServiceError, ServiceResult};

/// Partial settings change; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsUpdate {
    pub currency: Option<CurrencyCode>,
    pub monthly_budget: Option<f64>,
}

impl SettingsUpdate {
    pub fn is_empty(&self) -> bool {
        self.currency.is_none() && self.monthly_budget.is_none()
    }
}

pub struct SettingsService;

impl SettingsService {
    pub fn apply(ledger: &mut Ledger, update: SettingsUpdate) -> ServiceResult<()> {
        if let Some(budget) = update.monthly_budget {
            validate_amount("Monthly budget", budget)?;
        }
        if let Some(currency) = &update.currency {
            if currency.is_empty() {
                return Err(ServiceError::Invalid("Currency code cannot be empty".into()));
            }
            if !currency.is_known() {
                warn!(currency = %currency, "currency has no known rate; amounts will convert 1:1 with USD");
            }
        }

        if let Some(currency) = update.currency {
            ledger.settings.currency = currency;
        }
        if let Some(budget) = update.monthly_budget {
            ledger.settings.monthly_budget = budget;
        }
        Ok(())
    }
}
