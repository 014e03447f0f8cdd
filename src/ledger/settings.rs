use serde::{Deserialize, Serialize};

use crate::currency::CurrencyCode;

pub const DEFAULT_MONTHLY_BUDGET: f64 = 3000.0;

/// User preferences: display currency and the monthly budget expressed in it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub currency: CurrencyCode,
    pub monthly_budget: f64,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            currency: CurrencyCode::default(),
            monthly_budget: DEFAULT_MONTHLY_BUDGET,
        }
    }
}
