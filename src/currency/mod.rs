//! Currency catalogue, static USD-relative exchange rates, and amount formatting.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// ISO 4217 currency representation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` when the code appears in the currency catalogue.
    pub fn is_known(&self) -> bool {
        lookup(self.as_str()).is_some()
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::new("USD")
    }
}

impl From<String> for CurrencyCode {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for CurrencyCode {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<CurrencyCode> for String {
    fn from(value: CurrencyCode) -> Self {
        value.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Catalogue entry for a selectable currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrencyInfo {
    pub code: &'static str,
    pub name: &'static str,
    pub symbol: &'static str,
}

const fn info(code: &'static str, name: &'static str, symbol: &'static str) -> CurrencyInfo {
    CurrencyInfo { code, name, symbol }
}

/// Selectable currencies, ordered by code.
pub const CURRENCIES: &[CurrencyInfo] = &[
    info("AED", "United Arab Emirates Dirham", "AED"),
    info("AFN", "Afghan Afghani", "Af"),
    info("ALL", "Albanian Lek", "L"),
    info("AMD", "Armenian Dram", "֏"),
    info("ARS", "Argentine Peso", "$"),
    info("AUD", "Australian Dollar", "A$"),
    info("BRL", "Brazilian Real", "R$"),
    info("CAD", "Canadian Dollar", "C$"),
    info("CHF", "Swiss Franc", "CHF"),
    info("CLP", "Chilean Peso", "$"),
    info("CNY", "Chinese Yuan", "¥"),
    info("COP", "Colombian Peso", "$"),
    info("CZK", "Czech Koruna", "Kč"),
    info("DKK", "Danish Krone", "kr"),
    info("EGP", "Egyptian Pound", "E£"),
    info("EUR", "Euro", "€"),
    info("GBP", "British Pound Sterling", "£"),
    info("HKD", "Hong Kong Dollar", "HK$"),
    info("HUF", "Hungarian Forint", "Ft"),
    info("IDR", "Indonesian Rupiah", "Rp"),
    info("ILS", "Israeli New Shekel", "₪"),
    info("INR", "Indian Rupee", "₹"),
    info("ISK", "Icelandic Króna", "kr"),
    info("JPY", "Japanese Yen", "¥"),
    info("KRW", "South Korean Won", "₩"),
    info("MXN", "Mexican Peso", "$"),
    info("MYR", "Malaysian Ringgit", "RM"),
    info("NOK", "Norwegian Krone", "kr"),
    info("NZD", "New Zealand Dollar", "NZ$"),
    info("PHP", "Philippine Peso", "₱"),
    info("PLN", "Polish Złoty", "zł"),
    info("RUB", "Russian Ruble", "₽"),
    info("SAR", "Saudi Riyal", "SR"),
    info("SEK", "Swedish Krona", "kr"),
    info("SGD", "Singapore Dollar", "S$"),
    info("THB", "Thai Baht", "฿"),
    info("TRY", "Turkish Lira", "₺"),
    info("TWD", "New Taiwan Dollar", "NT$"),
    info("USD", "United States Dollar", "$"),
    info("VND", "Vietnamese Đồng", "₫"),
    info("ZAR", "South African Rand", "R"),
];

/// Units of each currency per one US dollar. Codes missing here are pegged 1:1 to USD.
static USD_RATES: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    HashMap::from([
        ("USD", 1.0),
        ("EUR", 0.92),
        ("GBP", 0.79),
        ("INR", 83.50),
        ("JPY", 151.00),
        ("AUD", 1.52),
        ("CAD", 1.36),
        ("CHF", 0.91),
        ("CNY", 7.23),
        ("HKD", 7.83),
        ("NZD", 1.66),
        ("SGD", 1.35),
        ("KRW", 1350.00),
        ("AED", 3.67),
        ("ZAR", 18.80),
    ])
});

/// Finds the catalogue entry for `code`.
pub fn lookup(code: &str) -> Option<&'static CurrencyInfo> {
    CURRENCIES.iter().find(|entry| entry.code == code)
}

/// Display symbol for `code`, falling back to the code itself.
pub fn symbol_for(code: &str) -> &str {
    lookup(code).map(|entry| entry.symbol).unwrap_or(code)
}

/// USD-relative multiplier for `code`; unknown codes (and unusable rates) read as 1.0.
pub fn rate_for(code: &str) -> f64 {
    match USD_RATES.get(code) {
        Some(rate) if rate.is_finite() && *rate != 0.0 => *rate,
        _ => 1.0,
    }
}

/// Re-expresses `amount` from one currency in another through the USD-relative table.
///
/// Identical codes return the input untouched so no rounding drift is introduced.
pub fn convert_amount(amount: f64, from: &str, to: &str) -> f64 {
    if from == to {
        return amount;
    }
    (amount / rate_for(from)) * rate_for(to)
}

/// Renders `<symbol><grouped amount with two decimals>`, e.g. `$1,234.50`.
pub fn format_currency(amount: f64, code: &str) -> String {
    format!("{}{}", symbol_for(code), format_number(amount, 2))
}

/// Formats `value` with a fixed number of decimals and comma thousands separators.
pub fn format_number(value: f64, precision: usize) -> String {
    let body = format!("{:.*}", precision, value);
    if !value.is_finite() {
        return body;
    }
    match body.split_once('.') {
        Some((int_part, fraction)) => format!("{}.{}", group_signed(int_part), fraction),
        None => group_signed(&body),
    }
}

fn group_signed(int_part: &str) -> String {
    match int_part.strip_prefix('-') {
        Some(digits) => format!("-{}", group_digits(digits, ',')),
        None => group_digits(int_part, ','),
    }
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (count, ch) in digits.chars().rev().enumerate() {
        if count != 0 && count % 3 == 0 {
            grouped.insert(0, separator);
        }
        grouped.insert(0, ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_zero_and_grouped_amounts() {
        assert_eq!(format_currency(0.0, "USD"), "$0.00");
        assert_eq!(format_currency(1234.5, "USD"), "$1,234.50");
        assert_eq!(format_currency(1_234_567.891, "EUR"), "€1,234,567.89");
        assert_eq!(format_currency(999.999, "GBP"), "£1,000.00");
    }

    #[test]
    fn negative_amounts_keep_sign_after_symbol() {
        assert_eq!(format_currency(-1234.5, "USD"), "$-1,234.50");
        assert_eq!(format_number(-12.0, 2), "-12.00");
    }

    #[test]
    fn unknown_symbol_falls_back_to_code() {
        assert_eq!(symbol_for("XYZ"), "XYZ");
        assert_eq!(format_currency(5.0, "XYZ"), "XYZ5.00");
    }

    #[test]
    fn converting_to_same_currency_is_exact() {
        for amount in [0.0, 0.1, 1234.5678, 1e12, 3.0_f64.sqrt()] {
            assert_eq!(convert_amount(amount, "INR", "INR"), amount);
            assert_eq!(convert_amount(amount, "XYZ", "XYZ"), amount);
        }
    }

    #[test]
    fn converts_through_usd_rates() {
        let converted = convert_amount(100.0, "INR", "EUR");
        assert!((converted - 100.0 / 83.50 * 0.92).abs() < 1e-12);
        assert!((converted - 1.1018).abs() < 1e-4);
    }

    #[test]
    fn round_trip_returns_original_within_tolerance() {
        let codes = ["USD", "EUR", "GBP", "INR", "JPY", "KRW", "ZAR", "XYZ"];
        for from in codes {
            for to in codes {
                let amount = 987.65;
                let back = convert_amount(convert_amount(amount, from, to), to, from);
                assert!((back - amount).abs() < 1e-9, "{from} -> {to} drifted: {back}");
            }
        }
    }

    #[test]
    fn unknown_codes_are_pegged_to_usd() {
        assert_eq!(rate_for("BRL"), 1.0);
        assert_eq!(convert_amount(50.0, "BRL", "USD"), 50.0);
        assert!((convert_amount(50.0, "BRL", "EUR") - 46.0).abs() < 1e-9);
    }

    #[test]
    fn currency_code_normalises_case() {
        let code: CurrencyCode = serde_json::from_str("\" eur \"").unwrap();
        assert_eq!(code.as_str(), "EUR");
        assert!(code.is_known());
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"EUR\"");
    }

    #[test]
    fn catalogue_is_sorted_by_code() {
        let codes: Vec<_> = CURRENCIES.iter().map(|entry| entry.code).collect();
        let mut sorted = codes.clone();
        sorted.sort();
        assert_eq!(codes, sorted);
    }
}
