//! Currency handling: static USD↔KRW conversion and display formatting.
//!
//! The MVP pins the exchange rate; live rates are a deployment concern.

use serde::{Deserialize, Serialize};

/// Static exchange rate used for all USD↔KRW conversion.
pub const USD_TO_KRW_RATE: i64 = 1300;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    #[default]
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "KRW")]
    Krw,
}

/// Converts an amount between USD and KRW at the pinned rate.
pub fn convert(amount: i64, from: Currency, to: Currency) -> i64 {
    match (from, to) {
        (Currency::Usd, Currency::Krw) => amount * USD_TO_KRW_RATE,
        (Currency::Krw, Currency::Usd) => amount / USD_TO_KRW_RATE,
        _ => amount,
    }
}

/// Formats an amount for display: `₩65,000` or `$50`.
pub fn format_amount(amount: i64, currency: Currency) -> String {
    match currency {
        Currency::Krw => format!("₩{}", group_thousands(amount)),
        Currency::Usd => format!("${amount}"),
    }
}

/// Checks an amount against plausible bounds for the currency.
pub fn validate_amount(amount: i64, currency: Currency) -> bool {
    match currency {
        Currency::Usd => (1..=10_000).contains(&amount),
        Currency::Krw => (1_000..=13_000_000).contains(&amount),
    }
}

fn group_thousands(amount: i64) -> String {
    let digits = amount.abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if amount < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}
