//! Gift request DTO and validation rules.

use serde::{Deserialize, Serialize};

use crate::currency::{self, Currency};
use crate::errors::AppError;

const MAX_INTERESTS: usize = 5;

/// Accepted gender labels (English and Korean forms).
const GENDER_LABELS: &[&str] = &["male", "female", "neutral", "남성", "여성", "중성"];

/// A gift recommendation request as posted by the form wizard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GiftRequest {
    pub recipient_age: u32,
    pub recipient_gender: String,
    pub relationship: String,
    pub budget_min: i64,
    pub budget_max: i64,
    /// Currency of the budget range. Defaults to USD for older clients.
    #[serde(default)]
    pub currency: Currency,
    pub interests: Vec<String>,
    pub occasion: String,
    #[serde(default)]
    pub personal_style: Option<String>,
    #[serde(default)]
    pub restrictions: Option<Vec<String>>,
}

impl GiftRequest {
    /// Validates field-level invariants. Returns 400-class errors on violation.
    pub fn validate(&self) -> Result<(), AppError> {
        if !(1..=120).contains(&self.recipient_age) {
            return Err(AppError::Validation(
                "recipient_age must be between 1 and 120".to_string(),
            ));
        }
        if !GENDER_LABELS.contains(&self.recipient_gender.as_str()) {
            return Err(AppError::Validation(format!(
                "recipient_gender must be one of: {}",
                GENDER_LABELS.join(", ")
            )));
        }
        if self.budget_min < 0 {
            return Err(AppError::Validation(
                "budget_min must not be negative".to_string(),
            ));
        }
        if self.budget_max <= self.budget_min {
            return Err(AppError::Validation(
                "budget_max must be greater than budget_min".to_string(),
            ));
        }
        if !currency::validate_amount(self.budget_max, self.currency) {
            return Err(AppError::Validation(format!(
                "budget_max is implausible for {:?}",
                self.currency
            )));
        }
        if self.interests.is_empty() || self.interests.len() > MAX_INTERESTS {
            return Err(AppError::Validation(format!(
                "interests must contain between 1 and {MAX_INTERESTS} entries"
            )));
        }
        if self.interests.iter().any(|i| i.trim().is_empty()) {
            return Err(AppError::Validation(
                "interests cannot contain empty strings".to_string(),
            ));
        }
        if self.occasion.trim().is_empty() {
            return Err(AppError::Validation(
                "occasion cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Interests with surrounding whitespace stripped.
    pub fn trimmed_interests(&self) -> Vec<String> {
        self.interests
            .iter()
            .map(|i| i.trim().to_string())
            .filter(|i| !i.is_empty())
            .collect()
    }

    /// Budget maximum normalized to USD.
    pub fn budget_max_usd(&self) -> i64 {
        currency::convert(self.budget_max, self.currency, Currency::Usd)
    }

    /// Budget maximum normalized to KRW (what the shopping search filters on).
    pub fn budget_max_krw(&self) -> i64 {
        currency::convert(self.budget_max, self.currency, Currency::Krw)
    }
}
