// Validation utilities module
// Custom validation functions for catalogue and booking rules

use regex::Regex;
use rust_decimal::Decimal;
use std::sync::OnceLock;
use validator::ValidationError;

use crate::money::MAX_UNIT_AMOUNT;

fn plan_code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Z][A-Z0-9_]{1,7}$").expect("valid plan code pattern"))
}

/// Validates a meal plan or cancellation policy code
/// Codes are 2-8 characters, uppercase letters, digits or underscores, starting with a letter
pub fn validate_plan_code(code: &str) -> Result<(), ValidationError> {
    if plan_code_pattern().is_match(code) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_plan_code"))
    }
}

/// Validates that a money amount is not negative and at most `MAX_UNIT_AMOUNT`
pub fn validate_non_negative_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        Err(ValidationError::new("amount_must_not_be_negative"))
    } else if *amount > MAX_UNIT_AMOUNT {
        Err(ValidationError::new("amount_too_large"))
    } else {
        Ok(())
    }
}

/// Validates that a nightly rate is strictly positive and at most `MAX_UNIT_AMOUNT`
pub fn validate_positive_rate(rate: &Decimal) -> Result<(), ValidationError> {
    if *rate <= Decimal::ZERO {
        Err(ValidationError::new("rate_must_be_positive"))
    } else if *rate > MAX_UNIT_AMOUNT {
        Err(ValidationError::new("amount_too_large"))
    } else {
        Ok(())
    }
}

/// Validates an optional phone number: digits, spaces, dashes and a leading plus
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    let allowed = phone
        .chars()
        .enumerate()
        .all(|(i, c)| c.is_ascii_digit() || c == ' ' || c == '-' || (c == '+' && i == 0));
    if allowed && (7..=15).contains(&digits) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_phone"))
    }
}
