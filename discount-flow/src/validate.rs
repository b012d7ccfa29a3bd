//! Syntax checks for the two values the chat collects.

/// Number of digits in a phone number.
pub const PHONE_DIGITS: usize = 10;

/// True iff `phone` is exactly ten ASCII digits.
pub fn validate_phone(phone: &str) -> bool {
    phone.len() == PHONE_DIGITS && phone.bytes().all(|b| b.is_ascii_digit())
}

/// Parses a bill amount, accepting only finite numbers strictly greater than zero.
pub fn parse_amount(amount: &str) -> Option<f64> {
    amount
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value > 0.0)
}

pub fn validate_amount(amount: &str) -> bool {
    parse_amount(amount).is_some()
}
