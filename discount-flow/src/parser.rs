//! Decoding of the discount endpoint's text body.
//!
//! The server answers with entries separated by `"\n ; "`, each shaped like
//! `Key Name: value` with an optional trailing `;`. Entries that do not split
//! into a non-empty key and value are dropped; the parse still succeeds.
//! The value is everything after the first `:`, so `Valid Until: 12:30`
//! keeps `12:30`.

use std::collections::BTreeMap;

use tracing::debug;

/// Separator between entries of a discount response.
pub const ENTRY_DELIMITER: &str = "\n ; ";

/// Substring the server uses to reject an expired or unknown token.
pub const EXPIRED_MARKER: &str = "Not authorized / Token expired";

pub const SESSION_EXPIRED_MESSAGE: &str = "⚠️ Session expired. Please try again!";
pub const INVALID_RESPONSE_MESSAGE: &str = "⚠️ Error: Invalid response from server.";

const ALREADY_DISCOUNTED_NOTE: &str =
    "ℹ️ Note: You've already received a discount this week. Try again next week!";
const POOL_EXHAUSTED_NOTE: &str =
    "ℹ️ Note: The weekly discount pool has been exhausted. Try again next week!";

pub mod field_keys {
    pub const PHONE_NUMBER: &str = "phone_number";
    pub const FINAL_BILL_AMOUNT: &str = "final_bill_amount";
    pub const DISCOUNT_GIVEN: &str = "discount_given";
    pub const HAS_TRANSACTION: &str = "has_transaction";
}

/// True if the body signals that the token is no longer accepted.
pub fn is_token_expired(raw: &str) -> bool {
    raw.contains(EXPIRED_MARKER)
}

/// Normalized fields of one discount response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscountResult {
    fields: BTreeMap<String, String>,
    dropped: Vec<String>,
}

impl DiscountResult {
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    /// Entries that could not be split into a key and value.
    pub fn dropped(&self) -> &[String] {
        &self.dropped
    }

    pub fn phone_number(&self) -> Option<&str> {
        self.field(field_keys::PHONE_NUMBER)
    }

    /// `None` when the field is absent or not a number.
    pub fn final_bill_amount(&self) -> Option<f64> {
        self.field(field_keys::FINAL_BILL_AMOUNT)
            .and_then(|value| value.parse::<f64>().ok())
    }

    /// Discount percentage with any `%` removed, `"0.00"` when absent.
    pub fn discount_given(&self) -> String {
        self.field(field_keys::DISCOUNT_GIVEN)
            .map(|value| value.replace('%', "").trim().to_string())
            .unwrap_or_else(|| "0.00".to_string())
    }

    pub fn has_transaction(&self) -> bool {
        self.field(field_keys::HAS_TRANSACTION) == Some("true")
    }

    /// Human-readable summary shown to the user.
    pub fn to_message(&self) -> String {
        let phone_number = self.phone_number().unwrap_or("N/A");
        let final_bill_amount = self
            .final_bill_amount()
            .map(|amount| format!("{amount:.2}"))
            .unwrap_or_else(|| "N/A".to_string());
        let discount_given = self.discount_given();

        let mut message = format!(
            "🎉 Discount Details:\n- Phone Number: {phone_number}\n- Final Bill Amount: ${final_bill_amount}\n- Discount Given: {discount_given}%"
        );

        if discount_given.parse::<f64>().ok() == Some(0.0) {
            message.push('\n');
            message.push_str(if self.has_transaction() {
                ALREADY_DISCOUNTED_NOTE
            } else {
                POOL_EXHAUSTED_NOTE
            });
        }

        message
    }
}

/// Outcome of decoding a discount response body.
#[derive(Debug, Clone, PartialEq)]
pub enum DiscountReply {
    Expired,
    Invalid,
    Details(DiscountResult),
}

impl DiscountReply {
    pub fn to_message(&self) -> String {
        match self {
            DiscountReply::Expired => SESSION_EXPIRED_MESSAGE.to_string(),
            DiscountReply::Invalid => INVALID_RESPONSE_MESSAGE.to_string(),
            DiscountReply::Details(result) => result.to_message(),
        }
    }
}

/// Lowercases a key and collapses each whitespace run into one underscore.
fn normalize_key(key: &str) -> String {
    key.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

fn parse_entry(entry: &str) -> Option<(String, String)> {
    let cleaned = entry.trim().replace(';', "");
    let (key, value) = cleaned.split_once(':')?;
    let key = normalize_key(key);
    let value = value.trim();
    if key.is_empty() || value.is_empty() {
        return None;
    }
    Some((key, value.to_string()))
}

pub fn parse_discount_response(raw: &str) -> DiscountReply {
    if raw.trim().is_empty() {
        debug!("Empty discount response");
        return DiscountReply::Invalid;
    }
    if is_token_expired(raw) {
        return DiscountReply::Expired;
    }

    let mut result = DiscountResult::default();
    for entry in raw.split(ENTRY_DELIMITER) {
        match parse_entry(entry) {
            Some((key, value)) => {
                debug!(key = %key, value = %value, "Parsed response field");
                result.fields.insert(key, value);
            }
            None => {
                debug!(entry = %entry, "Dropping unparseable response entry");
                result.dropped.push(entry.to_string());
            }
        }
    }

    DiscountReply::Details(result)
}

/// Parses `raw` and renders it in one step.
pub fn format_discount_response(raw: &str) -> String {
    parse_discount_response(raw).to_message()
}
