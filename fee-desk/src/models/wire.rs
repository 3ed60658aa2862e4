//! Lenient deserializers for values coming from the fee API and the console.
//!
//! The upstream API emits dates either as plain `YYYY-MM-DD` or as full
//! ISO-8601 timestamps, and leaves amounts `null` on older records; operator
//! input sends amounts as strings or numbers depending on the form control.

use chrono::{DateTime, Local, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

/// Parse a calendar date from `YYYY-MM-DD` or an RFC 3339 timestamp.
///
/// Timestamps are converted to the local calendar day, the same day the
/// console shows the operator.
pub fn parse_api_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }

    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Local).date_naive())
}

/// Optional date; `null`, missing, blank and unparseable all map to `None`.
pub fn api_date_opt<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_api_date))
}

/// Amount where `null` means zero.
pub fn amount_or_zero<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Decimal>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawInput {
    Text(String),
    Number(serde_json::Number),
}

/// Keep operator input verbatim, accepting either a JSON string or number.
pub fn raw_input<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<RawInput>::deserialize(deserializer)? {
        Some(RawInput::Text(text)) => text,
        Some(RawInput::Number(number)) => number.to_string(),
        None => String::new(),
    })
}

/// Operator-entered amount where blank or unparseable input counts as zero.
pub fn input_amount<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = raw_input(deserializer)?;
    Ok(parse_amount(&raw).unwrap_or_default())
}

/// Parse a decimal amount typed by an operator (`"1,500.50"` is accepted).
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<Decimal>().ok()
}
