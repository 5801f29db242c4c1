use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use super::SessionId;
use crate::error::{DietError, Result};

pub const MAX_NAME_LENGTH: usize = 200;
pub const MAX_DESCRIPTION_LENGTH: usize = 5_000;
/// Largest representable distance from the epoch, in either direction (±100,000,000 days).
pub const MAX_INSTANT_MILLIS: i64 = 8_640_000_000_000_000;

/// Validate the user-editable fields of a meal, for both create and update.
pub fn validate_meal_input(input: &MealInput) -> Result<()> {
    let trimmed = input.name.trim();
    if trimmed.is_empty() {
        return Err(DietError::InvalidInput("name cannot be empty".into()));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(DietError::InvalidInput(format!(
            "name exceeds maximum length of {MAX_NAME_LENGTH} characters"
        )));
    }
    if input.description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(DietError::InvalidInput(format!(
            "description exceeds maximum length of {MAX_DESCRIPTION_LENGTH} characters"
        )));
    }
    Ok(())
}

/// A single recorded meal, owned by the session that created it.
///
/// `id` and `owner` are fixed at creation. Everything else is replaced
/// wholesale by an update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    pub id: Uuid,
    pub owner: SessionId,
    pub name: String,
    pub description: String,
    /// Epoch milliseconds.
    pub occurred_at: i64,
    pub is_on_diet: bool,
}

impl Meal {
    pub fn new(owner: SessionId, input: MealInput) -> Self {
        Self {
            id: Uuid::now_v7(),
            owner,
            name: input.name,
            description: input.description,
            occurred_at: input.occurred_at,
            is_on_diet: input.is_on_diet,
        }
    }
}

/// Body of a create or update request.
///
/// `occurredAt` (also accepted as `date`) may be an epoch-millisecond
/// number, an RFC 3339 string or a bare `YYYY-MM-DD` date (UTC midnight).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealInput {
    pub name: String,
    pub description: String,
    #[serde(alias = "date", deserialize_with = "deserialize_epoch_millis")]
    pub occurred_at: i64,
    pub is_on_diet: bool,
}

impl MealInput {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        occurred_at: i64,
        is_on_diet: bool,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            occurred_at,
            is_on_diet,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawInstant {
    Millis(i64),
    Float(f64),
    Text(String),
}

/// Reject instants outside the supported range of ±[`MAX_INSTANT_MILLIS`].
pub fn checked_instant(millis: i64) -> Result<i64> {
    if millis.unsigned_abs() > MAX_INSTANT_MILLIS.unsigned_abs()
        || DateTime::from_timestamp_millis(millis).is_none()
    {
        return Err(DietError::InvalidInput(format!("date {millis} is out of range")));
    }
    Ok(millis)
}

fn checked_float_instant(value: f64) -> Result<i64> {
    if !value.is_finite() || value.abs() > MAX_INSTANT_MILLIS as f64 {
        return Err(DietError::InvalidInput(format!("date {value} is out of range")));
    }
    checked_instant(value.trunc() as i64)
}

/// Parse an instant given as epoch millis (number or numeric string), RFC 3339
/// text, or a plain `YYYY-MM-DD` date taken as UTC midnight.
pub fn parse_instant(text: &str) -> Result<i64> {
    let text = text.trim();
    if let Ok(millis) = text.parse::<i64>() {
        return checked_instant(millis);
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        let millis = date
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp_millis())
            .ok_or_else(|| DietError::InvalidInput(format!("invalid date '{text}'")))?;
        return checked_instant(millis);
    }
    DateTime::parse_from_rfc3339(text)
        .map_err(|e| DietError::InvalidInput(format!("invalid date '{text}': {e}")))
        .and_then(|dt| checked_instant(dt.timestamp_millis()))
}

fn deserialize_epoch_millis<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let millis = match RawInstant::deserialize(deserializer)? {
        RawInstant::Millis(millis) => checked_instant(millis),
        RawInstant::Float(value) => checked_float_instant(value),
        RawInstant::Text(text) => parse_instant(&text),
    };
    millis.map_err(D::Error::custom)
}
