use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Date format used for persisted entries and CSV exports (`YYYY/MM/DD`)
pub const DATE_FORMAT: &str = "%Y/%m/%d";

/// Stable identifier for an entry.
///
/// `EntryId(0)` is never handed out; it marks records written before ids
/// existed and is replaced when the ledger is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub u64);

impl EntryId {
    pub fn is_assigned(&self) -> bool {
        self.0 != 0
    }

    /// The id after this one, `None` once the id space is used up
    pub fn next(&self) -> Option<Self> {
        self.0.checked_add(1).map(EntryId)
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub id: EntryId,
    #[serde(alias = "desc")]
    pub description: String,
    pub amount: f64,
    #[serde(with = "slash_date")]
    pub date: NaiveDate,
}

impl Entry {
    /// Date as shown in the list and written to exports
    pub fn date_display(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }
}

mod slash_date {
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    use super::DATE_FORMAT;

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(DATE_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let s = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&s, DATE_FORMAT).map_err(de::Error::custom)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Please enter both a description and an amount")]
    MissingField,

    #[error("Amount must be a number: {0}")]
    NotANumber(String),

    #[error("Amount must be greater than 0")]
    NotPositive,
}

/// User input that has passed validation and can be added to the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryInput {
    description: String,
    amount: f64,
}

impl EntryInput {
    /// Validate raw form input. Both fields are trimmed first.
    pub fn parse(description: &str, amount: &str) -> Result<Self, ValidationError> {
        let description = description.trim();
        let amount = amount.trim();

        if description.is_empty() || amount.is_empty() {
            return Err(ValidationError::MissingField);
        }

        let value: f64 = amount
            .parse()
            .map_err(|_| ValidationError::NotANumber(amount.to_string()))?;

        // "inf" and "NaN" parse fine but are not amounts
        if !value.is_finite() {
            return Err(ValidationError::NotANumber(amount.to_string()));
        }
        if value <= 0.0 {
            return Err(ValidationError::NotPositive);
        }

        Ok(Self {
            description: description.to_string(),
            amount: value,
        })
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub(crate) fn into_entry(self, id: EntryId, date: NaiveDate) -> Entry {
        Entry {
            id,
            description: self.description,
            amount: self.amount,
            date,
        }
    }
}
