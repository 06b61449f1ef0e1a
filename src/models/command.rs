use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A classified voice command. Every transcript maps to exactly one of these.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Command {
    Cancellation,
    Confirmation,
    Number(u32),
    Date(NaiveDate),
    /// Zero-padded 24-hour `HH:MM`.
    Time(String),
    Unknown,
}

impl Command {
    pub fn kind(&self) -> &'static str {
        match self {
            Command::Cancellation => "cancellation",
            Command::Confirmation => "confirmation",
            Command::Number(_) => "number",
            Command::Date(_) => "date",
            Command::Time(_) => "time",
            Command::Unknown => "unknown",
        }
    }
}
