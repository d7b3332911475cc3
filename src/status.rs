//! Review verdicts and the status-change message sent to the chat.

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::PollError;

/// Review status code of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Approved,
    Reviewing,
    Rejected,
}

impl Verdict {
    /// Human-readable verdict text shown in the chat.
    pub fn text(self) -> &'static str {
        match self {
            Verdict::Approved => "Работа проверена: ревьюеру всё понравилось. Ура!",
            Verdict::Reviewing => "Работа взята на проверку ревьюером.",
            Verdict::Rejected => "Работа проверена: у ревьюера есть замечания.",
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Verdict::Approved => "approved",
            Verdict::Reviewing => "reviewing",
            Verdict::Rejected => "rejected",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Verdict {
    type Err = PollError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approved" => Ok(Verdict::Approved),
            "reviewing" => Ok(Verdict::Reviewing),
            "rejected" => Ok(Verdict::Rejected),
            other => Err(PollError::UnknownStatus {
                status: other.to_string(),
            }),
        }
    }
}

/// A single submission entry with its name and a known verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRecord {
    pub homework_name: String,
    pub status: Verdict,
}

impl StatusRecord {
    /// Extract a record from one element of `homeworks`.
    ///
    /// `homework_name` must be present (`MissingField`) and a string
    /// (`InvalidValue` for `null` or any other type). `status` must be one of
    /// the known codes; anything else, including absence, is `UnknownStatus`.
    pub fn from_map(homework: &Map<String, Value>) -> Result<Self, PollError> {
        let homework_name = match homework.get("homework_name") {
            None => {
                return Err(PollError::MissingField {
                    field: "homework_name",
                })
            }
            Some(Value::String(name)) => name.clone(),
            Some(Value::Null) => {
                return Err(PollError::InvalidValue {
                    field: "homework_name",
                    detail: "значение отсутствует (null)".to_string(),
                })
            }
            Some(other) => {
                return Err(PollError::InvalidValue {
                    field: "homework_name",
                    detail: format!("ожидалась строка, а получено {}", other),
                })
            }
        };

        let status = match homework.get("status") {
            Some(Value::String(code)) => code.parse::<Verdict>()?,
            Some(other) => {
                return Err(PollError::UnknownStatus {
                    status: other.to_string(),
                })
            }
            None => {
                return Err(PollError::UnknownStatus {
                    status: "null".to_string(),
                })
            }
        };

        Ok(Self {
            homework_name,
            status,
        })
    }

    /// Render the status-change notification for this record.
    pub fn message(&self) -> String {
        format!(
            "Изменился статус проверки работы \"{}\": {}",
            self.homework_name,
            self.status.text()
        )
    }
}

/// Validate one `homeworks` element and render its notification text.
pub fn parse_status(homework: &Map<String, Value>) -> Result<String, PollError> {
    let record = StatusRecord::from_map(homework)?;
    let message = record.message();
    debug!(
        homework = %record.homework_name,
        status = %record.status,
        "homework status processed"
    );
    Ok(message)
}
