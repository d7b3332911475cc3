//! Error taxonomy for the poll cycle and for startup configuration.
//!
//! Every failure inside a cycle is a [`PollError`] variant carrying structured
//! context; the loop catches them all and turns them into a failure notice.
//! [`ConfigError`] is the only fatal kind and never reaches the loop.

use thiserror::Error;

/// Errors raised while fetching, validating or formatting a status update.
#[derive(Debug, Error)]
pub enum PollError {
    /// Transport-level failure (DNS, timeout, connection reset).
    #[error(
        "Ошибка соединения: {source}. ENDPOINT: {endpoint}, headers: {authorization}, params: from_date={from_date}"
    )]
    Connectivity {
        endpoint: String,
        /// Authorization header with the token redacted.
        authorization: String,
        from_date: i64,
        #[source]
        source: reqwest::Error,
    },

    /// The status endpoint answered with something other than HTTP 200.
    #[error(
        "API недоступен. Код ответа {status}, ENDPOINT: {endpoint}, params: from_date={from_date}"
    )]
    ApiUnavailable {
        status: u16,
        endpoint: String,
        from_date: i64,
    },

    /// Body was not JSON, or carried the upstream `code`/`error` envelope.
    #[error("Некорректный ответ API: {detail}")]
    ResponseFormat { detail: String },

    #[error("Неверный тип {field}: ожидался {expected}, а получен {found}")]
    TypeMismatch {
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("В ответе API отсутствует ключ \"{field}\"")]
    MissingField { field: &'static str },

    #[error("Недопустимое значение \"{field}\": {detail}")]
    InvalidValue { field: &'static str, detail: String },

    #[error("Неизвестный статус \"{status}\" в ответе API")]
    UnknownStatus { status: String },
}

impl PollError {
    /// Short machine-friendly name of the error kind, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            PollError::Connectivity { .. } => "connectivity",
            PollError::ApiUnavailable { .. } => "api_unavailable",
            PollError::ResponseFormat { .. } => "response_format",
            PollError::TypeMismatch { .. } => "type_mismatch",
            PollError::MissingField { .. } => "missing_field",
            PollError::InvalidValue { .. } => "invalid_value",
            PollError::UnknownStatus { .. } => "unknown_status",
        }
    }
}

/// Fatal startup errors. The process stops before entering the loop.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Нет токенов {names:?}")]
    MissingTokens { names: Vec<&'static str> },
}

/// Name of the JSON type of `value`, for [`PollError::TypeMismatch`] context.
pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
