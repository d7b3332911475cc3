//! Homework status API: the source trait and its HTTP client.

pub mod validate;

pub use validate::{check_response, StatusResponse};

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::debug;

use crate::error::PollError;

/// Anything that can answer "what changed since `from_date`".
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Fetch the raw decoded payload for submissions updated after `from_date`.
    async fn fetch(&self, from_date: i64) -> Result<Value, PollError>;
}

/// HTTP client for the homework status endpoint.
///
/// One GET per call, no retries; the poll loop is the retry mechanism.
pub struct PracticumClient {
    endpoint: String,
    token: String,
    client: Client,
}

impl PracticumClient {
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            endpoint: endpoint.into(),
            token: token.into(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn connectivity(&self, from_date: i64, source: reqwest::Error) -> PollError {
        PollError::Connectivity {
            endpoint: self.endpoint.clone(),
            authorization: "OAuth ***".to_string(),
            from_date,
            source,
        }
    }
}

#[async_trait]
impl StatusSource for PracticumClient {
    async fn fetch(&self, from_date: i64) -> Result<Value, PollError> {
        let response = self
            .client
            .get(&self.endpoint)
            .header("Authorization", format!("OAuth {}", self.token))
            .query(&[("from_date", from_date)])
            .send()
            .await
            .map_err(|e| self.connectivity(from_date, e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(PollError::ApiUnavailable {
                status: status.as_u16(),
                endpoint: self.endpoint.clone(),
                from_date,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.connectivity(from_date, e))?;

        let payload: Value = serde_json::from_slice(&body).map_err(|e| PollError::ResponseFormat {
            detail: format!("ответ не в формате json: {}", e),
        })?;

        if let Some(envelope) = upstream_error(&payload) {
            return Err(PollError::ResponseFormat {
                detail: format!("API вернул ошибку: {}", envelope),
            });
        }

        debug!(from_date, "status API answered");
        Ok(payload)
    }
}

/// The upstream API reports its own failures as an object with `code`
/// and/or `error`; render whichever are present.
fn upstream_error(payload: &Value) -> Option<String> {
    let map = payload.as_object()?;
    let parts: Vec<String> = ["code", "error"]
        .iter()
        .filter_map(|key| map.get(*key).map(|v| format!("{}={}", key, v)))
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}
