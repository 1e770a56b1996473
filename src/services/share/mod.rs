// Remote share client
//
// Thin client for the external snapshot backend: push a full schedule,
// get an id back; fetch an id, get the schedule back. The backend is a
// black box (identifier generation, payload limits, expiry are its
// problem); this client only validates that what comes back has the
// schedule document shape. One attempt per user action, no retries.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::models::schedule::Schedule;

const SHARE_PATH: &str = "/server/api/share.php";
const LOAD_PATH: &str = "/server/api/load.php";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Error)]
pub enum ShareError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("response is not a schedule document")]
    InvalidPayload,
}

/// Envelope the backend wraps share/error responses in.
#[derive(Debug, Deserialize)]
struct ShareResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

pub struct ShareClient {
    client: Client,
    base_url: String,
}

impl ShareClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ShareError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Publish a read-only snapshot; returns the backend-assigned id.
    pub fn share(&self, schedule: &Schedule) -> Result<String, ShareError> {
        let url = format!("{}{}", self.base_url, SHARE_PATH);
        log::debug!("Sharing schedule to {}", url);

        let response = self.client.post(&url).json(schedule).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(ShareError::Server {
                status: status.as_u16(),
                message: extract_error_message(response),
            });
        }

        let body: ShareResponse = response.json()?;
        match body.id {
            Some(id) if body.success => Ok(id),
            _ => Err(ShareError::InvalidPayload),
        }
    }

    /// Fetch a previously shared snapshot by id.
    pub fn load(&self, id: &str) -> Result<Schedule, ShareError> {
        let url = format!("{}{}", self.base_url, LOAD_PATH);
        log::debug!("Loading shared schedule {} from {}", id, url);

        let response = self.client.get(&url).query(&[("id", id)]).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(ShareError::Server {
                status: status.as_u16(),
                message: extract_error_message(response),
            });
        }

        let value: serde_json::Value = response.json()?;
        Schedule::from_json_value(value).ok_or(ShareError::InvalidPayload)
    }
}

fn extract_error_message(response: reqwest::blocking::Response) -> String {
    response
        .json::<ShareResponse>()
        .ok()
        .and_then(|body| body.error)
        .unwrap_or_else(|| "request failed".to_string())
}
