// src/mail/gmail.rs

use serde::Deserialize;
use serde_json::json;
use std::error::Error;
use std::fmt;

const DEFAULT_API_BASE: &str = "https://gmail.googleapis.com/gmail/v1";

#[derive(Debug)]
pub enum DeliveryError {
    /// 401 from the API: the bearer token is no longer accepted. The
    /// caller must invalidate the cache and may retry exactly once.
    AuthExpired,
    /// The API rejected the message (any other non-2xx).
    Rejected(String),
    /// Network-level failure before a status was obtained.
    Transport(String),
}

impl fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryError::AuthExpired => write!(f, "Delivery token expired"),
            DeliveryError::Rejected(msg) => write!(f, "Delivery rejected: {msg}"),
            DeliveryError::Transport(msg) => write!(f, "Delivery transport error: {msg}"),
        }
    }
}

impl Error for DeliveryError {}

/// Seam the orchestrator sends through, so batch tests can substitute a
/// fake without a network.
pub trait MessageSender {
    /// Send one transport-encoded message; returns the provider-assigned
    /// message ID.
    fn send(&self, token: &str, raw: &str) -> Result<String, DeliveryError>;
}

#[derive(Deserialize)]
struct SendResponse {
    id: String,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

pub struct GmailClient {
    client: reqwest::blocking::Client,
    api_base: String,
}

impl GmailClient {
    pub fn new() -> Self {
        Self::with_base(DEFAULT_API_BASE)
    }

    pub fn with_base(api_base: impl Into<String>) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            api_base: api_base.into(),
        }
    }
}

impl Default for GmailClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageSender for GmailClient {
    fn send(&self, token: &str, raw: &str) -> Result<String, DeliveryError> {
        let resp = self
            .client
            .post(format!("{}/users/me/messages/send", self.api_base))
            .bearer_auth(token)
            .json(&json!({ "raw": raw }))
            .send()
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            return resp
                .json::<SendResponse>()
                .map(|r| r.id)
                .map_err(|e| DeliveryError::Transport(format!("bad send response: {e}")));
        }

        if status.as_u16() == 401 {
            return Err(DeliveryError::AuthExpired);
        }

        let body = resp.text().unwrap_or_else(|_| "(no body)".to_string());
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .map(|b| b.error.message)
            .unwrap_or(body);
        Err(DeliveryError::Rejected(message))
    }
}
