// src/services/password_strength.rs
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;
use tracing::{debug, warn};

use super::availability::DEFAULT_API_BASE_URL;

#[derive(Debug, Error)]
pub enum PasswordStrengthError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Unexpected response from password strength service: {0}")]
    UnexpectedResponse(String),
}

/// Remote password acceptability check.
///
/// `Ok(violations)` is the service's verdict: an empty list means the
/// password is acceptable, a non-empty list carries human-readable rule
/// violations to append to the field's error list. `Err` means the check
/// itself could not be completed and is handled as a transport failure,
/// not as a verdict on the password.
#[async_trait]
pub trait PasswordStrengthCheck: Send + Sync {
    async fn assess(&self, password: &str) -> Result<Vec<String>, PasswordStrengthError>;
}

#[derive(Debug, Serialize)]
struct StrengthRequestBody<'a> {
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct StrengthResponseBody {
    success: bool,
    #[serde(default)]
    errors: Vec<String>,
}

/// HTTP client for the password-strength service.
///
/// `POST {base}/wpcom/v2/password-strength` with `{"password": ...}`;
/// responds `{"success": bool, "errors": [...]}`.
pub struct WpcomPasswordStrengthService {
    client: Client,
    base_url: String,
}

impl WpcomPasswordStrengthService {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Build from environment configuration.
    ///
    /// WPCOM_API_BASE_URL - overrides the production API base
    pub fn from_env(client: Client) -> Self {
        let base_url =
            env::var("WPCOM_API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());
        Self::new(client, base_url)
    }
}

#[async_trait]
impl PasswordStrengthCheck for WpcomPasswordStrengthService {
    async fn assess(&self, password: &str) -> Result<Vec<String>, PasswordStrengthError> {
        let url = format!("{}/wpcom/v2/password-strength", self.base_url);
        debug!("Submitting candidate password for strength check");

        let response = self
            .client
            .post(&url)
            .json(&StrengthRequestBody { password })
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Password strength request failed");
                PasswordStrengthError::RequestFailed(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Password strength service returned an error status");
            return Err(PasswordStrengthError::UnexpectedResponse(format!(
                "status {}",
                status.as_u16()
            )));
        }

        let body = response
            .json::<StrengthResponseBody>()
            .await
            .map_err(|e| PasswordStrengthError::UnexpectedResponse(e.to_string()))?;

        if body.success {
            Ok(Vec::new())
        } else {
            debug!(violations = body.errors.len(), "Password rejected by strength service");
            Ok(body.errors)
        }
    }
}
