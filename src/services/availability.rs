// src/services/availability.rs
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::env;
use thiserror::Error;
use tracing::{debug, warn};

/// Default API base for the hosted mailbox endpoints.
pub const DEFAULT_API_BASE_URL: &str = "https://public-api.wordpress.com";

const FALLBACK_UNAVAILABLE_MESSAGE: &str = "This name is not available.";

#[derive(Debug, Error)]
pub enum AvailabilityError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),
}

/// Outcome of a mailbox availability lookup.
///
/// A non-success HTTP status is not a transport error: the service answered,
/// the name is taken or rejected, and the service's own message is surfaced
/// to the user verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MailboxAvailability {
    Available,
    Unavailable { status: u16, message: String },
}

/// Remote "is this mailbox name free on this domain" check.
#[async_trait]
pub trait AvailabilityCheck: Send + Sync {
    async fn check_mailbox(
        &self,
        domain: &str,
        mailbox: &str,
    ) -> Result<MailboxAvailability, AvailabilityError>;
}

/// Titan-backed availability client.
///
/// `GET {base}/wpcom/v2/emails/titan/{domain}/check-mailbox-availability/{mailbox}`
/// HTTP 200 means the name is available; any other status means unavailable,
/// with the response body's `message` field carried into the user-facing error.
pub struct TitanAvailabilityService {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct AvailabilityResponseBody {
    message: Option<String>,
}

impl TitanAvailabilityService {
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

    fn availability_url(&self, domain: &str, mailbox: &str) -> String {
        format!(
            "{}/wpcom/v2/emails/titan/{}/check-mailbox-availability/{}",
            self.base_url,
            urlencoding::encode(domain),
            urlencoding::encode(mailbox)
        )
    }
}

#[async_trait]
impl AvailabilityCheck for TitanAvailabilityService {
    async fn check_mailbox(
        &self,
        domain: &str,
        mailbox: &str,
    ) -> Result<MailboxAvailability, AvailabilityError> {
        let url = self.availability_url(domain, mailbox);
        debug!(domain = %domain, mailbox = %mailbox, "Checking mailbox availability");

        let response = self.client.get(&url).send().await.map_err(|e| {
            warn!(error = %e, "Mailbox availability request failed");
            AvailabilityError::RequestFailed(e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(MailboxAvailability::Available);
        }

        // Non-success responses carry a human-readable reason in the body;
        // fall back to a generic message when the body is missing or malformed.
        let message = response
            .json::<AvailabilityResponseBody>()
            .await
            .ok()
            .and_then(|body| body.message)
            .unwrap_or_else(|| FALLBACK_UNAVAILABLE_MESSAGE.to_string());

        debug!(status = status.as_u16(), message = %message, "Mailbox name unavailable");
        Ok(MailboxAvailability::Unavailable {
            status: status.as_u16(),
            message,
        })
    }
}
