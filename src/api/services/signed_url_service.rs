//! Client for the managed object store's signed-URL endpoint.
//!
//! Private attachment files are never streamed through this API; callers get
//! a time-limited link issued by the storage service instead.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Default link lifetime in seconds.
pub const DEFAULT_EXPIRES_IN: u64 = 3600;

/// Upper bound accepted by the storage provider (7 days).
pub const MAX_EXPIRES_IN: u64 = 7 * 24 * 3600;

#[derive(Clone)]
pub struct SignedUrlService {
    base_url: String,
    service_key: String,
    bucket: String,
    http_client: reqwest::Client,
}

/// A time-limited access link for a private object.
#[derive(Debug, Clone, Serialize)]
pub struct SignedUrl {
    pub url: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct SignResponse {
    #[serde(rename = "signedURL")]
    signed_url: String,
}

impl SignedUrlService {
    pub fn new(base_url: String, service_key: String, bucket: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key,
            bucket,
            http_client: reqwest::Client::new(),
        }
    }

    /// Read configuration from environment variables.
    pub fn from_env() -> Self {
        let base_url = std::env::var("STORAGE_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:9999/storage/v1".to_string());
        let service_key = std::env::var("STORAGE_SERVICE_KEY").unwrap_or_default();
        let bucket =
            std::env::var("STORAGE_BUCKET").unwrap_or_else(|_| "attachments".to_string());
        Self::new(base_url, service_key, bucket)
    }

    /// Clamp a requested lifetime to the provider's accepted range.
    pub fn clamp_expiry(expires_in: Option<u64>) -> u64 {
        expires_in
            .unwrap_or(DEFAULT_EXPIRES_IN)
            .clamp(1, MAX_EXPIRES_IN)
    }

    /// Ask the storage service to sign a private object path.
    pub async fn create_signed_url(
        &self,
        storage_path: &str,
        expires_in: Option<u64>,
    ) -> Result<SignedUrl> {
        let expires_in = Self::clamp_expiry(expires_in);

        let response = self
            .http_client
            .post(format!(
                "{}/object/sign/{}/{}",
                self.base_url, self.bucket, storage_path
            ))
            .bearer_auth(&self.service_key)
            .json(&serde_json::json!({ "expiresIn": expires_in }))
            .send()
            .await
            .context("Failed to send sign request to storage service")?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Storage sign request failed: {}", error_text));
        }

        let signed: SignResponse = response
            .json()
            .await
            .context("Failed to parse storage sign response")?;

        // The service returns a path relative to its base URL
        let url = if signed.signed_url.starts_with("http") {
            signed.signed_url
        } else {
            format!(
                "{}/{}",
                self.base_url,
                signed.signed_url.trim_start_matches('/')
            )
        };

        Ok(SignedUrl {
            url,
            expires_at: Utc::now() + Duration::seconds(expires_in as i64),
        })
    }
}
