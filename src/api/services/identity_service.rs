//! Client for the hosted identity provider.
//!
//! Authentication itself is delegated: this service only builds the
//! authorize redirect and exchanges the callback code for a provider
//! session, then reads the user record from the provider.

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Clone)]
pub struct IdentityService {
    base_url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    http_client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[allow(dead_code)]
    token_type: String,
    #[allow(dead_code)]
    expires_in: Option<i64>,
}

/// User record as reported by the identity provider.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderUser {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl IdentityService {
    pub fn new(
        base_url: String,
        client_id: String,
        client_secret: String,
        redirect_uri: String,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client_id,
            client_secret,
            redirect_uri,
            http_client: reqwest::Client::new(),
        }
    }

    /// Read configuration from environment variables.
    pub fn from_env() -> Self {
        let base_url = std::env::var("AUTH_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:9999/auth/v1".to_string());
        let client_id = std::env::var("AUTH_CLIENT_ID").unwrap_or_default();
        let client_secret = std::env::var("AUTH_CLIENT_SECRET").unwrap_or_default();
        let redirect_uri = std::env::var("AUTH_REDIRECT_URI")
            .unwrap_or_else(|_| "http://localhost:8081/api/v1/auth/callback".to_string());
        Self::new(base_url, client_id, client_secret, redirect_uri)
    }

    /// Build the authorize URL the user is redirected to.
    ///
    /// Security: the caller should pass a cryptographically random,
    /// server-validated CSRF token as `state`.
    pub fn authorize_url(&self, state: &str) -> String {
        format!(
            "{}/authorize?client_id={}&redirect_uri={}&response_type=code&state={}",
            self.base_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(state)
        )
    }

    /// Exchange an authorization code for a provider access token.
    pub async fn exchange_code(&self, code: &str) -> Result<String> {
        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", self.redirect_uri.as_str()),
        ];

        let response = self
            .http_client
            .post(format!("{}/token", self.base_url))
            .header("Accept", "application/json")
            .form(&params)
            .send()
            .await
            .context("Failed to send token request to identity provider")?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "Identity provider code exchange failed: {}",
                error_text
            ));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .context("Failed to parse identity provider token response")?;

        Ok(token_response.access_token)
    }

    /// Fetch the authenticated user's record from the provider.
    pub async fn fetch_user(&self, access_token: &str) -> Result<ProviderUser> {
        let response = self
            .http_client
            .get(format!("{}/user", self.base_url))
            .header("Authorization", format!("Bearer {}", access_token))
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to fetch user from identity provider")?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "Identity provider user API failed: {}",
                error_text
            ));
        }

        let user: ProviderUser = response
            .json()
            .await
            .context("Failed to parse identity provider user response")?;

        Ok(user)
    }
}
