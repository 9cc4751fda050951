//! Client for the payments provider's hosted checkout and portal.
//!
//! The provider owns the whole payment state machine; this service only
//! creates hosted sessions and reads subscription state back. Requests are
//! form-encoded and authenticated with the account's secret key.

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use crate::models::PlanTier;

#[derive(Clone)]
pub struct BillingService {
    base_url: String,
    secret_key: String,
    http_client: reqwest::Client,
}

/// Hosted session returned by the provider; the client is redirected to `url`.
#[derive(Debug, Clone, Deserialize)]
pub struct HostedSession {
    pub id: String,
    pub url: String,
}

/// Subscription state as reported by the provider.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSubscription {
    pub id: String,
    pub status: String,
    pub current_period_end: Option<i64>,
}

impl BillingService {
    pub fn new(base_url: String, secret_key: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            secret_key,
            http_client: reqwest::Client::new(),
        }
    }

    /// Read configuration from environment variables.
    pub fn from_env() -> Self {
        let base_url = std::env::var("BILLING_BASE_URL")
            .unwrap_or_else(|_| "https://api.stripe.com".to_string());
        let secret_key = std::env::var("BILLING_SECRET_KEY").unwrap_or_default();
        Self::new(base_url, secret_key)
    }

    /// Price id configured for a paid plan.
    pub fn price_id_for_plan(plan: PlanTier) -> Option<String> {
        let var = match plan {
            PlanTier::Free => return None,
            PlanTier::Starter => "BILLING_PRICE_STARTER",
            PlanTier::Pro => "BILLING_PRICE_PRO",
        };
        std::env::var(var).ok()
    }

    /// Build the form parameters for a checkout session request.
    pub fn checkout_params(
        customer_email: &str,
        price_id: &str,
        success_url: &str,
        cancel_url: &str,
    ) -> Vec<(String, String)> {
        vec![
            ("mode".to_string(), "subscription".to_string()),
            ("customer_email".to_string(), customer_email.to_string()),
            ("line_items[0][price]".to_string(), price_id.to_string()),
            ("line_items[0][quantity]".to_string(), "1".to_string()),
            ("success_url".to_string(), success_url.to_string()),
            ("cancel_url".to_string(), cancel_url.to_string()),
        ]
    }

    /// Create a hosted checkout session for a paid plan.
    pub async fn create_checkout_session(
        &self,
        customer_email: &str,
        price_id: &str,
        success_url: &str,
        cancel_url: &str,
    ) -> Result<HostedSession> {
        let params = Self::checkout_params(customer_email, price_id, success_url, cancel_url);

        let response = self
            .http_client
            .post(format!("{}/v1/checkout/sessions", self.base_url))
            .bearer_auth(&self.secret_key)
            .form(&params)
            .send()
            .await
            .context("Failed to send checkout session request")?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "Checkout session creation failed: {}",
                error_text
            ));
        }

        let session: HostedSession = response
            .json()
            .await
            .context("Failed to parse checkout session response")?;

        info!("Created checkout session {}", session.id);
        Ok(session)
    }

    /// Create a hosted billing portal session for an existing customer.
    pub async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> Result<HostedSession> {
        let params = [("customer", customer_id), ("return_url", return_url)];

        let response = self
            .http_client
            .post(format!("{}/v1/billing_portal/sessions", self.base_url))
            .bearer_auth(&self.secret_key)
            .form(&params)
            .send()
            .await
            .context("Failed to send portal session request")?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "Portal session creation failed: {}",
                error_text
            ));
        }

        let session: HostedSession = response
            .json()
            .await
            .context("Failed to parse portal session response")?;

        info!("Created portal session {}", session.id);
        Ok(session)
    }

    /// Fetch the first subscription for a customer, if any.
    pub async fn fetch_subscription(
        &self,
        customer_id: &str,
    ) -> Result<Option<ProviderSubscription>> {
        #[derive(Deserialize)]
        struct SubscriptionList {
            data: Vec<ProviderSubscription>,
        }

        let response = self
            .http_client
            .get(format!("{}/v1/subscriptions", self.base_url))
            .bearer_auth(&self.secret_key)
            .query(&[("customer", customer_id), ("limit", "1")])
            .send()
            .await
            .context("Failed to fetch subscriptions")?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Subscription fetch failed: {}", error_text));
        }

        let list: SubscriptionList = response
            .json()
            .await
            .context("Failed to parse subscription list response")?;

        Ok(list.data.into_iter().next())
    }
}
