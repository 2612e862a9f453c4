use std::future::Future;
use std::time::Duration;

use anyhow::{Error, Result, anyhow};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::{config::Config, models::retry::RetryConfig, utils::retry_with_backoff};

/// Resolves a role name to the ordered list of member email addresses.
pub trait RecipientResolver: Send + Sync {
    fn emails_for_role(&self, role: &str) -> impl Future<Output = Result<Vec<String>, Error>> + Send;
}

#[derive(Debug, Deserialize)]
struct RoleEmails {
    emails: Vec<String>,
}

/// Role lookup against the user service, with retry and backoff. The service
/// returns members in a stable order and records are enqueued in that order.
pub struct HttpRecipientResolver {
    http_client: Client,
    base_url: String,
    retry_config: RetryConfig,
}

impl HttpRecipientResolver {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|_| anyhow!("Failed to create HTTP client"))?;

        info!(base_url = %config.user_service_url, "Recipient resolver initialized");

        Ok(Self {
            http_client,
            base_url: config.user_service_url.clone(),
            retry_config: config.retry_config(),
        })
    }

    async fn fetch_with_retry(
        http_client: Client,
        retry_config: RetryConfig,
        url: String,
    ) -> Result<Vec<String>, Error> {
        retry_with_backoff(&retry_config, || {
            let url_clone = url.clone();
            let client = http_client.clone();

            async move {
                let response = client
                    .get(&url_clone)
                    .send()
                    .await
                    .map_err(|e| e.to_string())?;

                let status = response.status();

                if status.is_success() {
                    let role: RoleEmails = response
                        .json()
                        .await
                        .map_err(|e| format!("Failed to parse role members JSON: {}", e))?;
                    Ok(role.emails)
                } else {
                    Err(format!("User service returned status {}", status))
                }
            }
        })
        .await
        .map_err(|e| anyhow!("Failed to resolve role members: {}", e))
    }
}

impl RecipientResolver for HttpRecipientResolver {
    async fn emails_for_role(&self, role: &str) -> Result<Vec<String>, Error> {
        let url = format!("{}/api/v1/roles/{}/emails", self.base_url, role);

        debug!(role, "Resolving notification recipients");

        Self::fetch_with_retry(self.http_client.clone(), self.retry_config.clone(), url).await
    }
}
