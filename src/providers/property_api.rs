use crate::core::api::{PropertyApi, SubmissionError};
use crate::core::config::ApiConfig;
use crate::core::property::{NewProperty, Property};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error, warn};

/// Talks to the property backend over HTTP. Requests are single-shot: no
/// retries and no client-side timeout.
pub struct HttpPropertyApi {
    client: reqwest::Client,
    properties_url: String,
}

impl HttpPropertyApi {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("propintake/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            properties_url: config.properties_url(),
        })
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        debug!("Requesting {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {url}"))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to get response text from {url}"))?;

        if !status.is_success() {
            return Err(anyhow!(
                "Property API returned {} for {}: {}",
                status.as_u16(),
                url,
                body
            ));
        }
        if body.trim().is_empty() {
            return Err(anyhow!("Received empty response from {}", url));
        }
        Ok(body)
    }
}

#[async_trait]
impl PropertyApi for HttpPropertyApi {
    async fn create_property(&self, property: &NewProperty) -> Result<Property, SubmissionError> {
        debug!("Posting property '{}' to {}", property.title, self.properties_url);
        let response = self
            .client
            .post(&self.properties_url)
            .json(property)
            .send()
            .await
            .map_err(SubmissionError::Transport)?;

        let status = response.status();
        let body = response.text().await.map_err(SubmissionError::Transport)?;

        if !status.is_success() {
            return Err(SubmissionError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|source| {
            error!(error = ?source, response = %body, "Failed to parse created property");
            SubmissionError::Decode { source, body }
        })
    }

    async fn list_properties(&self) -> Result<Vec<Property>> {
        let body = self.get_text(&self.properties_url).await?;
        let records: Vec<serde_json::Value> = serde_json::from_str(&body).with_context(|| {
            format!("Failed to parse property list. Response: '{body}'")
        })?;

        let total = records.len();
        let properties: Vec<Property> = records
            .into_iter()
            .filter_map(|record| match serde_json::from_value::<Property>(record.clone()) {
                Ok(property) => Some(property),
                Err(e) => {
                    warn!(error = %e, record = %record, "Skipping unreadable property record");
                    None
                }
            })
            .collect();
        debug!("Fetched {} of {} properties", properties.len(), total);
        Ok(properties)
    }

    async fn get_property(&self, id: &str) -> Result<Property> {
        let url = format!("{}/{}", self.properties_url, id);
        let body = self.get_text(&url).await?;
        serde_json::from_str(&body)
            .with_context(|| format!("Failed to parse property {id}. Response: '{body}'"))
    }

    async fn delete_property(&self, id: &str) -> Result<String> {
        let url = format!("{}/{}", self.properties_url, id);
        debug!("Deleting {}", url);
        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {url}"))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to get response text from {url}"))?;

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(anyhow!("Property not found: {id}"));
        }
        if !status.is_success() {
            return Err(anyhow!(
                "Property API returned {} for {}: {}",
                status.as_u16(),
                url,
                body
            ));
        }

        let message = serde_json::from_str::<DeleteResponse>(&body)
            .map(|response| response.message)
            .unwrap_or_else(|_| "Property deleted".to_string());
        Ok(message)
    }
}

#[derive(Deserialize)]
struct DeleteResponse {
    message: String,
}
