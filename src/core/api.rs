//! Property backend abstractions

use crate::core::property::{NewProperty, Property};
use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

/// Why a create-property call did not produce a stored property.
#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("Failed to reach the property API: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("Property API rejected the submission with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("Failed to parse created property: {source}. Response: '{body}'")]
    Decode {
        #[source]
        source: serde_json::Error,
        body: String,
    },
}

#[async_trait]
pub trait PropertyApi: Send + Sync {
    async fn create_property(&self, property: &NewProperty) -> Result<Property, SubmissionError>;

    async fn list_properties(&self) -> Result<Vec<Property>>;

    async fn get_property(&self, id: &str) -> Result<Property>;

    /// Removes a stored property and returns the backend's confirmation message.
    async fn delete_property(&self, id: &str) -> Result<String>;
}
