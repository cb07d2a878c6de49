pub mod digitalocean;
#[cfg(test)]
pub mod fake;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// A record as stored by the DNS provider.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DomainRecord {
    pub id: u64,
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    pub data: String,
}

/// One page of records for a domain.
#[derive(Debug, Default)]
pub struct RecordPage {
    pub records: Vec<DomainRecord>,
    /// Total number of records the provider reports for the domain.
    pub total: Option<usize>,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request to DNS provider failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("DNS provider returned {status}: {message}")]
    Api { status: u16, message: String },
}

impl ProviderError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProviderError::Api { status: 404, .. })
    }
}

#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Fetches the first page of records for `domain`.
    async fn list_records(&self, domain: &str) -> Result<RecordPage, ProviderError>;

    /// Sets the value of record `id` in `domain` to `data`.
    async fn edit_record(&self, domain: &str, id: u64, data: &str) -> Result<(), ProviderError>;
}
