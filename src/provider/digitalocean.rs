use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};

use super::{DnsProvider, DomainRecord, ProviderError, RecordPage};

const DIGITALOCEAN_API_BASE: &str = "https://api.digitalocean.com/v2";

// The listing is never paginated past this.
pub const RECORDS_PER_PAGE: usize = 1000;

pub struct DigitalOceanClient {
    client: Client,
    token: String,
    base_url: String,
}

impl DigitalOceanClient {
    pub fn new(token: String) -> Self {
        Self::with_base_url(token, DIGITALOCEAN_API_BASE)
    }

    pub fn with_base_url(token: String, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            token,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl DnsProvider for DigitalOceanClient {
    async fn list_records(&self, domain: &str) -> Result<RecordPage, ProviderError> {
        let url = format!("{}/domains/{}/records", self.base_url, domain);
        debug!("Listing records for {}", domain);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .query(&[("per_page", RECORDS_PER_PAGE)])
            .send()
            .await?;

        let body: ListRecordsResponse = check_status(response).await?.json().await?;

        Ok(RecordPage {
            records: body.domain_records,
            total: body.meta.map(|m| m.total),
        })
    }

    async fn edit_record(&self, domain: &str, id: u64, data: &str) -> Result<(), ProviderError> {
        let url = format!("{}/domains/{}/records/{}", self.base_url, domain, id);
        debug!("Editing record {} in {}", id, domain);

        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.token)
            .json(&EditRecordRequest { data })
            .send()
            .await?;

        check_status(response).await?;
        Ok(())
    }
}

async fn check_status(response: Response) -> Result<Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&text)
        .map(|e| format!("{}: {}", e.id, e.message))
        .unwrap_or(text);

    Err(ProviderError::Api {
        status: status.as_u16(),
        message,
    })
}

// DigitalOcean API types

#[derive(Debug, Serialize)]
struct EditRecordRequest<'a> {
    data: &'a str,
}

#[derive(Debug, Deserialize)]
struct ListRecordsResponse {
    #[serde(default)]
    domain_records: Vec<DomainRecord>,
    meta: Option<Meta>,
}

#[derive(Debug, Deserialize)]
struct Meta {
    total: usize,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    id: String,
    message: String,
}
