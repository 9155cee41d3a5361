// # Spaceship DNS Provider
//
// This crate provides the Spaceship (https://www.spaceship.com/) DNS provider
// implementation for the DDNS system.
//
// ## Contract
//
// - One HTTP request per trait call
// - Full error propagation: non-success status → `Error::Provider { status, body }`
// - Every exchange is logged as `(UTC) <timestamp> HTTP <status> <body>`
// - No retry, backoff or caching; a failed run is re-run by the scheduler
// - Only the first page of records is read (`take`/`skip`)
//
// ## Security Requirements
//
// - API key and secret NEVER appear in logs or errors
// - Provider MUST fail fast if either is empty
//
// ## API Reference
//
// - List records:   GET    `{base}/{domain}?take=500&skip=0`
// - Upsert records: PUT    `{base}/{domain}`  body `{"force": true, "items": [...]}`
// - Delete records: DELETE `{base}/{domain}`  body `[{"type", "name", "address"}]`
//
// Authentication is by `X-API-Key` / `X-API-Secret` headers.

mod types;

use async_trait::async_trait;
use ddns_core::traits::{DnsProvider, DnsRecord, ProviderResponse};
use ddns_core::{Credentials, DdnsConfig, Error, Result, DEFAULT_TTL};
use reqwest::RequestBuilder;
use std::time::Duration;

use crate::types::{DeleteItem, ListRecordsResponse, UpsertItem, UpsertRecordsRequest};

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Spaceship DNS provider
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the credentials.
pub struct SpaceshipProvider {
    /// API key and secret
    /// ⚠️ NEVER log these values
    credentials: Credentials,

    /// Records endpoint without the domain segment
    base_url: String,

    /// `take` parameter of the listing request
    page_size: u32,

    /// HTTP client for API requests
    client: reqwest::Client,
}

impl std::fmt::Debug for SpaceshipProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpaceshipProvider")
            .field("credentials", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .field("page_size", &self.page_size)
            .finish()
    }
}

impl SpaceshipProvider {
    /// Create a new Spaceship provider
    ///
    /// # Parameters
    ///
    /// - `credentials`: API key and secret with DNS read/write permission
    /// - `base_url`: Records endpoint, e.g. `https://spaceship.dev/api/v1/dns/records`
    /// - `page_size`: Number of records requested by `list_records`
    pub fn new(credentials: Credentials, base_url: impl Into<String>, page_size: u32) -> Result<Self> {
        credentials.validate()?;

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::network_with("Failed to build HTTP client", e))?;

        Ok(Self {
            credentials,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            page_size,
            client,
        })
    }

    /// Create a provider from the run configuration
    pub fn from_config(config: &DdnsConfig) -> Result<Self> {
        Self::new(
            config.credentials.clone(),
            config.endpoints.provider_base_url.clone(),
            config.engine.page_size,
        )
    }

    fn records_url(&self, domain: &str) -> String {
        format!("{}/{}", self.base_url, domain)
    }

    /// Attach credentials, send, and turn the answer into a logged exchange
    async fn execute(&self, request: RequestBuilder, action: &str) -> Result<ProviderResponse> {
        let response = request
            .header("X-API-Key", &self.credentials.api_key)
            .header("X-API-Secret", &self.credentials.api_secret)
            .send()
            .await
            .map_err(|e| Error::network_with(format!("{action}: HTTP request failed"), e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::network_with(format!("{action}: failed to read response"), e))?;

        let exchange = ProviderResponse::new(status.as_u16(), body);

        if status.is_success() {
            tracing::info!("{}", exchange);
            return Ok(exchange);
        }

        tracing::error!("{}", exchange);
        if let Some(hint) = status_hint(exchange.status) {
            tracing::warn!("{action}: {hint}");
        }
        Err(Error::provider(exchange.status, exchange.body))
    }
}

/// Operator-facing explanation for common failure statuses
fn status_hint(status: u16) -> Option<&'static str> {
    match status {
        401 | 403 => Some("Authentication failed: check the API key/secret and their DNS permissions"),
        404 => Some("Domain not found in this Spaceship account"),
        422 => Some("Request rejected as invalid by Spaceship"),
        429 => Some("Rate limit exceeded; the next scheduled run will try again"),
        500..=599 => Some("Spaceship server error (transient)"),
        _ => None,
    }
}

#[async_trait]
impl DnsProvider for SpaceshipProvider {
    async fn list_records(&self, domain: &str) -> Result<Vec<DnsRecord>> {
        tracing::debug!("Listing records for {} (take={})", domain, self.page_size);

        let request = self
            .client
            .get(self.records_url(domain))
            .query(&[("take", self.page_size), ("skip", 0)]);

        let exchange = self.execute(request, "list records").await?;
        let listing: ListRecordsResponse = serde_json::from_str(&exchange.body)?;

        if let Some(unlisted) = listing.unlisted() {
            tracing::warn!(
                "{} has {} records beyond the {} listed; they are not reconciled",
                domain,
                unlisted,
                listing.items.len()
            );
        }

        Ok(listing.items.into_iter().map(DnsRecord::from).collect())
    }

    async fn upsert_record(&self, domain: &str, record: &DnsRecord) -> Result<ProviderResponse> {
        let request = self
            .client
            .put(self.records_url(domain))
            .json(&self.upsert_payload(record));

        self.execute(request, "upsert record").await
    }

    async fn delete_record(&self, domain: &str, record: &DnsRecord) -> Result<ProviderResponse> {
        let request = self
            .client
            .delete(self.records_url(domain))
            .json(&self.delete_payload(record));

        self.execute(request, "delete record").await
    }

    fn upsert_payload(&self, record: &DnsRecord) -> serde_json::Value {
        let body = UpsertRecordsRequest {
            force: true,
            items: vec![UpsertItem {
                record_type: record.record_type.as_str(),
                name: &record.name,
                address: &record.address,
                ttl: record.ttl.unwrap_or(DEFAULT_TTL),
            }],
        };
        serde_json::json!(body)
    }

    fn delete_payload(&self, record: &DnsRecord) -> serde_json::Value {
        let body = [DeleteItem {
            record_type: record.record_type.as_str(),
            name: &record.name,
            address: &record.address,
        }];
        serde_json::json!(body)
    }

    fn provider_name(&self) -> &'static str {
        "spaceship"
    }
}
