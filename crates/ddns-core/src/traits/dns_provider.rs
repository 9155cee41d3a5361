// # DNS Provider Trait
//
// Defines the interface for reading and mutating DNS records via provider APIs.
//
// ## Implementations
//
// - Spaceship: `ddns-provider-spaceship` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::{DnsProvider, DnsRecord};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let provider = /* DnsProvider implementation */;
//
//     let records = provider.list_records("example.com").await?;
//     let record = DnsRecord::a("@", "203.0.113.7", Some(1800));
//     let response = provider.upsert_record("example.com", &record).await?;
//     println!("{response}");
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// DNS record type
///
/// Only `A` is acted upon; everything else is carried through verbatim so
/// that it can be recognised and left alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RecordType {
    /// A record (IPv4)
    A,
    /// Any other record type, by its provider spelling (e.g. "AAAA", "CNAME")
    Other(String),
}

impl RecordType {
    pub fn as_str(&self) -> &str {
        match self {
            RecordType::A => "A",
            RecordType::Other(other) => other,
        }
    }
}

impl From<String> for RecordType {
    fn from(value: String) -> Self {
        if value.eq_ignore_ascii_case("A") {
            RecordType::A
        } else {
            RecordType::Other(value)
        }
    }
}

impl From<&str> for RecordType {
    fn from(value: &str) -> Self {
        RecordType::from(value.to_string())
    }
}

impl From<RecordType> for String {
    fn from(value: RecordType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One provider-side DNS record, as observed or as to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsRecord {
    /// Record type
    pub record_type: RecordType,
    /// Name relative to the domain ("@" for the apex)
    pub name: String,
    /// Address literal; empty for record types that carry no address
    pub address: String,
    /// Time-to-live in seconds, when known
    pub ttl: Option<u32>,
}

impl DnsRecord {
    /// Create an A record
    pub fn a(name: impl Into<String>, address: impl Into<String>, ttl: Option<u32>) -> Self {
        Self {
            record_type: RecordType::A,
            name: name.into(),
            address: address.into(),
            ttl,
        }
    }

    pub fn is_a(&self) -> bool {
        self.record_type == RecordType::A
    }
}

impl fmt::Display for DnsRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.record_type, self.name, self.address)?;
        if let Some(ttl) = self.ttl {
            write!(f, " (ttl {ttl})")?;
        }
        Ok(())
    }
}

/// Raw provider answer to a successful call, kept for the audit trail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub body: String,
    /// When the response was received
    pub received_at: DateTime<Utc>,
}

impl ProviderResponse {
    /// Capture a response received now
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            received_at: Utc::now(),
        }
    }
}

/// Renders the audit line: `(UTC) 2024-05-01_12-00-00 HTTP 200 <body>`
impl fmt::Display for ProviderResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(UTC) {} HTTP {} {}",
            self.received_at.format("%Y-%m-%d_%H-%M-%S"),
            self.status,
            self.body
        )
    }
}

/// Trait for DNS provider implementations
///
/// Implementations hold their own credentials and HTTP client, and must be
/// usable across async tasks.
///
/// # Contract
///
/// - One HTTP request per method call
/// - No retry logic or backoff (a failed run is re-run by the scheduler)
/// - No caching beyond a single request; the provider is the source of truth
/// - Every exchange is logged as a [`ProviderResponse`] audit line, success or failure
/// - A non-success status maps to [`crate::Error::Provider`] with the raw status and body
/// - Credentials never appear in logs or errors
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// List the records of a domain (first page only)
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<DnsRecord>)`: Every record on the page, all types
    /// - `Err(Error::Provider)`: Non-success HTTP status
    /// - `Err(Error::Network)`: No HTTP response
    async fn list_records(&self, domain: &str) -> Result<Vec<DnsRecord>, crate::Error>;

    /// Create or overwrite a record (force semantics)
    async fn upsert_record(
        &self,
        domain: &str,
        record: &DnsRecord,
    ) -> Result<ProviderResponse, crate::Error>;

    /// Delete a record identified by type, name and address
    async fn delete_record(
        &self,
        domain: &str,
        record: &DnsRecord,
    ) -> Result<ProviderResponse, crate::Error>;

    /// Request body `upsert_record` would send, for dry-run and audit logging
    fn upsert_payload(&self, record: &DnsRecord) -> serde_json::Value;

    /// Request body `delete_record` would send, for dry-run and audit logging
    fn delete_payload(&self, record: &DnsRecord) -> serde_json::Value;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
