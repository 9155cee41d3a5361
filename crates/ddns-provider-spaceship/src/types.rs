//! Spaceship DNS API wire types

use ddns_core::traits::{DnsRecord, RecordType};
use serde::{Deserialize, Serialize};

/// Body of `GET /dns/records/{domain}`
#[derive(Debug, Deserialize)]
pub struct ListRecordsResponse {
    #[serde(default)]
    pub items: Vec<SpaceshipRecord>,
    /// Total number of records in the zone, across all pages
    #[serde(default)]
    pub total: Option<u64>,
}

impl ListRecordsResponse {
    /// Records the zone holds beyond this page, if the API reported a total
    pub fn unlisted(&self) -> Option<u64> {
        self.total
            .map(|total| total.saturating_sub(self.items.len() as u64))
            .filter(|&n| n > 0)
    }
}

/// One record as listed by the API
///
/// Only the fields we act on are kept; type-specific fields of other record
/// types (cname, exchange, value, ...) are ignored.
#[derive(Debug, Deserialize)]
pub struct SpaceshipRecord {
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub ttl: Option<u32>,
}

impl From<SpaceshipRecord> for DnsRecord {
    fn from(record: SpaceshipRecord) -> Self {
        DnsRecord {
            record_type: RecordType::from(record.record_type),
            name: record.name,
            address: record.address.unwrap_or_default(),
            ttl: record.ttl,
        }
    }
}

/// Body of `PUT /dns/records/{domain}`
#[derive(Debug, Serialize)]
pub struct UpsertRecordsRequest<'a> {
    /// Overwrite conflicting records instead of rejecting the request
    pub force: bool,
    pub items: Vec<UpsertItem<'a>>,
}

#[derive(Debug, Serialize)]
pub struct UpsertItem<'a> {
    #[serde(rename = "type")]
    pub record_type: &'a str,
    pub name: &'a str,
    pub address: &'a str,
    pub ttl: u32,
}

/// One element of the `DELETE /dns/records/{domain}` body array
#[derive(Debug, Serialize)]
pub struct DeleteItem<'a> {
    #[serde(rename = "type")]
    pub record_type: &'a str,
    pub name: &'a str,
    pub address: &'a str,
}
