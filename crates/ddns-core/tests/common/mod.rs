//! Test doubles and common utilities for engine contract tests
//!
//! These doubles record every call so tests can assert on ordering and on
//! which calls were (not) made.

#![allow(dead_code)]

use ddns_core::error::{Error, Result};
use ddns_core::traits::{DnsProvider, DnsRecord, IpSource, ProviderResponse};
use ddns_core::{Credentials, DdnsConfig, Target};
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// An IpSource that returns a fixed address, or fails
pub struct StaticIpSource {
    result: std::result::Result<Ipv4Addr, String>,
    call_count: Arc<AtomicUsize>,
}

impl StaticIpSource {
    pub fn new(ip: Ipv4Addr) -> Self {
        Self {
            result: Ok(ip),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A source whose lookup always fails with a network error
    pub fn unreachable() -> Self {
        Self {
            result: Err("connection refused".to_string()),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get the number of times current() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Create a new StaticIpSource that shares counters with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            result: other.result.clone(),
            call_count: Arc::clone(&other.call_count),
        }
    }
}

#[async_trait::async_trait]
impl IpSource for StaticIpSource {
    async fn current(&self) -> Result<Ipv4Addr> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.result.clone().map_err(Error::network)
    }

    fn source_name(&self) -> String {
        "static".to_string()
    }
}

/// A provider call as seen by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List(String),
    Upsert(DnsRecord),
    Delete(DnsRecord),
}

/// A mock DnsProvider backed by an in-memory record set
///
/// Successful upserts and deletes modify the record set, so a second run
/// observes the effect of the first.
pub struct MockDnsProvider {
    records: Arc<Mutex<Vec<DnsRecord>>>,
    calls: Arc<Mutex<Vec<Call>>>,
    list_failure: Option<(u16, String)>,
    failing_delete_addresses: Vec<String>,
    fail_upsert: bool,
}

impl MockDnsProvider {
    pub fn new(records: Vec<DnsRecord>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
            calls: Arc::new(Mutex::new(Vec::new())),
            list_failure: None,
            failing_delete_addresses: Vec::new(),
            fail_upsert: false,
        }
    }

    /// Make list_records() answer with the given status and body
    pub fn with_list_failure(mut self, status: u16, body: &str) -> Self {
        self.list_failure = Some((status, body.to_string()));
        self
    }

    /// Make delete_record() fail for records with this address
    pub fn with_failing_delete(mut self, address: &str) -> Self {
        self.failing_delete_addresses.push(address.to_string());
        self
    }

    /// Make upsert_record() fail
    pub fn with_failing_upsert(mut self) -> Self {
        self.fail_upsert = true;
        self
    }

    /// Every call made so far, in order
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of upsert/delete calls made so far
    pub fn mutation_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| !matches!(c, Call::List(_)))
            .count()
    }

    /// Current provider-side record set
    pub fn records(&self) -> Vec<DnsRecord> {
        self.records.lock().unwrap().clone()
    }

    /// Create a new MockDnsProvider that shares state with an existing one
    pub fn sharing_state_with(other: &Self) -> Self {
        Self {
            records: Arc::clone(&other.records),
            calls: Arc::clone(&other.calls),
            list_failure: other.list_failure.clone(),
            failing_delete_addresses: other.failing_delete_addresses.clone(),
            fail_upsert: other.fail_upsert,
        }
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn list_records(&self, domain: &str) -> Result<Vec<DnsRecord>> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::List(domain.to_string()));

        if let Some((status, body)) = &self.list_failure {
            return Err(Error::provider(*status, body.clone()));
        }
        Ok(self.records())
    }

    async fn upsert_record(&self, _domain: &str, record: &DnsRecord) -> Result<ProviderResponse> {
        self.calls.lock().unwrap().push(Call::Upsert(record.clone()));

        if self.fail_upsert {
            return Err(Error::provider(422, r#"{"detail":"rejected"}"#));
        }
        self.records.lock().unwrap().push(record.clone());
        Ok(ProviderResponse::new(204, ""))
    }

    async fn delete_record(&self, _domain: &str, record: &DnsRecord) -> Result<ProviderResponse> {
        self.calls.lock().unwrap().push(Call::Delete(record.clone()));

        if self.failing_delete_addresses.contains(&record.address) {
            return Err(Error::provider(500, "internal error"));
        }
        self.records.lock().unwrap().retain(|r| r != record);
        Ok(ProviderResponse::new(204, ""))
    }

    fn upsert_payload(&self, record: &DnsRecord) -> serde_json::Value {
        serde_json::json!({ "upsert": record.to_string() })
    }

    fn delete_payload(&self, record: &DnsRecord) -> serde_json::Value {
        serde_json::json!({ "delete": record.to_string() })
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Shorthand for an observed A record
pub fn a_record(name: &str, address: &str) -> DnsRecord {
    DnsRecord::a(name, address, Some(3600))
}

/// Helper to create a minimal DdnsConfig for testing
pub fn minimal_config(name: &str) -> DdnsConfig {
    DdnsConfig::new(
        Credentials::new("test-key", "test-secret"),
        Target::new("example.com", name),
    )
}
