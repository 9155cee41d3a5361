//! Core traits for the DDNS system
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`IpSource`]: Resolve the current public address
//! - [`DnsProvider`]: List, upsert and delete DNS records via provider APIs

pub mod ip_source;
pub mod dns_provider;

pub use ip_source::IpSource;
pub use dns_provider::{DnsProvider, DnsRecord, ProviderResponse, RecordType};
