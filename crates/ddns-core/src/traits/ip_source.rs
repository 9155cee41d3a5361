// # IP Source Trait
//
// Defines the interface for resolving the caller's current public address.
//
// ## Implementations
//
// - HTTP echo service: `ddns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// let source = ddns_ip_http::HttpIpSource::new("https://api.ipify.org")?;
// let address = source.current().await?;
// ```

use async_trait::async_trait;
use std::net::Ipv4Addr;

/// Trait for IP source implementations
///
/// # Contract
///
/// - One lookup per call; no caching across calls
/// - No retries (the engine treats any failure as fatal for the run)
/// - Only IPv4 is supported
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Get the current public IPv4 address
    ///
    /// # Returns
    ///
    /// - `Ok(Ipv4Addr)`: The current address
    /// - `Err(Error::Network)`: The lookup could not be completed
    /// - `Err(Error::InvalidAddress)`: The service answered with something else
    async fn current(&self) -> Result<Ipv4Addr, crate::Error>;

    /// Where the address comes from (for logging/debugging)
    fn source_name(&self) -> String;
}
