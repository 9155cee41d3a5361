// # HTTP IP Source
//
// This crate provides the address resolver for the DDNS system.
//
// ## Architecture
//
// Issues a single GET to an address-echo service (e.g. api.ipify.org,
// ifconfig.me/ip, icanhazip.com) whose body is the caller's public address as
// bare text. No JSON, no caching, no polling: one request per `current()`.

use ddns_core::traits::IpSource;
use ddns_core::{Error, Result};

use std::net::Ipv4Addr;
use std::time::Duration;

/// Default HTTP timeout for the echo request
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Echo-service-based IP source
#[derive(Debug, Clone)]
pub struct HttpIpSource {
    /// URL to fetch the address from
    url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a new HTTP IP source
    ///
    /// # Parameters
    ///
    /// - `url`: URL to fetch the address from (e.g., "https://api.ipify.org")
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(url, DEFAULT_HTTP_TIMEOUT)
    }

    /// Create with a custom request timeout
    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::network_with("Failed to build HTTP client", e))?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }

    /// Fetch the current address from the echo service
    async fn fetch_ip(&self) -> Result<Ipv4Addr> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::network_with(format!("Request to {} failed", self.url), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::network(format!(
                "{} answered HTTP {}",
                self.url, status
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::network_with(format!("Failed to read body from {}", self.url), e))?;

        let text = String::from_utf8(bytes.to_vec())
            .map_err(|_| Error::InvalidAddress(String::from_utf8_lossy(&bytes).into_owned()))?;
        let text = text.trim();

        text.parse::<Ipv4Addr>()
            .map_err(|_| Error::InvalidAddress(text.to_string()))
    }
}

#[async_trait::async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self) -> Result<Ipv4Addr> {
        let ip = self.fetch_ip().await?;
        tracing::debug!("{} reports {}", self.url, ip);
        Ok(ip)
    }

    fn source_name(&self) -> String {
        self.url.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    async fn source_for(server: &MockServer) -> HttpIpSource {
        HttpIpSource::new(format!("{}/ip", server.uri())).unwrap()
    }

    #[tokio::test]
    async fn test_plain_text_address() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ip"))
            .respond_with(ResponseTemplate::new(200).set_body_string("203.0.113.42\n"))
            .expect(1)
            .mount(&server)
            .await;

        let ip = source_for(&server).await.current().await.unwrap();
        assert_eq!(ip, Ipv4Addr::new(203, 0, 113, 42));
    }

    #[tokio::test]
    async fn test_non_success_status_is_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ip"))
            .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
            .mount(&server)
            .await;

        let err = source_for(&server).await.current().await.unwrap_err();
        assert!(matches!(err, Error::Network { .. }), "got {err:?}");
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_ipv6_answer_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ip"))
            .respond_with(ResponseTemplate::new(200).set_body_string("2001:db8::7"))
            .mount(&server)
            .await;

        let err = source_for(&server).await.current().await.unwrap_err();
        assert!(matches!(err, Error::InvalidAddress(ref s) if s == "2001:db8::7"));
    }

    #[tokio::test]
    async fn test_html_answer_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ip"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>captive portal</html>"))
            .mount(&server)
            .await;

        let err = source_for(&server).await.current().await.unwrap_err();
        assert!(matches!(err, Error::InvalidAddress(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        // Nothing listens on port 1
        let source =
            HttpIpSource::with_timeout("http://127.0.0.1:1/ip", Duration::from_secs(2)).unwrap();

        let err = source.current().await.unwrap_err();
        assert!(matches!(err, Error::Network { source: Some(_), .. }), "got {err:?}");
    }

    #[test]
    fn test_source_name_is_url() {
        let source = HttpIpSource::new("https://api.ipify.org").unwrap();
        assert_eq!(source.source_name(), "https://api.ipify.org");
    }
}
