//! Configuration types for the DDNS system
//!
//! This module defines all configuration structures used throughout the crate,
//! plus the flag-or-environment resolution used by the daemon.

use serde::{Deserialize, Serialize};

use crate::reconcile::DEFAULT_TTL;

/// Default address-echo service (returns the caller's IP as plain text)
pub const DEFAULT_IP_ECHO_URL: &str = "https://api.ipify.org";

/// Default Spaceship DNS records endpoint; the domain is appended as a path segment
pub const DEFAULT_PROVIDER_BASE_URL: &str = "https://spaceship.dev/api/v1/dns/records";

/// Number of records requested from the provider in the single listing call
pub const DEFAULT_PAGE_SIZE: u32 = 500;

/// Main DDNS configuration for one run
#[derive(Debug, Clone, Deserialize)]
pub struct DdnsConfig {
    /// Provider API credentials
    pub credentials: Credentials,

    /// Which record set is managed
    pub target: Target,

    /// Where the echo service and the provider live
    #[serde(default)]
    pub endpoints: EndpointConfig,

    /// Optional engine settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl DdnsConfig {
    /// Create a configuration with default endpoints and engine settings
    pub fn new(credentials: Credentials, target: Target) -> Self {
        Self {
            credentials,
            target,
            endpoints: EndpointConfig::default(),
            engine: EngineConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.credentials.validate()?;
        self.target.validate()?;
        self.endpoints.validate()?;
        self.engine.validate()?;
        Ok(())
    }
}

/// Provider API credentials
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose either value.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    /// Sent as `X-API-Key`
    pub api_key: String,
    /// Sent as `X-API-Secret`
    /// ⚠️ NEVER log this value
    pub api_secret: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.api_key.trim().is_empty() {
            return Err(crate::Error::config("API key cannot be empty"));
        }
        if self.api_secret.trim().is_empty() {
            return Err(crate::Error::config("API secret cannot be empty"));
        }
        Ok(())
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<REDACTED>")
            .field("api_secret", &"<REDACTED>")
            .finish()
    }
}

/// The domain/name pair whose A record set is managed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Registered domain, e.g. "example.com"
    pub domain: String,
    /// Record name relative to the domain; "@" is the zone apex
    pub name: String,
}

impl Target {
    pub fn new(domain: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            name: name.into(),
        }
    }

    /// Validate the domain and record name
    pub fn validate(&self) -> Result<(), crate::Error> {
        validate_domain_name(&self.domain)?;
        validate_record_name(&self.name)
    }

    /// Fully-qualified name, for log output
    pub fn fqdn(&self) -> String {
        if self.name == "@" {
            self.domain.clone()
        } else {
            format!("{}.{}", self.name, self.domain)
        }
    }
}

/// External endpoints; injected so tests can point at a mock server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// URL returning the caller's public address as plain text
    #[serde(default = "default_ip_echo_url")]
    pub ip_echo_url: String,

    /// Base of the provider's DNS records API
    #[serde(default = "default_provider_base_url")]
    pub provider_base_url: String,
}

impl EndpointConfig {
    pub fn validate(&self) -> Result<(), crate::Error> {
        validate_http_url("IP echo URL", &self.ip_echo_url)?;
        validate_http_url("provider base URL", &self.provider_base_url)
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            ip_echo_url: default_ip_echo_url(),
            provider_base_url: default_provider_base_url(),
        }
    }
}

fn default_ip_echo_url() -> String {
    DEFAULT_IP_ECHO_URL.to_string()
}

fn default_provider_base_url() -> String {
    DEFAULT_PROVIDER_BASE_URL.to_string()
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// TTL (seconds) given to a newly added A record
    #[serde(default = "default_ttl")]
    pub ttl: u32,

    /// Page size of the single listing request
    ///
    /// Records beyond the first page are not seen by the reconciler.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Compute and log the plan without sending any mutation
    #[serde(default)]
    pub dry_run: bool,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.ttl == 0 {
            return Err(crate::Error::config("TTL must be > 0"));
        }
        if self.page_size == 0 {
            return Err(crate::Error::config("Page size must be > 0"));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ttl: default_ttl(),
            page_size: default_page_size(),
            dry_run: false,
        }
    }
}

fn default_ttl() -> u32 {
    DEFAULT_TTL
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

/// Resolve a required setting from a CLI flag, falling back to an environment variable
///
/// The flag wins when present. Empty or whitespace-only values count as absent.
/// `lookup` is the environment accessor (`|k| std::env::var(k).ok()` in production).
pub fn resolve_setting<F>(
    flag: Option<String>,
    what: &str,
    env_name: &str,
    lookup: F,
) -> Result<String, crate::Error>
where
    F: Fn(&str) -> Option<String>,
{
    resolve_optional(flag, env_name, lookup).ok_or_else(|| {
        crate::Error::config(format!(
            "Please provide a {what} or set {env_name} environment variable"
        ))
    })
}

/// Like [`resolve_setting`], but absence is not an error
pub fn resolve_optional<F>(flag: Option<String>, env_name: &str, lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    flag.filter(|v| !v.trim().is_empty())
        .or_else(|| lookup(env_name).filter(|v| !v.trim().is_empty()))
}

/// Validate that a string is a valid domain name
///
/// This implements basic DNS domain name validation per RFC 1035.
/// It's not comprehensive but catches common errors.
pub fn validate_domain_name(domain: &str) -> Result<(), crate::Error> {
    if domain.is_empty() {
        return Err(crate::Error::config("Domain name cannot be empty"));
    }

    // Total length limit (RFC 1035: 253 chars max)
    if domain.len() > 253 {
        return Err(crate::Error::config(format!(
            "Domain name too long: {} chars (max 253). Got: {}",
            domain.len(),
            domain
        )));
    }

    if !domain.contains('.') {
        return Err(crate::Error::config(format!(
            "Domain name must contain at least one dot. Got: '{}'",
            domain
        )));
    }

    for label in domain.split('.') {
        validate_label(domain, label)?;
    }

    Ok(())
}

/// Validate a record name relative to its domain ("@", "www", "*.dev", ...)
pub fn validate_record_name(name: &str) -> Result<(), crate::Error> {
    if name == "@" {
        return Ok(());
    }
    if name.is_empty() {
        return Err(crate::Error::config(
            "Record name cannot be empty (use \"@\" for the zone apex)",
        ));
    }

    for (i, label) in name.split('.').enumerate() {
        // A leading wildcard label is allowed
        if i == 0 && label == "*" {
            continue;
        }
        validate_label(name, label)?;
    }

    Ok(())
}

fn validate_label(whole: &str, label: &str) -> Result<(), crate::Error> {
    if label.is_empty() {
        return Err(crate::Error::config(format!(
            "Name has empty label: '{}'",
            whole
        )));
    }

    if label.len() > 63 {
        return Err(crate::Error::config(format!(
            "Label too long: {} chars (max 63). Label: '{}'",
            label.len(),
            label
        )));
    }

    if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(crate::Error::config(format!(
            "Label contains invalid characters. Label: '{}'. \
            Valid: alphanumeric, hyphen and underscore only.",
            label
        )));
    }

    if label.starts_with('-') || label.ends_with('-') {
        return Err(crate::Error::config(format!(
            "Label cannot start or end with hyphen. Label: '{}'",
            label
        )));
    }

    Ok(())
}

fn validate_http_url(what: &str, url: &str) -> Result<(), crate::Error> {
    if url.is_empty() {
        return Err(crate::Error::config(format!("{what} cannot be empty")));
    }
    if !url.starts_with("https://") && !url.starts_with("http://") {
        return Err(crate::Error::config(format!(
            "{what} must use HTTP or HTTPS scheme. Got: {url}"
        )));
    }
    Ok(())
}
