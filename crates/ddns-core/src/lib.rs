// # ddns-core
//
// Core library for the Spaceship dynamic DNS updater.
//
// ## Architecture Overview
//
// This library provides the core functionality for one reconciliation run:
// - **IpSource**: Trait for resolving the current public IPv4 address
// - **DnsProvider**: Trait for listing, upserting and deleting DNS records
// - **reconcile**: Pure diff between desired and observed A records
// - **DdnsEngine**: Orchestrates resolve → list → reconcile → mutate
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from implementations
// 2. **Provider is the source of truth**: No local state survives a run
// 3. **Single attempt**: No retries; the external scheduler re-runs us
// 4. **Library-First**: All core functionality can be used as a library

pub mod traits;
pub mod engine;
pub mod reconcile;
pub mod config;
pub mod error;

// Re-export core types for convenience
pub use traits::{IpSource, DnsProvider, DnsRecord, RecordType, ProviderResponse};
pub use engine::{DdnsEngine, MutationKind, MutationOutcome, RunReport};
pub use reconcile::{reconcile, DesiredState, ReconciliationPlan, DEFAULT_TTL};
pub use config::{Credentials, DdnsConfig, EndpointConfig, EngineConfig, Target};
pub use error::{Error, Result};
