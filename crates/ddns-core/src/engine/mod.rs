//! Core DDNS engine
//!
//! The DdnsEngine is responsible for one reconciliation run:
//! - Resolving the current address via IpSource
//! - Listing the observed records via DnsProvider
//! - Computing the plan via [`reconcile`](crate::reconcile::reconcile)
//! - Applying deletions, then the addition, via DnsProvider
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐        ┌──────────────┐        ┌─────────────┐
//! │  IpSource   │──ip──▶ │ DdnsEngine   │ ◀─list─│ DnsProvider │
//! └─────────────┘        └──────────────┘        └─────────────┘
//!                                │                      ▲
//!                           reconcile()                 │
//!                                │                      │
//!                                └── delete…, add ──────┘
//! ```
//!
//! ## Failure Policy
//!
//! 1. Address resolution fails → run aborts, no DNS call is made
//! 2. Listing fails → run aborts, no mutation is attempted
//! 3. A mutation fails → recorded in the [`RunReport`], the rest of the plan still runs
//!
//! There is no rollback and no retry; the next scheduled run re-derives the
//! plan from fresh provider state.

use std::fmt;
use std::net::Ipv4Addr;

use crate::config::{DdnsConfig, Target};
use crate::error::{Error, Result};
use crate::reconcile::{reconcile, DesiredState, ReconciliationPlan};
use crate::traits::{DnsProvider, DnsRecord, IpSource, ProviderResponse};
use tracing::{debug, error, info, warn};

/// Which provider call a plan step maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    /// Remove a stale record
    Delete,
    /// Upsert the desired record
    Add,
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MutationKind::Delete => f.write_str("delete"),
            MutationKind::Add => f.write_str("add"),
        }
    }
}

/// Result of one attempted plan step
#[derive(Debug)]
pub enum MutationOutcome {
    /// The provider accepted the call
    Applied {
        kind: MutationKind,
        record: DnsRecord,
        response: ProviderResponse,
    },
    /// The call failed; later steps were still attempted
    Failed {
        kind: MutationKind,
        record: DnsRecord,
        error: Error,
    },
    /// Dry run: the call was logged but not sent
    Skipped { kind: MutationKind, record: DnsRecord },
}

impl MutationOutcome {
    pub fn kind(&self) -> MutationKind {
        match self {
            MutationOutcome::Applied { kind, .. }
            | MutationOutcome::Failed { kind, .. }
            | MutationOutcome::Skipped { kind, .. } => *kind,
        }
    }

    pub fn record(&self) -> &DnsRecord {
        match self {
            MutationOutcome::Applied { record, .. }
            | MutationOutcome::Failed { record, .. }
            | MutationOutcome::Skipped { record, .. } => record,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, MutationOutcome::Failed { .. })
    }
}

/// Everything a completed run did
#[derive(Debug)]
pub struct RunReport {
    /// Address the run converged to
    pub address: Ipv4Addr,
    /// Plan computed from the observed records
    pub plan: ReconciliationPlan,
    /// One entry per attempted plan step, deletions first
    pub outcomes: Vec<MutationOutcome>,
}

impl RunReport {
    /// Steps that failed
    pub fn failures(&self) -> impl Iterator<Item = &MutationOutcome> {
        self.outcomes.iter().filter(|o| o.is_failure())
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    /// True when every step of the plan was applied (or skipped in dry-run)
    pub fn is_success(&self) -> bool {
        self.failure_count() == 0
    }
}

/// Core DDNS engine
///
/// Runs exactly one resolve → list → reconcile → mutate pass per call to
/// [`DdnsEngine::run_once()`]. Every provider call is awaited before the next
/// one starts; nothing runs concurrently.
pub struct DdnsEngine {
    /// IP source for the current address
    ip_source: Box<dyn IpSource>,

    /// DNS provider for reading and mutating records
    provider: Box<dyn DnsProvider>,

    /// Managed domain/name pair
    target: Target,

    /// TTL for added records
    ttl: u32,

    /// Log mutations instead of sending them
    dry_run: bool,
}

impl DdnsEngine {
    /// Create a new DDNS engine
    ///
    /// # Parameters
    ///
    /// - `ip_source`: IP source implementation
    /// - `provider`: DNS provider implementation
    /// - `config`: DDNS configuration (validated here)
    pub fn new(
        ip_source: Box<dyn IpSource>,
        provider: Box<dyn DnsProvider>,
        config: &DdnsConfig,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            ip_source,
            provider,
            target: config.target.clone(),
            ttl: config.engine.ttl,
            dry_run: config.engine.dry_run,
        })
    }

    /// Run one reconciliation pass
    ///
    /// # Returns
    ///
    /// - `Ok(RunReport)`: The plan was computed and every step attempted;
    ///   check [`RunReport::is_success()`] for per-step failures
    /// - `Err(Error)`: Address resolution or listing failed; nothing was mutated
    pub async fn run_once(&self) -> Result<RunReport> {
        let fqdn = self.target.fqdn();

        info!("Resolving current address via {}", self.ip_source.source_name());
        let address = self.ip_source.current().await.inspect_err(|e| {
            error!("Address resolution failed, skipping DNS update: {}", e);
        })?;
        info!("Current address: {}", address);

        let observed = self
            .provider
            .list_records(&self.target.domain)
            .await
            .inspect_err(|e| {
                error!(
                    "Listing records for {} failed, no changes made: {}",
                    self.target.domain, e
                );
            })?;
        debug!(
            "{} returned {} record(s) for {}",
            self.provider.provider_name(),
            observed.len(),
            self.target.domain
        );

        let desired = DesiredState::new(self.target.name.clone(), address);
        let plan = reconcile(&observed, &desired, self.ttl);

        if plan.is_noop() {
            info!("{} already points at {}, nothing to do", fqdn, address);
        } else {
            info!(
                "Plan for {}: {}{}",
                fqdn,
                plan,
                if self.dry_run { " [DRY-RUN]" } else { "" }
            );
        }

        let mut outcomes = Vec::with_capacity(plan.mutation_count());

        // Deletions first, so two A records never coexist if upsert is order-sensitive
        for record in &plan.to_delete {
            outcomes.push(self.apply(MutationKind::Delete, record).await);
        }
        if let Some(record) = &plan.to_add {
            outcomes.push(self.apply(MutationKind::Add, record).await);
        }

        let report = RunReport {
            address,
            plan,
            outcomes,
        };

        if report.is_success() {
            info!("Run complete for {} -> {}", fqdn, address);
        } else {
            warn!(
                "Run complete for {} with {} failed change(s)",
                fqdn,
                report.failure_count()
            );
        }

        Ok(report)
    }

    /// Apply a single plan step
    ///
    /// Failures are captured, not propagated.
    async fn apply(&self, kind: MutationKind, record: &DnsRecord) -> MutationOutcome {
        let payload = match kind {
            MutationKind::Delete => self.provider.delete_payload(record),
            MutationKind::Add => self.provider.upsert_payload(record),
        };

        if self.dry_run {
            info!("[DRY-RUN] Would {} {} with payload: {}", kind, record, payload);
            return MutationOutcome::Skipped {
                kind,
                record: record.clone(),
            };
        }

        info!("Sending {} for {} with payload: {}", kind, record, payload);

        let result = match kind {
            MutationKind::Delete => {
                self.provider
                    .delete_record(&self.target.domain, record)
                    .await
            }
            MutationKind::Add => {
                self.provider
                    .upsert_record(&self.target.domain, record)
                    .await
            }
        };

        match result {
            Ok(response) => {
                info!("{} {} succeeded (HTTP {})", kind, record, response.status);
                MutationOutcome::Applied {
                    kind,
                    record: record.clone(),
                    response,
                }
            }
            Err(e) => {
                error!("{} {} failed: {}", kind, record, e);
                MutationOutcome::Failed {
                    kind,
                    record: record.clone(),
                    error: e,
                }
            }
        }
    }
}
